use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::EngineError,
    rules::RuleBook,
    utils::{app_data_dir, ensure_dir, rulebooks_dir_in},
};

use super::{Result, RuleStorage};

const BOOK_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// JSON-file persistence for rulebooks, one file per household scope under
/// the application data directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    books_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let base = root.unwrap_or_else(app_data_dir);
        ensure_dir(&base)?;
        let books_dir = rulebooks_dir_in(&base);
        ensure_dir(&books_dir)?;
        Ok(Self { books_dir })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn book_path(&self, name: &str) -> PathBuf {
        self.books_dir
            .join(format!("{}.{}", canonical_name(name), BOOK_EXTENSION))
    }
}

impl RuleStorage for JsonStorage {
    fn save(&self, book: &RuleBook, name: &str) -> Result<()> {
        let path = self.book_path(name);
        let json = serde_json::to_string_pretty(book)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&self, name: &str) -> Result<RuleBook> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(EngineError::Storage(format!(
                "rulebook `{}` not found",
                name
            )));
        }
        let data = fs::read_to_string(&path)?;
        let book: RuleBook = serde_json::from_str(&data)?;
        Ok(book)
    }

    fn load_or_default(&self, name: &str) -> Result<RuleBook> {
        if self.book_path(name).exists() {
            self.load(name)
        } else {
            Ok(RuleBook::new())
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.books_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.books_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                entries.push(stem.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.book_path(name);
        if !path.exists() {
            return Err(EngineError::Storage(format!(
                "rulebook `{}` not found",
                name
            )));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "rulebook".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
