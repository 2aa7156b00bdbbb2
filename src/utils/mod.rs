use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Once,
};

use crate::errors::EngineError;

const DEFAULT_DIR_NAME: &str = ".bucketwise_core";
const RULEBOOK_DIR: &str = "rulebooks";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("bucketwise_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Returns the application-specific data directory, defaulting to `~/.bucketwise_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("BUCKETWISE_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory containing managed rulebooks inside `base`.
pub fn rulebooks_dir_in(base: &Path) -> PathBuf {
    base.join(RULEBOOK_DIR)
}

/// Directory containing engine configuration inside `base`.
pub fn config_dir_in(base: &Path) -> PathBuf {
    base.join(CONFIG_DIR)
}

/// Path to the engine configuration file inside `base`.
pub fn config_file_in(base: &Path) -> PathBuf {
    config_dir_in(base).join(CONFIG_FILE)
}

/// Creates `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(path)?;
    Ok(())
}
