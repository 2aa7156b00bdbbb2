pub mod json_backend;

use crate::{errors::EngineError, rules::RuleBook};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Abstraction over persistence backends capable of storing named rulebooks.
pub trait RuleStorage: Send + Sync {
    fn save(&self, book: &RuleBook, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<RuleBook>;
    /// Returns a fresh empty book when `name` has never been saved.
    fn load_or_default(&self, name: &str) -> Result<RuleBook>;
    fn list(&self) -> Result<Vec<String>>;
    fn delete(&self, name: &str) -> Result<()>;
}

pub use json_backend::JsonStorage;
