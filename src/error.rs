//! Error types for settings discovery and loading

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Error)]
pub enum SettingsError {
    /// The starting path of a walk is missing, or a strict search came up empty.
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// The settings file failed to parse or evaluate.
    #[error("failed to load settings from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: EvalError,
    },

    #[error("failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A TOML/YAML/JSON settings file could not be parsed into a table.
    #[error("invalid settings file {}: {message}", path.display())]
    Format { path: PathBuf, message: String },
}

impl SettingsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SettingsError::NotFound { .. })
    }

    pub fn is_load(&self) -> bool {
        matches!(self, SettingsError::Load { .. })
    }
}

/// Failures raised while evaluating a Python settings file.
///
/// Line numbers are 1-based and refer to the top-level statement being
/// executed when the failure occurred.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("line {line}: unsupported construct: {construct}")]
    Unsupported { line: usize, construct: String },

    #[error("line {line}: name '{name}' is not defined")]
    UndefinedName { line: usize, name: String },

    #[error("line {line}: TypeError: {message}")]
    Type { line: usize, message: String },

    #[error("line {line}: ValueError: {message}")]
    Value { line: usize, message: String },

    #[error("line {line}: KeyError: {key}")]
    Key { line: usize, key: String },

    #[error("line {line}: IndexError: {message}")]
    Index { line: usize, message: String },

    #[error("line {line}: ZeroDivisionError: division by zero")]
    ZeroDivision { line: usize },

    #[error("line {line}: OverflowError: integer result out of range")]
    Overflow { line: usize },

    /// An import the evaluator cannot satisfy; only `os`, `os.path` and `sys` exist.
    #[error("line {line}: ImportError: {message}")]
    Import { line: usize, message: String },

    #[error("line {line}: AttributeError: {message}")]
    Attribute { line: usize, message: String },

    /// An explicit `raise` statement in the settings file.
    #[error("line {line}: raised {message}")]
    Raised { line: usize, message: String },
}
