//! Error types for satya.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for satya operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for satya operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Malformed or incomplete annotation schema configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// No file at the given location.
    #[error("no file at location {0}")]
    FileNotFound(PathBuf),

    /// File extension not recognized as a supported document format.
    #[error("{0} has unknown file format, use one of .txt, .json, .conll")]
    UnknownFileFormat(String),

    /// An entity was added over a character range containing no tokens.
    #[error("no token selected: {0}")]
    NoTokenSelected(String),

    /// A label violates the tag level hierarchy.
    #[error("tag level hierarchy violation: {0}")]
    TagLevelHierarchy(String),

    /// Cursor resolution over a line with more than one nesting level.
    #[error("ambiguous nesting: {0}")]
    AmbiguousNesting(String),

    /// Undo requested with no snapshots available.
    #[error("history is empty")]
    HistoryEmpty,

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a config error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a no-token-selected error.
    #[must_use]
    pub fn no_token_selected(msg: impl Into<String>) -> Self {
        Error::NoTokenSelected(msg.into())
    }

    /// Create a tag level hierarchy error.
    #[must_use]
    pub fn tag_level_hierarchy(msg: impl Into<String>) -> Self {
        Error::TagLevelHierarchy(msg.into())
    }

    /// Create an ambiguous nesting error.
    #[must_use]
    pub fn ambiguous_nesting(msg: impl Into<String>) -> Self {
        Error::AmbiguousNesting(msg.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }
}
