//! Error types for Marginalia
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for Marginalia
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Selection is empty")]
    EmptySelection,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No active selection")]
    NoActiveSelection,

    #[error("No comment draft is open")]
    NoDraft,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Marginalia operations
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Check if this error leaves the engine usable without outside intervention
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::EmptySelection
                | EngineError::NotFound(_)
                | EngineError::InvalidInput(_)
                | EngineError::NoActiveSelection
                | EngineError::NoDraft
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            EngineError::EmptySelection => "Select some text before adding a comment".to_string(),
            EngineError::NotFound(what) => format!("{} no longer exists", what),
            EngineError::InvalidInput(msg) => format!("Invalid value: {}", msg),
            EngineError::NoActiveSelection => "Select some text first".to_string(),
            EngineError::NoDraft => "There is no comment being written".to_string(),
            EngineError::Io(e) => format!("File operation failed: {}", e),
            EngineError::Config(msg) => format!("Configuration error: {}", msg),
            _ => self.to_string(),
        }
    }
}
