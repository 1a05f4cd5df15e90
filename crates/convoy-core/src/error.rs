use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a configuration document into entities.
///
/// Every variant that originates in the document carries the offending key
/// (or tag) and the 1-based source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("line {line}: missing required key '{key}'")]
    MissingKey { key: String, line: usize },

    #[error("line {line}: '{key}' must be {expected}")]
    TypeMismatch {
        key: String,
        line: usize,
        expected: &'static str,
    },

    #[error("line {line}: invalid value for '{key}': {message}")]
    ValueFormat {
        key: String,
        line: usize,
        message: String,
    },

    #[error("line {line}: unknown value '{value}' for '{key}'")]
    UnknownEnumValue {
        key: String,
        line: usize,
        value: String,
    },

    #[error("line {line}: conflicting configuration for '{key}': {message}")]
    ConfigurationConflict {
        key: String,
        line: usize,
        message: String,
    },

    #[error("line {line}: unknown tag '{tag}'")]
    UnknownTag { tag: String, line: usize },

    #[error("YAML parse error at line {line}: {message}")]
    Yaml { line: usize, message: String },

    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl ConfigError {
    /// Source line the error points at, if it came from the document.
    pub fn line(&self) -> Option<usize> {
        match self {
            ConfigError::MissingKey { line, .. }
            | ConfigError::TypeMismatch { line, .. }
            | ConfigError::ValueFormat { line, .. }
            | ConfigError::UnknownEnumValue { line, .. }
            | ConfigError::ConfigurationConflict { line, .. }
            | ConfigError::UnknownTag { line, .. }
            | ConfigError::Yaml { line, .. } => Some(*line),
            ConfigError::Io { .. } => None,
        }
    }

    /// Key or tag the error names, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::MissingKey { key, .. }
            | ConfigError::TypeMismatch { key, .. }
            | ConfigError::ValueFormat { key, .. }
            | ConfigError::UnknownEnumValue { key, .. }
            | ConfigError::ConfigurationConflict { key, .. } => Some(key),
            ConfigError::UnknownTag { tag, .. } => Some(tag),
            ConfigError::Yaml { .. } | ConfigError::Io { .. } => None,
        }
    }
}

/// An invariant broken while constructing an entity.
///
/// Entity constructors know which field is wrong but not where it came from;
/// parsers attach the source line with [`Violation::at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Invalid { field: &'static str, message: String },
    Conflict { field: &'static str, message: String },
}

impl Violation {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Violation::Invalid {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        Violation::Conflict {
            field,
            message: message.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            Violation::Invalid { field, .. } | Violation::Conflict { field, .. } => field,
        }
    }

    pub fn at(self, line: usize) -> ConfigError {
        match self {
            Violation::Invalid { field, message } => ConfigError::ValueFormat {
                key: field.to_string(),
                line,
                message,
            },
            Violation::Conflict { field, message } => ConfigError::ConfigurationConflict {
                key: field.to_string(),
                line,
                message,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
