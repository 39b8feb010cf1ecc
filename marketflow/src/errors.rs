//! Error types for the marketflow pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for marketflow operations.
///
/// Stage-local faults surface through this type as the `Err` side of a
/// stage's result; whether such a fault aborts the whole run or is recovered
/// and logged is decided at the [`crate::processor::Processor`] boundary,
/// never inside a stage.
#[derive(Debug, Error)]
pub enum MarketflowError {
    /// The configuration file does not exist.
    #[error("config file {} not found", path.display())]
    ConfigNotFound {
        /// The path that was checked.
        path: PathBuf,
    },

    /// The configuration file exists but could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// A stage read a context key that no earlier stage produced.
    #[error("context key '{key}' is missing")]
    MissingContextKey {
        /// The requested key name.
        key: String,
    },

    /// A context key is present but holds a value of a different type.
    #[error("context key '{key}' does not hold a value of type {expected}")]
    ContextType {
        /// The requested key name.
        key: String,
        /// The type the caller asked for.
        expected: &'static str,
    },

    /// Two stages were registered under the same name.
    #[error("duplicate stage name '{0}' in workflow")]
    DuplicateStage(String),

    /// A configured option value is outside the recognized set.
    #[error("{option} '{value}' is not supported; supported values: {supported:?}")]
    Unsupported {
        /// What kind of option was being parsed.
        option: &'static str,
        /// The offending value.
        value: String,
        /// The values that would have been accepted.
        supported: Vec<&'static str>,
    },

    /// A remote quote request failed.
    #[error("remote source error: {0}")]
    Http(#[from] reqwest::Error),

    /// A CSV payload or file could not be read or written.
    #[error("malformed table data: {0}")]
    Csv(#[from] csv::Error),

    /// A timestamp cell could not be parsed.
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// Loaded data has an unusable shape (ragged columns, empty join, ...).
    #[error("data error: {0}")]
    Data(String),

    /// A stage failed for a reason local to its own logic.
    #[error("stage execution error: {0}")]
    StageExecution(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_message() {
        let error = MarketflowError::MissingContextKey {
            key: "data".to_string(),
        };
        assert_eq!(error.to_string(), "context key 'data' is missing");
    }

    #[test]
    fn test_unsupported_lists_values() {
        let error = MarketflowError::Unsupported {
            option: "data clearing rule",
            value: "median_blur".to_string(),
            supported: vec!["drop_incomplete_rows"],
        };
        let text = error.to_string();
        assert!(text.contains("median_blur"));
        assert!(text.contains("drop_incomplete_rows"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = MarketflowError::from(io);
        assert!(matches!(error, MarketflowError::Io(_)));
    }
}
