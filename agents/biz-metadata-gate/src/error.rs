//! Error types for the metadata gate
//!
//! Data problems never surface here: they become [`Violation`]s. These errors
//! cover configuration, input loading and report output.
//!
//! [`Violation`]: crate::engine::rules::Violation

use thiserror::Error;

/// Main error type for gate operations
#[derive(Error, Debug)]
pub enum GateError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Input table parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid gate construction parameters (mode, depth)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error while producing a report
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GateError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        GateError::InvalidInput(msg.into())
    }

    /// Create a file error
    pub fn file_error(msg: impl Into<String>) -> Self {
        GateError::FileError(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        GateError::ParseError(msg.into())
    }

    /// Create a configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        GateError::ConfigError(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            GateError::InvalidInput(_)
                | GateError::FileError(_)
                | GateError::ParseError(_)
                | GateError::ConfigError(_)
        )
    }
}

impl From<std::io::Error> for GateError {
    fn from(err: std::io::Error) -> Self {
        GateError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        GateError::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for GateError {
    fn from(err: serde_yaml::Error) -> Self {
        GateError::SerializationError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for GateError {
    fn from(err: toml::de::Error) -> Self {
        GateError::ConfigError(format!("TOML error: {}", err))
    }
}

impl From<csv::Error> for GateError {
    fn from(err: csv::Error) -> Self {
        GateError::ParseError(format!("CSV error: {}", err))
    }
}

impl From<crate::telemetry::TelemetryError> for GateError {
    fn from(err: crate::telemetry::TelemetryError) -> Self {
        GateError::InternalError(err.to_string())
    }
}

/// Result type alias for gate operations
pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GateError::ConfigError("mode must be one of: import, publish".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: mode must be one of: import, publish"
        );
    }

    #[test]
    fn test_is_user_error() {
        assert!(GateError::InvalidInput("test".to_string()).is_user_error());
        assert!(GateError::FileError("test".to_string()).is_user_error());
        assert!(GateError::ConfigError("test".to_string()).is_user_error());
        assert!(!GateError::InternalError("test".to_string()).is_user_error());
        assert!(!GateError::SerializationError("test".to_string()).is_user_error());
    }

    #[test]
    fn test_error_constructors() {
        let err = GateError::invalid_input("test");
        assert!(matches!(err, GateError::InvalidInput(_)));

        let err = GateError::file_error("test");
        assert!(matches!(err, GateError::FileError(_)));

        let err = GateError::parse_error("test");
        assert!(matches!(err, GateError::ParseError(_)));

        let err = GateError::config_error("test");
        assert!(matches!(err, GateError::ConfigError(_)));
    }

    #[test]
    fn test_toml_error_is_config_error() {
        let err: GateError = toml::from_str::<toml::Value>("mode = ").unwrap_err().into();
        assert!(matches!(err, GateError::ConfigError(_)));
    }
}
