use thiserror::Error;

/// Top-level error type for the Actuate workspace.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for ActuateError` so that the `?` operator works
/// across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActuateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ActuateError {
    fn from(err: toml::de::Error) -> Self {
        ActuateError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ActuateError {
    fn from(err: toml::ser::Error) -> Self {
        ActuateError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ActuateError {
    fn from(err: serde_json::Error) -> Self {
        ActuateError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Actuate operations.
pub type Result<T> = std::result::Result<T, ActuateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ActuateError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = ActuateError::Execution("action failed".to_string());
        assert_eq!(err.to_string(), "Execution error: action failed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ActuateError = io_err.into();
        assert!(matches!(err, ActuateError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: ActuateError = toml_err.into();
        assert!(matches!(err, ActuateError::Config(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ActuateError = json_err.into();
        assert!(matches!(err, ActuateError::Serialization(_)));
    }
}
