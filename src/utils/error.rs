use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaixaError {
    #[error("QR code encoding failed: {0}")]
    QrError(#[from] qrcode::types::QrError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Command '{program}' failed with exit code {code:?}")]
    CommandFailed { program: String, code: Option<i32> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CaixaError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CaixaError::ConfigValidationError { .. }
            | CaixaError::InvalidConfigValueError { .. }
            | CaixaError::MissingConfigError { .. }
            | CaixaError::QrError(_)
            | CaixaError::CsvError(_)
            | CaixaError::SerializationError(_)
            | CaixaError::ProcessingError { .. } => ErrorSeverity::High,
            CaixaError::CommandFailed { .. } => ErrorSeverity::Medium,
            CaixaError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CaixaError::QrError(e) => format!("Could not encode the QR code: {}", e),
            CaixaError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("File not found: {}", e)
            }
            CaixaError::CommandFailed { program, code } => match code {
                Some(code) => format!("'{}' exited with status {}", program, code),
                None => format!("'{}' was terminated by a signal", program),
            },
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CaixaError::QrError(_) => "Shorten the input or lower the error correction level",
            CaixaError::CsvError(_) => "Make sure every row has the same number of fields as the header",
            CaixaError::IoError(_) => "Check that the path exists and is readable",
            CaixaError::SerializationError(_) => "Inspect the input data for unsupported values",
            CaixaError::ConfigValidationError { .. }
            | CaixaError::InvalidConfigValueError { .. }
            | CaixaError::MissingConfigError { .. } => "Fix the configuration file or command line flags",
            CaixaError::ProcessingError { .. } => "Inspect the input data",
            CaixaError::CommandFailed { .. } => {
                "Make sure the PostgreSQL client tools are installed and the servers are reachable"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CaixaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_message() {
        let err = CaixaError::CommandFailed {
            program: "pg_dump".to_string(),
            code: Some(1),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "'pg_dump' exited with status 1");
    }

    #[test]
    fn test_missing_file_message() {
        let err = CaixaError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "qr.txt"));
        assert!(err.user_friendly_message().starts_with("File not found"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = CaixaError::MissingConfigError {
            field: "source".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.recovery_suggestion(), "Fix the configuration file or command line flags");
    }
}
