use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Registry returned {status}: {message}")]
    RegistryError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Registry,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ValidatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ValidatorError::ApiError(_) => ErrorCategory::Network,
            ValidatorError::RegistryError { .. } => ErrorCategory::Registry,
            ValidatorError::ConfigError { .. }
            | ValidatorError::ConfigValidationError { .. }
            | ValidatorError::InvalidConfigValueError { .. }
            | ValidatorError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ValidatorError::CsvError(_)
            | ValidatorError::SerializationError(_)
            | ValidatorError::ProcessingError { .. } => ErrorCategory::Data,
            ValidatorError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network | ErrorCategory::Registry => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ValidatorError::ApiError(_) => {
                "Check that the registry endpoint is reachable and try again"
            }
            ValidatorError::RegistryError { status, .. } if *status >= 500 => {
                "The address registry is failing; try again later"
            }
            ValidatorError::RegistryError { .. } => {
                "Check the registry endpoint path and request headers"
            }
            ValidatorError::CsvError(_) => {
                "Make sure the input CSV has the header name,street,house_number,city,zip,country"
            }
            ValidatorError::IoError(_) => "Check that the file exists and is readable",
            ValidatorError::SerializationError(_) => "Make sure the input is valid JSON",
            ValidatorError::ConfigError { .. }
            | ValidatorError::ConfigValidationError { .. }
            | ValidatorError::InvalidConfigValueError { .. }
            | ValidatorError::MissingConfigError { .. } => {
                "Fix the configuration file or the environment overrides"
            }
            ValidatorError::ProcessingError { .. } => {
                "Inspect the registry response; it may not match the expected format"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ValidatorError::ApiError(e) if e.is_timeout() => {
                "The address registry did not answer in time".to_string()
            }
            ValidatorError::ApiError(_) => "Could not reach the address registry".to_string(),
            ValidatorError::RegistryError { status, .. } => {
                format!("The address registry rejected the request (HTTP {})", status)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
