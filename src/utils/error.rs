use thiserror::Error;

#[derive(Error, Debug)]
pub enum KitError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required setting: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Collection '{name}' not found in PocketBase")]
    CollectionNotFoundError { name: String },

    #[error("Authentication error: {message}")]
    AuthError { message: String },

    #[error("Docker error: {message}")]
    DockerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Data,
    Storage,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl KitError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            KitError::HttpError(_) => ErrorCategory::Network,
            KitError::ApiError { status, .. } if *status == 401 || *status == 403 => {
                ErrorCategory::Authentication
            }
            KitError::ApiError { .. } => ErrorCategory::Network,
            KitError::AuthError { .. } => ErrorCategory::Authentication,
            KitError::ConfigError { .. }
            | KitError::InvalidConfigValueError { .. }
            | KitError::MissingConfigError { .. } => ErrorCategory::Configuration,
            KitError::SerializationError(_)
            | KitError::ValidationError { .. }
            | KitError::ProcessingError { .. }
            | KitError::CollectionNotFoundError { .. } => ErrorCategory::Data,
            KitError::IoError(_) | KitError::ZipError(_) => ErrorCategory::Storage,
            KitError::DockerError { .. } => ErrorCategory::Environment,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            KitError::ApiError { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            KitError::HttpError(_) => ErrorSeverity::Medium,
            KitError::IoError(_) | KitError::ZipError(_) | KitError::DockerError { .. } => {
                ErrorSeverity::Critical
            }
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that PocketBase is running and reachable at the configured URL, then retry"
            }
            ErrorCategory::Authentication => {
                "Verify the admin email and password, or sign in again to refresh the token"
            }
            ErrorCategory::Configuration => {
                "Review the command-line flags, environment variables and pbkit.toml"
            }
            ErrorCategory::Data => {
                "Inspect the input files and collection names; use --dry-run to validate without writing"
            }
            ErrorCategory::Storage => {
                "Check that the output directory exists and is writable, and that enough disk space is free"
            }
            ErrorCategory::Environment => "Install Docker and make sure the daemon is running",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            KitError::HttpError(e) if e.is_connect() => {
                "Could not connect to PocketBase".to_string()
            }
            KitError::HttpError(e) if e.is_timeout() => "PocketBase request timed out".to_string(),
            KitError::ApiError { status: 401, .. } | KitError::ApiError { status: 403, .. } => {
                "PocketBase rejected the credentials or token".to_string()
            }
            KitError::ApiError { status: 404, .. } => {
                "PocketBase returned 404: the endpoint or record does not exist".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_classification() {
        let unauthorized = KitError::ApiError {
            status: 401,
            body: "{}".to_string(),
        };
        assert_eq!(unauthorized.category(), ErrorCategory::Authentication);
        assert_eq!(unauthorized.severity(), ErrorSeverity::High);

        let throttled = KitError::ApiError {
            status: 429,
            body: String::new(),
        };
        assert_eq!(throttled.category(), ErrorCategory::Network);
        assert_eq!(throttled.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_api_error_display_keeps_platform_body() {
        let err = KitError::ApiError {
            status: 400,
            body: r#"{"message":"Failed to create record."}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"HTTP 400: {"message":"Failed to create record."}"#
        );
    }

    #[test]
    fn test_missing_setting_is_configuration() {
        let err = KitError::MissingConfigError {
            field: "admin.email".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.to_string(), "Missing required setting: admin.email");
    }

    #[test]
    fn test_storage_errors_are_critical() {
        let err = KitError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
