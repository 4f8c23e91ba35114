//! Error types for Google Drive provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Google Drive provider errors
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// Token missing, expired, or lacking the `drive.readonly` scope
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an error
    #[error("Google Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    /// File not found
    #[error("File not found: {file_id}")]
    FileNotFound { file_id: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

impl GoogleDriveError {
    /// Returns `true` for failures worth retrying later.
    pub fn is_transient(&self) -> bool {
        match self {
            GoogleDriveError::RateLimitExceeded { .. } | GoogleDriveError::NetworkError(_) => true,
            GoogleDriveError::ApiError { status_code, .. } => *status_code >= 500,
            GoogleDriveError::BridgeError(BridgeError::Timeout(_)) => true,
            _ => false,
        }
    }
}

/// Result type for Google Drive operations
pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl From<GoogleDriveError> for BridgeError {
    fn from(error: GoogleDriveError) -> Self {
        match error {
            GoogleDriveError::BridgeError(e) => e,
            GoogleDriveError::NetworkError(msg) => {
                BridgeError::OperationFailed(format!("Network error: {}", msg))
            }
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = GoogleDriveError::ApiError {
            status_code: 404,
            message: "File not found".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Google Drive API error (status 404): File not found"
        );
    }

    #[test]
    fn test_error_conversion() {
        let error = GoogleDriveError::AuthenticationFailed("Token expired".to_string());
        let bridge_error: BridgeError = error.into();
        assert!(matches!(bridge_error, BridgeError::OperationFailed(_)));

        let error: GoogleDriveError = BridgeError::Timeout("30s".to_string()).into();
        assert!(error.is_transient());
        assert!(matches!(BridgeError::from(error), BridgeError::Timeout(_)));
    }

    #[test]
    fn test_transient_classification() {
        assert!(GoogleDriveError::RateLimitExceeded {
            retry_after_seconds: 1
        }
        .is_transient());
        assert!(!GoogleDriveError::FileNotFound {
            file_id: "x".to_string()
        }
        .is_transient());
        assert!(!GoogleDriveError::ApiError {
            status_code: 400,
            message: String::new()
        }
        .is_transient());
    }
}
