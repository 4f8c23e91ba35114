use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The persistent store could not be opened or queried.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The host storage engine rejected a write for lack of space.
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether the error is the recoverable quota condition.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, BridgeError::QuotaExceeded(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
