use thiserror::Error;

/// Startup and configuration failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Missing host capability {capability}: {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Runtime setup failed: {0}")]
    Internal(String),

    #[error("Logging already initialized: {0}")]
    LoggingInit(String),
}

pub type Result<T> = std::result::Result<T, Error>;
