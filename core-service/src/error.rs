use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Cache error: {0}")]
    Cache(#[from] core_cache::CacheError),

    #[error("Google Drive error: {0}")]
    Drive(#[from] provider_google_drive::GoogleDriveError),

    #[error("Folder \"{0}\" not found in Google Drive")]
    FolderNotFound(String),

    #[error("No photos or videos found in \"{0}\"")]
    EmptyFolder(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
