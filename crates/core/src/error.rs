use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("patient ID already exists: {0}")]
    DuplicateKey(String),
    #[error("patient not found: {0}")]
    NotFound(String),
    #[error("unsupported file format: '{0}' (expected csv or json)")]
    UnsupportedFormat(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write file: {0}")]
    FileWrite(std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(String),
}

impl HealthError {
    /// Whether this error came from the file system rather than from the data itself.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            HealthError::StorageDirCreation(_) | HealthError::FileRead(_) | HealthError::FileWrite(_)
        )
    }
}

pub type HealthResult<T> = std::result::Result<T, HealthError>;
