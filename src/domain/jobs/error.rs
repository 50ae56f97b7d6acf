use crate::domain::narration::NarrationError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("job not found")]
    NotFound,
    #[error("audio not available: {0}")]
    AudioUnavailable(String),
    #[error("text extraction failed: {0}")]
    Extraction(String),
    #[error(transparent)]
    Narration(#[from] NarrationError),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<JobServiceError> for AppError {
    fn from(err: JobServiceError) -> Self {
        match err {
            JobServiceError::Invalid(msg) => AppError::BadRequest(msg),
            JobServiceError::NotFound => AppError::NotFound("Narration job not found".to_string()),
            JobServiceError::AudioUnavailable(msg) => AppError::NotFound(msg),
            JobServiceError::Narration(e) => AppError::from(e),
            JobServiceError::Delivery(msg) => AppError::ExternalService(msg),
            JobServiceError::Extraction(msg)
            | JobServiceError::Storage(msg) => AppError::Internal(msg),
            JobServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
