use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("synthesis failed for unit {sequence}: {reason}")]
    Synthesis { sequence: u64, reason: String },
    #[error("output sink rejected write: {0}")]
    SinkWrite(String),
    #[error("narration cancelled by caller")]
    Cancelled,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NarrationError {
    /// Sequence of the unit that failed synthesis, if any
    pub fn failed_sequence(&self) -> Option<u64> {
        match self {
            NarrationError::Synthesis { sequence, .. } => Some(*sequence),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, NarrationError::Cancelled)
    }
}

impl From<NarrationError> for AppError {
    fn from(err: NarrationError) -> Self {
        match err {
            NarrationError::Synthesis { .. } => AppError::ExternalService(err.to_string()),
            NarrationError::SinkWrite(msg) => AppError::Internal(msg),
            NarrationError::Cancelled => AppError::Cancelled,
            NarrationError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
