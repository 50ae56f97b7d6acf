use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub filename: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Download name of the finished audio, set once narration is done
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bytes: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn queued(job_id: Uuid, filename: String) -> Self {
        let now = Utc::now();
        Self {
            job_id,
            filename,
            status: JobStatus::Queued,
            error: None,
            audio_file: None,
            audio_bytes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Work item for one uploaded document
#[derive(Debug, Clone)]
pub struct NarrationJob {
    pub job_id: Uuid,
    pub filename: String,
    pub recipient: String,
    pub bytes: Vec<u8>,
}

/// Download name for a document: `book.pdf` becomes `book.mp3`
pub fn audio_file_name(filename: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("narration");
    format!("{}.mp3", stem)
}
