use super::error::JobServiceError;
use super::model::{audio_file_name, JobRecord, JobStatus, NarrationJob};
use super::registry::JobRegistry;
use crate::domain::narration::NarrationServiceApi;
use crate::infrastructure::extraction::{extract_document, TextExtractor};
use crate::infrastructure::notifier::{Delivery, DeliveryNotifier};
use crate::infrastructure::sinks::FileSink;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Location of a finished narration on disk
#[derive(Debug, Clone)]
pub struct StoredAudio {
    pub path: PathBuf,
    pub audio_file: String,
}

/// Runs uploaded documents through narration in the background and hands
/// the result to the delivery collaborator
#[derive(Clone)]
pub struct NarrationJobService {
    narration: Arc<dyn NarrationServiceApi>,
    extractor: Arc<dyn TextExtractor>,
    notifier: Arc<dyn DeliveryNotifier>,
    registry: JobRegistry,
    storage_dir: PathBuf,
}

impl NarrationJobService {
    pub fn new(
        narration: Arc<dyn NarrationServiceApi>,
        extractor: Arc<dyn TextExtractor>,
        notifier: Arc<dyn DeliveryNotifier>,
        registry: JobRegistry,
        storage_dir: PathBuf,
    ) -> Self {
        Self {
            narration,
            extractor,
            notifier,
            registry,
            storage_dir,
        }
    }
}

#[async_trait]
pub trait NarrationJobServiceApi: Send + Sync {
    /// Queue a document for narration and delivery
    ///
    /// Validates the upload, records the job as queued and returns immediately;
    /// processing continues in a background task.
    async fn submit(
        &self,
        filename: String,
        recipient: String,
        bytes: Vec<u8>,
    ) -> Result<JobRecord, JobServiceError>;

    async fn status(&self, job_id: Uuid) -> Result<JobRecord, JobServiceError>;

    /// Finished audio for a job, once narration has completed
    async fn audio(&self, job_id: Uuid) -> Result<StoredAudio, JobServiceError>;
}

#[async_trait]
impl NarrationJobServiceApi for NarrationJobService {
    async fn submit(
        &self,
        filename: String,
        recipient: String,
        bytes: Vec<u8>,
    ) -> Result<JobRecord, JobServiceError> {
        validate_upload(&filename, &recipient)?;

        let job = NarrationJob {
            job_id: Uuid::new_v4(),
            filename,
            recipient,
            bytes,
        };
        let record = JobRecord::queued(job.job_id, job.filename.clone());
        self.registry.insert(record.clone()).await;

        tracing::info!(
            job_id = %job.job_id,
            filename = %job.filename,
            upload_size_bytes = job.bytes.len(),
            "Narration job queued"
        );

        let service = self.clone();
        tokio::spawn(async move {
            service.run(job).await;
        });

        Ok(record)
    }

    async fn status(&self, job_id: Uuid) -> Result<JobRecord, JobServiceError> {
        self.registry
            .get(job_id)
            .await
            .ok_or(JobServiceError::NotFound)
    }

    async fn audio(&self, job_id: Uuid) -> Result<StoredAudio, JobServiceError> {
        let record = self.status(job_id).await?;
        let audio_file = record.audio_file.ok_or_else(|| {
            JobServiceError::AudioUnavailable("Narration audio is not ready".to_string())
        })?;

        let path = self.artifact_path(job_id);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| JobServiceError::Storage(e.to_string()))?;
        if !exists {
            return Err(JobServiceError::AudioUnavailable(
                "Narration audio is no longer stored".to_string(),
            ));
        }

        Ok(StoredAudio { path, audio_file })
    }
}

impl NarrationJobService {
    fn artifact_path(&self, job_id: Uuid) -> PathBuf {
        self.storage_dir.join(format!("{}.mp3", job_id))
    }

    async fn run(&self, job: NarrationJob) {
        let job_id = job.job_id;
        self.registry
            .update(job_id, |record| record.status = JobStatus::Processing)
            .await;

        match self.process(job).await {
            Ok(()) => {
                self.registry
                    .update(job_id, |record| record.status = JobStatus::Completed)
                    .await;
                tracing::info!(job_id = %job_id, "Narration job completed");
            }
            Err(err) => {
                tracing::error!(job_id = %job_id, error = %err, "Narration job failed");
                let message = err.to_string();
                self.registry
                    .update(job_id, move |record| {
                        record.status = JobStatus::Failed;
                        record.error = Some(message);
                    })
                    .await;
            }
        }
    }

    async fn process(&self, job: NarrationJob) -> Result<(), JobServiceError> {
        let NarrationJob {
            job_id,
            filename,
            recipient,
            bytes,
        } = job;

        let document = extract_document(self.extractor.clone(), filename.clone(), bytes)
            .await
            .map_err(JobServiceError::Extraction)?;

        let mut sink = FileSink::create(self.artifact_path(job_id))
            .await
            .map_err(|e| JobServiceError::Storage(e.to_string()))?;
        let report = self.narration.narrate(&document, &mut sink).await?;

        if report.audio_bytes == 0 {
            tracing::warn!(job_id = %job_id, filename = %filename, "Narration produced no audio");
        }

        let audio_file = audio_file_name(&filename);
        let audio_bytes = report.audio_bytes;
        let stored_name = audio_file.clone();
        self.registry
            .update(job_id, move |record| {
                record.audio_file = Some(stored_name);
                record.audio_bytes = Some(audio_bytes);
            })
            .await;

        let delivery = Delivery {
            job_id,
            recipient,
            document_name: filename,
            audio_file,
            audio_url: format!("/api/narrations/{}/audio", job_id),
            audio_bytes,
            completed_at: Utc::now(),
        };

        self.notifier
            .deliver(&delivery)
            .await
            .map_err(JobServiceError::Delivery)
    }
}

fn validate_upload(filename: &str, recipient: &str) -> Result<(), JobServiceError> {
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(JobServiceError::Invalid("Only PDF files allowed".to_string()));
    }

    let recipient = recipient.trim();
    if recipient.is_empty() || !recipient.contains('@') {
        return Err(JobServiceError::Invalid(
            "A valid email address is required".to_string(),
        ));
    }

    Ok(())
}
