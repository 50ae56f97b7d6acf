use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        jobs::{JobRecord, JobStatus, NarrationJobService, NarrationJobServiceApi},
        narration::{NarrationService, NarrationServiceApi},
    },
    error::{AppError, AppResult},
    infrastructure::{
        extraction::{extract_document, TextExtractor},
        sinks::{audio_stream, ChannelSink},
    },
};

/// Response for POST /api/narrations
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub message: String,
    pub status: JobStatus,
    pub filename: String,
}

/// Fields read from a narration upload
#[derive(Debug, Default)]
struct Upload {
    filename: Option<String>,
    bytes: Vec<u8>,
    email: Option<String>,
}

pub struct NarrationController {
    narration_service: Arc<NarrationService>,
    job_service: Arc<NarrationJobService>,
    extractor: Arc<dyn TextExtractor>,
}

impl NarrationController {
    pub fn new(
        narration_service: Arc<NarrationService>,
        job_service: Arc<NarrationJobService>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            narration_service,
            job_service,
            extractor,
        }
    }

    /// POST /api/narrations - Upload a PDF and have its narration delivered
    pub async fn submit(
        State(controller): State<Arc<NarrationController>>,
        multipart: Multipart,
    ) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
        let upload = read_upload(multipart).await?;
        let filename = upload
            .filename
            .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
        let email = upload
            .email
            .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;

        let record = controller
            .job_service
            .submit(filename, email, upload.bytes)
            .await?;

        Ok((
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                job_id: record.job_id,
                message: "Upload complete. Processing started.".to_string(),
                status: record.status,
                filename: record.filename,
            }),
        ))
    }

    /// GET /api/narrations/:job_id - Current status of a narration job
    pub async fn status(
        State(controller): State<Arc<NarrationController>>,
        Path(job_id): Path<Uuid>,
    ) -> AppResult<Json<JobRecord>> {
        let record = controller.job_service.status(job_id).await?;
        Ok(Json(record))
    }

    /// GET /api/narrations/:job_id/audio - Download a finished narration
    pub async fn audio(
        State(controller): State<Arc<NarrationController>>,
        Path(job_id): Path<Uuid>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let stored = controller.job_service.audio(job_id).await?;
        let audio = tokio::fs::read(&stored.path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read narration audio: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        headers.insert(
            header::CONTENT_DISPOSITION,
            content_disposition(&stored.audio_file)?,
        );

        Ok((StatusCode::OK, headers, Body::from(audio)))
    }

    /// POST /api/narrations/stream - Narrate a PDF straight into the response body
    ///
    /// Audio is sent in document order while later units are still being
    /// synthesized. A failure before any audio is produced is reported as an
    /// error status; a later failure breaks the transfer.
    pub async fn stream(
        State(controller): State<Arc<NarrationController>>,
        multipart: Multipart,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let upload = read_upload(multipart).await?;
        let filename = upload
            .filename
            .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(AppError::BadRequest("Only PDF files allowed".to_string()));
        }

        let document = extract_document(controller.extractor.clone(), filename, upload.bytes)
            .await
            .map_err(AppError::Internal)?;

        let capacity = controller.narration_service.settings().concurrency;
        let (mut sink, mut rx) = ChannelSink::new(capacity);
        let service = controller.narration_service.clone();
        tokio::spawn(async move {
            match service.narrate(&document, &mut sink).await {
                Ok(report) => tracing::info!(
                    document = %document.name,
                    units = report.units,
                    audio_size_bytes = report.audio_bytes,
                    "Streamed narration finished"
                ),
                Err(e) if e.is_cancelled() => {
                    tracing::info!(document = %document.name, "Stream consumer disconnected")
                }
                Err(e) => {
                    tracing::error!(document = %document.name, error = %e, "Streamed narration failed")
                }
            }
        });

        let first = rx.recv().await;
        if let Some(Err(e)) = &first {
            return Err(AppError::ExternalService(e.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));

        let body = stream::iter(first).chain(audio_stream(rx));
        Ok((StatusCode::OK, headers, Body::from_stream(body)))
    }
}

async fn read_upload(mut multipart: Multipart) -> AppResult<Upload> {
    let mut upload = Upload::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                upload.filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.is_empty());
                upload.bytes = field.bytes().await?.to_vec();
            }
            Some("email") => {
                let email = field.text().await?;
                upload.email = Some(email.trim().to_string()).filter(|email| !email.is_empty());
            }
            _ => {}
        }
    }

    Ok(upload)
}

fn content_disposition(audio_file: &str) -> AppResult<HeaderValue> {
    let safe_name: String = audio_file
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe_name))
        .map_err(|e| AppError::Internal(format!("Invalid audio file name: {}", e)))
}
