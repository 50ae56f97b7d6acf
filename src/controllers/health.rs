use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::narration::NarrationService;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(service): State<Arc<NarrationService>>) -> impl IntoResponse {
    let settings = service.settings();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "tts": service.provider(),
            "voice": settings.voice_id,
            "concurrency": settings.concurrency
        })),
    )
}
