use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finished narration ready to be handed to its recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub job_id: Uuid,
    pub recipient: String,
    pub document_name: String,
    pub audio_file: String,
    pub audio_url: String,
    pub audio_bytes: u64,
    pub completed_at: DateTime<Utc>,
}

/// Hands finished narrations to the recipient (email relay, webhook, ...)
#[async_trait]
pub trait DeliveryNotifier: Send + Sync {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), String>;
}

/// Posts each delivery as JSON to a configured endpoint
pub struct WebhookNotifier {
    url: String,
    http_client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            url,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DeliveryNotifier for WebhookNotifier {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), String> {
        let response = self
            .http_client
            .post(&self.url)
            .json(delivery)
            .send()
            .await
            .map_err(|e| format!("Delivery webhook request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(format!(
                "Delivery webhook returned {}: {}",
                status, error_text
            ));
        }

        tracing::info!(
            job_id = %delivery.job_id,
            recipient = %delivery.recipient,
            audio_file = %delivery.audio_file,
            "Delivery webhook accepted"
        );
        Ok(())
    }
}

/// Only logs deliveries; used when no delivery endpoint is configured
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl DeliveryNotifier for LogNotifier {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), String> {
        tracing::info!(
            job_id = %delivery.job_id,
            recipient = %delivery.recipient,
            document = %delivery.document_name,
            audio_url = %delivery.audio_url,
            audio_size_bytes = delivery.audio_bytes,
            "Narration ready for delivery"
        );
        Ok(())
    }
}
