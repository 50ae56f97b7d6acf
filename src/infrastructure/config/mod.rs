use crate::domain::narration::{ContentStartPolicy, NarrationSettings};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub frontend_url: String,
    // Speech synthesis
    pub tts_provider: TtsProvider,
    pub aws_region: String,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub voice_id: String,
    // Narration pipeline
    pub max_chars: usize,
    pub tts_concurrency: usize,
    pub small_document_pages: usize,
    pub content_scan_pages: usize,
    pub force_content_start: bool,
    pub front_matter_keywords: Vec<String>,
    // Jobs
    pub storage_dir: PathBuf,
    pub delivery_webhook_url: Option<String>,
    pub max_upload_bytes: usize,
    pub job_retention_minutes: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    Polly,
    OpenAi,
}

impl TtsProvider {
    pub fn default_voice(&self) -> &'static str {
        match self {
            TtsProvider::Polly => "Matthew",
            TtsProvider::OpenAi => "onyx",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let tts_provider = match env::var("TTS_PROVIDER")
            .unwrap_or_else(|_| "polly".to_string())
            .to_lowercase()
            .as_str()
        {
            "polly" => TtsProvider::Polly,
            "openai" => TtsProvider::OpenAi,
            other => return Err(format!("Unknown TTS_PROVIDER: {}", other).into()),
        };

        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|key| !key.is_empty());
        if tts_provider == TtsProvider::OpenAi && openai_api_key.is_none() {
            return Err("OPENAI_API_KEY is required when TTS_PROVIDER=openai".into());
        }

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            tts_provider,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            openai_api_key,
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            voice_id: env::var("VOICE_ID")
                .unwrap_or_else(|_| tts_provider.default_voice().to_string()),
            max_chars: env::var("MAX_CHARS")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            tts_concurrency: env::var("TTS_CONCURRENCY")
                .unwrap_or_else(|_| "2".to_string())
                .parse::<usize>()?
                .max(1),
            small_document_pages: env::var("SMALL_DOCUMENT_PAGES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()?,
            content_scan_pages: env::var("CONTENT_SCAN_PAGES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            force_content_start: env::var("FORCE_CONTENT_START")
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(true),
            front_matter_keywords: parse_keywords(
                &env::var("FRONT_MATTER_KEYWORDS").unwrap_or_default(),
            ),
            storage_dir: env::var("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir().join("sonify")),
            delivery_webhook_url: env::var("DELIVERY_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "52428800".to_string())
                .parse()?,
            job_retention_minutes: env::var("JOB_RETENTION_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn narration_settings(&self) -> NarrationSettings {
        NarrationSettings {
            max_chars: self.max_chars,
            concurrency: self.tts_concurrency,
            voice_id: self.voice_id.clone(),
            small_document_pages: self.small_document_pages,
            content_start: if self.force_content_start {
                ContentStartPolicy::ForceAfter(self.content_scan_pages)
            } else {
                ContentStartPolicy::Never
            },
        }
    }

    pub fn job_retention(&self) -> Duration {
        Duration::from_secs(self.job_retention_minutes * 60)
    }
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
