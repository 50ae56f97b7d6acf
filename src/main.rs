use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use sonify_backend::controllers::narration::NarrationController;
use sonify_backend::domain::jobs::{JobRegistry, NarrationJobService};
use sonify_backend::domain::narration::{BoundaryClassifier, NarrationService, NarrationServiceApi};
use sonify_backend::infrastructure::config::{Config, LogFormat, TtsProvider};
use sonify_backend::infrastructure::extraction::{LopdfTextExtractor, TextExtractor};
use sonify_backend::infrastructure::http::start_http_server;
use sonify_backend::infrastructure::notifier::{DeliveryNotifier, LogNotifier, WebhookNotifier};
use sonify_backend::infrastructure::repositories::{
    OpenAiTtsRepository, PollyTtsRepository, TtsRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Sonify Backend on {}:{}",
        config.host,
        config.port
    );

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate collaborators
    let tts_repo = create_tts_repository(&config).await?;
    let extractor: Arc<dyn TextExtractor> = Arc::new(LopdfTextExtractor::new());
    let notifier: Arc<dyn DeliveryNotifier> = match &config.delivery_webhook_url {
        Some(url) => {
            tracing::info!(url = %url, "Delivering narrations via webhook");
            Arc::new(WebhookNotifier::new(url.clone()))
        }
        None => {
            tracing::warn!("DELIVERY_WEBHOOK_URL not set, deliveries will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // 2. Instantiate services
    tracing::info!("Instantiating services...");
    let classifier =
        BoundaryClassifier::default().with_extra_keywords(config.front_matter_keywords.iter());
    let settings = config.narration_settings();
    tracing::info!(
        max_chars = settings.max_chars,
        concurrency = settings.concurrency,
        voice_id = %settings.voice_id,
        content_start = ?settings.content_start,
        "Narration settings loaded"
    );
    let narration_service = Arc::new(NarrationService::new(tts_repo, classifier, settings));
    let job_service = Arc::new(NarrationJobService::new(
        narration_service.clone() as Arc<dyn NarrationServiceApi>,
        extractor.clone(),
        notifier,
        JobRegistry::new(config.job_retention()),
        config.storage_dir.clone(),
    ));

    // 3. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let narration_controller = Arc::new(NarrationController::new(
        narration_service.clone(),
        job_service,
        extractor,
    ));

    // Start HTTP server with all routes
    start_http_server(Arc::new(config), narration_service, narration_controller).await?;

    Ok(())
}

async fn create_tts_repository(
    config: &Config,
) -> Result<Arc<dyn TtsRepository>, Box<dyn std::error::Error>> {
    match config.tts_provider {
        TtsProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;
            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            Ok(Arc::new(PollyTtsRepository::new(polly_client)))
        }
        TtsProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or("OPENAI_API_KEY is required when TTS_PROVIDER=openai")?;
            tracing::info!(model = %config.openai_tts_model, "Initializing OpenAI TTS client");

            let client = async_openai::Client::with_config(
                async_openai::config::OpenAIConfig::new().with_api_key(api_key),
            );
            Ok(Arc::new(OpenAiTtsRepository::new(
                Arc::new(client),
                config.openai_tts_model.clone(),
            )))
        }
    }
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "sonify_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "sonify_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
