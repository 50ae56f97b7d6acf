pub mod request_id;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, narration::NarrationController};
use crate::domain::narration::NarrationService;
use crate::infrastructure::config::Config;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Settings the router needs beyond its controllers
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub frontend_url: String,
    pub max_upload_bytes: usize,
}

impl From<&Config> for RouterSettings {
    fn from(config: &Config) -> Self {
        Self {
            frontend_url: config.frontend_url.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Build the application router with all routes and layers
pub fn create_router(
    settings: &RouterSettings,
    narration_service: Arc<NarrationService>,
    narration_controller: Arc<NarrationController>,
) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(narration_service);

    let narration_routes = Router::new()
        .route("/api/narrations", post(NarrationController::submit))
        .route("/api/narrations/stream", post(NarrationController::stream))
        .route("/api/narrations/:job_id", get(NarrationController::status))
        .route("/api/narrations/:job_id/audio", get(NarrationController::audio))
        .with_state(narration_controller)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_upload_bytes));

    Router::new()
        .merge(health_routes)
        .merge(narration_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(cors_layer(&settings.frontend_url)),
        )
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "Invalid FRONTEND_URL, CORS disabled");
            cors
        }
    }
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    narration_service: Arc<NarrationService>,
    narration_controller: Arc<NarrationController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(
        &RouterSettings::from(config.as_ref()),
        narration_service,
        narration_controller,
    );

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
