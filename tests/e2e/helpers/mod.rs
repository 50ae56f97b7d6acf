use axum::Router;
use sonify_backend::{
    controllers::narration::NarrationController,
    domain::{
        jobs::{JobRegistry, NarrationJobService},
        narration::{
            BoundaryClassifier, ContentStartPolicy, NarrationService, NarrationServiceApi,
            NarrationSettings,
        },
    },
    infrastructure::{
        extraction::{LopdfTextExtractor, TextExtractor},
        http::{create_router, RouterSettings},
        notifier::DeliveryNotifier,
        repositories::TtsRepository,
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use uuid::Uuid;

pub mod api_client;
pub mod tts_mocks;

use api_client::{ApiResponse, TestClient};
use tts_mocks::{RecordingNotifier, ScriptedTtsRepository};

pub const FRONTEND_URL: &str = "http://localhost:3000";

pub struct TestContext {
    pub client: TestClient,
    pub tts: Arc<ScriptedTtsRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub storage_dir: PathBuf,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let tts = Arc::new(ScriptedTtsRepository::new());
            let notifier = Arc::new(RecordingNotifier::default());
            let storage_dir = std::env::temp_dir().join(format!("sonify-e2e-{}", Uuid::new_v4()));

            let app = create_app(tts.clone(), notifier.clone(), storage_dir.clone());

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                tts,
                notifier,
                storage_dir,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            let _ = tokio::fs::remove_dir_all(&self.storage_dir).await;
        }
    }
}

impl TestContext {
    /// Poll a job until it leaves the queued/processing states
    pub async fn wait_for_job(&self, job_id: &str) -> ApiResponse {
        let path = format!("/api/narrations/{}", job_id);
        for _ in 0..100 {
            let response = self.client.get(&path).await.unwrap();
            let status = response
                .body
                .as_ref()
                .and_then(|body| body.get("status"))
                .and_then(|status| status.as_str())
                .map(str::to_string);

            match status.as_deref() {
                Some("completed") | Some("failed") => return response,
                _ => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        panic!("Job {} did not finish in time", job_id);
    }
}

fn create_app(
    tts: Arc<ScriptedTtsRepository>,
    notifier: Arc<RecordingNotifier>,
    storage_dir: PathBuf,
) -> Router {
    let settings = NarrationSettings {
        max_chars: 40,
        concurrency: 2,
        voice_id: "Matthew".to_string(),
        small_document_pages: 2,
        content_start: ContentStartPolicy::ForceAfter(10),
    };

    let extractor: Arc<dyn TextExtractor> = Arc::new(LopdfTextExtractor::new());
    let narration_service = Arc::new(NarrationService::new(
        tts as Arc<dyn TtsRepository>,
        BoundaryClassifier::default(),
        settings,
    ));
    let job_service = Arc::new(NarrationJobService::new(
        narration_service.clone() as Arc<dyn NarrationServiceApi>,
        extractor.clone(),
        notifier as Arc<dyn DeliveryNotifier>,
        JobRegistry::new(Duration::from_secs(300)),
        storage_dir,
    ));
    let narration_controller = Arc::new(NarrationController::new(
        narration_service.clone(),
        job_service,
        extractor,
    ));

    let router_settings = RouterSettings {
        frontend_url: FRONTEND_URL.to_string(),
        max_upload_bytes: 1024 * 1024,
    };

    create_router(&router_settings, narration_service, narration_controller)
}
