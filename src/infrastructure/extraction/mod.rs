pub mod lopdf_extractor;

pub use lopdf_extractor::LopdfTextExtractor;

use crate::domain::narration::{Document, Page};
use std::sync::Arc;

/// Turns an uploaded document into raw per-page text.
///
/// An unreadable document yields zero pages rather than an error.
pub trait TextExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Vec<Page>;
}

/// Run extraction on the blocking pool and wrap the pages into a document
pub async fn extract_document(
    extractor: Arc<dyn TextExtractor>,
    name: String,
    bytes: Vec<u8>,
) -> Result<Document, String> {
    let byte_count = bytes.len();
    let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&bytes))
        .await
        .map_err(|e| format!("Text extraction task failed: {}", e))?;

    tracing::info!(
        document = %name,
        byte_count,
        page_count = pages.len(),
        "Document text extracted"
    );

    Ok(Document::new(name, pages))
}
