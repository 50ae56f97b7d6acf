use super::TextExtractor;
use crate::domain::narration::Page;

/// PDF text extraction using lopdf
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextExtractor;

impl LopdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for LopdfTextExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Vec<Page> {
        let document = match lopdf::Document::load_mem(bytes) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load PDF, treating as empty document");
                return Vec::new();
            }
        };

        // Page numbers are 1-based and come back in document order
        document
            .get_pages()
            .keys()
            .enumerate()
            .map(|(index, &page_number)| {
                let raw_text = document.extract_text(&[page_number]).unwrap_or_else(|e| {
                    tracing::warn!(page_number, error = %e, "Failed to extract page text");
                    String::new()
                });
                Page::new(index, raw_text)
            })
            .collect()
    }
}
