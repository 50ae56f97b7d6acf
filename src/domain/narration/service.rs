use super::assembler::Assembler;
use super::classifier::BoundaryClassifier;
use super::error::NarrationError;
use super::model::{
    ContentState, Document, NarrationReport, NormalizedPage, PipelineState, Unit,
};
use super::normalizer::normalize_page;
use super::pool::SynthesisPool;
use super::segmenter::segment;
use super::sink::{AudioSink, SinkError};
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// What to do when no content start has been seen after scanning some pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStartPolicy {
    /// Keep scanning; a document without markers produces no audio
    Never,
    /// Start collecting at the page with this zero-based position
    ForceAfter(usize),
}

#[derive(Debug, Clone)]
pub struct NarrationSettings {
    pub max_chars: usize,
    pub concurrency: usize,
    pub voice_id: String,
    pub small_document_pages: usize,
    pub content_start: ContentStartPolicy,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            max_chars: 3000,
            concurrency: 2,
            voice_id: "Matthew".to_string(),
            small_document_pages: 2,
            content_start: ContentStartPolicy::ForceAfter(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDecision {
    Collect,
    SkipEmpty,
    SkipFrontMatter,
    SkipBeforeContent,
}

/// Latch deciding, page by page, whether narratable content has begun.
///
/// Starts open for small documents. Once open it never closes, even if a
/// later page looks like front matter.
pub struct ContentGate<'a> {
    classifier: &'a BoundaryClassifier,
    policy: ContentStartPolicy,
    content: ContentState,
    scanned: usize,
}

impl<'a> ContentGate<'a> {
    pub fn new(
        classifier: &'a BoundaryClassifier,
        policy: ContentStartPolicy,
        page_count: usize,
        small_document_pages: usize,
    ) -> Self {
        let mut content = ContentState::default();
        if page_count <= small_document_pages {
            content.latch();
        }

        Self {
            classifier,
            policy,
            content,
            scanned: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        if self.content.started() {
            PipelineState::Collecting
        } else {
            PipelineState::Scanning
        }
    }

    pub fn decide(&mut self, page: &NormalizedPage) -> PageDecision {
        let position = self.scanned;
        self.scanned += 1;

        if !self.content.started() {
            if let ContentStartPolicy::ForceAfter(limit) = self.policy {
                if position >= limit {
                    self.content.latch();
                    tracing::warn!(
                        page_index = page.index,
                        scanned_pages = position,
                        "No content start found, forcing collection"
                    );
                }
            }
        }

        if page.text.is_empty() {
            return PageDecision::SkipEmpty;
        }

        if self.content.started() {
            return PageDecision::Collect;
        }

        if self.classifier.is_front_matter(&page.text) {
            return PageDecision::SkipFrontMatter;
        }

        if self.classifier.signals_content_start(&page.text) {
            self.content.latch();
            tracing::info!(page_index = page.index, "Content start detected");
            return PageDecision::Collect;
        }

        PageDecision::SkipBeforeContent
    }
}

/// Tracks and logs the traversal state machine
struct Traversal<'a> {
    document: &'a str,
    state: PipelineState,
}

impl<'a> Traversal<'a> {
    fn new(document: &'a str) -> Self {
        Self {
            document,
            state: PipelineState::Scanning,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        if self.state == next {
            return;
        }
        tracing::debug!(
            document = %self.document,
            from = %self.state,
            to = %next,
            "Pipeline state transition"
        );
        self.state = next;
    }
}

pub struct NarrationService {
    tts_repo: Arc<dyn TtsRepository>,
    classifier: BoundaryClassifier,
    settings: NarrationSettings,
}

impl NarrationService {
    pub fn new(
        tts_repo: Arc<dyn TtsRepository>,
        classifier: BoundaryClassifier,
        settings: NarrationSettings,
    ) -> Self {
        Self {
            tts_repo,
            classifier,
            settings,
        }
    }

    pub fn settings(&self) -> &NarrationSettings {
        &self.settings
    }

    pub fn provider(&self) -> &'static str {
        self.tts_repo.provider()
    }
}

#[async_trait]
pub trait NarrationServiceApi: Send + Sync {
    /// Narrate a document into `sink`
    ///
    /// This operation:
    /// - Normalizes every page and skips front matter
    /// - Splits accepted text into units and synthesizes them concurrently
    /// - Writes the audio to the sink strictly in document order
    ///
    /// On any failure the sink is aborted and nothing is finished.
    async fn narrate(
        &self,
        document: &Document,
        sink: &mut dyn AudioSink,
    ) -> Result<NarrationReport, NarrationError>;
}

#[async_trait]
impl NarrationServiceApi for NarrationService {
    async fn narrate(
        &self,
        document: &Document,
        sink: &mut dyn AudioSink,
    ) -> Result<NarrationReport, NarrationError> {
        let start_time = Instant::now();
        let mut traversal = Traversal::new(&document.name);
        let mut report = NarrationReport {
            pages_total: document.page_count(),
            ..Default::default()
        };

        tracing::info!(
            document = %document.name,
            page_count = document.page_count(),
            provider = self.provider(),
            concurrency = self.settings.concurrency,
            "Starting narration"
        );

        if document.is_empty() {
            tracing::warn!(document = %document.name, "Document has no pages, nothing to narrate");
        }

        let units = self.plan_units(document, &mut traversal, &mut report);
        traversal.enter(PipelineState::Draining);

        if let Err(err) = self.drain(units, sink, &mut report).await {
            traversal.enter(PipelineState::Failed);
            tracing::error!(
                document = %document.name,
                error = %err,
                failed_sequence = ?err.failed_sequence(),
                "Narration failed"
            );
            sink.abort(&err.to_string()).await;
            return Err(err);
        }

        if let Err(err) = sink.finish().await {
            traversal.enter(PipelineState::Failed);
            let err = sink_error(err);
            tracing::error!(document = %document.name, error = %err, "Failed to finish output");
            sink.abort(&err.to_string()).await;
            return Err(err);
        }

        traversal.enter(PipelineState::Done);
        tracing::info!(
            document = %document.name,
            pages_narrated = report.pages_narrated,
            pages_skipped = report.pages_skipped,
            units = report.units,
            audio_size_bytes = report.audio_bytes,
            latency_ms = start_time.elapsed().as_millis(),
            "Narration completed"
        );

        Ok(report)
    }
}

impl NarrationService {
    /// Scan pages in order and turn accepted text into globally sequenced units
    fn plan_units(
        &self,
        document: &Document,
        traversal: &mut Traversal<'_>,
        report: &mut NarrationReport,
    ) -> Vec<Unit> {
        let mut gate = ContentGate::new(
            &self.classifier,
            self.settings.content_start,
            document.page_count(),
            self.settings.small_document_pages,
        );

        if gate.state() == PipelineState::Collecting {
            tracing::info!(
                document = %document.name,
                page_count = document.page_count(),
                "Small document, front matter filtering bypassed"
            );
        }
        traversal.enter(gate.state());

        let mut units = Vec::new();
        for page in &document.pages {
            let normalized = normalize_page(page);
            let decision = gate.decide(&normalized);
            traversal.enter(gate.state());

            if decision != PageDecision::Collect {
                report.pages_skipped += 1;
                tracing::debug!(page_index = page.index, decision = ?decision, "Skipping page");
                continue;
            }

            report.pages_narrated += 1;
            for text in segment(&normalized.text, self.settings.max_chars) {
                units.push(Unit {
                    sequence: units.len() as u64,
                    text,
                });
            }
        }

        tracing::info!(
            document = %document.name,
            unit_count = units.len(),
            pages_narrated = report.pages_narrated,
            pages_skipped = report.pages_skipped,
            "Pages scanned"
        );

        units
    }

    /// Synthesize units and write them to the sink in sequence order
    async fn drain(
        &self,
        units: Vec<Unit>,
        sink: &mut dyn AudioSink,
        report: &mut NarrationReport,
    ) -> Result<(), NarrationError> {
        let submitted = units.len() as u64;
        if submitted == 0 {
            return Ok(());
        }

        let pool = SynthesisPool::new(
            self.tts_repo.clone(),
            self.settings.voice_id.clone(),
            self.settings.concurrency,
        );
        let mut results = pool.synthesize_all(units);
        let mut assembler = Assembler::new();

        while let Some(result) = results.recv().await {
            for blob in assembler.accept(result?) {
                sink.write(&blob).await.map_err(sink_error)?;
                report.audio_bytes += blob.audio.len() as u64;
            }
            results.advance(assembler.next_expected());

            if assembler.is_complete(submitted) {
                break;
            }
        }

        if !assembler.is_complete(submitted) {
            return Err(NarrationError::Synthesis {
                sequence: assembler.next_expected(),
                reason: "worker exited without producing audio".to_string(),
            });
        }

        report.units = submitted;
        Ok(())
    }
}

fn sink_error(err: SinkError) -> NarrationError {
    match err {
        SinkError::Closed => NarrationError::Cancelled,
        SinkError::Write(msg) => NarrationError::SinkWrite(msg),
    }
}
