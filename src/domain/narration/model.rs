use serde::{Deserialize, Serialize};

/// One physical page as produced by text extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub index: usize,
    pub raw_text: String,
}

impl Page {
    pub fn new(index: usize, raw_text: impl Into<String>) -> Self {
        Self {
            index,
            raw_text: raw_text.into(),
        }
    }
}

/// An uploaded document, pages in document order
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }

    /// Build a document from raw page texts, assigning indexes in order
    pub fn from_texts<I, S>(name: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| Page::new(index, text))
            .collect();
        Self::new(name, pages)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPage {
    pub index: usize,
    pub text: String,
}

/// Text submitted as a single synthesis call.
///
/// `sequence` is the global submission order across the whole document and
/// the only key used to restore order after concurrent synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub sequence: u64,
    pub text: String,
}

/// Audio produced for one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedBlob {
    pub sequence: u64,
    pub audio: Vec<u8>,
}

/// One-way latch recording whether narratable content has started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentState {
    started: bool,
}

impl ContentState {
    pub fn started(&self) -> bool {
        self.started
    }

    /// Flip to started. Returns true only on the transition itself.
    pub fn latch(&mut self) -> bool {
        let transitioned = !self.started;
        self.started = true;
        transitioned
    }
}

/// Lifecycle of a single document traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    Scanning,
    Collecting,
    Draining,
    Done,
    Failed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Scanning => "scanning",
            PipelineState::Collecting => "collecting",
            PipelineState::Draining => "draining",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Summary of a completed traversal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NarrationReport {
    pub pages_total: usize,
    pub pages_narrated: usize,
    pub pages_skipped: usize,
    pub units: u64,
    pub audio_bytes: u64,
}
