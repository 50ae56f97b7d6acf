use super::model::SynthesizedBlob;
use std::collections::BTreeMap;

/// Restores submission order over blobs that complete out of order.
///
/// Blobs are held until every lower sequence has been emitted; emission is
/// strictly increasing and contiguous starting at 0.
#[derive(Debug, Default)]
pub struct Assembler {
    next_expected: u64,
    pending: BTreeMap<u64, SynthesizedBlob>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer `blob` and return every blob that is now ready, in order
    pub fn accept(&mut self, blob: SynthesizedBlob) -> Vec<SynthesizedBlob> {
        if blob.sequence < self.next_expected || self.pending.contains_key(&blob.sequence) {
            tracing::warn!(
                sequence = blob.sequence,
                next_expected = self.next_expected,
                "Ignoring duplicate blob"
            );
            return Vec::new();
        }

        self.pending.insert(blob.sequence, blob);

        let mut ready = Vec::new();
        while let Some(blob) = self.pending.remove(&self.next_expected) {
            ready.push(blob);
            self.next_expected += 1;
        }

        if !self.pending.is_empty() {
            tracing::debug!(
                next_expected = self.next_expected,
                buffered = self.pending.len(),
                "Holding out-of-order blobs"
            );
        }

        ready
    }

    /// Number of blobs emitted so far, which is also the next sequence due
    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    /// True once all `submitted` sequences have been emitted exactly once
    pub fn is_complete(&self, submitted: u64) -> bool {
        self.next_expected == submitted && self.pending.is_empty()
    }
}
