// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for labelled images through this
// trait and never learns where they came from. The JSON
// annotation loader is the only implementation today; tests
// use a small in-memory source.

use anyhow::Result;

use crate::domain::image_record::ImageRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can list labelled images.
///
/// Implementations:
///   - AnnotationLoader → reads a JSON annotation file
pub trait RecordSource {
    /// Return every labelled image this source knows about,
    /// in a stable order (the split shuffles with its own seed).
    fn load_all(&self) -> Result<Vec<ImageRecord>>;
}

impl RecordSource for Vec<ImageRecord> {
    fn load_all(&self) -> Result<Vec<ImageRecord>> {
        Ok(self.clone())
    }
}
