// ============================================================
// Layer 3 — ImageRecord Domain Type
// ============================================================
// One labelled image as listed in the annotation file.
// Holds only the resolved path and the class index; pixel
// data is decoded later, lazily, by the data layer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single (image path, class label) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Absolute or working-directory-relative path to the image file
    pub path: PathBuf,

    /// Class index in `0..num_out`
    pub label: usize,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>, label: usize) -> Self {
        Self { path: path.into(), label }
    }
}
