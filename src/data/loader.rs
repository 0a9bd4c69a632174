// ============================================================
// Layer 4 — Annotation Loader
// ============================================================
// Reads the JSON annotation file that lists the training images
// and their class labels.
//
// Expected format (two parallel arrays):
//
//   {
//     "images":     ["0_0.png", "0_1.png", ...],
//     "categories": [0,         0,         ...]
//   }
//
// Where do the images live?
//   Image names in the file are relative. They are resolved
//   against, in order:
//     1. the configured image directory, if one was given
//     2. <annotation dir>/../train, if that directory exists
//        (the usual  data/annotations/ + data/train/  layout)
//     3. the annotation file's own directory
//   Absolute paths in the file are used as-is.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::domain::image_record::ImageRecord;
use crate::domain::traits::RecordSource;

/// On-disk shape of the annotation file
#[derive(Debug, Deserialize)]
struct AnnotationFile {
    images:     Vec<String>,
    categories: Vec<usize>,
}

/// Loads labelled image records from a JSON annotation file.
/// Implements the RecordSource trait from Layer 3.
pub struct AnnotationLoader {
    annotation_path: PathBuf,
    image_dir:       Option<PathBuf>,
    num_classes:     usize,
}

impl AnnotationLoader {
    pub fn new(annotation_path: impl Into<PathBuf>, num_classes: usize) -> Self {
        Self {
            annotation_path: annotation_path.into(),
            image_dir:       None,
            num_classes,
        }
    }

    /// Resolve image names against this directory instead of guessing
    pub fn with_image_dir(mut self, dir: Option<impl Into<PathBuf>>) -> Self {
        self.image_dir = dir.map(Into::into);
        self
    }

    /// The directory relative image names are joined onto
    pub fn image_root(&self) -> PathBuf {
        if let Some(dir) = &self.image_dir {
            return dir.clone();
        }

        let annotation_dir = self
            .annotation_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if let Some(data_dir) = annotation_dir.parent() {
            let train_dir = data_dir.join("train");
            if train_dir.is_dir() {
                return train_dir;
            }
        }

        annotation_dir
    }
}

impl RecordSource for AnnotationLoader {
    fn load_all(&self) -> Result<Vec<ImageRecord>> {
        let json = fs::read_to_string(&self.annotation_path).with_context(|| {
            format!(
                "Cannot read annotation file '{}'",
                self.annotation_path.display()
            )
        })?;

        let file: AnnotationFile = serde_json::from_str(&json).with_context(|| {
            format!(
                "Annotation file '{}' is not valid ({{\"images\": [..], \"categories\": [..]}} expected)",
                self.annotation_path.display()
            )
        })?;

        if file.images.len() != file.categories.len() {
            bail!(
                "Annotation file '{}' lists {} images but {} categories",
                self.annotation_path.display(),
                file.images.len(),
                file.categories.len()
            );
        }

        if let Some((idx, &label)) = file
            .categories
            .iter()
            .enumerate()
            .find(|(_, &label)| label >= self.num_classes)
        {
            bail!(
                "Label {} of '{}' is out of range for {} classes",
                label,
                file.images[idx],
                self.num_classes
            );
        }

        let root = self.image_root();
        tracing::debug!("Resolving images against '{}'", root.display());

        let records: Vec<ImageRecord> = file
            .images
            .into_iter()
            .zip(file.categories)
            .map(|(name, label)| ImageRecord::new(root.join(name), label))
            .collect();

        tracing::info!(
            "Loaded {} annotations from '{}'",
            records.len(),
            self.annotation_path.display()
        );
        Ok(records)
    }
}
