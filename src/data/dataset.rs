use burn::data::dataset::Dataset;

use crate::data::preprocessor::ImagePreprocessor;
use crate::domain::image_record::ImageRecord;

/// One preprocessed image: CHW floats plus its class index.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub pixels: Vec<f32>,
    pub label:  usize,
}

/// Images listed by the annotation file, decoded on demand.
///
/// Records whose file header cannot be parsed are dropped when
/// the dataset is built, so `len()` only counts usable images.
pub struct ImageDataset {
    records:      Vec<ImageRecord>,
    preprocessor: ImagePreprocessor,
}

impl ImageDataset {
    pub fn from_records(records: Vec<ImageRecord>, preprocessor: ImagePreprocessor) -> Self {
        let before = records.len();
        let records: Vec<ImageRecord> = records
            .into_iter()
            .filter(|r| {
                let ok = ImagePreprocessor::is_readable(&r.path);
                if !ok {
                    tracing::warn!("Skipping unreadable image '{}'", r.path.display());
                }
                ok
            })
            .collect();

        if records.len() < before {
            tracing::warn!("{} of {} images skipped", before - records.len(), before);
        }
        Self { records, preprocessor }
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }
}

impl Dataset<ImageItem> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        let record = self.records.get(index)?;
        // Headers were checked up front; a body that still fails to decode
        // becomes a blank image so the epoch keeps its sample count.
        let pixels = self.preprocessor.load(&record.path).unwrap_or_else(|e| {
            tracing::warn!("{e:#}");
            vec![0.0; self.preprocessor.item_len()]
        });
        Some(ImageItem { pixels, label: record.label })
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_skips_unreadable_and_decodes_the_rest() {
        let dir  = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad  = dir.path().join("bad.png");
        RgbImage::from_pixel(6, 6, Rgb([0, 255, 0])).save(&good).unwrap();
        std::fs::write(&bad, b"garbage").unwrap();

        let ds = ImageDataset::from_records(
            vec![
                ImageRecord::new(&good, 4),
                ImageRecord::new(&bad, 1),
                ImageRecord::new(dir.path().join("missing.png"), 2),
            ],
            ImagePreprocessor::new(4),
        );

        assert_eq!(ds.len(), 1);
        let item = ds.get(0).unwrap();
        assert_eq!(item.label, 4);
        assert_eq!(item.pixels.len(), 3 * 4 * 4);
        assert!(ds.get(1).is_none());
    }
}
