// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// Turns an image file into the flat float buffer the batcher
// stacks into a [N, 3, H, W] tensor.
//
// Steps (applied in order):
//   1. Decode (PNG / JPEG) and convert to 8-bit RGB
//   2. Resize to image_size × image_size (bilinear)
//   3. Scale each channel to [0, 1]
//   4. Normalise: (x - mean) / std, per channel
//   5. Lay out channel-major (CHW): all R, then all G, then all B
//
// With the default mean = std = 0.5 the values end up in [-1, 1].

use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops::FilterType, RgbImage};

#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    image_size: u32,
    mean:       [f32; 3],
    std:        [f32; 3],
}

impl ImagePreprocessor {
    /// Resize to `image_size` and normalise with mean = std = 0.5
    pub fn new(image_size: usize) -> Self {
        Self {
            image_size: image_size as u32,
            mean:       [0.5; 3],
            std:        [0.5; 3],
        }
    }

    #[cfg(test)]
    pub fn with_normalization(mut self, mean: [f32; 3], std: [f32; 3]) -> Self {
        self.mean = mean;
        self.std  = std;
        self
    }

    pub fn image_size(&self) -> usize {
        self.image_size as usize
    }

    /// Number of floats one preprocessed image occupies
    pub fn item_len(&self) -> usize {
        3 * self.image_size() * self.image_size()
    }

    /// Decode an image file and return its normalised CHW pixels.
    pub fn load(&self, path: &Path) -> Result<Vec<f32>> {
        let img = image::open(path)
            .with_context(|| format!("Cannot decode image '{}'", path.display()))?;
        Ok(self.process(&img.to_rgb8()))
    }

    /// Cheap readability check: parses only the header.
    pub fn is_readable(path: &Path) -> bool {
        image::image_dimensions(path).is_ok()
    }

    /// Resize + normalise an already-decoded RGB image.
    pub fn process(&self, img: &RgbImage) -> Vec<f32> {
        let size = self.image_size;
        let resized;
        let img = if img.width() == size && img.height() == size {
            img
        } else {
            resized = image::imageops::resize(img, size, size, FilterType::Triangle);
            &resized
        };

        let plane = (size * size) as usize;
        let mut out = vec![0.0f32; 3 * plane];

        for (x, y, pixel) in img.enumerate_pixels() {
            let idx = (y * size + x) as usize;
            for c in 0..3 {
                let v = pixel.0[c] as f32 / 255.0;
                out[c * plane + idx] = (v - self.mean[c]) / self.std[c];
            }
        }
        out
    }
}
