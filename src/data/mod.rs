// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the annotation file to device tensors:
//
//   train_annos.json
//       │
//       ▼
//   AnnotationLoader  → (image path, label) records
//       │
//       ▼
//   split_train_val   → seeded shuffle, train / validation
//       │
//       ▼
//   ImageDataset      → Burn Dataset, decodes images on demand
//       │               (ImagePreprocessor: resize + normalise)
//       ▼
//   ImageBatcher      → stacks items into [N, 3, H, W] batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop

/// Reads the JSON annotation file
pub mod loader;

/// Decodes, resizes and normalises images
pub mod preprocessor;

/// Implements Burn's Dataset trait for labelled images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle + train/validation split
pub mod splitter;
