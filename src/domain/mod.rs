// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that name the concepts
// of a training run.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Everything here is testable without a GPU or a dataset.

// The architectures a run can train
pub mod model_type;

// One labelled image from the annotation file
pub mod image_record;

// Loss / accuracy of one split over one epoch
pub mod stats;

// Core abstractions (traits) that other layers implement
pub mod traits;
