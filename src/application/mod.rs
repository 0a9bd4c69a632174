// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training, evaluating a checkpoint, or
// re-drawing the learning curves of a finished run).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing or printing here (that's Layer 1)
//   - No direct file format handling (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Run configuration, presets and validation
pub mod config;

// The training workflow
pub mod train_use_case;

// Evaluating a saved checkpoint on the validation split
pub mod eval_use_case;

// Redrawing learning curves from history.json
pub mod plot_use_case;
