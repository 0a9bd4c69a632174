// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns of a training run:
//
//   checkpoint.rs — Saving and loading model weights with
//                   Burn's CompactRecorder, plus the run's
//                   TrainConfig as JSON so `eval` can rebuild
//                   the model and the validation split.
//
//   metrics.rs    — Per-epoch metric arrays (history.json) and
//                   the append-only human-readable run log.
//
//   plot.rs       — Learning-curve PNGs (plotters).
//
//   seed.rs       — One seed for backend init and data split.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Metrics history and run log
pub mod metrics;

/// Learning-curve rendering
pub mod plot;

/// Reproducible seeding
pub mod seed;
