// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that runs a network lives here: the model
// architectures, the optimizer and LR schedule, the epoch
// loop and the evaluator.
//
// What's in this layer:
//
//   model.rs     — The Classifier trait shared by all models
//                  plus argmax/accuracy helpers
//
//   lenet.rs     — LeNet: two conv + max-pool stages, three
//                  fully connected layers
//
//   resnet.rs    — Residual networks built from BasicBlocks:
//                  a compact 3-stage variant and ResNet-18
//
//   optim.rs     — SGD (momentum) / Adam configs, both with
//                  gradient-norm clipping
//
//   scheduler.rs — Multi-step learning-rate decay
//
//   evaluator.rs — Loss + accuracy over a loader, no updates
//
//   trainer.rs   — The training loop
//                  Forward pass, cross-entropy, backward pass,
//                  optimizer step, validation, logging and
//                  checkpoint saving per epoch
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            LeCun et al. (1998) Gradient-Based Learning
//            He et al. (2016) Deep Residual Learning

/// Shared classifier interface and prediction helpers
pub mod model;

/// LeNet architecture
pub mod lenet;

/// ResNet architectures
pub mod resnet;

/// Optimizer configuration
pub mod optim;

/// Multi-step learning-rate schedule
pub mod scheduler;

/// Evaluation pass without parameter updates
pub mod evaluator;

/// Full training loop with validation and checkpointing
pub mod trainer;
