// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// File naming convention (all inside the run's save directory):
//
//   save_dir/
//     epoch_0.mpk          ← weights after epoch 0
//     epoch_1.mpk          ← weights after epoch 1
//     ...
//     best_model.mpk       ← weights of the best validation epoch
//     train_config.json    ← the TrainConfig the run used
//
// Why save the config as well?
//   `eval` must rebuild the exact architecture (model type,
//   number of classes, image size) before loading weights
//   into it, and must re-create the same validation split
//   (annotation file + seed + ratio).
//
// CompactRecorder stores parameters as half-precision
// MessagePack; loading fails if the architecture doesn't match.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::CompactRecorder,
};

use crate::application::config::TrainConfig;

/// File stem of the best-validation checkpoint
pub const BEST_MODEL: &str = "best_model";

const CONFIG_FILE: &str = "train_config.json";
const RECORD_EXT:  &str = "mpk";

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory (and parents) if it doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `epoch_{i}`
    pub fn epoch_name(epoch: usize) -> String {
        format!("epoch_{epoch}")
    }

    /// Full path of a checkpoint as written by the recorder
    pub fn checkpoint_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{RECORD_EXT}"))
    }

    /// Save the weights after an epoch, unconditionally.
    pub fn save_epoch<B: Backend, M: Module<B>>(&self, model: &M, epoch: usize) -> Result<PathBuf> {
        self.save_named(model, &Self::epoch_name(epoch))
    }

    /// Overwrite the best-validation checkpoint.
    pub fn save_best<B: Backend, M: Module<B>>(&self, model: &M) -> Result<PathBuf> {
        self.save_named(model, BEST_MODEL)
    }

    fn save_named<B: Backend, M: Module<B>>(&self, model: &M, name: &str) -> Result<PathBuf> {
        // The recorder appends the extension itself
        let stem = self.dir.join(name);
        tracing::debug!("Saving model to '{}'", stem.display());

        model
            .clone()
            .save_file(stem.clone(), &CompactRecorder::new())
            .with_context(|| format!("Failed to save checkpoint to '{}'", stem.display()))?;

        Ok(self.checkpoint_path(name))
    }

    /// Load weights saved under `name` (e.g. "best_model", "epoch_3")
    /// into a freshly initialised model of the same architecture.
    pub fn load<B: Backend, M: Module<B>>(&self, model: M, name: &str, device: &B::Device) -> Result<M> {
        let stem = self.dir.join(name);
        tracing::info!("Loading model parameters from '{}'", self.checkpoint_path(name).display());

        model
            .load_file(stem.clone(), &CompactRecorder::new(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Has this run been trained?",
                    self.checkpoint_path(name).display()
                )
            })
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the configuration a previous run saved.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        TrainConfig::from_json_file(&path).with_context(|| {
            format!("Make sure '{}' holds a finished training run", self.dir.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model_type::ModelType;
    use crate::ml::lenet::{LeNet, LeNetConfig};
    use crate::ml::model::Classifier;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("run")).unwrap();

        let mut cfg = TrainConfig::preset(ModelType::ResNet);
        cfg.num_epoch = 4;
        ckpt.save_config(&cfg).unwrap();

        assert_eq!(ckpt.load_config().unwrap(), cfg);
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        assert!(ckpt.load_config().is_err());
    }

    #[test]
    fn test_weights_round_trip() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();
        let cfg    = LeNetConfig::new(3).with_image_size(16);

        let model: LeNet<TestBackend> = cfg.init(&device);
        let path = ckpt.save_epoch(&model, 2).unwrap();
        assert!(path.ends_with("epoch_2.mpk"));
        assert!(path.exists());

        let fresh: LeNet<TestBackend> = cfg.init(&device);
        let loaded = ckpt.load(fresh, "epoch_2", &device).unwrap();

        let input    = Tensor::<TestBackend, 4>::ones([1, 3, 16, 16], &device);
        let expected = model.forward(input.clone());
        let actual   = loaded.forward(input);

        // Half-precision storage: compare loosely
        let diff: f32 = (expected - actual).abs().max().into_scalar().elem::<f32>();
        assert!(diff < 1e-2, "max difference {diff}");
    }

    #[test]
    fn test_loading_unknown_checkpoint_fails() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();

        let model: LeNet<TestBackend> = LeNetConfig::new(3).init(&device);
        assert!(ckpt.load(model, BEST_MODEL, &device).is_err());
    }
}
