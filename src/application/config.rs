// ============================================================
// Layer 2 — Training Configuration
// ============================================================
// All hyperparameters for a training run, plus the three
// built-in presets (LeNet, ResNet, ResNet_18).
//
// A config comes from one of three places, in order of
// precedence:
//   1. CLI overrides        (--lr, --epochs, ...)
//   2. a JSON config file   (--config my_run.json)
//   3. a built-in preset    (--preset ResNet_18)
//
// Serialisable so it can be saved next to the checkpoints and
// reloaded by `eval` to rebuild the exact same model and split.
// Missing keys in a JSON file fall back to the LeNet preset
// values thanks to #[serde(default)].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::model_type::ModelType;

/// Annotation file used by the presets
pub const DEFAULT_DATA_ROOT: &str = "./p2_data/annotations/train_annos.json";

/// Root under which each run gets a `<model_type>` directory
pub const DEFAULT_SAVE_ROOT: &str = "./save_dir";

// ─── OptimizerKind ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// SGD with momentum (the presets' choice)
    Sgd,
    Adam,
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizerKind::Sgd  => f.write_str("sgd"),
            OptimizerKind::Adam => f.write_str("adam"),
        }
    }
}

impl FromStr for OptimizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sgd"  => Ok(OptimizerKind::Sgd),
            "adam" => Ok(OptimizerKind::Adam),
            other  => Err(format!("unknown optimizer '{other}' (expected sgd or adam)")),
        }
    }
}

// ─── ConfigError ──────────────────────────────────────────────────────────────
/// A hyperparameter that cannot produce a meaningful run.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("split_ratio must be in (0, 1], got {0}")]
    SplitRatio(f64),

    #[error("batch_size must be greater than zero")]
    ZeroBatchSize,

    #[error("num_epoch must be greater than zero")]
    ZeroEpochs,

    #[error("num_out must be at least 2, got {0}")]
    TooFewClasses(usize),

    #[error("lr must be a positive finite number, got {0}")]
    LearningRate(f64),

    #[error("gamma must be in (0, 1], got {0}")]
    Gamma(f64),

    #[error("milestones must be strictly increasing, got {0:?}")]
    Milestones(Vec<usize>),

    #[error("max_grad_norm must be positive, got {0}")]
    GradNorm(f32),

    #[error("image_size must be at least {min} for {model}, got {got}")]
    ImageSize { model: ModelType, min: usize, got: usize },
}

// ─── TrainConfig ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub model_type:    ModelType,
    /// Path of the JSON annotation file
    pub data_root:     String,
    /// Directory image paths are resolved against (see AnnotationLoader)
    pub image_dir:     Option<String>,
    /// Fraction of samples used for training; the rest validate
    pub split_ratio:   f64,
    pub seed:          u64,
    pub batch_size:    usize,
    pub lr:            f64,
    /// Epoch indices at which the learning rate is multiplied by `gamma`
    pub milestones:    Vec<usize>,
    pub gamma:         f64,
    pub num_out:       usize,
    pub num_epoch:     usize,
    pub optimizer:     OptimizerKind,
    pub momentum:      f64,
    pub weight_decay:  f64,
    pub max_grad_norm: f32,
    /// Images are resized to image_size × image_size
    pub image_size:    usize,
    pub num_workers:   usize,
    /// Checkpoints, log, history and plots land here
    pub save_dir:      String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self::preset(ModelType::LeNet)
    }
}

impl TrainConfig {
    /// The built-in configuration for an architecture.
    /// All three presets share the same hyperparameters.
    pub fn preset(model_type: ModelType) -> Self {
        Self {
            model_type,
            data_root:     DEFAULT_DATA_ROOT.to_string(),
            image_dir:     None,
            split_ratio:   0.9,
            seed:          687,
            batch_size:    16,
            lr:            0.01,
            milestones:    vec![5, 10, 15, 20, 25],
            gamma:         0.1,
            num_out:       10,
            num_epoch:     30,
            optimizer:     OptimizerKind::Sgd,
            momentum:      0.9,
            weight_decay:  0.0,
            max_grad_norm: 5.0,
            image_size:    32,
            num_workers:   1,
            save_dir:      default_save_dir(model_type),
        }
    }

    /// Every preset, in the order `presets` prints them
    pub fn presets() -> Vec<Self> {
        ModelType::ALL.iter().map(|&m| Self::preset(m)).collect()
    }

    /// Load a config from a JSON file. Keys that are absent take
    /// the LeNet preset value.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
        let cfg: TrainConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config JSON in '{}'", path.display()))?;
        Ok(cfg)
    }

    /// Reject hyperparameters that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.split_ratio > 0.0 && self.split_ratio <= 1.0) {
            return Err(ConfigError::SplitRatio(self.split_ratio));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.num_epoch == 0 {
            return Err(ConfigError::ZeroEpochs);
        }
        if self.num_out < 2 {
            return Err(ConfigError::TooFewClasses(self.num_out));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(ConfigError::LearningRate(self.lr));
        }
        if !(self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(ConfigError::Gamma(self.gamma));
        }
        if self.milestones.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Milestones(self.milestones.clone()));
        }
        if !(self.max_grad_norm > 0.0) {
            return Err(ConfigError::GradNorm(self.max_grad_norm));
        }
        let min = min_image_size(self.model_type);
        if self.image_size < min {
            return Err(ConfigError::ImageSize {
                model: self.model_type,
                min,
                got: self.image_size,
            });
        }
        Ok(())
    }

    pub fn save_path(&self) -> PathBuf {
        PathBuf::from(&self.save_dir)
    }
}

/// `./save_dir/<model_type>`
pub fn default_save_dir(model_type: ModelType) -> String {
    Path::new(DEFAULT_SAVE_ROOT)
        .join(model_type.as_str())
        .to_string_lossy()
        .into_owned()
}

/// Smallest input LeNet's two unpadded 5×5 convolutions and
/// pools can take; the ResNets only need one pixel per stage.
fn min_image_size(model_type: ModelType) -> usize {
    match model_type {
        ModelType::LeNet => 16,
        ModelType::ResNet | ModelType::ResNet18 => 8,
    }
}
