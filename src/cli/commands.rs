// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `eval`, `plot` and `presets`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for bad values
//   - type conversion (string → usize, f64, ModelType, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use anyhow::{Error, Result};
use clap::{Args, Subcommand, ValueEnum};

use crate::application::config::{OptimizerKind, TrainConfig};
use crate::domain::model_type::ModelType;
use crate::infra::checkpoint::BEST_MODEL;

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a classifier from a preset or a JSON config
    Train(TrainArgs),

    /// Score a saved checkpoint on its run's validation split
    Eval(EvalArgs),

    /// Redraw the learning curves of a finished run
    Plot(PlotArgs),

    /// Print the built-in presets as JSON
    Presets(PresetsArgs),
}

/// Where tensors live
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// GPU through wgpu (Vulkan / Metal / DX12)
    #[default]
    Wgpu,
    /// CPU through ndarray
    Cpu,
}

/// All arguments for the `train` command.
/// Flags that are left out keep the preset / config file value.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Built-in configuration to start from: LeNet, ResNet or ResNet_18
    #[arg(long, default_value = "LeNet", conflicts_with = "config")]
    pub preset: ModelType,

    /// JSON config file to start from instead of a preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Annotation JSON file
    #[arg(long)]
    pub data_root: Option<String>,

    /// Directory image paths are relative to
    #[arg(long)]
    pub image_dir: Option<String>,

    /// Where checkpoints, logs and plots go
    #[arg(long)]
    pub save_dir: Option<String>,

    /// Number of full passes through the training data
    #[arg(long)]
    pub epochs: Option<usize>,

    /// Number of images per optimizer step
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Initial learning rate
    #[arg(long)]
    pub lr: Option<f64>,

    /// Seed for weight init, the split and shuffling
    #[arg(long)]
    pub seed: Option<u64>,

    /// sgd or adam
    #[arg(long)]
    pub optimizer: Option<OptimizerKind>,

    /// Data loader worker threads
    #[arg(long)]
    pub workers: Option<usize>,

    #[arg(long, value_enum, default_value_t = BackendKind::Wgpu)]
    pub backend: BackendKind,
}

/// Build the application-layer TrainConfig from the CLI args.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl TryFrom<TrainArgs> for TrainConfig {
    type Error = Error;

    fn try_from(a: TrainArgs) -> Result<Self> {
        let mut cfg = match &a.config {
            Some(path) => TrainConfig::from_json_file(path)?,
            None       => TrainConfig::preset(a.preset),
        };

        if let Some(v) = a.data_root  { cfg.data_root   = v; }
        if a.image_dir.is_some()      { cfg.image_dir   = a.image_dir; }
        if let Some(v) = a.save_dir   { cfg.save_dir    = v; }
        if let Some(v) = a.epochs     { cfg.num_epoch   = v; }
        if let Some(v) = a.batch_size { cfg.batch_size  = v; }
        if let Some(v) = a.lr         { cfg.lr          = v; }
        if let Some(v) = a.seed       { cfg.seed        = v; }
        if let Some(v) = a.optimizer  { cfg.optimizer   = v; }
        if let Some(v) = a.workers    { cfg.num_workers = v; }

        Ok(cfg)
    }
}

/// All arguments for the `eval` command
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Run directory written by `train`
    #[arg(long)]
    pub save_dir: PathBuf,

    /// Checkpoint to load, e.g. best_model or epoch_12
    #[arg(long, default_value = BEST_MODEL)]
    pub checkpoint: String,

    /// Override the annotation file saved with the run
    #[arg(long)]
    pub data_root: Option<String>,

    /// Override the image directory saved with the run
    #[arg(long)]
    pub image_dir: Option<String>,

    #[arg(long, value_enum, default_value_t = BackendKind::Wgpu)]
    pub backend: BackendKind,
}

/// All arguments for the `plot` command
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Run directory holding history.json
    #[arg(long)]
    pub save_dir: PathBuf,

    /// Write the PNGs here instead of the run directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// All arguments for the `presets` command
#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Only print this preset
    #[arg(long)]
    pub model: Option<ModelType>,
}
