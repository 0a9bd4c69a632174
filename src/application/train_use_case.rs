// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the config
//   Step 2: Seed backend + RNG             (Layer 6 - infra)
//   Step 3: Load annotations               (Layer 4 - data)
//   Step 4: Seeded train/validation split  (Layer 4 - data)
//   Step 5: Build Burn datasets            (Layer 4 - data)
//   Step 6: Save config for `eval`         (Layer 6 - infra)
//   Step 7: Build model + optimizer, train (Layer 5 - ml)
//   Step 8: Plot learning curves           (Layer 6 - infra)
//
// Generic over the autodiff backend so the CLI can pick Wgpu
// or NdArray and tests can run on the CPU.

use anyhow::{bail, Result};
use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};
use rand::Rng;

use crate::application::config::{OptimizerKind, TrainConfig};
use crate::data::{
    dataset::ImageDataset,
    loader::AnnotationLoader,
    preprocessor::ImagePreprocessor,
    splitter::split_train_val,
};
use crate::domain::{image_record::ImageRecord, model_type::ModelType, traits::RecordSource};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::RunLog,
    plot::plot_history,
    seed::fixed_seed,
};
use crate::ml::{
    lenet::LeNetConfig,
    model::Classifier,
    optim,
    resnet::ResNetConfig,
    trainer::{run_training, TrainingSummary},
};

/// Read the annotations and split them the way every run with
/// this config does: the same seed always yields the same split.
pub fn load_split<R: Rng>(
    cfg:    &TrainConfig,
    source: &dyn RecordSource,
    rng:    &mut R,
) -> Result<(Vec<ImageRecord>, Vec<ImageRecord>)> {
    let records = source.load_all()?;
    if records.is_empty() {
        bail!("No images listed in '{}'", cfg.data_root);
    }

    let (train, val) = split_train_val(records, cfg.split_ratio, rng);
    tracing::info!("Split: {} train, {} validation", train.len(), val.len());
    Ok((train, val))
}

/// The annotation source a config points at
pub fn annotation_source(cfg: &TrainConfig) -> AnnotationLoader {
    AnnotationLoader::new(&cfg.data_root, cfg.num_out).with_image_dir(cfg.image_dir.as_ref())
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Execute the full training pipeline end to end
    pub fn execute<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainingSummary> {
        self.execute_with_source::<B>(&annotation_source(&self.config), device)
    }

    /// Same as `execute`, reading records from any source
    pub fn execute_with_source<B: AutodiffBackend>(
        &self,
        source: &dyn RecordSource,
        device: B::Device,
    ) -> Result<TrainingSummary> {
        let cfg = &self.config;

        // ── Step 1: Validate ─────────────────────────────────────────────────
        cfg.validate()?;
        tracing::info!(
            "Training {} for {} epochs (batch {}, lr {}, {})",
            cfg.model_type, cfg.num_epoch, cfg.batch_size, cfg.lr, cfg.optimizer
        );

        // ── Step 2: Seed ──────────────────────────────────────────────────────
        let mut rng = fixed_seed::<B>(cfg.seed);

        // ── Steps 3-4: Annotations + split ────────────────────────────────────
        let (train_records, val_records) = load_split(cfg, source, &mut rng)?;

        // ── Step 5: Datasets ──────────────────────────────────────────────────
        let preprocessor  = ImagePreprocessor::new(cfg.image_size);
        let train_dataset = ImageDataset::from_records(train_records, preprocessor.clone());
        let val_dataset   = ImageDataset::from_records(val_records, preprocessor);
        if train_dataset.records().is_empty() {
            bail!("None of the training images could be read");
        }

        // ── Step 6: Output directory + config ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(cfg.save_path())?;
        ckpt_manager.save_config(cfg)?;
        let run_log = RunLog::new(cfg.save_path())?;

        // ── Step 7: Train ─────────────────────────────────────────────────────
        let summary = train_model::<B>(cfg, train_dataset, val_dataset, &ckpt_manager, &run_log, &device)?;

        // ── Step 8: Learning curves ───────────────────────────────────────────
        // history.json is already on disk; `plot` can redo this
        match plot_history(&summary.history, ckpt_manager.dir()) {
            Ok(paths) => tracing::info!("Saved {} learning curves", paths.len()),
            Err(e)    => tracing::warn!("Could not draw learning curves: {e:#}"),
        }

        Ok(summary)
    }
}

fn train_model<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    run_log:       &RunLog,
    device:        &B::Device,
) -> Result<TrainingSummary> {
    match cfg.model_type {
        ModelType::LeNet => {
            let model = LeNetConfig::new(cfg.num_out)
                .with_image_size(cfg.image_size)
                .init::<B>(device);
            with_optimizer(cfg, model, train_dataset, val_dataset, ckpt_manager, run_log, device)
        }
        ModelType::ResNet => {
            let model = ResNetConfig::compact(cfg.num_out).init::<B>(device);
            with_optimizer(cfg, model, train_dataset, val_dataset, ckpt_manager, run_log, device)
        }
        ModelType::ResNet18 => {
            let model = ResNetConfig::resnet18(cfg.num_out).init::<B>(device);
            with_optimizer(cfg, model, train_dataset, val_dataset, ckpt_manager, run_log, device)
        }
    }
}

fn with_optimizer<B, M>(
    cfg:           &TrainConfig,
    model:         M,
    train_dataset: ImageDataset,
    val_dataset:   ImageDataset,
    ckpt_manager:  &CheckpointManager,
    run_log:       &RunLog,
    device:        &B::Device,
) -> Result<TrainingSummary>
where
    B: AutodiffBackend,
    M: Classifier<B> + AutodiffModule<B>,
    M::InnerModule: Classifier<B::InnerBackend>,
{
    tracing::info!("Model ready: {} ({} parameters)", cfg.model_type, model.num_params());

    match cfg.optimizer {
        OptimizerKind::Sgd => {
            let optim = optim::sgd(cfg).init::<B, M>();
            run_training(cfg, model, optim, train_dataset, val_dataset, ckpt_manager, run_log, device)
        }
        OptimizerKind::Adam => {
            let optim = optim::adam(cfg).init::<B, M>();
            run_training(cfg, model, optim, train_dataset, val_dataset, ckpt_manager, run_log, device)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use image::{Rgb, RgbImage};
    use std::path::Path;

    type TestBackend = Autodiff<NdArray>;

    /// Write `n` tiny PNGs alternating between two classes
    pub(crate) fn write_images(dir: &Path, n: usize) -> Vec<ImageRecord> {
        (0..n)
            .map(|i| {
                let label = i % 2;
                let shade = if label == 0 { 20 } else { 235 };
                let path  = dir.join(format!("{i}.png"));
                RgbImage::from_pixel(20, 20, Rgb([shade, shade, shade])).save(&path).unwrap();
                ImageRecord::new(path, label)
            })
            .collect()
    }

    pub(crate) fn small_config(save_dir: &Path) -> TrainConfig {
        let mut cfg = TrainConfig::preset(ModelType::LeNet);
        cfg.num_out     = 2;
        cfg.num_epoch   = 2;
        cfg.batch_size  = 4;
        cfg.image_size  = 16;
        cfg.milestones  = vec![1];
        cfg.split_ratio = 0.75;
        cfg.num_workers = 0;
        cfg.save_dir    = save_dir.to_string_lossy().into_owned();
        cfg
    }

    #[test]
    fn test_end_to_end_writes_run_artifacts() {
        let dir     = tempfile::tempdir().unwrap();
        let records = write_images(dir.path(), 12);
        let out     = dir.path().join("run");

        let use_case = TrainUseCase::new(small_config(&out));
        let summary  = use_case
            .execute_with_source::<TestBackend>(&records, Default::default())
            .unwrap();

        assert_eq!(summary.history.len(), 2);
        assert!(out.join("train_config.json").exists());
        assert!(out.join("history.json").exists());
        assert!(out.join("log.txt").exists());
        assert!(out.join("epoch_1.mpk").exists());
    }

    #[test]
    fn test_split_is_reproducible() {
        let cfg     = small_config(Path::new("unused"));
        let records: Vec<ImageRecord> = (0..20).map(|i| ImageRecord::new(format!("{i}.png"), i % 2)).collect();

        let a = load_split(&cfg, &records, &mut fixed_seed::<NdArray>(cfg.seed)).unwrap();
        let b = load_split(&cfg, &records, &mut fixed_seed::<NdArray>(cfg.seed)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 15);
        assert_eq!(a.1.len(), 5);
    }

    #[test]
    fn test_rejects_invalid_config_before_reading_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = small_config(dir.path());
        cfg.batch_size = 0;

        let empty: Vec<ImageRecord> = Vec::new();
        let err = TrainUseCase::new(cfg)
            .execute_with_source::<TestBackend>(&empty, Default::default())
            .unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_empty_annotation_list_is_an_error() {
        let dir   = tempfile::tempdir().unwrap();
        let empty: Vec<ImageRecord> = Vec::new();

        let result = TrainUseCase::new(small_config(dir.path()))
            .execute_with_source::<TestBackend>(&empty, Default::default());
        assert!(result.is_err());
    }
}
