// ============================================================
// Layer 2 — EvalUseCase
// ============================================================
// Re-scores a saved checkpoint on the validation split of the
// run that produced it:
//
//   1. Load train_config.json from the run directory
//   2. Rebuild the same split (same annotation file, same seed)
//   3. Rebuild the architecture and load the weights into it
//   4. Run the evaluator, no autodiff
//
// Runs on a plain Backend: evaluation never needs gradients.

use std::path::PathBuf;

use anyhow::{bail, Result};
use burn::prelude::*;

use crate::application::config::TrainConfig;
use crate::application::train_use_case::{annotation_source, load_split};
use crate::data::{batcher::ImageBatcher, dataset::ImageDataset, preprocessor::ImagePreprocessor};
use crate::domain::{model_type::ModelType, stats::EpochStats, traits::RecordSource};
use crate::infra::{
    checkpoint::{CheckpointManager, BEST_MODEL},
    seed::fixed_seed,
};
use crate::ml::{
    evaluator::evaluate,
    lenet::LeNetConfig,
    model::Classifier,
    resnet::ResNetConfig,
    trainer::build_loader,
};

/// Result of scoring one checkpoint
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub model_type: ModelType,
    pub checkpoint: PathBuf,
    pub stats:      EpochStats,
}

pub struct EvalUseCase {
    save_dir:   PathBuf,
    checkpoint: String,
    data_root:  Option<String>,
    image_dir:  Option<String>,
}

impl EvalUseCase {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir:   save_dir.into(),
            checkpoint: BEST_MODEL.to_string(),
            data_root:  None,
            image_dir:  None,
        }
    }

    /// Checkpoint stem to load, e.g. "epoch_3" (default "best_model")
    pub fn with_checkpoint(mut self, name: impl Into<String>) -> Self {
        self.checkpoint = name.into();
        self
    }

    /// Point at the annotations again if the data has moved since training
    pub fn with_data_root(mut self, data_root: Option<String>) -> Self {
        self.data_root = data_root;
        self
    }

    pub fn with_image_dir(mut self, image_dir: Option<String>) -> Self {
        self.image_dir = image_dir;
        self
    }

    /// The saved config with any data-location overrides applied
    pub fn load_config(&self) -> Result<TrainConfig> {
        if !self.save_dir.is_dir() {
            bail!("Run directory '{}' does not exist", self.save_dir.display());
        }

        let mut cfg = CheckpointManager::new(&self.save_dir)?.load_config()?;
        if let Some(root) = &self.data_root {
            cfg.data_root = root.clone();
        }
        if self.image_dir.is_some() {
            cfg.image_dir = self.image_dir.clone();
        }
        Ok(cfg)
    }

    pub fn execute<B: Backend>(&self, device: B::Device) -> Result<EvalReport> {
        let cfg = self.load_config()?;
        self.evaluate_split::<B>(&cfg, &annotation_source(&cfg), &device)
    }

    /// Same as `execute`, reading records from any source
    pub fn execute_with_source<B: Backend>(
        &self,
        source: &dyn RecordSource,
        device: B::Device,
    ) -> Result<EvalReport> {
        let cfg = self.load_config()?;
        self.evaluate_split::<B>(&cfg, source, &device)
    }

    fn evaluate_split<B: Backend>(
        &self,
        cfg:    &TrainConfig,
        source: &dyn RecordSource,
        device: &B::Device,
    ) -> Result<EvalReport> {
        let mut rng = fixed_seed::<B>(cfg.seed);
        let (_, val_records) = load_split(cfg, source, &mut rng)?;

        let dataset = ImageDataset::from_records(val_records, ImagePreprocessor::new(cfg.image_size));
        if dataset.records().is_empty() {
            bail!("The validation split is empty; nothing to evaluate");
        }

        let ckpt_manager = CheckpointManager::new(&self.save_dir)?;
        let stats = match cfg.model_type {
            ModelType::LeNet => {
                let model = LeNetConfig::new(cfg.num_out)
                    .with_image_size(cfg.image_size)
                    .init::<B>(device);
                self.score(cfg, model, dataset, &ckpt_manager, device)?
            }
            ModelType::ResNet => {
                let model = ResNetConfig::compact(cfg.num_out).init::<B>(device);
                self.score(cfg, model, dataset, &ckpt_manager, device)?
            }
            ModelType::ResNet18 => {
                let model = ResNetConfig::resnet18(cfg.num_out).init::<B>(device);
                self.score(cfg, model, dataset, &ckpt_manager, device)?
            }
        };

        tracing::info!(
            "{} on {} validation images: loss {:.4}, acc {:.4}",
            self.checkpoint, stats.samples, stats.loss, stats.accuracy
        );

        Ok(EvalReport {
            model_type: cfg.model_type,
            checkpoint: ckpt_manager.checkpoint_path(&self.checkpoint),
            stats,
        })
    }

    fn score<B: Backend, M: Classifier<B>>(
        &self,
        cfg:          &TrainConfig,
        model:        M,
        dataset:      ImageDataset,
        ckpt_manager: &CheckpointManager,
        device:       &B::Device,
    ) -> Result<EpochStats> {
        let model  = ckpt_manager.load(model, &self.checkpoint, device)?;
        let loader = build_loader(
            ImageBatcher::<B>::new(device.clone(), cfg.image_size),
            dataset,
            cfg.batch_size,
            None,
            cfg.num_workers,
        );
        Ok(evaluate(&model, loader.as_ref(), device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{
        tests::{small_config, write_images},
        TrainUseCase,
    };
    use burn::backend::{Autodiff, NdArray};

    #[test]
    fn test_scores_checkpoint_on_the_same_split() {
        let dir     = tempfile::tempdir().unwrap();
        let records = write_images(dir.path(), 12);
        let out     = dir.path().join("run");

        TrainUseCase::new(small_config(&out))
            .execute_with_source::<Autodiff<NdArray>>(&records, Default::default())
            .unwrap();

        let report = EvalUseCase::new(&out)
            .with_checkpoint("epoch_1")
            .execute_with_source::<NdArray>(&records, Default::default())
            .unwrap();

        assert_eq!(report.model_type, ModelType::LeNet);
        assert!(report.checkpoint.ends_with("epoch_1.mpk"));
        // 12 images at 0.75 → 3 held out
        assert_eq!(report.stats.samples, 3);
        assert!((0.0..=1.0).contains(&report.stats.accuracy));
        assert!(report.stats.loss.is_finite());
    }

    #[test]
    fn test_missing_run_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = EvalUseCase::new(dir.path().join("nope")).load_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_data_overrides_replace_saved_paths() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        ckpt.save_config(&small_config(dir.path())).unwrap();

        let cfg = EvalUseCase::new(dir.path())
            .with_data_root(Some("moved/annos.json".into()))
            .with_image_dir(Some("moved/images".into()))
            .load_config()
            .unwrap();

        assert_eq!(cfg.data_root, "moved/annos.json");
        assert_eq!(cfg.image_dir.as_deref(), Some("moved/images"));
    }
}
