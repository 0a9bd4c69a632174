// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Epoch loop with a training phase, an LR-schedule step, a
// validation phase, logging and checkpointing.
//
// Per epoch i:
//   1. train:    forward → cross-entropy → backward →
//                optimizer step (clips grad norm first)
//   2. scheduler.step()
//   3. validate: model.valid() on the inner backend, no autodiff
//   4. record metrics, print + append the run log block
//   5. save epoch_{i}; save best_model if val acc is a new maximum
//
// Burn notes:
//   - Training batches live on the AutodiffBackend B
//   - model.valid() returns the model on B::InnerBackend, so the
//     validation batcher must produce InnerBackend tensors
//   - argmax(1) returns [batch, 1]; see ml::model::predictions

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use burn::{
    data::{
        dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::config::TrainConfig;
use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::ImageItem,
};
use crate::domain::stats::{BestAccuracy, StatsAccumulator};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochReport, MetricsHistory, RunLog},
};
use crate::ml::{
    evaluator::evaluate,
    model::{count_correct, Classifier},
    scheduler::MultiStepLr,
};

/// What a finished run reports back to the use case
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub history:      MetricsHistory,
    /// Highest validation accuracy seen (0 if it never rose above 0)
    pub best_acc:     f64,
    /// Epoch best_model.mpk was saved from, if any
    pub best_epoch:   Option<usize>,
    pub elapsed_secs: f64,
}

/// Build a data loader; `shuffle` carries the seed for training loaders.
pub fn build_loader<B, D>(
    batcher:     ImageBatcher<B>,
    dataset:     D,
    batch_size:  usize,
    shuffle:     Option<u64>,
    num_workers: usize,
) -> Arc<dyn DataLoader<ImageBatch<B>>>
where
    B: Backend,
    D: Dataset<ImageItem> + 'static,
    ImageBatcher<B>: Batcher<ImageItem, ImageBatch<B>> + 'static,
{
    let mut builder = DataLoaderBuilder::new(batcher).batch_size(batch_size);
    if let Some(seed) = shuffle {
        builder = builder.shuffle(seed);
    }
    if num_workers > 0 {
        builder = builder.num_workers(num_workers);
    }
    builder.build(dataset)
}

fn progress_bar(batches: usize, epoch: usize) -> ProgressBar {
    let bar = ProgressBar::new(batches as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} batches",
    ) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar.set_prefix(format!("epoch {epoch}"));
    bar
}

#[allow(clippy::too_many_arguments)]
pub fn run_training<B, M, O, DT, DV>(
    cfg:           &TrainConfig,
    mut model:     M,
    mut optim:     O,
    train_dataset: DT,
    val_dataset:   DV,
    ckpt_manager:  &CheckpointManager,
    run_log:       &RunLog,
    device:        &B::Device,
) -> Result<TrainingSummary>
where
    B:  AutodiffBackend,
    M:  Classifier<B> + AutodiffModule<B>,
    M::InnerModule: Classifier<B::InnerBackend>,
    O:  Optimizer<M, B>,
    DT: Dataset<ImageItem> + 'static,
    DV: Dataset<ImageItem> + 'static,
{
    let train_batches = train_dataset.len().div_ceil(cfg.batch_size);

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = build_loader(
        ImageBatcher::<B>::new(device.clone(), cfg.image_size),
        train_dataset,
        cfg.batch_size,
        Some(cfg.seed),
        cfg.num_workers,
    );
    // Validation runs on the InnerBackend, without autodiff
    let val_loader = build_loader(
        ImageBatcher::<B::InnerBackend>::new(device.clone(), cfg.image_size),
        val_dataset,
        cfg.batch_size,
        None,
        cfg.num_workers,
    );

    let ce            = CrossEntropyLossConfig::new().init(device);
    let mut scheduler = MultiStepLr::new(cfg.lr, cfg.gamma, cfg.milestones.clone());
    let mut history   = MetricsHistory::new(cfg.num_epoch);
    let mut best      = BestAccuracy::new();

    let start_train = Instant::now();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.num_epoch {
        tracing::info!("epoch = {} (lr = {:.6})", scheduler.epoch(), scheduler.current());
        let start_epoch = Instant::now();

        // ── Training phase ────────────────────────────────────────────────────
        let lr       = scheduler.current();
        let progress = progress_bar(train_batches, epoch);
        let mut acc  = StatsAccumulator::new();

        for batch in train_loader.iter() {
            let batch_size = batch.targets.dims()[0];

            let logits = model.forward(batch.images);
            let loss   = ce.forward(logits.clone(), batch.targets.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            let correct       = count_correct(logits, batch.targets);

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(lr, model, grads);

            acc.add_batch(loss_val, correct, batch_size);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let train_stats = acc.finish();
        scheduler.step();

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let val_stats   = evaluate(&model_valid, val_loader.as_ref(), device);

        history.record(epoch, &train_stats, &val_stats);

        // ── Report ────────────────────────────────────────────────────────────
        let report = EpochReport {
            epoch,
            train:      train_stats,
            val:        val_stats,
            epoch_secs: start_epoch.elapsed().as_secs_f64(),
            total_secs: start_train.elapsed().as_secs_f64(),
        };
        println!("{}", "*".repeat(10));
        print!("{}", report.render());
        run_log.append(&report)?;

        // ── Checkpoints ───────────────────────────────────────────────────────
        ckpt_manager.save_epoch(&model_valid, epoch)?;

        if best.observe(epoch, val_stats.accuracy) {
            ckpt_manager.save_best(&model_valid)?;
            tracing::info!("New best val acc {:.4} at epoch {}", best.accuracy, epoch);
        }
    }

    let path = history.save(ckpt_manager.dir())?;
    tracing::info!(
        "Training complete! Metrics history in '{}', run log in '{}'",
        path.display(),
        run_log.path().display()
    );

    Ok(TrainingSummary {
        history,
        best_acc:   best.accuracy,
        best_epoch: best.epoch,
        elapsed_secs: start_train.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model_type::ModelType;
    use crate::infra::checkpoint::BEST_MODEL;
    use crate::ml::lenet::{LeNet, LeNetConfig};
    use crate::ml::optim;
    use burn::backend::{Autodiff, NdArray};
    use burn::data::dataset::InMemDataset;

    type TestBackend = Autodiff<NdArray>;

    const SIDE: usize = 16;

    /// Class 0 is a dark image, class 1 a bright one
    fn items(n: usize) -> Vec<ImageItem> {
        (0..n)
            .map(|i| {
                let label = i % 2;
                let value = if label == 0 { -1.0 } else { 1.0 };
                ImageItem { pixels: vec![value; 3 * SIDE * SIDE], label }
            })
            .collect()
    }

    fn test_config(epochs: usize) -> TrainConfig {
        let mut cfg = TrainConfig::preset(ModelType::LeNet);
        cfg.num_out     = 2;
        cfg.num_epoch   = epochs;
        cfg.batch_size  = 4;
        cfg.image_size  = SIDE;
        cfg.milestones  = vec![1];
        cfg.num_workers = 0;
        cfg
    }

    fn train(cfg: &TrainConfig, train: Vec<ImageItem>, val: Vec<ImageItem>, dir: &std::path::Path) -> TrainingSummary {
        let device = Default::default();
        let model: LeNet<TestBackend> = LeNetConfig::new(cfg.num_out)
            .with_image_size(cfg.image_size)
            .init(&device);
        let optim = optim::sgd(cfg).init::<TestBackend, LeNet<TestBackend>>();

        let ckpt = CheckpointManager::new(dir).unwrap();
        let log  = RunLog::new(dir).unwrap();

        run_training(
            cfg,
            model,
            optim,
            InMemDataset::new(train),
            InMemDataset::new(val),
            &ckpt,
            &log,
            &device,
        )
        .unwrap()
    }

    #[test]
    fn test_runs_every_epoch_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(2);

        let summary = train(&cfg, items(10), items(4), dir.path());

        assert_eq!(summary.history.len(), 2);
        for acc in summary.history.train_acc.iter().chain(&summary.history.val_acc) {
            assert!((0.0..=1.0).contains(acc));
        }
        assert!(summary.history.train_loss.iter().all(|l| l.is_finite() && *l > 0.0));

        assert!(dir.path().join("epoch_0.mpk").exists());
        assert!(dir.path().join("epoch_1.mpk").exists());
        assert!(dir.path().join("history.json").exists());

        let log = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
        assert_eq!(log.matches("============================").count(), 2);
    }

    /// Identical pixels under both labels: any model gets exactly one right
    fn ambiguous_pair() -> Vec<ImageItem> {
        (0..2)
            .map(|label| ImageItem { pixels: vec![0.25; 3 * SIDE * SIDE], label })
            .collect()
    }

    #[test]
    fn test_tied_accuracy_keeps_first_best_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(3);

        let summary = train(&cfg, items(12), ambiguous_pair(), dir.path());

        assert_eq!(summary.history.val_acc, vec![0.5, 0.5, 0.5]);
        assert_eq!(summary.best_epoch, Some(0));
        assert_eq!(summary.best_acc, 0.5);

        // best_model.mpk was written at epoch 0 and never overwritten
        let best   = std::fs::read(dir.path().join(format!("{BEST_MODEL}.mpk"))).unwrap();
        let epoch0 = std::fs::read(dir.path().join("epoch_0.mpk")).unwrap();
        assert_eq!(best, epoch0);
    }

    #[test]
    fn test_empty_validation_set_never_saves_best() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(1);

        let summary = train(&cfg, items(8), Vec::new(), dir.path());

        assert_eq!(summary.history.val_acc, vec![0.0]);
        assert_eq!(summary.history.val_loss, vec![0.0]);
        assert!(summary.best_epoch.is_none());
        assert!(!dir.path().join(format!("{BEST_MODEL}.mpk")).exists());
        assert!(dir.path().join("epoch_0.mpk").exists());
    }
}
