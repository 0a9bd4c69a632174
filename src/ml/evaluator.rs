// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Runs a model over a data loader without touching its
// parameters and reports mean loss and accuracy.
//
// Used for the validation phase of every epoch (with the
// model returned by model.valid(), i.e. on the inner backend
// with no autodiff graph) and by the `eval` command.

use burn::{
    data::dataloader::DataLoader,
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
};

use crate::data::batcher::ImageBatch;
use crate::domain::stats::{EpochStats, StatsAccumulator};
use crate::ml::model::{count_correct, Classifier};

pub fn evaluate<B, M>(model: &M, loader: &dyn DataLoader<ImageBatch<B>>, device: &B::Device) -> EpochStats
where
    B: Backend,
    M: Classifier<B>,
{
    let ce    = CrossEntropyLossConfig::new().init(device);
    let mut acc = StatsAccumulator::new();

    for batch in loader.iter() {
        let batch_size = batch.targets.dims()[0];
        let logits     = model.forward(batch.images);

        let loss: f64 = ce
            .forward(logits.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();
        let correct = count_correct(logits, batch.targets);

        acc.add_batch(loss, correct, batch_size);
    }

    acc.finish()
}
