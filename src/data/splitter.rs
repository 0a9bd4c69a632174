// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// One seeded permutation decides which images train and which
// validate. With an RNG built from the run's seed the split is
// reproducible, which is what lets `eval` rebuild the exact
// validation set a checkpoint was selected on.

use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `samples` with `rng`, then cut after the first
/// `round(len × train_fraction)` items: (train, validation).
pub fn split_train_val<T, R: Rng + ?Sized>(
    mut samples:    Vec<T>,
    train_fraction: f64,
    rng:            &mut R,
) -> (Vec<T>, Vec<T>) {
    samples.shuffle(rng);

    let cut = ((samples.len() as f64 * train_fraction).round() as usize).min(samples.len());
    let validation = samples.split_off(cut);

    tracing::debug!("Shuffled and cut at {cut}: {} / {}", samples.len(), validation.len());
    (samples, validation)
}
