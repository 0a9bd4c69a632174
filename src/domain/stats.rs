// ============================================================
// Layer 3 — Epoch Statistics
// ============================================================
// Loss and accuracy for one pass over a dataset split.
//
// Both the training phase and the validation phase of an
// epoch produce one EpochStats. They are built from running
// totals so that the loop only has to add numbers up:
//
//   loss     = Σ (batch mean loss) / samples
//   accuracy = correct predictions / samples
//
// An empty split yields loss 0 and accuracy 0 rather than NaN.

use serde::{Deserialize, Serialize};

/// Aggregated metrics for one split over one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EpochStats {
    /// Sum of the batch-mean losses divided by the sample count
    pub loss: f64,

    /// Fraction of samples whose argmax matched the label, in [0, 1]
    pub accuracy: f64,

    /// How many samples contributed
    pub samples: usize,
}

impl EpochStats {
    /// Build stats from running totals.
    ///
    /// `loss_sum` is the sum of the batches' mean losses. Dividing it
    /// by the number of samples (not batches) keeps the logged loss on
    /// the same scale as earlier runs of this harness.
    pub fn from_totals(loss_sum: f64, correct: usize, samples: usize) -> Self {
        if samples == 0 {
            return Self::default();
        }
        Self {
            loss:     loss_sum / samples as f64,
            accuracy: correct.min(samples) as f64 / samples as f64,
            samples,
        }
    }
}

/// Running totals accumulated batch by batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsAccumulator {
    loss_sum: f64,
    correct:  usize,
    samples:  usize,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one batch: its mean loss, how many it got right, and its size
    pub fn add_batch(&mut self, mean_loss: f64, correct: usize, batch_size: usize) {
        self.loss_sum += mean_loss;
        self.correct  += correct;
        self.samples  += batch_size;
    }

    pub fn finish(&self) -> EpochStats {
        EpochStats::from_totals(self.loss_sum, self.correct, self.samples)
    }
}

/// Highest validation accuracy so far and the epoch it came from.
///
/// Starts at 0 with no epoch, so a run whose accuracy never rises
/// above 0 never produces a best checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BestAccuracy {
    pub accuracy: f64,
    pub epoch:    Option<usize>,
}

impl BestAccuracy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an epoch's accuracy; true only on a strict improvement.
    pub fn observe(&mut self, epoch: usize, accuracy: f64) -> bool {
        if accuracy > self.accuracy {
            self.accuracy = accuracy;
            self.epoch    = Some(epoch);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_split_is_zero_not_nan() {
        let s = StatsAccumulator::new().finish();
        assert_eq!(s.loss, 0.0);
        assert_eq!(s.accuracy, 0.0);
        assert_eq!(s.samples, 0);
    }

    #[test]
    fn test_loss_sums_batch_means_over_samples() {
        let mut acc = StatsAccumulator::new();
        // A full batch of 16 and a trailing batch of 4
        acc.add_batch(1.0, 8, 16);
        acc.add_batch(2.0, 4, 4);
        let s = acc.finish();

        // (1.0 + 2.0) / 20 = 0.15
        assert!((s.loss - 0.15).abs() < 1e-12);
        assert!((s.accuracy - 0.6).abs() < 1e-12);
        assert_eq!(s.samples, 20);
    }

    #[test]
    fn test_accuracy_stays_in_unit_interval() {
        let s = EpochStats::from_totals(3.0, 10, 10);
        assert!((0.0..=1.0).contains(&s.accuracy));

        // Over-counted correct predictions are clamped
        let s = EpochStats::from_totals(3.0, 12, 10);
        assert_eq!(s.accuracy, 1.0);
    }

    #[test]
    fn test_best_moves_only_on_strict_improvement() {
        let mut best = BestAccuracy::new();

        assert!(best.observe(0, 0.5));
        assert!(!best.observe(1, 0.5), "a tie keeps the earlier epoch");
        assert!(!best.observe(2, 0.25));
        assert_eq!(best.epoch, Some(0));

        assert!(best.observe(3, 0.75));
        assert_eq!(best, BestAccuracy { accuracy: 0.75, epoch: Some(3) });
    }

    #[test]
    fn test_zero_accuracy_never_counts_as_best() {
        let mut best = BestAccuracy::new();
        assert!(!best.observe(0, 0.0));
        assert!(!best.observe(1, 0.0));
        assert_eq!(best.epoch, None);
    }
}
