// ============================================================
// Layer 5 — Multi-step Learning-Rate Schedule
// ============================================================
// The learning rate starts at `base_lr` and is multiplied by
// `gamma` every time the epoch counter reaches a milestone:
//
//   lr(epoch) = base_lr × gamma^(milestones ≤ epoch)
//
// The trainer calls step() once at the end of each training
// phase, so with milestones [5, 10] and gamma 0.1:
//
//   epochs 0-4  → base_lr
//   epochs 5-9  → base_lr × 0.1
//   epochs 10+  → base_lr × 0.01

use burn::LearningRate;

#[derive(Debug, Clone)]
pub struct MultiStepLr {
    base_lr:    LearningRate,
    gamma:      f64,
    milestones: Vec<usize>,
    epoch:      usize,
}

impl MultiStepLr {
    pub fn new(base_lr: LearningRate, gamma: f64, milestones: Vec<usize>) -> Self {
        Self { base_lr, gamma, milestones, epoch: 0 }
    }

    /// Learning rate for an arbitrary epoch
    pub fn lr_at(&self, epoch: usize) -> LearningRate {
        let passed = self.milestones.iter().filter(|&&m| m <= epoch).count();
        self.base_lr * self.gamma.powi(passed as i32)
    }

    /// Learning rate for the epoch currently being trained
    pub fn current(&self) -> LearningRate {
        self.lr_at(self.epoch)
    }

    /// Move to the next epoch; returns the new rate
    pub fn step(&mut self) -> LearningRate {
        self.epoch += 1;
        let lr = self.current();
        if self.milestones.contains(&self.epoch) {
            tracing::info!("Learning rate decayed to {:.6} at epoch {}", lr, self.epoch);
        }
        lr
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_decays_at_each_milestone() {
        let sched = MultiStepLr::new(0.01, 0.1, vec![5, 10, 15, 20, 25]);
        assert!(close(sched.lr_at(0), 0.01));
        assert!(close(sched.lr_at(4), 0.01));
        assert!(close(sched.lr_at(5), 0.001));
        assert!(close(sched.lr_at(9), 0.001));
        assert!(close(sched.lr_at(10), 0.0001));
        assert!(close(sched.lr_at(29), 0.01 * 1e-5));
    }

    #[test]
    fn test_step_advances_current() {
        let mut sched = MultiStepLr::new(1.0, 0.5, vec![2]);
        assert!(close(sched.current(), 1.0));
        assert!(close(sched.step(), 1.0)); // now epoch 1
        assert!(close(sched.step(), 0.5)); // now epoch 2, a milestone
        assert_eq!(sched.epoch(), 2);
        assert!(close(sched.current(), 0.5));
    }

    #[test]
    fn test_no_milestones_keeps_rate() {
        let sched = MultiStepLr::new(0.3, 0.1, Vec::new());
        assert!(close(sched.lr_at(100), 0.3));
    }
}
