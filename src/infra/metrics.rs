// ============================================================
// Layer 6 — Metrics History and Run Log
// ============================================================
// Two records of a training run:
//
//   MetricsHistory  — four per-epoch arrays (train/val loss and
//                     accuracy), allocated once for the whole
//                     run and indexed by epoch. Saved as
//                     history.json so learning curves can be
//                     redrawn later with the `plot` command.
//
//   RunLog          — an append-only, human-readable text file.
//                     One block per epoch:
//
//   epoch = 3
//   time = 0.0000 MIN 12.3456 SEC, total time = 0.0000 Min 49.1234 SEC
//   training loss : 1.2345  train acc = 0.5678
//   val loss : 1.3456  val acc = 0.5432
//   ============================
//
// The file is opened in append mode for every block, so
// re-running into the same directory keeps earlier runs.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::stats::EpochStats;

pub const HISTORY_FILE: &str = "history.json";
pub const LOG_FILE:     &str = "log.txt";

// ─── EpochReport ──────────────────────────────────────────────────────────────
/// Everything printed about one finished epoch
#[derive(Debug, Clone, Copy)]
pub struct EpochReport {
    /// Zero-based epoch index
    pub epoch:      usize,
    pub train:      EpochStats,
    pub val:        EpochStats,
    /// Wall-clock seconds spent in this epoch
    pub epoch_secs: f64,
    /// Wall-clock seconds since training started
    pub total_secs: f64,
}

impl EpochReport {
    /// The block appended to the run log (and echoed to stdout)
    pub fn render(&self) -> String {
        let (m, s)   = minutes_seconds(self.epoch_secs);
        let (tm, ts) = minutes_seconds(self.total_secs);

        format!(
            "epoch = {}\n\
             time = {m:.4} MIN {s:.4} SEC, total time = {tm:.4} Min {ts:.4} SEC\n\
             training loss : {:.4}  train acc = {:.4}\n\
             val loss : {:.4}  val acc = {:.4}\n\
             ============================\n",
            self.epoch,
            self.train.loss,
            self.train.accuracy,
            self.val.loss,
            self.val.accuracy,
        )
    }
}

/// Whole minutes and the remaining seconds
fn minutes_seconds(secs: f64) -> (f64, f64) {
    ((secs / 60.0).floor(), secs % 60.0)
}

// ─── RunLog ───────────────────────────────────────────────────────────────────
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;
        Ok(Self { path: dir.join(LOG_FILE) })
    }

    pub fn append(&self, report: &EpochReport) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Cannot open run log '{}'", self.path.display()))?;

        f.write_all(report.render().as_bytes())?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ─── MetricsHistory ───────────────────────────────────────────────────────────
/// Per-epoch metrics; every array has exactly `num_epoch` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsHistory {
    pub train_loss: Vec<f32>,
    pub train_acc:  Vec<f32>,
    pub val_loss:   Vec<f32>,
    pub val_acc:    Vec<f32>,
}

impl MetricsHistory {
    /// Zero-filled arrays for `num_epoch` epochs
    pub fn new(num_epoch: usize) -> Self {
        Self {
            train_loss: vec![0.0; num_epoch],
            train_acc:  vec![0.0; num_epoch],
            val_loss:   vec![0.0; num_epoch],
            val_acc:    vec![0.0; num_epoch],
        }
    }

    pub fn len(&self) -> usize {
        self.train_loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train_loss.is_empty()
    }

    /// Write one epoch's results. Panics if `epoch` is outside the run.
    pub fn record(&mut self, epoch: usize, train: &EpochStats, val: &EpochStats) {
        self.train_loss[epoch] = train.loss as f32;
        self.train_acc[epoch]  = train.accuracy as f32;
        self.val_loss[epoch]   = val.loss as f32;
        self.val_acc[epoch]    = val.accuracy as f32;
    }

    /// Epoch with the highest validation accuracy (first one on ties)
    pub fn best_val_acc(&self) -> Option<(usize, f32)> {
        self.val_acc
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (i, acc)| match best {
                Some((_, b)) if b >= acc => best,
                _ => Some((i, acc)),
            })
    }

    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(HISTORY_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Cannot write metrics history to '{}'", path.display()))?;
        tracing::debug!("Saved metrics history to '{}'", path.display());
        Ok(path)
    }

    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(HISTORY_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!("Cannot read '{}'. Has this run finished training?", path.display())
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn stats(loss: f64, accuracy: f64) -> EpochStats {
        EpochStats { loss, accuracy, samples: 10 }
    }

    #[test]
    fn test_render_matches_log_format() {
        let report = EpochReport {
            epoch:      3,
            train:      stats(1.23456, 0.5),
            val:        stats(2.0, 0.25),
            epoch_secs: 75.5,
            total_secs: 130.0,
        };

        let expected = "epoch = 3\n\
                        time = 1.0000 MIN 15.5000 SEC, total time = 2.0000 Min 10.0000 SEC\n\
                        training loss : 1.2346  train acc = 0.5000\n\
                        val loss : 2.0000  val acc = 0.2500\n\
                        ============================\n";
        assert_eq!(report.render(), expected);
    }

    #[test]
    fn test_run_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path()).unwrap();

        for epoch in 0..2 {
            log.append(&EpochReport {
                epoch,
                train: stats(1.0, 0.1),
                val: stats(1.0, 0.1),
                epoch_secs: 1.0,
                total_secs: 1.0 + epoch as f64,
            })
            .unwrap();
        }

        let text = fs::read_to_string(log.path()).unwrap();
        assert!(text.starts_with("epoch = 0\n"));
        assert!(text.contains("epoch = 1\n"));
        assert_eq!(text.matches("============================").count(), 2);
    }

    #[test]
    fn test_history_length_equals_epoch_count() {
        let h = MetricsHistory::new(30);
        assert_eq!(h.len(), 30);
        assert_eq!(h.val_acc.len(), 30);
        assert_eq!(h.train_loss.len(), 30);
    }

    #[test]
    fn test_record_and_best() {
        let mut h = MetricsHistory::new(3);
        h.record(0, &stats(2.0, 0.2), &stats(2.1, 0.3));
        h.record(1, &stats(1.5, 0.4), &stats(1.9, 0.6));
        h.record(2, &stats(1.0, 0.7), &stats(2.2, 0.6));

        assert_eq!(h.train_loss, vec![2.0, 1.5, 1.0]);
        assert_eq!(h.best_val_acc(), Some((1, 0.6)));
        assert_eq!(MetricsHistory::new(0).best_val_acc(), None);
    }

    #[test]
    fn test_history_round_trip() {
        let dir   = tempfile::tempdir().unwrap();
        let mut h = MetricsHistory::new(2);
        h.record(1, &stats(0.5, 0.75), &stats(0.6, 0.5));

        h.save(dir.path()).unwrap();
        assert_eq!(MetricsHistory::load(dir.path()).unwrap(), h);
    }
}
