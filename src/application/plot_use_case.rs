// ============================================================
// Layer 2 — PlotUseCase
// ============================================================
// Redraws the four learning curves of a finished run from its
// history.json, e.g. after the PNGs were deleted or when the
// training host had no fonts available.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::infra::{metrics::MetricsHistory, plot::plot_history};

pub struct PlotUseCase {
    save_dir: PathBuf,
    out_dir:  Option<PathBuf>,
}

impl PlotUseCase {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self { save_dir: save_dir.into(), out_dir: None }
    }

    /// Write the PNGs somewhere other than the run directory
    pub fn with_out_dir(mut self, out_dir: Option<PathBuf>) -> Self {
        self.out_dir = out_dir;
        self
    }

    pub fn out_dir(&self) -> &Path {
        self.out_dir.as_deref().unwrap_or(&self.save_dir)
    }

    pub fn load_history(&self) -> Result<MetricsHistory> {
        let history = MetricsHistory::load(&self.save_dir)?;
        if history.is_empty() {
            bail!("'{}' has no recorded epochs", self.save_dir.display());
        }
        Ok(history)
    }

    pub fn execute(&self) -> Result<Vec<PathBuf>> {
        let history = self.load_history()?;
        tracing::info!("Plotting {} epochs from '{}'", history.len(), self.save_dir.display());
        plot_history(&history, self.out_dir())
    }
}
