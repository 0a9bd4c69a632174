// ============================================================
// Layer 6 — Learning Curves
// ============================================================
// Renders per-epoch metrics as PNG line charts with plotters.
//
// Four files per run, named "{split} {metric}.png":
//
//   training acc.png      training loss.png
//   validation acc.png    validation loss.png
//
// Each chart is titled "{split} {metric}", with "epoch" on the
// x axis and the metric name on the y axis.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;

use crate::infra::metrics::MetricsHistory;

const WIDTH:  u32 = 640;
const HEIGHT: u32 = 480;

/// "training" / "validation"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Training,
    Validation,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Training   => "training",
            Split::Validation => "validation",
        }
    }
}

/// "acc" / "loss"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Acc,
    Loss,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Acc  => "acc",
            Metric::Loss => "loss",
        }
    }
}

/// `dir/"{split} {metric}.png"`
pub fn curve_path(dir: &Path, split: Split, metric: Metric) -> PathBuf {
    dir.join(format!("{} {}.png", split.as_str(), metric.as_str()))
}

/// y-axis range with a little headroom; never empty
fn y_range(ys: &[f32]) -> (f32, f32) {
    let finite = ys.iter().copied().filter(|y| y.is_finite());
    let (lo, hi) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| {
        (lo.min(y), hi.max(y))
    });

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}

/// Draw one learning curve and save it as a PNG.
pub fn plot_learning_curve(
    x:      &[usize],
    y:      &[f32],
    split:  Split,
    metric: Metric,
    dir:    &Path,
) -> Result<PathBuf> {
    let path  = curve_path(dir, split, metric);
    let title = format!("{} {}", split.as_str(), metric.as_str());

    let x_max = x.iter().copied().max().unwrap_or(0).max(1);
    let (y_lo, y_hi) = y_range(y);

    let root = BitMapBackend::new(&path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("Cannot draw '{title}': {e}"))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..x_max, y_lo..y_hi)
        .map_err(|e| anyhow!("Cannot draw '{title}': {e}"))?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc(metric.as_str())
        .draw()
        .map_err(|e| anyhow!("Cannot draw '{title}': {e}"))?;

    chart
        .draw_series(LineSeries::new(
            x.iter().copied().zip(y.iter().copied()),
            &BLUE,
        ))
        .map_err(|e| anyhow!("Cannot draw '{title}': {e}"))?;

    root.present()
        .map_err(|e| anyhow!("Cannot write '{}': {e}", path.display()))?;

    // The backend borrows `path` until it is dropped
    drop(chart);
    drop(root);

    tracing::debug!("Saved learning curve '{}'", path.display());
    Ok(path)
}

/// Draw all four curves of a run into `dir`.
pub fn plot_history(history: &MetricsHistory, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create plot directory '{}'", dir.display()))?;

    let x: Vec<usize> = (0..history.len()).collect();
    let curves = [
        (Split::Training,   Metric::Acc,  &history.train_acc),
        (Split::Training,   Metric::Loss, &history.train_loss),
        (Split::Validation, Metric::Acc,  &history.val_acc),
        (Split::Validation, Metric::Loss, &history.val_loss),
    ];

    curves
        .into_iter()
        .map(|(split, metric, y)| plot_learning_curve(&x, y, split, metric, dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_file_names() {
        let dir = Path::new("/runs/lenet");
        assert_eq!(
            curve_path(dir, Split::Training, Metric::Acc),
            PathBuf::from("/runs/lenet/training acc.png")
        );
        assert_eq!(
            curve_path(dir, Split::Validation, Metric::Loss),
            PathBuf::from("/runs/lenet/validation loss.png")
        );
    }

    #[test]
    fn test_y_range_is_never_empty() {
        let (lo, hi) = y_range(&[]);
        assert!(lo < hi);

        let (lo, hi) = y_range(&[0.5, 0.5, 0.5]);
        assert!(lo < 0.5 && hi > 0.5);

        let (lo, hi) = y_range(&[f32::NAN, 2.0, 1.0]);
        assert!(lo < 1.0 && hi > 2.0);
    }

    #[test]
    fn test_history_writes_four_pngs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("curves");

        let mut history = MetricsHistory::new(3);
        history.train_loss = vec![2.0, 1.2, 0.8];
        history.train_acc  = vec![0.3, 0.6, 0.8];
        history.val_loss   = vec![2.1, 1.5, 1.1];
        history.val_acc    = vec![0.25, 0.5, 0.7];

        let paths = plot_history(&history, &out).unwrap();
        assert_eq!(paths.len(), 4);

        for name in ["training acc", "training loss", "validation acc", "validation loss"] {
            let png = out.join(format!("{name}.png"));
            assert!(png.exists(), "missing {}", png.display());
            assert!(std::fs::metadata(&png).unwrap().len() > 0);
        }
    }
}
