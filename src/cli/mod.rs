// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `train`   — trains a classifier from a preset or config
//   2. `eval`    — scores a saved checkpoint
//   3. `plot`    — redraws learning curves from history.json
//   4. `presets` — prints the built-in configurations
//
// This layer also picks the Burn backend (--backend wgpu|cpu);
// the use cases below are generic over it.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use burn::backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu};
use clap::Parser;
use commands::{BackendKind, Commands, EvalArgs, PlotArgs, PresetsArgs, TrainArgs};

use crate::application::config::TrainConfig;

type GpuBackend = Wgpu;
type CpuBackend = NdArray;

/// The main CLI struct. clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "image-cls-trainer",
    version,
    about = "Train LeNet / ResNet image classifiers, evaluate checkpoints and plot learning curves."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Eval(args)    => run_eval(args),
            Commands::Plot(args)    => run_plot(args),
            Commands::Presets(args) => run_presets(args),
        }
    }
}

/// Handles the `train` subcommand.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let backend  = args.backend;
    let use_case = TrainUseCase::new(TrainConfig::try_from(args)?);
    tracing::info!(
        "Starting {} training on '{}' ({:?} backend)",
        use_case.config().model_type, use_case.config().data_root, backend
    );

    let summary = match backend {
        BackendKind::Wgpu => use_case.execute::<Autodiff<GpuBackend>>(WgpuDevice::default())?,
        BackendKind::Cpu  => use_case.execute::<Autodiff<CpuBackend>>(NdArrayDevice::default())?,
    };

    println!("\nTraining complete in {:.1} s.", summary.elapsed_secs);
    match summary.best_epoch {
        Some(epoch) => println!("Best val acc = {:.4} (epoch {epoch})", summary.best_acc),
        None        => println!("Validation accuracy never rose above 0; no best_model saved."),
    }
    println!("Outputs written to '{}'", use_case.config().save_dir);
    Ok(())
}

/// Handles the `eval` subcommand.
fn run_eval(args: EvalArgs) -> Result<()> {
    use crate::application::eval_use_case::EvalUseCase;

    let use_case = EvalUseCase::new(&args.save_dir)
        .with_checkpoint(args.checkpoint)
        .with_data_root(args.data_root)
        .with_image_dir(args.image_dir);

    let report = match args.backend {
        BackendKind::Wgpu => use_case.execute::<GpuBackend>(WgpuDevice::default())?,
        BackendKind::Cpu  => use_case.execute::<CpuBackend>(NdArrayDevice::default())?,
    };

    println!("\n{} ({})", report.checkpoint.display(), report.model_type);
    println!(
        "val loss : {:.4}  val acc = {:.4}  ({} images)",
        report.stats.loss, report.stats.accuracy, report.stats.samples
    );
    Ok(())
}

/// Handles the `plot` subcommand.
fn run_plot(args: PlotArgs) -> Result<()> {
    use crate::application::plot_use_case::PlotUseCase;

    let paths = PlotUseCase::new(args.save_dir)
        .with_out_dir(args.out_dir)
        .execute()?;

    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}

/// Handles the `presets` subcommand.
fn run_presets(args: PresetsArgs) -> Result<()> {
    let presets = match args.model {
        Some(model) => vec![TrainConfig::preset(model)],
        None        => TrainConfig::presets(),
    };

    for preset in presets {
        println!("{}", serde_json::to_string_pretty(&preset)?);
    }
    Ok(())
}
