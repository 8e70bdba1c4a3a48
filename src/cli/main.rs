//! Watermark removal CLI
//!
//! Single-image command-line frontend over the pipeline orchestrator with a
//! progress bar wired to the progress reporter seam.

use crate::{
    config::{ExecutionProvider, ProcessorConfig, RegionRatios, DEFAULT_MODEL_INPUT_SIZE},
    models::ModelSource,
    processor::WatermarkRemovalProcessor,
    services::progress::{
        ConsoleProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
    },
    tracing_config::init_cli_tracing,
};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::{Path, PathBuf};

/// Watermark removal CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "watermark-inpaint")]
pub struct Cli {
    /// Input image file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path to the inpainting model file (.onnx)
    #[arg(short, long, value_name = "MODEL")]
    pub model: PathBuf,

    /// Output file [default: <input stem>-clean.png]
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Width ratio of the inference mask region (falls back to 0.15 when not a number)
    #[arg(long, value_name = "RATIO")]
    pub width_ratio: Option<String>,

    /// Height ratio of the inference mask region (falls back to 0.15 when not a number)
    #[arg(long, value_name = "RATIO")]
    pub height_ratio: Option<String>,

    /// Ratio of the extended blend region (falls back to 0.16 when not a number)
    #[arg(long, value_name = "RATIO")]
    pub extended_ratio: Option<String>,

    /// Execution provider (auto, cpu, cuda, coreml)
    #[arg(short, long, default_value = "auto")]
    pub execution_provider: String,

    /// Square model input resolution
    #[arg(long, default_value_t = DEFAULT_MODEL_INPUT_SIZE)]
    pub input_size: u32,

    /// Number of threads (0 = auto-detect optimal threading)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

/// Progress reporter driving an indicatif bar
struct BarProgressReporter {
    bar: ProgressBar,
}

impl BarProgressReporter {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    #[allow(dead_code)]
    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for BarProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        self.bar.set_position(u64::from(update.progress));
        self.bar.set_message(update.message);
    }

    fn report_error(&self, stage: PipelineStage, error: &str) {
        self.bar
            .abandon_with_message(format!("{}: {error}", stage.description()));
    }
}

/// Default output path: input stem with a `-clean.png` suffix
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned());
    input.with_file_name(format!("{stem}-clean.png"))
}

/// CLI entry point
///
/// # Errors
/// - Invalid arguments or configuration
/// - Any pipeline stage error
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_tracing(cli.verbose)?;
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let ratios = RegionRatios::from_overrides(
        cli.width_ratio.as_deref(),
        cli.height_ratio.as_deref(),
        cli.extended_ratio.as_deref(),
    );
    let provider: ExecutionProvider = cli
        .execution_provider
        .parse()
        .context("Invalid execution provider")?;

    let config = ProcessorConfig::builder()
        .model(ModelSource::File(cli.model.clone()))
        .ratios(ratios)
        .model_input_size(cli.input_size)
        .execution_provider(provider)
        .intra_threads(cli.threads)
        .build()
        .context("Invalid processor configuration")?;

    let mut processor =
        WatermarkRemovalProcessor::new(config).context("Failed to create processor")?;

    let bar = if cli.quiet {
        processor.set_progress_reporter(Box::new(ConsoleProgressReporter::new(cli.verbose > 0)));
        None
    } else {
        let reporter = BarProgressReporter::new();
        let bar_handle = reporter.bar.clone();
        processor.set_progress_reporter(Box::new(reporter));
        Some(bar_handle)
    };

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let output = processor
        .process_file(&cli.input)
        .await
        .with_context(|| format!("Failed to process '{}'", cli.input.display()))?
        .context("Pipeline rejected the run request")?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    output
        .save_png(&output_path)
        .with_context(|| format!("Failed to write '{}'", output_path.display()))?;

    info!(
        "Cleaned {}x{} image in {}ms (model load {}ms, inference {}ms)",
        output.original_dimensions.0,
        output.original_dimensions.1,
        output.timings.total_ms,
        output.timings.model_load_ms,
        output.timings.inference_ms
    );
    println!("{}", output_path.display());

    Ok(())
}
