use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use gui_bridge::bridge::{default_bind_address, GuiBridge};
use h1core::math::beam;
use h1core::scan::ScanOutcome;
use h1core::SkyPoint;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use workflow::assembly::{self, DEFAULT_HISTOGRAM_BINS};
use workflow::config::SurveyConfig;
use workflow::runner::Runner;

mod gui_bridge;
mod simulation;
mod workflow;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Hydrogen-line sky survey driver",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a grid survey around the mount's current pointing
    Scan(ScanArgs),
    /// Grid a saved survey into an image and intensity histogram
    Assemble(AssembleArgs),
    /// Point the mount at a coordinate and wait for it to arrive
    Slew(SlewArgs),
    /// Compute pointing spacing from wavelength, dish size and beam overlap
    Spacing(SpacingArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Load the survey config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Folder receiving the dataset and error log
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    /// Grid spacing in degrees
    #[arg(long)]
    spacing: Option<f64>,
    /// Integration time per pointing in seconds
    #[arg(long)]
    averaging: Option<f64>,
    /// Half-width of the integration band in Hz (0 = nearest bin)
    #[arg(long)]
    bandwidth: Option<f64>,
    /// Keep an HTTP status endpoint (GET /scan) alive during the scan
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value_t = default_bind_address())]
    bind: SocketAddr,
}

#[derive(Args)]
struct AssembleArgs {
    /// Saved survey JSON file
    dataset: PathBuf,
    /// Cell spacing in degrees; defaults to the survey's grid spacing
    #[arg(long)]
    spacing: Option<f64>,
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    bins: usize,
    /// Print the image as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args)]
struct SlewArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Target right ascension in degrees
    #[arg(long)]
    ra: f64,
    /// Target declination in degrees
    #[arg(long, allow_hyphen_values = true)]
    dec: f64,
}

#[derive(Args)]
struct SpacingArgs {
    /// Observed wavelength in meters
    #[arg(long, default_value_t = 0.21)]
    wavelength: f64,
    /// Dish diameter in meters
    #[arg(long)]
    diameter: f64,
    /// Beam overlap between neighbouring cells, in percent
    #[arg(long, default_value_t = 0.0)]
    overlap: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    match Cli::parse().command {
        Command::Scan(args) => run_scan(args),
        Command::Assemble(args) => run_assemble(args),
        Command::Slew(args) => run_slew(args),
        Command::Spacing(args) => {
            let spacing = beam::grid_spacing(args.wavelength, args.diameter, args.overlap)
                .context("computing grid spacing")?;
            println!("Grid spacing: {:.4} deg", spacing);
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<SurveyConfig> {
    match path {
        Some(path) => SurveyConfig::load(path),
        None => Ok(SurveyConfig::default()),
    }
}

fn current_thread_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    TokioBuilder::new_current_thread()
        .enable_all()
        .build()
        .context("creating survey runtime")
}

fn run_scan(args: ScanArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config)?;
    if let Some(output) = args.output {
        config.output_folder = Some(output);
    }
    if let Some(width) = args.width {
        config.grid_width = width;
    }
    if let Some(height) = args.height {
        config.grid_height = height;
    }
    if let Some(spacing) = args.spacing {
        config.grid_spacing = spacing;
    }
    if let Some(averaging) = args.averaging {
        config.total_averaging_time = averaging;
    }
    if let Some(bandwidth) = args.bandwidth {
        config.bandwidth = bandwidth;
    }

    let runner = Runner::new(config);
    let bridge = GuiBridge::new(&runner.config().grid());
    if args.serve {
        bridge.serve(args.bind);
    }

    let runtime = current_thread_runtime()?;
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    runtime.spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, stopping after the current point");
            on_interrupt.cancel();
        }
    });

    let report = runtime.block_on(runner.run_scan(Some(bridge.clone()), cancel))?;

    let readings = report
        .dataset
        .as_ref()
        .map_or(0, |dataset| dataset.measurements.len());
    bridge.publish_status(&format!(
        "{:?}: {} readings, {} failed points",
        report.outcome.kind(),
        readings,
        report.metrics.failed
    ));
    if let Some(path) = &report.saved_to {
        println!("Survey saved to {}", path.display());
    }
    if let Some(err) = report.persist_error {
        return Err(err).context("saving survey dataset");
    }
    match report.outcome {
        ScanOutcome::Aborted(err) => Err(err).context("survey aborted"),
        ScanOutcome::Completed | ScanOutcome::Cancelled => Ok(()),
    }
}

fn run_assemble(args: AssembleArgs) -> anyhow::Result<()> {
    let assembled = assembly::assemble_file(&args.dataset, args.spacing, args.bins)?;
    if args.json {
        let encoded = serde_json::to_string_pretty(&assembly::image_json(&assembled.image))
            .context("encoding image")?;
        println!("{}", encoded);
        return Ok(());
    }

    println!(
        "{} readings, {}x{} cells ({} filled)",
        assembled.dataset.measurements.len(),
        assembled.image.width(),
        assembled.image.height(),
        assembled.image.filled_cells()
    );
    print!("{}", assembly::render_image(&assembled.image));
    if let Some(histogram) = &assembled.histogram {
        println!("Intensity distribution:");
        print!("{}", assembly::render_histogram(histogram));
    }
    Ok(())
}

fn run_slew(args: SlewArgs) -> anyhow::Result<()> {
    let runner = Runner::new(load_config(args.config)?);
    let runtime = current_thread_runtime()?;
    let reached = runtime.block_on(runner.slew(SkyPoint::new(args.ra, args.dec)))?;
    println!(
        "Mount at RA {:.2} deg, Dec {:.2} deg",
        reached.ra, reached.dec
    );
    Ok(())
}
