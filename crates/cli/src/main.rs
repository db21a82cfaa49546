mod open;
mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mp3batch_core::{
    load_config, load_default_config, validate_config, BatchResult, BatchScheduler, Config,
    DiscoveryMode, FfmpegEncoder,
};

use progress::LogProgress;

/// Exit status when the batch ran but some units failed.
const EXIT_PARTIAL_FAILURE: i32 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Auto,
    Descriptor,
    DirectMedia,
}

impl From<ModeArg> for DiscoveryMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => DiscoveryMode::Auto,
            ModeArg::Descriptor => DiscoveryMode::Descriptor,
            ModeArg::DirectMedia => DiscoveryMode::DirectMedia,
        }
    }
}

/// Command-line arguments for mp3batch
#[derive(Parser, Debug)]
#[command(name = "mp3batch")]
#[command(about = "Batch-convert cached media downloads into named MP3 files")]
#[command(version)]
struct Args {
    /// Input root to scan (repeatable)
    #[arg(short, long = "input", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Output directory for the MP3 files
    #[arg(short, long)]
    output: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long, env = "MP3BATCH_CONFIG")]
    config: Option<PathBuf>,

    /// How input roots are interpreted
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Number of concurrent conversions
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Path to the ffmpeg binary
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Open the output directory when done
    #[arg(long)]
    open: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(jobs) = self.jobs {
            config.batch.concurrency = Some(jobs);
        }
        if let Some(mode) = self.mode {
            config.discovery.mode = mode.into();
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            config.encoder.ffmpeg_path = ffmpeg.clone();
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(args).await {
        Ok(result) if result.all_succeeded() => {}
        Ok(_) => std::process::exit(EXIT_PARTIAL_FAILURE),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<BatchResult> {
    // Load configuration
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_default_config().context("Failed to load default config")?,
    };
    args.apply_overrides(&mut config);

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Encoder: {:?}", config.encoder.ffmpeg_path);
    info!("Discovery mode: {:?}", config.discovery.mode);

    let encoder = FfmpegEncoder::new(config.encoder.clone());
    let scheduler = BatchScheduler::new(config, encoder);
    info!("Using {} workers", scheduler.concurrency());

    let progress = LogProgress::new();
    let cancel = progress.cancel_handle();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, waiting for in-flight conversions to finish");
            cancel.cancel();
        }
    });

    let start = Instant::now();
    let result = scheduler
        .run(&args.inputs, &args.output, Arc::new(progress))
        .await
        .context("Batch could not start")?;

    println!("{}", progress::summary(&result, start.elapsed()));

    if args.open && result.total_units > 0 {
        open::open_folder(&args.output);
    }

    Ok(result)
}
