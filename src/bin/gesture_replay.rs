//! Replays a recorded landmark stream through the gesture pipeline.
//!
//! Events go to stdout, one line each; logs go to stderr.
//! Usage: gesture-replay --input frames.jsonl --config gestures.yaml --format json

use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use handgesture_rs::output::LineSink;
use handgesture_rs::{GestureConfig, GesturePipeline, JsonLinesSource, LineEncoder, OutputFormat};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gesture-replay", about = "Classify gestures in a recorded hand-landmark stream")]
struct Args {
    /// JSON-lines landmark recording, `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// YAML gesture configuration (defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output line format, overrides the configuration: json or simple
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("handgesture_rs={0},gesture_replay={0}", args.log_level).into()),
        )
        .with_writer(io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => GestureConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => GestureConfig::default(),
    };
    let format = args.format.unwrap_or(config.output.format);
    info!(input = %args.input, %format, "starting replay");

    let stdout = io::stdout();
    let mut sink = LineSink::new(stdout.lock(), LineEncoder::new(format));

    let frames = if args.input == "-" {
        let source = JsonLinesSource::new(BufReader::new(io::stdin().lock()));
        let mut pipeline = GesturePipeline::new(source, config).context("invalid configuration")?;
        pipeline.run(&mut sink).context("replaying stdin")?
    } else {
        let source = JsonLinesSource::open(&args.input)
            .with_context(|| format!("opening {}", args.input))?;
        let mut pipeline = GesturePipeline::new(source, config).context("invalid configuration")?;
        pipeline
            .run(&mut sink)
            .with_context(|| format!("replaying {}", args.input))?
    };

    info!(frames, "replay complete");
    Ok(())
}
