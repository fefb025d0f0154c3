use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use ppshook_core::{
    load_config, process_events, read_events, HookConfig, LogPublisher, MessageSpec,
    MetadataRecord,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Posttroll notifications for PPS products", long_about = None)]
struct Cli {
    /// Hook configuration file (falls back to PPSHOOK_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build and publish the message for one granule
    Publish(PublishArgs),
    /// Publish messages for a JSON-lines file of granule events
    Run(RunArgs),
    /// Check that the configured metadata has every mandatory field
    CheckConfig,
}

#[derive(Args, Debug)]
struct PublishArgs {
    /// JSON file with the granule metadata
    #[arg(long)]
    metadata: PathBuf,
    /// Exit status of the processing run (0 = success)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    status: i32,
    /// Sender name written into the message
    #[arg(long, default_value = "pps-hook")]
    sender: String,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON-lines file, one {"status": .., "metadata": {..}} per line
    #[arg(long)]
    events: PathBuf,
    #[arg(long, default_value = "pps-hook")]
    sender: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_hook_config(cli.config)?;

    match cli.command {
        Command::Publish(args) => handle_publish(&config, args),
        Command::Run(args) => handle_run(&config, args),
        Command::CheckConfig => handle_check_config(&config),
    }
}

fn load_hook_config(flag: Option<PathBuf>) -> Result<HookConfig> {
    dotenvy::dotenv().ok();

    let path = match flag {
        Some(path) => path,
        None => env::var("PPSHOOK_CONFIG")
            .map(PathBuf::from)
            .context("--config (or PPSHOOK_CONFIG) must be set")?,
    };
    let config = load_config(&path)
        .with_context(|| format!("failed to load hook configuration {}", path.display()))?;
    info!(path = %path.display(), "Loaded hook configuration");
    Ok(config)
}

fn post_hook(config: &HookConfig) -> Result<&MessageSpec> {
    match config.post_hook() {
        Some(spec) => Ok(spec),
        None => bail!("configuration has no pps_hook.post_hook entry"),
    }
}

fn handle_publish(config: &HookConfig, args: PublishArgs) -> Result<()> {
    let spec = post_hook(config)?;
    let file = File::open(&args.metadata)
        .with_context(|| format!("failed to open {}", args.metadata.display()))?;
    let metadata: MetadataRecord = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid granule metadata in {}", args.metadata.display()))?;

    let publisher = LogPublisher::with_sender(io::stdout(), args.sender);
    match spec.post_hook(args.status, &metadata, &publisher)? {
        Some(message) => info!(header = %message.header, "Message published"),
        None => warn!(status = args.status, "Processing failed, nothing published"),
    }
    Ok(())
}

fn handle_run(config: &HookConfig, args: RunArgs) -> Result<()> {
    let spec = post_hook(config)?;
    let file = File::open(&args.events)
        .with_context(|| format!("failed to open {}", args.events.display()))?;

    let publisher = LogPublisher::with_sender(io::stdout(), args.sender);
    let summary = process_events(spec, read_events(BufReader::new(file)), &publisher);

    eprintln!(
        "Processed {} granules: {} published, {} suppressed, {} failed",
        summary.total(),
        summary.published,
        summary.suppressed,
        summary.failures.len()
    );
    for failure in &summary.failures {
        eprintln!(
            "  #{} {}: {}",
            failure.index,
            failure.filename.as_deref().unwrap_or("-"),
            failure.reason
        );
    }
    Ok(())
}

fn handle_check_config(config: &HookConfig) -> Result<()> {
    let Some(spec) = config.post_hook() else {
        println!("No post hook configured; nothing will be published.");
        return Ok(());
    };

    spec.check_mandatory_fields()?;
    println!(
        "Post hook OK: {}",
        spec.description.as_deref().unwrap_or("(no description)")
    );
    Ok(())
}
