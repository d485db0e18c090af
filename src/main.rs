use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use trend_tracer::config::{Cli, Command, RunArgs, Settings, TrendsArgs};
use trend_tracer::fetch::YouTubeClient;
use trend_tracer::orchestrator::run_pipeline;
use trend_tracer::reader::read_trends;

// One thread: regions are fetched one after another.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().into_command() {
        Command::Run(args) => run(args).await,
        Command::Trends(args) => trends(args),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    info!("Starting trend_tracer");

    // Fails here, before any network call, when no API key is configured
    let settings = Settings::from_args(args)?;
    debug!(
        "Settings - api_base={}, regions={:?}, delay={:?}, timeout={:?}, seed={}",
        settings.api_base, settings.regions, settings.region_delay, settings.request_timeout, settings.classifier.seed
    );

    let client = YouTubeClient::new(settings.api_base.clone(), settings.api_key.clone(), settings.request_timeout)?;
    let summary = run_pipeline(&client, &settings).await?;

    info!(
        "Run summary - rows={}, regions_ok={}, regions_failed={}, viral_threshold={:.1}, classified={}",
        summary.rows,
        summary.regions_succeeded.len(),
        summary.regions_failed.len(),
        summary.viral_threshold,
        summary.classifier.is_some()
    );
    Ok(())
}

fn trends(args: TrendsArgs) -> Result<()> {
    let payload = read_trends(&args.file)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
