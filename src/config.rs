use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::classifier::ClassifierParams;
use crate::error::PipelineError;

/// Regions queried when none are configured (YouTube `regionCode`).
pub const DEFAULT_REGIONS: [&str; 10] = ["IN", "US", "GB", "CA", "AU", "DE", "FR", "JP", "BR", "KR"];
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3/";
pub const DEFAULT_OUTPUT: &str = "youtube_api_cleaned_data.csv";

/// Trend Tracer - multi-region trending video pipeline
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl Cli {
    /// A bare invocation runs the pipeline.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch, enrich, label, classify and write the dataset (default)
    Run(RunArgs),
    /// Print the persisted dataset as the serving layer sees it (JSON)
    Trends(TrendsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// YouTube Data API key (no default; required)
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Comma-separated region codes (default: IN,US,GB,CA,AU,DE,FR,JP,BR,KR)
    #[arg(long, env = "TREND_REGIONS", value_delimiter = ',')]
    pub regions: Option<Vec<String>>,

    /// Videos requested per region (clamped to 1..=50)
    #[arg(long, default_value_t = 50)]
    pub max_results: u32,

    /// Pause between region calls, in milliseconds
    #[arg(long, default_value_t = 300)]
    pub region_delay_ms: u64,

    /// Per-request HTTP timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// API base URL
    #[arg(long, env = "TREND_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Output CSV path (replaced atomically on success)
    #[arg(short, long, env = "TREND_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Optional path for the classifier report (JSON)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Seed for the train/test split and the forest
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub trees: usize,
}

#[derive(Args, Debug, Clone)]
pub struct TrendsArgs {
    /// Dataset file to read
    #[arg(short, long, env = "TREND_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub file: PathBuf,
}

/// Fully resolved settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_base: Url,
    pub regions: Vec<String>,
    pub max_results: u32,
    pub region_delay: Duration,
    pub request_timeout: Duration,
    pub output_path: PathBuf,
    pub report_path: Option<PathBuf>,
    pub classifier: ClassifierParams,
}

impl Settings {
    pub fn from_args(args: RunArgs) -> Result<Self> {
        let api_key = args
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(PipelineError::MissingApiKey)?;

        let regions = normalize_regions(args.regions);
        if regions.is_empty() {
            bail!("region list is empty");
        }

        if !(args.test_fraction > 0.0 && args.test_fraction < 1.0) {
            bail!("--test-fraction must be in (0, 1), got {}", args.test_fraction);
        }
        if args.trees == 0 {
            bail!("--trees must be at least 1");
        }

        // Url::join drops the last path segment unless the base ends in '/'
        let mut base = args.api_base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_base = Url::parse(&base).with_context(|| format!("invalid --api-base {}", args.api_base))?;

        Ok(Self {
            api_key,
            api_base,
            regions,
            max_results: args.max_results,
            region_delay: Duration::from_millis(args.region_delay_ms),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            output_path: args.output,
            report_path: args.report,
            classifier: ClassifierParams {
                seed: args.seed,
                test_fraction: args.test_fraction,
                n_trees: args.trees,
            },
        })
    }
}

fn normalize_regions(regions: Option<Vec<String>>) -> Vec<String> {
    let raw = regions.unwrap_or_else(|| DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect());
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for r in raw {
        let code = r.trim().to_uppercase();
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}
