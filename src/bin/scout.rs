//! CLI binary for creator-scout.

use clap::Parser;
use creator_scout::{AppConfig, Overrides};
use scout_core::{FeedPreset, ScoutParams};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Find social-media creators by keyword and collect their contact emails.
#[derive(Parser)]
#[command(name = "creator-scout", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma-separated keywords (replaces the config file's list).
    #[arg(short, long)]
    keywords: Option<String>,

    /// Minimum audience size; 0 means the default of 50000.
    #[arg(short, long)]
    minimum_count: Option<u64>,

    /// Feed to scout: youtube or tiktok.
    #[arg(short, long)]
    feed: Option<FeedPreset>,

    /// Run the browser without a window.
    #[arg(long, overrides_with = "headed")]
    headless: bool,

    /// Show the browser window.
    #[arg(long, overrides_with = "headless")]
    headed: bool,

    /// Write records to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// WebDriver server URL.
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Save the effective configuration and exit.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let headless = if self.headless {
            Some(true)
        } else if self.headed {
            Some(false)
        } else {
            None
        };
        Overrides {
            params: ScoutParams {
                keywords: self.keywords.clone().unwrap_or_default(),
                minimum_count: self.minimum_count,
                headless,
            },
            feed: self.feed,
            output: self.output.clone(),
            webdriver_url: self.webdriver_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the JSON records.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("creator_scout=info,scout_core=info,thirtyfour=warn")
        }))
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);

    let mut config = load_config(&config_path, cli.config.is_some())?;
    config.apply(cli.overrides());

    if cli.save_config {
        config.save_to_file(&config_path)?;
        info!(path = %config_path.display(), "configuration saved");
        return Ok(());
    }

    let report = creator_scout::scout(&config).await?;
    creator_scout::output::write_records(&report.records, &config.output)?;
    Ok(())
}

/// Load the config file. A missing default file means built-in defaults; a
/// missing explicit file is an error.
fn load_config(path: &Path, explicit: bool) -> anyhow::Result<AppConfig> {
    if explicit || path.exists() {
        info!(path = %path.display(), "loading config");
        Ok(AppConfig::from_file(path)?)
    } else {
        Ok(AppConfig::default())
    }
}
