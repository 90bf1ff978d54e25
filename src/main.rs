//! Nigerian Economic News Pipeline, binary entrypoint.
//! One-shot batch stages over the configured source registry: fetch feeds
//! into `news.json`, derive analytics snapshots, render reports.
//!
//! See `README.md` for quickstart and `config/sources.toml` for tuning.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use naija_econ_news::config::SourceRegistry;
use naija_econ_news::snapshot::SnapshotStore;
use naija_econ_news::{fetch, pipeline};

#[derive(Debug, Parser)]
#[command(name = "naija-econ-news")]
#[command(about = "Nigerian economic news: fetch, analyze, report")]
struct Cli {
    /// Directory for JSON snapshots (news.json, processed/*).
    #[arg(long, default_value = "api", env = "ECON_API_DIR")]
    api_dir: PathBuf,

    /// Directory for rendered markdown/JSON reports.
    #[arg(long, default_value = "reports", env = "ECON_REPORTS_DIR")]
    reports_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch all sources and write the aggregated news snapshot.
    Fetch,
    /// Analyze the latest snapshot into analytics, trends and source stats.
    Process,
    /// Render the weekly report and daily digest from processed snapshots.
    Report,
    /// Fetch, process and report in sequence.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let registry = SourceRegistry::from_toml()?;
    let store = SnapshotStore::new(&cli.api_dir);

    // Any error that reaches this level is unexpected; let it surface as a
    // non-zero exit so no partial output masquerades as a good run.
    match cli.command {
        Commands::Fetch => {
            let sources = fetch::build_sources(&registry);
            pipeline::run_fetch(&registry, &sources, &store).await?;
        }
        Commands::Process => {
            pipeline::run_process(&registry, &store)?;
        }
        Commands::Report => {
            pipeline::run_report(&store, &cli.reports_dir)?;
        }
        Commands::Run => {
            let sources = fetch::build_sources(&registry);
            pipeline::run_fetch(&registry, &sources, &store).await?;
            pipeline::run_process(&registry, &store)?;
            pipeline::run_report(&store, &cli.reports_dir)?;
        }
    }

    Ok(())
}
