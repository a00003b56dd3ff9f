use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use sponsor_sync::api::AfdianClient;
use sponsor_sync::models::Config;
use sponsor_sync::SponsorSync;

/// Sync Afdian sponsors into a README section and a JSON snapshot
#[derive(Parser)]
#[command(name = "sponsor-sync")]
#[command(version)]
#[command(about = "Fetch Afdian sponsors and orders, then update the README sponsor table and sponsor.json")]
#[command(long_about = "
Fetches every sponsor and order from the Afdian open API, joins them, and writes
two artifacts: a Markdown table between the sponsor markers in the README, and a
pretty-printed JSON snapshot for other tools.

Credentials are read from AFDIAN_USER_ID and AFDIAN_TOKEN (a .env file is
honoured). Run it on a schedule; every run replaces the previous output.

Examples:
  sponsor-sync
  sponsor-sync --readme docs/README.md --json-output site/sponsor.json
")]
struct Args {
    /// Document whose sponsor region is rewritten (overrides SPONSOR_README_PATH)
    #[arg(long, value_name = "PATH")]
    readme: Option<PathBuf>,

    /// Where the JSON snapshot is written (overrides SPONSOR_JSON_PATH)
    #[arg(long, value_name = "PATH")]
    json_output: Option<PathBuf>,

    /// Log request-level detail
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose { "sponsor_sync=debug" } else { "sponsor_sync=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("🚀 Starting sponsor sync");

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ Configuration Error: {}", e);
            eprintln!("Set AFDIAN_USER_ID and AFDIAN_TOKEN in the environment or a .env file.");
            std::process::exit(1);
        }
    };

    if let Some(readme) = args.readme {
        config.output.readme_path = readme;
    }
    if let Some(json_output) = args.json_output {
        config.output.json_path = json_output;
    }

    let client = AfdianClient::new(config.credentials.clone(), config.api.clone())
        .context("failed to build HTTP client")?;
    let sync = SponsorSync::new(client, config.output.clone());

    match sync.run().await {
        Ok(report) => {
            info!(
                "📋 Summary: {} sponsors, {} orders, {} entries, {} skipped records, {} rows without avatar, region: {:?}",
                report.profiles_fetched,
                report.transactions_fetched,
                report.entries,
                report.skipped_records,
                report.dropped_avatars,
                report.region
            );
            Ok(())
        }
        Err(e) => {
            error!("❌ Sync failed: {}", e);
            std::process::exit(1);
        }
    }
}
