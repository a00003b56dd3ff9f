use anyhow::Result;
use tracing::{error, info, Level};

use sponsor_sync::api::afdian_client::PageFailure;
use sponsor_sync::api::AfdianClient;
use sponsor_sync::models::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🧪 Testing Afdian API connectivity");

    let config = Config::from_env()?;
    info!("📋 Configuration loaded for user {}", config.credentials.user_id);

    let client = AfdianClient::new(config.credentials.clone(), config.api.clone())?;

    let endpoints = [
        ("sponsors", &config.api.sponsor_endpoint),
        ("orders", &config.api.order_endpoint),
    ];

    let mut failures = 0;
    for (label, endpoint) in endpoints {
        info!("🔍 Fetching first page of {}", label);

        match client.fetch_page(endpoint, 1).await {
            Ok(page) => {
                info!(
                    "✅ {}: {} items on page 1, total_page = {:?}",
                    label,
                    page.items.len(),
                    page.total_page
                );
            }
            Err(PageFailure::Request(e)) => {
                error!("❌ {}: request failed: {}", label, e);
                failures += 1;
            }
            Err(PageFailure::Rejected(reason)) => {
                error!("❌ {}: page rejected: {}", label, reason);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} endpoints failed", failures, endpoints.len());
    }

    info!("🎉 API connectivity test completed successfully!");
    Ok(())
}
