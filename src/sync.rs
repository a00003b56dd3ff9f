//! One synchronization run: fetch both listings, join them, render, write.

use chrono::{DateTime, FixedOffset};
use tracing::{error, info};

use crate::aggregator::aggregate;
use crate::api::SponsorSource;
use crate::error::SyncError;
use crate::models::OutputConfig;
use crate::output::{ArtifactWriter, RegionUpdate, RegionWriter};
use crate::renderer::{render_document, render_table, SortedEntries};
use crate::utils::now_in_display_offset;

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    pub profiles_fetched: usize,
    pub transactions_fetched: usize,
    pub entries: usize,
    pub skipped_records: usize,
    /// Table rows rendered without their unusable avatar
    pub dropped_avatars: usize,
    /// `None` when the document region could not be written
    pub region: Option<RegionUpdate>,
}

/// Runs the pipeline against a source of raw records
pub struct SponsorSync<S> {
    source: S,
    output: OutputConfig,
}

impl<S: SponsorSource> SponsorSync<S> {
    pub fn new(source: S, output: OutputConfig) -> Self {
        Self { source, output }
    }

    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        self.run_at(now_in_display_offset()).await
    }

    /// Run with an explicit generation time stamped into both artifacts.
    pub async fn run_at(&self, generated_at: DateTime<FixedOffset>) -> Result<SyncReport, SyncError> {
        // A failed sponsor listing degrades to no profiles
        let profiles = match self.source.fetch_profiles().await {
            Ok(profiles) => {
                info!("📊 Fetched {} sponsor records", profiles.len());
                profiles
            }
            Err(e) => {
                error!("Failed to fetch sponsors, continuing without profiles: {:#}", e);
                Vec::new()
            }
        };

        let transactions = self.source.fetch_transactions().await.map_err(|e| {
            error!("Failed to fetch orders: {:#}", e);
            SyncError::TransactionFetch(e)
        })?;
        info!("📊 Fetched {} order records", transactions.len());

        if transactions.is_empty() {
            error!("No order data, nothing to render");
            return Err(SyncError::NoTransactions);
        }

        let aggregation = aggregate(&profiles, &transactions);
        let skipped_records = aggregation.skipped.len();
        let sorted = SortedEntries::new(aggregation.entries);

        let table = render_table(&sorted, &generated_at, &self.output.table);
        let region_writer = RegionWriter::new(&self.output.readme_path, self.output.markers.clone());
        let region = match region_writer.update(&table.markdown) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Failed to update {}: {}", region_writer.path().display(), e);
                None
            }
        };

        let snapshot = render_document(&sorted, &generated_at);
        ArtifactWriter::new(&self.output.json_path)
            .write(&snapshot)
            .map_err(|e| {
                error!("Failed to write snapshot: {}", e);
                SyncError::Artifact(e)
            })?;

        let report = SyncReport {
            profiles_fetched: profiles.len(),
            transactions_fetched: transactions.len(),
            entries: sorted.len(),
            skipped_records,
            dropped_avatars: table.dropped_avatars,
            region,
        };
        info!("✅ Sync completed: {} orders processed, {} entries written", report.transactions_fetched, report.entries);

        Ok(report)
    }
}
