//! Join sponsor profiles onto orders.
//!
//! Each order becomes one [`EnrichedEntry`]. Display data comes from the
//! matching profile when there is one, otherwise from the copy embedded in
//! the order, otherwise the sentinel.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::RecordError;
use crate::models::{EnrichedEntry, ProfileRecord, TransactionRecord};
use crate::utils::{format_timestamp, SENTINEL};

/// Profiles keyed by id. A later profile with the same id replaces an
/// earlier one.
#[derive(Debug, Default)]
pub struct ProfileDirectory {
    profiles: HashMap<String, ProfileRecord>,
}

impl ProfileDirectory {
    /// Index raw sponsor items, skipping any that cannot be parsed.
    pub fn build(items: &[Value]) -> Self {
        let mut profiles = HashMap::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            match ProfileRecord::from_value(item) {
                Ok(profile) => {
                    if let Some(previous) = profiles.insert(profile.id.clone(), profile) {
                        debug!("Duplicate sponsor profile {}, keeping the later one", previous.id);
                    }
                }
                Err(e) => warn!("Skipping sponsor item #{}: {}", index, e),
            }
        }

        Self { profiles }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ProfileRecord> {
        self.profiles.get(id)
    }

    /// Turn one raw order item into an entry.
    pub fn enrich(&self, item: &Value) -> Result<EnrichedEntry, RecordError> {
        let transaction = TransactionRecord::from_value(item)?;
        self.enrich_record(transaction)
    }

    pub fn enrich_record(&self, transaction: TransactionRecord) -> Result<EnrichedEntry, RecordError> {
        let profile = transaction.profile_id.as_deref().and_then(|id| self.get(id));

        let name = profile
            .and_then(|p| p.display_name.clone())
            .or(transaction.display_name_fallback.clone())
            .unwrap_or_else(|| SENTINEL.to_string());
        let avatar_url = profile
            .and_then(|p| p.avatar_url.clone())
            .or(transaction.avatar_fallback.clone())
            .unwrap_or_else(|| SENTINEL.to_string());

        let timestamp = transaction.effective_timestamp();
        let formatted_time = format_timestamp(timestamp)?;

        Ok(EnrichedEntry {
            profile_id: transaction.profile_id,
            name,
            avatar_url,
            timestamp,
            formatted_time,
        })
    }
}

/// A record that could not be turned into an entry
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position in the order listing
    pub index: usize,
    pub error: RecordError,
}

/// Result of joining both listings. Entries are in listing order.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub entries: Vec<EnrichedEntry>,
    pub skipped: Vec<SkippedRecord>,
}

/// Enrich every order, collecting failures instead of stopping on them.
pub fn aggregate(profiles: &[Value], transactions: &[Value]) -> Aggregation {
    let directory = ProfileDirectory::build(profiles);
    info!(
        "👥 Indexed {} sponsor profiles from {} items",
        directory.len(),
        profiles.len()
    );

    let mut aggregation = Aggregation::default();
    for (index, item) in transactions.iter().enumerate() {
        match directory.enrich(item) {
            Ok(entry) => aggregation.entries.push(entry),
            Err(error) => {
                warn!("Skipping order #{}: {}", index, error);
                aggregation.skipped.push(SkippedRecord { index, error });
            }
        }
    }

    if !aggregation.skipped.is_empty() {
        info!("Skipped {} orders that could not be processed", aggregation.skipped.len());
    }

    aggregation
}
