use serde::{Deserialize, Serialize};

/// One rendered sponsor, derived from a single transaction.
///
/// Field order is the serialized key order in the snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    #[serde(rename = "user_id")]
    pub profile_id: Option<String>,
    pub name: String,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
    pub timestamp: i64,
    #[serde(rename = "time")]
    pub formatted_time: String,
}

/// Everything one synchronization run produced, written to the JSON artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    #[serde(rename = "update_time")]
    pub generated_at: String,
    #[serde(rename = "update_timestamp")]
    pub generated_at_epoch: i64,
    pub total_count: usize,
    #[serde(rename = "sponsors")]
    pub entries: Vec<EnrichedEntry>,
}
