pub mod config;
pub mod records;
pub mod snapshot;

pub use config::{ApiConfig, Config, Credentials, OutputConfig, RegionMarkers, TableStyle};
pub use records::{ProfileRecord, TransactionRecord};
pub use snapshot::{EnrichedEntry, SyncSnapshot};
