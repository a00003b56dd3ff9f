pub mod aggregator;
pub mod api;
pub mod error;
pub mod models;
pub mod output;
pub mod renderer;
pub mod sync;
pub mod utils;

pub use error::{ConfigError, OutputError, RecordError, SyncError};
pub use sync::{SponsorSync, SyncReport};
