//! The two artifacts a run produces.

pub mod artifact;
pub mod region;

pub use artifact::ArtifactWriter;
pub use region::{apply_region, RegionUpdate, RegionWriter};
