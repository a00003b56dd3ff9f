use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::OutputError;
use crate::models::SyncSnapshot;

/// Writes the JSON snapshot. Each run overwrites the previous file.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    path: PathBuf,
}

impl ArtifactWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, snapshot: &SyncSnapshot) -> Result<(), OutputError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, content).map_err(|source| OutputError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!("💾 Wrote {} sponsors to {}", snapshot.total_count, self.path.display());
        Ok(())
    }
}
