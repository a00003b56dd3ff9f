//! Rewrites the marker-delimited region of an existing document.
//!
//! The file is read whole, edited in memory and written back whole. Nothing
//! outside the markers changes. Not safe against concurrent writers.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::OutputError;
use crate::models::RegionMarkers;

/// What an update did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionUpdate {
    /// The file did not exist and was created with just the region
    Created,
    /// No usable marker pair was found; the region was appended
    Appended,
    /// The existing region was replaced in place
    Replaced,
}

/// Where the managed region sits in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerState {
    /// Byte range from the start of the start marker to the end of the end marker
    Paired { start: usize, end: usize },
    Absent,
    /// Only one marker, or the end marker comes before the start marker
    Inconsistent,
}

/// The region is the first end marker that has a start marker before it,
/// paired with the closest such start marker. Stray markers on either side
/// are left alone.
fn locate(text: &str, markers: &RegionMarkers) -> MarkerState {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find(&markers.end) {
        let end_at = search_from + offset;
        if let Some(start) = text[..end_at].rfind(&markers.start) {
            return MarkerState::Paired {
                start,
                end: end_at + markers.end.len(),
            };
        }
        search_from = end_at + markers.end.len();
    }

    if text.contains(&markers.start) || text.contains(&markers.end) {
        MarkerState::Inconsistent
    } else {
        MarkerState::Absent
    }
}

fn block(markers: &RegionMarkers, content: &str) -> String {
    format!("{}\n{}\n{}", markers.start, content, markers.end)
}

/// Compute the new document text without touching the filesystem.
/// `None` means the file does not exist yet.
pub fn apply_region(existing: Option<&str>, content: &str, markers: &RegionMarkers) -> (String, RegionUpdate) {
    let Some(text) = existing else {
        return (format!("{}\n", block(markers, content)), RegionUpdate::Created);
    };

    match locate(text, markers) {
        MarkerState::Paired { start, end } => {
            let updated = format!("{}{}{}", &text[..start], block(markers, content), &text[end..]);
            (updated, RegionUpdate::Replaced)
        }
        MarkerState::Absent | MarkerState::Inconsistent => {
            let updated = format!("{}\n\n{}\n", text.trim_end(), block(markers, content));
            (updated, RegionUpdate::Appended)
        }
    }
}

/// Owns one document's managed region
#[derive(Debug, Clone)]
pub struct RegionWriter {
    path: PathBuf,
    markers: RegionMarkers,
}

impl RegionWriter {
    pub fn new(path: impl Into<PathBuf>, markers: RegionMarkers) -> Self {
        Self {
            path: path.into(),
            markers,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the region's content, creating the file or the markers if needed
    pub fn update(&self, content: &str) -> Result<RegionUpdate, OutputError> {
        let existing = match fs::read_to_string(&self.path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(source) => {
                return Err(OutputError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if let Some(text) = &existing {
            if locate(text, &self.markers) == MarkerState::Inconsistent {
                warn!(
                    "⚠️ {} has an unmatched or out-of-order sponsor marker, appending a new region",
                    self.path.display()
                );
            }
        }

        let (updated, outcome) = apply_region(existing.as_deref(), content, &self.markers);

        fs::write(&self.path, updated).map_err(|source| OutputError::Io {
            path: self.path.clone(),
            source,
        })?;

        match outcome {
            RegionUpdate::Created => warn!("{} did not exist, created it", self.path.display()),
            RegionUpdate::Appended => warn!("No region markers in {}, appended them", self.path.display()),
            RegionUpdate::Replaced => info!("📝 Updated region in {}", self.path.display()),
        }

        Ok(outcome)
    }
}
