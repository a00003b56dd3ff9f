//! Markdown table and JSON snapshot rendering.
//!
//! Both outputs are built from the same [`SortedEntries`] and the same
//! `generated_at` instant so the two artifacts always agree on order and time.

use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};
use url::Url;

use crate::models::{EnrichedEntry, SyncSnapshot, TableStyle};
use crate::utils::{format_instant, SENTINEL};

/// Entries in display order: newest first, ties kept in listing order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedEntries(Vec<EnrichedEntry>);

impl SortedEntries {
    pub fn new(mut entries: Vec<EnrichedEntry>) -> Self {
        // sort_by is stable
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Self(entries)
    }

    pub fn as_slice(&self) -> &[EnrichedEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The Markdown block for the managed region
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    pub markdown: String,
    pub rows: usize,
    /// Rows whose avatar was unusable and rendered as the sentinel
    pub dropped_avatars: usize,
}

/// Make text safe for a single Markdown table cell.
///
/// Angle brackets are escaped so remote text can never form HTML, including
/// a copy of a region marker.
pub fn sanitize_cell(value: &str) -> String {
    let text = value.replace(['\r', '\n'], " ");
    let text = text
        .trim()
        .replace('|', "&#124;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    if text.is_empty() {
        SENTINEL.to_string()
    } else {
        text
    }
}

/// Resolve an avatar to an absolute http(s) URL. Protocol-relative URLs
/// (`//host/path`) are taken as https.
fn avatar_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    let url = match raw.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{}", rest)).ok()?,
        None => Url::parse(raw).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// One `| avatar | name |` row. The flag is set when a non-empty avatar
/// could not be used and the sentinel was rendered instead.
pub fn render_row(entry: &EnrichedEntry, style: &TableStyle) -> (String, bool) {
    let name = sanitize_cell(&entry.name);
    let raw = entry.avatar_url.trim();

    if raw.is_empty() || raw == SENTINEL {
        return (format!("| {} | {} |", SENTINEL, name), false);
    }

    match avatar_url(raw) {
        // Url serialization percent-encodes quotes, whitespace and angle brackets
        Some(url) => (
            format!(r#"| <img src="{}" width="{}"> | {} |"#, url, style.avatar_size, name),
            false,
        ),
        None => {
            warn!("Unusable avatar {:?} for {:?}, rendering without it", raw, entry.profile_id);
            (format!("| {} | {} |", SENTINEL, name), true)
        }
    }
}

/// Render the Markdown section. Every entry gets a row.
pub fn render_table(entries: &SortedEntries, generated_at: &DateTime<FixedOffset>, style: &TableStyle) -> RenderedTable {
    let mut lines = vec![
        style.title.clone(),
        String::new(),
        format!(
            "> {}: {} (UTC+8) {}",
            style.updated_label,
            format_instant(generated_at),
            style.update_note
        ),
        String::new(),
        format!(
            "| {} | {} |",
            sanitize_cell(&style.avatar_header),
            sanitize_cell(&style.name_header)
        ),
        "|------|------|".to_string(),
    ];

    let mut dropped_avatars = 0;
    for entry in entries.as_slice() {
        let (row, dropped) = render_row(entry, style);
        lines.push(row);
        if dropped {
            dropped_avatars += 1;
        }
    }

    if dropped_avatars > 0 {
        info!("Rendered {} rows without their unusable avatar", dropped_avatars);
    }

    RenderedTable {
        markdown: lines.join("\n"),
        rows: entries.len(),
        dropped_avatars,
    }
}

/// Build the snapshot. Text fields are kept exactly as resolved.
pub fn render_document(entries: &SortedEntries, generated_at: &DateTime<FixedOffset>) -> SyncSnapshot {
    SyncSnapshot {
        generated_at: format_instant(generated_at),
        generated_at_epoch: generated_at.timestamp(),
        total_count: entries.len(),
        entries: entries.as_slice().to_vec(),
    }
}
