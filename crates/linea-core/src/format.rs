//! Presentation helpers for listing rows.
//!
//! These are pure functions; a view calls them to fill its columns.
//! [`DisplayRow`] is the per-row data a table view consumes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::entry::Entry;

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Formats a byte count with 1024-based units and two decimals.
///
/// Values below 1024 render as an empty string: a listing only shows sizes
/// from one kilobyte up.
///
/// ```
/// use linea_core::format::format_size;
///
/// assert_eq!(format_size(500), "");
/// assert_eq!(format_size(2048), "2.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        return String::new();
    }

    format!("{value:.2} {}", SIZE_UNITS[unit])
}

/// Formats a server timestamp as a long date, e.g. `July 4, 2023`.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` and RFC 3339. Empty or
/// unrecognised input renders as an empty string.
pub fn format_date(timestamp: &str) -> String {
    parse_date(timestamp.trim())
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_default()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// The cells a table view renders for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub is_dir: bool,
    pub name: String,
    /// `""` for directories, otherwise e.g. `"pdf file"`.
    pub type_label: String,
    /// `""` for directories, otherwise [`format_size`].
    pub size: String,
    pub date: String,
}

impl DisplayRow {
    /// Builds the row for `entry`.
    pub fn from_entry(entry: &Entry) -> Self {
        let (type_label, size) = if entry.is_dir() {
            (String::new(), String::new())
        } else {
            let label = match entry.extension() {
                Some(ext) => format!("{ext} file"),
                None => "file".to_string(),
            };
            (label, format_size(entry.size()))
        };

        Self {
            is_dir: entry.is_dir(),
            name: entry.name().to_string(),
            type_label,
            size,
            date: format_date(entry.modified_at()),
        }
    }
}

/// Builds display rows for a whole listing, preserving order.
pub fn display_rows(entries: &[Entry]) -> Vec<DisplayRow> {
    entries.iter().map(DisplayRow::from_entry).collect()
}
