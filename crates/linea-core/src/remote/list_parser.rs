//! Parser for Unix-style `LIST` output.
//!
//! Each line looks like `ls -l` output:
//!
//! ```text
//! drwxr-xr-x   2 owner group     4096 Jul  4  2023 docs
//! -rw-r--r--   1 owner group    52311 Mar 11 09:15 notes from monday.txt
//! ```
//!
//! Unparseable lines are skipped rather than failing the whole listing.

use chrono::{Datelike, Local, NaiveDate};

use crate::entry::{Entry, EntryKind, PARENT_NAME};

const FALLBACK_DATE: &str = "1970-01-01";

/// Parses a full `LIST` reply, dating `HH:MM` entries relative to today.
pub fn parse_listing<S: AsRef<str>>(lines: &[S]) -> Vec<Entry> {
    let today = Local::now().date_naive();
    lines
        .iter()
        .filter_map(|line| parse_line(line.as_ref(), today))
        .collect()
}

/// Parses one `LIST` line.
///
/// Returns `None` for `total N` summaries, blank or truncated lines, lines
/// that do not start with a permission string, and the `.`/`..` rows.
///
/// `ls -l` prints `HH:MM` instead of a year for recent files; those are
/// dated on the latest matching day not after `today`.
pub fn parse_line(line: &str, today: NaiveDate) -> Option<Entry> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with("total ") {
        return None;
    }

    let (perms, rest) = next_field(line)?;
    let (_links, rest) = next_field(rest)?;
    let (_owner, rest) = next_field(rest)?;
    let (_group, rest) = next_field(rest)?;
    let (size, rest) = next_field(rest)?;
    let (month, rest) = next_field(rest)?;
    let (day, rest) = next_field(rest)?;
    let (year_or_time, rest) = next_field(rest)?;
    let raw_name = rest.trim_start();

    let kind = match perms.chars().next()? {
        'd' => EntryKind::Directory,
        '-' | 'l' | 'c' | 'b' | 'p' | 's' => EntryKind::File,
        _ => return None,
    };

    let name = if perms.starts_with('l') {
        raw_name.split_once(" -> ").map_or(raw_name, |(n, _)| n)
    } else {
        raw_name
    };

    if name.is_empty() || name == "." || name == PARENT_NAME {
        return None;
    }

    let size = size.parse::<u64>().unwrap_or(0);
    let date = parse_date(month, day, year_or_time, today);

    Some(Entry::new(name, kind, size, date))
}

/// Splits off the next whitespace-delimited field, returning it and the
/// unconsumed remainder (with its leading whitespace intact).
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some(s.split_at(end))
}

fn parse_date(month: &str, day: &str, year_or_time: &str, today: NaiveDate) -> String {
    let month = month_number(month).unwrap_or(1);
    let day = day.parse::<u32>().unwrap_or(1);
    let date = if year_or_time.contains(':') {
        recent_date(month, day, today)
    } else if year_or_time.len() == 4 {
        NaiveDate::from_ymd_opt(year_or_time.parse::<i32>().unwrap_or(1970), month, day)
    } else {
        NaiveDate::from_ymd_opt(1970, month, day)
    };

    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| FALLBACK_DATE.to_string())
}

/// The date with `month`/`day` in `today`'s year, or the year before when
/// that would be in the future.
fn recent_date(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date <= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() - 1, month, day),
    }
}

fn month_number(month: &str) -> Option<u32> {
    let n = match month.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}
