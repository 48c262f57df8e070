//! Directory entry representation.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Name of the synthetic parent-navigation entry.
pub const PARENT_NAME: &str = "..";

/// Whether an entry is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// A single item in a remote directory listing.
///
/// The same type carries both the raw form returned by a
/// [`RemoteClient`](crate::remote::RemoteClient) (unordered, no parent entry)
/// and the normalized form held by a [`Session`](crate::session::Session).
///
/// The serde shape matches the listing payload consumed by views:
/// `{ "file_name", "file_type", "date", "size" }`. `size` is accepted as
/// either an integer or a decimal string and is always written as an integer.
/// Names are normalised to NFC however the entry is built.
///
/// # Examples
///
/// ```
/// use linea_core::{Entry, EntryKind};
///
/// let entry = Entry::new("notes.txt", EntryKind::File, 42, "2024-03-01");
/// assert_eq!(entry.name(), "notes.txt");
/// assert!(!entry.is_dir());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "file_name", deserialize_with = "nfc_name")]
    name: String,
    #[serde(rename = "file_type")]
    kind: EntryKind,
    #[serde(rename = "date", default)]
    modified_at: String,
    #[serde(deserialize_with = "size_from_text_or_int", default)]
    size: u64,
}

impl Entry {
    /// Creates a new entry. The name is normalised to NFC.
    pub fn new(
        name: impl AsRef<str>,
        kind: EntryKind,
        size: u64,
        modified_at: impl Into<String>,
    ) -> Self {
        Self {
            name: name.as_ref().nfc().collect(),
            kind,
            modified_at: modified_at.into(),
            size,
        }
    }

    /// Shorthand for a [`EntryKind::File`] entry.
    pub fn file(name: impl AsRef<str>, size: u64, modified_at: impl Into<String>) -> Self {
        Self::new(name, EntryKind::File, size, modified_at)
    }

    /// Shorthand for a [`EntryKind::Directory`] entry.
    pub fn directory(name: impl AsRef<str>, modified_at: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Directory, 0, modified_at)
    }

    /// The synthetic `".."` entry injected at the top of every listing.
    ///
    /// Its size is `0` and its timestamp is empty.
    pub fn parent() -> Self {
        Self::new(PARENT_NAME, EntryKind::Directory, 0, "")
    }

    /// Returns the entry name as reported by the server.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether this is a file or a directory.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns the size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the server-formatted timestamp, possibly empty.
    pub fn modified_at(&self) -> &str {
        &self.modified_at
    }

    /// Returns `true` if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Returns `true` for the parent-navigation entry.
    pub fn is_parent(&self) -> bool {
        self.is_dir() && self.name == PARENT_NAME
    }

    /// Returns the lower-cased extension of a file name, if any.
    ///
    /// Directories, dot-files such as `.env`, and names without a dot
    /// have no extension.
    pub fn extension(&self) -> Option<String> {
        if self.is_dir() {
            return None;
        }
        match self.name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
                Some(ext.to_lowercase())
            }
            _ => None,
        }
    }
}

fn nfc_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.nfc().collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Int(u64),
    Text(String),
}

fn size_from_text_or_int<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match SizeRepr::deserialize(deserializer)? {
        SizeRepr::Int(n) => Ok(n),
        SizeRepr::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0);
            }
            trimmed
                .parse::<u64>()
                .map_err(|e| serde::de::Error::custom(format!("invalid size {s:?}: {e}")))
        }
    }
}
