//! Media model produced by extractors: fragments, formats and the item itself.
//!
//! A `MediaItem` is built once (outside this crate, or loaded from the JSON
//! an extractor dumped), normalized exactly once via [`MediaItem::normalize`],
//! and then handed to the download pipeline.

mod normalize;
mod ordered;

pub use normalize::{FormatEntry, FormatSet, NormalizeError, NormalizedMedia, DEFAULT_FORMAT};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// One remotely addressed piece of a format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub url: String,
    /// Size in bytes; 0 when the source cannot report it (e.g. live content).
    #[serde(default)]
    pub size: u64,
    pub ext: String,
}

/// A selectable rendition: ordered fragments plus an aggregate size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    #[serde(rename = "urls")]
    pub fragments: Vec<Fragment>,
    #[serde(default)]
    pub quality: String,
    /// Total size as reported by the extractor; 0 means "derive from fragments".
    #[serde(default)]
    pub size: u64,
    /// Assigned during normalization.
    #[serde(skip)]
    pub name: String,
}

impl Format {
    /// Reported size, or the sum of fragment sizes when none was reported.
    pub fn total_size(&self) -> u64 {
        if self.size != 0 {
            return self.size;
        }
        self.fragments.iter().map(|f| f.size).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    #[serde(other)]
    Other,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Other => write!(f, "other"),
        }
    }
}

/// A resolved media item as produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub site: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Named formats in extractor order. Order decides size ties.
    #[serde(with = "ordered")]
    pub formats: Vec<(String, Format)>,
}

impl MediaItem {
    /// Parse an extractor JSON document.
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("invalid media item JSON")
    }

    /// Load an extractor JSON document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read media item: {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("in {}", path.display()))
    }
}
