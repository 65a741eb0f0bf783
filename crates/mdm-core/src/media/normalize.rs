//! Format normalization: pick the largest rendition and address it as `"default"`.

use serde::Serialize;

use super::{Format, MediaItem, MediaKind};

/// Name under which the best (largest) format is addressable after normalization.
pub const DEFAULT_FORMAT: &str = "default";

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("media item has no formats")]
    NoFormats,
}

/// One addressable format after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatEntry {
    pub id: String,
    pub format: Format,
}

/// Addressable formats: exactly one entry is `"default"`, located at `default_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSet {
    entries: Vec<FormatEntry>,
    default_index: usize,
}

impl FormatSet {
    pub fn entries(&self) -> &[FormatEntry] {
        &self.entries
    }

    pub fn default_index(&self) -> usize {
        self.default_index
    }

    pub fn default_format(&self) -> &Format {
        &self.entries[self.default_index].format
    }

    pub fn get(&self, id: &str) -> Option<&Format> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.format)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A media item after normalization, ready for selection and download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMedia {
    pub site: String,
    pub title: String,
    pub kind: MediaKind,
    pub formats: FormatSet,
    /// Every original format, largest first, for "show all qualities" listings.
    /// The best one is named `"default"`, the rest keep their original names.
    pub streams: Vec<Format>,
}

impl NormalizedMedia {
    /// Back to the extractor shape, with the normalized names as keys.
    pub fn to_item(&self) -> MediaItem {
        MediaItem {
            site: self.site.clone(),
            title: self.title.clone(),
            kind: self.kind,
            formats: self
                .formats
                .entries
                .iter()
                .map(|e| (e.id.clone(), e.format.clone()))
                .collect(),
        }
    }
}

impl MediaItem {
    /// Computes aggregate sizes and renames the largest format to `"default"`.
    ///
    /// Ties on size go to the format that appears first. A format literally
    /// named `"default"` that is not the largest is dropped from the
    /// addressable set but still shows up in `streams`.
    pub fn normalize(self) -> Result<NormalizedMedia, NormalizeError> {
        let MediaItem {
            site,
            title,
            kind,
            formats,
        } = self;
        if formats.is_empty() {
            return Err(NormalizeError::NoFormats);
        }

        let sized: Vec<(String, Format)> = formats
            .into_iter()
            .map(|(id, mut format)| {
                format.size = format.total_size();
                format.name = id.clone();
                (id, format)
            })
            .collect();

        let mut best = 0;
        for (i, (_, format)) in sized.iter().enumerate() {
            if format.size > sized[best].1.size {
                best = i;
            }
        }

        // Stable sort keeps first-seen order among equal sizes, so the best
        // format is always at the front.
        let mut streams: Vec<Format> = sized.iter().map(|(_, f)| f.clone()).collect();
        streams.sort_by(|a, b| b.size.cmp(&a.size));
        streams[0].name = DEFAULT_FORMAT.to_string();

        let mut entries = Vec::with_capacity(sized.len());
        let mut default_index = 0;
        for (i, (id, mut format)) in sized.into_iter().enumerate() {
            if i == best {
                if id != DEFAULT_FORMAT {
                    tracing::debug!(format = %id, size = format.size, "best format renamed to default");
                }
                format.name = DEFAULT_FORMAT.to_string();
                default_index = entries.len();
                entries.push(FormatEntry {
                    id: DEFAULT_FORMAT.to_string(),
                    format,
                });
            } else if id == DEFAULT_FORMAT {
                tracing::debug!(size = format.size, "smaller format named default loses to the best format");
            } else {
                entries.push(FormatEntry { id, format });
            }
        }

        Ok(NormalizedMedia {
            site,
            title,
            kind,
            formats: FormatSet {
                entries,
                default_index,
            },
            streams,
        })
    }
}
