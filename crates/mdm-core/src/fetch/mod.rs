//! Fragment fetcher: one fragment to disk with resume support.
//!
//! The fetch writes to `<final>.partial` and renames it on success. A partial
//! file left by an earlier (killed or failed) run is resumed with a Range
//! request starting at its length. Fragments on hosts the
//! [`ChunkedRangePolicy`] matches are fetched as consecutive fixed-size
//! windows against the same open file.

mod error;
mod request;

pub use error::FetchError;

use std::path::Path;
use std::sync::Arc;

use crate::host_policy::ChunkedRangePolicy;
use crate::media::Fragment;
use crate::progress::ProgressTracker;
use crate::prompt::OverwritePrompt;
use crate::segmenter::{open_range, plan_windows};
use crate::storage::{self, PartialFile};

/// Per-request HTTP settings shared by every fetch of a run.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Sent as `Referer` on every request (omitted when empty).
    pub referer: String,
    /// Sent as `User-Agent` (libcurl default when empty).
    pub user_agent: String,
    /// libcurl receive buffer size; `None` keeps the library default.
    pub buffer_bytes: Option<usize>,
}

/// What a fetch did with one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Final file already had the expected size; no network I/O.
    AlreadyComplete { bytes: u64 },
    /// Final file existed with another size and overwriting was declined.
    Declined,
    /// Fragment was (re)downloaded; `resumed_from` > 0 when a partial file was continued.
    Downloaded { bytes: u64, resumed_from: u64 },
}

/// Fetches fragments into local files. Shared by all workers of a run.
pub struct FragmentFetcher {
    request: RequestOptions,
    chunking: ChunkedRangePolicy,
    prompt: Arc<dyn OverwritePrompt>,
}

impl FragmentFetcher {
    pub fn new(
        request: RequestOptions,
        chunking: ChunkedRangePolicy,
        prompt: Arc<dyn OverwritePrompt>,
    ) -> Self {
        Self {
            request,
            chunking,
            prompt,
        }
    }

    /// Fetches `fragment` into `final_path`, crediting bytes to `progress`.
    ///
    /// A fragment size of 0 means "unknown": the exact-size skip is not
    /// applied, chunking is not used and the final length is not checked.
    pub fn fetch(
        &self,
        fragment: &Fragment,
        final_path: &Path,
        progress: &ProgressTracker,
    ) -> Result<FetchOutcome, FetchError> {
        let expected = fragment.size;

        if let Some(existing) = storage::file_len(final_path).map_err(FetchError::io(final_path))? {
            if expected != 0 && existing == expected {
                tracing::info!(path = %final_path.display(), "file already exists, skipping");
                progress.add(existing);
                return Ok(FetchOutcome::AlreadyComplete { bytes: existing });
            }
            let overwrite =
                progress.suspend(|| self.prompt.confirm_overwrite(final_path, existing, expected));
            if !overwrite {
                tracing::info!(path = %final_path.display(), existing, expected, "overwrite declined, skipping");
                return Ok(FetchOutcome::Declined);
            }
        }

        let temp = storage::temp_path(final_path);
        let on_disk = storage::file_len(&temp)
            .map_err(FetchError::io(&temp))?
            .unwrap_or(0);

        let mut file = if on_disk > 0 && (expected == 0 || on_disk <= expected) {
            let file = PartialFile::open_append(&temp).map_err(FetchError::io(&temp))?;
            tracing::debug!(path = %temp.display(), offset = file.len(), "resuming partial file");
            progress.add(file.len());
            file
        } else {
            if on_disk > 0 {
                tracing::warn!(
                    path = %temp.display(),
                    on_disk,
                    expected,
                    "partial file larger than fragment, starting over"
                );
            }
            PartialFile::create(&temp).map_err(FetchError::io(&temp))?
        };

        let resumed_from = file.len();
        if expected == 0 || resumed_from < expected {
            self.transfer(fragment, &mut file, progress)?;
        }

        if expected != 0 && file.len() < expected {
            return Err(FetchError::Incomplete {
                url: fragment.url.clone(),
                expected,
                received: file.len(),
            });
        }
        if expected != 0 && file.len() > expected {
            tracing::warn!(
                url = %fragment.url,
                expected,
                received = file.len(),
                "server sent more bytes than the fragment size"
            );
        }

        let bytes = file.len();
        file.sync().map_err(FetchError::io(&temp))?;
        file.finalize(final_path).map_err(FetchError::io(final_path))?;
        tracing::debug!(path = %final_path.display(), bytes, resumed_from, "fragment complete");
        Ok(FetchOutcome::Downloaded {
            bytes,
            resumed_from,
        })
    }

    /// Transfers the rest of the fragment into `file`, starting at its current length.
    fn transfer(
        &self,
        fragment: &Fragment,
        file: &mut PartialFile,
        progress: &ProgressTracker,
    ) -> Result<(), FetchError> {
        let start = file.len();
        match self.chunking.window_size_for(&fragment.url) {
            Some(window) if fragment.size > 0 => {
                for w in plan_windows(start, fragment.size, window) {
                    tracing::debug!(url = %fragment.url, range = %w.range_header_value(), "ranged fetch");
                    let written = request::perform_get(
                        &fragment.url,
                        &self.request,
                        Some(&w.range_spec()),
                        file,
                        progress,
                    )?;
                    // Later windows are planned against fixed offsets, so a
                    // short window must stop here to keep the file contiguous.
                    if written != w.len() {
                        return Err(FetchError::Incomplete {
                            url: fragment.url.clone(),
                            expected: fragment.size,
                            received: file.len(),
                        });
                    }
                }
            }
            _ => {
                let range = (start > 0).then(|| open_range(start));
                tracing::debug!(url = %fragment.url, range = ?range, "fetch");
                request::perform_get(&fragment.url, &self.request, range.as_deref(), file, progress)?;
            }
        }
        Ok(())
    }
}
