//! End-to-end download of one normalized media item.
//!
//! Select a format, fetch its fragments with bounded concurrency against a
//! single progress bar, then merge multi-fragment videos into one container.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::MdmConfig;
use crate::coordinator::FetchCoordinator;
use crate::fetch::{FetchError, FetchOutcome, FragmentFetcher, RequestOptions};
use crate::host_policy::ChunkedRangePolicy;
use crate::media::{Format, MediaKind, NormalizedMedia, DEFAULT_FORMAT};
use crate::merge::{strategy_for_site, FfmpegMuxer, MergeError, MergeOutcome, Merger, Muxer};
use crate::naming;
use crate::progress::ProgressTracker;
use crate::prompt::{OverwritePrompt, StdinPrompt};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no format named {requested:?} (available: {})", .available.join(", "))]
    NoSuchFormat {
        requested: String,
        available: Vec<String>,
    },

    #[error("format {0:?} has no fragments")]
    EmptyFormat(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What to download and where.
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    /// Format id; `None` selects `"default"`.
    pub format: Option<String>,
    /// Replaces the media title as the output file stem.
    pub output_name: Option<String>,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Merged output was already on disk; nothing was fetched.
    AlreadyMerged(PathBuf),
    /// Single-fragment format, stored under its final name.
    Single(PathBuf),
    /// Several fragments of a non-video item; left as separate files.
    Parts(Vec<PathBuf>),
    /// Fragments fetched and merged; part files removed.
    Merged(PathBuf),
}

impl DownloadOutcome {
    /// Files the run left on disk.
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            DownloadOutcome::AlreadyMerged(p)
            | DownloadOutcome::Single(p)
            | DownloadOutcome::Merged(p) => vec![p.as_path()],
            DownloadOutcome::Parts(ps) => ps.iter().map(PathBuf::as_path).collect(),
        }
    }
}

pub struct Pipeline {
    request: RequestOptions,
    chunking: ChunkedRangePolicy,
    threads: usize,
    multi_input_sites: Vec<String>,
    container_ext: String,
    prompt: Arc<dyn OverwritePrompt>,
    muxer: Arc<dyn Muxer>,
    show_progress: bool,
}

impl Pipeline {
    /// Pipeline with the interactive prompt, the configured muxer program and
    /// a visible progress bar.
    pub fn new(config: &MdmConfig, referer: impl Into<String>) -> Self {
        Self {
            request: RequestOptions {
                referer: referer.into(),
                user_agent: config.user_agent.clone(),
                buffer_bytes: config.buffer_bytes,
            },
            chunking: ChunkedRangePolicy::new(
                config.chunked_range_hosts.clone(),
                config.chunk_size_bytes,
            ),
            threads: config.thread_number.max(1),
            multi_input_sites: config.multi_input_sites.clone(),
            container_ext: config.container_ext.clone(),
            prompt: Arc::new(StdinPrompt::new()),
            muxer: Arc::new(FfmpegMuxer::new(&config.muxer_program)),
            show_progress: true,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn OverwritePrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_muxer(mut self, muxer: Arc<dyn Muxer>) -> Self {
        self.muxer = muxer;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Looks up `name` (or `"default"`) in the addressable formats.
    pub fn select<'m>(
        media: &'m NormalizedMedia,
        name: Option<&str>,
    ) -> Result<&'m Format, PipelineError> {
        let name = name.unwrap_or(DEFAULT_FORMAT);
        media
            .formats
            .get(name)
            .ok_or_else(|| PipelineError::NoSuchFormat {
                requested: name.to_string(),
                available: media.formats.ids().map(str::to_string).collect(),
            })
    }

    pub fn download(
        &self,
        media: &NormalizedMedia,
        req: &DownloadRequest,
    ) -> Result<DownloadOutcome, PipelineError> {
        let format = Self::select(media, req.format.as_deref())?;
        if format.fragments.is_empty() {
            return Err(PipelineError::EmptyFormat(format.name.clone()));
        }
        let title = naming::sanitize_title(req.output_name.as_deref().unwrap_or(&media.title));
        let dir = req.output_dir.as_path();
        std::fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let merge_needed = media.kind == MediaKind::Video && format.fragments.len() > 1;
        let merged = naming::file_path(dir, &title, &self.container_ext);
        if merge_needed && Merger::is_merged(&merged) {
            tracing::info!(path = %merged.display(), "file already exists, skipping");
            return Ok(DownloadOutcome::AlreadyMerged(merged));
        }

        let total = format.total_size();
        tracing::info!(
            site = %media.site,
            title = %title,
            format = %format.name,
            fragments = format.fragments.len(),
            total,
            threads = self.threads,
            "starting download"
        );
        let progress = if self.show_progress {
            ProgressTracker::new(total)
        } else {
            ProgressTracker::hidden(total)
        };

        let fetcher = FragmentFetcher::new(
            self.request.clone(),
            self.chunking.clone(),
            Arc::clone(&self.prompt),
        );
        let fetched = match FetchCoordinator::new(&fetcher, self.threads)
            .fetch_all(format, dir, &title, &progress)
        {
            Ok(fetched) => {
                progress.finish();
                fetched
            }
            Err(e) => {
                progress.abandon();
                return Err(e.into());
            }
        };

        for (path, outcome) in fetched.paths.iter().zip(&fetched.outcomes) {
            if *outcome == FetchOutcome::Declined {
                tracing::warn!(path = %path.display(), "kept existing file with unexpected size");
            }
        }

        let mut paths = fetched.paths;
        if paths.len() == 1 {
            return Ok(DownloadOutcome::Single(paths.remove(0)));
        }
        if !merge_needed {
            return Ok(DownloadOutcome::Parts(paths));
        }

        let strategy = strategy_for_site(&media.site, &self.multi_input_sites);
        match Merger::new(Arc::clone(&self.muxer)).merge(&paths, strategy, &merged)? {
            MergeOutcome::AlreadyMerged => Ok(DownloadOutcome::AlreadyMerged(merged)),
            MergeOutcome::Merged => Ok(DownloadOutcome::Merged(merged)),
        }
    }
}
