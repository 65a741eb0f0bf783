//! Bounded-concurrency fan-out of fragment fetches for one format.
//!
//! A single fragment is fetched on the calling thread into `<title>.<ext>`.
//! Several fragments are fetched by at most `threads` workers into
//! `<title>[<index>].<ext>`; the returned path list is in fragment order no
//! matter which fetch finished first. The call returns only after every
//! worker has been joined.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex};

use crate::fetch::{FetchError, FetchOutcome, FragmentFetcher};
use crate::media::Format;
use crate::naming;
use crate::progress::ProgressTracker;

/// Result of fetching every fragment of a format.
#[derive(Debug, Clone)]
pub struct FetchedFiles {
    /// One path per fragment, in fragment order.
    pub paths: Vec<PathBuf>,
    /// Outcome per fragment, in fragment order.
    pub outcomes: Vec<FetchOutcome>,
}

pub struct FetchCoordinator<'a> {
    fetcher: &'a FragmentFetcher,
    threads: usize,
}

impl<'a> FetchCoordinator<'a> {
    pub fn new(fetcher: &'a FragmentFetcher, threads: usize) -> Self {
        Self {
            fetcher,
            threads: threads.max(1),
        }
    }

    /// Fetches every fragment of `format` into `dir`.
    ///
    /// The first failing fragment stops workers from starting new fetches;
    /// fetches already in flight run to completion and the first error is
    /// returned. There is no partial success.
    pub fn fetch_all(
        &self,
        format: &Format,
        dir: &Path,
        title: &str,
        progress: &ProgressTracker,
    ) -> Result<FetchedFiles, FetchError> {
        let fragments = &format.fragments;
        if fragments.len() == 1 {
            let path = naming::file_path(dir, title, &fragments[0].ext);
            let outcome = self.fetcher.fetch(&fragments[0], &path, progress)?;
            return Ok(FetchedFiles {
                paths: vec![path],
                outcomes: vec![outcome],
            });
        }

        let paths: Vec<PathBuf> = fragments
            .iter()
            .enumerate()
            .map(|(i, f)| naming::part_path(dir, title, i, &f.ext))
            .collect();
        let count = fragments.len();
        if count == 0 {
            return Ok(FetchedFiles {
                paths,
                outcomes: Vec::new(),
            });
        }

        let work: Mutex<VecDeque<usize>> = Mutex::new((0..count).collect());
        let abort_requested = AtomicBool::new(false);
        let (tx, rx) = mpsc::channel::<(usize, Result<FetchOutcome, FetchError>)>();
        let num_workers = self.threads.min(count);
        tracing::debug!(fragments = count, workers = num_workers, "starting fragment fetches");

        let mut outcomes: Vec<Option<FetchOutcome>> = vec![None; count];
        let mut first_error: Option<FetchError> = None;

        std::thread::scope(|s| {
            for _ in 0..num_workers {
                let tx = tx.clone();
                let work = &work;
                let abort = &abort_requested;
                let paths = &paths;
                s.spawn(move || loop {
                    if abort.load(Ordering::Relaxed) {
                        break;
                    }
                    let next = work.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                    let Some(index) = next else {
                        break;
                    };
                    let res = self.fetcher.fetch(&fragments[index], &paths[index], progress);
                    if res.is_err() {
                        abort.store(true, Ordering::Relaxed);
                    }
                    if tx.send((index, res)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            // Ends once every worker has exited and dropped its sender.
            for (index, res) in rx {
                match res {
                    Ok(outcome) => {
                        tracing::debug!(index, ?outcome, "fragment finished");
                        outcomes[index] = Some(outcome);
                    }
                    Err(e) => {
                        tracing::error!(index, error = %e, "fragment failed");
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }
        });

        if let Some(e) = first_error {
            return Err(e);
        }
        Ok(FetchedFiles {
            paths,
            outcomes: outcomes.into_iter().flatten().collect(),
        })
    }
}
