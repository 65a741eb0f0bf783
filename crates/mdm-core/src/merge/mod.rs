//! Merging fragment files into one container through an external muxer.
//!
//! Only multi-fragment videos are merged. The strategy depends on what the
//! fragments are: separate audio/video streams are muxed as parallel inputs,
//! chronological parts of one stream are concatenated.

mod ffmpeg;

pub use ffmpeg::{concat_args, manifest_contents, multi_input_args, FfmpegMuxer};

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Fragments are independent streams (e.g. video + audio): one input each,
    /// video copied, audio re-encoded.
    MultiInput,
    /// Fragments are consecutive parts: concat demuxer over a manifest,
    /// both tracks stream-copied.
    Concat,
}

/// Picks the strategy for `site`: sites containing any of `multi_input_sites`
/// (case-insensitive) use `MultiInput`, everything else `Concat`.
pub fn strategy_for_site(site: &str, multi_input_sites: &[String]) -> MergeStrategy {
    let site = site.to_ascii_lowercase();
    if multi_input_sites
        .iter()
        .any(|s| !s.is_empty() && site.contains(&s.to_ascii_lowercase()))
    {
        MergeStrategy::MultiInput
    } else {
        MergeStrategy::Concat
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("failed to start muxer {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Muxer exited unsuccessfully; `diagnostic` holds its stderr then stdout.
    #[error("muxer exited with {status}\n{diagnostic}")]
    Failed {
        status: ExitStatus,
        diagnostic: String,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// External process that combines `inputs` into `output`.
pub trait Muxer: Send + Sync {
    fn merge(
        &self,
        inputs: &[PathBuf],
        strategy: MergeStrategy,
        output: &Path,
    ) -> Result<(), MergeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Output existed before the merge; nothing was run or deleted.
    AlreadyMerged,
    /// Muxer succeeded and the part files were removed.
    Merged,
}

/// Runs the muxer and removes the part files afterwards.
#[derive(Clone)]
pub struct Merger {
    muxer: Arc<dyn Muxer>,
}

impl Merger {
    pub fn new(muxer: Arc<dyn Muxer>) -> Self {
        Self { muxer }
    }

    /// True when the merged output is already on disk. Its size is not
    /// checked; a finished merge has no predictable size.
    pub fn is_merged(output: &Path) -> bool {
        output.exists()
    }

    pub fn merge(
        &self,
        parts: &[PathBuf],
        strategy: MergeStrategy,
        output: &Path,
    ) -> Result<MergeOutcome, MergeError> {
        if Self::is_merged(output) {
            tracing::info!(path = %output.display(), "file already exists, skipping");
            return Ok(MergeOutcome::AlreadyMerged);
        }

        tracing::info!(path = %output.display(), parts = parts.len(), ?strategy, "merging parts");
        self.muxer.merge(parts, strategy, output)?;

        for part in parts {
            match std::fs::remove_file(part) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(MergeError::Io {
                        path: part.clone(),
                        source,
                    })
                }
            }
        }
        tracing::debug!(parts = parts.len(), "removed part files");
        Ok(MergeOutcome::Merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMuxer {
        calls: Mutex<Vec<(Vec<PathBuf>, MergeStrategy, PathBuf)>>,
    }

    impl Muxer for RecordingMuxer {
        fn merge(&self, inputs: &[PathBuf], strategy: MergeStrategy, output: &Path) -> Result<(), MergeError> {
            let mut out = Vec::new();
            for p in inputs {
                out.extend(std::fs::read(p).unwrap());
            }
            std::fs::write(output, out).unwrap();
            self.calls
                .lock()
                .unwrap()
                .push((inputs.to_vec(), strategy, output.to_path_buf()));
            Ok(())
        }
    }

    struct FailingMuxer;

    impl Muxer for FailingMuxer {
        fn merge(&self, _: &[PathBuf], _: MergeStrategy, output: &Path) -> Result<(), MergeError> {
            Err(MergeError::Io {
                path: output.to_path_buf(),
                source: io::Error::new(io::ErrorKind::Other, "boom"),
            })
        }
    }

    fn write_parts(dir: &Path) -> Vec<PathBuf> {
        (0..3)
            .map(|i| {
                let p = dir.join(format!("Clip[{i}].mp4"));
                std::fs::write(&p, format!("part{i}")).unwrap();
                p
            })
            .collect()
    }

    #[test]
    fn strategy_selection() {
        let sites = vec!["youtube".to_string()];
        assert_eq!(strategy_for_site("YouTube youtube.com", &sites), MergeStrategy::MultiInput);
        assert_eq!(strategy_for_site("优酷 (Youku) youku.com", &sites), MergeStrategy::Concat);
        assert_eq!(strategy_for_site("anything", &[]), MergeStrategy::Concat);
        assert_eq!(strategy_for_site("anything", &[String::new()]), MergeStrategy::Concat);
    }

    #[test]
    fn merge_removes_parts_and_keeps_output() {
        let dir = tempfile::tempdir().unwrap();
        let parts = write_parts(dir.path());
        let output = dir.path().join("Clip.mp4");
        let muxer = Arc::new(RecordingMuxer::default());
        let merger = Merger::new(muxer.clone());

        let outcome = merger.merge(&parts, MergeStrategy::Concat, &output).unwrap();
        assert_eq!(outcome, MergeOutcome::Merged);
        assert!(parts.iter().all(|p| !p.exists()));
        assert_eq!(std::fs::read(&output).unwrap(), b"part0part1part2");
        let calls = muxer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, parts);
        assert_eq!(calls[0].1, MergeStrategy::Concat);
    }

    #[test]
    fn existing_output_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let parts = write_parts(dir.path());
        let output = dir.path().join("Clip.mp4");
        std::fs::write(&output, b"merged earlier").unwrap();
        let muxer = Arc::new(RecordingMuxer::default());
        let merger = Merger::new(muxer.clone());

        let outcome = merger.merge(&parts, MergeStrategy::MultiInput, &output).unwrap();
        assert_eq!(outcome, MergeOutcome::AlreadyMerged);
        assert!(muxer.calls.lock().unwrap().is_empty());
        assert!(parts.iter().all(|p| p.exists()));
    }

    #[test]
    fn failed_muxer_keeps_parts() {
        let dir = tempfile::tempdir().unwrap();
        let parts = write_parts(dir.path());
        let output = dir.path().join("Clip.mp4");
        let merger = Merger::new(Arc::new(FailingMuxer));
        assert!(merger.merge(&parts, MergeStrategy::Concat, &output).is_err());
        assert!(parts.iter().all(|p| p.exists()));
    }

    #[test]
    fn missing_part_is_not_an_error_on_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let parts = write_parts(dir.path());
        std::fs::remove_file(&parts[1]).unwrap();
        let output = dir.path().join("Clip.mp4");
        let merger = Merger::new(Arc::new(SkipMissingMuxer));
        let outcome = merger.merge(&parts, MergeStrategy::Concat, &output).unwrap();
        assert_eq!(outcome, MergeOutcome::Merged);
        assert!(!parts[0].exists());
        assert!(!parts[2].exists());
    }

    struct SkipMissingMuxer;

    impl Muxer for SkipMissingMuxer {
        fn merge(&self, _: &[PathBuf], _: MergeStrategy, output: &Path) -> Result<(), MergeError> {
            std::fs::write(output, b"ok").unwrap();
            Ok(())
        }
    }
}
