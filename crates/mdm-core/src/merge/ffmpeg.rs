//! ffmpeg-backed muxer.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{MergeError, MergeStrategy, Muxer};

/// Runs an ffmpeg-compatible program. The program's exit status is the only
/// success signal; its output is kept for the error message.
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    program: PathBuf,
}

impl FfmpegMuxer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Manifest path for a concat merge: `<title>.txt` next to the output.
    pub fn manifest_path(output: &Path) -> PathBuf {
        output.with_extension("txt")
    }
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Muxer for FfmpegMuxer {
    fn merge(
        &self,
        inputs: &[PathBuf],
        strategy: MergeStrategy,
        output: &Path,
    ) -> Result<(), MergeError> {
        let (args, manifest) = match strategy {
            MergeStrategy::MultiInput => (multi_input_args(inputs, output), None),
            MergeStrategy::Concat => {
                let manifest = Self::manifest_path(output);
                let contents = manifest_contents(inputs).map_err(|source| MergeError::Io {
                    path: manifest.clone(),
                    source,
                })?;
                std::fs::write(&manifest, contents).map_err(|source| MergeError::Io {
                    path: manifest.clone(),
                    source,
                })?;
                (concat_args(&manifest, output), Some(manifest))
            }
        };

        tracing::debug!(program = %self.program.display(), ?args, "running muxer");
        let out = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| MergeError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !out.status.success() {
            let mut diagnostic = String::from_utf8_lossy(&out.stderr).into_owned();
            diagnostic.push_str(&String::from_utf8_lossy(&out.stdout));
            return Err(MergeError::Failed {
                status: out.status,
                diagnostic,
            });
        }

        if let Some(manifest) = manifest {
            std::fs::remove_file(&manifest).map_err(|source| MergeError::Io {
                path: manifest.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// `-y -i <p0> -i <p1> ... -c:v copy -c:a aac -strict experimental <output>`
pub fn multi_input_args(inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into()];
    for input in inputs {
        args.push("-i".into());
        args.push(input.into());
    }
    for a in ["-c:v", "copy", "-c:a", "aac", "-strict", "experimental"] {
        args.push(a.into());
    }
    args.push(output.into());
    args
}

/// `-y -f concat -safe 0 -i <manifest> -c copy -bsf:a aac_adtstoasc <output>`
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(12);
    for a in ["-y", "-f", "concat", "-safe", "0", "-i"] {
        args.push(a.into());
    }
    args.push(manifest.into());
    for a in ["-c", "copy", "-bsf:a", "aac_adtstoasc"] {
        args.push(a.into());
    }
    args.push(output.into());
    args
}

/// Concat demuxer manifest: one `file '<absolute path>'` line per input, in order.
///
/// Paths are made absolute because the demuxer resolves relative entries
/// against the manifest's own directory. Single quotes are escaped as `'\''`.
pub fn manifest_contents(inputs: &[PathBuf]) -> io::Result<String> {
    let mut out = String::new();
    for input in inputs {
        let abs = std::path::absolute(input)?;
        let escaped = abs.to_string_lossy().replace('\'', r"'\''");
        out.push_str(&format!("file '{escaped}'\n"));
    }
    Ok(out)
}
