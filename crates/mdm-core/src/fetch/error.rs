//! Fragment fetch error type.

use std::io;
use std::path::PathBuf;

/// Error returned by a fragment fetch. Every variant is fatal for the run;
/// there is no retry.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a status >= 400.
    #[error("GET {url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    /// libcurl failed (DNS, connect, TLS, timeout, ...).
    #[error("GET {url} failed: {source}")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// A ranged request was answered with the full body (200).
    #[error("server ignored Range request for {url}")]
    RangeIgnored { url: String },

    /// Transfer ended with fewer bytes on disk than the fragment size.
    /// The temp file is kept so the next run resumes from there.
    #[error("incomplete transfer for {url}: {received} of {expected} bytes on disk")]
    Incomplete {
        url: String,
        expected: u64,
        received: u64,
    },

    /// Creating, writing or renaming a local file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| FetchError::Io { path, source }
    }
}
