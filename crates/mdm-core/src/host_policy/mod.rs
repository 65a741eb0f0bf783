//! Per-host transfer policy.
//!
//! Some CDNs truncate or throttle large single-range responses. Fragments
//! served from hosts matching one of the configured patterns are fetched as a
//! sequence of fixed-size ranged requests instead of one request for the
//! whole remainder. Matching is a substring test on the host name; it is a
//! heuristic, so the pattern list lives in config rather than in code.

mod key;

pub use key::HostKey;

/// Default window size for chunked ranged fetches (10 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// Decides whether a fragment URL needs chunked ranged requests, and how big.
#[derive(Debug, Clone)]
pub struct ChunkedRangePolicy {
    host_patterns: Vec<String>,
    chunk_size: u64,
}

impl ChunkedRangePolicy {
    pub fn new(host_patterns: Vec<String>, chunk_size: u64) -> Self {
        Self {
            host_patterns,
            chunk_size: chunk_size.max(1),
        }
    }

    /// A policy that never splits requests.
    pub fn disabled() -> Self {
        Self::new(Vec::new(), DEFAULT_CHUNK_SIZE)
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Window size to use for `url`, or `None` when one request is fine.
    /// Unparseable URLs never match.
    pub fn window_size_for(&self, url: &str) -> Option<u64> {
        if self.host_patterns.is_empty() {
            return None;
        }
        let key = HostKey::from_url(url).ok()?;
        self.host_patterns
            .iter()
            .any(|p| key.matches(p))
            .then_some(self.chunk_size)
    }
}
