use anyhow::{Context, Result};

/// Host part of a fragment URL, lowercased, used to match chunked-range patterns.
///
/// Paths and ports are ignored so every fragment served by the same CDN host
/// gets the same treatment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostKey {
    pub host: String,
}

impl HostKey {
    /// Construct a host key from a URL string.
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed =
            url::Url::parse(url).with_context(|| format!("invalid URL for host policy: {url}"))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("URL missing host for host policy: {url}"))?
            .to_ascii_lowercase();
        Ok(Self { host })
    }

    /// True when `pattern` occurs anywhere in the host name (case-insensitive).
    pub fn matches(&self, pattern: &str) -> bool {
        !pattern.is_empty() && self.host.contains(&pattern.to_ascii_lowercase())
    }
}
