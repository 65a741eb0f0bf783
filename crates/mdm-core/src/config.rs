use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::host_policy::DEFAULT_CHUNK_SIZE;

/// Global configuration loaded from `~/.config/mdm/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdmConfig {
    /// Maximum number of fragments fetched at the same time.
    pub thread_number: usize,
    /// Window size for hosts that cap the bytes served per request.
    pub chunk_size_bytes: u64,
    /// Host substrings that get the chunked-range treatment.
    pub chunked_range_hosts: Vec<String>,
    /// Site substrings whose fragments are separate streams (muxed as parallel inputs).
    pub multi_input_sites: Vec<String>,
    /// Muxer executable, looked up on PATH when not absolute.
    pub muxer_program: PathBuf,
    /// Extension of the merged output.
    pub container_ext: String,
    pub user_agent: String,
    /// libcurl receive buffer size in bytes (None = library default).
    pub buffer_bytes: Option<usize>,
    /// Default output directory (None = current directory).
    pub output_dir: Option<PathBuf>,
}

impl Default for MdmConfig {
    fn default() -> Self {
        Self {
            thread_number: 10,
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            chunked_range_hosts: vec!["googlevideo".to_string()],
            multi_input_sites: vec!["youtube".to_string()],
            muxer_program: PathBuf::from("ffmpeg"),
            container_ext: "mp4".to_string(),
            user_agent: format!("mdm/{}", env!("CARGO_PKG_VERSION")),
            buffer_bytes: None,
            output_dir: None,
        }
    }
}

impl MdmConfig {
    /// Parse a config file body. Missing keys take their defaults.
    pub fn from_toml(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MdmConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<MdmConfig> {
    if !path.exists() {
        let default_cfg = MdmConfig::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, default_cfg.to_toml()?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    MdmConfig::from_toml(&data).with_context(|| format!("parsing {}", path.display()))
}
