//! `mdm config` – show where the config lives and what is in effect.

use anyhow::Result;
use mdm_core::config::{self, MdmConfig};

pub fn run_config(cfg: &MdmConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", cfg.to_toml()?);
    Ok(())
}
