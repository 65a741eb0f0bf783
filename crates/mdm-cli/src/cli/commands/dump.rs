//! `mdm dump` – print the normalized item as JSON.

use anyhow::Result;
use mdm_core::info;
use mdm_core::media::MediaItem;
use std::path::Path;

pub fn run_dump(item: &Path) -> Result<()> {
    let media = MediaItem::load(item)?.normalize()?;
    println!("{}", info::dump_json(&media)?);
    Ok(())
}
