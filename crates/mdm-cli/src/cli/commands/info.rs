//! `mdm info` – list every stream of a media item.

use anyhow::Result;
use mdm_core::info;
use mdm_core::media::MediaItem;
use std::path::Path;

pub fn run_info(item: &Path) -> Result<()> {
    let media = MediaItem::load(item)?.normalize()?;
    print!("{}", info::render_info(&media, None));
    Ok(())
}
