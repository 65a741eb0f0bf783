//! Human-readable media listing and JSON dump.

use std::fmt::Write;

use anyhow::Result;

use crate::media::{Format, NormalizedMedia};

/// `12.35 MiB (12949936 Bytes)`
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MiB ({} Bytes)", bytes as f64 / (1024.0 * 1024.0), bytes)
}

/// One stream block: name, quality (when known), size and the command that
/// downloads it.
pub fn render_stream(format: &Format) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "     [{}]  -------------------", format.name);
    if !format.quality.is_empty() {
        let _ = writeln!(out, "     Quality:         {}", format.quality);
    }
    let _ = writeln!(out, "     Size:            {}", format_size(format.total_size()));
    let _ = writeln!(out, "     # download with: mdm download -f {} <item.json>", format.name);
    out.push('\n');
    out
}

/// Header plus either every stream, largest first (`stream == None`), or the
/// one about to be downloaded.
pub fn render_info(media: &NormalizedMedia, stream: Option<&Format>) -> String {
    let mut out = String::from("\n");
    let _ = writeln!(out, " Site:      {}", media.site);
    let _ = writeln!(out, " Title:     {}", media.title);
    let _ = writeln!(out, " Type:      {}", media.kind);
    match stream {
        None => {
            let _ = writeln!(out, " Streams:   # All available quality");
            for format in &media.streams {
                out.push_str(&render_stream(format));
            }
        }
        Some(format) => {
            let _ = writeln!(out, " Stream:   ");
            out.push_str(&render_stream(format));
        }
    }
    out
}

/// Normalized item as pretty JSON in the extractor input shape.
pub fn dump_json(media: &NormalizedMedia) -> Result<String> {
    Ok(serde_json::to_string_pretty(&media.to_item())?)
}
