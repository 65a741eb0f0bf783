//! Output file naming: sanitized titles, part names, manifest and merged paths.

use std::path::{Path, PathBuf};

/// Leaves room under NAME_MAX (255) for `[index].ext.partial` suffixes.
const TITLE_MAX: usize = 200;

const FALLBACK_TITLE: &str = "untitled";

/// Sanitizes a media title for use as a file name stem.
///
/// - Replaces NUL, `/`, `\` and control characters with `_`
/// - Collapses consecutive replacement underscores
/// - Trims leading/trailing whitespace and dots
/// - Limits length to `TITLE_MAX` bytes on a char boundary
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_replaced = false;

    for c in title.chars() {
        if c == '\0' || c == '/' || c == '\\' || c.is_control() {
            if !prev_replaced {
                out.push('_');
            }
            prev_replaced = true;
        } else {
            out.push(c);
            prev_replaced = false;
        }
    }

    let trimmed = out.trim_matches(|c: char| c.is_whitespace() || c == '.');
    let mut take = trimmed.len().min(TITLE_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let result = trimmed[..take].trim_end();
    if result.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        result.to_string()
    }
}

/// `<dir>/<name>.<ext>`
pub fn file_path(dir: &Path, name: &str, ext: &str) -> PathBuf {
    dir.join(format!("{name}.{ext}"))
}

/// Stem of the part file for fragment `index`: `<title>[<index>]`.
pub fn part_name(title: &str, index: usize) -> String {
    format!("{title}[{index}]")
}

/// `<dir>/<title>[<index>].<ext>`
pub fn part_path(dir: &Path, title: &str, index: usize, ext: &str) -> PathBuf {
    file_path(dir, &part_name(title, index), ext)
}
