//! Byte window type and window planning.

/// A byte window [start, end) (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteWindow {
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl ByteWindow {
    /// Length of this window in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Range spec with inclusive end as libcurl expects it: `start-(end-1)`.
    pub fn range_spec(&self) -> String {
        if self.is_empty() {
            "0-0".to_string()
        } else {
            format!("{}-{}", self.start, self.end - 1)
        }
    }

    /// HTTP Range header value: `bytes=start-(end-1)`.
    pub fn range_header_value(&self) -> String {
        format!("bytes={}", self.range_spec())
    }
}

/// Open-ended range spec starting at `start` (`start-`), used when resuming.
pub fn open_range(start: u64) -> String {
    format!("{start}-")
}

/// Splits [start, total) into consecutive windows of at most `window` bytes.
///
/// All windows but the last are exactly `window` long. Returns an empty vec
/// when nothing remains or `window` is 0.
pub fn plan_windows(start: u64, total: u64, window: u64) -> Vec<ByteWindow> {
    if start >= total || window == 0 {
        return Vec::new();
    }
    let count = (total - start).div_ceil(window);
    let mut out = Vec::with_capacity(count as usize);
    let mut offset = start;
    while offset < total {
        let end = offset.saturating_add(window).min(total);
        out.push(ByteWindow { start: offset, end });
        offset = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn twenty_five_mib_in_ten_mib_windows() {
        let w = plan_windows(0, 25 * MIB, 10 * MIB);
        assert_eq!(w.len(), 3);
        assert_eq!(w[0], ByteWindow { start: 0, end: 10 * MIB });
        assert_eq!(w[1], ByteWindow { start: 10 * MIB, end: 20 * MIB });
        assert_eq!(w[2], ByteWindow { start: 20 * MIB, end: 25 * MIB });
        assert_eq!(w[2].len(), 5 * MIB);
    }

    #[test]
    fn windows_cover_range_exactly() {
        let w = plan_windows(7, 1000, 64);
        assert_eq!(w.first().unwrap().start, 7);
        assert_eq!(w.last().unwrap().end, 1000);
        assert!(w.windows(2).all(|p| p[0].end == p[1].start));
        assert_eq!(w.iter().map(ByteWindow::len).sum::<u64>(), 993);
    }

    #[test]
    fn resume_offset_starts_first_window() {
        let w = plan_windows(400, 1000, 10 * MIB);
        assert_eq!(w, vec![ByteWindow { start: 400, end: 1000 }]);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let w = plan_windows(0, 20 * MIB, 10 * MIB);
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn nothing_to_plan() {
        assert!(plan_windows(100, 100, 10).is_empty());
        assert!(plan_windows(200, 100, 10).is_empty());
        assert!(plan_windows(0, 100, 0).is_empty());
    }

    #[test]
    fn range_values() {
        let w = ByteWindow { start: 0, end: 10 * MIB };
        assert_eq!(w.range_spec(), "0-10485759");
        assert_eq!(w.range_header_value(), "bytes=0-10485759");
        let single = ByteWindow { start: 42, end: 43 };
        assert_eq!(single.range_spec(), "42-42");
        assert_eq!(open_range(400), "400-");
    }
}
