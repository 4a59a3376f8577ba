use serde::{Deserialize, Serialize};

/// Byte-offset span into snippet text. Start is inclusive, end is exclusive.
///
/// Every position inside an embedded snippet is a byte offset into the
/// snippet string itself, not into the host source file that carried it.
/// Line/column pairs are computed on demand via [`LineIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    /// A zero-length span at `offset`.
    pub fn point(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span is empty (zero-length).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Pre-computed index of line start positions for on-demand line/column lookup.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index by scanning the text for newline characters.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        // partition_point yields the first line start past `offset`.
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line_idx = line_idx.saturating_sub(1);
        let line = (line_idx as u32) + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Return the number of lines in the text.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_len_and_point() {
        let span = Span::new(5, 10);
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::point(7).is_empty());
    }

    #[test]
    fn span_merge() {
        let merged = Span::new(5, 10).merge(Span::new(8, 15));
        assert_eq!(merged, Span::new(5, 15));
    }

    #[test]
    fn line_index_multiple_lines() {
        let idx = LineIndex::new("a.b(\n  $0,\n  $1)");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(7), (2, 3));
        assert_eq!(idx.line_col(13), (3, 3));
        assert_eq!(idx.line_count(), 3);
    }

    #[test]
    fn line_index_newline_at_offset() {
        let idx = LineIndex::new("ab\ncd");
        assert_eq!(idx.line_col(2), (1, 3));
        assert_eq!(idx.line_col(3), (2, 1));
    }
}
