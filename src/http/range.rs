//! HTTP Range request parsing module
//!
//! Single `bytes=` ranges only (RFC 7233). Multi-range requests are answered
//! with the full representation.

/// Inclusive byte range within a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for a file of `total` bytes
    pub fn content_range(self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// What a `Range` header asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No header, another unit, multiple ranges or garbage: send everything
    Full,
    /// A satisfiable range, answered with 206
    Partial(ByteRange),
    /// Nothing of the file lies in the range, answered with 416
    NotSatisfiable,
}

impl RangeRequest {
    /// Parse a `Range` header against a file of `file_size` bytes
    ///
    /// Supported forms: `bytes=start-end`, `bytes=start-` and `bytes=-suffix`.
    pub fn parse(header: Option<&str>, file_size: usize) -> Self {
        let Some(ranges) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
            return Self::Full;
        };
        if ranges.contains(',') {
            return Self::Full;
        }
        let Some((first, last)) = ranges.split_once('-') else {
            return Self::Full;
        };
        let (first, last) = (first.trim(), last.trim());

        if first.is_empty() {
            return Self::suffix(last, file_size);
        }

        let Ok(start) = first.parse::<usize>() else {
            return Self::Full;
        };
        let end = if last.is_empty() {
            None
        } else {
            match last.parse::<usize>() {
                Ok(end) => Some(end),
                Err(_) => return Self::Full,
            }
        };

        if start >= file_size {
            return Self::NotSatisfiable;
        }
        let end = end.map_or(file_size - 1, |e| e.min(file_size - 1));
        if start > end {
            return Self::NotSatisfiable;
        }

        Self::Partial(ByteRange { start, end })
    }

    /// Last `n` bytes; a suffix longer than the file selects all of it
    fn suffix(last: &str, file_size: usize) -> Self {
        let Ok(n) = last.parse::<usize>() else {
            return Self::Full;
        };
        if n == 0 || file_size == 0 {
            return Self::NotSatisfiable;
        }
        Self::Partial(ByteRange {
            start: file_size.saturating_sub(n),
            end: file_size - 1,
        })
    }
}
