//! HTTP `Range` header resolution.

use tracing::debug;

/// An inclusive byte interval within a resource of known total length.
///
/// Invariant: `start <= end < file_size` for every range produced by
/// [`resolve_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the interval.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Why a `Range` header was rejected.
///
/// Callers map both variants to a 416 response; the distinction matters
/// for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The header does not match `bytes=<start>-<end>`.
    #[error("malformed Range header")]
    Malformed,

    /// The requested interval lies outside the resource.
    #[error("range not satisfiable")]
    NotSatisfiable,
}

/// Resolve a `Range` header against a file size.
///
/// `Ok(None)` means no header was supplied and the whole resource should
/// be served. Supported forms, per RFC 9110 single-range syntax:
///
/// - `bytes=-N` - the last `N` bytes
/// - `bytes=N-` - from `N` to the end
/// - `bytes=N-M` - the inclusive interval `[N, M]`
///
/// An `end` past the last byte is clamped; a `start` past the last byte
/// is not satisfiable. Multi-range requests are treated as malformed.
pub fn resolve_range(
    header: Option<&str>,
    file_size: u64,
) -> Result<Option<ByteRange>, RangeError> {
    let Some(header) = header else {
        return Ok(None);
    };

    let spec = header.strip_prefix("bytes=").ok_or_else(|| {
        debug!(header, "Range header missing bytes= prefix");
        RangeError::Malformed
    })?;

    let parts: Vec<&str> = spec.split('-').collect();
    if parts.len() != 2 {
        return Err(RangeError::Malformed);
    }

    let (start_part, end_part) = (parts[0].trim(), parts[1].trim());

    let (start, end) = match (start_part.is_empty(), end_part.is_empty()) {
        // bytes=-N: suffix of N bytes
        (true, false) => {
            let suffix_len: u64 = end_part.parse().map_err(|_| RangeError::Malformed)?;
            (
                file_size.saturating_sub(suffix_len),
                file_size.saturating_sub(1),
            )
        }
        // bytes=N-: open-ended
        (false, true) => {
            let start: u64 = start_part.parse().map_err(|_| RangeError::Malformed)?;
            (start, file_size.saturating_sub(1))
        }
        // bytes=N-M: closed interval
        (false, false) => {
            let start: u64 = start_part.parse().map_err(|_| RangeError::Malformed)?;
            let end: u64 = end_part.parse().map_err(|_| RangeError::Malformed)?;
            (start, end)
        }
        // bytes=-
        (true, true) => return Err(RangeError::Malformed),
    };

    // Validation order matters: start bound first, then clamp, then the
    // start/end relation on the clamped value.
    if start >= file_size {
        debug!(start, file_size, "range start out of bounds");
        return Err(RangeError::NotSatisfiable);
    }

    let end = end.min(file_size - 1);

    if start > end {
        debug!(start, end, "range start past end after clamping");
        return Err(RangeError::NotSatisfiable);
    }

    Ok(Some(ByteRange { start, end }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_header_serves_whole_resource() {
        assert_eq!(resolve_range(None, 1000), Ok(None));
    }

    #[test]
    fn closed_range_kept_unchanged() {
        assert_eq!(
            resolve_range(Some("bytes=0-499"), 1000),
            Ok(Some(ByteRange { start: 0, end: 499 }))
        );
        assert_eq!(
            resolve_range(Some("bytes=500-999"), 1000),
            Ok(Some(ByteRange {
                start: 500,
                end: 999
            }))
        );
    }

    #[test]
    fn open_range_runs_to_last_byte() {
        assert_eq!(
            resolve_range(Some("bytes=500-"), 1000),
            Ok(Some(ByteRange {
                start: 500,
                end: 999
            }))
        );
    }

    #[test]
    fn suffix_range_takes_last_n_bytes() {
        assert_eq!(
            resolve_range(Some("bytes=-100"), 1000),
            Ok(Some(ByteRange {
                start: 900,
                end: 999
            }))
        );
    }

    #[test]
    fn oversized_suffix_clamps_to_start_of_file() {
        assert_eq!(
            resolve_range(Some("bytes=-5000"), 1000),
            Ok(Some(ByteRange { start: 0, end: 999 }))
        );
    }

    #[test]
    fn start_at_file_size_is_unsatisfiable() {
        assert_eq!(
            resolve_range(Some("bytes=1000-"), 1000),
            Err(RangeError::NotSatisfiable)
        );
        // Regardless of the end value.
        assert_eq!(
            resolve_range(Some("bytes=1000-2000"), 1000),
            Err(RangeError::NotSatisfiable)
        );
    }

    #[test]
    fn end_past_file_size_is_clamped() {
        assert_eq!(
            resolve_range(Some("bytes=100-2000"), 1000),
            Ok(Some(ByteRange {
                start: 100,
                end: 999
            }))
        );
    }

    #[test]
    fn zero_byte_suffix_is_unsatisfiable() {
        assert_eq!(
            resolve_range(Some("bytes=-0"), 1000),
            Err(RangeError::NotSatisfiable)
        );
    }

    #[test]
    fn empty_file_satisfies_nothing() {
        assert_eq!(
            resolve_range(Some("bytes=0-"), 0),
            Err(RangeError::NotSatisfiable)
        );
        assert_eq!(resolve_range(None, 0), Ok(None));
    }

    #[test]
    fn malformed_headers_rejected() {
        for header in [
            "bites=0-499",
            "bytes=",
            "bytes=-",
            "bytes=abc-def",
            "bytes=12",
            "0-499",
        ] {
            assert_eq!(
                resolve_range(Some(header), 1000),
                Err(RangeError::Malformed),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn multi_range_is_malformed() {
        assert_eq!(
            resolve_range(Some("bytes=0-99,200-299"), 1000),
            Err(RangeError::Malformed)
        );
    }

    #[test]
    fn resolved_length_matches_interval() {
        let range = resolve_range(Some("bytes=-100"), 1000).unwrap().unwrap();
        assert_eq!(range.len(), 100);
    }
}
