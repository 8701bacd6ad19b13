//! Time-to-byte offset estimation for `start=<seconds>` seek requests.
//!
//! No keyframe index is consulted; the offset is a bitrate-based
//! approximation only. Callers turn the result into an open-ended byte
//! range covering the remainder of the file.

use tracing::debug;

/// Bytes transferred per second per kbps of bitrate (1000 / 8).
pub const BYTES_PER_SEC_PER_KBPS: u64 = 125;

/// Average bitrate assumed when a file carries no bitrate metadata.
pub const FALLBACK_BITRATE_KBPS: u64 = 2000;

/// Estimate the byte offset for a playback time in whole seconds.
///
/// Returns `None` when `start_param` is not a non-negative integer. A
/// missing or non-positive `bitrate_kbps` falls back to
/// [`FALLBACK_BITRATE_KBPS`]; the estimate never fails just because
/// bitrate metadata is absent.
pub fn estimate(start_param: &str, bitrate_kbps: i64) -> Option<u64> {
    let start_sec: u64 = start_param.trim().parse().ok()?;

    let effective_kbps = if bitrate_kbps > 0 {
        bitrate_kbps as u64
    } else {
        FALLBACK_BITRATE_KBPS
    };

    let offset = start_sec
        .saturating_mul(effective_kbps)
        .saturating_mul(BYTES_PER_SEC_PER_KBPS);

    debug!(start_sec, effective_kbps, offset, "estimated seek offset");
    Some(offset)
}
