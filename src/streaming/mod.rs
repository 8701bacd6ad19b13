//! Media streaming core.
//!
//! Three stateless pieces that each request-handling thread invokes on
//! its own arguments, with no shared mutable state:
//!
//! - [`range`] resolves an HTTP `Range` header against a known file size
//! - [`offset`] estimates a byte offset from a `start=<seconds>` query
//!   parameter and a file's average bitrate
//! - [`sender`] delivers a resolved byte window in fixed-size chunks,
//!   handling partial writes and client disconnects

pub mod offset;
pub mod range;
pub mod sender;

pub use offset::estimate;
pub use range::{resolve_range, ByteRange, RangeError};
pub use sender::{send, ByteSource, FileSource, MediaSink, SendOutcome, SendReport, CHUNK_SIZE};
