//! Chunked delivery of a resolved byte window.
//!
//! [`send`] moves bytes from a seekable [`ByteSource`] into a
//! [`MediaSink`] in fixed-size chunks, strictly sequentially. The HTTP
//! layer emits response headers (including `Content-Length`) before the
//! seek below runs; a seek failure after that point leaves the client
//! with promised-but-undelivered bytes. That ordering is inherited
//! behavior and deliberately kept rather than fixed here.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, warn};

use super::range::ByteRange;

/// Transfer chunk size: 64 KiB.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A readable, seekable byte source of known total length.
pub trait ByteSource {
    /// Total length of the resource in bytes.
    fn len(&self) -> u64;

    /// Position the source at an absolute byte offset.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Read up to `buf.len()` bytes. A return of 0 means end of source.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// A writable sink with partial-write semantics.
pub trait MediaSink {
    /// Write up to `buf.len()` bytes, returning how many were accepted.
    /// A return of 0 means the client has disconnected.
    fn write(&mut self, buf: &[u8]) -> usize;
}

/// [`ByteSource`] over a regular file.
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    /// Open a file and capture its current length.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self { file, len })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// How a transfer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Every promised byte was delivered.
    Completed,
    /// The sink reported a closed connection; remaining bytes were
    /// discarded. Normal termination, never retried.
    Disconnected,
    /// The source ran out (or failed) before `content_length` bytes were
    /// read. The declared length is advisory once headers are on the
    /// wire, so this is logged rather than raised.
    Truncated,
}

/// Result of a transfer: how many bytes went out and why it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub bytes_sent: u64,
    pub outcome: SendOutcome,
}

/// Errors that abort a transfer before any payload byte moves.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Positioning the source at the range start failed.
    #[error("failed to seek media source: {0}")]
    Seek(#[source] io::Error),
}

/// Stream `range` (or the entire source when `None`) into `sink`.
///
/// Bytes are sent strictly sequentially from the range start, 64 KiB at
/// a time, never exceeding the computed content length. Partial sink
/// writes are continued with the remainder of the chunk; a zero-byte
/// write ends the transfer immediately.
pub fn send<S, K>(
    source: &mut S,
    range: Option<ByteRange>,
    sink: &mut K,
) -> Result<SendReport, SendError>
where
    S: ByteSource + ?Sized,
    K: MediaSink + ?Sized,
{
    let (start, content_length) = match range {
        Some(r) => (r.start, r.len()),
        None => (0, source.len()),
    };

    source.seek(start).map_err(SendError::Seek)?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut bytes_sent: u64 = 0;

    while bytes_sent < content_length {
        let remaining = content_length - bytes_sent;
        let want = CHUNK_SIZE.min(remaining.min(usize::MAX as u64) as usize);

        let n = match source.read(&mut buf[..want]) {
            Ok(0) => {
                debug!(bytes_sent, content_length, "end of source reached");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, bytes_sent, "error reading media source");
                break;
            }
        };

        let mut written = 0;
        while written < n {
            let w = sink.write(&buf[written..n]);
            if w == 0 {
                debug!(bytes_sent = bytes_sent + written as u64, "client disconnected during streaming");
                return Ok(SendReport {
                    bytes_sent: bytes_sent + written as u64,
                    outcome: SendOutcome::Disconnected,
                });
            }
            written += w;
        }

        bytes_sent += n as u64;
    }

    let outcome = if bytes_sent == content_length {
        SendOutcome::Completed
    } else {
        warn!(bytes_sent, content_length, "source exhausted before declared length");
        SendOutcome::Truncated
    };

    Ok(SendReport {
        bytes_sent,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory source; `truncate_at` simulates a file shorter than its
    /// declared length.
    struct MemSource {
        data: Vec<u8>,
        declared_len: u64,
        pos: usize,
        fail_seek: bool,
    }

    impl MemSource {
        fn new(data: Vec<u8>) -> Self {
            let declared_len = data.len() as u64;
            Self {
                data,
                declared_len,
                pos: 0,
                fail_seek: false,
            }
        }
    }

    impl ByteSource for MemSource {
        fn len(&self) -> u64 {
            self.declared_len
        }

        fn seek(&mut self, offset: u64) -> io::Result<()> {
            if self.fail_seek {
                return Err(io::Error::new(io::ErrorKind::Other, "seek failed"));
            }
            self.pos = offset as usize;
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let available = self.data.len().saturating_sub(self.pos);
            let n = buf.len().min(available);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Sink that records everything, optionally in dribbles, optionally
    /// dying after a byte budget.
    struct MemSink {
        received: Vec<u8>,
        max_write: usize,
        disconnect_after: Option<usize>,
    }

    impl MemSink {
        fn new() -> Self {
            Self {
                received: Vec::new(),
                max_write: usize::MAX,
                disconnect_after: None,
            }
        }
    }

    impl MediaSink for MemSink {
        fn write(&mut self, buf: &[u8]) -> usize {
            if let Some(budget) = self.disconnect_after {
                if self.received.len() >= budget {
                    return 0;
                }
            }
            let n = buf.len().min(self.max_write);
            self.received.extend_from_slice(&buf[..n]);
            n
        }
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn full_source_delivered_exactly() {
        let data = pattern(200_000); // spans several chunks
        let mut source = MemSource::new(data.clone());
        let mut sink = MemSink::new();

        let report = send(&mut source, None, &mut sink).unwrap();
        assert_eq!(report.outcome, SendOutcome::Completed);
        assert_eq!(report.bytes_sent, 200_000);
        assert_eq!(sink.received, data);
    }

    #[test]
    fn range_slice_delivered_in_order() {
        let data = pattern(100_000);
        let mut source = MemSource::new(data.clone());
        let mut sink = MemSink::new();
        let range = ByteRange {
            start: 1_000,
            end: 70_999,
        };

        let report = send(&mut source, Some(range), &mut sink).unwrap();
        assert_eq!(report.outcome, SendOutcome::Completed);
        assert_eq!(report.bytes_sent, 70_000);
        assert_eq!(sink.received, &data[1_000..71_000]);
    }

    #[test]
    fn never_exceeds_content_length() {
        let data = pattern(300_000);
        let mut source = MemSource::new(data);
        let mut sink = MemSink::new();
        let range = ByteRange { start: 0, end: 99 };

        let report = send(&mut source, Some(range), &mut sink).unwrap();
        assert_eq!(report.bytes_sent, 100);
        assert_eq!(sink.received.len(), 100);
    }

    #[test]
    fn partial_sink_writes_are_continued() {
        let data = pattern(10_000);
        let mut source = MemSource::new(data.clone());
        let mut sink = MemSink::new();
        sink.max_write = 37; // force many short writes per chunk

        let report = send(&mut source, None, &mut sink).unwrap();
        assert_eq!(report.outcome, SendOutcome::Completed);
        assert_eq!(sink.received, data);
    }

    #[test]
    fn disconnect_ends_transfer_without_error() {
        let data = pattern(500_000);
        let mut source = MemSource::new(data);
        let mut sink = MemSink::new();
        sink.disconnect_after = Some(70_000);

        let report = send(&mut source, None, &mut sink).unwrap();
        assert_eq!(report.outcome, SendOutcome::Disconnected);
        assert!(report.bytes_sent < 500_000);
        assert_eq!(report.bytes_sent, sink.received.len() as u64);
    }

    #[test]
    fn short_source_is_truncated_not_an_error() {
        let mut source = MemSource::new(pattern(1_000));
        source.declared_len = 5_000; // promises more than it holds
        let mut sink = MemSink::new();

        let report = send(&mut source, None, &mut sink).unwrap();
        assert_eq!(report.outcome, SendOutcome::Truncated);
        assert_eq!(report.bytes_sent, 1_000);
    }

    #[test]
    fn seek_failure_is_fatal() {
        let mut source = MemSource::new(pattern(100));
        source.fail_seek = true;
        let mut sink = MemSink::new();

        let err = send(&mut source, None, &mut sink).unwrap_err();
        assert_matches::assert_matches!(err, SendError::Seek(_));
        assert!(sink.received.is_empty());
    }

    #[test]
    fn empty_range_of_empty_source_completes() {
        let mut source = MemSource::new(Vec::new());
        let mut sink = MemSink::new();

        let report = send(&mut source, None, &mut sink).unwrap();
        assert_eq!(report.outcome, SendOutcome::Completed);
        assert_eq!(report.bytes_sent, 0);
    }

    #[test]
    fn file_source_reads_real_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.bin");
        let data = pattern(4_096);
        std::fs::write(&path, &data).unwrap();

        let mut source = FileSource::open(&path).unwrap();
        assert_eq!(ByteSource::len(&source), 4_096);

        let mut sink = MemSink::new();
        let range = ByteRange {
            start: 100,
            end: 1_099,
        };
        let report = send(&mut source, Some(range), &mut sink).unwrap();
        assert_eq!(report.outcome, SendOutcome::Completed);
        assert_eq!(sink.received, &data[100..1_100]);
    }
}
