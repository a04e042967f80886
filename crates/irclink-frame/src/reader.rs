use bytes::BytesMut;
use irclink_transport::{PollOutcome, ReadMode, Transport, TransportError};
use tracing::{debug, error, warn};

use crate::error::{FramingError, Result};
use crate::line::{find_terminator, strip_terminator, LineConfig};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Lifetime counters for a [`LineReader`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineStats {
    /// Complete lines returned.
    pub lines: u64,
    /// Times the drain-and-restart recovery ran.
    pub drains: u64,
    /// Bytes thrown away by drains.
    pub discarded_bytes: u64,
}

/// Reads complete CRLF-terminated lines from a [`Transport`].
///
/// Bytes are observed with non-consuming peeks and accumulated until a line
/// feed shows up; only then is the line consumed from the transport, so
/// anything after it stays in the transport for the next call. When a peek
/// cannot see past the bytes already buffered (a line split across TLS
/// records), the buffered prefix is consumed early to expose the next record.
pub struct LineReader<T> {
    inner: T,
    /// Observed bytes of the line in progress.
    buf: BytesMut,
    /// Leading bytes of `buf` already consumed from the transport.
    committed: usize,
    /// Leading bytes of `buf` already searched for a terminator.
    scan_offset: usize,
    consecutive_timeouts: u32,
    config: LineConfig,
    stats: LineStats,
}

impl<T: Transport> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            committed: 0,
            scan_offset: 0,
            consecutive_timeouts: 0,
            config,
            stats: LineStats::default(),
        }
    }

    /// Read the next complete line, terminator stripped.
    ///
    /// Blocks in the transport's readiness wait. After
    /// `max_consecutive_timeouts` timeouts in a row, every byte currently
    /// available is discarded, including a partially received line, and the
    /// read starts over. Invalid UTF-8 is replaced rather than rejected.
    pub fn read_line(&mut self) -> Result<String> {
        let max = self.config.max_line_bytes.max(1);

        loop {
            match self.inner.poll_readable(self.config.read_timeout) {
                PollOutcome::Failed(err) => {
                    error!(error = %err, "unable to poll");
                    return Err(FramingError::PollFailed(err));
                }
                PollOutcome::TimedOut => {
                    self.consecutive_timeouts += 1;
                    debug!(count = self.consecutive_timeouts, "polling timed out");
                    if self.consecutive_timeouts >= self.config.max_consecutive_timeouts {
                        self.drain()?;
                    }
                    continue;
                }
                PollOutcome::DataAvailable => self.consecutive_timeouts = 0,
            }

            let available = self
                .inner
                .available_bytes()
                .map_err(FramingError::from_transport)?;
            if available == 0 {
                continue;
            }

            // The peek window starts at the first byte still in the transport.
            let window = available.min(max - self.committed);
            let peeked = match self.inner.read(window, ReadMode::Peek) {
                Ok(bytes) => bytes,
                Err(TransportError::WouldBlock) => continue,
                Err(err) => return Err(FramingError::from_transport(err)),
            };

            let known = self.buf.len() - self.committed;
            if peeked.len() > known {
                self.buf.extend_from_slice(&peeked[known..]);
            } else {
                if known > 0 {
                    self.consume(known)?;
                    self.committed = self.buf.len();
                    debug!(committed = self.committed, "committed partial line");
                }
                continue;
            }

            if let Some(end) = find_terminator(&self.buf, self.scan_offset) {
                return self.take_line(end);
            }

            self.scan_offset = self.buf.len();
            if self.buf.len() >= max {
                warn!(max, "no line terminator within max bytes");
                self.clear();
                return Err(FramingError::LineTooLong { max });
            }
        }
    }

    fn take_line(&mut self, end: usize) -> Result<String> {
        let line_len = end + 1;
        self.consume(line_len - self.committed)?;

        let line = String::from_utf8_lossy(strip_terminator(&self.buf[..line_len])).into_owned();
        self.clear();
        self.consecutive_timeouts = 0;
        self.stats.lines += 1;
        debug!(len = line_len, "framed line");
        Ok(line)
    }

    /// Consume exactly `count` bytes that a previous peek has shown.
    fn consume(&mut self, count: usize) -> Result<()> {
        let mut remaining = count;
        while remaining > 0 {
            match self.inner.read(remaining, ReadMode::Consume) {
                Ok(bytes) if bytes.is_empty() => return Err(FramingError::ConnectionClosed),
                Ok(bytes) => remaining = remaining.saturating_sub(bytes.len()),
                Err(TransportError::WouldBlock) => {
                    if let PollOutcome::Failed(err) =
                        self.inner.poll_readable(self.config.read_timeout)
                    {
                        return Err(FramingError::PollFailed(err));
                    }
                }
                Err(err) => return Err(FramingError::from_transport(err)),
            }
        }
        Ok(())
    }

    /// Discard the line in progress and everything the transport has ready.
    fn drain(&mut self) -> Result<()> {
        let mut discarded = self.committed as u64;
        self.clear();

        loop {
            let available = self
                .inner
                .available_bytes()
                .map_err(FramingError::from_transport)?;
            if available == 0 {
                break;
            }
            match self.inner.read(available, ReadMode::Consume) {
                Ok(bytes) if bytes.is_empty() => break,
                Ok(bytes) => discarded += bytes.len() as u64,
                Err(TransportError::WouldBlock) => break,
                Err(err) => return Err(FramingError::from_transport(err)),
            }
        }

        self.consecutive_timeouts = 0;
        self.stats.drains += 1;
        self.stats.discarded_bytes += discarded;
        warn!(discarded, "peer stalled, discarded pending input and restarted read");
        Ok(())
    }
}

impl<T> LineReader<T> {
    /// Drop the partial line in progress and release its buffer space.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.committed = 0;
        self.scan_offset = 0;
    }

    /// Bytes of the partial line observed so far.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Timeouts seen in a row by the current read.
    pub fn consecutive_timeouts(&self) -> u32 {
        self.consecutive_timeouts
    }

    pub fn stats(&self) -> LineStats {
        self.stats
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    ///
    /// Reading from it directly desynchronizes the partial line in progress.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner transport.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the maximum line size for subsequent reads.
    pub fn set_max_line_bytes(&mut self, max_line_bytes: usize) {
        self.config.max_line_bytes = max_line_bytes;
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LineReader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineReader")
            .field("inner", &self.inner)
            .field("buffered", &self.buf.len())
            .field("committed", &self.committed)
            .field("config", &self.config)
            .finish()
    }
}
