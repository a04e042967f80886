use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// Result of a readiness wait.
#[derive(Debug)]
pub enum PollOutcome {
    /// The socket is ready for the requested operation, or the TLS layer
    /// already holds decoded application data.
    DataAvailable,
    /// The timeout elapsed without the socket becoming ready.
    TimedOut,
    /// The wait itself failed.
    Failed(std::io::Error),
}

impl PollOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::DataAvailable)
    }
}

/// How a read treats the bytes it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Remove the returned bytes from the channel.
    Consume,
    /// Leave the returned bytes in the channel for the next read.
    Peek,
}

/// A non-blocking, bidirectional byte channel with readiness polling.
///
/// Implemented by [`crate::TlsStream`] for real connections and by the
/// scripted `MockTransport` (feature `mock`) for tests. Hard errors are
/// surfaced immediately; implementations never retry internally.
pub trait Transport {
    /// Wait up to `timeout` (forever when `None`) for readable data.
    fn poll_readable(&mut self, timeout: Option<Duration>) -> PollOutcome;

    /// Wait up to `timeout` (forever when `None`) until a write can proceed.
    fn poll_writable(&mut self, timeout: Option<Duration>) -> PollOutcome;

    /// Number of bytes that can be read right now without blocking.
    fn available_bytes(&mut self) -> Result<usize>;

    /// Read up to `len` bytes.
    ///
    /// Returns [`crate::TransportError::WouldBlock`] when nothing can be read
    /// without blocking.
    fn read(&mut self, len: usize, mode: ReadMode) -> Result<Bytes>;

    /// Write as much of `buf` as the channel accepts in one call.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Best-effort orderly shutdown. Calling it again is a no-op.
    fn disconnect(&mut self);

    /// Whether `disconnect` has not yet been called.
    fn is_connected(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn poll_readable(&mut self, timeout: Option<Duration>) -> PollOutcome {
        (**self).poll_readable(timeout)
    }

    fn poll_writable(&mut self, timeout: Option<Duration>) -> PollOutcome {
        (**self).poll_writable(timeout)
    }

    fn available_bytes(&mut self) -> Result<usize> {
        (**self).available_bytes()
    }

    fn read(&mut self, len: usize, mode: ReadMode) -> Result<Bytes> {
        (**self).read(len, mode)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).write(buf)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
