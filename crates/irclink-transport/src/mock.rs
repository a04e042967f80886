//! Scripted in-memory transport for tests.
//!
//! Data arrives as discrete records, one per readiness wake, mirroring how
//! TLS delivers application data: `available_bytes` reports what is left of
//! the oldest record, and reads and peeks never cross a record boundary.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Result, TransportError};
use crate::traits::{PollOutcome, ReadMode, Transport};

/// One scripted step, consumed by `poll_readable` when no record is pending.
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// A record arrives. An empty record is a spurious wake-up.
    Record(Bytes),
    /// The readiness wait times out.
    Timeout,
    /// The readiness wait fails.
    PollFailure,
    /// The peer closes the channel.
    Close,
}

/// Counters describing how the transport was driven.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MockStats {
    pub polls: usize,
    pub timeouts: usize,
    pub peeks: usize,
    pub consumed: usize,
    pub disconnect_calls: usize,
}

/// In-memory [`Transport`] driven by a script of [`MockEvent`]s.
///
/// Once the script is exhausted the peer is treated as closed.
#[derive(Debug)]
pub struct MockTransport {
    script: VecDeque<MockEvent>,
    records: VecDeque<Bytes>,
    closed: bool,
    connected: bool,
    written: BytesMut,
    write_chunk: Option<usize>,
    blocked_writes: usize,
    stats: MockStats,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            records: VecDeque::new(),
            closed: false,
            connected: true,
            written: BytesMut::new(),
            write_chunk: None,
            blocked_writes: 0,
            stats: MockStats::default(),
        }
    }

    /// Create a transport that plays back `events` in order.
    pub fn with_script(events: impl IntoIterator<Item = MockEvent>) -> Self {
        let mut transport = Self::new();
        transport.script.extend(events);
        transport
    }

    /// Create a transport delivering each chunk as its own record.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self::with_script(
            chunks
                .into_iter()
                .map(|chunk| MockEvent::Record(Bytes::copy_from_slice(chunk.as_ref()))),
        )
    }

    /// Append a step to the script.
    pub fn push(&mut self, event: MockEvent) {
        self.script.push_back(event);
    }

    /// Accept at most `n` bytes per `write` call.
    pub fn with_write_chunk(mut self, n: usize) -> Self {
        self.write_chunk = Some(n);
        self
    }

    /// Make the next `n` writes report would-block.
    pub fn with_blocked_writes(mut self, n: usize) -> Self {
        self.blocked_writes = n;
        self
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Written bytes split into CRLF-terminated lines, terminators removed.
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written)
            .split_terminator("\r\n")
            .map(str::to_string)
            .collect()
    }

    /// Bytes delivered but not yet consumed.
    pub fn unconsumed(&self) -> usize {
        self.records.iter().map(Bytes::len).sum()
    }

    /// Steps left in the script.
    pub fn remaining_script(&self) -> usize {
        self.script.len()
    }

    pub fn stats(&self) -> &MockStats {
        &self.stats
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(TransportError::Shutdown)
        }
    }
}

impl Transport for MockTransport {
    fn poll_readable(&mut self, _timeout: Option<Duration>) -> PollOutcome {
        self.stats.polls += 1;
        if !self.connected {
            return PollOutcome::Failed(io::Error::new(
                io::ErrorKind::NotConnected,
                "transport shut down",
            ));
        }
        if !self.records.is_empty() || self.closed {
            return PollOutcome::DataAvailable;
        }

        match self.script.pop_front() {
            Some(MockEvent::Record(record)) => {
                if !record.is_empty() {
                    self.records.push_back(record);
                }
                PollOutcome::DataAvailable
            }
            Some(MockEvent::Timeout) => {
                self.stats.timeouts += 1;
                PollOutcome::TimedOut
            }
            Some(MockEvent::PollFailure) => {
                PollOutcome::Failed(io::Error::other("scripted poll failure"))
            }
            Some(MockEvent::Close) | None => {
                self.closed = true;
                PollOutcome::DataAvailable
            }
        }
    }

    fn poll_writable(&mut self, _timeout: Option<Duration>) -> PollOutcome {
        if self.connected {
            PollOutcome::DataAvailable
        } else {
            PollOutcome::Failed(io::Error::new(
                io::ErrorKind::NotConnected,
                "transport shut down",
            ))
        }
    }

    fn available_bytes(&mut self) -> Result<usize> {
        self.ensure_connected()?;
        match self.records.front() {
            Some(record) => Ok(record.len()),
            None if self.closed => Err(TransportError::Closed),
            None => Ok(0),
        }
    }

    fn read(&mut self, len: usize, mode: ReadMode) -> Result<Bytes> {
        self.ensure_connected()?;
        let Some(record) = self.records.front_mut() else {
            return Err(if self.closed {
                TransportError::Closed
            } else {
                TransportError::WouldBlock
            });
        };

        let n = len.min(record.len());
        let data = record.slice(..n);
        match mode {
            ReadMode::Peek => self.stats.peeks += 1,
            ReadMode::Consume => {
                record.advance(n);
                if record.is_empty() {
                    self.records.pop_front();
                }
                self.stats.consumed += n;
            }
        }
        Ok(data)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.ensure_connected()?;
        if self.blocked_writes > 0 {
            self.blocked_writes -= 1;
            return Err(TransportError::WouldBlock);
        }
        let n = buf.len().min(self.write_chunk.unwrap_or(usize::MAX));
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn disconnect(&mut self) {
        self.stats.disconnect_calls += 1;
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
