use std::net::TcpStream;
use std::os::fd::AsRawFd;

use openssl::ssl::{ErrorCode, HandshakeError, MidHandshakeSslStream, Ssl, SslStream};
use tracing::{debug, error};

use crate::error::{Result, TransportError};
use crate::poll::{self, Interest};
use crate::traits::PollOutcome;

/// What a suspended client handshake is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// The last handshake step needs more bytes from the server.
    AwaitingReadable,
    /// The last handshake step could not flush its output.
    AwaitingWritable,
}

impl HandshakeState {
    /// Map an OpenSSL result code to the state it suspends in.
    ///
    /// Returns `None` for codes that end the handshake.
    pub fn from_code(code: ErrorCode) -> Option<Self> {
        if code == ErrorCode::WANT_READ {
            Some(HandshakeState::AwaitingReadable)
        } else if code == ErrorCode::WANT_WRITE {
            Some(HandshakeState::AwaitingWritable)
        } else {
            None
        }
    }

    /// The socket readiness that resumes this state.
    pub fn interest(self) -> Interest {
        match self {
            HandshakeState::AwaitingReadable => Interest::Readable,
            HandshakeState::AwaitingWritable => Interest::Writable,
        }
    }
}

/// Drive a client handshake over a non-blocking socket to completion.
///
/// Each step either completes, fails, or suspends in a [`HandshakeState`];
/// a suspended step blocks in `poll(2)` without a timeout before the next
/// attempt. A peer that stalls forever therefore blocks the caller forever.
pub(crate) fn drive(ssl: Ssl, stream: TcpStream, host: &str) -> Result<SslStream<TcpStream>> {
    let fd = stream.as_raw_fd();
    let mut attempt = ssl.connect(stream);

    loop {
        let mid = match attempt {
            Ok(stream) => return Ok(stream),
            Err(HandshakeError::WouldBlock(mid)) => mid,
            Err(HandshakeError::SetupFailure(stack)) => {
                error!(host, error = %stack, "unable to set up TLS handshake");
                return Err(TransportError::Context(stack));
            }
            Err(HandshakeError::Failure(mid)) => return Err(failure(host, mid)),
        };

        let Some(state) = HandshakeState::from_code(mid.error().code()) else {
            return Err(failure(host, mid));
        };

        debug!(host, ?state, "TLS handshake suspended");
        if let PollOutcome::Failed(err) = poll::wait(fd, state.interest(), None) {
            error!(host, error = %err, "could not wait for handshake readiness");
            return Err(TransportError::Io(err));
        }

        attempt = mid.handshake();
    }
}

fn failure(host: &str, mid: MidHandshakeSslStream<TcpStream>) -> TransportError {
    let source = mid.into_error();
    error!(host, code = source.code().as_raw(), error = %source, "TLS handshake failed");
    TransportError::Handshake {
        host: host.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn want_codes_map_to_states() {
        assert_eq!(
            HandshakeState::from_code(ErrorCode::WANT_READ),
            Some(HandshakeState::AwaitingReadable)
        );
        assert_eq!(
            HandshakeState::from_code(ErrorCode::WANT_WRITE),
            Some(HandshakeState::AwaitingWritable)
        );
    }

    #[test]
    fn terminal_codes_have_no_state() {
        assert_eq!(HandshakeState::from_code(ErrorCode::SSL), None);
        assert_eq!(HandshakeState::from_code(ErrorCode::SYSCALL), None);
        assert_eq!(HandshakeState::from_code(ErrorCode::ZERO_RETURN), None);
    }

    #[test]
    fn states_wait_on_matching_interest() {
        assert_eq!(
            HandshakeState::AwaitingReadable.interest(),
            Interest::Readable
        );
        assert_eq!(
            HandshakeState::AwaitingWritable.interest(),
            Interest::Writable
        );
    }
}
