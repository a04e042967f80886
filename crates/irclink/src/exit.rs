use std::fmt;
use std::io;

use irclink_frame::FramingError;
use irclink_session::SessionError;
use irclink_transport::TransportError;

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { ref source, .. }
            if source.kind() == io::ErrorKind::TimedOut =>
        {
            CliError::new(TIMEOUT, format!("{context}: {err}"))
        }
        TransportError::Context(_) | TransportError::NotInitialized => {
            CliError::new(INTERNAL, format!("{context}: {err}"))
        }
        TransportError::Closed | TransportError::Shutdown => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn framing_error(context: &str, err: FramingError) -> CliError {
    match err {
        FramingError::Transport(err) => transport_error(context, err),
        FramingError::PollFailed(source) => io_error(context, source),
        FramingError::LineTooLong { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FramingError::WriteTimedOut => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FramingError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Framing(err) => framing_error(context, err),
        SessionError::Disconnected => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}
