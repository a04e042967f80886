use irclink_transport::TransportError;

/// Errors that can occur while framing lines.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    /// Waiting for socket readiness failed.
    #[error("unable to poll for data: {0}")]
    PollFailed(std::io::Error),

    /// More than `max` bytes arrived without a line terminator.
    #[error("no line terminator within {max} bytes")]
    LineTooLong { max: usize },

    /// The peer closed the connection.
    #[error("connection closed")]
    ConnectionClosed,

    /// The transport stayed unwritable past the write timeout.
    #[error("timed out waiting to write")]
    WriteTimedOut,

    /// A hard transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

impl FramingError {
    /// Convert a transport error, folding end-of-stream into `ConnectionClosed`.
    pub(crate) fn from_transport(err: TransportError) -> Self {
        match err {
            TransportError::Closed => FramingError::ConnectionClosed,
            other => FramingError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FramingError>;
