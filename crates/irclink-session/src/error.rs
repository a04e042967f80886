/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] irclink_transport::TransportError),

    /// Line framing error.
    #[error("framing error: {0}")]
    Framing(#[from] irclink_frame::FramingError),

    /// The session was already disconnected.
    #[error("session disconnected")]
    Disconnected,
}

impl SessionError {
    /// Whether the error means the peer went away, as opposed to a local failure.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            SessionError::Disconnected
                | SessionError::Transport(irclink_transport::TransportError::Closed)
                | SessionError::Framing(irclink_frame::FramingError::ConnectionClosed)
        )
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
