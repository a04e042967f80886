use std::net::SocketAddr;

use openssl::error::ErrorStack;

/// Errors that can occur in secure transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The hostname could not be resolved.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        source: std::io::Error,
    },

    /// The hostname resolved to no usable address.
    #[error("no address found for {host}")]
    NoAddress { host: String },

    /// Failed to open a TCP connection to the resolved address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Failed to configure the socket (non-blocking mode, cloning).
    #[error("socket setup failed: {0}")]
    Socket(std::io::Error),

    /// OpenSSL rejected the context or per-connection configuration.
    #[error("TLS context error: {0}")]
    Context(#[from] ErrorStack),

    /// The TLS handshake failed definitively.
    #[error("TLS handshake with {host} failed: {source}")]
    Handshake {
        host: String,
        source: openssl::ssl::Error,
    },

    /// An I/O error occurred on the underlying socket.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A TLS protocol error not backed by an OS error.
    #[error("TLS protocol error: {0}")]
    Ssl(openssl::ssl::Error),

    /// The operation cannot complete without blocking.
    #[error("operation would block")]
    WouldBlock,

    /// The peer closed the encrypted channel.
    #[error("connection closed by peer")]
    Closed,

    /// `connect` was called before `initialize`.
    #[error("TLS context not initialized")]
    NotInitialized,

    /// `initialize` was called more than once.
    #[error("TLS context already initialized")]
    AlreadyInitialized,

    /// The transport has been disconnected.
    #[error("transport shut down")]
    Shutdown,
}

impl TransportError {
    /// Returns true for the transient would-block condition.
    pub fn is_would_block(&self) -> bool {
        matches!(self, TransportError::WouldBlock)
    }

    /// The raw OS error code behind an I/O failure, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            TransportError::Io(err)
            | TransportError::Socket(err)
            | TransportError::Resolve { source: err, .. }
            | TransportError::Connect { source: err, .. } => err.raw_os_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
