//! Non-blocking, poll-driven TLS client transport.
//!
//! This is the lowest layer of irclink. It opens a TCP connection, switches
//! it to non-blocking mode, drives the TLS handshake with readiness polling
//! and exposes raw read/peek/write primitives through the [`Transport`]
//! trait. Everything else builds on top of that trait.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod handshake;
#[cfg(unix)]
pub mod poll;
#[cfg(unix)]
pub mod tls;

#[cfg(feature = "mock")]
pub mod mock;

pub use error::{Result, TransportError};
pub use traits::{PollOutcome, ReadMode, Transport};

#[cfg(unix)]
pub use handshake::HandshakeState;
#[cfg(unix)]
pub use tls::{
    connect, initialize, is_initialized, ShutdownHandle, TlsConfiguration, TlsContext, TlsStream,
    TlsVersion, DEFAULT_ELLIPTIC_CURVES, DEFAULT_TLS12_CIPHERS, DEFAULT_TLS13_CIPHERSUITES,
};
