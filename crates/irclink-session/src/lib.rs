//! IRC client session.
//!
//! This is the layer application code talks to. A [`Session`] registers a
//! user and nick, joins channels, sends messages and hands back parsed
//! [`ProtocolMessage`]s, one per received line.

#[cfg(unix)]
pub mod connector;
pub mod error;
pub mod session;

#[cfg(unix)]
pub use connector::{connect, connect_with_config, connect_with_context, TlsSession};
pub use error::{Result, SessionError};
pub use irclink_proto::{Command, ProtocolMessage};
pub use session::{Registration, Session, SessionConfig};
