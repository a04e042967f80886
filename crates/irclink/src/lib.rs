//! Minimal IRC client core over a non-blocking TLS transport.
//!
//! irclink connects to an IRC server over TLS, frames the encrypted byte
//! stream into CRLF-terminated lines and parses each line into a structured
//! message.
//!
//! # Crate Structure
//!
//! - [`transport`]: Non-blocking, poll-driven TLS client transport
//! - [`frame`]: CRLF line framing with timeout recovery
//! - [`proto`]: Line parsing and outgoing command formatting
//! - [`session`]: Register, join, read and write (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use irclink_transport::*;
}

/// Re-export framing types.
pub mod frame {
    pub use irclink_frame::*;
}

/// Re-export protocol types.
pub mod proto {
    pub use irclink_proto::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use irclink_session::*;
}
