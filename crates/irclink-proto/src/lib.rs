//! IRC line grammar.
//!
//! [`ProtocolMessage`] decomposes one framed line into sender, command,
//! target and trailing text. [`Command`] formats the outgoing lines a client
//! sends. Neither escapes its input: arguments must not contain CR or LF.

pub mod command;
pub mod message;

pub use command::Command;
pub use message::ProtocolMessage;

/// Line terminator appended to every outgoing command.
pub const CRLF: &str = "\r\n";
