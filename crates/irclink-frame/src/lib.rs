//! CRLF line framing over a non-blocking secure transport.
//!
//! A [`LineReader`] turns the raw byte stream of a
//! [`Transport`](irclink_transport::Transport) into complete text lines with
//! the terminator stripped. It handles partial reads, records that split a
//! line, and idle timeouts. Callers always get whole lines.

pub mod error;
pub mod line;
pub mod reader;
pub mod writer;

pub use error::{FramingError, Result};
pub use line::{
    find_terminator, strip_terminator, LineConfig, DEFAULT_MAX_CONSECUTIVE_TIMEOUTS,
    DEFAULT_MAX_LINE_BYTES,
};
pub use reader::{LineReader, LineStats};
pub use writer::write_all;
