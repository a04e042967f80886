use std::time::Duration;

/// Maximum line size including the terminator (IRC's 512 doubled).
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024;

/// Consecutive poll timeouts tolerated before buffered input is discarded.
pub const DEFAULT_MAX_CONSECUTIVE_TIMEOUTS: u32 = 5;

/// Line terminator byte searched for by the framer.
pub const LINE_FEED: u8 = b'\n';

/// Configuration for line framing.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Maximum line size in bytes, terminator included. Default: 1024.
    pub max_line_bytes: usize,
    /// Per-wait read timeout. `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
    /// Timeouts in a row that trigger the drain-and-restart recovery.
    pub max_consecutive_timeouts: u32,
    /// Per-wait timeout while a write is blocked. `None` waits indefinitely.
    pub write_timeout: Option<Duration>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            read_timeout: None,
            max_consecutive_timeouts: DEFAULT_MAX_CONSECUTIVE_TIMEOUTS,
            write_timeout: None,
        }
    }
}

/// Find the first line feed in `buf` at or after `from`.
pub fn find_terminator(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .iter()
        .position(|&b| b == LINE_FEED)
        .map(|pos| from + pos)
}

/// Remove a trailing `\n` and then a trailing `\r`, if present.
///
/// Tolerates a bare `\n` terminator and lines shorter than two bytes.
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_terminator_from_offset() {
        let buf = b"one\r\ntwo\r\n";
        assert_eq!(find_terminator(buf, 0), Some(4));
        assert_eq!(find_terminator(buf, 5), Some(9));
        assert_eq!(find_terminator(buf, 10), None);
    }

    #[test]
    fn offset_past_end_finds_nothing() {
        assert_eq!(find_terminator(b"abc", 7), None);
        assert_eq!(find_terminator(b"", 0), None);
    }

    #[test]
    fn strips_crlf_and_bare_lf() {
        assert_eq!(strip_terminator(b"PING :x\r\n"), b"PING :x");
        assert_eq!(strip_terminator(b"PING :x\n"), b"PING :x");
        assert_eq!(strip_terminator(b"\n"), b"");
        assert_eq!(strip_terminator(b"\r\n"), b"");
        assert_eq!(strip_terminator(b""), b"");
    }

    #[test]
    fn keeps_interior_carriage_returns() {
        assert_eq!(strip_terminator(b"a\rb\r\n"), b"a\rb");
    }

    #[test]
    fn default_config() {
        let config = LineConfig::default();
        assert_eq!(config.max_line_bytes, 1024);
        assert_eq!(config.max_consecutive_timeouts, 5);
        assert!(config.read_timeout.is_none());
    }
}
