use std::time::Duration;

use irclink_transport::{PollOutcome, Transport, TransportError};
use tracing::{debug, trace};

use crate::error::{FramingError, Result};

/// Write all of `data`, waiting for writability whenever the transport
/// would block.
///
/// `timeout` bounds each individual wait, not the whole write.
pub fn write_all<T: Transport + ?Sized>(
    transport: &mut T,
    data: &[u8],
    timeout: Option<Duration>,
) -> Result<()> {
    let mut written = 0;
    while written < data.len() {
        match transport.write(&data[written..]) {
            Ok(0) => return Err(FramingError::ConnectionClosed),
            Ok(n) => {
                written += n;
                trace!(written, total = data.len(), "partial write");
            }
            Err(TransportError::WouldBlock) => match transport.poll_writable(timeout) {
                PollOutcome::DataAvailable => {}
                PollOutcome::TimedOut => {
                    debug!(written, total = data.len(), "write timed out");
                    return Err(FramingError::WriteTimedOut);
                }
                PollOutcome::Failed(err) => return Err(FramingError::PollFailed(err)),
            },
            Err(err) => return Err(FramingError::from_transport(err)),
        }
    }
    Ok(())
}
