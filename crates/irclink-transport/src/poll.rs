use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use tracing::debug;

use crate::traits::PollOutcome;

/// The readiness a caller is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Readable,
    Writable,
}

impl Interest {
    fn events(self) -> libc::c_short {
        match self {
            Interest::Readable => libc::POLLIN,
            Interest::Writable => libc::POLLOUT,
        }
    }
}

/// Convert an optional timeout into `poll(2)` milliseconds (`-1` = forever).
///
/// Sub-millisecond timeouts round up so that a non-zero wait never turns
/// into a busy spin.
pub fn timeout_millis(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        None => -1,
        Some(duration) => {
            let mut millis = duration.as_millis();
            if millis == 0 && !duration.is_zero() {
                millis = 1;
            }
            millis.min(libc::c_int::MAX as u128) as libc::c_int
        }
    }
}

/// Block until `fd` is ready for `interest` or `timeout` elapses.
///
/// Error and hang-up conditions are reported as `DataAvailable` so that the
/// following read or write surfaces the real cause. An invalid descriptor is
/// reported as `Failed`.
pub fn wait(fd: RawFd, interest: Interest, timeout: Option<Duration>) -> PollOutcome {
    let millis = timeout_millis(timeout);
    let mut descriptor = libc::pollfd {
        fd,
        events: interest.events(),
        revents: 0,
    };

    loop {
        debug!(fd, ?interest, timeout_ms = millis, "waiting for socket readiness");
        // SAFETY: `descriptor` is a valid, exclusively borrowed pollfd and the
        // count passed matches the single element provided.
        let status = unsafe { libc::poll(&mut descriptor, 1, millis) };

        if status < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return PollOutcome::Failed(err);
        }

        if status == 0 {
            return PollOutcome::TimedOut;
        }

        if descriptor.revents & libc::POLLNVAL != 0 {
            return PollOutcome::Failed(io::Error::from_raw_os_error(libc::EBADF));
        }

        return PollOutcome::DataAvailable;
    }
}
