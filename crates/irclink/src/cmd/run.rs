use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use irclink_transport::ShutdownHandle;
use tracing::info;

use crate::cmd::{open_session, reject_line_breaks, RunArgs};
use crate::exit::{session_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    if let Some(channel) = &args.channel {
        reject_line_breaks("channel", channel)?;
    }

    let mut session = open_session(&args.connect)?;

    let running = Arc::new(AtomicBool::new(true));
    let handle = session
        .transport()
        .shutdown_handle()
        .map_err(|err| transport_error("shutdown handle", err))?;
    install_ctrlc_handler(running.clone(), handle)?;

    match session.wait_until_registered() {
        Ok(_) => {}
        Err(_) if !running.load(Ordering::SeqCst) => return Ok(SUCCESS),
        Err(err) => return Err(session_error("registration failed", err)),
    }

    if let Some(channel) = &args.channel {
        session
            .join(channel)
            .map_err(|err| session_error("join failed", err))?;
        info!(channel = %channel, "joined");
    }

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let message = match session.read_message() {
            Ok(message) => message,
            Err(_) if !running.load(Ordering::SeqCst) => break,
            Err(err) => return Err(session_error("receive failed", err)),
        };

        if message.is_ping() {
            let token = message.trailing().or(message.target()).unwrap_or_default();
            session
                .pong_reply(token)
                .map_err(|err| session_error("pong failed", err))?;
        }

        print_message(&message, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    session.disconnect();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>, handle: ShutdownHandle) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        // Wakes a read blocked in poll.
        let _ = handle.shutdown();
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
