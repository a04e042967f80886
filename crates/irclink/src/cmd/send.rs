use tracing::info;

use crate::cmd::{open_session, reject_line_breaks, SendArgs};
use crate::exit::{session_error, CliResult, SUCCESS};

pub fn run(args: SendArgs) -> CliResult<i32> {
    reject_line_breaks("target", &args.target)?;
    reject_line_breaks("text", &args.text)?;
    if let Some(channel) = &args.channel {
        reject_line_breaks("channel", channel)?;
    }

    let mut session = open_session(&args.connect)?;
    session
        .wait_until_registered()
        .map_err(|err| session_error("registration failed", err))?;

    if let Some(channel) = &args.channel {
        session
            .join(channel)
            .map_err(|err| session_error("join failed", err))?;
    }

    session
        .send_message(&args.target, &args.text)
        .map_err(|err| session_error("send failed", err))?;
    info!(to = %args.target, "message sent");

    session.disconnect();
    Ok(SUCCESS)
}
