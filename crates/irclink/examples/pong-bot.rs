//! Minimal bot that registers, joins a channel and echoes messages back.
//!
//! Run with:
//!   IRC_SERVER=irc.libera.chat IRC_USER=irclinkbot IRC_CHANNEL='#irclink-test' \
//!     cargo run --example pong-bot
//!
//! Answers keep-alive pings and repeats every channel message it sees.

use irclink::session::{connect, ProtocolMessage};
use irclink::transport::{initialize, TlsConfiguration};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server = std::env::var("IRC_SERVER")?;
    let port = std::env::var("IRC_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(6697);
    let user = std::env::var("IRC_USER")?;
    let nick = std::env::var("IRC_NICK").unwrap_or_else(|_| user.clone());
    let gecos = std::env::var("IRC_GECOS").unwrap_or_else(|_| nick.clone());
    let channel = std::env::var("IRC_CHANNEL")?;

    initialize(&TlsConfiguration::default())?;
    let mut session = connect(&server, port, &user, &nick, &gecos)?;
    let welcome = session.wait_until_registered()?;
    eprintln!("Registered with {}", welcome.sender().unwrap_or(&server));

    session.join(&channel)?;
    eprintln!("Joined {channel}");

    loop {
        let message: ProtocolMessage = match session.read_message() {
            Ok(message) => message,
            Err(e) => {
                eprintln!("Session ended: {e}");
                break;
            }
        };

        if message.is_ping() {
            session.pong_reply(message.trailing().unwrap_or(&server))?;
        } else if message.is_privmsg() && message.target() == Some(channel.as_str()) {
            let from = message.sender().unwrap_or("someone");
            let text = message.trailing().unwrap_or_default();
            session.send_message(&channel, &format!("{from} said: {text}"))?;
        }
    }

    session.disconnect();
    Ok(())
}
