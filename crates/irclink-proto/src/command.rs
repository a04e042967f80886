use std::fmt;

use crate::CRLF;

/// An outgoing IRC command.
///
/// Arguments are interpolated verbatim. Callers must keep CR and LF out of
/// them, otherwise the peer sees extra lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `USER <user> <user> <user> :<gecos>`
    User { user: &'a str, gecos: &'a str },
    /// `NICK <nick>`
    Nick(&'a str),
    /// `JOIN <channel>`
    Join(&'a str),
    /// `PART <channel>`
    Part(&'a str),
    /// `PRIVMSG <target> :<text>`
    Privmsg { target: &'a str, text: &'a str },
    /// `PONG <origin> <destination>`, or `PONG :<origin>` without a destination.
    Pong {
        origin: &'a str,
        destination: Option<&'a str>,
    },
    /// A line sent as is.
    Raw(&'a str),
}

impl Command<'_> {
    /// Command name as it appears on the wire.
    pub fn name(&self) -> &str {
        match self {
            Command::User { .. } => "USER",
            Command::Nick(_) => "NICK",
            Command::Join(_) => "JOIN",
            Command::Part(_) => "PART",
            Command::Privmsg { .. } => "PRIVMSG",
            Command::Pong { .. } => "PONG",
            Command::Raw(line) => line.split(' ').next().unwrap_or_default(),
        }
    }

    /// The full wire line, CRLF included.
    pub fn to_line(&self) -> String {
        format!("{self}{CRLF}")
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::User { user, gecos } => write!(f, "USER {user} {user} {user} :{gecos}"),
            Command::Nick(nick) => write!(f, "NICK {nick}"),
            Command::Join(channel) => write!(f, "JOIN {channel}"),
            Command::Part(channel) => write!(f, "PART {channel}"),
            Command::Privmsg { target, text } => write!(f, "PRIVMSG {target} :{text}"),
            Command::Pong {
                origin,
                destination: Some(destination),
            } => write!(f, "PONG {origin} {destination}"),
            Command::Pong {
                origin,
                destination: None,
            } => write!(f, "PONG :{origin}"),
            Command::Raw(line) => f.write_str(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProtocolMessage;

    #[test]
    fn registration_lines() {
        let user = Command::User {
            user: "bot",
            gecos: "A friendly bot",
        };
        assert_eq!(user.to_line(), "USER bot bot bot :A friendly bot\r\n");
        assert_eq!(Command::Nick("bot").to_line(), "NICK bot\r\n");
    }

    #[test]
    fn channel_lines() {
        assert_eq!(Command::Join("#rust").to_string(), "JOIN #rust");
        assert_eq!(Command::Part("#rust").to_string(), "PART #rust");
    }

    #[test]
    fn pong_forms() {
        let two_server = Command::Pong {
            origin: "bot",
            destination: Some("irc.example.net"),
        };
        assert_eq!(two_server.to_string(), "PONG bot irc.example.net");

        let token = Command::Pong {
            origin: "irc.example.net",
            destination: None,
        };
        assert_eq!(token.to_line(), "PONG :irc.example.net\r\n");
    }

    #[test]
    fn privmsg_survives_parsing() {
        for text in ["hello world", ":leading colon", "a: b: c", ""] {
            let line = Command::Privmsg {
                target: "#chan",
                text,
            }
            .to_string();
            let message = ProtocolMessage::parse(&line);
            assert_eq!(message.target(), Some("#chan"));
            assert_eq!(message.trailing(), Some(text));
        }
    }

    #[test]
    fn names() {
        assert_eq!(Command::Nick("x").name(), "NICK");
        assert_eq!(Command::Raw("WHOIS someone").name(), "WHOIS");
        assert_eq!(Command::Raw("").name(), "");
    }
}
