use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Command name of the keep-alive request.
pub const PING: &str = "PING";
/// Command name of a channel or private message.
pub const PRIVMSG: &str = "PRIVMSG";
/// Numeric reply that completes registration.
pub const RPL_WELCOME: &str = "001";

/// One received IRC line, decomposed.
///
/// Only the common shape `[:sender ]command[ target][ :trailing]` is
/// understood. Extra middle parameters between the target and the trailing
/// text are dropped, and message tags are not recognized. Parsing never
/// fails: whatever the line does not supply is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProtocolMessage {
    /// Nick or server name from the prefix, without the `!user@host` part.
    pub sender: Option<String>,
    pub command: Option<String>,
    pub target: Option<String>,
    /// Free text after the first `:` that follows the target.
    pub trailing: Option<String>,
}

impl ProtocolMessage {
    /// Parse one line, terminator already stripped.
    pub fn parse(line: &str) -> Self {
        let mut message = Self::default();
        let mut rest = line;

        if let Some(prefix) = rest.strip_prefix(':') {
            let (source, remainder) = split_token(prefix);
            let end = source.find('!').unwrap_or(source.len());
            message.sender = non_empty(&source[..end]);
            rest = remainder;
        }

        let (command, remainder) = split_token(rest);
        message.command = non_empty(command);
        if message.command.is_none() {
            return message;
        }

        if let Some(trailing) = remainder.strip_prefix(':') {
            message.trailing = Some(trailing.to_string());
            return message;
        }

        let (target, remainder) = split_token(remainder);
        message.target = non_empty(target);
        if let Some(idx) = remainder.find(':') {
            message.trailing = Some(remainder[idx + 1..].to_string());
        }
        message
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn trailing(&self) -> Option<&str> {
        self.trailing.as_deref()
    }

    /// Case-insensitive command comparison.
    pub fn is_command(&self, name: &str) -> bool {
        self.command
            .as_deref()
            .is_some_and(|command| command.eq_ignore_ascii_case(name))
    }

    pub fn is_ping(&self) -> bool {
        self.is_command(PING)
    }

    pub fn is_privmsg(&self) -> bool {
        self.is_command(PRIVMSG)
    }

    /// `true` for the `001` reply sent once registration succeeds.
    pub fn is_welcome(&self) -> bool {
        self.is_command(RPL_WELCOME)
    }
}

impl FromStr for ProtocolMessage {
    type Err = Infallible;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(line))
    }
}

impl fmt::Display for ProtocolMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(4);
        if let Some(sender) = &self.sender {
            parts.push(format!(":{sender}"));
        }
        if let Some(command) = &self.command {
            parts.push(command.clone());
        }
        if let Some(target) = &self.target {
            parts.push(target.clone());
        }
        if let Some(trailing) = &self.trailing {
            parts.push(format!(":{trailing}"));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Split off the next space-delimited token, skipping runs of spaces.
fn split_token(input: &str) -> (&str, &str) {
    let input = input.trim_start_matches(' ');
    match input.find(' ') {
        Some(idx) => (&input[..idx], input[idx + 1..].trim_start_matches(' ')),
        None => (input, ""),
    }
}

fn non_empty(token: &str) -> Option<String> {
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_privmsg_with_full_prefix() {
        let message = ProtocolMessage::parse(":nick!user@host PRIVMSG #chan :hello world");
        assert_eq!(message.sender(), Some("nick"));
        assert_eq!(message.command(), Some("PRIVMSG"));
        assert_eq!(message.target(), Some("#chan"));
        assert_eq!(message.trailing(), Some("hello world"));
        assert!(message.is_privmsg());
    }

    #[test]
    fn parse_ping_without_prefix() {
        let message = ProtocolMessage::parse("PING :server.example");
        assert_eq!(message.sender(), None);
        assert_eq!(message.command(), Some("PING"));
        assert_eq!(message.target(), None);
        assert_eq!(message.trailing(), Some("server.example"));
        assert!(message.is_ping());
    }

    #[test]
    fn parse_server_numeric() {
        let message = ProtocolMessage::parse(":irc.example.net 001 bot :Welcome to the network");
        assert_eq!(message.sender(), Some("irc.example.net"));
        assert_eq!(message.target(), Some("bot"));
        assert_eq!(message.trailing(), Some("Welcome to the network"));
        assert!(message.is_welcome());
    }

    #[test]
    fn trailing_keeps_colons_and_spaces() {
        let message = ProtocolMessage::parse(":a PRIVMSG #c :see: http://x  y");
        assert_eq!(message.trailing(), Some("see: http://x  y"));
    }

    #[test]
    fn middle_parameters_are_dropped() {
        let message = ProtocolMessage::parse(":srv 353 bot = #chan :alice bob");
        assert_eq!(message.target(), Some("bot"));
        assert_eq!(message.trailing(), Some("alice bob"));

        let message = ProtocolMessage::parse(":srv MODE bot +i");
        assert_eq!(message.target(), Some("bot"));
        assert_eq!(message.trailing(), None);
    }

    #[test]
    fn missing_fields_are_absent() {
        assert_eq!(ProtocolMessage::parse(""), ProtocolMessage::default());

        let message = ProtocolMessage::parse(":only.prefix");
        assert_eq!(message.sender(), Some("only.prefix"));
        assert_eq!(message.command(), None);

        let message = ProtocolMessage::parse("QUIT");
        assert_eq!(message.command(), Some("QUIT"));
        assert_eq!(message.target(), None);
        assert_eq!(message.trailing(), None);
    }

    #[test]
    fn empty_trailing_is_present() {
        let message = ProtocolMessage::parse("PRIVMSG #c :");
        assert_eq!(message.trailing(), Some(""));
    }

    #[test]
    fn command_match_ignores_case() {
        assert!(ProtocolMessage::parse("ping :x").is_ping());
        assert!(!ProtocolMessage::parse("PONG :x").is_ping());
    }

    #[test]
    fn display_is_canonical() {
        let message = ProtocolMessage::parse(":nick!user@host PRIVMSG  #chan :hi there");
        assert_eq!(message.to_string(), ":nick PRIVMSG #chan :hi there");
        assert_eq!(ProtocolMessage::parse("PING :x").to_string(), "PING :x");
    }

    #[test]
    fn from_str_matches_parse() {
        let message: ProtocolMessage = "JOIN #rust".parse().unwrap();
        assert_eq!(message.command(), Some("JOIN"));
        assert_eq!(message.target(), Some("#rust"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_absent_fields_as_null() {
        let value = serde_json::to_value(ProtocolMessage::parse("PING :x")).unwrap();
        assert_eq!(value["command"], "PING");
        assert!(value["sender"].is_null());
        assert_eq!(value["trailing"], "x");
    }
}
