use irclink_frame::{write_all, LineConfig, LineReader, LineStats};
use irclink_proto::{Command, ProtocolMessage};
use irclink_transport::Transport;
use tracing::{debug, info, trace};

use crate::error::{Result, SessionError};

/// Identity sent during registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub user: String,
    pub nick: String,
    /// Free-form real name.
    pub gecos: String,
}

impl Registration {
    pub fn new(user: impl Into<String>, nick: impl Into<String>, gecos: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            nick: nick.into(),
            gecos: gecos.into(),
        }
    }
}

/// Configuration for a [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Framing limits and read/write timeouts.
    pub line: LineConfig,
}

/// One registered IRC session over a transport.
///
/// Outgoing arguments are sent verbatim; callers must keep CR and LF out of
/// them. Dropping the session disconnects it.
pub struct Session<T: Transport> {
    reader: LineReader<T>,
    registration: Registration,
    connected: bool,
}

impl<T: Transport> Session<T> {
    /// Send `USER` and `NICK` over an established transport.
    pub fn register(transport: T, registration: Registration, config: SessionConfig) -> Result<Self> {
        let user = Command::User {
            user: &registration.user,
            gecos: &registration.gecos,
        }
        .to_line();
        let nick = Command::Nick(&registration.nick).to_line();

        let mut session = Self {
            reader: LineReader::with_config(transport, config.line),
            registration,
            connected: true,
        };
        session.write_line("USER", &user)?;
        session.write_line("NICK", &nick)?;
        info!(nick = %session.registration.nick, "registration sent");
        Ok(session)
    }

    /// Send any outgoing command.
    pub fn send(&mut self, command: Command<'_>) -> Result<()> {
        self.write_line(command.name(), &command.to_line())
    }

    pub fn join(&mut self, channel: &str) -> Result<()> {
        self.send(Command::Join(channel))
    }

    pub fn part(&mut self, channel: &str) -> Result<()> {
        self.send(Command::Part(channel))
    }

    /// Send `PRIVMSG <target> :<text>`.
    pub fn send_message(&mut self, target: &str, text: &str) -> Result<()> {
        self.send(Command::Privmsg { target, text })
    }

    /// Send `PONG <server1> <server2>`.
    pub fn pong(&mut self, server1: &str, server2: &str) -> Result<()> {
        self.send(Command::Pong {
            origin: server1,
            destination: Some(server2),
        })
    }

    /// Answer a `PING` by echoing its token: `PONG :<token>`.
    pub fn pong_reply(&mut self, token: &str) -> Result<()> {
        self.send(Command::Pong {
            origin: token,
            destination: None,
        })
    }

    /// Send a line as is. The CRLF is appended.
    pub fn send_raw(&mut self, line: &str) -> Result<()> {
        self.send(Command::Raw(line))
    }

    /// Block until the next line arrives and parse it.
    pub fn read_message(&mut self) -> Result<ProtocolMessage> {
        self.ensure_connected()?;
        let line = self.reader.read_line()?;
        trace!(%line, "received line");
        Ok(ProtocolMessage::parse(&line))
    }

    /// Read until the server's welcome reply, answering pings meanwhile.
    ///
    /// Every other message received before the welcome is discarded.
    pub fn wait_until_registered(&mut self) -> Result<ProtocolMessage> {
        loop {
            let message = self.read_message()?;
            if message.is_ping() {
                let token = message.trailing().or(message.target()).unwrap_or_default();
                self.pong_reply(token)?;
            } else if message.is_welcome() {
                info!(
                    nick = %self.registration.nick,
                    server = message.sender().unwrap_or("unknown"),
                    "registered"
                );
                return Ok(message);
            } else {
                debug!(command = message.command().unwrap_or_default(), "skipping pre-registration message");
            }
        }
    }

    /// Release the line buffer and the transport. Calling it again is a no-op.
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.reader.clear();
        self.reader.get_mut().disconnect();
        debug!(nick = %self.registration.nick, "session closed");
    }

    pub fn is_connected(&self) -> bool {
        self.connected && self.reader.get_ref().is_connected()
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    /// Framing counters, including how often the stall recovery ran.
    pub fn stats(&self) -> LineStats {
        self.reader.stats()
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        self.reader.get_ref()
    }

    fn write_line(&mut self, name: &str, line: &str) -> Result<()> {
        self.ensure_connected()?;
        let timeout = self.reader.config().write_timeout;
        write_all(self.reader.get_mut(), line.as_bytes(), timeout)?;
        debug!(command = name, len = line.len(), "sent command");
        Ok(())
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(SessionError::Disconnected)
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("nick", &self.registration.nick)
            .field("connected", &self.connected)
            .field("reader", &self.reader)
            .finish()
    }
}
