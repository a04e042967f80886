use irclink_transport::{TlsContext, TlsStream};

use crate::error::Result;
use crate::session::{Registration, Session, SessionConfig};

/// A session over a real TLS connection.
pub type TlsSession = Session<TlsStream>;

/// Connect through the process-wide TLS context and register.
///
/// [`irclink_transport::initialize`] must have been called first.
pub fn connect(host: &str, port: u16, user: &str, nick: &str, gecos: &str) -> Result<TlsSession> {
    connect_with_config(
        host,
        port,
        Registration::new(user, nick, gecos),
        SessionConfig::default(),
    )
}

/// Connect through the process-wide TLS context with explicit configuration.
pub fn connect_with_config(
    host: &str,
    port: u16,
    registration: Registration,
    config: SessionConfig,
) -> Result<TlsSession> {
    let stream = irclink_transport::connect(host, port)?;
    Session::register(stream, registration, config)
}

/// Connect through an explicit context instead of the process-wide one.
pub fn connect_with_context(
    context: &TlsContext,
    host: &str,
    port: u16,
    registration: Registration,
    config: SessionConfig,
) -> Result<TlsSession> {
    let stream = context.connect(host, port)?;
    Session::register(stream, registration, config)
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use irclink_transport::{TlsConfiguration, TransportError};

    use super::*;
    use crate::error::SessionError;

    #[test]
    fn refused_connection_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let context = TlsContext::new(&TlsConfiguration::default()).expect("context");
        let result = connect_with_context(
            &context,
            "127.0.0.1",
            port,
            Registration::new("bot", "bot", "bot"),
            SessionConfig::default(),
        );
        assert!(matches!(
            result,
            Err(SessionError::Transport(TransportError::Connect { .. }))
        ));
    }
}
