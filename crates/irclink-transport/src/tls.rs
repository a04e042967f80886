use std::io;
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::os::fd::AsRawFd;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use openssl::ssl::{self, ErrorCode, SslConnector, SslMethod, SslStream, SslVersion};
use tracing::{debug, error, info, warn};

use crate::error::{Result, TransportError};
use crate::handshake;
use crate::poll::{self, Interest};
use crate::traits::{PollOutcome, ReadMode, Transport};

// See https://wiki.mozilla.org/Security/Server_Side_TLS
/// Elliptic curve groups offered during key exchange.
pub const DEFAULT_ELLIPTIC_CURVES: &str = "P-256:P-384:X25519";

/// OpenSSL cipher list used for TLS 1.2.
pub const DEFAULT_TLS12_CIPHERS: &str = "ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-CHACHA20-POLY1305:DHE-RSA-AES128-GCM-SHA256:DHE-RSA-AES256-GCM-SHA384";

/// TLS 1.3 cipher suites.
pub const DEFAULT_TLS13_CIPHERSUITES: &str =
    "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:TLS_CHACHA20_POLY1305_SHA256";

const UNEXPECTED_EOF_REASON: &str = "unexpected eof while reading";

static CONTEXT: OnceLock<TlsContext> = OnceLock::new();

/// Lowest protocol version a connection may negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    Tls12,
    Tls13,
}

impl TlsVersion {
    fn as_ssl(self) -> SslVersion {
        match self {
            TlsVersion::Tls12 => SslVersion::TLS1_2,
            TlsVersion::Tls13 => SslVersion::TLS1_3,
        }
    }
}

/// Client TLS policy shared by every connection built from one context.
#[derive(Debug, Clone)]
pub struct TlsConfiguration {
    /// Minimum protocol version. Default: TLS 1.2.
    pub min_version: TlsVersion,
    /// Colon-separated curve group list.
    pub curves: String,
    /// OpenSSL cipher list for TLS 1.2.
    pub tls12_ciphers: String,
    /// Cipher suite list for TLS 1.3.
    pub tls13_ciphersuites: String,
    /// Additional PEM trust anchors, loaded on top of the system store.
    pub ca_file: Option<PathBuf>,
    /// Timeout for establishing the TCP connection. `None` waits for the OS.
    pub connect_timeout: Option<Duration>,
}

impl Default for TlsConfiguration {
    fn default() -> Self {
        Self {
            min_version: TlsVersion::Tls12,
            curves: DEFAULT_ELLIPTIC_CURVES.to_string(),
            tls12_ciphers: DEFAULT_TLS12_CIPHERS.to_string(),
            tls13_ciphersuites: DEFAULT_TLS13_CIPHERSUITES.to_string(),
            ca_file: None,
            connect_timeout: None,
        }
    }
}

/// An immutable, shareable client TLS context.
pub struct TlsContext {
    connector: SslConnector,
    connect_timeout: Option<Duration>,
}

impl TlsContext {
    /// Build a context enforcing `config`.
    ///
    /// Fails when OpenSSL rejects the version, curve or cipher policy.
    pub fn new(config: &TlsConfiguration) -> Result<Self> {
        let mut builder = SslConnector::builder(SslMethod::tls_client())?;
        builder.set_min_proto_version(Some(config.min_version.as_ssl()))?;
        builder.set_groups_list(&config.curves)?;
        builder.set_cipher_list(&config.tls12_ciphers)?;
        builder.set_ciphersuites(&config.tls13_ciphersuites)?;
        if let Some(ca_file) = &config.ca_file {
            builder.set_ca_file(ca_file)?;
        }

        Ok(Self {
            connector: builder.build(),
            connect_timeout: config.connect_timeout,
        })
    }

    /// Open a TCP connection to `(host, port)` and complete a TLS handshake.
    ///
    /// Every resolved address is tried in order. The socket is switched to
    /// non-blocking mode before the handshake, and SNI plus hostname
    /// verification are configured for `host` before the first handshake step.
    pub fn connect(&self, host: &str, port: u16) -> Result<TlsStream> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| {
                error!(host, error = %source, "unable to resolve server");
                TransportError::Resolve {
                    host: host.to_string(),
                    source,
                }
            })?
            .collect();

        let mut last_error = None;
        let mut connected = None;
        for addr in addrs {
            let attempt = match self.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    connected = Some((stream, addr));
                    break;
                }
                Err(source) => {
                    debug!(%addr, error = %source, "connect attempt failed");
                    last_error = Some(TransportError::Connect { addr, source });
                }
            }
        }

        let Some((stream, peer)) = connected else {
            let err = last_error.unwrap_or_else(|| TransportError::NoAddress {
                host: host.to_string(),
            });
            error!(host, port, error = %err, "unable to connect to server");
            return Err(err);
        };

        stream.set_nonblocking(true).map_err(TransportError::Socket)?;

        let ssl = self.connector.configure()?.into_ssl(host)?;
        let stream = handshake::drive(ssl, stream, host)?;

        info!(
            host,
            port,
            %peer,
            version = stream.ssl().version_str(),
            cipher = stream.ssl().current_cipher().map(|c| c.name()).unwrap_or("unknown"),
            "TLS connection established"
        );

        Ok(TlsStream {
            inner: Some(stream),
            host: host.to_string(),
            peer,
        })
    }
}

impl std::fmt::Debug for TlsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsContext")
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

/// Build the process-wide TLS context.
///
/// Must be called once before [`connect`]; a second call fails with
/// [`TransportError::AlreadyInitialized`].
pub fn initialize(config: &TlsConfiguration) -> Result<()> {
    if CONTEXT.get().is_some() {
        return Err(TransportError::AlreadyInitialized);
    }
    let context = TlsContext::new(config).inspect_err(|err| {
        error!(error = %err, "unable to instantiate TLS context");
    })?;
    CONTEXT
        .set(context)
        .map_err(|_| TransportError::AlreadyInitialized)?;
    debug!(min_version = ?config.min_version, "TLS context initialized");
    Ok(())
}

/// Whether [`initialize`] has completed.
pub fn is_initialized() -> bool {
    CONTEXT.get().is_some()
}

/// Connect using the process-wide context built by [`initialize`].
pub fn connect(host: &str, port: u16) -> Result<TlsStream> {
    CONTEXT
        .get()
        .ok_or(TransportError::NotInitialized)?
        .connect(host, port)
}

/// An established, non-blocking TLS connection.
pub struct TlsStream {
    inner: Option<SslStream<TcpStream>>,
    host: String,
    peer: SocketAddr,
}

impl TlsStream {
    /// The hostname this stream was opened for.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The socket address the TCP connection reached.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Negotiated protocol version, e.g. `TLSv1.3`.
    pub fn protocol_version(&self) -> Option<&'static str> {
        self.inner.as_ref().map(|s| s.ssl().version_str())
    }

    /// A handle that can shut the socket down from another thread.
    ///
    /// Shutting down forces a blocked poll or read on this stream to return.
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle> {
        let stream = self.inner.as_ref().ok_or(TransportError::Shutdown)?;
        let socket = stream.get_ref().try_clone().map_err(TransportError::Socket)?;
        Ok(ShutdownHandle { socket })
    }

    fn stream_mut(&mut self) -> Result<&mut SslStream<TcpStream>> {
        self.inner.as_mut().ok_or(TransportError::Shutdown)
    }

    fn wait(&self, interest: Interest, timeout: Option<Duration>) -> PollOutcome {
        match &self.inner {
            Some(stream) => poll::wait(stream.get_ref().as_raw_fd(), interest, timeout),
            None => PollOutcome::Failed(io::Error::new(
                io::ErrorKind::NotConnected,
                "transport shut down",
            )),
        }
    }
}

impl Transport for TlsStream {
    fn poll_readable(&mut self, timeout: Option<Duration>) -> PollOutcome {
        if let Some(stream) = &self.inner {
            if stream.ssl().pending() > 0 {
                return PollOutcome::DataAvailable;
            }
        }
        self.wait(Interest::Readable, timeout)
    }

    fn poll_writable(&mut self, timeout: Option<Duration>) -> PollOutcome {
        self.wait(Interest::Writable, timeout)
    }

    /// Bytes OpenSSL has already decrypted.
    ///
    /// OpenSSL only reports pending bytes once a record has been processed by
    /// a read, so a zero count triggers a one-byte peek first. The peek
    /// consumes nothing; it only makes OpenSSL pull in a buffered record.
    fn available_bytes(&mut self) -> Result<usize> {
        let stream = self.stream_mut()?;
        if stream.ssl().pending() == 0 {
            let mut probe = [0u8; 1];
            if let Err(err) = stream.ssl_peek(&mut probe) {
                match map_ssl_error(err) {
                    TransportError::WouldBlock => {}
                    other => return Err(other),
                }
            }
        }

        let pending = stream.ssl().pending();
        debug!(pending, "bytes available for reading");
        Ok(pending)
    }

    fn read(&mut self, len: usize, mode: ReadMode) -> Result<Bytes> {
        let stream = self.stream_mut()?;
        let mut buf = BytesMut::zeroed(len);
        let result = match mode {
            ReadMode::Peek => stream.ssl_peek(&mut buf),
            ReadMode::Consume => stream.ssl_read(&mut buf),
        };

        match result {
            Ok(n) => {
                debug!(n, ?mode, "read from TLS connection");
                buf.truncate(n);
                Ok(buf.freeze())
            }
            Err(err) => {
                let err = map_ssl_error(err);
                if !err.is_would_block() {
                    error!(error = %err, ?mode, "could not read from peer");
                }
                Err(err)
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let stream = self.stream_mut()?;
        match stream.ssl_write(buf) {
            Ok(n) => {
                debug!(n, total = buf.len(), "wrote to TLS connection");
                Ok(n)
            }
            Err(err) => {
                let err = map_ssl_error(err);
                if !err.is_would_block() {
                    error!(error = %err, "could not write to peer");
                }
                Err(err)
            }
        }
    }

    fn disconnect(&mut self) {
        let Some(stream) = self.inner.take() else {
            return;
        };

        match stream.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotConnected | io::ErrorKind::InvalidInput
                ) =>
            {
                debug!(error = %err, "socket already disconnected");
            }
            Err(err) => warn!(error = %err, "failed to shut down TLS connection"),
        }

        // Dropping the stream releases the TLS session and closes the socket.
        drop(stream);
        info!(host = %self.host, "disconnected");
    }

    fn is_connected(&self) -> bool {
        self.inner.is_some()
    }
}

impl Drop for TlsStream {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for TlsStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsStream")
            .field("host", &self.host)
            .field("peer", &self.peer)
            .field("connected", &self.inner.is_some())
            .finish()
    }
}

/// Shuts a [`TlsStream`]'s socket down from outside the owning thread.
#[derive(Debug)]
pub struct ShutdownHandle {
    socket: TcpStream,
}

impl ShutdownHandle {
    /// Shut down both directions. An already disconnected socket is not an error.
    pub fn shutdown(&self) -> io::Result<()> {
        match self.socket.shutdown(Shutdown::Both) {
            Err(err) if err.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}

fn map_ssl_error(err: ssl::Error) -> TransportError {
    let code = err.code();
    if code == ErrorCode::WANT_READ || code == ErrorCode::WANT_WRITE {
        return TransportError::WouldBlock;
    }
    if code == ErrorCode::ZERO_RETURN {
        return TransportError::Closed;
    }
    if code == ErrorCode::SYSCALL && err.io_error().is_none() {
        return TransportError::Closed;
    }
    if let Some(stack) = err.ssl_error() {
        if stack
            .errors()
            .iter()
            .any(|e| e.reason() == Some(UNEXPECTED_EOF_REASON))
        {
            return TransportError::Closed;
        }
    }

    match err.into_io_error() {
        Ok(io) if io.kind() == io::ErrorKind::WouldBlock => TransportError::WouldBlock,
        Ok(io) => TransportError::Io(io),
        Err(err) => TransportError::Ssl(err),
    }
}
