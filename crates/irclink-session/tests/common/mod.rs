#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::ssl::{SslAcceptor, SslMethod, SslStream};
use openssl::x509::extension::{BasicConstraints, SubjectAlternativeName};
use openssl::x509::{X509NameBuilder, X509};

/// Self-signed certificate valid for `localhost` and `127.0.0.1`.
pub fn self_signed() -> (X509, PKey<Private>) {
    let rsa = Rsa::generate(2048).expect("rsa key should generate");
    let key = PKey::from_rsa(rsa).expect("pkey should wrap rsa");

    let mut name = X509NameBuilder::new().expect("name builder");
    name.append_entry_by_text("CN", "localhost")
        .expect("common name should be accepted");
    let name = name.build();

    let mut builder = X509::builder().expect("x509 builder");
    builder.set_version(2).expect("version");
    let mut serial = BigNum::new().expect("bignum");
    serial
        .rand(64, MsbOption::MAYBE_ZERO, false)
        .expect("random serial");
    let serial = serial.to_asn1_integer().expect("serial as asn1");
    builder.set_serial_number(&serial).expect("serial");
    builder.set_subject_name(&name).expect("subject");
    builder.set_issuer_name(&name).expect("issuer");
    builder.set_pubkey(&key).expect("public key");
    let not_before = Asn1Time::days_from_now(0).expect("not before");
    let not_after = Asn1Time::days_from_now(1).expect("not after");
    builder.set_not_before(&not_before).expect("set not before");
    builder.set_not_after(&not_after).expect("set not after");

    let constraints = BasicConstraints::new()
        .critical()
        .ca()
        .build()
        .expect("basic constraints");
    builder.append_extension(constraints).expect("append constraints");
    let san = SubjectAlternativeName::new()
        .dns("localhost")
        .ip("127.0.0.1")
        .build(&builder.x509v3_context(None, None))
        .expect("subject alt name");
    builder.append_extension(san).expect("append san");

    builder
        .sign(&key, MessageDigest::sha256())
        .expect("certificate should sign");
    (builder.build(), key)
}

/// Write `cert` as PEM to a fresh temp file.
pub fn write_ca_file(cert: &X509, label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "irclink-{label}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    let path = dir.join("ca.pem");
    std::fs::write(&path, cert.to_pem().expect("pem encoding")).expect("ca file should write");
    path
}

/// Server side of one accepted TLS connection, blocking I/O.
pub struct ServerConn {
    stream: SslStream<TcpStream>,
}

impl ServerConn {
    /// Read one line without its CRLF. `None` once the client is gone.
    pub fn read_line(&mut self) -> Option<String> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.stream.read(&mut byte) {
                Ok(0) | Err(_) => return None,
                Ok(_) if byte[0] == b'\n' => break,
                Ok(_) => line.push(byte[0]),
            }
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Write `data` as a single TLS record.
    pub fn send(&mut self, data: &str) {
        self.stream
            .write_all(data.as_bytes())
            .expect("server write should succeed");
        self.stream.flush().expect("server flush should succeed");
    }
}

/// A one-connection TLS server running `script` on its own thread.
pub struct TestServer {
    pub port: u16,
    pub ca_file: PathBuf,
    handle: JoinHandle<Vec<String>>,
}

impl TestServer {
    /// Wait for the script to finish and return what it collected.
    pub fn join(self) -> Vec<String> {
        let _ = std::fs::remove_dir_all(self.ca_file.parent().unwrap_or(&self.ca_file));
        self.handle.join().expect("server thread should complete")
    }
}

pub fn spawn_server<F>(label: &str, script: F) -> TestServer
where
    F: FnOnce(&mut ServerConn) -> Vec<String> + Send + 'static,
{
    let (cert, key) = self_signed();
    let ca_file = write_ca_file(&cert, label);

    let mut acceptor =
        SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).expect("acceptor builder");
    acceptor.set_private_key(&key).expect("private key");
    acceptor.set_certificate(&cert).expect("certificate");
    acceptor.check_private_key().expect("key should match certificate");
    let acceptor = acceptor.build();

    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let port = listener.local_addr().expect("local addr").port();

    let handle = thread::spawn(move || {
        let (socket, _) = listener.accept().expect("listener should accept");
        let stream = acceptor.accept(socket).expect("server handshake should succeed");
        let mut conn = ServerConn { stream };
        script(&mut conn)
    });

    TestServer {
        port,
        ca_file,
        handle,
    }
}
