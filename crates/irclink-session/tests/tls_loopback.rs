#![cfg(unix)]

mod common;

use std::thread;
use std::time::Duration;

use irclink_frame::LineConfig;
use irclink_session::{connect_with_context, Registration, SessionConfig};
use irclink_transport::{TlsConfiguration, TlsContext, Transport};

fn context(ca_file: &std::path::Path) -> TlsContext {
    TlsContext::new(&TlsConfiguration {
        ca_file: Some(ca_file.to_path_buf()),
        connect_timeout: Some(Duration::from_secs(5)),
        ..TlsConfiguration::default()
    })
    .expect("context should build")
}

fn config() -> SessionConfig {
    SessionConfig {
        line: LineConfig {
            read_timeout: Some(Duration::from_secs(2)),
            write_timeout: Some(Duration::from_secs(2)),
            ..LineConfig::default()
        },
    }
}

#[test]
fn full_exchange_over_tls() {
    let server = common::spawn_server("exchange", |conn| {
        let mut received = Vec::new();
        received.push(conn.read_line().expect("USER line"));
        received.push(conn.read_line().expect("NICK line"));

        // Welcome and ping in one record.
        conn.send(":irc.test 001 bot :Welcome to the test network\r\nPING :irc.test\r\n");
        received.push(conn.read_line().expect("JOIN line"));
        received.push(conn.read_line().expect("PONG line"));

        // One line split across two records.
        conn.send(":alice!a@localhost PRIVMSG #chan :hel");
        thread::sleep(Duration::from_millis(50));
        conn.send("lo world\r\n");
        received.push(conn.read_line().expect("PRIVMSG line"));

        // Drain until the client hangs up.
        while conn.read_line().is_some() {}
        received
    });

    let context = context(&server.ca_file);
    let mut session = connect_with_context(
        &context,
        "localhost",
        server.port,
        Registration::new("bot", "bot", "Test Bot"),
        config(),
    )
    .expect("session should connect");

    let welcome = session
        .wait_until_registered()
        .expect("welcome should arrive");
    assert_eq!(welcome.sender(), Some("irc.test"));
    assert_eq!(welcome.trailing(), Some("Welcome to the test network"));

    session.join("#chan").expect("join should be sent");

    let ping = session.read_message().expect("ping should arrive");
    assert!(ping.is_ping());
    session
        .pong_reply(ping.trailing().expect("ping token"))
        .expect("pong should be sent");

    let message = session.read_message().expect("privmsg should arrive");
    assert_eq!(message.sender(), Some("alice"));
    assert_eq!(message.target(), Some("#chan"));
    assert_eq!(message.trailing(), Some("hello world"));

    session
        .send_message("#chan", "hi alice")
        .expect("reply should be sent");

    session.disconnect();
    session.disconnect();
    assert!(!session.is_connected());
    assert!(!session.transport().is_connected());

    let received = server.join();
    assert_eq!(
        received,
        vec![
            "USER bot bot bot :Test Bot",
            "NICK bot",
            "JOIN #chan",
            "PONG :irc.test",
            "PRIVMSG #chan :hi alice",
        ]
    );
}

#[test]
fn peer_close_ends_reading() {
    let server = common::spawn_server("close", |conn| {
        let user = conn.read_line().expect("USER line");
        let nick = conn.read_line().expect("NICK line");
        conn.send(":irc.test 001 bot :Welcome\r\n");
        vec![user, nick]
    });

    let context = context(&server.ca_file);
    let mut session = connect_with_context(
        &context,
        "localhost",
        server.port,
        Registration::new("bot", "bot", "Test Bot"),
        config(),
    )
    .expect("session should connect");

    session
        .wait_until_registered()
        .expect("welcome should arrive");
    let received = server.join();
    assert_eq!(received, vec!["USER bot bot bot :Test Bot", "NICK bot"]);

    assert!(session.read_message().is_err());
}

#[test]
fn shutdown_handle_unblocks_a_waiting_read() {
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let server = common::spawn_server("shutdown", move |conn| {
        let user = conn.read_line().expect("USER line");
        let _nick = conn.read_line();
        // Keep the connection open until the client has given up.
        let _ = release_rx.recv_timeout(Duration::from_secs(10));
        vec![user]
    });

    let context = context(&server.ca_file);
    let mut session = connect_with_context(
        &context,
        "localhost",
        server.port,
        Registration::new("bot", "bot", "Test Bot"),
        SessionConfig::default(),
    )
    .expect("session should connect");

    let handle = session
        .transport()
        .shutdown_handle()
        .expect("shutdown handle");
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        handle.shutdown().expect("shutdown should succeed");
    });

    // No read timeout: only the shutdown can end this wait.
    assert!(session.read_message().is_err());

    canceller.join().expect("canceller thread should complete");
    let _ = release_tx.send(());
    session.disconnect();
    server.join();
}
