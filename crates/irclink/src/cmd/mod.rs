use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use irclink_frame::LineConfig;
use irclink_session::{connect_with_config, Registration, SessionConfig, TlsSession};
use irclink_transport::TlsConfiguration;

use crate::exit::{session_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod parse;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect, join a channel and print received messages.
    Run(RunArgs),
    /// Send a single message.
    Send(SendArgs),
    /// Parse raw IRC lines offline.
    Parse(ParseArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Parse(args) => parse::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Server hostname.
    #[arg(long, env = "IRC_SERVER")]
    pub server: String,
    /// Server TLS port.
    #[arg(long, env = "IRC_PORT", default_value_t = 6697)]
    pub port: u16,
    /// User name sent in USER.
    #[arg(long, env = "IRC_USER")]
    pub user: String,
    /// Nickname. Default: the user name.
    #[arg(long, env = "IRC_NICK")]
    pub nick: Option<String>,
    /// Real name. Default: the nickname.
    #[arg(long, env = "IRC_GECOS")]
    pub gecos: Option<String>,
    /// Extra PEM trust anchors.
    #[arg(long, env = "IRC_CA_FILE", value_name = "PATH")]
    pub ca_file: Option<PathBuf>,
    /// TCP connect timeout (e.g. 10s, 500ms).
    #[arg(long, default_value = "10s")]
    pub connect_timeout: String,
    /// Per-wait read timeout (e.g. 30s). Waits indefinitely when unset.
    #[arg(long, env = "IRC_READ_TIMEOUT")]
    pub read_timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel to join after registration.
    #[arg(long, env = "IRC_CHANNEL")]
    pub channel: Option<String>,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Channel to join before sending.
    #[arg(long, env = "IRC_CHANNEL")]
    pub channel: Option<String>,
    /// Channel or nick to send to.
    pub target: String,
    /// Message text.
    pub text: String,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Line to parse. Reads lines from stdin when omitted.
    pub line: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Build the process-wide TLS context, connect and send registration.
pub fn open_session(args: &ConnectArgs) -> CliResult<TlsSession> {
    let connect_timeout = parse_duration(&args.connect_timeout)?;
    let read_timeout = args
        .read_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;

    let tls = TlsConfiguration {
        ca_file: args.ca_file.clone(),
        connect_timeout: Some(connect_timeout),
        ..TlsConfiguration::default()
    };
    irclink_transport::initialize(&tls).map_err(|err| transport_error("TLS setup failed", err))?;

    let nick = args.nick.clone().unwrap_or_else(|| args.user.clone());
    let gecos = args.gecos.clone().unwrap_or_else(|| nick.clone());
    let config = SessionConfig {
        line: LineConfig {
            read_timeout,
            write_timeout: read_timeout,
            ..LineConfig::default()
        },
    };

    connect_with_config(
        &args.server,
        args.port,
        Registration::new(args.user.as_str(), nick, gecos),
        config,
    )
    .map_err(|err| session_error("connect failed", err))
}

/// Reject arguments that would smuggle extra lines onto the wire.
pub fn reject_line_breaks(name: &str, value: &str) -> CliResult<()> {
    if value.contains(['\r', '\n']) {
        return Err(CliError::new(
            USAGE,
            format!("{name} must not contain line breaks"),
        ));
    }
    Ok(())
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
