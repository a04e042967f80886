use irclink_transport::{DEFAULT_ELLIPTIC_CURVES, DEFAULT_TLS13_CIPHERSUITES};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("irclink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: irclink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("IRCLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "rustc: {}",
        option_env!("RUSTC_VERSION").unwrap_or("unknown")
    );
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "features: session={}, serde={}, cli=true",
        cfg!(feature = "session"),
        cfg!(feature = "serde")
    );
    println!("tls_min_version: 1.2");
    println!("tls_curves: {DEFAULT_ELLIPTIC_CURVES}");
    println!("tls13_ciphersuites: {DEFAULT_TLS13_CIPHERSUITES}");

    Ok(SUCCESS)
}
