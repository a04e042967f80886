use std::io::BufRead;

use irclink_proto::ProtocolMessage;

use crate::cmd::ParseArgs;
use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ParseArgs, format: OutputFormat) -> CliResult<i32> {
    let mut missing_command = 0usize;

    match &args.line {
        Some(line) => {
            missing_command += parse_one(line, format);
        }
        None => {
            for line in std::io::stdin().lock().lines() {
                let line = line.map_err(|err| io_error("failed reading stdin", err))?;
                let line = line.trim_end_matches('\r');
                if line.is_empty() {
                    continue;
                }
                missing_command += parse_one(line, format);
            }
        }
    }

    if missing_command > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{missing_command} line(s) had no command"),
        ));
    }
    Ok(SUCCESS)
}

/// Print one parsed line; returns 1 when it carried no command.
fn parse_one(line: &str, format: OutputFormat) -> usize {
    let message = ProtocolMessage::parse(line);
    print_message(&message, format);
    usize::from(message.command.is_none())
}
