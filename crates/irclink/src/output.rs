use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use irclink_proto::ProtocolMessage;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    schema_id: &'a str,
    #[serde(flatten)]
    message: &'a ProtocolMessage,
    timestamp: String,
}

pub fn print_message(message: &ProtocolMessage, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                schema_id: "https://schemas.3leaps.dev/irclink/cli/v1/message-received.schema.json",
                message,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SENDER", "COMMAND", "TARGET", "TRAILING"])
                .add_row(vec![
                    field(message.sender()),
                    field(message.command()),
                    field(message.target()),
                    field(message.trailing()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "sender={} command={} target={} trailing={}",
                field(message.sender()),
                field(message.command()),
                field(message.target()),
                field(message.trailing())
            );
        }
        OutputFormat::Raw => {
            print_raw(&format!("{message}\n"));
        }
    }
}

pub fn print_raw(data: &str) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data.as_bytes());
    let _ = out.flush();
}

fn field(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
