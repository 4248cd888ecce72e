use std::io::IsTerminal;

use airbridge_wire::{encode_payload, Payload, TopicRequest, TypeTag};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
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
struct PublishOutput<'a> {
    topic: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    payload: serde_json::Value,
}

#[derive(Serialize)]
struct SubscribeEntryOutput<'a> {
    topic: &'a str,
    code: u8,
    #[serde(rename = "type")]
    kind: Option<&'a str>,
}

/// Print one decoded publish message.
pub fn print_publish(topic: &str, tag: TypeTag, value: &Payload, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PublishOutput {
                topic,
                kind: tag.name(),
                payload: payload_json(value),
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
                .set_header(vec!["TOPIC", "TYPE", "PAYLOAD"])
                .add_row(vec![
                    topic.to_string(),
                    tag.name().to_string(),
                    encode_payload(value),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("topic={topic} type={tag} payload={}", encode_payload(value));
        }
        OutputFormat::Raw => {
            println!("{}", encode_payload(value));
        }
    }
}

/// Print the entries of a decoded subscribe request.
pub fn print_subscribe(entries: &[TopicRequest<'_>], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out: Vec<SubscribeEntryOutput<'_>> = entries
                .iter()
                .map(|entry| SubscribeEntryOutput {
                    topic: entry.name,
                    code: entry.code,
                    kind: TypeTag::from_code(entry.code).map(TypeTag::name),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TOPIC", "CODE", "TYPE"]);
            for entry in entries {
                table.add_row(vec![
                    entry.name.to_string(),
                    entry.code.to_string(),
                    tag_name_or_unknown(entry.code).to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for entry in entries {
                println!("{}:{}", entry.name, tag_name_or_unknown(entry.code));
            }
        }
    }
}

fn tag_name_or_unknown(code: u8) -> &'static str {
    TypeTag::from_code(code).map_or("unknown", TypeTag::name)
}

fn payload_json(value: &Payload) -> serde_json::Value {
    match value {
        Payload::NumericArray(values) => serde_json::json!(values),
        Payload::Boolean(value) => serde_json::json!(value),
        Payload::Text(text) => serde_json::json!(text),
        Payload::Scalar(value) => serde_json::json!(value),
    }
}
