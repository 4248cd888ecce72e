use std::fs;
use std::net::UdpSocket;
use std::path::Path;

use airbridge_node::{FLAG_HEARTBEAT, FLAG_PUBLISH, FLAG_SUBSCRIBE};
use airbridge_wire::{encode_publish_frame, encode_subscribe_request, TypeTag};
use serde::Deserialize;

use crate::cmd::{SendArgs, SendMessage, SubscribeArgs};
use crate::exit::{io_error, wire_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    topic: String,
    #[serde(rename = "type")]
    kind: String,
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let message = build_message(&args.message)?;

    if args.dry_run {
        match format {
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({ "addr": args.addr, "message": message })
            ),
            _ => println!("{message}"),
        }
        return Ok(SUCCESS);
    }

    let socket =
        UdpSocket::bind("0.0.0.0:0").map_err(|err| io_error("socket setup failed", err))?;
    socket
        .send_to(message.as_bytes(), &args.addr)
        .map_err(|err| io_error("send failed", err))?;

    tracing::info!(addr = %args.addr, bytes = message.len(), "message sent");
    Ok(SUCCESS)
}

fn build_message(message: &SendMessage) -> CliResult<String> {
    match message {
        SendMessage::Subscribe(args) => {
            let topics = resolve_topics(args)?;
            let pairs: Vec<(&str, TypeTag)> = topics
                .iter()
                .map(|(name, tag)| (name.as_str(), *tag))
                .collect();
            let body = encode_subscribe_request(&pairs)
                .map_err(|err| wire_error("cannot build subscribe request", err))?;
            Ok(format!("{FLAG_SUBSCRIBE}{body}"))
        }
        SendMessage::Publish(args) => {
            let tag = parse_tag(&args.tag)?;
            let body = encode_publish_frame(&args.topic, tag, &args.data)
                .map_err(|err| wire_error("cannot build publish message", err))?;
            Ok(format!("{FLAG_PUBLISH}{body}"))
        }
        SendMessage::Heartbeat => Ok(FLAG_HEARTBEAT.to_string()),
    }
}

fn resolve_topics(args: &SubscribeArgs) -> CliResult<Vec<(String, TypeTag)>> {
    if let Some(path) = &args.manifest {
        return load_manifest(path);
    }
    if args.topics.is_empty() {
        return Err(CliError::new(
            USAGE,
            "subscribe needs at least one --topic or a --manifest",
        ));
    }
    args.topics
        .iter()
        .map(|pair| {
            let (name, kind) = pair.split_once(':').ok_or_else(|| {
                CliError::new(USAGE, format!("--topic {pair:?} is not NAME:TYPE"))
            })?;
            Ok((name.to_string(), parse_tag(kind)?))
        })
        .collect()
}

fn load_manifest(path: &Path) -> CliResult<Vec<(String, TypeTag)>> {
    let content = fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&content)
        .map_err(|err| CliError::new(USAGE, format!("invalid manifest: {err}")))?;
    entries
        .into_iter()
        .map(|entry| Ok((entry.topic, parse_tag(&entry.kind)?)))
        .collect()
}

/// Accepts the tag names used in CLI output, plus the bare wire codes.
fn parse_tag(kind: &str) -> CliResult<TypeTag> {
    match kind {
        "numeric-array" | "array" | "0" => Ok(TypeTag::NumericArray),
        "boolean" | "bool" | "1" => Ok(TypeTag::Boolean),
        "text" | "string" | "2" => Ok(TypeTag::Text),
        "scalar" | "float" | "3" => Ok(TypeTag::Scalar),
        other => Err(CliError::new(USAGE, format!("unknown payload type {other:?}"))),
    }
}
