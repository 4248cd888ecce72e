use std::io::Read;

use airbridge_node::{FLAG_HEARTBEAT, FLAG_PUBLISH, FLAG_SUBSCRIBE};
use airbridge_wire::{decode_payload, parse_publish, parse_subscribe_request, TypeTag};

use crate::cmd::{DecodeArgs, MessageKind};
use crate::exit::{io_error, wire_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_publish, print_subscribe, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = match &args.message {
        Some(message) => message.clone(),
        None => read_stdin()?,
    };

    if args.flagged {
        let Some(flag) = raw.chars().next() else {
            return Err(CliError::new(DATA_INVALID, "empty message"));
        };
        let body = &raw[flag.len_utf8()..];
        return match flag {
            FLAG_SUBSCRIBE => decode_subscribe(body, format),
            FLAG_PUBLISH => decode_publish(body, format),
            FLAG_HEARTBEAT => {
                println!("heartbeat");
                Ok(SUCCESS)
            }
            other => Err(CliError::new(
                DATA_INVALID,
                format!("unknown message flag {other:?}"),
            )),
        };
    }

    match args.kind {
        MessageKind::Subscribe => decode_subscribe(&raw, format),
        MessageKind::Publish => decode_publish(&raw, format),
    }
}

fn decode_subscribe(raw: &str, format: OutputFormat) -> CliResult<i32> {
    let entries =
        parse_subscribe_request(raw).map_err(|err| wire_error("invalid subscribe request", err))?;
    print_subscribe(&entries, format);
    Ok(SUCCESS)
}

fn decode_publish(raw: &str, format: OutputFormat) -> CliResult<i32> {
    let frame = parse_publish(raw).map_err(|err| wire_error("invalid publish message", err))?;
    let tag = TypeTag::from_code(frame.code)
        .ok_or_else(|| CliError::new(DATA_INVALID, format!("unknown type tag {}", frame.code)))?;
    let value = decode_payload(tag, frame.data).map_err(|err| wire_error("invalid payload", err))?;
    print_publish(frame.name, tag, &value, format);
    Ok(SUCCESS)
}

fn read_stdin() -> CliResult<String> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|err| io_error("failed reading stdin", err))?;
    // Strip the line ending a shell pipe usually appends; the wire grammar
    // itself never ends in a newline.
    Ok(raw.trim_end_matches(['\r', '\n']).to_string())
}
