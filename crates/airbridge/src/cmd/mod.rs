use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bridge a UDP endpoint: receive wire messages, drive the bus.
    Listen(ListenArgs),
    /// Craft a wire message and send it as one datagram.
    Send(SendArgs),
    /// Parse a wire message and print it.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args),
        Command::Send(args) => send::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind, e.g. 0.0.0.0:5005.
    pub bind: String,
    /// Node name used to namespace published topics.
    #[arg(long, default_value = "bridge")]
    pub node_name: String,
    /// Per-channel buffer depth handed to the bus.
    #[arg(long, default_value_t = 3)]
    pub buffer_depth: usize,
    /// Error on re-subscription with a different type instead of keeping
    /// the first binding.
    #[arg(long)]
    pub reject_tag_conflicts: bool,
    /// Exit after handling N datagrams.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Destination address, e.g. 127.0.0.1:5005.
    pub addr: String,
    /// Build the message and print it instead of sending.
    #[arg(long)]
    pub dry_run: bool,
    #[command(subcommand)]
    pub message: SendMessage,
}

#[derive(Subcommand, Debug)]
pub enum SendMessage {
    /// A subscribe request for one or more topics.
    Subscribe(SubscribeArgs),
    /// A publish-data message for one topic.
    Publish(PublishArgs),
    /// A heartbeat.
    Heartbeat,
}

#[derive(Args, Debug)]
pub struct SubscribeArgs {
    /// Topic entries as NAME:TYPE pairs (e.g. alt:scalar).
    #[arg(long = "topic", value_name = "NAME:TYPE")]
    pub topics: Vec<String>,
    /// JSON manifest of entries: [{"topic": "alt", "type": "scalar"}, ...].
    #[arg(long, value_name = "FILE", conflicts_with = "topics")]
    pub manifest: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Topic name.
    #[arg(long)]
    pub topic: String,
    /// Payload type.
    #[arg(long, value_name = "TYPE")]
    pub tag: String,
    /// Payload in its wire form (e.g. "2,3.5,-1.0," for a numeric array).
    #[arg(long)]
    pub data: String,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Raw wire message. Read from stdin when omitted.
    pub message: Option<String>,
    /// The message carries a leading routing flag byte.
    #[arg(long)]
    pub flagged: bool,
    /// Message kind when no flag byte is present.
    #[arg(long, value_enum, default_value = "publish", conflicts_with = "flagged")]
    pub kind: MessageKind,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum MessageKind {
    Subscribe,
    Publish,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
