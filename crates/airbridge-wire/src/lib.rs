//! Fixed-width ASCII wire grammar for the airbridge protocol.
//!
//! Messages are plain text with zero-padded decimal length prefixes and no
//! field delimiters — the parser advances a cursor by declared widths:
//!
//! ```text
//! subscribe request:  count(2) { nameLen(2) name(nameLen) tag(1) }
//! publish data:       nameLen(2) name(nameLen) tag(1) payload(rest)
//! ```
//!
//! Names are length-prefixed rather than delimited so a topic name may
//! contain any byte, including the payload grammar's own delimiters. The
//! publish payload is never length-prefixed because it is always the final
//! field of its message.

pub mod error;
pub mod message;
pub mod payload;
pub mod tag;

pub use error::{Result, WireError};
pub use message::{
    encode_publish, encode_publish_frame, encode_subscribe_request, parse_publish,
    parse_subscribe_request, PublishFrame, TopicRequest, LEN_WIDTH, MAX_ENTRIES, MAX_NAME_LEN,
    TAG_WIDTH,
};
pub use payload::{decode_payload, encode_payload, Payload};
pub use tag::TypeTag;
