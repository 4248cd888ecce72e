use crate::tag::TypeTag;

/// Errors that can occur while parsing or building wire messages.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// A declared length field runs past the end of the message.
    #[error("message truncated ({expected} bytes declared, {available} available)")]
    Truncated { expected: usize, available: usize },

    /// A fixed-width numeric field contains something other than ASCII digits.
    #[error("invalid {field} field: {found:?}")]
    InvalidDigits {
        field: &'static str,
        found: String,
    },

    /// A declared name length splits a multi-byte character.
    #[error("declared name length ({len}) splits a multi-byte character")]
    NameBoundary { len: usize },

    /// A payload cannot be decoded under its declared tag's grammar.
    #[error("malformed {tag} payload: token {token:?} is not parseable")]
    MalformedPayload { tag: TypeTag, token: String },

    /// A topic name is too long to length-prefix with the fixed field width.
    #[error("topic name too long ({len} bytes, max {max})")]
    NameTooLong { len: usize, max: usize },

    /// A subscribe request holds more entries than the count field can carry.
    #[error("too many subscribe entries ({count}, max {max})")]
    TooManyEntries { count: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, WireError>;
