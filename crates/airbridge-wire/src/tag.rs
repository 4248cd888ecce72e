//! Wire type tags.
//!
//! The peer encodes the payload shape of every topic as a single decimal
//! digit. Codes 0-3 are the whole code space; anything else is rejected at
//! the registry boundary before any entry is created.

/// The payload shape carried by a topic, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Ordered sequence of 64-bit floats. Wire code 0.
    NumericArray,
    /// Single boolean. Wire code 1.
    Boolean,
    /// UTF-8 text. Wire code 2.
    Text,
    /// Single 64-bit float. Wire code 3.
    Scalar,
}

impl TypeTag {
    /// Resolve a wire code. Returns `None` for anything outside 0-3.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TypeTag::NumericArray),
            1 => Some(TypeTag::Boolean),
            2 => Some(TypeTag::Text),
            3 => Some(TypeTag::Scalar),
            _ => None,
        }
    }

    /// The wire code for this tag.
    pub fn code(self) -> u8 {
        match self {
            TypeTag::NumericArray => 0,
            TypeTag::Boolean => 1,
            TypeTag::Text => 2,
            TypeTag::Scalar => 3,
        }
    }

    /// Human-readable tag name for logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::NumericArray => "numeric-array",
            TypeTag::Boolean => "boolean",
            TypeTag::Text => "text",
            TypeTag::Scalar => "scalar",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
