use airbridge_bus::BusError;
use airbridge_wire::{TypeTag, WireError};

/// Errors from topic resolution and lazy binding.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The wire tag code is outside the recognized code space. No entry
    /// is created.
    #[error("unknown type tag {0}")]
    UnknownTypeTag(u8),

    /// The topic is already bound to a different tag and the configured
    /// policy refuses to re-bind.
    #[error("topic {name:?} is bound to {existing}, refusing re-bind as {requested}")]
    TagConflict {
        name: String,
        existing: TypeTag,
        requested: TypeTag,
    },

    /// The bus refused the operation.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Errors surfaced by the bridge entry points. All are non-fatal: the
/// offending message or entry is dropped and later messages proceed.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// Structural violation of the wire grammar or a malformed payload.
    #[error(transparent)]
    Parse(#[from] WireError),

    /// Topic resolution failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The bus refused a delivery.
    #[error(transparent)]
    Bus(#[from] BusError),

    /// A flagged message with no flag byte.
    #[error("empty message")]
    EmptyMessage,

    /// The leading flag byte is not a known message kind.
    #[error("unknown message flag {0:?}")]
    UnknownFlag(char),
}

pub type Result<T> = std::result::Result<T, NodeError>;
