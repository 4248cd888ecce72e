use airbridge_wire::TypeTag;

use crate::traits::PublisherHandle;

/// Errors that can occur at the bus boundary.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// The publisher handle does not belong to this bus.
    #[error("unknown publisher handle {0:?}")]
    UnknownPublisher(PublisherHandle),

    /// A value's shape does not match the channel's declared type.
    #[error("type mismatch on {topic:?}: channel carries {expected}, got {got}")]
    TypeMismatch {
        topic: String,
        expected: TypeTag,
        got: TypeTag,
    },
}

pub type Result<T> = std::result::Result<T, BusError>;
