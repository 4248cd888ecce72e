//! The typed pub/sub bus boundary.
//!
//! The bridge core never talks to a real middleware directly; it consumes
//! the [`TopicBus`] trait. [`MemoryBus`] is the in-process implementation
//! used by tests and the CLI loop: named channels, one payload shape per
//! channel, bounded per-subscription queues.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{BusError, Result};
pub use memory::MemoryBus;
pub use traits::{DataCallback, PublisherHandle, SubscriptionHandle, TopicBus};
