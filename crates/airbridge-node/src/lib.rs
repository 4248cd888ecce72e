//! Per-node bridging between the wire protocol and the typed bus.
//!
//! One [`Bridge`] instance owns everything for one named peer: its
//! identity, its lazily-populated topic registry, its bus, and the sink
//! that carries subscribed data back out. Several bridges can coexist in
//! one process; there is no global state.

pub mod bridge;
pub mod config;
pub mod error;
pub mod identity;
pub mod registry;
pub mod sink;

pub use bridge::{Bridge, FLAG_HEARTBEAT, FLAG_PUBLISH, FLAG_SUBSCRIBE};
pub use config::{BridgeConfig, TagConflict};
pub use error::{NodeError, RegistryError, Result};
pub use identity::NodeIdentity;
pub use registry::{PublisherEntry, SubscriptionEntry, TopicRegistry};
pub use sink::{ForwardSink, SinkRef};
