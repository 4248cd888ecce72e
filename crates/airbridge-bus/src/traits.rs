use airbridge_wire::{Payload, TypeTag};

use crate::error::Result;

/// Callback bound to a subscription, invoked once per delivered value.
pub type DataCallback = Box<dyn FnMut(Payload) + Send>;

/// Opaque handle to a bus-side subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    /// Wrap a bus-assigned id.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The bus-assigned id.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// Opaque handle to a bus-side publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublisherHandle(u64);

impl PublisherHandle {
    /// Wrap a bus-assigned id.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The bus-assigned id.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// The pub/sub transport the bridge delegates delivery to.
///
/// `buffer_depth` is the bounded-queue policy per channel object: the
/// number of undelivered values the bus may hold before dropping the
/// oldest. The bridge core never implements backpressure itself.
pub trait TopicBus {
    /// Create a subscription on `name` carrying `tag`-shaped values.
    /// `callback` is invoked by the bus for every delivery.
    fn create_subscription(
        &mut self,
        tag: TypeTag,
        name: &str,
        callback: DataCallback,
        buffer_depth: usize,
    ) -> Result<SubscriptionHandle>;

    /// Create a publisher on `full_name` carrying `tag`-shaped values.
    fn create_publisher(
        &mut self,
        tag: TypeTag,
        full_name: &str,
        buffer_depth: usize,
    ) -> Result<PublisherHandle>;

    /// Hand a value to the bus for delivery through `handle`.
    fn publish(&mut self, handle: PublisherHandle, value: Payload) -> Result<()>;
}
