//! In-process reference bus.

use std::collections::{HashMap, VecDeque};

use airbridge_wire::{Payload, TypeTag};

use crate::error::{BusError, Result};
use crate::traits::{DataCallback, PublisherHandle, SubscriptionHandle, TopicBus};

struct SubscriptionRecord {
    name: String,
    tag: TypeTag,
    callback: DataCallback,
    queue: VecDeque<Payload>,
    depth: usize,
}

struct PublisherRecord {
    full_name: String,
    tag: TypeTag,
}

/// A synchronous, in-process [`TopicBus`].
///
/// Inbound bus traffic is simulated with [`enqueue`](MemoryBus::enqueue),
/// which buffers values per subscription up to its `buffer_depth` (oldest
/// dropped beyond that), and [`pump`](MemoryBus::pump), which drains the
/// queues through the subscription callbacks. Published values are
/// recorded for inspection.
#[derive(Default)]
pub struct MemoryBus {
    subscriptions: Vec<SubscriptionRecord>,
    publishers: HashMap<u64, PublisherRecord>,
    published: Vec<(String, Payload)>,
    next_id: u64,
}

impl MemoryBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a value on every subscription of `name`, as if a remote
    /// participant had published it. Returns how many subscriptions
    /// accepted the value; shape-mismatched subscriptions skip it.
    pub fn enqueue(&mut self, name: &str, value: Payload) -> usize {
        let mut accepted = 0;
        for sub in self.subscriptions.iter_mut().filter(|s| s.name == name) {
            if sub.tag != value.tag() {
                tracing::warn!(
                    topic = %sub.name,
                    expected = %sub.tag,
                    got = %value.tag(),
                    "dropping mis-shaped delivery"
                );
                continue;
            }
            if sub.queue.len() == sub.depth {
                sub.queue.pop_front();
                tracing::warn!(topic = %sub.name, depth = sub.depth, "queue full, dropping oldest");
            }
            sub.queue.push_back(value.clone());
            accepted += 1;
        }
        accepted
    }

    /// Drain every subscription queue through its callback, in handle
    /// order. Returns the number of values delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        for sub in &mut self.subscriptions {
            while let Some(value) = sub.queue.pop_front() {
                (sub.callback)(value);
                delivered += 1;
            }
        }
        delivered
    }

    /// Values handed to [`TopicBus::publish`] so far, as
    /// `(full topic name, value)` pairs.
    pub fn published(&self) -> &[(String, Payload)] {
        &self.published
    }

    /// Drain the published-value record.
    pub fn take_published(&mut self) -> Vec<(String, Payload)> {
        std::mem::take(&mut self.published)
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Number of live publishers.
    pub fn publisher_count(&self) -> usize {
        self.publishers.len()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl TopicBus for MemoryBus {
    fn create_subscription(
        &mut self,
        tag: TypeTag,
        name: &str,
        callback: DataCallback,
        buffer_depth: usize,
    ) -> Result<SubscriptionHandle> {
        let id = self.next_id();
        self.subscriptions.push(SubscriptionRecord {
            name: name.to_string(),
            tag,
            callback,
            queue: VecDeque::with_capacity(buffer_depth),
            depth: buffer_depth.max(1),
        });
        tracing::debug!(topic = name, %tag, "bus subscription created");
        Ok(SubscriptionHandle::from_raw(id))
    }

    fn create_publisher(
        &mut self,
        tag: TypeTag,
        full_name: &str,
        _buffer_depth: usize,
    ) -> Result<PublisherHandle> {
        let id = self.next_id();
        self.publishers.insert(
            id,
            PublisherRecord {
                full_name: full_name.to_string(),
                tag,
            },
        );
        tracing::debug!(topic = full_name, %tag, "bus publisher created");
        Ok(PublisherHandle::from_raw(id))
    }

    fn publish(&mut self, handle: PublisherHandle, value: Payload) -> Result<()> {
        let record = self
            .publishers
            .get(&handle.as_raw())
            .ok_or(BusError::UnknownPublisher(handle))?;
        if record.tag != value.tag() {
            return Err(BusError::TypeMismatch {
                topic: record.full_name.clone(),
                expected: record.tag,
                got: value.tag(),
            });
        }
        self.published.push((record.full_name.clone(), value));
        Ok(())
    }
}
