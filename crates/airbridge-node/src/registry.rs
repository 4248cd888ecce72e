//! Topic resolution and lazy binding.
//!
//! Bus-side objects are created on first use and live for the rest of the
//! node's lifetime; a later decode error on a topic never tears its entry
//! down. The subscription table is shared with the forwarding callbacks so
//! the dispatch-time tag is read from the entry itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airbridge_bus::{DataCallback, PublisherHandle, SubscriptionHandle, TopicBus};
use airbridge_wire::{encode_payload, Payload, TypeTag};

use crate::config::{BridgeConfig, TagConflict};
use crate::error::RegistryError;
use crate::identity::NodeIdentity;
use crate::sink::SinkRef;

/// One active subscription: created once per topic name, never re-typed.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionEntry {
    /// The tag the topic was first bound with.
    pub tag: TypeTag,
    /// Bus-side handle.
    pub handle: SubscriptionHandle,
}

/// One active publisher. Scoped by raw topic name; the namespaced full
/// name is computed once at creation and never recomputed.
#[derive(Debug, Clone)]
pub struct PublisherEntry {
    /// The tag the topic was first bound with.
    pub tag: TypeTag,
    /// Bus-side handle.
    pub handle: PublisherHandle,
    /// External name the bus knows this topic by: `/<node>/<topic>`.
    pub full_name: String,
}

type SharedSubscriptions = Arc<Mutex<HashMap<String, SubscriptionEntry>>>;

/// Per-node registry of active subscriptions and publishers, keyed by raw
/// topic name.
pub struct TopicRegistry {
    node: NodeIdentity,
    config: BridgeConfig,
    sink: SinkRef,
    subscriptions: SharedSubscriptions,
    publishers: HashMap<String, PublisherEntry>,
}

impl TopicRegistry {
    /// Create an empty registry for one node.
    pub fn new(node: NodeIdentity, config: BridgeConfig, sink: SinkRef) -> Self {
        Self {
            node,
            config,
            sink,
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
            publishers: HashMap::new(),
        }
    }

    /// The node this registry belongs to.
    pub fn node(&self) -> &NodeIdentity {
        &self.node
    }

    /// Ensure a subscription exists for `name`.
    ///
    /// An existing entry short-circuits before the tag code is even
    /// validated; under [`TagConflict::KeepFirst`] the original binding
    /// is retained no matter what the new request says. The check and the
    /// insert happen under one lock, so a concurrent bus cannot observe a
    /// half-created entry.
    pub fn ensure_subscription(
        &mut self,
        bus: &mut dyn TopicBus,
        name: &str,
        code: u8,
    ) -> Result<(), RegistryError> {
        let mut subs = lock(&self.subscriptions);

        if let Some(entry) = subs.get(name) {
            return match self.config.tag_conflict {
                TagConflict::KeepFirst => {
                    if TypeTag::from_code(code) != Some(entry.tag) {
                        tracing::debug!(
                            topic = name,
                            existing = %entry.tag,
                            code,
                            "re-subscribe with different tag ignored"
                        );
                    }
                    Ok(())
                }
                TagConflict::Reject => {
                    let requested = TypeTag::from_code(code)
                        .ok_or(RegistryError::UnknownTypeTag(code))?;
                    if requested == entry.tag {
                        Ok(())
                    } else {
                        Err(RegistryError::TagConflict {
                            name: name.to_string(),
                            existing: entry.tag,
                            requested,
                        })
                    }
                }
            };
        }

        let tag = TypeTag::from_code(code).ok_or(RegistryError::UnknownTypeTag(code))?;
        let callback = self.forward_callback(name);
        let handle = bus.create_subscription(tag, name, callback, self.config.buffer_depth)?;
        subs.insert(name.to_string(), SubscriptionEntry { tag, handle });

        tracing::debug!(node = %self.node, topic = name, %tag, "subscription created");
        Ok(())
    }

    /// Ensure a publisher exists for `name`, returning its handle for
    /// immediate use. Same existence and conflict policy as
    /// [`ensure_subscription`](Self::ensure_subscription).
    pub fn ensure_publisher(
        &mut self,
        bus: &mut dyn TopicBus,
        name: &str,
        code: u8,
    ) -> Result<PublisherHandle, RegistryError> {
        if let Some(entry) = self.publishers.get(name) {
            return match self.config.tag_conflict {
                TagConflict::KeepFirst => {
                    if TypeTag::from_code(code) != Some(entry.tag) {
                        tracing::debug!(
                            topic = name,
                            existing = %entry.tag,
                            code,
                            "re-publish with different tag keeps original binding"
                        );
                    }
                    Ok(entry.handle)
                }
                TagConflict::Reject => {
                    let requested = TypeTag::from_code(code)
                        .ok_or(RegistryError::UnknownTypeTag(code))?;
                    if requested == entry.tag {
                        Ok(entry.handle)
                    } else {
                        Err(RegistryError::TagConflict {
                            name: name.to_string(),
                            existing: entry.tag,
                            requested,
                        })
                    }
                }
            };
        }

        let tag = TypeTag::from_code(code).ok_or(RegistryError::UnknownTypeTag(code))?;
        let full_name = self.node.full_topic_name(name);
        let handle = bus.create_publisher(tag, &full_name, self.config.buffer_depth)?;
        self.publishers.insert(
            name.to_string(),
            PublisherEntry {
                tag,
                handle,
                full_name: full_name.clone(),
            },
        );

        tracing::debug!(node = %self.node, topic = %full_name, %tag, "publisher created");
        Ok(handle)
    }

    /// Tag a subscribed topic was bound with, if any.
    pub fn subscription_tag(&self, name: &str) -> Option<TypeTag> {
        lock(&self.subscriptions).get(name).map(|entry| entry.tag)
    }

    /// Tag a published topic was bound with, if any.
    pub fn publisher_tag(&self, name: &str) -> Option<TypeTag> {
        self.publishers.get(name).map(|entry| entry.tag)
    }

    /// External full name of a published topic, if any.
    pub fn publisher_full_name(&self, name: &str) -> Option<&str> {
        self.publishers.get(name).map(|entry| entry.full_name.as_str())
    }

    /// Number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        lock(&self.subscriptions).len()
    }

    /// Number of active publishers.
    pub fn publisher_count(&self) -> usize {
        self.publishers.len()
    }

    /// Names of all subscribed topics, sorted.
    pub fn subscribed_topics(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.subscriptions).keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Build the decode-and-forward callback for one topic. The tag is
    /// looked up from the shared entry table at dispatch time rather than
    /// captured here, so there is exactly one copy of each binding.
    fn forward_callback(&self, name: &str) -> DataCallback {
        let name = name.to_string();
        let node = self.node.clone();
        let sink = Arc::clone(&self.sink);
        let entries = Arc::clone(&self.subscriptions);

        Box::new(move |value: Payload| {
            let tag = match lock(&entries).get(&name) {
                Some(entry) => entry.tag,
                // Delivery raced entry creation; nothing to forward yet.
                None => return,
            };
            let wire = encode_payload(&value);
            sink.forward(&node, &name, tag, &wire);
        })
    }
}

/// A poisoned map only means some callback panicked mid-forward; the map
/// itself is still structurally sound, so keep serving.
fn lock(map: &Mutex<HashMap<String, SubscriptionEntry>>) -> MutexGuard<'_, HashMap<String, SubscriptionEntry>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use airbridge_bus::MemoryBus;

    use super::*;

    struct RecordingSink {
        seen: StdMutex<Vec<(String, TypeTag, String)>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: StdMutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<(String, TypeTag, String)> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl crate::sink::ForwardSink for RecordingSink {
        fn forward(&self, _node: &NodeIdentity, topic: &str, tag: TypeTag, data: &str) {
            self.seen
                .lock()
                .unwrap()
                .push((topic.to_string(), tag, data.to_string()));
        }
    }

    fn registry_with(config: BridgeConfig) -> (TopicRegistry, Arc<RecordingSink>) {
        let sink = RecordingSink::new();
        let sink_ref: SinkRef = sink.clone();
        let registry = TopicRegistry::new(
            NodeIdentity::new("10.0.0.7", "blimp3"),
            config,
            sink_ref,
        );
        (registry, sink)
    }

    #[test]
    fn subscription_is_created_once() {
        let (mut registry, _sink) = registry_with(BridgeConfig::default());
        let mut bus = MemoryBus::new();

        registry.ensure_subscription(&mut bus, "alt", 3).unwrap();
        registry.ensure_subscription(&mut bus, "alt", 3).unwrap();

        assert_eq!(registry.subscription_count(), 1);
        assert_eq!(bus.subscription_count(), 1);
    }

    #[test]
    fn first_writer_wins_on_tag_conflict() {
        let (mut registry, _sink) = registry_with(BridgeConfig::default());
        let mut bus = MemoryBus::new();

        registry.ensure_subscription(&mut bus, "alt", 3).unwrap();
        registry.ensure_subscription(&mut bus, "alt", 1).unwrap();

        assert_eq!(registry.subscription_tag("alt"), Some(TypeTag::Scalar));
        assert_eq!(bus.subscription_count(), 1);
    }

    #[test]
    fn reject_policy_surfaces_conflict_and_keeps_entry() {
        let (mut registry, _sink) = registry_with(BridgeConfig {
            tag_conflict: TagConflict::Reject,
            ..BridgeConfig::default()
        });
        let mut bus = MemoryBus::new();

        registry.ensure_subscription(&mut bus, "alt", 3).unwrap();
        let err = registry.ensure_subscription(&mut bus, "alt", 1).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::TagConflict {
                existing: TypeTag::Scalar,
                requested: TypeTag::Boolean,
                ..
            }
        ));
        assert_eq!(registry.subscription_tag("alt"), Some(TypeTag::Scalar));
    }

    #[test]
    fn reject_policy_accepts_matching_resubscribe() {
        let (mut registry, _sink) = registry_with(BridgeConfig {
            tag_conflict: TagConflict::Reject,
            ..BridgeConfig::default()
        });
        let mut bus = MemoryBus::new();

        registry.ensure_subscription(&mut bus, "alt", 3).unwrap();
        registry.ensure_subscription(&mut bus, "alt", 3).unwrap();
        assert_eq!(registry.subscription_count(), 1);
    }

    #[test]
    fn unknown_tag_creates_nothing() {
        let (mut registry, _sink) = registry_with(BridgeConfig::default());
        let mut bus = MemoryBus::new();

        let err = registry.ensure_subscription(&mut bus, "alt", 9).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTypeTag(9)));
        assert_eq!(registry.subscription_count(), 0);
        assert_eq!(bus.subscription_count(), 0);

        let err = registry.ensure_publisher(&mut bus, "alt", 9).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTypeTag(9)));
        assert_eq!(registry.publisher_count(), 0);
        assert_eq!(bus.publisher_count(), 0);
    }

    #[test]
    fn existing_entry_short_circuits_tag_validation() {
        // Matches the peer protocol: the existence check comes first, so a
        // re-request with a garbage tag is silently absorbed.
        let (mut registry, _sink) = registry_with(BridgeConfig::default());
        let mut bus = MemoryBus::new();

        registry.ensure_subscription(&mut bus, "alt", 3).unwrap();
        registry.ensure_subscription(&mut bus, "alt", 9).unwrap();
        assert_eq!(registry.subscription_tag("alt"), Some(TypeTag::Scalar));
    }

    #[test]
    fn publisher_full_name_is_namespaced_once() {
        let (mut registry, _sink) = registry_with(BridgeConfig::default());
        let mut bus = MemoryBus::new();

        let first = registry.ensure_publisher(&mut bus, "status", 2).unwrap();
        let second = registry.ensure_publisher(&mut bus, "status", 2).unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.publisher_count(), 1);
        assert_eq!(bus.publisher_count(), 1);
        assert_eq!(
            registry.publisher_full_name("status"),
            Some("/blimp3/status")
        );
    }

    #[test]
    fn forwarding_reads_tag_from_entry() {
        let (mut registry, sink) = registry_with(BridgeConfig::default());
        let mut bus = MemoryBus::new();

        registry.ensure_subscription(&mut bus, "alt", 3).unwrap();
        bus.enqueue("alt", Payload::Scalar(42.5));
        bus.pump();

        assert_eq!(
            sink.seen(),
            vec![("alt".to_string(), TypeTag::Scalar, "42.5".to_string())]
        );
    }

    #[test]
    fn subscribed_topics_are_sorted() {
        let (mut registry, _sink) = registry_with(BridgeConfig::default());
        let mut bus = MemoryBus::new();

        registry.ensure_subscription(&mut bus, "b", 1).unwrap();
        registry.ensure_subscription(&mut bus, "a", 1).unwrap();
        assert_eq!(registry.subscribed_topics(), vec!["a", "b"]);
    }
}
