use std::sync::Arc;

use airbridge_wire::TypeTag;

use crate::identity::NodeIdentity;

/// The outward path for subscribed data: called once per bus delivery on a
/// topic with an active subscription, with the payload already
/// wire-encoded. Implemented by the embedding host.
pub trait ForwardSink: Send + Sync {
    fn forward(&self, node: &NodeIdentity, topic: &str, tag: TypeTag, data: &str);
}

/// Shared sink handle; cloned into every subscription callback.
pub type SinkRef = Arc<dyn ForwardSink>;

impl<F> ForwardSink for F
where
    F: Fn(&NodeIdentity, &str, TypeTag, &str) + Send + Sync,
{
    fn forward(&self, node: &NodeIdentity, topic: &str, tag: TypeTag, data: &str) {
        self(node, topic, tag, data)
    }
}
