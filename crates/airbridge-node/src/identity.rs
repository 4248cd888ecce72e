/// Identity of one bridged peer: its external address and the name that
/// namespaces everything it publishes. Immutable for the bridge's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    address: String,
    name: String,
}

impl NodeIdentity {
    /// Create an identity from the peer's external address and node name.
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }

    /// The peer's external address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The externally visible name for a topic this node publishes:
    /// `/<node>/<topic>`.
    pub fn full_topic_name(&self, topic: &str) -> String {
        format!("/{}/{}", self.name, topic)
    }
}

impl std::fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.address)
    }
}
