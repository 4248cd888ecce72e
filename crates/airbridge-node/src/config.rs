/// What to do when a topic is re-requested with a different type tag than
/// the one it was first bound with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagConflict {
    /// Keep the original binding and ignore the new tag. This is the peer
    /// protocol's historical behavior; the first request wins for the
    /// life of the node.
    KeepFirst,
    /// Refuse the conflicting request and leave the entry untouched.
    Reject,
}

/// Controls bridge behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Number of buffered undelivered values the bus may hold per channel
    /// before dropping the oldest.
    pub buffer_depth: usize,
    /// Policy for re-requests of an existing topic with a different tag.
    pub tag_conflict: TagConflict,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            buffer_depth: 3,
            tag_conflict: TagConflict::KeepFirst,
        }
    }
}
