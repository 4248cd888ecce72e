//! The bridge itself: inbound message dispatch for one node.

use std::time::{Duration, Instant};

use airbridge_bus::TopicBus;
use airbridge_wire::{decode_payload, parse_publish, parse_subscribe_request, TypeTag};

use crate::config::BridgeConfig;
use crate::error::{NodeError, RegistryError, Result};
use crate::identity::NodeIdentity;
use crate::registry::TopicRegistry;
use crate::sink::SinkRef;

/// Leading flag byte of a subscribe-request message.
pub const FLAG_SUBSCRIBE: char = 'S';
/// Leading flag byte of a publish-data message.
pub const FLAG_PUBLISH: char = 'P';
/// Leading flag byte of a peer heartbeat.
pub const FLAG_HEARTBEAT: char = 'H';

/// One bridged node: owns its registry, its bus, and its outward sink.
///
/// All entry points are synchronous; every error is non-fatal and leaves
/// the bridge ready for the next message.
pub struct Bridge<B: TopicBus> {
    registry: TopicRegistry,
    bus: B,
    last_heartbeat: Option<Instant>,
}

impl<B: TopicBus> Bridge<B> {
    /// Create a bridge for one node.
    pub fn new(node: NodeIdentity, config: BridgeConfig, bus: B, sink: SinkRef) -> Self {
        Self {
            registry: TopicRegistry::new(node, config, sink),
            bus,
            last_heartbeat: None,
        }
    }

    /// The node this bridge serves.
    pub fn node(&self) -> &NodeIdentity {
        self.registry.node()
    }

    /// The topic registry.
    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// The bus, mutably — hosts use this to drive delivery.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Route a flagged message by its leading byte: `'S'` subscribe
    /// request, `'P'` publish data, `'H'` heartbeat.
    pub fn handle_message(&mut self, raw: &str) -> Result<()> {
        let flag = raw.chars().next().ok_or(NodeError::EmptyMessage)?;
        let body = &raw[flag.len_utf8()..];
        match flag {
            FLAG_SUBSCRIBE => self.handle_subscribe_request(body),
            FLAG_PUBLISH => self.handle_publish_request(body),
            FLAG_HEARTBEAT => {
                self.mark_heartbeat();
                Ok(())
            }
            other => Err(NodeError::UnknownFlag(other)),
        }
    }

    /// Handle a subscribe-request message.
    ///
    /// A structural parse error drops the whole message. A bad entry only
    /// drops that entry: it is logged and its siblings still get their
    /// subscriptions.
    pub fn handle_subscribe_request(&mut self, raw: &str) -> Result<()> {
        let entries = parse_subscribe_request(raw)?;
        for entry in entries {
            if let Err(err) =
                self.registry
                    .ensure_subscription(&mut self.bus, entry.name, entry.code)
            {
                tracing::warn!(
                    node = %self.registry.node(),
                    topic = entry.name,
                    code = entry.code,
                    %err,
                    "skipping subscribe entry"
                );
            }
        }
        Ok(())
    }

    /// Handle a publish-data message: ensure the publisher, decode the
    /// payload under the message's own tag, hand the value to the bus.
    ///
    /// An unknown tag is rejected before the publisher is materialized; a
    /// malformed payload is rejected after, and the publisher entry
    /// persists for the next message.
    pub fn handle_publish_request(&mut self, raw: &str) -> Result<()> {
        let frame = parse_publish(raw)?;
        let tag = TypeTag::from_code(frame.code)
            .ok_or(RegistryError::UnknownTypeTag(frame.code))?;

        let handle = self
            .registry
            .ensure_publisher(&mut self.bus, frame.name, frame.code)?;
        let value = decode_payload(tag, frame.data)?;
        self.bus.publish(handle, value)?;

        tracing::trace!(node = %self.registry.node(), topic = frame.name, %tag, "published");
        Ok(())
    }

    /// Record a peer heartbeat.
    pub fn mark_heartbeat(&mut self) {
        self.last_heartbeat = Some(Instant::now());
        tracing::trace!(node = %self.registry.node(), "heartbeat");
    }

    /// When the peer last heartbeat, if it ever has.
    pub fn last_heartbeat(&self) -> Option<Instant> {
        self.last_heartbeat
    }

    /// Time since the last peer heartbeat, if any.
    pub fn heartbeat_age(&self) -> Option<Duration> {
        self.last_heartbeat.map(|at| at.elapsed())
    }
}
