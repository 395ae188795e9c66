//! Pre/post mutation notification.
//!
//! An observable tree owns a [`MutationHub`] and routes every property
//! write through it: [`MutationSink::property_changing`] fires with the
//! value *before* the write, [`MutationSink::property_changed`] with the
//! value *after*. The two callback points are deliberately distinct — the
//! change watcher's first-write/last-write semantics depend on telling
//! "before" apart from "after".
//!
//! Subscribers are type-erased boxes; [`MutationHub::unsubscribe`] hands
//! the box back so the owner can recover its sink's accumulated state.

use crate::node::NodeId;
use crate::value::PropertyValue;

/// Receiver for property mutation notifications.
pub trait MutationSink: Send {
    /// Fired immediately before property `property` of `node` changes.
    /// `value` is the property's current (pre-mutation) value.
    fn property_changing(&mut self, node: NodeId, property: &str, value: &PropertyValue);

    /// Fired immediately after property `property` of `node` changed.
    /// `value` is the property's new (post-mutation) value.
    fn property_changed(&mut self, node: NodeId, property: &str, value: &PropertyValue);
}

/// Handle identifying one hub subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out point for mutation notifications.
///
/// Sinks are notified in subscription order. The hub is owned by the tree
/// it observes, so notification happens inside the tree's own `&mut self`
/// mutation methods — no re-entrant tree access is possible from a sink.
#[derive(Default)]
pub struct MutationHub {
    next_id: u64,
    sinks: Vec<(SubscriptionId, Box<dyn MutationSink>)>,
}

impl MutationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink; returns the id needed to remove it again.
    pub fn subscribe(&mut self, sink: Box<dyn MutationSink>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.sinks.push((id, sink));
        id
    }

    /// Removes a sink, returning it so the caller can take back its state.
    /// Returns `None` for an unknown or already-removed id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn MutationSink>> {
        let index = self.sinks.iter().position(|(sid, _)| *sid == id)?;
        Some(self.sinks.remove(index).1)
    }

    /// Fires the pre-mutation notification on every sink.
    pub fn notify_changing(&mut self, node: NodeId, property: &str, value: &PropertyValue) {
        for (_, sink) in &mut self.sinks {
            sink.property_changing(node, property, value);
        }
    }

    /// Fires the post-mutation notification on every sink.
    pub fn notify_changed(&mut self, node: NodeId, property: &str, value: &PropertyValue) {
        for (_, sink) in &mut self.sinks {
            sink.property_changed(node, property, value);
        }
    }

    /// Number of active subscriptions.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl std::fmt::Debug for MutationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationHub")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
