//! Identity-addressed document tree contracts.
//!
//! The history engine never touches a concrete tree type: it resolves
//! nodes by [`NodeId`] through [`DocumentTree`] and observes mutations
//! through [`ObservableTree`]. Concrete documents (a layer hierarchy, a
//! test fixture) implement both.

use crate::accessor::PropertyAccessError;
use crate::node::NodeId;
use crate::notify::{MutationSink, SubscriptionId};
use crate::value::PropertyValue;

/// The distinguished property name whose value is a node reference.
///
/// Setting it means "detach from the current parent and attach under the
/// referenced node" — reparenting expressed as a property change, applied
/// as a structural move rather than a field write.
pub const PARENT_PROPERTY: &str = "parent";

/// Error from an identity-addressed tree operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("node {0} not found in the tree")]
    NodeNotFound(NodeId),
    #[error("cannot attach {child} under {parent}: would create a cycle")]
    WouldCycle { child: NodeId, parent: NodeId },
    #[error(transparent)]
    Property(#[from] PropertyAccessError),
}

/// A mutable tree whose nodes are addressed by stable identity.
pub trait DocumentTree {
    /// Returns `true` if `id` resolves to a live node.
    fn contains(&self, id: NodeId) -> bool;

    /// Reads property `name` of node `id`. `None` if the node does not
    /// exist or has no such property. [`PARENT_PROPERTY`] reads as a
    /// [`PropertyValue::Node`].
    fn property(&self, id: NodeId, name: &str) -> Option<PropertyValue>;

    /// Writes property `name` of node `id`. Writing [`PARENT_PROPERTY`]
    /// is equivalent to [`reparent`](Self::reparent).
    fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), TreeError>;

    /// Returns the parent of `id`, or `None` for roots and unknown ids.
    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// Detaches `id` from its current parent (if any) and attaches it
    /// under `new_parent` (`None` makes it a root).
    fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError>;
}

/// A [`DocumentTree`] that fires pre/post mutation notifications.
pub trait ObservableTree: DocumentTree {
    /// Registers a sink with the tree's mutation hub.
    fn subscribe(&mut self, sink: Box<dyn MutationSink>) -> SubscriptionId;

    /// Removes a previously registered sink, returning it.
    fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn MutationSink>>;
}
