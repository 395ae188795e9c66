//! The identity-addressed layer hierarchy.

use std::collections::HashMap;
use std::sync::Arc;

use stratum_core::accessor::{AccessorTable, PropertyAccessError, TypeMismatch};
use stratum_core::node::NodeId;
use stratum_core::notify::{MutationHub, MutationSink, SubscriptionId};
use stratum_core::track::{TrackPolicy, TrackingRegistry};
use stratum_core::tree::{DocumentTree, ObservableTree, PARENT_PROPERTY, TreeError};
use stratum_core::value::PropertyValue;

use crate::layer::{Layer, layer_accessors};

struct Slot {
    layer: Layer,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The document's layer tree.
///
/// Layers are stored by [`NodeId`] and keep their id across reparenting.
/// Every property write and structural move routes through
/// [`set_property`](DocumentTree::set_property) / [`reparent`](DocumentTree::reparent),
/// which fire before/after notifications into the tree's [`MutationHub`] —
/// this is what lets an edit-history watcher observe tool gestures.
pub struct LayerTree {
    slots: HashMap<NodeId, Slot>,
    roots: Vec<NodeId>,
    accessors: AccessorTable<Layer>,
    registry: Arc<TrackingRegistry>,
    hub: MutationHub,
}

impl LayerTree {
    /// Creates an empty tree with the [`Layer`] accessor table built once.
    pub fn new() -> Self {
        let accessors = layer_accessors();
        let mut registry = accessors.tracking_registry();
        // The parent link is structural, not a Layer field, so it is
        // registered here rather than in the accessor table.
        registry.insert(PARENT_PROPERTY, TrackPolicy::Discrete);
        Self {
            slots: HashMap::new(),
            roots: Vec::new(),
            accessors,
            registry: Arc::new(registry),
            hub: MutationHub::new(),
        }
    }

    /// The constructed-once tracking registry covering every layer
    /// property plus the parent link. Hand this to the edit timeline.
    pub fn registry(&self) -> Arc<TrackingRegistry> {
        Arc::clone(&self.registry)
    }

    /// Inserts `layer` under `parent` (`None` makes it a root) and
    /// returns its fresh id.
    pub fn insert(&mut self, layer: Layer, parent: Option<NodeId>) -> Result<NodeId, TreeError> {
        if let Some(parent) = parent
            && !self.slots.contains_key(&parent)
        {
            return Err(TreeError::NodeNotFound(parent));
        }
        let id = NodeId::next();
        self.slots.insert(
            id,
            Slot {
                layer,
                parent,
                children: Vec::new(),
            },
        );
        self.attach(parent, id);
        Ok(id)
    }

    /// Read-only access to a layer's fields.
    pub fn layer(&self, id: NodeId) -> Option<&Layer> {
        self.slots.get(&id).map(|slot| &slot.layer)
    }

    /// Children of `id` in attachment order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots
            .get(&id)
            .map(|slot| slot.children.as_slice())
            .unwrap_or(&[])
    }

    /// Top-level layers in attachment order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of layers in the tree.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Removes `id` and all its descendants depth-first. Returns `false`
    /// if the id did not resolve.
    ///
    /// Removal is not routed through mutation notifications: deleting
    /// layers is the responsibility of edits that own reintroducing them,
    /// outside the property-diff protocol.
    pub fn remove_recursive(&mut self, id: NodeId) -> bool {
        if !self.slots.contains_key(&id) {
            return false;
        }
        self.detach(id);
        self.remove_subtree(id);
        log::debug!("removed layer subtree rooted at {id}");
        true
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let children = self
            .slots
            .remove(&id)
            .map(|slot| slot.children)
            .unwrap_or_default();
        for child in children {
            self.remove_subtree(child);
        }
    }

    /// Unlinks `id` from its parent's child list (or the root list).
    fn detach(&mut self, id: NodeId) {
        let parent = self.slots.get(&id).and_then(|slot| slot.parent);
        match parent {
            Some(parent) => {
                if let Some(slot) = self.slots.get_mut(&parent) {
                    slot.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.parent = None;
        }
    }

    /// Links `id` under `parent` (or the root list).
    fn attach(&mut self, parent: Option<NodeId>, id: NodeId) {
        match parent {
            Some(parent) => {
                if let Some(slot) = self.slots.get_mut(&parent) {
                    slot.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.parent = parent;
        }
    }

    /// `true` if `ancestor` appears on the parent chain of `id`.
    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.slots.get(&id).and_then(|slot| slot.parent);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.slots.get(&node).and_then(|slot| slot.parent);
        }
        false
    }
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree for LayerTree {
    fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    fn property(&self, id: NodeId, name: &str) -> Option<PropertyValue> {
        let slot = self.slots.get(&id)?;
        if name == PARENT_PROPERTY {
            return Some(PropertyValue::Node(slot.parent));
        }
        self.accessors.get(&slot.layer, name).ok()
    }

    fn set_property(
        &mut self,
        id: NodeId,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), TreeError> {
        if name == PARENT_PROPERTY {
            let Some(parent) = value.as_node() else {
                return Err(TreeError::Property(PropertyAccessError::TypeMismatch {
                    property: name.to_owned(),
                    source: TypeMismatch {
                        expected: stratum_core::value::ValueKind::Node,
                        got: value.kind(),
                    },
                }));
            };
            return self.reparent(id, parent);
        }
        let slot = self.slots.get_mut(&id).ok_or(TreeError::NodeNotFound(id))?;
        let before = self.accessors.get(&slot.layer, name)?;
        self.hub.notify_changing(id, name, &before);
        self.accessors.set(&mut slot.layer, name, value)?;
        let after = self.accessors.get(&slot.layer, name)?;
        self.hub.notify_changed(id, name, &after);
        Ok(())
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(&id).and_then(|slot| slot.parent)
    }

    fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError> {
        if !self.slots.contains_key(&id) {
            return Err(TreeError::NodeNotFound(id));
        }
        if let Some(parent) = new_parent {
            if !self.slots.contains_key(&parent) {
                return Err(TreeError::NodeNotFound(parent));
            }
            if parent == id || self.is_ancestor(id, parent) {
                return Err(TreeError::WouldCycle { child: id, parent });
            }
        }
        let before = self.slots[&id].parent;
        if before == new_parent {
            return Ok(()); // already parented correctly
        }
        self.hub
            .notify_changing(id, PARENT_PROPERTY, &PropertyValue::Node(before));
        self.detach(id);
        self.attach(new_parent, id);
        self.hub
            .notify_changed(id, PARENT_PROPERTY, &PropertyValue::Node(new_parent));
        Ok(())
    }
}

impl ObservableTree for LayerTree {
    fn subscribe(&mut self, sink: Box<dyn MutationSink>) -> SubscriptionId {
        self.hub.subscribe(sink)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn MutationSink>> {
        self.hub.unsubscribe(id)
    }
}

impl std::fmt::Debug for LayerTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerTree")
            .field("layers", &self.slots.len())
            .field("roots", &self.roots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_builds_structure() {
        let mut tree = LayerTree::new();
        let group = tree.insert(Layer::new("group"), None).unwrap();
        let child = tree.insert(Layer::new("child"), Some(group)).unwrap();

        assert_eq!(tree.roots(), &[group]);
        assert_eq!(tree.children(group), &[child]);
        assert_eq!(tree.parent(child), Some(group));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn insert_under_unknown_parent_errors() {
        let mut tree = LayerTree::new();
        let ghost = NodeId::from_raw(u64::MAX);
        assert_eq!(
            tree.insert(Layer::new("a"), Some(ghost)),
            Err(TreeError::NodeNotFound(ghost))
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn set_property_updates_layer() {
        let mut tree = LayerTree::new();
        let id = tree.insert(Layer::new("a"), None).unwrap();

        tree.set_property(id, "position", [10.0f32, 5.0].into())
            .unwrap();
        assert_eq!(tree.layer(id).unwrap().position, [10.0, 5.0]);
        assert_eq!(
            tree.property(id, "position"),
            Some(PropertyValue::Vec2([10.0, 5.0]))
        );
    }

    #[test]
    fn set_property_on_unknown_node_errors() {
        let mut tree = LayerTree::new();
        let ghost = NodeId::from_raw(u64::MAX);
        assert_eq!(
            tree.set_property(ghost, "opacity", 0.5f32.into()),
            Err(TreeError::NodeNotFound(ghost))
        );
    }

    #[test]
    fn parent_reads_as_node_property() {
        let mut tree = LayerTree::new();
        let group = tree.insert(Layer::new("group"), None).unwrap();
        let child = tree.insert(Layer::new("child"), Some(group)).unwrap();

        assert_eq!(
            tree.property(child, PARENT_PROPERTY),
            Some(PropertyValue::Node(Some(group)))
        );
        assert_eq!(
            tree.property(group, PARENT_PROPERTY),
            Some(PropertyValue::Node(None))
        );
    }

    #[test]
    fn reparent_moves_between_groups() {
        let mut tree = LayerTree::new();
        let group_1 = tree.insert(Layer::new("group-1"), None).unwrap();
        let group_2 = tree.insert(Layer::new("group-2"), None).unwrap();
        let child = tree.insert(Layer::new("child"), Some(group_1)).unwrap();

        tree.reparent(child, Some(group_2)).unwrap();
        assert_eq!(tree.parent(child), Some(group_2));
        assert!(tree.children(group_1).is_empty());
        assert_eq!(tree.children(group_2), &[child]);
    }

    #[test]
    fn reparent_to_root() {
        let mut tree = LayerTree::new();
        let group = tree.insert(Layer::new("group"), None).unwrap();
        let child = tree.insert(Layer::new("child"), Some(group)).unwrap();

        tree.reparent(child, None).unwrap();
        assert_eq!(tree.parent(child), None);
        assert_eq!(tree.roots(), &[group, child]);
    }

    #[test]
    fn reparent_rejects_self_and_descendants() {
        let mut tree = LayerTree::new();
        let group = tree.insert(Layer::new("group"), None).unwrap();
        let child = tree.insert(Layer::new("child"), Some(group)).unwrap();

        assert!(matches!(
            tree.reparent(group, Some(group)),
            Err(TreeError::WouldCycle { .. })
        ));
        assert!(matches!(
            tree.reparent(group, Some(child)),
            Err(TreeError::WouldCycle { .. })
        ));
    }

    #[test]
    fn remove_recursive_drops_subtree() {
        let mut tree = LayerTree::new();
        let group = tree.insert(Layer::new("group"), None).unwrap();
        let child = tree.insert(Layer::new("child"), Some(group)).unwrap();
        let grandchild = tree.insert(Layer::new("grandchild"), Some(child)).unwrap();
        let other = tree.insert(Layer::new("other"), None).unwrap();

        assert!(tree.remove_recursive(group));
        assert!(!tree.contains(group));
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.contains(other));
        assert_eq!(tree.roots(), &[other]);
        assert!(!tree.remove_recursive(group));
    }

    #[test]
    fn registry_covers_fields_and_parent_link() {
        let tree = LayerTree::new();
        let registry = tree.registry();
        assert_eq!(registry.policy("position"), TrackPolicy::Continuous);
        assert_eq!(registry.policy("name"), TrackPolicy::Discrete);
        assert_eq!(registry.policy(PARENT_PROPERTY), TrackPolicy::Discrete);
    }

    #[test]
    fn debug_impl() {
        let tree = LayerTree::new();
        let debug = format!("{tree:?}");
        assert!(debug.contains("LayerTree"));
    }
}
