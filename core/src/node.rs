use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// A stable, process-unique identifier for a document tree node.
///
/// Ids are independent of a node's position in the tree: a node keeps its
/// id across reparenting. History code never holds node references across
/// a recording boundary — only [`NodeId`]s — so edit records stay valid
/// after the tree has been restructured by later edits.
///
/// # Identity
///
/// Two ids are equal only if they came from the same [`NodeId::next`] call
/// (or share the same raw value via [`NodeId::from_raw`]).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates a fresh id from the process-wide counter.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Builds an id from a raw value.
    ///
    /// Intended for tests and external id schemes; ids built this way may
    /// collide with allocator-produced ids.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value of this id.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_ids_are_unique() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn next_ids_are_monotonic() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn from_raw_round_trips() {
        let id = NodeId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id, NodeId::from_raw(42));
    }

    #[test]
    fn display_format() {
        assert_eq!(NodeId::from_raw(7).to_string(), "node#7");
    }
}
