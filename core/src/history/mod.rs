//! Versioned edit history for identity-addressed document trees.
//!
//! This module implements a linear undo/redo subsystem in three layers:
//!
//! - [`ChangeWatcher`] — observes a set of tree nodes during a bounded
//!   recording window and accumulates a minimal before/after property diff
//! - [`EditRecord`] — an immutable, self-contained description of one
//!   coalesced edit that can apply and revert itself against a tree
//! - [`EditTimeline`] — the undo/redo stacks, the scalar position cursor,
//!   and the record/merge protocol tools use to commit new edits
//!
//! # Recording protocol
//!
//! A tool opens a recording window with [`EditTimeline::begin_record`],
//! mutates tree nodes through the tree's normal property setters (which
//! fire into the watcher via the tree's mutation hub), then calls
//! [`EditTimeline::end_record`]. The captured diff becomes an
//! [`EditRecord`] that the tool commits, merges into the previous entry
//! (drag gestures), or discards.
//!
//! History is strictly linear: committing after an undo discards the
//! abandoned redo entries. Undo/redo past the ends of history are silent
//! no-ops. Calling the recording operations out of sequence is a caller
//! bug and panics.

mod record;
mod timeline;
mod watcher;

pub use record::EditRecord;
pub use timeline::{EditTimeline, PositionObserver};
pub use watcher::{ChangeWatcher, RecordedDiff};

use crate::node::NodeId;

/// Key of one tracked (node, property) pair inside a diff.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyKey {
    pub node: NodeId,
    pub property: String,
}

impl PropertyKey {
    pub fn new(node: NodeId, property: impl Into<String>) -> Self {
        Self {
            node,
            property: property.into(),
        }
    }
}
