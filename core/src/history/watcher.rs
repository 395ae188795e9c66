//! Bounded-window mutation recording.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;

use super::PropertyKey;
use crate::node::NodeId;
use crate::notify::{MutationSink, SubscriptionId};
use crate::track::{RecordFilter, TrackingRegistry};
use crate::tree::ObservableTree;
use crate::value::PropertyValue;

/// The before/after property diff accumulated by one recording window.
#[derive(Debug, Default)]
pub struct RecordedDiff {
    /// Value of each tracked key *before* its first mutation in the window.
    pub old: BTreeMap<PropertyKey, PropertyValue>,
    /// Value of each tracked key *after* its last mutation in the window.
    pub new: BTreeMap<PropertyKey, PropertyValue>,
    /// Distinct nodes that received at least one tracked mutation.
    pub touched: BTreeSet<NodeId>,
}

impl RecordedDiff {
    /// `true` if the window captured no tracked mutation.
    pub fn is_empty(&self) -> bool {
        self.new.is_empty()
    }
}

struct DiffState {
    targets: HashSet<NodeId>,
    filter: RecordFilter,
    registry: Arc<TrackingRegistry>,
    diff: RecordedDiff,
}

impl DiffState {
    fn tracks(&self, node: NodeId, property: &str) -> bool {
        self.targets.contains(&node) && self.filter.records(self.registry.policy(property))
    }
}

/// The hub-side half of a watcher: forwards notifications into the
/// shared diff state.
struct WatcherSink {
    state: Arc<Mutex<DiffState>>,
}

impl MutationSink for WatcherSink {
    fn property_changing(&mut self, node: NodeId, property: &str, value: &PropertyValue) {
        let mut state = self.state.lock();
        if !state.tracks(node, property) {
            return;
        }
        // First write wins: the record must hold the value seen before
        // the gesture started, not before its latest sample.
        state
            .diff
            .old
            .entry(PropertyKey::new(node, property))
            .or_insert_with(|| value.clone());
    }

    fn property_changed(&mut self, node: NodeId, property: &str, value: &PropertyValue) {
        let mut state = self.state.lock();
        if !state.tracks(node, property) {
            return;
        }
        // Last write wins: overwritten on every subsequent change.
        state
            .diff
            .new
            .insert(PropertyKey::new(node, property), value.clone());
        state.diff.touched.insert(node);
    }
}

/// Observes a fixed set of tree nodes for one bounded recording window.
///
/// Between [`begin`](Self::begin) and [`end`](Self::end) every tracked
/// property mutation on a target node is folded into a [`RecordedDiff`]:
/// the `old` side keeps the value captured at the *first* pre-mutation
/// notification per key, the `new` side the value from the *last*
/// post-mutation notification. A watcher is single-use; `end` consumes it.
pub struct ChangeWatcher {
    state: Arc<Mutex<DiffState>>,
    subscription: SubscriptionId,
}

impl ChangeWatcher {
    /// Starts observing `targets` on `tree`.
    ///
    /// Ids that do not resolve in the tree are silently excluded — a
    /// non-observable node simply cannot participate in the window.
    /// `filter` selects which tracking classes are recorded; policies come
    /// from the constructed-once `registry`.
    pub fn begin<T: ObservableTree>(
        tree: &mut T,
        targets: &[NodeId],
        filter: RecordFilter,
        registry: Arc<TrackingRegistry>,
    ) -> Self {
        let targets: HashSet<NodeId> = targets
            .iter()
            .copied()
            .filter(|id| tree.contains(*id))
            .collect();
        let state = Arc::new(Mutex::new(DiffState {
            targets,
            filter,
            registry,
            diff: RecordedDiff::default(),
        }));
        let subscription = tree.subscribe(Box::new(WatcherSink {
            state: Arc::clone(&state),
        }));
        Self {
            state,
            subscription,
        }
    }

    /// Number of nodes actually under observation (after filtering out
    /// ids the tree could not resolve).
    pub fn target_count(&self) -> usize {
        self.state.lock().targets.len()
    }

    /// Stops observing and returns the accumulated diff.
    pub fn end<T: ObservableTree>(self, tree: &mut T) -> RecordedDiff {
        drop(tree.unsubscribe(self.subscription));
        let mut state = self.state.lock();
        mem::take(&mut state.diff)
    }
}
