//! The undo/redo timeline and recording protocol.

use std::sync::Arc;
use std::time::Duration;

use super::record::EditRecord;
use super::watcher::ChangeWatcher;
use crate::node::NodeId;
use crate::track::{RecordFilter, TrackingRegistry};
use crate::tree::{DocumentTree, ObservableTree};

/// Callback fired after every position transition, receiving the old and
/// new timeline position.
pub type PositionObserver = Box<dyn FnMut(u64, u64) + Send>;

/// Owns the applied/redo stacks, the position cursor, and the recording
/// protocol external tools drive.
///
/// History is strictly linear: [`commit`](Self::commit) and
/// [`merge`](Self::merge) discard the redo stack, so a new edit after an
/// undo abandons the old future for good. `position` always equals the id
/// of the most recently applied record, or 0 with nothing applied.
///
/// # Threading
///
/// All operations take `&mut self`; the engine assumes a single mutator.
/// A host with several threads touching the timeline must put one lock
/// around the whole commit/merge/undo/redo surface, held per operation —
/// never across a recording window, which legitimately spans many UI
/// callbacks.
pub struct EditTimeline {
    applied: Vec<EditRecord>,
    pending: Vec<EditRecord>,
    position: u64,
    registry: Arc<TrackingRegistry>,
    recording: Option<ChangeWatcher>,
    observers: Vec<PositionObserver>,
}

impl EditTimeline {
    /// Creates an empty timeline drawing tracking policies from `registry`.
    pub fn new(registry: Arc<TrackingRegistry>) -> Self {
        Self {
            applied: Vec::new(),
            pending: Vec::new(),
            position: 0,
            registry,
            recording: None,
            observers: Vec::new(),
        }
    }

    /// Opens a recording window over `targets`.
    ///
    /// # Panics
    ///
    /// Panics if a window is already open — interleaved windows are a
    /// caller bug in the recording protocol.
    pub fn begin_record<T: ObservableTree>(
        &mut self,
        tree: &mut T,
        targets: &[NodeId],
        filter: RecordFilter,
    ) {
        assert!(
            self.recording.is_none(),
            "begin_record called while a recording window is already open"
        );
        self.recording = Some(ChangeWatcher::begin(
            tree,
            targets,
            filter,
            Arc::clone(&self.registry),
        ));
    }

    /// Closes the recording window and returns its record, or `None` if
    /// the window captured no tracked change. The caller decides whether
    /// to [`commit`](Self::commit), [`merge`](Self::merge), or discard it.
    ///
    /// # Panics
    ///
    /// Panics if no window is open.
    pub fn end_record<T: ObservableTree>(&mut self, tree: &mut T) -> Option<EditRecord> {
        let Some(watcher) = self.recording.take() else {
            panic!("end_record called with no open recording window");
        };
        EditRecord::from_diff(self.position + 1, watcher.end(tree))
    }

    /// `true` while a recording window is open.
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Appends `record` as a new history entry.
    ///
    /// Clears the redo stack first: a new edit discards the abandoned
    /// future.
    pub fn commit(&mut self, record: EditRecord) {
        self.pending.clear();
        let old_position = self.position;
        self.position = record.id();
        log::debug!("committed edit {} ({})", record.id(), record.description());
        self.applied.push(record);
        self.notify(old_position, self.position);
    }

    /// Commits `record`, coalescing it into the most recent entry when it
    /// belongs to the same logical gesture: identical target set and
    /// captured within `within` of that entry.
    ///
    /// The window compares the two records' capture instants (taken at
    /// `end_record`, see [`EditRecord::recorded_at`]), not the time they
    /// were committed. Capture instants are monotonic and unaffected by
    /// wall-clock adjustments; a record held back before being merged
    /// still coalesces if its window closed soon enough after the top
    /// entry's.
    ///
    /// A continuous drag routed through `merge` leaves one undo step, not
    /// one per mouse-move sample. When the gesture check fails this
    /// behaves exactly like [`commit`](Self::commit).
    pub fn merge(&mut self, record: EditRecord, within: Duration) {
        let coalesce = self.applied.last().is_some_and(|top| {
            top.targets() == record.targets()
                && record.recorded_at().duration_since(top.recorded_at()) <= within
        });
        if coalesce && let Some(prior) = self.applied.pop() {
            self.pending.clear();
            let merged = EditRecord::merged(&prior, record);
            log::debug!("merged edit into {} ({})", merged.id(), merged.description());
            self.applied.push(merged);
            self.notify(self.position, self.position);
        } else {
            self.commit(record);
        }
    }

    /// Moves the cursor to `target`, applying or reverting one record per
    /// step and firing one observer notification per record transition.
    ///
    /// Targets beyond either end of history stop at the end silently.
    pub fn set_position<T: DocumentTree>(&mut self, tree: &mut T, target: u64) {
        while target > self.position {
            let Some(record) = self.pending.pop() else {
                break;
            };
            record.apply(tree);
            let old_position = self.position;
            self.position = record.id();
            log::trace!("redo to position {}", self.position);
            self.applied.push(record);
            self.notify(old_position, self.position);
        }
        while target < self.position {
            let Some(record) = self.applied.pop() else {
                break;
            };
            record.revert(tree);
            let old_position = self.position;
            self.position = self.applied.last().map(EditRecord::id).unwrap_or(0);
            log::trace!("undo to position {}", self.position);
            self.pending.push(record);
            self.notify(old_position, self.position);
        }
    }

    /// Reverts the most recent applied record. Returns `false` (and does
    /// nothing) at the beginning of history.
    pub fn undo<T: DocumentTree>(&mut self, tree: &mut T) -> bool {
        let before = self.position;
        self.set_position(tree, before.saturating_sub(1));
        self.position != before
    }

    /// Reapplies the most recently reverted record. Returns `false` (and
    /// does nothing) at the end of history.
    pub fn redo<T: DocumentTree>(&mut self, tree: &mut T) -> bool {
        let before = self.position;
        self.set_position(tree, before + 1);
        self.position != before
    }

    /// Current timeline position: the id of the most recently applied
    /// record, or 0.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The most recently applied record, if any.
    pub fn current_record(&self) -> Option<&EditRecord> {
        self.applied.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.applied.len()
    }

    pub fn redo_count(&self) -> usize {
        self.pending.len()
    }

    /// Descriptions of applied records, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.applied.iter().rev().map(EditRecord::description)
    }

    /// Descriptions of replayable records, next-to-redo first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().rev().map(EditRecord::description)
    }

    /// Registers an observer fired after every commit/merge and after
    /// every record transition of a position change.
    pub fn observe_position(&mut self, observer: impl FnMut(u64, u64) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Forgets all history and moves the cursor to 0 without touching the
    /// tree — the tree's current field values become the new ground truth.
    ///
    /// # Panics
    ///
    /// Panics while a recording window is open.
    pub fn reset(&mut self) {
        assert!(
            self.recording.is_none(),
            "reset called while a recording window is open"
        );
        self.applied.clear();
        self.pending.clear();
        let old_position = self.position;
        self.position = 0;
        if old_position != 0 {
            self.notify(old_position, 0);
        }
    }

    fn notify(&mut self, old_position: u64, new_position: u64) {
        for observer in &mut self.observers {
            observer(old_position, new_position);
        }
    }
}

impl std::fmt::Debug for EditTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditTimeline")
            .field("position", &self.position)
            .field("undo_count", &self.applied.len())
            .field("redo_count", &self.pending.len())
            .field("recording", &self.recording.is_some())
            .finish()
    }
}
