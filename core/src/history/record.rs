//! Immutable edit records.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use super::watcher::RecordedDiff;
use super::PropertyKey;
use crate::node::NodeId;
use crate::tree::{DocumentTree, PARENT_PROPERTY};
use crate::value::PropertyValue;

/// One coalesced, reversible edit.
///
/// A record holds two mappings with identical key sets: the `old` value of
/// every touched (node, property) pair as seen before the recording window
/// started, and the `new` value as seen when it ended. Records are
/// immutable once constructed and address nodes only by [`NodeId`], so
/// they survive unrelated restructuring of the tree.
#[derive(Debug)]
pub struct EditRecord {
    id: u64,
    targets: BTreeSet<NodeId>,
    old: BTreeMap<PropertyKey, PropertyValue>,
    new: BTreeMap<PropertyKey, PropertyValue>,
    description: String,
    recorded_at: Instant,
}

impl EditRecord {
    /// Builds a record from a recording window's diff.
    ///
    /// Returns `None` if the window captured nothing — an empty window
    /// produces no record at all. `old` keys without a matching `new`
    /// entry (a pre-mutation notification whose mutation never completed)
    /// are dropped so both maps cover the same key set.
    pub fn from_diff(id: u64, diff: RecordedDiff) -> Option<Self> {
        if diff.new.is_empty() {
            return None;
        }
        let RecordedDiff {
            mut old,
            new,
            touched,
        } = diff;
        old.retain(|key, _| new.contains_key(key));
        for (key, value) in &new {
            debug_assert!(
                old.contains_key(key),
                "post-mutation notification without a pre-mutation one for {key:?}"
            );
            old.entry(key.clone()).or_insert_with(|| value.clone());
        }
        let description = describe(&new, touched.len());
        Some(Self {
            id,
            targets: touched,
            old,
            new,
            description,
            recorded_at: Instant::now(),
        })
    }

    /// Coalesces `incoming` into `prior`, producing the single record a
    /// continuous gesture should leave behind: `prior`'s id, the oldest
    /// known `old` values, the newest known `new` values.
    pub fn merged(prior: &EditRecord, incoming: EditRecord) -> EditRecord {
        let mut old = incoming.old;
        for (key, value) in &prior.old {
            old.insert(key.clone(), value.clone());
        }
        let mut new = prior.new.clone();
        for (key, value) in incoming.new {
            new.insert(key, value);
        }
        let mut targets = prior.targets.clone();
        targets.extend(incoming.targets.iter().copied());
        let description = describe(&new, targets.len());
        EditRecord {
            id: prior.id,
            targets,
            old,
            new,
            description,
            recorded_at: incoming.recorded_at,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The distinct nodes this record touches. Never empty.
    pub fn targets(&self) -> &BTreeSet<NodeId> {
        &self.targets
    }

    /// Human-readable summary, e.g. `"Changed Position, Scale of 3 layers"`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// When the record was produced; used by the merge window check.
    pub fn recorded_at(&self) -> Instant {
        self.recorded_at
    }

    /// Pre-window value of a tracked key, if this record covers it.
    pub fn old_value(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        self.old.get(key)
    }

    /// Post-window value of a tracked key, if this record covers it.
    pub fn new_value(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        self.new.get(key)
    }

    /// Writes every `new` value into the tree (forward / redo direction).
    ///
    /// # Panics
    ///
    /// Panics if a target node no longer resolves or a write fails. That
    /// means the linear-history discipline was violated outside this
    /// engine (e.g. a node deleted without going through the recording
    /// protocol) — a consistency bug, not a runtime condition.
    pub fn apply<T: DocumentTree>(&self, tree: &mut T) {
        self.write_entries(tree, &self.new);
    }

    /// Writes every `old` value into the tree (undo direction).
    ///
    /// # Panics
    ///
    /// Same conditions as [`apply`](Self::apply).
    pub fn revert<T: DocumentTree>(&self, tree: &mut T) {
        self.write_entries(tree, &self.old);
    }

    fn write_entries<T: DocumentTree>(
        &self,
        tree: &mut T,
        entries: &BTreeMap<PropertyKey, PropertyValue>,
    ) {
        for (key, value) in entries {
            let result = if key.property == PARENT_PROPERTY {
                match value.as_node() {
                    Some(parent) => tree.reparent(key.node, parent),
                    None => panic!(
                        "edit record {}: parent entry for {} holds a non-node value",
                        self.id, key.node
                    ),
                }
            } else {
                tree.set_property(key.node, &key.property, value.clone())
            };
            if let Err(err) = result {
                panic!(
                    "edit record {}: cannot write '{}' on {}: {err}",
                    self.id, key.property, key.node
                );
            }
        }
    }
}

/// Derives the record description from the changed property names and the
/// number of affected nodes.
fn describe(new: &BTreeMap<PropertyKey, PropertyValue>, target_count: usize) -> String {
    let mut names = BTreeSet::new();
    for key in new.keys() {
        names.insert(display_name(&key.property));
    }
    let names: Vec<String> = names.into_iter().collect();
    let noun = if target_count == 1 { "layer" } else { "layers" };
    format!("Changed {} of {} {}", names.join(", "), target_count, noun)
}

/// `"corner_radius"` → `"Corner Radius"`.
fn display_name(property: &str) -> String {
    property
        .split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
