//! Tracking policies: which property mutations are historically significant.
//!
//! Every (node type, property) pair carries a [`TrackPolicy`]. A recording
//! window selects which policies it records via a [`RecordFilter`]. The
//! type-erased name → policy projection lives in a [`TrackingRegistry`]
//! that is built once by the document and handed to each watcher — there
//! is no hidden global per-type state.

use std::collections::HashMap;

/// How historically significant mutations of a property are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackPolicy {
    /// Never recorded.
    #[default]
    None,
    /// Fine-grained, high-frequency changes — values worth animating or
    /// driving from a drag gesture (position, opacity, fill).
    Continuous,
    /// Coarse, user-intentional changes — structural or naming edits.
    Discrete,
}

/// Which tracking classes a recording window captures.
///
/// The set of properties worth animating is larger than the set worth an
/// undo entry, so the default records only [`TrackPolicy::Continuous`];
/// callers opt into discrete tracking explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFilter {
    /// Record continuous properties only (default).
    #[default]
    Continuous,
    /// Record both continuous and discrete properties.
    All,
}

impl RecordFilter {
    /// Returns `true` if a property with the given policy is recorded
    /// under this filter.
    pub fn records(self, policy: TrackPolicy) -> bool {
        match (self, policy) {
            (_, TrackPolicy::None) => false,
            (Self::Continuous, TrackPolicy::Continuous) => true,
            (Self::Continuous, TrackPolicy::Discrete) => false,
            (Self::All, _) => true,
        }
    }
}

/// Name-indexed tracking policies, type-erased for the watcher.
///
/// Built once from the document's accessor tables (see
/// [`AccessorTable::tracking_registry`](crate::accessor::AccessorTable::tracking_registry))
/// and shared behind an `Arc`. Unregistered names report
/// [`TrackPolicy::None`].
#[derive(Debug, Default)]
pub struct TrackingRegistry {
    policies: HashMap<String, TrackPolicy>,
}

impl TrackingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the policy for a property name, replacing any previous
    /// entry.
    pub fn insert(&mut self, name: impl Into<String>, policy: TrackPolicy) {
        self.policies.insert(name.into(), policy);
    }

    /// Returns the policy for `name`, or [`TrackPolicy::None`] if the
    /// name was never registered.
    pub fn policy(&self, name: &str) -> TrackPolicy {
        self.policies.get(name).copied().unwrap_or_default()
    }

    /// Number of registered property names.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
