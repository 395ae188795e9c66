//! Name-indexed property access for concrete node types.
//!
//! The history engine reads and writes properties by string name on objects
//! whose concrete type it does not know. Instead of runtime reflection,
//! each node type builds an [`AccessorTable`] once: a small table mapping
//! property names to typed getter/setter function pointers plus the
//! property's [`TrackPolicy`].
//!
//! # Example
//!
//! ```ignore
//! let mut table = AccessorTable::<Layer>::new();
//! table.register(
//!     "opacity",
//!     TrackPolicy::Continuous,
//!     |l| l.opacity.into(),
//!     |l, v| {
//!         l.opacity = expect_kind(v.as_float(), &v, ValueKind::Float)?;
//!         Ok(())
//!     },
//! );
//! ```

use std::collections::HashMap;

use crate::track::{TrackPolicy, TrackingRegistry};
use crate::value::{PropertyValue, ValueKind};

/// A setter received a value of the wrong kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, got {got}")]
pub struct TypeMismatch {
    pub expected: ValueKind,
    pub got: ValueKind,
}

/// Checks that a typed extraction succeeded, producing a [`TypeMismatch`]
/// naming the expected kind otherwise. Helper for setter bodies.
pub fn expect_kind<T>(
    extracted: Option<T>,
    value: &PropertyValue,
    expected: ValueKind,
) -> Result<T, TypeMismatch> {
    extracted.ok_or(TypeMismatch {
        expected,
        got: value.kind(),
    })
}

/// Error from a name-indexed property access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyAccessError {
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    #[error("type mismatch for property '{property}': {source}")]
    TypeMismatch {
        property: String,
        source: TypeMismatch,
    },
}

type Getter<N> = fn(&N) -> PropertyValue;
type Setter<N> = fn(&mut N, PropertyValue) -> Result<(), TypeMismatch>;

/// One named property of a node type: its tracking policy and typed
/// get/set entry points.
pub struct Accessor<N> {
    pub policy: TrackPolicy,
    pub get: Getter<N>,
    pub set: Setter<N>,
}

/// Per-node-type property table, built once and shared.
pub struct AccessorTable<N> {
    entries: HashMap<&'static str, Accessor<N>>,
}

impl<N> AccessorTable<N> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a property. Replaces any previous entry for `name`.
    pub fn register(
        &mut self,
        name: &'static str,
        policy: TrackPolicy,
        get: Getter<N>,
        set: Setter<N>,
    ) {
        self.entries.insert(name, Accessor { policy, get, set });
    }

    /// Returns `true` if `name` is a registered property.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Reads property `name` from `node`.
    pub fn get(&self, node: &N, name: &str) -> Result<PropertyValue, PropertyAccessError> {
        let accessor = self
            .entries
            .get(name)
            .ok_or_else(|| PropertyAccessError::UnknownProperty(name.to_owned()))?;
        Ok((accessor.get)(node))
    }

    /// Writes `value` into property `name` of `node`.
    pub fn set(
        &self,
        node: &mut N,
        name: &str,
        value: PropertyValue,
    ) -> Result<(), PropertyAccessError> {
        let accessor = self
            .entries
            .get(name)
            .ok_or_else(|| PropertyAccessError::UnknownProperty(name.to_owned()))?;
        (accessor.set)(node, value).map_err(|source| PropertyAccessError::TypeMismatch {
            property: name.to_owned(),
            source,
        })
    }

    /// Returns the tracking policy of `name`, or [`TrackPolicy::None`]
    /// for unregistered names.
    pub fn policy(&self, name: &str) -> TrackPolicy {
        self.entries
            .get(name)
            .map(|a| a.policy)
            .unwrap_or_default()
    }

    /// Projects this table into the type-erased name → policy registry
    /// consumed by change watchers.
    pub fn tracking_registry(&self) -> TrackingRegistry {
        let mut registry = TrackingRegistry::new();
        for (name, accessor) in &self.entries {
            registry.insert(*name, accessor.policy);
        }
        registry
    }

    /// Iterates registered property names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }
}

impl<N> Default for AccessorTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
