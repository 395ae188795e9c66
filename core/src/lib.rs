//! # Stratum Core
//!
//! Core crate for the Stratum layer editor: identity-addressed document
//! tree contracts and the versioned edit-history engine.
//!
//! The [`history`] module is the heart of the crate — a linear undo/redo
//! subsystem that records property-level mutations on arbitrary tree
//! nodes without coupling to their concrete types. The remaining modules
//! supply the contracts it operates through: stable [`node::NodeId`]s,
//! dynamically-typed [`value::PropertyValue`]s, per-property
//! [`track::TrackPolicy`]s, name-indexed [`accessor::AccessorTable`]s,
//! pre/post [`notify`] callbacks, and the [`tree`] traits concrete
//! documents implement.

pub mod accessor;
pub mod history;
pub mod node;
pub mod notify;
pub mod track;
pub mod tree;
pub mod value;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Placeholder for future engine-wide initialization
pub fn init() {
    log::info!("Stratum Core v{} initialized", VERSION);
}
