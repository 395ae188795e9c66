//! # Stratum Document
//!
//! The concrete layer-tree document edited by Stratum tools. [`Layer`]
//! carries the drawable properties, [`LayerTree`] stores layers by stable
//! id, maintains the parent/child structure, and fires mutation
//! notifications so `stratum-core`'s edit history can observe every
//! property write.

mod layer;
mod tree;

pub use layer::{Layer, layer_accessors};
pub use tree::LayerTree;
