//! Property value types.
//!
//! All geometry uses plain arrays (`[f32; 2]`, `[f32; 4]`) instead of math
//! library types to keep this crate dependency-free of `glam`/`nalgebra`.

use std::fmt;

use crate::node::NodeId;

/// A dynamically-typed property value.
///
/// This is the currency of the history engine: getters produce it, setters
/// consume it, and edit records store before/after pairs of it. The set of
/// variants is closed — it covers exactly the value kinds a layer document
/// exposes through its accessor tables.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Float(f32),
    /// A 2D vector [x, y].
    Vec2([f32; 2]),
    /// An RGBA color [r, g, b, a].
    Color([f32; 4]),
    Text(String),
    /// A node reference; `None` means "no node" (e.g. a root's parent).
    Node(Option<NodeId>),
}

/// The kind of a [`PropertyValue`], used in type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Float,
    Vec2,
    Color,
    Text,
    Node,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Color => "color",
            Self::Text => "text",
            Self::Node => "node",
        };
        f.write_str(name)
    }
}

impl PropertyValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Float(_) => ValueKind::Float,
            Self::Vec2(_) => ValueKind::Vec2,
            Self::Color(_) => ValueKind::Color,
            Self::Text(_) => ValueKind::Text,
            Self::Node(_) => ValueKind::Node,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<[f32; 2]> {
        match self {
            Self::Vec2(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the node reference carried by a [`PropertyValue::Node`].
    ///
    /// The outer `Option` is the variant check; the inner one is the
    /// reference itself (`None` = no node).
    pub fn as_node(&self) -> Option<Option<NodeId>> {
        match self {
            Self::Node(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<[f32; 2]> for PropertyValue {
    fn from(v: [f32; 2]) -> Self {
        Self::Vec2(v)
    }
}

impl From<[f32; 4]> for PropertyValue {
    fn from(v: [f32; 4]) -> Self {
        Self::Color(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Option<NodeId>> for PropertyValue {
    fn from(v: Option<NodeId>) -> Self {
        Self::Node(v)
    }
}
