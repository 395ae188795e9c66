//! Layer data and its property table.

use stratum_core::accessor::{AccessorTable, expect_kind};
use stratum_core::track::TrackPolicy;
use stratum_core::value::ValueKind;

/// One drawable element of the document.
///
/// Geometry uses plain arrays, matching the core value types. Everything
/// a tool can edit goes through the accessor table from
/// [`layer_accessors`]; direct field access is for construction and
/// read-only inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    /// Position [x, y] in document units.
    pub position: [f32; 2],
    /// Scale factors [x, y].
    pub scale: [f32; 2],
    /// Rotation in degrees.
    pub rotation: f32,
    /// Opacity in [0, 1].
    pub opacity: f32,
    /// Fill color [r, g, b, a].
    pub fill: [f32; 4],
    pub visible: bool,
}

impl Layer {
    /// Creates a named layer with neutral defaults: origin position, unit
    /// scale, no rotation, opaque black fill, visible.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: [0.0, 0.0],
            scale: [1.0, 1.0],
            rotation: 0.0,
            opacity: 1.0,
            fill: [0.0, 0.0, 0.0, 1.0],
            visible: true,
        }
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: [f32; 2]) -> Self {
        self.position = position;
        self
    }

    /// Set the scale.
    #[must_use]
    pub fn with_scale(mut self, scale: [f32; 2]) -> Self {
        self.scale = scale;
        self
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the fill color.
    #[must_use]
    pub fn with_fill(mut self, fill: [f32; 4]) -> Self {
        self.fill = fill;
        self
    }

    /// Set the visibility flag.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// Builds the property table for [`Layer`].
///
/// Built once per tree. Animatable properties (position, scale, rotation,
/// opacity, fill) track as continuous; naming and visibility are discrete,
/// user-intentional edits.
pub fn layer_accessors() -> AccessorTable<Layer> {
    let mut table = AccessorTable::new();
    table.register(
        "name",
        TrackPolicy::Discrete,
        |l: &Layer| l.name.clone().into(),
        |l, v| {
            l.name = expect_kind(v.as_text(), &v, ValueKind::Text)?.to_owned();
            Ok(())
        },
    );
    table.register(
        "position",
        TrackPolicy::Continuous,
        |l: &Layer| l.position.into(),
        |l, v| {
            l.position = expect_kind(v.as_vec2(), &v, ValueKind::Vec2)?;
            Ok(())
        },
    );
    table.register(
        "scale",
        TrackPolicy::Continuous,
        |l: &Layer| l.scale.into(),
        |l, v| {
            l.scale = expect_kind(v.as_vec2(), &v, ValueKind::Vec2)?;
            Ok(())
        },
    );
    table.register(
        "rotation",
        TrackPolicy::Continuous,
        |l: &Layer| l.rotation.into(),
        |l, v| {
            l.rotation = expect_kind(v.as_float(), &v, ValueKind::Float)?;
            Ok(())
        },
    );
    table.register(
        "opacity",
        TrackPolicy::Continuous,
        |l: &Layer| l.opacity.into(),
        |l, v| {
            l.opacity = expect_kind(v.as_float(), &v, ValueKind::Float)?;
            Ok(())
        },
    );
    table.register(
        "fill",
        TrackPolicy::Continuous,
        |l: &Layer| l.fill.into(),
        |l, v| {
            l.fill = expect_kind(v.as_color(), &v, ValueKind::Color)?;
            Ok(())
        },
    );
    table.register(
        "visible",
        TrackPolicy::Discrete,
        |l: &Layer| l.visible.into(),
        |l, v| {
            l.visible = expect_kind(v.as_bool(), &v, ValueKind::Bool)?;
            Ok(())
        },
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratum_core::value::PropertyValue;

    #[test]
    fn builder_round_trip() {
        let layer = Layer::new("hero")
            .with_position([3.0, 4.0])
            .with_opacity(0.5)
            .with_visible(false);
        assert_eq!(layer.name, "hero");
        assert_eq!(layer.position, [3.0, 4.0]);
        assert_eq!(layer.opacity, 0.5);
        assert!(!layer.visible);
    }

    #[test]
    fn accessors_cover_all_fields() {
        let table = layer_accessors();
        for name in [
            "name", "position", "scale", "rotation", "opacity", "fill", "visible",
        ] {
            assert!(table.contains(name), "missing accessor for '{name}'");
        }
    }

    #[test]
    fn accessor_get_and_set() {
        let table = layer_accessors();
        let mut layer = Layer::new("a");

        table
            .set(&mut layer, "position", [10.0f32, 5.0].into())
            .unwrap();
        assert_eq!(layer.position, [10.0, 5.0]);
        assert_eq!(
            table.get(&layer, "position").unwrap(),
            PropertyValue::Vec2([10.0, 5.0])
        );

        table.set(&mut layer, "name", "renamed".into()).unwrap();
        assert_eq!(layer.name, "renamed");
    }

    #[test]
    fn accessor_rejects_wrong_kind() {
        let table = layer_accessors();
        let mut layer = Layer::new("a");
        assert!(table.set(&mut layer, "opacity", true.into()).is_err());
        assert_eq!(layer.opacity, 1.0);
    }

    #[test]
    fn policies_split_continuous_and_discrete() {
        let table = layer_accessors();
        assert_eq!(table.policy("position"), TrackPolicy::Continuous);
        assert_eq!(table.policy("fill"), TrackPolicy::Continuous);
        assert_eq!(table.policy("name"), TrackPolicy::Discrete);
        assert_eq!(table.policy("visible"), TrackPolicy::Discrete);
    }
}
