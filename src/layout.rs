//! Deterministic placement of the scene's visual elements.
//!
//! Layouts are generated once per session. Nothing here is random: the same
//! arguments always produce the same elements in the same order, which is what
//! makes golden-value tests of a whole scene possible.

use nannou::prelude::{TAU, Vec3, vec3};

use crate::error::{
    ConfigError, ensure_count, ensure_finite, ensure_non_negative, ensure_ordered, ensure_positive,
};
use crate::mapper::ElementState;

/// One bar or building. Static fields are fixed at generation time; `state` is
/// rewritten by the mapper every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualElement {
    /// Position within its group, in generation order.
    pub index: usize,
    /// Angular slot the element sits in. Equal to `index` for rings.
    pub direction: usize,
    /// Depth layer along its direction. Always 0 for rings.
    pub layer: usize,
    /// Normalized layer depth `layer / layer_count`, in [0, 1).
    pub t: f32,
    /// Azimuth in radians, measured from +x towards +z.
    pub azimuth: f32,
    /// Rotation about the vertical axis so the element faces tangentially.
    pub rotation_y: f32,
    pub base_height: f32,
    pub base_width: f32,
    /// Ground-plane anchor; y is always 0.
    pub anchor: Vec3,
    pub state: ElementState,
}

impl VisualElement {
    fn new(
        index: usize,
        direction: usize,
        layer: usize,
        t: f32,
        azimuth: f32,
        radius: f32,
    ) -> Self {
        Self {
            index,
            direction,
            layer,
            t,
            azimuth,
            rotation_y: -azimuth,
            base_height: 0.0,
            base_width: 0.0,
            anchor: vec3(radius * azimuth.cos(), 0.0, radius * azimuth.sin()),
            state: ElementState::resting(0.0),
        }
    }

    /// Overrides the baseline footprint, resetting the per-tick state to match.
    pub fn with_base_size(mut self, base_height: f32, base_width: f32) -> Self {
        self.base_height = base_height;
        self.base_width = base_width;
        self.state = ElementState::resting(base_height);
        self
    }
}

/// Linear size profile across the layers of a radial field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Taper {
    /// Value at the innermost layer (t = 0).
    pub inner: f32,
    /// Value approached at the outermost edge (t -> 1).
    pub outer: f32,
}

impl Taper {
    pub const fn new(inner: f32, outer: f32) -> Self {
        Self { inner, outer }
    }

    pub fn at(&self, t: f32) -> f32 {
        lerp(self.inner, self.outer, t)
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        ensure_non_negative(field, self.inner)?;
        ensure_non_negative(field, self.outer)
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Places `count` elements evenly around a circle of `radius`.
///
/// Element `i` sits at azimuth `TAU * i / count + angular_offset` with zero
/// baseline size; use [`VisualElement::with_base_size`] to give it one.
pub fn generate_ring(
    count: usize,
    radius: f32,
    angular_offset: f32,
) -> Result<Vec<VisualElement>, ConfigError> {
    ensure_count("ring element count", count)?;
    ensure_positive("ring radius", radius)?;
    ensure_finite("ring angular offset", angular_offset)?;

    let elements = (0..count)
        .map(|i| {
            let azimuth = TAU * i as f32 / count as f32 + angular_offset;
            VisualElement::new(i, i, 0, 0.0, azimuth, radius)
        })
        .collect();
    Ok(elements)
}

/// Places `layer_count` elements along each of `radial_count` evenly spaced
/// directions, radius interpolated from `min_radius` towards `max_radius`.
///
/// Elements are emitted direction-major: all layers of direction 0 first.
/// Height and width follow their tapers, so with the usual decreasing tapers
/// the outer layers are shorter and thinner.
pub fn generate_radial_field(
    radial_count: usize,
    layer_count: usize,
    min_radius: f32,
    max_radius: f32,
    base_height: Taper,
    base_width: Taper,
) -> Result<Vec<VisualElement>, ConfigError> {
    ensure_count("radial direction count", radial_count)?;
    ensure_count("layer count", layer_count)?;
    ensure_positive("min radius", min_radius)?;
    ensure_positive("max radius", max_radius)?;
    ensure_ordered("radius", min_radius, max_radius)?;
    base_height.validate("base height")?;
    base_width.validate("base width")?;

    let mut elements = Vec::with_capacity(radial_count * layer_count);
    for direction in 0..radial_count {
        let azimuth = TAU * direction as f32 / radial_count as f32;
        for layer in 0..layer_count {
            let t = layer as f32 / layer_count as f32;
            let radius = lerp(min_radius, max_radius, t);
            let element = VisualElement::new(elements.len(), direction, layer, t, azimuth, radius)
                .with_base_size(base_height.at(t), base_width.at(t));
            elements.push(element);
        }
    }
    Ok(elements)
}
