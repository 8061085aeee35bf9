//! Scene configuration with documented units and presets.
//!
//! Distances are scene units (the outer ring of the classic scene has radius
//! 6), angles are radians, magnitudes are normalized to [0, 1].

use std::f32::consts::PI;

use crate::error::{
    ConfigError, ensure_count, ensure_finite, ensure_non_negative, ensure_ordered, ensure_positive,
};
use crate::layout::{Taper, VisualElement, generate_radial_field, generate_ring};
use crate::mapper::{ColorStrategy, IndexRounding, MappingConfig, MappingMode};

/// Bars evenly spaced around one circle.
#[derive(Debug, Clone, PartialEq)]
pub struct RingConfig {
    pub count: usize,
    pub radius: f32,
    /// Rotation of the whole ring (radians).
    pub angular_offset: f32,
    /// Baseline height added under the audio-driven part of the scale.
    /// The classic bars have none; their floor offset keeps them visible.
    pub base_height: f32,
    pub bar_width: f32,
}

impl RingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_count("ring element count", self.count)?;
        ensure_positive("ring radius", self.radius)?;
        ensure_finite("ring angular offset", self.angular_offset)?;
        ensure_non_negative("ring base height", self.base_height)?;
        ensure_positive("ring bar width", self.bar_width)
    }

    pub fn generate(&self) -> Result<Vec<VisualElement>, ConfigError> {
        self.validate()?;
        Ok(generate_ring(self.count, self.radius, self.angular_offset)?
            .into_iter()
            .map(|e| e.with_base_size(self.base_height, self.bar_width))
            .collect())
    }
}

/// Columns of layered "buildings" radiating from the centre.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialFieldConfig {
    pub radial_count: usize,
    /// Buildings per direction.
    pub layer_count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub base_height: Taper,
    pub base_width: Taper,
}

impl RadialFieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_count("radial direction count", self.radial_count)?;
        ensure_count("layer count", self.layer_count)?;
        ensure_positive("min radius", self.min_radius)?;
        ensure_positive("max radius", self.max_radius)?;
        ensure_ordered("radius", self.min_radius, self.max_radius)?;
        self.base_height.validate("base height")?;
        self.base_width.validate("base width")
    }

    pub fn generate(&self) -> Result<Vec<VisualElement>, ConfigError> {
        self.validate()?;
        generate_radial_field(
            self.radial_count,
            self.layer_count,
            self.min_radius,
            self.max_radius,
            self.base_height,
            self.base_width,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutConfig {
    Ring(RingConfig),
    RadialField(RadialFieldConfig),
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            LayoutConfig::Ring(ring) => ring.validate(),
            LayoutConfig::RadialField(field) => field.validate(),
        }
    }

    pub fn generate(&self) -> Result<Vec<VisualElement>, ConfigError> {
        match self {
            LayoutConfig::Ring(ring) => ring.generate(),
            LayoutConfig::RadialField(field) => field.generate(),
        }
    }

    /// Number of angular slots, used by angular index mapping.
    pub fn directions(&self) -> usize {
        match self {
            LayoutConfig::Ring(ring) => ring.count,
            LayoutConfig::RadialField(field) => field.radial_count,
        }
    }
}

/// One independently mapped set of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConfig {
    pub name: String,
    pub layout: LayoutConfig,
    pub mapping: MappingConfig,
}

/// `base + span * aggregate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectRange {
    pub base: f32,
    pub span: f32,
}

impl EffectRange {
    pub const fn new(base: f32, span: f32) -> Self {
        Self { base, span }
    }

    pub fn at(&self, aggregate: f32) -> f32 {
        self.base + self.span * aggregate
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        ensure_non_negative(field, self.base)?;
        ensure_finite(field, self.span)
    }
}

/// Scene-wide parameters driven by the aggregate signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectsConfig {
    /// Skybox shader pulse uniform.
    pub skybox_pulse: EffectRange,
    pub bloom_strength: EffectRange,
    /// Edge emphasis of the outline pass.
    pub outline_strength: EffectRange,
    /// Exponential fog density.
    pub fog_density: EffectRange,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            skybox_pulse: EffectRange::new(0.0, 1.0),
            bloom_strength: EffectRange::new(0.6, 1.2),
            outline_strength: EffectRange::new(1.0, 3.0),
            fog_density: EffectRange::new(0.015, 0.03),
        }
    }
}

impl EffectsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.skybox_pulse.validate("skybox pulse")?;
        self.bloom_strength.validate("bloom strength")?;
        self.outline_strength.validate("outline strength")?;
        self.fog_density.validate("fog density")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub groups: Vec<GroupConfig>,
    pub effects: EffectsConfig,
}

pub const OUTER_RADIUS: f32 = 6.0;
pub const OUTER_BARS: usize = 256;
pub const RADIAL_DIRECTIONS: usize = 128;
pub const LAYERS: usize = 14;

impl Default for SceneConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl SceneConfig {
    /// Rainbow outer ring around an intensity-colored skyline.
    pub fn classic() -> Self {
        Self {
            groups: vec![
                GroupConfig {
                    name: "outer ring".to_string(),
                    layout: LayoutConfig::Ring(RingConfig {
                        count: OUTER_BARS,
                        radius: OUTER_RADIUS,
                        angular_offset: 0.0,
                        base_height: 0.0,
                        bar_width: 0.08,
                    }),
                    mapping: MappingConfig {
                        mode: MappingMode::Direct,
                        color: ColorStrategy::Gradient {
                            saturation: 1.0,
                            lightness: 0.5,
                        },
                        amplitude_scale: 10.0,
                        amplitude_taper: 0.0,
                        floor_offset: 0.5,
                    },
                },
                GroupConfig {
                    name: "city".to_string(),
                    layout: LayoutConfig::RadialField(RadialFieldConfig {
                        radial_count: RADIAL_DIRECTIONS,
                        layer_count: LAYERS,
                        min_radius: 0.3,
                        max_radius: OUTER_RADIUS * 0.85,
                        base_height: Taper::new(1.5, 0.1),
                        base_width: Taper::new(0.16, 0.05),
                    }),
                    mapping: MappingConfig {
                        mode: MappingMode::Angular {
                            rounding: IndexRounding::Floor,
                        },
                        color: ColorStrategy::Intensity {
                            cold_hue: 0.6,
                            hue_shift: 0.4,
                            saturation: 1.0,
                            lightness: 0.55,
                        },
                        amplitude_scale: 5.0,
                        amplitude_taper: 2.5,
                        floor_offset: 0.0,
                    },
                },
            ],
            effects: EffectsConfig::default(),
        }
    }

    /// Classic plus three outer rings that deliberately pulse out of step.
    pub fn layered() -> Self {
        let mut config = Self::classic();
        let ring = |radius: f32, angular_offset: f32| RingConfig {
            count: OUTER_BARS,
            radius,
            angular_offset,
            base_height: 0.0,
            bar_width: 0.06,
        };
        config.groups.extend([
            GroupConfig {
                name: "strided ring".to_string(),
                layout: LayoutConfig::Ring(ring(6.6, PI / OUTER_BARS as f32)),
                mapping: MappingConfig {
                    mode: MappingMode::Strided { stride: 2 },
                    color: ColorStrategy::Intensity {
                        cold_hue: 0.55,
                        hue_shift: 0.5,
                        saturation: 0.9,
                        lightness: 0.5,
                    },
                    amplitude_scale: 6.0,
                    amplitude_taper: 0.0,
                    floor_offset: 0.3,
                },
            },
            GroupConfig {
                name: "inverted ring".to_string(),
                layout: LayoutConfig::Ring(ring(7.2, 0.0)),
                mapping: MappingConfig {
                    mode: MappingMode::Inverted,
                    color: ColorStrategy::Gradient {
                        saturation: 0.8,
                        lightness: 0.35,
                    },
                    amplitude_scale: 4.0,
                    amplitude_taper: 0.0,
                    floor_offset: 0.4,
                },
            },
            GroupConfig {
                name: "emissive ring".to_string(),
                layout: LayoutConfig::Ring(ring(7.8, PI / OUTER_BARS as f32)),
                mapping: MappingConfig {
                    mode: MappingMode::Strided { stride: 3 },
                    color: ColorStrategy::Emissive {
                        base: 0.2,
                        gain: 1.8,
                    },
                    amplitude_scale: 3.0,
                    amplitude_taper: 0.0,
                    floor_offset: 0.2,
                },
            },
        ]);
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.groups.is_empty() {
            return Err(ConfigError::EmptyScene);
        }
        for group in &self.groups {
            group.layout.validate()?;
            group.mapping.validate()?;
        }
        self.effects.validate()
    }

    /// Sets the element count of every ring. Angular offsets are rescaled so
    /// a ring staggered by a fraction of a bar keeps that fraction.
    pub fn set_ring_count(&mut self, count: usize) {
        for group in &mut self.groups {
            if let LayoutConfig::Ring(ring) = &mut group.layout {
                if count > 0 && ring.count > 0 {
                    ring.angular_offset *= ring.count as f32 / count as f32;
                }
                ring.count = count;
            }
        }
    }

    /// Sets direction and layer counts of every radial field; `None` keeps
    /// the current value.
    pub fn set_field_shape(&mut self, directions: Option<usize>, layers: Option<usize>) {
        for group in &mut self.groups {
            if let LayoutConfig::RadialField(field) = &mut group.layout {
                if let Some(d) = directions {
                    field.radial_count = d;
                }
                if let Some(l) = layers {
                    field.layer_count = l;
                }
            }
        }
    }
}
