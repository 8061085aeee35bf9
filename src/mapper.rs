//! Per-tick mapping of a frequency sample onto element scale and color.
//!
//! Every call is computed from the latest sample alone. The only state written
//! is each element's [`ElementState`], which is overwritten in place so a tick
//! never allocates.

use crate::error::{ConfigError, ensure_finite, ensure_non_negative};
use crate::layout::VisualElement;

/// Lower bound applied to every computed scale.
pub const MIN_SCALE: f32 = 1e-3;

/// How a fractional angular index is turned into a bin index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRounding {
    Floor,
    Round,
}

/// Chooses which bin an element reads and how the magnitude is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMode {
    /// `index mod len`.
    Direct,
    /// `(index * stride) mod len`, so layered rings pulse out of step.
    Strided { stride: usize },
    /// Direct indexing with the magnitude flipped to `1 - m`.
    Inverted,
    /// `direction / directions * len`; every layer of a column reads one bin.
    Angular { rounding: IndexRounding },
}

impl MappingMode {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            MappingMode::Strided { stride } if stride == 0 => {
                Err(ConfigError::InvalidStride(stride))
            }
            _ => Ok(()),
        }
    }

    /// Bin read by `element`, or `None` when the sample is empty.
    ///
    /// `directions` is the number of angular slots in the element's group.
    pub fn sample_index(
        &self,
        element: &VisualElement,
        directions: usize,
        len: usize,
    ) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let index = match *self {
            MappingMode::Direct | MappingMode::Inverted => element.index % len,
            MappingMode::Strided { stride } => (element.index % len) * (stride % len) % len,
            MappingMode::Angular { rounding } => {
                let directions = directions.max(1);
                let scaled = (element.direction % directions) * len;
                let index = match rounding {
                    IndexRounding::Floor => scaled / directions,
                    IndexRounding::Round => (2 * scaled + directions) / (2 * directions),
                };
                index % len
            }
        };
        debug_assert!(index < len);
        Some(index)
    }

    /// Normalized magnitude in [0, 1] after the mode's interpretation. An
    /// empty sample yields 0 for every mode, inverted included.
    pub fn magnitude(&self, element: &VisualElement, directions: usize, bins: &[u8]) -> f32 {
        let Some(index) = self.sample_index(element, directions, bins.len()) else {
            return 0.0;
        };
        let raw = f32::from(bins[index]) / 255.0;
        match self {
            MappingMode::Inverted => 1.0 - raw,
            _ => raw,
        }
    }
}

/// Color handed to the renderer for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementColor {
    Hsl {
        hue: f32,
        saturation: f32,
        lightness: f32,
    },
    Emissive(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorStrategy {
    /// Static rainbow: hue follows `index / count` around the group.
    Gradient { saturation: f32, lightness: f32 },
    /// Hue moves from `cold_hue` by `-hue_shift` as the magnitude rises.
    Intensity {
        cold_hue: f32,
        hue_shift: f32,
        saturation: f32,
        lightness: f32,
    },
    /// Emissive intensity `base + gain * m`.
    Emissive { base: f32, gain: f32 },
}

impl ColorStrategy {
    pub fn color(&self, index: usize, count: usize, magnitude: f32) -> ElementColor {
        match *self {
            ColorStrategy::Gradient {
                saturation,
                lightness,
            } => ElementColor::Hsl {
                hue: (index as f32 / count.max(1) as f32).rem_euclid(1.0),
                saturation,
                lightness,
            },
            ColorStrategy::Intensity {
                cold_hue,
                hue_shift,
                saturation,
                lightness,
            } => ElementColor::Hsl {
                hue: (cold_hue - magnitude * hue_shift).rem_euclid(1.0),
                saturation,
                lightness,
            },
            ColorStrategy::Emissive { base, gain } => {
                ElementColor::Emissive(base + gain * magnitude)
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ColorStrategy::Gradient {
                saturation,
                lightness,
            } => {
                ensure_non_negative("saturation", saturation)?;
                ensure_non_negative("lightness", lightness)
            }
            ColorStrategy::Intensity {
                cold_hue,
                hue_shift,
                saturation,
                lightness,
            } => {
                ensure_non_negative("cold hue", cold_hue)?;
                ensure_finite("hue shift", hue_shift)?;
                ensure_non_negative("saturation", saturation)?;
                ensure_non_negative("lightness", lightness)
            }
            ColorStrategy::Emissive { base, gain } => {
                ensure_non_negative("emissive base", base)?;
                ensure_non_negative("emissive gain", gain)
            }
        }
    }
}

/// Tuning for one group of elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappingConfig {
    pub mode: MappingMode,
    pub color: ColorStrategy,
    /// Scale added at full magnitude for the innermost layer.
    pub amplitude_scale: f32,
    /// Amount the amplitude shrinks per unit of layer depth `t`.
    pub amplitude_taper: f32,
    /// Constant added to every scale so elements stay visible at silence.
    pub floor_offset: f32,
}

impl MappingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mode.validate()?;
        self.color.validate()?;
        ensure_non_negative("amplitude scale", self.amplitude_scale)?;
        ensure_non_negative("amplitude taper", self.amplitude_taper)?;
        ensure_non_negative("floor offset", self.floor_offset)
    }

    pub fn amplitude(&self, t: f32) -> f32 {
        (self.amplitude_scale - self.amplitude_taper * t).max(0.0)
    }

    /// `floor + base_height(t) + m * amplitude(t)`, never below [`MIN_SCALE`].
    pub fn scale(&self, element: &VisualElement, magnitude: f32) -> f32 {
        let scale = self.floor_offset + element.base_height + magnitude * self.amplitude(element.t);
        scale.max(MIN_SCALE)
    }
}

/// Per-tick output for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementState {
    pub scale: f32,
    /// Always `scale / 2`, so elements grow up from the ground plane.
    pub vertical_offset: f32,
    pub color: ElementColor,
}

impl ElementState {
    pub fn resting(base_height: f32) -> Self {
        let scale = base_height.max(MIN_SCALE);
        Self {
            scale,
            vertical_offset: scale / 2.0,
            color: ElementColor::Hsl {
                hue: 0.0,
                saturation: 0.0,
                lightness: 0.5,
            },
        }
    }
}

/// Rewrites the state of every element in one group from `bins`.
pub fn map_group(
    config: &MappingConfig,
    directions: usize,
    bins: &[u8],
    elements: &mut [VisualElement],
) {
    let count = elements.len();
    for element in elements.iter_mut() {
        let magnitude = config.mode.magnitude(element, directions, bins);
        let scale = config.scale(element, magnitude);
        element.state = ElementState {
            scale,
            vertical_offset: scale / 2.0,
            color: config.color.color(element.index, count, magnitude),
        };
    }
}

/// Mean of `bins` normalized to [0, 1]; 0 for an empty sample.
pub fn aggregate(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    let sum: u64 = bins.iter().map(|&b| u64::from(b)).sum();
    (sum as f64 / (bins.len() as f64 * 255.0)) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Taper, generate_radial_field, generate_ring};

    fn ring_config(mode: MappingMode) -> MappingConfig {
        MappingConfig {
            mode,
            color: ColorStrategy::Gradient {
                saturation: 1.0,
                lightness: 0.5,
            },
            amplitude_scale: 10.0,
            amplitude_taper: 0.0,
            floor_offset: 0.5,
        }
    }

    #[test]
    fn test_direct_index_is_identity_when_sizes_match() {
        let ring = generate_ring(256, 6.0, 0.0).unwrap();
        for e in &ring {
            assert_eq!(MappingMode::Direct.sample_index(e, 256, 256), Some(e.index));
        }
    }

    #[test]
    fn test_direct_index_wraps_short_samples() {
        let ring = generate_ring(256, 6.0, 0.0).unwrap();
        assert_eq!(MappingMode::Direct.sample_index(&ring[130], 256, 128), Some(2));
    }

    #[test]
    fn test_strided_index() {
        let ring = generate_ring(256, 6.0, 0.0).unwrap();
        let mode = MappingMode::Strided { stride: 2 };
        assert_eq!(mode.sample_index(&ring[5], 256, 256), Some(10));
        assert_eq!(mode.sample_index(&ring[130], 256, 256), Some(4));
    }

    #[test]
    fn test_angular_index_shared_by_column() {
        let field =
            generate_radial_field(128, 14, 0.3, 5.1, Taper::new(1.5, 0.1), Taper::new(0.16, 0.05))
                .unwrap();
        let mode = MappingMode::Angular {
            rounding: IndexRounding::Floor,
        };
        let column: Vec<_> = field.iter().filter(|e| e.direction == 64).collect();
        for e in column {
            assert_eq!(mode.sample_index(e, 128, 256), Some(128));
        }
    }

    #[test]
    fn test_angular_rounding_stays_in_range() {
        let ring = generate_ring(7, 1.0, 0.0).unwrap();
        let round = MappingMode::Angular {
            rounding: IndexRounding::Round,
        };
        let floor = MappingMode::Angular {
            rounding: IndexRounding::Floor,
        };
        // 6/7 * 10 = 8.57
        assert_eq!(floor.sample_index(&ring[6], 7, 10), Some(8));
        assert_eq!(round.sample_index(&ring[6], 7, 10), Some(9));
        for e in &ring {
            assert!(round.sample_index(e, 7, 3).unwrap() < 3);
        }
    }

    #[test]
    fn test_inverted_full_magnitude_leaves_floor_only() {
        let mut ring = generate_ring(4, 1.0, 0.0).unwrap();
        let config = ring_config(MappingMode::Inverted);
        map_group(&config, 4, &[255; 4], &mut ring);
        for e in &ring {
            assert_eq!(e.state.scale, 0.5);
        }
    }

    #[test]
    fn test_empty_sample_yields_baseline() {
        let mut ring = generate_ring(8, 1.0, 0.0).unwrap();
        for mode in [
            MappingMode::Direct,
            MappingMode::Inverted,
            MappingMode::Strided { stride: 3 },
            MappingMode::Angular {
                rounding: IndexRounding::Round,
            },
        ] {
            map_group(&ring_config(mode), 8, &[], &mut ring);
            assert!(ring.iter().all(|e| e.state.scale == 0.5));
        }
    }

    #[test]
    fn test_tapered_amplitude_never_goes_negative() {
        let config = MappingConfig {
            amplitude_scale: 1.0,
            amplitude_taper: 4.0,
            ..ring_config(MappingMode::Direct)
        };
        assert_eq!(config.amplitude(0.0), 1.0);
        assert_eq!(config.amplitude(0.9), 0.0);
    }

    #[test]
    fn test_scale_respects_minimum_with_zero_floor() {
        let mut ring = generate_ring(2, 1.0, 0.0).unwrap();
        let config = MappingConfig {
            floor_offset: 0.0,
            ..ring_config(MappingMode::Direct)
        };
        map_group(&config, 2, &[0, 0], &mut ring);
        assert!(ring.iter().all(|e| e.state.scale == MIN_SCALE));
        assert!(ring.iter().all(|e| e.state.vertical_offset == MIN_SCALE / 2.0));
    }

    #[test]
    fn test_intensity_hue_heats_up() {
        let strategy = ColorStrategy::Intensity {
            cold_hue: 0.6,
            hue_shift: 0.4,
            saturation: 1.0,
            lightness: 0.55,
        };
        let ElementColor::Hsl { hue: cold, .. } = strategy.color(0, 1, 0.0) else {
            panic!("expected hsl");
        };
        let ElementColor::Hsl { hue: hot, .. } = strategy.color(0, 1, 1.0) else {
            panic!("expected hsl");
        };
        assert!((cold - 0.6).abs() < 1e-6);
        assert!((hot - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_gradient_hue_spans_group() {
        let strategy = ColorStrategy::Gradient {
            saturation: 1.0,
            lightness: 0.5,
        };
        assert_eq!(
            strategy.color(64, 256, 0.7),
            ElementColor::Hsl {
                hue: 0.25,
                saturation: 1.0,
                lightness: 0.5
            }
        );
    }

    #[test]
    fn test_emissive_intensity() {
        let strategy = ColorStrategy::Emissive { base: 0.25, gain: 2.0 };
        assert_eq!(strategy.color(3, 9, 0.5), ElementColor::Emissive(1.25));
    }

    #[test]
    fn test_aggregate_extremes() {
        assert_eq!(aggregate(&[255; 128]), 1.0);
        assert_eq!(aggregate(&[0; 128]), 0.0);
        assert_eq!(aggregate(&[]), 0.0);
        assert!((aggregate(&[0, 255]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_stride_rejected() {
        assert_eq!(
            MappingMode::Strided { stride: 0 }.validate(),
            Err(ConfigError::InvalidStride(0))
        );
        assert!(ring_config(MappingMode::Strided { stride: 0 }).validate().is_err());
    }
}
