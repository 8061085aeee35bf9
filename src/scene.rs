//! Session context: one sampler driving one fixed set of element groups.

use crate::analysis::{FrequencySample, FrequencySampler};
use crate::config::{EffectsConfig, GroupConfig, SceneConfig};
use crate::error::ConfigError;
use crate::layout::VisualElement;
use crate::mapper::{MappingConfig, map_group};

pub struct ElementGroup {
    pub name: String,
    mapping: MappingConfig,
    directions: usize,
    elements: Vec<VisualElement>,
}

impl ElementGroup {
    pub fn build(config: &GroupConfig) -> Result<Self, ConfigError> {
        config.mapping.validate()?;
        let elements = config.layout.generate()?;
        Ok(Self {
            name: config.name.clone(),
            mapping: config.mapping,
            directions: config.layout.directions(),
            elements,
        })
    }

    pub fn mapping(&self) -> &MappingConfig {
        &self.mapping
    }

    pub fn directions(&self) -> usize {
        self.directions
    }

    pub fn elements(&self) -> &[VisualElement] {
        &self.elements
    }

    pub fn apply(&mut self, bins: &[u8]) {
        map_group(&self.mapping, self.directions, bins, &mut self.elements);
    }
}

/// Scene-wide parameters for the renderer's global passes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlobalEffects {
    pub skybox_pulse: f32,
    pub bloom_strength: f32,
    pub outline_strength: f32,
    pub fog_density: f32,
}

impl GlobalEffects {
    pub fn from_aggregate(config: &EffectsConfig, aggregate: f32) -> Self {
        Self {
            skybox_pulse: config.skybox_pulse.at(aggregate),
            bloom_strength: config.bloom_strength.at(aggregate),
            outline_strength: config.outline_strength.at(aggregate),
            fog_density: config.fog_density.at(aggregate),
        }
    }
}

/// What one tick produced besides the per-element states.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSummary {
    /// Mean magnitude of the sample, in [0, 1].
    pub aggregate: f32,
    pub effects: GlobalEffects,
    /// Length of the sample the tick was computed from.
    pub sample_len: usize,
}

/// Every element group of a session plus its global-effect mapping.
pub struct Scene {
    groups: Vec<ElementGroup>,
    effects: EffectsConfig,
}

impl Scene {
    /// Validates `config` and lays out every group.
    pub fn build(config: &SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let groups = config
            .groups
            .iter()
            .map(ElementGroup::build)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            groups,
            effects: config.effects,
        })
    }

    pub fn groups(&self) -> &[ElementGroup] {
        &self.groups
    }

    pub fn element_count(&self) -> usize {
        self.groups.iter().map(|g| g.elements.len()).sum()
    }

    /// Maps `sample` onto every element and computes the global effects.
    pub fn tick(&mut self, sample: &FrequencySample) -> FrameSummary {
        if sample.is_empty() {
            log::trace!("empty frequency sample, rendering baseline");
        }
        for group in &mut self.groups {
            group.apply(sample.bins());
        }
        let aggregate = sample.aggregate();
        FrameSummary {
            aggregate,
            effects: GlobalEffects::from_aggregate(&self.effects, aggregate),
            sample_len: sample.len(),
        }
    }
}

/// Owns one sampler and one scene for the lifetime of a visualization.
///
/// Holds no timer: the host calls [`Session::tick`] once per frame.
pub struct Session<S> {
    sampler: S,
    scene: Scene,
    last: FrameSummary,
    ticks: u64,
}

impl<S: FrequencySampler> Session<S> {
    pub fn new(sampler: S, config: &SceneConfig) -> Result<Self, ConfigError> {
        let scene = Scene::build(config)?;
        log::info!(
            "session: {} groups, {} elements, {} frequency bins",
            scene.groups.len(),
            scene.element_count(),
            sampler.bin_count()
        );
        for group in &scene.groups {
            log::debug!(
                "  {}: {} elements, {:?}",
                group.name,
                group.elements.len(),
                group.mapping.mode
            );
        }
        Ok(Self {
            sampler,
            scene,
            last: FrameSummary::default(),
            ticks: 0,
        })
    }

    /// Pulls the latest sample and maps it onto the scene.
    pub fn tick(&mut self) -> FrameSummary {
        let sample = self.sampler.sample();
        self.last = self.scene.tick(sample);
        self.ticks += 1;
        log::trace!("tick {}: aggregate {:.3}", self.ticks, self.last.aggregate);
        self.last
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn last_frame(&self) -> FrameSummary {
        self.last
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FixedSampler;
    use crate::mapper::ElementColor;

    #[test]
    fn test_classic_scene_counts() {
        let scene = Scene::build(&SceneConfig::classic()).unwrap();
        assert_eq!(scene.groups().len(), 2);
        assert_eq!(scene.groups()[0].elements().len(), 256);
        assert_eq!(scene.groups()[1].elements().len(), 128 * 14);
        assert_eq!(scene.element_count(), 256 + 128 * 14);
        assert_eq!(scene.groups()[1].directions(), 128);
    }

    #[test]
    fn test_invalid_group_aborts_build() {
        let mut config = SceneConfig::classic();
        config.set_field_shape(None, Some(0));
        assert_eq!(
            Scene::build(&config).err(),
            Some(ConfigError::ZeroCount {
                field: "layer count"
            })
        );
    }

    #[test]
    fn test_session_tick_maps_every_group() {
        let sampler = FixedSampler::new(FrequencySample::new(vec![255; 128]));
        let mut session = Session::new(sampler, &SceneConfig::classic()).unwrap();
        let frame = session.tick();
        assert_eq!(frame.aggregate, 1.0);
        assert_eq!(frame.sample_len, 128);
        assert_eq!(session.ticks(), 1);

        let ring = &session.scene().groups()[0];
        assert!(ring.elements().iter().all(|e| e.state.scale == 10.5));

        // innermost building: 1.5 + 1.0 * 5.0
        let city = &session.scene().groups()[1];
        let inner = &city.elements()[0];
        assert!((inner.state.scale - 6.5).abs() < 1e-5);
        match inner.state.color {
            ElementColor::Hsl { hue, .. } => assert!((hue - 0.2).abs() < 1e-6),
            other => panic!("unexpected color {other:?}"),
        }
    }

    #[test]
    fn test_effects_follow_aggregate() {
        let sampler = FixedSampler::new(FrequencySample::new(vec![0; 64]));
        let mut session = Session::new(sampler, &SceneConfig::classic()).unwrap();
        let quiet = session.tick();
        assert_eq!(quiet.effects.skybox_pulse, 0.0);
        assert_eq!(quiet.effects.bloom_strength, 0.6);

        session.sampler_mut().set(&[255; 64]);
        let loud = session.tick();
        assert_eq!(loud.effects.skybox_pulse, 1.0);
        assert!(loud.effects.bloom_strength > quiet.effects.bloom_strength);
        assert_eq!(session.last_frame(), loud);
    }

    #[test]
    fn test_empty_sample_is_not_fatal() {
        let mut session = Session::new(FixedSampler::default(), &SceneConfig::layered()).unwrap();
        let frame = session.tick();
        assert_eq!(frame.aggregate, 0.0);
        assert_eq!(frame.sample_len, 0);
        for group in session.scene().groups() {
            let floor = group.mapping().floor_offset;
            assert!(group.elements().iter().all(|e| e.state.scale >= floor));
        }
    }
}
