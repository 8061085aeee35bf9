//! Audio-reactive circular city: frequency bins in, per-element scale and
//! color out.
//!
//! A [`Session`] owns one [`FrequencySampler`] and one [`Scene`]. Each call
//! to [`Session::tick`] reads the latest sample, rewrites the state of every
//! [`VisualElement`], and returns the aggregate signal with the global
//! effect parameters derived from it.

pub mod analysis;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod mapper;
pub mod scene;
pub mod visual;

pub use analysis::{FixedSampler, FrequencySample, FrequencySampler};
pub use config::SceneConfig;
pub use error::ConfigError;
pub use layout::{VisualElement, generate_radial_field, generate_ring};
pub use mapper::{ColorStrategy, ElementColor, ElementState, MappingConfig, MappingMode};
pub use scene::{FrameSummary, GlobalEffects, Scene, Session};
