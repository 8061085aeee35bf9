pub mod analyzer;
pub mod sample;

pub use analyzer::{AnalyserConfig, ByteAnalyser};
pub use sample::{AnalyserSampler, FixedSampler, FrequencySample, FrequencySampler};
