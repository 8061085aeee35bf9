use super::ByteAnalyser;
use crate::audio::SampleSource;

/// Byte magnitudes, one per frequency bin, from a single analysis window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencySample {
    bins: Vec<u8>,
}

impl FrequencySample {
    pub fn new(bins: Vec<u8>) -> Self {
        Self { bins }
    }

    pub fn silent(len: usize) -> Self {
        Self { bins: vec![0; len] }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn bins_mut(&mut self) -> &mut [u8] {
        &mut self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Grows or shrinks to `len` bins; new bins are zero. A no-op once the
    /// length matches, so steady-state ticks do not allocate.
    pub fn resize(&mut self, len: usize) {
        self.bins.resize(len, 0);
    }

    /// Mean magnitude normalized to [0, 1].
    pub fn aggregate(&self) -> f32 {
        crate::mapper::aggregate(&self.bins)
    }
}

impl From<Vec<u8>> for FrequencySample {
    fn from(bins: Vec<u8>) -> Self {
        Self::new(bins)
    }
}

/// Source of the per-tick frequency snapshot.
///
/// `sample` never blocks: it returns whatever analysis is currently
/// available, which may be stale or all zero.
pub trait FrequencySampler {
    /// Length of every sample this sampler returns.
    fn bin_count(&self) -> usize;

    fn sample(&mut self) -> &FrequencySample;
}

impl<S: FrequencySampler + ?Sized> FrequencySampler for Box<S> {
    fn bin_count(&self) -> usize {
        (**self).bin_count()
    }

    fn sample(&mut self) -> &FrequencySample {
        (**self).sample()
    }
}

/// Hands back a caller-controlled sample.
#[derive(Debug, Clone, Default)]
pub struct FixedSampler {
    sample: FrequencySample,
}

impl FixedSampler {
    pub fn new(sample: FrequencySample) -> Self {
        Self { sample }
    }

    /// Copies `bins` into the held sample, keeping its allocation when the
    /// length is unchanged.
    pub fn set(&mut self, bins: &[u8]) {
        self.sample.resize(bins.len());
        self.sample.bins_mut().copy_from_slice(bins);
    }
}

impl FrequencySampler for FixedSampler {
    fn bin_count(&self) -> usize {
        self.sample.len()
    }

    fn sample(&mut self) -> &FrequencySample {
        &self.sample
    }
}

/// Runs a [`ByteAnalyser`] over the latest window from a [`SampleSource`].
pub struct AnalyserSampler<S> {
    source: S,
    analyser: ByteAnalyser,
    window: Vec<f32>,
    sample: FrequencySample,
}

impl<S: SampleSource> AnalyserSampler<S> {
    pub fn new(source: S, analyser: ByteAnalyser) -> Self {
        let fft_size = analyser.fft_size();
        let bins = analyser.bin_count();
        Self {
            source,
            analyser,
            window: Vec::with_capacity(fft_size),
            sample: FrequencySample::silent(bins),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

impl<S: SampleSource> FrequencySampler for AnalyserSampler<S> {
    fn bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn sample(&mut self) -> &FrequencySample {
        let size = self.analyser.fft_size();
        self.source.read_window(&mut self.window, size);
        self.analyser.analyze(&self.window, &mut self.sample);
        &self.sample
    }
}
