use rustfft::{Fft, FftPlanner, num_complex::Complex32};
use std::f32::consts::TAU;
use std::sync::Arc;

use super::FrequencySample;
use crate::error::{ConfigError, ensure_finite, ensure_ordered};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyserConfig {
    /// Power of two in 32..=32768; yields `fft_size / 2` bins.
    pub fft_size: usize,
    /// Weight of the previous frame in [0, 1]. 0 disables smoothing.
    pub smoothing_time_constant: f32,
    /// Level mapped to byte 0.
    pub min_decibels: f32,
    /// Level mapped to byte 255.
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ConfigError::InvalidFftSize(self.fft_size));
        }
        ensure_finite("smoothing time constant", self.smoothing_time_constant)?;
        ensure_ordered("smoothing time constant", 0.0, self.smoothing_time_constant)?;
        ensure_ordered("smoothing time constant", self.smoothing_time_constant, 1.0)?;
        ensure_finite("min decibels", self.min_decibels)?;
        ensure_finite("max decibels", self.max_decibels)?;
        if self.min_decibels >= self.max_decibels {
            return Err(ConfigError::InvertedRange {
                field: "decibels",
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }
}

/// Turns windows of mono samples into byte magnitudes, one per bin.
///
/// Blackman window, forward FFT, per-bin exponential smoothing across calls,
/// then decibels mapped linearly from `[min_decibels, max_decibels]` to
/// `[0, 255]`.
pub struct ByteAnalyser {
    config: AnalyserConfig,

    blackman: Vec<f32>,
    fft_buf: Vec<Complex32>,
    scratch: Vec<Complex32>,
    smoothed: Vec<f32>,

    fft: Arc<dyn Fft<f32>>,
}

impl ByteAnalyser {
    pub fn new(config: AnalyserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let n = config.fft_size;
        let fft = FftPlanner::<f32>::new().plan_fft_forward(n);
        let scratch = vec![Complex32::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        log::debug!(
            "analyser: fft_size={} bins={} smoothing={}",
            n,
            n / 2,
            config.smoothing_time_constant
        );

        Ok(Self {
            config,
            blackman: blackman_window(n),
            fft_buf: vec![Complex32::new(0.0, 0.0); n],
            scratch,
            smoothed: vec![0.0; n / 2],
            fft,
        })
    }

    pub fn fft_size(&self) -> usize {
        self.config.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.config.fft_size / 2
    }

    /// Analyses the first `fft_size` samples of `window` (missing samples are
    /// treated as silence) and overwrites `out` with one byte per bin.
    pub fn analyze(&mut self, window: &[f32], out: &mut FrequencySample) {
        let n = self.config.fft_size;
        for i in 0..n {
            let x = window.get(i).copied().unwrap_or(0.0) * self.blackman[i];
            self.fft_buf[i] = Complex32::new(x, 0.0);
        }
        self.fft.process_with_scratch(&mut self.fft_buf, &mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let norm = 1.0 / n as f32;
        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let mag = self.fft_buf[k].norm() * norm;
            let next = tau * *smoothed + (1.0 - tau) * mag;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }

        let min_db = self.config.min_decibels;
        let range = self.config.max_decibels - min_db;
        out.resize(self.smoothed.len());
        for (byte, &mag) in out.bins_mut().iter_mut().zip(&self.smoothed) {
            let db = 20.0 * mag.log10();
            let scaled = 255.0 * (db - min_db) / range;
            *byte = if scaled.is_nan() {
                0
            } else {
                scaled.clamp(0.0, 255.0) as u8
            };
        }
    }

    /// Forgets the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }
}

fn blackman_window(n: usize) -> Vec<f32> {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (TAU * x).cos() + a2 * (2.0 * TAU * x).cos()
        })
        .collect()
}
