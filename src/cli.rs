//! Command-line argument parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::analysis::AnalyserConfig;
use crate::audio::{FileSource, MicCapture, SampleSource, Silence};
use crate::config::SceneConfig;

#[derive(Parser, Debug)]
#[command(name = "spectrum_city")]
#[command(about = "Audio-reactive ring and skyline visualizer", long_about = None)]
pub struct Args {
    /// WAV file to loop; click the window to play or pause
    #[arg(long, value_name = "PATH", conflicts_with = "mic")]
    pub wav: Option<PathBuf>,

    /// Analyse the default microphone instead of a file
    #[arg(long)]
    pub mic: bool,

    /// Scene layout
    #[arg(long, value_enum, default_value_t = Preset::Classic)]
    pub preset: Preset,

    /// Analyser FFT size (power of two); the sample has half as many bins
    #[arg(long, value_name = "N", default_value_t = 256)]
    pub fft_size: usize,

    /// Analyser smoothing across frames, 0..=1
    #[arg(long, value_name = "TAU", default_value_t = 0.8)]
    pub smoothing: f32,

    /// Bars per ring
    #[arg(long, value_name = "N")]
    pub bars: Option<usize>,

    /// Skyline directions
    #[arg(long, value_name = "N")]
    pub directions: Option<usize>,

    /// Buildings per skyline direction
    #[arg(long, value_name = "N")]
    pub layers: Option<usize>,

    /// Start playback immediately instead of waiting for a click
    #[arg(long)]
    pub autoplay: bool,

    /// Playback volume
    #[arg(long, default_value_t = 0.8)]
    pub volume: f32,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 800)]
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// One rainbow ring around the skyline
    Classic,
    /// Classic plus strided, inverted and emissive rings
    Layered,
}

impl Args {
    pub fn scene_config(&self) -> SceneConfig {
        let mut config = match self.preset {
            Preset::Classic => SceneConfig::classic(),
            Preset::Layered => SceneConfig::layered(),
        };
        if let Some(bars) = self.bars {
            config.set_ring_count(bars);
        }
        config.set_field_shape(self.directions, self.layers);
        config
    }

    pub fn analyser_config(&self) -> AnalyserConfig {
        AnalyserConfig {
            fft_size: self.fft_size,
            smoothing_time_constant: self.smoothing,
            ..AnalyserConfig::default()
        }
    }

    /// Opens the selected input. Without `--wav` or `--mic` the scene runs on
    /// silence.
    pub fn open_source(&self) -> anyhow::Result<Box<dyn SampleSource>> {
        if let Some(path) = &self.wav {
            log::info!("input: {}", path.display());
            return Ok(Box::new(FileSource::open(path, self.volume, self.autoplay)?));
        }
        if self.mic {
            return Ok(Box::new(MicCapture::start(self.fft_size)?));
        }
        log::warn!("no input selected (--wav or --mic), running on silence");
        Ok(Box::new(Silence::default()))
    }
}
