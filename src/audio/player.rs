use anyhow::Context;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::{Duration, Instant};

use super::{AudioData, SampleSource};

/// Looping playback with a pause-aware clock.
pub struct AudioPlayer {
    _stream: OutputStream, // must stay alive for audio to keep playing
    sink: Sink,
    played: Duration,
    resumed_at: Option<Instant>,
}

impl AudioPlayer {
    pub fn start(path: &Path, volume: f32, autoplay: bool) -> anyhow::Result<Self> {
        let (_stream, handle) =
            OutputStream::try_default().context("Failed to open audio output device")?;
        let sink = Sink::try_new(&handle).context("Failed to create audio sink")?;
        let file = File::open(path)
            .with_context(|| format!("Failed to open {} for playback", path.display()))?;
        let source = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to decode {} for playback", path.display()))?;
        sink.set_volume(volume);
        sink.pause();
        sink.append(source.repeat_infinite());

        let mut player = Self {
            _stream,
            sink,
            played: Duration::ZERO,
            resumed_at: None,
        };
        if autoplay {
            player.resume();
        }
        Ok(player)
    }

    pub fn is_paused(&self) -> bool {
        self.resumed_at.is_none()
    }

    pub fn resume(&mut self) {
        if self.resumed_at.is_none() {
            self.sink.play();
            self.resumed_at = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(since) = self.resumed_at.take() {
            self.sink.pause();
            self.played += since.elapsed();
        }
    }

    /// Seconds of audio actually played, excluding paused time.
    pub fn elapsed_secs(&self) -> f32 {
        let running = self.resumed_at.map(|t| t.elapsed()).unwrap_or_default();
        (self.played + running).as_secs_f32()
    }
}

/// A decoded track analysed in step with its own playback.
pub struct FileSource {
    audio: AudioData,
    player: AudioPlayer,
}

impl FileSource {
    /// Decodes `path` for analysis and opens it for looping playback.
    pub fn open(path: &Path, volume: f32, autoplay: bool) -> anyhow::Result<Self> {
        let audio = AudioData::load_wav(path)?;
        let player = AudioPlayer::start(path, volume, autoplay)?;
        Ok(Self { audio, player })
    }
}

impl SampleSource for FileSource {
    fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    fn read_window(&mut self, out: &mut Vec<f32>, size: usize) {
        if self.player.is_paused() {
            out.clear();
            out.resize(size, 0.0);
            return;
        }
        self.audio.window_at_time(self.player.elapsed_secs(), size, out);
    }

    fn toggle_playback(&mut self) -> Option<bool> {
        if self.player.is_paused() {
            self.player.resume();
        } else {
            self.player.pause();
        }
        log::info!(
            "playback {}",
            if self.player.is_paused() { "paused" } else { "resumed" }
        );
        Some(self.player.is_paused())
    }
}
