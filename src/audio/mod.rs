//! Mono sample sources that feed the frequency analyser.

pub mod mic;
pub mod player;
pub mod wav;

pub use mic::MicCapture;
pub use player::{AudioPlayer, FileSource};
pub use wav::AudioData;

/// Something that can hand over the most recent window of mono samples.
pub trait SampleSource {
    fn sample_rate(&self) -> u32;

    /// Replaces `out` with exactly `size` samples, padding with silence when
    /// not enough audio is available yet.
    fn read_window(&mut self, out: &mut Vec<f32>, size: usize);

    /// Flips between playing and paused. Returns the new paused state, or
    /// `None` when the source cannot be paused.
    fn toggle_playback(&mut self) -> Option<bool> {
        None
    }
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn read_window(&mut self, out: &mut Vec<f32>, size: usize) {
        (**self).read_window(out, size)
    }

    fn toggle_playback(&mut self) -> Option<bool> {
        (**self).toggle_playback()
    }
}

/// Source that never produces sound.
#[derive(Debug, Clone, Copy)]
pub struct Silence {
    pub sample_rate: u32,
}

impl Default for Silence {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
        }
    }
}

impl SampleSource for Silence {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_window(&mut self, out: &mut Vec<f32>, size: usize) {
        out.clear();
        out.resize(size, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_fills_requested_size() {
        let mut src: Box<dyn SampleSource> = Box::new(Silence::default());
        let mut out = vec![1.0; 3];
        src.read_window(&mut out, 8);
        assert_eq!(out, vec![0.0; 8]);
        assert_eq!(src.toggle_playback(), None);
        assert_eq!(src.sample_rate(), 44_100);
    }
}
