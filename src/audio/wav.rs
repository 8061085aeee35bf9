use anyhow::Context;
use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;

/// Fully decoded track, downmixed to mono.
#[derive(Clone)]
pub struct AudioData {
    pub sample_rate: u32,
    pub samples_mono: Vec<f32>,
    pub duration_sec: f32,
}

impl AudioData {
    pub fn load_wav<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let reader =
            WavReader::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let audio = Self::from_reader(reader)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        log::debug!(
            "loaded {}: {} Hz, {:.1}s",
            path.display(),
            audio.sample_rate,
            audio.duration_sec
        );
        Ok(audio)
    }

    /// Decodes 8/16/24/32-bit integer or 32-bit float PCM with any channel count.
    pub fn from_reader<R: Read>(mut reader: WavReader<R>) -> anyhow::Result<Self> {
        let spec = reader.spec();
        let channels = spec.channels as usize;
        anyhow::ensure!(channels > 0, "WAV declares zero channels");

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<Result<_, _>>()?,
            (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
                let full_scale = (1u64 << (bits - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / full_scale))
                    .collect::<Result<_, _>>()?
            }
            (format, bits) => {
                anyhow::bail!("Unsupported WAV encoding: {bits}-bit {format:?}")
            }
        };

        let samples_mono: Vec<f32> = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        let duration_sec = samples_mono.len() as f32 / spec.sample_rate.max(1) as f32;

        Ok(Self {
            sample_rate: spec.sample_rate,
            samples_mono,
            duration_sec,
        })
    }

    /// Fills `out` with `n` samples centred on `t_sec`, looping the track.
    pub fn window_at_time(&self, t_sec: f32, n: usize, out: &mut Vec<f32>) {
        out.clear();
        if self.samples_mono.is_empty() {
            out.resize(n, 0.0);
            return;
        }

        let dur = self.duration_sec.max(0.000_1);
        let t = t_sec.rem_euclid(dur);
        let center = (t * self.sample_rate as f32) as isize;
        let half = (n as isize) / 2;
        let len = self.samples_mono.len() as isize;

        out.extend((0..n as isize).map(|i| {
            let idx = (center - half + i).rem_euclid(len) as usize;
            self.samples_mono[idx]
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    fn encode_i16(channels: u16, frames: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut bytes = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut bytes, spec).unwrap();
        for &s in frames {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_stereo_is_downmixed() {
        let bytes = encode_i16(2, &[16_384, 0, -16_384, -16_384]);
        let audio = AudioData::from_reader(WavReader::new(Cursor::new(bytes)).unwrap()).unwrap();
        assert_eq!(audio.sample_rate, 8_000);
        assert_eq!(audio.samples_mono.len(), 2);
        assert!((audio.samples_mono[0] - 0.25).abs() < 1e-4);
        assert!((audio.samples_mono[1] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_float_wav_decodes() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut bytes = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut bytes, spec).unwrap();
        for s in [0.5f32, -0.25, 1.0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
        let audio =
            AudioData::from_reader(WavReader::new(Cursor::new(bytes.into_inner())).unwrap())
                .unwrap();
        assert_eq!(audio.samples_mono, vec![0.5, -0.25, 1.0]);
        assert!((audio.duration_sec - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_window_loops_around_track() {
        let audio = AudioData {
            sample_rate: 4,
            samples_mono: vec![0.0, 1.0, 2.0, 3.0],
            duration_sec: 1.0,
        };
        let mut out = Vec::new();
        audio.window_at_time(0.0, 4, &mut out);
        assert_eq!(out, vec![2.0, 3.0, 0.0, 1.0]);
        audio.window_at_time(1.25, 2, &mut out);
        assert_eq!(out, vec![0.0, 1.0]);
    }

    #[test]
    fn test_empty_track_gives_silence() {
        let audio = AudioData {
            sample_rate: 44_100,
            samples_mono: Vec::new(),
            duration_sec: 0.0,
        };
        let mut out = vec![1.0];
        audio.window_at_time(3.0, 16, &mut out);
        assert_eq!(out, vec![0.0; 16]);
    }
}
