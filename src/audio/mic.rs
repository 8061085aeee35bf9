use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use std::collections::VecDeque;

use super::SampleSource;

/// Default input device, downmixed to mono.
pub struct MicCapture {
    _stream: cpal::Stream, // must stay alive or audio stops
    consumer: HeapConsumer<f32>,
    window: VecDeque<f32>, // latest `capacity` samples, oldest first
    capacity: usize,
    sample_rate: u32,
}

impl MicCapture {
    /// Opens the default input; `window_size` is the longest window that
    /// will later be requested from [`SampleSource::read_window`].
    pub fn start(window_size: usize) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No microphone input device found"))?;

        let supported = device.default_input_config()?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        log::info!(
            "mic: {} @ {} Hz, {} channel(s), {:?}",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            channels,
            format
        );

        // headroom so the callback never stalls between frames
        let (producer, consumer) = HeapRb::<f32>::new(window_size * 8).split();

        let stream = match format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, producer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, producer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, producer)?,
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, channels, producer)?,
            other => anyhow::bail!("Unsupported mic sample format: {other:?}"),
        };
        stream.play()?;

        Ok(Self {
            _stream: stream,
            consumer,
            window: VecDeque::from(vec![0.0f32; window_size]),
            capacity: window_size,
            sample_rate,
        })
    }
}

impl SampleSource for MicCapture {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_window(&mut self, out: &mut Vec<f32>, size: usize) {
        let keep = self.capacity.max(size);
        while let Some(s) = self.consumer.pop() {
            self.window.push_back(s);
            if self.window.len() > keep {
                self.window.pop_front();
            }
        }
        out.clear();
        let skip = self.window.len().saturating_sub(size);
        out.extend(self.window.iter().skip(skip).copied());
        // silence until enough samples arrive
        out.resize(size, 0.0);
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mut producer: HeapProducer<f32>,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            for frame in data.chunks(channels) {
                let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
                let mono = sum / channels as f32;
                // dropped when the frame loop falls behind
                let _ = producer.push(mono);
            }
        },
        |err| log::warn!("mic stream error: {err}"),
        None,
    )?;
    Ok(stream)
}
