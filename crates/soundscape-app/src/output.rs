//! Audio device output.

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use soundscape_audio::Mixer;
use tracing::{error, info};

/// Default output device and its f32 stream configuration.
pub struct OutputDevice {
    device: cpal::Device,
    config: StreamConfig,
}

impl OutputDevice {
    /// Open the default device, preferring `sample_rate` when supported.
    pub fn open(sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No audio output device available"))?;
        let name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device
            .supported_output_configs()
            .context("Failed to query output configs")?
            .filter(|c| c.sample_format() == SampleFormat::F32)
            .filter(|c| c.channels() >= 2)
            .find(|c| {
                c.min_sample_rate().0 <= sample_rate && sample_rate <= c.max_sample_rate().0
            })
            .map(|c| c.with_sample_rate(cpal::SampleRate(sample_rate)));

        let config: StreamConfig = match supported {
            Some(c) => c.into(),
            None => device
                .default_output_config()
                .context("No default output config")?
                .into(),
        };

        info!(
            device = %name,
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "Audio output opened"
        );
        Ok(Self { device, config })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start a stream rendering `mixer` on the audio thread.
    pub fn start(&self, mut mixer: Mixer) -> Result<Stream> {
        let channels = self.config.channels as usize;
        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                    mixer.process_frames(data, channels);
                },
                |e| error!(error = %e, "Audio stream error"),
                None,
            )
            .context("Failed to build output stream")?;
        stream.play().context("Failed to start output stream")?;
        Ok(stream)
    }
}
