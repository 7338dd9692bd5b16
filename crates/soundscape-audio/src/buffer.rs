//! Decoded audio buffers.
//!
//! Assets are decoded once with Symphonia into interleaved f32 PCM and
//! shared between voices via `Arc`.

use soundscape_core::{Result, SoundscapeError};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Decoded PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved samples, normalized to [-1.0, 1.0].
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 || sample_rate == 0 {
            return Err(SoundscapeError::InvalidParameter(format!(
                "Invalid buffer layout: {} channels at {} Hz",
                channels, sample_rate
            )));
        }
        if samples.is_empty() || samples.len() % channels as usize != 0 {
            return Err(SoundscapeError::InvalidParameter(format!(
                "Buffer of {} samples does not hold whole {}-channel frames",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Mono buffer from raw samples.
    pub fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(samples, 1, sample_rate)
    }

    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of frames (samples per channel).
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Left/right pair of a frame. Mono is duplicated, extra channels are
    /// ignored.
    #[inline]
    pub fn stereo_frame(&self, frame: usize) -> (f32, f32) {
        let base = frame * self.channels as usize;
        let left = self.samples[base];
        let right = if self.channels > 1 {
            self.samples[base + 1]
        } else {
            left
        };
        (left, right)
    }

    /// Average of all channels of a frame.
    #[inline]
    pub fn mono_frame(&self, frame: usize) -> f32 {
        let ch = self.channels as usize;
        let base = frame * ch;
        self.samples[base..base + ch].iter().sum::<f32>() / ch as f32
    }
}

/// Decode an encoded asset (WAV, MP3, OGG, FLAC, ...) into PCM.
///
/// `extension` is a format hint, usually taken from the asset URL.
pub fn decode(data: Vec<u8>, extension: Option<&str>) -> Result<AudioBuffer> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| SoundscapeError::Decode(format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SoundscapeError::Decode("No audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| SoundscapeError::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(44100);
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or(2) as u16;
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(SoundscapeError::Decode(format!("Format error: {}", e))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupt packet, keep going with the rest of the stream
                warn!(error = %e, "Skipping undecodable packet");
            }
            Err(e) => return Err(SoundscapeError::Decode(format!("Decode error: {}", e))),
        }
    }

    debug!(
        frames = samples.len() / channels.max(1) as usize,
        channels, sample_rate, "Decoded audio asset"
    );
    AudioBuffer::new(samples, channels, sample_rate)
        .map_err(|e| SoundscapeError::Decode(e.to_string()))
}
