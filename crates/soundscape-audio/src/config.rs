//! Engine configuration.

use crate::panner::PannerConfig;
use serde::{Deserialize, Serialize};
use soundscape_core::{CanvasSize, ListenerPose, Result, SoundscapeError};
use soundscape_scene::AmbienceScope;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the soundscape engine. Every field is optional in the
/// JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Time each scene plays in sequence mode.
    pub sequence_period_ms: u64,
    /// Gain smoothing and fade length.
    pub gain_ramp_ms: f32,
    /// Directory asset URLs are resolved against.
    pub asset_root: PathBuf,
    /// Positional settings for ambience voices.
    pub panner: PannerConfig,
    /// Initial listener pose.
    pub listener: ListenerPose,
    /// Canvas the scene coordinates refer to.
    pub canvas: CanvasSize,
    /// Output limiter threshold in linear amplitude.
    pub limiter_threshold: f32,
    /// Scope of edits to ambience placements.
    pub ambience_scope: AmbienceScope,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            sequence_period_ms: 4000,
            gain_ramp_ms: 10.0,
            asset_root: PathBuf::from("."),
            panner: PannerConfig::default(),
            listener: ListenerPose::DEFAULT,
            canvas: CanvasSize::default(),
            limiter_threshold: 0.95,
            ambience_scope: AmbienceScope::PerScene,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        serde_json::from_slice(&data).map_err(|e| {
            SoundscapeError::Serialization(format!(
                "Invalid config {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn sequence_period(&self) -> Duration {
        Duration::from_millis(self.sequence_period_ms.max(1))
    }

    /// Gain ramp length in frames at the configured sample rate.
    pub fn ramp_frames(&self) -> usize {
        ((self.gain_ramp_ms.max(0.0) / 1000.0) * self.sample_rate as f32).round() as usize
    }
}
