//! Saved composition files.
//!
//! The backend stores and returns a bare composition object. Files written
//! here wrap it in an envelope recording the layout revision and the
//! writer, using the same camelCase naming as the composition itself:
//!
//! ```json
//! { "formatVersion": 1, "savedWith": "0.1.0", "composition": { "pack": ... } }
//! ```
//!
//! Both layouts load. A bare object is read as revision 0.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use soundscape_core::{Result, SoundscapeError};
use tracing::debug;

use crate::composition::Composition;

/// Envelope revision written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// A composition together with its file envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionFile {
    #[serde(rename = "formatVersion")]
    pub version: u32,
    pub saved_with: String,
    pub composition: Composition,
}

impl CompositionFile {
    pub fn new(composition: Composition) -> Self {
        Self {
            version: FORMAT_VERSION,
            saved_with: env!("CARGO_PKG_VERSION").to_string(),
            composition,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            SoundscapeError::Serialization(format!("Cannot encode composition: {}", e))
        })
    }

    /// Read either layout. Envelopes from a newer build are refused rather
    /// than half-read.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(data)
            .map_err(|e| SoundscapeError::Serialization(format!("Invalid JSON: {}", e)))?;

        let file = match format_version(&value)? {
            0 => {
                debug!("Reading bare composition");
                Self {
                    version: FORMAT_VERSION,
                    saved_with: String::new(),
                    composition: decode(value)?,
                }
            }
            FORMAT_VERSION => decode(value)?,
            newer => {
                return Err(SoundscapeError::Serialization(format!(
                    "Composition format {} is newer than {}",
                    newer, FORMAT_VERSION
                )))
            }
        };
        Ok(file)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read(path)?)
    }
}

/// Layout revision of a parsed file. Objects without `formatVersion` are
/// the backend's bare compositions.
fn format_version(value: &Value) -> Result<u32> {
    let Some(raw) = value.get("formatVersion") else {
        return Ok(0);
    };
    raw.as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            SoundscapeError::Serialization(format!("Unsupported composition format {}", raw))
        })
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| SoundscapeError::Serialization(format!("Malformed composition: {}", e)))
}
