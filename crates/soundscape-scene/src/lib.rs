//! Soundscape Scene - Declarative scene data model
//!
//! Implements the data the audio engine reconciles against:
//! - Placed sources (per-instance position, depth, volume, mute)
//! - Scenes and the fixed bank of 16 scene slots per pack
//! - Per-pack projects and the active pack
//! - The transmitted composition format with versioned serialization

pub mod composition;
pub mod placed;
pub mod project;
pub mod scene;
pub mod serialization;

pub use composition::{Composition, CompositionFeatures, MixSettings, PlacedSourceRecord, SceneRecord};
pub use placed::{PlacedSource, PlacedSourceId};
pub use project::PackProjects;
pub use scene::{AmbienceScope, Scene, SceneBank};
pub use serialization::CompositionFile;
