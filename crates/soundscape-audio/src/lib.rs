//! Soundscape Audio - Realtime spatial mixing engine
//!
//! Turns a declarative scene (placed sources with position, depth, volume
//! and mute) into a live mix.
//!
//! Architecture:
//! - `BufferCache`: decoded assets keyed by URL, one decode per URL
//! - `AudioGraph`: master and category buses, listener, graph lifecycle
//! - `Mixer`: render half of the graph, runs on the audio thread
//! - `VoiceManager`: one looping voice per placed source
//! - `SoundscapeEngine`: reconciles voices with a `MixSnapshot`
//! - `SequenceDriver`: steps through the 16 scenes on a timer
//! - `Session`: editable state tying the above together

pub mod buffer;
pub mod cache;
pub mod config;
pub mod engine;
pub mod graph;
pub mod loader;
pub mod mixer;
pub mod panner;
pub mod param;
pub mod sequence;
pub mod session;
pub mod voices;

pub use buffer::{decode, AudioBuffer};
pub use cache::BufferCache;
pub use config::EngineConfig;
pub use engine::{MixSnapshot, ReconcileReport, SoundscapeEngine};
pub use graph::{AudioGraph, ContextState, GraphState, NodeId};
pub use loader::{AssetLoader, FileAssetLoader};
pub use mixer::Mixer;
pub use panner::{DistanceModel, PannerConfig, PanningModel};
pub use sequence::{SequenceDriver, SequenceState};
pub use session::Session;
pub use voices::{VoiceManager, VoiceParams};
