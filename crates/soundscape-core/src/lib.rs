//! Soundscape Core - Foundation types for the soundscape composer
//!
//! This crate provides the fundamental types shared by every other crate:
//! - Error taxonomy (load, closed, unresolved asset)
//! - Packs, categories and the static source catalog
//! - Canvas to world coordinate mapping and the listener pose
//! - Asset URL resolution

pub mod asset;
pub mod catalog;
pub mod error;
pub mod geometry;

pub use asset::{AssetResolver, PackAssetResolver};
pub use catalog::{Category, Pack, Source};
pub use error::{Result, SoundscapeError};
pub use geometry::{to_world, CanvasSize, ListenerPose, WorldPosition};

/// Number of scene slots every pack owns.
pub const SCENE_COUNT: usize = 16;

/// Index of the last scene slot.
pub const LAST_SCENE_INDEX: usize = SCENE_COUNT - 1;
