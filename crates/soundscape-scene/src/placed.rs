//! Placed sources: user-positioned instances of catalog sources.

use soundscape_core::{to_world, CanvasSize, Category, Source, WorldPosition};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of one placement.
///
/// Two placements of the same catalog source have different ids and are
/// independent voices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlacedSourceId(String);

impl PlacedSourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a new placement of `source_id`.
    pub fn generate(source_id: &str) -> Self {
        Self(format!("{}-{}", source_id, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlacedSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlacedSourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlacedSourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A placement of a catalog source on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSource {
    pub id: PlacedSourceId,
    /// Catalog source this placement refers to.
    pub source_id: String,
    /// Copied from the catalog entry at placement time. Never changes.
    category: Category,
    /// Canvas x in pixels.
    pub x: f64,
    /// Canvas y in pixels.
    pub y: f64,
    /// Front/back offset in [-1, 1].
    pub depth: f64,
    /// Instance volume in [0, 1].
    pub volume: f64,
    pub muted: bool,
}

impl PlacedSource {
    /// Place a catalog source at a canvas point with default volume.
    pub fn new(source: &Source, x: f64, y: f64) -> Self {
        Self::with_id(PlacedSourceId::generate(source.id), source.id, source.category, x, y)
    }

    /// Build a placement with an explicit id.
    pub fn with_id(
        id: impl Into<PlacedSourceId>,
        source_id: impl Into<String>,
        category: Category,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            category,
            x,
            y,
            depth: 0.0,
            volume: 1.0,
            muted: false,
        }
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Instance gain: volume, or zero when muted.
    #[inline]
    pub fn instance_gain(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_depth(&mut self, depth: f64) {
        self.depth = depth.clamp(-1.0, 1.0);
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// World position of this placement on a canvas.
    pub fn world_position(&self, canvas: CanvasSize) -> WorldPosition {
        to_world(self.x, self.y, canvas, self.depth)
    }
}
