//! Per-source playback voices.
//!
//! Maps each placed-source id to the node chain playing it. A voice is
//! created once by `start` and afterwards only has its parameters changed
//! by `update`; the chain is never rebuilt for a volume, mute or position
//! change.

use crate::buffer::AudioBuffer;
use crate::graph::{AudioGraph, NodeId, VoiceNodes};
use crate::panner::{PannerConfig, PannerNode};
use glam::Vec3;
use soundscape_core::{to_world, CanvasSize, Category, Result, SoundscapeError};
use soundscape_scene::{PlacedSource, PlacedSourceId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Mutable parameters of a playing placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub volume: f64,
    pub muted: bool,
    pub x: f64,
    pub y: f64,
    pub depth: f64,
    pub canvas: CanvasSize,
}

impl VoiceParams {
    pub fn of(placed: &PlacedSource, canvas: CanvasSize) -> Self {
        Self {
            volume: placed.volume,
            muted: placed.muted,
            x: placed.x,
            y: placed.y,
            depth: placed.depth,
            canvas,
        }
    }

    /// Instance gain with the mute applied.
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0) as f32
        }
    }

    pub fn world_position(&self) -> Vec3 {
        to_world(self.x, self.y, self.canvas, self.depth)
    }
}

struct Voice {
    nodes: Arc<VoiceNodes>,
}

/// Active voices keyed by placed-source id. At most one voice exists per id.
pub struct VoiceManager {
    voices: HashMap<PlacedSourceId, Voice>,
    panner: PannerConfig,
}

impl VoiceManager {
    pub fn new(panner: PannerConfig) -> Self {
        Self {
            voices: HashMap::new(),
            panner,
        }
    }

    /// Start a looping voice for `placed`. Ambience placements get a
    /// positional stage. Returns `false` without touching anything when the
    /// id already has a voice.
    pub fn start(
        &mut self,
        graph: &mut AudioGraph,
        placed: &PlacedSource,
        buffer: Arc<AudioBuffer>,
        canvas: CanvasSize,
    ) -> Result<bool> {
        if self.voices.contains_key(&placed.id) {
            return Ok(false);
        }

        let params = VoiceParams::of(placed, canvas);
        let category = placed.category();
        let panner = category
            .is_spatial()
            .then(|| PannerNode::new(self.panner, params.world_position()));

        let nodes = graph.connect(category, buffer, params.gain(), panner)?;
        debug!(
            id = %placed.id,
            node = %nodes.id,
            category = %category,
            "Voice started"
        );
        self.voices.insert(placed.id.clone(), Voice { nodes });
        Ok(true)
    }

    /// Apply new parameters to an active voice. Returns whether the id was
    /// active.
    pub fn update(&mut self, id: &PlacedSourceId, params: VoiceParams) -> bool {
        let Some(voice) = self.voices.get(id) else {
            return false;
        };
        voice.nodes.gain.set(params.gain());
        if let Some(panner) = &voice.nodes.panner {
            panner.position.set(params.world_position());
        }
        true
    }

    /// Stop and disconnect a voice. Stopping an unknown id does nothing.
    pub fn stop(&mut self, graph: &mut AudioGraph, id: &PlacedSourceId) -> bool {
        let Some(voice) = self.voices.remove(id) else {
            return false;
        };
        match graph.disconnect(voice.nodes.id) {
            Ok(()) => debug!(id = %id, node = %voice.nodes.id, "Voice stopped"),
            // The render side already dropped every voice
            Err(SoundscapeError::Closed) => debug!(id = %id, "Voice dropped after close"),
            Err(e) => warn!(id = %id, error = %e, "Failed to disconnect voice"),
        }
        true
    }

    /// Stop every active voice. Returns how many were stopped.
    pub fn stop_all(&mut self, graph: &mut AudioGraph) -> usize {
        let ids: Vec<PlacedSourceId> = self.voices.keys().cloned().collect();
        let mut stopped = 0;
        for id in &ids {
            if self.stop(graph, id) {
                stopped += 1;
            }
        }
        stopped
    }

    pub fn is_active(&self, id: &PlacedSourceId) -> bool {
        self.voices.contains_key(id)
    }

    /// Ids with an active voice, sorted.
    pub fn active_ids(&self) -> Vec<PlacedSourceId> {
        let mut ids: Vec<_> = self.voices.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Identity of the node chain playing `id`.
    pub fn node_id(&self, id: &PlacedSourceId) -> Option<NodeId> {
        self.voices.get(id).map(|v| v.nodes.id)
    }

    pub fn category(&self, id: &PlacedSourceId) -> Option<Category> {
        self.voices.get(id).map(|v| v.nodes.category)
    }

    /// Instance gain times category bus gain times master gain.
    pub fn effective_gain(&self, graph: &AudioGraph, id: &PlacedSourceId) -> Option<f32> {
        self.voices.get(id).map(|v| {
            v.nodes.gain.get() * graph.bus_gain(v.nodes.category) * graph.master_gain()
        })
    }

    /// Position of the positional stage; `None` for unspatialized voices.
    pub fn world_position(&self, id: &PlacedSourceId) -> Option<Vec3> {
        self.voices
            .get(id)
            .and_then(|v| v.nodes.panner.as_ref())
            .map(|p| p.position.get())
    }

    /// Forget every voice without sending disconnects. Used once the graph
    /// is closed.
    pub(crate) fn clear(&mut self) {
        self.voices.clear();
    }
}
