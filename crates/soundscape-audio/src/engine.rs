//! Scene reconciliation.
//!
//! `SoundscapeEngine` keeps the set of playing voices equal to what the
//! latest `MixSnapshot` asks for. Each pass stops voices that left the
//! current scene, updates the ones that stay, and loads and starts the new
//! ones. A voice is started only if its id is still wanted when its buffer
//! arrives, so a scene change during a load never leaves a stale voice.

use crate::cache::BufferCache;
use crate::config::EngineConfig;
use crate::graph::{AudioGraph, ContextState, GraphState, NodeId};
use crate::loader::AssetLoader;
use crate::mixer::Mixer;
use crate::voices::{VoiceManager, VoiceParams};
use glam::Vec3;
use parking_lot::Mutex;
use soundscape_core::{
    AssetResolver, CanvasSize, Category, ListenerPose, Pack, Result, SoundscapeError,
};
use soundscape_scene::{MixSettings, PlacedSource, PlacedSourceId, SceneBank};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Everything the engine reconciles against. Treated as a value; the
/// engine never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct MixSnapshot {
    pub pack: Pack,
    /// The active pack's scenes.
    pub scenes: SceneBank,
    pub mix: MixSettings,
    pub listener: ListenerPose,
    pub canvas: CanvasSize,
    pub is_playing: bool,
    pub current_slot: usize,
}

impl MixSnapshot {
    /// Stopped snapshot of an empty bank.
    pub fn new(pack: Pack) -> Self {
        Self {
            pack,
            scenes: SceneBank::new(),
            mix: MixSettings::default(),
            listener: ListenerPose::DEFAULT,
            canvas: CanvasSize::default(),
            is_playing: false,
            current_slot: 0,
        }
    }

    /// Placements that should be audible: the current scene, both
    /// categories. Category mute is a bus gain, not a filter.
    pub fn targets(&self) -> impl Iterator<Item = &PlacedSource> {
        self.scenes
            .scene(self.current_slot)
            .into_iter()
            .flat_map(|scene| scene.iter())
            .filter(|p| Category::ALL.contains(&p.category()))
    }
}

/// What one reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub started: usize,
    pub updated: usize,
    pub stopped: usize,
    /// Placements without an asset mapping.
    pub unresolved: usize,
    /// Loads that failed.
    pub failed: usize,
    /// Buffers that arrived for ids no longer wanted.
    pub stale: usize,
}

struct Wanted {
    placed: PlacedSource,
    url: Option<String>,
}

struct EngineInner {
    graph: AudioGraph,
    voices: VoiceManager,
    /// Latest target set, checked again before every start.
    wanted: HashMap<PlacedSourceId, Wanted>,
    canvas: CanvasSize,
}

/// The spatial mixing engine. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SoundscapeEngine {
    inner: Arc<Mutex<EngineInner>>,
    cache: Arc<BufferCache>,
    resolver: Arc<dyn AssetResolver>,
}

impl SoundscapeEngine {
    /// Create an engine and the mixer that renders it.
    pub fn new(
        config: &EngineConfig,
        loader: Arc<dyn AssetLoader>,
        resolver: Arc<dyn AssetResolver>,
    ) -> (Self, Mixer) {
        Self::with_cache(config, Arc::new(BufferCache::new(loader)), resolver)
    }

    /// Create an engine sharing an existing buffer cache.
    pub fn with_cache(
        config: &EngineConfig,
        cache: Arc<BufferCache>,
        resolver: Arc<dyn AssetResolver>,
    ) -> (Self, Mixer) {
        let (graph, mixer) = AudioGraph::new(config);
        let inner = EngineInner {
            graph,
            voices: VoiceManager::new(config.panner),
            wanted: HashMap::new(),
            canvas: config.canvas,
        };
        let engine = Self {
            inner: Arc::new(Mutex::new(inner)),
            cache,
            resolver,
        };
        (engine, mixer)
    }

    pub fn cache(&self) -> &Arc<BufferCache> {
        &self.cache
    }

    /// Bring the playing voices in line with `snapshot`.
    ///
    /// Never fails: load, resolution and lifecycle errors are logged and
    /// only affect the source they belong to.
    pub async fn reconcile(&self, snapshot: &MixSnapshot) -> ReconcileReport {
        let (mut report, pending) = match self.plan(snapshot) {
            Ok(planned) => planned,
            Err(e) => {
                warn!(error = %e, "Reconciliation skipped");
                return ReconcileReport::default();
            }
        };

        let mut loads = JoinSet::new();
        for (id, url) in pending {
            let cache = Arc::clone(&self.cache);
            loads.spawn(async move {
                let result = cache.load(&url).await;
                (id, url, result)
            });
        }

        while let Some(joined) = loads.join_next().await {
            let (id, url, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!(error = %e, "Load task aborted");
                    report.failed += 1;
                    continue;
                }
            };
            let buffer = match result {
                Ok(buffer) => buffer,
                Err(e) => {
                    warn!(id = %id, url = %url, error = %e, "Skipping source");
                    report.failed += 1;
                    continue;
                }
            };

            let mut guard = self.inner.lock();
            let inner = &mut *guard;
            let placed = match inner.wanted.get(&id) {
                Some(w) if w.url.as_deref() == Some(url.as_str()) => w.placed.clone(),
                _ => {
                    debug!(id = %id, "Buffer arrived for a source no longer wanted");
                    report.stale += 1;
                    continue;
                }
            };
            match inner
                .voices
                .start(&mut inner.graph, &placed, buffer, inner.canvas)
            {
                Ok(true) => report.started += 1,
                // Started by an overlapping pass
                Ok(false) => {}
                Err(SoundscapeError::Closed) => {
                    warn!(id = %id, "Audio graph closed during reconciliation");
                    break;
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Failed to start source");
                    report.failed += 1;
                }
            }
        }

        debug!(?report, "Reconciled");
        report
    }

    /// Synchronous part of a pass: levels, stops and updates. Returns the
    /// loads still to do.
    fn plan(
        &self,
        snapshot: &MixSnapshot,
    ) -> Result<(ReconcileReport, Vec<(PlacedSourceId, String)>)> {
        let mut report = ReconcileReport::default();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        apply_levels(&mut inner.graph, &snapshot.mix, snapshot.listener)?;
        inner.canvas = snapshot.canvas;

        if !snapshot.is_playing {
            inner.wanted.clear();
            report.stopped = inner.voices.stop_all(&mut inner.graph);
            return Ok((report, Vec::new()));
        }

        inner.graph.resume()?;

        let mut wanted = HashMap::new();
        for placed in snapshot.targets() {
            let url = self.resolver.resolve(snapshot.pack, &placed.source_id);
            wanted.insert(
                placed.id.clone(),
                Wanted {
                    placed: placed.clone(),
                    url,
                },
            );
        }

        for id in inner.voices.active_ids() {
            if !wanted.contains_key(&id) && inner.voices.stop(&mut inner.graph, &id) {
                report.stopped += 1;
            }
        }

        let mut pending = Vec::new();
        for (id, target) in &wanted {
            let params = VoiceParams::of(&target.placed, snapshot.canvas);
            if inner.voices.update(id, params) {
                report.updated += 1;
                continue;
            }
            match &target.url {
                Some(url) => pending.push((id.clone(), url.clone())),
                None => {
                    let e = SoundscapeError::UnresolvedAsset {
                        pack: snapshot.pack,
                        source_id: target.placed.source_id.clone(),
                    };
                    debug!(id = %id, error = %e, "Skipping source");
                    report.unresolved += 1;
                }
            }
        }

        inner.wanted = wanted;
        Ok((report, pending))
    }

    /// Stop every voice and forget the target set.
    pub fn stop_all(&self) -> usize {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.wanted.clear();
        inner.voices.stop_all(&mut inner.graph)
    }

    /// Warm the cache with every resolvable asset of `pack`.
    pub async fn preload_pack(&self, pack: Pack) -> usize {
        let urls: Vec<String> = pack
            .sources()
            .iter()
            .filter_map(|s| self.resolver.resolve(pack, s.id))
            .collect();
        info!(pack = %pack, assets = urls.len(), "Preloading pack");
        self.cache.preload(urls).await
    }

    /// Tear down the graph. Later passes do nothing.
    pub fn close(&self) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.wanted.clear();
        inner.voices.stop_all(&mut inner.graph);
        inner.graph.close();
        inner.voices.clear();
    }

    pub fn is_active(&self, id: &PlacedSourceId) -> bool {
        self.inner.lock().voices.is_active(id)
    }

    pub fn active_ids(&self) -> Vec<PlacedSourceId> {
        self.inner.lock().voices.active_ids()
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().voices.len()
    }

    pub fn node_id(&self, id: &PlacedSourceId) -> Option<NodeId> {
        self.inner.lock().voices.node_id(id)
    }

    pub fn effective_gain(&self, id: &PlacedSourceId) -> Option<f32> {
        let inner = self.inner.lock();
        inner.voices.effective_gain(&inner.graph, id)
    }

    pub fn world_position(&self, id: &PlacedSourceId) -> Option<Vec3> {
        self.inner.lock().voices.world_position(id)
    }

    pub fn context_state(&self) -> ContextState {
        self.inner.lock().graph.context_state()
    }

    pub fn graph_state(&self) -> GraphState {
        self.inner.lock().graph.state()
    }

    pub fn listener(&self) -> ListenerPose {
        self.inner.lock().graph.listener()
    }
}

fn apply_levels(graph: &mut AudioGraph, mix: &MixSettings, listener: ListenerPose) -> Result<()> {
    graph.set_master_volume(mix.master_volume as f32)?;
    for category in Category::ALL {
        graph.set_category_volume(category, mix.category_volume(category) as f32)?;
        graph.set_category_muted(category, mix.category_muted(category))?;
    }
    graph.set_listener_pose(listener)
}
