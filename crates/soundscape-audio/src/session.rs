//! A playback session: the declarative state the engine reconciles
//! against, plus the sequence driver.
//!
//! Edits only change state. `sync` turns the current state into a
//! snapshot and reconciles the engine with it.

use crate::config::EngineConfig;
use crate::engine::{MixSnapshot, ReconcileReport, SoundscapeEngine};
use crate::sequence::{SequenceDriver, SequenceState};
use soundscape_core::{
    CanvasSize, Category, ListenerPose, Pack, Result, SoundscapeError, LAST_SCENE_INDEX,
};
use soundscape_scene::{AmbienceScope, Composition, MixSettings, PackProjects, PlacedSourceId};
use tokio::sync::watch;
use tracing::info;

pub struct Session {
    engine: SoundscapeEngine,
    projects: PackProjects,
    mix: MixSettings,
    listener: ListenerPose,
    canvas: CanvasSize,
    playing: bool,
    current_slot: usize,
    scope: AmbienceScope,
    sequence: SequenceDriver,
    sequence_rx: watch::Receiver<SequenceState>,
}

impl Session {
    pub fn new(engine: SoundscapeEngine, config: &EngineConfig) -> Self {
        let sequence = SequenceDriver::new(config.sequence_period());
        let sequence_rx = sequence.subscribe();
        Self {
            engine,
            projects: PackProjects::new(Pack::default()),
            mix: MixSettings::default(),
            listener: config.listener,
            canvas: config.canvas,
            playing: false,
            current_slot: 0,
            scope: config.ambience_scope,
            sequence,
            sequence_rx,
        }
    }

    pub fn engine(&self) -> &SoundscapeEngine {
        &self.engine
    }

    pub fn projects(&self) -> &PackProjects {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut PackProjects {
        &mut self.projects
    }

    pub fn mix(&self) -> &MixSettings {
        &self.mix
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    pub fn sequence_state(&self) -> SequenceState {
        self.sequence.state()
    }

    /// Current state as the engine sees it.
    pub fn snapshot(&self) -> MixSnapshot {
        MixSnapshot {
            pack: self.projects.active_pack(),
            scenes: self.projects.active_bank().clone(),
            mix: self.mix,
            listener: self.listener,
            canvas: self.canvas,
            is_playing: self.playing,
            current_slot: self.current_slot,
        }
    }

    /// Reconcile the engine with the current state.
    pub async fn sync(&self) -> ReconcileReport {
        self.engine.reconcile(&self.snapshot()).await
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stop playback and any running sequence.
    pub fn pause(&mut self) {
        self.playing = false;
        self.sequence.stop();
        self.mark_sequence_seen();
    }

    pub fn select_scene(&mut self, slot: usize) -> Result<()> {
        if slot > LAST_SCENE_INDEX {
            return Err(SoundscapeError::InvalidParameter(format!(
                "Scene slot {} out of range",
                slot
            )));
        }
        self.current_slot = slot;
        self.sequence.set_index(slot);
        self.mark_sequence_seen();
        Ok(())
    }

    /// Make another pack active. Its own scenes are kept.
    pub fn switch_pack(&mut self, pack: Pack) {
        if self.projects.active_pack() != pack {
            info!(pack = %pack, "Switching pack");
            self.projects.switch_pack(pack);
        }
    }

    /// Play every scene in order, once.
    pub fn play_all(&mut self) {
        self.playing = true;
        self.current_slot = 0;
        self.sequence.start();
        self.mark_sequence_seen();
    }

    /// Stop stepping through scenes. Playback and the slot are kept.
    pub fn stop_sequence(&mut self) {
        self.sequence.stop();
        self.mark_sequence_seen();
    }

    // Changes made here are already applied; only driver ticks should
    // wake `next_sequence_change`.
    fn mark_sequence_seen(&mut self) {
        self.sequence_rx.borrow_and_update();
    }

    /// Wait for the sequence to move and apply the change. A sequence that
    /// runs to the end also stops playback. Returns `None` once the driver
    /// is gone.
    pub async fn next_sequence_change(&mut self) -> Option<SequenceState> {
        self.sequence_rx.changed().await.ok()?;
        let state = *self.sequence_rx.borrow_and_update();
        self.current_slot = state.index;
        if state.completed && !state.active {
            self.playing = false;
        }
        Some(state)
    }

    /// Replace the composition's pack bank and levels.
    pub fn load_composition(&mut self, composition: &Composition) -> Result<()> {
        composition.apply_to(&mut self.projects)?;
        let loaded = composition.mix_settings();
        self.mix.master_volume = loaded.master_volume;
        self.mix.music_volume = loaded.music_volume;
        self.mix.ambience_volume = loaded.ambience_volume;
        info!(
            pack = %composition.pack,
            placements = self.projects.active_bank().placement_count(),
            "Composition loaded"
        );
        Ok(())
    }

    /// Current state in the transmitted format.
    pub fn composition(&self) -> Composition {
        Composition::from_projects(&self.projects, &self.mix)
    }

    /// Place a catalog source of the active pack in a scene.
    pub fn place(&mut self, slot: usize, source_id: &str, x: f64, y: f64) -> Result<PlacedSourceId> {
        let pack = self.projects.active_pack();
        let source = pack.find(source_id).ok_or_else(|| {
            SoundscapeError::NotFound(format!("Source '{}' in pack {}", source_id, pack))
        })?;
        let scene = self
            .projects
            .active_bank_mut()
            .scene_mut(slot)
            .ok_or_else(|| SoundscapeError::InvalidParameter(format!("Scene slot {}", slot)))?;
        Ok(scene.place(source, x, y))
    }

    pub fn remove(&mut self, slot: usize, id: &PlacedSourceId) -> Result<usize> {
        self.projects.active_bank_mut().remove(slot, id, self.scope)
    }

    pub fn move_source(&mut self, slot: usize, id: &PlacedSourceId, x: f64, y: f64) -> Result<usize> {
        ensure_finite(&[x, y])?;
        self.projects
            .active_bank_mut()
            .move_source(slot, id, x, y, self.scope)
    }

    pub fn set_depth(&mut self, slot: usize, id: &PlacedSourceId, depth: f64) -> Result<usize> {
        ensure_finite(&[depth])?;
        self.projects
            .active_bank_mut()
            .set_depth(slot, id, depth, self.scope)
    }

    pub fn set_volume(&mut self, slot: usize, id: &PlacedSourceId, volume: f64) -> Result<usize> {
        ensure_finite(&[volume])?;
        self.projects
            .active_bank_mut()
            .set_volume(slot, id, volume, self.scope)
    }

    pub fn toggle_mute(&mut self, slot: usize, id: &PlacedSourceId) -> Result<usize> {
        self.projects.active_bank_mut().toggle_mute(slot, id, self.scope)
    }

    pub fn set_master_volume(&mut self, volume: f64) {
        self.mix.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_category_volume(&mut self, category: Category, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        match category {
            Category::Music => self.mix.music_volume = volume,
            Category::Ambience => self.mix.ambience_volume = volume,
        }
    }

    pub fn set_category_muted(&mut self, category: Category, muted: bool) {
        match category {
            Category::Music => self.mix.music_muted = muted,
            Category::Ambience => self.mix.ambience_muted = muted,
        }
    }

    /// Move the listener to a canvas point.
    pub fn set_listener_at(&mut self, x: f64, y: f64, depth: f64) -> Result<()> {
        ensure_finite(&[x, y, depth])?;
        self.listener = self.listener.at_canvas(x, y, self.canvas, depth);
        Ok(())
    }

    pub fn listener(&self) -> ListenerPose {
        self.listener
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }
}

fn ensure_finite(values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SoundscapeError::InvalidParameter(format!(
            "Non-finite coordinate in {:?}",
            values
        )))
    }
}
