//! The transmitted composition format.
//!
//! This is what the save/load backend stores and what the generator
//! produces. Field names follow the wire format (camelCase).

use serde::{Deserialize, Serialize};
use soundscape_core::{Category, Pack, Result, SoundscapeError, SCENE_COUNT};
use std::collections::HashSet;

use crate::placed::PlacedSource;
use crate::project::PackProjects;
use crate::scene::{Scene, SceneBank};

/// Canvas bounds accepted by the backend.
pub const MAX_CANVAS_X: f64 = 1000.0;
pub const MAX_CANVAS_Y: f64 = 600.0;

fn unity() -> f64 {
    1.0
}

/// One placed source on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSourceRecord {
    pub id: String,
    pub source_id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "unity")]
    pub volume: f64,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub depth: f64,
}

impl From<&PlacedSource> for PlacedSourceRecord {
    fn from(p: &PlacedSource) -> Self {
        Self {
            id: p.id.to_string(),
            source_id: p.source_id.clone(),
            x: p.x,
            y: p.y,
            volume: p.volume,
            muted: p.muted,
            depth: p.depth,
        }
    }
}

/// One scene slot on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    pub id: usize,
    #[serde(default)]
    pub placed_sources: Vec<PlacedSourceRecord>,
}

/// Master and category bus levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MixSettings {
    pub master_volume: f64,
    pub music_volume: f64,
    pub ambience_volume: f64,
    pub music_muted: bool,
    pub ambience_muted: bool,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 1.0,
            ambience_volume: 1.0,
            music_muted: false,
            ambience_muted: false,
        }
    }
}

impl MixSettings {
    pub fn category_volume(&self, category: Category) -> f64 {
        match category {
            Category::Music => self.music_volume,
            Category::Ambience => self.ambience_volume,
        }
    }

    pub fn category_muted(&self, category: Category) -> bool {
        match category {
            Category::Music => self.music_muted,
            Category::Ambience => self.ambience_muted,
        }
    }
}

/// A full composition: one pack, 16 scenes and the bus levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    pub pack: Pack,
    pub scenes: Vec<SceneRecord>,
    #[serde(default = "unity")]
    pub master_volume: f64,
    #[serde(default = "unity")]
    pub music_volume: f64,
    #[serde(default = "unity")]
    pub ambience_volume: f64,
}

/// Summary statistics of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositionFeatures {
    /// Distinct catalog sources used anywhere.
    pub num_sources: usize,
    /// Distinct music sources used.
    pub num_music_sources: usize,
    /// Distinct ambience sources used.
    pub num_ambience_sources: usize,
    /// Placements divided by the number of scene slots.
    pub avg_sources_per_scene: f64,
}

impl Composition {
    /// An empty composition with 16 empty scenes.
    pub fn empty(pack: Pack) -> Self {
        Self {
            pack,
            scenes: (0..SCENE_COUNT)
                .map(|id| SceneRecord {
                    id,
                    placed_sources: Vec::new(),
                })
                .collect(),
            master_volume: 1.0,
            music_volume: 1.0,
            ambience_volume: 1.0,
        }
    }

    /// Capture the active pack of a project with its mix levels.
    pub fn from_projects(projects: &PackProjects, mix: &MixSettings) -> Self {
        Self::from_bank(projects.active_pack(), projects.active_bank(), mix)
    }

    pub fn from_bank(pack: Pack, bank: &SceneBank, mix: &MixSettings) -> Self {
        Self {
            pack,
            scenes: bank
                .iter()
                .enumerate()
                .map(|(id, scene)| SceneRecord {
                    id,
                    placed_sources: scene.iter().map(PlacedSourceRecord::from).collect(),
                })
                .collect(),
            master_volume: mix.master_volume,
            music_volume: mix.music_volume,
            ambience_volume: mix.ambience_volume,
        }
    }

    /// Bus levels stored in the composition. Mute flags are not persisted.
    pub fn mix_settings(&self) -> MixSettings {
        MixSettings {
            master_volume: self.master_volume,
            music_volume: self.music_volume,
            ambience_volume: self.ambience_volume,
            ..MixSettings::default()
        }
    }

    /// Every problem that would make the backend reject this composition.
    pub fn validation_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.scenes.len() != SCENE_COUNT {
            issues.push(format!(
                "expected {} scenes, found {}",
                SCENE_COUNT,
                self.scenes.len()
            ));
        }
        for (name, v) in [
            ("masterVolume", self.master_volume),
            ("musicVolume", self.music_volume),
            ("ambienceVolume", self.ambience_volume),
        ] {
            if !(0.0..=1.0).contains(&v) {
                issues.push(format!("{} {} outside [0, 1]", name, v));
            }
        }

        for (slot, scene) in self.scenes.iter().enumerate() {
            if scene.id != slot {
                issues.push(format!("scene at slot {} has id {}", slot, scene.id));
            }
            let mut seen = HashSet::new();
            for p in &scene.placed_sources {
                let at = format!("scene {} placement '{}'", slot, p.id);
                if !seen.insert(p.id.as_str()) {
                    issues.push(format!("{}: duplicate id", at));
                }
                if self.pack.find(&p.source_id).is_none() {
                    issues.push(format!(
                        "{}: source '{}' not in pack {}",
                        at, p.source_id, self.pack
                    ));
                }
                if !(0.0..=MAX_CANVAS_X).contains(&p.x) || !(0.0..=MAX_CANVAS_Y).contains(&p.y) {
                    issues.push(format!("{}: position ({}, {}) off canvas", at, p.x, p.y));
                }
                if !(0.0..=1.0).contains(&p.volume) {
                    issues.push(format!("{}: volume {} outside [0, 1]", at, p.volume));
                }
                if !(-1.0..=1.0).contains(&p.depth) {
                    issues.push(format!("{}: depth {} outside [-1, 1]", at, p.depth));
                }
            }
        }

        issues
    }

    pub fn validate(&self) -> Result<()> {
        let issues = self.validation_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SoundscapeError::Validation(issues.join("; ")))
        }
    }

    /// Build the scene bank, copying each source's category from the
    /// pack catalog.
    pub fn to_bank(&self) -> Result<SceneBank> {
        self.validate()?;

        let mut scenes = Vec::with_capacity(SCENE_COUNT);
        for record in &self.scenes {
            let mut scene = Scene::new();
            for p in &record.placed_sources {
                let category = self.pack.category_of(&p.source_id).ok_or_else(|| {
                    SoundscapeError::Validation(format!("Unknown source '{}'", p.source_id))
                })?;
                let mut placed =
                    PlacedSource::with_id(p.id.as_str(), p.source_id.as_str(), category, p.x, p.y);
                placed.volume = p.volume;
                placed.muted = p.muted;
                placed.depth = p.depth;
                scene.insert(placed)?;
            }
            scenes.push(scene);
        }

        let mut bank = SceneBank::new();
        bank.replace_all(scenes)?;
        Ok(bank)
    }

    /// Load this composition into a project, replacing its pack's bank and
    /// making that pack active.
    pub fn apply_to(&self, projects: &mut PackProjects) -> Result<()> {
        let bank = self.to_bank()?;
        *projects.bank_mut(self.pack) = bank;
        projects.switch_pack(self.pack);
        Ok(())
    }

    pub fn features(&self) -> CompositionFeatures {
        let mut all = HashSet::new();
        let mut placements = 0usize;
        for p in self.scenes.iter().flat_map(|s| s.placed_sources.iter()) {
            all.insert(p.source_id.as_str());
            placements += 1;
        }
        let count = |category: Category| {
            all.iter()
                .filter(|id| self.pack.category_of(id) == Some(category))
                .count()
        };

        CompositionFeatures {
            num_sources: all.len(),
            num_music_sources: count(Category::Music),
            num_ambience_sources: count(Category::Ambience),
            avg_sources_per_scene: placements as f64 / SCENE_COUNT as f64,
        }
    }
}
