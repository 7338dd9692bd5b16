//! Scenes and the fixed bank of scene slots.

use serde::{Deserialize, Serialize};
use soundscape_core::{Category, Result, SoundscapeError, Source, SCENE_COUNT};

use crate::placed::{PlacedSource, PlacedSourceId};

/// Whether edits to an ambience placement affect one scene or all scenes
/// containing the same placement id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbienceScope {
    #[default]
    PerScene,
    Global,
}

/// A set of placed sources.
///
/// Ids are unique. Insertion order is kept for listing only; playback
/// treats the scene as a set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    placed: Vec<PlacedSource>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a catalog source onto the canvas.
    pub fn place(&mut self, source: &Source, x: f64, y: f64) -> PlacedSourceId {
        let placed = PlacedSource::new(source, x, y);
        let id = placed.id.clone();
        self.placed.push(placed);
        id
    }

    /// Insert an existing placement. Rejects duplicate ids.
    pub fn insert(&mut self, placed: PlacedSource) -> Result<()> {
        if self.contains(&placed.id) {
            return Err(SoundscapeError::InvalidParameter(format!(
                "Duplicate placement id '{}'",
                placed.id
            )));
        }
        self.placed.push(placed);
        Ok(())
    }

    pub fn remove(&mut self, id: &PlacedSourceId) -> Option<PlacedSource> {
        let idx = self.placed.iter().position(|p| &p.id == id)?;
        Some(self.placed.remove(idx))
    }

    pub fn get(&self, id: &PlacedSourceId) -> Option<&PlacedSource> {
        self.placed.iter().find(|p| &p.id == id)
    }

    pub fn get_mut(&mut self, id: &PlacedSourceId) -> Option<&mut PlacedSource> {
        self.placed.iter_mut().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PlacedSourceId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedSource> {
        self.placed.iter()
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn clear(&mut self) {
        self.placed.clear();
    }

    pub fn count_in(&self, category: Category) -> usize {
        self.placed.iter().filter(|p| p.category() == category).count()
    }
}

/// The 16 scene slots of one pack. Never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBank {
    scenes: [Scene; SCENE_COUNT],
}

impl Default for SceneBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBank {
    pub fn new() -> Self {
        Self {
            scenes: std::array::from_fn(|_| Scene::default()),
        }
    }

    pub fn scene(&self, slot: usize) -> Option<&Scene> {
        self.scenes.get(slot)
    }

    pub fn scene_mut(&mut self, slot: usize) -> Option<&mut Scene> {
        self.scenes.get_mut(slot)
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut Scene> {
        self.scenes
            .get_mut(slot)
            .ok_or_else(|| SoundscapeError::InvalidParameter(format!("Scene slot {} out of range", slot)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// Replace every scene at once. The input must hold exactly 16 scenes.
    pub fn replace_all(&mut self, scenes: Vec<Scene>) -> Result<()> {
        let count = scenes.len();
        self.scenes = scenes.try_into().map_err(|_| {
            SoundscapeError::Validation(format!(
                "Expected {} scenes, got {}",
                SCENE_COUNT, count
            ))
        })?;
        Ok(())
    }

    pub fn clear_all(&mut self) {
        for scene in &mut self.scenes {
            scene.clear();
        }
    }

    /// Total placements across all scenes.
    pub fn placement_count(&self) -> usize {
        self.scenes.iter().map(Scene::len).sum()
    }

    /// Apply an edit to a placement. With `AmbienceScope::Global` an edit
    /// to an ambience placement is applied to every scene holding the same
    /// id. Returns how many placements were changed.
    pub fn edit<F>(
        &mut self,
        slot: usize,
        id: &PlacedSourceId,
        scope: AmbienceScope,
        mut f: F,
    ) -> Result<usize>
    where
        F: FnMut(&mut PlacedSource),
    {
        let placed = self
            .slot_mut(slot)?
            .get_mut(id)
            .ok_or_else(|| SoundscapeError::NotFound(format!("Placement '{}'", id)))?;
        f(placed);
        if !self.is_global(slot, id, scope) {
            return Ok(1);
        }

        let mut changed = 1;
        for (i, scene) in self.scenes.iter_mut().enumerate() {
            if i == slot {
                continue;
            }
            if let Some(other) = scene.get_mut(id) {
                f(other);
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Remove a placement, honoring the ambience scope.
    pub fn remove(
        &mut self,
        slot: usize,
        id: &PlacedSourceId,
        scope: AmbienceScope,
    ) -> Result<usize> {
        let global = self.is_global(slot, id, scope);
        let removed = self.slot_mut(slot)?.remove(id);
        if removed.is_none() {
            return Err(SoundscapeError::NotFound(format!("Placement '{}'", id)));
        }
        if !global {
            return Ok(1);
        }
        let others = self
            .scenes
            .iter_mut()
            .filter_map(|scene| scene.remove(id))
            .count();
        Ok(1 + others)
    }

    pub fn move_source(
        &mut self,
        slot: usize,
        id: &PlacedSourceId,
        x: f64,
        y: f64,
        scope: AmbienceScope,
    ) -> Result<usize> {
        self.edit(slot, id, scope, |p| p.move_to(x, y))
    }

    pub fn set_depth(
        &mut self,
        slot: usize,
        id: &PlacedSourceId,
        depth: f64,
        scope: AmbienceScope,
    ) -> Result<usize> {
        self.edit(slot, id, scope, |p| p.set_depth(depth))
    }

    pub fn set_volume(
        &mut self,
        slot: usize,
        id: &PlacedSourceId,
        volume: f64,
        scope: AmbienceScope,
    ) -> Result<usize> {
        self.edit(slot, id, scope, |p| p.set_volume(volume))
    }

    /// Flip the mute flag. Every affected placement takes the new value of
    /// the edited one, so global edits stay in sync.
    pub fn toggle_mute(
        &mut self,
        slot: usize,
        id: &PlacedSourceId,
        scope: AmbienceScope,
    ) -> Result<usize> {
        let muted = !self
            .scene(slot)
            .and_then(|s| s.get(id))
            .map(|p| p.muted)
            .ok_or_else(|| SoundscapeError::NotFound(format!("Placement '{}'", id)))?;
        self.edit(slot, id, scope, |p| p.muted = muted)
    }

    fn is_global(&self, slot: usize, id: &PlacedSourceId, scope: AmbienceScope) -> bool {
        scope == AmbienceScope::Global
            && self
                .scene(slot)
                .and_then(|s| s.get(id))
                .map(|p| p.category() == Category::Ambience)
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundscape_core::Pack;

    fn ambience(id: &str) -> PlacedSource {
        PlacedSource::with_id(id, "adv-river", Category::Ambience, 10.0, 10.0)
    }

    fn music(id: &str) -> PlacedSource {
        PlacedSource::with_id(id, "adv-hero", Category::Music, 10.0, 10.0)
    }

    #[test]
    fn test_bank_always_sixteen() {
        let mut bank = SceneBank::new();
        assert_eq!(bank.iter().count(), 16);
        assert!(bank.replace_all(vec![Scene::new(); 3]).is_err());
        assert_eq!(bank.iter().count(), 16);
        assert!(bank.replace_all(vec![Scene::new(); 16]).is_ok());
        assert!(bank.scene(16).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut scene = Scene::new();
        scene.insert(music("a")).unwrap();
        assert!(scene.insert(music("a")).is_err());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_same_source_placed_twice_is_two_placements() {
        let mut scene = Scene::new();
        let source = Pack::Combat.find("cmb-fire").unwrap();
        let a = scene.place(source, 1.0, 1.0);
        let b = scene.place(source, 2.0, 2.0);
        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.count_in(Category::Ambience), 2);
    }

    #[test]
    fn test_per_scene_edit_only_touches_slot() {
        let mut bank = SceneBank::new();
        bank.scene_mut(0).unwrap().insert(ambience("r")).unwrap();
        bank.scene_mut(1).unwrap().insert(ambience("r")).unwrap();

        let id = PlacedSourceId::from("r");
        let n = bank.move_source(0, &id, 50.0, 60.0, AmbienceScope::PerScene).unwrap();
        assert_eq!(n, 1);
        assert_eq!(bank.scene(1).unwrap().get(&id).unwrap().x, 10.0);
    }

    #[test]
    fn test_global_scope_applies_to_ambience_everywhere() {
        let mut bank = SceneBank::new();
        for slot in [0, 3, 7] {
            bank.scene_mut(slot).unwrap().insert(ambience("r")).unwrap();
        }
        let id = PlacedSourceId::from("r");

        assert_eq!(bank.toggle_mute(3, &id, AmbienceScope::Global).unwrap(), 3);
        assert!(bank.iter().filter_map(|s| s.get(&id)).all(|p| p.muted));

        assert_eq!(bank.remove(0, &id, AmbienceScope::Global).unwrap(), 3);
        assert_eq!(bank.placement_count(), 0);
    }

    #[test]
    fn test_global_scope_ignores_music() {
        let mut bank = SceneBank::new();
        bank.scene_mut(0).unwrap().insert(music("m")).unwrap();
        bank.scene_mut(1).unwrap().insert(music("m")).unwrap();
        let id = PlacedSourceId::from("m");
        assert_eq!(bank.set_volume(0, &id, 0.2, AmbienceScope::Global).unwrap(), 1);
        assert_eq!(bank.scene(1).unwrap().get(&id).unwrap().volume, 1.0);
    }

    #[test]
    fn test_clear_all_keeps_sixteen_empty_slots() {
        let mut bank = SceneBank::new();
        bank.scene_mut(0).unwrap().insert(music("a")).unwrap();
        bank.scene_mut(15).unwrap().insert(ambience("b")).unwrap();
        assert_eq!(bank.placement_count(), 2);

        bank.clear_all();
        assert_eq!(bank.placement_count(), 0);
        assert_eq!(bank.iter().count(), 16);
        assert!(bank.iter().all(Scene::is_empty));
    }

    #[test]
    fn test_missing_placement() {
        let mut bank = SceneBank::new();
        let id = PlacedSourceId::from("nope");
        assert!(bank.set_depth(0, &id, 0.5, AmbienceScope::PerScene).is_err());
        assert!(bank.remove(20, &id, AmbienceScope::PerScene).is_err());
    }
}
