//! Per-pack projects.

use soundscape_core::Pack;
use crate::scene::{Scene, SceneBank};

/// Every pack owns an independent bank of 16 scenes. Exactly one pack is
/// active; switching swaps the active bank and preserves the others.
#[derive(Debug, Clone, PartialEq)]
pub struct PackProjects {
    banks: [SceneBank; 3],
    active: Pack,
}

impl PackProjects {
    pub fn new(active: Pack) -> Self {
        Self {
            banks: std::array::from_fn(|_| SceneBank::new()),
            active,
        }
    }

    #[inline]
    pub fn active_pack(&self) -> Pack {
        self.active
    }

    pub fn switch_pack(&mut self, pack: Pack) {
        self.active = pack;
    }

    pub fn bank(&self, pack: Pack) -> &SceneBank {
        &self.banks[bank_index(pack)]
    }

    pub fn bank_mut(&mut self, pack: Pack) -> &mut SceneBank {
        &mut self.banks[bank_index(pack)]
    }

    pub fn active_bank(&self) -> &SceneBank {
        self.bank(self.active)
    }

    pub fn active_bank_mut(&mut self) -> &mut SceneBank {
        self.bank_mut(self.active)
    }

    /// Scene `slot` of the active pack.
    pub fn current_scene(&self, slot: usize) -> Option<&Scene> {
        self.active_bank().scene(slot)
    }
}

fn bank_index(pack: Pack) -> usize {
    match pack {
        Pack::Adventure => 0,
        Pack::Combat => 1,
        Pack::Shelter => 2,
    }
}

impl Default for PackProjects {
    fn default() -> Self {
        Self::new(Pack::default())
    }
}
