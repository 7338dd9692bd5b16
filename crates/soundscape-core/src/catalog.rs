//! Packs, source categories and the static source catalog.
//!
//! The category of a source is an explicit attribute of the catalog entry.
//! Routing decisions read it from here (or from the placement that copied
//! it), never from the shape of the identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SoundscapeError;

/// Routing category of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Non-spatialized musical stems.
    Music,
    /// Spatialized ambience layers.
    Ambience,
}

impl Category {
    /// Both categories, in bus order.
    pub const ALL: [Category; 2] = [Category::Music, Category::Ambience];

    /// Whether sources of this category go through a 3D panner.
    #[inline]
    pub fn is_spatial(self) -> bool {
        matches!(self, Category::Ambience)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Music => "music",
            Category::Ambience => "ambience",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A themed content bundle with its own catalog and scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pack {
    #[default]
    Adventure,
    Combat,
    Shelter,
}

impl Pack {
    pub const ALL: [Pack; 3] = [Pack::Adventure, Pack::Combat, Pack::Shelter];

    pub fn as_str(self) -> &'static str {
        match self {
            Pack::Adventure => "adventure",
            Pack::Combat => "combat",
            Pack::Shelter => "shelter",
        }
    }

    /// The catalog of sources belonging to this pack.
    pub fn sources(self) -> &'static [Source] {
        match self {
            Pack::Adventure => ADVENTURE,
            Pack::Combat => COMBAT,
            Pack::Shelter => SHELTER,
        }
    }

    /// Look up a catalog entry by identifier.
    pub fn find(self, source_id: &str) -> Option<&'static Source> {
        self.sources().iter().find(|s| s.id == source_id)
    }

    /// Category of a catalog entry, if it exists in this pack.
    pub fn category_of(self, source_id: &str) -> Option<Category> {
        self.find(source_id).map(|s| s.category)
    }

    /// Catalog entries of one category.
    pub fn sources_in(self, category: Category) -> impl Iterator<Item = &'static Source> {
        self.sources().iter().filter(move |s| s.category == category)
    }
}

impl fmt::Display for Pack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pack {
    type Err = SoundscapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adventure" => Ok(Pack::Adventure),
            "combat" => Ok(Pack::Combat),
            "shelter" => Ok(Pack::Shelter),
            other => Err(SoundscapeError::InvalidParameter(format!(
                "Unknown pack '{}'",
                other
            ))),
        }
    }
}

/// A catalog entry. Immutable, supplied as static data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Source {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub icon: &'static str,
    /// Display color as `#rrggbb`.
    pub color: &'static str,
}

const fn src(
    id: &'static str,
    name: &'static str,
    category: Category,
    icon: &'static str,
    color: &'static str,
) -> Source {
    Source {
        id,
        name,
        category,
        icon,
        color,
    }
}

const ADVENTURE: &[Source] = &[
    src("adv-hero", "Hero", Category::Music, "🗡️", "#fde68a"),
    src("adv-drums", "Drums", Category::Music, "🥁", "#fcd34d"),
    src("adv-flute", "Flute", Category::Music, "🎺", "#fef3c7"),
    src("adv-strings", "Strings", Category::Music, "🎻", "#fef9c3"),
    src("adv-bass", "Bass", Category::Music, "🎸", "#fbbf24"),
    src("adv-harp", "Harp", Category::Music, "🪕", "#fef3c7"),
    src("adv-bell", "Bell", Category::Music, "🔔", "#fed7aa"),
    src("adv-horn", "Horn", Category::Music, "📯", "#fdba74"),
    src("adv-choir", "Choir", Category::Music, "🎵", "#fde68a"),
    src("adv-piano", "Piano", Category::Music, "🎹", "#fcd34d"),
    src("adv-guitar", "Guitar", Category::Music, "🎼", "#fef3c7"),
    src("adv-violin", "Violin", Category::Music, "🎶", "#fef9c3"),
    src("adv-trumpet", "Trumpet", Category::Music, "🎺", "#fbbf24"),
    src("adv-lute", "Lute", Category::Music, "🪈", "#fef3c7"),
    src("adv-melody", "Melody", Category::Music, "🎵", "#fed7aa"),
    src("adv-rhythm", "Rhythm", Category::Music, "🥁", "#fdba74"),
    src("adv-footstep", "Footstep", Category::Ambience, "👣", "#fbbf24"),
    src("adv-birds", "Birds", Category::Ambience, "🐦", "#fde047"),
    src("adv-horse", "Horse", Category::Ambience, "🐴", "#fbbf24"),
    src("adv-walla", "Walla", Category::Ambience, "🗣️", "#fef08a"),
    src("adv-river", "River", Category::Ambience, "🌊", "#fef3c7"),
    src("adv-buggy", "Buggy", Category::Ambience, "🛒", "#facc15"),
    src("adv-sheep", "Sheep", Category::Ambience, "🐑", "#fef9c3"),
    src("adv-wolf", "Wolf", Category::Ambience, "🐺", "#fb923c"),
    src("adv-night", "Night", Category::Ambience, "🦗", "#fed7aa"),
    src("adv-frog", "Frog", Category::Ambience, "🐸", "#fdba74"),
];

const COMBAT: &[Source] = &[
    src("cmb-warrior", "Warrior", Category::Music, "⚔️", "#fed7aa"),
    src("cmb-drums", "War Drums", Category::Music, "🥁", "#fdba74"),
    src("cmb-horn", "Horn", Category::Music, "📯", "#fb923c"),
    src("cmb-bass", "Heavy Bass", Category::Music, "🎸", "#f97316"),
    src("cmb-synth", "Synth", Category::Music, "🎹", "#fdba74"),
    src("cmb-guitar", "Guitar", Category::Music, "🎼", "#fed7aa"),
    src("cmb-choir", "Choir", Category::Music, "🎵", "#ffedd5"),
    src("cmb-epic", "Epic", Category::Music, "🎭", "#fb923c"),
    src("cmb-percussion", "Percussion", Category::Music, "🥁", "#fed7aa"),
    src("cmb-brass", "Brass", Category::Music, "🎺", "#fdba74"),
    src("cmb-strings", "Strings", Category::Music, "🎻", "#fb923c"),
    src("cmb-power", "Power", Category::Music, "⚡", "#f97316"),
    src("cmb-march", "March", Category::Music, "🎵", "#fdba74"),
    src("cmb-metal", "Metal", Category::Music, "🎸", "#fed7aa"),
    src("cmb-orchestra", "Orchestra", Category::Music, "🎼", "#ffedd5"),
    src("cmb-battle", "Battle", Category::Music, "⚔️", "#fb923c"),
    src("cmb-clash", "Sword Clash", Category::Ambience, "⚡", "#fbbf24"),
    src("cmb-fire", "Fire", Category::Ambience, "🔥", "#f59e0b"),
    src("cmb-roar", "Monster", Category::Ambience, "👹", "#dc2626"),
    src("cmb-thunder", "Thunder", Category::Ambience, "⚡", "#fcd34d"),
    src("cmb-shield", "Shield", Category::Ambience, "🛡️", "#d97706"),
    src("cmb-explosion", "Explosion", Category::Ambience, "💥", "#ef4444"),
    src("cmb-arrow", "Arrow", Category::Ambience, "🏹", "#fb923c"),
    src("cmb-cry", "Battle Cry", Category::Ambience, "🗣️", "#f97316"),
    src("cmb-magic", "Magic", Category::Ambience, "✨", "#a855f7"),
    src("cmb-wind", "Wind", Category::Ambience, "💨", "#fde68a"),
    src("cmb-dragon", "Dragon", Category::Ambience, "🐉", "#dc2626"),
    src("cmb-armor", "Armor", Category::Ambience, "🛡️", "#fed7aa"),
    src("cmb-footsteps", "Steps", Category::Ambience, "👢", "#fdba74"),
    src("cmb-spell", "Spell", Category::Ambience, "🔮", "#8b5cf6"),
    src("cmb-wolf", "Wolf", Category::Ambience, "🐺", "#fb923c"),
    src("cmb-clash2", "Metal Clash", Category::Ambience, "⚔️", "#f97316"),
];

const SHELTER: &[Source] = &[
    src("shl-melody", "Melody", Category::Music, "🎼", "#fde68a"),
    src("shl-piano", "Piano", Category::Music, "🎹", "#fcd34d"),
    src("shl-harp", "Harp", Category::Music, "🪕", "#fef3c7"),
    src("shl-pad", "Pad", Category::Music, "🌊", "#fef9c3"),
    src("shl-chime", "Chimes", Category::Music, "🔔", "#fbbf24"),
    src("shl-flute", "Flute", Category::Music, "🎵", "#fef3c7"),
    src("shl-violin", "Violin", Category::Music, "🎻", "#fed7aa"),
    src("shl-cello", "Cello", Category::Music, "🎸", "#fdba74"),
    src("shl-strings", "Strings", Category::Music, "🎶", "#fde68a"),
    src("shl-lullaby", "Lullaby", Category::Music, "🌙", "#fcd34d"),
    src("shl-music-box", "Music Box", Category::Music, "🎁", "#fef3c7"),
    src("shl-kalimba", "Kalimba", Category::Music, "🎵", "#fef9c3"),
    src("shl-ambient", "Ambient", Category::Music, "🌌", "#fbbf24"),
    src("shl-bell", "Bell", Category::Music, "🔔", "#fef3c7"),
    src("shl-warm", "Warm Pad", Category::Music, "☁️", "#fed7aa"),
    src("shl-gentle", "Gentle", Category::Music, "🎼", "#fdba74"),
    src("shl-fireplace", "Fireplace", Category::Ambience, "🔥", "#f97316"),
    src("shl-rain", "Rain", Category::Ambience, "🌧️", "#fde047"),
    src("shl-night", "Night", Category::Ambience, "🌙", "#fef08a"),
    src("shl-wood", "Wood Creak", Category::Ambience, "🪵", "#facc15"),
    src("shl-candle", "Candle", Category::Ambience, "🕯️", "#fef9c3"),
    src("shl-book", "Book Page", Category::Ambience, "📖", "#fbbf24"),
    src("shl-cat", "Cat Purr", Category::Ambience, "🐱", "#eab308"),
    src("shl-tea", "Tea Cup", Category::Ambience, "☕", "#fde047"),
    src("shl-clock", "Clock", Category::Ambience, "🕰️", "#fde68a"),
    src("shl-wind-chime", "Wind Chime", Category::Ambience, "🎐", "#fcd34d"),
    src("shl-water", "Water", Category::Ambience, "💧", "#fef3c7"),
    src("shl-bird", "Bird", Category::Ambience, "🐦", "#fef9c3"),
    src("shl-leaves", "Leaves", Category::Ambience, "🍂", "#fbbf24"),
    src("shl-cricket", "Cricket", Category::Ambience, "🦗", "#fef3c7"),
    src("shl-wind", "Wind", Category::Ambience, "💨", "#fed7aa"),
    src("shl-door", "Door Creak", Category::Ambience, "🚪", "#fdba74"),
];
