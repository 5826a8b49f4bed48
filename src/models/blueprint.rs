//! Authored templates. Everything in here is deserialized once at startup and shared
//! read-only (behind `Arc`) for the rest of the process lifetime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn one() -> u32 {
    1
}

fn always() -> u8 {
    100
}

fn default_capacity() -> f64 {
    50.0
}

fn default_health() -> u32 {
    10
}

/// Metatype (species) template. Decides the base carrying capacity of a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metatype {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_capacity")]
    pub carry_capacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quality {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Karma cost; negative qualities carry a negative cost
    #[serde(default)]
    pub cost: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// Pre-generated archetype offered during character creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pregen {
    pub id: String,
    pub name: String,
    /// One paragraph shown before the player confirms the choice
    #[serde(default)]
    pub summary: String,
    pub metatype: String,
    #[serde(default)]
    pub qualities: Vec<String>,
    #[serde(default)]
    pub skills: BTreeMap<String, u8>,
    /// Item blueprint ids placed in the new character's inventory
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaManifest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemBlueprint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Extra words this item answers to when searched
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub weight: f64,
    /// Equipment slots this item may be worn in
    #[serde(default)]
    pub slots: Vec<String>,
    /// Item blueprint ids instantiated together with this item
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Starting condition of fresh instances (0-100)
    #[serde(default = "always")]
    pub condition: u8,
}

impl ItemBlueprint {
    /// Case-insensitive substring match against name and tags. `needle` must be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(needle) || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }

    pub fn fits_slot(&self, slot: &str) -> bool {
        self.slots.iter().any(|s| s.eq_ignore_ascii_case(slot))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobBlueprint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_health")]
    pub health: u32,
}

impl MobBlueprint {
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomBlueprint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Direction label to exit definition
    #[serde(default)]
    pub exits: BTreeMap<String, ExitBlueprint>,
    #[serde(default)]
    pub spawns: Vec<SpawnEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitBlueprint {
    /// Local room id or `area:room`
    pub to: String,
    #[serde(default)]
    pub door: Option<DoorBlueprint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DoorBlueprint {
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub locked: bool,
    /// Item blueprint ids that operate the lock
    #[serde(default)]
    pub keys: Vec<String>,
    /// A pick attempt succeeds when a 1..=100 roll exceeds this
    #[serde(default)]
    pub pick_difficulty: u8,
}

/// One line of a room's spawn list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpawnEntry {
    Item(ItemSpawn),
    Mob(MobSpawn),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpawn {
    pub id: String,
    #[serde(default = "one")]
    pub quantity: u32,
    /// Percent chance per unit; 100 always spawns, 0 never does
    #[serde(default = "always")]
    pub chance: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobSpawn {
    pub id: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default = "always")]
    pub chance: u8,
    /// Items carried by each spawned mob
    #[serde(default)]
    pub inventory: Vec<ItemSpawn>,
    /// Items worn by each spawned mob
    #[serde(default)]
    pub equipment: Vec<EquipSpawn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipSpawn {
    pub slot: String,
    pub id: String,
    #[serde(default = "always")]
    pub chance: u8,
}
