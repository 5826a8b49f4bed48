use crate::models::instance::ItemRecord;
use crate::models::inventory::{Equipment, Inventory};
use crate::models::room::Room;
use crate::models::types::{CharacterId, Role};
use crate::net::output::OutputHandle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A player character. Identity is fixed; everything else sits behind locks.
///
/// Lock order: a Room lock may be held while taking any lock in here, never the other way
/// around.
#[derive(Debug)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Owning account (lowercase key)
    pub account: String,
    state: RwLock<CharacterState>,
    room: RwLock<Option<Arc<Room>>>,
    output: RwLock<Option<OutputHandle>>,
    online: AtomicBool,
}

#[derive(Debug)]
pub struct CharacterState {
    pub metatype: String,
    /// Pregen the character was created from
    pub archetype: String,
    pub role: Role,
    /// Last known room key, kept in sync on every move and used when loading
    pub room_key: String,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub qualities: Vec<String>,
    pub skills: BTreeMap<String, u8>,
    /// Free-form flags set by the world (e.g. "wanted")
    pub labels: Vec<String>,
    /// Attitude towards other characters by lowercase name
    pub dispositions: BTreeMap<String, i32>,
    pub carry_capacity: f64,
    pub history: VecDeque<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl CharacterState {
    pub fn carried_weight(&self) -> f64 {
        self.inventory.total_weight() + self.equipment.total_weight()
    }

    pub fn remaining_capacity(&self) -> f64 {
        (self.carry_capacity - self.carried_weight()).max(0.0)
    }
}

impl Character {
    pub fn new(id: CharacterId, name: &str, account: &str, state: CharacterState) -> Self {
        Self {
            id,
            name: name.to_string(),
            account: account.to_lowercase(),
            state: RwLock::new(state),
            room: RwLock::new(None),
            output: RwLock::new(None),
            online: AtomicBool::new(false),
        }
    }

    /// Storage key.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn room(&self) -> Option<Arc<Room>> {
        self.room.read().clone()
    }

    /// Only rooms call this while admitting; everyone else moves through the navigator.
    pub(crate) fn set_room(&self, room: Option<Arc<Room>>) {
        if let Some(r) = &room {
            self.state.write().room_key = r.key.clone();
        }
        *self.room.write() = room;
    }

    pub fn output(&self) -> Option<OutputHandle> {
        self.output.read().clone()
    }

    pub fn attach(&self, output: OutputHandle) {
        *self.output.write() = Some(output);
    }

    pub fn detach(&self) {
        *self.output.write() = None;
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    /// Claim the character for a connection. Fails if someone else is already playing it.
    pub fn try_go_online(&self) -> bool {
        self.online
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn role(&self) -> Role {
        self.state.read().role
    }

    pub fn room_key(&self) -> String {
        self.state.read().room_key.clone()
    }

    /// Run `f` with the character state locked for reading. Do not await inside.
    pub fn with_state<R>(&self, f: impl FnOnce(&CharacterState) -> R) -> R {
        let g = self.state.read();
        f(&g)
    }

    /// Run `f` with the character state locked for writing. Do not await inside.
    pub fn with_state_mut<R>(&self, f: impl FnOnce(&mut CharacterState) -> R) -> R {
        let mut g = self.state.write();
        f(&mut g)
    }

    /// Append a command line to the history, dropping the oldest entries beyond `max`.
    pub fn push_history(&self, line: &str, max: usize) {
        let mut st = self.state.write();
        st.history.push_back(line.to_string());
        while st.history.len() > max {
            st.history.pop_front();
        }
    }

    /// History entry by 1-based index, as shown by the `history` command.
    pub fn history_entry(&self, n: usize) -> Option<String> {
        if n == 0 {
            return None;
        }
        self.state.read().history.get(n - 1).cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.state.read().history.iter().cloned().collect()
    }

    /// Blueprint ids of everything carried or worn.
    pub fn held_item_ids(&self) -> Vec<String> {
        let st = self.state.read();
        let mut ids = st.inventory.blueprint_ids();
        ids.extend(st.equipment.iter().map(|(_, i)| i.blueprint_id.clone()));
        ids
    }

    pub fn to_record(&self) -> CharacterRecord {
        let room = self.room().map(|r| r.key.clone());
        let st = self.state.read();
        CharacterRecord {
            id: self.id,
            name: self.name.clone(),
            account: self.account.clone(),
            metatype: st.metatype.clone(),
            archetype: st.archetype.clone(),
            role: st.role,
            room: room.unwrap_or_else(|| st.room_key.clone()),
            carry_capacity: st.carry_capacity,
            qualities: st.qualities.clone(),
            skills: st.skills.clone(),
            labels: st.labels.clone(),
            dispositions: st.dispositions.clone(),
            inventory: st.inventory.items().iter().map(|i| i.to_record()).collect(),
            equipment: st.equipment.iter().map(|(s, i)| (s.clone(), i.to_record())).collect(),
            history: st.history.iter().cloned().collect(),
            created_at: st.created_at,
        }
    }
}

/// The persisted form of a character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: CharacterId,
    pub name: String,
    pub account: String,
    pub metatype: String,
    #[serde(default)]
    pub archetype: String,
    #[serde(default)]
    pub role: Role,
    /// Last known room key; empty means "use the starting room"
    #[serde(default)]
    pub room: String,
    pub carry_capacity: f64,
    #[serde(default)]
    pub qualities: Vec<String>,
    #[serde(default)]
    pub skills: BTreeMap<String, u8>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub dispositions: BTreeMap<String, i32>,
    #[serde(default)]
    pub inventory: Vec<ItemRecord>,
    #[serde(default)]
    pub equipment: BTreeMap<String, ItemRecord>,
    #[serde(default)]
    pub history: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
