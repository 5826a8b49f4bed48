use crate::models::blueprint::DoorBlueprint;
use crate::models::character::Character;
use crate::models::instance::{ItemInstance, MobInstance};
use crate::models::inventory::Inventory;
use crate::models::types::{CharacterId, InstanceId};
use crate::net::output::OutputHandle;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use thiserror::Error;

/// A location node in the world graph.
///
/// Everything that changes at runtime (exits, occupants, items on the floor) lives behind a
/// single lock. Lock order when a character is involved is always Room, then Character.
#[derive(Debug)]
pub struct Room {
    /// Globally unique `area:room` key
    pub key: String,
    pub area: String,
    /// Id inside the area
    pub id: String,
    pub name: String,
    pub description: String,
    inner: RwLock<RoomInner>,
}

#[derive(Debug, Default)]
struct RoomInner {
    exits: BTreeMap<String, Exit>,
    characters: Vec<Arc<Character>>,
    mobs: Vec<Arc<MobInstance>>,
    items: Inventory,
}

/// A one-way connection to a neighbouring room.
#[derive(Debug, Clone)]
pub struct Exit {
    pub direction: String,
    /// Qualified key of the neighbour
    pub to: String,
    /// Rooms own each other in cycles, so exits only hold weak references
    pub target: Weak<Room>,
    /// Shared with the reciprocal exit in the neighbour, if it has one
    pub door: Option<Arc<Door>>,
}

impl Exit {
    pub fn target(&self) -> Option<Arc<Room>> {
        self.target.upgrade()
    }

    /// True when there is a door and it is not open.
    pub fn is_blocked(&self) -> bool {
        self.door.as_ref().is_some_and(|d| d.state() != DoorState::Open)
    }
}

impl Room {
    pub fn new(area: &str, id: &str, name: &str, description: &str) -> Self {
        Self {
            key: crate::models::types::room_key(area, id),
            area: area.to_string(),
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            inner: RwLock::new(RoomInner::default()),
        }
    }

    pub fn add_exit(&self, exit: Exit) {
        self.inner.write().exits.insert(exit.direction.clone(), exit);
    }

    pub fn exit(&self, direction: &str) -> Option<Exit> {
        self.inner.read().exits.get(direction).cloned()
    }

    pub fn has_exit(&self, direction: &str) -> bool {
        self.inner.read().exits.contains_key(direction)
    }

    pub fn exits(&self) -> Vec<Exit> {
        self.inner.read().exits.values().cloned().collect()
    }

    /// The exit in this room leading to `key`, if any. Used when pairing doors and when
    /// notifying the far side of a door.
    pub fn exit_to(&self, key: &str) -> Option<Exit> {
        self.inner.read().exits.values().find(|e| e.to == key).cloned()
    }

    /// Attach a door to an existing exit. Returns false if there is no such exit.
    pub fn set_door(&self, direction: &str, door: Arc<Door>) -> bool {
        match self.inner.write().exits.get_mut(direction) {
            Some(exit) => {
                exit.door = Some(door);
                true
            }
            None => false,
        }
    }

    // -- characters ----------------------------------------------------------------------

    /// Add `character` to the occupants and point its room reference here, as one step under
    /// this room's lock. Adding someone already present only refreshes the pointer.
    pub fn admit(self: &Arc<Self>, character: &Arc<Character>) {
        let mut inner = self.inner.write();
        if !inner.characters.iter().any(|c| Arc::ptr_eq(c, character)) {
            inner.characters.push(character.clone());
        }
        character.set_room(Some(self.clone()));
    }

    pub fn add_character(self: &Arc<Self>, character: &Arc<Character>) {
        self.admit(character);
    }

    /// Remove the character from the occupants. The character's room pointer is left alone;
    /// whoever moves it sets the new one.
    pub fn remove_character(&self, id: CharacterId) -> Option<Arc<Character>> {
        let mut inner = self.inner.write();
        let idx = inner.characters.iter().position(|c| c.id == id)?;
        Some(inner.characters.remove(idx))
    }

    pub fn contains_character(&self, id: CharacterId) -> bool {
        self.inner.read().characters.iter().any(|c| c.id == id)
    }

    pub fn characters(&self) -> Vec<Arc<Character>> {
        self.inner.read().characters.clone()
    }

    pub fn find_character(&self, name: &str) -> Option<Arc<Character>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let inner = self.inner.read();
        inner
            .characters
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
            .or_else(|| inner.characters.iter().find(|c| c.name.to_lowercase().starts_with(&needle)))
            .cloned()
    }

    // -- mobs ----------------------------------------------------------------------------

    pub fn add_mob(&self, mob: Arc<MobInstance>) {
        let mut inner = self.inner.write();
        if !inner.mobs.iter().any(|m| Arc::ptr_eq(m, &mob)) {
            inner.mobs.push(mob);
        }
    }

    pub fn remove_mob(&self, id: InstanceId) -> Option<Arc<MobInstance>> {
        let mut inner = self.inner.write();
        let idx = inner.mobs.iter().position(|m| m.id == id)?;
        Some(inner.mobs.remove(idx))
    }

    pub fn mobs(&self) -> Vec<Arc<MobInstance>> {
        self.inner.read().mobs.clone()
    }

    pub fn find_mob(&self, name: &str) -> Option<Arc<MobInstance>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.inner.read().mobs.iter().find(|m| m.blueprint.matches(&needle)).cloned()
    }

    // -- items ---------------------------------------------------------------------------

    pub fn add_item(&self, item: Arc<ItemInstance>) -> bool {
        self.inner.write().items.add(item)
    }

    pub fn remove_item(&self, item: &Arc<ItemInstance>) -> bool {
        self.inner.write().items.remove(item)
    }

    pub fn items(&self) -> Vec<Arc<ItemInstance>> {
        self.inner.read().items.items().to_vec()
    }

    pub fn find_items(&self, query: &str) -> Vec<Arc<ItemInstance>> {
        self.inner.read().items.search(query)
    }

    /// Run `f` with the floor inventory locked for writing. Do not await inside; a character
    /// lock may be taken within `f` (Room before Character).
    pub fn with_items_mut<R>(&self, f: impl FnOnce(&mut Inventory) -> R) -> R {
        let mut inner = self.inner.write();
        f(&mut inner.items)
    }

    // -- broadcast -----------------------------------------------------------------------

    /// Output handles of everyone present except `exclude`, taken under a read lock.
    fn recipients(&self, exclude: &[CharacterId]) -> Vec<OutputHandle> {
        let inner = self.inner.read();
        inner
            .characters
            .iter()
            .filter(|c| !exclude.contains(&c.id))
            .filter_map(|c| c.output())
            .collect()
    }

    /// Send a line to every occupant except the excluded ids. The occupant list is
    /// snapshotted first and the lock released before anything is queued. Occupants whose
    /// output queue is full miss the line. Returns how many received it.
    pub fn broadcast(&self, message: &str, exclude: &[CharacterId]) -> usize {
        self.recipients(exclude)
            .iter()
            .filter(|out| out.notify(message))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Closed,
    Locked,
}

impl std::fmt::Display for DoorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DoorState::Open => write!(f, "open"),
            DoorState::Closed => write!(f, "closed"),
            DoorState::Locked => write!(f, "locked"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DoorError {
    #[error("It is already open.")]
    AlreadyOpen,
    #[error("It is already closed.")]
    AlreadyClosed,
    #[error("It is already locked.")]
    AlreadyLocked,
    #[error("It is not locked.")]
    NotLocked,
    #[error("It is locked.")]
    Locked,
    #[error("You need to close it first.")]
    NotClosed,
    #[error("You do not have the right key.")]
    NoKey,
    #[error("You fail to pick the lock.")]
    PickFailed,
}

/// One physical door, shared by the exits on both sides.
#[derive(Debug)]
pub struct Door {
    state: RwLock<DoorState>,
    /// Item blueprint ids that fit the lock
    pub keys: Vec<String>,
    pub pick_difficulty: u8,
}

impl Door {
    pub fn new(state: DoorState, keys: Vec<String>, pick_difficulty: u8) -> Self {
        Self {
            state: RwLock::new(state),
            keys,
            pick_difficulty,
        }
    }

    pub fn from_blueprint(bp: &DoorBlueprint) -> Self {
        let state = if bp.locked {
            DoorState::Locked
        } else if bp.closed {
            DoorState::Closed
        } else {
            DoorState::Open
        };
        Self::new(state, bp.keys.clone(), bp.pick_difficulty)
    }

    pub fn state(&self) -> DoorState {
        *self.state.read()
    }

    fn fits(&self, held: &[String]) -> bool {
        held.iter().any(|k| self.keys.contains(k))
    }

    pub fn open(&self) -> Result<(), DoorError> {
        let mut state = self.state.write();
        match *state {
            DoorState::Open => Err(DoorError::AlreadyOpen),
            DoorState::Locked => Err(DoorError::Locked),
            DoorState::Closed => {
                *state = DoorState::Open;
                Ok(())
            }
        }
    }

    pub fn close(&self) -> Result<(), DoorError> {
        let mut state = self.state.write();
        match *state {
            DoorState::Open => {
                *state = DoorState::Closed;
                Ok(())
            }
            _ => Err(DoorError::AlreadyClosed),
        }
    }

    /// `held` are the blueprint ids of the items the actor carries.
    pub fn lock(&self, held: &[String]) -> Result<(), DoorError> {
        let mut state = self.state.write();
        match *state {
            DoorState::Open => Err(DoorError::NotClosed),
            DoorState::Locked => Err(DoorError::AlreadyLocked),
            DoorState::Closed if !self.fits(held) => Err(DoorError::NoKey),
            DoorState::Closed => {
                *state = DoorState::Locked;
                Ok(())
            }
        }
    }

    pub fn unlock(&self, held: &[String]) -> Result<(), DoorError> {
        let mut state = self.state.write();
        match *state {
            DoorState::Locked if !self.fits(held) => Err(DoorError::NoKey),
            DoorState::Locked => {
                *state = DoorState::Closed;
                Ok(())
            }
            _ => Err(DoorError::NotLocked),
        }
    }

    /// `roll` is uniform over 1..=100; the lock gives when it beats the difficulty.
    pub fn pick(&self, roll: u8) -> Result<(), DoorError> {
        let mut state = self.state.write();
        match *state {
            DoorState::Locked if roll > self.pick_difficulty => {
                *state = DoorState::Closed;
                Ok(())
            }
            DoorState::Locked => Err(DoorError::PickFailed),
            _ => Err(DoorError::NotLocked),
        }
    }
}
