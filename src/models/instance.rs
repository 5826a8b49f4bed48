use crate::models::blueprint::{ItemBlueprint, MobBlueprint};
use crate::models::inventory::{Equipment, Inventory};
use crate::models::types::InstanceId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Item instance in the game world. Lives in exactly one container at a time.
#[derive(Debug)]
pub struct ItemInstance {
    /// Instance ID, unique across the process
    pub id: InstanceId,
    /// Blueprint this instance was created from
    pub blueprint_id: String,
    /// Resolved blueprint (never dangling: an instance is only created from a resolved blueprint)
    pub blueprint: Arc<ItemBlueprint>,
    state: RwLock<ItemState>,
}

/// Mutable part of an item instance.
#[derive(Debug, Clone)]
pub struct ItemState {
    /// Wear and tear, 0-100
    pub condition: u8,
    /// Items that came bundled with this one (scope on a rifle, batteries in a torch)
    pub attachments: Vec<Arc<ItemInstance>>,
}

impl ItemInstance {
    pub fn new(id: InstanceId, blueprint: Arc<ItemBlueprint>, attachments: Vec<Arc<ItemInstance>>) -> Self {
        Self {
            id,
            blueprint_id: blueprint.id.clone(),
            state: RwLock::new(ItemState {
                condition: blueprint.condition,
                attachments,
            }),
            blueprint,
        }
    }

    pub fn name(&self) -> &str {
        &self.blueprint.name
    }

    pub fn weight(&self) -> f64 {
        self.blueprint.weight
    }

    pub fn condition(&self) -> u8 {
        self.state.read().condition
    }

    pub fn set_condition(&self, condition: u8) {
        self.state.write().condition = condition.min(100);
    }

    pub fn attachments(&self) -> Vec<Arc<ItemInstance>> {
        self.state.read().attachments.clone()
    }

    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            id: self.id,
            blueprint: self.blueprint_id.clone(),
            condition: self.condition(),
        }
    }
}

/// How an item instance is written out as part of a character record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: InstanceId,
    pub blueprint: String,
    #[serde(default = "full_condition")]
    pub condition: u8,
}

fn full_condition() -> u8 {
    100
}

/// A creature living in a room.
#[derive(Debug)]
pub struct MobInstance {
    pub id: InstanceId,
    pub blueprint_id: String,
    pub blueprint: Arc<MobBlueprint>,
    state: RwLock<MobState>,
}

#[derive(Debug)]
pub struct MobState {
    pub health: u32,
    pub inventory: Inventory,
    pub equipment: Equipment,
}

impl MobInstance {
    pub fn new(id: InstanceId, blueprint: Arc<MobBlueprint>) -> Self {
        Self {
            id,
            blueprint_id: blueprint.id.clone(),
            state: RwLock::new(MobState {
                health: blueprint.health,
                inventory: Inventory::new(),
                equipment: Equipment::new(),
            }),
            blueprint,
        }
    }

    pub fn name(&self) -> &str {
        &self.blueprint.name
    }

    pub fn health(&self) -> u32 {
        self.state.read().health
    }

    /// Run `f` with exclusive access to the mob's containers. Do not await inside.
    pub fn with_state_mut<R>(&self, f: impl FnOnce(&mut MobState) -> R) -> R {
        let mut g = self.state.write();
        f(&mut g)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&MobState) -> R) -> R {
        let g = self.state.read();
        f(&g)
    }
}
