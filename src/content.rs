//! The content registry: authored blueprints, the rooms built from them, live instances and
//! the index of characters currently in the world.
//!
//! Every table has its own lock, so a writer on one table never blocks readers of another.

use crate::error::{AppResult, DomainError};
use crate::models::blueprint::{
    AreaManifest, ItemBlueprint, Metatype, MobBlueprint, Pregen, Quality, RoomBlueprint, Skill, SkillGroup,
};
use crate::models::character::Character;
use crate::models::instance::{ItemInstance, MobInstance};
use crate::models::room::Room;
use crate::models::types::{CharacterId, InstanceId};
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

pub mod builder;
pub mod loader;

pub use builder::BuildReport;
pub use loader::LoadReport;

/// Attachments may themselves carry attachments; anything deeper than this is a content loop.
const MAX_ATTACHMENT_DEPTH: usize = 4;

/// Generates `add`/`get`/`remove`/`all` for one table.
macro_rules! table_ops {
    ($field:ident: $key:ty => $val:ty, $add:ident, $get:ident, $remove:ident, $all:ident) => {
        pub fn $add(&self, key: impl Into<$key>, value: Arc<$val>) -> Option<Arc<$val>> {
            self.$field.write().insert(key.into(), value)
        }

        pub fn $get<Q>(&self, key: &Q) -> Option<Arc<$val>>
        where
            $key: Borrow<Q>,
            Q: Hash + Eq + ?Sized,
        {
            self.$field.read().get(key).cloned()
        }

        pub fn $remove<Q>(&self, key: &Q) -> Option<Arc<$val>>
        where
            $key: Borrow<Q>,
            Q: Hash + Eq + ?Sized,
        {
            self.$field.write().remove(key)
        }

        pub fn $all(&self) -> Vec<Arc<$val>> {
            self.$field.read().values().cloned().collect()
        }
    };
}

#[derive(Default)]
pub struct ContentRegistry {
    metatypes: RwLock<HashMap<String, Arc<Metatype>>>,
    pregens: RwLock<HashMap<String, Arc<Pregen>>>,
    qualities: RwLock<HashMap<String, Arc<Quality>>>,
    skills: RwLock<HashMap<String, Arc<Skill>>>,
    skill_groups: RwLock<HashMap<String, Arc<SkillGroup>>>,
    areas: RwLock<HashMap<String, Arc<AreaManifest>>>,
    /// Keyed by qualified `area:room`
    room_blueprints: RwLock<HashMap<String, Arc<RoomBlueprint>>>,
    item_blueprints: RwLock<HashMap<String, Arc<ItemBlueprint>>>,
    mob_blueprints: RwLock<HashMap<String, Arc<MobBlueprint>>>,

    rooms: RwLock<HashMap<String, Arc<Room>>>,
    item_instances: RwLock<HashMap<InstanceId, Arc<ItemInstance>>>,
    mob_instances: RwLock<HashMap<InstanceId, Arc<MobInstance>>>,
    characters: RwLock<HashMap<CharacterId, Arc<Character>>>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    table_ops!(metatypes: String => Metatype, add_metatype, get_metatype, remove_metatype, metatypes);
    table_ops!(pregens: String => Pregen, add_pregen, get_pregen, remove_pregen, pregens);
    table_ops!(qualities: String => Quality, add_quality, get_quality, remove_quality, qualities);
    table_ops!(skills: String => Skill, add_skill, get_skill, remove_skill, skills);
    table_ops!(skill_groups: String => SkillGroup, add_skill_group, get_skill_group, remove_skill_group, skill_groups);
    table_ops!(areas: String => AreaManifest, add_area, get_area, remove_area, areas);
    table_ops!(room_blueprints: String => RoomBlueprint, add_room_blueprint, get_room_blueprint, remove_room_blueprint, room_blueprints);
    table_ops!(item_blueprints: String => ItemBlueprint, add_item_blueprint, get_item_blueprint, remove_item_blueprint, item_blueprints);
    table_ops!(mob_blueprints: String => MobBlueprint, add_mob_blueprint, get_mob_blueprint, remove_mob_blueprint, mob_blueprints);
    table_ops!(rooms: String => Room, add_room, get_room, remove_room, rooms);
    table_ops!(item_instances: InstanceId => ItemInstance, add_item_instance, get_item_instance, remove_item_instance, item_instances);
    table_ops!(mob_instances: InstanceId => MobInstance, add_mob_instance, get_mob_instance, remove_mob_instance, mob_instances);

    /// Pregens sorted by display name, for menus.
    pub fn pregens_sorted(&self) -> Vec<Arc<Pregen>> {
        let mut all = self.pregens();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Room blueprints together with their qualified key.
    pub fn room_blueprint_entries(&self) -> Vec<(String, Arc<RoomBlueprint>)> {
        let mut all: Vec<_> = self
            .room_blueprints
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Resolve `key`, falling back to `fallback` when it is empty or does not exist.
    pub fn resolve_room(&self, key: &str, fallback: &str) -> Option<Arc<Room>> {
        if !key.is_empty() {
            if let Some(room) = self.get_room(key) {
                return Some(room);
            }
            tracing::warn!(room = key, fallback, "room not found, using fallback");
        }
        self.get_room(fallback)
    }

    // -- instances -----------------------------------------------------------------------

    /// Build a fresh item instance (and its attachments) from a blueprint. The instance is
    /// not registered and not placed anywhere.
    pub fn create_item_instance(&self, blueprint: &Arc<ItemBlueprint>) -> Arc<ItemInstance> {
        self.create_item_with_id(InstanceId::new(), blueprint, 0)
    }

    fn create_item_with_id(&self, id: InstanceId, blueprint: &Arc<ItemBlueprint>, depth: usize) -> Arc<ItemInstance> {
        let mut attachments = Vec::new();
        if depth < MAX_ATTACHMENT_DEPTH {
            for att in &blueprint.attachments {
                match self.get_item_blueprint(att.as_str()) {
                    Some(bp) => attachments.push(self.create_item_with_id(InstanceId::new(), &bp, depth + 1)),
                    None => tracing::warn!(item = %blueprint.id, attachment = %att, "attachment blueprint not found"),
                }
            }
        } else if !blueprint.attachments.is_empty() {
            tracing::warn!(item = %blueprint.id, "attachments nested too deep, ignoring");
        }

        Arc::new(ItemInstance::new(id, blueprint.clone(), attachments))
    }

    pub fn create_mob_instance(&self, blueprint: &Arc<MobBlueprint>) -> Arc<MobInstance> {
        Arc::new(MobInstance::new(InstanceId::new(), blueprint.clone()))
    }

    /// Instantiate and register an item by blueprint id.
    pub fn spawn_item(&self, blueprint_id: &str) -> AppResult<Arc<ItemInstance>> {
        let bp = self
            .get_item_blueprint(blueprint_id)
            .ok_or_else(|| DomainError::NotFound(format!("item blueprint '{blueprint_id}'")))?;
        let item = self.create_item_instance(&bp);
        self.register_item(&item);
        Ok(item)
    }

    /// Instantiate and register a mob by blueprint id.
    pub fn spawn_mob(&self, blueprint_id: &str) -> AppResult<Arc<MobInstance>> {
        let bp = self
            .get_mob_blueprint(blueprint_id)
            .ok_or_else(|| DomainError::NotFound(format!("mob blueprint '{blueprint_id}'")))?;
        let mob = self.create_mob_instance(&bp);
        self.add_mob_instance(mob.id, mob.clone());
        Ok(mob)
    }

    /// Re-create a persisted item with its original instance id.
    pub fn restore_item(&self, id: InstanceId, blueprint_id: &str, condition: u8) -> AppResult<Arc<ItemInstance>> {
        let bp = self
            .get_item_blueprint(blueprint_id)
            .ok_or_else(|| DomainError::NotFound(format!("item blueprint '{blueprint_id}'")))?;
        let item = self.create_item_with_id(id, &bp, 0);
        item.set_condition(condition);
        self.register_item(&item);
        Ok(item)
    }

    fn register_item(&self, item: &Arc<ItemInstance>) {
        let tree = item_tree(item);
        let mut table = self.item_instances.write();
        for it in tree {
            table.insert(it.id, it);
        }
    }

    /// Drop `item` and everything attached to it from the instance table. Returns how many
    /// entries went away.
    pub fn unregister_item(&self, item: &Arc<ItemInstance>) -> usize {
        let tree = item_tree(item);
        let mut table = self.item_instances.write();
        tree.iter().filter(|it| table.remove(&it.id).is_some()).count()
    }

    /// Unregister everything `character` carries or wears. Used when it leaves the world.
    pub fn release_items(&self, character: &Character) -> usize {
        let items: Vec<_> = character.with_state(|st| {
            st.inventory
                .items()
                .iter()
                .cloned()
                .chain(st.equipment.iter().map(|(_, it)| it.clone()))
                .collect()
        });
        items.iter().map(|it| self.unregister_item(it)).sum()
    }

    // -- characters in the world -----------------------------------------------------------

    pub fn add_character(&self, character: Arc<Character>) {
        self.characters.write().insert(character.id, character);
    }

    /// Add `character` unless someone with the same name is already in the world. The check
    /// and the insert happen under one write lock.
    pub fn try_add_character(&self, character: Arc<Character>) -> bool {
        let mut table = self.characters.write();
        if table.values().any(|c| c.name.eq_ignore_ascii_case(&character.name)) {
            return false;
        }
        table.insert(character.id, character);
        true
    }

    pub fn get_character(&self, id: CharacterId) -> Option<Arc<Character>> {
        self.characters.read().get(&id).cloned()
    }

    pub fn remove_character(&self, id: CharacterId) -> Option<Arc<Character>> {
        self.characters.write().remove(&id)
    }

    pub fn find_character_by_name(&self, name: &str) -> Option<Arc<Character>> {
        self.characters
            .read()
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Characters currently online, sorted by name.
    pub fn online_characters(&self) -> Vec<Arc<Character>> {
        let mut online: Vec<_> = self
            .characters
            .read()
            .values()
            .filter(|c| c.is_online())
            .cloned()
            .collect();
        online.sort_by(|a, b| a.name.cmp(&b.name));
        online
    }
}

/// `item` followed by its attachments, depth first.
fn item_tree(item: &Arc<ItemInstance>) -> Vec<Arc<ItemInstance>> {
    let mut out = vec![item.clone()];
    for att in item.attachments() {
        out.extend(item_tree(&att));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_bp(id: &str, attachments: &[&str]) -> Arc<ItemBlueprint> {
        Arc::new(ItemBlueprint {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            tags: vec![],
            weight: 1.0,
            slots: vec![],
            attachments: attachments.iter().map(|s| s.to_string()).collect(),
            condition: 90,
        })
    }

    #[test]
    fn instances_get_fresh_ids_and_defaults() {
        let reg = ContentRegistry::new();
        reg.add_item_blueprint("scope", item_bp("scope", &[]));
        reg.add_item_blueprint("rifle", item_bp("rifle", &["scope", "ghost"]));

        let bp = reg.get_item_blueprint("rifle").unwrap();
        let a = reg.create_item_instance(&bp);
        let b = reg.create_item_instance(&bp);
        assert_ne!(a.id, b.id);
        assert_eq!(a.condition(), 90);
        // missing attachment blueprint is skipped
        assert_eq!(a.attachments().len(), 1);
        // create does not register
        assert!(reg.get_item_instance(&a.id).is_none());
    }

    #[test]
    fn spawn_registers_and_reports_missing() {
        let reg = ContentRegistry::new();
        reg.add_item_blueprint("rifle", item_bp("rifle", &[]));

        let item = reg.spawn_item("rifle").unwrap();
        assert!(reg.get_item_instance(&item.id).is_some());
        assert!(matches!(reg.spawn_item("nope"), Err(DomainError::NotFound(_))));

        reg.remove_item_instance(&item.id);
        assert!(reg.get_item_instance(&item.id).is_none());
    }

    #[test]
    fn unregister_takes_attachments_along() {
        let reg = ContentRegistry::new();
        reg.add_item_blueprint("lens", item_bp("lens", &[]));
        reg.add_item_blueprint("scope", item_bp("scope", &["lens"]));
        reg.add_item_blueprint("rifle", item_bp("rifle", &["scope"]));

        let rifle = reg.spawn_item("rifle").unwrap();
        let scope = rifle.attachments()[0].clone();
        let lens = scope.attachments()[0].clone();
        assert!(reg.get_item_instance(&lens.id).is_some());

        assert_eq!(reg.unregister_item(&rifle), 3);
        assert!(reg.get_item_instance(&rifle.id).is_none());
        assert!(reg.get_item_instance(&scope.id).is_none());
        assert!(reg.get_item_instance(&lens.id).is_none());
        assert_eq!(reg.unregister_item(&rifle), 0);
    }

    #[test]
    fn release_items_covers_inventory_and_equipment() {
        use crate::models::character::tests::blank_state;

        let reg = ContentRegistry::new();
        reg.add_item_blueprint("scope", item_bp("scope", &[]));
        let mut gun = (*item_bp("gun", &["scope"])).clone();
        gun.slots = vec!["hand".into()];
        reg.add_item_blueprint("gun", Arc::new(gun));

        let carried = reg.spawn_item("scope").unwrap();
        let worn = reg.spawn_item("gun").unwrap();
        let zed = Character::new(CharacterId::new(), "Zed", "alice", blank_state());
        zed.with_state_mut(|st| {
            st.inventory.add(carried.clone());
            st.equipment.equip("hand", worn.clone()).unwrap();
        });

        assert_eq!(reg.release_items(&zed), 3);
        assert!(reg.item_instances().is_empty());
    }

    #[test]
    fn self_attaching_blueprint_terminates() {
        let reg = ContentRegistry::new();
        reg.add_item_blueprint("matryoshka", item_bp("matryoshka", &["matryoshka"]));
        let item = reg.spawn_item("matryoshka").unwrap();
        assert_eq!(item.attachments().len(), 1);
    }

    #[test]
    fn same_name_cannot_enter_twice() {
        use crate::models::character::tests::blank_state;

        let reg = ContentRegistry::new();
        let a = Arc::new(Character::new(CharacterId::new(), "Zed", "alice", blank_state()));
        let b = Arc::new(Character::new(CharacterId::new(), "zed", "alice", blank_state()));
        assert!(reg.try_add_character(a.clone()));
        assert!(!reg.try_add_character(b));
        reg.remove_character(a.id);
        assert!(reg.find_character_by_name("ZED").is_none());
    }

    #[test]
    fn room_fallback() {
        let reg = ContentRegistry::new();
        reg.add_room("a:start", Arc::new(Room::new("a", "start", "Start", "")));
        assert_eq!(reg.resolve_room("", "a:start").unwrap().key, "a:start");
        assert_eq!(reg.resolve_room("gone:room", "a:start").unwrap().key, "a:start");
        assert!(reg.resolve_room("x:y", "x:z").is_none());
    }
}
