use crate::content::ContentRegistry;
use crate::models::blueprint::{ItemSpawn, MobSpawn, SpawnEntry};
use crate::models::instance::{ItemInstance, MobInstance};
use crate::models::inventory::EquipError;
use crate::models::room::{Door, Exit, Room};
use crate::models::types::{normalize_dir, qualify_room_key};
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct BuildReport {
    pub rooms: usize,
    pub exits: usize,
    /// Exits whose target room does not exist
    pub dropped_exits: usize,
    pub doors: usize,
    pub items_spawned: usize,
    pub mobs_spawned: usize,
    /// Spawn units skipped because of a missing blueprint or an occupied/invalid slot
    pub spawns_skipped: usize,
}

/// Roll a percentage chance. 100 (or more) always succeeds, 0 never does.
pub fn roll_chance(rng: &mut impl Rng, chance: u8) -> bool {
    match chance {
        0 => false,
        c if c >= 100 => true,
        c => rng.random_range(0..100u8) < c,
    }
}

impl ContentRegistry {
    /// Second load pass: create a live room per room blueprint, resolve exits, share doors
    /// between reciprocal exits and resolve spawn lists into instances.
    pub fn build_rooms(&self, rng: &mut impl Rng) -> BuildReport {
        let mut report = BuildReport::default();
        let blueprints = self.room_blueprint_entries();

        for (key, bp) in &blueprints {
            let area = key.split_once(':').map(|(a, _)| a).unwrap_or(key.as_str());
            self.add_room(key.clone(), Arc::new(Room::new(area, &bp.id, &bp.name, &bp.description)));
            report.rooms += 1;
        }

        // exits
        for (key, bp) in &blueprints {
            let Some(room) = self.get_room(key.as_str()) else { continue };
            for (dir, exit_bp) in &bp.exits {
                let target_key = qualify_room_key(&room.area, &exit_bp.to);
                let Some(target) = self.get_room(target_key.as_str()) else {
                    tracing::warn!(room = %key, direction = %dir, target = %target_key, "exit target not found, dropping exit");
                    report.dropped_exits += 1;
                    continue;
                };
                room.add_exit(Exit {
                    direction: normalize_dir(dir),
                    to: target_key,
                    target: Arc::downgrade(&target),
                    door: None,
                });
                report.exits += 1;
            }
        }

        // doors: whoever declares first creates it, the reciprocal exit adopts it
        for (key, bp) in &blueprints {
            let Some(room) = self.get_room(key.as_str()) else { continue };
            for (dir, exit_bp) in &bp.exits {
                let Some(door_bp) = &exit_bp.door else { continue };
                let dir = normalize_dir(dir);
                let Some(exit) = room.exit(&dir) else { continue };
                if exit.door.is_some() {
                    continue;
                }

                let door = Arc::new(Door::from_blueprint(door_bp));
                room.set_door(&dir, door.clone());
                report.doors += 1;

                if let Some(target) = exit.target() {
                    match target.exit_to(&room.key) {
                        Some(back) if back.door.is_none() => {
                            target.set_door(&back.direction, door);
                        }
                        Some(_) => {}
                        None => tracing::debug!(room = %key, direction = %dir, "one-way door"),
                    }
                }
            }
        }

        // spawns
        for (key, bp) in &blueprints {
            let Some(room) = self.get_room(key.as_str()) else { continue };
            for entry in &bp.spawns {
                self.apply_spawn(&room, entry, rng, &mut report);
            }
        }

        report
    }

    /// Resolve one spawn entry into `room`. Every unit of `quantity` rolls on its own.
    pub fn apply_spawn(&self, room: &Room, entry: &SpawnEntry, rng: &mut impl Rng, report: &mut BuildReport) {
        match entry {
            SpawnEntry::Item(spawn) => {
                for _ in 0..spawn.quantity {
                    if !roll_chance(rng, spawn.chance) {
                        continue;
                    }
                    match self.spawn_item(&spawn.id) {
                        Ok(item) => {
                            room.add_item(item);
                            report.items_spawned += 1;
                        }
                        Err(e) => {
                            tracing::warn!(room = %room.key, error = %e, "skipping item spawn");
                            report.spawns_skipped += 1;
                        }
                    }
                }
            }
            SpawnEntry::Mob(spawn) => {
                for _ in 0..spawn.quantity {
                    if !roll_chance(rng, spawn.chance) {
                        continue;
                    }
                    match self.spawn_mob(&spawn.id) {
                        Ok(mob) => {
                            self.outfit_mob(&mob, spawn, rng, report);
                            room.add_mob(mob);
                            report.mobs_spawned += 1;
                        }
                        Err(e) => {
                            tracing::warn!(room = %room.key, error = %e, "skipping mob spawn");
                            report.spawns_skipped += 1;
                        }
                    }
                }
            }
        }
    }

    fn outfit_mob(&self, mob: &Arc<MobInstance>, spawn: &MobSpawn, rng: &mut impl Rng, report: &mut BuildReport) {
        for inv in &spawn.inventory {
            for item in self.roll_items(inv, rng, report) {
                mob.with_state_mut(|st| st.inventory.add(item));
                report.items_spawned += 1;
            }
        }

        for eq in &spawn.equipment {
            if !roll_chance(rng, eq.chance) {
                continue;
            }
            let item = match self.spawn_item(&eq.id) {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(mob = %mob.blueprint_id, error = %e, "skipping equipment spawn");
                    report.spawns_skipped += 1;
                    continue;
                }
            };

            match mob.with_state_mut(|st| st.equipment.equip(&eq.slot, item.clone())) {
                Ok(()) => report.items_spawned += 1,
                Err(err) => {
                    let reason = match err {
                        EquipError::SlotOccupied => "slot already occupied",
                        EquipError::InvalidSlot => "item does not fit slot",
                    };
                    tracing::warn!(mob = %mob.blueprint_id, slot = %eq.slot, item = %eq.id, reason, "skipping equipment spawn");
                    self.unregister_item(&item);
                    report.spawns_skipped += 1;
                }
            }
        }
    }

    fn roll_items(&self, spawn: &ItemSpawn, rng: &mut impl Rng, report: &mut BuildReport) -> Vec<Arc<ItemInstance>> {
        let mut items = Vec::new();
        for _ in 0..spawn.quantity {
            if !roll_chance(rng, spawn.chance) {
                continue;
            }
            match self.spawn_item(&spawn.id) {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping item spawn");
                    report.spawns_skipped += 1;
                }
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn chance_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(roll_chance(&mut rng, 100));
            assert!(!roll_chance(&mut rng, 0));
        }
    }

    #[test]
    fn chance_is_roughly_fair() {
        let mut rng = StdRng::seed_from_u64(42);
        let hits = (0..10_000).filter(|_| roll_chance(&mut rng, 25)).count();
        assert!((2000..3000).contains(&hits), "hits = {hits}");
    }
}
