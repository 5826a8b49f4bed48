use crate::config::Config;
use crate::content::ContentRegistry;
use crate::error::{AppResult, DomainError};
use crate::models::account::Account;
use crate::models::blueprint::Pregen;
use crate::models::character::{Character, CharacterRecord, CharacterState};
use crate::models::instance::{ItemInstance, ItemRecord};
use crate::models::inventory::{Equipment, Inventory};
use crate::models::types::{CharacterId, Role};
use crate::storage::Storage;
use futures::future::join_all;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

/// Builds characters from archetypes and moves them between storage and memory.
pub struct CharacterService {
    storage: Arc<dyn Storage>,
    content: Arc<ContentRegistry>,
    config: Arc<Config>,
}

impl CharacterService {
    pub fn new(storage: Arc<dyn Storage>, content: Arc<ContentRegistry>, config: Arc<Config>) -> Self {
        Self {
            storage,
            content,
            config,
        }
    }

    pub async fn exists(&self, name: &str) -> AppResult<bool> {
        self.storage.character_exists(name).await
    }

    /// Create a character from `pregen`, persist it and add it to `account`. The account is
    /// persisted as well. The character is not placed in the world.
    pub async fn create(&self, account: &mut Account, name: &str, pregen: &Pregen) -> AppResult<CharacterRecord> {
        if account.characters.len() >= self.config.max_characters_per_account {
            return Err(DomainError::PreconditionFailed("character limit reached"));
        }
        if self.exists(name).await? {
            return Err(DomainError::validation("name", "That name is already taken."));
        }

        let carry_capacity = match self.content.get_metatype(pregen.metatype.as_str()) {
            Some(m) => m.carry_capacity,
            None => {
                tracing::warn!(pregen = %pregen.id, metatype = %pregen.metatype, "metatype not found, using defaults");
                50.0
            }
        };

        let mut inventory = Inventory::new();
        for id in &pregen.items {
            match self.content.get_item_blueprint(id.as_str()) {
                Some(bp) => {
                    inventory.add(self.content.create_item_instance(&bp));
                }
                None => tracing::warn!(pregen = %pregen.id, item = %id, "starting item not found"),
            }
        }

        let state = CharacterState {
            metatype: pregen.metatype.clone(),
            archetype: pregen.id.clone(),
            role: Role::Player,
            room_key: self.config.starting_room.clone(),
            inventory,
            equipment: Equipment::new(),
            qualities: pregen.qualities.clone(),
            skills: pregen.skills.clone(),
            labels: Vec::new(),
            dispositions: BTreeMap::new(),
            carry_capacity,
            history: VecDeque::new(),
            created_at: chrono::Utc::now(),
        };
        let character = Character::new(CharacterId::new(), name, &account.name, state);
        let record = character.to_record();

        self.storage.save_character(&record).await?;
        account.add_character(name);
        self.storage.save_account(account).await?;

        tracing::info!(account = %account.name, character = %name, archetype = %pregen.id, "character created");
        Ok(record)
    }

    /// Load a character and re-create its items with their stored instance ids.
    pub async fn load(&self, name: &str) -> AppResult<Arc<Character>> {
        let record = self
            .storage
            .load_character(name)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("character '{name}'")))?;

        Ok(Arc::new(self.from_record(record)))
    }

    fn restore(&self, character: &str, rec: &ItemRecord) -> Option<Arc<ItemInstance>> {
        match self.content.restore_item(rec.id, &rec.blueprint, rec.condition) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(character, item = %rec.blueprint, error = %e, "dropping unknown item");
                None
            }
        }
    }

    pub fn from_record(&self, record: CharacterRecord) -> Character {
        let mut inventory = Inventory::new();
        for rec in &record.inventory {
            if let Some(item) = self.restore(&record.name, rec) {
                inventory.add(item);
            }
        }

        let mut equipment = Equipment::new();
        for (slot, rec) in &record.equipment {
            let Some(item) = self.restore(&record.name, rec) else {
                continue;
            };
            if let Err(e) = equipment.equip(slot, item.clone()) {
                tracing::warn!(character = %record.name, %slot, error = ?e, "cannot re-equip item, moving it to inventory");
                inventory.add(item);
            }
        }

        let state = CharacterState {
            metatype: record.metatype,
            archetype: record.archetype,
            role: record.role,
            room_key: record.room,
            inventory,
            equipment,
            qualities: record.qualities,
            skills: record.skills,
            labels: record.labels,
            dispositions: record.dispositions,
            carry_capacity: record.carry_capacity,
            history: record.history.into_iter().collect(),
            created_at: record.created_at,
        };

        Character::new(record.id, &record.name, &record.account, state)
    }

    pub async fn save(&self, character: &Character) -> AppResult<()> {
        self.storage.save_character(&character.to_record()).await
    }

    /// Persist every online character concurrently. Failures are logged and do not stop the
    /// others.
    pub async fn save_online(&self) -> usize {
        let online = self.content.online_characters();
        let results = join_all(online.iter().map(|c| self.save(c))).await;

        let mut saved = 0;
        for (c, res) in online.iter().zip(results) {
            match res {
                Ok(()) => saved += 1,
                Err(e) => tracing::error!(character = %c.name, error = %e, "autosave failed"),
            }
        }
        saved
    }
}
