//! Persistence collaborator. Accounts and characters are each one record keyed by the
//! lowercase name.

use crate::error::AppResult;
use crate::models::account::Account;
use crate::models::character::CharacterRecord;
use async_trait::async_trait;

pub mod file;
pub mod mem;

pub use file::{FileStorage, RecordFormat};
pub use mem::MemoryStorage;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_account(&self, name: &str) -> AppResult<Option<Account>>;
    async fn save_account(&self, account: &Account) -> AppResult<()>;
    async fn load_character(&self, name: &str) -> AppResult<Option<CharacterRecord>>;
    async fn save_character(&self, record: &CharacterRecord) -> AppResult<()>;

    async fn account_exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.load_account(name).await?.is_some())
    }

    async fn character_exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.load_character(name).await?.is_some())
    }
}

/// Normalized record key: lowercase, trimmed.
pub fn record_key(name: &str) -> String {
    name.trim().to_lowercase()
}
