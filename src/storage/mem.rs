use crate::error::AppResult;
use crate::models::account::Account;
use crate::models::character::CharacterRecord;
use crate::storage::{Storage, record_key};
use async_trait::async_trait;
use dashmap::DashMap;

/// Keeps everything in memory. Used by tests and for throwaway servers.
#[derive(Default)]
pub struct MemoryStorage {
    accounts: DashMap<String, Account>,
    characters: DashMap<String, CharacterRecord>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load_account(&self, name: &str) -> AppResult<Option<Account>> {
        Ok(self.accounts.get(&record_key(name)).map(|a| a.clone()))
    }

    async fn save_account(&self, account: &Account) -> AppResult<()> {
        self.accounts.insert(record_key(&account.name), account.clone());
        Ok(())
    }

    async fn load_character(&self, name: &str) -> AppResult<Option<CharacterRecord>> {
        Ok(self.characters.get(&record_key(name)).map(|c| c.clone()))
    }

    async fn save_character(&self, record: &CharacterRecord) -> AppResult<()> {
        self.characters.insert(record_key(&record.name), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keys_are_case_insensitive() {
        let store = MemoryStorage::new();
        store.save_account(&Account::new("Alice", "x".into())).await.unwrap();
        assert!(store.account_exists("ALICE").await.unwrap());
        assert!(!store.account_exists("bob").await.unwrap());
    }
}
