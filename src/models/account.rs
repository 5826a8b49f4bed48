use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Display name as typed at registration; lookups use the lowercase form
    pub name: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Names of the characters owned by this account
    #[serde(default)]
    pub characters: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

impl Account {
    pub fn new(name: &str, password_hash: String) -> Self {
        Self {
            name: name.to_string(),
            password_hash,
            characters: Vec::new(),
            created_at: chrono::Utc::now(),
            last_login: None,
        }
    }

    /// Storage key.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn owns(&self, character: &str) -> bool {
        self.characters.iter().any(|c| c.eq_ignore_ascii_case(character))
    }

    /// Case-insensitive lookup returning the stored spelling.
    pub fn find_character(&self, name: &str) -> Option<&str> {
        self.characters
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name.trim()))
            .map(|c| c.as_str())
    }

    pub fn add_character(&mut self, name: &str) {
        if !self.owns(name) {
            self.characters.push(name.to_string());
        }
    }
}
