use crate::error::{AppResult, DomainError, InfraError};
use crate::models::account::Account;
use crate::models::character::CharacterRecord;
use crate::storage::{Storage, record_key};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk encoding of account and character records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    #[default]
    Yaml,
    Json,
}

impl RecordFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            RecordFormat::Yaml => "yaml",
            RecordFormat::Json => "json",
        }
    }

    fn encode<T: Serialize>(&self, value: &T) -> AppResult<String> {
        Ok(match self {
            RecordFormat::Yaml => serde_yaml::to_string(value)?,
            RecordFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> AppResult<T> {
        Ok(match self {
            RecordFormat::Yaml => serde_yaml::from_str(text)?,
            RecordFormat::Json => serde_json::from_str(text)?,
        })
    }
}

impl std::str::FromStr for RecordFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(RecordFormat::Yaml),
            "json" => Ok(RecordFormat::Json),
            other => Err(other.to_string()),
        }
    }
}

/// One file per record under `<data_dir>/accounts` and `<data_dir>/characters`.
pub struct FileStorage {
    root: PathBuf,
    format: RecordFormat,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format: RecordFormat::default(),
        }
    }

    pub fn with_format(mut self, format: RecordFormat) -> Self {
        self.format = format;
        self
    }

    /// Create the directory layout if needed.
    pub async fn init(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(self.root.join("accounts")).await.map_err(InfraError::from)?;
        tokio::fs::create_dir_all(self.root.join("characters")).await.map_err(InfraError::from)?;
        Ok(())
    }

    fn path_for(&self, kind: &str, name: &str) -> AppResult<PathBuf> {
        let key = record_key(name);
        // names are validated on registration; still refuse anything that could escape the dir
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            return Err(DomainError::InvalidData(format!("invalid record key '{name}'")));
        }
        Ok(self.root.join(kind).join(format!("{key}.{}", self.format.extension())))
    }

    async fn read<T: DeserializeOwned>(&self, path: &Path) -> AppResult<Option<T>> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(self.format.decode(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    /// Write to a sibling temp file first, then rename over the record.
    async fn write<T: Serialize>(&self, path: &Path, value: &T) -> AppResult<()> {
        let text = self.format.encode(value)?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, text).await.map_err(InfraError::from)?;
        tokio::fs::rename(&tmp, path).await.map_err(InfraError::from)?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn load_account(&self, name: &str) -> AppResult<Option<Account>> {
        let path = self.path_for("accounts", name)?;
        self.read(&path).await
    }

    async fn save_account(&self, account: &Account) -> AppResult<()> {
        let path = self.path_for("accounts", &account.name)?;
        self.write(&path, account).await
    }

    async fn load_character(&self, name: &str) -> AppResult<Option<CharacterRecord>> {
        let path = self.path_for("characters", name)?;
        self.read(&path).await
    }

    async fn save_character(&self, record: &CharacterRecord) -> AppResult<()> {
        let path = self.path_for("characters", &record.name)?;
        self.write(&path, record).await
    }
}
