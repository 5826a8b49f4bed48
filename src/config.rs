use crate::error::{ConfigErrorKind, InfraError};
use crate::storage::RecordFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tcp_addr: String,           // e.g. "0.0.0.0:4000"
    pub content_dir: PathBuf,       // blueprints (read-only)
    pub data_dir: PathBuf,          // accounts and characters
    /// Encoding of the files under `data_dir`
    pub record_format: RecordFormat,

    /// Whether existing accounts may log in
    pub login_enabled: bool,
    /// Whether new accounts may be registered
    pub registration_enabled: bool,

    /// Room key (`area:room`) new and homeless characters are placed in
    pub starting_room: String,
    pub max_characters_per_account: usize,

    pub name_min_len: usize,
    pub name_max_len: usize,
    /// Regular expression a name must match (accounts and characters)
    pub name_pattern: String,
    /// Names nobody may register, compared case-insensitively
    pub banned_names: Vec<String>,

    pub password_min_len: usize,
    pub password_max_len: usize,

    /// Number of commands remembered per character
    pub history_size: usize,

    /// Real milliseconds between world clock ticks
    pub clock_tick_ms: u64,
    /// Game minutes that pass per tick
    pub clock_minutes_per_tick: u32,

    /// Seconds between autosaves of online characters (0 disables)
    pub autosave_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp_addr: "0.0.0.0:4000".to_string(),
            content_dir: PathBuf::from("content"),
            data_dir: PathBuf::from("data"),
            record_format: RecordFormat::Yaml,
            login_enabled: true,
            registration_enabled: true,
            starting_room: "downtown:plaza".to_string(),
            max_characters_per_account: 3,
            name_min_len: 3,
            name_max_len: 16,
            name_pattern: "^[A-Za-z][A-Za-z0-9_-]*$".to_string(),
            banned_names: vec![
                "new".to_string(),
                "quit".to_string(),
                "back".to_string(),
                "admin".to_string(),
                "root".to_string(),
                "system".to_string(),
            ],
            password_min_len: 6,
            password_max_len: 64,
            history_size: 20,
            clock_tick_ms: 10_000,
            clock_minutes_per_tick: 10,
            autosave_secs: 300,
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, InfraError> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let _ = dotenvy::from_filename(".env");
        cfg.apply_env()?;
        cfg.validate(path.unwrap_or(Path::new("<env>")))?;

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, InfraError> {
        let data = std::fs::read_to_string(path).map_err(|e| InfraError::Config {
            path: path.to_path_buf(),
            source: ConfigErrorKind::Read(e),
        })?;

        toml::from_str(&data).map_err(|e| InfraError::Config {
            path: path.to_path_buf(),
            source: ConfigErrorKind::Parse(e),
        })
    }

    fn apply_env(&mut self) -> Result<(), InfraError> {
        if let Ok(v) = std::env::var("SPRAWL_TCP_ADDR") {
            self.tcp_addr = v;
        }
        if let Ok(v) = std::env::var("SPRAWL_CONTENT_DIR") {
            self.content_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SPRAWL_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SPRAWL_RECORD_FORMAT") {
            self.record_format = v.parse().map_err(|bad| InfraError::Config {
                path: PathBuf::from(".env"),
                source: ConfigErrorKind::InvalidEnv("SPRAWL_RECORD_FORMAT".to_string(), bad),
            })?;
        }
        if let Ok(v) = std::env::var("SPRAWL_STARTING_ROOM") {
            self.starting_room = v;
        }
        if let Ok(v) = std::env::var("SPRAWL_LOGIN_ENABLED") {
            self.login_enabled = parse_env_bool("SPRAWL_LOGIN_ENABLED", &v)?;
        }
        if let Ok(v) = std::env::var("SPRAWL_REGISTRATION_ENABLED") {
            self.registration_enabled = parse_env_bool("SPRAWL_REGISTRATION_ENABLED", &v)?;
        }
        Ok(())
    }

    fn validate(&self, path: &Path) -> Result<(), InfraError> {
        let invalid = |field: &'static str, msg: String| InfraError::Config {
            path: path.to_path_buf(),
            source: ConfigErrorKind::InvalidValue(field, msg),
        };

        if self.name_min_len == 0 || self.name_min_len > self.name_max_len {
            return Err(invalid("name_min_len", "must be between 1 and name_max_len".into()));
        }
        if self.password_min_len == 0 || self.password_min_len > self.password_max_len {
            return Err(invalid("password_min_len", "must be between 1 and password_max_len".into()));
        }
        if regex::Regex::new(&self.name_pattern).is_err() {
            return Err(invalid("name_pattern", format!("not a valid regex: {}", self.name_pattern)));
        }
        if !self.starting_room.contains(':') {
            return Err(invalid("starting_room", "expected an `area:room` key".into()));
        }
        if self.history_size == 0 {
            return Err(invalid("history_size", "must be at least 1".into()));
        }
        if self.clock_tick_ms == 0 {
            return Err(invalid("clock_tick_ms", "must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_env_bool(name: &str, value: &str) -> Result<bool, InfraError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(InfraError::Config {
            path: PathBuf::from(".env"),
            source: ConfigErrorKind::InvalidEnv(name.to_string(), other.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate(Path::new("test")).is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str("starting_room = \"docks:pier\"\nhistory_size = 5\n").unwrap();
        assert_eq!(cfg.starting_room, "docks:pier");
        assert_eq!(cfg.history_size, 5);
        assert_eq!(cfg.max_characters_per_account, 3);
        assert_eq!(cfg.record_format, RecordFormat::Yaml);

        let cfg: Config = toml::from_str("record_format = \"json\"\n").unwrap();
        assert_eq!(cfg.record_format, RecordFormat::Json);
    }

    #[test]
    fn rejects_bad_pattern() {
        let cfg = Config {
            name_pattern: "([".to_string(),
            ..Config::default()
        };
        assert!(cfg.validate(Path::new("test")).is_err());
    }

    #[test]
    fn env_bools() {
        assert!(parse_env_bool("X", "Yes").unwrap());
        assert!(!parse_env_bool("X", "0").unwrap());
        assert!(parse_env_bool("X", "maybe").is_err());
    }
}
