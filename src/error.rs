use thiserror::Error;

pub type AppResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Something we looked up (blueprint, room, account, character) does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// A precondition of the caller was not met
    #[error("precondition failed: {0}")]
    PreconditionFailed(&'static str),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Infra(#[from] InfraError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Password(#[from] password_hash::Error),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Validation messages are meant for the player; everything else is not.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::Validation { message, .. } => message.clone(),
            DomainError::NotFound(what) => format!("{what} could not be found."),
            _ => "Something went wrong. Please try again later.".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to parse file: {0}")]
    Parse(toml::de::Error),

    #[error("invalid environment variable {0}: {1}")]
    InvalidEnv(String, String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: ConfigErrorKind,
    },

    #[error("network issue: {0}")]
    Net(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("account not found")]
    AccountNotFound,
    #[error("invalid password")]
    InvalidPassword,
    #[error("login disabled")]
    Disabled,
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Errors that end the current state of a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The connection was closed or could not be read from
    #[error("connection closed")]
    Disconnected,

    #[error(transparent)]
    Domain(#[from] DomainError),
}
