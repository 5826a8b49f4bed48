use crate::config::Config;
use crate::error::{AppResult, DomainError, LoginError};
use crate::models::account::Account;
use crate::storage::Storage;
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use regex::Regex;
use std::sync::Arc;

pub type LoginResult<T> = Result<T, LoginError>;

pub struct AccountService {
    storage: Arc<dyn Storage>,
    config: Arc<Config>,
    argon: Argon2<'static>,
    name_re: Regex,
}

impl AccountService {
    pub fn new(storage: Arc<dyn Storage>, config: Arc<Config>) -> AppResult<Self> {
        let name_re = Regex::new(&config.name_pattern)
            .map_err(|e| DomainError::InvalidData(format!("name pattern: {e}")))?;
        Ok(Self {
            storage,
            config,
            argon: Argon2::default(),
            name_re,
        })
    }

    /// Shape rules shared by account and character names. Does not check availability.
    pub fn validate_name(&self, name: &str) -> AppResult<()> {
        let len = name.chars().count();
        let (min, max) = (self.config.name_min_len, self.config.name_max_len);
        if len < min || len > max {
            return Err(DomainError::validation(
                "name",
                format!("Names must be between {min} and {max} characters long."),
            ));
        }
        if !self.name_re.is_match(name) {
            return Err(DomainError::validation(
                "name",
                "Names must start with a letter and may only contain letters, digits, '-' and '_'.",
            ));
        }
        if self.config.banned_names.iter().any(|b| b.eq_ignore_ascii_case(name)) {
            return Err(DomainError::validation("name", "That name is reserved."));
        }
        Ok(())
    }

    pub fn validate_password(&self, password: &str) -> AppResult<()> {
        let len = password.chars().count();
        let (min, max) = (self.config.password_min_len, self.config.password_max_len);
        if len < min || len > max {
            return Err(DomainError::validation(
                "password",
                format!("Passwords must be between {min} and {max} characters long."),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation("password", "Passwords must contain at least one digit."));
        }
        if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
            return Err(DomainError::validation("password", "Passwords must contain at least one symbol."));
        }
        Ok(())
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self.argon.hash_password(password.as_bytes(), &salt)?.to_string())
    }

    pub fn verify_password(&self, account: &Account, password: &str) -> bool {
        match PasswordHash::new(&account.password_hash) {
            Ok(parsed) => self.argon.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::error!(account = %account.name, error = %e, "stored password hash is unreadable");
                false
            }
        }
    }

    pub async fn exists(&self, name: &str) -> AppResult<bool> {
        self.storage.account_exists(name).await
    }

    pub async fn login(&self, name: &str, password: &str) -> LoginResult<Account> {
        if !self.config.login_enabled {
            return Err(LoginError::Disabled);
        }
        if self.validate_name(name).is_err() {
            return Err(LoginError::AccountNotFound);
        }

        let Some(mut account) = self
            .storage
            .load_account(name)
            .await
            .map_err(|e| LoginError::InternalError(e.to_string()))?
        else {
            return Err(LoginError::AccountNotFound);
        };

        if !self.verify_password(&account, password) {
            return Err(LoginError::InvalidPassword);
        }

        account.last_login = Some(chrono::Utc::now());
        if let Err(e) = self.storage.save_account(&account).await {
            // the login itself is fine; only the timestamp is lost
            tracing::error!(account = %account.name, error = %e, "cannot update last login");
        }

        Ok(account)
    }

    /// Create and persist a new account.
    pub async fn register(&self, name: &str, password: &str) -> AppResult<Account> {
        if !self.config.registration_enabled {
            return Err(DomainError::PreconditionFailed("registration is disabled"));
        }
        self.validate_name(name)?;
        self.validate_password(password)?;
        if self.exists(name).await? {
            return Err(DomainError::validation("name", "That name is already taken."));
        }

        let account = Account::new(name, self.hash_password(password)?);
        self.storage.save_account(&account).await?;
        tracing::info!(account = %account.name, "account registered");

        Ok(account)
    }

    pub async fn change_password(&self, account: &mut Account, current: &str, new: &str) -> AppResult<()> {
        if !self.verify_password(account, current) {
            return Err(DomainError::validation("password", "Your current password is not correct."));
        }
        self.validate_password(new)?;

        account.password_hash = self.hash_password(new)?;
        self.storage.save_account(account).await
    }

    pub async fn save(&self, account: &Account) -> AppResult<()> {
        self.storage.save_account(account).await
    }
}
