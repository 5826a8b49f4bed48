use crate::error::{DomainError, SessionError};
use crate::services::AccountService;
use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;

pub async fn run(sess: &mut Session) -> StateResult {
    if !sess.registry.config.registration_enabled {
        sess.output.system("Registration is currently disabled.").await;
        return Ok(ConnState::Login);
    }
    let accounts = sess.registry.services.account.clone();

    let name = loop {
        let name = sess.prompt("Choose an account name (or 'back'): ").await?;
        if name.eq_ignore_ascii_case("back") {
            return Ok(ConnState::Login);
        }
        if let Err(e) = accounts.validate_name(&name) {
            sess.output.system(e.user_message()).await;
            continue;
        }
        if accounts.exists(&name).await? {
            sess.output.system("That name is already taken.").await;
            continue;
        }
        break name;
    };

    let password = collect_password(sess, &accounts, "Choose a password: ").await?;

    match accounts.register(&name, &password).await {
        Ok(account) => {
            tracing::info!(peer = %sess.peer, account = %account.name, "registered");
            sess.output
                .system(format!("Account {} created. Welcome to the Sprawl.", account.name))
                .await;
            sess.account = Some(account);
            Ok(ConnState::MainMenu)
        }
        // somebody else took the name in the meantime
        Err(e @ DomainError::Validation { .. }) => {
            sess.output.system(e.user_message()).await;
            Ok(ConnState::Registration)
        }
        Err(e) => Err(e.into()),
    }
}

/// Ask for a new password twice until both match and it passes the rules.
pub(super) async fn collect_password(
    sess: &mut Session,
    accounts: &AccountService,
    first_prompt: &str,
) -> Result<String, SessionError> {
    loop {
        let password = sess.prompt_secret(first_prompt).await?;
        if let Err(e) = accounts.validate_password(&password) {
            sess.output.system(e.user_message()).await;
            continue;
        }
        let confirm = sess.prompt_secret("Confirm password: ").await?;
        if confirm != password {
            sess.output.system("Passwords do not match.").await;
            continue;
        }
        return Ok(password);
    }
}
