use crate::error::DomainError;
use crate::state::machine::registration::collect_password;
use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;

pub async fn run(sess: &mut Session) -> StateResult {
    let Some(mut account) = sess.account.clone() else {
        return Err(DomainError::PreconditionFailed("change password without an account").into());
    };
    let accounts = sess.registry.services.account.clone();

    let current = sess.prompt_secret("Current password: ").await?;
    if !accounts.verify_password(&account, &current) {
        sess.output.system("That is not your current password.").await;
        return Ok(ConnState::MainMenu);
    }

    let new = collect_password(sess, &accounts, "New password: ").await?;
    match accounts.change_password(&mut account, &current, &new).await {
        Ok(()) => {
            tracing::info!(account = %account.name, "password changed");
            sess.output.system("Password changed.").await;
            sess.account = Some(account);
        }
        Err(e @ DomainError::Validation { .. }) => sess.output.system(e.user_message()).await,
        Err(e) => {
            tracing::error!(account = %account.name, error = %e, "cannot save new password");
            sess.account = Some(account);
            sess.output
                .system("Your new password may not have persisted. Please try again later.")
                .await;
        }
    }

    Ok(ConnState::MainMenu)
}
