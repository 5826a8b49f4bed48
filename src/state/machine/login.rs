use crate::error::LoginError;
use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;

/// Same answer for every failure, so names cannot be probed.
const LOGIN_FAILED: &str = "Invalid name or password.";

pub async fn run(sess: &mut Session) -> StateResult {
    loop {
        let name = sess.prompt("Name (or 'new'): ").await?;
        if name.is_empty() {
            continue;
        }
        if name.eq_ignore_ascii_case("new") {
            return Ok(ConnState::Registration);
        }

        if !sess.registry.config.login_enabled {
            sess.output.system("Logins are disabled. Type 'new' to register.").await;
            continue;
        }

        let password = sess.prompt_secret("Password: ").await?;

        match sess.registry.services.account.login(&name, &password).await {
            Ok(account) => {
                tracing::info!(peer = %sess.peer, account = %account.name, "logged in");
                sess.output.system(format!("Welcome back, {}.", account.name)).await;
                sess.account = Some(account);
                return Ok(ConnState::MainMenu);
            }
            Err(e) => {
                match &e {
                    LoginError::InternalError(msg) => {
                        tracing::error!(peer = %sess.peer, account = %name, error = %msg, "login failed")
                    }
                    other => tracing::info!(peer = %sess.peer, account = %name, reason = %other, "login rejected"),
                }
                sess.output.system(LOGIN_FAILED).await;
            }
        }
    }
}
