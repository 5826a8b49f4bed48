use crate::banner::{BANNER, ENTRY};
use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;

pub async fn run(sess: &mut Session) -> StateResult {
    sess.output.line(BANNER).await;
    sess.output.line(ENTRY).await;

    if !sess.registry.config.login_enabled {
        sess.output
            .system("Logins are currently disabled. Only new registrations are accepted.")
            .await;
    }

    sess.prompt("Press enter to continue").await?;
    Ok(ConnState::Login)
}
