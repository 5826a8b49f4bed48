use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;

pub async fn run(sess: &mut Session) -> StateResult {
    let Some(character) = sess.character.take() else {
        return Ok(ConnState::MainMenu);
    };
    let registry = sess.registry.clone();

    if let Some(room) = character.room() {
        room.broadcast(&format!("{} leaves the game.", character.name), &[character.id]);
        room.remove_character(character.id);
    }

    sess.output.line("You jack out of the Sprawl. See you soon.").await;

    if let Err(e) = registry.services.character.save(&character).await {
        tracing::error!(character = %character.name, error = %e, "cannot save on exit");
        sess.output.system("Your progress may not have persisted.").await;
    }

    character.set_room(None);
    character.detach();
    character.set_online(false);
    registry.content.remove_character(character.id);
    let released = registry.content.release_items(&character);
    tracing::debug!(character = %character.name, released, "items released");

    tracing::info!(peer = %sess.peer, account = %sess.account_name(), character = %character.name, "left the game");
    Ok(ConnState::MainMenu)
}
