use crate::commands;
use crate::error::DomainError;
use crate::services::navigator;
use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;

pub async fn run(sess: &mut Session) -> StateResult {
    let Some(character) = sess.character.clone() else {
        return Err(DomainError::PreconditionFailed("game loop without a character").into());
    };
    let registry = sess.registry.clone();

    let room = registry
        .content
        .resolve_room(&character.room_key(), &registry.config.starting_room)
        .ok_or_else(|| DomainError::NotFound(format!("room '{}'", character.room_key())))?;

    navigator::move_character(&character, &room, None).await;
    sess.output.line(registry.presenter.render_room(&room, &character)).await;

    loop {
        let line = sess.prompt("> ").await?;
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            return Ok(ConnState::ExitGame);
        }
        commands::dispatch(sess, &line).await;
    }
}
