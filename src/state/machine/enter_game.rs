use crate::error::DomainError;
use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;

pub async fn run(sess: &mut Session) -> StateResult {
    let Some(mut account) = sess.account.clone() else {
        return Err(DomainError::PreconditionFailed("entering the game without an account").into());
    };

    if account.characters.is_empty() {
        sess.output
            .system("You have no characters yet. Create one from the main menu first.")
            .await;
        return Ok(ConnState::MainMenu);
    }

    let name = loop {
        let mut menu = vec!["Your characters:".to_string()];
        for (i, c) in account.characters.iter().enumerate() {
            menu.push(format!("  {}) {c}", i + 1));
        }
        menu.push("  back".to_string());
        sess.output.line(menu.join("\n")).await;

        let answer = sess.prompt("Play as: ").await?;
        if answer.eq_ignore_ascii_case("back") {
            return Ok(ConnState::MainMenu);
        }
        let picked = match answer.parse::<usize>() {
            Ok(n) if (1..=account.characters.len()).contains(&n) => Some(account.characters[n - 1].clone()),
            _ => account.find_character(&answer).map(str::to_string),
        };
        match picked {
            Some(name) => break name,
            None => sess.output.system("You have no character by that name.").await,
        }
    };

    let registry = sess.registry.clone();
    let content = &registry.content;

    if content.find_character_by_name(&name).is_some() {
        sess.output.system(format!("{name} is already in the game.")).await;
        return Ok(ConnState::MainMenu);
    }

    let character = match registry.services.character.load(&name).await {
        Ok(c) => c,
        Err(DomainError::NotFound(_)) => {
            tracing::warn!(account = %account.name, character = %name, "owned character has no record");
            sess.output.system(format!("{name} could not be found.")).await;
            return Ok(ConnState::MainMenu);
        }
        Err(e) => return Err(e.into()),
    };

    let Some(room) = content.resolve_room(&character.room_key(), &registry.config.starting_room) else {
        tracing::error!(character = %name, start = %registry.config.starting_room, "no room to place character in");
        sess.output.system("The world is not ready for you yet. Try again later.").await;
        return Ok(ConnState::MainMenu);
    };
    character.with_state_mut(|st| st.room_key = room.key.clone());

    if !content.try_add_character(character.clone()) {
        sess.output.system(format!("{name} is already in the game.")).await;
        return Ok(ConnState::MainMenu);
    }
    character.attach(sess.output.clone());
    character.set_online(true);

    account.last_login = Some(chrono::Utc::now());
    let saved_account = registry.services.account.save(&account).await;
    let saved_character = registry.services.character.save(&character).await;
    if let Err(e) = saved_account.and(saved_character) {
        tracing::error!(account = %account.name, character = %name, error = %e, "cannot persist on entering");
        sess.output.system("Your progress may not have persisted.").await;
    }

    tracing::info!(peer = %sess.peer, account = %account.name, character = %name, room = %room.key, "entered the game");
    sess.account = Some(account);
    sess.character = Some(character);
    Ok(ConnState::GameLoop)
}
