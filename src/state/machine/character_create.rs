use crate::error::DomainError;
use crate::models::blueprint::Pregen;
use crate::state::machine::{ConnState, StateResult};
use crate::state::session::Session;
use std::sync::Arc;

pub async fn run(sess: &mut Session) -> StateResult {
    let Some(mut account) = sess.account.clone() else {
        return Err(DomainError::PreconditionFailed("character creation without an account").into());
    };

    let max = sess.registry.config.max_characters_per_account;
    if account.characters.len() >= max {
        sess.output
            .system(format!("You already have the maximum of {max} characters."))
            .await;
        return Ok(ConnState::MainMenu);
    }

    loop {
        sess.output
            .line("How do you want to create your character?\n  1) Pick an archetype\n  2) Build a custom character")
            .await;
        match sess.prompt("Choice (or 'back'): ").await?.to_lowercase().as_str() {
            "1" | "archetype" => break,
            "2" | "custom" => {
                sess.output
                    .system("Custom characters are not available yet. Pick an archetype instead.")
                    .await;
                return Ok(ConnState::MainMenu);
            }
            "back" => return Ok(ConnState::MainMenu),
            _ => sess.output.system("Please choose 1 or 2.").await,
        }
    }

    let Some(pregen) = choose_pregen(sess).await? else {
        return Ok(ConnState::MainMenu);
    };

    let characters = sess.registry.services.character.clone();
    let accounts = sess.registry.services.account.clone();

    loop {
        let name = sess.prompt("Name your character (or 'back'): ").await?;
        if name.eq_ignore_ascii_case("back") {
            return Ok(ConnState::MainMenu);
        }
        if let Err(e) = accounts.validate_name(&name) {
            sess.output.system(e.user_message()).await;
            continue;
        }
        if characters.exists(&name).await? {
            sess.output.system("That name is already taken.").await;
            continue;
        }

        match characters.create(&mut account, &name, &pregen).await {
            Ok(_) => {
                sess.output
                    .system(format!("{name} the {} is ready to hit the streets.", pregen.name))
                    .await;
            }
            Err(e @ DomainError::Validation { .. }) => {
                sess.output.system(e.user_message()).await;
                continue;
            }
            Err(e) => {
                tracing::error!(account = %account.name, character = %name, error = %e, "character creation failed");
                sess.output
                    .system("Your character may not have persisted. Please try again later.")
                    .await;
            }
        }

        sess.account = Some(account);
        return Ok(ConnState::MainMenu);
    }
}

/// List the archetypes and let the player pick and confirm one. `None` means "back".
async fn choose_pregen(sess: &mut Session) -> Result<Option<Arc<Pregen>>, crate::error::SessionError> {
    let pregens = sess.registry.content.pregens_sorted();
    if pregens.is_empty() {
        sess.output.system("There are no archetypes to choose from.").await;
        return Ok(None);
    }

    loop {
        let mut menu = vec!["Archetypes:".to_string()];
        for (i, p) in pregens.iter().enumerate() {
            menu.push(format!("  {}) {}", i + 1, p.name));
        }
        sess.output.line(menu.join("\n")).await;

        let answer = sess.prompt("Choose an archetype (or 'back'): ").await?;
        if answer.eq_ignore_ascii_case("back") {
            return Ok(None);
        }

        let picked = match answer.parse::<usize>() {
            Ok(n) if (1..=pregens.len()).contains(&n) => Some(pregens[n - 1].clone()),
            _ => pregens.iter().find(|p| p.name.eq_ignore_ascii_case(&answer)).cloned(),
        };
        let Some(pregen) = picked else {
            sess.output.system("No such archetype.").await;
            continue;
        };

        let metatype = sess
            .registry
            .content
            .get_metatype(pregen.metatype.as_str())
            .map(|m| m.name.clone())
            .unwrap_or_else(|| pregen.metatype.clone());
        sess.output
            .line(format!("{} ({metatype})\n{}", pregen.name, pregen.summary))
            .await;

        loop {
            match sess.prompt("Play this archetype? (yes/no): ").await?.to_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(pregen)),
                "n" | "no" => break,
                _ => sess.output.system("Please answer yes or no.").await,
            }
        }
    }
}
