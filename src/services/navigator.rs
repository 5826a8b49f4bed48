//! Moving characters between rooms.

use crate::models::character::Character;
use crate::models::room::Room;
use crate::models::types::{normalize_dir, opposite_dir};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("You cannot go that way.")]
    NoExit,
    #[error("The door to the {0} is closed.")]
    DoorClosed(String),
    #[error("That way leads nowhere right now.")]
    Unresolved,
}

fn arrival_phrase(via: Option<&str>) -> String {
    match via.and_then(opposite_dir) {
        Some(from @ ("below" | "above" | "inside" | "outside")) => format!("arrives from {from}"),
        Some(from) => format!("arrives from the {from}"),
        None => "arrives".to_string(),
    }
}

/// Move `character` into `target`.
///
/// When the character is in another room it is announced as leaving there (the mover does not
/// see it) and removed. Admission into `target` updates the occupant list and the character's
/// room pointer under the target's lock, then the arrival is announced to everyone else in the
/// target. `via` is the direction taken, if any.
pub async fn move_character(character: &Arc<Character>, target: &Arc<Room>, via: Option<&str>) {
    let exclude = [character.id];

    if let Some(prev) = character.room() {
        if !Arc::ptr_eq(&prev, target) {
            let msg = match via {
                Some(dir) => format!("{} leaves {dir}.", character.name),
                None => format!("{} leaves.", character.name),
            };
            prev.broadcast(&msg, &exclude);
            prev.remove_character(character.id);
        } else if prev.contains_character(character.id) {
            return;
        }
    }

    target.admit(character);
    tracing::debug!(character = %character.name, room = %target.key, "moved");

    let msg = format!("{} {}.", character.name, arrival_phrase(via));
    target.broadcast(&msg, &exclude);
}

/// Take the exit `direction` out of `room`. Returns the room the character ended up in.
pub async fn go(character: &Arc<Character>, room: &Arc<Room>, direction: &str) -> Result<Arc<Room>, MoveError> {
    let dir = normalize_dir(direction);
    let exit = room.exit(&dir).ok_or(MoveError::NoExit)?;
    if exit.is_blocked() {
        return Err(MoveError::DoorClosed(dir));
    }
    let target = exit.target().ok_or(MoveError::Unresolved)?;

    move_character(character, &target, Some(&dir)).await;
    Ok(target)
}
