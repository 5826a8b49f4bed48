mod common;

use common::{Observer, Stalled, count, world};
use sprawl::models::room::{DoorError, DoorState};
use sprawl::services::MoveError;
use sprawl::services::navigator::{go, move_character};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn moving_updates_both_rooms_and_tells_everyone_else() {
    let w = world();
    let content = &w.registry.content;
    let plaza = content.get_room("test:plaza").unwrap();
    let alley = content.get_room("test:alley").unwrap();

    let mut watcher_plaza = Observer::new("Ann");
    let mut watcher_alley = Observer::new("Bob");
    plaza.admit(&watcher_plaza.character);
    alley.admit(&watcher_alley.character);

    let mut zed = Observer::new("Zed");
    move_character(&zed.character, &plaza, None).await;
    assert_eq!(count(&watcher_plaza.drain(), "Zed arrives."), 1);

    let now = go(&zed.character, &plaza, "n").await.unwrap();
    assert!(Arc::ptr_eq(&now, &alley));

    assert!(alley.contains_character(zed.character.id));
    assert!(!plaza.contains_character(zed.character.id));
    assert!(Arc::ptr_eq(&zed.character.room().unwrap(), &alley));
    assert_eq!(zed.character.room_key(), "test:alley");

    assert_eq!(count(&watcher_plaza.drain(), "Zed leaves north."), 1);
    assert_eq!(count(&watcher_alley.drain(), "Zed arrives from the south."), 1);

    // the mover hears nothing about itself
    let own = zed.drain();
    assert_eq!(count(&own, "Zed "), 0, "{own:?}");
}

#[tokio::test]
async fn moving_into_the_same_room_twice_is_a_noop() {
    let w = world();
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    let mut watcher = Observer::new("Ann");
    plaza.admit(&watcher.character);

    let zed = Observer::new("Zed");
    move_character(&zed.character, &plaza, None).await;
    move_character(&zed.character, &plaza, None).await;

    assert_eq!(count(&watcher.drain(), "Zed arrives."), 1);
    assert_eq!(plaza.characters().len(), 2);
}

#[tokio::test]
async fn closed_doors_and_missing_exits_block() {
    let w = world();
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    let zed = Observer::new("Zed");
    move_character(&zed.character, &plaza, None).await;

    assert_eq!(go(&zed.character, &plaza, "east").await.unwrap_err(), MoveError::DoorClosed("east".into()));
    assert_eq!(go(&zed.character, &plaza, "up").await.unwrap_err(), MoveError::NoExit);
    assert!(plaza.contains_character(zed.character.id));
}

#[tokio::test]
async fn door_state_is_seen_from_both_sides() {
    let w = world();
    let content = &w.registry.content;
    let plaza = content.get_room("test:plaza").unwrap();
    let vault = content.get_room("test:vault").unwrap();
    let from_plaza = plaza.exit("east").unwrap().door.unwrap();
    let from_vault = vault.exit("west").unwrap().door.unwrap();

    assert_eq!(from_plaza.unlock(&["credstick".to_string()]), Err(DoorError::NoKey));
    from_plaza.unlock(&["vault_key".to_string()]).unwrap();
    from_plaza.open().unwrap();
    assert_eq!(from_vault.state(), DoorState::Open);

    let zed = Observer::new("Zed");
    move_character(&zed.character, &plaza, None).await;
    let now = go(&zed.character, &plaza, "east").await.unwrap();
    assert!(Arc::ptr_eq(&now, &vault));

    from_vault.close().unwrap();
    assert_eq!(from_plaza.state(), DoorState::Closed);
    assert_eq!(from_vault.open(), Ok(()));
    assert_eq!(from_plaza.open(), Err(DoorError::AlreadyOpen));
}

#[tokio::test]
async fn moving_past_a_stalled_reader_does_not_wait_for_it() {
    let w = world();
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    let alley = w.registry.content.get_room("test:alley").unwrap();
    let stalled = Stalled::new("Lag");
    plaza.admit(&stalled.character);

    let zed = Observer::new("Zed");
    let trip = tokio::time::timeout(Duration::from_secs(2), async {
        move_character(&zed.character, &plaza, None).await;
        go(&zed.character, &plaza, "north").await
    })
    .await;

    let now = trip.expect("movement waited on a full output queue").unwrap();
    assert!(Arc::ptr_eq(&now, &alley));
    assert_eq!(plaza.broadcast("anyone?", &[]), 0);
}
