mod common;

use common::{FlakyStorage, Observer, Stalled, World, count, state, world, world_with_storage};
use sprawl::models::account::Account;
use sprawl::models::character::Character;
use sprawl::models::types::{CharacterId, Role};
use sprawl::net::output::OutEvent;
use sprawl::net::{ClientEnd, channel_pair};
use sprawl::services::navigator::move_character;
use sprawl::{Session, dispatch};
use std::sync::Arc;
use std::time::Duration;

/// A session already in the game as `name`, standing in the plaza.
async fn in_game(w: &World, name: &str) -> (Session, ClientEnd, Arc<Character>) {
    let (io, end) = channel_pair();
    let character = Arc::new(Character::new(CharacterId::new(), name, "alice", state("test:plaza")));
    character.attach(io.output.clone());
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    move_character(&character, &plaza, None).await;

    let mut sess = Session::new(w.registry.clone(), io, "test-peer".into());
    sess.account = Some(Account::new("alice", "unused".into()));
    sess.character = Some(character.clone());
    (sess, end, character)
}

fn drain(end: &mut ClientEnd) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(OutEvent::Frame(frame, _)) = end.output.try_recv() {
        if let Some(t) = frame.text() {
            out.push(t.to_string());
        }
    }
    out
}

#[tokio::test]
async fn aliases_resolve_to_the_same_command() {
    let w = world();
    let commands = &w.registry.commands;
    let look = commands.lookup("look").unwrap();
    assert!(Arc::ptr_eq(&look, &commands.lookup("L").unwrap()));
    let north = commands.lookup("north").unwrap();
    assert!(Arc::ptr_eq(&north, &commands.lookup("n").unwrap()));
    assert!(!Arc::ptr_eq(&north, &commands.lookup("go").unwrap()));
}

#[tokio::test]
async fn gated_commands_look_unknown() {
    let w = world();
    let (mut sess, mut end, zed) = in_game(&w, "Zed").await;

    dispatch(&mut sess, "spawn item knife").await;
    dispatch(&mut sess, "frobnicate").await;
    let out = drain(&mut end);
    assert!(out.contains(&"Unknown command: spawn".to_string()), "{out:?}");
    assert!(out.contains(&"Unknown command: frobnicate".to_string()), "{out:?}");

    dispatch(&mut sess, "help spawn").await;
    let out = drain(&mut end);
    assert_eq!(count(&out, "No help for 'spawn'"), 1, "{out:?}");

    zed.with_state_mut(|st| st.role = Role::Builder);
    dispatch(&mut sess, "spawn item knife").await;
    let out = drain(&mut end);
    assert_eq!(count(&out, "You conjure knife."), 1, "{out:?}");
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    assert_eq!(plaza.find_items("knife").len(), 1);
}

#[tokio::test]
async fn history_recall_repeats_the_line() {
    let w = world();
    let mut ann = Observer::new("Ann");
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    plaza.admit(&ann.character);

    let (mut sess, mut end, zed) = in_game(&w, "Zed").await;
    dispatch(&mut sess, "say hoi chummer").await;
    dispatch(&mut sess, "!1").await;
    dispatch(&mut sess, "!9").await;

    let heard = ann.drain();
    assert_eq!(count(&heard, "Zed says, 'hoi chummer'"), 2, "{heard:?}");

    let out = drain(&mut end);
    assert_eq!(count(&out, "You say, 'hoi chummer'"), 2, "{out:?}");
    assert!(out.contains(&"No such history entry: 9".to_string()), "{out:?}");
    assert_eq!(zed.history(), vec!["say hoi chummer", "say hoi chummer"]);
}

#[tokio::test]
async fn doors_need_the_key_and_the_far_side_hears_it() {
    let w = world();
    let vault = w.registry.content.get_room("test:vault").unwrap();
    let mut inside = Observer::new("Ann");
    vault.admit(&inside.character);

    let (mut sess, mut end, zed) = in_game(&w, "Zed").await;
    dispatch(&mut sess, "unlock east").await;
    dispatch(&mut sess, "east").await;
    let out = drain(&mut end);
    assert_eq!(count(&out, "You do not have the right key."), 1, "{out:?}");
    assert_eq!(count(&out, "The door to the east is closed."), 1, "{out:?}");

    let key = w.registry.content.spawn_item("vault_key").unwrap();
    zed.with_state_mut(|st| st.inventory.add(key));
    dispatch(&mut sess, "unlock east").await;
    dispatch(&mut sess, "open e").await;
    dispatch(&mut sess, "e").await;

    let out = drain(&mut end);
    assert_eq!(count(&out, "You unlock the door to the east."), 1, "{out:?}");
    assert!(out.iter().any(|l| l.starts_with("Vault")), "{out:?}");
    assert!(vault.contains_character(zed.id));

    let heard = inside.drain();
    assert_eq!(count(&heard, "The door to the west unlocks with a click from the other side."), 1, "{heard:?}");
    assert_eq!(count(&heard, "Zed arrives from the west."), 1, "{heard:?}");
}

#[tokio::test]
async fn say_shortcut_works_glued_to_the_text() {
    let w = world();
    let mut ann = Observer::new("Ann");
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    plaza.admit(&ann.character);

    let (mut sess, mut end, _zed) = in_game(&w, "Zed").await;
    dispatch(&mut sess, "'hello there").await;
    dispatch(&mut sess, "' spaced out").await;

    let heard = ann.drain();
    assert_eq!(count(&heard, "Zed says, 'hello there'"), 1, "{heard:?}");
    assert_eq!(count(&heard, "Zed says, 'spaced out'"), 1, "{heard:?}");
    let out = drain(&mut end);
    assert_eq!(count(&out, "Unknown command"), 0, "{out:?}");
}

#[tokio::test]
async fn a_reader_that_stalled_does_not_hold_up_the_room() {
    let w = world();
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    let stalled = Stalled::new("Lag");
    plaza.admit(&stalled.character);
    let mut ann = Observer::new("Ann");
    plaza.admit(&ann.character);

    let (mut sess, mut end, _zed) = in_game(&w, "Zed").await;
    let said = tokio::time::timeout(Duration::from_secs(2), dispatch(&mut sess, "say anyone here?")).await;
    assert!(said.is_ok(), "say blocked on a full output queue");

    let moved = tokio::time::timeout(Duration::from_secs(2), async {
        dispatch(&mut sess, "north").await;
        dispatch(&mut sess, "south").await;
    })
    .await;
    assert!(moved.is_ok(), "movement blocked on a full output queue");

    let heard = ann.drain();
    assert_eq!(count(&heard, "Zed says, 'anyone here?'"), 1, "{heard:?}");
    assert_eq!(count(&heard, "Zed arrives from the north."), 1, "{heard:?}");
    assert_eq!(count(&drain(&mut end), "You say, 'anyone here?'"), 1);
}

#[tokio::test]
async fn wear_takes_multi_word_names_and_an_optional_slot() {
    let w = world();
    let (mut sess, mut end, zed) = in_game(&w, "Zed").await;
    let jacket = w.registry.content.spawn_item("armor_jacket").unwrap();
    let knife = w.registry.content.spawn_item("knife").unwrap();
    zed.with_state_mut(|st| {
        st.inventory.add(jacket);
        st.inventory.add(knife);
    });

    dispatch(&mut sess, "wear armor jacket").await;
    dispatch(&mut sess, "wear knife hand").await;
    let out = drain(&mut end);
    assert_eq!(count(&out, "You wear armor jacket on your body."), 1, "{out:?}");
    assert_eq!(count(&out, "You wear knife on your hand."), 1, "{out:?}");

    zed.with_state(|st| {
        assert!(st.inventory.is_empty());
        assert_eq!(st.equipment.get("body").map(|i| i.blueprint_id.as_str()), Some("armor_jacket"));
    });
}

#[tokio::test]
async fn failed_save_is_reported_and_memory_keeps_the_change() {
    let storage = Arc::new(FlakyStorage::default());
    let w = world_with_storage(storage.clone());
    let (mut sess, mut end, zed) = in_game(&w, "Zed").await;

    storage.failing(true);
    dispatch(&mut sess, "say still here").await;
    dispatch(&mut sess, "save").await;

    let out = drain(&mut end);
    assert_eq!(count(&out, "your progress may not have persisted."), 1, "{out:?}");
    assert_eq!(zed.history(), vec!["say still here", "save"]);
    assert!(w.registry.storage.load_character("zed").await.unwrap().is_none());

    storage.failing(false);
    dispatch(&mut sess, "save").await;
    assert_eq!(count(&drain(&mut end), "Saved."), 1);
    let record = w.registry.storage.load_character("zed").await.unwrap().unwrap();
    assert_eq!(record.history, vec!["say still here", "save", "save"]);
}
