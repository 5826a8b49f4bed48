mod common;

use common::{Client, FlakyStorage, Observer, config, count, world, world_with, world_with_storage};
use sprawl::config::Config;
use std::sync::Arc;

#[tokio::test]
async fn register_create_enter_and_walk() {
    let w = world();
    let content = &w.registry.content;
    let plaza = content.get_room("test:plaza").unwrap();
    let alley = content.get_room("test:alley").unwrap();

    let mut ann = Observer::new("Ann");
    let mut bob = Observer::new("Bob");
    plaza.admit(&ann.character);
    alley.admit(&bob.character);

    let before = content.item_instances().len();
    let mut client = Client::connect(&w.registry);
    client.register_and_play("alice", "Secr3t!", "Zed").await;
    client.expect("Plaza").await;

    let zed = content.find_character_by_name("zed").expect("Zed is online");
    // knife plus its sheath
    assert_eq!(content.item_instances().len(), before + 2);
    assert!(plaza.contains_character(zed.id));
    assert_eq!(count(&ann.drain(), "Zed arrives."), 1);

    client.answer("> ", "north").await;
    client.expect("Narrow and dark.").await;

    assert!(alley.contains_character(zed.id));
    assert!(!plaza.contains_character(zed.id));
    assert_eq!(count(&ann.drain(), "Zed leaves north."), 1);
    assert_eq!(count(&bob.drain(), "Zed arrives from the south."), 1);

    client.answer("> ", "quit").await;
    client.expect("You jack out of the Sprawl.").await;
    client.answer("> ", "4").await;
    client.until_closed().await;

    assert_eq!(count(&bob.drain(), "Zed leaves the game."), 1);
    assert!(!alley.contains_character(zed.id));
    assert!(content.find_character_by_name("zed").is_none());
    assert_eq!(content.item_instances().len(), before);

    let account = w.registry.storage.load_account("alice").await.unwrap().unwrap();
    assert_eq!(account.characters, vec!["Zed"]);
    assert!(account.last_login.is_some());
    let record = w.registry.storage.load_character("zed").await.unwrap().unwrap();
    assert_eq!(record.room, "test:alley");
    assert_eq!(record.inventory.len(), 1);
    assert_eq!(record.inventory[0].blueprint, "knife");
}

#[tokio::test]
async fn get_all_stops_when_the_bag_is_full() {
    let w = world_with(Config {
        starting_room: "test:stash".into(),
        ..config()
    });

    let mut client = Client::connect(&w.registry);
    client.register_and_play("carol", "Hunter2!", "Kit").await;
    client.expect("Boxes on boxes.").await;

    client.answer("> ", "get all").await;
    client.expect("left behind").await;

    let text = client.transcript();
    assert_eq!(count(&text, "You pick up credstick, credstick, credstick."), 1, "{text:?}");
    assert_eq!(count(&text, "You cannot carry any more; 1 left behind."), 1, "{text:?}");

    let kit = w.registry.content.find_character_by_name("Kit").unwrap();
    let carried = kit.with_state(|st| st.inventory.search("cred").len());
    assert_eq!(carried, 3);
    let stash = w.registry.content.get_room("test:stash").unwrap();
    let left: Vec<String> = stash.items().iter().map(|i| i.name().to_string()).collect();
    assert_eq!(left, vec!["anvil"]);
}

#[tokio::test]
async fn wrong_password_gets_the_generic_answer() {
    let w = world();
    let hash = w.registry.services.account.hash_password("Secr3t!").unwrap();
    let account = sprawl::models::account::Account::new("dave", hash);
    w.registry.storage.save_account(&account).await.unwrap();

    let mut client = Client::connect(&w.registry);
    client.answer("Press enter to continue", "").await;
    client.answer("Name (or 'new'): ", "dave").await;
    client.answer("Password: ", "nope").await;
    client.expect("Invalid name or password.").await;
    client.answer("Name (or 'new'): ", "nobody").await;
    client.answer("Password: ", "Secr3t!").await;
    client.expect("Invalid name or password.").await;
    client.answer("Name (or 'new'): ", "dave").await;
    client.answer("Password: ", "Secr3t!").await;
    client.expect("Welcome back, dave.").await;
}

#[tokio::test]
async fn dropping_the_connection_in_game_saves_and_leaves() {
    let w = world();
    let plaza = w.registry.content.get_room("test:plaza").unwrap();
    let mut ann = Observer::new("Ann");
    plaza.admit(&ann.character);

    let mut client = Client::connect(&w.registry);
    client.register_and_play("erin", "Secr3t!", "Vex").await;
    client.expect("Plaza").await;
    client.answer("> ", "say bye").await;
    client.expect("You say, 'bye'").await;
    drop(client);

    // the session notices the closed input and runs the exit path
    for _ in 0..100 {
        if w.registry.content.find_character_by_name("Vex").is_none() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(w.registry.content.find_character_by_name("Vex").is_none());
    assert_eq!(count(&ann.drain(), "Vex leaves the game."), 1);
    let record = w.registry.storage.load_character("vex").await.unwrap().unwrap();
    assert_eq!(record.history, vec!["say bye"]);
}

#[tokio::test]
async fn coming_back_does_not_pile_up_item_instances() {
    let w = world();
    let content = &w.registry.content;
    let before = content.item_instances().len();

    let mut client = Client::connect(&w.registry);
    client.register_and_play("frank", "Secr3t!", "Rook").await;
    for _ in 0..3 {
        client.expect("Plaza").await;
        client.answer("> ", "quit").await;
        client.expect("You jack out of the Sprawl.").await;
        // the main menu only shows once the exit has finished
        client.answer("> ", "1").await;
        assert_eq!(content.item_instances().len(), before);
        client.answer("Play as: ", "Rook").await;
    }
    client.expect("Plaza").await;
    assert_eq!(content.item_instances().len(), before + 2);
}

#[tokio::test]
async fn failed_save_on_exit_is_reported() {
    let storage = Arc::new(FlakyStorage::default());
    let w = world_with_storage(storage.clone());

    let mut client = Client::connect(&w.registry);
    client.register_and_play("gwen", "Secr3t!", "Nyx").await;
    client.expect("Plaza").await;
    client.answer("> ", "north").await;
    client.expect("Narrow and dark.").await;

    storage.failing(true);
    client.answer("> ", "quit").await;
    client.expect("You jack out of the Sprawl.").await;
    client.expect("Your progress may not have persisted.").await;

    // the stored record still has the room from when Nyx entered
    let record = w.registry.storage.load_character("nyx").await.unwrap().unwrap();
    assert_eq!(record.room, "test:plaza");
    assert!(w.registry.content.find_character_by_name("Nyx").is_none());
}
