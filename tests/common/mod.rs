#![allow(dead_code)]

use rand::SeedableRng;
use rand::rngs::StdRng;
use sprawl::config::Config;
use sprawl::content::ContentRegistry;
use sprawl::content::loader::LoadReport;
use sprawl::models::character::{Character, CharacterState};
use sprawl::models::inventory::{Equipment, Inventory};
use sprawl::models::types::{CharacterId, Role};
use sprawl::net::output::{OutEvent, OutFrame, OutputHandle};
use sprawl::net::{ClientEnd, InputEvent, channel_pair};
use sprawl::renderer::PlainPresenter;
use sprawl::state::machine;
use sprawl::error::AppResult;
use sprawl::models::account::Account;
use sprawl::models::character::CharacterRecord;
use sprawl::storage::{MemoryStorage, Storage};
use sprawl::{Registry, Session};
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(30);

/// A small test world: plaza, alley, a locked vault and a stash full of loot.
const FIXTURE: &[(&str, &str)] = &[
    (
        "metatypes/human.yaml",
        "id: human\nname: Human\ncarry_capacity: 10\n",
    ),
    (
        "pregens/runner.yaml",
        "id: runner\nname: Runner\nsummary: Fast and broke.\nmetatype: human\nitems: [knife]\n",
    ),
    ("areas/test/manifest.yaml", "id: test\nname: Test Area\n"),
    (
        "areas/test/items/knife.yaml",
        "id: knife\nname: knife\ntags: [blade]\nweight: 0.5\nslots: [hand]\nattachments: [sheath]\n",
    ),
    (
        "areas/test/items/sheath.yaml",
        "id: sheath\nname: sheath\nweight: 0.1\n",
    ),
    (
        "areas/test/items/armor_jacket.yaml",
        "id: armor_jacket\nname: armor jacket\ntags: [armor]\nweight: 2\nslots: [body]\n",
    ),
    (
        "areas/test/items/credstick.yaml",
        "id: credstick\nname: credstick\ntags: [cred]\nweight: 0.1\n",
    ),
    (
        "areas/test/items/anvil.yaml",
        "id: anvil\nname: anvil\nweight: 500\n",
    ),
    (
        "areas/test/items/vault_key.yaml",
        "id: vault_key\nname: vault key\ntags: [key]\nweight: 0.1\n",
    ),
    (
        "areas/test/mobs/guard.yaml",
        "id: guard\nname: guard\nhealth: 10\n",
    ),
    (
        "areas/test/rooms/plaza.yaml",
        "\
id: plaza
name: Plaza
description: Wide and wet.
exits:
  north:
    to: alley
  east:
    to: vault
    door:
      closed: true
      locked: true
      keys: [vault_key]
      pick_difficulty: 100
",
    ),
    (
        "areas/test/rooms/alley.yaml",
        "\
id: alley
name: Alley
description: Narrow and dark.
exits:
  south:
    to: plaza
spawns:
  - type: item
    id: credstick
    quantity: 5
    chance: 0
  - type: item
    id: ghost_item
  - type: mob
    id: guard
    chance: 100
    equipment:
      - slot: hand
        id: knife
      - slot: hand
        id: knife
",
    ),
    (
        "areas/test/rooms/vault.yaml",
        "\
id: vault
name: Vault
description: Cold steel all around.
exits:
  west:
    to: plaza
",
    ),
    (
        "areas/test/rooms/stash.yaml",
        "\
id: stash
name: Stash
description: Boxes on boxes.
exits:
  out:
    to: plaza
spawns:
  - type: item
    id: credstick
    quantity: 3
    chance: 100
  - type: item
    id: anvil
",
    ),
];

pub struct World {
    pub registry: Arc<Registry>,
    pub report: LoadReport,
    _dir: TempDir,
}

pub fn write_fixture(base: &Path) {
    for (rel, body) in FIXTURE {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }
}

pub fn config() -> Config {
    Config {
        starting_room: "test:plaza".into(),
        autosave_secs: 0,
        ..Config::default()
    }
}

pub fn world() -> World {
    world_with(config())
}

pub fn world_with(cfg: Config) -> World {
    build_world(cfg, &[], Arc::new(MemoryStorage::new()))
}

/// The fixture plus `extra` files written on top of it.
pub fn world_with_files(extra: &[(&str, &str)]) -> World {
    build_world(config(), extra, Arc::new(MemoryStorage::new()))
}

pub fn world_with_storage(storage: Arc<dyn Storage>) -> World {
    build_world(config(), &[], storage)
}

fn build_world(mut cfg: Config, extra: &[(&str, &str)], storage: Arc<dyn Storage>) -> World {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    for (rel, body) in extra {
        fs::write(dir.path().join(rel), body).unwrap();
    }
    cfg.content_dir = dir.path().to_path_buf();

    let content = Arc::new(ContentRegistry::new());
    let report = content.load_all(dir.path(), &mut StdRng::seed_from_u64(7));

    let registry = Registry::new(Arc::new(cfg), content, storage, Arc::new(PlainPresenter)).unwrap();

    World {
        registry: Arc::new(registry),
        report,
        _dir: dir,
    }
}

pub fn state(room_key: &str) -> CharacterState {
    CharacterState {
        metatype: "human".into(),
        archetype: "runner".into(),
        role: Role::Player,
        room_key: room_key.into(),
        inventory: Inventory::new(),
        equipment: Equipment::new(),
        qualities: vec![],
        skills: BTreeMap::new(),
        labels: vec![],
        dispositions: BTreeMap::new(),
        carry_capacity: 10.0,
        history: VecDeque::new(),
        created_at: chrono::Utc::now(),
    }
}

/// A character that is not driven by a session, with its own output channel.
pub struct Observer {
    pub character: Arc<Character>,
    rx: mpsc::Receiver<OutEvent>,
}

impl Observer {
    pub fn new(name: &str) -> Self {
        let (tx, rx) = mpsc::channel(256);
        let character = Arc::new(Character::new(CharacterId::new(), name, "observers", state("")));
        character.attach(OutputHandle::new(tx));
        Self { character, rx }
    }

    /// Everything received so far.
    pub fn drain(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if let OutEvent::Frame(frame, _) = event {
                if let Some(text) = frame.text() {
                    out.push(text.to_string());
                }
            }
        }
        out
    }
}

/// A character whose client stopped reading: its output queue holds one frame and is full.
pub struct Stalled {
    pub character: Arc<Character>,
    _rx: mpsc::Receiver<OutEvent>,
}

impl Stalled {
    pub fn new(name: &str) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let out = OutputHandle::new(tx);
        assert!(out.notify("filler"));
        let character = Arc::new(Character::new(CharacterId::new(), name, "observers", state("")));
        character.attach(out);
        Self { character, _rx: rx }
    }
}

/// Memory storage whose character saves can be made to fail.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    pub fail_character_saves: AtomicBool,
}

impl FlakyStorage {
    pub fn failing(&self, fail: bool) {
        self.fail_character_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn load_account(&self, name: &str) -> AppResult<Option<Account>> {
        self.inner.load_account(name).await
    }

    async fn save_account(&self, account: &Account) -> AppResult<()> {
        self.inner.save_account(account).await
    }

    async fn load_character(&self, name: &str) -> AppResult<Option<CharacterRecord>> {
        self.inner.load_character(name).await
    }

    async fn save_character(&self, record: &CharacterRecord) -> AppResult<()> {
        if self.fail_character_saves.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("disk full").into());
        }
        self.inner.save_character(record).await
    }
}

pub fn count(lines: &[String], needle: &str) -> usize {
    lines.iter().filter(|l| l.contains(needle)).count()
}

/// Drives a real session through the connection state machine.
pub struct Client {
    end: ClientEnd,
    pub seen: Vec<OutFrame>,
    pub closed: bool,
}

impl Client {
    pub fn connect(registry: &Arc<Registry>) -> Self {
        let (io, end) = channel_pair();
        let sess = Session::new(registry.clone(), io, "test-peer".into());
        tokio::spawn(machine::run(sess));
        Self {
            end,
            seen: Vec::new(),
            closed: false,
        }
    }

    pub async fn send(&self, line: &str) {
        self.end.input.send(InputEvent::Line(line.into())).await.unwrap();
    }

    async fn next(&mut self) -> Option<OutFrame> {
        match tokio::time::timeout(WAIT, self.end.output.recv()).await {
            Ok(Some(OutEvent::Frame(frame, _))) => {
                self.seen.push(frame.clone());
                Some(frame)
            }
            Ok(Some(OutEvent::Close)) | Ok(None) => {
                self.closed = true;
                None
            }
            Err(_) => panic!("timed out; output so far: {:#?}", self.seen),
        }
    }

    /// Read until a frame containing `needle` arrives.
    pub async fn expect(&mut self, needle: &str) {
        while let Some(frame) = self.next().await {
            if frame.text().is_some_and(|t| t.contains(needle)) {
                return;
            }
        }
        panic!("connection closed before '{needle}'; output: {:#?}", self.seen);
    }

    /// Read until the prompt `text` is shown, then answer it.
    pub async fn answer(&mut self, text: &str, line: &str) {
        while let Some(frame) = self.next().await {
            if matches!(&frame, OutFrame::Prompt(p) if p == text) {
                self.send(line).await;
                return;
            }
        }
        panic!("connection closed before prompt '{text}'; output: {:#?}", self.seen);
    }

    /// Read until the session closes the connection.
    pub async fn until_closed(&mut self) {
        while self.next().await.is_some() {}
    }

    pub fn transcript(&self) -> Vec<String> {
        self.seen.iter().filter_map(|f| f.text().map(str::to_string)).collect()
    }

    /// Register `account`, create character `name` from the first archetype and enter the game.
    pub async fn register_and_play(&mut self, account: &str, password: &str, name: &str) {
        self.answer("Press enter to continue", "").await;
        self.answer("Name (or 'new'): ", "new").await;
        self.answer("Choose an account name (or 'back'): ", account).await;
        self.answer("Choose a password: ", password).await;
        self.answer("Confirm password: ", password).await;
        self.answer("> ", "2").await;
        self.answer("Choice (or 'back'): ", "1").await;
        self.answer("Choose an archetype (or 'back'): ", "1").await;
        self.answer("Play this archetype? (yes/no): ", "yes").await;
        self.answer("Name your character (or 'back'): ", name).await;
        self.answer("> ", "1").await;
        self.answer("Play as: ", name).await;
    }
}
