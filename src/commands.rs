use crate::Registry;
use crate::error::DomainError;
use crate::models::account::Account;
use crate::models::character::Character;
use crate::models::inventory::EquipError;
use crate::models::room::{DoorError, Room};
use crate::models::types::Role;
use crate::net::output::OutputHandle;
use crate::services::MoveError;
use crate::state::session::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

mod door;
mod go;
mod goto;
mod help;
mod history;
mod inventory;
mod look;
mod save;
mod say;
mod sheet;
mod spawn;
mod take;
mod time;
mod wear;
mod who;

pub type CommandResult = Result<(), CommandError>;

/// A command handler. `invoked` is the token the player typed (canonical name or alias).
#[async_trait]
pub trait Command: Send + Sync {
    async fn run(&self, ctx: &CmdCtx, invoked: &str, args: &[String]) -> CommandResult;
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),

    /// The action could not be done; the message is for the player
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Door(#[from] DoorError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error("cannot equip: {0:?}")]
    Equip(EquipError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<EquipError> for CommandError {
    fn from(e: EquipError) -> Self {
        CommandError::Equip(e)
    }
}

impl CommandError {
    pub fn failed(msg: impl Into<String>) -> Self {
        CommandError::Failed(msg.into())
    }

    fn player_message(&self) -> String {
        match self {
            CommandError::Usage(u) => format!("Usage: {u}"),
            CommandError::Failed(m) => m.clone(),
            CommandError::Door(e) => e.to_string(),
            CommandError::Move(e) => e.to_string(),
            CommandError::Equip(EquipError::InvalidSlot) => "That cannot be worn there.".to_string(),
            CommandError::Equip(EquipError::SlotOccupied) => "You are already wearing something there.".to_string(),
            CommandError::Domain(e) => e.user_message(),
        }
    }
}

/// What a handler gets to work with. Account and room are snapshots taken at dispatch.
pub struct CmdCtx {
    pub registry: Arc<Registry>,
    pub output: OutputHandle,
    pub account: Account,
    pub character: Arc<Character>,
    pub room: Arc<Room>,
}

pub type SuggestFn = fn(&CmdCtx, &[String]) -> Option<String>;

pub struct CommandDef {
    pub name: &'static str,
    pub aliases: Vec<&'static str>,
    pub usage: &'static str,
    pub description: &'static str,
    /// Roles allowed to run this; empty means everyone
    pub roles: Vec<Role>,
    pub handler: Arc<dyn Command>,
    /// Printed before the handler runs when it returns something
    pub suggest: Option<SuggestFn>,
}

impl CommandDef {
    pub fn new(name: &'static str, handler: impl Command + 'static) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            usage: name,
            description: "",
            roles: Vec::new(),
            handler: Arc::new(handler),
            suggest: None,
        }
    }

    pub fn aliases(mut self, aliases: &[&'static str]) -> Self {
        self.aliases = aliases.to_vec();
        self
    }

    pub fn usage(mut self, usage: &'static str) -> Self {
        self.usage = usage;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn roles(mut self, roles: &[Role]) -> Self {
        self.roles = roles.to_vec();
        self
    }

    pub fn suggest(mut self, f: SuggestFn) -> Self {
        self.suggest = Some(f);
        self
    }

    pub fn allowed(&self, role: Role) -> bool {
        self.roles.is_empty() || self.roles.contains(&role)
    }
}

/// Name and alias table. Later registrations replace earlier ones key by key.
#[derive(Default)]
pub struct CommandRegistry {
    table: HashMap<String, Arc<CommandDef>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        for def in default_commands() {
            reg.register(def);
        }
        reg
    }

    pub fn register(&mut self, def: CommandDef) {
        let def = Arc::new(def);
        for key in std::iter::once(def.name).chain(def.aliases.iter().copied()) {
            if let Some(prev) = self.table.insert(key.to_lowercase(), def.clone()) {
                if prev.name != def.name {
                    tracing::debug!(key, old = prev.name, new = def.name, "command key replaced");
                }
            }
        }
    }

    pub fn lookup(&self, token: &str) -> Option<Arc<CommandDef>> {
        self.table.get(&token.to_lowercase()).cloned()
    }

    /// Commands `role` may run, one entry per command, sorted by name.
    pub fn visible_to(&self, role: Role) -> Vec<Arc<CommandDef>> {
        let mut defs: Vec<Arc<CommandDef>> = Vec::new();
        for def in self.table.values() {
            if def.allowed(role) && !defs.iter().any(|d| Arc::ptr_eq(d, def)) {
                defs.push(def.clone());
            }
        }
        defs.sort_by(|a, b| a.name.cmp(b.name));
        defs
    }
}

pub fn default_commands() -> Vec<CommandDef> {
    let mut defs = vec![
        CommandDef::new("help", help::Help)
            .aliases(&["?"])
            .usage("help [command]")
            .describe("List commands or show how to use one"),
        CommandDef::new("look", look::Look)
            .aliases(&["l"])
            .describe("Look around"),
        CommandDef::new("go", go::Go)
            .usage("go <direction>")
            .describe("Walk through an exit"),
        CommandDef::new("say", say::Say)
            .aliases(&["'"])
            .usage("say <message>")
            .describe("Say something to everyone in the room"),
        CommandDef::new("who", who::Who).describe("List who is online"),
        CommandDef::new("inventory", inventory::ShowInventory)
            .aliases(&["i", "inv"])
            .describe("List what you carry"),
        CommandDef::new("equipment", inventory::ShowEquipment)
            .aliases(&["eq"])
            .describe("List what you wear"),
        CommandDef::new("get", take::Get)
            .aliases(&["take"])
            .usage("get [all|<n>] <item>")
            .describe("Pick something up")
            .suggest(take::suggest_get),
        CommandDef::new("drop", take::Drop)
            .usage("drop [all|<n>] <item>")
            .describe("Put something down"),
        CommandDef::new("wear", wear::Wear)
            .aliases(&["wield", "equip"])
            .usage("wear <item> [slot]")
            .describe("Wear or wield something you carry"),
        CommandDef::new("remove", wear::Remove)
            .aliases(&["unequip"])
            .usage("remove <item|slot>")
            .describe("Take off something you wear"),
        CommandDef::new("history", history::History)
            .aliases(&["hist"])
            .describe("Show your recent commands; repeat one with !<n>"),
        CommandDef::new("time", time::Time).describe("Show the time of day"),
        CommandDef::new("sheet", sheet::Sheet)
            .aliases(&["score"])
            .describe("Show your character sheet"),
        CommandDef::new("save", save::Save).describe("Save your character now"),
        CommandDef::new("spawn", spawn::Spawn)
            .usage("spawn item|mob <blueprint>")
            .describe("Create an item or creature here")
            .roles(&[Role::Builder, Role::Admin]),
        CommandDef::new("goto", goto::Goto)
            .usage("goto <area:room>")
            .describe("Go straight to a room")
            .roles(&[Role::Admin]),
    ];

    for (dir, aliases) in go::DIRECTIONS {
        defs.push(CommandDef::new(dir, go::Go).aliases(aliases).describe("Walk in that direction"));
    }
    for action in door::DoorAction::ALL {
        defs.push(
            CommandDef::new(action.name(), door::DoorCmd(action))
                .usage(action.usage())
                .describe(action.description()),
        );
    }

    defs
}

/// Run one line of player input against the world.
pub async fn dispatch(sess: &mut Session, raw: &str) {
    let (Some(account), Some(character)) = (sess.account.clone(), sess.character.clone()) else {
        tracing::error!(peer = %sess.peer, "dispatch without account or character");
        sess.output.system("You are not in the game.").await;
        return;
    };
    let Some(room) = character.room() else {
        tracing::error!(character = %character.name, "dispatch without a room");
        sess.output.system("You are nowhere. Try again in a moment.").await;
        return;
    };

    let raw = raw.trim();
    let line = match raw.strip_prefix('!') {
        Some(n) => match n.parse::<usize>().ok().and_then(|n| character.history_entry(n)) {
            Some(line) => {
                sess.output.system(line.clone()).await;
                line
            }
            None => {
                sess.output.system(format!("No such history entry: {n}")).await;
                return;
            }
        },
        None => raw.to_string(),
    };

    character.push_history(&line, sess.registry.config.history_size);

    let Some((token, args)) = tokenize(&line) else {
        return;
    };

    let def = match sess.registry.commands.lookup(token) {
        Some(def) if def.allowed(character.role()) => def,
        _ => {
            sess.output.system(format!("Unknown command: {token}")).await;
            return;
        }
    };

    let ctx = CmdCtx {
        registry: sess.registry.clone(),
        output: sess.output.clone(),
        account,
        character,
        room,
    };

    if let Some(hint) = def.suggest.and_then(|f| f(&ctx, &args)) {
        ctx.output.system(hint).await;
    }

    let invoked = token.to_lowercase();
    if let Err(e) = def.handler.run(&ctx, &invoked, &args).await {
        if let CommandError::Domain(err) = &e {
            tracing::error!(character = %ctx.character.name, command = def.name, error = %err, "command failed");
        }
        ctx.output.line(e.player_message()).await;
    }
}

/// Split a line into the command token and its arguments. A leading punctuation shortcut
/// stands on its own even when glued to the text: `'hi there` is `'` with `[hi, there]`.
fn tokenize(line: &str) -> Option<(&str, Vec<String>)> {
    let line = line.trim_start();
    let first = line.chars().next()?;
    let (token, rest) = if first.is_ascii_punctuation() {
        line.split_at(first.len_utf8())
    } else {
        line.split_once(char::is_whitespace).unwrap_or((line, ""))
    };
    Some((token, rest.split_whitespace().map(str::to_string).collect()))
}

/// Split `[all|<n>] <words...>` into a quantity and the remaining query.
pub(crate) fn parse_quantity(args: &[String]) -> (crate::models::inventory::Quantity, String) {
    use crate::models::inventory::Quantity;

    match args.split_first() {
        Some((first, rest)) if first.eq_ignore_ascii_case("all") => (Quantity::All, rest.join(" ")),
        Some((first, rest)) if !rest.is_empty() => match first.parse::<usize>() {
            Ok(n) if n > 0 => (Quantity::Exactly(n), rest.join(" ")),
            _ => (Quantity::Exactly(1), args.join(" ")),
        },
        _ => (Quantity::Exactly(1), args.join(" ")),
    }
}
