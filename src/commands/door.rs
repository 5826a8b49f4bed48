use crate::commands::{CmdCtx, Command, CommandError, CommandResult};
use crate::models::types::normalize_dir;
use async_trait::async_trait;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    Open,
    Close,
    Lock,
    Unlock,
    Pick,
}

impl DoorAction {
    pub const ALL: [DoorAction; 5] = [
        DoorAction::Open,
        DoorAction::Close,
        DoorAction::Lock,
        DoorAction::Unlock,
        DoorAction::Pick,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DoorAction::Open => "open",
            DoorAction::Close => "close",
            DoorAction::Lock => "lock",
            DoorAction::Unlock => "unlock",
            DoorAction::Pick => "pick",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            DoorAction::Open => "open <direction>",
            DoorAction::Close => "close <direction>",
            DoorAction::Lock => "lock <direction>",
            DoorAction::Unlock => "unlock <direction>",
            DoorAction::Pick => "pick <direction>",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DoorAction::Open => "Open a door",
            DoorAction::Close => "Close a door",
            DoorAction::Lock => "Lock a door with a key you carry",
            DoorAction::Unlock => "Unlock a door with a key you carry",
            DoorAction::Pick => "Try to pick a lock",
        }
    }

    fn first_person(&self) -> &'static str {
        match self {
            DoorAction::Pick => "pick the lock on",
            other => other.name(),
        }
    }

    fn third_person(&self) -> &'static str {
        match self {
            DoorAction::Open => "opens",
            DoorAction::Close => "closes",
            DoorAction::Lock => "locks",
            DoorAction::Unlock => "unlocks",
            DoorAction::Pick => "picks the lock on",
        }
    }

    /// What the far side hears, with nobody to attribute it to.
    fn passive(&self) -> &'static str {
        match self {
            DoorAction::Open => "opens",
            DoorAction::Close => "closes",
            DoorAction::Lock => "locks with a click",
            DoorAction::Unlock | DoorAction::Pick => "unlocks with a click",
        }
    }
}

pub struct DoorCmd(pub DoorAction);

#[async_trait]
impl Command for DoorCmd {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        let action = self.0;
        let Some(dir) = args.first().map(|d| normalize_dir(d)) else {
            return Err(CommandError::Usage(action.usage()));
        };

        let exit = ctx
            .room
            .exit(&dir)
            .ok_or_else(|| CommandError::failed("There is no exit in that direction."))?;
        let door = exit
            .door
            .clone()
            .ok_or_else(|| CommandError::failed(format!("There is no door to the {dir}.")))?;

        let held = ctx.character.held_item_ids();
        match action {
            DoorAction::Open => door.open()?,
            DoorAction::Close => door.close()?,
            DoorAction::Lock => door.lock(&held)?,
            DoorAction::Unlock => door.unlock(&held)?,
            DoorAction::Pick => {
                let roll: u8 = rand::rng().random_range(1..=100);
                if let Err(e) = door.pick(roll) {
                    tracing::debug!(character = %ctx.character.name, roll, difficulty = door.pick_difficulty, "pick failed");
                    return Err(e.into());
                }
            }
        }

        let me = ctx.character.id;
        ctx.output.line(format!("You {} the door to the {dir}.", action.first_person())).await;
        ctx.room
            .broadcast(
                &format!("{} {} the door to the {dir}.", ctx.character.name, action.third_person()),
                &[me],
            );

        // the other side only hears the door
        if let Some(far) = exit.target() {
            if let Some(back) = far.exit_to(&ctx.room.key) {
                far.broadcast(
                    &format!("The door to the {} {} from the other side.", back.direction, action.passive()),
                    &[me],
                );
            }
        }
        Ok(())
    }
}
