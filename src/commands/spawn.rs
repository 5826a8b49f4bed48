use crate::commands::{CmdCtx, Command, CommandError, CommandResult};
use async_trait::async_trait;

/// `spawn item|mob <blueprint>`: builders conjure content into the current room.
pub struct Spawn;

#[async_trait]
impl Command for Spawn {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        let (Some(kind), Some(id)) = (args.first(), args.get(1)) else {
            return Err(CommandError::Usage("spawn item|mob <blueprint>"));
        };
        let content = &ctx.registry.content;

        let name = match kind.to_lowercase().as_str() {
            "item" => {
                let item = content.spawn_item(id)?;
                ctx.room.add_item(item.clone());
                item.name().to_string()
            }
            "mob" => {
                let mob = content.spawn_mob(id)?;
                ctx.room.add_mob(mob.clone());
                mob.name().to_string()
            }
            _ => return Err(CommandError::Usage("spawn item|mob <blueprint>")),
        };

        tracing::info!(character = %ctx.character.name, room = %ctx.room.key, blueprint = %id, "spawned");
        ctx.output.line(format!("You conjure {name}.")).await;
        ctx.room
            .broadcast(&format!("{name} flickers into existence."), &[ctx.character.id]);
        Ok(())
    }
}
