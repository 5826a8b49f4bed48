use crate::commands::{CmdCtx, Command, CommandError, CommandResult};
use async_trait::async_trait;

pub struct Say;

#[async_trait]
impl Command for Say {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage("say <message>"));
        }
        let msg = args.join(" ");

        ctx.room
            .broadcast(&format!("{} says, '{msg}'", ctx.character.name), &[ctx.character.id]);
        ctx.output.line(format!("You say, '{msg}'")).await;
        Ok(())
    }
}
