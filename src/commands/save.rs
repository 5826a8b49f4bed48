use crate::commands::{CmdCtx, Command, CommandResult};
use async_trait::async_trait;

pub struct Save;

#[async_trait]
impl Command for Save {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, _args: &[String]) -> CommandResult {
        match ctx.registry.services.character.save(&ctx.character).await {
            Ok(()) => ctx.output.line("Saved.").await,
            Err(e) => {
                tracing::error!(character = %ctx.character.name, error = %e, "save failed");
                ctx.output
                    .line("Saving failed; your progress may not have persisted.")
                    .await;
            }
        }
        Ok(())
    }
}
