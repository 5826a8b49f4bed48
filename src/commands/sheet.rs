use crate::commands::{CmdCtx, Command, CommandResult};
use async_trait::async_trait;

pub struct Sheet;

#[async_trait]
impl Command for Sheet {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, _args: &[String]) -> CommandResult {
        let text = ctx
            .registry
            .presenter
            .render_sheet(&ctx.character, &ctx.registry.content);
        ctx.output.line(text).await;
        Ok(())
    }
}
