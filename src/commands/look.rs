use crate::commands::{CmdCtx, Command, CommandResult};
use async_trait::async_trait;

pub struct Look;

#[async_trait]
impl Command for Look {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, _args: &[String]) -> CommandResult {
        let view = ctx.registry.presenter.render_room(&ctx.room, &ctx.character);
        ctx.output.line(view).await;
        Ok(())
    }
}
