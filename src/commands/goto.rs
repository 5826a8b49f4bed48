use crate::commands::{CmdCtx, Command, CommandError, CommandResult};
use crate::services::navigator;
use async_trait::async_trait;

pub struct Goto;

#[async_trait]
impl Command for Goto {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        let Some(key) = args.first() else {
            return Err(CommandError::Usage("goto <area:room>"));
        };
        let target = ctx
            .registry
            .content
            .get_room(key.as_str())
            .ok_or_else(|| CommandError::failed(format!("No room '{key}'.")))?;

        navigator::move_character(&ctx.character, &target, None).await;
        ctx.output
            .line(ctx.registry.presenter.render_room(&target, &ctx.character))
            .await;
        Ok(())
    }
}
