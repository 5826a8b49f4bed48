use crate::commands::{CmdCtx, Command, CommandResult};
use async_trait::async_trait;

pub struct Time;

#[async_trait]
impl Command for Time {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, _args: &[String]) -> CommandResult {
        let now = ctx.registry.clock.now();
        let part = if now.is_night() { "night" } else { "day" };
        ctx.output.line(format!("It is {now}. ({part})")).await;
        Ok(())
    }
}
