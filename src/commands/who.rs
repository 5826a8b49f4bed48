use crate::commands::{CmdCtx, Command, CommandResult};
use async_trait::async_trait;

pub struct Who;

#[async_trait]
impl Command for Who {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, _args: &[String]) -> CommandResult {
        let online = ctx.registry.content.online_characters();

        let mut out = vec![format!("Online ({}):", online.len())];
        for c in &online {
            let place = c.room().map(|r| r.name.clone()).unwrap_or_default();
            out.push(format!("  {:<16} {place}", c.name));
        }

        ctx.output.line(out.join("\n")).await;
        Ok(())
    }
}
