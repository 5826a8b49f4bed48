use crate::commands::{CmdCtx, Command, CommandResult};
use async_trait::async_trait;

pub struct History;

#[async_trait]
impl Command for History {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, _args: &[String]) -> CommandResult {
        let lines: Vec<String> = ctx
            .character
            .history()
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{:>3}  {line}", i + 1))
            .collect();

        ctx.output.line(lines.join("\n")).await;
        Ok(())
    }
}
