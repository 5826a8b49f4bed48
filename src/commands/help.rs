use crate::commands::{CmdCtx, Command, CommandResult};
use async_trait::async_trait;

pub struct Help;

#[async_trait]
impl Command for Help {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        let role = ctx.character.role();
        let commands = &ctx.registry.commands;

        if let Some(topic) = args.first() {
            // gated commands look exactly like missing ones
            let text = match commands.lookup(topic) {
                Some(def) if def.allowed(role) => {
                    let mut text = format!("Usage: {}", def.usage);
                    if !def.description.is_empty() {
                        text.push_str(&format!("\n{}", def.description));
                    }
                    if !def.aliases.is_empty() {
                        text.push_str(&format!("\nAliases: {}", def.aliases.join(", ")));
                    }
                    text
                }
                _ => format!("No help for '{topic}'."),
            };
            ctx.output.line(text).await;
            return Ok(());
        }

        let mut out = vec!["Available commands".to_string(), "------------------".to_string()];
        for def in commands.visible_to(role) {
            out.push(format!("  {:<28} {}", def.usage, def.description));
        }
        out.push("  quit                         Leave the game".to_string());

        ctx.output.line(out.join("\n")).await;
        Ok(())
    }
}
