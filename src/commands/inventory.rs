use crate::commands::{CmdCtx, Command, CommandResult};
use async_trait::async_trait;

pub struct ShowInventory;

#[async_trait]
impl Command for ShowInventory {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, _args: &[String]) -> CommandResult {
        let text = ctx.character.with_state(|st| {
            if st.inventory.is_empty() {
                return "You are not carrying anything.".to_string();
            }
            let mut out = vec!["You are carrying:".to_string()];
            for item in st.inventory.items() {
                out.push(format!("  {} ({:.1} kg)", item.name(), item.weight()));
            }
            out.push(format!("Load: {:.1} / {:.1} kg", st.carried_weight(), st.carry_capacity));
            out.join("\n")
        });

        ctx.output.line(text).await;
        Ok(())
    }
}

pub struct ShowEquipment;

#[async_trait]
impl Command for ShowEquipment {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, _args: &[String]) -> CommandResult {
        let text = ctx.character.with_state(|st| {
            if st.equipment.is_empty() {
                return "You are not wearing anything.".to_string();
            }
            let mut out = vec!["You are wearing:".to_string()];
            for (slot, item) in st.equipment.iter() {
                out.push(format!("  <{slot}> {}", item.name()));
            }
            out.join("\n")
        });

        ctx.output.line(text).await;
        Ok(())
    }
}
