use crate::commands::{CmdCtx, Command, CommandError, CommandResult, parse_quantity};
use crate::models::instance::ItemInstance;
use crate::models::inventory::transfer_matching;
use async_trait::async_trait;
use std::sync::Arc;

fn names(items: &[Arc<ItemInstance>]) -> String {
    items.iter().map(|i| i.name()).collect::<Vec<_>>().join(", ")
}

/// `get [all|<n>] <item>`: floor to inventory, bounded by what the character can still carry.
pub struct Get;

#[async_trait]
impl Command for Get {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage("get [all|<n>] <item>"));
        }
        let (quantity, query) = parse_quantity(args);

        // room lock first, then the character's
        let report = ctx.room.with_items_mut(|floor| {
            ctx.character.with_state_mut(|st| {
                let capacity = st.remaining_capacity();
                transfer_matching(floor, &mut st.inventory, &query, quantity, Some(capacity))
            })
        });

        if report.matched == 0 {
            return Err(CommandError::failed(format!("You don't see any '{query}' here.")));
        }

        if !report.moved.is_empty() {
            let list = names(&report.moved);
            ctx.output.line(format!("You pick up {list}.")).await;
            ctx.room
                .broadcast(&format!("{} picks up {list}.", ctx.character.name), &[ctx.character.id]);
        }

        if !report.is_complete() {
            let left = report.left_behind();
            ctx.output
                .line(format!("You cannot carry any more; {left} left behind."))
                .await;
        }

        tracing::debug!(
            character = %ctx.character.name,
            room = %ctx.room.key,
            moved = report.moved.len(),
            requested = report.requested,
            "get"
        );
        Ok(())
    }
}

/// Hints for `get` that help before the attempt is made.
pub fn suggest_get(ctx: &CmdCtx, args: &[String]) -> Option<String> {
    let (_, query) = parse_quantity(args);
    if query.is_empty() || !ctx.room.find_items(&query).is_empty() {
        return None;
    }

    if let Some(mob) = ctx.room.find_mob(&query) {
        return Some(format!("Hint: {} is not something you can pick up.", mob.name()));
    }
    let carried = ctx.character.with_state(|st| !st.inventory.search(&query).is_empty());
    if carried {
        return Some("Hint: you already carry something like that; try 'inventory'.".to_string());
    }
    None
}

/// `drop [all|<n>] <item>`
pub struct Drop;

#[async_trait]
impl Command for Drop {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage("drop [all|<n>] <item>"));
        }
        let (quantity, query) = parse_quantity(args);

        let report = ctx.room.with_items_mut(|floor| {
            ctx.character
                .with_state_mut(|st| transfer_matching(&mut st.inventory, floor, &query, quantity, None))
        });

        if report.moved.is_empty() {
            return Err(CommandError::failed(format!("You are not carrying any '{query}'.")));
        }

        let list = names(&report.moved);
        ctx.output.line(format!("You drop {list}.")).await;
        ctx.room
            .broadcast(&format!("{} drops {list}.", ctx.character.name), &[ctx.character.id]);
        Ok(())
    }
}
