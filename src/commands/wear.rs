use crate::commands::{CmdCtx, Command, CommandError, CommandResult};
use crate::models::instance::ItemInstance;
use crate::models::inventory::{EquipError, Inventory};
use async_trait::async_trait;
use std::sync::Arc;

/// `wear <item> [slot]`. Without a slot the first free slot the item fits is used.
pub struct Wear;

/// Split `args` into an item and an optional slot. The last word only counts as a slot
/// when the item named by the words before it can go there; otherwise every word is part
/// of the item name.
fn pick(inventory: &Inventory, args: &[String]) -> Option<(Arc<ItemInstance>, Option<String>)> {
    if let [head @ .., last] = args {
        if !head.is_empty() {
            let fitting = inventory
                .search(&head.join(" "))
                .into_iter()
                .find(|i| i.blueprint.fits_slot(last));
            if let Some(item) = fitting {
                return Some((item, Some(last.to_lowercase())));
            }
        }
    }

    let item = inventory.search(&args.join(" ")).into_iter().next()?;
    Some((item, None))
}

#[async_trait]
impl Command for Wear {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage("wear <item> [slot]"));
        }
        let query = args.join(" ");

        let worn = ctx.character.with_state_mut(|st| -> Result<_, CommandError> {
            let (item, wanted) = pick(&st.inventory, args)
                .ok_or_else(|| CommandError::failed(format!("You are not carrying any '{query}'.")))?;

            let slot = match &wanted {
                Some(slot) => slot.clone(),
                None => {
                    let free = item
                        .blueprint
                        .slots
                        .iter()
                        .find(|s| st.equipment.get(s).is_none())
                        .cloned();
                    match (free, item.blueprint.slots.is_empty()) {
                        (Some(slot), _) => slot,
                        (None, true) => return Err(CommandError::failed(format!("You cannot wear {}.", item.name()))),
                        (None, false) => return Err(EquipError::SlotOccupied.into()),
                    }
                }
            };

            // remove first; put it back if the slot refuses it
            st.inventory.remove(&item);
            if let Err(e) = st.equipment.equip(&slot, item.clone()) {
                st.inventory.add(item);
                return Err(e.into());
            }
            Ok((item, slot))
        });

        let (item, slot) = worn?;
        ctx.output.line(format!("You wear {} on your {slot}.", item.name())).await;
        Ok(())
    }
}

/// `remove <item|slot>`
pub struct Remove;

#[async_trait]
impl Command for Remove {
    async fn run(&self, ctx: &CmdCtx, _invoked: &str, args: &[String]) -> CommandResult {
        if args.is_empty() {
            return Err(CommandError::Usage("remove <item|slot>"));
        }
        let query = args.join(" ");

        let removed = ctx.character.with_state_mut(|st| {
            let slot = match st.equipment.get(&query) {
                Some(_) => Some(query.to_lowercase()),
                None => st.equipment.search(&query).into_iter().next().map(|(slot, _)| slot),
            }?;
            let item = st.equipment.unequip(&slot)?;
            st.inventory.add(item.clone());
            Some(item)
        });

        match removed {
            Some(item) => {
                ctx.output.line(format!("You remove {}.", item.name())).await;
                Ok(())
            }
            None => Err(CommandError::failed(format!("You are not wearing any '{query}'."))),
        }
    }
}
