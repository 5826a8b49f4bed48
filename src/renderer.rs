//! Presentation collaborator. Turns world state into text; no colors, no tables.

use crate::content::ContentRegistry;
use crate::models::character::Character;
use crate::models::room::{DoorState, Room};

pub trait Presenter: Send + Sync {
    /// What `viewer` sees when looking around `room`.
    fn render_room(&self, room: &Room, viewer: &Character) -> String;

    fn render_sheet(&self, character: &Character, content: &ContentRegistry) -> String;
}

const RULE: &str = "--------------------------------------------------";

#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPresenter;

impl PlainPresenter {
    fn exits_line(room: &Room) -> String {
        let exits: Vec<String> = room
            .exits()
            .into_iter()
            .map(|e| match e.door.as_ref().map(|d| d.state()) {
                Some(DoorState::Open) | None => e.direction,
                Some(_) => format!("{} (closed)", e.direction),
            })
            .collect();
        if exits.is_empty() {
            "none".to_string()
        } else {
            exits.join(", ")
        }
    }
}

impl Presenter for PlainPresenter {
    fn render_room(&self, room: &Room, viewer: &Character) -> String {
        let mut out = vec![room.name.clone(), RULE.to_string()];
        if !room.description.is_empty() {
            out.push(room.description.clone());
        }

        let items: Vec<String> = room.items().iter().map(|i| i.name().to_string()).collect();
        if !items.is_empty() {
            out.push(format!("You see: {}", items.join(", ")));
        }

        for mob in room.mobs() {
            out.push(format!("{} is here.", capitalize(mob.name())));
        }
        for other in room.characters().iter().filter(|c| c.id != viewer.id) {
            out.push(format!("{} is here.", other.name));
        }

        out.push(format!("Exits: {}", Self::exits_line(room)));
        out.join("\n")
    }

    fn render_sheet(&self, character: &Character, content: &ContentRegistry) -> String {
        character.with_state(|st| {
            let metatype = content
                .get_metatype(st.metatype.as_str())
                .map(|m| m.name.clone())
                .unwrap_or_else(|| st.metatype.clone());
            let archetype = content
                .get_pregen(st.archetype.as_str())
                .map(|p| p.name.clone())
                .unwrap_or_else(|| st.archetype.clone());

            let mut out = vec![
                character.name.clone(),
                RULE.to_string(),
                format!("Metatype:  {metatype}"),
                format!("Archetype: {archetype}"),
                format!("Role:      {}", st.role),
                format!("Load:      {:.1} / {:.1}", st.carried_weight(), st.carry_capacity),
            ];

            if !st.qualities.is_empty() {
                let names: Vec<String> = st
                    .qualities
                    .iter()
                    .map(|q| content.get_quality(q.as_str()).map(|q| q.name.clone()).unwrap_or_else(|| q.clone()))
                    .collect();
                out.push(format!("Qualities: {}", names.join(", ")));
            }

            if !st.skills.is_empty() {
                out.push("Skills:".to_string());
                for (id, rating) in &st.skills {
                    let name = content.get_skill(id.as_str()).map(|s| s.name.clone()).unwrap_or_else(|| id.clone());
                    out.push(format!("  {name:<20} {rating}"));
                }
            }

            if !st.labels.is_empty() {
                out.push(format!("Labels:    {}", st.labels.join(", ")));
            }

            out.join("\n")
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::character::CharacterState;
    use crate::models::inventory::{Equipment, Inventory};
    use crate::models::room::{Door, Exit};
    use crate::models::types::{CharacterId, Role};
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::{Arc, Weak};

    fn character(name: &str) -> Arc<Character> {
        Arc::new(Character::new(
            CharacterId::new(),
            name,
            "alice",
            CharacterState {
                metatype: "human".into(),
                archetype: "decker".into(),
                role: Role::Player,
                room_key: String::new(),
                inventory: Inventory::new(),
                equipment: Equipment::new(),
                qualities: vec![],
                skills: BTreeMap::from([("hacking".to_string(), 5)]),
                labels: vec![],
                dispositions: BTreeMap::new(),
                carry_capacity: 40.0,
                history: VecDeque::new(),
                created_at: chrono::Utc::now(),
            },
        ))
    }

    #[test]
    fn room_lists_others_and_exits() {
        let room = Arc::new(Room::new("downtown", "plaza", "Plaza", "Wet concrete."));
        room.add_exit(Exit {
            direction: "north".into(),
            to: "downtown:alley".into(),
            target: Weak::new(),
            door: None,
        });
        room.add_exit(Exit {
            direction: "east".into(),
            to: "downtown:club".into(),
            target: Weak::new(),
            door: Some(Arc::new(Door::new(DoorState::Closed, vec![], 0))),
        });

        let zed = character("Zed");
        let kim = character("Kim");
        room.admit(&zed);
        room.admit(&kim);

        let text = PlainPresenter.render_room(&room, &zed);
        assert!(text.starts_with("Plaza"));
        assert!(text.contains("Kim is here."));
        assert!(!text.contains("Zed is here."));
        assert!(text.contains("Exits: east (closed), north"));
    }

    #[test]
    fn sheet_falls_back_to_ids() {
        let zed = character("Zed");
        let text = PlainPresenter.render_sheet(&zed, &ContentRegistry::new());
        assert!(text.contains("Metatype:  human"));
        assert!(text.contains("hacking"));
    }
}
