//! Simulation entities: plain data, mutated through the entity store

pub mod boss;
pub mod item;
pub mod npc;
pub mod player;
pub mod world_event;

pub use boss::Boss;
pub use item::{ActiveEffects, Item, ItemKind};
pub use npc::{Behavior, BehaviorState, Npc};
pub use player::Player;
pub use world_event::{GameEvent, WorldEventKind};
