//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation time in seconds since the simulation was created.
///
/// The clock only advances by the `dt` handed to `Simulation::tick`, so every
/// expiry and cooldown is a comparison against this value.
pub type Timestamp = f64;

/// Ordinal evolution stage (0 = smallest, `MAX_TIER` = apex)
pub type Tier = u8;

pub const MAX_TIER: Tier = 7;
pub const TIER_COUNT: usize = MAX_TIER as usize + 1;

/// Unique identifier for NPC creatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NpcId(pub u64);

/// Unique identifier for pickup items
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

/// Monotonic id allocator. Ids are never reused within a run.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_npc(&mut self) -> NpcId {
        NpcId(self.bump())
    }

    pub fn next_item(&mut self) -> ItemId {
        ItemId(self.bump())
    }

    fn bump(&mut self) -> u64 {
        let id = self.next.max(1);
        self.next = id + 1;
        id
    }
}

/// Coarse progression bracket derived from tier, used to filter quests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthPhase {
    Early,
    Mid,
    Late,
}

impl GrowthPhase {
    pub fn from_tier(tier: Tier) -> Self {
        match tier {
            0..=2 => Self::Early,
            3..=5 => Self::Mid,
            _ => Self::Late,
        }
    }
}

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Playing,
    GameOver,
    Cleared,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_allocator_never_repeats() {
        let mut ids = IdAllocator::new();
        let a = ids.next_npc();
        let b = ids.next_item();
        let c = ids.next_npc();
        assert_eq!(a, NpcId(1));
        assert_eq!(b, ItemId(2));
        assert_eq!(c, NpcId(3));
    }

    #[test]
    fn test_default_allocator_starts_at_one() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next_npc(), NpcId(1));
    }

    #[test]
    fn test_growth_phase_brackets() {
        assert_eq!(GrowthPhase::from_tier(0), GrowthPhase::Early);
        assert_eq!(GrowthPhase::from_tier(2), GrowthPhase::Early);
        assert_eq!(GrowthPhase::from_tier(3), GrowthPhase::Mid);
        assert_eq!(GrowthPhase::from_tier(5), GrowthPhase::Mid);
        assert_eq!(GrowthPhase::from_tier(6), GrowthPhase::Late);
        assert_eq!(GrowthPhase::from_tier(MAX_TIER), GrowthPhase::Late);
    }

    #[test]
    fn test_run_state_terminal() {
        assert!(!RunState::Playing.is_terminal());
        assert!(RunState::GameOver.is_terminal());
        assert!(RunState::Cleared.is_terminal());
    }
}
