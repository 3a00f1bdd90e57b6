//! Permanent in-run upgrades bought with gold

use serde::{Deserialize, Serialize};

const SPEED_COSTS: [u64; 10] = [60, 100, 150, 220, 300, 400, 520, 660, 820, 1000];
const EAT_RANGE_COSTS: [u64; 10] = [80, 130, 190, 260, 350, 460, 590, 740, 910, 1100];
const NPC_COUNT_COSTS: [u64; 10] = [50, 90, 140, 200, 280, 370, 480, 600, 750, 900];
const DASH_COOLDOWN_COSTS: [u64; 5] = [100, 180, 280, 400, 550];

/// Population bonus per NPC-count level (0.1 = +10%)
pub const NPC_COUNT_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeTrack {
    Speed,
    EatRange,
    NpcCount,
    DashCooldown,
}

impl UpgradeTrack {
    pub const ALL: [UpgradeTrack; 4] = [
        Self::Speed,
        Self::EatRange,
        Self::NpcCount,
        Self::DashCooldown,
    ];

    /// Cost of each level, index = current level
    pub fn costs(&self) -> &'static [u64] {
        match self {
            Self::Speed => &SPEED_COSTS,
            Self::EatRange => &EAT_RANGE_COSTS,
            Self::NpcCount => &NPC_COUNT_COSTS,
            Self::DashCooldown => &DASH_COOLDOWN_COSTS,
        }
    }

    pub fn max_level(&self) -> u8 {
        self.costs().len() as u8
    }
}

/// Current level on every track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub speed: u8,
    pub eat_range: u8,
    pub npc_count: u8,
    pub dash_cooldown: u8,
}

impl UpgradeLevels {
    pub fn level(&self, track: UpgradeTrack) -> u8 {
        match track {
            UpgradeTrack::Speed => self.speed,
            UpgradeTrack::EatRange => self.eat_range,
            UpgradeTrack::NpcCount => self.npc_count,
            UpgradeTrack::DashCooldown => self.dash_cooldown,
        }
    }

    fn level_mut(&mut self, track: UpgradeTrack) -> &mut u8 {
        match track {
            UpgradeTrack::Speed => &mut self.speed,
            UpgradeTrack::EatRange => &mut self.eat_range,
            UpgradeTrack::NpcCount => &mut self.npc_count,
            UpgradeTrack::DashCooldown => &mut self.dash_cooldown,
        }
    }

    /// Price of the next level, `None` when maxed
    pub fn next_cost(&self, track: UpgradeTrack) -> Option<u64> {
        track.costs().get(self.level(track) as usize).copied()
    }

    pub fn is_maxed(&self, track: UpgradeTrack) -> bool {
        self.level(track) >= track.max_level()
    }

    /// Raise a track by one level. Returns false at max.
    pub fn increment(&mut self, track: UpgradeTrack) -> bool {
        if self.is_maxed(track) {
            return false;
        }
        *self.level_mut(track) += 1;
        true
    }

    /// Multiplier applied to the starting population
    pub fn population_factor(&self) -> f32 {
        1.0 + NPC_COUNT_STEP * self.npc_count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_tables_are_ascending() {
        for track in UpgradeTrack::ALL {
            for pair in track.costs().windows(2) {
                assert!(pair[1] > pair[0], "{:?} costs not ascending", track);
            }
        }
    }

    #[test]
    fn test_dash_track_is_shorter() {
        assert_eq!(UpgradeTrack::DashCooldown.max_level(), 5);
        assert_eq!(UpgradeTrack::Speed.max_level(), 10);
    }

    #[test]
    fn test_next_cost_walks_table() {
        let mut levels = UpgradeLevels::default();
        assert_eq!(levels.next_cost(UpgradeTrack::Speed), Some(60));
        assert!(levels.increment(UpgradeTrack::Speed));
        assert_eq!(levels.next_cost(UpgradeTrack::Speed), Some(100));
    }

    #[test]
    fn test_increment_stops_at_max() {
        let mut levels = UpgradeLevels::default();
        for _ in 0..5 {
            assert!(levels.increment(UpgradeTrack::DashCooldown));
        }
        assert!(!levels.increment(UpgradeTrack::DashCooldown));
        assert_eq!(levels.dash_cooldown, 5);
        assert_eq!(levels.next_cost(UpgradeTrack::DashCooldown), None);
    }

    #[test]
    fn test_population_factor() {
        let levels = UpgradeLevels { npc_count: 3, ..Default::default() };
        assert!((levels.population_factor() - 1.3).abs() < 1e-6);
    }
}
