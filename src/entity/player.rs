//! The player creature

use glam::Vec3;
use serde::Serialize;

use crate::core::types::{Tier, Timestamp};
use crate::progression::{PerkSet, SkillBook, UpgradeLevels};

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub tier: Tier,
    /// Resets to zero on every tier-up
    pub experience: f32,
    /// Written only by the player controller
    pub position: Vec3,
    pub velocity: Vec3,
    /// Visual heading around the y axis (radians)
    pub facing_yaw: f32,
    pub upgrades: UpgradeLevels,
    pub perks: PerkSet,
    pub skills: SkillBook,
    pub gold: u64,
    /// Total gold gained this run, never reduced by spending
    pub gold_earned: u64,
    pub score: u64,
    pub kills: u64,
    pub started_at: Timestamp,
    pub dashing: bool,
    pub dash_cooldown_end: Timestamp,
    /// Set by the Evolution Surge perk, consumed by the next evolve
    pub free_evolve: bool,
    pub shell_charges: u32,
    /// Shell Guard absorb window
    pub shell_until: Timestamp,
    /// Invincibility granted after a defense absorbed a hit
    pub grace_until: Timestamp,
}

impl Player {
    pub fn new(position: Vec3, gold: u64, started_at: Timestamp) -> Self {
        Self {
            tier: 0,
            experience: 0.0,
            position,
            velocity: Vec3::ZERO,
            facing_yaw: 0.0,
            upgrades: UpgradeLevels::default(),
            perks: PerkSet::new(),
            skills: SkillBook::new(),
            gold,
            gold_earned: 0,
            score: 0,
            kills: 0,
            started_at,
            dashing: false,
            dash_cooldown_end: 0.0,
            free_evolve: false,
            shell_charges: 0,
            shell_until: 0.0,
            grace_until: 0.0,
        }
    }

    pub fn earn_gold(&mut self, amount: u64) {
        self.gold += amount;
        self.gold_earned += amount;
    }

    /// Spend gold if affordable
    pub fn spend_gold(&mut self, amount: u64) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }

    pub fn play_time(&self, now: Timestamp) -> f64 {
        (now - self.started_at).max(0.0)
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0, 0.0)
    }
}
