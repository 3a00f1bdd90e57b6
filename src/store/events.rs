//! Side-effect intents emitted by store transitions
//!
//! The simulation never calls into presentation. Every transition that a
//! renderer or audio layer might care about pushes one of these instead, and
//! the tick hands the batch over once per frame.

use glam::Vec3;
use serde::Serialize;

use crate::core::types::{Tier, Timestamp};
use crate::entity::{ItemKind, WorldEventKind};
use crate::progression::{PerkId, SkillId, UpgradeTrack};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    /// Spawn an eat particle burst
    EatBurst { position: Vec3, tier: Tier },
    /// A batch of NPCs was eaten
    Ate { count: usize, experience: f32, gold: u64 },
    ComboChanged { combo: u32, multiplier: f32 },
    TierUp { tier: Tier },
    Evolved { tier: Tier, cost: u64 },
    Cleared { at: Timestamp },
    GameOver { at: Timestamp },
    ItemCollected { kind: ItemKind, expires_at: Timestamp },
    EffectExpired { kind: ItemKind },
    DashStarted,
    DashEnded,
    DefenseUsed,
    WorldEventStarted { kind: WorldEventKind, ends_at: Timestamp },
    /// Presentation undoes any event visuals (e.g. fog after darkness)
    WorldEventEnded { kind: WorldEventKind },
    BossWarning { spawn_at: Timestamp },
    BossSpawned { position: Vec3 },
    BossDespawned,
    PerkOffered { options: Vec<PerkId> },
    PerkChosen { perk: PerkId },
    SkillLearned { skill: SkillId },
    SkillUsed { skill: SkillId },
    UpgradePurchased { track: UpgradeTrack, level: u8, cost: u64 },
    QuestCompleted { id: &'static str },
    QuestClaimed { id: &'static str, reward: u64 },
}
