//! NPC creatures and their behavior state

use glam::Vec3;
use serde::Serialize;

use crate::core::types::{NpcId, Tier, Timestamp};

/// Movement behavior an NPC is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Behavior {
    Cruise,
    Dash,
    Idle,
    Zigzag,
    Circle,
    Burst,
    Rise,
    Dive,
    /// Interrupt state, only entered through a startle broadcast
    Startle,
}

impl Behavior {
    /// Behaviors the weighted draw may pick (everything except Startle)
    pub const DRAWABLE: [Behavior; 8] = [
        Self::Cruise,
        Self::Dash,
        Self::Idle,
        Self::Zigzag,
        Self::Circle,
        Self::Burst,
        Self::Rise,
        Self::Dive,
    ];

    pub fn index(&self) -> usize {
        match self {
            Self::Cruise => 0,
            Self::Dash => 1,
            Self::Idle => 2,
            Self::Zigzag => 3,
            Self::Circle => 4,
            Self::Burst => 5,
            Self::Rise => 6,
            Self::Dive => 7,
            Self::Startle => 8,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BehaviorState {
    pub current: Behavior,
    /// Seconds left before the next draw
    pub remaining: f32,
    /// Orbit center while circling
    pub orbit_center: Vec3,
    pub orbit_radius: f32,
    pub orbit_angle: f32,
    /// Newest startle broadcast this NPC has seen. Starts at the spawn
    /// time so broadcasts from before the NPC existed are ignored.
    pub last_startle: Timestamp,
}

impl BehaviorState {
    pub fn new(spawned_at: Timestamp) -> Self {
        Self {
            current: Behavior::Idle,
            remaining: 0.0,
            orbit_center: Vec3::ZERO,
            orbit_radius: 0.0,
            orbit_angle: 0.0,
            last_startle: spawned_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Npc {
    pub id: NpcId,
    pub tier: Tier,
    pub position: Vec3,
    /// Unit heading
    pub direction: Vec3,
    pub alive: bool,
    /// Frenzy spawns vanish instead of respawning
    pub transient: bool,
    pub behavior: BehaviorState,
    /// Seconds this NPC has been simulated, drives wobble and zigzag
    pub age: f32,
    /// Per-NPC phase offset so wobbles do not move in lockstep
    pub wobble_seed: f32,
}

impl Npc {
    pub fn new(
        id: NpcId,
        tier: Tier,
        position: Vec3,
        direction: Vec3,
        wobble_seed: f32,
        spawned_at: Timestamp,
    ) -> Self {
        Self {
            id,
            tier,
            position,
            direction: direction.try_normalize().unwrap_or(Vec3::X),
            alive: true,
            transient: false,
            behavior: BehaviorState::new(spawned_at),
            age: 0.0,
            wobble_seed,
        }
    }

    /// Bring a dead slot back at a new position with a clean behavior state
    pub fn revive(&mut self, position: Vec3, direction: Vec3, now: Timestamp) {
        self.position = position;
        self.direction = direction.try_normalize().unwrap_or(Vec3::X);
        self.alive = true;
        self.behavior = BehaviorState::new(now);
        self.age = 0.0;
    }

    /// Whether a player of `player_tier` can eat this NPC
    pub fn is_edible_by(&self, player_tier: Tier) -> bool {
        self.tier <= player_tier
    }
}
