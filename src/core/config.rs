//! Game configuration with documented constants
//!
//! All tuning values live here so balancing never requires touching the
//! simulation code. Every section deserializes with defaults, so a TOML file
//! only needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Tier, MAX_TIER, TIER_COUNT};

/// Full configuration for one simulation instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the run's RNG. Same seed + same input = same run.
    pub seed: u64,
    /// Largest frame delta accepted by `tick` (seconds).
    ///
    /// A backgrounded tab can hand us several seconds at once; clamping keeps
    /// creatures from tunnelling through each other.
    pub max_frame_dt: f32,
    pub world: WorldConfig,
    pub tiers: TierConfig,
    pub player: PlayerConfig,
    pub npc: NpcConfig,
    pub collision: CollisionConfig,
    pub items: ItemConfig,
    pub events: EventConfig,
    pub boss: BossConfig,
    pub economy: EconomyConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EA_F00D,
            max_frame_dt: 0.1,
            world: WorldConfig::default(),
            tiers: TierConfig::default(),
            player: PlayerConfig::default(),
            npc: NpcConfig::default(),
            collision: CollisionConfig::default(),
            items: ItemConfig::default(),
            events: EventConfig::default(),
            boss: BossConfig::default(),
            economy: EconomyConfig::default(),
        }
    }
}

// === WORLD ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Horizontal half-size of the playable box; x and z live in [-h, h]
    pub half_extent: f32,
    /// Highest y any creature may reach
    pub ceiling: f32,
    /// Mean floor height of the terrain field
    pub terrain_base: f32,
    /// Peak deviation of the terrain from its base
    pub terrain_amplitude: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            half_extent: 100.0,
            ceiling: 40.0,
            terrain_base: 0.0,
            terrain_amplitude: 4.0,
        }
    }
}

// === TIERS ===

/// Per-tier tables. Index = tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Experience needed to leave each tier (at tier 7: to clear the run)
    pub exp_thresholds: [f32; TIER_COUNT],
    /// Body radius of a creature of each tier
    pub sizes: [f32; TIER_COUNT],
    /// Player base swim speed per tier (units/s)
    pub player_speeds: [f32; TIER_COUNT],
    /// NPC base swim speed per tier (units/s)
    pub npc_speeds: [f32; TIER_COUNT],
    /// Gold granted for eating an NPC of each tier
    pub gold_rewards: [u64; TIER_COUNT],
    /// Gold cost to buy the evolution out of each tier (no entry for tier 7)
    pub evolve_costs: [u64; MAX_TIER as usize],
    /// Starting NPC population per tier, before the NPC-count upgrade
    pub population: [u32; TIER_COUNT],
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            exp_thresholds: [10.0, 15.0, 30.0, 50.0, 80.0, 120.0, 170.0, 240.0],
            sizes: [0.6, 1.0, 1.5, 2.1, 2.8, 3.6, 4.5, 5.5],
            player_speeds: [8.0, 8.5, 9.0, 9.5, 10.0, 10.5, 11.0, 11.5],
            npc_speeds: [2.5, 2.8, 3.1, 3.4, 3.7, 4.0, 4.3, 4.6],
            gold_rewards: [1, 2, 3, 5, 8, 12, 18, 25],
            evolve_costs: [30, 80, 160, 300, 500, 800, 1200],
            population: [40, 30, 22, 16, 11, 7, 4, 2],
        }
    }
}

impl TierConfig {
    pub fn size(&self, tier: Tier) -> f32 {
        self.sizes[tier_index(tier)]
    }

    pub fn exp_threshold(&self, tier: Tier) -> f32 {
        self.exp_thresholds[tier_index(tier)]
    }

    pub fn gold_reward(&self, tier: Tier) -> u64 {
        self.gold_rewards[tier_index(tier)]
    }

    pub fn npc_speed(&self, tier: Tier) -> f32 {
        self.npc_speeds[tier_index(tier)]
    }

    pub fn player_speed(&self, tier: Tier) -> f32 {
        self.player_speeds[tier_index(tier)]
    }

    /// Evolution cost out of `tier`, `None` at max tier
    pub fn evolve_cost(&self, tier: Tier) -> Option<u64> {
        self.evolve_costs.get(tier as usize).copied()
    }
}

fn tier_index(tier: Tier) -> usize {
    (tier as usize).min(MAX_TIER as usize)
}

// === PLAYER ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn_position: [f32; 3],
    /// Exponential smoothing rate toward the target velocity (1/s)
    pub acceleration: f32,
    /// Rate at which the visual facing turns toward the heading (1/s)
    pub turn_rate: f32,
    pub dash_duration: f64,
    pub dash_base_cooldown: f64,
    pub dash_min_cooldown: f64,
    /// Cooldown removed per dash-cooldown upgrade level
    pub dash_cooldown_step: f64,
    pub dash_multiplier: f32,
    pub speed_item_multiplier: f32,
    /// Speed bonus per speed upgrade level (0.06 = +6%)
    pub speed_upgrade_step: f32,
    /// Invincibility after a defense absorbs a hit
    pub defense_grace: f64,
    /// Camera offset behind the player before zoom and size scaling
    pub camera_offset: [f32; 3],
    /// Extra camera distance per unit of creature size
    pub camera_size_scale: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn_position: [0.0, 12.0, 0.0],
            acceleration: 6.0,
            turn_rate: 8.0,
            dash_duration: 0.5,
            dash_base_cooldown: 3.0,
            dash_min_cooldown: 1.0,
            dash_cooldown_step: 0.4,
            dash_multiplier: 2.5,
            speed_item_multiplier: 1.5,
            speed_upgrade_step: 0.06,
            defense_grace: 1.0,
            camera_offset: [0.0, 4.0, 10.0],
            camera_size_scale: 0.35,
        }
    }
}

// === NPC BEHAVIOR ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    /// Prey closer than this to the player steer away
    pub flee_radius: f32,
    /// Predators closer than this to the player steer toward it
    pub detect_radius: f32,
    /// Heading blend rate while fleeing (1/s)
    pub flee_blend: f32,
    /// Heading blend rate while hunting (1/s)
    pub hunt_blend: f32,
    /// Player tier from which nearby prey gets pulled in
    pub funnel_min_tier: Tier,
    pub funnel_radius: f32,
    pub funnel_strength: f32,
    /// Pull applied to prey while the player carries the magnet effect
    pub magnet_radius: f32,
    pub magnet_strength: f32,
    pub startle_radius: f32,
    pub startle_duration: f32,
    pub wobble_amplitude: f32,
    pub respawn_delay_min: f64,
    pub respawn_delay_max: f64,
    /// Respawned creatures appear at least this far from the player
    pub respawn_min_distance: f32,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            flee_radius: 6.0,
            detect_radius: 5.0,
            flee_blend: 4.0,
            hunt_blend: 2.5,
            funnel_min_tier: 4,
            funnel_radius: 4.0,
            funnel_strength: 2.0,
            magnet_radius: 8.0,
            magnet_strength: 3.0,
            startle_radius: 10.0,
            startle_duration: 1.2,
            wobble_amplitude: 0.3,
            respawn_delay_min: 3.0,
            respawn_delay_max: 8.0,
            respawn_min_distance: 20.0,
        }
    }
}

// === COLLISION ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// NPCs farther than this are skipped before any radius math
    pub broad_phase_radius: f32,
    /// Most NPCs eaten in one pass
    pub max_eats_per_pass: usize,
    /// Most eat particle bursts requested per pass
    pub max_bursts_per_pass: usize,
    pub eat_cooldown_min: f64,
    pub eat_cooldown_max: f64,
    pub eat_player_factor: f32,
    pub eat_npc_factor: f32,
    pub danger_factor: f32,
    /// Eat-range multiplier per eat-range upgrade level
    pub eat_range_step: f32,
    pub eat_range_tier6_bonus: f32,
    pub eat_range_tier7_bonus: f32,
    pub eat_range_cap: f32,
    pub item_margin: f32,
    /// Extra pickup radius while the magnet effect is active
    pub magnet_item_range: f32,
    pub boss_size_factor: f32,
    pub boss_player_factor: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            broad_phase_radius: 30.0,
            max_eats_per_pass: 20,
            max_bursts_per_pass: 5,
            eat_cooldown_min: 0.08,
            eat_cooldown_max: 0.15,
            eat_player_factor: 0.6,
            eat_npc_factor: 0.4,
            danger_factor: 0.45,
            eat_range_step: 0.08,
            eat_range_tier6_bonus: 0.25,
            eat_range_tier7_bonus: 0.25,
            eat_range_cap: 5.0,
            item_margin: 1.5,
            magnet_item_range: 6.0,
            boss_size_factor: 0.6,
            boss_player_factor: 0.5,
        }
    }
}

// === ITEMS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub initial_count: usize,
    pub respawn_delay_min: f64,
    pub respawn_delay_max: f64,
    pub speed_duration: f64,
    pub magnet_duration: f64,
    pub shield_duration: f64,
    pub double_exp_duration: f64,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            initial_count: 12,
            respawn_delay_min: 5.0,
            respawn_delay_max: 15.0,
            speed_duration: 8.0,
            magnet_duration: 10.0,
            shield_duration: 6.0,
            double_exp_duration: 12.0,
        }
    }
}

// === WORLD EVENTS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub first_event_at: f64,
    pub duration_min: f64,
    pub duration_max: f64,
    pub interval_min: f64,
    pub interval_max: f64,
    pub frenzy_count: usize,
    pub frenzy_radius_min: f32,
    pub frenzy_radius_max: f32,
    pub current_strength: f32,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            first_event_at: 30.0,
            duration_min: 10.0,
            duration_max: 15.0,
            interval_min: 40.0,
            interval_max: 70.0,
            frenzy_count: 20,
            frenzy_radius_min: 6.0,
            frenzy_radius_max: 14.0,
            current_strength: 3.0,
        }
    }
}

// === BOSS ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub first_spawn_at: f64,
    /// Gap between the warning and the actual spawn
    pub warning_delay: f64,
    /// Boss leaves unconditionally after this long
    pub lifetime: f64,
    /// Base gap between a despawn and the next eligible spawn
    pub respawn_interval: f64,
    pub speed: f32,
    /// Heading lerp rate toward the player (1/s)
    pub turn_rate: f32,
    pub size: f32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            first_spawn_at: 60.0,
            warning_delay: 2.0,
            lifetime: 20.0,
            respawn_interval: 120.0,
            speed: 7.0,
            turn_rate: 1.5,
            size: 8.0,
        }
    }
}

// === ECONOMY ===

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_gold: u64,
    /// Max gap between eats that still extends the combo
    pub combo_window: f64,
    /// Quests offered at once for the current phase
    pub active_quests: usize,
    /// Perks offered on each tier-up
    pub perk_offer_size: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: 0,
            combo_window: 2.0,
            active_quests: 3,
            perk_offer_size: 3,
        }
    }
}

impl GameConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse_toml(&content)?;
        tracing::debug!("Loaded game config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.world.half_extent <= 0.0 {
            return invalid(format!("world.half_extent ({}) must be positive", self.world.half_extent));
        }
        if self.world.ceiling <= self.world.terrain_base + self.world.terrain_amplitude {
            return invalid(format!(
                "world.ceiling ({}) must sit above the highest terrain ({})",
                self.world.ceiling,
                self.world.terrain_base + self.world.terrain_amplitude
            ));
        }
        if self.max_frame_dt <= 0.0 {
            return invalid("max_frame_dt must be positive".into());
        }

        // Thresholds and sizes grow with tier
        for pair in self.tiers.exp_thresholds.windows(2) {
            if pair[1] < pair[0] {
                return invalid("tiers.exp_thresholds must be ascending".into());
            }
        }
        for pair in self.tiers.sizes.windows(2) {
            if pair[1] < pair[0] {
                return invalid("tiers.sizes must be ascending".into());
            }
        }
        if self.tiers.exp_thresholds.iter().any(|t| *t <= 0.0) {
            return invalid("tiers.exp_thresholds must be positive".into());
        }

        let ranges = [
            ("npc.respawn_delay", self.npc.respawn_delay_min, self.npc.respawn_delay_max),
            ("items.respawn_delay", self.items.respawn_delay_min, self.items.respawn_delay_max),
            ("events.duration", self.events.duration_min, self.events.duration_max),
            ("events.interval", self.events.interval_min, self.events.interval_max),
            ("collision.eat_cooldown", self.collision.eat_cooldown_min, self.collision.eat_cooldown_max),
        ];
        for (name, min, max) in ranges {
            if min < 0.0 || min > max {
                return invalid(format!("{name}: min ({min}) must be >= 0 and <= max ({max})"));
            }
        }
        if self.events.frenzy_radius_min > self.events.frenzy_radius_max {
            return invalid("events.frenzy_radius_min must be <= frenzy_radius_max".into());
        }

        if self.collision.eat_range_cap < 1.0 {
            return invalid("collision.eat_range_cap must be at least 1.0".into());
        }
        if self.boss.lifetime <= 0.0 {
            return invalid("boss.lifetime must be positive".into());
        }
        if self.economy.combo_window <= 0.0 {
            return invalid("economy.combo_window must be positive".into());
        }

        Ok(())
    }
}
