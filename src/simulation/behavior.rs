//! NPC behavior engine
//!
//! Each frame every live NPC:
//! startle check -> state expiry / redraw -> player reaction -> integrate -> clamp -> publish
//!
//! The state machine is driven by an immutable `BehaviorTable` so tuning the
//! feel of a tier never touches the update code.

use ahash::AHashSet;
use glam::{Quat, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::GameConfig;
use crate::core::types::{NpcId, Tier, TIER_COUNT};
use crate::entity::{Behavior, Npc};
use crate::spatial::{SpatialRegistry, TerrainField};

const DRAWABLE_COUNT: usize = Behavior::DRAWABLE.len();
const STATE_COUNT: usize = DRAWABLE_COUNT + 1;

/// Per-tier draw weights, per-state durations and speed multipliers
#[derive(Debug, Clone)]
pub struct BehaviorTable {
    weights: [[f32; DRAWABLE_COUNT]; TIER_COUNT],
    durations: [(f32, f32); STATE_COUNT],
    speed_multipliers: [f32; STATE_COUNT],
}

impl BehaviorTable {
    /// Tuned table: small fry cruise and idle, bigger creatures dash, burst
    /// and circle more often. Tier 0 never dashes or bursts.
    pub fn standard() -> Self {
        let mut weights = [[0.0; DRAWABLE_COUNT]; TIER_COUNT];
        for (tier, row) in weights.iter_mut().enumerate() {
            let t = tier as f32;
            let fast = |base: f32, per_tier: f32| if tier == 0 { 0.0 } else { base + per_tier * t };
            *row = [
                40.0 - 2.0 * t, // Cruise
                fast(4.0, 2.0), // Dash
                20.0 - t,       // Idle
                12.0,           // Zigzag
                4.0 + 1.5 * t,  // Circle
                fast(3.0, 1.5), // Burst
                8.0,            // Rise
                8.0,            // Dive
            ];
        }

        Self {
            weights,
            durations: [
                (2.0, 5.0), // Cruise
                (0.6, 1.2), // Dash
                (1.0, 3.0), // Idle
                (1.5, 3.5), // Zigzag
                (2.0, 4.0), // Circle
                (0.4, 0.8), // Burst
                (1.0, 2.0), // Rise
                (1.0, 2.0), // Dive
                (1.2, 1.2), // Startle
            ],
            speed_multipliers: [1.0, 2.2, 0.2, 1.0, 0.9, 1.8, 0.8, 0.8, 2.5],
        }
    }

    pub fn weight(&self, tier: Tier, behavior: Behavior) -> f32 {
        if behavior == Behavior::Startle {
            return 0.0;
        }
        self.weights[(tier as usize).min(TIER_COUNT - 1)][behavior.index()]
    }

    pub fn duration_range(&self, behavior: Behavior) -> (f32, f32) {
        self.durations[behavior.index()]
    }

    pub fn speed_multiplier(&self, behavior: Behavior) -> f32 {
        self.speed_multipliers[behavior.index()]
    }

    /// Weighted draw of a new state and how long it lasts
    pub fn draw<R: Rng + ?Sized>(&self, tier: Tier, rng: &mut R) -> (Behavior, f32) {
        let behavior = Behavior::DRAWABLE
            .choose_weighted(&mut *rng, |b| self.weight(tier, *b))
            .copied()
            .unwrap_or(Behavior::Cruise);
        let (min, max) = self.duration_range(behavior);
        let duration = if max > min { rng.gen_range(min..max) } else { min };
        (behavior, duration)
    }
}

impl Default for BehaviorTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Per-frame facts every NPC reacts to
#[derive(Debug, Clone, Copy)]
pub struct BehaviorContext {
    pub dt: f32,
    pub player_position: Vec3,
    pub player_tier: Tier,
    pub magnet_active: bool,
    pub drift: Vec3,
}

pub struct BehaviorEngine {
    table: BehaviorTable,
}

impl BehaviorEngine {
    pub fn new(table: BehaviorTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &BehaviorTable {
        &self.table
    }

    /// Advance every NPC one frame and refresh the registry.
    ///
    /// Dead NPCs are dropped from the registry, as are ids that no longer
    /// exist in `npcs` at all (removed frenzy spawns).
    pub fn update<R: Rng + ?Sized>(
        &self,
        npcs: &mut [Npc],
        ctx: &BehaviorContext,
        config: &GameConfig,
        terrain: &TerrainField,
        registry: &mut SpatialRegistry,
        rng: &mut R,
    ) {
        let mut live: AHashSet<NpcId> = AHashSet::with_capacity(npcs.len());

        for npc in npcs.iter_mut() {
            if !npc.alive {
                registry.remove(npc.id);
                continue;
            }
            self.update_npc(npc, ctx, config, terrain, registry, rng);
            registry.publish(npc.id, npc.position);
            live.insert(npc.id);
        }

        if registry.len() != live.len() {
            registry.retain(|id| live.contains(&id));
        }
    }

    fn update_npc<R: Rng + ?Sized>(
        &self,
        npc: &mut Npc,
        ctx: &BehaviorContext,
        config: &GameConfig,
        terrain: &TerrainField,
        registry: &SpatialRegistry,
        rng: &mut R,
    ) {
        let npc_cfg = &config.npc;
        let dt = ctx.dt;
        npc.age += dt;

        // Startle: each broadcast is handled at most once per NPC
        if let Some(startle) = registry.last_startle() {
            if startle.at > npc.behavior.last_startle {
                npc.behavior.last_startle = startle.at;
                let away = npc.position - startle.origin;
                if away.length_squared() <= npc_cfg.startle_radius * npc_cfg.startle_radius {
                    npc.behavior.current = Behavior::Startle;
                    npc.behavior.remaining = npc_cfg.startle_duration;
                    npc.direction = horizontal(away).unwrap_or(npc.direction);
                }
            }
        }

        npc.behavior.remaining -= dt;
        if npc.behavior.remaining <= 0.0 {
            self.begin_state(npc, rng);
        }

        let to_player = ctx.player_position - npc.position;
        let dist = to_player.length();
        let toward = to_player.try_normalize().unwrap_or(Vec3::ZERO);

        // Startled creatures only run; everyone else watches the player
        if npc.behavior.current != Behavior::Startle {
            if npc.tier < ctx.player_tier && dist < npc_cfg.flee_radius {
                npc.direction = blend(npc.direction, -toward, npc_cfg.flee_blend * dt);
            } else if npc.tier > ctx.player_tier && dist < npc_cfg.detect_radius {
                npc.direction = blend(npc.direction, toward, npc_cfg.hunt_blend * dt);
            }
        }

        // Feeding funnel and magnet pull are additive, applied after the heading blend
        let mut pull = Vec3::ZERO;
        if npc.is_edible_by(ctx.player_tier) {
            if ctx.player_tier >= npc_cfg.funnel_min_tier && dist < npc_cfg.funnel_radius {
                pull += toward * npc_cfg.funnel_strength;
            }
            if ctx.magnet_active && dist < npc_cfg.magnet_radius {
                pull += toward * npc_cfg.magnet_strength;
            }
        }

        let speed =
            config.tiers.npc_speed(npc.tier) * self.table.speed_multiplier(npc.behavior.current);
        let mut velocity = self.state_velocity(npc, speed, dt);
        velocity += Vec3::Y * (npc.age * 2.0 + npc.wobble_seed).sin() * npc_cfg.wobble_amplitude;
        velocity += pull + ctx.drift;

        npc.position += velocity * dt;
        clamp_to_world(npc, config, terrain);
    }

    /// Redraw the state and set up whatever it needs
    fn begin_state<R: Rng + ?Sized>(&self, npc: &mut Npc, rng: &mut R) {
        let (behavior, duration) = self.table.draw(npc.tier, rng);
        npc.behavior.current = behavior;
        npc.behavior.remaining = duration;

        match behavior {
            Behavior::Circle => {
                let radius = rng.gen_range(2.0..5.0);
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                npc.behavior.orbit_radius = radius;
                npc.behavior.orbit_angle = angle;
                npc.behavior.orbit_center =
                    npc.position - Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
            }
            Behavior::Cruise | Behavior::Dash | Behavior::Burst | Behavior::Zigzag => {
                let turn = rng.gen_range(-1.0..1.0);
                let heading = Quat::from_rotation_y(turn) * npc.direction;
                npc.direction = horizontal(heading).unwrap_or(npc.direction);
            }
            _ => {}
        }
    }

    fn state_velocity(&self, npc: &mut Npc, speed: f32, dt: f32) -> Vec3 {
        match npc.behavior.current {
            Behavior::Circle => {
                let state = &mut npc.behavior;
                state.orbit_angle += speed / state.orbit_radius.max(0.5) * dt;
                state.orbit_center +=
                    Vec3::new(npc.wobble_seed.cos(), 0.0, npc.wobble_seed.sin()) * 0.3 * dt;
                let target = state.orbit_center
                    + Vec3::new(state.orbit_angle.cos(), 0.0, state.orbit_angle.sin())
                        * state.orbit_radius;
                if let Some(heading) = horizontal(target - npc.position) {
                    npc.direction = heading;
                }
                npc.direction * speed
            }
            Behavior::Zigzag => {
                let side = Vec3::Y.cross(npc.direction).normalize_or_zero();
                npc.direction * speed + side * (npc.age * 6.0).sin() * speed * 0.8
            }
            Behavior::Rise => npc.direction * speed + Vec3::Y * speed * 0.6,
            Behavior::Dive => npc.direction * speed - Vec3::Y * speed * 0.6,
            _ => npc.direction * speed,
        }
    }
}

impl Default for BehaviorEngine {
    fn default() -> Self {
        Self::new(BehaviorTable::standard())
    }
}

fn horizontal(v: Vec3) -> Option<Vec3> {
    Vec3::new(v.x, 0.0, v.z).try_normalize()
}

/// Turn `from` toward `to` by `t` (clamped to [0, 1])
fn blend(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from.lerp(to, t.clamp(0.0, 1.0)).try_normalize().unwrap_or(to)
}

/// Keep the NPC inside the box and above the sea floor, reflecting the
/// heading component that hit a boundary
fn clamp_to_world(npc: &mut Npc, config: &GameConfig, terrain: &TerrainField) {
    let extent = config.world.half_extent;
    let size = config.tiers.size(npc.tier);

    if npc.position.x.abs() > extent {
        npc.position.x = npc.position.x.clamp(-extent, extent);
        npc.direction.x = -npc.direction.x;
    }
    if npc.position.z.abs() > extent {
        npc.position.z = npc.position.z.clamp(-extent, extent);
        npc.direction.z = -npc.direction.z;
    }

    let floor = terrain.floor_for(npc.position.x, npc.position.z, size);
    let ceiling = (config.world.ceiling - size).max(floor);
    if npc.position.y < floor {
        npc.position.y = floor;
        npc.direction.y = npc.direction.y.abs();
    } else if npc.position.y > ceiling {
        npc.position.y = ceiling;
        npc.direction.y = -npc.direction.y.abs();
    }
}
