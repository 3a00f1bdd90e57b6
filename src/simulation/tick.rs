//! Simulation facade - owns every subsystem and runs the frame loop
//!
//! One call to `tick` runs:
//! timers -> dash request -> player controller -> NPC behavior -> collision -> director -> effect expiry
//!
//! and returns the side-effect intents produced along the way.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{RunState, Timestamp};
use crate::entity::ItemKind;
use crate::progression::{PerkId, SkillId, UpgradeTrack};
use crate::simulation::behavior::{BehaviorContext, BehaviorEngine};
use crate::simulation::collision::CollisionSystem;
use crate::simulation::director::Director;
use crate::simulation::input::{InputEvent, InputState};
use crate::simulation::player_control::PlayerController;
use crate::simulation::snapshot::{HighScoreStore, RankingSink, RenderSnapshot, RunSummary};
use crate::spatial::SpatialRegistry;
use crate::store::{EntityStore, SimEvent};

pub struct Simulation {
    config: Arc<GameConfig>,
    store: EntityStore,
    registry: SpatialRegistry,
    behavior: BehaviorEngine,
    controller: PlayerController,
    collision: CollisionSystem,
    director: Director,
    input: InputState,
    rng: ChaCha8Rng,
    clock: Timestamp,
    submitted: bool,
}

impl Simulation {
    pub fn new(config: GameConfig) -> Self {
        let config = Arc::new(config);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let cell_size = config.collision.broad_phase_radius / 3.0;

        Self {
            store: EntityStore::new(Arc::clone(&config)),
            registry: SpatialRegistry::new(cell_size),
            behavior: BehaviorEngine::default(),
            controller: PlayerController::new(),
            collision: CollisionSystem::new(),
            director: Director::new(),
            input: InputState::new(),
            rng,
            clock: 0.0,
            submitted: false,
            config,
        }
    }

    /// Begin a fresh run: wipe state, populate the world
    pub fn start(&mut self) {
        self.clear_frame_state();
        self.store.start(self.clock, &mut self.rng);
        tracing::info!("Run started at {:.1}s (seed {})", self.clock, self.config.seed);
    }

    /// Wipe the run without repopulating. Pending timers are cancelled.
    pub fn reset(&mut self) {
        self.clear_frame_state();
        self.store.reset(self.clock);
    }

    fn clear_frame_state(&mut self) {
        self.registry.clear();
        self.collision.reset();
        self.input.release_all();
        self.submitted = false;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        self.input.apply(&event, self.clock);
    }

    /// Advance one frame. `dt` is clamped to `max_frame_dt`.
    pub fn tick(&mut self, dt: f32) -> Vec<SimEvent> {
        if !self.store.is_playing() {
            return self.store.drain_events();
        }
        let dt = dt.clamp(0.0, self.config.max_frame_dt);
        self.clock += dt as f64;
        let now = self.clock;

        self.store.process_timers(now, &mut self.rng);

        if self.input.take_dash_request() {
            self.store.start_dash(now);
        }

        self.controller.update(&mut self.store, &self.input, dt, now);

        let ctx = BehaviorContext {
            dt,
            player_position: self.store.player().position,
            player_tier: self.store.player().tier,
            magnet_active: self.store.is_effect_active(ItemKind::Magnet, now),
            drift: self.store.current_drift(),
        };
        let terrain = *self.store.terrain();
        self.behavior.update(
            self.store.npcs_mut(),
            &ctx,
            &self.config,
            &terrain,
            &mut self.registry,
            &mut self.rng,
        );

        self.collision
            .run(&mut self.store, &mut self.registry, now, &mut self.rng);

        if self.store.is_playing() {
            self.director.update(&mut self.store, now, dt, &mut self.rng);
        }

        self.store.clean_expired_effects(now);
        self.store.drain_events()
    }

    // === COMMANDS ===

    pub fn request_dash(&mut self) -> bool {
        self.store.start_dash(self.clock)
    }

    pub fn evolve(&mut self) -> bool {
        self.store.evolve(&mut self.rng)
    }

    pub fn purchase_upgrade(&mut self, track: UpgradeTrack) -> bool {
        self.store.purchase_upgrade(track, self.clock)
    }

    pub fn choose_perk(&mut self, perk: PerkId) -> bool {
        self.store.choose_perk(perk)
    }

    pub fn learn_skill(&mut self, skill: SkillId) -> bool {
        self.store.learn_skill(skill)
    }

    pub fn use_skill(&mut self, skill: SkillId) -> bool {
        if !self.store.use_skill(skill, self.clock) {
            return false;
        }
        if skill == SkillId::Roar {
            self.registry
                .broadcast_startle(self.store.player().position, self.clock);
        }
        true
    }

    pub fn claim_quest(&mut self, id: &str) -> bool {
        self.store.claim_quest(id)
    }

    // === BOUNDARIES ===

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.store, self.controller.camera(), self.clock)
    }

    /// Report a finished run once. `None` while playing or if already reported.
    pub fn finish(
        &mut self,
        nickname: &str,
        ranking: &mut dyn RankingSink,
        high_scores: &mut dyn HighScoreStore,
    ) -> Result<Option<RunSummary>> {
        if self.submitted {
            return Ok(None);
        }
        let Some(summary) = RunSummary::from_store(&self.store, nickname) else {
            return Ok(None);
        };
        self.submitted = true;
        ranking.submit(&summary);
        if high_scores.record(summary.score)? {
            tracing::info!("New high score: {}", summary.score);
        }
        Ok(Some(summary))
    }

    // === ACCESSORS ===

    pub fn now(&self) -> Timestamp {
        self.clock
    }

    pub fn state(&self) -> RunState {
        self.store.state()
    }

    pub fn config(&self) -> &Arc<GameConfig> {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Direct store access for tooling and tests
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn registry(&self) -> &SpatialRegistry {
        &self.registry
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::snapshot::{MemoryHighScore, MemoryRankingSink};

    fn started(seed: u64) -> Simulation {
        let config = GameConfig { seed, ..GameConfig::default() };
        let mut sim = Simulation::new(config);
        sim.start();
        sim
    }

    #[test]
    fn test_tick_advances_clock_with_clamp() {
        let mut sim = started(1);
        sim.tick(0.016);
        assert!((sim.now() - 0.016).abs() < 1e-6);
        sim.tick(5.0);
        assert!((sim.now() - 0.116).abs() < 1e-6);
        sim.tick(-1.0);
        assert!((sim.now() - 0.116).abs() < 1e-6);
    }

    #[test]
    fn test_first_tick_publishes_registry() {
        let mut sim = started(1);
        sim.tick(0.016);
        assert_eq!(sim.registry().len(), sim.store().alive_npc_count());
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = started(77);
        let mut b = started(77);
        for _ in 0..300 {
            a.handle_input(InputEvent::KeyDown("KeyW".into()));
            b.handle_input(InputEvent::KeyDown("KeyW".into()));
            a.tick(1.0 / 30.0);
            b.tick(1.0 / 30.0);
        }
        assert_eq!(a.store().player().position, b.store().player().position);
        assert_eq!(a.store().player().score, b.store().player().score);
        let pa: Vec<_> = a.store().npcs().iter().map(|n| n.position).collect();
        let pb: Vec<_> = b.store().npcs().iter().map(|n| n.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_tick_is_noop_after_game_over() {
        let mut sim = started(3);
        sim.tick(0.016);
        let now = sim.now();
        sim.store_mut().set_game_over(now);
        let events = sim.tick(0.016);
        assert!(events.contains(&SimEvent::GameOver { at: now }));
        assert_eq!(sim.now(), now);
        assert!(sim.tick(0.016).is_empty());
    }

    #[test]
    fn test_shift_starts_dash() {
        let mut sim = started(4);
        sim.handle_input(InputEvent::KeyDown("ShiftLeft".into()));
        let events = sim.tick(0.016);
        assert!(events.contains(&SimEvent::DashStarted));
        assert!(sim.store().player().dashing);

        // Auto-ends after the dash duration
        let mut ended = false;
        for _ in 0..40 {
            if sim.tick(0.016).contains(&SimEvent::DashEnded) {
                ended = true;
                break;
            }
        }
        assert!(ended);
    }

    #[test]
    fn test_roar_startles_nearby() {
        let mut sim = started(5);
        sim.tick(0.016);
        sim.store_mut().player_mut().tier = 3;
        sim.store_mut().player_mut().gold = 200;
        assert!(sim.learn_skill(SkillId::Roar));
        assert!(sim.use_skill(SkillId::Roar));
        assert_eq!(sim.registry().last_startle().map(|s| s.at), Some(sim.now()));
        assert!(!sim.use_skill(SkillId::Roar));
    }

    #[test]
    fn test_finish_submits_once() {
        let mut sim = started(6);
        let mut ranking = MemoryRankingSink::default();
        let mut scores = MemoryHighScore::default();
        assert!(sim.finish("nemo", &mut ranking, &mut scores).unwrap().is_none());

        sim.store_mut().player_mut().score = 99;
        sim.tick(0.016);
        let now = sim.now();
        sim.store_mut().set_game_over(now);

        let summary = sim.finish("nemo", &mut ranking, &mut scores).unwrap().unwrap();
        assert_eq!(summary.score, 99);
        assert!(sim.finish("nemo", &mut ranking, &mut scores).unwrap().is_none());
        assert_eq!(ranking.submitted.len(), 1);
        assert_eq!(scores.load().unwrap(), 99);
    }

    #[test]
    fn test_reset_cancels_pending_work() {
        let mut sim = started(8);
        sim.request_dash();
        assert!(!sim.store().timers().is_empty());
        sim.reset();
        assert!(sim.store().timers().is_empty());
        assert!(sim.registry().is_empty());
        assert!(sim.store().npcs().is_empty());
    }
}
