//! Integration tests for the frame loop
//!
//! These drive `Simulation` the way a frontend would: raw input events in,
//! `tick(dt)` once per frame, intents and snapshots out.

use deep_feast::core::types::RunState;
use deep_feast::simulation::{InputEvent, MemoryHighScore, MemoryRankingSink, RunOutcome};
use deep_feast::{GameConfig, SimError, SimEvent, Simulation};
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DT: f32 = 1.0 / 60.0;

fn started(seed: u64) -> Simulation {
    let mut sim = Simulation::new(GameConfig { seed, ..GameConfig::default() });
    sim.start();
    sim
}

#[test]
fn test_same_seed_and_input_reproduce_the_run() {
    let script = |sim: &mut Simulation| {
        for frame in 0..900 {
            if frame % 120 == 0 {
                sim.handle_input(InputEvent::KeyDown("KeyW".into()));
                sim.handle_input(InputEvent::MouseDown { x: 0.0, y: 0.0 });
                sim.handle_input(InputEvent::MouseMove { x: 80.0, y: 0.0 });
                sim.handle_input(InputEvent::MouseUp);
            }
            sim.tick(DT);
        }
        serde_json::to_string(&sim.snapshot()).unwrap()
    };

    let mut a = started(4242);
    let mut b = started(4242);
    assert_eq!(script(&mut a), script(&mut b));
}

#[test]
fn test_long_idle_run_keeps_world_consistent() {
    let mut sim = started(9);
    let config = sim.config().clone();
    let mut boss_spawns = 0;

    // Five simulated minutes at 20 Hz, player parked
    for _ in 0..6000 {
        for event in sim.tick(0.05) {
            if matches!(event, SimEvent::BossSpawned { .. }) {
                boss_spawns += 1;
            }
        }
        if sim.state() != RunState::Playing {
            break;
        }

        let store = sim.store();
        let extent = config.world.half_extent;
        for npc in store.npcs().iter().filter(|n| n.alive) {
            assert!(npc.position.x.abs() <= extent + 1e-3);
            assert!(npc.position.z.abs() <= extent + 1e-3);
        }
        let p = store.player().position;
        assert!(p.x.abs() <= extent && p.z.abs() <= extent);
    }
    assert!(boss_spawns <= 3);
}

#[test]
fn test_predator_contact_ends_run_and_reports_once() {
    let mut sim = started(10);
    sim.tick(DT);
    let player = sim.store().player().position;
    let now = sim.now();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    sim.store_mut()
        .spawn_npc(7, player + Vec3::new(0.5, 0.0, 0.0), false, now, &mut rng);

    let mut over = false;
    for _ in 0..10 {
        if sim.tick(DT).iter().any(|e| matches!(e, SimEvent::GameOver { .. })) {
            over = true;
            break;
        }
    }
    assert!(over);
    assert_eq!(sim.state(), RunState::GameOver);

    let mut ranking = MemoryRankingSink::default();
    let mut scores = MemoryHighScore::new(1_000_000);
    let summary = sim.finish("diver", &mut ranking, &mut scores).unwrap().unwrap();
    assert_eq!(summary.outcome, RunOutcome::GameOver);
    assert_eq!(summary.nickname, "diver");
    assert!(sim.finish("diver", &mut ranking, &mut scores).unwrap().is_none());
    assert_eq!(ranking.submitted.len(), 1);
}

#[test]
fn test_restart_after_game_over_is_a_fresh_run() {
    let mut sim = started(11);
    for _ in 0..60 {
        sim.tick(DT);
    }
    let now = sim.now();
    sim.store_mut().player_mut().score = 50;
    sim.store_mut().set_game_over(now);
    sim.tick(DT);

    sim.start();
    assert_eq!(sim.state(), RunState::Playing);
    assert_eq!(sim.store().player().score, 0);
    assert_eq!(sim.store().player().tier, 0);
    assert!(sim.store().boss().is_none());
    assert!(sim.store().next_boss_at() > now);
    sim.tick(DT);
    assert!(sim.now() > now);
}

#[test]
fn test_snapshot_tracks_visible_world() {
    let mut sim = started(12);
    sim.tick(DT);
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.npcs.len(), sim.store().alive_npc_count());
    assert_eq!(snapshot.hud.state, RunState::Playing);
    assert_eq!(snapshot.hud.tier, 0);
    assert_eq!(snapshot.camera.look_at, snapshot.player.position);
    assert!(snapshot.boss.is_none());
}

#[test]
fn test_partial_toml_config_keeps_defaults() {
    let config = GameConfig::parse_toml(
        r#"
        seed = 99

        [world]
        ceiling = 55.0
        "#,
    )
    .unwrap();
    assert_eq!(config.seed, 99);
    assert_eq!(config.world.ceiling, 55.0);
    assert_eq!(config.world.half_extent, GameConfig::default().world.half_extent);
    assert_eq!(config.tiers.exp_threshold(1), 15.0);
}

#[test]
fn test_inconsistent_config_is_rejected() {
    let err = GameConfig::parse_toml(
        r#"
        [events]
        duration_min = 20.0
        duration_max = 5.0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)));

    let err = GameConfig::parse_toml(
        r#"
        [tiers]
        exp_thresholds = [10.0, 5.0, 30.0, 50.0, 80.0, 120.0, 170.0, 240.0]
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)));

    let err = GameConfig::parse_toml("seed = \"not a number\"").unwrap_err();
    assert!(matches!(err, SimError::ConfigParse(_)));
}
