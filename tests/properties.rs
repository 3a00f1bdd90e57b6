//! Property tests for the rules that must hold for any input

use std::sync::Arc;

use deep_feast::core::types::MAX_TIER;
use deep_feast::progression::UpgradeTrack;
use deep_feast::spatial::SpatialRegistry;
use deep_feast::store::{
    combo_multiplier, ComboTracker, EntityStore, SimEvent, TimedAction, TimerQueue,
};
use deep_feast::GameConfig;
use glam::Vec3;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn fresh_store() -> EntityStore {
    EntityStore::new(Arc::new(GameConfig::default()))
}

proptest! {
    #[test]
    fn prop_experience_never_skips_a_tier(amounts in prop::collection::vec(0.0f32..500.0, 1..60)) {
        let mut store = fresh_store();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for (i, amount) in amounts.iter().enumerate() {
            let before = store.player().tier;
            store.add_experience(*amount, i as f64, &mut rng);
            let after = store.player().tier;
            prop_assert!(after == before || after == before + 1);
            prop_assert!(after <= MAX_TIER);
        }
    }

    #[test]
    fn prop_kills_and_score_follow_eats(tiers in prop::collection::vec(0u8..=MAX_TIER, 1..40)) {
        let mut store = fresh_store();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let ids: Vec<_> = tiers
            .iter()
            .map(|t| store.spawn_npc(*t, Vec3::new(0.0, 20.0, 0.0), false, 0.0, &mut rng))
            .collect();

        let eaten = store.batch_eat_npcs(&ids, 0.0, 0, 1.0, &mut rng);
        // Eating the same ids again is a no-op
        prop_assert_eq!(store.batch_eat_npcs(&ids, 0.0, 0, 1.0, &mut rng), 0);

        let expected_score: u64 = tiers.iter().map(|t| (*t).max(1) as u64).sum();
        prop_assert_eq!(eaten, tiers.len());
        prop_assert_eq!(store.player().kills, tiers.len() as u64);
        prop_assert_eq!(store.player().score, expected_score);
    }

    #[test]
    fn prop_upgrades_spend_exactly_their_cost(gold in 0u64..3000, buys in prop::collection::vec(0usize..4, 0..30)) {
        let mut store = fresh_store();
        store.player_mut().gold = gold;
        let mut spent = 0;
        for pick in buys {
            let track = UpgradeTrack::ALL[pick];
            let cost = store.player().upgrades.next_cost(track);
            let bought = store.purchase_upgrade(track, 0.0);
            match cost {
                Some(cost) if cost <= gold - spent => {
                    prop_assert!(bought);
                    spent += cost;
                }
                _ => prop_assert!(!bought),
            }
            prop_assert!(store.player().upgrades.level(track) <= track.max_level());
        }
        prop_assert_eq!(store.player().gold, gold - spent);
    }

    #[test]
    fn prop_combo_counts_runs_inside_window(quarters in prop::collection::vec(0u32..16, 1..50)) {
        // Quarter-second steps keep the clock exact
        let window = 2.0;
        let mut combo = ComboTracker::new(window);
        let mut now = 0.0;
        let mut expected = 0;
        for (i, q) in quarters.iter().enumerate() {
            let gap = *q as f64 * 0.25;
            now += gap;
            expected = if i == 0 || gap >= window { 1 } else { expected + 1 };
            prop_assert_eq!(combo.register(now), expected);
            prop_assert_eq!(combo.multiplier(), combo_multiplier(expected));
        }
    }

    #[test]
    fn prop_timers_fire_in_time_order(times in prop::collection::vec(0.0f64..100.0, 1..50)) {
        let mut queue = TimerQueue::new();
        for t in &times {
            queue.schedule(*t, TimedAction::RespawnItem);
        }
        prop_assert!(queue.pop_due(-1.0).is_none());

        let mut sorted = times.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        for t in sorted {
            prop_assert_eq!(queue.next_due(), Some(t));
            prop_assert!(queue.pop_due(t).is_some());
        }
        prop_assert!(queue.is_empty());
    }

    #[test]
    fn prop_registry_query_is_exact_and_sorted(
        points in prop::collection::vec((-50.0f32..50.0, 0.0f32..40.0, -50.0f32..50.0), 0..80),
        radius in 0.5f32..30.0,
    ) {
        let mut registry = SpatialRegistry::new(4.0);
        let mut store = fresh_store();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let center = Vec3::new(0.0, 20.0, 0.0);
        let mut expected = Vec::new();
        for (x, y, z) in points {
            let pos = Vec3::new(x, y, z);
            let id = store.spawn_npc(0, pos, false, 0.0, &mut rng);
            registry.publish(id, pos);
            if pos.distance_squared(center) <= radius * radius {
                expected.push(id);
            }
        }
        let found = registry.within(center, radius);
        prop_assert!(found.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn prop_at_most_one_boss(seed in 0u64..500) {
        let mut store = fresh_store();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut now = 0.0;
        let mut live = 0i32;
        while now < 250.0 {
            now += 0.5;
            store.process_timers(now, &mut rng);
            if store.boss().is_some() || store.boss_warning_pending() {
                prop_assert!(!store.begin_boss_warning(now));
            } else if now >= store.next_boss_at() {
                prop_assert!(store.begin_boss_warning(now));
            }
            if store.boss().is_some_and(|b| b.age(now) >= 20.0) {
                store.despawn_boss(now);
            }
            for event in store.drain_events() {
                match event {
                    SimEvent::BossSpawned { .. } => live += 1,
                    SimEvent::BossDespawned => live -= 1,
                    _ => {}
                }
            }
            prop_assert!(live == 0 || live == 1);
        }
    }
}
