//! World event and boss director
//!
//! Timer-driven: one world event at a time on a randomized schedule, and at
//! most one boss, announced ahead of its arrival.

use std::sync::Arc;

use glam::Vec3;
use rand::Rng;

use crate::core::types::Timestamp;
use crate::entity::{GameEvent, WorldEventKind};
use crate::store::EntityStore;

#[derive(Debug, Default)]
pub struct Director;

impl Director {
    pub fn new() -> Self {
        Self
    }

    pub fn update<R: Rng + ?Sized>(&mut self, store: &mut EntityStore, now: Timestamp, dt: f32, rng: &mut R) {
        self.update_event(store, now, rng);
        self.update_boss(store, now, dt);
    }

    fn update_event<R: Rng + ?Sized>(&mut self, store: &mut EntityStore, now: Timestamp, rng: &mut R) {
        if store.event().is_some_and(|e| e.is_expired(now)) {
            store.end_event();
        }
        if store.event().is_some() || now < store.next_event_at() {
            return;
        }

        let cfg = store.config().events.clone();
        let kind = WorldEventKind::ALL[rng.gen_range(0..WorldEventKind::ALL.len())];
        let ends_at = now + rng.gen_range(cfg.duration_min..=cfg.duration_max);
        let next_event_at = now + rng.gen_range(cfg.interval_min..=cfg.interval_max);

        let drift = match kind {
            WorldEventKind::Current => {
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                Some(Vec3::new(angle.cos(), 0.0, angle.sin()) * cfg.current_strength)
            }
            _ => None,
        };
        store.start_event(GameEvent { kind, ends_at, drift }, next_event_at);

        if kind == WorldEventKind::Frenzy {
            let center = store.player().position;
            let tier = store.player().tier.saturating_sub(1);
            store.spawn_frenzy(center, tier, cfg.frenzy_count, now, rng);
        }
    }

    fn update_boss(&mut self, store: &mut EntityStore, now: Timestamp, dt: f32) {
        let config = Arc::clone(store.config());
        let player_pos = store.player().position;

        if store.boss().is_none() {
            if !store.boss_warning_pending() && now >= store.next_boss_at() {
                store.begin_boss_warning(now);
            }
            return;
        }
        let Some(boss) = store.boss_mut() else {
            return;
        };

        if boss.age(now) >= config.boss.lifetime {
            store.despawn_boss(now);
            return;
        }

        let turn = 1.0 - (-config.boss.turn_rate * dt).exp();
        if let Some(toward) = (player_pos - boss.position).try_normalize() {
            boss.heading = boss.heading.lerp(toward, turn).try_normalize().unwrap_or(toward);
        }
        boss.position += boss.heading * config.boss.speed * dt;

        let extent = config.world.half_extent;
        boss.position.x = boss.position.x.clamp(-extent, extent);
        boss.position.z = boss.position.z.clamp(-extent, extent);
        boss.position.y = boss.position.y.clamp(0.0, config.world.ceiling);
    }
}
