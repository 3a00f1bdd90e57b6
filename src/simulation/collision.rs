//! Collision and consumption pass
//!
//! Once per frame: player vs NPCs (eat or die), player vs items (one pickup
//! per frame), player vs boss. Eating is collected into a single batch so the
//! store sees one transition no matter how many creatures vanished.

use std::sync::Arc;

use glam::Vec3;
use rand::Rng;

use crate::core::types::{NpcId, Tier, Timestamp};
use crate::entity::ItemKind;
use crate::spatial::SpatialRegistry;
use crate::store::{combo_multiplier, EntityStore, SimEvent};

/// What a single pass did, for the caller's logging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionOutcome {
    pub eaten: usize,
    pub experience: f32,
    pub gold: u64,
    pub collected: Option<ItemKind>,
    pub defended: bool,
    pub died: bool,
}

#[derive(Debug, Default)]
pub struct CollisionSystem {
    cooldown_until: Timestamp,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.cooldown_until = 0.0;
    }

    pub fn cooldown_until(&self) -> Timestamp {
        self.cooldown_until
    }

    pub fn run<R: Rng + ?Sized>(
        &mut self,
        store: &mut EntityStore,
        registry: &mut SpatialRegistry,
        now: Timestamp,
        rng: &mut R,
    ) -> CollisionOutcome {
        let mut outcome = CollisionOutcome::default();
        if !store.is_playing() {
            return outcome;
        }

        if now >= self.cooldown_until {
            self.npc_pass(store, registry, now, rng, &mut outcome);
            if outcome.died || outcome.defended {
                return outcome;
            }
        }

        outcome.collected = Self::item_pass(store, now, rng);

        if Self::boss_hits(store, now) {
            if store.use_defense(now) {
                outcome.defended = true;
            } else {
                store.set_game_over(now);
                outcome.died = true;
            }
        }
        outcome
    }

    fn npc_pass<R: Rng + ?Sized>(
        &mut self,
        store: &mut EntityStore,
        registry: &mut SpatialRegistry,
        now: Timestamp,
        rng: &mut R,
        outcome: &mut CollisionOutcome,
    ) {
        let config = Arc::clone(store.config());
        let cfg = &config.collision;
        let player_pos = store.player().position;
        let player_tier = store.player().tier;
        let player_size = store.player_size();
        let eat_mult = store.eat_range_multiplier();
        let invincible = store.is_invincible(now);

        let mut batch: Vec<(NpcId, Tier, Vec3)> = Vec::new();
        for id in registry.within(player_pos, cfg.broad_phase_radius) {
            let Some((tier, position, edible)) = store
                .npc(id)
                .filter(|npc| npc.alive)
                .map(|npc| (npc.tier, npc.position, npc.is_edible_by(player_tier)))
            else {
                continue;
            };
            let npc_size = config.tiers.size(tier);
            let dist = position.distance(player_pos);

            if edible {
                let eat_radius =
                    (cfg.eat_player_factor * player_size + cfg.eat_npc_factor * npc_size) * eat_mult;
                if dist <= eat_radius && batch.len() < cfg.max_eats_per_pass {
                    batch.push((id, tier, position));
                }
            } else if !invincible && dist <= cfg.danger_factor * (player_size + npc_size) {
                // A hit ends the pass whether or not a defense absorbs it
                if store.use_defense(now) {
                    tracing::debug!("Defense absorbed a tier {} hit", tier);
                    outcome.defended = true;
                } else {
                    store.set_game_over(now);
                    outcome.died = true;
                }
                return;
            }
        }

        if batch.is_empty() {
            return;
        }

        let combo = store.register_eat(now);
        let mult = combo_multiplier(combo);
        let perks = &store.player().perks;
        let exp_scale = mult * (1.0 + perks.exp_bonus());
        let gold_scale = mult * (1.0 + perks.gold_bonus());
        let gold_double = perks.doubles_gold();

        let mut experience = 0.0;
        let mut gold = 0.0;
        for &(_, tier, _) in &batch {
            let base = if tier < player_tier { tier.max(1) } else { 1 };
            experience += base as f32 * exp_scale;
            gold += config.tiers.gold_reward(tier) as f32 * gold_scale;
        }
        if gold_double {
            gold *= 2.0;
        }
        let gold = gold.round() as u64;

        let ids: Vec<NpcId> = batch.iter().map(|(id, _, _)| *id).collect();
        let eaten = store.batch_eat_npcs(&ids, experience, gold, now, rng);
        for id in &ids {
            registry.remove(*id);
        }
        for &(_, tier, position) in batch.iter().take(cfg.max_bursts_per_pass) {
            store.push_event(SimEvent::EatBurst { position, tier });
        }
        registry.broadcast_startle(player_pos, now);

        self.cooldown_until = now + rng.gen_range(cfg.eat_cooldown_min..=cfg.eat_cooldown_max);
        outcome.eaten = eaten;
        outcome.experience = experience;
        outcome.gold = gold;
    }

    fn item_pass<R: Rng + ?Sized>(store: &mut EntityStore, now: Timestamp, rng: &mut R) -> Option<ItemKind> {
        let cfg = &store.config().collision;
        let player = store.player();
        let mut radius = store.player_size() + cfg.item_margin + player.perks.magnet_range();
        if store.is_effect_active(ItemKind::Magnet, now) {
            radius += cfg.magnet_item_range;
        }

        let (id, kind) = store
            .items()
            .iter()
            .find(|item| item.position.distance(player.position) <= radius)
            .map(|item| (item.id, item.kind))?;
        store.collect_item(id, now, rng).then_some(kind)
    }

    fn boss_hits(store: &EntityStore, now: Timestamp) -> bool {
        let Some(boss) = store.boss() else {
            return false;
        };
        if store.is_invincible(now) {
            return false;
        }
        let cfg = store.config();
        let radius = cfg.collision.boss_size_factor * cfg.boss.size * boss.scale
            + cfg.collision.boss_player_factor * store.player_size();
        boss.position.distance(store.player().position) <= radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::core::types::RunState;
    use crate::progression::PerkId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixture {
        store: EntityStore,
        registry: SpatialRegistry,
        collision: CollisionSystem,
        rng: ChaCha8Rng,
    }

    impl Fixture {
        fn new(player_tier: Tier) -> Self {
            let mut store = EntityStore::new(Arc::new(GameConfig::default()));
            store.player_mut().tier = player_tier;
            store.player_mut().position = Vec3::new(0.0, 20.0, 0.0);
            Self {
                store,
                registry: SpatialRegistry::default(),
                collision: CollisionSystem::new(),
                rng: ChaCha8Rng::seed_from_u64(11),
            }
        }

        fn npc(&mut self, tier: Tier, offset: Vec3) -> NpcId {
            let pos = Vec3::new(0.0, 20.0, 0.0) + offset;
            let id = self.store.spawn_npc(tier, pos, false, 0.0, &mut self.rng);
            self.registry.publish(id, pos);
            id
        }

        fn run(&mut self, now: Timestamp) -> CollisionOutcome {
            self.collision.run(&mut self.store, &mut self.registry, now, &mut self.rng)
        }
    }

    #[test]
    fn test_eats_overlapping_prey() {
        let mut fx = Fixture::new(1);
        let near = fx.npc(0, Vec3::new(0.5, 0.0, 0.0));
        let far = fx.npc(0, Vec3::new(10.0, 0.0, 0.0));
        let outcome = fx.run(1.0);

        assert_eq!(outcome.eaten, 1);
        assert!(!fx.store.npc(near).unwrap().alive);
        assert!(fx.store.npc(far).unwrap().alive);
        assert!(fx.registry.position(near).is_none());
        assert_eq!(fx.registry.last_startle().map(|s| s.at), Some(1.0));
    }

    #[test]
    fn test_single_eat_exp_matches_tier_rule() {
        // Tier 1 eating tier 0: baseline 1, combo 1
        let mut fx = Fixture::new(1);
        fx.npc(0, Vec3::new(0.3, 0.0, 0.0));
        let outcome = fx.run(0.0);
        assert_eq!(outcome.experience, 1.0);
        assert_eq!(fx.store.player().experience, 1.0);
        assert_eq!(fx.store.player().kills, 1);

        // Tier 3 eating tier 2 credits 2; eating an equal tier credits 1
        let mut fx = Fixture::new(3);
        fx.npc(2, Vec3::new(0.3, 0.0, 0.0));
        fx.npc(3, Vec3::new(-0.3, 0.0, 0.0));
        let outcome = fx.run(0.0);
        assert_eq!(outcome.eaten, 2);
        assert_eq!(outcome.experience, 3.0);
        assert_eq!(outcome.gold, 3 + 5);
    }

    #[test]
    fn test_pass_caps_eats_and_bursts() {
        let mut fx = Fixture::new(4);
        for i in 0..30 {
            fx.npc(0, Vec3::new(0.05 * i as f32, 0.0, 0.0));
        }
        let outcome = fx.run(0.0);
        assert_eq!(outcome.eaten, 20);
        let bursts = fx
            .store
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SimEvent::EatBurst { .. }))
            .count();
        assert_eq!(bursts, 5);
        assert_eq!(fx.store.alive_npc_count(), 10);
    }

    #[test]
    fn test_cooldown_gates_next_pass() {
        let mut fx = Fixture::new(1);
        fx.npc(0, Vec3::new(0.2, 0.0, 0.0));
        fx.run(0.0);
        let until = fx.collision.cooldown_until();
        assert!((0.08..=0.15).contains(&until));

        fx.npc(0, Vec3::new(0.2, 0.0, 0.0));
        assert_eq!(fx.run(0.05).eaten, 0);
        assert_eq!(fx.run(0.2).eaten, 1);
    }

    #[test]
    fn test_predator_contact_is_fatal() {
        let mut fx = Fixture::new(0);
        fx.npc(3, Vec3::new(0.5, 0.0, 0.0));
        let outcome = fx.run(2.0);
        assert!(outcome.died);
        assert_eq!(fx.store.state(), RunState::GameOver);
    }

    #[test]
    fn test_shell_charge_absorbs_hit() {
        let mut fx = Fixture::new(0);
        fx.store.player_mut().shell_charges = 1;
        fx.npc(3, Vec3::new(0.5, 0.0, 0.0));
        let outcome = fx.run(2.0);
        assert!(outcome.defended);
        assert!(!outcome.died);
        assert_eq!(fx.store.state(), RunState::Playing);

        // Grace period protects on the next frame
        let outcome = fx.run(2.1);
        assert!(!outcome.died);
        // After the grace period with no charges left, the hit lands
        let outcome = fx.run(3.5);
        assert!(outcome.died);
    }

    #[test]
    fn test_dash_grants_invincibility() {
        let mut fx = Fixture::new(0);
        assert!(fx.store.start_dash(0.0));
        fx.npc(5, Vec3::new(0.5, 0.0, 0.0));
        let outcome = fx.run(0.1);
        assert!(!outcome.died);
        assert!(fx.store.is_playing());
    }

    #[test]
    fn test_collects_at_most_one_item() {
        let mut fx = Fixture::new(0);
        fx.store.spawn_item(&mut fx.rng);
        fx.store.spawn_item(&mut fx.rng);
        let target = fx.store.items()[0].position;
        fx.store.player_mut().position = target;
        let outcome = fx.run(0.0);
        assert!(outcome.collected.is_some());
        assert_eq!(fx.store.items().len(), 1);
    }

    #[test]
    fn test_boss_contact_is_fatal() {
        let mut fx = Fixture::new(7);
        fx.store.begin_boss_warning(0.0);
        fx.store.process_timers(2.0, &mut fx.rng);
        let player_pos = fx.store.player().position;
        if let Some(boss) = fx.store.boss_mut() {
            boss.position = player_pos + Vec3::new(1.0, 0.0, 0.0);
        }
        let outcome = fx.run(2.0);
        assert!(outcome.died);
    }

    #[test]
    fn test_combo_scales_rewards() {
        let mut fx = Fixture::new(1);
        let mut last = CollisionOutcome::default();
        for now in [0.0, 0.5, 1.0] {
            fx.npc(0, Vec3::new(0.3, 0.0, 0.0));
            last = fx.run(now);
            assert_eq!(last.eaten, 1);
        }
        assert_eq!(fx.store.combo().count(), 3);
        assert_eq!(last.experience, 1.5);
        assert_eq!(last.gold, 2);

        // A gap past the window starts over at the base reward
        fx.npc(0, Vec3::new(0.3, 0.0, 0.0));
        let outcome = fx.run(5.0);
        assert_eq!(outcome.experience, 1.0);
        assert_eq!(outcome.gold, 1);
    }

    #[test]
    fn test_perks_scale_rewards() {
        let mut fx = Fixture::new(3);
        fx.store.player_mut().perks.insert(PerkId::Gluttony);
        fx.store.player_mut().perks.insert(PerkId::GoldenScales);
        fx.npc(2, Vec3::new(0.3, 0.0, 0.0));
        let outcome = fx.run(0.0);
        assert!((outcome.experience - 2.4).abs() < 1e-5);
        assert_eq!(outcome.gold, 4);

        let mut fx = Fixture::new(3);
        fx.store.player_mut().perks.insert(PerkId::Midas);
        fx.npc(2, Vec3::new(0.3, 0.0, 0.0));
        let before = fx.store.player().gold;
        let outcome = fx.run(0.0);
        assert_eq!(outcome.experience, 2.0);
        assert_eq!(outcome.gold, 6);
        assert_eq!(fx.store.player().gold, before + 6);
    }
}
