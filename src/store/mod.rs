//! Entity store - the single source of truth for simulation state
//!
//! Every mutation goes through a method here. Gameplay refusals (not enough
//! gold, cooldown running, entity already gone) return `false` and leave the
//! state untouched. Anything presentation might react to is pushed to the
//! outbox as a `SimEvent` and drained once per tick.

pub mod combo;
pub mod events;
pub mod timers;

use std::sync::Arc;

use ahash::AHashMap;
use glam::Vec3;
use rand::Rng;

use crate::core::config::GameConfig;
use crate::core::types::{
    GrowthPhase, IdAllocator, ItemId, NpcId, RunState, Tier, Timestamp, MAX_TIER,
};
use crate::entity::{ActiveEffects, Boss, GameEvent, Item, ItemKind, Npc, Player, WorldEventKind};
use crate::progression::perks::{draw_offer, PerkEffect};
use crate::progression::quests::QuestSignal;
use crate::progression::{PerkId, QuestBook, SkillId, UpgradeTrack};
use crate::spatial::TerrainField;

pub use combo::{combo_multiplier, ComboTracker};
pub use events::SimEvent;
pub use timers::{TimedAction, TimerQueue};

/// Attempts at finding a spawn point far enough from the player
const SPAWN_ATTEMPTS: usize = 8;

pub struct EntityStore {
    config: Arc<GameConfig>,
    terrain: TerrainField,
    state: RunState,
    ended_at: Option<Timestamp>,
    player: Player,
    npcs: Vec<Npc>,
    npc_index: AHashMap<NpcId, usize>,
    items: Vec<Item>,
    effects: ActiveEffects,
    event: Option<GameEvent>,
    next_event_at: Timestamp,
    boss: Option<Boss>,
    next_boss_at: Timestamp,
    boss_warning_pending: bool,
    combo: ComboTracker,
    quests: QuestBook,
    perk_offer: Vec<PerkId>,
    timers: TimerQueue,
    ids: IdAllocator,
    outbox: Vec<SimEvent>,
}

impl EntityStore {
    pub fn new(config: Arc<GameConfig>) -> Self {
        let terrain = TerrainField::from_config(&config.world);
        let player = Player::new(
            Vec3::from_array(config.player.spawn_position),
            config.economy.starting_gold,
            0.0,
        );
        let combo = ComboTracker::new(config.economy.combo_window);
        let next_event_at = config.events.first_event_at;
        let next_boss_at = config.boss.first_spawn_at;

        Self {
            config,
            terrain,
            state: RunState::Playing,
            ended_at: None,
            player,
            npcs: Vec::new(),
            npc_index: AHashMap::new(),
            items: Vec::new(),
            effects: ActiveEffects::new(),
            event: None,
            next_event_at,
            boss: None,
            next_boss_at,
            boss_warning_pending: false,
            combo,
            quests: QuestBook::new(),
            perk_offer: Vec::new(),
            timers: TimerQueue::new(),
            ids: IdAllocator::new(),
            outbox: Vec::new(),
        }
    }

    /// Wipe all run state, including every pending timer
    pub fn reset(&mut self, now: Timestamp) {
        let config = Arc::clone(&self.config);
        *self = Self::new(config);
        self.player.started_at = now;
        self.next_event_at = now + self.config.events.first_event_at;
        self.next_boss_at = now + self.config.boss.first_spawn_at;
    }

    /// Reset, then populate the world for a fresh run
    pub fn start<R: Rng + ?Sized>(&mut self, now: Timestamp, rng: &mut R) {
        self.reset(now);

        for tier in 0..=MAX_TIER {
            for _ in 0..self.target_population(tier) {
                let position = self.random_spawn_position(tier, rng);
                self.spawn_npc(tier, position, false, now, rng);
            }
        }
        for _ in 0..self.config.items.initial_count {
            self.spawn_item(rng);
        }
        self.quests.refresh(
            GrowthPhase::from_tier(self.player.tier),
            self.config.economy.active_quests,
            rng,
        );

        tracing::info!(
            "Run started with {} NPCs and {} items",
            self.npcs.len(),
            self.items.len()
        );
    }

    // === ACCESSORS ===

    pub fn config(&self) -> &Arc<GameConfig> {
        &self.config
    }

    pub fn terrain(&self) -> &TerrainField {
        &self.terrain
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == RunState::Playing
    }

    /// When the run reached GameOver or Cleared
    pub fn ended_at(&self) -> Option<Timestamp> {
        self.ended_at
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable player access for the player controller (position, velocity)
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn npcs_mut(&mut self) -> &mut [Npc] {
        &mut self.npcs
    }

    pub fn npc(&self, id: NpcId) -> Option<&Npc> {
        self.npc_index.get(&id).and_then(|&i| self.npcs.get(i))
    }

    pub fn alive_npc_count(&self) -> usize {
        self.npcs.iter().filter(|n| n.alive).count()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    pub fn event(&self) -> Option<&GameEvent> {
        self.event.as_ref()
    }

    pub fn next_event_at(&self) -> Timestamp {
        self.next_event_at
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    pub fn boss_mut(&mut self) -> Option<&mut Boss> {
        self.boss.as_mut()
    }

    pub fn next_boss_at(&self) -> Timestamp {
        self.next_boss_at
    }

    pub fn boss_warning_pending(&self) -> bool {
        self.boss_warning_pending
    }

    pub fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    pub fn quests(&self) -> &QuestBook {
        &self.quests
    }

    pub fn perk_offer(&self) -> &[PerkId] {
        &self.perk_offer
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Current drift from an active ocean current
    pub fn current_drift(&self) -> Vec3 {
        self.event
            .as_ref()
            .map(GameEvent::current_drift)
            .unwrap_or(Vec3::ZERO)
    }

    pub fn push_event(&mut self, event: SimEvent) {
        self.outbox.push(event);
    }

    /// Hand over everything emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.outbox)
    }

    // === DERIVED GETTERS ===

    pub fn is_effect_active(&self, kind: ItemKind, now: Timestamp) -> bool {
        self.effects.is_active(kind, now)
    }

    /// Dashing, shielded, or inside the grace period after a defense
    pub fn is_invincible(&self, now: Timestamp) -> bool {
        self.player.dashing
            || self.effects.is_active(ItemKind::Shield, now)
            || now < self.player.grace_until
    }

    pub fn player_size(&self) -> f32 {
        self.config.tiers.size(self.player.tier)
    }

    /// Base swim speed with upgrades and perks, before dash/item multipliers
    pub fn player_speed(&self) -> f32 {
        let bonus = self.config.player.speed_upgrade_step * self.player.upgrades.speed as f32
            + self.player.perks.speed_bonus();
        self.config.tiers.player_speed(self.player.tier) * (1.0 + bonus)
    }

    /// Eat-range multiplier from upgrades, perks and late tiers, capped
    pub fn eat_range_multiplier(&self) -> f32 {
        let c = &self.config.collision;
        let mut mult = 1.0
            + c.eat_range_step * self.player.upgrades.eat_range as f32
            + self.player.perks.eat_range_bonus();
        if self.player.tier >= 6 {
            mult += c.eat_range_tier6_bonus;
        }
        if self.player.tier >= 7 {
            mult += c.eat_range_tier7_bonus;
        }
        mult.min(c.eat_range_cap)
    }

    pub fn dash_cooldown(&self) -> f64 {
        let p = &self.config.player;
        let base = (p.dash_base_cooldown - p.dash_cooldown_step * self.player.upgrades.dash_cooldown as f64)
            .max(p.dash_min_cooldown);
        base * self.player.perks.dash_cooldown_factor()
    }

    /// Population the world aims for at `tier`, including the NPC-count upgrade
    pub fn target_population(&self, tier: Tier) -> usize {
        let base = self.config.tiers.population[tier.min(MAX_TIER) as usize] as f32;
        (base * self.player.upgrades.population_factor()).round() as usize
    }

    /// Permanent slots at `tier`, alive or waiting to respawn
    fn population_slots(&self, tier: Tier) -> usize {
        self.npcs
            .iter()
            .filter(|n| n.tier == tier && !n.transient)
            .count()
    }

    // === EXPERIENCE & TIERS ===

    /// Add experience and advance at most one tier.
    ///
    /// Doubled while the double-exp effect runs. Overflow past the threshold
    /// is discarded. At max tier, meeting the threshold clears the run.
    pub fn add_experience<R: Rng + ?Sized>(&mut self, amount: f32, now: Timestamp, rng: &mut R) {
        if !self.is_playing() {
            return;
        }
        let mult = if self.is_effect_active(ItemKind::DoubleExp, now) { 2.0 } else { 1.0 };
        self.player.experience += amount.max(0.0) * mult;

        let threshold = self.config.tiers.exp_threshold(self.player.tier);
        if self.player.experience < threshold {
            return;
        }

        if self.player.tier < MAX_TIER {
            self.player.tier += 1;
            self.player.experience = 0.0;
            self.on_tier_up(rng);
        } else {
            self.state = RunState::Cleared;
            self.ended_at = Some(now);
            self.outbox.push(SimEvent::Cleared { at: now });
            tracing::info!("Run cleared at {:.1}s with score {}", now, self.player.score);
        }
    }

    fn on_tier_up<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let tier = self.player.tier;
        tracing::debug!("Player reached tier {}", tier);
        self.outbox.push(SimEvent::TierUp { tier });

        self.perk_offer = draw_offer(&self.player.perks, self.config.economy.perk_offer_size, rng);
        if !self.perk_offer.is_empty() {
            self.outbox.push(SimEvent::PerkOffered { options: self.perk_offer.clone() });
        }

        self.quests
            .refresh(GrowthPhase::from_tier(tier), self.config.economy.active_quests, rng);
        self.signal_quest(QuestSignal::Evolved);
    }

    /// Buy one tier with gold (or for free with a pending Evolution Surge)
    pub fn evolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.is_playing() {
            return false;
        }
        let Some(cost) = self.config.tiers.evolve_cost(self.player.tier) else {
            return false;
        };

        let paid = if self.player.free_evolve {
            self.player.free_evolve = false;
            0
        } else if self.player.spend_gold(cost) {
            cost
        } else {
            return false;
        };

        self.player.tier += 1;
        self.player.experience = 0.0;
        self.outbox.push(SimEvent::Evolved { tier: self.player.tier, cost: paid });
        self.on_tier_up(rng);
        true
    }

    // === EATING ===

    /// Register an eat event for combo tracking; returns the new combo count
    pub fn register_eat(&mut self, now: Timestamp) -> u32 {
        let combo = self.combo.register(now);
        self.outbox.push(SimEvent::ComboChanged {
            combo,
            multiplier: self.combo.multiplier(),
        });
        self.signal_quest(QuestSignal::Combo(combo));
        combo
    }

    /// Eat a single NPC. False if it does not exist or is already dead.
    pub fn eat_npc<R: Rng + ?Sized>(&mut self, id: NpcId, now: Timestamp, rng: &mut R) -> bool {
        if !self.is_playing() {
            return false;
        }
        let eaten = self.consume_npc(id, now, rng);
        if eaten {
            self.purge_dead_transients();
        }
        eaten
    }

    /// Eat many NPCs in one transition, crediting precomputed totals.
    ///
    /// Ids that no longer exist (eaten earlier this frame) are skipped.
    /// Returns the number actually eaten.
    pub fn batch_eat_npcs<R: Rng + ?Sized>(
        &mut self,
        ids: &[NpcId],
        experience: f32,
        gold: u64,
        now: Timestamp,
        rng: &mut R,
    ) -> usize {
        if !self.is_playing() {
            return 0;
        }
        let mut eaten = 0;
        for &id in ids {
            if self.consume_npc(id, now, rng) {
                eaten += 1;
            }
        }
        if eaten == 0 {
            return 0;
        }
        self.purge_dead_transients();

        if gold > 0 {
            self.player.earn_gold(gold);
            self.signal_quest(QuestSignal::GoldEarned(gold));
        }
        self.outbox.push(SimEvent::Ate { count: eaten, experience, gold });
        self.add_experience(experience, now, rng);
        eaten
    }

    fn consume_npc<R: Rng + ?Sized>(&mut self, id: NpcId, now: Timestamp, rng: &mut R) -> bool {
        let Some(&idx) = self.npc_index.get(&id) else {
            return false;
        };
        let Some(npc) = self.npcs.get_mut(idx) else {
            return false;
        };
        if !npc.alive {
            return false;
        }
        npc.alive = false;
        let tier = npc.tier;
        let transient = npc.transient;

        self.player.score += tier.max(1) as u64;
        self.player.kills += 1;

        if !transient {
            let npc_cfg = &self.config.npc;
            let delay = rng.gen_range(npc_cfg.respawn_delay_min..=npc_cfg.respawn_delay_max);
            self.timers.schedule(now + delay, TimedAction::RespawnNpc { tier });
        }
        self.signal_quest(QuestSignal::Ate { tier });
        true
    }

    fn purge_dead_transients(&mut self) {
        let before = self.npcs.len();
        self.npcs.retain(|n| n.alive || !n.transient);
        if self.npcs.len() != before {
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.npc_index.clear();
        for (i, npc) in self.npcs.iter().enumerate() {
            self.npc_index.insert(npc.id, i);
        }
    }

    // === SPAWNING ===

    fn random_spawn_position<R: Rng + ?Sized>(&self, tier: Tier, rng: &mut R) -> Vec3 {
        let world = &self.config.world;
        let size = self.config.tiers.size(tier);
        let extent = world.half_extent * 0.95;
        let min_dist_sq = self.config.npc.respawn_min_distance.powi(2);

        let mut candidate = Vec3::ZERO;
        for _ in 0..SPAWN_ATTEMPTS {
            let x = rng.gen_range(-extent..=extent);
            let z = rng.gen_range(-extent..=extent);
            let floor = self.terrain.floor_for(x, z, size);
            let top = (world.ceiling - size).max(floor);
            let y = rng.gen_range(floor..=top);
            candidate = Vec3::new(x, y, z);
            if candidate.distance_squared(self.player.position) >= min_dist_sq {
                break;
            }
        }
        candidate
    }

    fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        Vec3::new(angle.cos(), 0.0, angle.sin())
    }

    /// Append a new NPC born at `now` and index it
    pub fn spawn_npc<R: Rng + ?Sized>(
        &mut self,
        tier: Tier,
        position: Vec3,
        transient: bool,
        now: Timestamp,
        rng: &mut R,
    ) -> NpcId {
        let id = self.ids.next_npc();
        let heading = Self::random_heading(rng);
        let wobble_seed = rng.gen_range(0.0..100.0);
        let mut npc = Npc::new(id, tier.min(MAX_TIER), position, heading, wobble_seed, now);
        npc.transient = transient;
        self.npc_index.insert(id, self.npcs.len());
        self.npcs.push(npc);
        id
    }

    /// Refill one slot of `tier`: revive a dead slot, else append while below target
    fn respawn_npc<R: Rng + ?Sized>(&mut self, tier: Tier, now: Timestamp, rng: &mut R) {
        let position = self.random_spawn_position(tier, rng);
        let heading = Self::random_heading(rng);

        if let Some(slot) = self
            .npcs
            .iter_mut()
            .find(|n| !n.alive && !n.transient && n.tier == tier)
        {
            slot.revive(position, heading, now);
            return;
        }
        if self.population_slots(tier) < self.target_population(tier) {
            self.spawn_npc(tier, position, false, now, rng);
        }
    }

    /// Spawn a ring of short-lived prey around `center`
    pub fn spawn_frenzy<R: Rng + ?Sized>(
        &mut self,
        center: Vec3,
        tier: Tier,
        count: usize,
        now: Timestamp,
        rng: &mut R,
    ) {
        let ev = &self.config.events;
        let (r_min, r_max) = (ev.frenzy_radius_min, ev.frenzy_radius_max);
        let extent = self.config.world.half_extent;
        let size = self.config.tiers.size(tier);
        let ceiling = self.config.world.ceiling - size;

        for _ in 0..count {
            let dir = Self::random_heading(rng);
            let offset = dir * rng.gen_range(r_min..=r_max) + Vec3::Y * rng.gen_range(-2.0..=2.0);
            let mut pos = center + offset;
            pos.x = pos.x.clamp(-extent, extent);
            pos.z = pos.z.clamp(-extent, extent);
            let floor = self.terrain.floor_for(pos.x, pos.z, size);
            pos.y = pos.y.clamp(floor, ceiling.max(floor));
            self.spawn_npc(tier, pos, true, now, rng);
        }
    }

    /// Remove every transient NPC still alive (frenzy ended)
    pub fn remove_transient_npcs(&mut self) -> usize {
        let before = self.npcs.len();
        self.npcs.retain(|n| !n.transient);
        let removed = before - self.npcs.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    pub fn spawn_item<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ItemId {
        let id = self.ids.next_item();
        let kind = ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())];
        let position = self.random_spawn_position(0, rng);
        self.items.push(Item { id, kind, position });
        id
    }

    // === ITEMS & EFFECTS ===

    /// Pick up an item: install its effect and queue a replacement
    pub fn collect_item<R: Rng + ?Sized>(&mut self, id: ItemId, now: Timestamp, rng: &mut R) -> bool {
        let Some(idx) = self.items.iter().position(|i| i.id == id) else {
            return false;
        };
        let item = self.items.remove(idx);

        let duration = item.kind.duration(&self.config.items) + self.player.perks.item_duration_bonus();
        let expires_at = now + duration;
        self.effects.install(item.kind, expires_at);

        let items_cfg = &self.config.items;
        let delay = rng.gen_range(items_cfg.respawn_delay_min..=items_cfg.respawn_delay_max);
        self.timers.schedule(now + delay, TimedAction::RespawnItem);

        tracing::debug!("Collected {:?}, active until {:.1}", item.kind, expires_at);
        self.outbox.push(SimEvent::ItemCollected { kind: item.kind, expires_at });
        self.signal_quest(QuestSignal::Collected);
        true
    }

    /// Drop expired effects. Called once per frame.
    pub fn clean_expired_effects(&mut self, now: Timestamp) {
        for kind in self.effects.clean_expired(now) {
            self.outbox.push(SimEvent::EffectExpired { kind });
        }
    }

    // === DASH & DEFENSE ===

    /// Begin a dash. Refused while dashing or cooling down.
    pub fn start_dash(&mut self, now: Timestamp) -> bool {
        if !self.is_playing() || self.player.dashing || now < self.player.dash_cooldown_end {
            return false;
        }
        let end = now + self.config.player.dash_duration;
        self.player.dashing = true;
        self.player.dash_cooldown_end = end + self.dash_cooldown();
        self.timers.schedule(end, TimedAction::EndDash);
        self.outbox.push(SimEvent::DashStarted);
        true
    }

    pub fn end_dash(&mut self) {
        if self.player.dashing {
            self.player.dashing = false;
            self.outbox.push(SimEvent::DashEnded);
        }
    }

    /// Try to absorb a lethal hit with Shell Guard or a shell charge
    pub fn use_defense(&mut self, now: Timestamp) -> bool {
        let absorbed = if now < self.player.shell_until {
            true
        } else if self.player.shell_charges > 0 {
            self.player.shell_charges -= 1;
            true
        } else {
            false
        };
        if absorbed {
            self.player.grace_until = now + self.config.player.defense_grace;
            self.outbox.push(SimEvent::DefenseUsed);
        }
        absorbed
    }

    pub fn set_game_over(&mut self, now: Timestamp) {
        if !self.is_playing() {
            return;
        }
        self.state = RunState::GameOver;
        self.ended_at = Some(now);
        self.outbox.push(SimEvent::GameOver { at: now });
        tracing::info!(
            "Game over at {:.1}s: tier {}, score {}, kills {}",
            now,
            self.player.tier,
            self.player.score,
            self.player.kills
        );
    }

    // === ECONOMY ===

    /// Buy the next level of an upgrade track
    pub fn purchase_upgrade(&mut self, track: UpgradeTrack, now: Timestamp) -> bool {
        let Some(cost) = self.player.upgrades.next_cost(track) else {
            return false;
        };
        if !self.player.spend_gold(cost) {
            return false;
        }
        self.player.upgrades.increment(track);
        let level = self.player.upgrades.level(track);
        self.outbox.push(SimEvent::UpgradePurchased { track, level, cost });

        if track == UpgradeTrack::NpcCount {
            for tier in 0..=MAX_TIER {
                let deficit = self
                    .target_population(tier)
                    .saturating_sub(self.population_slots(tier));
                for _ in 0..deficit {
                    self.timers.schedule(now, TimedAction::RespawnNpc { tier });
                }
            }
        }
        true
    }

    /// Take one of the perks currently on offer
    pub fn choose_perk(&mut self, perk: PerkId) -> bool {
        if !self.perk_offer.contains(&perk) {
            return false;
        }
        self.perk_offer.clear();
        self.player.perks.insert(perk);
        match perk.def().effect {
            PerkEffect::FreeEvolve => self.player.free_evolve = true,
            PerkEffect::ShellCharge(n) => self.player.shell_charges += n,
            _ => {}
        }
        self.outbox.push(SimEvent::PerkChosen { perk });
        true
    }

    pub fn learn_skill(&mut self, skill: SkillId) -> bool {
        let def = skill.def();
        if self.player.tier < def.min_tier || self.player.skills.knows(skill) {
            return false;
        }
        if !self.player.spend_gold(def.cost) {
            return false;
        }
        self.player.skills.learn(skill);
        self.outbox.push(SimEvent::SkillLearned { skill });
        true
    }

    /// Trigger a learned skill. Roar's startle broadcast is done by the caller,
    /// which owns the spatial registry.
    pub fn use_skill(&mut self, skill: SkillId, now: Timestamp) -> bool {
        if !self.is_playing() || !self.player.skills.trigger(skill, now) {
            return false;
        }
        let duration = skill.def().duration;
        match skill {
            SkillId::ShellGuard => self.player.shell_until = now + duration,
            SkillId::Vortex => self.effects.install(ItemKind::Magnet, now + duration),
            SkillId::Roar => {}
        }
        self.outbox.push(SimEvent::SkillUsed { skill });
        true
    }

    pub fn claim_quest(&mut self, id: &str) -> bool {
        let Some(reward) = self.quests.claim(id) else {
            return false;
        };
        self.player.earn_gold(reward);
        if let Some(def) = crate::progression::quests::quest_def(id) {
            self.outbox.push(SimEvent::QuestClaimed { id: def.id, reward });
        }
        true
    }

    fn signal_quest(&mut self, signal: QuestSignal) {
        for id in self.quests.record(signal) {
            tracing::debug!("Quest {} completed", id);
            self.outbox.push(SimEvent::QuestCompleted { id });
        }
    }

    // === WORLD EVENTS ===

    pub fn start_event(&mut self, event: GameEvent, next_event_at: Timestamp) {
        tracing::debug!("World event {:?} until {:.1}", event.kind, event.ends_at);
        self.outbox.push(SimEvent::WorldEventStarted {
            kind: event.kind,
            ends_at: event.ends_at,
        });
        self.event = Some(event);
        self.next_event_at = next_event_at;
    }

    /// Clear the current event, undoing its world side effects
    pub fn end_event(&mut self) -> Option<GameEvent> {
        let event = self.event.take()?;
        if event.kind == WorldEventKind::Frenzy {
            let removed = self.remove_transient_npcs();
            tracing::debug!("Frenzy ended, {} leftover spawns removed", removed);
        }
        self.outbox.push(SimEvent::WorldEventEnded { kind: event.kind });
        Some(event)
    }

    // === BOSS ===

    /// Announce the boss and queue its spawn. False if one is alive or pending.
    pub fn begin_boss_warning(&mut self, now: Timestamp) -> bool {
        if self.boss.is_some() || self.boss_warning_pending {
            return false;
        }
        let spawn_at = now + self.config.boss.warning_delay;
        self.boss_warning_pending = true;
        self.timers.schedule(spawn_at, TimedAction::SpawnBoss);
        self.outbox.push(SimEvent::BossWarning { spawn_at });
        true
    }

    fn spawn_boss<R: Rng + ?Sized>(&mut self, now: Timestamp, rng: &mut R) {
        self.boss_warning_pending = false;
        if self.boss.is_some() {
            return;
        }
        let position = self.random_spawn_position(MAX_TIER, rng);
        let heading = self.player.position - position;
        let scale = rng.gen_range(0.9..=1.2);
        self.boss = Some(Boss::new(position, heading, now, scale));
        self.outbox.push(SimEvent::BossSpawned { position });
        tracing::info!("Boss spawned at ({:.0}, {:.0}, {:.0})", position.x, position.y, position.z);
    }

    /// Remove the boss and push the next eligible spawn out
    pub fn despawn_boss(&mut self, now: Timestamp) {
        if self.boss.take().is_none() {
            return;
        }
        self.next_boss_at =
            now + self.config.boss.respawn_interval + self.player.perks.boss_delay();
        self.outbox.push(SimEvent::BossDespawned);
        self.signal_quest(QuestSignal::BossSurvived);
        tracing::debug!("Boss left, next eligible at {:.1}", self.next_boss_at);
    }

    // === TIMERS ===

    /// Fire every deferred action due at `now`
    pub fn process_timers<R: Rng + ?Sized>(&mut self, now: Timestamp, rng: &mut R) {
        while let Some(action) = self.timers.pop_due(now) {
            match action {
                TimedAction::RespawnNpc { tier } => self.respawn_npc(tier, now, rng),
                TimedAction::RespawnItem => {
                    self.spawn_item(rng);
                }
                TimedAction::EndDash => self.end_dash(),
                TimedAction::SpawnBoss => self.spawn_boss(now, rng),
            }
        }
    }
}
