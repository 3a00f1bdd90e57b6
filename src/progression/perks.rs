//! Perk catalog and the set of perks a player owns
//!
//! Perks are offered in threes on every tier-up and kept for the rest of the
//! run. Bonuses from several perks add up; Midas doubles gold after every
//! other bonus has been applied.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PerkId {
    SharpTeeth,
    WideMaw,
    Gluttony,
    GoldenScales,
    Midas,
    LongLasting,
    MagnetSense,
    Elusive,
    FinPower,
    QuickRecovery,
    EvolutionSurge,
    HardShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    /// Relative draw weight when building an offer
    pub fn weight(&self) -> u32 {
        match self {
            Self::Common => 60,
            Self::Rare => 30,
            Self::Epic => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerkEffect {
    /// Added to the eat-range multiplier
    EatRange(f32),
    /// Fractional experience bonus
    ExpBonus(f32),
    /// Fractional gold bonus
    GoldBonus(f32),
    /// Doubles gold from eating, applied last
    GoldDouble,
    /// Seconds added to every item effect
    ItemDuration(f64),
    /// Extra item pickup radius
    MagnetRange(f32),
    /// Seconds added to the gap between bosses
    BossDelay(f64),
    /// Fractional swim speed bonus
    SpeedBonus(f32),
    /// Fraction removed from the dash cooldown
    DashCooldown(f64),
    /// Next evolution costs nothing
    FreeEvolve,
    /// Shell charges that each absorb one lethal hit
    ShellCharge(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct PerkDef {
    pub id: PerkId,
    pub name: &'static str,
    pub rarity: Rarity,
    pub effect: PerkEffect,
    /// One-shot perks may be offered again after being taken
    pub repeatable: bool,
}

pub static PERKS: [PerkDef; 12] = [
    PerkDef { id: PerkId::SharpTeeth, name: "Sharp Teeth", rarity: Rarity::Common, effect: PerkEffect::EatRange(0.15), repeatable: false },
    PerkDef { id: PerkId::WideMaw, name: "Wide Maw", rarity: Rarity::Rare, effect: PerkEffect::EatRange(0.35), repeatable: false },
    PerkDef { id: PerkId::Gluttony, name: "Gluttony", rarity: Rarity::Common, effect: PerkEffect::ExpBonus(0.2), repeatable: false },
    PerkDef { id: PerkId::GoldenScales, name: "Golden Scales", rarity: Rarity::Common, effect: PerkEffect::GoldBonus(0.25), repeatable: false },
    PerkDef { id: PerkId::Midas, name: "Midas Bite", rarity: Rarity::Epic, effect: PerkEffect::GoldDouble, repeatable: false },
    PerkDef { id: PerkId::LongLasting, name: "Long Lasting", rarity: Rarity::Common, effect: PerkEffect::ItemDuration(3.0), repeatable: false },
    PerkDef { id: PerkId::MagnetSense, name: "Magnet Sense", rarity: Rarity::Rare, effect: PerkEffect::MagnetRange(3.0), repeatable: false },
    PerkDef { id: PerkId::Elusive, name: "Elusive", rarity: Rarity::Rare, effect: PerkEffect::BossDelay(30.0), repeatable: false },
    PerkDef { id: PerkId::FinPower, name: "Fin Power", rarity: Rarity::Common, effect: PerkEffect::SpeedBonus(0.1), repeatable: false },
    PerkDef { id: PerkId::QuickRecovery, name: "Quick Recovery", rarity: Rarity::Rare, effect: PerkEffect::DashCooldown(0.2), repeatable: false },
    PerkDef { id: PerkId::EvolutionSurge, name: "Evolution Surge", rarity: Rarity::Epic, effect: PerkEffect::FreeEvolve, repeatable: true },
    PerkDef { id: PerkId::HardShell, name: "Hard Shell", rarity: Rarity::Rare, effect: PerkEffect::ShellCharge(1), repeatable: true },
];

impl PerkId {
    pub fn def(&self) -> &'static PerkDef {
        PERKS
            .iter()
            .find(|p| p.id == *self)
            .unwrap_or(&PERKS[0])
    }
}

/// Perks owned in the current run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerkSet {
    owned: Vec<PerkId>,
}

impl PerkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: PerkId) -> bool {
        self.owned.contains(&id)
    }

    pub fn insert(&mut self, id: PerkId) {
        if !self.contains(id) {
            self.owned.push(id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = PerkId> + '_ {
        self.owned.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    fn effects(&self) -> impl Iterator<Item = PerkEffect> + '_ {
        self.owned.iter().map(|id| id.def().effect)
    }

    pub fn eat_range_bonus(&self) -> f32 {
        self.effects()
            .map(|e| if let PerkEffect::EatRange(v) = e { v } else { 0.0 })
            .sum()
    }

    pub fn exp_bonus(&self) -> f32 {
        self.effects()
            .map(|e| if let PerkEffect::ExpBonus(v) = e { v } else { 0.0 })
            .sum()
    }

    pub fn gold_bonus(&self) -> f32 {
        self.effects()
            .map(|e| if let PerkEffect::GoldBonus(v) = e { v } else { 0.0 })
            .sum()
    }

    pub fn doubles_gold(&self) -> bool {
        self.effects().any(|e| matches!(e, PerkEffect::GoldDouble))
    }

    pub fn item_duration_bonus(&self) -> f64 {
        self.effects()
            .map(|e| if let PerkEffect::ItemDuration(v) = e { v } else { 0.0 })
            .sum()
    }

    pub fn magnet_range(&self) -> f32 {
        self.effects()
            .map(|e| if let PerkEffect::MagnetRange(v) = e { v } else { 0.0 })
            .sum()
    }

    pub fn boss_delay(&self) -> f64 {
        self.effects()
            .map(|e| if let PerkEffect::BossDelay(v) = e { v } else { 0.0 })
            .sum()
    }

    pub fn speed_bonus(&self) -> f32 {
        self.effects()
            .map(|e| if let PerkEffect::SpeedBonus(v) = e { v } else { 0.0 })
            .sum()
    }

    /// Multiplier on the dash cooldown, never below 0.5
    pub fn dash_cooldown_factor(&self) -> f64 {
        let reduction: f64 = self
            .effects()
            .map(|e| if let PerkEffect::DashCooldown(v) = e { v } else { 0.0 })
            .sum();
        (1.0 - reduction).max(0.5)
    }
}

/// Draw up to `count` distinct perks weighted by rarity.
///
/// Perks already owned are skipped unless they are repeatable.
pub fn draw_offer<R: Rng + ?Sized>(owned: &PerkSet, count: usize, rng: &mut R) -> Vec<PerkId> {
    let mut pool: Vec<&PerkDef> = PERKS
        .iter()
        .filter(|p| p.repeatable || !owned.contains(p.id))
        .collect();

    let mut offer = Vec::with_capacity(count);
    while offer.len() < count && !pool.is_empty() {
        let Ok(pick) = pool.choose_weighted(&mut *rng, |p| p.rarity.weight()) else {
            break;
        };
        let id = pick.id;
        offer.push(id);
        pool.retain(|p| p.id != id);
    }
    offer
}
