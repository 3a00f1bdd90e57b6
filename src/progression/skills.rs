//! Active skills: learned with gold, triggered by the player, gated by cooldown

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{Tier, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillId {
    /// Absorbs any lethal hit while active
    ShellGuard,
    /// Startles every creature around the player
    Roar,
    /// Grants the magnet effect for a short time
    Vortex,
}

#[derive(Debug, Clone, Copy)]
pub struct SkillDef {
    pub id: SkillId,
    pub name: &'static str,
    pub cost: u64,
    pub cooldown: f64,
    pub duration: f64,
    pub min_tier: Tier,
}

pub static SKILLS: [SkillDef; 3] = [
    SkillDef { id: SkillId::ShellGuard, name: "Shell Guard", cost: 150, cooldown: 30.0, duration: 3.0, min_tier: 2 },
    SkillDef { id: SkillId::Roar, name: "Roar", cost: 200, cooldown: 20.0, duration: 0.0, min_tier: 3 },
    SkillDef { id: SkillId::Vortex, name: "Vortex", cost: 250, cooldown: 25.0, duration: 5.0, min_tier: 4 },
];

impl SkillId {
    pub fn def(&self) -> &'static SkillDef {
        match self {
            Self::ShellGuard => &SKILLS[0],
            Self::Roar => &SKILLS[1],
            Self::Vortex => &SKILLS[2],
        }
    }
}

/// Learned skills and the time each becomes usable again
#[derive(Debug, Clone, Default, Serialize)]
pub struct SkillBook {
    ready_at: BTreeMap<SkillId, Timestamp>,
}

impl SkillBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn knows(&self, id: SkillId) -> bool {
        self.ready_at.contains_key(&id)
    }

    /// Add a skill, usable immediately. False if already known.
    pub fn learn(&mut self, id: SkillId) -> bool {
        if self.knows(id) {
            return false;
        }
        self.ready_at.insert(id, 0.0);
        true
    }

    pub fn cooldown_end(&self, id: SkillId) -> Option<Timestamp> {
        self.ready_at.get(&id).copied()
    }

    pub fn is_ready(&self, id: SkillId, now: Timestamp) -> bool {
        self.cooldown_end(id).is_some_and(|t| now >= t)
    }

    /// Start the cooldown if the skill is known and ready
    pub fn trigger(&mut self, id: SkillId, now: Timestamp) -> bool {
        if !self.is_ready(id, now) {
            return false;
        }
        self.ready_at.insert(id, now + id.def().cooldown);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillId, Timestamp)> + '_ {
        self.ready_at.iter().map(|(id, t)| (*id, *t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defs_match_ids() {
        for def in SKILLS.iter() {
            assert_eq!(def.id.def().id, def.id);
        }
    }

    #[test]
    fn test_unknown_skill_never_ready() {
        let book = SkillBook::new();
        assert!(!book.is_ready(SkillId::Roar, 1000.0));
    }

    #[test]
    fn test_learn_once() {
        let mut book = SkillBook::new();
        assert!(book.learn(SkillId::Roar));
        assert!(!book.learn(SkillId::Roar));
    }

    #[test]
    fn test_trigger_respects_cooldown() {
        let mut book = SkillBook::new();
        book.learn(SkillId::Roar);
        assert!(book.trigger(SkillId::Roar, 5.0));
        assert!(!book.trigger(SkillId::Roar, 10.0));
        assert_eq!(book.cooldown_end(SkillId::Roar), Some(25.0));
        assert!(book.trigger(SkillId::Roar, 25.0));
    }
}
