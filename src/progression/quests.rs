//! Quest pool and per-run quest progress
//!
//! Quests are drawn from a static pool filtered by the player's growth phase.
//! Gameplay feeds `QuestSignal`s in; completed quests wait to be claimed.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::core::types::{GrowthPhase, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestGoal {
    EatAny,
    EatTierAtLeast(Tier),
    CollectItems,
    /// Reach a combo of at least `target`
    ReachCombo,
    EarnGold,
    SurviveBoss,
    Evolve,
}

#[derive(Debug, Clone, Copy)]
pub struct QuestDef {
    pub id: &'static str,
    pub phase: GrowthPhase,
    pub goal: QuestGoal,
    pub target: u64,
    pub reward: u64,
}

pub static QUEST_POOL: [QuestDef; 15] = [
    // Early
    QuestDef { id: "first_bites", phase: GrowthPhase::Early, goal: QuestGoal::EatAny, target: 10, reward: 20 },
    QuestDef { id: "plankton_sweep", phase: GrowthPhase::Early, goal: QuestGoal::EatTierAtLeast(0), target: 25, reward: 35 },
    QuestDef { id: "collector", phase: GrowthPhase::Early, goal: QuestGoal::CollectItems, target: 2, reward: 20 },
    QuestDef { id: "combo_starter", phase: GrowthPhase::Early, goal: QuestGoal::ReachCombo, target: 3, reward: 25 },
    QuestDef { id: "growth_spurt", phase: GrowthPhase::Early, goal: QuestGoal::Evolve, target: 1, reward: 30 },
    // Mid
    QuestDef { id: "predator", phase: GrowthPhase::Mid, goal: QuestGoal::EatAny, target: 30, reward: 60 },
    QuestDef { id: "big_game", phase: GrowthPhase::Mid, goal: QuestGoal::EatTierAtLeast(3), target: 5, reward: 70 },
    QuestDef { id: "treasure", phase: GrowthPhase::Mid, goal: QuestGoal::EarnGold, target: 150, reward: 50 },
    QuestDef { id: "combo_chain", phase: GrowthPhase::Mid, goal: QuestGoal::ReachCombo, target: 5, reward: 60 },
    QuestDef { id: "boss_survivor", phase: GrowthPhase::Mid, goal: QuestGoal::SurviveBoss, target: 1, reward: 80 },
    // Late
    QuestDef { id: "apex", phase: GrowthPhase::Late, goal: QuestGoal::EatAny, target: 80, reward: 150 },
    QuestDef { id: "gourmet", phase: GrowthPhase::Late, goal: QuestGoal::EatTierAtLeast(5), target: 10, reward: 180 },
    QuestDef { id: "hoard", phase: GrowthPhase::Late, goal: QuestGoal::EarnGold, target: 600, reward: 120 },
    QuestDef { id: "combo_frenzy", phase: GrowthPhase::Late, goal: QuestGoal::ReachCombo, target: 10, reward: 150 },
    QuestDef { id: "titan_dodger", phase: GrowthPhase::Late, goal: QuestGoal::SurviveBoss, target: 2, reward: 200 },
];

pub fn quest_def(id: &str) -> Option<&'static QuestDef> {
    QUEST_POOL.iter().find(|q| q.id == id)
}

/// Gameplay facts that can advance quests
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuestSignal {
    Ate { tier: Tier },
    Collected,
    Combo(u32),
    GoldEarned(u64),
    BossSurvived,
    Evolved,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestProgress {
    pub id: &'static str,
    pub progress: u64,
    pub target: u64,
    pub completed: bool,
    pub claimed: bool,
}

impl QuestProgress {
    fn new(def: &QuestDef) -> Self {
        Self {
            id: def.id,
            progress: 0,
            target: def.target,
            completed: false,
            claimed: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestBook {
    phase: Option<GrowthPhase>,
    active: Vec<QuestProgress>,
}

impl QuestBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Option<GrowthPhase> {
        self.phase
    }

    pub fn active(&self) -> &[QuestProgress] {
        &self.active
    }

    /// Draw a fresh set of quests when the phase changes.
    ///
    /// Completed quests whose reward has not been claimed stay in the book
    /// ahead of the new draw. Returns true if the active set was replaced.
    pub fn refresh<R: Rng + ?Sized>(&mut self, phase: GrowthPhase, count: usize, rng: &mut R) -> bool {
        if self.phase == Some(phase) {
            return false;
        }
        self.active.retain(|q| q.completed && !q.claimed);
        let candidates: Vec<&QuestDef> = QUEST_POOL.iter().filter(|q| q.phase == phase).collect();
        self.active
            .extend(candidates.choose_multiple(rng, count).map(|def| QuestProgress::new(def)));
        self.phase = Some(phase);
        true
    }

    /// Apply a signal; returns ids of quests completed by it
    pub fn record(&mut self, signal: QuestSignal) -> Vec<&'static str> {
        let mut completed = Vec::new();
        for quest in self.active.iter_mut().filter(|q| !q.completed) {
            let Some(def) = quest_def(quest.id) else {
                continue;
            };
            match (def.goal, signal) {
                (QuestGoal::EatAny, QuestSignal::Ate { .. }) => quest.progress += 1,
                (QuestGoal::EatTierAtLeast(min), QuestSignal::Ate { tier }) if tier >= min => {
                    quest.progress += 1
                }
                (QuestGoal::CollectItems, QuestSignal::Collected) => quest.progress += 1,
                (QuestGoal::ReachCombo, QuestSignal::Combo(combo)) => {
                    quest.progress = quest.progress.max(combo as u64)
                }
                (QuestGoal::EarnGold, QuestSignal::GoldEarned(gold)) => quest.progress += gold,
                (QuestGoal::SurviveBoss, QuestSignal::BossSurvived) => quest.progress += 1,
                (QuestGoal::Evolve, QuestSignal::Evolved) => quest.progress += 1,
                _ => continue,
            }
            if quest.progress >= quest.target {
                quest.progress = quest.target;
                quest.completed = true;
                completed.push(quest.id);
            }
        }
        completed
    }

    /// Mark a completed quest claimed and return its reward
    pub fn claim(&mut self, id: &str) -> Option<u64> {
        let quest = self.active.iter_mut().find(|q| q.id == id)?;
        if !quest.completed || quest.claimed {
            return None;
        }
        quest.claimed = true;
        quest_def(id).map(|def| def.reward)
    }
}
