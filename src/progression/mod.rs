//! Static progression tables: upgrades, perks, skills and quests

pub mod perks;
pub mod quests;
pub mod skills;
pub mod upgrades;

pub use perks::{PerkEffect, PerkId, PerkSet, Rarity};
pub use quests::{QuestBook, QuestSignal};
pub use skills::{SkillBook, SkillId};
pub use upgrades::{UpgradeLevels, UpgradeTrack};
