//! Pickup items and the timed effects they grant

use glam::Vec3;
use serde::Serialize;

use crate::core::config::ItemConfig;
use crate::core::types::{ItemId, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemKind {
    SpeedBoost,
    Magnet,
    Shield,
    DoubleExp,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [Self::SpeedBoost, Self::Magnet, Self::Shield, Self::DoubleExp];

    fn index(&self) -> usize {
        match self {
            Self::SpeedBoost => 0,
            Self::Magnet => 1,
            Self::Shield => 2,
            Self::DoubleExp => 3,
        }
    }

    /// Base effect duration before perk bonuses
    pub fn duration(&self, config: &ItemConfig) -> f64 {
        match self {
            Self::SpeedBoost => config.speed_duration,
            Self::Magnet => config.magnet_duration,
            Self::Shield => config.shield_duration,
            Self::DoubleExp => config.double_exp_duration,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub position: Vec3,
}

/// At most one running effect per item kind, keyed by absolute expiry
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActiveEffects {
    expiry: [Option<Timestamp>; 4],
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the effect of `kind`. Never stacks.
    pub fn install(&mut self, kind: ItemKind, expires_at: Timestamp) {
        self.expiry[kind.index()] = Some(expires_at);
    }

    pub fn expiry(&self, kind: ItemKind) -> Option<Timestamp> {
        self.expiry[kind.index()]
    }

    pub fn is_active(&self, kind: ItemKind, now: Timestamp) -> bool {
        self.expiry(kind).is_some_and(|t| t > now)
    }

    /// Drop every effect that has expired; returns the kinds removed
    pub fn clean_expired(&mut self, now: Timestamp) -> Vec<ItemKind> {
        let mut expired = Vec::new();
        for kind in ItemKind::ALL {
            if let Some(t) = self.expiry[kind.index()] {
                if t <= now {
                    self.expiry[kind.index()] = None;
                    expired.push(kind);
                }
            }
        }
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemKind, Timestamp)> + '_ {
        ItemKind::ALL
            .into_iter()
            .filter_map(|kind| self.expiry(kind).map(|t| (kind, t)))
    }

    pub fn len(&self) -> usize {
        self.expiry.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_replaces_not_stacks() {
        let mut effects = ActiveEffects::new();
        effects.install(ItemKind::Shield, 10.0);
        effects.install(ItemKind::Shield, 13.0);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.expiry(ItemKind::Shield), Some(13.0));
    }

    #[test]
    fn test_active_until_expiry() {
        let mut effects = ActiveEffects::new();
        effects.install(ItemKind::Magnet, 5.0);
        assert!(effects.is_active(ItemKind::Magnet, 4.99));
        assert!(!effects.is_active(ItemKind::Magnet, 5.0));
        assert!(!effects.is_active(ItemKind::SpeedBoost, 0.0));
    }

    #[test]
    fn test_clean_expired_only_drops_past() {
        let mut effects = ActiveEffects::new();
        effects.install(ItemKind::SpeedBoost, 3.0);
        effects.install(ItemKind::DoubleExp, 9.0);
        let expired = effects.clean_expired(5.0);
        assert_eq!(expired, vec![ItemKind::SpeedBoost]);
        assert_eq!(effects.iter().collect::<Vec<_>>(), vec![(ItemKind::DoubleExp, 9.0)]);
    }

    #[test]
    fn test_durations_come_from_config() {
        let config = ItemConfig::default();
        assert_eq!(ItemKind::Shield.duration(&config), 6.0);
        assert_eq!(ItemKind::DoubleExp.duration(&config), 12.0);
    }
}
