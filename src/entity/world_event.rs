//! Timed world-wide modifiers

use glam::Vec3;
use serde::Serialize;

use crate::core::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WorldEventKind {
    /// Burst of extra prey around the player
    Frenzy,
    /// Uniform drift applied to every creature
    Current,
    /// Reduced visibility; purely presentational for the core
    Darkness,
}

impl WorldEventKind {
    pub const ALL: [WorldEventKind; 3] = [Self::Frenzy, Self::Current, Self::Darkness];
}

#[derive(Debug, Clone, Serialize)]
pub struct GameEvent {
    pub kind: WorldEventKind,
    pub ends_at: Timestamp,
    /// Drift velocity, only for `Current`
    pub drift: Option<Vec3>,
}

impl GameEvent {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.ends_at
    }

    /// Drift to add to every creature's velocity this frame
    pub fn current_drift(&self) -> Vec3 {
        match self.kind {
            WorldEventKind::Current => self.drift.unwrap_or(Vec3::ZERO),
            _ => Vec3::ZERO,
        }
    }
}
