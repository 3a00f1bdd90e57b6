//! The chase boss

use glam::Vec3;
use serde::Serialize;

use crate::core::types::Timestamp;

#[derive(Debug, Clone, Serialize)]
pub struct Boss {
    pub position: Vec3,
    /// Unit chase heading, re-aimed at the player every frame
    pub heading: Vec3,
    pub spawned_at: Timestamp,
    pub scale: f32,
}

impl Boss {
    pub fn new(position: Vec3, heading: Vec3, spawned_at: Timestamp, scale: f32) -> Self {
        Self {
            position,
            heading: heading.try_normalize().unwrap_or(Vec3::NEG_Z),
            spawned_at,
            scale,
        }
    }

    pub fn age(&self, now: Timestamp) -> f64 {
        now - self.spawned_at
    }
}
