//! Sea-floor height field
//!
//! A fixed sum of sinusoidal octaves. Cheap, deterministic, and smooth enough
//! that clamping creatures against it never produces visible popping.

use crate::core::config::WorldConfig;

// (frequency_x, frequency_z, phase_x, phase_z, weight)
const OCTAVES: [(f32, f32, f32, f32, f32); 3] = [
    (0.045, 0.050, 0.0, 0.0, 0.60),
    (0.130, 0.110, 1.7, 0.3, 0.30),
    (0.310, 0.290, 4.1, 2.2, 0.10),
];

#[derive(Debug, Clone, Copy)]
pub struct TerrainField {
    base: f32,
    amplitude: f32,
}

impl TerrainField {
    pub fn new(base: f32, amplitude: f32) -> Self {
        Self { base, amplitude }
    }

    pub fn from_config(world: &WorldConfig) -> Self {
        Self::new(world.terrain_base, world.terrain_amplitude)
    }

    /// Floor height at (x, z)
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let noise: f32 = OCTAVES
            .iter()
            .map(|&(fx, fz, px, pz, w)| w * (x * fx + px).sin() * (z * fz + pz).cos())
            .sum();
        self.base + self.amplitude * noise
    }

    /// Lowest y a body of the given radius may occupy at (x, z)
    pub fn floor_for(&self, x: f32, z: f32, radius: f32) -> f32 {
        self.height_at(x, z) + radius
    }
}

impl Default for TerrainField {
    fn default() -> Self {
        Self::from_config(&WorldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_is_deterministic() {
        let terrain = TerrainField::default();
        assert_eq!(terrain.height_at(12.5, -40.0), terrain.height_at(12.5, -40.0));
    }

    #[test]
    fn test_height_stays_within_amplitude() {
        let terrain = TerrainField::new(1.0, 4.0);
        for i in -50..50 {
            for j in -50..50 {
                let h = terrain.height_at(i as f32 * 3.7, j as f32 * 2.3);
                assert!(h <= 5.0 + 1e-4 && h >= -3.0 - 1e-4, "height {} out of range", h);
            }
        }
    }

    #[test]
    fn test_flat_when_amplitude_zero() {
        let terrain = TerrainField::new(2.0, 0.0);
        assert_eq!(terrain.height_at(33.0, -7.0), 2.0);
        assert_eq!(terrain.floor_for(33.0, -7.0, 1.5), 3.5);
    }

    #[test]
    fn test_terrain_varies_across_world() {
        let terrain = TerrainField::default();
        let a = terrain.height_at(0.0, 0.0);
        let b = terrain.height_at(35.0, 12.0);
        assert!((a - b).abs() > 1e-3);
    }
}
