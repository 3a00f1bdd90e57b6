//! Player movement and the trailing camera rig

use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::Serialize;

use crate::core::types::Timestamp;
use crate::entity::ItemKind;
use crate::simulation::input::InputState;
use crate::store::EntityStore;

/// Horizontal speed below which the facing stops turning
const MIN_TURN_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraRig {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 4.0, 10.0),
            look_at: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Default)]
pub struct PlayerController {
    camera: CameraRig,
}

impl PlayerController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera(&self) -> CameraRig {
        self.camera
    }

    /// Speed multiplier from dash or the speed item. Dash wins; they never stack.
    pub fn speed_multiplier(store: &EntityStore, now: Timestamp) -> f32 {
        let cfg = &store.config().player;
        if store.player().dashing {
            cfg.dash_multiplier
        } else if store.is_effect_active(ItemKind::SpeedBoost, now) {
            cfg.speed_item_multiplier
        } else {
            1.0
        }
    }

    pub fn update(&mut self, store: &mut EntityStore, input: &InputState, dt: f32, now: Timestamp) {
        let config = Arc::clone(store.config());
        let size = store.player_size();
        let speed = store.player_speed() * Self::speed_multiplier(store, now);
        let drift = store.current_drift();
        let terrain = *store.terrain();

        // Camera-space move vector
        let yaw = Quat::from_rotation_y(input.yaw);
        let intent = input.move_intent();
        let forward = yaw * Vec3::NEG_Z;
        let right = yaw * Vec3::X;
        let wish = (right * intent.x + Vec3::Y * intent.y + forward * intent.z).normalize_or_zero();

        let player = store.player_mut();
        let smoothing = 1.0 - (-config.player.acceleration * dt).exp();
        player.velocity = player.velocity.lerp(wish * speed, smoothing);
        player.position += (player.velocity + drift) * dt;

        let extent = config.world.half_extent;
        player.position.x = player.position.x.clamp(-extent, extent);
        player.position.z = player.position.z.clamp(-extent, extent);
        let floor = terrain.floor_for(player.position.x, player.position.z, size);
        let ceiling = (config.world.ceiling - size).max(floor);
        player.position.y = player.position.y.clamp(floor, ceiling);

        let flat = Vec3::new(player.velocity.x, 0.0, player.velocity.z);
        if flat.length() > MIN_TURN_SPEED {
            let target = (-flat.x).atan2(-flat.z);
            let turn = 1.0 - (-config.player.turn_rate * dt).exp();
            player.facing_yaw = lerp_angle(player.facing_yaw, target, turn);
        }

        let offset = Vec3::from_array(config.player.camera_offset)
            * input.zoom
            * (1.0 + config.player.camera_size_scale * size);
        let orbit = yaw * Quat::from_rotation_x(-input.pitch * 0.5);
        self.camera = CameraRig {
            position: player.position + orbit * offset,
            look_at: player.position,
        };
    }
}

/// Interpolate between two angles along the shorter arc
fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let diff = (to - from + PI).rem_euclid(TAU) - PI;
    from + diff * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::entity::{GameEvent, WorldEventKind};
    use crate::simulation::input::InputEvent;

    fn store() -> EntityStore {
        EntityStore::new(Arc::new(GameConfig::default()))
    }

    fn hold(input: &mut InputState, code: &str) {
        input.apply(&InputEvent::KeyDown(code.to_string()), 0.0);
    }

    #[test]
    fn test_forward_moves_along_negative_z() {
        let mut store = store();
        let mut input = InputState::new();
        let mut controller = PlayerController::new();
        hold(&mut input, "KeyW");
        for _ in 0..30 {
            controller.update(&mut store, &input, 1.0 / 60.0, 0.0);
        }
        let pos = store.player().position;
        assert!(pos.z < -1.0);
        assert!(pos.x.abs() < 1e-3);
    }

    #[test]
    fn test_velocity_is_smoothed() {
        let mut store = store();
        let mut input = InputState::new();
        let mut controller = PlayerController::new();
        hold(&mut input, "KeyD");
        controller.update(&mut store, &input, 1.0 / 60.0, 0.0);
        let speed = store.player().velocity.length();
        assert!(speed > 0.0);
        assert!(speed < store.player_speed() * 0.5);
    }

    #[test]
    fn test_dash_multiplier_only_while_dashing() {
        let mut store = store();
        store.player_mut().dashing = true;
        assert_eq!(PlayerController::speed_multiplier(&store, 0.0), 2.5);
        store.player_mut().dashing = false;
        assert_eq!(PlayerController::speed_multiplier(&store, 0.0), 1.0);
    }

    #[test]
    fn test_position_clamped_to_world() {
        let mut store = store();
        store.player_mut().position = Vec3::new(99.9, 39.0, 0.0);
        let mut input = InputState::new();
        let mut controller = PlayerController::new();
        hold(&mut input, "KeyD");
        hold(&mut input, "Space");
        for _ in 0..200 {
            controller.update(&mut store, &input, 0.05, 0.0);
        }
        let pos = store.player().position;
        assert!(pos.x <= 100.0);
        assert!(pos.y <= 40.0 - store.player_size() + 1e-4);
    }

    #[test]
    fn test_camera_pulls_back_for_bigger_creatures() {
        let mut store = store();
        let input = InputState::new();
        let mut controller = PlayerController::new();
        controller.update(&mut store, &input, 0.016, 0.0);
        let small = controller.camera().position.distance(store.player().position);

        store.player_mut().tier = 7;
        controller.update(&mut store, &input, 0.016, 0.0);
        let big = controller.camera().position.distance(store.player().position);
        assert!(big > small);
    }

    #[test]
    fn test_facing_turns_toward_heading() {
        let mut store = store();
        let mut input = InputState::new();
        let mut controller = PlayerController::new();
        hold(&mut input, "KeyD");
        for _ in 0..120 {
            controller.update(&mut store, &input, 1.0 / 60.0, 0.0);
        }
        // Moving +x: yaw of a +x heading is -pi/2
        assert!((store.player().facing_yaw + std::f32::consts::FRAC_PI_2).abs() < 0.05);
    }

    #[test]
    fn test_lerp_angle_takes_short_way() {
        let from = 3.0;
        let to = -3.0;
        let mid = lerp_angle(from, to, 0.5);
        assert!(mid > 3.0);
    }

    #[test]
    fn test_current_drift_carries_idle_player() {
        let mut store = store();
        store.player_mut().position = Vec3::new(0.0, 20.0, 0.0);
        store.start_event(
            GameEvent {
                kind: WorldEventKind::Current,
                ends_at: 100.0,
                drift: Some(Vec3::new(3.0, 0.0, 0.0)),
            },
            200.0,
        );
        let input = InputState::new();
        let mut controller = PlayerController::new();
        for _ in 0..10 {
            controller.update(&mut store, &input, 0.05, 0.0);
        }
        let player = store.player();
        assert!((player.position.x - 1.5).abs() < 1e-4);
        assert_eq!(player.position.z, 0.0);
        // Drift moves the body without counting as swimming
        assert_eq!(player.velocity, Vec3::ZERO);
    }
}
