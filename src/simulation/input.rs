//! Raw input events and the folded input state the player controller reads
//!
//! Key codes follow browser `KeyboardEvent.code` names so a web front end can
//! forward events untouched. Touch input splits the viewport: the left half
//! drives a virtual joystick, the right half drags the camera, and two
//! fingers on the right half pinch-zoom.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::types::Timestamp;

pub const PITCH_MIN: f32 = -1.4;
pub const PITCH_MAX: f32 = 2.2;
pub const ZOOM_MIN: f32 = 0.5;
pub const ZOOM_MAX: f32 = 2.5;

/// Radians of camera turn per pixel dragged
const LOOK_SENSITIVITY: f32 = 0.005;
/// Zoom change per unit of wheel delta
const WHEEL_ZOOM_RATE: f32 = 0.001;
/// Joystick deflection (pixels) that counts as full tilt
const JOYSTICK_RADIUS: f32 = 60.0;
/// Two taps closer than this on the joystick side request a dash
const DOUBLE_TAP_WINDOW: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    MouseDown { x: f32, y: f32 },
    MouseMove { x: f32, y: f32 },
    MouseUp,
    Wheel { delta: f32 },
    TouchStart { id: u64, x: f32, y: f32 },
    TouchMove { id: u64, x: f32, y: f32 },
    TouchEnd { id: u64, x: f32, y: f32 },
    Resize { width: f32, height: f32 },
}

/// Digital direction keys currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeldKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy)]
struct Joystick {
    touch_id: u64,
    origin: Vec2,
    current: Vec2,
}

#[derive(Debug, Clone)]
pub struct InputState {
    pub held: HeldKeys,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    viewport: Vec2,
    joystick: Option<Joystick>,
    mouse_drag: Option<Vec2>,
    /// Ordered by touch id so the pinch pair is stable
    look_touches: BTreeMap<u64, Vec2>,
    pinch_distance: Option<f32>,
    last_joystick_tap: Option<Timestamp>,
    dash_requested: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            held: HeldKeys::default(),
            yaw: 0.0,
            pitch: 0.0,
            zoom: 1.0,
            viewport: Vec2::new(1280.0, 720.0),
            joystick: None,
            mouse_drag: None,
            look_touches: BTreeMap::new(),
            pinch_distance: None,
            last_joystick_tap: None,
            dash_requested: false,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw event into the state
    pub fn apply(&mut self, event: &InputEvent, now: Timestamp) {
        match event {
            InputEvent::KeyDown(code) => self.set_key(code, true),
            InputEvent::KeyUp(code) => self.set_key(code, false),
            InputEvent::MouseDown { x, y } => self.mouse_drag = Some(Vec2::new(*x, *y)),
            InputEvent::MouseMove { x, y } => {
                let pos = Vec2::new(*x, *y);
                if let Some(last) = self.mouse_drag {
                    self.look(pos - last);
                    self.mouse_drag = Some(pos);
                }
            }
            InputEvent::MouseUp => self.mouse_drag = None,
            InputEvent::Wheel { delta } => self.set_zoom(self.zoom + delta * WHEEL_ZOOM_RATE),
            InputEvent::TouchStart { id, x, y } => self.touch_start(*id, Vec2::new(*x, *y), now),
            InputEvent::TouchMove { id, x, y } => self.touch_move(*id, Vec2::new(*x, *y)),
            InputEvent::TouchEnd { id, .. } => self.touch_end(*id),
            InputEvent::Resize { width, height } => {
                self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
            }
        }
    }

    fn set_key(&mut self, code: &str, down: bool) {
        match code {
            "KeyW" | "ArrowUp" => self.held.forward = down,
            "KeyS" | "ArrowDown" => self.held.back = down,
            "KeyA" | "ArrowLeft" => self.held.left = down,
            "KeyD" | "ArrowRight" => self.held.right = down,
            "Space" => self.held.up = down,
            "KeyC" | "ControlLeft" | "ControlRight" => self.held.down = down,
            "ShiftLeft" | "ShiftRight" => {
                if down {
                    self.dash_requested = true;
                }
            }
            _ => {}
        }
    }

    fn look(&mut self, delta: Vec2) {
        self.yaw -= delta.x * LOOK_SENSITIVITY;
        self.pitch = (self.pitch + delta.y * LOOK_SENSITIVITY).clamp(PITCH_MIN, PITCH_MAX);
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    fn touch_start(&mut self, id: u64, pos: Vec2, now: Timestamp) {
        if pos.x < self.viewport.x * 0.5 && self.joystick.is_none() {
            if self.last_joystick_tap.is_some_and(|t| now - t < DOUBLE_TAP_WINDOW) {
                self.dash_requested = true;
            }
            self.last_joystick_tap = Some(now);
            self.joystick = Some(Joystick { touch_id: id, origin: pos, current: pos });
            return;
        }
        self.look_touches.insert(id, pos);
        self.pinch_distance = self.two_finger_distance();
    }

    fn touch_move(&mut self, id: u64, pos: Vec2) {
        if let Some(stick) = self.joystick.as_mut().filter(|s| s.touch_id == id) {
            stick.current = pos;
            return;
        }
        let Some(last) = self.look_touches.get(&id).copied() else {
            return;
        };
        self.look_touches.insert(id, pos);

        if self.look_touches.len() >= 2 {
            let distance = self.two_finger_distance();
            if let (Some(before), Some(after)) = (self.pinch_distance, distance) {
                if before > f32::EPSILON {
                    // Fingers apart = zoom in = camera closer
                    self.set_zoom(self.zoom * before / after.max(f32::EPSILON));
                }
            }
            self.pinch_distance = distance;
        } else {
            self.look(pos - last);
        }
    }

    fn touch_end(&mut self, id: u64) {
        if self.joystick.is_some_and(|s| s.touch_id == id) {
            self.joystick = None;
            return;
        }
        self.look_touches.remove(&id);
        self.pinch_distance = self.two_finger_distance();
    }

    /// Distance between the two lowest-id look touches
    fn two_finger_distance(&self) -> Option<f32> {
        let mut points = self.look_touches.values();
        let a = points.next()?;
        let b = points.next()?;
        Some(a.distance(*b))
    }

    /// Joystick deflection in [-1, 1] per axis, y up = forward
    pub fn joystick_axis(&self) -> Vec2 {
        let Some(stick) = self.joystick else {
            return Vec2::ZERO;
        };
        let delta = (stick.current - stick.origin) / JOYSTICK_RADIUS;
        Vec2::new(delta.x, -delta.y).clamp_length_max(1.0)
    }

    /// Local move intent: x = strafe right, y = rise, z = forward
    pub fn move_intent(&self) -> Vec3 {
        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32;
        let stick = self.joystick_axis();
        Vec3::new(
            axis(self.held.right, self.held.left) + stick.x,
            axis(self.held.up, self.held.down),
            axis(self.held.forward, self.held.back) + stick.y,
        )
    }

    /// Consume a pending dash request
    pub fn take_dash_request(&mut self) -> bool {
        std::mem::take(&mut self.dash_requested)
    }

    /// Drop held keys and touches, keep camera angles and zoom
    pub fn release_all(&mut self) {
        self.held = HeldKeys::default();
        self.joystick = None;
        self.mouse_drag = None;
        self.look_touches.clear();
        self.pinch_distance = None;
        self.dash_requested = false;
    }
}
