//! Per-tick locomotion steps for Normal and Fight movement.
//!
//! Headings are in degrees around +Y; a heading of zero faces -Z, positive
//! headings turn left. The character's local frame is +X right, +Y up,
//! -Z forward.

use bevy::math::{Quat, Vec2, Vec3};

use crate::character_controller::input::InputSignals;
use crate::config::MovementConfig;
use crate::player::state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub heading: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}

impl Pose {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self { position, heading }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.heading.to_radians())
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// World position of a point given in the character's local frame.
    pub fn local_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation() * local
    }

    pub fn translate_local(&mut self, local: Vec3) {
        self.position += self.rotation() * local;
    }

    /// Turns the character so its forward axis points at `target` on the
    /// ground plane. A target straight above or below leaves the heading alone.
    pub fn face_toward(&mut self, target: Vec3) {
        let to_target = target - self.position;
        if to_target.x.abs() < f32::EPSILON && to_target.z.abs() < f32::EPSILON {
            return;
        }
        self.heading = heading_of(to_target);
    }
}

/// Heading (degrees) whose forward axis points along `direction` projected on XZ.
pub fn heading_of(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z).to_degrees()
}

/// Wraps a heading that left [-360, 360] back to the opposite bound.
pub fn wrap_heading(heading: f32) -> f32 {
    if heading < -360.0 {
        360.0
    } else if heading > 360.0 {
        -360.0
    } else {
        heading
    }
}

/// Gamepad steering: the stick direction relative to the camera heading
/// becomes the character heading, then the character runs forward.
pub fn steer_gamepad(pose: &mut Pose, input: InputSignals, camera_heading: f32, speed: f32, dt: f32, config: &MovementConfig) {
    let relative = input.horizontal.atan2(-input.vertical).to_degrees();
    pose.heading = camera_heading + relative;
    pose.translate_local(Vec3::new(0.0, 0.0, -config.move_speed * speed * dt));
}

/// Mouse steering: pointer x turns the character. Returns how far the camera
/// should rise from the pointer y offset.
pub fn steer_pointer(pose: &mut Pose, pointer: Vec2, sensitivity: f32, dt: f32, config: &MovementConfig) -> f32 {
    let heading = pose.heading - pointer.x * config.mouse_speed_x * sensitivity * dt;
    pose.heading = wrap_heading(heading);
    pointer.y * config.mouse_speed_y * sensitivity * dt
}

/// Keyboard translation along the character's local axes at a fixed speed.
pub fn strafe_keyboard(pose: &mut Pose, input: InputSignals, dt: f32, config: &MovementConfig) {
    let step = config.move_speed * dt;
    pose.translate_local(Vec3::new(-input.horizontal * step, 0.0, input.vertical * step));
}

/// One Fight-mode step. Exactly one direction wins per tick, horizontal first.
/// Returns the state the step asks for.
pub fn fight_step(pose: &mut Pose, input: InputSignals, speed: f32, dt: f32, config: &MovementConfig) -> PlayerState {
    let step = config.move_speed * speed * dt;
    if input.horizontal > 0.0 {
        pose.translate_local(Vec3::new(-step, 0.0, 0.0));
        PlayerState::FightLeft
    } else if input.horizontal < 0.0 {
        pose.translate_local(Vec3::new(step, 0.0, 0.0));
        PlayerState::FightRight
    } else if input.vertical < 0.0 {
        pose.translate_local(Vec3::new(0.0, 0.0, -step));
        PlayerState::Run
    } else if input.vertical > 0.0 {
        pose.translate_local(Vec3::new(0.0, 0.0, step));
        PlayerState::RunReverse
    } else {
        PlayerState::Idle
    }
}
