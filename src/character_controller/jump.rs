//! Ledge jumps: a ballistic trajectory launched by the forward ledge probe.

use bevy::math::Vec3;

use crate::character_controller::movement::Pose;
use crate::config::JumpConfig;

/// A parabolic flight from `start` to `end` that lands exactly after `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpTrajectory {
    start: Vec3,
    end: Vec3,
    duration: f32,
    acceleration: Vec3,
    initial_velocity: Vec3,
    elapsed: f32,
}

impl JumpTrajectory {
    pub fn new(start: Vec3, end: Vec3, duration: f32, gravity: f32) -> Self {
        let acceleration = Vec3::new(0.0, -gravity, 0.0);
        // Solve end = start + v0 * T + a * T^2 / 2 for v0.
        let initial_velocity = (end - start - 0.5 * acceleration * duration * duration) / duration;
        Self {
            start,
            end,
            duration,
            acceleration,
            initial_velocity,
            elapsed: 0.0,
        }
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn position_at(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, self.duration);
        if t >= self.duration {
            return self.end;
        }
        self.start + self.initial_velocity * t + 0.5 * self.acceleration * t * t
    }

    /// Moves along the arc by `dt`. Returns the new position and whether the
    /// flight is over.
    pub fn advance(&mut self, dt: f32) -> (Vec3, bool) {
        self.elapsed += dt;
        // Absorb float drift from summing frame deltas.
        if self.elapsed + 1e-5 >= self.duration {
            self.elapsed = self.duration;
            return (self.end, true);
        }
        (self.position_at(self.elapsed), false)
    }
}

/// `true` when `surface` names something the player may jump from.
pub fn is_jump_surface(surface: &str, tags: &[String]) -> bool {
    let surface = surface.to_lowercase();
    tags.iter().any(|tag| surface.contains(&tag.to_lowercase()))
}

#[derive(Debug, Clone)]
pub struct JumpController {
    config: JumpConfig,
    trajectory: Option<JumpTrajectory>,
    start_marker: Vec3,
}

impl JumpController {
    pub fn new(config: JumpConfig) -> Self {
        Self {
            config,
            trajectory: None,
            start_marker: Vec3::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.trajectory.is_some()
    }

    pub fn trajectory(&self) -> Option<&JumpTrajectory> {
        self.trajectory.as_ref()
    }

    /// Where the player respawns after a non-fatal death.
    pub fn respawn_point(&self) -> Vec3 {
        self.start_marker
    }

    pub fn set_respawn_point(&mut self, point: Vec3) {
        self.start_marker = point;
    }

    /// Starts a jump if `surface` qualifies and no jump is in flight. The
    /// respawn marker is dropped just behind the take-off point.
    pub fn try_launch(&mut self, surface: &str, pose: &Pose) -> bool {
        if self.is_active() || !is_jump_surface(surface, &self.config.surface_tags) {
            return false;
        }
        self.start_marker = pose.local_point(Vec3::new(0.0, 0.0, self.config.respawn_backoff));
        let end = pose.local_point(Vec3::new(0.0, -self.config.drop, -self.config.distance));
        self.trajectory = Some(JumpTrajectory::new(
            pose.position,
            end,
            self.config.duration,
            self.config.gravity * self.config.gravity_mult,
        ));
        true
    }

    /// Advances the flight and moves the pose along it. Returns `true` on the
    /// tick the player lands, after which the trajectory is released.
    pub fn advance(&mut self, dt: f32, pose: &mut Pose) -> bool {
        let Some(trajectory) = self.trajectory.as_mut() else {
            return false;
        };
        let (position, landed) = trajectory.advance(dt);
        pose.position = position;
        if landed {
            self.trajectory = None;
        }
        landed
    }

    /// Ends a flight immediately at its landing point.
    pub fn finish(&mut self, pose: &mut Pose) {
        if let Some(trajectory) = self.trajectory.take() {
            pose.position = trajectory.end();
        }
    }
}
