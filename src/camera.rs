use bevy::prelude::*;

use crate::character_controller::movement::{Pose, heading_of};
use crate::config::CameraConfig;
use crate::game_states::{AppState, InGameEntity};
use crate::player::PlayerSystems;
use crate::player::controller::PlayerController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Third-person camera placement around the player.
///
/// In Normal mode the camera trails the player inside a distance and height
/// band; in Fight mode it sits at a fixed spot straight behind. Either way it
/// aims at a floater above the player origin so the framing does not tilt down
/// at the feet.
#[derive(Debug, Clone)]
pub struct CameraRig {
    config: CameraConfig,
    position: Vec3,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            position: Vec3::ZERO,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Puts the camera at the starting distance and resting height behind the player.
    pub fn reset_behind(&mut self, pose: &Pose) {
        let distance = self.config.initial_distance();
        let height = self.config.height_avg();
        self.place_behind(pose, distance, height);
    }

    pub fn look_at(&self, pose: &Pose) -> Vec3 {
        pose.position + Vec3::Y * self.config.floater_height
    }

    pub fn planar_distance(&self, pose: &Pose) -> f32 {
        let mut to_player = pose.position - self.position;
        to_player.y = 0.0;
        to_player.length()
    }

    pub fn height_offset(&self, pose: &Pose) -> f32 {
        self.position.y - pose.position.y
    }

    /// Heading the camera looks along, in the same convention as [`Pose::heading`].
    pub fn heading(&self, pose: &Pose) -> f32 {
        let to_player = pose.position - self.position;
        if to_player.x.abs() < f32::EPSILON && to_player.z.abs() < f32::EPSILON {
            return pose.heading;
        }
        heading_of(to_player)
    }

    pub fn raise(&mut self, amount: f32) {
        self.position.y += amount;
    }

    pub fn transform(&self, pose: &Pose) -> Transform {
        Transform::from_translation(self.position).looking_at(self.look_at(pose), Vec3::Y)
    }

    /// Normal-mode follow: clamp the planar distance and the height offset,
    /// and, when `drift` is set, ease the height back toward its resting value.
    pub fn update_normal(&mut self, pose: &Pose, drift: bool, dt: f32) {
        let (direction, mut distance) = self.planar_to_player(pose);
        let (min, max) = (self.config.min_distance, self.config.max_distance);
        if distance > max {
            self.position += direction * (distance - max);
            distance = max;
        }
        if distance < min {
            self.position -= direction * (min - distance);
        }

        let mut offset = self.height_offset(pose);
        if offset < self.config.min_height {
            offset = self.config.min_height;
        } else if offset > self.config.max_height {
            offset = self.config.max_height;
        }

        let avg = self.config.height_avg();
        if drift && offset != avg {
            let step = self.config.drift_rate * dt;
            offset = if offset > avg {
                (offset - step).max(avg)
            } else {
                (offset + step).min(avg)
            };
        }
        self.position.y = pose.position.y + offset;
    }

    /// Fight-mode framing: directly behind the player, no smoothing.
    pub fn update_fight(&mut self, pose: &Pose) {
        let (distance, height) = (self.config.fight_distance, self.config.fight_height);
        self.place_behind(pose, distance, height);
    }

    /// Nudges the planar distance by one zoom step, never closer than the
    /// zoom margin to either bound. Height is kept.
    pub fn zoom(&mut self, direction: ZoomDirection, pose: &Pose) {
        let (to_player, distance) = self.planar_to_player(pose);
        let step = self.config.zoom_step;
        let near = self.config.min_distance + self.config.zoom_margin;
        let far = self.config.max_distance - self.config.zoom_margin;
        let target = match direction {
            ZoomDirection::In if distance > near => (distance - step).max(near),
            ZoomDirection::Out if distance < far => (distance + step).min(far),
            _ => return,
        };
        let y = self.position.y;
        self.position = pose.position - to_player * target;
        self.position.y = y;
    }

    /// Re-places the camera straight behind the player's heading, keeping the
    /// current planar distance and height offset.
    pub fn center(&mut self, pose: &Pose) {
        let distance = self.planar_distance(pose);
        let height = self.height_offset(pose);
        self.place_behind(pose, distance, height);
    }

    fn place_behind(&mut self, pose: &Pose, distance: f32, height: f32) {
        self.position = pose.local_point(Vec3::new(0.0, height, distance));
    }

    /// Unit planar vector from camera to player and the planar distance. When
    /// the camera is directly above the player the player's forward stands in.
    fn planar_to_player(&self, pose: &Pose) -> (Vec3, f32) {
        let mut to_player = pose.position - self.position;
        to_player.y = 0.0;
        let distance = to_player.length();
        if distance > f32::EPSILON {
            (to_player / distance, distance)
        } else {
            (pose.forward(), 0.0)
        }
    }
}

/// Marker for the camera entity driven by the player's [`CameraRig`].
#[derive(Component)]
pub struct ThirdPersonCamera;

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        DistanceFog {
            color: Color::srgb_u8(43, 44, 100),
            falloff: FogFalloff::Exponential { density: 15e-3 },
            ..default()
        },
        Transform::from_xyz(0.0, 2.25, 2.6).looking_at(Vec3::new(0.0, 1.5, 0.0), Vec3::Y),
        ThirdPersonCamera,
        InGameEntity,
    ));
}

/// Copies the rig's placement onto the camera entity.
pub fn apply_camera_rig(
    player_query: Query<&PlayerController>,
    mut camera_query: Query<&mut Transform, With<ThirdPersonCamera>>,
) {
    let (Ok(controller), Ok(mut camera_transform)) = (player_query.get_single(), camera_query.get_single_mut()) else {
        return;
    };
    *camera_transform = controller.camera().transform(controller.pose());
}

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), spawn_camera)
            .add_systems(Update, apply_camera_rig.in_set(PlayerSystems::Apply));
    }
}
