//! Collision probes around the player.
//!
//! The player is a kinematic body, so nothing pushes it around; instead three
//! spatial queries run every frame and their results are handed to the
//! [`PlayerController`]:
//!
//! - a floor ray straight down, feeding floor snapping,
//! - a ledge ray just ahead of the feet, whose "contact out" launches jumps,
//! - an attack sphere in front of the chest, listing what a swing would reach.

use avian3d::PhysicsPlugins;
use avian3d::prelude::*;
use bevy::prelude::*;

use crate::constants::*;
use crate::player::{Player, PlayerSystems};
use crate::player::controller::PlayerController;

const ATTACK_PROBE_RADIUS: f32 = 0.5;

#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Default,
    /// Walkable level geometry: floors and plates.
    World,
    Player,
    /// Enemy bodies and their hit fields.
    Enemy,
}

/// Probe results carried between frames.
#[derive(Component, Debug, Default)]
pub struct ProbeReadings {
    pub floor_height: Option<f32>,
    /// Seconds since the floor ray last hit something.
    pub unsupported_for: f32,
    ledge_contact: Option<Entity>,
}

fn attach_player_body(mut commands: Commands, players: Query<Entity, Added<Player>>) {
    for entity in &players {
        commands.entity(entity).insert((
            RigidBody::Kinematic,
            Collider::capsule_endpoints(0.3, Vec3::Y * 0.3, Vec3::Y * 1.4),
            CollisionLayers::new(GameLayer::Player, [GameLayer::World, GameLayer::Enemy]),
        ));
    }
}

pub(crate) fn probe_contacts(
    time: Res<Time>,
    spatial_query: SpatialQuery,
    names: Query<&Name>,
    mut players: Query<(&mut PlayerController, &mut ProbeReadings)>,
) {
    let world = SpatialQueryFilter::from_mask(GameLayer::World);
    let enemies = SpatialQueryFilter::from_mask(GameLayer::Enemy);

    for (mut controller, mut readings) in &mut players {
        let pose = *controller.pose();

        let floor_origin = pose.position + Vec3::Y * FLOOR_PROBE_HEIGHT;
        readings.floor_height = spatial_query
            .cast_ray(floor_origin, Dir3::NEG_Y, FLOOR_PROBE_LENGTH, true, &world)
            .map(|hit| floor_origin.y - hit.distance);
        readings.unsupported_for = match readings.floor_height {
            Some(_) => 0.0,
            None => readings.unsupported_for + time.delta_secs(),
        };

        // The collider under the ledge ray before a respawn is left behind.
        if controller.take_respawn() {
            readings.ledge_contact = None;
        }
        let ledge_origin = pose.local_point(Vec3::new(0.0, LEDGE_PROBE_HEIGHT, -LEDGE_PROBE_AHEAD));
        let ledge_contact = spatial_query
            .cast_ray(ledge_origin, Dir3::NEG_Y, LEDGE_PROBE_LENGTH, true, &world)
            .map(|hit| hit.entity);
        if let Some(previous) = readings.ledge_contact.filter(|previous| Some(*previous) != ledge_contact) {
            if let Ok(name) = names.get(previous) {
                controller.on_contact_out(name.as_str());
            }
        }
        readings.ledge_contact = ledge_contact;

        let attack_center = pose.local_point(Vec3::new(
            0.0,
            ATTACK_PROBE_HEIGHT,
            -(ATTACK_PROBE_REACH - ATTACK_PROBE_RADIUS),
        ));
        let reached = spatial_query.shape_intersections(
            &Collider::sphere(ATTACK_PROBE_RADIUS),
            attack_center,
            Quat::default(),
            &enemies,
        );
        controller.set_attack_contacts(
            reached
                .into_iter()
                .filter_map(|entity| names.get(entity).ok())
                .map(|name| name.as_str().to_string()),
        );
    }
}

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PhysicsPlugins::default())
            .add_systems(Update, attach_player_body)
            .add_systems(Update, probe_contacts.in_set(PlayerSystems::Contacts));
    }
}
