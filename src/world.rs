use std::f32::consts::PI;

use avian3d::prelude::*;
use bevy::pbr::CascadeShadowConfigBuilder;
use bevy::prelude::*;

use crate::game_states::{AppState, InGameEntity};
use crate::physics::{GameLayer, ProbeReadings, probe_contacts};
use crate::player::controller::PlayerController;
use crate::player::events::{PlayerCommand, PlayerEvent};
use crate::player::state::{MovementMode, PlayerState};
use crate::player::{Player, PlayerSystems};

/// The player engages the dummy inside this radius...
const ENGAGE_RADIUS: f32 = 3.0;
/// ...and disengages beyond this one.
const DISENGAGE_RADIUS: f32 = 5.0;
/// How long the player may hang over nothing before it counts as a fall.
const FALL_GRACE: f32 = 0.5;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::InGame), setup)
            .add_systems(
                Update,
                fall_hazard.after(probe_contacts).in_set(PlayerSystems::Contacts),
            )
            .add_systems(
                Update,
                (engage_training_dummy, log_enemy_hits)
                    .after(PlayerSystems::Apply)
                    .run_if(in_state(AppState::InGame)),
            );
    }
}

#[derive(Component)]
pub struct TrainingDummy;

/// Walkable slabs: name, center, size. Names must contain "floor" or "plate"
/// for the ledge probe to launch jumps off their edges.
const SLABS: [(&str, Vec3, Vec3); 4] = [
    ("Floor_Start", Vec3::new(0.0, -0.1, 0.0), Vec3::new(10.0, 0.2, 10.0)),
    ("Plate_1", Vec3::new(0.0, -0.2, -8.5), Vec3::new(3.0, 0.2, 3.0)),
    ("Plate_2", Vec3::new(0.0, -0.3, -13.5), Vec3::new(3.0, 0.2, 3.0)),
    ("Floor_Goal", Vec3::new(0.0, -0.4, -21.0), Vec3::new(10.0, 0.2, 8.0)),
];

fn setup(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>, mut materials: ResMut<Assets<StandardMaterial>>) {
    let stone = materials.add(Color::srgb(0.55, 0.55, 0.5));
    for (name, center, size) in SLABS {
        commands.spawn((
            Name::new(name),
            RigidBody::Static,
            Collider::cuboid(size.x, size.y, size.z),
            CollisionLayers::new(GameLayer::World, LayerMask::ALL),
            Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(stone.clone()),
            Transform::from_translation(center),
            InGameEntity,
        ));
    }

    commands
        .spawn((
            Name::new("TrainingDummy"),
            TrainingDummy,
            RigidBody::Static,
            Collider::cylinder(0.35, 1.8),
            CollisionLayers::new(GameLayer::Enemy, [GameLayer::Player]),
            Mesh3d(meshes.add(Cylinder::new(0.35, 1.8))),
            MeshMaterial3d(materials.add(Color::srgb(0.8, 0.7, 0.6))),
            Transform::from_xyz(3.0, 0.9, -2.0),
            InGameEntity,
        ))
        .with_children(|parent| {
            parent.spawn((
                Name::new("DummyHitField"),
                Sensor,
                Collider::sphere(0.6),
                CollisionLayers::new(GameLayer::Enemy, [GameLayer::Player]),
                Transform::from_xyz(0.0, 0.2, 0.0),
            ));
        });

    commands.spawn((
        Transform::from_rotation(Quat::from_euler(EulerRot::ZYX, 0.0, 1.0, -PI / 4.)),
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        CascadeShadowConfigBuilder {
            first_cascade_far_bound: 50.0,
            maximum_distance: 100.0,
            ..default()
        }
        .build(),
        InGameEntity,
    ));
}

/// Enters fight mode near the dummy and leaves it once the player walks away.
fn engage_training_dummy(
    players: Query<(&PlayerController, &Transform), With<Player>>,
    dummies: Query<(Entity, &Transform), With<TrainingDummy>>,
    mut commands: EventWriter<PlayerCommand>,
) {
    let Ok((controller, player)) = players.get_single() else { return };
    if !controller.is_running() {
        return;
    }
    let nearest = dummies
        .iter()
        .map(|(entity, transform)| (entity, transform.translation.xz().distance(player.translation.xz())))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match (controller.mode(), nearest) {
        (MovementMode::Normal, Some((dummy, distance))) if distance < ENGAGE_RADIUS => {
            commands.send(PlayerCommand::EnterFightMode(dummy));
        }
        (MovementMode::Fight, Some((_, distance))) if distance > DISENGAGE_RADIUS => {
            commands.send(PlayerCommand::ExitFightMode);
        }
        (MovementMode::Fight, None) => {
            commands.send(PlayerCommand::ExitFightMode);
        }
        _ => {}
    }
}

/// Hanging over nothing outside of a jump is a fall into the void.
fn fall_hazard(
    players: Query<(&PlayerController, &ProbeReadings), With<Player>>,
    mut commands: EventWriter<PlayerCommand>,
) {
    let Ok((controller, readings)) = players.get_single() else { return };
    let grounded = readings.unsupported_for < FALL_GRACE || controller.jump().is_active();
    if controller.is_running() && !grounded && controller.state() != PlayerState::Death {
        commands.send(PlayerCommand::Die);
    }
}

fn log_enemy_hits(mut events: EventReader<PlayerEvent>) {
    for event in events.read() {
        if *event == PlayerEvent::EnemyHit {
            info!("training dummy hit");
        }
    }
}
