//! Player entity and the systems that connect [`PlayerController`] to the ECS.
//!
//! Each frame runs in [`PlayerSystems`] order: raw input is fed to the
//! controller, the collision probes report what they touch, the controller
//! ticks, and finally its pose, camera and events are written back out.

pub mod controller;
pub mod events;
pub mod state;

use std::f32::consts::PI;

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::character_controller::GamepadSupport;
use crate::character_controller::detect_gamepad;
use crate::character_controller::input::ControlScheme;
use crate::character_controller::movement::Pose;
use crate::config::ControllerConfig;
use crate::game_states::{AppState, InGameEntity, despawn_in_game_entities};
use crate::physics::ProbeReadings;
use controller::{PlayerController, TickContext};
use events::{PlayerCommand, PlayerEvent, SoundCue};

pub const SPAWN_POINT: Vec3 = Vec3::new(0.0, 0.0, 0.0);

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSystems {
    Input,
    Contacts,
    Tick,
    Apply,
}

#[derive(Component)]
pub struct Player;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerEvent>()
            .add_event::<SoundCue>()
            .add_event::<PlayerCommand>()
            .configure_sets(
                Update,
                (
                    PlayerSystems::Input,
                    PlayerSystems::Contacts,
                    PlayerSystems::Tick,
                    PlayerSystems::Apply,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            )
            .add_systems(OnEnter(AppState::InGame), spawn_player.after(detect_gamepad))
            .add_systems(
                Update,
                (apply_player_commands, tick_player)
                    .chain()
                    .in_set(PlayerSystems::Tick),
            )
            .add_systems(
                Update,
                (sync_player_transform, recenter_pointer, publish_player_events).in_set(PlayerSystems::Apply),
            )
            .add_systems(OnExit(AppState::InGame), cleanup_player.before(despawn_in_game_entities));
    }
}

fn spawn_player(
    mut commands: Commands,
    config: Res<ControllerConfig>,
    gamepad_support: Res<GamepadSupport>,
) {
    let mut controller = PlayerController::new(config.clone());
    if config.input.control_scheme == ControlScheme::Gamepad && !gamepad_support.0 {
        warn!("gamepad control scheme configured but no gamepad connected, using mouse and keyboard");
        controller.set_control_scheme(ControlScheme::MouseAndKeyboard);
    }
    let spawn = Pose::new(SPAWN_POINT, 0.0);
    controller.start(spawn);

    // The physics body and the character model are attached by their own plugins.
    commands.spawn((
        Name::new("Player"),
        Player,
        model_transform(&spawn),
        ProbeReadings::default(),
        controller,
        InGameEntity,
    ));
}

// The character model faces +Z while the pose's forward is -Z.
fn model_transform(pose: &Pose) -> Transform {
    Transform::from_translation(pose.position).with_rotation(pose.rotation() * Quat::from_rotation_y(PI))
}

fn apply_player_commands(mut commands: EventReader<PlayerCommand>, mut players: Query<&mut PlayerController>) {
    let Ok(mut controller) = players.get_single_mut() else {
        commands.clear();
        return;
    };
    for command in commands.read() {
        match *command {
            PlayerCommand::TakeDamage => controller.take_damage(),
            PlayerCommand::Heal => controller.heal(),
            PlayerCommand::Die => controller.die(),
            PlayerCommand::EnterFightMode(target) => controller.enter_fight_mode(target),
            PlayerCommand::ExitFightMode => controller.exit_fight_mode(),
        }
    }
}

/// Reads the pointer motion only while it is over a focused window.
fn pointer_offset(windows: &Query<&Window, With<PrimaryWindow>>, motion: &mut EventReader<MouseMotion>) -> Option<Vec2> {
    let delta: Vec2 = motion.read().map(|event| event.delta).sum();
    let window = windows.get_single().ok()?;
    (window.focused && window.cursor_position().is_some()).then_some(delta)
}

fn tick_player(
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut motion: EventReader<MouseMotion>,
    targets: Query<&GlobalTransform>,
    mut players: Query<(&mut PlayerController, &ProbeReadings)>,
) {
    let pointer = pointer_offset(&windows, &mut motion);
    for (mut controller, readings) in &mut players {
        let enemy_position = controller
            .tracked_enemy()
            .and_then(|enemy| targets.get(enemy).ok())
            .map(GlobalTransform::translation);
        controller.tick(&TickContext {
            dt: time.delta_secs(),
            pointer,
            enemy_position,
            floor_height: readings.floor_height,
        });
    }
}

fn sync_player_transform(mut players: Query<(&PlayerController, &mut Transform), With<Player>>) {
    for (controller, mut transform) in &mut players {
        *transform = model_transform(controller.pose());
    }
}

fn recenter_pointer(
    mut players: Query<&mut PlayerController>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let (Ok(mut controller), Ok(mut window)) = (players.get_single_mut(), windows.get_single_mut()) else {
        return;
    };
    if controller.take_pointer_recenter() && window.focused {
        let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
        window.set_cursor_position(Some(center));
    }
}

fn publish_player_events(
    mut players: Query<&mut PlayerController>,
    mut events: EventWriter<PlayerEvent>,
    mut sound_cues: EventWriter<SoundCue>,
) {
    for mut controller in &mut players {
        events.send_batch(controller.drain_events());
        sound_cues.send_batch(controller.drain_sound_cues());
    }
}

fn cleanup_player(mut players: Query<&mut PlayerController>, mut sound_cues: EventWriter<SoundCue>) {
    for mut controller in &mut players {
        controller.cleanup();
        sound_cues.send_batch(controller.drain_sound_cues());
    }
}
