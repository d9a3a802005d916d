use bevy::app::AppExit;
use bevy::prelude::*;

use crate::character_controller::button_index;
use crate::config::ControllerConfig;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Menu,
    InGame,
    GameOver,
}

/// Everything spawned for a play session; despawned when the session ends.
#[derive(Component)]
pub struct InGameEntity;

pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .add_systems(OnExit(AppState::InGame), despawn_in_game_entities)
            .add_systems(Update, exit_on_escape);
    }
}

pub fn despawn_in_game_entities(mut commands: Commands, entities: Query<Entity, With<InGameEntity>>) {
    for entity in &entities {
        commands.entity(entity).despawn_recursive();
    }
}

/// Escape or the gamepad's escape button quits the app.
fn exit_on_escape(
    keyboard: Res<ButtonInput<KeyCode>>,
    gamepads: Query<&Gamepad>,
    config: Res<ControllerConfig>,
    mut exit: EventWriter<AppExit>,
) {
    let escape = config.input.gamepad.escape;
    let pad_escape = gamepads.iter().any(|gamepad| {
        gamepad
            .get_just_pressed()
            .any(|button| button_index(*button) == Some(escape))
    });
    if keyboard.just_pressed(KeyCode::Escape) || pad_escape {
        info!("exit requested");
        exit.send(AppExit::Success);
    }
}
