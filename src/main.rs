use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use spear_souls::animation::PlayerAnimationPlugin;
use spear_souls::camera::CameraPlugin;
use spear_souls::character_controller::CharacterControllerPlugin;
use spear_souls::config::{ControllerConfig, load_controller_config};
use spear_souls::game_states::GameStatePlugin;
use spear_souls::menu::MenuPlugin;
use spear_souls::physics::PhysicsPlugin;
use spear_souls::player::PlayerPlugin;
use spear_souls::sound::SoundPlugin;
use spear_souls::world::WorldPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Spear souls".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(WorldInspectorPlugin::new())
        .init_resource::<ControllerConfig>()
        .add_systems(Startup, load_controller_config)
        .add_plugins((
            GameStatePlugin,
            MenuPlugin,
            PhysicsPlugin,
            CharacterControllerPlugin,
            PlayerPlugin,
            CameraPlugin,
            PlayerAnimationPlugin,
            SoundPlugin,
            WorldPlugin,
        ))
        .run();
}
