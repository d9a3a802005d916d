pub mod input;
pub mod jump;
pub mod movement;
pub mod physics;

use std::borrow::Cow;

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use crate::character_controller::input::RawInput;
use crate::game_states::AppState;
use crate::player::PlayerSystems;
use crate::player::controller::PlayerController;

pub struct CharacterControllerPlugin;

impl Plugin for CharacterControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GamepadSupport>()
            .add_systems(OnEnter(AppState::InGame), detect_gamepad)
            .add_systems(
                Update,
                (
                    keyboard_input,
                    gamepad_input.run_if(resource_equals(GamepadSupport(true))),
                )
                    .chain()
                    .in_set(PlayerSystems::Input),
            );
    }
}

/// Whether a gamepad was connected when the game started.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GamepadSupport(pub bool);

pub fn detect_gamepad(gamepads: Query<&Gamepad>, mut support: ResMut<GamepadSupport>) {
    support.0 = !gamepads.is_empty();
    info!("gamepad support: {}", support.0);
}

/// Name under which a key appears in the key bindings: the key code in
/// snake case without its `Key`/`Digit` prefix (`KeyW` is `w`, `ArrowLeft` is
/// `arrow_left`, `Space` is `space`). Plus and minus keys are `+` and `-`.
fn key_name(key: KeyCode) -> Option<Cow<'static, str>> {
    let name = match key {
        KeyCode::Equal | KeyCode::NumpadAdd => "+",
        KeyCode::Minus | KeyCode::NumpadSubtract => "-",
        KeyCode::NumpadEnter => "enter",
        KeyCode::Unidentified(_) => return None,
        other => return Some(Cow::Owned(snake_case_key(&format!("{other:?}")))),
    };
    Some(Cow::Borrowed(name))
}

fn snake_case_key(code: &str) -> String {
    let code = code
        .strip_prefix("Key")
        .or_else(|| code.strip_prefix("Digit"))
        .unwrap_or(code);
    let mut name = String::with_capacity(code.len() + 4);
    for (i, c) in code.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            name.push('_');
        }
        name.push(c.to_ascii_lowercase());
    }
    name
}

/// Index of a button in the conventional gamepad layout.
pub(crate) fn button_index(button: GamepadButton) -> Option<u8> {
    let index = match button {
        GamepadButton::South => 0,
        GamepadButton::East => 1,
        GamepadButton::West => 2,
        GamepadButton::North => 3,
        GamepadButton::LeftTrigger => 4,
        GamepadButton::RightTrigger => 5,
        GamepadButton::LeftTrigger2 => 6,
        GamepadButton::RightTrigger2 => 7,
        GamepadButton::Select => 8,
        GamepadButton::Start => 9,
        _ => return None,
    };
    Some(index)
}

/// Feeds key edges and wheel steps to the player controller.
fn keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut wheel: EventReader<MouseWheel>,
    mut players: Query<&mut PlayerController>,
) {
    let Ok(mut controller) = players.get_single_mut() else {
        wheel.clear();
        return;
    };

    for name in keyboard.get_just_pressed().filter_map(|key| key_name(*key)) {
        controller.handle_input(RawInput::Pressed(&name));
    }
    for name in keyboard.get_just_released().filter_map(|key| key_name(*key)) {
        controller.handle_input(RawInput::Released(&name));
    }
    for event in wheel.read() {
        if event.y > 0.0 {
            controller.handle_input(RawInput::Pressed("wheel_up"));
        } else if event.y < 0.0 {
            controller.handle_input(RawInput::Pressed("wheel_down"));
        }
    }
}

/// Feeds the left stick and button presses to the player controller.
fn gamepad_input(gamepads: Query<&Gamepad>, mut players: Query<&mut PlayerController>) {
    let Ok(mut controller) = players.get_single_mut() else { return };

    for gamepad in gamepads.iter() {
        if let (Some(x), Some(y)) = (
            gamepad.get(GamepadAxis::LeftStickX),
            gamepad.get(GamepadAxis::LeftStickY),
        ) {
            // Bevy reports stick up as +y; raw axes use +y down.
            controller.handle_input(RawInput::Axis { index: 0, value: x });
            controller.handle_input(RawInput::Axis { index: 1, value: -y });
        }

        for index in gamepad.get_just_pressed().filter_map(|button| button_index(*button)) {
            controller.handle_input(RawInput::Button(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::character_controller::input::{InputState, OneShot};
    use crate::config::InputConfig;

    fn name(key: KeyCode) -> Option<String> {
        key_name(key).map(Cow::into_owned)
    }

    #[test]
    fn every_key_has_a_bindable_name() {
        assert_eq!(name(KeyCode::KeyW).as_deref(), Some("w"));
        assert_eq!(name(KeyCode::Digit7).as_deref(), Some("7"));
        assert_eq!(name(KeyCode::ArrowLeft).as_deref(), Some("arrow_left"));
        assert_eq!(name(KeyCode::Space).as_deref(), Some("space"));
        assert_eq!(name(KeyCode::ShiftLeft).as_deref(), Some("shift_left"));
        assert_eq!(name(KeyCode::F1).as_deref(), Some("f1"));
        assert_eq!(name(KeyCode::NumpadAdd).as_deref(), Some("+"));
        assert_eq!(name(KeyCode::NumpadEnter).as_deref(), Some("enter"));
    }

    #[test]
    fn rebound_keys_reach_the_input_state() {
        let mut config = InputConfig::default();
        config.keys.act = vec!["space".to_string()];
        config.keys.left = vec!["j".to_string()];
        let mut input = InputState::new(&config);

        let act = name(KeyCode::Space).unwrap();
        assert_eq!(input.apply(RawInput::Pressed(&act)), Some(OneShot::Act));

        let left = name(KeyCode::KeyJ).unwrap();
        assert_eq!(input.apply(RawInput::Pressed(&left)), None);
        assert_eq!(input.signals().horizontal, 1.0);
    }

    #[test]
    fn shoulder_buttons_follow_the_standard_layout() {
        assert_eq!(button_index(GamepadButton::LeftTrigger), Some(4));
        assert_eq!(button_index(GamepadButton::RightTrigger), Some(5));
        assert_eq!(button_index(GamepadButton::LeftTrigger2), Some(6));
        assert_eq!(button_index(GamepadButton::DPadUp), None);
    }
}
