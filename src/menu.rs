use bevy::prelude::*;

use crate::game_states::AppState;
use crate::player::events::{GameOverReason, PlayerEvent};

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Menu), setup_menu)
            .add_systems(OnEnter(AppState::GameOver), setup_game_over)
            .add_systems(
                Update,
                menu_buttons.run_if(in_state(AppState::Menu).or(in_state(AppState::GameOver))),
            )
            .add_systems(Update, enter_game_over.run_if(in_state(AppState::InGame)))
            .add_systems(OnExit(AppState::Menu), cleanup_screen)
            .add_systems(OnExit(AppState::GameOver), cleanup_screen);
    }
}

/// Anything belonging to the menu or game-over screen.
#[derive(Component)]
struct Screen;

/// Where a button sends the app.
#[derive(Component)]
struct GoTo(AppState);

const NORMAL_BUTTON: Color = Color::srgb(0.15, 0.15, 0.15);
const HOVERED_BUTTON: Color = Color::srgb(0.25, 0.25, 0.25);
const PRESSED_BUTTON: Color = Color::srgb(0.35, 0.75, 0.35);

fn setup_menu(commands: Commands) {
    spawn_screen(commands, None, "Play", AppState::InGame);
}

fn setup_game_over(commands: Commands) {
    spawn_screen(commands, Some("Game over"), "Menu", AppState::Menu);
}

fn spawn_screen(mut commands: Commands, title: Option<&str>, label: &str, target: AppState) {
    commands.spawn((Camera2d, Screen));
    commands
        .spawn((
            Node {
                width: Val::Percent(100.),
                height: Val::Percent(100.),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(24.),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            Screen,
        ))
        .with_children(|parent| {
            if let Some(title) = title {
                parent.spawn((
                    Text::new(title),
                    TextFont {
                        font_size: 48.0,
                        ..default()
                    },
                    TextColor(Color::srgb(0.8, 0.2, 0.2)),
                ));
            }
            parent
                .spawn((
                    Button,
                    GoTo(target),
                    Node {
                        width: Val::Px(150.),
                        height: Val::Px(65.),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(NORMAL_BUTTON),
                ))
                .with_children(|parent| {
                    parent.spawn((
                        Text::new(label),
                        TextFont {
                            font_size: 33.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.9, 0.9, 0.9)),
                    ));
                });
        });
}

fn menu_buttons(
    mut next_state: ResMut<NextState<AppState>>,
    mut interaction_query: Query<(&Interaction, &GoTo, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
) {
    for (interaction, go_to, mut color) in &mut interaction_query {
        match *interaction {
            Interaction::Pressed => {
                *color = PRESSED_BUTTON.into();
                next_state.set(go_to.0);
            }
            Interaction::Hovered => {
                *color = HOVERED_BUTTON.into();
            }
            Interaction::None => {
                *color = NORMAL_BUTTON.into();
            }
        }
    }
}

pub fn enter_game_over(mut events: EventReader<PlayerEvent>, mut next_state: ResMut<NextState<AppState>>) {
    for event in events.read() {
        if let PlayerEvent::GameOver(reason) = event {
            match reason {
                GameOverReason::Loss => info!("player lost"),
            }
            next_state.set(AppState::GameOver);
        }
    }
}

fn cleanup_screen(mut commands: Commands, screen: Query<Entity, With<Screen>>) {
    for entity in &screen {
        commands.entity(entity).despawn_recursive();
    }
}
