//! Headless tests of the player plugins inside a Bevy [`App`].
//!
//! These use [`MinimalPlugins`] plus the input and state plugins; no window,
//! renderer, physics or assets. The physics body and the character model are
//! attached by plugins that are left out here, so the player entity carries
//! only its controller.
//!
//! Covered scenarios:
//! 1. Entering `InGame` spawns a started player.
//! 2. `PlayerCommand` events reach the controller and come back as `PlayerEvent`s.
//! 3. Losing the last health point ends in `AppState::GameOver` and despawns
//!    the session's entities.

use std::time::Duration;

use bevy::input::InputPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use spear_souls::character_controller::CharacterControllerPlugin;
use spear_souls::config::ControllerConfig;
use spear_souls::game_states::{AppState, GameStatePlugin, InGameEntity};
use spear_souls::menu::enter_game_over;
use spear_souls::player::controller::PlayerController;
use spear_souls::player::events::{GameOverReason, PlayerCommand, PlayerEvent};
use spear_souls::player::state::{MovementMode, PlayerState};
use spear_souls::player::{Player, PlayerPlugin};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Every `PlayerEvent` seen so far.
#[derive(Resource, Default)]
struct SeenEvents(Vec<PlayerEvent>);

fn record_events(mut events: EventReader<PlayerEvent>, mut seen: ResMut<SeenEvents>) {
    seen.0.extend(events.read().copied());
}

/// A headless app already in `InGame`, advancing 250 ms per update.
fn game_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin, InputPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(250)))
        .init_resource::<ControllerConfig>()
        .init_resource::<SeenEvents>()
        .add_plugins((GameStatePlugin, CharacterControllerPlugin, PlayerPlugin))
        .add_systems(Update, enter_game_over.run_if(in_state(AppState::InGame)))
        .add_systems(Update, record_events);

    app.update();
    app.world_mut()
        .resource_mut::<NextState<AppState>>()
        .set(AppState::InGame);
    app.update();
    app
}

fn state(app: &App) -> AppState {
    *app.world().resource::<State<AppState>>().get()
}

fn with_controller<T>(app: &mut App, f: impl FnOnce(&PlayerController) -> T) -> T {
    let world = app.world_mut();
    let mut query = world.query::<&PlayerController>();
    let controller = query.single(world);
    f(controller)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn entering_the_game_spawns_a_started_player() {
    let mut app = game_app();
    assert_eq!(state(&app), AppState::InGame);

    let players = app.world_mut().query_filtered::<Entity, With<Player>>().iter(app.world()).count();
    assert_eq!(players, 1);
    with_controller(&mut app, |controller| {
        assert!(controller.is_running());
        assert_eq!(controller.health(), 3);
        assert_eq!(controller.state(), PlayerState::Idle);
    });
}

#[test]
fn commands_reach_the_controller() {
    let mut app = game_app();
    let dummy = app.world_mut().spawn(GlobalTransform::from_xyz(0.0, 0.0, -3.0)).id();

    app.world_mut().send_event(PlayerCommand::EnterFightMode(dummy));
    app.world_mut().send_event(PlayerCommand::TakeDamage);
    app.update();

    with_controller(&mut app, |controller| {
        assert_eq!(controller.mode(), MovementMode::Fight);
        assert_eq!(controller.tracked_enemy(), Some(dummy));
        assert_eq!(controller.health(), 2);
    });

    app.world_mut().send_event(PlayerCommand::Heal);
    app.world_mut().send_event(PlayerCommand::ExitFightMode);
    app.update();
    app.update();

    let seen = &app.world().resource::<SeenEvents>().0;
    assert_eq!(
        seen,
        &vec![
            PlayerEvent::EnterFightMode,
            PlayerEvent::HealthChanged(2),
            PlayerEvent::HealthChanged(3),
            PlayerEvent::ExitFightMode,
        ]
    );
}

#[test]
fn losing_the_last_health_point_ends_the_game() {
    let mut app = game_app();
    for _ in 0..3 {
        app.world_mut().send_event(PlayerCommand::TakeDamage);
    }

    for _ in 0..40 {
        app.update();
        if state(&app) == AppState::GameOver {
            break;
        }
    }
    assert_eq!(state(&app), AppState::GameOver);

    let seen = &app.world().resource::<SeenEvents>().0;
    assert_eq!(seen.last(), Some(&PlayerEvent::GameOver(GameOverReason::Loss)));
    assert!(seen.contains(&PlayerEvent::HealthChanged(0)));

    app.update();
    let leftovers = app
        .world_mut()
        .query_filtered::<Entity, With<InGameEntity>>()
        .iter(app.world())
        .count();
    assert_eq!(leftovers, 0);
}
