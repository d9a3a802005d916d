//! End-to-end scenarios for [`PlayerController`], driven tick by tick without
//! an ECS world.
//!
//! Covered scenarios:
//! 1. Three hits take the player from full health through Death to GameOver.
//! 2. A floor contact-out while running launches a jump that lands exactly on
//!    its end point after the jump duration, and gates movement until then.
//! 3. Hit reactions gate movement and ask for the pointer to be recentered.
//! 4. Fight movement without a resolvable target does nothing.
//! 5. Camera distance and height stay inside their bands; zoom converges.
//! 6. Restarting a stopped controller leaves no jump or death sequence behind.

use bevy::prelude::*;
use spear_souls::camera::CameraRig;
use spear_souls::character_controller::input::{ControlScheme, RawInput};
use spear_souls::character_controller::movement::Pose;
use spear_souls::config::{CameraConfig, ControllerConfig};
use spear_souls::player::controller::{MoveGate, PlayerController, TickContext};
use spear_souls::player::events::{GameOverReason, PlayerEvent};
use spear_souls::player::state::{MovementMode, PlayerState};

const DT: f32 = 0.25;
const EPS: f32 = 1e-4;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn controller_at(position: Vec3) -> PlayerController {
    let mut controller = PlayerController::with_seed(ControllerConfig::default(), 11);
    controller.start(Pose::new(position, 0.0));
    controller
}

/// A tick with the pointer inside the window but not moving.
fn still() -> TickContext {
    TickContext {
        dt: DT,
        pointer: Some(Vec2::ZERO),
        ..default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn three_hits_end_in_game_over() {
    let mut controller = controller_at(Vec3::ZERO);
    for _ in 0..3 {
        controller.take_damage();
    }
    assert_eq!(controller.state(), PlayerState::Death);
    let events: Vec<_> = controller.drain_events().collect();
    assert_eq!(
        events,
        vec![
            PlayerEvent::HealthChanged(2),
            PlayerEvent::HealthChanged(1),
            PlayerEvent::HealthChanged(0),
        ]
    );

    // Death clip (2 s) plus the wait (2 s) at 0.25 s per tick.
    for _ in 0..15 {
        controller.tick(&still());
        assert!(controller.drain_events().next().is_none());
    }
    controller.tick(&still());
    let events: Vec<_> = controller.drain_events().collect();
    assert_eq!(events, vec![PlayerEvent::GameOver(GameOverReason::Loss)]);
    assert!(!controller.is_running());

    // Nothing moves a finished game.
    controller.handle_input(RawInput::Pressed("w"));
    assert_eq!(controller.tick(&still()), None);
}

#[test]
fn floor_contact_while_running_jumps_to_the_end_point() {
    let mut controller = controller_at(Vec3::new(0.0, 1.0, 0.0));
    controller.handle_input(RawInput::Pressed("w"));
    controller.tick(&still());
    assert_eq!(controller.state(), PlayerState::Run);

    let take_off = *controller.pose();
    assert!(controller.on_contact_out("Floor_Start"));
    assert_eq!(controller.state(), PlayerState::Jump);
    let expected_end = take_off.position + take_off.forward() * 3.2 - Vec3::Y * 0.1;
    let trajectory = controller.jump().trajectory().expect("jump in flight");
    assert!((trajectory.end() - expected_end).length() < EPS);
    assert!((controller.jump().respawn_point() - (take_off.position - take_off.forward() * 0.5)).length() < EPS);

    // A second contact during the flight is ignored.
    assert!(!controller.on_contact_out("Plate_1"));

    // Five ticks cover 1.25 s of the 1.5 s flight; the key is still held but
    // the trajectory owns the position.
    for _ in 0..5 {
        assert_eq!(controller.tick(&still()), Some(MoveGate::Jump));
        assert_eq!(controller.state(), PlayerState::Jump);
    }
    assert!(controller.pose().position.y > expected_end.y);

    controller.handle_input(RawInput::Released("w"));
    assert_eq!(controller.tick(&still()), None);
    assert!(!controller.jump().is_active());
    assert!((controller.pose().position - expected_end).length() < EPS);
    assert_eq!(controller.state(), PlayerState::Idle);
}

#[test]
fn restart_after_stop_mid_jump_starts_clean() {
    let mut controller = controller_at(Vec3::ZERO);
    assert!(controller.on_contact_out("Floor_Start"));
    controller.tick(&still());
    controller.stop();
    assert!(!controller.jump().is_active());

    let spawn = Vec3::new(10.0, 0.0, 10.0);
    controller.start(Pose::new(spawn, 0.0));
    assert_eq!(controller.tick(&still()), None);
    assert_eq!(controller.pose().position, spawn);
    assert_eq!(controller.state(), PlayerState::Idle);
}

#[test]
fn restart_after_stop_mid_death_starts_clean() {
    let mut controller = controller_at(Vec3::ZERO);
    controller.die();
    assert_eq!(controller.state(), PlayerState::Death);
    controller.stop();

    let spawn = Vec3::new(10.0, 0.0, 10.0);
    controller.start(Pose::new(spawn, 0.0));
    controller.drain_events().for_each(drop);
    for _ in 0..20 {
        assert_eq!(controller.tick(&still()), None);
    }
    assert_eq!(controller.pose().position, spawn);
    assert_eq!(controller.state(), PlayerState::Idle);
    assert_eq!(controller.health(), 3);
    assert!(controller.is_running());
    assert!(controller.drain_events().next().is_none());
}

#[test]
fn unknown_surface_leaves_the_player_alone() {
    let mut controller = controller_at(Vec3::ZERO);
    assert!(!controller.on_contact_out("Wall_North"));
    assert_eq!(controller.state(), PlayerState::Idle);
    assert!(!controller.jump().is_active());
}

#[test]
fn hit_reaction_gates_movement_then_releases_it() {
    let mut controller = controller_at(Vec3::ZERO);
    controller.take_damage();
    controller.handle_input(RawInput::Pressed("w"));

    // Hit is 1 s long at rate 4.
    let quick = TickContext { dt: 0.1, ..still() };
    assert_eq!(controller.tick(&quick), Some(MoveGate::HitOrDeathAnimation));
    assert_eq!(controller.pose().position, Vec3::ZERO);
    assert!(controller.take_pointer_recenter());
    controller.tick(&quick);
    assert_eq!(controller.state(), PlayerState::Hit);

    controller.tick(&quick);
    assert_eq!(controller.state(), PlayerState::Run);
    assert!(controller.pose().position.z < 0.0);
}

#[test]
fn fight_movement_needs_a_resolvable_target() {
    let mut controller = controller_at(Vec3::ZERO);
    let dummy = Entity::from_raw(9);
    controller.enter_fight_mode(dummy);
    assert_eq!(controller.mode(), MovementMode::Fight);
    assert_eq!(controller.tracked_enemy(), Some(dummy));

    controller.handle_input(RawInput::Pressed("a"));
    let camera_before = controller.camera().position();
    controller.tick(&still());
    assert_eq!(controller.pose().position, Vec3::ZERO);
    assert_eq!(controller.state(), PlayerState::Idle);
    assert_eq!(controller.camera().position(), camera_before);

    let with_target = TickContext {
        enemy_position: Some(Vec3::new(0.0, 0.0, -4.0)),
        ..still()
    };
    controller.tick(&with_target);
    assert_eq!(controller.state(), PlayerState::FightLeft);
    assert!((controller.pose().position - Vec3::new(-0.5, 0.0, 0.0)).length() < EPS);
    // Fight framing: straight behind at the fight distance and height.
    let behind = controller.pose().local_point(Vec3::new(0.0, 0.5, 3.0));
    assert!((controller.camera().position() - behind).length() < EPS);
}

#[test]
fn fight_strafe_wins_over_forward() {
    let mut controller = controller_at(Vec3::ZERO);
    controller.enter_fight_mode(Entity::from_raw(4));
    controller.handle_input(RawInput::Pressed("d"));
    controller.handle_input(RawInput::Pressed("w"));
    controller.tick(&TickContext {
        enemy_position: Some(Vec3::new(0.0, 0.0, -4.0)),
        ..still()
    });
    assert_eq!(controller.state(), PlayerState::FightRight);
}

#[test]
fn zoom_in_converges_to_the_inner_margin() {
    let mut controller = controller_at(Vec3::ZERO);
    for _ in 0..10 {
        controller.handle_input(RawInput::Pressed("wheel_up"));
    }
    let distance = controller.camera().planar_distance(controller.pose());
    assert!((distance - 1.7).abs() < 1e-5);

    for _ in 0..10 {
        controller.handle_input(RawInput::Pressed("wheel_down"));
    }
    let distance = controller.camera().planar_distance(controller.pose());
    assert!((distance - 3.5).abs() < 1e-5);
}

#[test]
fn camera_stays_inside_its_bands_while_steering_with_a_gamepad() {
    let mut controller = controller_at(Vec3::ZERO);
    controller.set_control_scheme(ControlScheme::Gamepad);
    assert_eq!(controller.control_scheme(), ControlScheme::Gamepad);

    let sticks = [(0.0, -1.0), (1.0, 0.0), (-0.7, 0.7), (0.3, -0.9), (0.0, 0.0), (-1.0, -1.0)];
    let ctx = TickContext { dt: 0.05, ..default() };
    for step in 0..240 {
        let (x, y) = sticks[(step / 40) % sticks.len()];
        controller.handle_input(RawInput::Axis { index: 0, value: x });
        controller.handle_input(RawInput::Axis { index: 1, value: y });
        controller.tick(&ctx);

        let distance = controller.camera().planar_distance(controller.pose());
        let height = controller.camera().height_offset(controller.pose());
        assert!((1.2 - EPS..=4.0 + EPS).contains(&distance), "distance {distance} at step {step}");
        assert!((1.5 - EPS..=3.0 + EPS).contains(&height), "height {height} at step {step}");
    }
}

#[test]
fn camera_height_converges_without_overshoot() {
    let config = CameraConfig::default();
    let rest = config.height_avg();
    let pose = Pose::default();

    for start in [config.min_height, config.max_height] {
        let mut rig = CameraRig::new(config.clone());
        rig.set_position(Vec3::new(0.0, start, 3.0));
        let mut gap = (rig.height_offset(&pose) - rest).abs();
        let side = (start - rest).signum();
        for _ in 0..100 {
            rig.update_normal(&pose, true, 0.016);
            let offset = rig.height_offset(&pose);
            let new_gap = (offset - rest).abs();
            assert!(new_gap <= gap + f32::EPSILON);
            assert!((offset - rest) * side >= -f32::EPSILON);
            gap = new_gap;
        }
        assert!(gap < EPS);
    }
}
