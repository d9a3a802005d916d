//! The player state machine and the per-tick update that drives it.
//!
//! [`PlayerController`] owns everything about the player that changes from
//! frame to frame: state, health, pose, input, camera rig, jump and the timed
//! action/death sequences. It never touches the ECS directly; the Bevy systems
//! in [`crate::player`] feed it a [`TickContext`] and raw input and read back
//! its pose, camera, animation cue and queued events.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::{AnimationTrack, Clip};
use crate::camera::{CameraRig, ZoomDirection};
use crate::character_controller::input::{ControlScheme, InputState, OneShot, OneShotRegistry, RawInput};
use crate::character_controller::jump::JumpController;
use crate::character_controller::movement::{Pose, fight_step, steer_gamepad, steer_pointer, strafe_keyboard};
use crate::character_controller::physics::settle_on_floor;
use crate::config::ControllerConfig;
use crate::constants::MAX_HEALTH;
use crate::player::events::{GameOverReason, PlayerEvent, SoundCue};
use crate::player::state::{MovementMode, PlayerState};

/// Everything a tick needs from the outside world.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickContext {
    pub dt: f32,
    /// Pointer offset since the last recenter, or `None` when the pointer is
    /// outside the window.
    pub pointer: Option<Vec2>,
    /// Where the tracked enemy is, if it still exists.
    pub enemy_position: Option<Vec3>,
    /// Height of the floor under the player, if the floor probe hit anything.
    pub floor_height: Option<f32>,
}

/// Why movement was skipped on a tick, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveGate {
    HitOrDeathAnimation,
    DeathSequence,
    Jump,
    ActionMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeathOutcome {
    GameOver,
    Respawn,
}

#[derive(Debug, Clone, Copy)]
struct DeathSequence {
    remaining: f32,
}

#[derive(Component)]
pub struct PlayerController {
    config: ControllerConfig,
    running: bool,
    state: PlayerState,
    mode: MovementMode,
    scheme: ControlScheme,
    health: u8,
    pose: Pose,
    speed: f32,
    input: InputState,
    one_shots: OneShotRegistry,
    tracked_enemy: Option<Entity>,
    is_action_move: bool,
    action_remaining: Option<f32>,
    death: Option<DeathSequence>,
    jump: JumpController,
    camera: CameraRig,
    animation: AnimationTrack,
    attack_contacts: Vec<String>,
    footsteps: bool,
    events: Vec<PlayerEvent>,
    sound_cues: Vec<SoundCue>,
    recenter_pointer: bool,
    mode_dirty: bool,
    respawned: bool,
    rng: StdRng,
}

impl PlayerController {
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as [`PlayerController::new`] with a fixed seed for the melee rolls.
    pub fn with_seed(config: ControllerConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ControllerConfig, rng: StdRng) -> Self {
        Self {
            running: false,
            state: PlayerState::Idle,
            mode: MovementMode::Normal,
            scheme: config.input.control_scheme,
            health: MAX_HEALTH,
            pose: Pose::default(),
            speed: 1.0,
            input: InputState::new(&config.input),
            one_shots: OneShotRegistry::default(),
            tracked_enemy: None,
            is_action_move: false,
            action_remaining: None,
            death: None,
            jump: JumpController::new(config.jump.clone()),
            camera: CameraRig::new(config.camera.clone()),
            animation: AnimationTrack::new(config.clips.clone()),
            attack_contacts: Vec::new(),
            footsteps: false,
            events: Vec::new(),
            sound_cues: Vec::new(),
            recenter_pointer: false,
            mode_dirty: false,
            respawned: false,
            rng,
            config,
        }
    }

    pub fn set_control_scheme(&mut self, scheme: ControlScheme) {
        self.scheme = scheme;
    }

    /// Puts the player at `spawn` with full health and starts accepting input.
    pub fn start(&mut self, spawn: Pose) {
        self.pose = spawn;
        self.health = MAX_HEALTH;
        self.speed = 1.0;
        self.mode = MovementMode::Normal;
        self.tracked_enemy = None;
        self.mode_dirty = false;
        self.respawned = false;
        self.jump.set_respawn_point(spawn.position);
        self.camera.reset_behind(&self.pose);
        self.one_shots.arm_all();
        self.running = true;
        self.request(PlayerState::Idle);
        info!("player started at {:?}", spawn.position);
    }

    /// Disarms every input subscription and halts the timed sequences: a
    /// jump in flight lands on its end point, the action and death sequences
    /// are abandoned without running their completions.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        let disarmed = self.one_shots.disarm_all();
        self.input.clear();
        self.jump.finish(&mut self.pose);
        self.action_remaining = None;
        self.is_action_move = false;
        self.death = None;
        self.set_footsteps(false);
        debug!("player stopped, {disarmed} one-shot subscriptions dropped");
    }

    /// Session teardown: stops the controller and lets go of the tracked
    /// enemy, the attack contacts and any undelivered events. Sound cues stay
    /// queued so the footsteps can still be silenced.
    pub fn cleanup(&mut self) {
        self.stop();
        self.tracked_enemy = None;
        self.attack_contacts.clear();
        self.events.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn control_scheme(&self) -> ControlScheme {
        self.scheme
    }

    pub fn health(&self) -> u8 {
        self.health
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn animation(&self) -> &AnimationTrack {
        &self.animation
    }

    pub fn jump(&self) -> &JumpController {
        &self.jump
    }

    pub fn tracked_enemy(&self) -> Option<Entity> {
        self.tracked_enemy
    }

    pub fn is_action_move(&self) -> bool {
        self.is_action_move
    }

    pub fn footsteps_playing(&self) -> bool {
        self.footsteps
    }

    pub fn is_armed(&self, trigger: OneShot) -> bool {
        self.one_shots.is_armed(trigger)
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, PlayerEvent> {
        self.events.drain(..)
    }

    pub fn drain_sound_cues(&mut self) -> std::vec::Drain<'_, SoundCue> {
        self.sound_cues.drain(..)
    }

    /// Whether the pointer should be warped back to the window center.
    pub fn take_pointer_recenter(&mut self) -> bool {
        std::mem::take(&mut self.recenter_pointer)
    }

    /// Whether the player was teleported to the respawn point since the last
    /// call. Contact tracking from before the teleport is stale.
    pub fn take_respawn(&mut self) -> bool {
        std::mem::take(&mut self.respawned)
    }

    /// Names of the colliders currently inside the attack probe.
    pub fn set_attack_contacts(&mut self, names: impl IntoIterator<Item = String>) {
        self.attack_contacts.clear();
        self.attack_contacts.extend(names);
    }

    pub fn handle_input(&mut self, raw: RawInput<'_>) {
        if !self.running {
            return;
        }
        let Some(trigger) = self.input.apply(raw) else {
            return;
        };
        if self.one_shots.take(trigger).is_none() {
            return;
        }
        match trigger {
            OneShot::Center => {
                self.camera.center(&self.pose);
                self.one_shots.arm(OneShot::Center);
            }
            OneShot::ZoomIn => {
                self.camera.zoom(ZoomDirection::In, &self.pose);
                self.one_shots.arm(OneShot::ZoomIn);
            }
            OneShot::ZoomOut => {
                self.camera.zoom(ZoomDirection::Out, &self.pose);
                self.one_shots.arm(OneShot::ZoomOut);
            }
            // Re-armed when the action completes or is refused.
            OneShot::Act => self.request(PlayerState::Action),
        }
    }

    /// The forward ledge probe stopped touching `surface`. Launches a jump
    /// when it names a floor or plate. Returns whether a jump started.
    pub fn on_contact_out(&mut self, surface: &str) -> bool {
        if !self.running || self.state == PlayerState::Death || self.death.is_some() {
            return false;
        }
        if !self.jump.try_launch(surface, &self.pose) {
            return false;
        }
        debug!("jump launched off {surface}");
        self.request(PlayerState::Jump);
        true
    }

    pub fn take_damage(&mut self) {
        if self.health == 0 {
            return;
        }
        self.health -= 1;
        self.health_changed();
        // Already dying: the outcome is decided when the sequence ends.
        if self.death.is_some() {
            return;
        }
        if self.health == 0 {
            self.request(PlayerState::Death);
        } else {
            self.request(PlayerState::Hit);
        }
    }

    pub fn heal(&mut self) {
        if self.health >= MAX_HEALTH {
            return;
        }
        self.health += 1;
        self.health_changed();
    }

    /// Instant death from a hazard. Costs one health point; the player
    /// respawns unless that was the last one. Ignored while already dying.
    pub fn die(&mut self) {
        if self.death.is_some() {
            return;
        }
        if self.health > 0 {
            self.health -= 1;
            self.health_changed();
        }
        self.request(PlayerState::Death);
    }

    pub fn enter_fight_mode(&mut self, target: Entity) {
        self.tracked_enemy = Some(target);
        if self.mode == MovementMode::Fight {
            return;
        }
        self.mode = MovementMode::Fight;
        self.mode_dirty = true;
        self.events.push(PlayerEvent::EnterFightMode);
        info!("entering fight mode against {target}");
    }

    pub fn exit_fight_mode(&mut self) {
        self.tracked_enemy = None;
        if self.mode == MovementMode::Normal {
            return;
        }
        self.mode = MovementMode::Normal;
        self.mode_dirty = true;
        self.events.push(PlayerEvent::ExitFightMode);
        info!("leaving fight mode");
    }

    /// Which gate, if any, currently blocks movement.
    pub fn movement_gate(&self) -> Option<MoveGate> {
        if self.animation.is_playing(Clip::Hit) || self.animation.is_playing(Clip::Death) {
            Some(MoveGate::HitOrDeathAnimation)
        } else if self.death.is_some() {
            Some(MoveGate::DeathSequence)
        } else if self.jump.is_active() {
            Some(MoveGate::Jump)
        } else if self.is_action_move {
            Some(MoveGate::ActionMove)
        } else {
            None
        }
    }

    /// Runs one frame: timed sequences, then movement, then the camera.
    /// Returns the gate that held movement back this tick, if any.
    pub fn tick(&mut self, ctx: &TickContext) -> Option<MoveGate> {
        if !self.running {
            return None;
        }
        self.update_sequences(ctx.dt);
        // A sequence may have ended the game.
        if !self.running {
            return None;
        }

        let gate = self.movement_gate();
        match gate {
            Some(_) => {
                if self.scheme == ControlScheme::MouseAndKeyboard {
                    self.recenter_pointer = true;
                }
            }
            None => match self.mode {
                MovementMode::Normal => self.update_normal_movement(ctx),
                MovementMode::Fight => self.update_fight_movement(ctx),
            },
        }

        if !self.jump.is_active() {
            settle_on_floor(&mut self.pose, ctx.floor_height, self.config.movement.max_fall_speed, ctx.dt);
        }
        self.update_camera(ctx);
        gate
    }

    /// Moves to `requested`, running its entry behaviour. `FightIdle` and
    /// `FightAttack` land on Idle and Action.
    pub fn request(&mut self, requested: PlayerState) {
        let previous = self.state;
        let entered = match requested {
            PlayerState::Idle | PlayerState::FightIdle => {
                let clip = match self.mode {
                    MovementMode::Normal => Clip::Idle,
                    MovementMode::Fight => Clip::FightIdle,
                };
                self.animation.loop_clip(clip, 1.0);
                true
            }
            PlayerState::Run => {
                self.animation.loop_clip(Clip::Run, self.config.movement.run_anim_rate * self.speed);
                true
            }
            PlayerState::RunReverse => {
                self.animation.loop_clip(Clip::Run, -self.config.movement.run_anim_rate * self.speed);
                true
            }
            PlayerState::FightLeft => {
                self.animation.loop_clip(Clip::FightLeft, self.config.movement.strafe_anim_rate * self.speed);
                true
            }
            PlayerState::FightRight => {
                self.animation.loop_clip(Clip::FightRight, self.config.movement.strafe_anim_rate * self.speed);
                true
            }
            PlayerState::Jump => {
                self.animation.play_once(Clip::Jump, 1.0);
                true
            }
            PlayerState::Hit => {
                self.animation.play_once(Clip::Hit, self.config.combat.hit_anim_rate);
                true
            }
            PlayerState::Death => {
                self.animation.play_once(Clip::Death, 1.0);
                let length = self.animation.length(Clip::Death).unwrap_or(0.0);
                self.death = Some(DeathSequence {
                    remaining: length + self.config.combat.death_wait,
                });
                true
            }
            PlayerState::Action | PlayerState::FightAttack => self.enter_action(),
        };
        if !entered {
            debug!("player stays {previous:?}, {requested:?} refused");
            return;
        }
        self.state = requested.canonical();
        self.set_footsteps(self.state.plays_footsteps());
        debug!("player state {previous:?} -> {:?}", self.state);
    }

    fn enter_action(&mut self) -> bool {
        let hurt = self.animation.is_playing(Clip::Hit) || self.animation.is_playing(Clip::Death);
        if hurt || self.death.is_some() {
            self.is_action_move = false;
            self.one_shots.arm(OneShot::Act);
            return false;
        }

        self.is_action_move = true;
        let rate = self.config.combat.action_anim_rate;
        let clip = match self.mode {
            MovementMode::Normal => Clip::Activate,
            MovementMode::Fight => Clip::FightAttack,
        };
        self.animation.play_once(clip, rate);
        let length = self.animation.length(clip).unwrap_or(0.0);
        self.action_remaining = Some(length / rate);

        match self.mode {
            MovementMode::Normal => self.events.push(PlayerEvent::PlayerActivate),
            MovementMode::Fight => {
                self.sound_cues.push(SoundCue::SpearAttack);
                self.strike();
            }
        }
        true
    }

    /// Rolls a hit for every enemy hit field inside the attack probe.
    fn strike(&mut self) {
        let tag = &self.config.combat.enemy_hit_field_tag;
        let chance = self.config.combat.enemy_hit_chance;
        let targets = self.attack_contacts.iter().filter(|name| name.contains(tag.as_str())).count();
        for _ in 0..targets {
            if self.rng.gen_bool(chance) {
                self.events.push(PlayerEvent::EnemyHit);
            }
        }
    }

    fn update_sequences(&mut self, dt: f32) {
        if let Some(clip) = self.animation.advance(dt) {
            debug!("clip {clip:?} finished");
        }

        if let Some(remaining) = self.action_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 1e-5 {
                self.finish_action();
            }
        }

        if let Some(death) = self.death.as_mut() {
            death.remaining -= dt;
            if death.remaining <= 1e-5 {
                self.finish_death();
            }
        }

        if self.jump.advance(dt, &mut self.pose) {
            debug!("jump landed at {:?}", self.pose.position);
        }
    }

    fn finish_action(&mut self) {
        self.action_remaining = None;
        self.is_action_move = false;
        self.one_shots.arm(OneShot::Act);
        // A hit or death that interrupted the action keeps its state.
        if self.state == PlayerState::Action {
            self.request(PlayerState::Idle);
        }
    }

    fn finish_death(&mut self) {
        self.death = None;
        let outcome = if self.health == 0 {
            DeathOutcome::GameOver
        } else {
            DeathOutcome::Respawn
        };
        match outcome {
            DeathOutcome::GameOver => {
                info!("game over");
                self.events.push(PlayerEvent::GameOver(GameOverReason::Loss));
                self.set_footsteps(false);
                self.stop();
            }
            DeathOutcome::Respawn => {
                self.pose.position = self.jump.respawn_point();
                self.camera.reset_behind(&self.pose);
                self.respawned = true;
                info!("player respawned at {:?}", self.pose.position);
                self.request(PlayerState::Idle);
            }
        }
    }

    fn update_normal_movement(&mut self, ctx: &TickContext) {
        let signals = self.input.signals();
        let movement = &self.config.movement;
        match self.scheme {
            ControlScheme::Gamepad => {
                if signals.is_moving() {
                    self.speed = signals.magnitude();
                    let camera_heading = self.camera.heading(&self.pose);
                    steer_gamepad(&mut self.pose, signals, camera_heading, self.speed, ctx.dt, movement);
                }
            }
            ControlScheme::MouseAndKeyboard => {
                let Some(pointer) = ctx.pointer else {
                    return;
                };
                let sensitivity = self.config.input.mouse_sensitivity;
                let lift = steer_pointer(&mut self.pose, pointer, sensitivity, ctx.dt, movement);
                self.camera.raise(lift);
                self.recenter_pointer = true;
                if signals.is_moving() {
                    strafe_keyboard(&mut self.pose, signals, ctx.dt, movement);
                }
                self.camera.center(&self.pose);
            }
        }

        let requested = if signals.is_moving() {
            PlayerState::Run
        } else {
            PlayerState::Idle
        };
        self.select_locomotion(requested);
    }

    fn update_fight_movement(&mut self, ctx: &TickContext) {
        let (Some(_), Some(enemy)) = (self.tracked_enemy, ctx.enemy_position) else {
            return;
        };
        let signals = self.input.signals();
        if self.scheme == ControlScheme::Gamepad && signals.is_moving() {
            self.speed = signals.magnitude();
        }
        self.pose.face_toward(enemy);
        let requested = fight_step(&mut self.pose, signals, self.speed, ctx.dt, &self.config.movement);
        self.select_locomotion(requested);
    }

    /// Requests a locomotion state when it differs from the current one, or
    /// keeps the running clip's rate in step with the speed.
    fn select_locomotion(&mut self, requested: PlayerState) {
        let mode_changed = std::mem::take(&mut self.mode_dirty);
        if mode_changed || self.state != requested {
            self.request(requested);
            return;
        }
        let movement = &self.config.movement;
        let rate = match requested {
            PlayerState::Run => movement.run_anim_rate * self.speed,
            PlayerState::RunReverse => -movement.run_anim_rate * self.speed,
            PlayerState::FightLeft | PlayerState::FightRight => movement.strafe_anim_rate * self.speed,
            _ => return,
        };
        let clip = match requested {
            PlayerState::FightLeft => Clip::FightLeft,
            PlayerState::FightRight => Clip::FightRight,
            _ => Clip::Run,
        };
        self.animation.set_rate(clip, rate);
    }

    fn update_camera(&mut self, ctx: &TickContext) {
        match self.mode {
            MovementMode::Normal => {
                let drift = self.scheme == ControlScheme::Gamepad;
                self.camera.update_normal(&self.pose, drift, ctx.dt);
            }
            MovementMode::Fight => {
                if self.tracked_enemy.is_some() && ctx.enemy_position.is_some() {
                    self.camera.update_fight(&self.pose);
                }
            }
        }
    }

    fn health_changed(&mut self) {
        info!("player health {}", self.health);
        self.events.push(PlayerEvent::HealthChanged(self.health));
    }

    fn set_footsteps(&mut self, on: bool) {
        if self.footsteps != on {
            self.footsteps = on;
            self.sound_cues.push(SoundCue::Footsteps(on));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.25;

    fn started() -> PlayerController {
        let mut controller = PlayerController::with_seed(ControllerConfig::default(), 7);
        controller.start(Pose::new(Vec3::new(0.0, 0.0, 0.0), 0.0));
        controller
    }

    fn still() -> TickContext {
        TickContext {
            dt: DT,
            pointer: Some(Vec2::ZERO),
            ..default()
        }
    }

    #[test]
    fn start_arms_every_trigger_and_idles() {
        let controller = started();
        assert!(controller.is_running());
        assert_eq!(controller.state(), PlayerState::Idle);
        assert_eq!(controller.health(), 3);
        assert!(OneShot::ALL.iter().all(|t| controller.is_armed(*t)));
    }

    #[test]
    fn damage_at_one_health_is_death_not_hit() {
        let mut controller = started();
        controller.take_damage();
        assert_eq!(controller.state(), PlayerState::Hit);
        controller.take_damage();
        controller.take_damage();
        assert_eq!(controller.state(), PlayerState::Death);
        assert_eq!(controller.health(), 0);
        controller.take_damage();
        assert_eq!(controller.health(), 0);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut controller = started();
        controller.heal();
        assert!(controller.drain_events().next().is_none());
        controller.take_damage();
        controller.heal();
        let events: Vec<_> = controller.drain_events().collect();
        assert_eq!(events, vec![PlayerEvent::HealthChanged(2), PlayerEvent::HealthChanged(3)]);
        assert_eq!(controller.state(), PlayerState::Hit);
    }

    #[test]
    fn action_is_refused_while_hit_plays() {
        let mut controller = started();
        controller.take_damage();
        controller.handle_input(RawInput::Pressed("e"));
        assert_eq!(controller.state(), PlayerState::Hit);
        assert!(!controller.is_action_move());
        assert!(controller.is_armed(OneShot::Act));
    }

    #[test]
    fn action_locks_movement_until_the_clip_ends() {
        let mut controller = started();
        controller.handle_input(RawInput::Pressed("e"));
        assert_eq!(controller.state(), PlayerState::Action);
        assert!(controller.is_action_move());
        assert!(!controller.is_armed(OneShot::Act));
        assert!(controller.drain_events().any(|e| e == PlayerEvent::PlayerActivate));

        // Activate is 1.5 s at rate 3.
        assert_eq!(controller.tick(&still()), Some(MoveGate::ActionMove));
        controller.tick(&still());
        assert!(!controller.is_action_move());
        assert!(controller.is_armed(OneShot::Act));
        assert_eq!(controller.state(), PlayerState::Idle);
    }

    #[test]
    fn fight_attack_rolls_against_hit_fields_only() {
        let mut config = ControllerConfig::default();
        config.combat.enemy_hit_chance = 1.0;
        let mut controller = PlayerController::with_seed(config, 1);
        controller.start(Pose::default());
        controller.enter_fight_mode(Entity::from_raw(42));
        controller.drain_events().for_each(drop);

        controller.set_attack_contacts(["DummyHitField".to_string(), "floor".to_string()]);
        controller.handle_input(RawInput::Button(0));
        assert_eq!(controller.state(), PlayerState::Action);
        assert_eq!(controller.animation().cue().map(|c| c.clip), Some(Clip::FightAttack));
        let events: Vec<_> = controller.drain_events().collect();
        assert_eq!(events, vec![PlayerEvent::EnemyHit]);
        assert!(controller.drain_sound_cues().any(|c| c == SoundCue::SpearAttack));
    }

    #[test]
    fn keyboard_input_runs_and_release_idles() {
        let mut controller = started();
        controller.handle_input(RawInput::Pressed("w"));
        controller.tick(&still());
        assert_eq!(controller.state(), PlayerState::Run);
        assert!(controller.footsteps_playing());
        assert!(controller.pose().position.z < 0.0);

        controller.handle_input(RawInput::Released("w"));
        controller.tick(&still());
        assert_eq!(controller.state(), PlayerState::Idle);
        assert!(!controller.footsteps_playing());
    }

    #[test]
    fn pointer_outside_window_skips_movement() {
        let mut controller = started();
        controller.handle_input(RawInput::Pressed("w"));
        controller.tick(&TickContext { dt: DT, ..default() });
        assert_eq!(controller.state(), PlayerState::Idle);
        assert_eq!(controller.pose().position, Vec3::ZERO);
    }

    #[test]
    fn zoom_triggers_rearm_themselves() {
        let mut controller = started();
        let before = controller.camera().planar_distance(controller.pose());
        controller.handle_input(RawInput::Pressed("+"));
        assert!(controller.is_armed(OneShot::ZoomIn));
        assert!(controller.camera().planar_distance(controller.pose()) < before);
    }

    #[test]
    fn stopped_controller_ignores_input_and_ticks() {
        let mut controller = started();
        controller.stop();
        controller.stop();
        assert!(!OneShot::ALL.iter().any(|t| controller.is_armed(*t)));
        controller.handle_input(RawInput::Pressed("w"));
        assert_eq!(controller.tick(&still()), None);
        assert_eq!(controller.pose().position, Vec3::ZERO);
    }

    #[test]
    fn fight_mode_switches_idle_clip_on_next_tick() {
        let mut controller = started();
        controller.enter_fight_mode(Entity::from_raw(3));
        assert_eq!(controller.state(), PlayerState::Idle);
        controller.tick(&TickContext {
            enemy_position: Some(Vec3::new(0.0, 0.0, -5.0)),
            ..still()
        });
        assert_eq!(controller.animation().cue().map(|c| c.clip), Some(Clip::FightIdle));

        controller.exit_fight_mode();
        controller.exit_fight_mode();
        let events: Vec<_> = controller.drain_events().collect();
        assert_eq!(events, vec![PlayerEvent::EnterFightMode, PlayerEvent::ExitFightMode]);
    }

    #[test]
    fn hazard_death_respawns_at_start_marker() {
        let mut controller = started();
        controller.handle_input(RawInput::Pressed("w"));
        for _ in 0..4 {
            controller.tick(&still());
        }
        controller.handle_input(RawInput::Released("w"));
        assert!(controller.pose().position.z < -1.0);

        controller.die();
        assert_eq!(controller.state(), PlayerState::Death);
        // Death clip (2 s) plus the wait (2 s).
        for _ in 0..15 {
            assert!(controller.tick(&still()).is_some());
        }
        controller.tick(&still());
        assert_eq!(controller.state(), PlayerState::Idle);
        assert_eq!(controller.pose().position, Vec3::ZERO);
        assert_eq!(controller.health(), 2);
        assert!(controller.take_respawn());
        assert!(!controller.take_respawn());
    }

    #[test]
    fn strafe_right_after_engaging_keeps_its_clip_running() {
        let mut controller = started();
        let ctx = TickContext {
            enemy_position: Some(Vec3::new(0.0, 0.0, -5.0)),
            ..still()
        };
        controller.enter_fight_mode(Entity::from_raw(3));
        controller.handle_input(RawInput::Pressed("d"));
        controller.tick(&ctx);
        assert_eq!(controller.state(), PlayerState::FightRight);

        let generation = controller.animation().generation();
        controller.tick(&ctx);
        controller.tick(&ctx);
        assert_eq!(controller.animation().generation(), generation);
    }

    #[test]
    fn stop_lands_jump_and_is_idempotent() {
        let mut controller = started();
        assert!(controller.on_contact_out("Floor_01"));
        controller.tick(&still());
        controller.stop();
        controller.stop();
        assert!(!controller.jump().is_active());
        assert!((controller.pose().position - Vec3::new(0.0, -0.1, -3.2)).length() < 1e-4);
        assert!(!controller.footsteps_playing());
    }

    #[test]
    fn cleanup_releases_the_session() {
        let mut controller = started();
        controller.enter_fight_mode(Entity::from_raw(5));
        controller.handle_input(RawInput::Pressed("d"));
        controller.tick(&TickContext {
            enemy_position: Some(Vec3::new(0.0, 0.0, -5.0)),
            ..still()
        });
        assert!(controller.footsteps_playing());

        controller.cleanup();
        controller.cleanup();
        assert!(!controller.is_running());
        assert_eq!(controller.tracked_enemy(), None);
        assert!(controller.drain_events().next().is_none());
        assert_eq!(controller.drain_sound_cues().last(), Some(SoundCue::Footsteps(false)));
    }
}
