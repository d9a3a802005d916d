//! Compiled defaults for every tunable of the player controller.
//!
//! [`crate::config::ControllerConfig::default`] reads from here; the values in
//! `assets/controller.toml` override them at startup.

// ── Health ───────────────────────────────────────────────────────────────────
pub const MAX_HEALTH: u8 = 3;

// ── Camera ───────────────────────────────────────────────────────────────────
pub const MIN_CAM_DISTANCE: f32 = 1.2;
pub const MAX_CAM_DISTANCE: f32 = 4.0;
pub const MIN_CAM_HEIGHT: f32 = 1.5;
pub const MAX_CAM_HEIGHT: f32 = 3.0;
pub const FIGHT_CAM_DISTANCE: f32 = 3.0;
pub const FIGHT_CAM_HEIGHT: f32 = 0.5;
/// Height of the look-at floater above the player origin.
pub const CAM_FLOATER_HEIGHT: f32 = 1.5;
/// Units per second the camera height drifts back toward its resting offset.
pub const CAM_HEIGHT_DRIFT_RATE: f32 = 5.0;
pub const CAM_ZOOM_STEP: f32 = 0.5;
/// Zooming never brings the camera closer than this to either distance bound.
pub const CAM_ZOOM_MARGIN: f32 = 0.5;

// ── Movement ─────────────────────────────────────────────────────────────────
pub const MOVE_SPEED: f32 = 2.0;
pub const MOUSE_SPEED_X: f32 = 15.0;
pub const MOUSE_SPEED_Y: f32 = 0.2;
pub const RUN_ANIM_RATE: f32 = 3.0;
pub const STRAFE_ANIM_RATE: f32 = 2.0;
/// Falling speed cap applied when settling onto the floor.
pub const MAX_FALL_SPEED: f32 = 5.0;
pub const GAMEPAD_DEADZONE: f32 = 0.1;

// ── Jump ─────────────────────────────────────────────────────────────────────
pub const JUMP_DURATION: f32 = 1.5;
pub const JUMP_GRAVITY_MULT: f32 = 0.25;
pub const GRAVITY: f32 = 9.81;
pub const JUMP_DISTANCE: f32 = 3.2;
pub const JUMP_DROP: f32 = 0.1;
/// The respawn marker is dropped this far behind the player on take-off.
pub const JUMP_RESPAWN_BACKOFF: f32 = 0.5;

// ── Combat ───────────────────────────────────────────────────────────────────
pub const ACTION_ANIM_RATE: f32 = 3.0;
pub const HIT_ANIM_RATE: f32 = 4.0;
pub const ENEMY_HIT_CHANCE: f64 = 0.85;
pub const ENEMY_HIT_FIELD_TAG: &str = "HitField";
/// Seconds the death pose is held before game over or respawn.
pub const DEATH_WAIT: f32 = 2.0;

// ── Clip lengths (seconds at playback rate 1) ────────────────────────────────
pub const CLIP_ACTIVATE_LENGTH: f32 = 1.5;
pub const CLIP_FIGHT_ATTACK_LENGTH: f32 = 1.5;
pub const CLIP_HIT_LENGTH: f32 = 1.0;
pub const CLIP_DEATH_LENGTH: f32 = 2.0;
pub const CLIP_JUMP_LENGTH: f32 = 1.5;

// ── Probes ───────────────────────────────────────────────────────────────────
pub const FLOOR_PROBE_HEIGHT: f32 = 0.5;
pub const FLOOR_PROBE_LENGTH: f32 = 10.0;
pub const LEDGE_PROBE_AHEAD: f32 = 0.2;
pub const LEDGE_PROBE_HEIGHT: f32 = 0.5;
pub const LEDGE_PROBE_LENGTH: f32 = 2.5;
pub const ATTACK_PROBE_HEIGHT: f32 = 1.0;
pub const ATTACK_PROBE_REACH: f32 = 1.3;
