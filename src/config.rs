//! Runtime controller configuration loaded from `assets/controller.toml`.
//!
//! [`ControllerConfig`] is a Bevy [`Resource`] whose defaults come from
//! [`crate::constants`]. At startup [`load_controller_config`] reads the TOML
//! file and replaces the defaults with whatever it contains; missing keys keep
//! their compiled value, so a file may override a single camera bound and
//! nothing else.

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::character_controller::input::ControlScheme;
use crate::constants::*;
use crate::error::{ConfigError, ConfigResult};

pub const CONFIG_PATH: &str = "assets/controller.toml";

#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub camera: CameraConfig,
    pub movement: MovementConfig,
    pub jump: JumpConfig,
    pub combat: CombatConfig,
    pub clips: ClipLengths,
    pub input: InputConfig,
    pub assets: AssetConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub fight_distance: f32,
    pub fight_height: f32,
    pub floater_height: f32,
    pub drift_rate: f32,
    pub zoom_step: f32,
    pub zoom_margin: f32,
}

impl CameraConfig {
    /// Resting height offset, halfway between the height bounds.
    pub fn height_avg(&self) -> f32 {
        (self.max_height - self.min_height) / 2.0 + self.min_height
    }

    /// Distance the camera starts at, halfway between the distance bounds.
    pub fn initial_distance(&self) -> f32 {
        (self.max_distance - self.min_distance) / 2.0 + self.min_distance
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_distance: MIN_CAM_DISTANCE,
            max_distance: MAX_CAM_DISTANCE,
            min_height: MIN_CAM_HEIGHT,
            max_height: MAX_CAM_HEIGHT,
            fight_distance: FIGHT_CAM_DISTANCE,
            fight_height: FIGHT_CAM_HEIGHT,
            floater_height: CAM_FLOATER_HEIGHT,
            drift_rate: CAM_HEIGHT_DRIFT_RATE,
            zoom_step: CAM_ZOOM_STEP,
            zoom_margin: CAM_ZOOM_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub move_speed: f32,
    pub mouse_speed_x: f32,
    pub mouse_speed_y: f32,
    pub run_anim_rate: f32,
    pub strafe_anim_rate: f32,
    pub max_fall_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            mouse_speed_x: MOUSE_SPEED_X,
            mouse_speed_y: MOUSE_SPEED_Y,
            run_anim_rate: RUN_ANIM_RATE,
            strafe_anim_rate: STRAFE_ANIM_RATE,
            max_fall_speed: MAX_FALL_SPEED,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub duration: f32,
    pub gravity_mult: f32,
    pub gravity: f32,
    pub distance: f32,
    pub drop: f32,
    pub respawn_backoff: f32,
    /// Substrings a contacted surface name must contain to launch a jump,
    /// compared case-insensitively.
    pub surface_tags: Vec<String>,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            duration: JUMP_DURATION,
            gravity_mult: JUMP_GRAVITY_MULT,
            gravity: GRAVITY,
            distance: JUMP_DISTANCE,
            drop: JUMP_DROP,
            respawn_backoff: JUMP_RESPAWN_BACKOFF,
            surface_tags: vec!["floor".to_string(), "plate".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub action_anim_rate: f32,
    pub hit_anim_rate: f32,
    pub enemy_hit_chance: f64,
    pub enemy_hit_field_tag: String,
    pub death_wait: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            action_anim_rate: ACTION_ANIM_RATE,
            hit_anim_rate: HIT_ANIM_RATE,
            enemy_hit_chance: ENEMY_HIT_CHANCE,
            enemy_hit_field_tag: ENEMY_HIT_FIELD_TAG.to_string(),
            death_wait: DEATH_WAIT,
        }
    }
}

/// Lengths of the one-shot clips, in seconds at playback rate 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClipLengths {
    pub activate: f32,
    pub fight_attack: f32,
    pub hit: f32,
    pub death: f32,
    pub jump: f32,
}

impl Default for ClipLengths {
    fn default() -> Self {
        Self {
            activate: CLIP_ACTIVATE_LENGTH,
            fight_attack: CLIP_FIGHT_ATTACK_LENGTH,
            hit: CLIP_HIT_LENGTH,
            death: CLIP_DEATH_LENGTH,
            jump: CLIP_JUMP_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub control_scheme: ControlScheme,
    pub mouse_sensitivity: f32,
    pub gamepad_deadzone: f32,
    pub keys: KeyBindings,
    pub gamepad: GamepadBindings,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            control_scheme: ControlScheme::MouseAndKeyboard,
            mouse_sensitivity: 1.0,
            gamepad_deadzone: GAMEPAD_DEADZONE,
            keys: KeyBindings::default(),
            gamepad: GamepadBindings::default(),
        }
    }
}

/// Raw key names bound to each logical signal. Any number of names may share
/// one signal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub center: Vec<String>,
    pub zoom_in: Vec<String>,
    pub zoom_out: Vec<String>,
    pub act: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: names(&["arrow_left", "a"]),
            right: names(&["arrow_right", "d"]),
            forward: names(&["arrow_up", "w"]),
            backward: names(&["arrow_down", "s"]),
            center: names(&["centerCam", "home", "q"]),
            zoom_in: names(&["zoomIn", "+", "wheel_up"]),
            zoom_out: names(&["zoomOut", "-", "wheel_down"]),
            act: names(&["doAction", "enter", "e"]),
        }
    }
}

/// Gamepad button and axis indices bound to the logical signals.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GamepadBindings {
    pub act: u8,
    pub center: u8,
    pub zoom_in: u8,
    pub zoom_out: u8,
    pub escape: u8,
    pub horizontal_axis: u8,
    pub vertical_axis: u8,
}

impl Default for GamepadBindings {
    fn default() -> Self {
        Self {
            act: 0,
            center: 5,
            zoom_in: 6,
            zoom_out: 4,
            escape: 9,
            horizontal_axis: 0,
            vertical_axis: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub character_model: String,
    pub footstep_sound: String,
    pub spear_attack_sound: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            character_model: "models/animated/Character.glb".to_string(),
            footstep_sound: "sounds/footstep.ogg".to_string(),
            spear_attack_sound: "sounds/spear_attack.ogg".to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> ConfigResult<Self> {
        let config: ControllerConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Checks the invariants the controller relies on: ordered bounds, a zoom
    /// window that leaves room to move, positive durations and a probability.
    pub fn validate(&self) -> ConfigResult<()> {
        let camera = &self.camera;
        ordered("camera.min_distance", camera.min_distance, camera.max_distance)?;
        ordered("camera.min_height", camera.min_height, camera.max_height)?;
        if camera.min_distance + camera.zoom_margin > camera.max_distance - camera.zoom_margin {
            return Err(ConfigError::InvalidValue {
                name: "camera.zoom_margin",
                value: camera.zoom_margin as f64,
                expected: "a margin that leaves room between the distance bounds",
            });
        }
        positive("jump.duration", self.jump.duration)?;
        positive("combat.action_anim_rate", self.combat.action_anim_rate)?;
        positive("combat.hit_anim_rate", self.combat.hit_anim_rate)?;
        positive("clips.activate", self.clips.activate)?;
        positive("clips.fight_attack", self.clips.fight_attack)?;
        positive("clips.hit", self.clips.hit)?;
        positive("clips.death", self.clips.death)?;
        positive("clips.jump", self.clips.jump)?;
        let chance = self.combat.enemy_hit_chance;
        if !(0.0..=1.0).contains(&chance) {
            return Err(ConfigError::InvalidValue {
                name: "combat.enemy_hit_chance",
                value: chance,
                expected: "a probability in [0, 1]",
            });
        }
        Ok(())
    }
}

fn ordered(name: &'static str, min: f32, max: f32) -> ConfigResult<()> {
    if min < 0.0 || min >= max {
        return Err(ConfigError::InvalidValue {
            name,
            value: min as f64,
            expected: "a non-negative lower bound below the upper bound",
        });
    }
    Ok(())
}

fn positive(name: &'static str, value: f32) -> ConfigResult<()> {
    if value <= 0.0 {
        return Err(ConfigError::InvalidValue {
            name,
            value: value as f64,
            expected: "a value greater than zero",
        });
    }
    Ok(())
}

/// Startup system: replace the [`ControllerConfig`] resource with the contents
/// of [`CONFIG_PATH`]. A missing file keeps the defaults silently; a broken one
/// is logged and also keeps the defaults.
pub fn load_controller_config(mut config: ResMut<ControllerConfig>) {
    match ControllerConfig::load(CONFIG_PATH) {
        Ok(loaded) => {
            *config = loaded;
            info!("Loaded controller config from {CONFIG_PATH}");
        }
        Err(err) if err.is_missing_file() => {
            info!("No {CONFIG_PATH} found; using compiled defaults");
        }
        Err(err) => {
            warn!("{err}; using compiled defaults");
        }
    }
}
