//! Device-independent input signals.
//!
//! Raw events arrive as [`RawInput`] (key edges by name, gamepad axes and
//! buttons by index) and are folded into [`InputState`]: a persistent
//! horizontal/vertical axis pair plus [`OneShot`] triggers. Axis signs follow
//! the character: horizontal `+1` is left, vertical `-1` is forward.

use std::collections::HashMap;

use serde::Deserialize;

use crate::config::{GamepadBindings, InputConfig, KeyBindings};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlScheme {
    /// Mouse turns the character, keys translate it along its local axes.
    #[default]
    MouseAndKeyboard,
    /// The stick direction, relative to the camera, becomes the heading.
    Gamepad,
}

/// Triggers that are consumed once and must be re-armed for the next press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OneShot {
    Center,
    ZoomIn,
    ZoomOut,
    Act,
}

impl OneShot {
    pub const ALL: [OneShot; 4] = [OneShot::Center, OneShot::ZoomIn, OneShot::ZoomOut, OneShot::Act];
}

/// A raw event from the windowing or gamepad backend.
///
/// Axis values use the device convention: `+x` right, `+y` down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawInput<'a> {
    Pressed(&'a str),
    Released(&'a str),
    Axis { index: u8, value: f32 },
    Button(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSignals {
    pub horizontal: f32,
    pub vertical: f32,
}

impl InputSignals {
    pub fn is_moving(&self) -> bool {
        self.horizontal != 0.0 || self.vertical != 0.0
    }

    /// Gamepad speed scalar: the larger of the two axis magnitudes.
    pub fn magnitude(&self) -> f32 {
        self.horizontal.abs().max(self.vertical.abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone)]
pub struct InputState {
    signals: InputSignals,
    keys: KeyBindings,
    gamepad: GamepadBindings,
    deadzone: f32,
}

impl InputState {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            signals: InputSignals::default(),
            keys: config.keys.clone(),
            gamepad: config.gamepad.clone(),
            deadzone: config.gamepad_deadzone,
        }
    }

    pub fn signals(&self) -> InputSignals {
        self.signals
    }

    pub fn clear(&mut self) {
        self.signals = InputSignals::default();
    }

    /// Folds one raw event into the axis state. Returns the one-shot it maps
    /// to, if any; whether that trigger is armed is not this type's concern.
    pub fn apply(&mut self, raw: RawInput<'_>) -> Option<OneShot> {
        match raw {
            RawInput::Pressed(name) => {
                if let Some((axis, value)) = self.key_axis(name) {
                    self.set_axis(axis, value);
                    return None;
                }
                self.key_one_shot(name)
            }
            RawInput::Released(name) => {
                // Releasing either key of a pair zeroes the axis, even if the
                // opposite key is still held.
                if let Some((axis, _)) = self.key_axis(name) {
                    self.set_axis(axis, 0.0);
                }
                None
            }
            RawInput::Axis { index, value } => {
                let value = if value.abs() < self.deadzone { 0.0 } else { value.clamp(-1.0, 1.0) };
                if index == self.gamepad.horizontal_axis {
                    self.set_axis(Axis::Horizontal, -value);
                } else if index == self.gamepad.vertical_axis {
                    self.set_axis(Axis::Vertical, value);
                }
                None
            }
            RawInput::Button(index) => self.button_one_shot(index),
        }
    }

    fn set_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Horizontal => self.signals.horizontal = value,
            Axis::Vertical => self.signals.vertical = value,
        }
    }

    fn key_axis(&self, name: &str) -> Option<(Axis, f32)> {
        let bound = |list: &[String]| list.iter().any(|key| key == name);
        if bound(&self.keys.left) {
            Some((Axis::Horizontal, 1.0))
        } else if bound(&self.keys.right) {
            Some((Axis::Horizontal, -1.0))
        } else if bound(&self.keys.forward) {
            Some((Axis::Vertical, -1.0))
        } else if bound(&self.keys.backward) {
            Some((Axis::Vertical, 1.0))
        } else {
            None
        }
    }

    fn key_one_shot(&self, name: &str) -> Option<OneShot> {
        let bound = |list: &[String]| list.iter().any(|key| key == name);
        if bound(&self.keys.center) {
            Some(OneShot::Center)
        } else if bound(&self.keys.zoom_in) {
            Some(OneShot::ZoomIn)
        } else if bound(&self.keys.zoom_out) {
            Some(OneShot::ZoomOut)
        } else if bound(&self.keys.act) {
            Some(OneShot::Act)
        } else {
            None
        }
    }

    fn button_one_shot(&self, index: u8) -> Option<OneShot> {
        let pad = &self.gamepad;
        if index == pad.act {
            Some(OneShot::Act)
        } else if index == pad.center {
            Some(OneShot::Center)
        } else if index == pad.zoom_in {
            Some(OneShot::ZoomIn)
        } else if index == pad.zoom_out {
            Some(OneShot::ZoomOut)
        } else {
            None
        }
    }
}

/// Identifies one arming of a one-shot trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u32);

/// Which one-shot triggers currently have a handler waiting.
///
/// Firing a trigger takes its subscription; the handler re-arms it when it is
/// ready for the next press.
#[derive(Debug, Clone, Default)]
pub struct OneShotRegistry {
    armed: HashMap<OneShot, SubscriptionToken>,
    next_token: u32,
}

impl OneShotRegistry {
    pub fn arm(&mut self, trigger: OneShot) -> SubscriptionToken {
        let token = SubscriptionToken(self.next_token);
        self.next_token = self.next_token.wrapping_add(1);
        self.armed.insert(trigger, token);
        token
    }

    pub fn arm_all(&mut self) {
        for trigger in OneShot::ALL {
            self.arm(trigger);
        }
    }

    /// Consumes the subscription for `trigger`, if one is armed.
    pub fn take(&mut self, trigger: OneShot) -> Option<SubscriptionToken> {
        self.armed.remove(&trigger)
    }

    pub fn is_armed(&self, trigger: OneShot) -> bool {
        self.armed.contains_key(&trigger)
    }

    /// Drops every subscription; returns how many were armed.
    pub fn disarm_all(&mut self) -> usize {
        let count = self.armed.len();
        self.armed.clear();
        count
    }
}
