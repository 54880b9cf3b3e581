//! Per-device state stores.
//!
//! Each store is created empty when its device is constructed, is sized once from the
//! capability descriptor, and is overwritten in place on every accepted event or poll.
//! Consumers read it whenever they like; between updates it simply holds the last good values
//! (including while a device is not acquired).

use crate::caps::{Axis, JoystickCaps};
use crate::keys::{Key, KeyState, Modifiers, MODIFIER_KEYS};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a keyboard does to its key table when its window loses focus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyResetMode {
    /// Keep whatever was held.
    None,
    /// Release every key.
    #[default]
    ResetAll,
    /// Release Shift/Control/Alt only.
    ResetModifiers,
}

/// Keyboard key table. Keys never seen read as [`KeyState::Up`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KeyStates {
    keys: HashMap<Key, KeyState>,
}

impl KeyStates {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: Key) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    #[inline]
    pub fn is_down(&self, key: Key) -> bool {
        self.get(key).is_down()
    }

    #[inline]
    pub fn set(&mut self, key: Key, state: KeyState) {
        self.keys.insert(key, state);
    }

    /// Keys currently held, in virtual-key order.
    pub fn pressed(&self) -> Vec<Key> {
        let mut out: Vec<Key> = self
            .keys
            .iter()
            .filter(|(_, s)| s.is_down())
            .map(|(&k, _)| k)
            .collect();
        out.sort();
        out
    }

    pub fn reset(&mut self, mode: KeyResetMode) {
        match mode {
            KeyResetMode::None => {}
            KeyResetMode::ResetAll => {
                for state in self.keys.values_mut() {
                    *state = KeyState::Up;
                }
            }
            KeyResetMode::ResetModifiers => {
                for key in MODIFIER_KEYS {
                    if let Some(state) = self.keys.get_mut(&key) {
                        *state = KeyState::Up;
                    }
                }
            }
        }
    }

    /// Side-resolved modifier summary. A side counts only while its generic parent is down.
    pub fn modifiers(&self) -> Modifiers {
        let mut out = Modifiers::empty();
        let table = [
            (Key::ShiftKey, Key::LShiftKey, Modifiers::LSHIFT, Key::RShiftKey, Modifiers::RSHIFT),
            (Key::ControlKey, Key::LControlKey, Modifiers::LCONTROL, Key::RControlKey, Modifiers::RCONTROL),
            (Key::Menu, Key::LMenu, Modifiers::LALT, Key::RMenu, Modifiers::RALT),
        ];
        for (generic, left, lflag, right, rflag) in table {
            if !self.is_down(generic) {
                continue;
            }
            if self.is_down(left) {
                out |= lflag;
            }
            if self.is_down(right) {
                out |= rflag;
            }
        }
        out
    }
}

bitflags! {
    /// Direction summary for a joystick axis or POV hat.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Direction: u16 {
        const CENTER = 0x0001;
        const UP = 0x0002;
        const DOWN = 0x0004;
        const LEFT = 0x0008;
        const RIGHT = 0x0010;
        const LESS_THAN_CENTER = 0x0020;
        const MORE_THAN_CENTER = 0x0040;
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::CENTER
    }
}

/// Joystick snapshot, sized from [`JoystickCaps`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JoystickState {
    /// One value per probed axis, in capability order.
    pub axes: Vec<i32>,
    pub axis_directions: Vec<Direction>,
    /// Raw hundredths of a degree, or `-1` for centered.
    pub pov: Vec<i32>,
    pub pov_direction: Vec<Direction>,
    pub buttons: Vec<KeyState>,
}

impl JoystickState {
    pub fn new(caps: &JoystickCaps) -> Self {
        let axes = caps.axis_count();
        let povs = caps.pov_count as usize;
        Self {
            axes: vec![0; axes],
            axis_directions: vec![Direction::CENTER; axes],
            pov: vec![-1; povs],
            pov_direction: vec![Direction::CENTER; povs],
            buttons: vec![KeyState::Up; caps.button_count as usize],
        }
    }

    /// Value of a named axis; `0` for axes the device lacks.
    pub fn axis(&self, caps: &JoystickCaps, axis: Axis) -> i32 {
        caps.axis_index(axis)
            .and_then(|i| self.axes.get(i).copied())
            .unwrap_or(0)
    }

    pub fn direction(&self, caps: &JoystickCaps, axis: Axis) -> Direction {
        caps.axis_index(axis)
            .and_then(|i| self.axis_directions.get(i).copied())
            .unwrap_or(Direction::CENTER)
    }

    #[inline]
    pub fn button(&self, index: usize) -> KeyState {
        self.buttons.get(index).copied().unwrap_or_default()
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MouseButtons: u8 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const MIDDLE = 0x04;
        const BUTTON4 = 0x08;
        const BUTTON5 = 0x10;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Inclusive rectangle used to constrain the pointer position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MouseState {
    pub position: Point,
    /// Offset applied by the last movement (after constraints).
    pub relative: Point,
    pub wheel: i32,
    pub wheel_delta: i32,
    pub buttons: MouseButtons,
    /// Last absolute sample, used to derive `relative` for absolute devices.
    #[serde(skip)]
    pub last_absolute: Option<Point>,
}

/// Generic HID snapshot; the payload is replaced wholesale by every report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HidState {
    pub payload: Vec<u8>,
}
