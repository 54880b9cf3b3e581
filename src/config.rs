//! TOML configuration.
//!
//! Every field has a default, so an empty document is valid. Unknown keys are rejected.
//!
//! ```toml
//! [keyboard]
//! exclusive = true
//! reset_mode = "reset_modifiers"
//!
//! [mouse.constraints]
//! position = { x = 0, y = 0, width = 1920, height = 1080 }
//! wheel = { min = -1200, max = 1200 }
//!
//! [joystick.dead_zones]
//! rudder = { threshold = 512 }
//! v = { threshold = 256, center = 0 }
//! ```

use crate::error::Result;
use crate::normalize::{DeadZones, MouseConstraints};
use crate::state::KeyResetMode;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Binding defaults applied to newly added devices of one family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingDefaults {
    pub exclusive: bool,
    pub allow_background: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyboardConfig {
    pub exclusive: bool,
    pub allow_background: bool,
    pub reset_mode: KeyResetMode,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MouseConfig {
    pub exclusive: bool,
    pub allow_background: bool,
    pub constraints: MouseConstraints,
}

/// Joysticks are always exclusive, so only background delivery is configurable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JoystickConfig {
    pub allow_background: bool,
    pub dead_zones: DeadZones,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub keyboard: KeyboardConfig,
    pub mouse: MouseConfig,
    pub joystick: JoystickConfig,
    pub hid: BindingDefaults,
}

impl InputConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
