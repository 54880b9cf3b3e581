//! Device entity.
//!
//! Every device is an [`InputDevice`]: identity, diagnostic metadata, a [`Binding`] and a
//! [`DeviceKind`] variant holding that family's capability descriptor and state store. The
//! dispatcher routes payloads by variant instead of through per-class overrides:
//!
//! | variant    | payload                    | normalizer                        |
//! |------------|----------------------------|-----------------------------------|
//! | `Keyboard` | [`RawPayload::Keyboard`]   | [`normalize::keyboard`]           |
//! | `Mouse`    | [`RawPayload::Mouse`]      | [`normalize::mouse`]              |
//! | `Hid`      | [`RawPayload::Hid`]        | payload replaced wholesale        |
//! | `Joystick` | polled [`RawJoystickSample`] | [`normalize::joystick`]         |

use crate::binding::Binding;
use crate::caps::{HidCaps, JoystickCaps};
use crate::event::InputKind;
use crate::metadata::DeviceMeta;
use crate::normalize::{self, DeadZones, MouseConstraints};
use crate::platform::{DeviceFamily, HidUsage, RawHandle, RawJoystickSample, RawPayload};
use crate::state::{HidState, JoystickState, KeyResetMode, KeyStates, MouseState};
use serde::{Serialize, Serializer};
use std::fmt;

/// Stable identity of a device for its physical lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceId {
    /// Raw-input device handle (keyboard, mouse, generic HID).
    Raw(RawHandle),
    /// Legacy joystick slot.
    Joystick(u32),
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceId::Raw(handle) => write!(f, "raw:{handle}"),
            DeviceId::Joystick(slot) => write!(f, "joy:{slot}"),
        }
    }
}

impl Serialize for DeviceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct KeyboardDevice {
    pub keys: KeyStates,
    pub reset_mode: KeyResetMode,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MouseDevice {
    pub state: MouseState,
    pub constraints: MouseConstraints,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JoystickDevice {
    pub caps: JoystickCaps,
    pub state: JoystickState,
    pub dead_zones: DeadZones,
    /// Result of the last connectivity probe.
    pub connected: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HidDevice {
    pub caps: HidCaps,
    pub state: HidState,
}

/// Per-family descriptor and state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum DeviceKind {
    Keyboard(KeyboardDevice),
    Mouse(MouseDevice),
    Joystick(JoystickDevice),
    Hid(HidDevice),
}

impl DeviceKind {
    pub fn family(&self) -> DeviceFamily {
        match self {
            DeviceKind::Keyboard(_) => DeviceFamily::Keyboard,
            DeviceKind::Mouse(_) => DeviceFamily::Mouse,
            DeviceKind::Joystick(_) => DeviceFamily::Joystick,
            DeviceKind::Hid(_) => DeviceFamily::Hid,
        }
    }
}

/// One discovered device.
#[derive(Debug)]
pub struct InputDevice {
    pub(crate) id: DeviceId,
    pub(crate) name: String,
    pub(crate) meta: DeviceMeta,
    pub(crate) binding: Binding,
    pub(crate) kind: DeviceKind,
}

impl InputDevice {
    pub(crate) fn new(id: DeviceId, name: impl Into<String>, meta: DeviceMeta, binding: Binding, kind: DeviceKind) -> Self {
        Self {
            id,
            name: name.into(),
            meta,
            binding,
            kind,
        }
    }

    #[inline]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &DeviceMeta {
        &self.meta
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn kind(&self) -> &DeviceKind {
        &self.kind
    }

    #[inline]
    pub fn family(&self) -> DeviceFamily {
        self.kind.family()
    }

    /// Raw-input usage the device registers under. Joysticks use the polled API and have none.
    pub fn usage(&self) -> Option<HidUsage> {
        match &self.kind {
            DeviceKind::Keyboard(_) => Some(HidUsage::KEYBOARD),
            DeviceKind::Mouse(_) => Some(HidUsage::MOUSE),
            DeviceKind::Hid(hid) => Some(HidUsage {
                page: hid.caps.usage_page,
                usage: hid.caps.usage,
            }),
            DeviceKind::Joystick(_) => None,
        }
    }

    /// Apply an admitted raw payload and return the edges it produced.
    ///
    /// A payload of the wrong family for this device is ignored.
    pub(crate) fn apply_payload(&mut self, payload: &RawPayload) -> Vec<InputKind> {
        match (&mut self.kind, payload) {
            (DeviceKind::Keyboard(kb), RawPayload::Keyboard(raw)) => {
                let Some(unified) = normalize::keyboard::unify(raw) else {
                    tracing::trace!(device = %self.id, vkey = raw.vkey, "unmapped virtual key");
                    return Vec::new();
                };
                normalize::keyboard::apply(&mut kb.keys, &unified);
                let modifiers = kb.keys.modifiers();
                let edge = if unified.state.is_down() {
                    InputKind::KeyDown {
                        key: unified.key,
                        scan_code: unified.scan_code,
                        modifiers,
                    }
                } else {
                    InputKind::KeyUp {
                        key: unified.key,
                        scan_code: unified.scan_code,
                        modifiers,
                    }
                };
                vec![edge]
            }
            (DeviceKind::Mouse(mouse), RawPayload::Mouse(raw)) => {
                normalize::mouse::apply(raw, &mut mouse.state, &mouse.constraints)
            }
            (DeviceKind::Hid(hid), RawPayload::Hid(bytes)) => {
                hid.state.payload.clear();
                hid.state.payload.extend_from_slice(bytes);
                vec![InputKind::HidReport { len: bytes.len() }]
            }
            (_, payload) => {
                tracing::trace!(device = %self.id, family = ?payload.family(), "payload family mismatch");
                Vec::new()
            }
        }
    }

    /// Fold a polled joystick sample into the state store. Non-joysticks ignore it.
    pub(crate) fn apply_sample(&mut self, sample: &RawJoystickSample) {
        if let DeviceKind::Joystick(joy) = &mut self.kind {
            normalize::joystick::apply_sample(&joy.caps, &joy.dead_zones, sample, &mut joy.state);
        }
    }

    /// Window focus was lost: keyboards release keys per their reset mode.
    pub(crate) fn on_focus_lost(&mut self) {
        if let DeviceKind::Keyboard(kb) = &mut self.kind {
            kb.keys.reset(kb.reset_mode);
        }
    }
}
