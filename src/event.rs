//! Edge events.
//!
//! The state stores are level-triggered: consumers read them whenever they like. Events are
//! the edge-triggered complement, produced by the dispatcher as it applies payloads and fanned
//! out through the [`InputEventBus`](crate::eventbus::InputEventBus).
//!
//! ## Conventions
//! - **Keys:** `key` is the unified (side-specific where resolvable) key; `scan_code` is the
//!   raw hardware make code. Autorepeat produces repeated `KeyDown`s.
//! - **Mouse:** positions are after constraints; `relative` is the applied offset.
//! - **Joysticks** are polled and produce no edges; read their state store.

use crate::device::DeviceId;
use crate::keys::{Key, Modifiers};
use crate::state::{MouseButtons, Point};
use serde::Serialize;

/// Device-level input change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum InputKind {
    KeyDown {
        key: Key,
        scan_code: u16,
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        scan_code: u16,
        modifiers: Modifiers,
    },
    MouseMove {
        position: Point,
        relative: Point,
    },
    /// `button` holds exactly one flag.
    MouseButtonDown {
        button: MouseButtons,
        position: Point,
    },
    MouseButtonUp {
        button: MouseButtons,
        position: Point,
    },
    MouseWheel {
        delta: i32,
        /// Accumulated wheel position after constraints.
        wheel: i32,
    },
    /// A generic HID report replaced the device's payload.
    HidReport { len: usize },
    /// Acquisition flipped without an explicit call (focus loss or implicit recapture).
    AcquisitionChanged { acquired: bool },
}

impl InputKind {
    pub fn is_key(&self) -> bool {
        matches!(self, InputKind::KeyDown { .. } | InputKind::KeyUp { .. })
    }

    pub fn is_mouse(&self) -> bool {
        matches!(
            self,
            InputKind::MouseMove { .. }
                | InputKind::MouseButtonDown { .. }
                | InputKind::MouseButtonUp { .. }
                | InputKind::MouseWheel { .. }
        )
    }
}

/// Timestamped event attributed to one device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputEvent {
    /// Capture time (monotonic).
    pub at: std::time::Instant,
    pub device: DeviceId,
    pub kind: InputKind,
}

impl InputEvent {
    pub fn now(device: DeviceId, kind: InputKind) -> Self {
        Self {
            at: std::time::Instant::now(),
            device,
            kind,
        }
    }
}
