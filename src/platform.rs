//! Platform collaborator contracts.
//!
//! Everything the core needs from the OS goes through the traits here:
//! - [`RawInputRegistrar`]: the raw-input registration call
//!   (`Register(usage, flags, window) -> success | failure`)
//! - [`JoystickDriver`]: the legacy joystick capability query and position read
//! - [`MessageHook`]: add/remove the process-wide message filter on the host pump
//! - [`Window`]: `{ handle, focused, disposing }` for acquisition gating
//!
//! The raw payload types ([`RawMessage`], [`RawKeyboard`], [`RawMouse`]) are what a host's
//! message pump forwards to the dispatcher. They are plain data; the Windows backend fills
//! them from `WM_INPUT`, the virtual backend from test code.

use crate::caps::AxisRange;
use crate::error::PlatformError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque OS window handle (`HWND` on Windows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

/// Opaque raw-input device handle (`RAWINPUTHEADER::hDevice`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RawHandle(pub isize);

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The window/control a device binds to.
///
/// Implementations are queried on every inbound event, so they should be cheap
/// (cached flags, not OS round-trips).
pub trait Window: Send + Sync {
    fn handle(&self) -> WindowHandle;
    fn is_focused(&self) -> bool;
    fn is_disposing(&self) -> bool;
}

/// Top-level HID usage a device registers under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HidUsage {
    pub page: u16,
    pub usage: u16,
}

impl HidUsage {
    pub const MOUSE: HidUsage = HidUsage { page: 0x01, usage: 0x02 };
    pub const JOYSTICK: HidUsage = HidUsage { page: 0x01, usage: 0x04 };
    pub const GAMEPAD: HidUsage = HidUsage { page: 0x01, usage: 0x05 };
    pub const KEYBOARD: HidUsage = HidUsage { page: 0x01, usage: 0x06 };
}

bitflags! {
    /// Raw-input registration flags (values match `RIDEV_*`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RegistrationFlags: u32 {
        /// Stop routing this usage to the process. Must be paired with a null window.
        const REMOVE = 0x0000_0001;
        /// Suppress legacy messages (`WM_KEYDOWN`, `WM_MOUSEMOVE`, ...).
        const NO_LEGACY = 0x0000_0030;
        /// Deliver input even when the target window is not in the foreground.
        const INPUT_SINK = 0x0000_0100;
        /// Suppress system hotkeys.
        const NO_HOTKEYS = 0x0000_0200;
    }
}

/// The platform raw-input registration call.
pub trait RawInputRegistrar {
    fn register(
        &mut self,
        usage: HidUsage,
        flags: RegistrationFlags,
        window: Option<WindowHandle>,
    ) -> Result<(), PlatformError>;
}

/// Device families. Event-driven families share one message filter each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceFamily {
    Keyboard,
    Mouse,
    Hid,
    Joystick,
}

impl DeviceFamily {
    /// Keyboard, mouse and HID are delivered through the message pump; joysticks are polled.
    #[inline]
    pub fn is_event_driven(self) -> bool {
        !matches!(self, DeviceFamily::Joystick)
    }
}

/// Message-filter hook on the host's message pump.
///
/// The dispatcher calls `add_filter` when the first device of a family subscribes and
/// `remove_filter` when the last one leaves. Implementations never see duplicate adds.
pub trait MessageHook {
    fn add_filter(&mut self, family: DeviceFamily);
    fn remove_filter(&mut self, family: DeviceFamily);
}

/// Point-of-view resolution reported by the probe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PovSupport {
    #[default]
    None,
    /// 4/8-way, cardinal values only.
    Discrete,
    /// Hundredths of a degree.
    Continuous,
}

/// Raw result of the one-time joystick capability query (`JOYCAPS` equivalent).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoystickProbe {
    pub name: String,
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: Option<AxisRange>,
    pub rudder: Option<AxisRange>,
    pub u: Option<AxisRange>,
    pub v: Option<AxisRange>,
    pub button_count: u32,
    pub pov: PovSupport,
    pub vendor_id: u16,
    pub product_id: u16,
}

bitflags! {
    /// Sub-fields requested from a joystick read (values match `JOY_RETURN*`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ReadFields: u32 {
        const X = 0x0001;
        const Y = 0x0002;
        const Z = 0x0004;
        const RUDDER = 0x0008;
        const U = 0x0010;
        const V = 0x0020;
        const POV = 0x0040;
        const BUTTONS = 0x0080;
        const POV_CONTINUOUS = 0x0200;
    }
}

/// One raw joystick sample. Fields not requested are left at zero by well-behaved drivers,
/// but callers must not rely on that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawJoystickSample {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub rudder: i32,
    pub u: i32,
    pub v: i32,
    /// Hundredths of a degree, or anything above 35999 for centered.
    pub pov: i32,
    /// Bit `n` set means button `n` is pressed.
    pub buttons: u32,
}

/// The legacy (polled) joystick API.
pub trait JoystickDriver {
    /// Number of joystick slots the driver exposes.
    fn slot_count(&self) -> u32;
    fn probe(&self, id: u32) -> Result<JoystickProbe, PlatformError>;
    fn read(&mut self, id: u32, fields: ReadFields) -> Result<RawJoystickSample, PlatformError>;
    /// Independent connectivity probe; not tied to acquisition.
    fn is_connected(&self, id: u32) -> bool;
}

/// Raw keyboard payload (`RAWKEYBOARD` subset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawKeyboard {
    pub vkey: u16,
    pub make_code: u16,
    pub flags: u16,
}

impl RawKeyboard {
    pub const BREAK: u16 = 0x0001;
    pub const E0: u16 = 0x0002;
    pub const E1: u16 = 0x0004;

    pub fn down(vkey: u16, make_code: u16) -> Self {
        Self {
            vkey,
            make_code,
            flags: 0,
        }
    }

    pub fn up(vkey: u16, make_code: u16) -> Self {
        Self {
            vkey,
            make_code,
            flags: Self::BREAK,
        }
    }

    pub fn extended(mut self) -> Self {
        self.flags |= Self::E0;
        self
    }

    #[inline]
    pub fn is_break(&self) -> bool {
        self.flags & Self::BREAK != 0
    }

    #[inline]
    pub fn is_e0(&self) -> bool {
        self.flags & Self::E0 != 0
    }
}

/// Raw mouse payload (`RAWMOUSE` subset).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawMouse {
    /// `true` when `x`/`y` are absolute coordinates rather than deltas.
    pub absolute: bool,
    pub x: i32,
    pub y: i32,
    /// `RI_MOUSE_*` button transition bits.
    pub button_flags: u16,
    /// Wheel delta, valid when `button_flags` carries the wheel bit.
    pub wheel_delta: i16,
}

impl RawMouse {
    pub const LEFT_DOWN: u16 = 0x0001;
    pub const LEFT_UP: u16 = 0x0002;
    pub const RIGHT_DOWN: u16 = 0x0004;
    pub const RIGHT_UP: u16 = 0x0008;
    pub const MIDDLE_DOWN: u16 = 0x0010;
    pub const MIDDLE_UP: u16 = 0x0020;
    pub const BUTTON4_DOWN: u16 = 0x0040;
    pub const BUTTON4_UP: u16 = 0x0080;
    pub const BUTTON5_DOWN: u16 = 0x0100;
    pub const BUTTON5_UP: u16 = 0x0200;
    pub const WHEEL: u16 = 0x0400;

    pub fn moved(dx: i32, dy: i32) -> Self {
        Self {
            x: dx,
            y: dy,
            ..Self::default()
        }
    }
}

/// Device-specific payload of one raw-input message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawPayload {
    Keyboard(RawKeyboard),
    Mouse(RawMouse),
    /// Device-defined HID report bytes (all reports of the message, concatenated).
    Hid(Vec<u8>),
}

impl RawPayload {
    pub fn family(&self) -> DeviceFamily {
        match self {
            RawPayload::Keyboard(_) => DeviceFamily::Keyboard,
            RawPayload::Mouse(_) => DeviceFamily::Mouse,
            RawPayload::Hid(_) => DeviceFamily::Hid,
        }
    }
}

/// `(deviceHandle, messageType, payload)` as delivered by the message filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawMessage {
    pub handle: RawHandle,
    pub payload: RawPayload,
}

impl RawMessage {
    pub fn new(handle: RawHandle, payload: RawPayload) -> Self {
        Self { handle, payload }
    }
}

/// Legacy window messages a host may ask about before default processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegacyMessage {
    KeyDown,
    KeyUp,
    Char,
    DeadChar,
    HotKey,
    AppCommand,
    /// `WM_SYSKEYDOWN` with its virtual-key code.
    SysKeyDown(u16),
    MouseMove,
    MouseButton,
    MouseWheel,
    Other,
}
