//! Holdfast: input-device lifecycle and normalization.
//!
//! Discovers keyboards, mice, joysticks and generic HID devices, binds them to a window,
//! tracks their live state and exposes it to an update loop.
//!
//! - [`binding`]: Unbound / Bound / Acquired / Lost state machine with exclusive and
//!   background semantics.
//! - [`normalize`]: left/right key unification, joystick dead zones and POV quantization,
//!   mouse constraints.
//! - [`dispatcher`]: routes raw-input messages to devices, polls joysticks, reference-counts
//!   message filters per family.
//! - [`manager`]: device factory and engine-facing façade.
//!
//! Platform access goes through the traits in [`platform`]; [`backends`] has a Windows
//! implementation and an in-memory one for tests and headless hosts.

pub mod backends;
pub mod binding;
pub mod caps;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod keys;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod normalize;
pub mod platform;
pub mod snapshot;
pub mod state;

pub use binding::{BindPhase, Binding};
pub use caps::{Axis, AxisRange, CapabilityFlags, HidCaps, JoystickCaps};
pub use config::InputConfig;
pub use device::{DeviceId, DeviceKind, InputDevice};
pub use dispatcher::Dispatcher;
pub use error::{InputError, PlatformError, Result};
pub use event::{InputEvent, InputKind};
pub use eventbus::{EventFilter, InputEventBus, InputListener};
pub use keys::{Key, KeyState, Modifiers};
pub use manager::Manager;
pub use platform::{RawHandle, RawMessage, RawPayload, Window, WindowHandle};
pub use snapshot::Snapshot;
pub use state::{Direction, KeyResetMode};
