//! Engine-facing façade.
//!
//! [`Manager`] is the device factory and the single object a host talks to:
//! - **Factory:** `add_keyboard` / `add_mouse` / `add_hid` / `add_joystick` build a device with
//!   the configured defaults. A joystick whose capability probe fails is never added.
//! - **Lifecycle:** `bind`, `unbind`, `set_acquired`, `set_exclusive`, `set_allow_background`.
//! - **Pump:** the host forwards raw-input messages (`dispatch`), focus changes
//!   (`on_focus_changed`) and calls `poll` once per frame. Edges go to the
//!   [`InputEventBus`] and are queued for [`Manager::drain_events`].
//! - **State:** `key_state`, `axes`, `pov`, `pov_direction`, `buttons`, `binary_data`,
//!   `is_connected`, `snapshot`.

use crate::binding::Binding;
use crate::caps::{Axis, HidCaps, JoystickCaps};
use crate::config::InputConfig;
use crate::device::{DeviceId, DeviceKind, HidDevice, InputDevice, JoystickDevice, KeyboardDevice, MouseDevice};
use crate::dispatcher::Dispatcher;
use crate::error::{InputError, Result};
use crate::event::InputEvent;
use crate::eventbus::InputEventBus;
use crate::keys::{Key, KeyState, Modifiers};
use crate::metadata::DeviceMeta;
use crate::normalize::{DeadZones, MouseConstraints};
use crate::platform::{LegacyMessage, RawHandle, RawMessage, Window, WindowHandle};
use crate::snapshot::Snapshot;
use crate::state::{Direction, JoystickState, KeyResetMode, KeyStates, MouseState};
use std::sync::Arc;
use tracing::debug;

pub struct Manager {
    dispatcher: Dispatcher,
    config: InputConfig,
    bus: InputEventBus,
    pending: Vec<InputEvent>,
}

impl Manager {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_config(dispatcher, InputConfig::default())
    }

    pub fn with_config(dispatcher: Dispatcher, config: InputConfig) -> Self {
        Self {
            dispatcher,
            config,
            bus: InputEventBus::new(),
            pending: Vec::new(),
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn bus_mut(&mut self) -> &mut InputEventBus {
        &mut self.bus
    }

    pub fn devices(&self) -> impl Iterator<Item = &InputDevice> {
        self.dispatcher.devices()
    }

    pub fn device(&self, id: DeviceId) -> Result<&InputDevice> {
        self.dispatcher.device(id).ok_or(InputError::DeviceNotFound(id))
    }

    // ---- factory ----

    pub fn add_keyboard(&mut self, handle: RawHandle, name: &str) -> DeviceId {
        let cfg = self.config.keyboard;
        let id = DeviceId::Raw(handle);
        self.dispatcher.insert(InputDevice::new(
            id,
            name,
            DeviceMeta::with_bus("rawinput"),
            Binding::new(cfg.exclusive, cfg.allow_background),
            DeviceKind::Keyboard(KeyboardDevice {
                keys: KeyStates::new(),
                reset_mode: cfg.reset_mode,
            }),
        ));
        id
    }

    pub fn add_mouse(&mut self, handle: RawHandle, name: &str) -> DeviceId {
        let cfg = self.config.mouse;
        let id = DeviceId::Raw(handle);
        self.dispatcher.insert(InputDevice::new(
            id,
            name,
            DeviceMeta::with_bus("rawinput"),
            Binding::new(cfg.exclusive, cfg.allow_background),
            DeviceKind::Mouse(MouseDevice {
                state: MouseState::default(),
                constraints: cfg.constraints,
            }),
        ));
        id
    }

    pub fn add_hid(&mut self, handle: RawHandle, name: &str, caps: HidCaps) -> DeviceId {
        let cfg = self.config.hid;
        let id = DeviceId::Raw(handle);
        self.dispatcher.insert(InputDevice::new(
            id,
            name,
            DeviceMeta::from_hid("rawinput", &caps),
            Binding::new(cfg.exclusive, cfg.allow_background),
            DeviceKind::Hid(HidDevice {
                caps,
                state: Default::default(),
            }),
        ));
        id
    }

    /// Probe the joystick in `slot` and add it.
    ///
    /// A failed capability query is returned as [`InputError::Driver`] and nothing is added.
    pub fn add_joystick(&mut self, slot: u32) -> Result<DeviceId> {
        let id = DeviceId::Joystick(slot);
        let probe = self
            .dispatcher
            .joystick_driver()
            .probe(slot)
            .map_err(|err| InputError::driver(id, err))?;
        let caps = JoystickCaps::from_probe(&probe);
        let cfg = self.config.joystick;
        let connected = self.dispatcher.joystick_driver().is_connected(slot);
        self.dispatcher.insert(InputDevice::new(
            id,
            caps.name.clone(),
            DeviceMeta::from_joystick("winmm", &caps),
            Binding::exclusive_only(cfg.allow_background),
            DeviceKind::Joystick(JoystickDevice {
                state: JoystickState::new(&caps),
                caps,
                dead_zones: cfg.dead_zones,
                connected,
            }),
        ));
        Ok(id)
    }

    /// Add every connected joystick slot whose probe succeeds. Failed slots are skipped.
    pub fn discover_joysticks(&mut self) -> Vec<DeviceId> {
        let slots = self.dispatcher.joystick_driver().slot_count();
        let mut added = Vec::new();
        for slot in 0..slots {
            if !self.dispatcher.joystick_driver().is_connected(slot) {
                continue;
            }
            match self.add_joystick(slot) {
                Ok(id) => added.push(id),
                Err(err) => debug!(slot, error = %err, "joystick skipped"),
            }
        }
        added
    }

    /// Unbind and drop a device. Returns whether it existed.
    pub fn remove(&mut self, id: DeviceId) -> bool {
        self.dispatcher.remove(id).is_some()
    }

    // ---- lifecycle ----

    /// Bind `id` to `window` and request acquisition. Returns the resulting acquired flag.
    pub fn bind(&mut self, id: DeviceId, window: Arc<dyn Window>) -> Result<bool> {
        self.dispatcher.bind(id, window)
    }

    pub fn unbind(&mut self, id: DeviceId) -> Result<()> {
        self.dispatcher.unbind(id)
    }

    pub fn set_acquired(&mut self, id: DeviceId, acquired: bool) -> Result<bool> {
        self.dispatcher.set_acquired(id, acquired)
    }

    pub fn is_acquired(&self, id: DeviceId) -> Result<bool> {
        Ok(self.device(id)?.binding().is_acquired())
    }

    /// Joysticks ignore `false`.
    pub fn set_exclusive(&mut self, id: DeviceId, exclusive: bool) -> Result<()> {
        self.dispatcher.set_exclusive(id, exclusive)
    }

    pub fn set_allow_background(&mut self, id: DeviceId, allow: bool) -> Result<()> {
        self.dispatcher.set_allow_background(id, allow)
    }

    // ---- pump ----

    fn publish(&mut self, events: Vec<InputEvent>) -> usize {
        let n = events.len();
        self.bus.emit_all(&events);
        self.pending.extend(events);
        n
    }

    /// Route one raw-input message. Returns the number of events it produced.
    pub fn dispatch(&mut self, message: &RawMessage) -> usize {
        let events = self.dispatcher.dispatch(message);
        self.publish(events)
    }

    pub fn on_focus_changed(&mut self, window: WindowHandle, focused: bool) -> usize {
        let events = self.dispatcher.on_focus_changed(window, focused);
        self.publish(events)
    }

    /// Per-frame joystick sampling. Never fails; read errors keep the previous state.
    pub fn poll(&mut self) -> usize {
        let events = self.dispatcher.poll_joysticks();
        self.publish(events)
    }

    pub fn should_suppress(&self, message: LegacyMessage) -> bool {
        self.dispatcher.should_suppress(message)
    }

    /// Take every event queued since the last call.
    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }

    // ---- state ----

    fn keyboard(&self, id: DeviceId) -> Result<&KeyboardDevice> {
        match self.device(id)?.kind() {
            DeviceKind::Keyboard(kb) => Ok(kb),
            _ => Err(InputError::WrongDeviceKind {
                device: id,
                expected: "keyboard",
            }),
        }
    }

    fn joystick(&self, id: DeviceId) -> Result<&JoystickDevice> {
        match self.device(id)?.kind() {
            DeviceKind::Joystick(joy) => Ok(joy),
            _ => Err(InputError::WrongDeviceKind {
                device: id,
                expected: "joystick",
            }),
        }
    }

    fn kind_mut(&mut self, id: DeviceId) -> Result<&mut DeviceKind> {
        Ok(&mut self.dispatcher.device_mut(id)?.kind)
    }

    pub fn keys(&self, id: DeviceId) -> Result<&KeyStates> {
        Ok(&self.keyboard(id)?.keys)
    }

    pub fn key_state(&self, id: DeviceId, key: Key) -> Result<KeyState> {
        Ok(self.keyboard(id)?.keys.get(key))
    }

    pub fn modifiers(&self, id: DeviceId) -> Result<Modifiers> {
        Ok(self.keyboard(id)?.keys.modifiers())
    }

    pub fn set_reset_mode(&mut self, id: DeviceId, mode: KeyResetMode) -> Result<()> {
        match self.kind_mut(id)? {
            DeviceKind::Keyboard(kb) => {
                kb.reset_mode = mode;
                Ok(())
            }
            _ => Err(InputError::WrongDeviceKind {
                device: id,
                expected: "keyboard",
            }),
        }
    }

    pub fn mouse(&self, id: DeviceId) -> Result<&MouseState> {
        match self.device(id)?.kind() {
            DeviceKind::Mouse(mouse) => Ok(&mouse.state),
            _ => Err(InputError::WrongDeviceKind {
                device: id,
                expected: "mouse",
            }),
        }
    }

    pub fn set_mouse_constraints(&mut self, id: DeviceId, constraints: MouseConstraints) -> Result<()> {
        match self.kind_mut(id)? {
            DeviceKind::Mouse(mouse) => {
                mouse.constraints = constraints;
                let mut ignored = Default::default();
                mouse.state.position = constraints.constrain_position(mouse.state.position, &mut ignored);
                mouse.state.wheel = constraints.constrain_wheel(mouse.state.wheel);
                Ok(())
            }
            _ => Err(InputError::WrongDeviceKind {
                device: id,
                expected: "mouse",
            }),
        }
    }

    pub fn joystick_caps(&self, id: DeviceId) -> Result<&JoystickCaps> {
        Ok(&self.joystick(id)?.caps)
    }

    pub fn axes(&self, id: DeviceId) -> Result<&[i32]> {
        Ok(&self.joystick(id)?.state.axes)
    }

    /// Value of a named axis; `0` for axes the device lacks.
    pub fn axis(&self, id: DeviceId, axis: Axis) -> Result<i32> {
        let joy = self.joystick(id)?;
        Ok(joy.state.axis(&joy.caps, axis))
    }

    pub fn axis_direction(&self, id: DeviceId, axis: Axis) -> Result<Direction> {
        let joy = self.joystick(id)?;
        Ok(joy.state.direction(&joy.caps, axis))
    }

    pub fn pov(&self, id: DeviceId) -> Result<&[i32]> {
        Ok(&self.joystick(id)?.state.pov)
    }

    pub fn pov_direction(&self, id: DeviceId) -> Result<&[Direction]> {
        Ok(&self.joystick(id)?.state.pov_direction)
    }

    pub fn buttons(&self, id: DeviceId) -> Result<&[KeyState]> {
        Ok(&self.joystick(id)?.state.buttons)
    }

    pub fn set_dead_zones(&mut self, id: DeviceId, zones: DeadZones) -> Result<()> {
        match self.kind_mut(id)? {
            DeviceKind::Joystick(joy) => {
                joy.dead_zones = zones;
                Ok(())
            }
            _ => Err(InputError::WrongDeviceKind {
                device: id,
                expected: "joystick",
            }),
        }
    }

    /// Live connectivity, independent of acquisition and focus.
    pub fn is_connected(&self, id: DeviceId) -> Result<bool> {
        self.dispatcher.is_connected(id)
    }

    /// Last HID report payload.
    pub fn binary_data(&self, id: DeviceId) -> Result<&[u8]> {
        match self.device(id)?.kind() {
            DeviceKind::Hid(hid) => Ok(&hid.state.payload),
            _ => Err(InputError::WrongDeviceKind {
                device: id,
                expected: "generic HID",
            }),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.dispatcher.devices().collect()
    }
}
