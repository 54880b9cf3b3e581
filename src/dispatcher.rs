//! Event/poll dispatcher.
//!
//! The [`Dispatcher`] owns the device table, the platform collaborators and a
//! [`SubscriptionTable`] keyed by device family. The host's message pump hands it
//! [`RawMessage`]s ([`Dispatcher::dispatch`]); the frame loop calls
//! [`Dispatcher::poll_joysticks`] once per tick.
//!
//! ## Guarantees
//! - A family's message filter is installed when its first device subscribes and removed when
//!   its last one leaves. Counting is by subscribed device id, so re-binding one device never
//!   orphans a sibling's delivery.
//! - `bind` subscribes before registering and rolls the subscription back if registration
//!   fails; `unbind` removes the subscription before unregistering.
//! - A platform usage registration is only removed when no other bound device shares it.
//! - Per-event and per-poll failures never surface as `Err`; they are logged and the previous
//!   state is kept.

use crate::binding::{Admission, BindPhase};
use crate::device::{DeviceId, DeviceKind, InputDevice};
use crate::error::{InputError, Result};
use crate::event::{InputEvent, InputKind};
use crate::keys::Key;
use crate::platform::{
    DeviceFamily, HidUsage, JoystickDriver, LegacyMessage, MessageHook, RawInputRegistrar, RawMessage,
    RegistrationFlags, Window, WindowHandle,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Device ids subscribed to each family's message filter.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionTable {
    families: BTreeMap<DeviceFamily, BTreeSet<DeviceId>>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` to `family`. Returns `true` when it is the family's first subscriber,
    /// i.e. the filter must be installed.
    pub fn subscribe(&mut self, family: DeviceFamily, id: DeviceId) -> bool {
        let set = self.families.entry(family).or_default();
        set.insert(id) && set.len() == 1
    }

    /// Remove `id` from `family`. Returns `true` when it was the last subscriber,
    /// i.e. the filter must be removed.
    pub fn unsubscribe(&mut self, family: DeviceFamily, id: DeviceId) -> bool {
        let Some(set) = self.families.get_mut(&family) else {
            return false;
        };
        if !set.remove(&id) {
            return false;
        }
        if set.is_empty() {
            self.families.remove(&family);
            return true;
        }
        false
    }

    pub fn count(&self, family: DeviceFamily) -> usize {
        self.families.get(&family).map_or(0, BTreeSet::len)
    }

    pub fn is_subscribed(&self, family: DeviceFamily, id: DeviceId) -> bool {
        self.families.get(&family).is_some_and(|s| s.contains(&id))
    }
}

/// Routes platform input to devices and drives their binding lifecycle.
pub struct Dispatcher {
    devices: BTreeMap<DeviceId, InputDevice>,
    subscriptions: SubscriptionTable,
    registrar: Box<dyn RawInputRegistrar>,
    hook: Box<dyn MessageHook>,
    joysticks: Box<dyn JoystickDriver>,
}

impl Dispatcher {
    pub fn new(
        registrar: Box<dyn RawInputRegistrar>,
        hook: Box<dyn MessageHook>,
        joysticks: Box<dyn JoystickDriver>,
    ) -> Self {
        Self {
            devices: BTreeMap::new(),
            subscriptions: SubscriptionTable::new(),
            registrar,
            hook,
            joysticks,
        }
    }

    pub fn subscriptions(&self) -> &SubscriptionTable {
        &self.subscriptions
    }

    pub fn joystick_driver(&self) -> &dyn JoystickDriver {
        self.joysticks.as_ref()
    }

    pub fn device(&self, id: DeviceId) -> Option<&InputDevice> {
        self.devices.get(&id)
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> Result<&mut InputDevice> {
        self.devices.get_mut(&id).ok_or(InputError::DeviceNotFound(id))
    }

    pub fn devices(&self) -> impl Iterator<Item = &InputDevice> {
        self.devices.values()
    }

    /// Add a device. A device already registered under the same id is unbound and replaced.
    pub(crate) fn insert(&mut self, device: InputDevice) {
        let id = device.id();
        if self.devices.contains_key(&id) {
            if let Err(err) = self.unbind(id) {
                warn!(device = %id, error = %err, "failed to unbind replaced device");
            }
            debug!(device = %id, "replacing device");
        }
        debug!(device = %device.id(), family = ?device.family(), name = device.name(), "device added");
        self.devices.insert(device.id(), device);
    }

    /// Unbind and drop a device.
    pub fn remove(&mut self, id: DeviceId) -> Option<InputDevice> {
        self.unbind(id).ok()?;
        self.devices.remove(&id)
    }

    /// Register `id` with the platform for `window` and request acquisition.
    ///
    /// A bound device is fully unbound first. Registration failure leaves the device unbound,
    /// with no filter subscription, and is returned as [`InputError::Driver`].
    pub fn bind(&mut self, id: DeviceId, window: Arc<dyn Window>) -> Result<bool> {
        if self.device(id).ok_or(InputError::DeviceNotFound(id))?.binding().is_bound() {
            self.unbind(id)?;
        }

        let device = self.devices.get_mut(&id).ok_or(InputError::DeviceNotFound(id))?;
        let family = device.family();

        if let Some(usage) = device.usage() {
            let flags = device.binding().registration_flags();
            if self.subscriptions.subscribe(family, id) {
                self.hook.add_filter(family);
            }
            if let Err(err) = self.registrar.register(usage, flags, Some(window.handle())) {
                if self.subscriptions.unsubscribe(family, id) {
                    self.hook.remove_filter(family);
                }
                warn!(device = %id, ?usage, error = %err, "raw input registration rejected");
                return Err(InputError::driver(id, err));
            }
            trace!(device = %id, ?usage, ?flags, "registered");
        }

        device.binding.attach(window);
        let acquired = device.binding.set_acquired(true);
        debug!(device = %id, acquired, "bound");
        Ok(acquired)
    }

    /// Stop routing input for `id`. Unbinding an unbound device is a no-op.
    ///
    /// The filter subscription is removed before the platform registration. Platform
    /// failures while unregistering are logged, not returned.
    pub fn unbind(&mut self, id: DeviceId) -> Result<()> {
        let device = self.devices.get(&id).ok_or(InputError::DeviceNotFound(id))?;
        if !device.binding().is_bound() {
            return Ok(());
        }
        let family = device.family();
        let usage = device.usage();
        let shared = usage.is_some_and(|usage| self.usage_shared(id, usage));

        if self.subscriptions.unsubscribe(family, id) {
            self.hook.remove_filter(family);
        }
        if let Some(usage) = usage {
            if shared {
                trace!(device = %id, ?usage, "usage still bound by another device");
            } else if let Err(err) = self.registrar.register(usage, RegistrationFlags::REMOVE, None) {
                warn!(device = %id, ?usage, error = %err, "raw input removal failed");
            }
        }

        if let Some(device) = self.devices.get_mut(&id) {
            let previous = device.binding.detach();
            debug!(device = %id, ?previous, "unbound");
        }
        Ok(())
    }

    fn usage_shared(&self, id: DeviceId, usage: HidUsage) -> bool {
        self.devices
            .values()
            .any(|d| d.id() != id && d.binding().is_bound() && d.usage() == Some(usage))
    }

    /// Explicit acquisition request. Returns the resulting acquired flag.
    pub fn set_acquired(&mut self, id: DeviceId, acquired: bool) -> Result<bool> {
        let device = self.device_mut(id)?;
        let result = device.binding.set_acquired(acquired);
        debug!(device = %id, requested = acquired, acquired = result, "acquisition set");
        Ok(result)
    }

    /// Change exclusivity; a bound device is re-bound with the new flags.
    pub fn set_exclusive(&mut self, id: DeviceId, exclusive: bool) -> Result<()> {
        let changed = self.device_mut(id)?.binding.set_exclusive(exclusive);
        if changed {
            self.rebind(id)?;
        }
        Ok(())
    }

    /// Change background delivery; a bound device is re-bound with the new flags.
    pub fn set_allow_background(&mut self, id: DeviceId, allow: bool) -> Result<()> {
        let changed = self.device_mut(id)?.binding.set_allow_background(allow);
        if changed {
            self.rebind(id)?;
        }
        Ok(())
    }

    fn rebind(&mut self, id: DeviceId) -> Result<()> {
        let device = self.device_mut(id)?;
        let Some(window) = device.binding().window().cloned() else {
            return Ok(());
        };
        let wanted = device.binding().phase() != BindPhase::Bound;
        self.unbind(id)?;
        self.bind(id, window)?;
        if !wanted {
            self.set_acquired(id, false)?;
        }
        Ok(())
    }

    /// Focus notification for `window`. Devices that lose acquisition reset per their mode.
    pub fn on_focus_changed(&mut self, window: WindowHandle, focused: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for device in self.devices.values_mut() {
            if device.binding().window_handle() != Some(window) {
                continue;
            }
            if let Some(acquired) = device.binding.on_focus_changed(focused) {
                debug!(device = %device.id(), "acquisition lost on focus change");
                device.on_focus_lost();
                events.push(InputEvent::now(device.id(), InputKind::AcquisitionChanged { acquired }));
            }
        }
        events
    }

    fn gate(device: &mut InputDevice, events: &mut Vec<InputEvent>) -> bool {
        let admission = device.binding.admit();
        if let Some(acquired) = admission.acquisition_change() {
            debug!(device = %device.id(), acquired, "acquisition changed on input attempt");
            if admission == Admission::Lost {
                device.on_focus_lost();
            }
            events.push(InputEvent::now(device.id(), InputKind::AcquisitionChanged { acquired }));
        }
        admission.accepts()
    }

    /// Route one raw-input message. Returns the edges it produced.
    ///
    /// Messages for unknown or unsubscribed handles, of the wrong family, or whose device's
    /// window is null, disposing or unfocused are dropped.
    pub fn dispatch(&mut self, message: &RawMessage) -> Vec<InputEvent> {
        let id = DeviceId::Raw(message.handle);
        let family = message.payload.family();
        let mut events = Vec::new();

        if !self.subscriptions.is_subscribed(family, id) {
            trace!(device = %id, ?family, "no subscription; dropped");
            return events;
        }
        let Some(device) = self.devices.get_mut(&id) else {
            return events;
        };
        if device.family() != family {
            trace!(device = %id, ?family, "family mismatch; dropped");
            return events;
        }
        if !Self::gate(device, &mut events) {
            trace!(device = %id, "not acquired; dropped");
            return events;
        }
        events.extend(
            device
                .apply_payload(&message.payload)
                .into_iter()
                .map(|kind| InputEvent::now(id, kind)),
        );
        events
    }

    /// Sample every bound joystick once.
    ///
    /// Only fields the device supports are requested. A failed read keeps the previous state.
    /// Connectivity is refreshed for every joystick, bound or not.
    pub fn poll_joysticks(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for device in self.devices.values_mut() {
            let DeviceId::Joystick(slot) = device.id() else {
                continue;
            };
            let connected = self.joysticks.is_connected(slot);
            let fields = match &mut device.kind {
                DeviceKind::Joystick(joy) => {
                    joy.connected = connected;
                    joy.caps.read_fields()
                }
                _ => continue,
            };
            if !device.binding().is_bound() || !Self::gate(device, &mut events) {
                continue;
            }
            match self.joysticks.read(slot, fields) {
                Ok(sample) => device.apply_sample(&sample),
                Err(err) => debug!(device = %device.id(), error = %err, "joystick read failed; keeping previous state"),
            }
        }
        events
    }

    /// Live connectivity probe for a joystick, independent of binding and focus.
    pub fn is_connected(&self, id: DeviceId) -> Result<bool> {
        match self.device(id).map(InputDevice::kind) {
            Some(DeviceKind::Joystick(_)) => match id {
                DeviceId::Joystick(slot) => Ok(self.joysticks.is_connected(slot)),
                DeviceId::Raw(_) => Err(InputError::WrongDeviceKind {
                    device: id,
                    expected: "joystick",
                }),
            },
            Some(_) => Err(InputError::WrongDeviceKind {
                device: id,
                expected: "joystick",
            }),
            None => Err(InputError::DeviceNotFound(id)),
        }
    }

    /// Whether a legacy window message should be swallowed before default processing.
    ///
    /// An acquired exclusive keyboard suppresses key, character and hotkey messages, except
    /// `SysKeyDown(F4)` so Alt+F4 still closes the window. An acquired exclusive mouse
    /// suppresses mouse messages.
    pub fn should_suppress(&self, message: LegacyMessage) -> bool {
        let exclusive = |family: DeviceFamily| {
            self.devices.values().any(|d| {
                d.family() == family && d.binding().exclusive() && d.binding().is_acquired()
            })
        };
        match message {
            LegacyMessage::SysKeyDown(vk) if vk == Key::F4.vk() => false,
            LegacyMessage::KeyDown
            | LegacyMessage::KeyUp
            | LegacyMessage::Char
            | LegacyMessage::DeadChar
            | LegacyMessage::HotKey
            | LegacyMessage::AppCommand
            | LegacyMessage::SysKeyDown(_) => exclusive(DeviceFamily::Keyboard),
            LegacyMessage::MouseMove | LegacyMessage::MouseButton | LegacyMessage::MouseWheel => {
                exclusive(DeviceFamily::Mouse)
            }
            LegacyMessage::Other => false,
        }
    }
}
