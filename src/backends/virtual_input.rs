//! In-memory platform.
//!
//! [`VirtualPlatform`] implements every platform contract against shared in-memory state so
//! hosts without a window system (tests, replays, headless tools) can drive the dispatcher.
//! Clones share the same state: keep one handle in the test and hand the collaborators to
//! the dispatcher.
//!
//! ```
//! use holdfast::backends::virtual_input::{VirtualPlatform, VirtualWindow};
//! use holdfast::Manager;
//! use std::sync::Arc;
//!
//! let platform = VirtualPlatform::new();
//! let mut manager = Manager::new(platform.dispatcher());
//! let keyboard = manager.add_keyboard(holdfast::RawHandle(1), "kb");
//! manager.bind(keyboard, Arc::new(VirtualWindow::new(7))).unwrap();
//! assert_eq!(platform.registrations().len(), 1);
//! ```

use crate::dispatcher::Dispatcher;
use crate::error::PlatformError;
use crate::platform::{
    DeviceFamily, HidUsage, JoystickDriver, JoystickProbe, MessageHook, RawInputRegistrar, RawJoystickSample,
    ReadFields, RegistrationFlags, Window, WindowHandle,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One recorded registration call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Registration {
    pub usage: HidUsage,
    pub flags: RegistrationFlags,
    pub window: Option<WindowHandle>,
}

#[derive(Clone, Debug, Default)]
struct VirtualJoystick {
    probe: JoystickProbe,
    probe_fails: bool,
    sample: RawJoystickSample,
    connected: bool,
    read_fails: bool,
}

#[derive(Debug, Default)]
struct Shared {
    registrations: Vec<Registration>,
    reject_registrations: bool,
    filter_log: Vec<(DeviceFamily, bool)>,
    installed: BTreeSet<DeviceFamily>,
    joysticks: BTreeMap<u32, VirtualJoystick>,
    reads: Vec<(u32, ReadFields)>,
}

/// Shared in-memory platform state.
#[derive(Clone, Debug, Default)]
pub struct VirtualPlatform {
    shared: Arc<Mutex<Shared>>,
}

impl VirtualPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A dispatcher wired to this platform.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Box::new(self.clone()), Box::new(self.clone()), Box::new(self.clone()))
    }

    /// Every registration call so far, in order.
    pub fn registrations(&self) -> Vec<Registration> {
        self.lock().registrations.clone()
    }

    /// Make subsequent registration calls fail.
    pub fn reject_registrations(&self, reject: bool) {
        self.lock().reject_registrations = reject;
    }

    /// Filter add (`true`) / remove (`false`) calls, in order.
    pub fn filter_log(&self) -> Vec<(DeviceFamily, bool)> {
        self.lock().filter_log.clone()
    }

    pub fn filter_installed(&self, family: DeviceFamily) -> bool {
        self.lock().installed.contains(&family)
    }

    /// Plug a joystick into `slot`.
    pub fn add_joystick(&self, slot: u32, probe: JoystickProbe) {
        self.lock().joysticks.insert(
            slot,
            VirtualJoystick {
                probe,
                connected: true,
                ..VirtualJoystick::default()
            },
        );
    }

    /// Make the capability query for `slot` fail.
    pub fn fail_probe(&self, slot: u32) {
        self.lock().joysticks.entry(slot).or_default().probe_fails = true;
    }

    /// Hardware state returned by the next reads of `slot`.
    pub fn set_sample(&self, slot: u32, sample: RawJoystickSample) {
        if let Some(joy) = self.lock().joysticks.get_mut(&slot) {
            joy.sample = sample;
        }
    }

    pub fn fail_reads(&self, slot: u32, fail: bool) {
        if let Some(joy) = self.lock().joysticks.get_mut(&slot) {
            joy.read_fails = fail;
        }
    }

    pub fn set_connected(&self, slot: u32, connected: bool) {
        if let Some(joy) = self.lock().joysticks.get_mut(&slot) {
            joy.connected = connected;
        }
    }

    /// Every joystick read so far with the fields it requested.
    pub fn reads(&self) -> Vec<(u32, ReadFields)> {
        self.lock().reads.clone()
    }
}

impl RawInputRegistrar for VirtualPlatform {
    fn register(
        &mut self,
        usage: HidUsage,
        flags: RegistrationFlags,
        window: Option<WindowHandle>,
    ) -> Result<(), PlatformError> {
        let mut shared = self.lock();
        if shared.reject_registrations {
            return Err(PlatformError::new(5, "registration rejected"));
        }
        shared.registrations.push(Registration { usage, flags, window });
        Ok(())
    }
}

impl MessageHook for VirtualPlatform {
    fn add_filter(&mut self, family: DeviceFamily) {
        let mut shared = self.lock();
        shared.filter_log.push((family, true));
        shared.installed.insert(family);
    }

    fn remove_filter(&mut self, family: DeviceFamily) {
        let mut shared = self.lock();
        shared.filter_log.push((family, false));
        shared.installed.remove(&family);
    }
}

impl JoystickDriver for VirtualPlatform {
    fn slot_count(&self) -> u32 {
        self.lock().joysticks.keys().next_back().map_or(0, |&slot| slot + 1)
    }

    fn probe(&self, id: u32) -> Result<JoystickProbe, PlatformError> {
        match self.lock().joysticks.get(&id) {
            Some(joy) if !joy.probe_fails => Ok(joy.probe.clone()),
            _ => Err(PlatformError::new(167, format!("no joystick in slot {id}"))),
        }
    }

    fn read(&mut self, id: u32, fields: ReadFields) -> Result<RawJoystickSample, PlatformError> {
        let mut shared = self.lock();
        shared.reads.push((id, fields));
        let joy = shared
            .joysticks
            .get(&id)
            .filter(|j| j.connected && !j.read_fails)
            .ok_or_else(|| PlatformError::new(167, "joystick unplugged"))?;

        // Unrequested fields carry garbage, as some real drivers do.
        let s = joy.sample;
        let pick = |flag: ReadFields, value: i32| if fields.contains(flag) { value } else { 0x5A5A };
        Ok(RawJoystickSample {
            x: pick(ReadFields::X, s.x),
            y: pick(ReadFields::Y, s.y),
            z: pick(ReadFields::Z, s.z),
            rudder: pick(ReadFields::RUDDER, s.rudder),
            u: pick(ReadFields::U, s.u),
            v: pick(ReadFields::V, s.v),
            pov: if fields.intersects(ReadFields::POV | ReadFields::POV_CONTINUOUS) {
                s.pov
            } else {
                0x5A5A
            },
            buttons: s.buttons,
        })
    }

    fn is_connected(&self, id: u32) -> bool {
        self.lock().joysticks.get(&id).is_some_and(|j| j.connected)
    }
}

/// Window whose focus and teardown flags are set by the test.
#[derive(Debug)]
pub struct VirtualWindow {
    handle: WindowHandle,
    focused: AtomicBool,
    disposing: AtomicBool,
}

impl VirtualWindow {
    /// A focused, live window.
    pub fn new(handle: isize) -> Self {
        Self {
            handle: WindowHandle(handle),
            focused: AtomicBool::new(true),
            disposing: AtomicBool::new(false),
        }
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    pub fn set_disposing(&self, disposing: bool) {
        self.disposing.store(disposing, Ordering::SeqCst);
    }
}

impl Window for VirtualWindow {
    fn handle(&self) -> WindowHandle {
        self.handle
    }

    fn is_focused(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    fn is_disposing(&self) -> bool {
        self.disposing.load(Ordering::SeqCst)
    }
}
