#![cfg(target_os = "windows")]

//! Windows platform.
//!
//! - [`raw_input`]: `WM_INPUT` parsing, `RegisterRawInputDevices`, legacy message classification
//! - [`joystick`]: winmm legacy joystick driver
//! - [`PumpFilters`]: the message-hook side the host's window procedure consults
//!
//! The host owns the message loop. Typical wiring:
//! ```ignore
//! let filters = PumpFilters::default();
//! let mut manager = Manager::new(holdfast::backends::windows::dispatcher(filters.clone()));
//! // in the wndproc:
//! //   WM_INPUT => if let Some(msg) = raw_input::read_wm_input(lparam) { manager.dispatch(&msg); }
//! //   other    => if manager.should_suppress(raw_input::legacy_message(msg, wparam)) { return 0; }
//! ```

pub mod joystick;
pub mod raw_input;

use crate::dispatcher::Dispatcher;
use crate::platform::{DeviceFamily, MessageHook};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Families whose message filter is currently installed.
#[derive(Clone, Debug, Default)]
pub struct PumpFilters {
    installed: Arc<Mutex<BTreeSet<DeviceFamily>>>,
}

impl PumpFilters {
    /// Whether the window procedure should forward `WM_INPUT` of this family.
    pub fn wants(&self, family: DeviceFamily) -> bool {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&family)
    }
}

impl MessageHook for PumpFilters {
    fn add_filter(&mut self, family: DeviceFamily) {
        tracing::debug!(?family, "message filter installed");
        self.installed.lock().unwrap_or_else(PoisonError::into_inner).insert(family);
    }

    fn remove_filter(&mut self, family: DeviceFamily) {
        tracing::debug!(?family, "message filter removed");
        self.installed.lock().unwrap_or_else(PoisonError::into_inner).remove(&family);
    }
}

/// Dispatcher wired to the Win32 registrar, `filters` and the winmm joystick driver.
pub fn dispatcher(filters: PumpFilters) -> Dispatcher {
    Dispatcher::new(
        Box::new(raw_input::WinRegistrar),
        Box::new(filters),
        Box::new(joystick::WinmmJoysticks),
    )
}
