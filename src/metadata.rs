//! Diagnostic device identity.
//!
//! [`DeviceMeta`] describes where a device came from: bus, vendor/product ids, the
//! OS-reported product string and path. None of it participates in binding or routing;
//! routing uses [`DeviceId`](crate::device::DeviceId). Backends fill what they know and leave
//! the rest `None`.
//!
//! `path` is platform-specific and may change across ports and reconnects. Treat it as
//! diagnostic first, identity second.

use crate::caps::{HidCaps, JoystickCaps};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// Short bus hint: `"rawinput"`, `"winmm"`, `"hidapi"`, `"virtual"`.
    pub bus: Option<String>,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    /// Friendly product name from the driver or firmware.
    pub product: Option<String>,
    pub serial_number: Option<String>,
    /// Top-level HID usage page (e.g. `0x01` Generic Desktop).
    pub usage_page: Option<u16>,
    pub usage: Option<u16>,
    /// OS device path (`\\?\HID#...` on Windows).
    pub path: Option<String>,
}

impl DeviceMeta {
    pub fn with_bus(bus: &str) -> Self {
        Self {
            bus: Some(bus.to_owned()),
            ..Self::default()
        }
    }

    /// Identity fields of a generic HID descriptor.
    pub fn from_hid(bus: &str, caps: &HidCaps) -> Self {
        Self {
            vendor_id: Some(caps.vendor_id),
            product_id: Some(caps.product_id),
            usage_page: Some(caps.usage_page),
            usage: Some(caps.usage),
            ..Self::with_bus(bus)
        }
    }

    /// Identity fields of a joystick descriptor.
    pub fn from_joystick(bus: &str, caps: &JoystickCaps) -> Self {
        Self {
            vendor_id: Some(caps.vendor_id),
            product_id: Some(caps.product_id),
            product: (!caps.name.is_empty()).then(|| caps.name.clone()),
            ..Self::with_bus(bus)
        }
    }

    /// `VID:PID` when both are known, for log lines.
    pub fn vid_pid(&self) -> Option<String> {
        Some(format!("{:04x}:{:04x}", self.vendor_id?, self.product_id?))
    }
}
