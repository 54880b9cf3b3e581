//! Generic HID enumeration via `hidapi`.
//!
//! Lists the HID interfaces a host may want to add with
//! [`Manager::add_hid`](crate::manager::Manager::add_hid). Plain keyboards and mice are skipped;
//! they are covered by the raw-input keyboard/mouse families.

use crate::caps::HidCaps;
use crate::metadata::DeviceMeta;
use hidapi::{DeviceInfo, HidApi};

/// One enumerated HID interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HidDeviceInfo {
    pub caps: HidCaps,
    pub meta: DeviceMeta,
}

impl HidDeviceInfo {
    fn from_info(info: &DeviceInfo) -> Self {
        let caps = HidCaps {
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            usage_page: info.usage_page(),
            usage: info.usage(),
        };
        let mut meta = DeviceMeta::from_hid("hidapi", &caps);
        meta.product = info.product_string().map(str::to_owned);
        meta.serial_number = info.serial_number().map(str::to_owned);
        meta.path = Some(info.path().to_string_lossy().into_owned());
        Self { caps, meta }
    }

    /// Display name: product string, else `VID:PID`.
    pub fn name(&self) -> String {
        self.meta
            .product
            .clone()
            .or_else(|| self.meta.vid_pid())
            .unwrap_or_else(|| "HID device".to_owned())
    }
}

/// Usage pages that carry device input worth routing: Generic Desktop (minus mouse and
/// keyboard), Simulation Controls, Game Controls, Physical Interface and vendor-defined pages.
pub(crate) fn accept(usage_page: u16, usage: u16) -> bool {
    match usage_page {
        0x01 => !matches!(usage, 0x02 | 0x06),
        0x02 | 0x05 | 0x0F => true,
        page => page & 0xFF00 == 0xFF00,
    }
}

/// Enumerate accepted HID interfaces from an existing API handle.
pub fn enumerate(api: &HidApi) -> Vec<HidDeviceInfo> {
    let found: Vec<HidDeviceInfo> = api
        .device_list()
        .filter(|info| accept(info.usage_page(), info.usage()))
        .map(HidDeviceInfo::from_info)
        .collect();
    tracing::debug!(count = found.len(), "hid enumeration");
    found
}

/// Initialize `hidapi` and enumerate.
pub fn enumerate_devices() -> crate::error::Result<Vec<HidDeviceInfo>> {
    let api = HidApi::new()?;
    Ok(enumerate(&api))
}
