//! Platform backends.
//!
//! - **`virtual_input`**: in-memory platform for tests and headless hosts (always built).
//! - **`hid`**: generic HID enumeration via `hidapi` (feature `hid`, default).
//! - **`windows`**: Win32 raw input and winmm joysticks (Windows only).

#[cfg(feature = "hid")]
#[cfg_attr(docsrs, doc(cfg(feature = "hid")))]
pub mod hid;

pub mod virtual_input;

#[cfg(target_os = "windows")]
#[cfg_attr(docsrs, doc(cfg(target_os = "windows")))]
pub mod windows;
