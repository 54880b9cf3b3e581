//! `WM_INPUT` parsing and raw-input registration.
//!
//! The host owns the Win32 message loop. For every `WM_INPUT` it calls [`read_wm_input`] and
//! hands the result to [`Manager::dispatch`](crate::manager::Manager::dispatch); for legacy
//! key/mouse messages it asks [`Manager::should_suppress`](crate::manager::Manager::should_suppress)
//! with [`legacy_message`] before default processing.
//!
//! ## Conventions
//! - Mouse coordinates are raw OS units; absolute devices report `0..=65535`.
//! - Wheel deltas are raw `WHEEL_DELTA` units (typically ±120 per notch).
//! - HID messages carry every report of the packet, concatenated.

use crate::error::PlatformError;
use crate::platform::{
    HidUsage, LegacyMessage, RawHandle, RawInputRegistrar, RawKeyboard, RawMessage, RawMouse, RawPayload,
    RegistrationFlags, WindowHandle,
};
use core::ffi::c_void;
use windows_sys::Win32::Foundation::{GetLastError, HANDLE};
use windows_sys::Win32::UI::Input::*;

// Local constants (avoid relying on module exports that vary by windows-sys version)
const MOUSE_MOVE_ABSOLUTE: u16 = 0x0001;

const WM_KEYDOWN: u32 = 0x0100;
const WM_KEYUP: u32 = 0x0101;
const WM_CHAR: u32 = 0x0102;
const WM_DEADCHAR: u32 = 0x0103;
const WM_SYSKEYDOWN: u32 = 0x0104;
const WM_SYSKEYUP: u32 = 0x0105;
const WM_SYSCHAR: u32 = 0x0106;
const WM_HOTKEY: u32 = 0x0312;
const WM_APPCOMMAND: u32 = 0x0319;
const WM_MOUSEMOVE: u32 = 0x0200;
const WM_LBUTTONDOWN: u32 = 0x0201;
const WM_XBUTTONDBLCLK: u32 = 0x020D;
const WM_MOUSEWHEEL: u32 = 0x020A;
const WM_MOUSEHWHEEL: u32 = 0x020E;

/// Parse a `WM_INPUT` lparam.
pub fn read_wm_input(lparam: isize) -> Option<RawMessage> {
    let header = core::mem::size_of::<RAWINPUTHEADER>() as u32;
    unsafe {
        let mut size: u32 = 0;
        let r0 = GetRawInputData(lparam as _, RID_INPUT, core::ptr::null_mut(), &mut size, header);
        if r0 == u32::MAX || size == 0 {
            return None;
        }

        let mut buf = vec![0u8; size as usize];
        let r1 = GetRawInputData(lparam as _, RID_INPUT, buf.as_mut_ptr() as *mut c_void, &mut size, header);
        if r1 == u32::MAX {
            return None;
        }

        read_raw_input_bytes(&buf)
    }
}

/// Parse a `RID_INPUT` buffer copied out of `WM_INPUT`.
pub fn read_raw_input_bytes(buf: &[u8]) -> Option<RawMessage> {
    let hdr_sz = core::mem::size_of::<RAWINPUTHEADER>();
    if buf.len() < hdr_sz {
        return None;
    }

    unsafe {
        let hdr: RAWINPUTHEADER = core::ptr::read_unaligned(buf.as_ptr() as *const RAWINPUTHEADER);
        let handle = RawHandle(hdr.hDevice as isize);
        let data = &buf[hdr_sz..];

        let payload = match hdr.dwType {
            RIM_TYPEKEYBOARD => {
                if data.len() < core::mem::size_of::<RAWKEYBOARD>() {
                    return None;
                }
                let kbd: RAWKEYBOARD = core::ptr::read_unaligned(data.as_ptr() as *const RAWKEYBOARD);
                RawPayload::Keyboard(RawKeyboard {
                    vkey: kbd.VKey,
                    make_code: kbd.MakeCode,
                    flags: kbd.Flags,
                })
            }

            RIM_TYPEMOUSE => {
                if data.len() < core::mem::size_of::<RAWMOUSE>() {
                    return None;
                }
                let m: RAWMOUSE = core::ptr::read_unaligned(data.as_ptr() as *const RAWMOUSE);
                let button_flags = m.Anonymous.Anonymous.usButtonFlags;
                let button_data = m.Anonymous.Anonymous.usButtonData;
                RawPayload::Mouse(RawMouse {
                    absolute: m.usFlags & MOUSE_MOVE_ABSOLUTE != 0,
                    x: m.lLastX,
                    y: m.lLastY,
                    button_flags,
                    wheel_delta: if button_flags & RawMouse::WHEEL != 0 {
                        button_data as i16
                    } else {
                        0
                    },
                })
            }

            RIM_TYPEHID => {
                // RAWHID: dwSizeHid, dwCount, then dwSizeHid * dwCount bytes.
                if data.len() < 8 {
                    return None;
                }
                let size = u32::from_ne_bytes([data[0], data[1], data[2], data[3]]) as usize;
                let count = u32::from_ne_bytes([data[4], data[5], data[6], data[7]]) as usize;
                let len = size.checked_mul(count)?;
                let reports = data.get(8..8 + len)?;
                RawPayload::Hid(reports.to_vec())
            }

            _ => return None,
        };

        Some(RawMessage::new(handle, payload))
    }
}

/// Classify a window message for [`Manager::should_suppress`](crate::manager::Manager::should_suppress).
pub fn legacy_message(msg: u32, wparam: usize) -> LegacyMessage {
    match msg {
        WM_KEYDOWN => LegacyMessage::KeyDown,
        WM_KEYUP | WM_SYSKEYUP => LegacyMessage::KeyUp,
        WM_CHAR | WM_SYSCHAR => LegacyMessage::Char,
        WM_DEADCHAR => LegacyMessage::DeadChar,
        WM_SYSKEYDOWN => LegacyMessage::SysKeyDown(wparam as u16),
        WM_HOTKEY => LegacyMessage::HotKey,
        WM_APPCOMMAND => LegacyMessage::AppCommand,
        WM_MOUSEMOVE => LegacyMessage::MouseMove,
        WM_MOUSEWHEEL | WM_MOUSEHWHEEL => LegacyMessage::MouseWheel,
        WM_LBUTTONDOWN..=WM_XBUTTONDBLCLK => LegacyMessage::MouseButton,
        _ => LegacyMessage::Other,
    }
}

/// RawInput device interface path for a handle (`RIDI_DEVICENAME`).
pub fn device_name(handle: RawHandle) -> Option<String> {
    let hdev = handle.0 as HANDLE;
    unsafe {
        let mut size: u32 = 0;
        let r0 = GetRawInputDeviceInfoW(hdev, RIDI_DEVICENAME, core::ptr::null_mut(), &mut size);
        if r0 == u32::MAX || size == 0 {
            return None;
        }

        let mut wide: Vec<u16> = vec![0u16; size as usize];
        let r1 = GetRawInputDeviceInfoW(hdev, RIDI_DEVICENAME, wide.as_mut_ptr() as *mut c_void, &mut size);
        if r1 == u32::MAX {
            return None;
        }

        while wide.last() == Some(&0) {
            wide.pop();
        }
        Some(String::from_utf16_lossy(&wide))
    }
}

/// `RegisterRawInputDevices` for one usage.
#[derive(Debug, Default)]
pub struct WinRegistrar;

impl RawInputRegistrar for WinRegistrar {
    fn register(
        &mut self,
        usage: HidUsage,
        flags: RegistrationFlags,
        window: Option<WindowHandle>,
    ) -> Result<(), PlatformError> {
        let device = RAWINPUTDEVICE {
            usUsagePage: usage.page,
            usUsage: usage.usage,
            dwFlags: flags.bits(),
            hwndTarget: window.map_or(core::ptr::null_mut(), |w| w.0 as _),
        };
        let ok = unsafe {
            RegisterRawInputDevices(&device, 1, core::mem::size_of::<RAWINPUTDEVICE>() as u32)
        };
        if ok == 0 {
            let code = unsafe { GetLastError() };
            return Err(PlatformError::new(code, "RegisterRawInputDevices failed"));
        }
        Ok(())
    }
}
