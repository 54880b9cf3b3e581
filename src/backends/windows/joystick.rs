//! Legacy joystick driver (winmm `joyGetDevCapsW` / `joyGetPosEx`).

use crate::caps::AxisRange;
use crate::error::PlatformError;
use crate::platform::{JoystickDriver, JoystickProbe, PovSupport, RawJoystickSample, ReadFields};
use windows_sys::Win32::Media::Multimedia::{joyGetDevCapsW, joyGetNumDevs, joyGetPosEx, JOYCAPSW, JOYINFOEX};

// Local constants (avoid relying on module exports that vary by windows-sys version)
const JOYERR_NOERROR: u32 = 0;
const JOYCAPS_HASZ: u32 = 0x0001;
const JOYCAPS_HASR: u32 = 0x0002;
const JOYCAPS_HASU: u32 = 0x0004;
const JOYCAPS_HASV: u32 = 0x0008;
const JOYCAPS_HASPOV: u32 = 0x0010;
const JOYCAPS_POVCTS: u32 = 0x0040;

fn range(min: u32, max: u32) -> AxisRange {
    AxisRange::new(min as i32, max as i32)
}

fn joy_error(code: u32, call: &str) -> PlatformError {
    PlatformError::new(code, format!("{call} failed"))
}

/// winmm joystick API.
#[derive(Debug, Default)]
pub struct WinmmJoysticks;

impl WinmmJoysticks {
    fn pos(id: u32, flags: u32) -> Result<JOYINFOEX, PlatformError> {
        let mut info: JOYINFOEX = unsafe { core::mem::zeroed() };
        info.dwSize = core::mem::size_of::<JOYINFOEX>() as u32;
        info.dwFlags = flags;
        let code = unsafe { joyGetPosEx(id, &mut info) };
        if code != JOYERR_NOERROR {
            return Err(joy_error(code, "joyGetPosEx"));
        }
        Ok(info)
    }
}

impl JoystickDriver for WinmmJoysticks {
    fn slot_count(&self) -> u32 {
        unsafe { joyGetNumDevs() }
    }

    fn probe(&self, id: u32) -> Result<JoystickProbe, PlatformError> {
        let mut caps: JOYCAPSW = unsafe { core::mem::zeroed() };
        let code = unsafe { joyGetDevCapsW(id as usize, &mut caps, core::mem::size_of::<JOYCAPSW>() as u32) };
        if code != JOYERR_NOERROR {
            return Err(joy_error(code, "joyGetDevCapsW"));
        }

        let has = |flag: u32| caps.wCaps & flag != 0;
        let name_len = caps.szPname.iter().position(|&c| c == 0).unwrap_or(caps.szPname.len());
        let pov = if !has(JOYCAPS_HASPOV) {
            PovSupport::None
        } else if has(JOYCAPS_POVCTS) {
            PovSupport::Continuous
        } else {
            PovSupport::Discrete
        };

        Ok(JoystickProbe {
            name: String::from_utf16_lossy(&caps.szPname[..name_len]),
            x: range(caps.wXmin, caps.wXmax),
            y: range(caps.wYmin, caps.wYmax),
            z: has(JOYCAPS_HASZ).then(|| range(caps.wZmin, caps.wZmax)),
            rudder: has(JOYCAPS_HASR).then(|| range(caps.wRmin, caps.wRmax)),
            u: has(JOYCAPS_HASU).then(|| range(caps.wUmin, caps.wUmax)),
            v: has(JOYCAPS_HASV).then(|| range(caps.wVmin, caps.wVmax)),
            button_count: caps.wNumButtons,
            pov,
            vendor_id: caps.wMid,
            product_id: caps.wPid,
        })
    }

    fn read(&mut self, id: u32, fields: ReadFields) -> Result<RawJoystickSample, PlatformError> {
        let info = Self::pos(id, fields.bits())?;
        Ok(RawJoystickSample {
            x: info.dwXpos as i32,
            y: info.dwYpos as i32,
            z: info.dwZpos as i32,
            rudder: info.dwRpos as i32,
            u: info.dwUpos as i32,
            v: info.dwVpos as i32,
            pov: info.dwPOV as i32,
            buttons: info.dwButtons,
        })
    }

    fn is_connected(&self, id: u32) -> bool {
        Self::pos(id, ReadFields::X.bits()).is_ok()
    }
}
