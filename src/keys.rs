//! Logical key codes and key state.
//!
//! [`Key`] mirrors the platform virtual-key table. Generic modifier keys
//! ([`Key::ShiftKey`], [`Key::ControlKey`], [`Key::Menu`]) coexist with their side-specific
//! counterparts ([`Key::LShiftKey`], [`Key::RShiftKey`], ...); the keyboard normalizer keeps
//! both in sync so consumers can query either.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Level state of a key or button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    #[default]
    Up,
    Down,
}

impl KeyState {
    #[inline]
    pub fn is_down(self) -> bool {
        self == KeyState::Down
    }

    #[inline]
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            KeyState::Down
        } else {
            KeyState::Up
        }
    }
}

macro_rules! keys {
    ($($name:ident = $vk:literal),* $(,)?) => {
        /// Logical key, keyed by virtual-key code.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum Key {
            $($name = $vk),*
        }

        impl Key {
            /// Every known key, in virtual-key order.
            pub const ALL: &'static [Key] = &[$(Key::$name),*];

            /// Map a raw virtual-key code. Unknown codes yield `None`.
            pub fn from_vk(vk: u16) -> Option<Key> {
                match vk {
                    $($vk => Some(Key::$name),)*
                    _ => None,
                }
            }
        }
    };
}

keys! {
    LButton = 0x01,
    RButton = 0x02,
    Cancel = 0x03,
    MButton = 0x04,
    XButton1 = 0x05,
    XButton2 = 0x06,
    Back = 0x08,
    Tab = 0x09,
    LineFeed = 0x0A,
    Clear = 0x0C,
    Return = 0x0D,
    ShiftKey = 0x10,
    ControlKey = 0x11,
    Menu = 0x12,
    Pause = 0x13,
    CapsLock = 0x14,
    KanaMode = 0x15,
    JunjaMode = 0x17,
    FinalMode = 0x18,
    KanjiMode = 0x19,
    Escape = 0x1B,
    ImeConvert = 0x1C,
    ImeNonconvert = 0x1D,
    ImeAccept = 0x1E,
    ImeModeChange = 0x1F,
    Space = 0x20,
    PageUp = 0x21,
    PageDown = 0x22,
    End = 0x23,
    Home = 0x24,
    Left = 0x25,
    Up = 0x26,
    Right = 0x27,
    Down = 0x28,
    Select = 0x29,
    Print = 0x2A,
    Execute = 0x2B,
    PrintScreen = 0x2C,
    Insert = 0x2D,
    Delete = 0x2E,
    Help = 0x2F,
    D0 = 0x30,
    D1 = 0x31,
    D2 = 0x32,
    D3 = 0x33,
    D4 = 0x34,
    D5 = 0x35,
    D6 = 0x36,
    D7 = 0x37,
    D8 = 0x38,
    D9 = 0x39,
    A = 0x41,
    B = 0x42,
    C = 0x43,
    D = 0x44,
    E = 0x45,
    F = 0x46,
    G = 0x47,
    H = 0x48,
    I = 0x49,
    J = 0x4A,
    K = 0x4B,
    L = 0x4C,
    M = 0x4D,
    N = 0x4E,
    O = 0x4F,
    P = 0x50,
    Q = 0x51,
    R = 0x52,
    S = 0x53,
    T = 0x54,
    U = 0x55,
    V = 0x56,
    W = 0x57,
    X = 0x58,
    Y = 0x59,
    Z = 0x5A,
    LWin = 0x5B,
    RWin = 0x5C,
    Apps = 0x5D,
    Sleep = 0x5F,
    NumPad0 = 0x60,
    NumPad1 = 0x61,
    NumPad2 = 0x62,
    NumPad3 = 0x63,
    NumPad4 = 0x64,
    NumPad5 = 0x65,
    NumPad6 = 0x66,
    NumPad7 = 0x67,
    NumPad8 = 0x68,
    NumPad9 = 0x69,
    Multiply = 0x6A,
    Add = 0x6B,
    Separator = 0x6C,
    Subtract = 0x6D,
    Decimal = 0x6E,
    Divide = 0x6F,
    F1 = 0x70,
    F2 = 0x71,
    F3 = 0x72,
    F4 = 0x73,
    F5 = 0x74,
    F6 = 0x75,
    F7 = 0x76,
    F8 = 0x77,
    F9 = 0x78,
    F10 = 0x79,
    F11 = 0x7A,
    F12 = 0x7B,
    F13 = 0x7C,
    F14 = 0x7D,
    F15 = 0x7E,
    F16 = 0x7F,
    F17 = 0x80,
    F18 = 0x81,
    F19 = 0x82,
    F20 = 0x83,
    F21 = 0x84,
    F22 = 0x85,
    F23 = 0x86,
    F24 = 0x87,
    NumLock = 0x90,
    Scroll = 0x91,
    LShiftKey = 0xA0,
    RShiftKey = 0xA1,
    LControlKey = 0xA2,
    RControlKey = 0xA3,
    LMenu = 0xA4,
    RMenu = 0xA5,
    BrowserBack = 0xA6,
    BrowserForward = 0xA7,
    BrowserRefresh = 0xA8,
    BrowserStop = 0xA9,
    BrowserSearch = 0xAA,
    BrowserFavorites = 0xAB,
    BrowserHome = 0xAC,
    VolumeMute = 0xAD,
    VolumeDown = 0xAE,
    VolumeUp = 0xAF,
    MediaNextTrack = 0xB0,
    MediaPreviousTrack = 0xB1,
    MediaStop = 0xB2,
    MediaPlayPause = 0xB3,
    LaunchMail = 0xB4,
    SelectMedia = 0xB5,
    LaunchApplication1 = 0xB6,
    LaunchApplication2 = 0xB7,
    OemSemicolon = 0xBA,
    OemPlus = 0xBB,
    OemComma = 0xBC,
    OemMinus = 0xBD,
    OemPeriod = 0xBE,
    OemQuestion = 0xBF,
    OemTilde = 0xC0,
    OemOpenBrackets = 0xDB,
    OemPipe = 0xDC,
    OemCloseBrackets = 0xDD,
    OemQuotes = 0xDE,
    Oem8 = 0xDF,
    OemBackslash = 0xE2,
    ProcessKey = 0xE5,
    Packet = 0xE7,
    Attn = 0xF6,
    Crsel = 0xF7,
    Exsel = 0xF8,
    EraseEof = 0xF9,
    Play = 0xFA,
    Zoom = 0xFB,
    Pa1 = 0xFD,
    OemClear = 0xFE,
}

impl Key {
    /// Raw virtual-key code.
    #[inline]
    pub fn vk(self) -> u16 {
        self as u16
    }

    /// Generic parent of a side-specific modifier (`LShiftKey -> ShiftKey`).
    pub fn generic(self) -> Option<Key> {
        match self {
            Key::LShiftKey | Key::RShiftKey => Some(Key::ShiftKey),
            Key::LControlKey | Key::RControlKey => Some(Key::ControlKey),
            Key::LMenu | Key::RMenu => Some(Key::Menu),
            _ => None,
        }
    }

    /// Shift, Control and Menu (generic and side-specific).
    pub fn is_modifier(self) -> bool {
        MODIFIER_KEYS.contains(&self)
    }
}

/// Keys cleared by [`KeyResetMode::ResetModifiers`](crate::state::KeyResetMode).
pub const MODIFIER_KEYS: [Key; 9] = [
    Key::ShiftKey,
    Key::LShiftKey,
    Key::RShiftKey,
    Key::ControlKey,
    Key::LControlKey,
    Key::RControlKey,
    Key::Menu,
    Key::LMenu,
    Key::RMenu,
];

bitflags! {
    /// Modifier summary attached to key edges.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const LSHIFT = 0x01;
        const RSHIFT = 0x02;
        const LCONTROL = 0x04;
        const RCONTROL = 0x08;
        const LALT = 0x10;
        const RALT = 0x20;
    }
}

impl Modifiers {
    pub fn shift(self) -> bool {
        self.intersects(Modifiers::LSHIFT | Modifiers::RSHIFT)
    }

    pub fn control(self) -> bool {
        self.intersects(Modifiers::LCONTROL | Modifiers::RCONTROL)
    }

    pub fn alt(self) -> bool {
        self.intersects(Modifiers::LALT | Modifiers::RALT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vk_table_roundtrips_every_key() {
        for &key in Key::ALL {
            assert_eq!(Key::from_vk(key.vk()), Some(key));
        }
    }

    #[test]
    fn unknown_vk_is_none() {
        assert_eq!(Key::from_vk(0x07), None);
        assert_eq!(Key::from_vk(0xFFFF), None);
    }

    #[test]
    fn side_keys_know_their_parent() {
        assert_eq!(Key::RControlKey.generic(), Some(Key::ControlKey));
        assert_eq!(Key::LMenu.generic(), Some(Key::Menu));
        assert_eq!(Key::A.generic(), None);
    }
}
