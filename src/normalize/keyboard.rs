//! Key unification.
//!
//! Raw keyboards report the generic modifier virtual keys (`SHIFT`, `CONTROL`, `MENU`) and leave
//! the side to be inferred:
//! - Control / Alt: the E0 prefix marks the right-hand key.
//! - Shift: there is no E0 on most hardware, so the side comes from the make code
//!   ([`RIGHT_SHIFT_MAKE_CODE`] means right, anything else left).
//!
//! Every unified event writes the side-specific key *and* its generic parent to the same state,
//! so `KeyStates[ControlKey]` and `KeyStates[LControlKey]` never disagree after a call.
//! Autorepeat downs are not filtered here.

use crate::keys::{Key, KeyState};
use crate::platform::RawKeyboard;
use crate::state::KeyStates;

/// Hardware make code of the right Shift key.
pub const RIGHT_SHIFT_MAKE_CODE: u16 = 0x36;

/// Result of unifying one raw keyboard packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnifiedKey {
    /// Side-specific key when one was resolved, otherwise the literal key.
    pub key: Key,
    /// Generic parent written alongside `key` (`None` for non-modifier keys).
    pub generic: Option<Key>,
    pub state: KeyState,
    /// Raw make code, forwarded to edge listeners.
    pub scan_code: u16,
}

/// Resolve the logical key(s) for a raw packet. Unknown virtual keys yield `None`.
pub fn unify(raw: &RawKeyboard) -> Option<UnifiedKey> {
    let literal = Key::from_vk(raw.vkey)?;
    let state = KeyState::from_pressed(!raw.is_break());

    let side = match literal {
        Key::ControlKey => Some(if raw.is_e0() {
            Key::RControlKey
        } else {
            Key::LControlKey
        }),
        Key::Menu => Some(if raw.is_e0() { Key::RMenu } else { Key::LMenu }),
        Key::ShiftKey => Some(if raw.make_code == RIGHT_SHIFT_MAKE_CODE {
            Key::RShiftKey
        } else {
            Key::LShiftKey
        }),
        _ => None,
    };

    Some(match side {
        Some(side) => UnifiedKey {
            key: side,
            generic: Some(literal),
            state,
            scan_code: raw.make_code,
        },
        None => UnifiedKey {
            key: literal,
            generic: None,
            state,
            scan_code: raw.make_code,
        },
    })
}

/// Write a unified key into the store: the resolved key first, then the generic parent.
pub fn apply(keys: &mut KeyStates, unified: &UnifiedKey) {
    keys.set(unified.key, unified.state);
    if let Some(generic) = unified.generic {
        keys.set(generic, unified.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VK_SHIFT: u16 = 0x10;
    const VK_CONTROL: u16 = 0x11;
    const VK_MENU: u16 = 0x12;

    #[test]
    fn control_side_follows_e0() {
        let left = unify(&RawKeyboard::down(VK_CONTROL, 0x1D)).unwrap();
        assert_eq!(left.key, Key::LControlKey);
        assert_eq!(left.generic, Some(Key::ControlKey));

        let right = unify(&RawKeyboard::down(VK_CONTROL, 0x1D).extended()).unwrap();
        assert_eq!(right.key, Key::RControlKey);
    }

    #[test]
    fn alt_side_follows_e0() {
        assert_eq!(unify(&RawKeyboard::down(VK_MENU, 0x38)).unwrap().key, Key::LMenu);
        assert_eq!(
            unify(&RawKeyboard::up(VK_MENU, 0x38).extended()).unwrap(),
            UnifiedKey {
                key: Key::RMenu,
                generic: Some(Key::Menu),
                state: KeyState::Up,
                scan_code: 0x38,
            }
        );
    }

    #[test]
    fn shift_side_ignores_e0_and_uses_make_code() {
        let right = unify(&RawKeyboard::down(VK_SHIFT, RIGHT_SHIFT_MAKE_CODE)).unwrap();
        assert_eq!(right.key, Key::RShiftKey);

        // E0 on the left make code still means left.
        let left = unify(&RawKeyboard::down(VK_SHIFT, 0x2A).extended()).unwrap();
        assert_eq!(left.key, Key::LShiftKey);
    }

    #[test]
    fn plain_keys_have_no_generic() {
        let a = unify(&RawKeyboard::down(0x41, 0x1E)).unwrap();
        assert_eq!(a.key, Key::A);
        assert_eq!(a.generic, None);
    }

    #[test]
    fn unknown_vkey_is_dropped() {
        assert_eq!(unify(&RawKeyboard::down(0xFF, 0)), None);
    }

    #[test]
    fn apply_writes_side_and_generic() {
        let mut keys = KeyStates::new();
        let u = unify(&RawKeyboard::down(VK_CONTROL, 0x1D)).unwrap();
        apply(&mut keys, &u);
        assert!(keys.is_down(Key::LControlKey));
        assert!(keys.is_down(Key::ControlKey));
        assert!(!keys.is_down(Key::RControlKey));
    }
}
