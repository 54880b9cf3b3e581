use holdfast::normalize::joystick::{pov_direction, DeadZone};
use holdfast::normalize::keyboard::{self, RIGHT_SHIFT_MAKE_CODE};
use holdfast::platform::{JoystickProbe, RawKeyboard};
use holdfast::state::KeyStates;
use holdfast::{AxisRange, Direction, JoystickCaps, Key};
use proptest::prelude::*;

const VK_SHIFT: u16 = 0x10;

proptest! {
    #[test]
    fn pov_between_cardinals_is_a_diagonal(pov in 0i32..36000) {
        prop_assume!(pov % 9000 != 0);
        let expected = match pov {
            p if p < 9000 => Direction::UP | Direction::RIGHT,
            p if p < 18000 => Direction::DOWN | Direction::RIGHT,
            p if p < 27000 => Direction::DOWN | Direction::LEFT,
            _ => Direction::UP | Direction::LEFT,
        };
        prop_assert_eq!(pov_direction(pov), expected);
    }

    #[test]
    fn dead_zone_hit_stores_the_configured_center(
        x in -999i32..1000,
        threshold in 1u32..2000,
        center in -50i32..50,
    ) {
        prop_assume!(x.unsigned_abs() < threshold);
        let zone = DeadZone::with_center(threshold, center);
        prop_assert_eq!(zone.apply(x, AxisRange::new(-1000, 1000)), center);
    }

    #[test]
    fn shift_updates_generic_and_one_side_only(
        make in 0u16..0x80,
        flags in 0u16..8,
        seeded in proptest::collection::vec(0usize..Key::ALL.len(), 0..8),
    ) {
        let mut keys = KeyStates::new();
        for i in seeded {
            let k = Key::ALL[i];
            if !matches!(k, Key::ShiftKey | Key::LShiftKey | Key::RShiftKey) {
                keys.set(k, holdfast::KeyState::Down);
            }
        }
        let before = keys.clone();
        let raw = RawKeyboard { vkey: VK_SHIFT, make_code: make, flags };
        let unified = keyboard::unify(&raw).unwrap();
        keyboard::apply(&mut keys, &unified);

        let side = if make == RIGHT_SHIFT_MAKE_CODE { Key::RShiftKey } else { Key::LShiftKey };
        prop_assert_eq!(unified.key, side);
        prop_assert_eq!(keys.get(side), keys.get(Key::ShiftKey));
        for &k in Key::ALL {
            if k != side && k != Key::ShiftKey {
                prop_assert_eq!(keys.get(k), before.get(k));
            }
        }
    }

    #[test]
    fn rudder_adds_exactly_one_axis(z: bool, u: bool, v: bool) {
        let range = Some(AxisRange::new(0, 100));
        let mut probe = JoystickProbe {
            z: z.then_some(AxisRange::new(0, 100)),
            u: u.then_some(AxisRange::new(0, 100)),
            v: v.then_some(AxisRange::new(0, 100)),
            ..JoystickProbe::default()
        };
        let without = JoystickCaps::from_probe(&probe).axis_count();
        probe.rudder = range;
        prop_assert_eq!(JoystickCaps::from_probe(&probe).axis_count(), without + 1);
    }
}
