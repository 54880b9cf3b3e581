//! Joystick calibration.
//!
//! Pure functions from a raw sample plus the device's [`JoystickCaps`] to a
//! [`JoystickState`]:
//! - X/Y/Z are stored as reported.
//! - Rudder/U/V go through a [`DeadZone`]: a sample whose distance from the axis midpoint is
//!   below the threshold is stored as the configured centre.
//! - The POV angle is quantized into a [`Direction`] by an exact-boundary table: closed at the
//!   cardinal points (0, 9000, 18000, 27000), open between them.
//! - Buttons are copied bit-for-bit; released buttons read `Up`.

use crate::caps::{Axis, AxisRange, JoystickCaps};
use crate::keys::KeyState;
use crate::platform::RawJoystickSample;
use crate::state::{Direction, JoystickState};
use serde::{Deserialize, Serialize};

/// Largest valid POV reading (hundredths of a degree).
pub const POV_MAX: i32 = 35999;
/// Stored POV value for a centered hat.
pub const POV_CENTERED: i32 = -1;

/// Dead zone for one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeadZone {
    /// Magnitude (distance from the axis midpoint) below which input counts as noise.
    /// `0` disables the filter.
    pub threshold: u32,
    /// Value stored for samples inside the zone. Defaults to the axis midpoint.
    #[serde(default)]
    pub center: Option<i32>,
}

impl DeadZone {
    pub const fn new(threshold: u32) -> Self {
        Self {
            threshold,
            center: None,
        }
    }

    pub const fn with_center(threshold: u32, center: i32) -> Self {
        Self {
            threshold,
            center: Some(center),
        }
    }

    /// Whether `value` falls inside the zone for an axis spanning `range`.
    #[inline]
    pub fn contains(&self, value: i32, range: AxisRange) -> bool {
        let offset = (value as i64 - range.mid() as i64).unsigned_abs();
        offset < self.threshold as u64
    }

    /// Filter one sample.
    #[inline]
    pub fn apply(&self, value: i32, range: AxisRange) -> i32 {
        if self.contains(value, range) {
            self.center.unwrap_or_else(|| range.mid())
        } else {
            value
        }
    }
}

/// Dead zones for the filtered axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeadZones {
    pub rudder: DeadZone,
    pub u: DeadZone,
    pub v: DeadZone,
}

impl DeadZones {
    /// Zone for `axis`; X/Y/Z have none.
    pub fn get(&self, axis: Axis) -> Option<&DeadZone> {
        match axis {
            Axis::Rudder => Some(&self.rudder),
            Axis::U => Some(&self.u),
            Axis::V => Some(&self.v),
            Axis::X | Axis::Y | Axis::Z => None,
        }
    }
}

/// Fold out-of-range POV readings (e.g. the driver's 0xFFFF) into [`POV_CENTERED`].
#[inline]
pub fn normalize_pov(raw: i32) -> i32 {
    if (0..=POV_MAX).contains(&raw) {
        raw
    } else {
        POV_CENTERED
    }
}

/// Quantize a POV angle into a direction.
pub fn pov_direction(pov: i32) -> Direction {
    match normalize_pov(pov) {
        POV_CENTERED => Direction::CENTER,
        0 => Direction::UP,
        9000 => Direction::RIGHT,
        18000 => Direction::DOWN,
        27000 => Direction::LEFT,
        p if p < 9000 => Direction::UP | Direction::RIGHT,
        p if p < 18000 => Direction::DOWN | Direction::RIGHT,
        p if p < 27000 => Direction::DOWN | Direction::LEFT,
        _ => Direction::UP | Direction::LEFT,
    }
}

/// Direction of an axis value relative to its midpoint.
///
/// X/U are horizontal, Y/V vertical (above mid is `UP`), Z/rudder report
/// `LESS_THAN_CENTER` / `MORE_THAN_CENTER`. Values inside the dead zone are `CENTER`.
pub fn axis_direction(axis: Axis, value: i32, range: AxisRange, zone: Option<&DeadZone>) -> Direction {
    if zone.is_some_and(|z| z.contains(value, range)) {
        return Direction::CENTER;
    }
    let mid = range.mid();
    if value == mid {
        return Direction::CENTER;
    }
    let above = value > mid;
    match axis {
        Axis::X | Axis::U => {
            if above {
                Direction::RIGHT
            } else {
                Direction::LEFT
            }
        }
        Axis::Y | Axis::V => {
            if above {
                Direction::UP
            } else {
                Direction::DOWN
            }
        }
        Axis::Z | Axis::Rudder => {
            if above {
                Direction::MORE_THAN_CENTER
            } else {
                Direction::LESS_THAN_CENTER
            }
        }
    }
}

fn raw_axis(sample: &RawJoystickSample, axis: Axis) -> i32 {
    match axis {
        Axis::X => sample.x,
        Axis::Y => sample.y,
        Axis::Z => sample.z,
        Axis::Rudder => sample.rudder,
        Axis::U => sample.u,
        Axis::V => sample.v,
    }
}

/// Fold one raw sample into the state store.
///
/// Only axes present in `caps` are read from the sample; fields the device lacks are never
/// touched, so their stored values stay at their defaults.
pub fn apply_sample(
    caps: &JoystickCaps,
    zones: &DeadZones,
    sample: &RawJoystickSample,
    state: &mut JoystickState,
) {
    for (index, axis) in caps.axes() {
        let range = caps.axis_ranges[index];
        let raw = raw_axis(sample, axis);
        let zone = zones.get(axis);
        let value = match zone {
            Some(zone) => zone.apply(raw, range),
            None => raw,
        };
        state.axes[index] = value;
        state.axis_directions[index] = axis_direction(axis, raw, range, zone);
    }

    if caps.has_pov() {
        for (pov, direction) in state.pov.iter_mut().zip(state.pov_direction.iter_mut()) {
            *pov = normalize_pov(sample.pov);
            *direction = pov_direction(*pov);
        }
    }

    for (index, button) in state.buttons.iter_mut().enumerate().take(32) {
        *button = KeyState::from_pressed(sample.buttons & (1 << index) != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{JoystickProbe, PovSupport};

    fn caps(rudder: bool) -> JoystickCaps {
        JoystickCaps::from_probe(&JoystickProbe {
            name: "t".into(),
            x: AxisRange::new(-1000, 1000),
            y: AxisRange::new(-1000, 1000),
            z: Some(AxisRange::new(0, 1000)),
            rudder: rudder.then_some(AxisRange::new(-1000, 1000)),
            u: None,
            v: None,
            button_count: 3,
            pov: PovSupport::Continuous,
            vendor_id: 0,
            product_id: 0,
        })
    }

    #[test]
    fn pov_cardinals_are_exact() {
        assert_eq!(pov_direction(0), Direction::UP);
        assert_eq!(pov_direction(9000), Direction::RIGHT);
        assert_eq!(pov_direction(18000), Direction::DOWN);
        assert_eq!(pov_direction(27000), Direction::LEFT);
        assert_eq!(pov_direction(-1), Direction::CENTER);
    }

    #[test]
    fn pov_near_cardinal_reports_diagonal() {
        assert_eq!(pov_direction(1), Direction::UP | Direction::RIGHT);
        assert_eq!(pov_direction(8999), Direction::UP | Direction::RIGHT);
        assert_eq!(pov_direction(9001), Direction::DOWN | Direction::RIGHT);
        assert_eq!(pov_direction(17999), Direction::DOWN | Direction::RIGHT);
        assert_eq!(pov_direction(18001), Direction::DOWN | Direction::LEFT);
        assert_eq!(pov_direction(26999), Direction::DOWN | Direction::LEFT);
        assert_eq!(pov_direction(27001), Direction::UP | Direction::LEFT);
        assert_eq!(pov_direction(35999), Direction::UP | Direction::LEFT);
    }

    #[test]
    fn pov_out_of_range_is_centered() {
        assert_eq!(normalize_pov(0xFFFF), POV_CENTERED);
        assert_eq!(normalize_pov(36000), POV_CENTERED);
        assert_eq!(pov_direction(0xFFFF), Direction::CENTER);
    }

    #[test]
    fn dead_zone_snaps_to_configured_center() {
        let range = AxisRange::new(-1000, 1000);
        let zone = DeadZone::with_center(100, 7);
        assert_eq!(zone.apply(-99, range), 7);
        assert_eq!(zone.apply(99, range), 7);
        assert_eq!(zone.apply(100, range), 100);
        assert_eq!(zone.apply(-100, range), -100);
    }

    #[test]
    fn dead_zone_measures_from_midpoint() {
        let range = AxisRange::new(0, 65534);
        let zone = DeadZone::new(500);
        assert_eq!(zone.apply(32767 + 499, range), 32767);
        assert_eq!(zone.apply(32767 + 500, range), 32767 + 500);
    }

    #[test]
    fn zero_threshold_disables_the_filter() {
        let range = AxisRange::new(-10, 10);
        assert_eq!(DeadZone::new(0).apply(0, range), 0);
        assert_eq!(DeadZone::new(0).apply(1, range), 1);
    }

    #[test]
    fn throttle_passes_through_unfiltered() {
        let caps = caps(true);
        let zones = DeadZones {
            rudder: DeadZone::new(500),
            ..DeadZones::default()
        };
        let mut state = JoystickState::new(&caps);
        let sample = RawJoystickSample {
            x: 3,
            y: -4,
            z: 501,
            rudder: 120,
            ..RawJoystickSample::default()
        };
        apply_sample(&caps, &zones, &sample, &mut state);

        assert_eq!(state.axis(&caps, Axis::X), 3);
        assert_eq!(state.axis(&caps, Axis::Y), -4);
        assert_eq!(state.axis(&caps, Axis::Z), 501);
        assert_eq!(state.axis(&caps, Axis::Rudder), 0);
        assert_eq!(state.direction(&caps, Axis::Rudder), Direction::CENTER);
        assert_eq!(state.direction(&caps, Axis::Z), Direction::MORE_THAN_CENTER);
    }

    #[test]
    fn released_buttons_report_up() {
        let caps = caps(false);
        let mut state = JoystickState::new(&caps);
        let zones = DeadZones::default();

        let pressed = RawJoystickSample {
            buttons: 0b101,
            ..RawJoystickSample::default()
        };
        apply_sample(&caps, &zones, &pressed, &mut state);
        assert_eq!(state.buttons, vec![KeyState::Down, KeyState::Up, KeyState::Down]);

        apply_sample(&caps, &zones, &RawJoystickSample::default(), &mut state);
        assert_eq!(state.buttons, vec![KeyState::Up; 3]);
    }

    #[test]
    fn axis_direction_orientation() {
        let r = AxisRange::new(-10, 10);
        assert_eq!(axis_direction(Axis::X, 5, r, None), Direction::RIGHT);
        assert_eq!(axis_direction(Axis::U, -5, r, None), Direction::LEFT);
        assert_eq!(axis_direction(Axis::Y, 5, r, None), Direction::UP);
        assert_eq!(axis_direction(Axis::V, -5, r, None), Direction::DOWN);
        assert_eq!(axis_direction(Axis::Rudder, -5, r, None), Direction::LESS_THAN_CENTER);
        assert_eq!(axis_direction(Axis::X, 0, r, None), Direction::CENTER);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pov_direction_is_never_empty(pov in any::<i32>()) {
                let d = pov_direction(pov);
                prop_assert!(!d.is_empty());
                prop_assert!(d.bits().count_ones() <= 2);
            }

            #[test]
            fn dead_zone_output_is_center_or_input(
                min in -10_000i32..0,
                max in 1i32..10_000,
                threshold in 0u32..5_000,
                value in -10_000i32..10_000,
            ) {
                let range = AxisRange::new(min, max);
                let out = DeadZone::new(threshold).apply(value, range);
                prop_assert!(out == value || out == range.mid());
            }

            #[test]
            fn unsupported_axes_are_never_written(
                rudder in any::<i32>(),
                u in any::<i32>(),
                v in any::<i32>(),
            ) {
                let caps = caps(false);
                let mut state = JoystickState::new(&caps);
                let sample = RawJoystickSample { rudder, u, v, ..RawJoystickSample::default() };
                apply_sample(&caps, &DeadZones::default(), &sample, &mut state);
                prop_assert_eq!(state.axes.len(), 3);
                prop_assert_eq!(state.axis(&caps, Axis::Rudder), 0);
            }
        }
    }
}
