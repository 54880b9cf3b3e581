//! Capability descriptors.
//!
//! A descriptor is produced once per device at discovery time and never changes afterwards.
//! Joystick descriptors are the interesting ones: the axis table is built incrementally from
//! what the platform probe reported, so an axis index is only meaningful relative to the
//! optional axes counted before it.
//!
//! ## Axis order
//! `X`, `Y` are always present (indices 0 and 1). Then, each only if probed:
//! `Z` (throttle), `Rudder`, `U`, `V`. A device with Z and V but no rudder/U maps
//! `Z -> 2`, `V -> 3`.

use crate::platform::{JoystickProbe, PovSupport, ReadFields};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Inclusive integer range reported by the platform for an axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    /// Placeholder for an axis the device does not have.
    pub const EMPTY: AxisRange = AxisRange { min: 0, max: 0 };

    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }

    /// Midpoint of the range; the "centered" value of an axis.
    #[inline]
    pub fn mid(&self) -> i32 {
        // i64 avoids overflow on full-width i32 ranges.
        (self.min as i64 + (self.max as i64 - self.min as i64) / 2) as i32
    }

    #[inline]
    pub fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Physical joystick axes in probe order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    /// Throttle.
    Z,
    Rudder,
    U,
    V,
}

impl Axis {
    pub const ALL: [Axis; 6] = [Axis::X, Axis::Y, Axis::Z, Axis::Rudder, Axis::U, Axis::V];

    /// Rudder, U and V are filtered through a dead zone; X/Y/Z pass through.
    #[inline]
    pub fn uses_dead_zone(self) -> bool {
        matches!(self, Axis::Rudder | Axis::U | Axis::V)
    }
}

bitflags! {
    /// Extra features positively probed on a joystick.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CapabilityFlags: u16 {
        const SUPPORTS_THROTTLE = 0x0001;
        const SUPPORTS_RUDDER = 0x0002;
        const SUPPORTS_POV = 0x0004;
        const SUPPORTS_DISCREET_POV = 0x0008;
        const SUPPORTS_CONTINUOUS_POV = 0x0010;
        const SUPPORTS_U_AXIS = 0x0020;
        const SUPPORTS_V_AXIS = 0x0040;
    }
}

/// Immutable joystick capability descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoystickCaps {
    pub name: String,
    /// One entry per counted axis, in [axis order](self#axis-order). Always `len() >= 2`.
    pub axis_ranges: Vec<AxisRange>,
    pub button_count: u32,
    /// `0` or `1` on legacy hardware.
    pub pov_count: u32,
    pub flags: CapabilityFlags,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl JoystickCaps {
    /// Build the descriptor from a platform probe.
    ///
    /// Flags are set only for features the probe reported; optional axes append to
    /// `axis_ranges` in order (Z, rudder, U, V).
    pub fn from_probe(probe: &JoystickProbe) -> Self {
        let mut flags = CapabilityFlags::empty();
        let mut axis_ranges = vec![probe.x, probe.y];

        let optional = [
            (probe.z, CapabilityFlags::SUPPORTS_THROTTLE),
            (probe.rudder, CapabilityFlags::SUPPORTS_RUDDER),
            (probe.u, CapabilityFlags::SUPPORTS_U_AXIS),
            (probe.v, CapabilityFlags::SUPPORTS_V_AXIS),
        ];
        for (range, flag) in optional {
            if let Some(range) = range {
                flags |= flag;
                axis_ranges.push(range);
            }
        }

        let pov_count = match probe.pov {
            PovSupport::None => 0,
            PovSupport::Discrete => {
                flags |= CapabilityFlags::SUPPORTS_POV | CapabilityFlags::SUPPORTS_DISCREET_POV;
                1
            }
            PovSupport::Continuous => {
                flags |= CapabilityFlags::SUPPORTS_POV | CapabilityFlags::SUPPORTS_CONTINUOUS_POV;
                1
            }
        };

        Self {
            name: probe.name.clone(),
            axis_ranges,
            button_count: probe.button_count,
            pov_count,
            flags,
            vendor_id: probe.vendor_id,
            product_id: probe.product_id,
        }
    }

    #[inline]
    pub fn axis_count(&self) -> usize {
        self.axis_ranges.len()
    }

    pub fn supports(&self, axis: Axis) -> bool {
        match axis {
            Axis::X | Axis::Y => true,
            Axis::Z => self.flags.contains(CapabilityFlags::SUPPORTS_THROTTLE),
            Axis::Rudder => self.flags.contains(CapabilityFlags::SUPPORTS_RUDDER),
            Axis::U => self.flags.contains(CapabilityFlags::SUPPORTS_U_AXIS),
            Axis::V => self.flags.contains(CapabilityFlags::SUPPORTS_V_AXIS),
        }
    }

    /// Index of `axis` in the state store, or `None` if the device lacks it.
    pub fn axis_index(&self, axis: Axis) -> Option<usize> {
        if !self.supports(axis) {
            return None;
        }
        Some(
            Axis::ALL
                .iter()
                .take_while(|&&a| a != axis)
                .filter(|&&a| self.supports(a))
                .count(),
        )
    }

    /// Supported axes paired with their state-store index.
    pub fn axes(&self) -> impl Iterator<Item = (usize, Axis)> + '_ {
        Axis::ALL
            .iter()
            .copied()
            .filter(|&a| self.supports(a))
            .enumerate()
    }

    pub fn range(&self, axis: Axis) -> Option<AxisRange> {
        self.axis_index(axis).map(|i| self.axis_ranges[i])
    }

    pub fn has_pov(&self) -> bool {
        self.flags.contains(CapabilityFlags::SUPPORTS_POV)
    }

    /// Sub-fields the poller may request from the driver. Unsupported fields are never asked
    /// for; some drivers return garbage for them.
    pub fn read_fields(&self) -> ReadFields {
        let mut fields = ReadFields::X | ReadFields::Y | ReadFields::BUTTONS;
        if self.supports(Axis::Z) {
            fields |= ReadFields::Z;
        }
        if self.supports(Axis::Rudder) {
            fields |= ReadFields::RUDDER;
        }
        if self.supports(Axis::U) {
            fields |= ReadFields::U;
        }
        if self.supports(Axis::V) {
            fields |= ReadFields::V;
        }
        if self.flags.contains(CapabilityFlags::SUPPORTS_CONTINUOUS_POV) {
            fields |= ReadFields::POV_CONTINUOUS;
        } else if self.has_pov() {
            fields |= ReadFields::POV;
        }
        fields
    }
}

/// Generic HID descriptor (diagnostic identity plus top-level usage).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HidCaps {
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage_page: u16,
    pub usage: u16,
}
