//! Per-frame snapshot of device states.
//!
//! [`Snapshot`] is an **owned**, read-only copy of every device's binding phase and state
//! store at one point in time, produced by [`Manager::snapshot`](crate::manager::Manager::snapshot).
//! It does not poll; call [`Manager::poll`](crate::manager::Manager::poll) first if joystick
//! values should be fresh.
//!
//! ```no_run
//! # fn show(snap: &holdfast::Snapshot) -> holdfast::Result<()> {
//! for (id, dev) in snap.iter() {
//!     println!("{id}: {} acquired={}", dev.name, dev.acquired);
//! }
//! println!("{}", snap.to_json()?);
//! # Ok(())
//! # }
//! ```

use crate::binding::BindPhase;
use crate::device::{DeviceId, DeviceKind, InputDevice};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// One device inside a [`Snapshot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceSnapshot {
    pub name: String,
    pub phase: BindPhase,
    pub acquired: bool,
    pub exclusive: bool,
    pub allow_background: bool,
    /// Capability descriptor and state store.
    pub device: DeviceKind,
}

impl From<&InputDevice> for DeviceSnapshot {
    fn from(device: &InputDevice) -> Self {
        let binding = device.binding();
        Self {
            name: device.name().to_owned(),
            phase: binding.phase(),
            acquired: binding.is_acquired(),
            exclusive: binding.exclusive(),
            allow_background: binding.allow_background(),
            device: device.kind().clone(),
        }
    }
}

/// Owned snapshot (`DeviceId → DeviceSnapshot`), ordered by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot(pub BTreeMap<DeviceId, DeviceSnapshot>);

impl Snapshot {
    #[inline]
    pub fn get(&self, id: DeviceId) -> Option<&DeviceSnapshot> {
        self.0.get(&id)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &DeviceSnapshot)> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn into_inner(self) -> BTreeMap<DeviceId, DeviceSnapshot> {
        self.0
    }

    /// Pretty-printed JSON dump for diagnostics. Device ids become string keys.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> FromIterator<&'a InputDevice> for Snapshot {
    fn from_iter<I: IntoIterator<Item = &'a InputDevice>>(iter: I) -> Self {
        Snapshot(iter.into_iter().map(|d| (d.id(), DeviceSnapshot::from(d))).collect())
    }
}
