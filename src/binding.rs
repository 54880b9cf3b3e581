//! Binding and acquisition state machine.
//!
//! ```text
//!            bind()               set_acquired(true), window usable
//!  Unbound ─────────▶ Bound ───────────────────────────────────────▶ Acquired
//!     ▲                 ▲  ◀──────────── set_acquired(false) ────────┘   │
//!     │                 │                                                │ focus lost /
//!     │ unbind()        │ set_acquired(false)                            │ window disposing
//!     └──────────────── Lost ◀───────────────────────────────────────────┘
//!                         │  next input attempt with the window focused again
//!                         └───────────────────────────────▶ Acquired (implicit recapture)
//! ```
//!
//! [`Binding`] holds only the flags and the phase. Talking to the platform (registration,
//! message filters) is the dispatcher's job; it asks the binding which flags to use and
//! whether an inbound payload may be applied ([`Binding::admit`]).

use crate::platform::{RegistrationFlags, Window, WindowHandle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Where a device is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindPhase {
    #[default]
    Unbound,
    /// Registered with the platform and attached to a window, but not delivering input.
    Bound,
    Acquired,
    /// Acquisition was requested but the window lost focus or is being torn down.
    /// Input is dropped until the window is usable again.
    Lost,
}

/// Outcome of gating one inbound payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Accept,
    /// Accepted, and acquisition was implicitly restored by this attempt.
    Recaptured,
    Drop,
    /// Dropped, and acquisition was lost by this attempt.
    Lost,
}

impl Admission {
    #[inline]
    pub fn accepts(self) -> bool {
        matches!(self, Admission::Accept | Admission::Recaptured)
    }

    /// `Some(acquired)` when the attempt flipped acquisition.
    pub fn acquisition_change(self) -> Option<bool> {
        match self {
            Admission::Recaptured => Some(true),
            Admission::Lost => Some(false),
            Admission::Accept | Admission::Drop => None,
        }
    }
}

/// Per-device binding flags and phase.
#[derive(Clone, Default)]
pub struct Binding {
    exclusive: bool,
    allow_background: bool,
    /// Joysticks cannot be shared.
    exclusive_locked: bool,
    window: Option<Arc<dyn Window>>,
    phase: BindPhase,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("exclusive", &self.exclusive)
            .field("allow_background", &self.allow_background)
            .field("window", &self.window_handle())
            .field("phase", &self.phase)
            .finish()
    }
}

impl Binding {
    pub fn new(exclusive: bool, allow_background: bool) -> Self {
        Self {
            exclusive,
            allow_background,
            ..Self::default()
        }
    }

    /// Binding for a device that is always exclusive.
    pub fn exclusive_only(allow_background: bool) -> Self {
        Self {
            exclusive: true,
            allow_background,
            exclusive_locked: true,
            ..Self::default()
        }
    }

    #[inline]
    pub fn exclusive(&self) -> bool {
        self.exclusive
    }

    /// Returns whether the value changed. Locked bindings ignore `false`.
    pub(crate) fn set_exclusive(&mut self, exclusive: bool) -> bool {
        let exclusive = exclusive || self.exclusive_locked;
        let changed = self.exclusive != exclusive;
        self.exclusive = exclusive;
        changed
    }

    #[inline]
    pub fn allow_background(&self) -> bool {
        self.allow_background
    }

    pub(crate) fn set_allow_background(&mut self, allow: bool) -> bool {
        let changed = self.allow_background != allow;
        self.allow_background = allow;
        changed
    }

    #[inline]
    pub fn phase(&self) -> BindPhase {
        self.phase
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.phase != BindPhase::Unbound
    }

    #[inline]
    pub fn is_acquired(&self) -> bool {
        self.phase == BindPhase::Acquired
    }

    pub fn window(&self) -> Option<&Arc<dyn Window>> {
        self.window.as_ref()
    }

    pub fn window_handle(&self) -> Option<WindowHandle> {
        self.window.as_ref().map(|w| w.handle())
    }

    /// Platform registration flags for the current `(exclusive, allow_background)` pair.
    pub fn registration_flags(&self) -> RegistrationFlags {
        let mut flags = RegistrationFlags::empty();
        if self.exclusive || self.allow_background {
            flags |= RegistrationFlags::INPUT_SINK;
        }
        if self.exclusive {
            flags |= RegistrationFlags::NO_LEGACY | RegistrationFlags::NO_HOTKEYS;
        }
        flags
    }

    fn window_usable(&self) -> bool {
        match &self.window {
            Some(w) => !w.is_disposing() && (self.allow_background || w.is_focused()),
            None => false,
        }
    }

    /// Record a successful platform registration.
    pub(crate) fn attach(&mut self, window: Arc<dyn Window>) {
        self.window = Some(window);
        self.phase = BindPhase::Bound;
    }

    /// Forget the window and return to `Unbound`. Returns the previous phase.
    pub(crate) fn detach(&mut self) -> BindPhase {
        self.window = None;
        std::mem::take(&mut self.phase)
    }

    /// Explicit acquisition request. Returns the resulting acquired flag.
    ///
    /// Requesting acquisition while the window is unfocused (and background input is off) or
    /// disposing parks the device in `Lost`; the next input attempt after the window becomes
    /// usable recaptures it.
    pub(crate) fn set_acquired(&mut self, acquired: bool) -> bool {
        if !self.is_bound() {
            return false;
        }
        self.phase = match (acquired, self.window_usable()) {
            (false, _) => BindPhase::Bound,
            (true, true) => BindPhase::Acquired,
            (true, false) => BindPhase::Lost,
        };
        self.is_acquired()
    }

    /// Focus notification from the host. Returns `Some(false)` if acquisition was lost.
    ///
    /// Regaining focus does not recapture by itself; that happens on the next
    /// [`admit`](Self::admit).
    pub(crate) fn on_focus_changed(&mut self, focused: bool) -> Option<bool> {
        if !focused && self.phase == BindPhase::Acquired && !self.allow_background {
            self.phase = BindPhase::Lost;
            return Some(false);
        }
        None
    }

    /// Gate one inbound payload against the window state.
    pub(crate) fn admit(&mut self) -> Admission {
        match self.phase {
            BindPhase::Unbound | BindPhase::Bound => Admission::Drop,
            BindPhase::Acquired => {
                if self.window_usable() {
                    Admission::Accept
                } else {
                    self.phase = BindPhase::Lost;
                    Admission::Lost
                }
            }
            BindPhase::Lost => {
                if self.window_usable() {
                    self.phase = BindPhase::Acquired;
                    Admission::Recaptured
                } else {
                    Admission::Drop
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualWindow;

    fn bound(exclusive: bool, window: &Arc<VirtualWindow>) -> Binding {
        let mut b = Binding::new(exclusive, false);
        b.attach(window.clone());
        b
    }

    #[test]
    fn flags_follow_exclusive_and_background() {
        assert_eq!(Binding::new(false, false).registration_flags(), RegistrationFlags::empty());
        assert_eq!(Binding::new(false, true).registration_flags(), RegistrationFlags::INPUT_SINK);
        assert_eq!(
            Binding::new(true, false).registration_flags(),
            RegistrationFlags::INPUT_SINK | RegistrationFlags::NO_LEGACY | RegistrationFlags::NO_HOTKEYS
        );
    }

    #[test]
    fn exclusive_only_cannot_be_shared() {
        let mut b = Binding::exclusive_only(false);
        assert!(!b.set_exclusive(false));
        assert!(b.exclusive());
    }

    #[test]
    fn acquire_on_focused_window() {
        let window = Arc::new(VirtualWindow::new(1));
        let mut b = bound(false, &window);
        assert!(b.set_acquired(true));
        assert_eq!(b.admit(), Admission::Accept);
    }

    #[test]
    fn acquire_on_unfocused_window_parks_in_lost() {
        let window = Arc::new(VirtualWindow::new(1));
        window.set_focused(false);
        let mut b = bound(false, &window);
        assert!(!b.set_acquired(true));
        assert_eq!(b.phase(), BindPhase::Lost);
        assert_eq!(b.admit(), Admission::Drop);

        window.set_focused(true);
        assert_eq!(b.admit(), Admission::Recaptured);
        assert!(b.is_acquired());
    }

    #[test]
    fn focus_loss_then_regain_recaptures_once() {
        let window = Arc::new(VirtualWindow::new(1));
        let mut b = bound(true, &window);
        b.set_acquired(true);

        window.set_focused(false);
        assert_eq!(b.on_focus_changed(false), Some(false));
        assert_eq!(b.admit(), Admission::Drop);

        window.set_focused(true);
        assert_eq!(b.on_focus_changed(true), None);
        assert_eq!(b.admit(), Admission::Recaptured);
        assert_eq!(b.admit(), Admission::Accept);
    }

    #[test]
    fn disposing_window_drops_input() {
        let window = Arc::new(VirtualWindow::new(1));
        let mut b = bound(false, &window);
        b.set_acquired(true);
        window.set_disposing(true);
        assert_eq!(b.admit(), Admission::Lost);
        assert_eq!(b.admit(), Admission::Drop);
    }

    #[test]
    fn explicit_release_is_not_recaptured() {
        let window = Arc::new(VirtualWindow::new(1));
        let mut b = bound(false, &window);
        b.set_acquired(true);
        b.set_acquired(false);
        assert_eq!(b.admit(), Admission::Drop);
        assert_eq!(b.phase(), BindPhase::Bound);
    }

    #[test]
    fn background_devices_ignore_focus() {
        let window = Arc::new(VirtualWindow::new(1));
        let mut b = Binding::new(false, true);
        b.attach(window.clone());
        b.set_acquired(true);
        window.set_focused(false);
        assert_eq!(b.on_focus_changed(false), None);
        assert_eq!(b.admit(), Admission::Accept);
    }
}
