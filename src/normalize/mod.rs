//! Normalization engine.
//!
//! Pure functions from raw platform payloads to canonical state. Nothing in here talks to the
//! platform or knows about binding; the dispatcher decides *whether* a payload is applied,
//! these modules decide *how*.

pub mod joystick;
pub mod keyboard;
pub mod mouse;

pub use joystick::{DeadZone, DeadZones};
pub use keyboard::UnifiedKey;
pub use mouse::{MouseConstraints, WheelRange};
