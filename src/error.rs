//! Error taxonomy.
//!
//! Only construction and binding failures surface as [`InputError`]. Per-event and per-poll
//! failures are logged and swallowed at the dispatcher boundary so the host's frame loop never
//! sees them; consumers keep reading the last good state instead.

use crate::device::DeviceId;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, InputError>;

/// Errors surfaced to the device factory / binding caller.
#[derive(Debug, Error)]
pub enum InputError {
    /// Capability probing or first registration was rejected by the platform.
    ///
    /// The device must be treated as unusable and discarded.
    #[error("driver error on {device}: {reason}")]
    Driver { device: DeviceId, reason: String },

    #[error("device {0} is not known to this manager")]
    DeviceNotFound(DeviceId),

    #[error("device {device} is not a {expected}")]
    WrongDeviceKind {
        device: DeviceId,
        expected: &'static str,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "hid")]
    #[error("hidapi: {0}")]
    Hid(#[from] hidapi::HidError),
}

impl InputError {
    pub(crate) fn driver(device: DeviceId, reason: impl ToString) -> Self {
        InputError::Driver {
            device,
            reason: reason.to_string(),
        }
    }
}

/// Failure reported by a platform collaborator (registration, capability query, read).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("platform call failed (code {code}): {message}")]
pub struct PlatformError {
    /// OS / driver error code (`GetLastError`, `JOYERR_*`, ...). `0` when unknown.
    pub code: u32,
    pub message: String,
}

impl PlatformError {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
