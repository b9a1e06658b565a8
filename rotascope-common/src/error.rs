//! Shared error types for sensor-profile and axis-orientation handling.

use thiserror::Error;

/// Errors raised while looking up or registering a [`crate::calibration::SensorProfile`].
#[derive(Debug, Clone, Error)]
pub enum ProfileError {
    /// No profile is registered under the given name.
    #[error("unknown sensor profile: {0}")]
    Unknown(String),

    /// A registration attempted to shadow a built-in profile name.
    #[error("cannot override built-in sensor profile: {0}")]
    BuiltinShadowed(String),

    /// A profile parameter was outside its physically valid range.
    #[error("invalid sensor profile {name}: {reason}")]
    InvalidParameters { name: String, reason: String },
}

/// Errors raised while parsing an axis spec such as `"+x"` or `"-z"`.
#[derive(Debug, Clone, Error)]
pub enum AxisSpecError {
    /// The spec was not of the form `[+-][xyz]` (case-insensitive).
    #[error("invalid axis spec: {0:?} (expected one of +x,-x,+y,-y,+z,-z)")]
    Malformed(String),
}
