//! # Playback Error Types
//!
//! Feed playback commands never fail: unmet preconditions are no-ops and
//! engine failures travel through the state-change channel. The errors below
//! are only returned when a setting is rejected before it is stored.

use thiserror::Error;

/// Errors returned by eager validation in the playback core.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// A setting is outside its accepted domain.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid volume value (must be in range [0.0, 1.0]).
    #[error("Invalid volume: {0} (must be between 0.0 and 1.0)")]
    InvalidVolume(f32),

    /// Invalid trigger offset (must be in range [0.0, 1.0]).
    #[error("Invalid trigger offset: {0} (must be between 0.0 and 1.0)")]
    InvalidTriggerOffset(f32),

    /// Feed configuration rejected by the runtime builder.
    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),
}

impl PlaybackError {
    /// Returns `true` if the error comes from a value outside `[0.0, 1.0]`.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            PlaybackError::InvalidVolume(_) | PlaybackError::InvalidTriggerOffset(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Accept `value` when it is a finite fraction in `0.0..=1.0`.
pub(crate) fn is_unit_fraction(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
