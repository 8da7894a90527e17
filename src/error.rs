//! Unified error handling for the clustering core.
//!
//! The algorithms themselves are total: empty or undersized input yields an
//! empty result, never an error. Errors exist only for configuration values
//! that make a run meaningless (non-positive radii, zero thresholds), caught
//! before any work starts.

use thiserror::Error;

/// Errors produced by the trajectory clustering core.
#[derive(Debug, Error)]
pub enum TraclusError {
    /// A configuration value is outside its valid range.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TraclusError>;

impl TraclusError {
    /// Shorthand for the common positive-value check.
    pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<()> {
        if value > 0.0 {
            Ok(())
        } else {
            Err(TraclusError::InvalidParameter {
                name,
                value,
                reason: "must be positive",
            })
        }
    }
}
