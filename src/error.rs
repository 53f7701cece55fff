//! Unified error type for the fallible edges of the crate.
//!
//! The geometry core itself never fails; degenerate input degrades to zeroed
//! results. Errors only arise when loading configuration or decoding
//! coordinate buffers handed over from a mobile bridge.

use thiserror::Error;

/// Errors produced by configuration loading and buffer decoding.
#[derive(Debug, Error)]
#[cfg_attr(feature = "ffi", derive(uniffi::Error), uniffi(flat_error))]
pub enum RouteError {
    /// A tuning parameter is non-finite or outside its allowed range.
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// The configuration JSON could not be parsed.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A flat `[lat, lng, ...]` buffer had an odd number of values.
    #[error("flat coordinate buffer has odd length {len}")]
    OddCoordinateBuffer { len: usize },

    /// A decoded coordinate was NaN, infinite or outside WGS84 range.
    #[error("invalid coordinate at point index {index}")]
    InvalidPoint { index: usize },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RouteError>;
