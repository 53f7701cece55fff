//! Tuning parameters for route editing and run tracking.
//!
//! The values here are empirical: they were chosen for feel on a phone map,
//! not derived. They are kept configurable so a host app can retune them
//! (e.g. a larger glitch threshold for cycling).

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

/// Configuration for freehand route editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct EditorConfig {
    /// Minimum screen distance between consecutive points of one stroke.
    /// Default: 4.0 px
    pub draw_throttle_px: f64,

    /// Brush radius used by [`RouteEditor::erase`](crate::RouteEditor::erase).
    /// Default: 18.0 px
    pub erase_radius_px: f64,

    /// Douglas-Peucker tolerance applied when a stroke ends.
    /// Default: 2.0 meters
    pub simplify_tolerance_m: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            draw_throttle_px: 4.0,
            erase_radius_px: 18.0,
            simplify_tolerance_m: 2.0,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their default value.
    ///
    /// ```
    /// use route_tracker::EditorConfig;
    ///
    /// let config = EditorConfig::from_json(r#"{"erase_radius_px": 24.0}"#).unwrap();
    /// assert_eq!(config.erase_radius_px, 24.0);
    /// assert_eq!(config.draw_throttle_px, 4.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is finite and in range.
    pub fn validate(&self) -> Result<()> {
        non_negative("draw_throttle_px", self.draw_throttle_px)?;
        positive("erase_radius_px", self.erase_radius_px)?;
        non_negative("simplify_tolerance_m", self.simplify_tolerance_m)?;
        Ok(())
    }
}

/// Configuration for live progress tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct TrackerConfig {
    /// GPS deltas at or above this distance are treated as jumps and not
    /// added to the distance run. Assumes pedestrian speeds and typical
    /// GPS noise.
    /// Default: 100.0 meters
    pub glitch_threshold_m: f64,

    /// Route progress at or above which the run counts as complete.
    /// Default: 0.98
    pub completion_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            glitch_threshold_m: 100.0,
            completion_threshold: 0.98,
        }
    }
}

impl TrackerConfig {
    /// Parse a config from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is finite and in range.
    pub fn validate(&self) -> Result<()> {
        positive("glitch_threshold_m", self.glitch_threshold_m)?;
        positive("completion_threshold", self.completion_threshold)?;
        if self.completion_threshold > 1.0 {
            return Err(RouteError::InvalidConfig {
                field: "completion_threshold",
                reason: format!("must be at most 1.0, got {}", self.completion_threshold),
            });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(RouteError::InvalidConfig {
            field,
            reason: format!("must be finite and >= 0, got {value}"),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RouteError::InvalidConfig {
            field,
            reason: format!("must be finite and > 0, got {value}"),
        });
    }
    Ok(())
}
