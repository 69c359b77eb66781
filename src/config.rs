//! Editor configuration supplied by the host page as JSON.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    DEFAULT_FOV_Y_DEG, DEFAULT_MAX_FRAME, DEFAULT_MAX_RADIUS, DEFAULT_MIN_RADIUS, DEFAULT_ORBIT_SENSITIVITY,
    DEFAULT_PHI, DEFAULT_RADIUS, DEFAULT_ROTATE_SENSITIVITY, DEFAULT_THETA, DEFAULT_ZOOM_STEP, MAX_TIMELINE_FRAMES,
    PHI_EPSILON,
};
use crate::error::ErrorCode;
use crate::keyframe::RotationInterpolation;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_CONFIG_PARSE",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

/// Tunables for one editor instance. Every field is optional in the JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Last frame of the timeline, inclusive.
    pub max_frame: u32,
    pub orbit_sensitivity: f32,
    pub rotate_sensitivity: f32,
    pub zoom_step: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub initial_radius: f32,
    pub initial_theta: f32,
    pub initial_phi: f32,
    pub fov_y_deg: f32,
    pub rotation_interpolation: RotationInterpolation,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_frame: DEFAULT_MAX_FRAME,
            orbit_sensitivity: DEFAULT_ORBIT_SENSITIVITY,
            rotate_sensitivity: DEFAULT_ROTATE_SENSITIVITY,
            zoom_step: DEFAULT_ZOOM_STEP,
            min_radius: DEFAULT_MIN_RADIUS,
            max_radius: DEFAULT_MAX_RADIUS,
            initial_radius: DEFAULT_RADIUS,
            initial_theta: DEFAULT_THETA,
            initial_phi: DEFAULT_PHI,
            fov_y_deg: DEFAULT_FOV_Y_DEG,
            rotation_interpolation: RotationInterpolation::Euler,
            log_level: "info".into(),
        }
    }
}

impl EditorConfig {
    /// Parse host JSON, filling absent fields with defaults, and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame > MAX_TIMELINE_FRAMES {
            return Err(invalid("max_frame", format!("must be at most {MAX_TIMELINE_FRAMES}")));
        }
        for (field, value) in [
            ("orbit_sensitivity", self.orbit_sensitivity),
            ("rotate_sensitivity", self.rotate_sensitivity),
            ("zoom_step", self.zoom_step),
            ("min_radius", self.min_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("must be positive, got {value}")));
            }
        }
        if !(self.max_radius.is_finite() && self.max_radius >= self.min_radius) {
            return Err(invalid("max_radius", format!("must be at least min_radius ({})", self.min_radius)));
        }
        if !(self.min_radius..=self.max_radius).contains(&self.initial_radius) {
            return Err(invalid("initial_radius", "must lie within min_radius..=max_radius".into()));
        }
        if !self.initial_theta.is_finite() {
            return Err(invalid("initial_theta", "must be finite".into()));
        }
        if !(PHI_EPSILON..=std::f32::consts::PI - PHI_EPSILON).contains(&self.initial_phi) {
            return Err(invalid("initial_phi", "must lie strictly between the poles".into()));
        }
        if !(self.fov_y_deg > 1.0 && self.fov_y_deg < 179.0) {
            return Err(invalid("fov_y_deg", format!("must be between 1 and 179, got {}", self.fov_y_deg)));
        }
        self.level_filter().map(|_| ())
    }

    /// Parsed `log_level`.
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        self.log_level
            .parse::<log::LevelFilter>()
            .map_err(|_| invalid("log_level", format!("unknown level '{}'", self.log_level)))
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
