//! Surface and sketch configuration.

use crate::stroke::Brush;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Largest buffer side, in device pixels.
pub const MAX_PIXEL_SIDE: u32 = 16_384;

/// Largest buffer area, in device pixels (256 MiB of RGBA).
pub const MAX_PIXELS: u64 = 8_192 * 8_192;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[error("Invalid device pixel ratio: {0}")]
    InvalidPixelRatio(f64),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Drawing area in logical units plus the display's pixel density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub device_pixel_ratio: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceConfig {
    /// Create a validated configuration.
    pub fn new(device_pixel_ratio: f64, width: f64, height: f64) -> Result<Self, ConfigError> {
        let config = Self {
            device_pixel_ratio,
            width,
            height,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that sizes and ratio are finite and positive, and that the
    /// buffer stays within [`MAX_PIXEL_SIDE`] and [`MAX_PIXELS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dpr = self.device_pixel_ratio;
        if !dpr.is_finite() || dpr <= 0.0 {
            return Err(ConfigError::InvalidPixelRatio(dpr));
        }
        let invalid_size = || ConfigError::InvalidSize {
            width: self.width,
            height: self.height,
        };
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(invalid_size());
        }

        let device_width = (self.width * dpr).ceil();
        let device_height = (self.height * dpr).ceil();
        let max_side = MAX_PIXEL_SIDE as f64;
        if device_width > max_side
            || device_height > max_side
            || device_width * device_height > MAX_PIXELS as f64
        {
            return Err(invalid_size());
        }
        Ok(())
    }

    /// Buffer size in device pixels, at least 1x1.
    ///
    /// Unvalidated configurations are clamped to [`MAX_PIXEL_SIDE`] per side
    /// and shrunk proportionally to fit [`MAX_PIXELS`].
    pub fn pixel_size(&self) -> (u32, u32) {
        let width = to_pixels(self.width * self.device_pixel_ratio);
        let height = to_pixels(self.height * self.device_pixel_ratio);
        let area = width as u64 * height as u64;
        if area <= MAX_PIXELS {
            return (width, height);
        }
        let shrink = (MAX_PIXELS as f64 / area as f64).sqrt();
        let fit = |side: u32| ((side as f64 * shrink).floor() as u32).max(1);
        (fit(width), fit(height))
    }

    /// Buffer width in device pixels (at least 1).
    pub fn pixel_width(&self) -> u32 {
        self.pixel_size().0
    }

    /// Buffer height in device pixels (at least 1).
    pub fn pixel_height(&self) -> u32 {
        self.pixel_size().1
    }

    /// Logical-to-device scale, falling back to 1 for invalid ratios.
    pub fn scale(&self) -> f64 {
        if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            width: 600.0,
            height: 400.0,
        }
    }
}

fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 1.0 {
        value.ceil().min(MAX_PIXEL_SIDE as f64) as u32
    } else {
        1
    }
}

/// Sketch settings loaded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Brush active when the sketch is mounted.
    pub brush: Brush,
    /// Initial surface size.
    pub surface: SurfaceConfig,
    /// Scale the rendered width by pen pressure.
    pub pressure_sensitive: bool,
}

impl SketchConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.surface.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
