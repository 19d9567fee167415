//! Display configuration.
//!
//! A `DisplayConfig` is fixed for the lifetime of a `RowDisplay`. Changing
//! any value means building a new display.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default 7-bit I2C address of SSD1306 modules.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Geometry and cadence of a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Panel width in pixels.
    pub width: u32,
    /// Panel height in pixels.
    pub height: u32,
    /// Glyph height in pixels; one row is this tall.
    pub font_size: u32,
    /// Render ticks per second.
    pub refresh_rate: u32,
    /// Vertical offset added to every row.
    pub y_offset: i32,
    /// Bus address used when probing an I2C panel.
    pub i2c_address: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 32,
            font_size: 8,
            refresh_rate: 1,
            y_offset: 0,
            i2c_address: DEFAULT_I2C_ADDRESS,
        }
    }
}

impl DisplayConfig {
    /// Create a configuration with the given geometry and default offsets.
    pub fn new(width: u32, height: u32, font_size: u32, refresh_rate: u32) -> Self {
        Self {
            width,
            height,
            font_size,
            refresh_rate,
            ..Self::default()
        }
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check that the geometry yields at least one row and the cadence is non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "display size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.font_size == 0 {
            return Err(ConfigError::Invalid("font_size must be non-zero".into()));
        }
        if self.font_size > self.height {
            return Err(ConfigError::Invalid(format!(
                "font_size {} is taller than the display ({} px)",
                self.font_size, self.height
            )));
        }
        if self.refresh_rate == 0 {
            return Err(ConfigError::Invalid("refresh_rate must be non-zero".into()));
        }
        Ok(())
    }

    /// Number of text rows that fit on the panel.
    #[inline]
    pub const fn row_count(&self) -> usize {
        (self.height / self.font_size) as usize
    }

    /// Number of square characters that fit on one row.
    ///
    /// Only used when the rasterizer does not report its glyph width; see
    /// `RowDisplay::columns`.
    #[inline]
    pub const fn columns(&self) -> usize {
        (self.width / self.font_size) as usize
    }

    /// Time between two render ticks.
    #[inline]
    pub fn tick(&self) -> Duration {
        Duration::from_secs(1) / self.refresh_rate
    }

    /// Top edge of a row on the canvas.
    #[inline]
    pub fn row_y(&self, row: usize) -> i32 {
        let row = i32::try_from(row).unwrap_or(i32::MAX);
        let font_size = i32::try_from(self.font_size).unwrap_or(i32::MAX);
        row.saturating_mul(font_size).saturating_add(self.y_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.width, 128);
        assert_eq!(config.height, 32);
        assert_eq!(config.font_size, 8);
        assert_eq!(config.refresh_rate, 1);
        assert_eq!(config.row_count(), 4);
        assert_eq!(config.columns(), 16);
        assert_eq!(config.tick(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_row_count_floors() {
        let config = DisplayConfig::new(128, 64, 10, 1);
        assert_eq!(config.row_count(), 6);
    }

    #[test]
    fn test_row_y() {
        let mut config = DisplayConfig::default();
        assert_eq!(config.row_y(0), 0);
        assert_eq!(config.row_y(2), 16);
        config.y_offset = 2;
        assert_eq!(config.row_y(3), 26);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = DisplayConfig::from_toml_str("height = 64\nrefresh_rate = 4\n").unwrap();
        assert_eq!(config.width, 128);
        assert_eq!(config.height, 64);
        assert_eq!(config.row_count(), 8);
        assert_eq!(config.tick(), Duration::from_millis(250));
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = DisplayConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(DisplayConfig::new(0, 32, 8, 1).validate().is_err());
        assert!(DisplayConfig::new(128, 32, 0, 1).validate().is_err());
        assert!(DisplayConfig::new(128, 32, 8, 0).validate().is_err());
        assert!(DisplayConfig::new(128, 4, 8, 1).validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("display.toml");
        std::fs::write(&path, "width = 64\nfont_size = 16\n").unwrap();

        let config = DisplayConfig::load(&path).unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.row_count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DisplayConfig::load("/nonexistent/display.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
