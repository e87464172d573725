//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! watchface-config.toml file. It plays the role of the resource bundle: colours,
//! text sizes and Y offsets are read-only inputs keyed by name, and nothing in
//! the engine depends on their specific values.

use crate::error::FaceError;
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "watchface-config.toml";

/// Application configuration loaded from watchface-config.toml
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Theme colours
    pub palette: PaletteConfig,
    /// Vertical offsets and spacing
    pub layout: LayoutConfig,
    /// Text sizes with round/square alternates
    pub text: TextConfig,
    /// Screen geometry
    pub display: DisplayConfig,
    /// Interactive redraw timer
    pub timer: TimerConfig,
}

/// Theme colours as `[r, g, b]` triples
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PaletteConfig {
    /// Interactive-mode background
    pub background: [u8; 3],
    /// Primary text (hours, high temperature)
    pub text: [u8; 3],
    /// Secondary text (minutes, date, low temperature, divider)
    pub text_light: [u8; 3],
}

/// Layout offsets in pixels from the top of the viewport
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LayoutConfig {
    /// Baseline of the time row
    pub time_y_offset: i32,
    /// Baseline of the date row
    pub date_y_offset: i32,
    /// Baseline of the temperature row
    pub weather_y_offset: i32,
    /// Y position of the divider line
    pub line_y_offset: i32,
    /// Gap between the high and low temperatures; the divider is 8 of these wide
    pub spacing: i32,
    /// Edge length of the square weather icon
    pub icon_size: u32,
}

/// Text sizes for each screen shape
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TextConfig {
    /// Sizes used on rectangular screens
    pub square: TextSizes,
    /// Sizes used on round screens
    pub round: TextSizes,
}

/// Pixel sizes per text role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TextSizes {
    /// Clock digits
    pub time: u32,
    /// Date line
    pub date: u32,
    /// Temperatures
    pub temp: u32,
}

/// Screen geometry
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Whether the screen is round (selects the round text sizes)
    pub round: bool,
}

/// Interactive redraw timer
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimerConfig {
    /// Tick period while visible and interactive
    pub interactive_update_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            palette: PaletteConfig {
                background: [0x03, 0xA9, 0xF4], // Sunshine blue
                text: [0xFF, 0xFF, 0xFF],
                text_light: [0xB3, 0xE5, 0xFC],
            },
            layout: LayoutConfig {
                time_y_offset: 90,
                date_y_offset: 118,
                weather_y_offset: 170,
                line_y_offset: 136,
                spacing: 10,
                icon_size: 24,
            },
            text: TextConfig {
                square: TextSizes {
                    time: 20,
                    date: 13,
                    temp: 15,
                },
                round: TextSizes {
                    time: 20,
                    date: 14,
                    temp: 18,
                },
            },
            display: DisplayConfig {
                width: 240,
                height: 240,
                round: false,
            },
            timer: TimerConfig {
                interactive_update_rate_ms: 1000,
            },
        }
    }
}

impl PaletteConfig {
    /// Background colour in the display's native format
    pub fn background(&self) -> Rgb565 {
        to_rgb565(self.background)
    }

    /// Primary text colour
    pub fn text(&self) -> Rgb565 {
        to_rgb565(self.text)
    }

    /// Secondary text colour
    pub fn text_light(&self) -> Rgb565 {
        to_rgb565(self.text_light)
    }
}

impl TextConfig {
    /// Sizes for the given screen shape
    pub fn for_shape(&self, round: bool) -> TextSizes {
        if round {
            self.round
        } else {
            self.square
        }
    }
}

fn to_rgb565([r, g, b]: [u8; 3]) -> Rgb565 {
    Rgb888::new(r, g, b).into()
}

impl Config {
    /// Load configuration from watchface-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.as_ref().display());
                config
            }
            Err(FaceError::Io(_)) => {
                info!("No config file found, using default configuration");
                Self::default()
            }
            Err(e) => {
                warn!("Invalid config file format: {}", e);
                warn!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration from specified path, reporting why it failed
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, FaceError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str::<Config>(&contents)?)
    }

    /// Save current configuration to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FaceError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.layout.spacing, 10);
        assert_eq!(config.timer.interactive_update_rate_ms, 1000);
        assert_eq!(config.display.width, 240);
        assert!(!config.display.round);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.layout.time_y_offset, parsed.layout.time_y_offset);
        assert_eq!(config.text.round, parsed.text.round);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.layout.spacing, 10);
        assert!(matches!(
            Config::try_load_from_path("/nonexistent/path"),
            Err(FaceError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[palette\nbackground = 3").unwrap();

        assert!(matches!(
            Config::try_load_from_path(file.path()),
            Err(FaceError::ConfigParse(_))
        ));
        assert_eq!(Config::load_from_path(file.path()).layout.spacing, 10);
    }

    #[test]
    fn test_save_then_load() {
        let file = NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.display.round = true;
        config.layout.spacing = 12;

        config.save(file.path()).unwrap();
        let loaded = Config::load_from_path(file.path());
        assert!(loaded.display.round);
        assert_eq!(loaded.layout.spacing, 12);
    }

    #[test]
    fn test_shape_selects_text_sizes() {
        let config = Config::default();
        assert_eq!(config.text.for_shape(true), config.text.round);
        assert_eq!(config.text.for_shape(false), config.text.square);
    }

    #[test]
    fn test_palette_conversion() {
        let palette = PaletteConfig {
            background: [0, 0, 0],
            text: [0xFF, 0xFF, 0xFF],
            text_light: [0xFF, 0, 0],
        };
        assert_eq!(palette.background(), Rgb565::BLACK);
        assert_eq!(palette.text(), Rgb565::WHITE);
        assert_eq!(palette.text_light(), Rgb565::RED);
    }
}
