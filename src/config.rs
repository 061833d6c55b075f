// Configuration management
//
// User-configurable display settings with TOML persistence.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::compositor::ComposeOptions;
use crate::pack::Depth;

/// Default configuration file path
const CONFIG_FILE: &str = "display_config.toml";

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Video settings
    pub video: VideoSettings,

    /// Screenshot settings
    pub screenshot: ScreenshotSettings,
}

/// Video settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Window scale (1-4)
    pub scale: u32,

    /// Stretch the picture to a 5:4 aspect
    pub aspect_54: bool,

    /// Double scan lines vertically
    pub line_double: bool,

    /// Enable fullscreen
    pub fullscreen: bool,

    /// Target FPS (the emulated machine runs at 50)
    pub fps: u32,

    /// Preferred surface depth in bits (8, 16, 24 or 32)
    pub depth_bits: u32,
}

/// Screenshot settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotSettings {
    /// Screenshot directory
    pub directory: PathBuf,

    /// Include timestamp in filename
    pub include_timestamp: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            video: VideoSettings {
                scale: 2,
                aspect_54: true,
                line_double: false,
                fullscreen: false,
                fps: 50,
                depth_bits: 32,
            },
            screenshot: ScreenshotSettings {
                directory: PathBuf::from("screenshots"),
                include_timestamp: true,
            },
        }
    }
}

impl DisplayConfig {
    /// Load configuration from file or create default
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration and saves it to the file.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save();
            config
        })
    }

    /// Load configuration from file
    pub fn load() -> Result<Self, io::Error> {
        let contents = fs::read_to_string(CONFIG_FILE)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(CONFIG_FILE, contents)
    }

    /// Preferred surface depth; unknown bit counts fall back to 32
    pub fn preferred_depth(&self) -> Depth {
        Depth::from_bits(self.video.depth_bits).unwrap_or(Depth::Rgba8888)
    }

    /// Compositor options derived from the video settings
    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            aspect_54: self.video.aspect_54,
            line_double: self.video.line_double,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.video.scale, 2);
        assert_eq!(config.video.fps, 50);
        assert!(config.video.aspect_54);
        assert_eq!(config.preferred_depth(), Depth::Rgba8888);
    }

    #[test]
    fn test_unknown_depth_falls_back() {
        let mut config = DisplayConfig::default();
        config.video.depth_bits = 15;
        assert_eq!(config.preferred_depth(), Depth::Rgba8888);
        config.video.depth_bits = 16;
        assert_eq!(config.preferred_depth(), Depth::Rgb565);
    }

    #[test]
    fn test_config_serialization() {
        let config = DisplayConfig::default();
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let deserialized: DisplayConfig =
            toml::from_str(&toml_str).expect("Failed to deserialize");
        assert_eq!(deserialized.video.scale, config.video.scale);
        assert_eq!(deserialized.screenshot.directory, config.screenshot.directory);
    }

    #[test]
    fn test_compose_options() {
        let mut config = DisplayConfig::default();
        config.video.aspect_54 = false;
        config.video.line_double = true;
        let options = config.compose_options();
        assert!(!options.aspect_54);
        assert!(options.line_double);
    }
}
