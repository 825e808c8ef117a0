//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use parallax_starfield::{FieldSettings, LayerDefinition};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Page surface settings.
    pub window: WindowConfig,
    /// Starfield layers and tiling.
    pub starfield: StarfieldConfig,
    /// Headless frame output.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Page surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Heading rendered over the starfield.
    pub title: String,
}

/// One depth layer before scatter is applied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayerConfig {
    /// Core opacity (0.0 - 1.0).
    pub brightness: f32,
    /// Stars per density cell.
    pub density: u32,
    /// Star radius in pixels.
    pub radius: f32,
    /// Scroll speed in pixels per second.
    pub speed: f32,
}

/// Starfield configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Side of the cell that `density` is measured against, in pixels.
    pub density_tile_size: f32,
    /// Tiles hold this many cells' worth of stars.
    pub scatter_coefficient: u32,
    /// Hues per layer.
    pub palette_size: u32,
    /// Per-star speed spread relative to the layer speed (0.0 - 2.0).
    pub speed_variance: f32,
    /// Layers, nearest first.
    pub layers: Vec<LayerConfig>,
}

/// Headless rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Frames to simulate before tearing down.
    pub frames: u32,
    /// Frame rate of the host loop (0 = unthrottled at a simulated 60 Hz).
    pub target_fps: u32,
    /// Directory for written frames.
    pub output_dir: PathBuf,
    /// Write every Nth frame (0 = only the last frame).
    pub snapshot_every: u32,
    /// Write SVG pages.
    pub write_svg: bool,
    /// Write rasterized PNG frames.
    pub write_png: bool,
    /// Grow the viewport linearly to this size over the run.
    pub grow_to: Option<(u32, u32)>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to the platform log directory.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Melody Universe".to_string(),
        }
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            density: 1,
            radius: 2.0,
            speed: 2.0,
        }
    }
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            density_tile_size: 100.0,
            scatter_coefficient: 3,
            palette_size: 10,
            speed_variance: 0.8,
            layers: vec![
                LayerConfig {
                    brightness: 1.0,
                    density: 1,
                    radius: 2.5,
                    speed: 4.0,
                },
                LayerConfig {
                    brightness: 0.5,
                    density: 2,
                    radius: 2.0,
                    speed: 2.0,
                },
                LayerConfig {
                    brightness: 0.25,
                    density: 3,
                    radius: 1.5,
                    speed: 1.0,
                },
            ],
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            target_fps: 60,
            output_dir: PathBuf::from("frames"),
            snapshot_every: 0,
            write_svg: true,
            write_png: false,
            grow_to: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

impl StarfieldConfig {
    /// Engine settings with scatter applied to tile size and densities.
    pub fn to_settings(&self) -> FieldSettings {
        let layers: Vec<LayerDefinition> = self
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                LayerDefinition::new(
                    index,
                    layer.brightness,
                    layer.density,
                    layer.radius,
                    layer.speed,
                )
            })
            .collect();
        FieldSettings::scattered(
            self.density_tile_size,
            self.scatter_coefficient,
            self.palette_size,
            self.speed_variance,
            &layers,
        )
    }
}

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

impl Config {
    /// Load `config.ron` from `config_dir`, writing the defaults there first if
    /// the file does not exist yet.
    ///
    /// A file whose starfield section the engine would reject is an error, so
    /// a bad edit is reported against the file rather than at startup of the
    /// render loop.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);

        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;
        let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.clone(),
            source,
        })?;
        if let Err(source) = config.starfield.to_settings().validate() {
            return Err(ConfigError::InvalidStarfield { path, source });
        }
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to `config_dir` as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&path, serialized).map_err(|source| ConfigError::WriteError { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("scatter_coefficient: 3"));
        assert!(ron_str.contains("Melody Universe"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.render.grow_to = Some((1920, 1080));
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(window: (width: 800), render: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.starfield, StarfieldConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_custom_layers_parse() {
        let ron_str = "(starfield: (layers: [(brightness: 0.7, density: 5, speed: 9.0)]))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.starfield.layers.len(), 1);
        let layer = config.starfield.layers[0];
        assert_eq!(layer.density, 5);
        // Omitted radius falls back to the layer default.
        assert_eq!(layer.radius, 2.0);
    }

    #[test]
    fn test_to_settings_applies_scatter() {
        let settings = StarfieldConfig::default().to_settings();
        assert_eq!(settings, FieldSettings::default());
        assert!((settings.tile_size - 173.205).abs() < 1e-2);
        assert_eq!(settings.layers[2].density, 9);
        assert_eq!(settings.layers[2].index, 2);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.window.height = 1080;
        config.starfield.palette_size = 6;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "(window: (width: \"wide\"))").unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => {
                assert_eq!(path, &dir.path().join(CONFIG_FILE_NAME));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_read_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        std::fs::create_dir(dir.path().join(CONFIG_FILE_NAME)).unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(
            &err,
            ConfigError::ReadError { path, .. } if path.ends_with(CONFIG_FILE_NAME)
        ));
    }

    #[test]
    fn test_invalid_starfield_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.starfield.layers.clear();
        config.save(dir.path()).unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidStarfield {
                source: parallax_starfield::FieldError::NoLayers,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_ron_comments_preserved() {
        let ron_str = "// This is a comment\n(\n  // Another comment\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
