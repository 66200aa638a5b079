use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Catalog;
use crate::settings;

pub const DEFAULT_SEARCH_BOX_WIDTH: u16 = 600;
pub const DEFAULT_SEARCH_BOX_HEIGHT: u16 = 60;
pub const DEFAULT_BLUR_AMOUNT: u8 = 20;
pub const DEFAULT_ENGINE_ID: &str = "google";

/// Pixels of backdrop blur per percent of `blur_amount`.
const BLUR_PX_PER_PERCENT: f32 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Overlay settings as returned by `getSettings()` and pushed with `settingsUpdated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    pub blur_amount: u8,
    pub search_box_width: u16,
    pub search_box_height: u16,
    pub default_engine: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            blur_amount: DEFAULT_BLUR_AMOUNT,
            search_box_width: DEFAULT_SEARCH_BOX_WIDTH,
            search_box_height: DEFAULT_SEARCH_BOX_HEIGHT,
            default_engine: DEFAULT_ENGINE_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLayout {
    pub width: u16,
    pub height: u16,
    pub blur_px: f32,
    pub theme: Theme,
}

impl Settings {
    /// Size and blur as applied to the overlay; zero sizes fall back to the defaults and
    /// everything is clamped into the supported ranges.
    pub fn layout(&self) -> OverlayLayout {
        let width = if self.search_box_width == 0 {
            DEFAULT_SEARCH_BOX_WIDTH
        } else {
            self.search_box_width
        };
        let height = if self.search_box_height == 0 {
            DEFAULT_SEARCH_BOX_HEIGHT
        } else {
            self.search_box_height
        };

        OverlayLayout {
            width: width.clamp(settings::MIN_SEARCH_BOX_WIDTH, settings::MAX_SEARCH_BOX_WIDTH),
            height: height.clamp(
                settings::MIN_SEARCH_BOX_HEIGHT,
                settings::MAX_SEARCH_BOX_HEIGHT,
            ),
            blur_px: f32::from(self.blur_amount.min(settings::MAX_BLUR_AMOUNT))
                * BLUR_PX_PER_PERCENT,
            theme: self.theme,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to encode toml: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid json5: {0}")]
    Json5(#[from] json5::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("{0}")]
    Invalid(String),
}

pub fn app_data_dir() -> PathBuf {
    std::env::temp_dir().join("quicksearch")
}

pub fn default_config_path() -> PathBuf {
    app_data_dir().join("config.toml")
}

/// Loads settings from `path` (or the default location). A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(Settings::default());
    }

    let settings: Settings = decode_file(&path)?;
    validate(&settings)?;
    Ok(settings)
}

pub fn save(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    validate(settings)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let encoded = toml::to_string_pretty(settings)?;
    std::fs::write(path, encoded).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads an engine/category snapshot, as exported by the options page.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    decode_file(path)
}

pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    settings::validate_search_box_width(settings.search_box_width).map_err(ConfigError::Invalid)?;
    settings::validate_search_box_height(settings.search_box_height)
        .map_err(ConfigError::Invalid)?;
    settings::validate_blur_amount(settings.blur_amount).map_err(ConfigError::Invalid)?;

    if settings.default_engine.trim().is_empty() {
        return Err(ConfigError::Invalid("defaultEngine is required".into()));
    }

    Ok(())
}

fn decode_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("toml") => Ok(toml::from_str(&raw)?),
        Some("json") | Some("json5") => Ok(json5::from_str(&raw)?),
        _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
}
