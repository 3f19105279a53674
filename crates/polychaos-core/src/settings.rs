//! Application settings files (TOML or JSON, picked by extension).

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec4;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::GameSettings;

pub const DEFAULT_FADE_WINDOW: u32 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Ticks until a point has faded out completely. Zero disables fading.
    pub fade_window: u32,
    /// Alpha a fully faded point is still drawn with. Zero keeps the plain fade.
    pub residual_alpha: f32,
    pub steps_per_frame: usize,
    pub point_color: Vec4,
    pub vertex_color: Vec4,
    pub background: Vec4,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            fade_window: DEFAULT_FADE_WINDOW,
            residual_alpha: 0.0,
            steps_per_frame: 50,
            point_color: Vec4::new(0.95, 0.95, 1.0, 1.0),
            vertex_color: Vec4::new(1.0, 0.35, 0.35, 1.0),
            background: Vec4::new(0.05, 0.05, 0.08, 1.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub game: GameSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML settings: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to write TOML settings: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported settings format for {0} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, SettingsError> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(SettingsError::UnsupportedFormat(path.to_path_buf())),
    }
}

impl AppSettings {
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let format = format_of(path)?;
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = match format {
            Format::Toml => Self::from_toml_str(&text)?,
            Format::Json => Self::from_json_str(&text)?,
        };
        info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = match format_of(path)? {
            Format::Toml => toml::to_string_pretty(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        fs::write(path, text).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("saved settings to {}", path.display());
        Ok(())
    }
}
