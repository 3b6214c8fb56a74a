// Settings for the scratch screen, read from `scratch.toml` if it exists.
// Every field has a default, so an empty or missing file gives the stock screen.

use crate::canvas::ShaderBounds;
use crate::error::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "scratch.toml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub title: String,
    pub width: usize,              // initial window size
    pub height: usize,
    pub margin: f32,               // gap between window edge and the card's box
    pub background: u32,           // 0x00RRGGBB behind the card
    pub stroke_width: f32,         // scratch pen width in pixels
    pub min_distance: f32,         // travel before a press becomes a scratch
    pub image_service: String,     // host of the random-image service
    pub image_category: String,    // last path segment of the image URI
    pub placeholder: Option<PathBuf>, // PNG/JPEG drawn on the card instead of the built-in one
    pub shader_bounds: ShaderBounds,
    pub log_level: String,         // error | warn | info | debug | trace
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Scratch".into(),
            width: 480,
            height: 640,
            margin: 16.0,
            background: 0x00_FF_FF_FF,
            stroke_width: 50.0,
            min_distance: 1.0,
            image_service: "loremflickr.com".into(),
            image_category: "cats".into(),
            placeholder: None,
            shader_bounds: ShaderBounds::Surface,
            log_level: "info".into(),
        }
    }
}

impl AppConfig {
    /// Missing file: defaults. Unreadable or malformed file: error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let cfg: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        if !(cfg.stroke_width.is_finite() && cfg.stroke_width >= 0.0) {
            return Err(Error::Config(format!("stroke_width must be >= 0, got {}", cfg.stroke_width)));
        }
        if !(cfg.margin.is_finite() && cfg.margin >= 0.0) {
            return Err(Error::Config(format!("margin must be >= 0, got {}", cfg.margin)));
        }
        Ok(cfg)
    }

    pub fn max_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_stock_screen() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let cfg = AppConfig::from_toml(
            r#"
            stroke_width = 30.0
            image_category = "dogs"
            shader_bounds = "stroke"
            background = 0x202020
            "#,
        )
        .unwrap();
        assert_eq!(cfg.stroke_width, 30.0);
        assert_eq!(cfg.image_category, "dogs");
        assert_eq!(cfg.shader_bounds, ShaderBounds::Stroke);
        assert_eq!(cfg.background, 0x202020);
        assert_eq!(cfg.margin, 16.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::from_toml("stroke_width = -1.0").is_err());
        assert!(AppConfig::from_toml("margin = -4.0").is_err());
        assert!(AppConfig::from_toml("strok_width = 3.0").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let cfg = AppConfig::load("/no/such/dir/scratch.toml").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_log_level_parse_falls_back() {
        let mut cfg = AppConfig::default();
        cfg.log_level = "debug".into();
        assert_eq!(cfg.max_level(), tracing::Level::DEBUG);
        cfg.log_level = "loud".into();
        assert_eq!(cfg.max_level(), tracing::Level::INFO);
    }
}
