//! Scene configuration
//!
//! Scenes can be configured in code or from a TOML file:
//!
//! ```toml
//! width = 1280
//! height = 720
//! fps = 30
//! background = "#141414"
//!
//! [rough]
//! roughness = 2.0
//! fill_style = "cross-hatch"
//! ```
//!
//! Every field is optional and falls back to [`SceneConfig::hd`].

use std::fs;
use std::path::Path;

use motif_core::{Color, Vector2};
use motif_paint::RoughConfig;
use serde::{Deserialize, Serialize};

use crate::error::SceneResult;

/// Canvas size, frame rate and scene-wide defaults
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Fill for the whole view, drawn before any node
    #[serde(default)]
    pub background: Option<Color>,
    /// Rough settings new nodes start from
    #[serde(default)]
    pub rough: RoughConfig,
}

fn default_width() -> f64 {
    1920.0
}

fn default_height() -> f64 {
    1080.0
}

fn default_fps() -> f64 {
    60.0
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::hd()
    }
}

impl SceneConfig {
    /// 1920×1080 at 60 fps
    pub fn hd() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            background: None,
            rough: RoughConfig::default(),
        }
    }

    /// 960×540 at 30 fps, for quick previews
    pub fn preview() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
            fps: 30.0,
            ..Self::hd()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = Some(background);
        self
    }

    pub fn size(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    pub fn from_toml_str(content: &str) -> SceneResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use motif_paint::RoughFillStyle;

    #[test]
    fn test_presets() {
        assert_eq!(SceneConfig::default(), SceneConfig::hd());
        assert_eq!(SceneConfig::hd().size(), Vector2::new(1920.0, 1080.0));

        let preview = SceneConfig::preview();
        assert_eq!(preview.size(), Vector2::new(960.0, 540.0));
        assert_eq!(preview.fps, 30.0);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = SceneConfig::from_toml_str(
            r##"
            width = 1280
            fps = 24
            background = "#ff0000"

            [rough]
            roughness = 2.5
            fill_style = "cross-hatch"
            "##,
        )
        .unwrap();

        assert_eq!(config.width, 1280.0);
        assert_eq!(config.height, 1080.0);
        assert_eq!(config.fps, 24.0);
        assert_eq!(config.background, Some(Color::RED));
        assert_eq!(config.rough.roughness, 2.5);
        assert_eq!(config.rough.fill_style, RoughFillStyle::CrossHatch);
        assert_eq!(config.rough.hachure_angle, -41.0);
    }

    #[test]
    fn test_invalid_toml() {
        let err = SceneConfig::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));

        let err = SceneConfig::from_toml_str("background = \"#nothex\"").unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SceneConfig::load("/definitely/not/here/scene.toml").unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
