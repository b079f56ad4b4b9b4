//! Overlay configuration.
//!
//! Only presentation and logging live here. The search itself is session
//! state and is never written to disk.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::canvas::Rgba;
use crate::error::{Error, Result};
use crate::layout::LabelMetrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub marker_radius: f32,
    pub marker_thickness: f32,
    /// Gap between the marker circle and the label box.
    pub label_offset: f32,
    pub label_padding: Vec2,
    pub label_rounding: f32,
    pub marker_color: Rgba,
    pub label_background: Rgba,
    pub text_color: Rgba,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            marker_radius: 5.0,
            marker_thickness: 2.0,
            label_offset: 3.0,
            label_padding: Vec2::new(4.0, 2.0),
            label_rounding: 3.0,
            marker_color: Rgba::new(1.0, 0.2, 0.2, 1.0),
            label_background: Rgba::new(0.0, 0.0, 0.0, 0.7),
            text_color: Rgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

impl OverlayStyle {
    pub fn metrics(&self) -> LabelMetrics {
        LabelMetrics {
            marker_radius: self.marker_radius,
            label_offset: self.label_offset,
            padding: self.label_padding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub style: OverlayStyle,
    /// Skip drawing entirely while the player is in PvP content.
    pub hide_in_pvp: bool,
    /// `tracing` filter directive used when the host initialises logging.
    pub log_level: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            style: OverlayStyle::default(),
            hide_in_pvp: true,
            log_level: "info".to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self> {
        toml::from_str(raw).map_err(|source| Error::ParseConfig {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw, path)?;
        tracing::debug!(?path, "Loaded overlay config");
        Ok(config)
    }

    /// Like [`OverlayConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(?path, "No overlay config found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = OverlayConfig::from_toml_str("", Path::new("esp.toml")).unwrap();
        assert_eq!(config, OverlayConfig::default());
    }

    #[test]
    fn partial_style_keeps_other_defaults() {
        let raw = r#"
            hide_in_pvp = false

            [style]
            marker_radius = 8.0
            text_color = [1.0, 1.0, 0.0, 1.0]
        "#;
        let config = OverlayConfig::from_toml_str(raw, Path::new("esp.toml")).unwrap();

        assert!(!config.hide_in_pvp);
        assert_eq!(config.style.marker_radius, 8.0);
        assert_eq!(config.style.text_color, Rgba::new(1.0, 1.0, 0.0, 1.0));
        assert_eq!(config.style.label_offset, OverlayStyle::default().label_offset);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn malformed_file_reports_path() {
        let err = OverlayConfig::from_toml_str("style = 3", Path::new("bad.toml")).unwrap_err();
        match err {
            Error::ParseConfig { path, .. } => assert_eq!(path, Path::new("bad.toml")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("esp.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();

        let config = OverlayConfig::load(&path).unwrap();
        assert_eq!(config.log_level, "debug");

        let missing = OverlayConfig::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(missing, OverlayConfig::default());
        assert!(matches!(
            OverlayConfig::load(dir.path().join("missing.toml")),
            Err(Error::ReadConfig { .. })
        ));
    }
}
