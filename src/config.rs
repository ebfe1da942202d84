//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rstree/rstree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `RSTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, EditorFeatures};
use crate::domain::layout::{default_palette, LayoutParams};

/// Geometry settings for the layout pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    /// Width assumed until the rendering surface reports a measurement
    pub default_node_width: f64,
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    /// Horizontal center of the root
    pub origin_x: f64,
    /// Top of the root row
    pub origin_y: f64,
    /// Depth-indexed node colors
    pub palette: Vec<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let params = LayoutParams::default();
        Self {
            default_node_width: params.default_node_width,
            horizontal_gap: params.horizontal_gap,
            vertical_gap: params.vertical_gap,
            origin_x: params.origin_x,
            origin_y: params.origin_y,
            palette: default_palette(),
        }
    }
}

/// Optional editor capabilities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureSettings {
    pub relink: bool,
    pub categories: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            relink: true,
            categories: true,
        }
    }
}

/// Raw layout config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayoutSettings {
    pub default_node_width: Option<f64>,
    pub horizontal_gap: Option<f64>,
    pub vertical_gap: Option<f64>,
    pub origin_x: Option<f64>,
    pub origin_y: Option<f64>,
    pub palette: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFeatureSettings {
    pub relink: Option<bool>,
    pub categories: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_label: Option<String>,
    pub highlight_anchor: Option<u64>,
    pub layout: RawLayoutSettings,
    pub features: RawFeatureSettings,
}

/// Unified configuration for rstree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Label of the root node of a new tree
    pub root_label: String,
    /// Node whose subtree gets highlighted connectors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_anchor: Option<u64>,
    pub layout: LayoutSettings,
    pub features: FeatureSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_label: "System".into(),
            highlight_anchor: None,
            layout: LayoutSettings::default(),
            features: FeatureSettings::default(),
        }
    }
}

/// Get the XDG config directory for rstree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rstree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rstree.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file, applied over the global one
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_file {
            let path = expand_path(path);
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            current = current.merge_with(&load_raw_settings(&path)?);
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;
        Ok(current)
    }

    /// Defaults overlaid with a single file; no global config, no environment.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let settings = Self::default().merge_with(&load_raw_settings(path)?);
        settings.validate()?;
        Ok(settings)
    }

    /// Overlay wins for every field it specifies; arrays are replaced.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        let layout = &overlay.layout;
        let features = &overlay.features;
        Self {
            root_label: overlay
                .root_label
                .clone()
                .unwrap_or_else(|| self.root_label.clone()),
            highlight_anchor: overlay.highlight_anchor.or(self.highlight_anchor),
            layout: LayoutSettings {
                default_node_width: layout
                    .default_node_width
                    .unwrap_or(self.layout.default_node_width),
                horizontal_gap: layout.horizontal_gap.unwrap_or(self.layout.horizontal_gap),
                vertical_gap: layout.vertical_gap.unwrap_or(self.layout.vertical_gap),
                origin_x: layout.origin_x.unwrap_or(self.layout.origin_x),
                origin_y: layout.origin_y.unwrap_or(self.layout.origin_y),
                palette: layout
                    .palette
                    .clone()
                    .unwrap_or_else(|| self.layout.palette.clone()),
            },
            features: FeatureSettings {
                relink: features.relink.unwrap_or(self.features.relink),
                categories: features.categories.unwrap_or(self.features.categories),
            },
        }
    }

    /// Apply RSTREE_* environment variables as explicit overrides.
    ///
    /// Nested keys use `__`: `RSTREE_LAYOUT__HORIZONTAL_GAP=60`.
    /// The palette is a comma separated list.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RSTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("layout.palette"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("root_label") {
            settings.root_label = val;
        }
        if let Ok(val) = config.get_int("highlight_anchor") {
            let anchor = u64::try_from(val)
                .map_err(|_| invalid(format!("highlight_anchor must be a node id, got {}", val)))?;
            settings.highlight_anchor = Some(anchor);
        }
        if let Ok(val) = config.get_float("layout.default_node_width") {
            settings.layout.default_node_width = val;
        }
        if let Ok(val) = config.get_float("layout.horizontal_gap") {
            settings.layout.horizontal_gap = val;
        }
        if let Ok(val) = config.get_float("layout.vertical_gap") {
            settings.layout.vertical_gap = val;
        }
        if let Ok(val) = config.get_float("layout.origin_x") {
            settings.layout.origin_x = val;
        }
        if let Ok(val) = config.get_float("layout.origin_y") {
            settings.layout.origin_y = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("layout.palette") {
            settings.layout.palette = val;
        }
        if let Ok(val) = config.get_bool("features.relink") {
            settings.features.relink = val;
        }
        if let Ok(val) = config.get_bool("features.categories") {
            settings.features.categories = val;
        }

        Ok(settings)
    }

    /// Reject geometry the layout cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let layout = &self.layout;
        if !(layout.default_node_width.is_finite() && layout.default_node_width > 0.0) {
            return Err(invalid(format!(
                "layout.default_node_width must be positive, got {}",
                layout.default_node_width
            )));
        }
        // strictly positive: sibling subtrees never touch and rows never merge
        for (key, value) in [
            ("layout.horizontal_gap", layout.horizontal_gap),
            ("layout.vertical_gap", layout.vertical_gap),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{} must be positive, got {}", key, value)));
            }
        }
        if !(layout.origin_x.is_finite() && layout.origin_y.is_finite()) {
            return Err(invalid("layout origin must be finite".to_string()));
        }
        if layout.palette.is_empty() {
            return Err(invalid("layout.palette must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            default_node_width: self.layout.default_node_width,
            horizontal_gap: self.layout.horizontal_gap,
            vertical_gap: self.layout.vertical_gap,
            origin_x: self.layout.origin_x,
            origin_y: self.layout.origin_y,
            palette: self.layout.palette.clone(),
        }
    }

    pub fn editor_features(&self) -> EditorFeatures {
        EditorFeatures {
            relink: self.features.relink,
            categories: self.features.categories,
        }
    }

    /// Effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

fn invalid(message: String) -> ApplicationError {
    ApplicationError::Config { message }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.layout_params(), LayoutParams::default());
        assert_eq!(settings.editor_features(), EditorFeatures::default());
    }

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let overlay = RawSettings {
            highlight_anchor: Some(4),
            layout: RawLayoutSettings {
                horizontal_gap: Some(10.0),
                ..RawLayoutSettings::default()
            },
            ..RawSettings::default()
        };
        let merged = Settings::default().merge_with(&overlay);
        assert_eq!(merged.highlight_anchor, Some(4));
        assert_eq!(merged.layout.horizontal_gap, 10.0);
        assert_eq!(merged.layout.vertical_gap, 120.0);
        assert_eq!(merged.root_label, "System");
    }

    #[test]
    fn test_validate_rejects_zero_gaps() {
        let mut settings = Settings::default();
        settings.layout.horizontal_gap = 0.0;
        assert!(matches!(settings.validate(), Err(ApplicationError::Config { .. })));

        let mut settings = Settings::default();
        settings.layout.vertical_gap = 0.0;
        assert!(matches!(settings.validate(), Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_empty_palette() {
        let mut settings = Settings::default();
        settings.layout.palette.clear();
        assert!(matches!(settings.validate(), Err(ApplicationError::Config { .. })));
    }
}
