//! Studio configuration loaded from TOML
//!
//! ```toml
//! [playground]
//! debounce_ms = 300
//!
//! [canvas]
//! tall_height = 560
//!
//! [export]
//! file_stem = "roadmap"
//! standalone = true
//!
//! [themes.dark]
//! accent-1 = "#ff0000"
//! ```
//!
//! Every field is optional.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::model::{Theme, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::renderer::SvgConfig;
use crate::theme::ThemeSet;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudioConfig {
    pub playground: PlaygroundSettings,
    pub canvas: CanvasSettings,
    pub export: ExportSettings,
    /// Palette token overrides per theme
    pub themes: HashMap<Theme, HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaygroundSettings {
    /// Quiet period before an edit is rendered
    pub debounce_ms: u64,
    /// Request in-canvas editing from the engine
    pub editable: bool,
}

impl Default for PlaygroundSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            editable: true,
        }
    }
}

impl PlaygroundSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Gallery card dimensions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasSettings {
    pub width: f64,
    pub height: f64,
    /// Height for hierarchy and quadrant cards
    pub tall_height: f64,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tall_height: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    /// Base name of downloaded files (`<stem>.svg`, `<stem>.png`)
    pub file_stem: String,
    /// Start SVG files with an XML declaration
    pub standalone: bool,
    /// Indent SVG markup
    pub pretty_print: bool,
    /// Prefix of CSS classes in the drawing; empty for none
    pub class_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_stem: "infographic".to_string(),
            standalone: false,
            pretty_print: true,
            class_prefix: "ig-".to_string(),
        }
    }
}

impl ExportSettings {
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.file_stem, extension)
    }

    /// `<dir>/<stem>.<extension>`
    pub fn path_in(&self, dir: &Path, extension: &str) -> PathBuf {
        dir.join(self.file_name(extension))
    }

    /// Where an export lands: an explicit file, or `<stem>.<extension>` inside
    /// a directory target or the working directory
    pub fn resolve(&self, target: Option<&Path>, extension: &str) -> PathBuf {
        match target {
            Some(dir) if dir.is_dir() => self.path_in(dir, extension),
            Some(file) => file.to_path_buf(),
            None => self.path_in(Path::new("."), extension),
        }
    }

    /// SVG output options for the engine
    pub fn svg_config(&self) -> SvgConfig {
        let config = SvgConfig::new()
            .with_standalone(self.standalone)
            .with_pretty_print(self.pretty_print);
        if self.class_prefix.is_empty() {
            config.without_class_prefix()
        } else {
            config.with_class_prefix(self.class_prefix.as_str())
        }
    }
}

impl StudioConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Built-in palettes with the configured overrides applied
    pub fn theme_set(&self) -> ThemeSet {
        let mut themes = ThemeSet::default();
        themes.apply_overrides(&self.themes);
        themes
    }
}
