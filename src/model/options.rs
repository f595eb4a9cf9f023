//! Render configuration: template, dimensions, theme, stylize and data

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use super::Item;
use crate::theme::is_css_color;

/// Default canvas width
pub const DEFAULT_WIDTH: f64 = 600.0;
/// Default canvas height
pub const DEFAULT_HEIGHT: f64 = 400.0;

/// Name of a visual template, namespaced by category prefix (e.g. `compare-swot`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub String);

impl TemplateId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Color/typography preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    HandDrawn,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::HandDrawn];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::HandDrawn => "hand-drawn",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown theme '{}' (expected light, dark or hand-drawn)", s))
    }
}

/// Rendering-style modifier independent of theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stylize {
    #[default]
    None,
    Rough,
}

impl Stylize {
    pub fn as_str(self) -> &'static str {
        match self {
            Stylize::None => "none",
            Stylize::Rough => "rough",
        }
    }

    /// The value to hand the engine. The engine activates on the presence of the
    /// field, so `None` must not be passed through at all.
    pub fn to_engine(self) -> Option<Stylize> {
        match self {
            Stylize::None => None,
            Stylize::Rough => Some(Stylize::Rough),
        }
    }
}

impl fmt::Display for Stylize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stylize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Stylize::None),
            "rough" => Ok(Stylize::Rough),
            other => Err(format!("unknown stylize '{}' (expected none or rough)", other)),
        }
    }
}

/// Title, description and item tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InfographicData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl InfographicData {
    pub fn new(title: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            title: Some(title.into()),
            desc: None,
            items,
        }
    }
}

/// The unit of input to the rendering engine, as written in the JSON mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfiguration {
    pub template: TemplateId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylize: Option<Stylize>,
    /// Accent colors overriding the theme's own
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "css_colors"
    )]
    pub palette: Vec<String>,
    #[serde(default)]
    pub data: InfographicData,
}

fn css_colors<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let colors = Vec::<String>::deserialize(deserializer)?;
    match colors.iter().find(|color| !is_css_color(color)) {
        Some(bad) => Err(serde::de::Error::custom(format!(
            "palette entry '{}' is not a CSS color",
            bad
        ))),
        None => Ok(colors),
    }
}

impl RenderConfiguration {
    pub fn new(template: impl Into<TemplateId>, data: InfographicData) -> Self {
        Self {
            template: template.into(),
            width: None,
            height: None,
            theme: None,
            stylize: None,
            palette: Vec::new(),
            data,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn width_or_default(&self) -> f64 {
        self.width.unwrap_or(DEFAULT_WIDTH)
    }

    pub fn height_or_default(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_HEIGHT)
    }
}
