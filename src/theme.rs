//! Color palettes for the built-in themes
//!
//! Each [`Theme`] maps to a palette of named color tokens. Palettes are plain
//! TOML so they can be overridden from the studio configuration file.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::Theme;

/// Errors that can occur when loading or parsing palettes
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read palette file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse palette TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("'{value}' is not a valid value for palette token '{token}'")]
    InvalidValue { token: String, value: String },
}

/// Named color tokens plus a font family
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub name: Option<String>,
    /// Token name -> CSS color (or font name for `font-family`)
    pub colors: HashMap<String, String>,
}

/// TOML structure for deserializing palettes
#[derive(Deserialize)]
struct TomlPalette {
    metadata: Option<TomlMetadata>,
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

const LIGHT: &str = r##"
[metadata]
name = "light"

[colors]
background = "#ffffff"
surface = "#f5f7fa"
text = "#1f2329"
text-muted = "#6b7280"
stroke = "#d0d5dd"
accent-1 = "#1783ff"
accent-2 = "#00c9c9"
accent-3 = "#f0884d"
accent-4 = "#d580ff"
accent-5 = "#7863ff"
accent-6 = "#60c42d"
font-family = "Alibaba PuHuiTi, sans-serif"
"##;

const DARK: &str = r##"
[metadata]
name = "dark"

[colors]
background = "#141414"
surface = "#1f1f1f"
text = "#f0f0f0"
text-muted = "#a6a6a6"
stroke = "#3a3a3a"
accent-1 = "#61ddaa"
accent-2 = "#f6bd16"
accent-3 = "#f08bb4"
accent-4 = "#65789b"
accent-5 = "#7262fd"
accent-6 = "#78d3f8"
font-family = "Alibaba PuHuiTi, sans-serif"
"##;

const HAND_DRAWN: &str = r##"
[metadata]
name = "hand-drawn"

[colors]
background = "#fffdf7"
surface = "#fbf6e9"
text = "#2b2b2b"
text-muted = "#5c5c5c"
stroke = "#2b2b2b"
accent-1 = "#ff8a65"
accent-2 = "#4fc3f7"
accent-3 = "#aed581"
accent-4 = "#ffd54f"
accent-5 = "#ba68c8"
accent-6 = "#4db6ac"
font-family = "851tegakizatsu, cursive"
"##;

/// Whether `value` is a CSS color that is safe to write into SVG attributes:
/// a hex color, an `rgb()`/`rgba()`/`hsl()`/`hsla()` call or a named color
pub fn is_css_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some((function, args)) = value.split_once('(') {
        let Some(args) = args.strip_suffix(')') else {
            return false;
        };
        return matches!(function, "rgb" | "rgba" | "hsl" | "hsla")
            && args
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | ',' | '.' | '%' | '/' | '+' | '-'));
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}

/// Whether `value` is a plain font-family list
fn is_font_family(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, ' ' | ',' | '-' | '_' | '\''))
}

fn is_token_value(token: &str, value: &str) -> bool {
    if token == "font-family" {
        is_font_family(value)
    } else {
        is_css_color(value)
    }
}

impl Palette {
    /// Load a palette from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, PaletteError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load a palette from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, PaletteError> {
        let parsed: TomlPalette = toml::from_str(content)?;
        if let Some((token, value)) = parsed
            .colors
            .iter()
            .find(|(token, value)| !is_token_value(token, value))
        {
            return Err(PaletteError::InvalidValue {
                token: token.clone(),
                value: value.clone(),
            });
        }
        Ok(Palette {
            name: parsed.metadata.and_then(|m| m.name),
            colors: parsed.colors,
        })
    }

    /// Built-in palette of a theme
    pub fn builtin(theme: Theme) -> Self {
        let source = match theme {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
            Theme::HandDrawn => HAND_DRAWN,
        };
        Self::from_toml(source).unwrap_or_else(|_| Palette {
            name: Some(theme.to_string()),
            colors: HashMap::new(),
        })
    }

    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(String::as_str)
    }

    /// Resolve a token, falling back to a category default
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }
        match token {
            "background" => "#ffffff",
            "surface" => "#f5f5f5",
            "stroke" => "#cccccc",
            "font-family" => "sans-serif",
            t if t.starts_with("text") => "#333333",
            t if t.starts_with("accent") => "#1783ff",
            _ => "#333333",
        }
        .to_string()
    }

    /// Accent colors `accent-1`, `accent-2`, ... in order
    pub fn accents(&self) -> Vec<String> {
        (1..)
            .map(|i| format!("accent-{}", i))
            .map_while(|token| self.resolve(&token).map(str::to_string))
            .collect()
    }

    /// Replace the accents with an explicit list; entries that are not CSS
    /// colors are dropped
    pub fn with_accents(mut self, accents: &[String]) -> Self {
        let accents: Vec<&String> = accents
            .iter()
            .filter(|color| {
                let valid = is_css_color(color);
                if !valid {
                    log::warn!("ignoring palette entry '{}': not a CSS color", color);
                }
                valid
            })
            .collect();
        if accents.is_empty() {
            return self;
        }
        self.colors.retain(|token, _| !token.starts_with("accent-"));
        for (i, color) in accents.into_iter().enumerate() {
            self.colors.insert(format!("accent-{}", i + 1), color.clone());
        }
        self
    }

    /// Accent color for the n-th item, cycling
    pub fn accent(&self, index: usize) -> String {
        let accents = self.accents();
        if accents.is_empty() {
            return self.resolve_or_default("accent");
        }
        accents[index % accents.len()].clone()
    }

    /// Overlay tokens from another map, skipping values that would not be
    /// valid in the drawing
    pub fn merge(&mut self, overrides: &HashMap<String, String>) {
        for (token, value) in overrides {
            if is_token_value(token, value) {
                self.colors.insert(token.clone(), value.clone());
            } else {
                log::warn!("ignoring palette override {} = '{}'", token, value);
            }
        }
    }
}

/// Palettes for every theme
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSet {
    palettes: HashMap<Theme, Palette>,
}

impl Default for ThemeSet {
    fn default() -> Self {
        Self {
            palettes: Theme::ALL
                .into_iter()
                .map(|theme| (theme, Palette::builtin(theme)))
                .collect(),
        }
    }
}

impl ThemeSet {
    pub fn palette(&self, theme: Theme) -> Palette {
        self.palettes
            .get(&theme)
            .cloned()
            .unwrap_or_else(|| Palette::builtin(theme))
    }

    /// Overlay per-theme token overrides, keyed by theme name
    pub fn apply_overrides(&mut self, overrides: &HashMap<Theme, HashMap<String, String>>) {
        for (theme, tokens) in overrides {
            self.palettes
                .entry(*theme)
                .or_insert_with(|| Palette::builtin(*theme))
                .merge(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_palettes_parse() {
        for theme in Theme::ALL {
            let palette = Palette::builtin(theme);
            assert_eq!(palette.name.as_deref(), Some(theme.as_str()));
            assert!(palette.resolve("background").is_some());
            assert_eq!(palette.accents().len(), 6);
        }
    }

    #[test]
    fn test_resolve_or_default_fallback() {
        let empty = Palette {
            name: None,
            colors: HashMap::new(),
        };
        assert_eq!(empty.resolve_or_default("text-muted"), "#333333");
        assert_eq!(empty.resolve_or_default("background"), "#ffffff");
        assert_eq!(empty.accent(3), "#1783ff");
    }

    #[test]
    fn test_with_accents_replaces_all() {
        let palette =
            Palette::builtin(Theme::Light).with_accents(&["#111111".to_string(), "#222222".to_string()]);
        assert_eq!(palette.accents(), vec!["#111111", "#222222"]);
        assert_eq!(palette.accent(3), "#222222");
    }

    #[test]
    fn test_parse_toml_with_metadata() {
        let palette = Palette::from_toml(
            r##"
[metadata]
name = "Corporate"

[colors]
accent-1 = "#000000"
"##,
        )
        .expect("Should parse");
        assert_eq!(palette.name.as_deref(), Some("Corporate"));
        assert_eq!(palette.accents(), vec!["#000000"]);
    }

    #[test]
    fn test_css_colors() {
        for color in ["#fff", "#1783ffcc", "rgb(23, 131, 255)", "hsla(120deg 50% 50% / 0.5)", "teal"] {
            assert!(is_css_color(color), "{}", color);
        }
        for value in ["", "#12", "#zzzzzz", "red;}", "rgb(1,2,3", "url(x)", "\"/><script>", "a b"] {
            assert!(!is_css_color(value), "{}", value);
        }
    }

    #[test]
    fn test_with_accents_drops_markup() {
        let palette = Palette::builtin(Theme::Light)
            .with_accents(&["\"/><script>".to_string(), "#222222".to_string()]);
        assert_eq!(palette.accents(), vec!["#222222"]);

        let untouched = Palette::builtin(Theme::Light).with_accents(&["<x>".to_string()]);
        assert_eq!(untouched.accents().len(), 6);
    }

    #[test]
    fn test_toml_rejects_markup_values() {
        let result = Palette::from_toml("[colors]\nbackground = \"</style><script>\"\n");
        assert!(matches!(result, Err(PaletteError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(Palette::from_toml("this is not valid toml {{{{").is_err());
    }

    #[test]
    fn test_theme_set_overrides() {
        let mut set = ThemeSet::default();
        let mut tokens = HashMap::new();
        tokens.insert("background".to_string(), "#000000".to_string());
        tokens.insert("text".to_string(), "#000\"/>".to_string());
        let mut overrides = HashMap::new();
        overrides.insert(Theme::Dark, tokens);
        set.apply_overrides(&overrides);
        assert_eq!(set.palette(Theme::Dark).resolve("background"), Some("#000000"));
        assert_eq!(set.palette(Theme::Dark).resolve("text"), Some("#f0f0f0"));
        assert_eq!(set.palette(Theme::Light).resolve("background"), Some("#ffffff"));
    }
}
