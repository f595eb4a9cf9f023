//! Infographic Studio - a gallery and live playground for infographic templates
//!
//! The studio configures and drives a rendering engine: it groups the engine's
//! template catalog into categories, generates example data for any template,
//! and re-renders an edited JSON or DSL document on a debounced trailing edge.
//! The engine sits behind the [`Engine`] trait; [`PreviewEngine`] is bundled.
//!
//! # Example
//!
//! ```rust
//! use infographic_studio::render;
//!
//! let svg = render("infographic list-grid-badge-card\ndata\n  items\n    - label one").unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod canvas;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod export;
pub mod gallery;
pub mod model;
pub mod playground;
pub mod renderer;
pub mod syntax;
pub mod template;
pub mod theme;

pub use canvas::Canvas;
pub use config::{ConfigError, StudioConfig};
pub use engine::{Engine, EngineError, PreviewEngine, RenderInstance};
pub use error::SyntaxError;
pub use gallery::Gallery;
pub use model::{InfographicData, Item, RenderConfiguration, Stylize, TemplateId, Theme};
pub use playground::{Handoff, InputMode, Playground};
pub use syntax::{emit, parse};
pub use template::{default_data, Category, TemplateCatalog};
pub use theme::ThemeSet;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use engine::{EngineEvent, EngineOptions, EventKind};

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// The DSL text did not parse
    #[error("parse errors: {}", error::join_errors(.0))]
    Parse(Vec<SyntaxError>),

    /// The JSON configuration did not parse
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine refused to construct or render
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The engine reported an error event while rendering
    #[error("render rejected: {0}")]
    Rejected(String),
}

impl From<Vec<SyntaxError>> for RenderError {
    fn from(errors: Vec<SyntaxError>) -> Self {
        RenderError::Parse(errors)
    }
}

/// Configuration for the one-call render functions
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Theme overriding the document's own
    pub theme: Option<Theme>,
    /// Stylize overriding the document's own
    pub stylize: Option<Stylize>,
    /// Palettes for each theme
    pub themes: ThemeSet,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn with_stylize(mut self, stylize: Stylize) -> Self {
        self.stylize = Some(stylize);
        self
    }

    /// Set the palettes used for color resolution
    pub fn with_themes(mut self, themes: ThemeSet) -> Self {
        self.themes = themes;
        self
    }
}

/// Render DSL text to SVG with the bundled engine and default configuration
///
/// # Example
///
/// ```rust
/// use infographic_studio::render;
///
/// let svg = render(r#"
/// infographic chart-column-simple
/// data
///   title Sales
///   items
///     - label Jan
///       value 120
///     - label Feb
///       value 150
/// "#).unwrap();
///
/// assert!(svg.contains("Sales"));
/// assert!(svg.contains("Feb"));
/// ```
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, &RenderConfig::default())
}

/// Render DSL text to SVG with custom configuration
///
/// ```rust
/// use infographic_studio::{render_with_config, RenderConfig, Stylize, Theme};
///
/// let config = RenderConfig::new()
///     .with_theme(Theme::Dark)
///     .with_stylize(Stylize::Rough);
///
/// let svg = render_with_config("infographic list-grid-badge-card\ndata\n  items\n    - label a", &config).unwrap();
/// assert!(svg.contains(r#"data-theme="dark""#));
/// ```
pub fn render_with_config(source: &str, config: &RenderConfig) -> Result<String, RenderError> {
    let document = parse(source).into_result()?;
    render_configuration(&document, config)
}

/// Render a JSON configuration to SVG
pub fn render_json(json: &str, config: &RenderConfig) -> Result<String, RenderError> {
    let document: RenderConfiguration = serde_json::from_str(json)?;
    render_configuration(&document, config)
}

/// Render an already-parsed configuration to SVG
pub fn render_configuration(
    document: &RenderConfiguration,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let engine = PreviewEngine::new().with_themes(config.themes.clone());
    let canvas = Canvas::new();
    canvas.create_container("render");

    let theme = config.theme.or(document.theme).unwrap_or_default();
    let stylize = config.stylize.or(document.stylize).unwrap_or_default();
    let options = EngineOptions::new("#render", document, theme, stylize);

    let rejected: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&rejected);
    let mut instance = engine.create(options, &canvas)?;
    instance.on(
        EventKind::Error,
        Box::new(move |event: &EngineEvent| {
            *sink.borrow_mut() = Some(event.joined());
        }),
    );
    instance.render()?;

    if let Some(message) = rejected.borrow_mut().take() {
        return Err(RenderError::Rejected(message));
    }
    let svg = canvas.svg("#render").ok_or(EngineError::NotRendered)?;
    instance.destroy();
    Ok(svg)
}
