//! Rendering engine contract
//!
//! The engine is an external collaborator: it owns the template catalog, the
//! DSL parser, layout and drawing. The studio talks to it only through the
//! [`Engine`] and [`RenderInstance`] traits below. [`PreviewEngine`] is the
//! bundled implementation.

mod draw;
mod preview;
mod raster;
mod slot;

pub use preview::{PreviewEngine, BUILTIN_TEMPLATES};
pub use slot::InstanceSlot;

use serde::Serialize;
use thiserror::Error;

use crate::canvas::Canvas;
use crate::model::{InfographicData, RenderConfiguration, Stylize, TemplateId, Theme};
use crate::syntax::SyntaxOutput;

/// Errors thrown synchronously by engine calls
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("container '{selector}' not found")]
    ContainerNotFound { selector: String },

    #[error("invalid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("instance has been destroyed")]
    Destroyed,

    #[error("nothing has been rendered yet")]
    NotRendered,

    #[error("could not rasterize the drawing: {0}")]
    Rasterize(String),
}

/// Event names accepted by [`RenderInstance::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Error,
    Warning,
}

/// One error or warning reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineMessage {
    pub message: String,
}

impl EngineMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Event payloads. A single error is delivered as a one-element list.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Error(Vec<EngineMessage>),
    Warning(Vec<EngineMessage>),
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EngineEvent::Error(_) => EventKind::Error,
            EngineEvent::Warning(_) => EventKind::Warning,
        }
    }

    pub fn messages(&self) -> &[EngineMessage] {
        match self {
            EngineEvent::Error(m) | EngineEvent::Warning(m) => m,
        }
    }

    /// Messages joined with `; `
    pub fn joined(&self) -> String {
        join_messages(self.messages().iter().map(|m| m.message.as_str()))
    }
}

pub(crate) fn join_messages<'a>(messages: impl Iterator<Item = &'a str>) -> String {
    messages.collect::<Vec<_>>().join("; ")
}

/// Event handler registered on an instance
pub type Listener = Box<dyn FnMut(&EngineEvent)>;

/// Output type for [`RenderInstance::to_data_url`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Svg,
}

impl ImageType {
    pub fn mime(self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Svg => "image/svg+xml",
        }
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ImageType::Png => "png",
            ImageType::Svg => "svg",
        })
    }
}

/// The payload handed to [`Engine::create`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOptions {
    /// Container selector, e.g. `#playground-1`
    pub container: String,
    pub width: f64,
    pub height: f64,
    pub template: TemplateId,
    pub theme: Theme,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub palette: Vec<String>,
    pub data: InfographicData,
    /// In-canvas editing, only requested by the playground
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    /// Present only when a non-default stylize is selected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylize: Option<Stylize>,
}

impl EngineOptions {
    /// Build the engine call for a configuration. Dimensions fall back to
    /// 600x400; `theme` and `stylize` come from the caller's selection.
    pub fn new(
        container: impl Into<String>,
        config: &RenderConfiguration,
        theme: Theme,
        stylize: Stylize,
    ) -> Self {
        Self {
            container: container.into(),
            width: config.width_or_default(),
            height: config.height_or_default(),
            template: config.template.clone(),
            theme,
            palette: config.palette.clone(),
            data: config.data.clone(),
            editable: None,
            stylize: stylize.to_engine(),
        }
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = Some(editable);
        self
    }
}

/// One live activation of the engine bound to a container
pub trait RenderInstance {
    /// Register an event listener
    fn on(&mut self, kind: EventKind, listener: Listener);

    /// Lay out and draw into the container
    fn render(&mut self) -> Result<(), EngineError>;

    /// Tear down the drawing and all listeners. Safe to call more than once and
    /// before `render`.
    fn destroy(&mut self);

    fn is_destroyed(&self) -> bool;

    /// Serialize the current drawing as a base64 data URL
    fn to_data_url(&self, image: ImageType) -> Result<String, EngineError>;

    /// The options this instance was created with
    fn options(&self) -> &EngineOptions;
}

/// Factory, catalog and parser of one rendering engine
pub trait Engine {
    /// Every template the engine can draw, in a stable order
    fn templates(&self) -> Vec<TemplateId>;

    /// Translate DSL text into a configuration
    fn parse_syntax(&self, text: &str) -> SyntaxOutput;

    /// Construct an instance. Errors here are synchronous failures, distinct
    /// from `error` events emitted while rendering.
    fn create(
        &self,
        options: EngineOptions,
        canvas: &Canvas,
    ) -> Result<Box<dyn RenderInstance>, EngineError>;
}
