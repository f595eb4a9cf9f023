//! Data model shared by the views and the engine

mod item;
mod options;

pub use item::{Item, ItemError, ItemKind};
pub use options::{
    InfographicData, RenderConfiguration, Stylize, TemplateId, Theme, DEFAULT_HEIGHT,
    DEFAULT_WIDTH,
};
