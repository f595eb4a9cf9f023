//! SVG output for the preview engine
//!
//! The builder emits plain SVG with prefixed CSS classes so exported drawings
//! can be restyled.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{escape_xml, path_to_d, Point, SvgBuilder, TextAnchor};
