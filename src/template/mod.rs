//! Template catalog and example data
//!
//! The catalog is owned by the rendering engine; this module only queries it
//! once, partitions it by category prefix and generates example payloads.
//!
//! # Example
//!
//! ```rust
//! use infographic_studio::template::{default_data, Category};
//!
//! assert_eq!(Category::of("compare-swot"), Some(Category::Compare));
//! assert_eq!(default_data("compare-swot").items.len(), 4);
//! ```

mod catalog;
mod defaults;

pub use catalog::{partition, Category, CategoryMap, TemplateCatalog};
pub use defaults::default_data;
