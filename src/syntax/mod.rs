//! The infographic DSL: line-oriented, two-space indented text
//!
//! ```text
//! infographic chart-column-simple
//! data
//!   title 月度销售额
//!   items
//!     - label 1月
//!       value 120
//! theme
//!   type dark
//! ```
//!
//! [`emit`] writes a configuration in this form; [`parse`] is the reading side
//! used by the bundled preview engine.

mod emit;
pub mod lexer;
mod parser;

pub use emit::emit;
pub use parser::parse;

use crate::error::SyntaxError;
use crate::model::RenderConfiguration;

/// Result of parsing DSL text: `options` is only present when `errors` is empty
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxOutput {
    pub options: Option<RenderConfiguration>,
    pub errors: Vec<SyntaxError>,
}

impl SyntaxOutput {
    pub fn ok(options: RenderConfiguration) -> Self {
        Self {
            options: Some(options),
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<SyntaxError>) -> Self {
        Self {
            options: None,
            errors,
        }
    }

    pub fn into_result(self) -> Result<RenderConfiguration, Vec<SyntaxError>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        self.options
            .ok_or_else(|| vec![SyntaxError::new(0..0, "parser produced no configuration")])
    }
}

/// Skeleton reference shown by `infographic-studio syntax`
pub const SYNTAX_SKELETON: &str = r#"# Skeleton
infographic <template-name>
data
  title Title
  desc Description (optional)
  items
    - label Item name
      desc Explanation
      icon mdi/icon-name
      value 42
    - label Group name
      illus illustration-name
      children
        - label Child item
theme
  type light
  palette #3b82f6 #10b981
  stylize rough

# Item fields: label, desc, value, icon, illus, children
# value must be a number and cannot be combined with children
# themes: light, dark, hand-drawn; stylize: rough"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result_rejects_errors_even_with_options() {
        let mut output = SyntaxOutput::ok(RenderConfiguration::new(
            "list-a",
            Default::default(),
        ));
        output.errors.push(SyntaxError::new(0..1, "boom"));
        assert!(output.into_result().is_err());
    }

    #[test]
    fn test_skeleton_parses() {
        let config = parse(SYNTAX_SKELETON).into_result().unwrap();
        assert_eq!(config.template.as_str(), "<template-name>");
        assert_eq!(config.data.items.len(), 2);
        assert_eq!(config.data.items[1].children().len(), 1);
    }
}
