//! Indentation parser turning DSL statements into a [`RenderConfiguration`]

use crate::error::{Span, SyntaxError};
use crate::model::{InfographicData, Item, ItemKind, RenderConfiguration, TemplateId};
use crate::theme::is_css_color;

use super::lexer::{scan, Statement, Token};
use super::SyntaxOutput;

/// Parse DSL text.
///
/// Every problem found is reported; when any is, no configuration is returned.
pub fn parse(source: &str) -> SyntaxOutput {
    let (statements, mut errors) = scan(source);
    let mut parser = Parser {
        statements,
        pos: 0,
        errors: Vec::new(),
    };
    let config = parser.document();
    errors.append(&mut parser.errors);
    errors.sort_by_key(|e| e.span.start);

    match config {
        Some(config) if errors.is_empty() => SyntaxOutput::ok(config),
        _ if errors.is_empty() => SyntaxOutput::failed(vec![SyntaxError::new(
            0..0,
            "expected `infographic <template>` on the first line",
        )]),
        _ => SyntaxOutput::failed(errors),
    }
}

/// Deepest `children` nesting accepted
const MAX_NESTING: usize = 32;

struct Parser<'a> {
    statements: Vec<Statement<'a>>,
    pos: usize,
    errors: Vec<SyntaxError>,
}

#[derive(Default)]
struct ItemFields {
    label: Option<String>,
    desc: Option<String>,
    value: Option<f64>,
    icon: Option<String>,
    illus: Option<String>,
    children: Option<Vec<Item>>,
}

impl<'a> Parser<'a> {
    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.errors.push(SyntaxError::new(span, message));
    }

    /// Next statement nested deeper than `parent_indent`
    fn next_child(&mut self, parent_indent: usize) -> Option<Statement<'a>> {
        let stmt = self.statements.get(self.pos)?;
        if stmt.indent > parent_indent {
            self.pos += 1;
            Some(stmt.clone())
        } else {
            None
        }
    }

    fn skip_children(&mut self, parent_indent: usize) {
        while self.next_child(parent_indent).is_some() {}
    }

    fn document(&mut self) -> Option<RenderConfiguration> {
        let header = self.statements.first()?.clone();

        // a missing header still lets the remaining blocks be checked
        let template = if header.key == Token::Infographic && !header.dashed && header.indent == 0 {
            self.pos = 1;
            if header.rest.is_empty() {
                self.error(header.key_span.clone(), "missing template name after `infographic`");
            }
            header.rest.to_string()
        } else {
            self.error(
                header.span(),
                "expected `infographic <template>` on the first line",
            );
            String::new()
        };

        let mut config = RenderConfiguration::new(TemplateId(template), InfographicData::default());

        while let Some(stmt) = self.statements.get(self.pos).cloned() {
            self.pos += 1;
            if stmt.indent > 0 {
                self.error(stmt.span(), "unexpected indentation at top level");
                continue;
            }
            match stmt.key {
                Token::Data if !stmt.dashed => config.data = self.data_block(&stmt),
                Token::Theme if !stmt.dashed => self.theme_block(&stmt, &mut config),
                Token::Infographic => {
                    self.error(stmt.span(), "duplicate `infographic` header");
                }
                _ => {
                    self.error(
                        stmt.key_span.clone(),
                        format!("unexpected '{}' at top level; expected data or theme", stmt.key.text()),
                    );
                    self.skip_children(stmt.indent);
                }
            }
        }

        Some(config)
    }

    fn data_block(&mut self, block: &Statement<'a>) -> InfographicData {
        let mut data = InfographicData::default();
        if !block.rest.is_empty() {
            self.error(block.rest_span.clone(), "`data` takes no inline value");
        }

        while let Some(stmt) = self.next_child(block.indent) {
            if stmt.dashed {
                self.error(stmt.span(), "list item outside of `items`");
                self.skip_children(stmt.indent);
                continue;
            }
            match stmt.key {
                Token::Title => data.title = non_empty(stmt.rest),
                Token::Desc => data.desc = non_empty(stmt.rest),
                Token::Items => data.items = self.item_list(stmt.indent, 1),
                _ => {
                    self.error(
                        stmt.key_span.clone(),
                        format!("unknown data field '{}' (allowed: title, desc, items)", stmt.key.text()),
                    );
                    self.skip_children(stmt.indent);
                }
            }
        }

        data
    }

    fn item_list(&mut self, parent_indent: usize, depth: usize) -> Vec<Item> {
        if depth > MAX_NESTING {
            let span = self
                .statements
                .get(self.pos)
                .filter(|stmt| stmt.indent > parent_indent)
                .map(Statement::span);
            if let Some(span) = span {
                self.error(span, format!("items are nested more than {} levels deep", MAX_NESTING));
            }
            self.skip_children(parent_indent);
            return Vec::new();
        }

        let mut items = Vec::new();
        while let Some(stmt) = self.next_child(parent_indent) {
            if !stmt.dashed {
                self.error(stmt.span(), "expected a `- ` list item");
                self.skip_children(stmt.indent);
                continue;
            }
            if let Some(item) = self.item(&stmt, depth) {
                items.push(item);
            }
        }
        items
    }

    fn item(&mut self, first: &Statement<'a>, depth: usize) -> Option<Item> {
        let mut fields = ItemFields::default();
        self.item_field(first, &mut fields, depth);

        // fields align with the key after the dash
        let field_indent = first.key_column.saturating_sub(1);
        while let Some(stmt) = self.next_child(field_indent) {
            if stmt.dashed {
                self.error(stmt.span(), "nested list items belong under `children`");
                self.skip_children(stmt.indent);
                continue;
            }
            self.item_field(&stmt, &mut fields, depth);
        }

        let Some(label) = fields.label else {
            self.error(first.span(), "list item is missing a label");
            return None;
        };

        let kind = match (fields.value, fields.children) {
            (Some(_), Some(_)) => {
                self.error(
                    first.span(),
                    format!("item '{}' cannot carry both a value and children", label),
                );
                return None;
            }
            (_, Some(children)) => ItemKind::Branch { children },
            (value, None) => ItemKind::Leaf { value },
        };

        Some(Item {
            label,
            desc: fields.desc,
            icon: fields.icon,
            illus: fields.illus,
            kind,
        })
    }

    fn item_field(&mut self, stmt: &Statement<'a>, fields: &mut ItemFields, depth: usize) {
        match &stmt.key {
            Token::Label => fields.label = Some(stmt.rest.to_string()),
            Token::Desc => fields.desc = non_empty(stmt.rest),
            Token::Icon => fields.icon = non_empty(stmt.rest),
            Token::Illus => fields.illus = non_empty(stmt.rest),
            Token::Value => match stmt.rest.parse::<f64>() {
                Ok(value) if value.is_finite() => fields.value = Some(value),
                _ => self.error(
                    stmt.rest_span.clone(),
                    format!("value must be a number, found '{}'", stmt.rest),
                ),
            },
            Token::Children => {
                if !stmt.rest.is_empty() {
                    self.error(stmt.rest_span.clone(), "`children` takes no inline value");
                }
                fields.children = Some(self.item_list(stmt.indent, depth + 1));
            }
            other => {
                self.error(
                    stmt.key_span.clone(),
                    format!(
                        "unknown item field '{}' (allowed: label, desc, value, icon, illus, children)",
                        other.text()
                    ),
                );
                self.skip_children(stmt.indent);
            }
        }
    }

    fn theme_block(&mut self, block: &Statement<'a>, config: &mut RenderConfiguration) {
        if !block.rest.is_empty() {
            self.theme_name(block.rest, block.rest_span.clone(), config);
        }

        while let Some(stmt) = self.next_child(block.indent) {
            match stmt.key {
                Token::Type if !stmt.dashed => {
                    self.theme_name(stmt.rest, stmt.rest_span.clone(), config)
                }
                Token::Palette if !stmt.dashed => {
                    let base = stmt.rest_span.start;
                    for (offset, color) in words(stmt.rest) {
                        let start = base + offset;
                        self.palette_color(color, start..start + color.len(), config);
                    }
                    while let Some(entry) = self.next_child(stmt.indent) {
                        if entry.dashed {
                            let color = if entry.rest.is_empty() {
                                entry.key.text().to_string()
                            } else {
                                format!("{} {}", entry.key.text(), entry.rest)
                            };
                            self.palette_color(&color, entry.span(), config);
                        } else {
                            self.error(entry.span(), "expected a `- <color>` palette entry");
                        }
                    }
                }
                Token::Stylize if !stmt.dashed => match stmt.rest.parse() {
                    Ok(stylize) => config.stylize = Some(stylize),
                    Err(message) => self.error(stmt.rest_span.clone(), message),
                },
                // remaining theme keys (fonts, base styles) are engine-specific
                _ => self.skip_children(stmt.indent),
            }
        }
    }

    fn palette_color(&mut self, color: &str, span: Span, config: &mut RenderConfiguration) {
        if is_css_color(color) {
            config.palette.push(color.to_string());
        } else {
            self.error(span, format!("'{}' is not a CSS color", color));
        }
    }

    fn theme_name(&mut self, name: &str, span: Span, config: &mut RenderConfiguration) {
        match name.parse() {
            Ok(theme) => config.theme = Some(theme),
            Err(message) => self.error(span, message),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Space-separated words with their byte offsets
fn words(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split(' ')
        .scan(0, |offset, word| {
            let start = *offset;
            *offset += word.len() + 1;
            Some((start, word))
        })
        .filter(|(_, word)| !word.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Stylize, Theme};
    use pretty_assertions::assert_eq;

    fn parse_ok(source: &str) -> RenderConfiguration {
        match parse(source).into_result() {
            Ok(config) => config,
            Err(errors) => panic!("unexpected errors: {:?}", errors),
        }
    }

    fn messages(source: &str) -> Vec<String> {
        parse(source).errors.into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_full_document() {
        let config = parse_ok(
            "infographic list-row-horizontal-icon-arrow
data
  title 项目流程
  desc 完整的项目管理流程
  items
    - label 规划阶段
      desc 需求分析和计划制定
      value 1
    - label 设计阶段
      icon mdi/pencil
theme
  type dark
",
        );
        assert_eq!(config.template.as_str(), "list-row-horizontal-icon-arrow");
        assert_eq!(config.data.title.as_deref(), Some("项目流程"));
        assert_eq!(config.data.desc.as_deref(), Some("完整的项目管理流程"));
        assert_eq!(config.data.items.len(), 2);
        assert_eq!(config.data.items[0].value(), Some(1.0));
        assert_eq!(config.data.items[1].icon.as_deref(), Some("mdi/pencil"));
        assert_eq!(config.theme, Some(Theme::Dark));
    }

    #[test]
    fn test_children() {
        let config = parse_ok(
            "infographic compare-swot
data
  items
    - label Strengths
      children
        - label 技术领先
        - label 品牌优势
    - label Weaknesses
      children
        - label 成本较高
",
        );
        let items = &config.data.items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].children().len(), 2);
        assert_eq!(items[0].children()[1].label, "品牌优势");
        assert_eq!(items[1].children().len(), 1);
    }

    #[test]
    fn test_value_must_be_numeric() {
        let output = parse(
            "infographic chart-column-simple
data
  items
    - label 报错字段
      value status
",
        );
        assert!(output.options.is_none());
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].message, "value must be a number, found 'status'");
    }

    #[test]
    fn test_unknown_item_field() {
        let errors = messages(
            "infographic list-a
data
  items
    - label 任务
      status 完成
      priority high
",
        );
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("unknown item field 'status'"));
        assert!(errors[1].starts_with("unknown item field 'priority'"));
    }

    #[test]
    fn test_missing_header() {
        let errors = messages("data\n  title x");
        assert_eq!(errors, vec!["expected `infographic <template>` on the first line"]);
        let errors = messages("");
        assert_eq!(errors, vec!["expected `infographic <template>` on the first line"]);
    }

    #[test]
    fn test_missing_template_name() {
        let errors = messages("infographic\ndata");
        assert_eq!(errors, vec!["missing template name after `infographic`"]);
    }

    #[test]
    fn test_missing_label() {
        let errors = messages("infographic a\ndata\n  items\n    - desc 无标题");
        assert_eq!(errors, vec!["list item is missing a label"]);
    }

    #[test]
    fn test_inline_theme_palette_and_stylize() {
        let config = parse_ok(
            "infographic list-row-horizontal-icon-arrow
theme dark
  palette
    - #61DDAA
    - #F6BD16
  stylize rough
  base
    text
      font-family 851tegakizatsu
data
  items
    - label 步骤一
",
        );
        assert_eq!(config.theme, Some(Theme::Dark));
        assert_eq!(config.palette, vec!["#61DDAA", "#F6BD16"]);
        assert_eq!(config.stylize, Some(Stylize::Rough));
        assert_eq!(config.data.items.len(), 1);
    }

    #[test]
    fn test_inline_palette() {
        let config = parse_ok("infographic a\ntheme\n  palette #3b82f6 #10b981");
        assert_eq!(config.palette, vec!["#3b82f6", "#10b981"]);
    }

    #[test]
    fn test_palette_rejects_non_colors() {
        let output = parse("infographic a\ntheme\n  palette #3b82f6 \"/><script>alert(1)</script><x");
        assert!(output.options.is_none());
        assert_eq!(output.errors.len(), 1);
        assert!(output.errors[0].message.ends_with("is not a CSS color"));

        let errors = messages("infographic a\ntheme\n  palette\n    - red;}\n    - rgb(1, 2, 3)");
        assert_eq!(errors, vec!["'red;}' is not a CSS color"]);
    }

    #[test]
    fn test_functional_palette_entries() {
        let config = parse_ok("infographic a\ntheme\n  palette\n    - rgb(23, 131, 255)\n    - teal");
        assert_eq!(config.palette, vec!["rgb(23, 131, 255)", "teal"]);
    }

    fn nested(levels: usize) -> String {
        let mut source = String::from("infographic hierarchy-structure\ndata\n  items\n");
        for level in 0..levels {
            let pad = " ".repeat(4 + 4 * level);
            source.push_str(&format!("{}- label l{}\n", pad, level));
            if level + 1 < levels {
                source.push_str(&format!("{}  children\n", pad));
            }
        }
        source
    }

    #[test]
    fn test_nesting_limit() {
        let config = parse_ok(&nested(MAX_NESTING));
        assert_eq!(config.data.items[0].depth(), MAX_NESTING);

        let errors = messages(&nested(100));
        assert_eq!(errors, vec![format!("items are nested more than {} levels deep", MAX_NESTING)]);
    }

    #[test]
    fn test_unknown_theme() {
        let errors = messages("infographic a\ntheme\n  type sepia");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unknown theme 'sepia'"));
    }

    #[test]
    fn test_errors_in_source_order() {
        let output = parse(
            "infographic a
data
  items
    - label x
      value abc
  bogus 1
",
        );
        let starts: Vec<_> = output.errors.iter().map(|e| e.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(output.errors.len(), 2);
    }

    #[test]
    fn test_skeleton_comments_ignored() {
        let config = parse_ok(
            "# header comment
infographic sequence-timeline-simple
data   # trailing note
  title 发展历程
  items
    - label 2020
      desc 公司成立
",
        );
        assert_eq!(config.data.title.as_deref(), Some("发展历程"));
        assert_eq!(config.data.items[0].label, "2020");
    }
}
