//! Configuration to DSL text

use crate::model::{Item, RenderConfiguration, Theme};

const INDENT: &str = "  ";

/// Emit the DSL form of a configuration with the given theme.
///
/// Output is deterministic: `infographic <template>`, a `data` block (title and
/// desc when non-empty, then items with label, desc, value, icon, illus and
/// nested children), and a `theme` block. Lines are joined with `\n` and there
/// is no trailing newline.
pub fn emit(config: &RenderConfiguration, theme: Theme) -> String {
    let mut lines = vec![
        format!("infographic {}", single_line(config.template.as_str())),
        "data".to_string(),
    ];

    let data = &config.data;
    if let Some(title) = data.title.as_deref().filter(|t| !t.is_empty()) {
        lines.push(format!("{}title {}", INDENT, single_line(title)));
    }
    if let Some(desc) = data.desc.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("{}desc {}", INDENT, single_line(desc)));
    }
    lines.push(format!("{}items", INDENT));
    for item in &data.items {
        emit_item(&mut lines, item, 2);
    }

    lines.push("theme".to_string());
    lines.push(format!("{}type {}", INDENT, theme));

    lines.join("\n")
}

/// `level` is the indentation level of the item's dash
fn emit_item(lines: &mut Vec<String>, item: &Item, level: usize) {
    let dash = INDENT.repeat(level);
    let field = INDENT.repeat(level + 1);

    lines.push(format!("{}- label {}", dash, single_line(&item.label)));
    if let Some(desc) = item.desc.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("{}desc {}", field, single_line(desc)));
    }
    if let Some(value) = item.value() {
        lines.push(format!("{}value {}", field, value));
    }
    if let Some(icon) = item.icon.as_deref().filter(|i| !i.is_empty()) {
        lines.push(format!("{}icon {}", field, single_line(icon)));
    }
    if let Some(illus) = item.illus.as_deref().filter(|i| !i.is_empty()) {
        lines.push(format!("{}illus {}", field, single_line(illus)));
    }
    if item.is_branch() {
        lines.push(format!("{}children", field));
        for child in item.children() {
            emit_item(lines, child, level + 2);
        }
    }
}

/// Line breaks would end the statement early
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
