//! Incremental SVG document builder

use crate::theme::Palette;

use super::SvgConfig;

/// A point in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    width: f64,
    height: f64,
    root_attrs: Vec<(String, String)>,
    defs: Vec<String>,
    styles: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a builder for a `width` x `height` canvas
    pub fn new(config: SvgConfig, width: f64, height: f64) -> Self {
        Self {
            config,
            width,
            height,
            root_attrs: vec![],
            defs: vec![],
            styles: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    /// Add an attribute to the root `<svg>` element
    pub fn root_attr(&mut self, name: &str, value: &str) {
        self.root_attrs
            .push((name.to_string(), escape_xml(value)));
    }

    /// Add CSS custom properties from a palette
    pub fn add_palette(&mut self, palette: &Palette) {
        let mut tokens: Vec<_> = palette.colors.iter().collect();
        tokens.sort();

        let mut css = String::from(":root {\n");
        for (token, value) in tokens {
            css.push_str(&format!("      --{}: {};\n", token, value));
        }
        css.push_str("    }");
        self.styles.push(css);

        let prefix = self.prefix();
        self.styles.push(format!(
            ".{}text {{ font-family: {}; }}",
            prefix,
            palette.resolve_or_default("font-family")
        ));
    }

    pub fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    fn class_list(&self, kind: &str, classes: &[String]) -> String {
        let prefix = self.prefix();
        std::iter::once(format!("{}{}", prefix, kind))
            .chain(classes.iter().map(|c| format!("{}{}", prefix, c)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Add the arrow marker used by sequence connectors
    pub fn add_arrow_marker(&mut self) {
        let prefix = self.prefix();
        self.defs.push(format!(
            r#"<marker id="{prefix}arrow" viewBox="0 0 10 10" refX="8" refY="5" markerWidth="6" markerHeight="6" orient="auto">
      <path d="M0,0 L10,5 L0,10 Z" fill="context-stroke"/>
    </marker>"#
        ));
    }

    /// Add a background rectangle covering the canvas
    pub fn add_background(&mut self, fill: &str) {
        let class = self.class_list("background", &[]);
        self.elements.push(format!(
            r#"{}<rect class="{}" x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.indent_str(),
            class,
            self.width,
            self.height,
            fill
        ));
    }

    /// Add a rounded rectangle
    #[allow(clippy::too_many_arguments)]
    pub fn add_rect(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        classes: &[String],
        styles: &str,
    ) {
        let class = self.class_list("rect", classes);
        self.elements.push(format!(
            r#"{}<rect class="{}" x="{}" y="{}" width="{}" height="{}" rx="{}"{}/>"#,
            self.indent_str(),
            class,
            round(x),
            round(y),
            round(w),
            round(h),
            radius,
            styles
        ));
    }

    /// Add a circle element
    pub fn add_circle(&mut self, cx: f64, cy: f64, r: f64, classes: &[String], styles: &str) {
        let class = self.class_list("circle", classes);
        self.elements.push(format!(
            r#"{}<circle class="{}" cx="{}" cy="{}" r="{}"{}/>"#,
            self.indent_str(),
            class,
            round(cx),
            round(cy),
            round(r),
            styles
        ));
    }

    /// Add a straight line, optionally ending in an arrow
    pub fn add_line(&mut self, from: Point, to: Point, styles: &str, arrow: bool) {
        let class = self.class_list("line", &[]);
        let marker = if arrow {
            format!(r#" marker-end="url(#{}arrow)""#, self.prefix())
        } else {
            String::new()
        };
        self.elements.push(format!(
            r#"{}<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}"{}{}/>"#,
            self.indent_str(),
            class,
            round(from.x),
            round(from.y),
            round(to.x),
            round(to.y),
            styles,
            marker
        ));
    }

    /// Add a path from a `d` attribute
    pub fn add_path(&mut self, d: &str, classes: &[String], styles: &str) {
        let class = self.class_list("path", classes);
        self.elements.push(format!(
            r#"{}<path class="{}" d="{}"{}/>"#,
            self.indent_str(),
            class,
            d,
            styles
        ));
    }

    /// Add a text element
    pub fn add_text(
        &mut self,
        text: &str,
        position: Point,
        anchor: TextAnchor,
        classes: &[String],
        styles: &str,
    ) {
        let class = self.class_list("text", classes);
        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}" text-anchor="{}" dominant-baseline="middle"{}>{}</text>"#,
            self.indent_str(),
            class,
            round(position.x),
            round(position.y),
            anchor.as_str(),
            styles,
            escape_xml(text)
        ));
    }

    /// Add a group element with optional ID and classes
    pub fn start_group(&mut self, id: Option<&str>, classes: &[String], attrs: &str) {
        let id_attr = id
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            let prefix = self.prefix();
            let list: Vec<_> = classes.iter().map(|c| format!("{}{}", prefix, c)).collect();
            format!(r#" class="{}""#, list.join(" "))
        };

        self.elements.push(format!(
            "{}<g{}{}{}>",
            self.indent_str(),
            id_attr,
            class_attr,
            attrs
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string
    pub fn build(self) -> String {
        let nl = self.newline();
        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        let attrs: String = self
            .root_attrs
            .iter()
            .map(|(name, value)| format!(r#" {}="{}""#, name, value))
            .collect();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"{attrs}>"#,
            w = self.width,
            h = self.height,
            attrs = attrs
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        if !self.defs.is_empty() {
            svg.push_str("  <defs>");
            svg.push_str(nl);
            for def in &self.defs {
                svg.push_str("    ");
                svg.push_str(def);
                svg.push_str(nl);
            }
            svg.push_str("  </defs>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Two decimals are plenty for screen coordinates
fn round(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Convert a polyline to an SVG path d attribute
pub fn path_to_d(path: &[Point]) -> String {
    let Some((first, rest)) = path.split_first() else {
        return String::new();
    };

    let mut d = format!("M{} {}", round(first.x), round(first.y));
    for point in rest {
        d.push_str(&format!(" L{} {}", round(point.x), round(point.y)));
    }
    d
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
