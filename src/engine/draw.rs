//! Schematic drawings for each template family
//!
//! The preview engine does not reproduce the real template artwork. It picks a
//! layout from the template name (columns, pie, tree, grid, ...) and draws the
//! data with it, so every catalog entry yields a readable SVG.

use std::f64::consts::PI;

use super::EngineOptions;
use crate::model::{InfographicData, Item, Stylize};
use crate::renderer::{path_to_d, Point, SvgBuilder, SvgConfig, TextAnchor};
use crate::template::Category;
use crate::theme::Palette;

const MARGIN: f64 = 24.0;
const GAP: f64 = 16.0;
const ARROW_GAP: f64 = 32.0;
const MAX_CARD_HEIGHT: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Area {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Area {
    fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// `n` equal columns separated by `gap`
    fn columns(&self, n: usize, gap: f64) -> Vec<Area> {
        if n == 0 {
            return vec![];
        }
        let w = ((self.w - gap * (n - 1) as f64) / n as f64).max(0.0);
        (0..n)
            .map(|i| Area {
                x: self.x + i as f64 * (w + gap),
                w,
                ..*self
            })
            .collect()
    }

    /// `n` equal rows separated by `gap`
    fn rows(&self, n: usize, gap: f64) -> Vec<Area> {
        if n == 0 {
            return vec![];
        }
        let h = ((self.h - gap * (n - 1) as f64) / n as f64).max(0.0);
        (0..n)
            .map(|i| Area {
                y: self.y + i as f64 * (h + gap),
                h,
                ..*self
            })
            .collect()
    }

    /// `n` cells filled row by row, `cols` per row
    fn grid(&self, n: usize, cols: usize, gap: f64) -> Vec<Area> {
        if n == 0 || cols == 0 {
            return vec![];
        }
        self.rows(n.div_ceil(cols), gap)
            .iter()
            .flat_map(|row| row.columns(cols, gap))
            .take(n)
            .collect()
    }

    /// Same center, height capped
    fn cap_height(&self, max: f64) -> Area {
        let h = self.h.min(max);
        Area {
            y: self.y + (self.h - h) / 2.0,
            h,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Layout {
    Columns,
    Bars,
    Line,
    Pie { donut: bool },
    WordCloud,
    Tree,
    Versus,
    Quadrants,
    Radial,
    Row { arrows: bool },
    Stack { arrows: bool },
    Grid,
}

fn layout_of(template: &str) -> Layout {
    match Category::of(template) {
        Some(Category::Chart) if template.contains("pie") => Layout::Pie {
            donut: template.contains("donut"),
        },
        Some(Category::Chart) if template.contains("line") => Layout::Line,
        Some(Category::Chart) if template.contains("bar") => Layout::Bars,
        Some(Category::Chart) if template.contains("wordcloud") => Layout::WordCloud,
        Some(Category::Chart) => Layout::Columns,
        Some(Category::Hierarchy) => Layout::Tree,
        Some(Category::Compare) if template.contains("swot") => Layout::Quadrants,
        Some(Category::Compare) => Layout::Versus,
        Some(Category::Quadrant) => Layout::Quadrants,
        Some(Category::Relation) => Layout::Radial,
        Some(Category::Sequence) if template.contains("vertical") => Layout::Stack { arrows: true },
        Some(Category::Sequence) => Layout::Row { arrows: true },
        Some(Category::List) if template.contains("grid") => Layout::Grid,
        Some(Category::List) if template.contains("column") => Layout::Stack {
            arrows: template.contains("arrow"),
        },
        Some(Category::List) => Layout::Row {
            arrows: template.contains("arrow"),
        },
        None => Layout::Grid,
    }
}

/// Draw a configuration into a complete SVG document
pub(super) fn draw(options: &EngineOptions, palette: &Palette, config: &SvgConfig) -> String {
    let mut svg = SvgBuilder::new(config.clone(), options.width, options.height);
    svg.root_attr("data-template", options.template.as_str());
    svg.root_attr("data-theme", options.theme.as_str());
    if options.editable == Some(true) {
        svg.root_attr("data-editable", "true");
    }
    if let Some(stylize) = options.stylize {
        svg.root_attr("data-stylize", stylize.as_str());
    }
    svg.add_palette(palette);
    svg.add_arrow_marker();
    svg.add_background(&palette.resolve_or_default("background"));

    let mut scene = Scene {
        svg,
        palette,
        rough: options.stylize == Some(Stylize::Rough),
    };

    let top = scene.header(&options.data, options.width);
    let body = Area {
        x: MARGIN,
        y: top,
        w: (options.width - 2.0 * MARGIN).max(0.0),
        h: (options.height - top - MARGIN).max(0.0),
    };

    let items = &options.data.items;
    match layout_of(options.template.as_str()) {
        Layout::Columns => scene.columns(items, body),
        Layout::Bars => scene.bars(items, body),
        Layout::Line => scene.line(items, body),
        Layout::Pie { donut } => scene.pie(items, body, donut),
        Layout::WordCloud => scene.word_cloud(items, body),
        Layout::Tree => scene.tree(items, body),
        Layout::Versus => scene.versus(items, body, options.template.as_str().contains("vs")),
        Layout::Quadrants => scene.quadrants(items, body),
        Layout::Radial => scene.radial(items, body, options.data.title.as_deref()),
        Layout::Row { arrows } => scene.row(items, body, arrows),
        Layout::Stack { arrows } => scene.stack(items, body, arrows),
        Layout::Grid => scene.grid(items, body),
    }

    scene.svg.build()
}

fn classes(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn max_value(items: &[Item]) -> f64 {
    let max = items
        .iter()
        .filter_map(Item::value)
        .fold(0.0_f64, f64::max);
    if max > 0.0 {
        max
    } else {
        1.0
    }
}

fn format_value(value: f64) -> String {
    format!("{}", value)
}

struct Scene<'a> {
    svg: SvgBuilder,
    palette: &'a Palette,
    rough: bool,
}

impl Scene<'_> {
    fn color(&self, token: &str) -> String {
        self.palette.resolve_or_default(token)
    }

    fn dash(&self) -> &'static str {
        if self.rough {
            r#" stroke-dasharray="6 3""#
        } else {
            ""
        }
    }

    /// Attributes for a filled, outlined shape
    fn shape(&self, fill: &str) -> String {
        format!(
            r#" fill="{}" stroke="{}" stroke-width="1.5"{}"#,
            fill,
            self.color("stroke"),
            self.dash()
        )
    }

    /// Attributes for an unfilled stroke
    fn stroke(&self, color: &str, width: f64) -> String {
        format!(
            r#" fill="none" stroke="{}" stroke-width="{}"{}"#,
            color,
            width,
            self.dash()
        )
    }

    fn text(&mut self, text: &str, at: Point, anchor: TextAnchor, size: f64, token: &str, class: &str) {
        let styles = format!(r#" font-size="{}" fill="{}""#, size, self.color(token));
        self.svg.add_text(text, at, anchor, &classes(&[class]), &styles);
    }

    /// Title and description; returns the top of the body area
    fn header(&mut self, data: &InfographicData, width: f64) -> f64 {
        let mut top = MARGIN;
        if let Some(title) = data.title.as_deref().filter(|t| !t.is_empty()) {
            self.text(title, Point::new(width / 2.0, top + 10.0), TextAnchor::Middle, 20.0, "text", "title");
            top += 30.0;
        }
        if let Some(desc) = data.desc.as_deref().filter(|d| !d.is_empty()) {
            self.text(desc, Point::new(width / 2.0, top + 8.0), TextAnchor::Middle, 13.0, "text-muted", "desc");
            top += 24.0;
        }
        top + 8.0
    }

    /// Card with an accent band, icon badge, label, desc and value
    fn card(&mut self, area: Area, item: &Item, index: usize) {
        let accent = self.palette.accent(index);
        let shape = self.shape(&self.color("surface"));
        self.svg.start_group(None, &classes(&["item"]), "");
        self.svg
            .add_rect(area.x, area.y, area.w, area.h, 8.0, &classes(&["card"]), &shape);
        self.svg.add_rect(
            area.x,
            area.y,
            area.w,
            area.h.min(6.0),
            3.0,
            &classes(&["band"]),
            &format!(r#" fill="{}""#, accent),
        );

        let center = area.center();
        if let Some(icon) = &item.icon {
            let styles = format!(
                r#" fill="{}" data-icon="{}""#,
                accent,
                crate::renderer::escape_xml(icon)
            );
            self.svg.add_circle(
                area.x + 16.0,
                area.y + 22.0,
                8.0,
                &classes(&["icon"]),
                &styles,
            );
        }

        let label_y = if item.desc.is_some() {
            center.y - 8.0
        } else {
            center.y
        };
        self.text(&item.label, Point::new(center.x, label_y), TextAnchor::Middle, 14.0, "text", "label");
        if let Some(desc) = &item.desc {
            self.text(desc, Point::new(center.x, center.y + 12.0), TextAnchor::Middle, 11.0, "text-muted", "item-desc");
        }
        if let Some(value) = item.value() {
            self.text(
                &format_value(value),
                Point::new(area.x + area.w - 10.0, area.y + 20.0),
                TextAnchor::End,
                11.0,
                "text-muted",
                "value",
            );
        }
        self.svg.end_group();
    }

    fn arrow(&mut self, from: Point, to: Point) {
        let styles = self.stroke(&self.color("stroke"), 2.0);
        self.svg.add_line(from, to, &styles, true);
    }

    fn row(&mut self, items: &[Item], area: Area, arrows: bool) {
        let gap = if arrows { ARROW_GAP } else { GAP };
        let cells: Vec<Area> = area
            .columns(items.len(), gap)
            .iter()
            .map(|cell| cell.cap_height(MAX_CARD_HEIGHT))
            .collect();
        for (i, (item, cell)) in items.iter().zip(&cells).enumerate() {
            self.card(*cell, item, i);
        }
        if arrows {
            for pair in cells.windows(2) {
                let y = pair[0].center().y;
                self.arrow(
                    Point::new(pair[0].x + pair[0].w + 4.0, y),
                    Point::new(pair[1].x - 4.0, y),
                );
            }
        }
    }

    fn stack(&mut self, items: &[Item], area: Area, arrows: bool) {
        let gap = if arrows { ARROW_GAP / 2.0 } else { GAP / 2.0 };
        let cells = area.rows(items.len(), gap);
        for (i, (item, cell)) in items.iter().zip(&cells).enumerate() {
            self.card(*cell, item, i);
        }
        if arrows {
            for pair in cells.windows(2) {
                let x = pair[0].center().x;
                self.arrow(
                    Point::new(x, pair[0].y + pair[0].h + 2.0),
                    Point::new(x, pair[1].y - 2.0),
                );
            }
        }
    }

    fn grid(&mut self, items: &[Item], area: Area) {
        let cols = (items.len() as f64).sqrt().ceil() as usize;
        for (i, (item, cell)) in items.iter().zip(area.grid(items.len(), cols, GAP)).enumerate() {
            self.card(cell, item, i);
        }
    }

    /// 2x2 cells, each listing the children of one item
    fn quadrants(&mut self, items: &[Item], area: Area) {
        for (i, (item, cell)) in items.iter().zip(area.grid(4, 2, GAP)).enumerate() {
            self.titled_list(cell, item, i);
        }
    }

    /// Side-by-side columns, optionally with a "VS" divider between two
    fn versus(&mut self, items: &[Item], area: Area, vs: bool) {
        let cells = area.columns(items.len(), GAP * 2.0);
        for (i, (item, cell)) in items.iter().zip(&cells).enumerate() {
            self.titled_list(*cell, item, i);
        }
        if vs && cells.len() == 2 {
            let x = cells[1].x - GAP;
            let y = area.center().y;
            self.text("VS", Point::new(x, y), TextAnchor::Middle, 18.0, "text", "vs");
        }
    }

    /// Header card with the item label, children (or desc) listed below
    fn titled_list(&mut self, cell: Area, item: &Item, index: usize) {
        let accent = self.palette.accent(index);
        let shape = self.shape(&self.color("surface"));
        self.svg.start_group(None, &classes(&["item"]), "");
        self.svg
            .add_rect(cell.x, cell.y, cell.w, cell.h, 8.0, &classes(&["card"]), &shape);
        let header_h = cell.h.min(36.0);
        self.svg.add_rect(
            cell.x,
            cell.y,
            cell.w,
            header_h,
            8.0,
            &classes(&["header"]),
            &format!(r#" fill="{}""#, accent),
        );
        self.text(
            &item.label,
            Point::new(cell.x + cell.w / 2.0, cell.y + header_h / 2.0),
            TextAnchor::Middle,
            14.0,
            "background",
            "label",
        );

        let lines: Vec<(&str, Option<&str>)> = if item.children().is_empty() {
            item.desc.as_deref().map(|d| (d, None)).into_iter().collect()
        } else {
            item.children()
                .iter()
                .map(|c| (c.label.as_str(), c.desc.as_deref()))
                .collect()
        };
        let body = Area {
            y: cell.y + header_h + 8.0,
            h: (cell.h - header_h - 16.0).max(0.0),
            ..cell
        };
        for ((label, desc), line) in lines.into_iter().zip(body.rows(lines_len(item), 4.0)) {
            let text = match desc {
                Some(desc) => format!("{}: {}", label, desc),
                None => label.to_string(),
            };
            self.text(
                &text,
                Point::new(line.x + 12.0, line.center().y),
                TextAnchor::Start,
                12.0,
                "text",
                "child",
            );
        }
        self.svg.end_group();
    }

    fn tree(&mut self, items: &[Item], area: Area) {
        let depth = items.iter().map(Item::depth).max().unwrap_or(0);
        if depth == 0 {
            return;
        }
        let level_h = area.h / depth as f64;
        let total: usize = items.iter().map(Item::leaf_count).sum();
        let mut x = area.x;
        for item in items {
            let w = area.w * item.leaf_count() as f64 / total as f64;
            self.node(item, Area { x, y: area.y, w, h: level_h }, 0);
            x += w;
        }
    }

    /// Draw a subtree in `slot` (one level high); returns the node's top center
    fn node(&mut self, item: &Item, slot: Area, level: usize) -> Point {
        let node_w = (slot.w - 8.0).clamp(0.0, 140.0);
        let node_h = (slot.h - 24.0).clamp(0.0, 44.0);
        let cx = slot.center().x;
        let node = Area {
            x: cx - node_w / 2.0,
            y: slot.y,
            w: node_w,
            h: node_h,
        };

        let children = item.children();
        if !children.is_empty() {
            let total: usize = children.iter().map(Item::leaf_count).sum();
            let mut x = slot.x;
            let from = Point::new(cx, node.y + node.h);
            for child in children {
                let w = slot.w * child.leaf_count() as f64 / total as f64;
                let child_slot = Area {
                    x,
                    y: slot.y + slot.h,
                    w,
                    h: slot.h,
                };
                let to = self.node(child, child_slot, level + 1);
                let styles = self.stroke(&self.color("stroke"), 1.5);
                let mid = (from.y + to.y) / 2.0;
                let d = path_to_d(&[from, Point::new(from.x, mid), Point::new(to.x, mid), to]);
                self.svg.add_path(&d, &classes(&["edge"]), &styles);
                x += w;
            }
        }

        self.card(node, item, level);
        Point::new(cx, node.y)
    }

    /// Items on a ring around a central hub
    fn radial(&mut self, items: &[Item], area: Area, title: Option<&str>) {
        let center = area.center();
        let radius = (area.w.min(area.h) / 2.0 - 32.0).max(0.0);
        let hub = (radius * 0.35).max(12.0);
        let n = items.len().max(1) as f64;

        for (i, item) in items.iter().enumerate() {
            let angle = -PI / 2.0 + 2.0 * PI * i as f64 / n;
            let at = Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin());
            let styles = self.stroke(&self.color("stroke"), 1.5);
            self.svg.add_line(center, at, &styles, false);

            let shape = self.shape(&self.palette.accent(i));
            self.svg.start_group(None, &classes(&["item"]), "");
            self.svg.add_circle(at.x, at.y, 26.0, &classes(&["node"]), &shape);
            self.text(&item.label, Point::new(at.x, at.y + 40.0), TextAnchor::Middle, 12.0, "text", "label");
            if let Some(value) = item.value() {
                self.text(&format_value(value), at, TextAnchor::Middle, 12.0, "background", "value");
            }
            self.svg.end_group();
        }

        let shape = self.shape(&self.color("surface"));
        self.svg
            .add_circle(center.x, center.y, hub, &classes(&["hub"]), &shape);
        if let Some(title) = title {
            self.text(title, center, TextAnchor::Middle, 13.0, "text", "hub-label");
        }
    }

    fn columns(&mut self, items: &[Item], area: Area) {
        let max = max_value(items);
        let baseline = area.y + area.h - 20.0;
        let plot_h = (area.h - 40.0).max(0.0);
        let styles = self.stroke(&self.color("stroke"), 1.0);
        self.svg.add_line(
            Point::new(area.x, baseline),
            Point::new(area.x + area.w, baseline),
            &styles,
            false,
        );

        for (i, (item, slot)) in items.iter().zip(area.columns(items.len(), GAP)).enumerate() {
            let value = item.value().unwrap_or(0.0).max(0.0);
            let bar_w = slot.w * 0.6;
            let bar_h = plot_h * value / max;
            let cx = slot.center().x;
            let shape = self.shape(&self.palette.accent(i));
            self.svg.start_group(None, &classes(&["item"]), "");
            self.svg.add_rect(
                cx - bar_w / 2.0,
                baseline - bar_h,
                bar_w,
                bar_h,
                2.0,
                &classes(&["bar"]),
                &shape,
            );
            self.text(&format_value(value), Point::new(cx, baseline - bar_h - 10.0), TextAnchor::Middle, 11.0, "text-muted", "value");
            self.text(&item.label, Point::new(cx, baseline + 12.0), TextAnchor::Middle, 12.0, "text", "label");
            self.svg.end_group();
        }
    }

    fn bars(&mut self, items: &[Item], area: Area) {
        let max = max_value(items);
        let label_w = (area.w * 0.2).min(100.0);
        let plot_w = (area.w - label_w - 48.0).max(0.0);

        for (i, (item, slot)) in items.iter().zip(area.rows(items.len(), 8.0)).enumerate() {
            let value = item.value().unwrap_or(0.0).max(0.0);
            let bar = slot.cap_height(28.0);
            let w = plot_w * value / max;
            let shape = self.shape(&self.palette.accent(i));
            self.svg.start_group(None, &classes(&["item"]), "");
            self.text(&item.label, Point::new(area.x + label_w - 8.0, bar.center().y), TextAnchor::End, 12.0, "text", "label");
            self.svg.add_rect(area.x + label_w, bar.y, w, bar.h, 2.0, &classes(&["bar"]), &shape);
            self.text(
                &format_value(value),
                Point::new(area.x + label_w + w + 6.0, bar.center().y),
                TextAnchor::Start,
                11.0,
                "text-muted",
                "value",
            );
            self.svg.end_group();
        }
    }

    fn line(&mut self, items: &[Item], area: Area) {
        let max = max_value(items);
        let baseline = area.y + area.h - 20.0;
        let plot_h = (area.h - 40.0).max(0.0);
        let slots = area.columns(items.len(), 0.0);

        let points: Vec<Point> = items
            .iter()
            .zip(&slots)
            .map(|(item, slot)| {
                let value = item.value().unwrap_or(0.0).max(0.0);
                Point::new(slot.center().x, baseline - plot_h * value / max)
            })
            .collect();

        let axis = self.stroke(&self.color("stroke"), 1.0);
        self.svg.add_line(
            Point::new(area.x, baseline),
            Point::new(area.x + area.w, baseline),
            &axis,
            false,
        );
        let styles = self.stroke(&self.palette.accent(0), 2.5);
        self.svg
            .add_path(&path_to_d(&points), &classes(&["series"]), &styles);

        for (item, point) in items.iter().zip(&points) {
            let shape = self.shape(&self.palette.accent(0));
            self.svg.start_group(None, &classes(&["item"]), "");
            self.svg
                .add_circle(point.x, point.y, 4.0, &classes(&["point"]), &shape);
            let value = item.value().unwrap_or(0.0);
            self.text(&format_value(value), Point::new(point.x, point.y - 12.0), TextAnchor::Middle, 11.0, "text-muted", "value");
            self.text(&item.label, Point::new(point.x, baseline + 12.0), TextAnchor::Middle, 12.0, "text", "label");
            self.svg.end_group();
        }
    }

    fn pie(&mut self, items: &[Item], area: Area, donut: bool) {
        let halves = area.columns(2, GAP);
        let (chart, legend) = match halves.as_slice() {
            [a, b] => (*a, *b),
            _ => return,
        };
        let center = chart.center();
        let radius = (chart.w.min(chart.h) / 2.0 - 4.0).max(0.0);
        let total: f64 = items.iter().filter_map(Item::value).map(|v| v.max(0.0)).sum();

        if total > 0.0 {
            let mut start = -PI / 2.0;
            for (i, item) in items.iter().enumerate() {
                let share = item.value().unwrap_or(0.0).max(0.0) / total;
                if share <= 0.0 {
                    continue;
                }
                let shape = self.shape(&self.palette.accent(i));
                if share >= 0.9999 {
                    self.svg
                        .add_circle(center.x, center.y, radius, &classes(&["slice"]), &shape);
                    break;
                }
                let end = start + 2.0 * PI * share;
                let d = format!(
                    "M{:.2} {:.2} L{:.2} {:.2} A{:.2} {:.2} 0 {} 1 {:.2} {:.2} Z",
                    center.x,
                    center.y,
                    center.x + radius * start.cos(),
                    center.y + radius * start.sin(),
                    radius,
                    radius,
                    u8::from(share > 0.5),
                    center.x + radius * end.cos(),
                    center.y + radius * end.sin(),
                );
                self.svg.add_path(&d, &classes(&["slice"]), &shape);
                start = end;
            }
        } else {
            let styles = self.stroke(&self.color("stroke"), 1.5);
            self.svg
                .add_circle(center.x, center.y, radius, &classes(&["slice"]), &styles);
        }

        if donut {
            let fill = format!(r#" fill="{}""#, self.color("background"));
            self.svg
                .add_circle(center.x, center.y, radius * 0.55, &classes(&["hole"]), &fill);
        }

        let rows = legend.cap_height(28.0 * items.len() as f64).rows(items.len(), 4.0);
        for (i, (item, row)) in items.iter().zip(rows).enumerate() {
            let y = row.center().y;
            let swatch = format!(r#" fill="{}""#, self.palette.accent(i));
            self.svg
                .add_rect(row.x, y - 6.0, 12.0, 12.0, 2.0, &classes(&["swatch"]), &swatch);
            let value = item.value().unwrap_or(0.0);
            let text = if total > 0.0 {
                format!("{} {:.1}%", item.label, value.max(0.0) / total * 100.0)
            } else {
                item.label.clone()
            };
            self.text(&text, Point::new(row.x + 20.0, y), TextAnchor::Start, 12.0, "text", "label");
        }
    }

    fn word_cloud(&mut self, items: &[Item], area: Area) {
        let max = max_value(items);
        let cols = (items.len() as f64).sqrt().ceil() as usize;
        for (i, (item, cell)) in items.iter().zip(area.grid(items.len(), cols, 4.0)).enumerate() {
            let weight = item.value().unwrap_or(0.0).max(0.0) / max;
            let styles = format!(
                r#" font-size="{:.1}" fill="{}""#,
                12.0 + 20.0 * weight,
                self.palette.accent(i)
            );
            self.svg.add_text(
                &item.label,
                cell.center(),
                TextAnchor::Middle,
                &classes(&["word"]),
                &styles,
            );
        }
    }
}

fn lines_len(item: &Item) -> usize {
    match item.children() {
        [] => usize::from(item.desc.is_some()),
        children => children.len(),
    }
}
