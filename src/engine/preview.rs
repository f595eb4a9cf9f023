//! Bundled engine: draws a schematic SVG for every catalog template

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::{draw, raster};
use super::{
    EngineError, EngineEvent, EngineMessage, EngineOptions, EventKind, ImageType, Listener,
    RenderInstance,
};
use crate::canvas::Canvas;
use crate::model::{Item, TemplateId};
use crate::renderer::SvgConfig;
use crate::syntax::{self, SyntaxOutput};
use crate::template::Category;
use crate::theme::{Palette, ThemeSet};

/// Template names known to the preview engine, in catalog order
pub const BUILTIN_TEMPLATES: &[&str] = &[
    "sequence-zigzag-steps-underline-text",
    "sequence-horizontal-zigzag-underline-text",
    "sequence-horizontal-zigzag-simple-illus",
    "sequence-circular-simple",
    "sequence-filter-mesh-simple",
    "sequence-mountain-underline-text",
    "sequence-cylinders-3d-simple",
    "sequence-color-snake-steps-horizontal-icon-line",
    "sequence-pyramid-simple",
    "sequence-funnel-simple",
    "sequence-roadmap-vertical-simple",
    "sequence-roadmap-vertical-plain-text",
    "sequence-zigzag-pucks-3d-simple",
    "sequence-ascending-steps",
    "sequence-ascending-stairs-3d-underline-text",
    "sequence-snake-steps-compact-card",
    "sequence-snake-steps-underline-text",
    "sequence-snake-steps-simple",
    "sequence-stairs-front-compact-card",
    "sequence-stairs-front-pill-badge",
    "sequence-timeline-simple",
    "sequence-timeline-rounded-rect-node",
    "sequence-timeline-simple-illus",
    "compare-binary-horizontal-simple-fold",
    "compare-hierarchy-left-right-circle-node-pill-badge",
    "compare-swot",
    "compare-binary-horizontal-badge-card-arrow",
    "compare-binary-horizontal-underline-text-vs",
    "quadrant-quarter-simple-card",
    "quadrant-quarter-circular",
    "quadrant-simple-illus",
    "relation-circle-icon-badge",
    "relation-circle-circular-progress",
    "hierarchy-tree-tech-style-capsule-item",
    "hierarchy-tree-curved-line-rounded-rect-node",
    "hierarchy-tree-tech-style-badge-card",
    "hierarchy-structure",
    "chart-column-simple",
    "chart-bar-plain-text",
    "chart-line-plain-text",
    "chart-pie-plain-text",
    "chart-pie-compact-card",
    "chart-pie-donut-plain-text",
    "chart-pie-donut-pill-badge",
    "chart-wordcloud",
    "list-grid-badge-card",
    "list-grid-candy-card-lite",
    "list-grid-ribbon-card",
    "list-row-horizontal-icon-arrow",
    "list-row-simple-illus",
    "list-sector-plain-text",
    "list-column-done-list",
    "list-column-vertical-icon-arrow",
    "list-column-simple-vertical-arrow",
    "list-zigzag-down-compact-card",
    "list-zigzag-down-simple",
    "list-zigzag-up-compact-card",
    "list-zigzag-up-simple",
];

/// The bundled rendering engine
#[derive(Debug, Clone)]
pub struct PreviewEngine {
    templates: Vec<TemplateId>,
    themes: ThemeSet,
    svg: SvgConfig,
}

impl Default for PreviewEngine {
    fn default() -> Self {
        Self {
            templates: BUILTIN_TEMPLATES.iter().map(|t| TemplateId::from(*t)).collect(),
            themes: ThemeSet::default(),
            svg: SvgConfig::default(),
        }
    }
}

impl PreviewEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use palettes with configured overrides
    pub fn with_themes(mut self, themes: ThemeSet) -> Self {
        self.themes = themes;
        self
    }

    /// SVG output options for every drawing
    pub fn with_svg_config(mut self, svg: SvgConfig) -> Self {
        self.svg = svg;
        self
    }

    /// Replace the template catalog
    pub fn with_templates(mut self, templates: Vec<TemplateId>) -> Self {
        self.templates = templates;
        self
    }
}

impl super::Engine for PreviewEngine {
    fn templates(&self) -> Vec<TemplateId> {
        self.templates.clone()
    }

    fn parse_syntax(&self, text: &str) -> SyntaxOutput {
        syntax::parse(text)
    }

    fn create(
        &self,
        options: EngineOptions,
        canvas: &Canvas,
    ) -> Result<Box<dyn RenderInstance>, EngineError> {
        if !canvas.exists(&options.container) {
            return Err(EngineError::ContainerNotFound {
                selector: options.container,
            });
        }
        if !(options.width > 0.0 && options.height > 0.0) {
            return Err(EngineError::InvalidDimensions {
                width: options.width,
                height: options.height,
            });
        }

        let known = self.templates.contains(&options.template);
        let palette = self
            .themes
            .palette(options.theme)
            .with_accents(&options.palette);

        Ok(Box::new(PreviewInstance {
            options,
            canvas: canvas.clone(),
            palette,
            svg: self.svg.clone(),
            known,
            listeners: Vec::new(),
            drawing: None,
            destroyed: false,
        }))
    }
}

struct PreviewInstance {
    options: EngineOptions,
    canvas: Canvas,
    palette: Palette,
    svg: SvgConfig,
    known: bool,
    listeners: Vec<(EventKind, Listener)>,
    drawing: Option<String>,
    destroyed: bool,
}

impl PreviewInstance {
    fn emit(&mut self, event: EngineEvent) {
        let kind = event.kind();
        for (_, listener) in self.listeners.iter_mut().filter(|(k, _)| *k == kind) {
            listener(&event);
        }
    }

    /// Problems that prevent drawing
    fn errors(&self) -> Vec<EngineMessage> {
        let template = self.options.template.as_str();
        if !self.known {
            return vec![EngineMessage::new(format!(
                "template '{}' is not registered",
                template
            ))];
        }

        let mut errors = Vec::new();
        if Category::of(template) == Some(Category::Chart) {
            let is_pie = template.contains("pie");
            for item in flatten(&self.options.data.items) {
                match item.value() {
                    None if !item.is_branch() => errors.push(EngineMessage::new(format!(
                        "item '{}' needs a numeric value for {}",
                        item.label, template
                    ))),
                    Some(v) if is_pie && v < 0.0 => errors.push(EngineMessage::new(format!(
                        "pie slice '{}' has a negative value ({})",
                        item.label, v
                    ))),
                    _ => {}
                }
            }
        }
        errors
    }

    /// Problems that degrade the drawing but do not stop it
    fn warnings(&self) -> Vec<EngineMessage> {
        let template = self.options.template.as_str();
        let items = &self.options.data.items;
        let mut warnings = Vec::new();

        if items.is_empty() {
            warnings.push(EngineMessage::new("data has no items to draw"));
        }
        if template == "compare-swot" && items.len() != 4 {
            warnings.push(EngineMessage::new(format!(
                "compare-swot expects 4 items, found {}",
                items.len()
            )));
        }
        if !template.contains("illus") {
            for item in flatten(items).filter(|item| item.illus.is_some()) {
                warnings.push(EngineMessage::new(format!(
                    "'illus' on '{}' is ignored by {}",
                    item.label, template
                )));
            }
        }
        warnings
    }
}

impl RenderInstance for PreviewInstance {
    fn on(&mut self, kind: EventKind, listener: Listener) {
        if !self.destroyed {
            self.listeners.push((kind, listener));
        }
    }

    fn render(&mut self) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }

        let errors = self.errors();
        if !errors.is_empty() {
            self.canvas.clear(&self.options.container);
            self.drawing = None;
            self.emit(EngineEvent::Error(errors));
            return Ok(());
        }

        let warnings = self.warnings();
        if !warnings.is_empty() {
            self.emit(EngineEvent::Warning(warnings));
        }

        let svg = draw::draw(&self.options, &self.palette, &self.svg);
        if !self.canvas.mount(&self.options.container, svg.clone()) {
            return Err(EngineError::ContainerNotFound {
                selector: self.options.container.clone(),
            });
        }
        self.drawing = Some(svg);
        Ok(())
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.listeners.clear();
        self.drawing = None;
        self.canvas.clear(&self.options.container);
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn to_data_url(&self, image: ImageType) -> Result<String, EngineError> {
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        match image {
            ImageType::Svg => {
                let svg = self.drawing.as_ref().ok_or(EngineError::NotRendered)?;
                Ok(format!("data:{};base64,{}", image.mime(), STANDARD.encode(svg)))
            }
            ImageType::Png => {
                let svg = self.drawing.as_ref().ok_or(EngineError::NotRendered)?;
                raster::png_data_url(svg, &self.palette.resolve_or_default("font-family"))
            }
        }
    }

    fn options(&self) -> &EngineOptions {
        &self.options
    }
}

/// Every item of a tree, depth first
fn flatten(items: &[Item]) -> Box<dyn Iterator<Item = &Item> + '_> {
    Box::new(
        items
            .iter()
            .flat_map(|item| std::iter::once(item).chain(flatten(item.children()))),
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::engine::Engine;
    use crate::model::{InfographicData, RenderConfiguration, Stylize, Theme};
    use crate::template::default_data;

    fn options(template: &str, data: InfographicData) -> EngineOptions {
        let config = RenderConfiguration::new(template, data);
        EngineOptions::new("#c", &config, Theme::Light, Stylize::None)
    }

    fn canvas() -> Canvas {
        let canvas = Canvas::new();
        canvas.create_container("c");
        canvas
    }

    fn record(instance: &mut dyn RenderInstance, kind: EventKind) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        instance.on(
            kind,
            Box::new(move |event: &EngineEvent| sink.borrow_mut().push(event.joined())),
        );
        seen
    }

    #[test]
    fn test_builtin_templates_are_all_categorized() {
        for template in BUILTIN_TEMPLATES {
            assert!(Category::of(template).is_some(), "{template}");
        }
        assert_eq!(BUILTIN_TEMPLATES.len(), 58);
    }

    #[test]
    fn test_every_builtin_renders_its_default_data() {
        let engine = PreviewEngine::new();
        let canvas = canvas();
        for template in BUILTIN_TEMPLATES {
            let mut instance = engine
                .create(options(template, default_data(template)), &canvas)
                .unwrap();
            let errors = record(instance.as_mut(), EventKind::Error);
            instance.render().unwrap();
            assert!(errors.borrow().is_empty(), "{template}: {:?}", errors.borrow());
            assert!(canvas.svg("#c").is_some(), "{template}");
        }
    }

    #[test]
    fn test_missing_container_fails_synchronously() {
        let engine = PreviewEngine::new();
        let result = engine.create(
            options("chart-column-simple", default_data("chart-column-simple")),
            &Canvas::new(),
        );
        assert!(matches!(result, Err(EngineError::ContainerNotFound { .. })));
    }

    #[test]
    fn test_invalid_dimensions_fail_synchronously() {
        let engine = PreviewEngine::new();
        let mut opts = options("list-grid-badge-card", default_data("list-grid-badge-card"));
        opts.width = 0.0;
        let result = engine.create(opts, &canvas());
        assert!(matches!(result, Err(EngineError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_unknown_template_emits_error_event() {
        let engine = PreviewEngine::new();
        let canvas = canvas();
        let mut instance = engine
            .create(options("list-nope", default_data("list-nope")), &canvas)
            .unwrap();
        let errors = record(instance.as_mut(), EventKind::Error);
        instance.render().unwrap();
        assert_eq!(errors.borrow().len(), 1);
        assert!(errors.borrow()[0].contains("list-nope"));
        assert!(canvas.svg("#c").is_none());
    }

    #[test]
    fn test_chart_without_values_emits_error_event() {
        let engine = PreviewEngine::new();
        let data = InfographicData::new("t", vec![Item::leaf("a"), Item::leaf("b")]);
        let mut instance = engine
            .create(options("chart-column-simple", data), &canvas())
            .unwrap();
        let errors = record(instance.as_mut(), EventKind::Error);
        instance.render().unwrap();
        assert_eq!(
            errors.borrow().as_slice(),
            [
                "item 'a' needs a numeric value for chart-column-simple; \
                 item 'b' needs a numeric value for chart-column-simple"
            ]
        );
    }

    #[test]
    fn test_warnings_do_not_block_drawing() {
        let engine = PreviewEngine::new();
        let canvas = canvas();
        let data = InfographicData::new("t", vec![Item::leaf("a").with_illus("rocket")]);
        let mut instance = engine
            .create(options("compare-swot", data), &canvas)
            .unwrap();
        let warnings = record(instance.as_mut(), EventKind::Warning);
        instance.render().unwrap();
        assert_eq!(
            warnings.borrow().as_slice(),
            ["compare-swot expects 4 items, found 1; 'illus' on 'a' is ignored by compare-swot"]
        );
        assert!(canvas.svg("#c").is_some());
    }

    #[test]
    fn test_destroy_is_idempotent_and_clears() {
        let engine = PreviewEngine::new();
        let canvas = canvas();
        let mut instance = engine
            .create(options("chart-pie-plain-text", default_data("chart-pie-plain-text")), &canvas)
            .unwrap();
        instance.render().unwrap();
        assert!(canvas.svg("#c").is_some());

        instance.destroy();
        instance.destroy();
        assert!(instance.is_destroyed());
        assert!(canvas.svg("#c").is_none());
        assert_eq!(instance.render(), Err(EngineError::Destroyed));
    }

    #[test]
    fn test_destroy_before_render() {
        let engine = PreviewEngine::new();
        let mut instance = engine
            .create(options("list-grid-badge-card", InfographicData::default()), &canvas())
            .unwrap();
        instance.destroy();
        assert!(instance.is_destroyed());
    }

    #[test]
    fn test_data_urls() {
        let engine = PreviewEngine::new();
        let mut instance = engine
            .create(options("chart-line-plain-text", default_data("chart-line-plain-text")), &canvas())
            .unwrap();
        assert_eq!(instance.to_data_url(ImageType::Svg), Err(EngineError::NotRendered));

        instance.render().unwrap();
        let url = instance.to_data_url(ImageType::Svg).unwrap();
        assert!(url.starts_with("data:image/svg+xml;base64,"));
        let png = crate::export::DataUrl::parse(&instance.to_data_url(ImageType::Png).unwrap()).unwrap();
        assert_eq!(png.mime, "image/png");
        assert_eq!(&png.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_palette_override_reaches_drawing() {
        let engine = PreviewEngine::new();
        let canvas = canvas();
        let mut config = RenderConfiguration::new(
            "list-row-horizontal-icon-arrow",
            default_data("list-row-horizontal-icon-arrow"),
        );
        config.palette = vec!["#123456".to_string()];
        let opts = EngineOptions::new("#c", &config, Theme::Dark, Stylize::Rough);
        let mut instance = engine.create(opts, &canvas).unwrap();
        instance.render().unwrap();
        let svg = canvas.svg("#c").unwrap();
        assert!(svg.contains("#123456"));
        assert!(svg.contains(r#"data-theme="dark""#));
        assert!(svg.contains(r#"data-stylize="rough""#));
    }

    #[test]
    fn test_svg_config_shapes_output() {
        let engine = PreviewEngine::new().with_svg_config(
            SvgConfig::new()
                .with_standalone(true)
                .with_pretty_print(false)
                .without_class_prefix(),
        );
        let canvas = canvas();
        let mut instance = engine
            .create(options("list-grid-badge-card", default_data("list-grid-badge-card")), &canvas)
            .unwrap();
        instance.render().unwrap();
        let svg = canvas.svg("#c").unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(!svg.contains("ig-"));
        assert!(svg.contains(r#"class="rect card""#));
        assert!(!svg.contains("\n    <rect"));
    }

    #[test]
    fn test_markup_in_palette_never_reaches_drawing() {
        let engine = PreviewEngine::new();
        let canvas = canvas();
        let mut config = RenderConfiguration::new("chart-pie-plain-text", default_data("chart-pie-plain-text"));
        config.palette = vec![r#""/><script>alert(1)</script><x"#.to_string()];
        let opts = EngineOptions::new("#c", &config, Theme::Light, Stylize::None);
        let mut instance = engine.create(opts, &canvas).unwrap();
        instance.render().unwrap();
        let svg = canvas.svg("#c").unwrap();
        assert!(!svg.contains("<script"));
        assert!(svg.contains("#1783ff"));
    }
}
