//! Browsable grid of every template in one category
//!
//! Each visible template becomes a card with its own container, instance slot
//! and render-error cell. Changing the category or theme throws every card
//! away and renders the new set from scratch.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::canvas::{self, Canvas};
use crate::config::CanvasSettings;
use crate::engine::{Engine, EngineEvent, EngineOptions, EventKind, InstanceSlot};
use crate::model::{RenderConfiguration, Stylize, TemplateId, Theme};
use crate::playground::Handoff;
use crate::template::{default_data, Category, TemplateCatalog};

static NEXT_GALLERY: AtomicUsize = AtomicUsize::new(1);

/// One rendered template in the grid
pub struct GalleryCard {
    index: usize,
    config: RenderConfiguration,
    container: String,
    slot: InstanceSlot,
    render_error: Rc<RefCell<Option<String>>>,
}

impl GalleryCard {
    pub fn template(&self) -> &TemplateId {
        &self.config.template
    }

    pub fn config(&self) -> &RenderConfiguration {
        &self.config
    }

    /// Heading shown above the card: the data title, or a positional fallback
    pub fn title(&self) -> String {
        self.config
            .data
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("模板 {}", self.index + 1))
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn render_error(&self) -> Option<String> {
        self.render_error.borrow().clone()
    }

    pub fn is_live(&self) -> bool {
        self.slot.is_live()
    }
}

impl fmt::Debug for GalleryCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryCard")
            .field("template", &self.config.template)
            .field("container", &self.container)
            .field("live", &self.slot.is_live())
            .finish()
    }
}

pub struct Gallery {
    engine: Rc<dyn Engine>,
    catalog: Arc<TemplateCatalog>,
    canvas: Canvas,
    settings: CanvasSettings,
    prefix: String,
    category: Category,
    theme: Theme,
    cards: Vec<GalleryCard>,
}

impl Gallery {
    /// Open on the first category with the light theme and render it
    pub fn new(
        engine: Rc<dyn Engine>,
        catalog: Arc<TemplateCatalog>,
        canvas: Canvas,
        settings: CanvasSettings,
    ) -> Self {
        let mut gallery = Self {
            engine,
            catalog,
            canvas,
            settings,
            prefix: format!("gallery-{}", NEXT_GALLERY.fetch_add(1, Ordering::Relaxed)),
            category: Category::Compare,
            theme: Theme::default(),
            cards: Vec::new(),
        };
        gallery.rebuild();
        gallery
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn cards(&self) -> &[GalleryCard] {
        &self.cards
    }

    /// Category tabs with their template counts, in display order
    pub fn tabs(&self) -> Vec<(Category, usize)> {
        self.catalog
            .categories()
            .iter()
            .map(|(category, templates)| (category, templates.len()))
            .collect()
    }

    pub fn select_category(&mut self, category: Category) {
        if category != self.category {
            self.category = category;
            self.rebuild();
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if theme != self.theme {
            self.theme = theme;
            self.rebuild();
        }
    }

    /// Card size: hierarchy and quadrant templates get the tall height
    pub fn card_size(&self, template: &TemplateId) -> (f64, f64) {
        let height = match Category::of(template.as_str()) {
            Some(Category::Hierarchy | Category::Quadrant) => self.settings.tall_height,
            _ => self.settings.height,
        };
        (self.settings.width, height)
    }

    /// Preset configuration for a template
    pub fn configuration(&self, template: &TemplateId) -> RenderConfiguration {
        let (width, height) = self.card_size(template);
        RenderConfiguration::new(template.clone(), default_data(template.as_str()))
            .with_size(width, height)
    }

    /// Package a card's configuration and the active theme for the playground
    pub fn open_in_playground(&self, template: &TemplateId) -> Handoff {
        let config = self
            .cards
            .iter()
            .find(|card| card.template() == template)
            .map(|card| card.config.clone())
            .unwrap_or_else(|| self.configuration(template));
        Handoff {
            config,
            theme: self.theme,
        }
    }

    /// SVG markup mounted for a card
    pub fn svg(&self, card: &GalleryCard) -> Option<String> {
        self.canvas.svg(&card.container)
    }

    fn clear(&mut self) {
        for mut card in self.cards.drain(..) {
            card.slot.release();
            self.canvas.remove_container(&card.container);
        }
    }

    fn rebuild(&mut self) {
        self.clear();

        let templates = self.catalog.in_category(self.category).to_vec();
        log::debug!(
            "gallery: rendering {} {} templates ({})",
            templates.len(),
            self.category,
            self.theme
        );

        for (index, template) in templates.iter().enumerate() {
            let container = format!("{}-{}", self.prefix, template);
            self.canvas.create_container(&container);
            let mut card = GalleryCard {
                index,
                config: self.configuration(template),
                slot: InstanceSlot::new(container.clone()),
                container,
                render_error: Rc::new(RefCell::new(None)),
            };
            self.render_card(&mut card);
            self.cards.push(card);
        }
    }

    fn render_card(&self, card: &mut GalleryCard) {
        *card.render_error.borrow_mut() = None;
        let options = EngineOptions::new(
            canvas::selector(&card.container),
            &card.config,
            self.theme,
            Stylize::None,
        );

        let engine = Rc::clone(&self.engine);
        let canvas = self.canvas.clone();
        let result = card
            .slot
            .replace(|| engine.create(options, &canvas))
            .and_then(|instance| {
                let cell = Rc::clone(&card.render_error);
                instance.on(
                    EventKind::Error,
                    Box::new(move |event: &EngineEvent| {
                        *cell.borrow_mut() = Some(event.joined());
                    }),
                );
                instance.render()
            });

        if let Err(err) = result {
            *card.render_error.borrow_mut() = Some(err.to_string());
        }
        if let Some(error) = card.render_error.borrow().as_deref() {
            log::warn!("gallery card {} failed: {}", card.config.template, error);
        }
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Gallery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gallery")
            .field("category", &self.category)
            .field("theme", &self.theme)
            .field("cards", &self.cards)
            .finish()
    }
}
