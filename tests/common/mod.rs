//! Recording engine used by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use infographic_studio::engine::{
    Engine, EngineError, EngineEvent, EngineMessage, EngineOptions, EventKind, ImageType,
    Listener, RenderInstance,
};
use infographic_studio::syntax::SyntaxOutput;
use infographic_studio::{Canvas, TemplateId};

/// What the engine saw
#[derive(Debug, Default)]
pub struct Journal {
    pub created: Vec<EngineOptions>,
    pub parsed: usize,
    pub renders: usize,
    pub destroyed: usize,
    pub live: usize,
    pub max_live: usize,
}

/// How the next instances behave
#[derive(Debug, Default, Clone)]
pub struct Script {
    /// Emit this error event instead of drawing
    pub error: Option<String>,
    /// Emit this warning before drawing
    pub warning: Option<String>,
    /// Fail construction synchronously
    pub reject_create: bool,
}

#[derive(Clone, Default)]
pub struct RecordingEngine {
    pub journal: Rc<RefCell<Journal>>,
    pub script: Rc<RefCell<Script>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Engine for RecordingEngine {
    fn templates(&self) -> Vec<TemplateId> {
        [
            "compare-swot",
            "compare-binary-horizontal-simple-fold",
            "hierarchy-structure",
            "quadrant-quarter-circular",
            "chart-column-simple",
            "list-grid-badge-card",
        ]
        .into_iter()
        .map(TemplateId::from)
        .collect()
    }

    fn parse_syntax(&self, text: &str) -> SyntaxOutput {
        self.journal.borrow_mut().parsed += 1;
        infographic_studio::parse(text)
    }

    fn create(
        &self,
        options: EngineOptions,
        canvas: &Canvas,
    ) -> Result<Box<dyn RenderInstance>, EngineError> {
        if self.script.borrow().reject_create {
            return Err(EngineError::ContainerNotFound {
                selector: options.container,
            });
        }

        let mut journal = self.journal.borrow_mut();
        journal.created.push(options.clone());
        journal.live += 1;
        journal.max_live = journal.max_live.max(journal.live);

        Ok(Box::new(RecordingInstance {
            id: journal.created.len(),
            options,
            canvas: canvas.clone(),
            journal: Rc::clone(&self.journal),
            script: self.script.borrow().clone(),
            listeners: Vec::new(),
            destroyed: false,
        }))
    }
}

struct RecordingInstance {
    id: usize,
    options: EngineOptions,
    canvas: Canvas,
    journal: Rc<RefCell<Journal>>,
    script: Script,
    listeners: Vec<(EventKind, Listener)>,
    destroyed: bool,
}

impl RecordingInstance {
    fn emit(&mut self, event: EngineEvent) {
        for (kind, listener) in self.listeners.iter_mut() {
            if *kind == event.kind() {
                listener(&event);
            }
        }
    }
}

impl RenderInstance for RecordingInstance {
    fn on(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.push((kind, listener));
    }

    fn render(&mut self) -> Result<(), EngineError> {
        if self.destroyed {
            return Err(EngineError::Destroyed);
        }
        self.journal.borrow_mut().renders += 1;

        if let Some(warning) = self.script.warning.clone() {
            self.emit(EngineEvent::Warning(vec![EngineMessage::new(warning)]));
        }
        if let Some(error) = self.script.error.clone() {
            self.emit(EngineEvent::Error(vec![
                EngineMessage::new(error),
                EngineMessage::new("second"),
            ]));
            return Ok(());
        }

        let svg = format!(
            r#"<svg data-instance="{}" data-template="{}"></svg>"#,
            self.id, self.options.template
        );
        self.canvas.mount(&self.options.container, svg);
        Ok(())
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.listeners.clear();
        self.canvas.clear(&self.options.container);
        let mut journal = self.journal.borrow_mut();
        journal.destroyed += 1;
        journal.live -= 1;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn to_data_url(&self, image: ImageType) -> Result<String, EngineError> {
        Ok(format!("data:{};base64,AAAA", image.mime()))
    }

    fn options(&self) -> &EngineOptions {
        &self.options
    }
}
