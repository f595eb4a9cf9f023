//! Interactive editor: a text buffer rendered live through the engine
//!
//! The playground owns one container and at most one live render instance.
//! Every edit restarts a debounce timer; when it fires, the active buffer is
//! parsed (DSL or JSON) and, only if that succeeds, the previous instance is
//! destroyed and a new one created and rendered.
//!
//! Parse errors and render errors are kept apart: a parse failure leaves the
//! last drawing and its render error untouched.

use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::canvas::{self, Canvas};
use crate::config::PlaygroundSettings;
use crate::debounce::Debouncer;
use crate::engine::{
    Engine, EngineError, EngineEvent, EngineOptions, EventKind, ImageType, InstanceSlot,
};
use crate::error::join_errors;
use crate::export::{self, ExportError};
use crate::model::{InfographicData, Item, RenderConfiguration, Stylize, Theme};
use crate::syntax::emit;

/// DSL shown when the playground opens without a handoff
pub const DEFAULT_SYNTAX: &str = "infographic list-row-horizontal-icon-arrow
data
  title 项目流程
  desc 完整的项目管理流程
  items
    - label 规划阶段
      desc 需求分析和计划制定
      value 1
    - label 设计阶段
      desc 架构设计和原型制作
      value 2
    - label 开发阶段
      desc 功能实现和测试
      value 3
    - label 发布阶段
      desc 部署上线和维护
      value 4
theme
  type light
";

/// Configuration behind the default JSON buffer
pub fn default_configuration() -> RenderConfiguration {
    let step = |label: &str, desc: &str| Item::leaf(label).with_desc(desc);
    RenderConfiguration::new(
        "list-row-horizontal-icon-arrow",
        InfographicData::new(
            "项目流程",
            vec![
                step("需求分析", "明确目标"),
                step("方案设计", "架构规划"),
                step("开发实现", "编码测试"),
                step("上线部署", "交付运维"),
            ],
        ),
    )
    .with_size(600.0, 400.0)
}

fn pretty_json(config: &RenderConfiguration) -> String {
    serde_json::to_string_pretty(config).unwrap_or_else(|err| {
        log::warn!("failed to serialize configuration: {}", err);
        String::new()
    })
}

/// Which textual form the buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    Json,
    #[default]
    Syntax,
}

impl InputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InputMode::Json => "json",
            InputMode::Syntax => "syntax",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(InputMode::Json),
            "syntax" => Ok(InputMode::Syntax),
            other => Err(format!("unknown input mode '{}' (expected json or syntax)", other)),
        }
    }
}

/// A configuration and theme handed over from the gallery
#[derive(Debug, Clone, PartialEq)]
pub struct Handoff {
    pub config: RenderConfiguration,
    pub theme: Theme,
}

/// What one render cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The buffer did not parse; nothing was touched
    ParseFailed,
    /// An instance was created and rendered without error events
    Rendered,
    /// Creation or rendering failed, or the engine reported an error
    Rejected,
}

/// Written by engine listeners during a render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderDiagnostics {
    pub render_error: Option<String>,
    pub warnings: Vec<String>,
}

static NEXT_CONTAINER: AtomicUsize = AtomicUsize::new(1);

pub struct Playground {
    engine: Rc<dyn Engine>,
    canvas: Canvas,
    container: String,
    slot: InstanceSlot,
    mode: InputMode,
    json_text: String,
    syntax_text: String,
    theme: Theme,
    stylize: Stylize,
    editable: bool,
    parse_error: Option<String>,
    diagnostics: Rc<RefCell<RenderDiagnostics>>,
    debouncer: Debouncer,
}

impl Playground {
    /// Open with the default buffers, in DSL mode
    pub fn new(engine: Rc<dyn Engine>, canvas: Canvas) -> Self {
        let json_text = pretty_json(&default_configuration());
        Self::with_buffers(engine, canvas, json_text, DEFAULT_SYNTAX.to_string(), Theme::Light)
    }

    /// Open on a configuration handed over from the gallery
    pub fn from_handoff(engine: Rc<dyn Engine>, canvas: Canvas, handoff: Handoff) -> Self {
        let json_text = pretty_json(&handoff.config);
        let syntax_text = emit(&handoff.config, handoff.theme);
        Self::with_buffers(engine, canvas, json_text, syntax_text, handoff.theme)
    }

    fn with_buffers(
        engine: Rc<dyn Engine>,
        canvas: Canvas,
        json_text: String,
        syntax_text: String,
        theme: Theme,
    ) -> Self {
        let container = format!(
            "playground-{}",
            NEXT_CONTAINER.fetch_add(1, Ordering::Relaxed)
        );
        canvas.create_container(&container);
        let defaults = PlaygroundSettings::default();

        Self {
            engine,
            canvas,
            slot: InstanceSlot::new(container.clone()),
            container,
            mode: InputMode::default(),
            json_text,
            syntax_text,
            theme,
            stylize: Stylize::None,
            editable: defaults.editable,
            parse_error: None,
            diagnostics: Rc::new(RefCell::new(RenderDiagnostics::default())),
            debouncer: Debouncer::new(defaults.debounce()),
        }
    }

    /// Apply debounce delay and editability from the studio configuration
    pub fn with_settings(mut self, settings: &PlaygroundSettings) -> Self {
        self.debouncer = Debouncer::new(settings.debounce());
        self.editable = settings.editable;
        self
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// The buffer of the active mode
    pub fn text(&self) -> &str {
        match self.mode {
            InputMode::Json => &self.json_text,
            InputMode::Syntax => &self.syntax_text,
        }
    }

    pub fn json_text(&self) -> &str {
        &self.json_text
    }

    pub fn syntax_text(&self) -> &str {
        &self.syntax_text
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn stylize(&self) -> Stylize {
        self.stylize
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    pub fn render_error(&self) -> Option<String> {
        self.diagnostics.borrow().render_error.clone()
    }

    /// Warnings reported by the engine during the last render
    pub fn warnings(&self) -> Vec<String> {
        self.diagnostics.borrow().warnings.clone()
    }

    pub fn is_live(&self) -> bool {
        self.slot.is_live()
    }

    /// Whether a render is waiting on the debounce timer
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Time until the pending render is due
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    /// Start (or restart) the debounce timer
    pub fn schedule(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    /// Replace the active buffer
    pub fn set_text(&mut self, text: impl Into<String>, now: Instant) {
        match self.mode {
            InputMode::Json => self.json_text = text.into(),
            InputMode::Syntax => self.syntax_text = text.into(),
        }
        self.schedule(now);
    }

    pub fn set_theme(&mut self, theme: Theme, now: Instant) {
        self.theme = theme;
        self.schedule(now);
    }

    pub fn set_stylize(&mut self, stylize: Stylize, now: Instant) {
        self.stylize = stylize;
        self.schedule(now);
    }

    /// Take the theme and stylize from the buffer's own `theme` block, falling
    /// back to the defaults when it declares none. An unparseable buffer
    /// leaves the selection as it was.
    pub fn follow_document_style(&mut self, now: Instant) {
        let Ok(document) = self.parse_buffer() else {
            return;
        };
        let theme = document.theme.unwrap_or_default();
        let stylize = document.stylize.unwrap_or_default();
        if (theme, stylize) != (self.theme, self.stylize) {
            self.theme = theme;
            self.stylize = stylize;
            self.schedule(now);
        }
    }

    /// Change mode, translating the current buffer into the other form.
    ///
    /// A buffer that cannot be translated leaves the target buffer as it was.
    pub fn switch_mode(&mut self, mode: InputMode, now: Instant) {
        if mode == self.mode {
            return;
        }

        match mode {
            InputMode::Syntax => {
                match serde_json::from_str::<RenderConfiguration>(&self.json_text) {
                    Ok(config) => self.syntax_text = emit(&config, self.theme),
                    Err(err) => log::debug!("JSON buffer not translated: {}", err),
                }
            }
            InputMode::Json => match self.engine.parse_syntax(&self.syntax_text).into_result() {
                Ok(config) => self.json_text = pretty_json(&config),
                Err(errors) => log::debug!("DSL buffer not translated: {}", join_errors(&errors)),
            },
        }

        self.mode = mode;
        self.schedule(now);
    }

    /// Replace the active buffer with a configuration
    pub fn load_config(&mut self, config: &RenderConfiguration, now: Instant) {
        match self.mode {
            InputMode::Json => self.json_text = pretty_json(config),
            InputMode::Syntax => self.syntax_text = emit(config, self.theme),
        }
        self.parse_error = None;
        self.schedule(now);
    }

    /// Restore the default JSON buffer
    pub fn reset(&mut self, now: Instant) {
        self.json_text = pretty_json(&default_configuration());
        self.parse_error = None;
        self.schedule(now);
    }

    pub fn dismiss_parse_error(&mut self) {
        self.parse_error = None;
    }

    /// Run the render cycle if the debounce deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<CycleOutcome> {
        if self.debouncer.fire(now) {
            Some(self.render_now())
        } else {
            None
        }
    }

    /// Run the render cycle immediately, dropping any pending one
    pub fn render_now(&mut self) -> CycleOutcome {
        self.debouncer.cancel();
        self.parse_error = None;

        match self.parse_buffer() {
            Ok(config) => self.render(&config),
            Err(message) => {
                log::debug!("{} buffer rejected: {}", self.mode, message);
                self.parse_error = Some(message);
                CycleOutcome::ParseFailed
            }
        }
    }

    fn parse_buffer(&self) -> Result<RenderConfiguration, String> {
        match self.mode {
            InputMode::Syntax => self
                .engine
                .parse_syntax(&self.syntax_text)
                .into_result()
                .map_err(|errors| join_errors(&errors)),
            InputMode::Json => serde_json::from_str(&self.json_text).map_err(|err| err.to_string()),
        }
    }

    fn render(&mut self, config: &RenderConfiguration) -> CycleOutcome {
        let options = EngineOptions::new(
            canvas::selector(&self.container),
            config,
            self.theme,
            self.stylize,
        )
        .with_editable(self.editable);
        log::debug!(
            "rendering {} into {} ({}, stylize {})",
            options.template,
            options.container,
            self.theme,
            self.stylize
        );

        self.slot.release();
        *self.diagnostics.borrow_mut() = RenderDiagnostics::default();

        let engine = Rc::clone(&self.engine);
        let canvas = self.canvas.clone();
        let instance = match self.slot.replace(|| engine.create(options, &canvas)) {
            Ok(instance) => instance,
            Err(err) => return self.fail(err),
        };

        let errors = Rc::clone(&self.diagnostics);
        instance.on(
            EventKind::Error,
            Box::new(move |event: &EngineEvent| {
                errors.borrow_mut().render_error = Some(event.joined());
            }),
        );
        let warnings = Rc::clone(&self.diagnostics);
        instance.on(
            EventKind::Warning,
            Box::new(move |event: &EngineEvent| {
                log::warn!("engine warning: {}", event.joined());
                warnings
                    .borrow_mut()
                    .warnings
                    .extend(event.messages().iter().map(|m| m.message.clone()));
            }),
        );

        if let Err(err) = instance.render() {
            return self.fail(err);
        }

        if self.diagnostics.borrow().render_error.is_some() {
            CycleOutcome::Rejected
        } else {
            CycleOutcome::Rendered
        }
    }

    fn fail(&mut self, err: EngineError) -> CycleOutcome {
        log::debug!("render failed: {}", err);
        self.diagnostics.borrow_mut().render_error = Some(err.to_string());
        CycleOutcome::Rejected
    }

    /// Markup of the SVG currently mounted in the container
    pub fn svg_source(&self) -> Option<String> {
        self.canvas.svg(&self.container)
    }

    /// Write the mounted SVG to `path`; failures are logged, not surfaced
    pub fn download_svg(&self, path: &Path) -> bool {
        let result = self
            .svg_source()
            .ok_or(ExportError::NoSvg)
            .and_then(|svg| export::write_svg(path, &svg));
        report("SVG", result).is_some()
    }

    /// PNG of the live instance as a data URL; failures are logged
    pub fn png_data_url(&self) -> Option<String> {
        report("PNG", self.data_url(ImageType::Png))
    }

    /// Write the live instance's PNG to `path`; failures are logged
    pub fn download_png(&self, path: &Path) -> bool {
        let result = self
            .data_url(ImageType::Png)
            .and_then(|url| export::write_data_url(path, &url));
        report("PNG", result).is_some()
    }

    fn data_url(&self, image: ImageType) -> Result<String, ExportError> {
        let instance = self.slot.get().ok_or(ExportError::NoInstance)?;
        Ok(instance.to_data_url(image)?)
    }
}

fn report<T>(what: &str, result: Result<T, ExportError>) -> Option<T> {
    result
        .map_err(|err| log::warn!("{} export failed: {}", what, err))
        .ok()
}

impl Drop for Playground {
    fn drop(&mut self) {
        self.slot.release();
        self.canvas.remove_container(&self.container);
    }
}

impl fmt::Debug for Playground {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playground")
            .field("container", &self.container)
            .field("mode", &self.mode)
            .field("theme", &self.theme)
            .field("stylize", &self.stylize)
            .field("parse_error", &self.parse_error)
            .field("live", &self.slot.is_live())
            .finish()
    }
}
