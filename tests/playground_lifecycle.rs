//! Render-cycle behavior of the playground against a recording engine

mod common;

use std::rc::Rc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use common::RecordingEngine;
use infographic_studio::playground::CycleOutcome;
use infographic_studio::{Canvas, Engine, InputMode, Playground, Stylize, Theme};

const CHART: &str = "infographic chart-column-simple
data
  title 月度销售额
  items
    - label 1月
      value 120
theme
  type dark";

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn open() -> (Playground, RecordingEngine, Canvas) {
    let engine = RecordingEngine::new();
    let canvas = Canvas::new();
    let shared: Rc<dyn Engine> = Rc::new(engine.clone());
    (Playground::new(shared, canvas.clone()), engine, canvas)
}

#[test]
fn test_parse_failure_never_reaches_the_engine() {
    let (mut playground, engine, _canvas) = open();
    playground.set_text("infographic chart-column-simple\ndata\n  items\n    - label a\n      value lots", Instant::now());

    assert_eq!(playground.render_now(), CycleOutcome::ParseFailed);
    assert_eq!(
        playground.parse_error(),
        Some("value must be a number, found 'lots'")
    );
    assert!(engine.journal.borrow().created.is_empty());
}

#[test]
fn test_json_failure_never_reaches_the_engine() {
    let (mut playground, engine, _canvas) = open();
    let now = Instant::now();
    playground.switch_mode(InputMode::Json, now);
    playground.set_text(r#"{"template": "chart-column-simple", "data": {"items": [{"label": "a", "value": "x"}]}}"#, now);

    assert_eq!(playground.render_now(), CycleOutcome::ParseFailed);
    assert!(playground.parse_error().is_some());
    assert!(engine.journal.borrow().created.is_empty());
}

#[test]
fn test_at_most_one_live_instance() {
    let (mut playground, engine, _canvas) = open();
    let start = Instant::now();
    for i in 0..5 {
        playground.set_text(CHART, start + ms(i * 1000));
        assert!(playground.poll(start + ms(i * 1000 + 500)).is_some());
    }

    let journal = engine.journal.borrow();
    assert_eq!(journal.created.len(), 5);
    assert_eq!(journal.destroyed, 4);
    assert_eq!(journal.max_live, 1);
    assert_eq!(journal.live, 1);
}

#[test]
fn test_failed_parse_keeps_the_live_instance() {
    let (mut playground, engine, canvas) = open();
    playground.set_text(CHART, Instant::now());
    assert_eq!(playground.render_now(), CycleOutcome::Rendered);
    let drawing = canvas.svg(playground.container());

    playground.set_text("infographic", Instant::now());
    assert_eq!(playground.render_now(), CycleOutcome::ParseFailed);

    assert_eq!(engine.journal.borrow().destroyed, 0);
    assert_eq!(canvas.svg(playground.container()), drawing);
}

#[test]
fn test_debounce_coalesces_a_burst() {
    let (mut playground, engine, _canvas) = open();
    let start = Instant::now();
    let mut text = String::from("infographic chart-column-simple\ndata\n  items");
    for i in 0..10 {
        text.push_str(&format!("\n    - label m{}\n      value {}", i, i));
        playground.set_text(text.clone(), start + ms(i * 100));
        assert_eq!(playground.poll(start + ms(i * 100 + 50)), None);
    }

    // last edit at 900ms, due at 1400ms
    assert_eq!(playground.poll(start + ms(1399)), None);
    assert_eq!(playground.poll(start + ms(1400)), Some(CycleOutcome::Rendered));
    assert_eq!(playground.poll(start + ms(5000)), None);

    let journal = engine.journal.borrow();
    assert_eq!(journal.created.len(), 1);
    assert_eq!(journal.created[0].data.items.len(), 10);
}

#[test]
fn test_selection_changes_restart_the_timer() {
    let (mut playground, engine, _canvas) = open();
    let start = Instant::now();
    playground.set_text(CHART, start);
    playground.set_theme(Theme::HandDrawn, start + ms(400));
    playground.set_stylize(Stylize::Rough, start + ms(800));

    assert_eq!(playground.remaining(start + ms(900)), Some(ms(400)));
    assert_eq!(playground.poll(start + ms(1300)), Some(CycleOutcome::Rendered));

    let journal = engine.journal.borrow();
    assert_eq!(journal.created.len(), 1);
    assert_eq!(journal.created[0].theme, Theme::HandDrawn);
    assert_eq!(journal.created[0].stylize, Some(Stylize::Rough));
}

#[test]
fn test_engine_call_payload() {
    let (mut playground, engine, _canvas) = open();
    playground.set_text(CHART, Instant::now());
    playground.render_now();

    let journal = engine.journal.borrow();
    let options = &journal.created[0];
    let payload = serde_json::to_value(options).unwrap();
    assert_eq!(payload["container"], format!("#{}", playground.container()));
    assert_eq!(payload["width"], 600.0);
    assert_eq!(payload["height"], 400.0);
    assert_eq!(payload["template"], "chart-column-simple");
    // the playground's selection wins over the document's theme block
    assert_eq!(payload["theme"], "light");
    assert_eq!(payload["editable"], true);
    assert!(payload.get("stylize").is_none());
}

#[test]
fn test_stylize_rough_is_passed_and_none_omitted() {
    let (mut playground, engine, _canvas) = open();
    let now = Instant::now();
    playground.set_text(CHART, now);
    playground.set_stylize(Stylize::Rough, now);
    playground.render_now();
    playground.set_stylize(Stylize::None, now);
    playground.render_now();

    let journal = engine.journal.borrow();
    let rough = serde_json::to_value(&journal.created[0]).unwrap();
    let plain = serde_json::to_value(&journal.created[1]).unwrap();
    assert_eq!(rough["stylize"], "rough");
    assert!(plain.get("stylize").is_none());
}

#[test]
fn test_error_channels_are_independent() {
    let (mut playground, engine, _canvas) = open();
    engine.script.borrow_mut().error = Some("layout failed".to_string());

    playground.set_text(CHART, Instant::now());
    assert_eq!(playground.render_now(), CycleOutcome::Rejected);
    assert_eq!(playground.render_error().as_deref(), Some("layout failed; second"));
    assert_eq!(playground.parse_error(), None);

    // a parse failure sets only the parse error
    playground.set_text("nope", Instant::now());
    assert_eq!(playground.render_now(), CycleOutcome::ParseFailed);
    assert!(playground.parse_error().is_some());
    assert_eq!(playground.render_error().as_deref(), Some("layout failed; second"));

    // a successful render clears only the render error
    engine.script.borrow_mut().error = None;
    playground.set_text(CHART, Instant::now());
    assert_eq!(playground.render_now(), CycleOutcome::Rendered);
    assert_eq!(playground.render_error(), None);
    assert_eq!(playground.parse_error(), None);
}

#[test]
fn test_synchronous_failure_sets_render_error() {
    let (mut playground, engine, _canvas) = open();
    engine.script.borrow_mut().reject_create = true;
    playground.set_text(CHART, Instant::now());

    assert_eq!(playground.render_now(), CycleOutcome::Rejected);
    assert!(playground.render_error().unwrap().contains("not found"));
    assert!(!playground.is_live());
}

#[test]
fn test_warnings_are_kept_but_not_errors() {
    let (mut playground, engine, _canvas) = open();
    engine.script.borrow_mut().warning = Some("icon missing".to_string());
    playground.set_text(CHART, Instant::now());

    assert_eq!(playground.render_now(), CycleOutcome::Rendered);
    assert_eq!(playground.warnings(), vec!["icon missing".to_string()]);
    assert_eq!(playground.render_error(), None);
}

#[test]
fn test_syntax_to_json_uses_the_engine_parser() {
    let (mut playground, engine, _canvas) = open();
    let now = Instant::now();
    playground.set_text(CHART, now);
    let parsed_before = engine.journal.borrow().parsed;
    playground.switch_mode(InputMode::Json, now);

    assert_eq!(engine.journal.borrow().parsed, parsed_before + 1);
    let json: serde_json::Value = serde_json::from_str(playground.text()).unwrap();
    assert_eq!(json["template"], "chart-column-simple");
    assert_eq!(json["data"]["items"][0]["value"], 120.0);
}

#[test]
fn test_png_export_through_the_instance() {
    let (mut playground, _engine, _canvas) = open();
    assert_eq!(playground.png_data_url(), None);

    playground.set_text(CHART, Instant::now());
    playground.render_now();
    assert_eq!(
        playground.png_data_url().as_deref(),
        Some("data:image/png;base64,AAAA")
    );

    let path = std::env::temp_dir().join("infographic-studio-lifecycle.png");
    assert!(playground.download_png(&path));
    assert_eq!(std::fs::read(&path).unwrap(), vec![0u8, 0, 0]);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_teardown_destroys_the_instance() {
    let (mut playground, engine, canvas) = open();
    playground.set_text(CHART, Instant::now());
    playground.render_now();
    let container = playground.container().to_string();

    drop(playground);
    assert_eq!(engine.journal.borrow().live, 0);
    assert!(!canvas.exists(&container));
}
