//! Infographic Studio CLI
//!
//! Usage:
//!   infographic-studio [OPTIONS] <COMMAND>
//!
//! Commands:
//!   templates   List the template catalog by category
//!   defaults    Print the generated example data for a template
//!   gallery     Render every template of a category
//!   render      Render a DSL or JSON document to SVG
//!   convert     Convert a JSON configuration to DSL text
//!   watch       Re-render a file whenever it changes
//!   syntax      Show the DSL reference
//!
//! Options:
//!   -c, --config <FILE>  Studio configuration (TOML format)
//!   -v, --verbose        Increase log output (repeatable)

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};

use infographic_studio::playground::CycleOutcome;
use infographic_studio::syntax::SYNTAX_SKELETON;
use infographic_studio::{
    default_data, emit, Canvas, Category, Engine, Gallery, InputMode, Playground,
    PreviewEngine, RenderConfiguration, StudioConfig, Stylize, TemplateCatalog, Theme,
};

const WATCH_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "infographic-studio")]
#[command(about = "Gallery and live playground for infographic templates")]
struct Cli {
    /// Studio configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the template catalog by category
    Templates {
        /// Only list this category
        #[arg(long)]
        category: Option<Category>,
    },

    /// Print the generated example data for a template as JSON
    Defaults {
        template: String,
    },

    /// Render every template of a category, one SVG per card
    Gallery {
        #[arg(long, default_value = "compare")]
        category: Category,

        #[arg(long, default_value = "light")]
        theme: Theme,

        /// Directory to write `<template>.svg` files into
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Render a document to SVG (stdout unless -o is given)
    Render(RenderArgs),

    /// Convert a JSON configuration to DSL text
    Convert {
        /// Input file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Theme for the emitted `theme` block (default: the document's)
        #[arg(long)]
        theme: Option<Theme>,
    },

    /// Re-render FILE to the output whenever it changes
    Watch {
        file: PathBuf,

        /// Treat the file as a JSON configuration
        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the DSL reference
    Syntax,
}

#[derive(Args)]
struct RenderArgs {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Treat the input as a JSON configuration
    #[arg(long)]
    json: bool,

    /// Theme (default: the document's, else light)
    #[arg(long)]
    theme: Option<Theme>,

    /// Stylize: none or rough (default: the document's)
    #[arg(long)]
    stylize: Option<Stylize>,

    /// Write the SVG here instead of stdout (a directory gets `<file_stem>.svg`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also export a PNG (default: `<file_stem>.png` in the working directory)
    #[arg(long, num_args = 0..=1)]
    png: Option<Option<PathBuf>>,
}

/// Plain stderr logger; the level is set through `log::set_max_level`
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load configuration
    let config = match &cli.config {
        Some(path) => match StudioConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(format_args!("loading config '{}': {}", path.display(), e)),
        },
        None => StudioConfig::default(),
    };

    let engine: Rc<dyn Engine> = Rc::new(
        PreviewEngine::new()
            .with_themes(config.theme_set())
            .with_svg_config(config.export.svg_config()),
    );

    match cli.command {
        Command::Templates { category } => list_templates(engine.as_ref(), category),
        Command::Defaults { template } => print_defaults(&template),
        Command::Gallery {
            category,
            theme,
            out,
        } => render_gallery(&config, engine, category, theme, out.as_deref()),
        Command::Render(args) => render_document(&config, engine, args),
        Command::Convert { input, theme } => convert(input.as_deref(), theme),
        Command::Watch { file, json, output } => watch(&config, engine, &file, json, &output),
        Command::Syntax => println!("{}", SYNTAX_SKELETON),
    }
}

fn read_input(input: Option<&Path>) -> String {
    match input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail(format_args!("reading file '{}': {}", path.display(), e)),
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => fail(format_args!("reading from stdin: {}", e)),
            }
        }
    }
}

fn list_templates(engine: &dyn Engine, only: Option<Category>) {
    let catalog = TemplateCatalog::load(engine);
    for (category, templates) in catalog.categories().iter() {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        println!("{} ({}) - {}", category, templates.len(), category.description());
        for template in templates {
            println!("  {}", template);
        }
    }
}

fn print_defaults(template: &str) {
    match serde_json::to_string_pretty(&default_data(template)) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

fn render_gallery(
    config: &StudioConfig,
    engine: Rc<dyn Engine>,
    category: Category,
    theme: Theme,
    out: Option<&Path>,
) {
    let catalog = Arc::new(TemplateCatalog::load(engine.as_ref()));
    let mut gallery = Gallery::new(engine, catalog, Canvas::new(), config.canvas.clone());
    gallery.select_category(category);
    gallery.set_theme(theme);

    if let Some(dir) = out {
        if let Err(e) = fs::create_dir_all(dir) {
            fail(format_args!("creating '{}': {}", dir.display(), e));
        }
    }

    let mut failed = 0;
    for card in gallery.cards() {
        if let Some(error) = card.render_error() {
            failed += 1;
            println!("✗ {}: {}", card.template(), error);
            continue;
        }
        match (out, gallery.svg(card)) {
            (Some(dir), Some(svg)) => {
                let path = dir.join(format!("{}.svg", card.template()));
                if let Err(e) = fs::write(&path, svg) {
                    fail(format_args!("writing '{}': {}", path.display(), e));
                }
                println!("✓ {} -> {}", card.template(), path.display());
            }
            _ => println!("✓ {} ({})", card.template(), card.title()),
        }
    }

    println!(
        "{} {} templates rendered with the {} theme, {} failed",
        gallery.cards().len(),
        category,
        theme,
        failed
    );
}

fn render_document(config: &StudioConfig, engine: Rc<dyn Engine>, args: RenderArgs) {
    let source = read_input(args.input.as_deref());
    let filename = args
        .input
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());
    let mode = if args.json {
        InputMode::Json
    } else {
        InputMode::Syntax
    };

    let now = Instant::now();
    let mut playground =
        Playground::new(Rc::clone(&engine), Canvas::new()).with_settings(&config.playground);
    playground.switch_mode(mode, now);
    playground.set_text(source.clone(), now);
    playground.follow_document_style(now);
    if let Some(theme) = args.theme {
        playground.set_theme(theme, now);
    }
    if let Some(stylize) = args.stylize {
        playground.set_stylize(stylize, now);
    }

    match playground.render_now() {
        CycleOutcome::Rendered => {}
        CycleOutcome::ParseFailed => {
            if mode == InputMode::Syntax {
                for error in engine.parse_syntax(&source).errors {
                    eprintln!("{}", error.format(&source, &filename));
                }
            }
            fail(playground.parse_error().unwrap_or("document did not parse"));
        }
        CycleOutcome::Rejected => fail(
            playground
                .render_error()
                .unwrap_or_else(|| "render failed".to_string()),
        ),
    }

    match args.output.as_deref() {
        Some(target) => {
            let path = config.export.resolve(Some(target), "svg");
            if !playground.download_svg(&path) {
                fail(format_args!("could not write '{}'", path.display()));
            }
            eprintln!("✓ wrote {}", path.display());
        }
        None => match playground.svg_source() {
            Some(svg) => println!("{}", svg),
            None => fail("nothing was drawn"),
        },
    }

    if let Some(target) = &args.png {
        let path = config.export.resolve(target.as_deref(), "png");
        if !playground.download_png(&path) {
            fail(format_args!("PNG export to '{}' failed", path.display()));
        }
        eprintln!("✓ wrote {}", path.display());
    }
}

fn convert(input: Option<&Path>, theme: Option<Theme>) {
    let source = read_input(input);
    let config: RenderConfiguration = match serde_json::from_str(&source) {
        Ok(config) => config,
        Err(e) => fail(format_args!("invalid JSON configuration: {}", e)),
    };
    let theme = theme.or(config.theme).unwrap_or_default();
    println!("{}", emit(&config, theme));
}

fn watch(config: &StudioConfig, engine: Rc<dyn Engine>, file: &Path, json: bool, output: &Path) {
    let mode = if json {
        InputMode::Json
    } else {
        InputMode::Syntax
    };
    let mut playground = Playground::new(engine, Canvas::new()).with_settings(&config.playground);
    playground.switch_mode(mode, Instant::now());

    eprintln!("Watching {} -> {}", file.display(), output.display());
    let mut last: Option<String> = None;
    loop {
        let now = Instant::now();
        match fs::read_to_string(file) {
            Ok(content) if last.as_deref() != Some(content.as_str()) => {
                playground.set_text(content.clone(), now);
                playground.follow_document_style(now);
                last = Some(content);
            }
            Ok(_) => {}
            Err(e) => log::warn!("reading '{}': {}", file.display(), e),
        }

        match playground.poll(now) {
            Some(CycleOutcome::Rendered) => {
                if playground.download_svg(output) {
                    eprintln!("✓ wrote {}", output.display());
                }
            }
            Some(CycleOutcome::ParseFailed) => {
                eprintln!("✗ parse error: {}", playground.parse_error().unwrap_or_default());
            }
            Some(CycleOutcome::Rejected) => {
                eprintln!("✗ render error: {}", playground.render_error().unwrap_or_default());
            }
            None => {}
        }

        thread::sleep(WATCH_INTERVAL);
    }
}
