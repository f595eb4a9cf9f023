//! Error types for DSL parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// One problem found while parsing DSL text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct SyntaxError {
    pub span: Span,
    pub message: String,
}

impl SyntaxError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }

    /// Line number (1-based) of the error start in `source`
    pub fn line(&self, source: &str) -> usize {
        let end = self.span.start.min(source.len());
        source
            .get(..end)
            .map(|prefix| prefix.matches('\n').count() + 1)
            .unwrap_or(1)
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("{}:{}: {}", filename, self.line(source), self.message),
        }
    }
}

/// Messages of several syntax errors joined with `; `
pub fn join_errors(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
