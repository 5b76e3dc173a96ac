//! Error rendering using ariadne
//!
//! Turns a Quill [`Error`] into a report that quotes the offending source
//! line and marks the failing token.

use crate::{Diagnostic, Error, Severity};
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<input>";

/// Render an error with formatting to stderr.
///
/// # Example
/// ```no_run
/// use quill::{Engine, EngineOptions, render_error};
///
/// let engine = Engine::with_stdlib(EngineOptions::default()).unwrap();
///
/// let source = "1 + ";
/// if let Err(e) = engine.compile(source) {
///     render_error(source, &e);
/// }
/// ```
pub fn render_error(source: &str, error: &Error) {
    render_error_to_writer(source, error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer.
pub fn render_error_to(source: &str, error: &Error, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(source, error, writer, true)
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(source: &str, error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(source, error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(source: &str, error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(source, error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    source: &str,
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Api(msg) => writeln!(writer, "API error: {}", msg),
        _ => render_diagnostic(source, &error.to_diagnostic(), writer, use_color),
    }
}

fn render_diagnostic(
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    // Spans are byte offsets; clamp them so a stale diagnostic cannot point
    // past the end of the text being shown.
    let end = diag.span.0.end.min(source.len());
    let start = diag.span.0.start.min(end);
    let span = start..end;

    let mut report = Report::build(kind, (SOURCE_ID, span.clone()))
        .with_message(format!("{} (at {})", diag.message, diag.position))
        .with_config(
            Config::default()
                .with_color(use_color)
                .with_index_type(IndexType::Byte),
        );

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    report = report.with_label(
        Label::new((SOURCE_ID, span))
            .with_message(&diag.message)
            .with_color(Color::Red),
    );

    for help_msg in &diag.help {
        report = report.with_help(help_msg);
    }

    report
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}
