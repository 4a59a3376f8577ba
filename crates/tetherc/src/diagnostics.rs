//! Uniform diagnostics for both passes.
//!
//! Binding errors, binding warnings and naming conflicts are converted into
//! one [`Diagnostic`] record with a stable code, then rendered either with
//! ariadne (a labelled excerpt of the snippet) or as one JSON object per line.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use serde::Serialize;
use tether_bind::{BindError, BindErrorKind, BindWarning};
use tether_common::decl::{CompilationUnit, SourceLocation};
use tether_common::span::Span;
use tether_naming::{ConflictKind, NameConflict};
use tether_snippet::{SnippetError, SnippetErrorKind, SnippetWarning};

use crate::config::DiagnosticsConfig;

// ── Error Codes ────────────────────────────────────────────────────────

pub const SYNTAX_ERROR: &str = "E0101";
pub const UNSUPPORTED_INLINE: &str = "E0102";
pub const UNBOUND_PLACEHOLDER: &str = "E0103";
pub const ARGUMENT_COUNT_MISMATCH: &str = "E0104";
pub const NAME_CONFLICT: &str = "E0201";
pub const SHADOWED_THIS: &str = "W0101";

fn snippet_code(kind: &SnippetErrorKind) -> (&'static str, &'static str) {
    match kind {
        SnippetErrorKind::Lex(_) | SnippetErrorKind::Syntax(_) => (SYNTAX_ERROR, "SyntaxError"),
        SnippetErrorKind::UnsupportedInlineConstruct(_) => {
            (UNSUPPORTED_INLINE, "UnsupportedInlineConstruct")
        }
        SnippetErrorKind::UnboundPlaceholder(_) => (UNBOUND_PLACEHOLDER, "UnboundPlaceholder"),
    }
}

// ── Diagnostic Record ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub severity: Severity,
    /// Error category, e.g. `UnboundPlaceholder`.
    pub kind: &'static str,
    /// Signature of the member the finding belongs to.
    pub member: String,
    /// Host location: the snippet attribute, call site or type.
    pub location: SourceLocation,
    pub message: String,
    /// Text `span` points into: the snippet or a call-site argument.
    #[serde(skip)]
    pub source: Option<String>,
    pub span: Option<Span>,
    pub label: Option<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn from_bind_error(err: &BindError, unit: &CompilationUnit) -> Self {
        let member = unit.member_signature(err.member);
        match &err.kind {
            BindErrorKind::Snippet(kind) => {
                let (code, category) = snippet_code(kind);
                let span = err.span.unwrap_or_default();
                let (label, help) = match kind {
                    SnippetErrorKind::Lex(_) | SnippetErrorKind::Syntax(_) => {
                        (Some("here".to_string()), None)
                    }
                    SnippetErrorKind::UnsupportedInlineConstruct(_) => (
                        Some("not translatable at a call site".to_string()),
                        Some("use a body replacement for statement logic".to_string()),
                    ),
                    SnippetErrorKind::UnboundPlaceholder(hole) => (
                        Some(format!("`{hole}` is not a parameter of `{member}`")),
                        None,
                    ),
                };
                Self {
                    code,
                    severity: Severity::Error,
                    kind: category,
                    member,
                    location: err.location.clone(),
                    message: SnippetError::new(kind.clone(), span).to_string(),
                    source: err.source.clone(),
                    span: err.span,
                    label,
                    help,
                }
            }
            BindErrorKind::ArgumentCountMismatch(mismatch) => Self {
                code: ARGUMENT_COUNT_MISMATCH,
                severity: Severity::Error,
                kind: "ArgumentCountMismatch",
                help: Some(format!("`{member}` takes {} values", mismatch.expected)),
                member,
                location: err.location.clone(),
                message: mismatch.to_string(),
                source: None,
                span: None,
                label: None,
            },
        }
    }

    /// A snippet that failed to parse outside any member, as in `tetherc parse`.
    pub fn from_snippet_error(err: &SnippetError, source: &str, location: SourceLocation) -> Self {
        let (code, kind) = snippet_code(&err.kind);
        Self {
            code,
            severity: Severity::Error,
            kind,
            member: "<snippet>".to_string(),
            location,
            message: err.to_string(),
            source: Some(source.to_string()),
            span: Some(err.span),
            label: None,
            help: None,
        }
    }

    pub fn from_bind_warning(warning: &BindWarning, unit: &CompilationUnit) -> Self {
        let (code, kind, help) = match warning.warning {
            SnippetWarning::ShadowedThis { .. } => (
                SHADOWED_THIS,
                "ShadowedThis",
                "rename the parameter to refer to the receiver",
            ),
        };
        Self {
            code,
            severity: Severity::Warning,
            kind,
            member: unit.member_signature(warning.member),
            location: warning.location.clone(),
            message: warning.to_string(),
            source: Some(warning.source.clone()),
            span: Some(warning.warning.span()),
            label: Some("resolves to the parameter".to_string()),
            help: Some(help.to_string()),
        }
    }

    pub fn from_conflict(conflict: &NameConflict) -> Self {
        let help = match conflict.kind {
            ConflictKind::Collision => "give one of the members a distinct fixed name",
            ConflictKind::Divergent => "use one fixed name across the hierarchy",
        };
        Self {
            code: NAME_CONFLICT,
            severity: Severity::Error,
            kind: "NameConflict",
            member: conflict.first_signature.clone(),
            location: conflict.location.clone(),
            message: conflict.to_string(),
            source: None,
            span: None,
            label: None,
            help: Some(help.to_string()),
        }
    }

    /// Apply the [diagnostics] section: promote warnings first, then demote
    /// the listed codes.
    pub fn apply_config(&mut self, config: &DiagnosticsConfig) {
        if config.warnings_as_errors {
            self.severity = Severity::Error;
        }
        if config.demote.iter().any(|code| code == self.code) {
            self.severity = Severity::Warning;
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

/// How diagnostics are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticOptions {
    pub color: bool,
    pub json: bool,
}

impl DiagnosticOptions {
    /// Colorless human-readable output, used by tests.
    pub fn colorless() -> Self {
        Self {
            color: false,
            json: false,
        }
    }
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            color: true,
            json: false,
        }
    }
}

/// Render one diagnostic, newline terminated.
pub fn render_diagnostic(diag: &Diagnostic, opts: &DiagnosticOptions) -> String {
    if opts.json {
        return render_json(diag);
    }
    match (&diag.source, diag.span) {
        (Some(source), Some(span)) => render_excerpt(diag, source, span, opts),
        _ => render_plain(diag),
    }
}

fn render_json(diag: &Diagnostic) -> String {
    let spans = match diag.span {
        Some(span) => serde_json::json!([{
            "start": span.start,
            "end": span.end,
            "label": diag.label,
        }]),
        None => serde_json::json!([]),
    };
    let json = serde_json::json!({
        "code": diag.code,
        "severity": diag.severity,
        "kind": diag.kind,
        "message": diag.message,
        "member": diag.member,
        "file": diag.location.file,
        "line": diag.location.line,
        "column": diag.location.column,
        "spans": spans,
        "help": diag.help,
    });
    format!("{json}\n")
}

fn render_plain(diag: &Diagnostic) -> String {
    let mut out = format!(
        "{}[{}]: {}\n  --> {} ({})\n",
        diag.severity.as_str(),
        diag.code,
        diag.message,
        diag.location,
        diag.member
    );
    if let Some(help) = &diag.help {
        out.push_str(&format!("  help: {help}\n"));
    }
    out
}

fn render_excerpt(diag: &Diagnostic, source: &str, span: Span, opts: &DiagnosticOptions) -> String {
    let config = Config::default().with_color(opts.color);
    let range = clamp(span, source.len());
    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };
    let color = match diag.severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    };

    let mut label = Label::new(range.clone()).with_color(color);
    if let Some(text) = &diag.label {
        label = label.with_message(text);
    }
    let mut builder = Report::<Range<usize>>::build(kind, range)
        .with_code(diag.code)
        .with_message(&diag.message)
        .with_config(config)
        .with_label(label)
        .with_note(format!("in snippet of `{}` at {}", diag.member, diag.location));
    if let Some(help) = &diag.help {
        builder.set_help(help);
    }

    let mut buf = Vec::new();
    if let Err(e) = builder.finish().write(Source::from(source), &mut buf) {
        tracing::warn!(error = %e, "failed to render diagnostic excerpt");
        return render_plain(diag);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Keep a span inside the source and at least one byte wide where possible.
fn clamp(span: Span, len: usize) -> Range<usize> {
    let start = (span.start as usize).min(len);
    let end = (span.end as usize).min(len).max(start);
    if start == end {
        start..(end + 1).min(len)
    } else {
        start..end
    }
}

/// Convert, configure and sort every finding of a translation.
pub fn collect(
    unit: &CompilationUnit,
    errors: &[BindError],
    warnings: &[BindWarning],
    conflicts: &[NameConflict],
    config: &DiagnosticsConfig,
) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = errors
        .iter()
        .map(|e| Diagnostic::from_bind_error(e, unit))
        .chain(warnings.iter().map(|w| Diagnostic::from_bind_warning(w, unit)))
        .chain(conflicts.iter().map(Diagnostic::from_conflict))
        .collect();
    for diag in &mut diagnostics {
        diag.apply_config(config);
    }
    diagnostics.sort_by(|a, b| {
        (&a.location.file, a.location.line, a.location.column, a.code).cmp(&(
            &b.location.file,
            b.location.line,
            b.location.column,
            b.code,
        ))
    });
    diagnostics
}
