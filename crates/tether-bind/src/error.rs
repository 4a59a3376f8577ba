//! Binding errors and warnings.
//!
//! Every finding carries the host location it is reported at (the snippet
//! attribute, or the call site for expansion failures) together with the
//! text its span points into, so a diagnostic can show both.

use std::fmt;

use tether_common::decl::{MemberId, SourceLocation};
use tether_common::span::Span;
use tether_snippet::{SnippetError, SnippetErrorKind, SnippetWarning};

/// A call site supplied a different number of values than the member takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentCountMismatch {
    /// Declared parameters, plus one for the receiver of instance members.
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for ArgumentCountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "argument count mismatch: expected {} arguments, found {}",
            self.expected, self.found
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindErrorKind {
    /// Parsing or resolving the snippet (or a call-site argument) failed.
    Snippet(SnippetErrorKind),
    ArgumentCountMismatch(ArgumentCountMismatch),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindError {
    pub kind: BindErrorKind,
    /// Member whose snippet or call site failed.
    pub member: MemberId,
    /// Host location the error is reported at.
    pub location: SourceLocation,
    /// Text `span` points into.
    pub source: Option<String>,
    pub span: Option<Span>,
}

impl BindError {
    /// Attach a snippet error to the attribute it came from.
    pub(crate) fn from_snippet(
        err: SnippetError,
        member: MemberId,
        location: &SourceLocation,
        source: &str,
    ) -> Self {
        Self {
            kind: BindErrorKind::Snippet(err.kind),
            member,
            location: location.clone(),
            source: Some(source.to_string()),
            span: Some(err.span),
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BindErrorKind::Snippet(kind) => {
                let span = self.span.unwrap_or_default();
                write!(f, "{}", SnippetError::new(kind.clone(), span))
            }
            BindErrorKind::ArgumentCountMismatch(mismatch) => write!(f, "{mismatch}"),
        }
    }
}

impl std::error::Error for BindError {}

#[derive(Debug, Clone, PartialEq)]
pub struct BindWarning {
    pub warning: SnippetWarning,
    pub member: MemberId,
    pub location: SourceLocation,
    pub source: String,
}

impl fmt::Display for BindWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.warning)
    }
}
