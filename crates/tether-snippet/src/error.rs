//! Snippet error types.
//!
//! All positions are byte offsets into the snippet string. The binding
//! engine attaches the host attribute location on top of these.

use std::fmt;

use serde::Serialize;
use tether_common::error::LexErrorKind;
use tether_common::span::Span;

use crate::ast::Hole;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnippetError {
    pub kind: SnippetErrorKind,
    pub span: Span,
}

impl SnippetError {
    pub fn new(kind: SnippetErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(SnippetErrorKind::Syntax(message.into()), span)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SnippetErrorKind {
    /// Tokenization failed.
    Lex(LexErrorKind),
    /// The token stream does not form a valid snippet.
    Syntax(String),
    /// An inline expansion snippet uses a construct outside the
    /// translatable subset. Carries the operator or keyword.
    UnsupportedInlineConstruct(String),
    /// A placeholder has no matching parameter or receiver.
    UnboundPlaceholder(Hole),
}

impl SnippetErrorKind {
    /// Lexical and grammatical failures are both syntax errors to callers.
    pub fn is_syntax(&self) -> bool {
        matches!(self, SnippetErrorKind::Lex(_) | SnippetErrorKind::Syntax(_))
    }
}

impl fmt::Display for SnippetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SnippetErrorKind::Lex(kind) => write!(f, "{kind}"),
            SnippetErrorKind::Syntax(message) => write!(f, "{message}"),
            SnippetErrorKind::UnsupportedInlineConstruct(what) => {
                write!(f, "{what} is not allowed in an inline snippet")
            }
            SnippetErrorKind::UnboundPlaceholder(hole) => {
                write!(f, "placeholder `{hole}` does not match any parameter")
            }
        }
    }
}

impl std::error::Error for SnippetError {}

/// Non-fatal findings reported while resolving a fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SnippetWarning {
    /// `$this` named a declared parameter called `this` instead of the receiver.
    ShadowedThis { span: Span },
}

impl SnippetWarning {
    pub fn span(&self) -> Span {
        match self {
            SnippetWarning::ShadowedThis { span } => *span,
        }
    }
}

impl fmt::Display for SnippetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnippetWarning::ShadowedThis { .. } => write!(
                f,
                "`$this` refers to the parameter named `this`, not the receiver"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = SnippetError::new(
            SnippetErrorKind::UnboundPlaceholder(Hole::ByName("count".into())),
            Span::new(3, 9),
        );
        assert_eq!(
            err.to_string(),
            "placeholder `$count` does not match any parameter"
        );
        let err = SnippetError::new(
            SnippetErrorKind::UnsupportedInlineConstruct("`return` statement".into()),
            Span::new(0, 6),
        );
        assert_eq!(
            err.to_string(),
            "`return` statement is not allowed in an inline snippet"
        );
        assert!(SnippetError::syntax("expected `)`", Span::point(4)).kind.is_syntax());
    }
}
