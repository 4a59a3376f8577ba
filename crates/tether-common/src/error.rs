use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// A lexer error with location information.
///
/// Errors are collected during lexing rather than aborting immediately; the
/// lexer still produces an `Error` token at the same span so the parser can
/// stop at the right place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    /// Create a new lexer error.
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// An unexpected character was encountered.
    UnexpectedCharacter(char),
    /// A string literal was not closed before the end of its line.
    UnterminatedString,
    /// A block comment (`/* ... */`) was not closed before end of input.
    UnterminatedBlockComment,
    /// A positional placeholder ran into identifier characters, e.g. `$1a`.
    InvalidPlaceholder(String),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character: {c:?}"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnterminatedBlockComment => write!(f, "unterminated block comment"),
            Self::InvalidPlaceholder(s) => write!(f, "invalid placeholder: {s}"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = LexError::new(LexErrorKind::UnexpectedCharacter('#'), Span::new(0, 1));
        assert_eq!(err.to_string(), "unexpected character: '#'");
    }

    #[test]
    fn lex_error_kind_display_all_variants() {
        assert_eq!(
            LexErrorKind::UnterminatedString.to_string(),
            "unterminated string literal"
        );
        assert_eq!(
            LexErrorKind::UnterminatedBlockComment.to_string(),
            "unterminated block comment"
        );
        assert_eq!(
            LexErrorKind::InvalidPlaceholder("$1a".into()).to_string(),
            "invalid placeholder: $1a"
        );
    }
}
