//! Recursive-descent parser for snippets.
//!
//! Statements are parsed by straightforward recursive descent
//! ([`statements`]); expressions use a Pratt loop driven by binding-power
//! tables ([`expressions`]). Both build [`crate::ast`] nodes directly.
//!
//! # Error strategy
//!
//! Parsing stops at the first problem: a lexical error in any token, or the
//! first grammar violation. The returned [`SnippetError`] points at the
//! offending token inside the snippet string.
//!
//! # Statement terminators
//!
//! A statement ends at `;`, before `}`, at end of input, or where a newline
//! separates it from the next token. This is the only form of automatic
//! semicolon insertion the snippet grammar performs.

pub(crate) mod expressions;
pub(crate) mod statements;

use tether_common::decl::BindingMode;
use tether_common::span::Span;
use tether_common::token::{keyword_from_str, Token, TokenKind};
use tether_lexer::Lexer;

use crate::ast::{Expr, Fragment, FragmentBody, Stmt, StmtKind};
use crate::error::{SnippetError, SnippetErrorKind};
use crate::subset;

/// Parse a snippet for the given binding mode.
///
/// Body replacement accepts the full statement grammar and turns a trailing
/// expression statement into a `return`. Inline expansion parses the same
/// grammar and then requires the result to be one expression inside the
/// translatable subset.
pub fn parse_snippet(source: &str, mode: BindingMode) -> Result<Fragment, SnippetError> {
    let mut p = Parser::new(source)?;
    let stmts = statements::statement_list(&mut p, TokenKind::Eof)?;
    p.expect(TokenKind::Eof)?;

    let body = match mode {
        BindingMode::BodyReplacement => FragmentBody::Body(with_implicit_return(stmts)),
        BindingMode::InlineExpansion => {
            FragmentBody::Expr(subset::into_inline(stmts, Span::new(0, source.len() as u32))?)
        }
    };
    tracing::trace!(%mode, len = source.len(), "parsed snippet");
    Ok(Fragment { mode, body })
}

/// Parse a single target-language expression, e.g. a translated call
/// argument. The full expression grammar is accepted.
pub fn parse_expression(source: &str) -> Result<Expr, SnippetError> {
    let mut p = Parser::new(source)?;
    let expr = expressions::expr(&mut p)?;
    p.expect(TokenKind::Eof)?;
    Ok(expr)
}

fn with_implicit_return(mut stmts: Vec<Stmt>) -> Vec<Stmt> {
    if let Some(last) = stmts.pop() {
        let last = match last.kind {
            StmtKind::Expr(expr) => Stmt::new(StmtKind::Return(Some(expr)), last.span),
            kind => Stmt::new(kind, last.span),
        };
        stmts.push(last);
    }
    stmts
}

/// Deepest nesting of expressions and statements a snippet may use.
pub const MAX_NESTING: usize = 64;

/// Token cursor shared by the statement and expression parsers.
pub(crate) struct Parser<'src> {
    /// Significant tokens (trivia removed), always ending with `Eof`.
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
    /// Current recursion depth, bounded by [`MAX_NESTING`].
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Tokenize `source`. The first lexical error aborts.
    pub(crate) fn new(source: &'src str) -> Result<Self, SnippetError> {
        let (tokens, errors) = Lexer::tokenize_with_errors(source);
        if let Some(err) = errors.into_iter().next() {
            return Err(SnippetError::new(SnippetErrorKind::Lex(err.kind), err.span));
        }
        let tokens = tokens.into_iter().filter(|t| !t.kind.is_trivia()).collect();
        Ok(Self {
            tokens,
            pos: 0,
            source,
            depth: 0,
        })
    }

    /// Run `parse` one nesting level deeper, failing once the snippet
    /// exceeds [`MAX_NESTING`].
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, SnippetError>,
    ) -> Result<T, SnippetError> {
        if self.depth >= MAX_NESTING {
            return Err(SnippetError::syntax(
                "snippet nested too deeply",
                self.current_span(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> TokenKind {
        self.nth(0)
    }

    /// Kind of the Nth token ahead; `Eof` past the end.
    pub(crate) fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(token) => token.span,
            None => Span::point(self.source.len() as u32),
        }
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.text_at(self.pos)
    }

    fn text_at(&self, index: usize) -> &'src str {
        match self.tokens.get(index) {
            Some(token) => &self.source[token.span.start as usize..token.span.end as usize],
            None => "",
        }
    }

    /// End offset of the most recently consumed token.
    pub(crate) fn prev_end(&self) -> u32 {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span.end,
            None => 0,
        }
    }

    /// Whether a line break separates the previous token from the current one.
    pub(crate) fn newline_before(&self) -> bool {
        let start = self.prev_end() as usize;
        let end = self.current_span().start as usize;
        start < end && self.source[start..end].contains('\n')
    }

    /// Whether the current token can serve as a property name after `.`
    /// (identifiers and reserved words).
    pub(crate) fn at_property_name(&self) -> bool {
        self.at(TokenKind::Ident) || keyword_from_str(self.current_text()).is_some()
    }

    /// Index of the token just past the bracket group that starts at the
    /// current token, or `None` if it is unbalanced.
    pub(crate) fn skip_group(&self, open: TokenKind, close: TokenKind) -> Option<usize> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(self.pos) {
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            } else if token.kind == TokenKind::Eof {
                return None;
            }
        }
        None
    }

    pub(crate) fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens
            .get(index)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    // ── Consumption ────────────────────────────────────────────────────

    /// Consume the current token and return its text.
    pub(crate) fn bump(&mut self) -> &'src str {
        let text = self.text_at(self.pos);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        text
    }

    /// Consume the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Span, SnippetError> {
        if self.at(kind) {
            let span = self.current_span();
            self.bump();
            Ok(span)
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    /// Consume an identifier and return its text.
    pub(crate) fn expect_ident(&mut self) -> Result<String, SnippetError> {
        if self.at(TokenKind::Ident) {
            Ok(self.bump().to_string())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    /// Build an "expected X, found Y" error at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> SnippetError {
        let found = match self.current() {
            TokenKind::Eof => TokenKind::Eof.describe().to_string(),
            _ => format!("`{}`", self.current_text()),
        };
        SnippetError::syntax(
            format!("expected {expected}, found {found}"),
            self.current_span(),
        )
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end().max(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_detection_ignores_same_line_tokens() {
        let mut p = Parser::new("a b\nc").unwrap();
        p.bump();
        assert!(!p.newline_before());
        p.bump();
        assert!(p.newline_before());
    }

    #[test]
    fn lexical_error_aborts_before_parsing() {
        let err = Parser::new("a + #").err().unwrap();
        assert_eq!(err.kind, SnippetErrorKind::Lex(tether_common::error::LexErrorKind::UnexpectedCharacter('#')));
        assert_eq!(err.span, Span::new(4, 5));
    }

    #[test]
    fn comments_are_dropped() {
        let p = Parser::new("/* lead */ a // tail").unwrap();
        assert_eq!(p.current(), TokenKind::Ident);
        assert_eq!(p.nth(1), TokenKind::Eof);
    }

    #[test]
    fn nesting_depth_is_restored_after_each_level() {
        let mut p = Parser::new("a").unwrap();
        let inner = p.nested(|p| p.nested(|p| Ok(p.depth))).unwrap();
        assert_eq!(inner, 2);
        assert_eq!(p.depth, 0);
    }

    #[test]
    fn skip_group_finds_matching_paren() {
        let p = Parser::new("(a, (b)) => c").unwrap();
        let after = p.skip_group(TokenKind::LParen, TokenKind::RParen).unwrap();
        assert_eq!(p.kind_at(after), TokenKind::FatArrow);
    }
}
