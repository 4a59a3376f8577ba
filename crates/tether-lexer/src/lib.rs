// Tether lexer -- tokenizer for embedded target-language snippets.

mod cursor;

use cursor::Cursor;
use tether_common::error::{LexError, LexErrorKind};
use tether_common::span::Span;
use tether_common::token::{keyword_from_str, Token, TokenKind};

/// The snippet lexer. Converts snippet text into a stream of tokens.
///
/// Implements `Iterator<Item = Token>`; the final token is always `Eof`.
/// Malformed input produces an `Error` token and a matching [`LexError`]
/// retrievable through [`Lexer::errors`].
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    /// Whether we have already emitted the `Eof` token.
    emitted_eof: bool,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given snippet text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
            errors: Vec::new(),
        }
    }

    /// Convenience: tokenize the entire source into a `Vec<Token>`.
    ///
    /// The returned vector includes the final `Eof` token.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    /// Tokenize the entire source and also return the lexical errors.
    pub fn tokenize_with_errors(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let tokens: Vec<Token> = lexer.by_ref().collect();
        (tokens, lexer.errors)
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            // ── Single-character delimiters ───────────────────────────────
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            '~' => self.single_char_token(TokenKind::Tilde, start),
            '^' => self.single_char_token(TokenKind::Caret, start),

            // ── Multi-character operators ─────────────────────────────────
            '=' => self.lex_eq(start),
            '!' => self.lex_bang(start),
            '<' => self.lex_lt(start),
            '>' => self.lex_gt(start),
            '&' => self.lex_doubled('&', TokenKind::Amp, TokenKind::AmpAmp, start),
            '|' => self.lex_doubled('|', TokenKind::Pipe, TokenKind::PipePipe, start),
            '+' => self.lex_arith('+', TokenKind::Plus, TokenKind::PlusPlus, TokenKind::PlusEq, start),
            '-' => {
                self.lex_arith('-', TokenKind::Minus, TokenKind::MinusMinus, TokenKind::MinusEq, start)
            }
            '*' => self.lex_arith('*', TokenKind::Star, TokenKind::StarStar, TokenKind::StarEq, start),
            '%' => self.lex_assignable(TokenKind::Percent, TokenKind::PercentEq, start),
            '?' => self.lex_question(start),
            '.' => {
                if self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                    self.lex_number(start)
                } else {
                    self.single_char_token(TokenKind::Dot, start)
                }
            }

            // ── Slash: division or comment ───────────────────────────────
            '/' => match self.cursor.peek_next() {
                Some('/') => self.lex_line_comment(start),
                Some('*') => self.lex_block_comment(start),
                _ => self.lex_assignable(TokenKind::Slash, TokenKind::SlashEq, start),
            },

            '0'..='9' => self.lex_number(start),
            '"' | '\'' => self.lex_string(c, start),
            '$' => self.lex_dollar(start),
            c if is_ident_start(c) => self.lex_ident(start),

            // ── Unknown character ────────────────────────────────────────
            _ => {
                self.cursor.advance();
                let end = self.cursor.pos();
                self.error(LexErrorKind::UnexpectedCharacter(c), start, end)
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn skip_whitespace(&mut self) {
        self.cursor.eat_while(char::is_whitespace);
    }

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// Record a lexical error and return the `Error` token covering it.
    fn error(&mut self, kind: LexErrorKind, start: u32, end: u32) -> Token {
        self.errors.push(LexError::new(kind, Span::new(start, end)));
        Token::new(TokenKind::Error, start, end)
    }

    // ── Operator lexing ──────────────────────────────────────────────────

    /// `=` -> `Eq`, `==` -> `EqEq`, `===` -> `EqEqEq`, `=>` -> `FatArrow`
    fn lex_eq(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '='
        let kind = if self.cursor.eat('=') {
            if self.cursor.eat('=') {
                TokenKind::EqEqEq
            } else {
                TokenKind::EqEq
            }
        } else if self.cursor.eat('>') {
            TokenKind::FatArrow
        } else {
            TokenKind::Eq
        };
        Token::new(kind, start, self.cursor.pos())
    }

    /// `!` -> `Bang`, `!=` -> `NotEq`, `!==` -> `NotEqEq`
    fn lex_bang(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '!'
        let kind = if self.cursor.eat('=') {
            if self.cursor.eat('=') {
                TokenKind::NotEqEq
            } else {
                TokenKind::NotEq
            }
        } else {
            TokenKind::Bang
        };
        Token::new(kind, start, self.cursor.pos())
    }

    /// `<` -> `Lt`, `<=` -> `LtEq`, `<<` -> `Shl`
    fn lex_lt(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '<'
        let kind = if self.cursor.eat('=') {
            TokenKind::LtEq
        } else if self.cursor.eat('<') {
            TokenKind::Shl
        } else {
            TokenKind::Lt
        };
        Token::new(kind, start, self.cursor.pos())
    }

    /// `>` -> `Gt`, `>=` -> `GtEq`, `>>` -> `Shr`, `>>>` -> `UShr`
    fn lex_gt(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '>'
        let kind = if self.cursor.eat('=') {
            TokenKind::GtEq
        } else if self.cursor.eat('>') {
            if self.cursor.eat('>') {
                TokenKind::UShr
            } else {
                TokenKind::Shr
            }
        } else {
            TokenKind::Gt
        };
        Token::new(kind, start, self.cursor.pos())
    }

    /// `&`/`&&` and `|`/`||`.
    fn lex_doubled(&mut self, c: char, single: TokenKind, double: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        let kind = if self.cursor.eat(c) { double } else { single };
        Token::new(kind, start, self.cursor.pos())
    }

    /// `+`/`++`/`+=`, `-`/`--`/`-=`, `*`/`**`/`*=`.
    fn lex_arith(
        &mut self,
        c: char,
        single: TokenKind,
        double: TokenKind,
        assign: TokenKind,
        start: u32,
    ) -> Token {
        self.cursor.advance();
        let kind = if self.cursor.eat(c) {
            double
        } else if self.cursor.eat('=') {
            assign
        } else {
            single
        };
        Token::new(kind, start, self.cursor.pos())
    }

    /// `%`/`%=` and `/`/`/=`.
    fn lex_assignable(&mut self, single: TokenKind, assign: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        let kind = if self.cursor.eat('=') { assign } else { single };
        Token::new(kind, start, self.cursor.pos())
    }

    /// `?` -> `Question`, `??` -> `QuestionQuestion`, `?.` -> `QuestionDot`
    ///
    /// `?.5` is a conditional followed by a number, not optional chaining.
    fn lex_question(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '?'
        let kind = match (self.cursor.peek(), self.cursor.peek_next()) {
            (Some('?'), _) => {
                self.cursor.advance();
                TokenKind::QuestionQuestion
            }
            (Some('.'), next) if !next.is_some_and(|c| c.is_ascii_digit()) => {
                self.cursor.advance();
                TokenKind::QuestionDot
            }
            _ => TokenKind::Question,
        };
        Token::new(kind, start, self.cursor.pos())
    }

    // ── Comments ─────────────────────────────────────────────────────────

    fn lex_line_comment(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c != '\n');
        Token::new(TokenKind::Comment, start, self.cursor.pos())
    }

    fn lex_block_comment(&mut self, start: u32) -> Token {
        self.cursor.advance(); // '/'
        self.cursor.advance(); // '*'
        loop {
            match self.cursor.advance() {
                None => {
                    let end = self.cursor.pos();
                    return self.error(LexErrorKind::UnterminatedBlockComment, start, end);
                }
                Some('*') if self.cursor.peek() == Some('/') => {
                    self.cursor.advance();
                    return Token::new(TokenKind::Comment, start, self.cursor.pos());
                }
                Some(_) => {}
            }
        }
    }

    // ── Number literals ──────────────────────────────────────────────────

    /// Decimal, hex (`0x`), binary (`0b`), octal (`0o`), fractions and
    /// exponents. Underscore separators are accepted and kept verbatim.
    fn lex_number(&mut self, start: u32) -> Token {
        if self.cursor.peek() == Some('0') {
            let radix_digit: Option<fn(char) -> bool> = match self.cursor.peek_next() {
                Some('x' | 'X') => Some(is_hex_digit),
                Some('b' | 'B') => Some(is_binary_digit),
                Some('o' | 'O') => Some(is_octal_digit),
                _ => None,
            };
            if let Some(is_digit) = radix_digit {
                self.cursor.advance(); // '0'
                self.cursor.advance(); // radix letter
                self.cursor.eat_while(is_digit);
                return Token::new(TokenKind::Number, start, self.cursor.pos());
            }
        }

        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');

        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
        }

        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let signed = matches!(self.cursor.peek_next(), Some('+' | '-'));
            let digit_after = if signed {
                self.cursor.peek_third()
            } else {
                self.cursor.peek_next()
            };
            if digit_after.is_some_and(|c| c.is_ascii_digit()) {
                self.cursor.advance(); // 'e'
                if signed {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
        }

        Token::new(TokenKind::Number, start, self.cursor.pos())
    }

    // ── String literals ──────────────────────────────────────────────────

    /// Lex a quoted string. The token covers both quotes; escapes are kept
    /// verbatim. A raw newline or end of input before the closing quote is
    /// an error.
    fn lex_string(&mut self, quote: char, start: u32) -> Token {
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let end = self.cursor.pos();
                    return self.error(LexErrorKind::UnterminatedString, start, end);
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    return Token::new(TokenKind::String, start, self.cursor.pos());
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    // ── Placeholders and identifiers ─────────────────────────────────────

    /// `$name`/`$digits` are placeholders. A `$` that starts neither is an
    /// ordinary identifier character, as in the target language.
    fn lex_dollar(&mut self, start: u32) -> Token {
        match self.cursor.peek_next() {
            Some(c) if c.is_ascii_digit() => {
                self.cursor.advance(); // '$'
                self.cursor.eat_while(|c| c.is_ascii_digit());
                if self.cursor.peek().is_some_and(is_ident_continue) {
                    self.cursor.eat_while(is_ident_continue);
                    let end = self.cursor.pos();
                    let text = self.cursor.slice(start, end).to_string();
                    return self.error(LexErrorKind::InvalidPlaceholder(text), start, end);
                }
                Token::new(TokenKind::Placeholder, start, self.cursor.pos())
            }
            Some(c) if is_placeholder_start(c) => {
                self.cursor.advance(); // '$'
                self.cursor.eat_while(is_placeholder_continue);
                Token::new(TokenKind::Placeholder, start, self.cursor.pos())
            }
            _ => self.lex_ident(start),
        }
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume first char
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());

        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }

        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

/// Whether a character can start a target-language identifier.
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Whether a character can continue a target-language identifier.
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_hex_digit(c: char) -> bool {
    c.is_ascii_hexdigit() || c == '_'
}

fn is_binary_digit(c: char) -> bool {
    matches!(c, '0' | '1' | '_')
}

fn is_octal_digit(c: char) -> bool {
    matches!(c, '0'..='7' | '_')
}

/// Placeholder names follow host-language identifier rules, so no `$`.
fn is_placeholder_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_placeholder_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
