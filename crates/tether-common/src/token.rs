use serde::Serialize;

use crate::span::Span;

/// A token produced by the snippet lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Create a new token from a kind and byte offsets.
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// Every kind of token in the embedded target-language grammar.
///
/// The vocabulary is the expression grammar of the dynamically typed target
/// language plus the small set of statement keywords that body-replacement
/// snippets may use, and one extra kind for `$`-placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Break,
    Const,
    Continue,
    Delete,
    Else,
    False,
    For,
    Function,
    If,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Return,
    This,
    Throw,
    True,
    Typeof,
    Var,
    Void,
    While,

    // ── Operators ──────────────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    StarStar,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `===`
    EqEqEq,
    /// `!==`
    NotEqEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `??`
    QuestionQuestion,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `=`
    Eq,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `/=`
    SlashEq,
    /// `%=`
    PercentEq,
    /// `?`
    Question,
    /// `?.`
    QuestionDot,
    /// `=>`
    FatArrow,

    // ── Delimiters ─────────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    // ── Punctuation ────────────────────────────────────────────────────
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `;`
    Semicolon,

    // ── Literals ───────────────────────────────────────────────────────
    /// Numeric literal, kept verbatim.
    Number,
    /// Quoted string literal including its quotes, kept verbatim.
    String,

    // ── Other ──────────────────────────────────────────────────────────
    /// Plain identifier.
    Ident,
    /// `$name`, `$0`, `$this` or `$global`.
    Placeholder,
    /// `// ...` or `/* ... */`.
    Comment,
    /// Input the lexer could not make sense of.
    Error,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Trivia is skipped by the parser.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment)
    }

    /// Source spelling of fixed-text tokens, used in parser messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Break => "`break`",
            TokenKind::Const => "`const`",
            TokenKind::Continue => "`continue`",
            TokenKind::Delete => "`delete`",
            TokenKind::Else => "`else`",
            TokenKind::False => "`false`",
            TokenKind::For => "`for`",
            TokenKind::Function => "`function`",
            TokenKind::If => "`if`",
            TokenKind::In => "`in`",
            TokenKind::Instanceof => "`instanceof`",
            TokenKind::Let => "`let`",
            TokenKind::New => "`new`",
            TokenKind::Null => "`null`",
            TokenKind::Return => "`return`",
            TokenKind::This => "`this`",
            TokenKind::Throw => "`throw`",
            TokenKind::True => "`true`",
            TokenKind::Typeof => "`typeof`",
            TokenKind::Var => "`var`",
            TokenKind::Void => "`void`",
            TokenKind::While => "`while`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::StarStar => "`**`",
            TokenKind::Slash => "`/`",
            TokenKind::Percent => "`%`",
            TokenKind::PlusPlus => "`++`",
            TokenKind::MinusMinus => "`--`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::EqEqEq => "`===`",
            TokenKind::NotEqEq => "`!==`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::UShr => "`>>>`",
            TokenKind::Amp => "`&`",
            TokenKind::Pipe => "`|`",
            TokenKind::Caret => "`^`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::QuestionQuestion => "`??`",
            TokenKind::Bang => "`!`",
            TokenKind::Tilde => "`~`",
            TokenKind::Eq => "`=`",
            TokenKind::PlusEq => "`+=`",
            TokenKind::MinusEq => "`-=`",
            TokenKind::StarEq => "`*=`",
            TokenKind::SlashEq => "`/=`",
            TokenKind::PercentEq => "`%=`",
            TokenKind::Question => "`?`",
            TokenKind::QuestionDot => "`?.`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Colon => "`:`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Ident => "identifier",
            TokenKind::Placeholder => "placeholder",
            TokenKind::Comment => "comment",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of snippet",
        }
    }
}

/// Look up a keyword from its source text.
///
/// Returns `None` if the text is not a reserved word of the snippet grammar.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "break" => Some(TokenKind::Break),
        "const" => Some(TokenKind::Const),
        "continue" => Some(TokenKind::Continue),
        "delete" => Some(TokenKind::Delete),
        "else" => Some(TokenKind::Else),
        "false" => Some(TokenKind::False),
        "for" => Some(TokenKind::For),
        "function" => Some(TokenKind::Function),
        "if" => Some(TokenKind::If),
        "in" => Some(TokenKind::In),
        "instanceof" => Some(TokenKind::Instanceof),
        "let" => Some(TokenKind::Let),
        "new" => Some(TokenKind::New),
        "null" => Some(TokenKind::Null),
        "return" => Some(TokenKind::Return),
        "this" => Some(TokenKind::This),
        "throw" => Some(TokenKind::Throw),
        "true" => Some(TokenKind::True),
        "typeof" => Some(TokenKind::Typeof),
        "var" => Some(TokenKind::Var),
        "void" => Some(TokenKind::Void),
        "while" => Some(TokenKind::While),
        _ => None,
    }
}

/// Whether `s` is unusable as a binding name in the target language.
///
/// Covers the snippet keywords plus the words the target reserves without
/// the snippet grammar using them.
pub fn is_reserved_word(s: &str) -> bool {
    keyword_from_str(s).is_some()
        || matches!(
            s,
            "arguments"
                | "await"
                | "case"
                | "catch"
                | "class"
                | "debugger"
                | "default"
                | "do"
                | "enum"
                | "eval"
                | "export"
                | "extends"
                | "finally"
                | "implements"
                | "import"
                | "interface"
                | "package"
                | "private"
                | "protected"
                | "public"
                | "static"
                | "super"
                | "switch"
                | "try"
                | "with"
                | "yield"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(keyword_from_str("return"), Some(TokenKind::Return));
        assert_eq!(keyword_from_str("typeof"), Some(TokenKind::Typeof));
        assert_eq!(keyword_from_str("undefined"), None);
        assert_eq!(keyword_from_str("Return"), None);
    }

    #[test]
    fn reserved_words_include_unused_keywords() {
        assert!(is_reserved_word("this"));
        assert!(is_reserved_word("class"));
        assert!(is_reserved_word("arguments"));
        assert!(!is_reserved_word("self"));
        assert!(!is_reserved_word("$this"));
    }

    #[test]
    fn only_comments_are_trivia() {
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Ident.is_trivia());
        assert!(!TokenKind::Eof.is_trivia());
    }
}
