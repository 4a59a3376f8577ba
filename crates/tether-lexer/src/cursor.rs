/// Character iterator over snippet text with byte-offset tracking.
pub struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            chars: source.chars(),
        }
    }

    /// Look at the current character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Look at the character after the current one.
    pub fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next()
    }

    /// Look two characters past the current one.
    pub fn peek_third(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next();
        iter.next()
    }

    /// Consume the current character and advance the position.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume the current character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Current byte position in the source text.
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Advance while the predicate holds for the current character.
    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if predicate(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Extract a slice of the source text by byte offsets.
    ///
    /// # Panics
    ///
    /// Panics if start or end are out of bounds or not on UTF-8 boundaries.
    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_advance() {
        let cursor = Cursor::new("ab");
        assert_eq!(cursor.peek(), Some('a'));
        assert_eq!(cursor.peek_next(), Some('b'));
        assert_eq!(cursor.peek_third(), None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn advance_tracks_multibyte_utf8() {
        let mut cursor = Cursor::new("\u{00E9}a");
        assert_eq!(cursor.advance(), Some('\u{00E9}'));
        assert_eq!(cursor.pos(), 2);
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.pos(), 3);
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn eat_matches_only_expected() {
        let mut cursor = Cursor::new("=>");
        assert!(!cursor.eat('>'));
        assert!(cursor.eat('='));
        assert!(cursor.eat('>'));
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn eat_while_and_slice() {
        let mut cursor = Cursor::new("$abc.d");
        cursor.advance();
        cursor.eat_while(|c| c.is_ascii_alphabetic());
        assert_eq!(cursor.pos(), 4);
        assert_eq!(cursor.slice(0, 4), "$abc");
    }
}
