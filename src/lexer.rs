use std::{iter::Peekable, num::ParseIntError};

use crate::token::{Span, Token, TokenKind, KEYWORDS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 8_192;

/// Lexes the provided string, producing the tokens into the provided buffer.
pub fn lex(src: &str, tokens: &mut Vec<Token>) {
    Lexer::new(src, tokens).lex();
}

/// A convenience function that allocates a new buffer per lexed input and
/// returns it.
pub fn lex_in_new(src: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY);
    lex(src, &mut tokens);
    tokens
}

/// The Cleaf lexer
struct Lexer<'src, 'tok> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    ///
    /// Tokens are written into the provided tokens buffer.
    fn lex(mut self) {
        assert_eq!(self.tokens.len(), 0, "must pass clean tokens buffer");
        loop {
            let next = self.scan_token_kind();
            let is_eof = matches!(next, TokenKind::Eof);
            self.produce(next);
            if is_eof {
                break;
            }
        }
    }

    /// Tries to scan the current character.
    fn scan_token_kind(&mut self) -> TokenKind {
        use TokenKind::*;
        match self.mark_advance() {
            '\0' => Eof,
            '+' => match self.peek() {
                '+' => self.advance_with(PlusPlus),
                _ => Plus,
            },
            '-' => match self.peek() {
                '-' => self.advance_with(MinusMinus),
                _ => Minus,
            },
            '*' => Star,
            '/' => match self.peek() {
                '/' => self.line_comment(),
                '*' => self.block_comment(),
                _ => Slash,
            },
            '!' => match self.peek() {
                '=' => self.advance_with(BangEq),
                _ => Bang,
            },
            '=' => match self.peek() {
                '=' => self.advance_with(EqEq),
                _ => Assign,
            },
            '<' => match self.peek() {
                '=' => self.advance_with(LessEq),
                _ => Less,
            },
            '>' => match self.peek() {
                '=' => self.advance_with(GreaterEq),
                _ => Greater,
            },
            ':' => Colon,
            ';' => Semicolon,
            ',' => Comma,
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            '"' => self.string(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_whitespace() => self.whitespace(),
            _ => ErrorUnexpectedChar,
        }
    }

    /// Tries to lex a string token.
    ///
    /// Escape sequences are only detected here; they are resolved when the
    /// parser extracts the value (see [`extract::escaped_string`]), so plain
    /// strings never pay for a growing buffer.
    fn string(&mut self) -> TokenKind {
        // Whether any escaping did happen inside this string token
        let mut has_escaped = false;
        // Whether the current character is being escaped
        let mut is_escaping = false;
        loop {
            let (current, current_span) = self.advance_with_span();
            match (is_escaping, current) {
                // A NUL char marks the unclosed string error, in any context.
                (_, '\0') => {
                    return TokenKind::ErrorUnclosedString;
                }
                (false, '"') => {
                    return if has_escaped {
                        TokenKind::EscapedString
                    } else {
                        TokenKind::String
                    };
                }
                // A string can only contain a line break if it is escaped. The
                // error token is emitted and scanning continues.
                (false, '\n') => {
                    self.produce_spanned(TokenKind::ErrorUnescapedLineBreak, current_span);
                }
                (false, '\\') => {
                    has_escaped = true;
                    is_escaping = true;
                }
                (_, _) => {
                    is_escaping = false;
                }
            }
        }
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';

        while valid_identifier_suffix(self.peek()) {
            self.advance();
        }
        KEYWORDS
            .get(self.substr())
            .copied()
            .unwrap_or(TokenKind::Identifier)
    }

    fn number(&mut self) -> TokenKind {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        TokenKind::Number
    }

    fn whitespace(&mut self) -> TokenKind {
        while self.peek().is_ascii_whitespace() {
            self.advance();
        }
        TokenKind::Whitespace
    }

    fn line_comment(&mut self) -> TokenKind {
        assert_eq!(self.advance(), '/');
        while !matches!(self.peek(), '\n' | '\0') {
            self.advance();
        }
        TokenKind::LineComment
    }

    fn block_comment(&mut self) -> TokenKind {
        assert_eq!(self.advance(), '*');
        loop {
            match self.advance() {
                '*' => (),
                '\0' => return TokenKind::ErrorUnclosedComment,
                _ => continue,
            }
            // Consecutive stars may precede the closing slash.
            while self.peek() == '*' {
                self.advance();
            }
            match self.advance() {
                '/' => break,
                '\0' => return TokenKind::ErrorUnclosedComment,
                _ => continue,
            }
        }
        TokenKind::BlockComment
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            tokens,
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Returns the next char and advances the iterator.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|c| self.cursor += c.len_utf8())
            .unwrap_or('\0')
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next char (with its span) and advances the iterator.
    fn advance_with_span(&mut self) -> (char, Span) {
        let lo = self.cursor;
        let char = self.advance();
        let hi = lo + char.len_utf8();
        (char, span_of(lo, hi))
    }

    /// Returns the next char without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the current span.
    fn span(&self) -> Span {
        span_of(self.current_lo, self.cursor)
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        self.span().substr(self.src)
    }

    /// Produces a token using the marked bounds.
    fn produce(&mut self, kind: TokenKind) {
        self.produce_spanned(kind, self.span());
    }

    /// Produces a token with the provided span.
    fn produce_spanned(&mut self, kind: TokenKind, span: Span) {
        self.tokens.push(Token::new(kind, span));
    }
}

fn span_of(lo: usize, hi: usize) -> Span {
    let lo = u32::try_from(lo).expect("source too large");
    let hi = u32::try_from(hi).expect("source too large");
    Span::new_of_bounds(lo..hi)
}

/// Recovers token payloads from the source.
pub mod extract {
    use super::*;

    pub fn int(token: Token, src: &str) -> Result<i64, ParseIntError> {
        debug_assert_eq!(token.kind, TokenKind::Number);
        token.span().substr(src).parse()
    }

    pub fn ident(token: Token, src: &str) -> &str {
        debug_assert_eq!(token.kind, TokenKind::Identifier);
        token.span().substr(src)
    }

    pub fn string(token: Token, src: &str) -> Box<str> {
        debug_assert_eq!(token.kind, TokenKind::String);
        let s = token.span().offset(1, -1).substr(src);
        s.to_string().into_boxed_str()
    }

    pub fn escaped_string(token: Token, src: &str) -> Box<str> {
        debug_assert_eq!(token.kind, TokenKind::EscapedString);
        let s = token.span().offset(1, -1).substr(src);
        perform_escape(s).into_boxed_str()
    }
}

fn perform_escape(raw: &str) -> String {
    let mut buf = String::with_capacity(raw.len());
    let mut escaped = false;
    for char in raw.chars() {
        let char = match (escaped, char) {
            (true, 'b') => '\x08', // backspace
            (true, 't') => '\t',   // tab
            (true, 'n') => '\n',   // newline
            (true, 'r') => '\r',   // carriage return
            (true, 'f') => '\x0c', // form feed
            (false, '\\') => {
                escaped = true;
                continue;
            }
            (_, char) => char,
        };
        escaped = false;
        buf.push(char);
    }
    buf.shrink_to_fit();
    // Only called for tokens holding at least one escape sequence.
    debug_assert!(buf.len() < raw.len(), "original string MUST be greater");
    buf
}
