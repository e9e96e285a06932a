use std::{fmt, ops::Range};

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token { kind, span }
    }

    /// Returns the end of file token for the provided source.
    pub fn eof_for(src: &str) -> Token {
        let lo = u32::try_from(src.len()).expect("source too large");
        Token::new(TokenKind::Eof, Span::new_of_length(lo, 0))
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub lo: u32,
    pub len: u32,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<u32>) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, hi - lo)
    }

    pub const fn new_of_length(lo: u32, len: u32) -> Span {
        Span { lo, len }
    }

    pub const fn hi(&self) -> u32 {
        self.lo + self.len
    }

    /// Returns a span that starts at `self` and ends at `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new_of_bounds(self.lo..other.hi().max(self.hi()))
    }

    /// Shrinks (or grows) the span on each side.
    pub fn offset(self, lo: i32, hi: i32) -> Span {
        let lo = self.lo.wrapping_add_signed(lo);
        let hi = self.hi().wrapping_add_signed(hi);
        Span::new_of_bounds(lo..hi)
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo as usize..self.hi() as usize]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Fn,
    Return,
    If,
    Else,
    While,
    For,
    /// The `int` type keyword.
    IntType,
    /// The `string` type keyword.
    StringType,
    /// The `var` type keyword, introduces an untyped binding.
    Var,

    Plus,
    Minus,
    Star,
    Slash,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `!`
    Bang,
    /// `=`
    Assign,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Colon,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,

    Identifier,
    Number,
    String,
    /// A string which contains at least one escape sequence.
    EscapedString,

    Whitespace,
    LineComment,
    BlockComment,

    Eof,

    ErrorUnexpectedChar,
    ErrorUnclosedComment,
    ErrorUnclosedString,
    ErrorUnescapedLineBreak,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            TokenKind::ErrorUnexpectedChar
                | TokenKind::ErrorUnclosedComment
                | TokenKind::ErrorUnclosedString
                | TokenKind::ErrorUnescapedLineBreak
        )
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "fn" => TokenKind::Fn,
    "return" => TokenKind::Return,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "for" => TokenKind::For,
    "int" => TokenKind::IntType,
    "string" => TokenKind::StringType,
    "var" => TokenKind::Var,
};
