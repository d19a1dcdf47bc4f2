use std::fmt;

/// Source position of a token. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    Assign,       // =
    Less,         // <
    Greater,      // >
    Bang,         // !
    EqualEqual,   // ==
    BangEqual,    // !=
    LessEqual,    // <=
    GreaterEqual, // >=
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Plus),
            '-' => Some(Self::Minus),
            '*' => Some(Self::Star),
            '/' => Some(Self::Slash),
            '%' => Some(Self::Percent),
            '=' => Some(Self::Assign),
            '<' => Some(Self::Less),
            '>' => Some(Self::Greater),
            '!' => Some(Self::Bang),
            _ => None,
        }
    }

    /// Two-character form produced when this operator is followed by `=`.
    pub fn with_equals(self) -> Option<Self> {
        match self {
            Self::Assign => Some(Self::EqualEqual),
            Self::Bang => Some(Self::BangEqual),
            Self::Less => Some(Self::LessEqual),
            Self::Greater => Some(Self::GreaterEqual),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Assign => "=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Bang => "!",
            Self::EqualEqual => "==",
            Self::BangEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    Keyword(&'a str),
    Identifier(&'a str),
    /// Parsed value plus the digits as written. An oversized literal keeps
    /// its full `text` while `value` saturates.
    Number { value: i64, text: &'a str },
    /// Unquoted contents of a string literal.
    String(&'a str),
    Operator(Operator),

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
}

/// Renders the token the way it is spliced into raw expression text.
/// String literals are re-quoted.
impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(word) | Self::Identifier(word) => f.write_str(word),
            Self::Number { text, .. } => f.write_str(text),
            Self::String(value) => {
                // Contents are taken verbatim, so the host must not see escapes.
                let escaped = value.replace('\\', "\\\\").replace('\n', "\\n");
                write!(f, "\"{escaped}\"")
            }
            Self::Operator(op) => f.write_str(op.as_str()),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::LBrace => f.write_str("{"),
            Self::RBrace => f.write_str("}"),
            Self::Semicolon => f.write_str(";"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn kind(&self) -> &TokenKind<'a> {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }
}
