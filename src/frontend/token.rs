// src/frontend/token.rs

/// All token types in the Shrew language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Literals
    IntLiteral,
    StringLiteral,
    Identifier,

    // Keywords
    KwFunc,
    KwVar,
    KwType,
    KwStruct,
    KwNew,
    KwIf,
    KwElif,
    KwElse,
    KwWhile,
    KwBreak,
    KwReturn,
    KwNone,

    // Type keywords
    KwInt,
    KwString,
    KwAny,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    DeclAssign, // :=
    EqEq,
    BangEq,
    Bang,
    AmpAmp,   // &&
    PipePipe, // ||
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Semi,
    Comma,
    Dot,

    // Special
    Eof,
}

impl TokenType {
    /// Get string representation for error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IntLiteral => "integer",
            Self::StringLiteral => "string literal",
            Self::Identifier => "identifier",
            Self::KwFunc => "func",
            Self::KwVar => "var",
            Self::KwType => "type",
            Self::KwStruct => "struct",
            Self::KwNew => "new",
            Self::KwIf => "if",
            Self::KwElif => "elif",
            Self::KwElse => "else",
            Self::KwWhile => "while",
            Self::KwBreak => "break",
            Self::KwReturn => "return",
            Self::KwNone => "None",
            Self::KwInt => "int",
            Self::KwString => "string",
            Self::KwAny => "any",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Eq => "=",
            Self::DeclAssign => ":=",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::Bang => "!",
            Self::AmpAmp => "&&",
            Self::PipePipe => "||",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Colon => ":",
            Self::Semi => ";",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::Eof => "end of file",
        }
    }

    /// Keyword lookup for identifier lexemes
    pub fn keyword(text: &str) -> Option<TokenType> {
        match text {
            "func" => Some(Self::KwFunc),
            "var" => Some(Self::KwVar),
            "type" => Some(Self::KwType),
            "struct" => Some(Self::KwStruct),
            "new" => Some(Self::KwNew),
            "if" => Some(Self::KwIf),
            "elif" => Some(Self::KwElif),
            "else" => Some(Self::KwElse),
            "while" => Some(Self::KwWhile),
            "break" => Some(Self::KwBreak),
            "return" => Some(Self::KwReturn),
            "None" => Some(Self::KwNone),
            "int" => Some(Self::KwInt),
            "string" => Some(Self::KwString),
            "any" => Some(Self::KwAny),
            _ => None,
        }
    }
}

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize, // Byte offset
    pub end: usize,   // Byte offset (exclusive)
    pub line: u32,    // Start line (1-indexed)
    pub column: u32,  // Start column (1-indexed)
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Merge two spans, keeping the start of self and the end of other
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        // miette uses (offset, length)
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}

impl From<&Span> for miette::SourceSpan {
    fn from(span: &Span) -> Self {
        (*span).into()
    }
}

/// A token with its location in source code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(ty: TokenType, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            ty,
            lexeme: lexeme.into(),
            span,
        }
    }
}
