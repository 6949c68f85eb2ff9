// src/frontend/lexer.rs

use crate::errors::LexerError;
use crate::frontend::{Span, Token, TokenType};

/// Hand-written scanner over the source text.
///
/// Newlines are treated as whitespace; the parser detects implicit statement
/// separation by comparing token line numbers. After a scan error every
/// subsequent call reports the same error, so a speculative parse that ran
/// into it observes identical behavior after backtracking.
#[derive(Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: std::iter::Peekable<std::str::CharIndices<'src>>,
    current: usize,
    line: u32,
    column: u32,
    start: usize,
    start_line: u32,
    start_column: u32,
    failed: Option<LexerError>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current: 0,
            line: 1,
            column: 1,
            start: 0,
            start_line: 1,
            start_column: 1,
            failed: None,
        }
    }

    /// Get the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }

        loop {
            self.skip_whitespace();

            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column;

            let Some(c) = self.advance() else {
                return Ok(self.make_token(TokenType::Eof));
            };

            let token = match c {
                '(' => self.make_token(TokenType::LParen),
                ')' => self.make_token(TokenType::RParen),
                '{' => self.make_token(TokenType::LBrace),
                '}' => self.make_token(TokenType::RBrace),
                '[' => self.make_token(TokenType::LBracket),
                ']' => self.make_token(TokenType::RBracket),
                ',' => self.make_token(TokenType::Comma),
                ';' => self.make_token(TokenType::Semi),
                '.' => self.make_token(TokenType::Dot),
                '+' => self.make_token(TokenType::Plus),
                '-' => self.make_token(TokenType::Minus),
                '*' => self.make_token(TokenType::Star),

                '/' => {
                    if self.match_char('/') {
                        self.skip_line_comment();
                        continue;
                    } else if self.match_char('*') {
                        self.skip_block_comment();
                        continue;
                    } else {
                        self.make_token(TokenType::Slash)
                    }
                }

                ':' => {
                    if self.match_char('=') {
                        self.make_token(TokenType::DeclAssign)
                    } else {
                        self.make_token(TokenType::Colon)
                    }
                }
                '=' => {
                    if self.match_char('=') {
                        self.make_token(TokenType::EqEq)
                    } else {
                        self.make_token(TokenType::Eq)
                    }
                }
                '!' => {
                    if self.match_char('=') {
                        self.make_token(TokenType::BangEq)
                    } else {
                        self.make_token(TokenType::Bang)
                    }
                }
                '<' => {
                    if self.match_char('=') {
                        self.make_token(TokenType::LtEq)
                    } else {
                        self.make_token(TokenType::Lt)
                    }
                }
                '>' => {
                    if self.match_char('=') {
                        self.make_token(TokenType::GtEq)
                    } else {
                        self.make_token(TokenType::Gt)
                    }
                }

                // '&' and '|' must come paired
                '&' => {
                    if self.match_char('&') {
                        self.make_token(TokenType::AmpAmp)
                    } else {
                        return Err(self.fail(LexerError::UnknownSequence {
                            found: "&".to_string(),
                            span: self.token_span().into(),
                        }));
                    }
                }
                '|' => {
                    if self.match_char('|') {
                        self.make_token(TokenType::PipePipe)
                    } else {
                        return Err(self.fail(LexerError::UnknownSequence {
                            found: "|".to_string(),
                            span: self.token_span().into(),
                        }));
                    }
                }

                '"' => self.string()?,

                c if c.is_ascii_digit() => self.number(),
                c if c.is_alphabetic() => self.identifier(),

                _ => {
                    return Err(self.fail(LexerError::UnexpectedCharacter {
                        ch: c,
                        span: self.token_span().into(),
                    }));
                }
            };

            return Ok(token);
        }
    }

    /// Peek the next token without consuming it
    pub fn peek_token(&mut self) -> Result<Token, LexerError> {
        self.clone().next_token()
    }

    /// Skip spaces, tabs, carriage returns and newlines
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' || c == '\n' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip a block comment; an unterminated one runs to end of input
    fn skip_block_comment(&mut self) {
        while let Some(c) = self.advance() {
            if c == '*' && self.match_char('/') {
                break;
            }
        }
    }

    /// Advance to the next character and return it
    fn advance(&mut self) -> Option<char> {
        let (idx, c) = self.chars.next()?;
        self.current = idx + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Peek at the next character without consuming it
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Consume the next character if it matches the expected character
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn token_span(&self) -> Span {
        Span::new(self.start, self.current, self.start_line, self.start_column)
    }

    /// Create a token from start to current position
    fn make_token(&self, ty: TokenType) -> Token {
        let lexeme = &self.source[self.start..self.current];
        Token::new(ty, lexeme, self.token_span())
    }

    /// Record a terminal error; every later call reports it again.
    fn fail(&mut self, err: LexerError) -> LexerError {
        self.failed = Some(err.clone());
        err
    }

    /// Scan an identifier or keyword
    fn identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[self.start..self.current];
        let ty = TokenType::keyword(text).unwrap_or(TokenType::Identifier);
        self.make_token(ty)
    }

    /// Scan an integer literal
    fn number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        self.make_token(TokenType::IntLiteral)
    }

    /// Scan a string literal; the token lexeme holds the decoded content
    fn string(&mut self) -> Result<Token, LexerError> {
        let mut value = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(self.fail(LexerError::UnterminatedString {
                        span: self.token_span().into(),
                    }));
                }
                Some('"') => break,
                Some('\\') => {
                    let Some(escaped) = self.advance() else {
                        return Err(self.fail(LexerError::UnterminatedString {
                            span: self.token_span().into(),
                        }));
                    };
                    value.push(Self::escaped_char(escaped));
                }
                Some(c) => value.push(c),
            }
        }

        Ok(Token::new(TokenType::StringLiteral, value, self.token_span()))
    }

    /// Decode an escape sequence; unknown escapes stand for themselves
    fn escaped_char(escaped: char) -> char {
        match escaped {
            't' => '\t',
            'b' => '\u{8}',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{c}',
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenType> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().expect("lex error");
            let ty = token.ty;
            out.push(ty);
            if ty == TokenType::Eof {
                return out;
            }
        }
    }

    #[test]
    fn lex_single_char_tokens() {
        assert_eq!(
            kinds("( ) { } [ ] , ; . :"),
            vec![
                TokenType::LParen,
                TokenType::RParen,
                TokenType::LBrace,
                TokenType::RBrace,
                TokenType::LBracket,
                TokenType::RBracket,
                TokenType::Comma,
                TokenType::Semi,
                TokenType::Dot,
                TokenType::Colon,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lex_operators() {
        assert_eq!(
            kinds("+ - * / = := == != ! < <= > >= && ||"),
            vec![
                TokenType::Plus,
                TokenType::Minus,
                TokenType::Star,
                TokenType::Slash,
                TokenType::Eq,
                TokenType::DeclAssign,
                TokenType::EqEq,
                TokenType::BangEq,
                TokenType::Bang,
                TokenType::Lt,
                TokenType::LtEq,
                TokenType::Gt,
                TokenType::GtEq,
                TokenType::AmpAmp,
                TokenType::PipePipe,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lex_keywords() {
        assert_eq!(
            kinds("func var type struct new if elif else while break return int string any None"),
            vec![
                TokenType::KwFunc,
                TokenType::KwVar,
                TokenType::KwType,
                TokenType::KwStruct,
                TokenType::KwNew,
                TokenType::KwIf,
                TokenType::KwElif,
                TokenType::KwElse,
                TokenType::KwWhile,
                TokenType::KwBreak,
                TokenType::KwReturn,
                TokenType::KwInt,
                TokenType::KwString,
                TokenType::KwAny,
                TokenType::KwNone,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        let mut lexer = Lexer::new("42 0 1000");
        let t = lexer.next_token().unwrap();
        assert_eq!(t.ty, TokenType::IntLiteral);
        assert_eq!(t.lexeme, "42");

        let t = lexer.next_token().unwrap();
        assert_eq!(t.lexeme, "0");
        let t = lexer.next_token().unwrap();
        assert_eq!(t.lexeme, "1000");
    }

    #[test]
    fn lex_string_decodes_escapes() {
        let mut lexer = Lexer::new(r#""a\tb\nc\"d\\e\qf""#);
        let t = lexer.next_token().unwrap();
        assert_eq!(t.ty, TokenType::StringLiteral);
        assert_eq!(t.lexeme, "a\tb\nc\"d\\e\u{71}f");
    }

    #[test]
    fn lex_unterminated_string() {
        let mut lexer = Lexer::new("\"hello");
        assert!(matches!(
            lexer.next_token(),
            Err(LexerError::UnterminatedString { .. })
        ));
        // the failure is sticky
        assert!(matches!(
            lexer.next_token(),
            Err(LexerError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn lex_lone_ampersand_is_an_error() {
        let mut lexer = Lexer::new("a & b");
        assert_eq!(lexer.next_token().unwrap().ty, TokenType::Identifier);
        assert!(matches!(
            lexer.next_token(),
            Err(LexerError::UnknownSequence { .. })
        ));
    }

    #[test]
    fn lex_unexpected_character() {
        let mut lexer = Lexer::new("@");
        assert!(matches!(
            lexer.next_token(),
            Err(LexerError::UnexpectedCharacter { ch: '@', .. })
        ));
    }

    #[test]
    fn lex_comments() {
        assert_eq!(
            kinds("1 // comment\n2 /* multi\nline */ 3"),
            vec![
                TokenType::IntLiteral,
                TokenType::IntLiteral,
                TokenType::IntLiteral,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lex_newlines_are_whitespace_but_count_lines() {
        let mut lexer = Lexer::new("a\nb");
        let a = lexer.next_token().unwrap();
        let b = lexer.next_token().unwrap();
        assert_eq!(a.span.line, 1);
        assert_eq!(b.span.line, 2);
        assert_eq!(b.span.column, 1);
    }

    #[test]
    fn lex_positions() {
        let mut lexer = Lexer::new("ab cd");
        let a = lexer.next_token().unwrap();
        assert_eq!((a.span.start, a.span.end), (0, 2));
        assert_eq!((a.span.line, a.span.column), (1, 1));

        let b = lexer.next_token().unwrap();
        assert_eq!((b.span.start, b.span.end), (3, 5));
        assert_eq!((b.span.line, b.span.column), (1, 4));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("a b");
        let peeked = lexer.peek_token().unwrap();
        assert_eq!(peeked.lexeme, "a");
        let next = lexer.next_token().unwrap();
        assert_eq!(next.lexeme, "a");
        assert_eq!(lexer.next_token().unwrap().lexeme, "b");
    }

    #[test]
    fn eof_is_repeatable() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().unwrap().ty, TokenType::Eof);
        assert_eq!(lexer.next_token().unwrap().ty, TokenType::Eof);
    }

    #[test]
    fn multiline_string_is_allowed() {
        let mut lexer = Lexer::new("\"a\nb\"");
        let t = lexer.next_token().unwrap();
        assert_eq!(t.lexeme, "a\nb");
        // the token span starts on line 1, following tokens are on line 2
        assert_eq!(t.span.line, 1);
    }
}
