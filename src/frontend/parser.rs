// src/frontend/parser.rs

use crate::errors::ParserError;
use crate::frontend::ast::*;
use crate::frontend::{
    Interner, Lexer, Span, Symbol, Token, TokenType, TypeData, TypeId, TypeTable, WellKnown,
};

/// Recursive-descent parser with one token of routine lookahead and
/// mark/restore backtracking for the assignment-vs-expression ambiguity.
///
/// Tokens are pulled lazily into a buffer. While no mark is active the buffer
/// is compacted down to the current token; while speculating it grows so that
/// `restore` can rewind the cursor exactly, previous token included.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    buffer: Vec<Token>,
    pos: usize,
    prev: Token,
    markers: Vec<usize>,
    marked_prevs: Vec<Token>,
    interner: Interner,
    types: TypeTable,
    wk: WellKnown,
    next_node_id: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut interner = Interner::new();
        let wk = WellKnown::install(&mut interner);
        let types = TypeTable::new(&mut interner);
        Self {
            lexer: Lexer::new(source),
            buffer: Vec::new(),
            pos: 0,
            prev: Token::new(TokenType::Eof, "", Span::default()),
            markers: Vec::new(),
            marked_prevs: Vec::new(),
            interner,
            types,
            wk,
            next_node_id: 0,
        }
    }

    /// Hand the interner, type table and well-known names to the next phase.
    pub fn into_parts(self) -> (Interner, TypeTable, WellKnown) {
        (self.interner, self.types, self.wk)
    }

    pub fn parse_program(&mut self) -> Result<Program, ParserError> {
        self.prime()?;

        let mut decls = Vec::new();
        while !self.check(TokenType::Eof) {
            // stray separators between top-level declarations are fine
            if self.match_token(TokenType::Semi)? {
                continue;
            }
            match self.current().ty {
                TokenType::KwFunc => {
                    self.advance()?;
                    decls.push(Decl::Func(self.func_decl()?));
                }
                TokenType::KwType => {
                    decls.push(Decl::Type(self.type_def()?));
                }
                _ => {
                    let vars = self.variable_decl()?;
                    self.expect_separator()?;
                    decls.extend(vars.into_iter().map(Decl::Var));
                }
            }
        }

        Ok(Program {
            decls,
            next_node_id: self.next_node_id,
        })
    }

    // ---- cursor -----------------------------------------------------------

    fn prime(&mut self) -> Result<(), ParserError> {
        if self.buffer.is_empty() {
            let token = self.lexer.next_token()?;
            self.buffer.push(token);
        }
        Ok(())
    }

    pub(super) fn current(&self) -> &Token {
        &self.buffer[self.pos]
    }

    pub(super) fn check(&self, ty: TokenType) -> bool {
        self.current().ty == ty
    }

    /// Look one token past the current one
    pub(super) fn peek(&mut self) -> Result<&Token, ParserError> {
        if self.pos + 1 >= self.buffer.len() {
            let token = self.lexer.next_token()?;
            self.buffer.push(token);
        }
        Ok(&self.buffer[self.pos + 1])
    }

    pub(super) fn advance(&mut self) -> Result<(), ParserError> {
        self.prev = self.current().clone();
        if self.pos + 1 < self.buffer.len() {
            self.pos += 1;
        } else {
            let token = self.lexer.next_token()?;
            if self.markers.is_empty() {
                self.buffer.clear();
                self.buffer.push(token);
                self.pos = 0;
            } else {
                self.buffer.push(token);
                self.pos += 1;
            }
        }
        Ok(())
    }

    pub(super) fn match_token(&mut self, ty: TokenType) -> Result<bool, ParserError> {
        if self.check(ty) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(super) fn consume(&mut self, ty: TokenType, expected: &str) -> Result<(), ParserError> {
        if self.check(ty) {
            self.advance()
        } else {
            Err(ParserError::ExpectedToken {
                expected: expected.to_string(),
                found: self.current().lexeme_for_message(),
                span: self.current().span.into(),
            })
        }
    }

    pub(super) fn identifier(&mut self, what: &str) -> Result<(Symbol, Span), ParserError> {
        if self.check(TokenType::Identifier) {
            let token = self.current().clone();
            self.advance()?;
            Ok((self.interner.intern(&token.lexeme), token.span))
        } else {
            Err(ParserError::ExpectedToken {
                expected: what.to_string(),
                found: self.current().lexeme_for_message(),
                span: self.current().span.into(),
            })
        }
    }

    /// A statement ends with ';' or by being the last thing on its line.
    pub(super) fn expect_separator(&mut self) -> Result<(), ParserError> {
        if self.check(TokenType::Semi) {
            return self.advance();
        }
        if self.check(TokenType::RBrace) || self.check(TokenType::Eof) {
            return Ok(());
        }
        if self.prev.span.line == self.current().span.line {
            return Err(ParserError::MissingSeparator {
                span: self.current().span.into(),
            });
        }
        Ok(())
    }

    // ---- backtracking -----------------------------------------------------

    pub(super) fn mark(&mut self) {
        self.markers.push(self.pos);
        self.marked_prevs.push(self.prev.clone());
    }

    pub(super) fn restore(&mut self) {
        self.pos = self.markers.pop().expect("restore without mark");
        self.prev = self.marked_prevs.pop().expect("restore without mark");
    }

    pub(super) fn commit(&mut self) {
        self.markers.pop().expect("commit without mark");
        self.marked_prevs.pop().expect("commit without mark");
    }

    // ---- nodes ------------------------------------------------------------

    pub(super) fn make_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        Expr { id, kind, span }
    }

    pub(super) fn prev_span(&self) -> Span {
        self.prev.span
    }

    pub(super) fn intern(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    pub(super) fn well_known(&self) -> WellKnown {
        self.wk
    }

    pub(super) fn parse_int(lexeme: &str, span: Span) -> Result<i64, ParserError> {
        lexeme
            .parse::<i64>()
            .map_err(|_| ParserError::InvalidIntLiteral { span: span.into() })
    }

    // ---- declarations -----------------------------------------------------

    fn func_decl(&mut self) -> Result<FuncDecl, ParserError> {
        let (name, name_span) = self.identifier("function name")?;
        self.consume(TokenType::LParen, "'('")?;
        let params = self.formal_params()?;
        self.consume(TokenType::RParen, "')'")?;

        let ret = if self.check(TokenType::LBrace) {
            TypeTable::VOID
        } else {
            self.type_spec()?
        };

        let body = self.block()?;
        let span = name_span.merge(body.span);

        Ok(FuncDecl {
            name,
            ret,
            params,
            body,
            span,
        })
    }

    /// `ID (',' ID)* ':' type_spec` groups separated by ','
    fn formal_params(&mut self) -> Result<Vec<VarDecl>, ParserError> {
        let mut params = Vec::new();
        if !self.check(TokenType::Identifier) {
            return Ok(params);
        }

        loop {
            let names = self.name_list()?;
            self.consume(TokenType::Colon, "':'")?;
            let ty = self.type_spec()?;
            for (name, span) in names {
                params.push(VarDecl {
                    name,
                    ty,
                    init: None,
                    span,
                });
            }
            if !self.match_token(TokenType::Comma)? {
                break;
            }
        }

        Ok(params)
    }

    /// One or more comma-separated identifiers. Stops before a comma that is
    /// not followed by an identifier, so group parsing can continue.
    fn name_list(&mut self) -> Result<Vec<(Symbol, Span)>, ParserError> {
        let mut names = vec![self.identifier("name")?];
        while self.check(TokenType::Comma) && self.peek()?.ty == TokenType::Identifier {
            self.advance()?;
            names.push(self.identifier("name")?);
        }
        Ok(names)
    }

    pub(super) fn variable_decl(&mut self) -> Result<Vec<VarDecl>, ParserError> {
        if self.check(TokenType::KwVar) {
            self.var_type_decl()
        } else {
            Ok(vec![self.var_assign_decl()?])
        }
    }

    /// `var a, b : type`
    fn var_type_decl(&mut self) -> Result<Vec<VarDecl>, ParserError> {
        self.advance()?; // 'var'
        let names = self.name_list()?;
        self.consume(TokenType::Colon, "':'")?;
        let ty = self.type_spec()?;

        Ok(names
            .into_iter()
            .map(|(name, span)| VarDecl {
                name,
                ty,
                init: None,
                span,
            })
            .collect())
    }

    /// `name := literal` where the literal is an int, a string, or an
    /// `[]int{...}` / `[]string{...}` array literal.
    fn var_assign_decl(&mut self) -> Result<VarDecl, ParserError> {
        let (name, span) = self.identifier("variable name")?;
        self.consume(TokenType::DeclAssign, "':='")?;

        match self.current().ty {
            TokenType::IntLiteral => {
                let token = self.current().clone();
                self.advance()?;
                let value = Self::parse_int(&token.lexeme, token.span)?;
                Ok(VarDecl {
                    name,
                    ty: TypeTable::INT,
                    init: Some(VarInit::Int(value)),
                    span,
                })
            }
            TokenType::StringLiteral => {
                let token = self.current().clone();
                self.advance()?;
                Ok(VarDecl {
                    name,
                    ty: TypeTable::STRING,
                    init: Some(VarInit::Str(token.lexeme)),
                    span,
                })
            }
            _ => {
                self.consume(TokenType::LBracket, "'['")?;
                self.consume(TokenType::RBracket, "']'")?;
                self.array_literal_decl(name, span)
            }
        }
    }

    fn array_literal_decl(&mut self, name: Symbol, span: Span) -> Result<VarDecl, ParserError> {
        if self.match_token(TokenType::KwInt)? {
            self.consume(TokenType::LBrace, "'{'")?;
            let mut values = Vec::new();
            if self.check(TokenType::IntLiteral) {
                loop {
                    let token = self.current().clone();
                    self.consume(TokenType::IntLiteral, "integer literal")?;
                    values.push(Self::parse_int(&token.lexeme, token.span)?);
                    if !self.match_token(TokenType::Comma)? {
                        break;
                    }
                }
            }
            self.consume(TokenType::RBrace, "'}'")?;
            let ty = self.types.array_of(TypeTable::INT);
            Ok(VarDecl {
                name,
                ty,
                init: Some(VarInit::IntArray(values)),
                span,
            })
        } else {
            self.consume(TokenType::KwString, "'int' or 'string'")?;
            self.consume(TokenType::LBrace, "'{'")?;
            let mut values = Vec::new();
            if self.check(TokenType::StringLiteral) {
                loop {
                    let token = self.current().clone();
                    self.consume(TokenType::StringLiteral, "string literal")?;
                    values.push(token.lexeme);
                    if !self.match_token(TokenType::Comma)? {
                        break;
                    }
                }
            }
            self.consume(TokenType::RBrace, "'}'")?;
            let ty = self.types.array_of(TypeTable::STRING);
            Ok(VarDecl {
                name,
                ty,
                init: Some(VarInit::StrArray(values)),
                span,
            })
        }
    }

    // ---- types ------------------------------------------------------------

    /// `type ID type_ref`
    fn type_def(&mut self) -> Result<TypeDef, ParserError> {
        let start = self.current().span;
        self.advance()?; // 'type'
        let (name, _) = self.identifier("type name")?;
        let impl_ty = self.type_ref(name, 0)?;
        let span = start.merge(self.prev.span);

        if let Some(old) = self.types.lookup(name) {
            // A placeholder created by an earlier reference is patched in
            // place; anything else is a redefinition.
            let can_patch = matches!(
                self.types.get(old),
                TypeData::Undef { name: n, resolved: None, .. } if *n == name
            );
            if !can_patch {
                return Err(ParserError::DuplicateType {
                    name: self.interner.resolve(name).to_string(),
                    span: span.into(),
                });
            }
            if let TypeData::Undef { resolved, .. } = self.types.get_mut(old) {
                *resolved = Some(impl_ty);
            }
        } else {
            self.types.insert_name(name, impl_ty);
        }

        Ok(TypeDef {
            name,
            ty: impl_ty,
            span,
        })
    }

    /// `('[' ']')* ('int' | 'string' | ID | struct_def)`; a struct at depth 0
    /// takes the definition's name.
    fn type_ref(&mut self, typedef_name: Symbol, depth: u32) -> Result<TypeId, ParserError> {
        if self.match_token(TokenType::LBracket)? {
            self.consume(TokenType::RBracket, "']'")?;
            let elem = self.type_ref(typedef_name, depth + 1)?;
            return Ok(self.types.array_of(elem));
        }

        match self.current().ty {
            TokenType::KwInt => {
                self.advance()?;
                Ok(TypeTable::INT)
            }
            TokenType::KwString => {
                self.advance()?;
                Ok(TypeTable::STRING)
            }
            TokenType::KwStruct => {
                let name = if depth == 0 {
                    typedef_name
                } else {
                    self.interner.intern("")
                };
                self.struct_def(name)
            }
            TokenType::Identifier => {
                let (name, span) = self.identifier("type name")?;
                // referenced by this definition only; resolution chases it
                Ok(self.types.alloc(TypeData::Undef {
                    name,
                    resolved: None,
                    span,
                }))
            }
            _ => Err(ParserError::ExpectedType {
                span: self.current().span.into(),
            }),
        }
    }

    /// `struct '{' (ID (',' ID)* ':' type_spec)* '}'`
    fn struct_def(&mut self, name: Symbol) -> Result<TypeId, ParserError> {
        self.advance()?; // 'struct'
        self.consume(TokenType::LBrace, "'{'")?;

        let mut fields: Vec<crate::frontend::Field> = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            let names = self.name_list()?;
            self.consume(TokenType::Colon, "':'")?;
            let ty = self.type_spec()?;
            for (field_name, span) in names {
                if fields.iter().any(|f| f.name == field_name) {
                    return Err(ParserError::DuplicateField {
                        name: self.interner.resolve(field_name).to_string(),
                        span: span.into(),
                    });
                }
                fields.push(crate::frontend::Field {
                    name: field_name,
                    ty,
                });
            }
        }

        self.consume(TokenType::RBrace, "'}'")?;
        Ok(self.types.alloc(TypeData::Struct { name, fields }))
    }

    /// `'int' | 'string' | 'any' | ID | '[' ']' type_spec`
    pub(super) fn type_spec(&mut self) -> Result<TypeId, ParserError> {
        match self.current().ty {
            TokenType::KwInt => {
                self.advance()?;
                Ok(TypeTable::INT)
            }
            TokenType::KwString => {
                self.advance()?;
                Ok(TypeTable::STRING)
            }
            TokenType::KwAny => {
                self.advance()?;
                Ok(TypeTable::ANY)
            }
            TokenType::Identifier => {
                let (name, span) = self.identifier("type name")?;
                match self.types.lookup(name) {
                    Some(id) => Ok(id),
                    // first reference to an unknown name: shared placeholder
                    None => Ok(self.types.undef(name, span)),
                }
            }
            TokenType::LBracket => {
                self.advance()?;
                self.consume(TokenType::RBracket, "']'")?;
                let elem = self.type_spec()?;
                Ok(self.types.array_of(elem))
            }
            _ => Err(ParserError::ExpectedType {
                span: self.current().span.into(),
            }),
        }
    }
}

impl Token {
    fn lexeme_for_message(&self) -> String {
        if self.ty == TokenType::Eof {
            "end of file".to_string()
        } else {
            self.lexeme.clone()
        }
    }
}
