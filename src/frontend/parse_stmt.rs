// src/frontend/parse_stmt.rs

use crate::errors::ParserError;
use crate::frontend::Parser;
use crate::frontend::TokenType;
use crate::frontend::ast::*;

impl Parser<'_> {
    /// `'{' (var_decl | stmt)* '}'`
    ///
    /// Declarations may appear anywhere in the statement stream; they are
    /// collected into the block's var list and installed on block entry,
    /// which is also when the runtime binds them.
    pub(super) fn block(&mut self) -> Result<Block, ParserError> {
        let start = self.current().span;
        self.consume(TokenType::LBrace, "'{'")?;

        let mut vars = Vec::new();
        let mut stmts = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            if self.check(TokenType::KwVar)
                || (self.check(TokenType::Identifier) && self.peek()?.ty == TokenType::DeclAssign)
            {
                vars.extend(self.variable_decl()?);
            } else {
                stmts.push(self.statement()?);
            }
            self.expect_separator()?;
        }

        let end = self.current().span;
        self.consume(TokenType::RBrace, "'}'")?;

        Ok(Block {
            vars,
            stmts,
            span: start.merge(end),
        })
    }

    fn statement(&mut self) -> Result<Stmt, ParserError> {
        match self.current().ty {
            TokenType::KwReturn => self.return_stmt(),
            TokenType::KwIf => Ok(Stmt::If(self.if_stmt()?)),
            TokenType::KwWhile => self.while_stmt(),
            TokenType::KwBreak => {
                let span = self.current().span;
                self.advance()?;
                Ok(Stmt::Break(span))
            }
            _ => self.misc_stmt(),
        }
    }

    /// `return` takes a value only when one starts on the same line
    fn return_stmt(&mut self) -> Result<Stmt, ParserError> {
        let start = self.current().span;
        self.advance()?; // 'return'

        let value = if self.check(TokenType::Semi)
            || self.check(TokenType::RBrace)
            || self.check(TokenType::Eof)
            || self.current().span.line != start.line
        {
            None
        } else {
            Some(self.expr()?)
        };

        let span = match &value {
            Some(e) => start.merge(e.span),
            None => start,
        };

        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    /// `if expr block (elif expr block)* (else block)?`; each `elif` becomes
    /// the `alt` of its predecessor, the final `else` hangs off the last one.
    fn if_stmt(&mut self) -> Result<IfStmt, ParserError> {
        let start = self.current().span;
        self.advance()?; // 'if' or 'elif'

        let cond = self.expr()?;
        let then_block = self.block()?;

        let mut stmt = IfStmt {
            cond,
            then_block,
            alt: None,
            else_block: None,
            span: start,
        };

        if self.check(TokenType::KwElif) {
            stmt.alt = Some(Box::new(self.if_stmt()?));
        } else if self.match_token(TokenType::KwElse)? {
            stmt.else_block = Some(self.block()?);
        }

        stmt.span = start.merge(self.prev_span());
        Ok(stmt)
    }

    fn while_stmt(&mut self) -> Result<Stmt, ParserError> {
        let start = self.current().span;
        self.advance()?; // 'while'

        let cond = self.expr()?;
        let body = self.block()?;
        let span = start.merge(body.span);

        Ok(Stmt::While(WhileStmt { cond, body, span }))
    }

    /// Either an assignment or a bare expression. The assignment is tried
    /// speculatively; on failure the cursor rewinds and the expression path
    /// runs from the same position.
    fn misc_stmt(&mut self) -> Result<Stmt, ParserError> {
        self.mark();
        match self.assign_stmt() {
            Ok(stmt) => {
                self.commit();
                Ok(Stmt::Assign(stmt))
            }
            Err(_) => {
                self.restore();
                Ok(Stmt::Expr(self.expr()?))
            }
        }
    }

    /// `var_ref '=' expr`
    fn assign_stmt(&mut self) -> Result<AssignStmt, ParserError> {
        let start = self.current().span;
        let dst = self.var_ref()?;
        self.consume(TokenType::Eq, "'='")?;
        let value = self.expr()?;
        let span = start.merge(value.span);

        Ok(AssignStmt { dst, value, span })
    }
}
