// src/frontend/parse_expr.rs

use crate::errors::ParserError;
use crate::frontend::Parser;
use crate::frontend::ast::*;
use crate::frontend::{Symbol, TokenType};

impl Parser<'_> {
    /// `expr_and ('||' expr_and)*`
    pub(super) fn expr(&mut self) -> Result<Expr, ParserError> {
        let mut node = self.expr_and()?;
        while self.match_token(TokenType::PipePipe)? {
            let right = self.expr_and()?;
            node = self.binary(BinOp::Or, node, right);
        }
        Ok(node)
    }

    /// `expr_equ ('&&' expr_equ)*`
    fn expr_and(&mut self) -> Result<Expr, ParserError> {
        let mut node = self.expr_equ()?;
        while self.match_token(TokenType::AmpAmp)? {
            let right = self.expr_equ()?;
            node = self.binary(BinOp::And, node, right);
        }
        Ok(node)
    }

    /// `expr_cmp (('==' | '!=') expr_cmp)*`
    fn expr_equ(&mut self) -> Result<Expr, ParserError> {
        let mut node = self.expr_cmp()?;
        loop {
            let op = match self.current().ty {
                TokenType::EqEq => BinOp::Eq,
                TokenType::BangEq => BinOp::Ne,
                _ => break,
            };
            self.advance()?;
            let right = self.expr_cmp()?;
            node = self.binary(op, node, right);
        }
        Ok(node)
    }

    /// `expr_add (('<' | '<=' | '>' | '>=') expr_add)*`
    fn expr_cmp(&mut self) -> Result<Expr, ParserError> {
        let mut node = self.expr_add()?;
        loop {
            let op = match self.current().ty {
                TokenType::Lt => BinOp::Lt,
                TokenType::LtEq => BinOp::Le,
                TokenType::Gt => BinOp::Gt,
                TokenType::GtEq => BinOp::Ge,
                _ => break,
            };
            self.advance()?;
            let right = self.expr_add()?;
            node = self.binary(op, node, right);
        }
        Ok(node)
    }

    /// `expr_mul (('+' | '-') expr_mul)*`
    fn expr_add(&mut self) -> Result<Expr, ParserError> {
        let mut node = self.expr_mul()?;
        loop {
            let op = match self.current().ty {
                TokenType::Plus => BinOp::Add,
                TokenType::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.expr_mul()?;
            node = self.binary(op, node, right);
        }
        Ok(node)
    }

    /// `factor (('*' | '/') factor)*`
    fn expr_mul(&mut self) -> Result<Expr, ParserError> {
        let mut node = self.factor()?;
        loop {
            let op = match self.current().ty {
                TokenType::Star => BinOp::Mul,
                TokenType::Slash => BinOp::Div,
                _ => break,
            };
            self.advance()?;
            let right = self.factor()?;
            node = self.binary(op, node, right);
        }
        Ok(node)
    }

    fn binary(&mut self, op: BinOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        self.make_expr(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn factor(&mut self) -> Result<Expr, ParserError> {
        match self.current().ty {
            TokenType::Plus | TokenType::Minus | TokenType::Bang => {
                let op = match self.current().ty {
                    TokenType::Plus => UnaryOp::Plus,
                    TokenType::Minus => UnaryOp::Neg,
                    _ => UnaryOp::Not,
                };
                let op_span = self.current().span;
                self.advance()?;
                let operand = self.factor()?;
                let span = op_span.merge(operand.span);
                Ok(self.make_expr(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            TokenType::IntLiteral => {
                let token = self.current().clone();
                self.advance()?;
                let value = Self::parse_int(&token.lexeme, token.span)?;
                Ok(self.make_expr(ExprKind::IntConst(value), token.span))
            }
            TokenType::StringLiteral => {
                let token = self.current().clone();
                self.advance()?;
                Ok(self.make_expr(ExprKind::StrConst(token.lexeme), token.span))
            }
            TokenType::LParen => {
                self.advance()?;
                let inner = self.expr()?;
                self.consume(TokenType::RParen, "')'")?;
                Ok(inner)
            }
            TokenType::Identifier => {
                if self.peek()?.ty == TokenType::LParen {
                    self.func_call()
                } else {
                    self.var_ref()
                }
            }
            // conversion built-ins share their lexeme with type keywords
            TokenType::KwInt | TokenType::KwString => {
                if self.peek()?.ty == TokenType::LParen {
                    self.func_call()
                } else {
                    Err(self.expected_expression())
                }
            }
            TokenType::KwNew => {
                if self.peek()?.ty == TokenType::LParen {
                    self.new_op()
                } else {
                    Err(self.expected_expression())
                }
            }
            _ => Err(self.expected_expression()),
        }
    }

    fn expected_expression(&self) -> ParserError {
        ParserError::ExpectedExpression {
            found: self.current().ty.as_str().to_string(),
            span: self.current().span.into(),
        }
    }

    /// `ID '(' (expr (',' expr)*)? ')'`
    fn func_call(&mut self) -> Result<Expr, ParserError> {
        let name_token = self.current().clone();
        self.advance()?; // callee name
        let name = self.call_name(&name_token.lexeme);

        self.consume(TokenType::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                args.push(self.expr()?);
                if !self.match_token(TokenType::Comma)? {
                    break;
                }
            }
        }
        let end = self.current().span;
        self.consume(TokenType::RParen, "')'")?;

        Ok(self.make_expr(
            ExprKind::Call { name, args },
            name_token.span.merge(end),
        ))
    }

    /// The `int` conversion cannot keep its surface name, it collides with
    /// the type keyword; call sites use the internal built-in name.
    fn call_name(&mut self, lexeme: &str) -> Symbol {
        if lexeme == "int" {
            self.well_known().int_val
        } else {
            self.intern(lexeme)
        }
    }

    /// `'new' '(' type_spec ')'`
    fn new_op(&mut self) -> Result<Expr, ParserError> {
        let start = self.current().span;
        self.advance()?; // 'new'
        self.consume(TokenType::LParen, "'('")?;
        let ty = self.type_spec()?;
        let end = self.current().span;
        self.consume(TokenType::RParen, "')'")?;

        Ok(self.make_expr(ExprKind::New(ty), start.merge(end)))
    }

    /// `ID ('[' expr ']' | '.' ID)*`
    pub(super) fn var_ref(&mut self) -> Result<Expr, ParserError> {
        let (name, start) = self.identifier("variable name")?;
        let mut node = self.make_expr(ExprKind::VarRef(name), start);

        loop {
            match self.current().ty {
                TokenType::LBracket => {
                    self.advance()?;
                    let index = self.expr()?;
                    let end = self.current().span;
                    self.consume(TokenType::RBracket, "']'")?;
                    let span = start.merge(end);
                    node = self.make_expr(
                        ExprKind::IndexRef {
                            host: Box::new(node),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenType::Dot => {
                    self.advance()?;
                    let (field, field_span) = self.identifier("field name")?;
                    let span = start.merge(field_span);
                    node = self.make_expr(
                        ExprKind::DotRef {
                            host: Box::new(node),
                            field,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Parser;

    fn parse(source: &str) -> Program {
        Parser::new(source).parse_program().expect("parse error")
    }

    fn parse_err(source: &str) -> ParserError {
        Parser::new(source)
            .parse_program()
            .expect_err("expected parse error")
    }

    fn main_body(program: &Program) -> &Block {
        for decl in &program.decls {
            if let Decl::Func(f) = decl {
                return &f.body;
            }
        }
        panic!("no function in program");
    }

    #[test]
    fn parse_hello() {
        let program = parse("func main() { print(\"hello\") }");
        assert_eq!(program.decls.len(), 1);
        let body = main_body(&program);
        assert_eq!(body.stmts.len(), 1);
        match &body.stmts[0] {
            Stmt::Expr(Expr {
                kind: ExprKind::Call { args, .. },
                ..
            }) => assert_eq!(args.len(), 1),
            other => panic!("expected call statement, got {other:?}"),
        }
    }

    #[test]
    fn assignment_vs_expression_disambiguation() {
        let program = parse("func main() { var x:int\n x = 1\n print(\"\") }");
        let body = main_body(&program);
        assert!(matches!(body.stmts[0], Stmt::Assign(_)));
        assert!(matches!(body.stmts[1], Stmt::Expr(_)));
    }

    #[test]
    fn assignment_through_chained_refs() {
        let program = parse("func main() { var p:P\n p.a[0].b = 2 }");
        let body = main_body(&program);
        let Stmt::Assign(assign) = &body.stmts[0] else {
            panic!("expected assignment");
        };
        // dst is DotRef(IndexRef(DotRef(VarRef)))
        let ExprKind::DotRef { host, .. } = &assign.dst.kind else {
            panic!("expected dot ref");
        };
        assert!(matches!(host.kind, ExprKind::IndexRef { .. }));
    }

    #[test]
    fn same_line_statements_need_semicolon() {
        let err = parse_err("func main() { var x:int\n x = 1 x = 2 }");
        assert!(matches!(err, ParserError::MissingSeparator { .. }));
    }

    #[test]
    fn same_line_statements_with_semicolon() {
        let program = parse("func main() { var x:int; x = 1; x = 2 }");
        let body = main_body(&program);
        assert_eq!(body.vars.len(), 1);
        assert_eq!(body.stmts.len(), 2);
    }

    #[test]
    fn precedence_mul_over_add() {
        let program = parse("func main() { var x:int\n x = 1 + 2 * 3 }");
        let body = main_body(&program);
        let Stmt::Assign(assign) = &body.stmts[0] else {
            panic!("expected assignment");
        };
        let ExprKind::Binary { op, right, .. } = &assign.value.kind else {
            panic!("expected binary expr");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(
            right.kind,
            ExprKind::Binary { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn parens_override_precedence() {
        let program = parse("func main() { var x:int\n x = (1 + 2) * 3 }");
        let body = main_body(&program);
        let Stmt::Assign(assign) = &body.stmts[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            assign.value.kind,
            ExprKind::Binary { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn unary_chain() {
        let program = parse("func main() { var x:int\n x = --1 }");
        let body = main_body(&program);
        let Stmt::Assign(assign) = &body.stmts[0] else {
            panic!("expected assignment");
        };
        let ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } = &assign.value.kind
        else {
            panic!("expected unary");
        };
        assert!(matches!(
            operand.kind,
            ExprKind::Unary {
                op: UnaryOp::Neg,
                ..
            }
        ));
    }

    #[test]
    fn int_conversion_call_uses_internal_name() {
        let mut parser = Parser::new("func main() { var x:int\n x = int(\"42\") }");
        let program = parser.parse_program().unwrap();
        let (interner, _, wk) = parser.into_parts();
        let body = main_body(&program);
        let Stmt::Assign(assign) = &body.stmts[0] else {
            panic!("expected assignment");
        };
        let ExprKind::Call { name, .. } = &assign.value.kind else {
            panic!("expected call");
        };
        assert_eq!(*name, wk.int_val);
        assert_eq!(interner.resolve(*name), "_intVal");
    }

    #[test]
    fn new_requires_composite_syntax() {
        let program = parse("func main() { var p:P\n p = new(P) }");
        let body = main_body(&program);
        let Stmt::Assign(assign) = &body.stmts[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(assign.value.kind, ExprKind::New(_)));
    }

    #[test]
    fn elif_chain_shape() {
        let program = parse(
            "func main() { var x:int\n if x { x = 1 } elif x == 1 { x = 2 } elif x == 2 { x = 3 } else { x = 4 } }",
        );
        let body = main_body(&program);
        let Stmt::If(top) = &body.stmts[0] else {
            panic!("expected if");
        };
        let first_alt = top.alt.as_ref().expect("first elif");
        let second_alt = first_alt.alt.as_ref().expect("second elif");
        assert!(second_alt.else_block.is_some());
        assert!(top.else_block.is_none());
    }

    #[test]
    fn decl_assign_forms() {
        let program = parse("a := 5\nb := \"hi\"\nc := []int{1, 2, 3}\nd := []string{\"x\"}\ne := []int{}");
        let inits: Vec<_> = program
            .decls
            .iter()
            .map(|d| match d {
                Decl::Var(v) => v.init.clone().expect("initialized"),
                _ => panic!("expected var decl"),
            })
            .collect();
        assert!(matches!(inits[0], VarInit::Int(5)));
        assert!(matches!(&inits[1], VarInit::Str(s) if s == "hi"));
        assert!(matches!(&inits[2], VarInit::IntArray(v) if v == &[1, 2, 3]));
        assert!(matches!(&inits[3], VarInit::StrArray(v) if v.len() == 1));
        assert!(matches!(&inits[4], VarInit::IntArray(v) if v.is_empty()));
    }

    #[test]
    fn multi_name_var_decl() {
        let program = parse("var x, y, z : int");
        assert_eq!(program.decls.len(), 3);
    }

    #[test]
    fn grouped_params() {
        let program = parse("func f(a, b: int, c: string) { }\nfunc main() { }");
        let Decl::Func(f) = &program.decls[0] else {
            panic!("expected func");
        };
        assert_eq!(f.params.len(), 3);
        assert_eq!(f.params[0].ty, f.params[1].ty);
        assert_ne!(f.params[1].ty, f.params[2].ty);
    }

    #[test]
    fn func_return_type() {
        let mut parser = Parser::new("func f() int { return 1 }\nfunc g() { }");
        let program = parser.parse_program().unwrap();
        let Decl::Func(f) = &program.decls[0] else {
            panic!()
        };
        let Decl::Func(g) = &program.decls[1] else {
            panic!()
        };
        assert_eq!(f.ret, crate::frontend::TypeTable::INT);
        assert_eq!(g.ret, crate::frontend::TypeTable::VOID);
    }

    #[test]
    fn return_value_only_on_same_line() {
        let program = parse("func f() int { return\n1 }\nfunc main() { }");
        let Decl::Func(f) = &program.decls[0] else {
            panic!()
        };
        let Stmt::Return(ret) = &f.body.stmts[0] else {
            panic!("expected return");
        };
        assert!(ret.value.is_none());
        // the literal became its own statement
        assert!(matches!(f.body.stmts[1], Stmt::Expr(_)));
    }

    #[test]
    fn struct_type_def() {
        let mut parser = Parser::new("type P struct { x, y : int\n name : string }");
        let program = parser.parse_program().unwrap();
        let (interner, types, _) = parser.into_parts();
        let Decl::Type(def) = &program.decls[0] else {
            panic!("expected typedef");
        };
        assert_eq!(types.signature(def.ty, &interner), "sP;");
        let crate::frontend::TypeData::Struct { fields, .. } = types.get(def.ty) else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn duplicate_struct_field_rejected() {
        let err = parse_err("type P struct { x : int\n x : string }");
        assert!(matches!(err, ParserError::DuplicateField { .. }));
    }

    #[test]
    fn duplicate_type_def_rejected() {
        let err = parse_err("type A int\ntype A string");
        assert!(matches!(err, ParserError::DuplicateType { .. }));
    }

    #[test]
    fn forward_type_reference_is_patched() {
        let mut parser = Parser::new("var x : A\ntype A []int");
        let program = parser.parse_program().unwrap();
        let (interner, types, _) = parser.into_parts();
        let Decl::Var(v) = &program.decls[0] else {
            panic!()
        };
        // the placeholder now resolves through to []int
        assert_eq!(types.signature(v.ty, &interner), "[I");
    }

    #[test]
    fn type_signature_round_trip() {
        let mut parser = Parser::new("type M [][]int\nvar x : M");
        let program = parser.parse_program().unwrap();
        let (interner, types, _) = parser.into_parts();
        let Decl::Var(v) = &program.decls[1] else {
            panic!("expected var decl");
        };
        assert_eq!(types.signature(types.resolved(v.ty), &interner), "[[I");
    }

    #[test]
    fn lexer_error_surfaces_through_parser() {
        let err = parse_err("func main() { var x:int\n x = 1 & 2 }");
        assert!(matches!(err, ParserError::Lexer(_)));
    }

    #[test]
    fn missing_main_paren_is_an_error() {
        let err = parse_err("func main( { }");
        assert!(matches!(err, ParserError::ExpectedToken { .. }));
    }

    #[test]
    fn backtracking_restores_exactly() {
        // `f(1)` first speculates as an assignment (fails at '('), then
        // reparses as an expression from the same token.
        let program = parse("func main() { f(1) }");
        let body = main_body(&program);
        let Stmt::Expr(expr) = &body.stmts[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { args, .. } = &expr.kind else {
            panic!("expected call");
        };
        assert!(matches!(args[0].kind, ExprKind::IntConst(1)));
    }

    #[test]
    fn index_assignment_speculation() {
        let program = parse("func main() { a := []int{1}\n a[0] = 2 }");
        let body = main_body(&program);
        let Stmt::Assign(assign) = &body.stmts[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(assign.dst.kind, ExprKind::IndexRef { .. }));
    }
}
