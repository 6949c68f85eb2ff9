// src/sema/analyzer.rs
//! Scope and type checking.
//!
//! Three phases over the parsed program: type resolution (fixed point over
//! the type table), a declaration pass installing top-level symbols, and a
//! body pass that types every statement, binds call sites to their callees
//! and inserts the one implicit coercion the language has (`string + x`
//! becomes `string + str(x)`).

use rustc_hash::FxHashMap;

use crate::errors::SemanticError;
use crate::frontend::ast::*;
use crate::frontend::{Interner, Span, Symbol, TypeData, TypeId, TypeTable, WellKnown};
use crate::sema::builtins::{Builtin, FuncEntry, FuncId, FuncKind, FuncTable, install_builtins};
use crate::sema::scope::{ScopeEntry, ScopeStack};
use crate::sema::sig::{SigElem, SigParser, compatible};

/// Result of a successful analysis. The interpreter runs off this plus the
/// (now read-only) AST.
#[derive(Debug)]
pub struct Analysis {
    pub types: TypeTable,
    pub functions: FuncTable,
    /// Callee of every call expression, the synthetic coercion calls included
    pub call_targets: FxHashMap<NodeId, FuncId>,
    /// The `main` function
    pub entry: FuncId,
}

pub struct Analyzer<'a> {
    interner: &'a Interner,
    wk: WellKnown,
    types: TypeTable,
    functions: FuncTable,
    call_targets: FxHashMap<NodeId, FuncId>,
    scopes: ScopeStack,
    loop_depth: usize,
    next_node_id: u32,
}

impl<'a> Analyzer<'a> {
    pub fn new(mut types: TypeTable, interner: &'a Interner, wk: WellKnown) -> Self {
        let mut functions = FuncTable::new();
        let mut scopes = ScopeStack::new();
        for id in install_builtins(&mut functions, &mut types, &wk) {
            scopes.insert(functions.get(id).name, ScopeEntry::Func(id));
        }

        Self {
            interner,
            wk,
            types,
            functions,
            call_targets: FxHashMap::default(),
            scopes,
            loop_depth: 0,
            next_node_id: 0,
        }
    }

    pub fn analyze(mut self, program: &mut Program) -> Result<Analysis, SemanticError> {
        self.next_node_id = program.next_node_id;

        self.resolve_types()?;

        // declaration pass
        for (idx, decl) in program.decls.iter().enumerate() {
            match decl {
                Decl::Var(v) => self.declare_var(v)?,
                Decl::Func(f) => self.declare_func(f, idx)?,
                Decl::Type(_) => {}
            }
        }

        // body pass
        for decl in program.decls.iter_mut() {
            if let Decl::Func(f) = decl {
                self.check_func(f)?;
            }
        }

        let entry = self.entry()?;
        program.next_node_id = self.next_node_id;

        tracing::debug!(
            declarations = program.decls.len(),
            call_sites = self.call_targets.len(),
            "analysis complete"
        );

        Ok(Analysis {
            types: self.types,
            functions: self.functions,
            call_targets: self.call_targets,
            entry,
        })
    }

    // ---- phase 1: type resolution ----------------------------------------

    /// Fill `Undef.resolved` slots until a pass makes no progress, then
    /// require that none are left unresolved.
    fn resolve_types(&mut self) -> Result<(), SemanticError> {
        loop {
            let mut progressed = false;

            for id in self.types.ids() {
                let TypeData::Undef {
                    name,
                    resolved: None,
                    span,
                } = self.types.get(id)
                else {
                    continue;
                };
                let (name, span) = (*name, *span);

                let Some(target) = self.types.lookup(name) else {
                    return Err(self.unresolved(name, span));
                };
                let target = self.types.resolved(target);
                if target == id {
                    continue;
                }
                if !matches!(self.types.get(target), TypeData::Undef { .. }) {
                    if let TypeData::Undef { resolved, .. } = self.types.get_mut(id) {
                        *resolved = Some(target);
                    }
                    progressed = true;
                }
            }

            if !progressed {
                break;
            }
        }

        for id in self.types.ids() {
            if let TypeData::Undef {
                name,
                resolved: None,
                span,
            } = self.types.get(id)
            {
                return Err(self.unresolved(*name, *span));
            }
        }
        Ok(())
    }

    fn unresolved(&self, name: Symbol, span: Span) -> SemanticError {
        SemanticError::UnresolvedType {
            name: self.interner.resolve(name).to_string(),
            span: span.into(),
        }
    }

    // ---- phase 2: declarations -------------------------------------------

    fn declare_var(&mut self, decl: &VarDecl) -> Result<(), SemanticError> {
        let ty = self.types.resolved(decl.ty);
        if !self.scopes.insert(decl.name, ScopeEntry::Var { ty, span: decl.span }) {
            return Err(SemanticError::DuplicateSymbol {
                name: self.name(decl.name),
                span: decl.span.into(),
            });
        }
        Ok(())
    }

    fn declare_func(&mut self, decl: &FuncDecl, idx: usize) -> Result<(), SemanticError> {
        let entry = FuncEntry {
            name: decl.name,
            params: decl
                .params
                .iter()
                .map(|p| crate::sema::ParamSig {
                    name: p.name,
                    ty: self.types.resolved(p.ty),
                })
                .collect(),
            variadic: None,
            ret: self.types.resolved(decl.ret),
            kind: FuncKind::User { decl: idx },
            span: decl.span,
        };
        let id = self.functions.add(entry);
        if !self.scopes.insert(decl.name, ScopeEntry::Func(id)) {
            return Err(SemanticError::DuplicateSymbol {
                name: self.name(decl.name),
                span: decl.span.into(),
            });
        }
        Ok(())
    }

    fn entry(&self) -> Result<FuncId, SemanticError> {
        match self.scopes.lookup(self.wk.main, false) {
            None => Err(SemanticError::MissingMain),
            Some(ScopeEntry::Var { .. }) => Err(SemanticError::MainNotAFunction),
            Some(ScopeEntry::Func(id)) => {
                let entry = self.functions.get(id);
                if entry.params.is_empty() {
                    Ok(id)
                } else {
                    Err(SemanticError::MainHasParams {
                        span: entry.span.into(),
                    })
                }
            }
        }
    }

    // ---- phase 3: bodies --------------------------------------------------

    fn check_func(&mut self, decl: &mut FuncDecl) -> Result<(), SemanticError> {
        self.scopes.push();
        let result = self.check_func_inner(decl);
        self.scopes.pop();
        result
    }

    fn check_func_inner(&mut self, decl: &mut FuncDecl) -> Result<(), SemanticError> {
        for param in &decl.params {
            self.declare_var(param)?;
        }

        let body_ty = self.check_block(&mut decl.body)?;
        let want = self.signature(decl.ret);
        let got = self.signature(body_ty);
        if want != got {
            return Err(SemanticError::ReturnTypeMismatch {
                name: self.name(decl.name),
                expected: self.describe(decl.ret),
                found: self.describe(body_ty),
                span: decl.span.into(),
            });
        }
        Ok(())
    }

    /// Type a block. The block's type is the type of its `return`, `void`
    /// otherwise; statements after a `return` are not analyzed.
    fn check_block(&mut self, block: &mut Block) -> Result<TypeId, SemanticError> {
        for decl in &block.vars {
            self.declare_var(decl)?;
        }

        let mut ret = TypeTable::VOID;
        for stmt in block.stmts.iter_mut() {
            match stmt {
                Stmt::Assign(assign) => self.check_assign(assign)?,
                Stmt::Expr(expr) => {
                    self.check_expr(expr)?;
                }
                Stmt::Break(span) => {
                    if self.loop_depth == 0 {
                        return Err(SemanticError::InvalidBreak {
                            span: (*span).into(),
                        });
                    }
                }
                Stmt::Return(r) => {
                    ret = match &mut r.value {
                        Some(expr) => self.check_expr(expr)?,
                        None => TypeTable::VOID,
                    };
                    return Ok(ret);
                }
                Stmt::If(if_stmt) => {
                    ret = self.check_if(if_stmt)?;
                }
                Stmt::While(while_stmt) => {
                    self.check_cond(&mut while_stmt.cond)?;
                    self.loop_depth += 1;
                    self.scopes.push();
                    let result = self.check_block(&mut while_stmt.body);
                    self.scopes.pop();
                    self.loop_depth -= 1;
                    ret = result?;
                }
                Stmt::Block(inner) => {
                    self.scopes.push();
                    let result = self.check_block(inner);
                    self.scopes.pop();
                    ret = result?;
                }
            }
        }

        Ok(ret)
    }

    /// Every returning branch of an `if`/`elif`/`else` chain must agree on a
    /// signature; non-returning (`void`) branches may coexist with one.
    fn check_if(&mut self, node: &mut IfStmt) -> Result<TypeId, SemanticError> {
        self.check_cond(&mut node.cond)?;

        self.scopes.push();
        let result = self.check_block(&mut node.then_block);
        self.scopes.pop();
        let then_ty = result?;
        let then_sig = self.signature(then_ty);

        if let Some(alt) = &mut node.alt {
            let alt_ty = self.check_if(alt)?;
            let alt_sig = self.signature(alt_ty);
            if alt_sig != "V" && alt_sig != then_sig {
                return Err(SemanticError::BranchTypeMismatch {
                    first: self.describe(then_ty),
                    second: self.describe(alt_ty),
                    span: node.span.into(),
                });
            }
        }

        if let Some(else_block) = &mut node.else_block {
            self.scopes.push();
            let result = self.check_block(else_block);
            self.scopes.pop();
            let else_ty = result?;
            let else_sig = self.signature(else_ty);
            if else_sig != "V" && else_sig != then_sig {
                return Err(SemanticError::BranchTypeMismatch {
                    first: self.describe(then_ty),
                    second: self.describe(else_ty),
                    span: node.span.into(),
                });
            }
        }

        Ok(then_ty)
    }

    /// Conditions must be primitive: truthiness exists for int and string only
    fn check_cond(&mut self, cond: &mut Expr) -> Result<(), SemanticError> {
        let ty = self.check_expr(cond)?;
        match self.signature(ty).as_str() {
            "I" | "S" => Ok(()),
            _ => Err(SemanticError::InvalidCondition {
                ty: self.describe(ty),
                span: cond.span.into(),
            }),
        }
    }

    fn check_assign(&mut self, assign: &mut AssignStmt) -> Result<(), SemanticError> {
        let dst_ty = self.check_expr(&mut assign.dst)?;
        let val_ty = self.check_expr(&mut assign.value)?;

        let want = self.signature(dst_ty);
        let has = self.signature(val_ty);
        if !compatible(&want, &has) {
            return Err(SemanticError::AssignTypeMismatch {
                expected: self.describe(dst_ty),
                found: self.describe(val_ty),
                span: assign.span.into(),
            });
        }
        Ok(())
    }

    fn check_expr(&mut self, expr: &mut Expr) -> Result<TypeId, SemanticError> {
        if matches!(expr.kind, ExprKind::Binary { .. }) {
            return self.check_binary(expr);
        }
        if matches!(expr.kind, ExprKind::Call { .. }) {
            return self.check_call(expr);
        }

        let span = expr.span;
        match &mut expr.kind {
            ExprKind::IntConst(_) => Ok(TypeTable::INT),
            ExprKind::StrConst(_) => Ok(TypeTable::STRING),

            ExprKind::VarRef(name) => {
                let name = *name;
                match self.scopes.lookup(name, true) {
                    Some(ScopeEntry::Var { ty, .. }) => Ok(self.types.resolved(ty)),
                    Some(ScopeEntry::Func(_)) => Err(SemanticError::NotAVariable {
                        name: self.name(name),
                        span: span.into(),
                    }),
                    None => Err(SemanticError::UndefinedVariable {
                        name: self.name(name),
                        span: span.into(),
                    }),
                }
            }

            ExprKind::DotRef { host, field } => {
                let field = *field;
                let host_ty = self.check_expr(host)?;
                let host_ty = self.types.resolved(host_ty);
                let (struct_name, field_ty) = match self.types.get(host_ty) {
                    TypeData::Struct { name, fields } => (
                        *name,
                        fields.iter().find(|f| f.name == field).map(|f| f.ty),
                    ),
                    _ => {
                        return Err(SemanticError::NotAStruct {
                            ty: self.describe(host_ty),
                            span: span.into(),
                        });
                    }
                };
                match field_ty {
                    Some(ty) => Ok(self.types.resolved(ty)),
                    None => Err(SemanticError::NoSuchField {
                        name: self.name(struct_name),
                        field: self.name(field),
                        span: span.into(),
                    }),
                }
            }

            ExprKind::IndexRef { host, index } => {
                let index_ty = self.check_expr(index)?;
                if self.signature(index_ty) != "I" {
                    return Err(SemanticError::IndexNotInt {
                        ty: self.describe(index_ty),
                        span: index.span.into(),
                    });
                }

                let host_ty = self.check_expr(host)?;
                let host_ty = self.types.resolved(host_ty);
                match self.types.get(host_ty) {
                    TypeData::Array { elem } => Ok(self.types.resolved(*elem)),
                    _ => Err(SemanticError::NotAnArray {
                        ty: self.describe(host_ty),
                        span: span.into(),
                    }),
                }
            }

            ExprKind::Unary { op, operand } => {
                let op = *op;
                let ty = self.check_expr(operand)?;
                if self.signature(ty) != "I" {
                    return Err(SemanticError::InvalidUnaryOperand {
                        op: op.as_str().to_string(),
                        ty: self.describe(ty),
                        span: span.into(),
                    });
                }
                Ok(ty)
            }

            ExprKind::New(ty) => {
                let ty = self.types.resolved(*ty);
                match self.types.get(ty) {
                    TypeData::Array { .. } | TypeData::Struct { .. } => Ok(ty),
                    _ => Err(SemanticError::NewOnPrimitive {
                        ty: self.describe(ty),
                        span: span.into(),
                    }),
                }
            }

            ExprKind::Binary { .. } | ExprKind::Call { .. } => unreachable!("handled above"),
        }
    }

    /// Operands must share a signature; `string + non-string` gets the right
    /// operand rewritten into a `str(...)` call and the node re-checked.
    /// Arithmetic and comparison are int operations; strings only concatenate.
    fn check_binary(&mut self, expr: &mut Expr) -> Result<TypeId, SemanticError> {
        loop {
            let span = expr.span;
            let ExprKind::Binary { op, left, right } = &mut expr.kind else {
                unreachable!("check_binary on non-binary node");
            };
            let op = *op;

            let left_ty = self.check_expr(left)?;
            let right_ty = self.check_expr(right)?;
            let left_sig = self.signature(left_ty);
            let right_sig = self.signature(right_ty);

            if left_sig != right_sig {
                if left_sig == "S" && op == BinOp::Add {
                    let operand = std::mem::replace(
                        right.as_mut(),
                        Expr {
                            id: NodeId(0),
                            kind: ExprKind::IntConst(0),
                            span,
                        },
                    );
                    let operand_span = operand.span;
                    **right = Expr {
                        id: self.fresh_node_id(),
                        kind: ExprKind::Call {
                            name: self.wk.str_fn,
                            args: vec![operand],
                        },
                        span: operand_span,
                    };
                    continue;
                }
                return Err(SemanticError::BinaryTypeMismatch {
                    op: op.as_str().to_string(),
                    left: self.describe(left_ty),
                    right: self.describe(right_ty),
                    span: span.into(),
                });
            }

            let mut sig = SigParser::new(&left_sig);
            return match sig.next_elem() {
                Some(SigElem::Int) => Ok(left_ty),
                Some(SigElem::Str) if op == BinOp::Add => Ok(left_ty),
                _ => Err(SemanticError::InvalidBinaryOperand {
                    op: op.as_str().to_string(),
                    ty: self.describe(left_ty),
                    span: span.into(),
                }),
            };
        }
    }

    fn check_call(&mut self, expr: &mut Expr) -> Result<TypeId, SemanticError> {
        let (id, span) = (expr.id, expr.span);
        let ExprKind::Call { name, args } = &mut expr.kind else {
            unreachable!("check_call on non-call node");
        };
        let name = *name;

        let target = match self.scopes.lookup(name, true) {
            Some(ScopeEntry::Func(target)) => target,
            Some(ScopeEntry::Var { .. }) => {
                return Err(SemanticError::NotAFunction {
                    name: self.name(name),
                    span: span.into(),
                });
            }
            None => {
                return Err(SemanticError::UndefinedFunction {
                    name: self.name(name),
                    span: span.into(),
                });
            }
        };

        let callee = self.functions.get(target);
        let params = callee.params.clone();
        let variadic = callee.variadic.is_some();
        let ret = callee.ret;
        let kind = callee.kind;

        let arity_ok = if variadic {
            args.len() >= params.len()
        } else {
            args.len() == params.len()
        };
        if !arity_ok {
            return Err(SemanticError::WrongArgumentCount {
                expected: params.len(),
                found: args.len(),
                span: span.into(),
            });
        }

        let mut first_arg_ty = None;
        for (idx, arg) in args.iter_mut().enumerate() {
            let arg_ty = self.check_expr(arg)?;
            if idx == 0 {
                first_arg_ty = Some(arg_ty);
            }
            // the variadic tail is untyped
            let Some(param) = params.get(idx) else {
                continue;
            };
            let want = self.signature(param.ty);
            let has = self.signature(arg_ty);
            if !compatible(&want, &has) {
                return Err(SemanticError::ArgumentTypeMismatch {
                    index: idx + 1,
                    expected: self.describe(param.ty),
                    found: self.describe(arg_ty),
                    span: arg.span.into(),
                });
            }
        }

        self.call_targets.insert(id, target);

        // append produces an array of the same type it was given
        if let FuncKind::Builtin(Builtin::Append) = kind {
            if let Some(ty) = first_arg_ty {
                return Ok(ty);
            }
        }

        Ok(self.types.resolved(ret))
    }

    // ---- helpers ----------------------------------------------------------

    fn fresh_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn signature(&self, ty: TypeId) -> String {
        self.types.signature(self.types.resolved(ty), self.interner)
    }

    fn describe(&self, ty: TypeId) -> String {
        self.types.describe(ty, self.interner)
    }

    fn name(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Parser;

    fn analyze(source: &str) -> Result<(Program, Analysis), SemanticError> {
        let mut parser = Parser::new(source);
        let mut program = parser.parse_program().expect("parse error");
        let (interner, types, wk) = parser.into_parts();
        let analysis = Analyzer::new(types, &interner, wk).analyze(&mut program)?;
        Ok((program, analysis))
    }

    fn analyze_err(source: &str) -> SemanticError {
        analyze(source).expect_err("expected semantic error")
    }

    #[test]
    fn minimal_program_passes() {
        let (_, analysis) = analyze("func main() { }").unwrap();
        let entry = analysis.functions.get(analysis.entry);
        assert!(matches!(entry.kind, FuncKind::User { .. }));
    }

    #[test]
    fn missing_main_is_an_error() {
        assert!(matches!(
            analyze_err("func helper() { }"),
            SemanticError::MissingMain
        ));
    }

    #[test]
    fn main_with_params_is_an_error() {
        assert!(matches!(
            analyze_err("func main(x: int) { }"),
            SemanticError::MainHasParams { .. }
        ));
    }

    #[test]
    fn main_must_be_a_function() {
        assert!(matches!(
            analyze_err("var main : int"),
            SemanticError::MainNotAFunction
        ));
    }

    #[test]
    fn duplicate_symbol_rejected() {
        assert!(matches!(
            analyze_err("var x : int\nvar x : string\nfunc main() { }"),
            SemanticError::DuplicateSymbol { .. }
        ));
        assert!(matches!(
            analyze_err("func f() { }\nfunc f() { }\nfunc main() { }"),
            SemanticError::DuplicateSymbol { .. }
        ));
    }

    #[test]
    fn undefined_variable_rejected() {
        assert!(matches!(
            analyze_err("func main() { var x:int\n x = y }"),
            SemanticError::UndefinedVariable { .. }
        ));
    }

    #[test]
    fn undefined_function_rejected() {
        assert!(matches!(
            analyze_err("func main() { missing() }"),
            SemanticError::UndefinedFunction { .. }
        ));
    }

    #[test]
    fn arity_mismatch_rejected() {
        let err = analyze_err("func f(a: int) { }\nfunc main() { f(1, 2) }");
        assert!(matches!(
            err,
            SemanticError::WrongArgumentCount {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn argument_type_mismatch_rejected() {
        assert!(matches!(
            analyze_err("func f(a: int) { }\nfunc main() { f(\"no\") }"),
            SemanticError::ArgumentTypeMismatch { index: 1, .. }
        ));
    }

    #[test]
    fn variadic_print_accepts_extra_args() {
        assert!(analyze("func main() { printn(\"x\", 1, \"y\") }").is_ok());
    }

    #[test]
    fn assign_type_mismatch_rejected() {
        assert!(matches!(
            analyze_err("func main() { var x:int\n x = \"s\" }"),
            SemanticError::AssignTypeMismatch { .. }
        ));
    }

    #[test]
    fn implicit_str_coercion_rewrites_ast() {
        let (program, analysis) =
            analyze("func main() { printn(\"n=\" + 3) }").unwrap();

        let Decl::Func(main) = &program.decls[0] else {
            panic!()
        };
        let Stmt::Expr(call) = &main.body.stmts[0] else {
            panic!()
        };
        let ExprKind::Call { args, .. } = &call.kind else {
            panic!()
        };
        let ExprKind::Binary { right, .. } = &args[0].kind else {
            panic!("expected binary format argument")
        };
        let ExprKind::Call { args: str_args, .. } = &right.kind else {
            panic!("right operand should be a str(...) call, got {:?}", right.kind)
        };
        assert!(matches!(str_args[0].kind, ExprKind::IntConst(3)));
        // the synthetic call has a target too
        assert!(analysis.call_targets.contains_key(&right.id));
    }

    #[test]
    fn no_coercion_for_int_plus_string() {
        assert!(matches!(
            analyze_err("func main() { var x:int\n x = 3 + \"s\" }"),
            SemanticError::BinaryTypeMismatch { .. }
        ));
    }

    #[test]
    fn string_ops_other_than_add_rejected() {
        assert!(matches!(
            analyze_err("func main() { var s:string\n var t:string\n s = s * t }"),
            SemanticError::InvalidBinaryOperand { .. }
        ));
    }

    #[test]
    fn mixed_comparison_rejected() {
        assert!(matches!(
            analyze_err("func main() { var x:int\n x = 1 < \"two\" }"),
            SemanticError::BinaryTypeMismatch { .. }
        ));
    }

    #[test]
    fn string_comparison_rejected() {
        assert!(matches!(
            analyze_err("func main() { var a:string\n var x:int\n x = a < a }"),
            SemanticError::InvalidBinaryOperand { .. }
        ));
    }

    #[test]
    fn unary_on_string_rejected() {
        assert!(matches!(
            analyze_err("func main() { var s:string\n s = -s }"),
            SemanticError::InvalidUnaryOperand { .. }
        ));
    }

    #[test]
    fn break_outside_loop_rejected() {
        assert!(matches!(
            analyze_err("func main() { break }"),
            SemanticError::InvalidBreak { .. }
        ));
    }

    #[test]
    fn break_inside_nested_if_in_loop_passes() {
        assert!(
            analyze("func main() { var i:int\n while 1 { if i == 3 { break }\n i = i + 1 } }")
                .is_ok()
        );
    }

    #[test]
    fn condition_must_be_primitive() {
        let err = analyze_err(
            "type P struct { x : int }\nfunc main() { var p:P\n if p { } }",
        );
        assert!(matches!(err, SemanticError::InvalidCondition { .. }));
    }

    #[test]
    fn new_on_primitive_rejected() {
        assert!(matches!(
            analyze_err("func main() { var x:int\n x = new(int) }"),
            SemanticError::NewOnPrimitive { .. }
        ));
    }

    #[test]
    fn new_struct_and_array_pass() {
        assert!(
            analyze(
                "type P struct { x : int }\nfunc main() { var p:P\n p = new(P)\n var a:[]int\n a = new([]int) }"
            )
            .is_ok()
        );
    }

    #[test]
    fn return_type_checked() {
        assert!(matches!(
            analyze_err("func f() int { return \"s\" }\nfunc main() { }"),
            SemanticError::ReturnTypeMismatch { .. }
        ));
        assert!(matches!(
            analyze_err("func f() int { }\nfunc main() { }"),
            SemanticError::ReturnTypeMismatch { .. }
        ));
        assert!(analyze("func f() int { return 1 }\nfunc main() { }").is_ok());
    }

    #[test]
    fn branches_must_agree() {
        let err = analyze_err(
            "func f() int { if 1 { return 1 } else { return \"s\" } }\nfunc main() { }",
        );
        assert!(matches!(err, SemanticError::BranchTypeMismatch { .. }));
    }

    #[test]
    fn void_branch_coexists_with_value_branch() {
        assert!(
            analyze("func f() int { if 1 { return 1 } else { }\n return 2 }\nfunc main() { }")
                .is_ok()
        );
    }

    #[test]
    fn type_cycle_rejected() {
        assert!(matches!(
            analyze_err("type A B\ntype B A\nfunc main() { }"),
            SemanticError::UnresolvedType { .. }
        ));
    }

    #[test]
    fn undefined_type_rejected() {
        assert!(matches!(
            analyze_err("var x : Ghost\nfunc main() { }"),
            SemanticError::UnresolvedType { .. }
        ));
    }

    #[test]
    fn alias_chain_resolves() {
        assert!(analyze("type A B\ntype B []int\nvar x : A\nfunc main() { x = append(x, 1) }").is_ok());
    }

    #[test]
    fn dot_ref_on_non_struct_rejected() {
        assert!(matches!(
            analyze_err("func main() { var x:int\n x = x.field }"),
            SemanticError::NotAStruct { .. }
        ));
    }

    #[test]
    fn unknown_field_rejected() {
        let err = analyze_err(
            "type P struct { x : int }\nfunc main() { var p:P\n p.y = 1 }",
        );
        assert!(matches!(err, SemanticError::NoSuchField { .. }));
    }

    #[test]
    fn index_must_be_int() {
        assert!(matches!(
            analyze_err("func main() { a := []int{1}\n var x:int\n x = a[\"0\"] }"),
            SemanticError::IndexNotInt { .. }
        ));
    }

    #[test]
    fn append_result_matches_argument() {
        // assigning append's result back requires the static type to follow
        // the array argument, not the declared [any]
        assert!(analyze("func main() { a := []int{1}\n a = append(a, 2) }").is_ok());
        assert!(matches!(
            analyze_err("func main() { a := []int{1}\n var s:[]string\n s = append(a, 2) }"),
            SemanticError::AssignTypeMismatch { .. }
        ));
    }

    #[test]
    fn every_call_site_has_a_target() {
        let (program, analysis) = analyze(
            "func add(a, b: int) int { return a + b }\nfunc main() { printn(str(add(1, 2))) }",
        )
        .unwrap();

        fn walk(expr: &Expr, hits: &mut Vec<NodeId>) {
            match &expr.kind {
                ExprKind::Call { args, .. } => {
                    hits.push(expr.id);
                    args.iter().for_each(|a| walk(a, hits));
                }
                ExprKind::Binary { left, right, .. } => {
                    walk(left, hits);
                    walk(right, hits);
                }
                ExprKind::Unary { operand, .. } => walk(operand, hits),
                ExprKind::DotRef { host, .. } => walk(host, hits),
                ExprKind::IndexRef { host, index } => {
                    walk(host, hits);
                    walk(index, hits);
                }
                _ => {}
            }
        }

        let mut calls = Vec::new();
        for decl in &program.decls {
            if let Decl::Func(f) = decl {
                for stmt in &f.body.stmts {
                    match stmt {
                        Stmt::Expr(e) => walk(e, &mut calls),
                        Stmt::Return(ReturnStmt { value: Some(e), .. }) => walk(e, &mut calls),
                        _ => {}
                    }
                }
            }
        }

        assert_eq!(calls.len(), 3);
        for id in calls {
            assert!(
                analysis.call_targets.contains_key(&id),
                "call {id:?} has no bound target"
            );
        }
    }

    #[test]
    fn recursion_and_forward_references_pass() {
        assert!(
            analyze(
                "func even(n: int) int { if n == 0 { return 1 }\n return odd(n - 1) }\nfunc odd(n: int) int { if n == 0 { return 0 }\n return even(n - 1) }\nfunc main() { printn(str(even(10))) }"
            )
            .is_ok()
        );
    }

    #[test]
    fn calling_a_variable_rejected() {
        assert!(matches!(
            analyze_err("var f : int\nfunc main() { f() }"),
            SemanticError::NotAFunction { .. }
        ));
    }

    #[test]
    fn int_conversion_call_resolves_to_builtin() {
        let (_, analysis) = analyze("func main() { printn(str(int(\"42\"))) }").unwrap();
        let builtin_calls = analysis
            .call_targets
            .values()
            .filter(|id| {
                matches!(
                    analysis.functions.get(**id).kind,
                    FuncKind::Builtin(Builtin::IntVal)
                )
            })
            .count();
        assert_eq!(builtin_calls, 1);
    }
}
