// src/runtime/interpreter.rs
//! Tree-walking execution of an analyzed program.
//!
//! Frames are pushed on function entry, nested blocks, taken `if` branches
//! and every `while` iteration, and popped on every exit path. Statements
//! evaluate to a `Flow` that carries `return`/`break` outward; call sites
//! consume `Return` and never let `Break` escape a function.

use std::io::Write;

use crate::errors::RuntimeError;
use crate::frontend::ast::*;
use crate::frontend::{Interner, Primitive, Span, Symbol, TypeData, TypeId, WellKnown};
use crate::runtime::frame::Frame;
use crate::runtime::value::Value;
use crate::sema::{Analysis, FuncKind};

/// Upper bound on the combined call/block stack depth
pub const MAX_FRAMES: usize = 1024;

/// Result of executing a statement or block
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
}

pub struct Interpreter<'a, W: Write> {
    program: &'a Program,
    analysis: &'a Analysis,
    interner: &'a Interner,
    wk: WellKnown,
    frames: Vec<Frame>,
    out: W,
}

impl<'a, W: Write> Interpreter<'a, W> {
    pub fn new(
        program: &'a Program,
        analysis: &'a Analysis,
        interner: &'a Interner,
        wk: WellKnown,
        out: W,
    ) -> Self {
        Self {
            program,
            analysis,
            interner,
            wk,
            frames: vec![Frame::new()],
            out,
        }
    }

    /// Install top-level variables into the global frame and run `main`.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;
        for decl in &program.decls {
            if let Decl::Var(var) = decl {
                self.declare_var(var);
            }
        }

        let analysis = self.analysis;
        let entry = analysis.functions.get(analysis.entry);
        let FuncKind::User { decl } = entry.kind else {
            unreachable!("entry point is a user function");
        };
        let Decl::Func(main) = &program.decls[decl] else {
            unreachable!("entry index points at a function declaration");
        };

        tracing::debug!("executing main");

        self.push_frame(main.span)?;
        let flow = self.exec_block(&main.body);
        self.pop_frame();
        flow?;

        Ok(())
    }

    /// Number of live frames; 1 means only the global frame remains
    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    // ---- frames -----------------------------------------------------------

    fn push_frame(&mut self, span: Span) -> Result<(), RuntimeError> {
        if self.frames.len() >= MAX_FRAMES {
            return Err(RuntimeError::StackOverflow {
                limit: MAX_FRAMES,
                span: span.into(),
            });
        }
        self.frames.push(Frame::new());
        Ok(())
    }

    fn pop_frame(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "popped the global frame");
    }

    pub(super) fn current_frame(&self) -> &Frame {
        self.frames.last().expect("frame stack is never empty")
    }

    fn current_frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("frame stack is never empty")
    }

    /// Read through the frame chain, innermost first
    fn lookup(&self, name: Symbol) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Nearest enclosing frame that defines the name
    fn lookup_mut(&mut self, name: Symbol) -> Option<&mut Value> {
        self.frames
            .iter_mut()
            .rev()
            .find(|frame| frame.contains(name))
            .and_then(|frame| frame.get_mut(name))
    }

    // ---- declarations -----------------------------------------------------

    fn declare_var(&mut self, decl: &VarDecl) {
        let value = match &decl.init {
            Some(VarInit::Int(v)) => Value::Int(*v),
            Some(VarInit::Str(s)) => Value::Str(s.clone()),
            Some(VarInit::IntArray(items)) => {
                Value::array(items.iter().map(|v| Value::Int(*v)).collect())
            }
            Some(VarInit::StrArray(items)) => {
                Value::array(items.iter().map(|s| Value::Str(s.clone())).collect())
            }
            None => self.default_value(decl.ty),
        };
        self.current_frame_mut().insert(decl.name, value);
    }

    /// `int` is 0, `string` is empty, arrays start empty, struct fields get
    /// primitive defaults and `Nil` otherwise.
    fn default_value(&self, ty: TypeId) -> Value {
        let types = &self.analysis.types;
        match types.get(types.resolved(ty)) {
            TypeData::Prim(Primitive::Int) => Value::Int(0),
            TypeData::Prim(Primitive::Str) => Value::Str(String::new()),
            TypeData::Prim(_) => Value::Nil,
            TypeData::Array { .. } => Value::array(Vec::new()),
            TypeData::Struct { fields, .. } => {
                let mut map = rustc_hash::FxHashMap::default();
                for field in fields {
                    let value = match types.get(types.resolved(field.ty)) {
                        TypeData::Prim(Primitive::Int) => Value::Int(0),
                        TypeData::Prim(Primitive::Str) => Value::Str(String::new()),
                        _ => Value::Nil,
                    };
                    map.insert(field.name, value);
                }
                Value::struct_fields(map)
            }
            TypeData::Undef { .. } => Value::Nil,
        }
    }

    // ---- statements -------------------------------------------------------

    fn exec_block(&mut self, block: &Block) -> Result<Flow, RuntimeError> {
        for decl in &block.vars {
            self.declare_var(decl);
        }

        for stmt in &block.stmts {
            match stmt {
                Stmt::Assign(assign) => self.exec_assign(assign)?,
                Stmt::Expr(expr) => {
                    self.eval(expr)?;
                }
                Stmt::Break(_) => return Ok(Flow::Break),
                Stmt::Return(ret) => {
                    let value = match &ret.value {
                        Some(expr) => self.eval(expr)?,
                        None => Value::Nil,
                    };
                    return Ok(Flow::Return(value));
                }
                Stmt::If(if_stmt) => match self.exec_if(if_stmt)? {
                    Flow::Normal => {}
                    flow => return Ok(flow),
                },
                Stmt::While(while_stmt) => match self.exec_while(while_stmt)? {
                    Flow::Normal => {}
                    flow => return Ok(flow),
                },
                Stmt::Block(inner) => {
                    self.push_frame(inner.span)?;
                    let flow = self.exec_block(inner);
                    self.pop_frame();
                    match flow? {
                        Flow::Normal => {}
                        flow => return Ok(flow),
                    }
                }
            }
        }

        Ok(Flow::Normal)
    }

    fn exec_if(&mut self, node: &IfStmt) -> Result<Flow, RuntimeError> {
        let cond = self.eval(&node.cond)?;
        if self.truthy(cond, node.cond.span)? {
            self.push_frame(node.then_block.span)?;
            let flow = self.exec_block(&node.then_block);
            self.pop_frame();
            return flow;
        }

        if let Some(alt) = &node.alt {
            return self.exec_if(alt);
        }

        if let Some(else_block) = &node.else_block {
            self.push_frame(else_block.span)?;
            let flow = self.exec_block(else_block);
            self.pop_frame();
            return flow;
        }

        Ok(Flow::Normal)
    }

    /// Fresh frame per iteration; `break` is consumed here, `return` passes
    /// through.
    fn exec_while(&mut self, node: &WhileStmt) -> Result<Flow, RuntimeError> {
        loop {
            let cond = self.eval(&node.cond)?;
            if !self.truthy(cond, node.cond.span)? {
                return Ok(Flow::Normal);
            }

            self.push_frame(node.body.span)?;
            let flow = self.exec_block(&node.body);
            self.pop_frame();

            match flow? {
                Flow::Normal => {}
                Flow::Break => return Ok(Flow::Normal),
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
    }

    /// The right-hand side is evaluated before the destination
    fn exec_assign(&mut self, assign: &AssignStmt) -> Result<(), RuntimeError> {
        let value = self.eval(&assign.value)?;
        self.assign_to(&assign.dst, value)
    }

    fn assign_to(&mut self, dst: &Expr, value: Value) -> Result<(), RuntimeError> {
        match &dst.kind {
            ExprKind::VarRef(name) => match self.lookup_mut(*name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(RuntimeError::UndefinedVariable {
                    name: self.interner.resolve(*name).to_string(),
                    span: dst.span.into(),
                }),
            },

            ExprKind::IndexRef { host, index } => {
                let host_value = self.eval(host)?;
                let idx = self.eval_int(index)?;
                match host_value {
                    Value::Array(items) => {
                        let mut items = items.borrow_mut();
                        let len = items.len();
                        if idx < 0 || idx as usize >= len {
                            return Err(RuntimeError::IndexOutOfRange {
                                index: idx,
                                len,
                                span: dst.span.into(),
                            });
                        }
                        items[idx as usize] = value;
                        Ok(())
                    }
                    Value::Nil => Err(RuntimeError::NilReference {
                        span: dst.span.into(),
                    }),
                    other => Err(RuntimeError::TypeMismatch {
                        expected: "array",
                        found: other.type_name(),
                        span: dst.span.into(),
                    }),
                }
            }

            ExprKind::DotRef { host, field } => {
                let host_value = self.eval(host)?;
                match host_value {
                    Value::Struct(fields) => {
                        fields.borrow_mut().insert(*field, value);
                        Ok(())
                    }
                    Value::Nil => Err(RuntimeError::NilReference {
                        span: dst.span.into(),
                    }),
                    other => Err(RuntimeError::TypeMismatch {
                        expected: "struct",
                        found: other.type_name(),
                        span: dst.span.into(),
                    }),
                }
            }

            _ => unreachable!("assignment destinations are var/dot/index references"),
        }
    }

    // ---- expressions ------------------------------------------------------

    pub(super) fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::IntConst(v) => Ok(Value::Int(*v)),
            ExprKind::StrConst(s) => Ok(Value::Str(s.clone())),

            ExprKind::VarRef(name) => match self.lookup(*name) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::UndefinedVariable {
                    name: self.interner.resolve(*name).to_string(),
                    span: expr.span.into(),
                }),
            },

            ExprKind::DotRef { host, field } => {
                let host_value = self.eval(host)?;
                match host_value {
                    Value::Struct(fields) => {
                        // absent fields read as Nil
                        Ok(fields.borrow().get(field).cloned().unwrap_or(Value::Nil))
                    }
                    Value::Nil => Err(RuntimeError::NilReference {
                        span: expr.span.into(),
                    }),
                    other => Err(RuntimeError::TypeMismatch {
                        expected: "struct",
                        found: other.type_name(),
                        span: expr.span.into(),
                    }),
                }
            }

            ExprKind::IndexRef { host, index } => {
                let idx = self.eval_int(index)?;
                let host_value = self.eval(host)?;
                match host_value {
                    Value::Array(items) => {
                        let items = items.borrow();
                        if idx < 0 || idx as usize >= items.len() {
                            return Err(RuntimeError::IndexOutOfRange {
                                index: idx,
                                len: items.len(),
                                span: expr.span.into(),
                            });
                        }
                        Ok(items[idx as usize].clone())
                    }
                    Value::Nil => Err(RuntimeError::NilReference {
                        span: expr.span.into(),
                    }),
                    other => Err(RuntimeError::TypeMismatch {
                        expected: "array",
                        found: other.type_name(),
                        span: expr.span.into(),
                    }),
                }
            }

            ExprKind::Unary { op, operand } => {
                let value = self.eval_int(operand)?;
                Ok(match op {
                    UnaryOp::Plus => Value::Int(value),
                    UnaryOp::Neg => Value::Int(value.wrapping_neg()),
                    UnaryOp::Not => Value::Int(if value == 0 { 1 } else { 0 }),
                })
            }

            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                self.binop(*op, left, right, expr.span)
            }

            ExprKind::New(ty) => {
                let types = &self.analysis.types;
                match types.get(types.resolved(*ty)) {
                    TypeData::Array { .. } => Ok(Value::array(Vec::new())),
                    TypeData::Struct { .. } => {
                        Ok(Value::struct_fields(rustc_hash::FxHashMap::default()))
                    }
                    _ => Err(RuntimeError::TypeMismatch {
                        expected: "array or struct",
                        found: "primitive",
                        span: expr.span.into(),
                    }),
                }
            }

            ExprKind::Call { .. } => self.eval_call(expr),
        }
    }

    fn eval_int(&mut self, expr: &Expr) -> Result<i64, RuntimeError> {
        match self.eval(expr)? {
            Value::Int(v) => Ok(v),
            other => Err(RuntimeError::TypeMismatch {
                expected: "int",
                found: other.type_name(),
                span: expr.span.into(),
            }),
        }
    }

    fn binop(&self, op: BinOp, left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
        match (left, right) {
            // analysis only lets '+' through for strings
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
            (Value::Int(l), Value::Int(r)) => {
                let as_flag = |b: bool| Value::Int(if b { 1 } else { 0 });
                Ok(match op {
                    BinOp::Add => Value::Int(l.wrapping_add(r)),
                    BinOp::Sub => Value::Int(l.wrapping_sub(r)),
                    BinOp::Mul => Value::Int(l.wrapping_mul(r)),
                    BinOp::Div => {
                        if r == 0 {
                            return Err(RuntimeError::DivisionByZero { span: span.into() });
                        }
                        Value::Int(l.wrapping_div(r))
                    }
                    BinOp::And => Value::Int(if l == 0 { l } else { r }),
                    BinOp::Or => Value::Int(if l != 0 { l } else { r }),
                    BinOp::Eq => as_flag(l == r),
                    BinOp::Ne => as_flag(l != r),
                    BinOp::Lt => as_flag(l < r),
                    BinOp::Le => as_flag(l <= r),
                    BinOp::Gt => as_flag(l > r),
                    BinOp::Ge => as_flag(l >= r),
                })
            }
            (l, r) => Err(RuntimeError::TypeMismatch {
                expected: l.type_name(),
                found: r.type_name(),
                span: span.into(),
            }),
        }
    }

    fn truthy(&self, value: Value, span: Span) -> Result<bool, RuntimeError> {
        match value {
            Value::Int(v) => Ok(v != 0),
            Value::Str(s) => Ok(!s.is_empty()),
            other => Err(RuntimeError::TypeMismatch {
                expected: "int or string",
                found: other.type_name(),
                span: span.into(),
            }),
        }
    }

    // ---- calls ------------------------------------------------------------

    fn eval_call(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let ExprKind::Call { args, .. } = &expr.kind else {
            unreachable!("eval_call on a non-call node");
        };

        let analysis = self.analysis;
        let target = analysis
            .call_targets
            .get(&expr.id)
            .copied()
            .expect("analysis binds every call site");
        let entry = analysis.functions.get(target);

        // arguments evaluate left to right before the frame is pushed
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }

        self.push_frame(expr.span)?;
        // positional binding; extra variadic arguments have no names and drop
        for (param, value) in entry.params.iter().zip(values) {
            self.current_frame_mut().insert(param.name, value);
        }

        let result = match entry.kind {
            FuncKind::Builtin(builtin) => self.call_builtin(builtin, expr.span),
            FuncKind::User { decl } => {
                let program = self.program;
                let Decl::Func(func) = &program.decls[decl] else {
                    unreachable!("function table indexes function declarations");
                };
                self.exec_block(&func.body).map(|flow| match flow {
                    Flow::Return(value) => value,
                    // break never crosses a call; falling off the end is void
                    Flow::Normal | Flow::Break => Value::Nil,
                })
            }
        };

        self.pop_frame();
        result
    }

    // ---- shared with the builtin implementations --------------------------

    pub(super) fn wk(&self) -> WellKnown {
        self.wk
    }

    pub(super) fn interner(&self) -> &'a Interner {
        self.interner
    }

    pub(super) fn out(&mut self) -> &mut W {
        &mut self.out
    }
}
