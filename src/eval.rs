//! Tree evaluator.
//!
//! Statements are dispatched by a `match` on the node kind and return a
//! [`Flow`] signal; expressions return a [`ValueRef`]. Loops consume
//! `Break`/`Continue`, function calls consume `Return` — nothing is
//! signalled through globals. The checker has already validated every
//! name and arity, so resolution failures here are internal errors.

pub mod scope;


use std::io::{self, BufRead};

use self::scope::{Binding, Scopes};
use crate::error::{Error, ErrorKind, Result, Span};
use crate::syntax::ast;
use crate::value::{self, ops, Value, ValueRef};

/// Where the interpreter writes. `Any` so tests can capture a
/// `Vec<u8>` and read it back.
pub trait Stdout: io::Write + std::any::Any {
  fn as_any(&self) -> &dyn std::any::Any;
}

impl<T: io::Write + std::any::Any> Stdout for T {
  fn as_any(&self) -> &dyn std::any::Any {
    self
  }
}

pub struct Io {
  pub stdout: Box<dyn Stdout>,
  pub stdin: Box<dyn BufRead>,
}

/// Control-flow signal returned by every statement.
pub enum Flow {
  Normal,
  Break,
  Continue,
  Return(ValueRef),
}

pub struct Interp<'io, 'src> {
  scopes: Scopes<'src>,
  io: &'io mut Io,
  /// Value of the most recent expression statement; a numeric one
  /// becomes the process exit status.
  last: Option<ValueRef>,
}

impl<'io, 'src> Interp<'io, 'src> {
  pub fn new(io: &'io mut Io) -> Self {
    Self {
      scopes: Scopes::new(),
      io,
      last: None,
    }
  }

  pub fn run(&mut self, module: &ast::Module<'src>) -> Result<i64> {
    let flow = self
      .exec_block(&module.body)
      .map_err(|e| e.in_module(&module.name))?;
    // A `return` at module level stops the module; its value is the
    // program's result.
    if let Flow::Return(v) = flow {
      self.last = Some(v);
    }
    Ok(self.status())
  }

  /// Exit status: the integer value of the final result when numeric,
  /// else 0.
  pub fn status(&self) -> i64 {
    match self.last.as_ref().map(|v| v.borrow().clone()) {
      Some(Value::Char(c)) => c as i64,
      Some(Value::Int(i)) => i,
      Some(Value::Float(f)) => f as i64,
      _ => 0,
    }
  }

  pub fn scopes(&self) -> &Scopes<'src> {
    &self.scopes
  }

  /// Runs statements until one of them diverts control flow.
  fn exec_block(&mut self, stmts: &[ast::Stmt<'src>]) -> Result<Flow> {
    for stmt in stmts {
      let flow = self.exec_stmt(stmt)?;
      if !matches!(flow, Flow::Normal) {
        return Ok(flow);
      }
    }
    Ok(Flow::Normal)
  }

  fn exec_stmt(&mut self, stmt: &ast::Stmt<'src>) -> Result<Flow> {
    match &**stmt {
      ast::StmtKind::Decl(decl) => {
        for var in &decl.vars {
          let slot = Value::default_for(decl.ty).new_ref();
          if let Some(init) = &var.init {
            let rhs = self.eval_expr(init)?;
            value::assign(&slot, &rhs, init.span)?;
          }
          self.scopes.declare(var.name.as_ref(), Binding::Var(slot));
        }
        Ok(Flow::Normal)
      }
      ast::StmtKind::Func(func) => {
        self
          .scopes
          .declare(func.name.as_ref(), Binding::Func(func.clone()));
        Ok(Flow::Normal)
      }
      ast::StmtKind::If(node) => {
        let cond = self.eval_expr(&node.cond)?;
        let truthy = cond.borrow().truthy();
        if truthy {
          self.exec_block(&node.then)
        } else if let Some(alt) = &node.alt {
          self.exec_block(alt)
        } else {
          Ok(Flow::Normal)
        }
      }
      ast::StmtKind::While(node) => {
        loop {
          let cond = self.eval_expr(&node.cond)?;
          let truthy = cond.borrow().truthy();
          if !truthy {
            break;
          }
          match self.exec_block(&node.body)? {
            Flow::Break => break,
            Flow::Return(v) => return Ok(Flow::Return(v)),
            Flow::Continue | Flow::Normal => {}
          }
        }
        Ok(Flow::Normal)
      }
      ast::StmtKind::DoWhile(node) => {
        loop {
          match self.exec_block(&node.body)? {
            Flow::Break => break,
            Flow::Return(v) => return Ok(Flow::Return(v)),
            Flow::Continue | Flow::Normal => {}
          }
          let cond = self.eval_expr(&node.cond)?;
          let truthy = cond.borrow().truthy();
          if !truthy {
            break;
          }
        }
        Ok(Flow::Normal)
      }
      ast::StmtKind::For(node) => self.exec_for(node),
      ast::StmtKind::Print(node) => {
        for (i, expr) in node.values.iter().enumerate() {
          let v = self.eval_expr(expr)?;
          if !node.raw && i > 0 {
            self.write(format_args!(" "), stmt.span)?;
          }
          let v = v.borrow();
          self.write(format_args!("{}", *v), stmt.span)?;
        }
        if !node.raw {
          self.write(format_args!("\n"), stmt.span)?;
        }
        Ok(Flow::Normal)
      }
      ast::StmtKind::Input(node) => {
        for target in &node.targets {
          self.read_input(target)?;
        }
        Ok(Flow::Normal)
      }
      ast::StmtKind::Import(node) => {
        // The body was parsed during the outer parse; run it in place.
        self
          .exec_block(&node.body.body)
          .map_err(|e| e.in_module(&node.body.name))?;
        Ok(Flow::Normal)
      }
      ast::StmtKind::Return(node) => {
        let value = match &node.value {
          Some(expr) => self.eval_expr(expr)?,
          None => Value::Int(0).new_ref(),
        };
        Ok(Flow::Return(value))
      }
      ast::StmtKind::Break => Ok(Flow::Break),
      ast::StmtKind::Continue => Ok(Flow::Continue),
      ast::StmtKind::Pass => Ok(Flow::Normal),
      ast::StmtKind::Expr(expr) => {
        let v = self.eval_expr(expr)?;
        self.last = Some(v);
        Ok(Flow::Normal)
      }
    }
  }

  /// `for id in seq` — `id` is bound to `none`, then to each element:
  /// the slot itself for lists (so assignment writes into the list), a
  /// fresh char for strings. The binding outlives the loop.
  fn exec_for(&mut self, node: &ast::For<'src>) -> Result<Flow> {
    let seq = self.eval_expr(&node.iter)?;
    self
      .scopes
      .rebind(node.target.as_ref(), Value::None.new_ref());

    let items: Vec<ValueRef> = match &*seq.borrow() {
      Value::List(items) => items.clone(),
      Value::Str(s) => s.iter().map(|b| Value::Char(*b).new_ref()).collect(),
      other => {
        return Err(Error::type_(
          format!("cannot iterate over `{}`", other.type_name()),
          node.iter.span,
        ));
      }
    };

    for item in items {
      self.scopes.rebind(node.target.as_ref(), item);
      match self.exec_block(&node.body)? {
        Flow::Break => break,
        Flow::Return(v) => return Ok(Flow::Return(v)),
        Flow::Continue | Flow::Normal => {}
      }
    }
    Ok(Flow::Normal)
  }

  fn read_input(&mut self, target: &ast::InputTarget<'src>) -> Result<()> {
    use std::io::Write;

    if let Some(prompt) = &target.prompt {
      self.write(format_args!("{prompt}"), target.name.span)?;
      let _ = self.io.stdout.flush();
    }

    let mut line = String::new();
    self
      .io
      .stdin
      .read_line(&mut line)
      .map_err(|e| Error::system(format!("cannot read input: {e}"), target.name.span))?;
    if line.ends_with('\n') {
      line.pop();
      if line.ends_with('\r') {
        line.pop();
      }
    }

    let slot = match self.scopes.lookup(target.name.as_ref()) {
      Some(Binding::Var(slot)) => slot.clone(),
      _ => return Err(self.design_error(&target.name)),
    };

    // The line converts with the same rules as assignment from a
    // string, into the variable's existing type.
    let new = {
      let current = slot.borrow();
      match &*current {
        Value::List(_) => {
          return Err(Error::type_(
            format!("cannot read a list from input into `{}`", target.name),
            target.name.span,
          ));
        }
        Value::None => {
          return Err(Error::type_(
            format!("`{}` has no type to read into", target.name),
            target.name.span,
          ));
        }
        current => value::convert(
          current,
          &Value::Str(line.into_bytes()),
          target.name.span,
        )?,
      }
    };
    *slot.borrow_mut() = new;
    Ok(())
  }

  fn eval_expr(&mut self, expr: &ast::Expr<'src>) -> Result<ValueRef> {
    let value = match &expr.kind {
      ast::ExprKind::Literal(lit) => self.eval_literal(lit)?,
      ast::ExprKind::Binary(node) => {
        let lhs = self.eval_expr(&node.left)?;
        let rhs = self.eval_expr(&node.right)?;
        let v = {
          let a = lhs.borrow();
          let b = rhs.borrow();
          ops::binary(node.op, &a, &b, expr.span)?
        };
        v.new_ref()
      }
      ast::ExprKind::Unary(node) => {
        let rhs = self.eval_expr(&node.right)?;
        match node.op {
          // `+x` is `x`.
          ast::UnaryOp::Plus => rhs,
          ast::UnaryOp::Minus => {
            let v = {
              let b = rhs.borrow();
              ops::negate(&b, expr.span)?
            };
            v.new_ref()
          }
          ast::UnaryOp::Not => {
            let v = ops::not(&rhs.borrow());
            v.new_ref()
          }
        }
      }
      ast::ExprKind::GetVar(node) => self.var_slot(&node.name)?,
      ast::ExprKind::Assign(node) => {
        let slot = self.eval_lvalue(&node.target)?;
        let rhs = self.eval_expr(&node.value)?;
        match node.op {
          None => value::assign(&slot, &rhs, expr.span)?,
          // Shorthand: compute `target op value`, then assign.
          Some(op) => {
            let combined = {
              let a = slot.borrow();
              let b = rhs.borrow();
              ops::binary(op, &a, &b, expr.span)?
            }
            .new_ref();
            value::assign(&slot, &combined, expr.span)?;
          }
        }
        // The target is the result, so chains assign right to left.
        slot
      }
      ast::ExprKind::Index(node) => {
        let target = self.eval_expr(&node.target)?;
        let index = self.eval_expr(&node.index)?;
        let i = index.borrow();
        value::index::get(&target, &i, expr.span)?
      }
      ast::ExprKind::Slice(node) => {
        let target = self.eval_expr(&node.target)?;
        let start = match &node.start {
          Some(e) => Some(self.eval_expr(e)?),
          None => None,
        };
        let end = match &node.end {
          Some(e) => Some(self.eval_expr(e)?),
          None => None,
        };
        let v = {
          let t = target.borrow();
          let s = start.as_ref().map(|v| v.borrow());
          let e = end.as_ref().map(|v| v.borrow());
          value::index::slice(&t, s.as_deref(), e.as_deref(), expr.span)?
        };
        v.new_ref()
      }
      ast::ExprKind::Call(node) => self.eval_call(node)?,
      ast::ExprKind::Comma(items) => {
        let mut last = None;
        for item in items {
          last = Some(self.eval_expr(item)?);
        }
        last.expect("comma expression with no operands survived parsing")
      }
    };

    // The method trailer applies to whatever the node produced.
    match &expr.method {
      None => Ok(value),
      Some(m) => {
        let mut args = Vec::with_capacity(m.args.len());
        for arg in &m.args {
          args.push(self.eval_expr(arg)?);
        }
        value::method::call(&value, m.name.as_ref(), &args, m.name.span)
      }
    }
  }

  fn eval_literal(&mut self, lit: &ast::Literal<'src>) -> Result<ValueRef> {
    let v = match lit {
      ast::Literal::Char(c) => Value::Char(*c),
      ast::Literal::Int(i) => Value::Int(*i),
      ast::Literal::Float(f) => Value::Float(*f),
      ast::Literal::Str(s) => Value::Str(s.clone().into_bytes()),
      // Every element lands in the list as a deep copy.
      ast::Literal::List(items) => {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
          let v = self.eval_expr(item)?;
          let copy = v.borrow().deep_copy();
          out.push(copy.new_ref());
        }
        Value::List(out)
      }
    };
    Ok(v.new_ref())
  }

  /// An lvalue is a writable cell: a variable's binding, or a list
  /// slot through a single index.
  fn eval_lvalue(&mut self, expr: &ast::Expr<'src>) -> Result<ValueRef> {
    match &expr.kind {
      ast::ExprKind::GetVar(node) => self.var_slot(&node.name),
      ast::ExprKind::Index(node) => {
        let target = self.eval_expr(&node.target)?;
        let index = self.eval_expr(&node.index)?;
        let i = index.borrow();
        value::index::get(&target, &i, expr.span)
      }
      _ => Err(Error::new(
        ErrorKind::Design,
        "assignment target survived parsing without being an lvalue",
        expr.span,
      )),
    }
  }

  fn eval_call(&mut self, node: &ast::Call<'src>) -> Result<ValueRef> {
    // All actual arguments are evaluated left to right, before entry.
    let mut args = Vec::with_capacity(node.args.len());
    for arg in &node.args {
      args.push(self.eval_expr(arg)?);
    }

    if node.builtin {
      return self.call_builtin(node.name.as_ref(), &args, node.name.span);
    }

    let func = match self.scopes.lookup(node.name.as_ref()) {
      Some(Binding::Func(func)) => func.clone(),
      _ => return Err(self.design_error(&node.name)),
    };

    self.scopes.push();
    for (param, arg) in func.params.iter().zip(&args) {
      // Call-by-value for every type, lists and strings included.
      let copy = arg.borrow().deep_copy().new_ref();
      self.scopes.declare(param.as_ref(), Binding::Var(copy));
    }
    let result = self.exec_block(&func.body);
    self.scopes.pop();

    match result? {
      Flow::Return(value) => Ok(value),
      // A body that falls off the end yields 0.
      _ => Ok(Value::Int(0).new_ref()),
    }
  }

  fn call_builtin(&mut self, name: &str, args: &[ValueRef], span: Span) -> Result<ValueRef> {
    match name {
      "type" => {
        let name = args[0].borrow().type_name();
        Ok(Value::Str(name.as_bytes().to_vec()).new_ref())
      }
      "chr" => {
        let Some(i) = args[0].borrow().as_index() else {
          return Err(Error::type_(
            format!("chr() expects an int, not `{}`", args[0].borrow().type_name()),
            span,
          ));
        };
        Ok(Value::Str(vec![(i & 0xFF) as u8]).new_ref())
      }
      "ord" => match &*args[0].borrow() {
        Value::Str(s) if !s.is_empty() => Ok(Value::Int(s[0] as i64).new_ref()),
        Value::Str(_) => Err(Error::index("ord() of empty string", span)),
        other => Err(Error::type_(
          format!("ord() expects a str, not `{}`", other.type_name()),
          span,
        )),
      },
      _ => Err(Error::new(
        ErrorKind::Design,
        format!("call to unknown built-in `{name}`"),
        span,
      )),
    }
  }

  fn var_slot(&self, name: &ast::Ident<'src>) -> Result<ValueRef> {
    match self.scopes.lookup(name.as_ref()) {
      Some(Binding::Var(slot)) => Ok(slot.clone()),
      _ => Err(self.design_error(name)),
    }
  }

  /// The checker resolved this name already; not finding it here is an
  /// internal invariant violation.
  fn design_error(&self, name: &ast::Ident<'src>) -> Error {
    debug_assert!(false, "`{name}` resolved during checking but not at runtime");
    Error::new(
      ErrorKind::Design,
      format!("`{name}` resolved during checking but not at runtime"),
      name.span,
    )
  }

  fn write(&mut self, args: std::fmt::Arguments<'_>, span: Span) -> Result<()> {
    use std::io::Write;
    self
      .io
      .stdout
      .write_fmt(args)
      .map_err(|e| Error::system(format!("cannot write to stdout: {e}"), span))
  }
}
