//! Semantic checker.
//!
//! A first pass over the tree that binds names and validates every
//! reference, so evaluation never has to repeat these checks:
//!
//! - declarations may not collide with a built-in or an existing name
//!   in the same scope,
//! - every reference and `input` target must resolve to a variable,
//! - call targets must resolve to functions with matching arity.
//!
//! Function bodies are checked at their call sites, with the formal
//! parameters declared in a fresh scope. Each call node carries a
//! `checked` latch, so self- and mutually-recursive calls terminate.
//! Lookup mirrors the evaluator: the innermost scope, then the global
//! scope, nothing in between.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::builtins;
use crate::error::{Error, Result};
use crate::syntax::ast;
use crate::value::{self, Value};

pub fn check(module: &ast::Module<'_>) -> Result<()> {
  let mut checker = Checker::new();
  checker.module(module)
}

enum Binding<'src> {
  Var,
  Func(Rc<ast::Func<'src>>),
}

struct Checker<'src> {
  scopes: Vec<IndexMap<String, Binding<'src>>>,
}

impl<'src> Checker<'src> {
  fn new() -> Self {
    Self {
      scopes: vec![IndexMap::new()],
    }
  }

  fn module(&mut self, module: &ast::Module<'src>) -> Result<()> {
    self
      .stmts(&module.body)
      .map_err(|e| e.in_module(&module.name))
  }

  fn stmts(&mut self, stmts: &[ast::Stmt<'src>]) -> Result<()> {
    for stmt in stmts {
      self.stmt(stmt)?;
    }
    Ok(())
  }

  fn stmt(&mut self, stmt: &ast::Stmt<'src>) -> Result<()> {
    match &**stmt {
      ast::StmtKind::Decl(decl) => {
        for var in &decl.vars {
          if let Some(init) = &var.init {
            self.expr(init)?;
            validate_literal_init(decl.ty, init)?;
          }
          self.declare(&var.name, Binding::Var)?;
        }
        Ok(())
      }
      ast::StmtKind::Func(func) => self.declare(&func.name, Binding::Func(func.clone())),
      ast::StmtKind::If(node) => {
        self.expr(&node.cond)?;
        self.stmts(&node.then)?;
        if let Some(alt) = &node.alt {
          self.stmts(alt)?;
        }
        Ok(())
      }
      ast::StmtKind::While(node) => {
        self.expr(&node.cond)?;
        self.stmts(&node.body)
      }
      ast::StmtKind::DoWhile(node) => {
        self.stmts(&node.body)?;
        self.expr(&node.cond)
      }
      ast::StmtKind::For(node) => {
        self.expr(&node.iter)?;
        // The loop variable springs into existence on first use and
        // outlives the loop.
        match self.resolve(node.target.as_ref()) {
          Some(Binding::Var) => {}
          Some(Binding::Func(_)) => {
            return Err(Error::type_(
              format!("`{}` is not a variable", node.target),
              node.target.span,
            ));
          }
          None => {
            self.declare(&node.target, Binding::Var)?;
          }
        }
        self.stmts(&node.body)
      }
      ast::StmtKind::Print(node) => {
        for value in &node.values {
          self.expr(value)?;
        }
        Ok(())
      }
      ast::StmtKind::Input(node) => {
        for target in &node.targets {
          match self.resolve(target.name.as_ref()) {
            Some(Binding::Var) => {}
            Some(Binding::Func(_)) => {
              return Err(Error::type_(
                format!("`{}` is not a variable", target.name),
                target.name.span,
              ));
            }
            None => {
              return Err(Error::name(
                format!("identifier `{}` is not declared", target.name),
                target.name.span,
              ));
            }
          }
        }
        Ok(())
      }
      ast::StmtKind::Import(node) => self
        .stmts(&node.body.body)
        .map_err(|e| e.in_module(&node.body.name)),
      ast::StmtKind::Return(node) => {
        if let Some(value) = &node.value {
          self.expr(value)?;
        }
        Ok(())
      }
      ast::StmtKind::Break | ast::StmtKind::Continue | ast::StmtKind::Pass => Ok(()),
      ast::StmtKind::Expr(expr) => self.expr(expr),
    }
  }

  fn expr(&mut self, expr: &ast::Expr<'src>) -> Result<()> {
    match &expr.kind {
      ast::ExprKind::Literal(lit) => {
        if let ast::Literal::List(items) = &**lit {
          for item in items {
            self.expr(item)?;
          }
        }
      }
      ast::ExprKind::Binary(node) => {
        self.expr(&node.left)?;
        self.expr(&node.right)?;
      }
      ast::ExprKind::Unary(node) => self.expr(&node.right)?,
      ast::ExprKind::GetVar(node) => match self.resolve(node.name.as_ref()) {
        Some(Binding::Var) => {}
        Some(Binding::Func(_)) => {
          return Err(Error::type_(
            format!("`{}` is not a variable", node.name),
            node.name.span,
          ));
        }
        None => {
          return Err(Error::name(
            format!("identifier `{}` is not declared", node.name),
            node.name.span,
          ));
        }
      },
      ast::ExprKind::Assign(node) => {
        self.expr(&node.target)?;
        self.expr(&node.value)?;
      }
      ast::ExprKind::Index(node) => {
        self.expr(&node.target)?;
        self.expr(&node.index)?;
      }
      ast::ExprKind::Slice(node) => {
        self.expr(&node.target)?;
        if let Some(start) = &node.start {
          self.expr(start)?;
        }
        if let Some(end) = &node.end {
          self.expr(end)?;
        }
      }
      ast::ExprKind::Call(node) => self.call(node)?,
      ast::ExprKind::Comma(items) => {
        for item in items {
          self.expr(item)?;
        }
      }
    }

    if let Some(method) = &expr.method {
      for arg in &method.args {
        self.expr(arg)?;
      }
    }

    Ok(())
  }

  fn call(&mut self, node: &ast::Call<'src>) -> Result<()> {
    for arg in &node.args {
      self.expr(arg)?;
    }

    if node.builtin {
      let builtin = builtins::lookup(node.name.as_ref())
        .expect("call was tagged builtin at parse time");
      if node.args.len() != builtin.arity {
        return Err(Error::syntax(
          format!(
            "{}() takes {} argument{} but {} were given",
            builtin.name,
            builtin.arity,
            if builtin.arity == 1 { "" } else { "s" },
            node.args.len()
          ),
          node.name.span,
        ));
      }
      return Ok(());
    }

    let func = match self.resolve(node.name.as_ref()) {
      Some(Binding::Func(func)) => func.clone(),
      Some(Binding::Var) => {
        return Err(Error::type_(
          format!("`{}` is not a function", node.name),
          node.name.span,
        ));
      }
      None => {
        return Err(Error::name(
          format!("function `{}` is not declared", node.name),
          node.name.span,
        ));
      }
    };

    if node.args.len() != func.params.len() {
      return Err(Error::syntax(
        format!(
          "{}() takes {} argument{} but {} were given",
          node.name,
          func.params.len(),
          if func.params.len() == 1 { "" } else { "s" },
          node.args.len()
        ),
        node.name.span,
      ));
    }

    if !node.checked.get() {
      node.checked.set(true);
      self.scopes.push(IndexMap::new());
      for param in &func.params {
        self.declare(param, Binding::Var)?;
      }
      let result = self.stmts(&func.body);
      self.scopes.pop();
      result?;
    }

    Ok(())
  }

  fn declare(&mut self, name: &ast::Ident<'src>, binding: Binding<'src>) -> Result<()> {
    if builtins::lookup(name.as_ref()).is_some() {
      return Err(Error::name(
        format!("cannot redefine built-in `{name}`"),
        name.span,
      ));
    }
    let scope = self.scopes.last_mut().unwrap();
    if scope.contains_key(name.as_ref()) {
      return Err(Error::name(
        format!("`{name}` is already declared"),
        name.span,
      ));
    }
    scope.insert(name.to_string(), binding);
    Ok(())
  }

  /// Innermost scope, then global. Scopes in between are invisible.
  fn resolve(&self, name: &str) -> Option<&Binding<'src>> {
    let innermost = self.scopes.last().unwrap();
    if let Some(binding) = innermost.get(name) {
      return Some(binding);
    }
    if self.scopes.len() > 1 {
      return self.scopes[0].get(name);
    }
    None
  }
}

/// A literal initializer must convert to the declared type; trying the
/// conversion now surfaces a ValueError before anything runs.
fn validate_literal_init(ty: ast::TypeName, init: &ast::Expr<'_>) -> Result<()> {
  let ast::ExprKind::Literal(lit) = &init.kind else {
    return Ok(());
  };
  if init.method.is_some() {
    return Ok(());
  }
  let value = match &**lit {
    ast::Literal::Char(c) => Value::Char(*c),
    ast::Literal::Int(i) => Value::Int(*i),
    ast::Literal::Float(f) => Value::Float(*f),
    ast::Literal::Str(s) => Value::Str(s.clone().into_bytes()),
    // List elements were visited as expressions already.
    ast::Literal::List(_) => return Ok(()),
  };
  value::convert(&Value::default_for(ty), &value, init.span)?;
  Ok(())
}

#[cfg(test)]
mod tests;
