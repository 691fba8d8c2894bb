//! Identifier scopes.
//!
//! An append-only stack of identifier tables. The bottom entry is the
//! global scope and is never popped; a new scope is pushed for each
//! function activation. Name lookup consults the innermost scope and
//! the global scope only — enclosing function scopes are deliberately
//! invisible, which gives the language its two-level access model.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::syntax::ast::Func;
use crate::value::ValueRef;

pub enum Binding<'src> {
  Var(ValueRef),
  Func(Rc<Func<'src>>),
}

pub struct Scopes<'src> {
  stack: Vec<IndexMap<String, Binding<'src>>>,
}

impl<'src> Scopes<'src> {
  pub fn new() -> Self {
    Self {
      stack: vec![IndexMap::new()],
    }
  }

  pub fn push(&mut self) {
    self.stack.push(IndexMap::new());
  }

  pub fn pop(&mut self) {
    debug_assert!(self.stack.len() > 1, "the global scope is never popped");
    self.stack.pop();
  }

  /// Binds `name` in the innermost scope, replacing any previous
  /// binding there. Duplicate declarations were already rejected by
  /// the checker; replacement is what lets a declaration inside a loop
  /// body execute more than once.
  pub fn declare(&mut self, name: &str, binding: Binding<'src>) {
    let scope = self.stack.last_mut().unwrap();
    scope.insert(name.to_string(), binding);
  }

  /// Innermost scope, then global. Scopes in between are skipped.
  pub fn lookup(&self, name: &str) -> Option<&Binding<'src>> {
    let innermost = self.stack.last().unwrap();
    if let Some(binding) = innermost.get(name) {
      return Some(binding);
    }
    if self.stack.len() > 1 {
      return self.stack[0].get(name);
    }
    None
  }

  /// Points an existing variable binding at a new cell, or creates it
  /// in the innermost scope. This is how a `for` target walks the
  /// sequence's slots.
  pub fn rebind(&mut self, name: &str, slot: ValueRef) {
    let top = self.stack.len() - 1;
    if self.stack[top].contains_key(name) {
      self.stack[top].insert(name.to_string(), Binding::Var(slot));
      return;
    }
    if top > 0 && self.stack[0].contains_key(name) {
      self.stack[0].insert(name.to_string(), Binding::Var(slot));
      return;
    }
    self.stack[top].insert(name.to_string(), Binding::Var(slot));
  }

  /// Direct global lookup; used by tests to inspect final state.
  pub fn global(&self, name: &str) -> Option<&Binding<'src>> {
    self.stack[0].get(name)
  }

  pub fn depth(&self) -> usize {
    self.stack.len()
  }
}

impl<'src> Default for Scopes<'src> {
  fn default() -> Self {
    Self::new()
  }
}
