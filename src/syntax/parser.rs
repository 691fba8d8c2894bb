#![deny(unused_must_use)]

//! Recursive-descent parser.
//!
//! Pure LL(1) over the synthetic token stream: every grammar
//! non-terminal is one method, `bump_if` consumes on match and `expect`
//! fails with `expected X instead of Y`. Blocks are
//! `Newline Indent stmt+ Dedent`. Imports are loaded and parsed
//! recursively while the outer module is still being parsed; each
//! imported module gets its own lexer, so the outer cursor is
//! undisturbed.

use beef::lean::Cow;

use super::ast;
use super::lexer::TokenKind::*;
use super::lexer::{Lexer, Token, TokenKind, DEFAULT_TAB_WIDTH};
use crate::error::{Error, Result, Span};
use crate::module::{ModuleLoader, NoLoader, Registry};

/// Parses a standalone module with no import support.
pub fn parse<'src>(src: &'src str, name: &str) -> Result<ast::Module<'src>> {
  let mut registry = Registry::new();
  parse_with(src, name, DEFAULT_TAB_WIDTH, &NoLoader, &mut registry)
}

/// Parses a module, resolving `import` statements through `loader`.
pub fn parse_with<'src>(
  src: &'src str,
  name: &str,
  tab_width: u32,
  loader: &dyn ModuleLoader,
  registry: &mut Registry,
) -> Result<ast::Module<'src>> {
  if !registry.contains(name) {
    registry.insert(name, None);
  }
  let parser = Parser {
    lex: Lexer::new(src, tab_width).map_err(|e| e.in_module(name))?,
    module: ast::Module::new(name),
    tab_width,
    loader,
    registry,
  };
  parser.module().map_err(|e| e.in_module(name))
}

pub(super) struct Parser<'a, 'src> {
  pub(super) lex: Lexer<'src>,
  pub(super) module: ast::Module<'src>,
  pub(super) tab_width: u32,
  pub(super) loader: &'a dyn ModuleLoader,
  pub(super) registry: &'a mut Registry,
}

impl<'a, 'src> Parser<'a, 'src> {
  fn module(mut self) -> Result<ast::Module<'src>> {
    while !self.current().is(Tok_Eof) {
      let stmt = self.stmt()?;
      self.module.body.push(stmt);
    }
    Ok(self.module)
  }

  #[inline]
  pub(super) fn previous(&self) -> &Token {
    self.lex.previous()
  }

  #[inline]
  pub(super) fn current(&self) -> &Token {
    self.lex.current()
  }

  #[inline]
  pub(super) fn expect(&mut self, kind: TokenKind) -> Result<()> {
    if self.bump_if(kind)? {
      Ok(())
    } else {
      Err(Error::syntax(
        format!(
          "expected `{}` instead of `{}`",
          kind.name(),
          self.current().kind.name()
        ),
        self.current().span,
      ))
    }
  }

  #[inline]
  pub(super) fn bump_if(&mut self, kind: TokenKind) -> Result<bool> {
    if self.current().is(kind) {
      self.bump()?;
      Ok(true)
    } else {
      Ok(false)
    }
  }

  /// Move forward by one token, returning the previous one.
  #[inline]
  pub(super) fn bump(&mut self) -> Result<&Token> {
    self.lex.bump()
  }

  pub(super) fn ident(&mut self) -> Result<ast::Ident<'src>> {
    self.expect(Lit_Ident)?;
    Ok(ast::Ident::new(
      self.previous().span,
      Cow::from(self.lex.lexeme(self.previous())),
    ))
  }

  /// Every simple statement ends at a `NEWLINE`.
  pub(super) fn end_of_stmt(&mut self) -> Result<()> {
    self.expect(Tok_Newline)
  }

  /// `NEWLINE INDENT stmt+ DEDENT`
  pub(super) fn block(&mut self) -> Result<Vec<ast::Stmt<'src>>> {
    self.check_recursion_limit(self.current().span)?;
    self.expect(Tok_Newline)?;
    self.expect(Tok_Indent)?;

    let mut body = vec![self.stmt()?];
    while !self.current().is(Tok_Dedent) && !self.current().is(Tok_Eof) {
      body.push(self.stmt()?);
    }

    self.expect(Tok_Dedent)?;
    Ok(body)
  }
}

mod expr;
mod stmt;

impl<'a, 'src> Parser<'a, 'src> {
  // A single parse method consumes somewhere between 10 and 700 bytes
  // of stack space, and a deeply nested expression can recurse a few
  // dozen frames per nesting level. 64k of headroom keeps the dive
  // safe.
  #[cfg(all(not(target_family = "wasm"), feature = "check-recursion-limit"))]
  const MINIMUM_STACK_REQUIRED: usize = 64_000;

  // On WASM, remaining_stack() always returns None. Stack overflow
  // panics become exceptions handled by the host, so the check is a
  // no-op there.
  #[cfg(any(target_family = "wasm", not(feature = "check-recursion-limit")))]
  pub(super) fn check_recursion_limit(&self, _span: Span) -> Result<()> {
    Ok(())
  }

  #[cfg(all(not(target_family = "wasm"), feature = "check-recursion-limit"))]
  pub(super) fn check_recursion_limit(&self, span: Span) -> Result<()> {
    if stacker::remaining_stack()
      .map(|available| available > Self::MINIMUM_STACK_REQUIRED)
      .unwrap_or(true)
    {
      Ok(())
    } else {
      Err(Error::syntax("nesting limit reached", span))
    }
  }
}
