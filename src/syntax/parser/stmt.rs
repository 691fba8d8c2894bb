use super::*;

impl<'a, 'src> Parser<'a, 'src> {
  pub(super) fn stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.check_recursion_limit(self.current().span)?;
    match self.current().kind {
      Kw_Char => self.decl_stmt(ast::TypeName::Char),
      Kw_Int => self.decl_stmt(ast::TypeName::Int),
      Kw_Float => self.decl_stmt(ast::TypeName::Float),
      Kw_Str => self.decl_stmt(ast::TypeName::Str),
      Kw_List => self.decl_stmt(ast::TypeName::List),
      Kw_Def => self.func_stmt(),
      Kw_If => self.if_stmt(),
      Kw_While => self.while_stmt(),
      Kw_Do => self.do_stmt(),
      Kw_For => self.for_stmt(),
      Kw_Print => self.print_stmt(),
      Kw_Return => self.return_stmt(),
      Kw_Input => self.input_stmt(),
      Kw_Import => self.import_stmt(),
      Kw_Pass => self.marker_stmt(|s| ast::pass_stmt(s)),
      Kw_Break => self.marker_stmt(|s| ast::break_stmt(s)),
      Kw_Continue => self.marker_stmt(|s| ast::continue_stmt(s)),
      _ => self.expr_stmt(),
    }
  }

  /// `pass`, `break`, `continue`
  fn marker_stmt(
    &mut self,
    node: impl FnOnce(Span) -> ast::Stmt<'src>,
  ) -> Result<ast::Stmt<'src>> {
    self.bump()?;
    let span = self.previous().span;
    self.end_of_stmt()?;
    Ok(node(span))
  }

  /// `int a, b = 2 * 3, c`
  fn decl_stmt(&mut self, ty: ast::TypeName) -> Result<ast::Stmt<'src>> {
    self.bump()?; // bump type keyword
    let start = self.previous().span;

    let mut vars = vec![self.declarator()?];
    while self.bump_if(Tok_Comma)? {
      vars.push(self.declarator()?);
    }

    let end = self.previous().span;
    self.end_of_stmt()?;
    Ok(ast::decl_stmt(start.join(end), ty, vars))
  }

  fn declarator(&mut self) -> Result<ast::Declarator<'src>> {
    let name = self.ident()?;
    let init = if self.bump_if(Op_Equal)? {
      Some(self.assign_expr()?)
    } else {
      None
    };
    Ok(ast::Declarator { name, init })
  }

  fn func_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Def)?;
    let start = self.previous().span;
    let name = self.ident()?;

    self.expect(Brk_ParenL)?;
    let mut params = vec![];
    if !self.current().is(Brk_ParenR) {
      params.push(self.ident()?);
      while self.bump_if(Tok_Comma)? {
        params.push(self.ident()?);
      }
    }
    self.expect(Brk_ParenR)?;

    let body = self.block()?;
    let end = self.previous().span;
    Ok(ast::func_stmt(start.join(end), name, params, body))
  }

  fn if_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_If)?;
    let start = self.previous().span;
    let cond = self.assign_expr()?;
    let then = self.block()?;

    let alt = if self.bump_if(Kw_Else)? {
      Some(self.block()?)
    } else {
      None
    };

    let end = self.previous().span;
    Ok(ast::if_stmt(start.join(end), cond, then, alt))
  }

  fn while_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_While)?;
    let start = self.previous().span;
    let cond = self.assign_expr()?;
    let body = self.block()?;
    let end = self.previous().span;
    Ok(ast::while_stmt(start.join(end), cond, body))
  }

  /// `do` body `while` cond — the body runs at least once.
  fn do_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Do)?;
    let start = self.previous().span;
    let body = self.block()?;
    self.expect(Kw_While)?;
    let cond = self.assign_expr()?;
    let end = self.previous().span;
    self.end_of_stmt()?;
    Ok(ast::do_while_stmt(start.join(end), body, cond))
  }

  fn for_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_For)?;
    let start = self.previous().span;
    let target = self.ident()?;
    self.expect(Kw_In)?;
    let iter = self.assign_expr()?;
    let body = self.block()?;
    let end = self.previous().span;
    Ok(ast::for_stmt(start.join(end), target, iter, body))
  }

  fn print_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Print)?;
    let start = self.previous().span;

    // `print -raw ...` — needs the one token of lookahead: `-` may as
    // well start a negated expression.
    let mut raw = false;
    if self.current().is(Op_Minus) {
      let next = self.lex.peek()?.clone();
      if next.is(Lit_Ident) && self.lex.lexeme(&next) == "raw" {
        self.bump()?; // bump `-`
        self.bump()?; // bump `raw`
        raw = true;
      }
    }

    let mut values = vec![];
    if !self.current().is(Tok_Newline) {
      values.push(self.assign_expr()?);
      while self.bump_if(Tok_Comma)? {
        values.push(self.assign_expr()?);
      }
    }

    let end = self.previous().span;
    self.end_of_stmt()?;
    Ok(ast::print_stmt(start.join(end), raw, values))
  }

  fn return_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Return)?;
    let start = self.previous().span;
    let value = if self.current().is(Tok_Newline) {
      None
    } else {
      Some(self.assign_expr()?)
    };
    let end = self.previous().span;
    self.end_of_stmt()?;
    Ok(ast::return_stmt(start.join(end), value))
  }

  /// `input ["prompt"] id, ["prompt"] id, ...`
  fn input_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Input)?;
    let start = self.previous().span;

    let mut targets = vec![self.input_target()?];
    while self.bump_if(Tok_Comma)? {
      targets.push(self.input_target()?);
    }

    let end = self.previous().span;
    self.end_of_stmt()?;
    Ok(ast::input_stmt(start.join(end), targets))
  }

  fn input_target(&mut self) -> Result<ast::InputTarget<'src>> {
    let prompt = if self.bump_if(Lit_String)? {
      let token = self.previous();
      Some(ast::lit::str_value(token.span, self.lex.lexeme(token))?)
    } else {
      None
    };
    // A prompt with no identifier after it is malformed.
    let name = self.ident()?;
    Ok(ast::InputTarget { prompt, name })
  }

  /// Loads, registers and recursively parses the imported module. The
  /// imported tree hangs off the statement node; evaluation just walks
  /// it in place.
  fn import_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Import)?;
    let start = self.previous().span;
    let name = self.ident()?;
    let end = self.previous().span;
    self.end_of_stmt()?;

    if self.registry.contains(name.as_ref()) {
      return Err(Error::syntax(
        format!("module `{name}` already imported"),
        name.span,
      ));
    }

    let src = self.loader.load(name.as_ref()).map_err(|mut e| {
      if e.span.is_empty() && e.span.start == 0 {
        e.span = name.span;
      }
      e
    })?;
    self.registry.insert(name.as_ref(), Some(src));

    let body = super::parse_with(
      src,
      name.as_ref(),
      self.tab_width,
      self.loader,
      self.registry,
    )?;

    Ok(ast::import_stmt(start.join(end), name, body))
  }

  fn expr_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    let expr = self.expr()?;
    self.end_of_stmt()?;
    Ok(ast::expr_stmt(expr))
  }
}
