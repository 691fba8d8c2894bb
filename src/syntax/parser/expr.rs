use super::*;
use crate::builtins;

impl<'a, 'src> Parser<'a, 'src> {
  /// Full expression, comma level included.
  pub(super) fn expr(&mut self) -> Result<ast::Expr<'src>> {
    let first = self.assign_expr()?;
    if !self.current().is(Tok_Comma) {
      return Ok(first);
    }

    let mut items = vec![first];
    while self.bump_if(Tok_Comma)? {
      items.push(self.assign_expr()?);
    }
    let span = items[0].span.join(items[items.len() - 1].span);
    Ok(ast::Expr::new(span, ast::ExprKind::Comma(items)))
  }

  /// Assignment is an expression and associates to the right, so
  /// `a = b = c = 3` binds all three names.
  pub(super) fn assign_expr(&mut self) -> Result<ast::Expr<'src>> {
    let target = self.or_expr()?;

    let Some(op) = self.assign_op() else {
      return Ok(target);
    };
    self.bump()?; // bump operator
    let op_span = self.previous().span;

    if !ast::is_assign_target(&target) {
      return Err(Error::syntax(
        "invalid assignment target",
        target.span.join(op_span),
      ));
    }

    let value = self.assign_expr()?;
    let span = target.span.join(value.span);
    Ok(ast::expr_assign(span, target, op, value))
  }

  /// `Some(None)` for plain `=`, `Some(Some(op))` for shorthand.
  #[allow(clippy::option_option)]
  fn assign_op(&self) -> Option<Option<ast::BinaryOp>> {
    let op = match self.current().kind {
      Op_Equal => None,
      Op_PlusEqual => Some(ast::BinaryOp::Add),
      Op_MinusEqual => Some(ast::BinaryOp::Sub),
      Op_StarEqual => Some(ast::BinaryOp::Mul),
      Op_SlashEqual => Some(ast::BinaryOp::Div),
      Op_PercentEqual => Some(ast::BinaryOp::Rem),
      _ => return None,
    };
    Some(op)
  }

  fn or_expr(&mut self) -> Result<ast::Expr<'src>> {
    let mut left = self.and_expr()?;
    while self.bump_if(Kw_Or)? {
      let right = self.and_expr()?;
      left = ast::expr_binary(
        left.span.join(right.span),
        ast::BinaryOp::Or,
        left,
        right,
      );
    }
    Ok(left)
  }

  fn and_expr(&mut self) -> Result<ast::Expr<'src>> {
    let mut left = self.eq_expr()?;
    while self.bump_if(Kw_And)? {
      let right = self.eq_expr()?;
      left = ast::expr_binary(
        left.span.join(right.span),
        ast::BinaryOp::And,
        left,
        right,
      );
    }
    Ok(left)
  }

  /// Equality and membership: `== != <> in`.
  fn eq_expr(&mut self) -> Result<ast::Expr<'src>> {
    let mut left = self.comp_expr()?;
    loop {
      let op = match self.current().kind {
        Op_EqualEqual => ast::BinaryOp::Eq,
        Op_BangEqual => ast::BinaryOp::Neq,
        Kw_In => ast::BinaryOp::In,
        _ => break,
      };
      self.bump()?; // bump operator
      let right = self.comp_expr()?;
      left = ast::expr_binary(left.span.join(right.span), op, left, right);
    }
    Ok(left)
  }

  fn comp_expr(&mut self) -> Result<ast::Expr<'src>> {
    let mut left = self.add_expr()?;
    loop {
      let op = match self.current().kind {
        Op_Less => ast::BinaryOp::Less,
        Op_LessEqual => ast::BinaryOp::LessEq,
        Op_More => ast::BinaryOp::More,
        Op_MoreEqual => ast::BinaryOp::MoreEq,
        _ => break,
      };
      self.bump()?; // bump operator
      let right = self.add_expr()?;
      left = ast::expr_binary(left.span.join(right.span), op, left, right);
    }
    Ok(left)
  }

  fn add_expr(&mut self) -> Result<ast::Expr<'src>> {
    let mut left = self.mul_expr()?;
    loop {
      let op = match self.current().kind {
        Op_Plus => ast::BinaryOp::Add,
        Op_Minus => ast::BinaryOp::Sub,
        _ => break,
      };
      self.bump()?; // bump operator
      let right = self.mul_expr()?;
      left = ast::expr_binary(left.span.join(right.span), op, left, right);
    }
    Ok(left)
  }

  fn mul_expr(&mut self) -> Result<ast::Expr<'src>> {
    let mut left = self.unary_expr()?;
    loop {
      let op = match self.current().kind {
        Op_Star => ast::BinaryOp::Mul,
        Op_Slash => ast::BinaryOp::Div,
        Op_Percent => ast::BinaryOp::Rem,
        _ => break,
      };
      self.bump()?; // bump operator
      let right = self.unary_expr()?;
      left = ast::expr_binary(left.span.join(right.span), op, left, right);
    }
    Ok(left)
  }

  fn unary_expr(&mut self) -> Result<ast::Expr<'src>> {
    let op = match self.current().kind {
      Op_Plus => ast::UnaryOp::Plus,
      Op_Minus => ast::UnaryOp::Minus,
      Op_Bang => ast::UnaryOp::Not,
      _ => return self.trailer_expr(),
    };
    self.bump()?; // bump operator
    let start = self.previous().span;
    let right = self.unary_expr()?;
    let span = start.join(right.span);
    Ok(ast::expr_unary(span, op, right))
  }

  /// A primary followed by any number of `[...]` subscripts and at most
  /// one `.method(args)`, which ends the trailer chain.
  fn trailer_expr(&mut self) -> Result<ast::Expr<'src>> {
    let mut expr = self.primary_expr()?;
    loop {
      match self.current().kind {
        Brk_SquareL => {
          expr = self.subscript(expr)?;
        }
        Op_Dot => {
          self.bump()?; // bump `.`
          let name = self.ident()?;
          let args = self.call_args()?;
          let end = self.previous().span;
          expr.span = expr.span.join(end);
          expr.method = Some(Box::new(ast::MethodCall { name, args }));
          break;
        }
        _ => break,
      }
    }
    Ok(expr)
  }

  /// `expr[index]` or `expr[start:end]` with either bound optional.
  fn subscript(&mut self, target: ast::Expr<'src>) -> Result<ast::Expr<'src>> {
    self.expect(Brk_SquareL)?;

    if self.bump_if(Tok_Colon)? {
      let end = self.slice_bound()?;
      self.expect(Brk_SquareR)?;
      let span = target.span.join(self.previous().span);
      return Ok(ast::expr_slice(span, target, None, end));
    }

    let first = self.assign_expr()?;
    if self.bump_if(Tok_Colon)? {
      let end = self.slice_bound()?;
      self.expect(Brk_SquareR)?;
      let span = target.span.join(self.previous().span);
      return Ok(ast::expr_slice(span, target, Some(first), end));
    }

    self.expect(Brk_SquareR)?;
    let span = target.span.join(self.previous().span);
    Ok(ast::expr_index(span, target, first))
  }

  fn slice_bound(&mut self) -> Result<Option<ast::Expr<'src>>> {
    if self.current().is(Brk_SquareR) {
      Ok(None)
    } else {
      Ok(Some(self.assign_expr()?))
    }
  }

  fn primary_expr(&mut self) -> Result<ast::Expr<'src>> {
    self.check_recursion_limit(self.current().span)?;

    if self.bump_if(Lit_Int)? {
      let token = self.previous();
      return ast::lit::int(token.span, self.lex.lexeme(token));
    }

    if self.bump_if(Lit_Float)? {
      let token = self.previous();
      return ast::lit::float(token.span, self.lex.lexeme(token));
    }

    if self.bump_if(Lit_Char)? {
      let token = self.previous();
      return ast::lit::char(token.span, self.lex.lexeme(token));
    }

    if self.bump_if(Lit_String)? {
      let token = self.previous();
      return ast::lit::str(token.span, self.lex.lexeme(token));
    }

    if self.bump_if(Brk_SquareL)? {
      let start = self.previous().span;

      let mut items = vec![];
      if !self.current().is(Brk_SquareR) {
        items.push(self.assign_expr()?);
        while self.bump_if(Tok_Comma)? && !self.current().is(Brk_SquareR) {
          items.push(self.assign_expr()?);
        }
      }

      self.expect(Brk_SquareR)?;
      let span = start.join(self.previous().span);
      return Ok(ast::expr_list(span, items));
    }

    if self.current().is(Lit_Ident) {
      let name = self.ident()?;
      if self.current().is(Brk_ParenL) {
        let args = self.call_args()?;
        let span = name.span.join(self.previous().span);
        let builtin = builtins::lookup(name.as_ref()).is_some();
        return Ok(ast::expr_call(span, name, args, builtin));
      }
      return Ok(ast::expr_get_var(name));
    }

    if self.bump_if(Brk_ParenL)? {
      let expr = self.expr()?;
      self.expect(Brk_ParenR)?;
      return Ok(expr);
    }

    Err(Error::syntax(
      format!("unexpected token `{}`", self.current().kind.name()),
      self.current().span,
    ))
  }

  fn call_args(&mut self) -> Result<Vec<ast::Expr<'src>>> {
    let mut args = vec![];
    self.expect(Brk_ParenL)?;
    if !self.current().is(Brk_ParenR) {
      args.push(self.assign_expr()?);
      while self.bump_if(Tok_Comma)? && !self.current().is(Brk_ParenR) {
        args.push(self.assign_expr()?);
      }
    }
    self.expect(Brk_ParenR)?;
    Ok(args)
  }
}
