#![allow(clippy::needless_lifetimes)]

//! Syntax tree for Adder modules.
//!
//! Statements and expressions are tagged enums; dispatch everywhere is a
//! `match` on the kind. An expression node additionally carries the
//! optional `.method(args)` trailer the grammar allows after a primary.

use std::cell::Cell;
use std::rc::Rc;

use beef::lean::Cow;

use crate::error::{Span, Spanned};

pub type Ident<'src> = Spanned<Cow<'src, str>>;

#[derive(Debug)]
pub struct Module<'src> {
  pub name: String,
  pub body: Vec<Stmt<'src>>,
}

impl<'src> Module<'src> {
  pub fn new(name: impl ToString) -> Self {
    Self {
      name: name.to_string(),
      body: vec![],
    }
  }
}

pub type Stmt<'src> = Spanned<StmtKind<'src>>;

#[derive(Debug)]
pub enum StmtKind<'src> {
  Decl(Box<Decl<'src>>),
  Func(Rc<Func<'src>>),
  If(Box<If<'src>>),
  While(Box<While<'src>>),
  DoWhile(Box<DoWhile<'src>>),
  For(Box<For<'src>>),
  Print(Box<Print<'src>>),
  Input(Box<Input<'src>>),
  Import(Box<Import<'src>>),
  Return(Box<Return<'src>>),
  Break,
  Continue,
  Pass,
  Expr(Box<Expr<'src>>),
}

/// The five declarable types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeName {
  Char,
  Int,
  Float,
  Str,
  List,
}

impl TypeName {
  pub fn name(&self) -> &'static str {
    match self {
      TypeName::Char => "char",
      TypeName::Int => "int",
      TypeName::Float => "float",
      TypeName::Str => "str",
      TypeName::List => "list",
    }
  }
}

/// `int a, b = 1 + 2`
#[derive(Debug)]
pub struct Decl<'src> {
  pub ty: TypeName,
  pub vars: Vec<Declarator<'src>>,
}

#[derive(Debug)]
pub struct Declarator<'src> {
  pub name: Ident<'src>,
  pub init: Option<Expr<'src>>,
}

/// `def name(params)` with an indented body.
#[derive(Debug)]
pub struct Func<'src> {
  pub name: Ident<'src>,
  pub params: Vec<Ident<'src>>,
  pub body: Vec<Stmt<'src>>,
}

#[derive(Debug)]
pub struct If<'src> {
  pub cond: Expr<'src>,
  pub then: Vec<Stmt<'src>>,
  pub alt: Option<Vec<Stmt<'src>>>,
}

#[derive(Debug)]
pub struct While<'src> {
  pub cond: Expr<'src>,
  pub body: Vec<Stmt<'src>>,
}

#[derive(Debug)]
pub struct DoWhile<'src> {
  pub body: Vec<Stmt<'src>>,
  pub cond: Expr<'src>,
}

#[derive(Debug)]
pub struct For<'src> {
  pub target: Ident<'src>,
  pub iter: Expr<'src>,
  pub body: Vec<Stmt<'src>>,
}

#[derive(Debug)]
pub struct Print<'src> {
  /// `print -raw`: no separators, no trailing newline.
  pub raw: bool,
  pub values: Vec<Expr<'src>>,
}

#[derive(Debug)]
pub struct Input<'src> {
  pub targets: Vec<InputTarget<'src>>,
}

#[derive(Debug)]
pub struct InputTarget<'src> {
  pub prompt: Option<String>,
  pub name: Ident<'src>,
}

/// The imported module is parsed eagerly; evaluation just walks `body`.
#[derive(Debug)]
pub struct Import<'src> {
  pub name: Ident<'src>,
  pub body: Module<'src>,
}

#[derive(Debug)]
pub struct Return<'src> {
  pub value: Option<Expr<'src>>,
}

#[derive(Debug)]
pub struct Expr<'src> {
  pub span: Span,
  pub kind: ExprKind<'src>,
  /// At most one `.method(args)` trailer per primary.
  pub method: Option<Box<MethodCall<'src>>>,
}

impl<'src> Expr<'src> {
  pub fn new(span: impl Into<Span>, kind: ExprKind<'src>) -> Self {
    Self {
      span: span.into(),
      kind,
      method: None,
    }
  }
}

#[derive(Debug)]
pub enum ExprKind<'src> {
  Literal(Box<Literal<'src>>),
  Binary(Box<Binary<'src>>),
  Unary(Box<Unary<'src>>),
  GetVar(Box<GetVar<'src>>),
  Assign(Box<Assign<'src>>),
  Index(Box<Index<'src>>),
  Slice(Box<Slice<'src>>),
  Call(Box<Call<'src>>),
  /// `a, b, c` — evaluates left to right, yields the last value.
  Comma(Vec<Expr<'src>>),
}

#[derive(Debug)]
pub enum Literal<'src> {
  Char(u8),
  Int(i64),
  Float(f64),
  Str(String),
  List(Vec<Expr<'src>>),
}

#[derive(Debug)]
pub struct Binary<'src> {
  pub op: BinaryOp,
  pub left: Expr<'src>,
  pub right: Expr<'src>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  Eq,
  Neq,
  Less,
  LessEq,
  More,
  MoreEq,
  And,
  Or,
  In,
}

#[derive(Debug)]
pub struct Unary<'src> {
  pub op: UnaryOp,
  pub right: Expr<'src>,
}

#[derive(Clone, Copy, Debug)]
pub enum UnaryOp {
  Plus,
  Minus,
  Not,
}

#[derive(Debug)]
pub struct GetVar<'src> {
  pub name: Ident<'src>,
}

/// `target = value` and the shorthand forms. An expression: it yields
/// the target, so assignments chain right-associatively.
#[derive(Debug)]
pub struct Assign<'src> {
  pub target: Expr<'src>,
  /// `Some(op)` for `+=` and friends.
  pub op: Option<BinaryOp>,
  pub value: Expr<'src>,
}

#[derive(Debug)]
pub struct Index<'src> {
  pub target: Expr<'src>,
  pub index: Expr<'src>,
}

/// `target[start:end]`; either bound may be absent.
#[derive(Debug)]
pub struct Slice<'src> {
  pub target: Expr<'src>,
  pub start: Option<Expr<'src>>,
  pub end: Option<Expr<'src>>,
}

#[derive(Debug)]
pub struct Call<'src> {
  pub name: Ident<'src>,
  pub args: Vec<Expr<'src>>,
  /// Set at parse time when `name` is in the built-in registry.
  pub builtin: bool,
  /// Latch so recursive calls do not send the checker into a loop.
  pub checked: Cell<bool>,
}

#[derive(Debug)]
pub struct MethodCall<'src> {
  pub name: Ident<'src>,
  pub args: Vec<Expr<'src>>,
}

pub fn decl_stmt<'src>(s: impl Into<Span>, ty: TypeName, vars: Vec<Declarator<'src>>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Decl(Box::new(Decl { ty, vars })))
}

pub fn func_stmt<'src>(
  s: impl Into<Span>,
  name: Ident<'src>,
  params: Vec<Ident<'src>>,
  body: Vec<Stmt<'src>>,
) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Func(Rc::new(Func { name, params, body })))
}

pub fn if_stmt<'src>(
  s: impl Into<Span>,
  cond: Expr<'src>,
  then: Vec<Stmt<'src>>,
  alt: Option<Vec<Stmt<'src>>>,
) -> Stmt<'src> {
  Stmt::new(s, StmtKind::If(Box::new(If { cond, then, alt })))
}

pub fn while_stmt<'src>(s: impl Into<Span>, cond: Expr<'src>, body: Vec<Stmt<'src>>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::While(Box::new(While { cond, body })))
}

pub fn do_while_stmt<'src>(
  s: impl Into<Span>,
  body: Vec<Stmt<'src>>,
  cond: Expr<'src>,
) -> Stmt<'src> {
  Stmt::new(s, StmtKind::DoWhile(Box::new(DoWhile { body, cond })))
}

pub fn for_stmt<'src>(
  s: impl Into<Span>,
  target: Ident<'src>,
  iter: Expr<'src>,
  body: Vec<Stmt<'src>>,
) -> Stmt<'src> {
  Stmt::new(s, StmtKind::For(Box::new(For { target, iter, body })))
}

pub fn print_stmt<'src>(s: impl Into<Span>, raw: bool, values: Vec<Expr<'src>>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Print(Box::new(Print { raw, values })))
}

pub fn input_stmt<'src>(s: impl Into<Span>, targets: Vec<InputTarget<'src>>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Input(Box::new(Input { targets })))
}

pub fn import_stmt<'src>(s: impl Into<Span>, name: Ident<'src>, body: Module<'src>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Import(Box::new(Import { name, body })))
}

pub fn return_stmt<'src>(s: impl Into<Span>, value: Option<Expr<'src>>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Return(Box::new(Return { value })))
}

pub fn break_stmt<'src>(s: impl Into<Span>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Break)
}

pub fn continue_stmt<'src>(s: impl Into<Span>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Continue)
}

pub fn pass_stmt<'src>(s: impl Into<Span>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::Pass)
}

pub fn expr_stmt(expr: Expr) -> Stmt {
  Stmt::new(expr.span, StmtKind::Expr(Box::new(expr)))
}

pub fn expr_binary<'src>(
  s: impl Into<Span>,
  op: BinaryOp,
  left: Expr<'src>,
  right: Expr<'src>,
) -> Expr<'src> {
  Expr::new(s, ExprKind::Binary(Box::new(Binary { op, left, right })))
}

pub fn expr_unary(s: impl Into<Span>, op: UnaryOp, right: Expr) -> Expr {
  Expr::new(s, ExprKind::Unary(Box::new(Unary { op, right })))
}

pub fn expr_assign<'src>(
  s: impl Into<Span>,
  target: Expr<'src>,
  op: Option<BinaryOp>,
  value: Expr<'src>,
) -> Expr<'src> {
  Expr::new(s, ExprKind::Assign(Box::new(Assign { target, op, value })))
}

pub fn expr_get_var(name: Ident) -> Expr {
  Expr::new(name.span, ExprKind::GetVar(Box::new(GetVar { name })))
}

pub fn expr_call<'src>(
  s: impl Into<Span>,
  name: Ident<'src>,
  args: Vec<Expr<'src>>,
  builtin: bool,
) -> Expr<'src> {
  Expr::new(
    s,
    ExprKind::Call(Box::new(Call {
      name,
      args,
      builtin,
      checked: Cell::new(false),
    })),
  )
}

pub fn expr_index<'src>(s: impl Into<Span>, target: Expr<'src>, index: Expr<'src>) -> Expr<'src> {
  Expr::new(s, ExprKind::Index(Box::new(Index { target, index })))
}

pub fn expr_slice<'src>(
  s: impl Into<Span>,
  target: Expr<'src>,
  start: Option<Expr<'src>>,
  end: Option<Expr<'src>>,
) -> Expr<'src> {
  Expr::new(s, ExprKind::Slice(Box::new(Slice { target, start, end })))
}

pub fn expr_list(s: impl Into<Span>, items: Vec<Expr>) -> Expr {
  Expr::new(s, ExprKind::Literal(Box::new(Literal::List(items))))
}

/// Whether `target` may appear on the left of an assignment.
pub fn is_assign_target(target: &Expr) -> bool {
  target.method.is_none()
    && matches!(
      target.kind,
      ExprKind::GetVar(_) | ExprKind::Index(_)
    )
}

pub mod lit {
  use super::*;
  use crate::error::{Error, Result};

  pub fn int<'src>(s: impl Into<Span>, lexeme: &str) -> Result<Expr<'src>> {
    let s = s.into();
    let value = lexeme
      .parse::<i64>()
      .map_err(|e| Error::value(format!("invalid integer `{lexeme}`: {e}"), s))?;
    Ok(Expr::new(s, ExprKind::Literal(Box::new(Literal::Int(value)))))
  }

  pub fn float<'src>(s: impl Into<Span>, lexeme: &str) -> Result<Expr<'src>> {
    let s = s.into();
    let value = lexeme
      .parse::<f64>()
      .map_err(|e| Error::value(format!("invalid number `{lexeme}`: {e}"), s))?;
    Ok(Expr::new(
      s,
      ExprKind::Literal(Box::new(Literal::Float(value))),
    ))
  }

  pub fn char<'src>(s: impl Into<Span>, lexeme: &str) -> Result<Expr<'src>> {
    let s = s.into();
    let inner = lexeme
      .strip_prefix('\'')
      .and_then(|v| v.strip_suffix('\''))
      .unwrap_or(lexeme);
    let bytes = unescape(inner).map_err(|c| bad_escape(c, s))?;
    match bytes[..] {
      [b] => Ok(Expr::new(s, ExprKind::Literal(Box::new(Literal::Char(b))))),
      [] => Err(Error::syntax("empty character constant", s)),
      _ => Err(Error::syntax("character constant too long", s)),
    }
  }

  pub fn str<'src>(s: impl Into<Span>, lexeme: &str) -> Result<Expr<'src>> {
    let s = s.into();
    let text = str_value(s, lexeme)?;
    Ok(Expr::new(
      s,
      ExprKind::Literal(Box::new(Literal::Str(text))),
    ))
  }

  /// Unquoted, unescaped contents of a string literal.
  pub fn str_value(s: impl Into<Span>, lexeme: &str) -> Result<String> {
    let s = s.into();
    let inner = lexeme.strip_prefix('"').unwrap_or(lexeme);
    // An unterminated string ends at end of input with no closing quote.
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let bytes = unescape(inner).map_err(|c| bad_escape(c, s))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
  }

  fn bad_escape(c: char, s: Span) -> Error {
    Error::syntax(format!("unknown escape sequence `\\{c}`"), s)
  }

  /// Resolves the escape set `\0 \a \b \f \n \r \t \v \\ \' \"`.
  /// Returns the offending character for anything else.
  fn unescape(s: &str) -> std::result::Result<Vec<u8>, char> {
    let mut out = Vec::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
      if ch != '\\' {
        let mut buf = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        continue;
      }
      let Some(next) = chars.next() else {
        return Err('\\');
      };
      let escape = match next {
        '0' => 0x00,
        'a' => 0x07,
        'b' => 0x08,
        'f' => 0x0C,
        'n' => b'\n',
        'r' => b'\r',
        't' => b'\t',
        'v' => 0x0B,
        '\\' => b'\\',
        '\'' => b'\'',
        '"' => b'"',
        other => return Err(other),
      };
      out.push(escape);
    }
    Ok(out)
  }
}
