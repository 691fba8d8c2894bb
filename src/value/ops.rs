//! Polymorphic operator dispatch.
//!
//! Binary operators look at both operand types: numerics coerce (float
//! beats int beats char), strings concatenate, lists concatenate, and a
//! numeric paired with a sequence repeats it. `and`/`or` work on the
//! already-evaluated operands, so there is no short-circuiting.

use std::cmp::Ordering;

use crate::error::{Error, Result, Span};
use crate::syntax::ast::BinaryOp;

use super::Value;

/// Numeric view of a value for coercion.
#[derive(Clone, Copy)]
enum Num {
  Char(i64),
  Int(i64),
  Float(f64),
}

impl Num {
  fn of(v: &Value) -> Option<Num> {
    match v {
      Value::Char(c) => Some(Num::Char(*c as i64)),
      Value::Int(i) => Some(Num::Int(*i)),
      Value::Float(f) => Some(Num::Float(*f)),
      _ => None,
    }
  }

  fn as_f64(self) -> f64 {
    match self {
      Num::Char(v) | Num::Int(v) => v as f64,
      Num::Float(v) => v,
    }
  }

  fn as_i64(self) -> i64 {
    match self {
      Num::Char(v) | Num::Int(v) => v,
      Num::Float(v) => v as i64,
    }
  }

  fn is_float(self) -> bool {
    matches!(self, Num::Float(_))
  }

  fn is_int(self) -> bool {
    matches!(self, Num::Int(_))
  }

  fn is_zero(self) -> bool {
    match self {
      Num::Char(v) | Num::Int(v) => v == 0,
      Num::Float(v) => v == 0.0,
    }
  }
}

pub fn binary(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Result<Value> {
  match op {
    BinaryOp::Add => add(lhs, rhs, span),
    BinaryOp::Sub => arith(op, lhs, rhs, span),
    BinaryOp::Mul => mul(lhs, rhs, span),
    BinaryOp::Div => arith(op, lhs, rhs, span),
    BinaryOp::Rem => arith(op, lhs, rhs, span),
    BinaryOp::Eq => Ok(Value::Int(eq(lhs, rhs) as i64)),
    BinaryOp::Neq => Ok(Value::Int(!eq(lhs, rhs) as i64)),
    BinaryOp::Less => compare(op, lhs, rhs, span),
    BinaryOp::LessEq => compare(op, lhs, rhs, span),
    BinaryOp::More => compare(op, lhs, rhs, span),
    BinaryOp::MoreEq => compare(op, lhs, rhs, span),
    // Both operands are already evaluated; `and`/`or` never
    // short-circuit.
    BinaryOp::And => Ok(Value::Int((lhs.truthy() && rhs.truthy()) as i64)),
    BinaryOp::Or => Ok(Value::Int((lhs.truthy() || rhs.truthy()) as i64)),
    BinaryOp::In => membership(lhs, rhs, span),
  }
}

fn add(lhs: &Value, rhs: &Value, span: Span) -> Result<Value> {
  if lhs.is_numeric() && rhs.is_numeric() {
    return arith(BinaryOp::Add, lhs, rhs, span);
  }
  // Either operand a string: concatenate via to-string coercion.
  if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) {
    let mut out = lhs.to_bytes();
    out.extend_from_slice(&rhs.to_bytes());
    return Ok(Value::Str(out));
  }
  if let (Value::List(a), Value::List(b)) = (lhs, rhs) {
    let items = a
      .iter()
      .chain(b.iter())
      .map(|item| item.borrow().deep_copy().new_ref())
      .collect();
    return Ok(Value::List(items));
  }
  Err(type_error(BinaryOp::Add, lhs, rhs, span))
}

fn mul(lhs: &Value, rhs: &Value, span: Span) -> Result<Value> {
  if lhs.is_numeric() && rhs.is_numeric() {
    return arith(BinaryOp::Mul, lhs, rhs, span);
  }
  let (count, seq) = if lhs.is_numeric() {
    (lhs, rhs)
  } else {
    (rhs, lhs)
  };
  let Some(count) = count.as_index() else {
    return Err(type_error(BinaryOp::Mul, lhs, rhs, span));
  };
  // Negative counts clamp to zero.
  let count = count.max(0) as usize;
  match seq {
    Value::Str(s) => Ok(Value::Str(s.repeat(count))),
    Value::List(items) => {
      let mut out = Vec::with_capacity(items.len() * count);
      for _ in 0..count {
        out.extend(
          items
            .iter()
            .map(|item| item.borrow().deep_copy().new_ref()),
        );
      }
      Ok(Value::List(out))
    }
    _ => Err(type_error(BinaryOp::Mul, lhs, rhs, span)),
  }
}

fn arith(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Result<Value> {
  let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) else {
    return Err(type_error(op, lhs, rhs, span));
  };

  if op == BinaryOp::Rem && (a.is_float() || b.is_float()) {
    return Err(Error::new(
      crate::error::ErrorKind::ModNotAllowed,
      "`%` is not allowed on float operands",
      span,
    ));
  }

  if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b.is_zero() {
    return Err(Error::new(
      crate::error::ErrorKind::DivisionByZero,
      "division by zero",
      span,
    ));
  }

  // Result type: float if either is float, else int if either is int,
  // else char.
  if a.is_float() || b.is_float() {
    let (a, b) = (a.as_f64(), b.as_f64());
    let v = match op {
      BinaryOp::Add => a + b,
      BinaryOp::Sub => a - b,
      BinaryOp::Mul => a * b,
      BinaryOp::Div => a / b,
      _ => unreachable!("non-arithmetic operator"),
    };
    Ok(Value::Float(v))
  } else {
    let (x, y) = (a.as_i64(), b.as_i64());
    let v = match op {
      BinaryOp::Add => x.wrapping_add(y),
      BinaryOp::Sub => x.wrapping_sub(y),
      BinaryOp::Mul => x.wrapping_mul(y),
      BinaryOp::Div => x.wrapping_div(y),
      BinaryOp::Rem => x.wrapping_rem(y),
      _ => unreachable!("non-arithmetic operator"),
    };
    if a.is_int() || b.is_int() {
      Ok(Value::Int(v))
    } else {
      Ok(Value::Char(v as u8))
    }
  }
}

/// Deep value equality. Numerics compare after coercion; any other
/// type mismatch is simply unequal, never an error.
pub fn eq(lhs: &Value, rhs: &Value) -> bool {
  if let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) {
    if a.is_float() || b.is_float() {
      return a.as_f64() == b.as_f64();
    }
    return a.as_i64() == b.as_i64();
  }
  match (lhs, rhs) {
    (Value::Str(a), Value::Str(b)) => a == b,
    (Value::List(a), Value::List(b)) => {
      a.len() == b.len()
        && a
          .iter()
          .zip(b.iter())
          .all(|(x, y)| eq(&x.borrow(), &y.borrow()))
    }
    (Value::None, Value::None) => true,
    _ => false,
  }
}

fn compare(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Result<Value> {
  let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) else {
    return Err(type_error(op, lhs, rhs, span));
  };

  let ord = if a.is_float() || b.is_float() {
    a.as_f64().partial_cmp(&b.as_f64())
  } else {
    Some(a.as_i64().cmp(&b.as_i64()))
  };

  // NaN compares false against everything.
  let truth = match ord {
    Some(Ordering::Less) => matches!(op, BinaryOp::Less | BinaryOp::LessEq),
    Some(Ordering::Equal) => matches!(op, BinaryOp::LessEq | BinaryOp::MoreEq),
    Some(Ordering::Greater) => matches!(op, BinaryOp::More | BinaryOp::MoreEq),
    None => false,
  };
  Ok(Value::Int(truth as i64))
}

/// `x in seq` — the right operand must be a string or a list.
fn membership(lhs: &Value, rhs: &Value, span: Span) -> Result<Value> {
  let found = match rhs {
    Value::Str(s) => s.iter().any(|b| eq(lhs, &Value::Char(*b))),
    Value::List(items) => items.iter().any(|item| eq(lhs, &item.borrow())),
    _ => {
      return Err(Error::type_(
        format!("`in` requires a sequence, not `{}`", rhs.type_name()),
        span,
      ))
    }
  };
  Ok(Value::Int(found as i64))
}

pub fn not(v: &Value) -> Value {
  Value::Int(!v.truthy() as i64)
}

pub fn negate(v: &Value, span: Span) -> Result<Value> {
  arith(BinaryOp::Sub, &Value::Int(0), v, span)
}

fn type_error(op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Error {
  Error::type_(
    format!(
      "unsupported operand types for `{}`: `{}` and `{}`",
      op_name(op),
      lhs.type_name(),
      rhs.type_name()
    ),
    span,
  )
}

fn op_name(op: BinaryOp) -> &'static str {
  match op {
    BinaryOp::Add => "+",
    BinaryOp::Sub => "-",
    BinaryOp::Mul => "*",
    BinaryOp::Div => "/",
    BinaryOp::Rem => "%",
    BinaryOp::Eq => "==",
    BinaryOp::Neq => "!=",
    BinaryOp::Less => "<",
    BinaryOp::LessEq => "<=",
    BinaryOp::More => ">",
    BinaryOp::MoreEq => ">=",
    BinaryOp::And => "and",
    BinaryOp::Or => "or",
    BinaryOp::In => "in",
  }
}
