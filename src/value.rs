//! Runtime values.
//!
//! A value is a tagged variant behind a shared, reference-counted cell.
//! Bindings, list slots and the evaluator all hold `ValueRef`s; cloning
//! one bumps the count, dropping the last releases the value. Lists
//! deep-copy on insertion, so a value can never reach itself and plain
//! reference counting is enough.
//!
//! Subscripting a list hands out a clone of the slot's own `Rc`, which
//! is the write-through handle assignment needs for `l[i] = v`.

pub mod index;
pub mod method;
pub mod ops;

use std::cell::RefCell;
use std::fmt::{self, Display, Write};
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{Error, Result, Span};
use crate::syntax::ast::TypeName;

pub type ValueRef = Rc<RefCell<Value>>;

#[derive(Clone, Debug, Default)]
pub enum Value {
  Char(u8),
  Int(i64),
  Float(f64),
  /// A mutable owned byte string. Indexing and `ord`/`chr` work on
  /// bytes; display decodes lossily.
  Str(Vec<u8>),
  List(Vec<ValueRef>),
  #[default]
  None,
}

impl Value {
  pub fn new_ref(self) -> ValueRef {
    Rc::new(RefCell::new(self))
  }

  /// The declared-type default: zero for numerics, `""`, `[]`.
  pub fn default_for(ty: TypeName) -> Value {
    match ty {
      TypeName::Char => Value::Char(0),
      TypeName::Int => Value::Int(0),
      TypeName::Float => Value::Float(0.0),
      TypeName::Str => Value::Str(Vec::new()),
      TypeName::List => Value::List(vec![]),
    }
  }

  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Char(_) => "char",
      Value::Int(_) => "int",
      Value::Float(_) => "float",
      Value::Str(_) => "str",
      Value::List(_) => "list",
      Value::None => "none",
    }
  }

  pub fn is_numeric(&self) -> bool {
    matches!(self, Value::Char(_) | Value::Int(_) | Value::Float(_))
  }

  /// Chars and ints can be used as list/string indices and counts.
  pub fn as_index(&self) -> Option<i64> {
    match self {
      Value::Char(c) => Some(*c as i64),
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }

  /// `false` for numeric zero, NaN, the empty string, the empty list
  /// and `none`.
  pub fn truthy(&self) -> bool {
    match self {
      Value::Char(c) => *c != 0,
      Value::Int(i) => *i != 0,
      Value::Float(f) => !f.is_nan() && *f != 0.0,
      Value::Str(s) => !s.is_empty(),
      Value::List(items) => !items.is_empty(),
      Value::None => false,
    }
  }

  /// The value's printed form as raw bytes. Used by string
  /// concatenation and assignment into `str` slots.
  pub fn to_bytes(&self) -> Vec<u8> {
    match self {
      Value::Str(s) => s.clone(),
      Value::Char(c) => vec![*c],
      other => other.to_string().into_bytes(),
    }
  }

  /// Recursive copy; list elements land in fresh cells.
  pub fn deep_copy(&self) -> Value {
    match self {
      Value::List(items) => Value::List(
        items
          .iter()
          .map(|item| item.borrow().deep_copy().new_ref())
          .collect(),
      ),
      other => other.clone(),
    }
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Char(c) => f.write_char(char::from(*c)),
      Value::Int(i) => write!(f, "{i}"),
      Value::Float(v) => f.write_str(&fmt_float(*v)),
      Value::Str(s) => f.write_str(&String::from_utf8_lossy(s)),
      Value::List(items) => {
        f.write_char('[')?;
        for (i, item) in items.iter().enumerate() {
          if i > 0 {
            f.write_char(',')?;
          }
          write!(f, "{}", item.borrow())?;
        }
        f.write_char(']')
      }
      Value::None => f.write_str("none"),
    }
  }
}

/// Writes `value` into `slot`, coercing to the slot's current type.
/// This is the one entry point for `=`, the shorthand operators,
/// declaration initializers and `input` rebinding; it is alias-safe,
/// so `a = a` works.
pub fn assign(slot: &ValueRef, value: &ValueRef, span: Span) -> Result<()> {
  let new = {
    let target = slot.borrow();
    let v = value.borrow();
    convert(&target, &v, span)?
  };
  *slot.borrow_mut() = new;
  Ok(())
}

/// Coerces `v` for a slot currently holding a value of `target`'s type.
pub fn convert(target: &Value, v: &Value, span: Span) -> Result<Value> {
  match target {
    Value::Char(_) => match v {
      Value::Char(c) => Ok(Value::Char(*c)),
      // Truncates to a byte.
      Value::Int(i) => Ok(Value::Char(*i as u8)),
      Value::Float(f) => Ok(Value::Char(*f as i64 as u8)),
      Value::Str(s) if s.len() == 1 => Ok(Value::Char(s[0])),
      Value::Str(_) => Err(Error::value("expected a single character", span)),
      other => Err(cannot_assign(other, "char", span)),
    },
    Value::Int(_) => match v {
      Value::Char(c) => Ok(Value::Int(*c as i64)),
      Value::Int(i) => Ok(Value::Int(*i)),
      Value::Float(f) => Ok(Value::Int(*f as i64)),
      Value::Str(s) => parse_num::<i64>(s, span).map(Value::Int),
      other => Err(cannot_assign(other, "int", span)),
    },
    Value::Float(_) => match v {
      Value::Char(c) => Ok(Value::Float(*c as f64)),
      Value::Int(i) => Ok(Value::Float(*i as f64)),
      Value::Float(f) => Ok(Value::Float(*f)),
      Value::Str(s) => parse_num::<f64>(s, span).map(Value::Float),
      other => Err(cannot_assign(other, "float", span)),
    },
    // A str slot accepts any value via to-string coercion.
    Value::Str(_) => Ok(Value::Str(v.to_bytes())),
    Value::List(_) => match v {
      Value::List(_) => Ok(v.deep_copy()),
      other => Err(cannot_assign(other, "list", span)),
    },
    // A `none` slot adopts the value; this is how `for` targets and
    // function results settle on a type.
    Value::None => Ok(v.deep_copy()),
  }
}

fn parse_num<T: FromStr>(s: &[u8], span: Span) -> Result<T>
where
  T::Err: Display,
{
  let text = String::from_utf8_lossy(s);
  text.trim().parse::<T>().map_err(|e| {
    Error::value(
      format!("cannot convert `{}` to a number: {e}", text.trim()),
      span,
    )
  })
}

fn cannot_assign(v: &Value, ty: &str, span: Span) -> Error {
  Error::type_(
    format!("cannot assign `{}` to a {ty} variable", v.type_name()),
    span,
  )
}

/// `%.15g`-style float formatting: up to 15 significant digits,
/// trailing zeros trimmed, scientific notation outside `1e-4..1e15`.
pub fn fmt_float(v: f64) -> String {
  if v.is_nan() {
    return "nan".to_string();
  }
  if v.is_infinite() {
    return if v < 0.0 { "-inf" } else { "inf" }.to_string();
  }
  if v == 0.0 {
    return "0".to_string();
  }

  let exp = v.abs().log10().floor() as i32;
  if (-4..15).contains(&exp) {
    let prec = (14 - exp).max(0) as usize;
    let mut s = format!("{v:.prec$}");
    if s.contains('.') {
      while s.ends_with('0') {
        s.pop();
      }
      if s.ends_with('.') {
        s.pop();
      }
    }
    s
  } else {
    let s = format!("{v:.14e}");
    let (mant, exp) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let mut mant = mant.to_string();
    if mant.contains('.') {
      while mant.ends_with('0') {
        mant.pop();
      }
      if mant.ends_with('.') {
        mant.pop();
      }
    }
    let exp: i32 = exp.parse().unwrap_or(0);
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{mant}e{sign}{:02}", exp.abs())
  }
}

#[cfg(test)]
mod tests;
