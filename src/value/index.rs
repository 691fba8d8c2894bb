//! Subscripts and slices.
//!
//! A single index into a list yields the slot's own cell, so writes
//! through the subscript land in the list. Strings yield a fresh char;
//! there is no write-through for strings.

use crate::error::{Error, Result, Span};

use super::{Value, ValueRef};

/// `target[index]`. Negative indices count from the end; anything out
/// of range is an IndexError.
pub fn get(target: &ValueRef, index: &Value, span: Span) -> Result<ValueRef> {
  let Some(raw) = index.as_index() else {
    return Err(Error::type_(
      format!("index must be an integer, not `{}`", index.type_name()),
      span,
    ));
  };

  let target = target.borrow();
  match &*target {
    Value::List(items) => {
      let at = resolve(raw, items.len(), span)?;
      Ok(items[at].clone())
    }
    Value::Str(s) => {
      let at = resolve(raw, s.len(), span)?;
      Ok(Value::Char(s[at]).new_ref())
    }
    other => Err(Error::type_(
      format!("value of type `{}` is not subscriptable", other.type_name()),
      span,
    )),
  }
}

/// `target[start:end]`. Missing bounds default to `0` and the maximum
/// integer; both are clamped silently after negative adjustment. The
/// result is a deep copy of the selected region.
pub fn slice(
  target: &Value,
  start: Option<&Value>,
  end: Option<&Value>,
  span: Span,
) -> Result<Value> {
  let start = bound(start, 0, span)?;
  let end = bound(end, i64::MAX, span)?;

  match target {
    Value::Str(s) => {
      let (lo, hi) = clamp(start, end, s.len());
      Ok(Value::Str(s[lo..hi].to_vec()))
    }
    Value::List(items) => {
      let (lo, hi) = clamp(start, end, items.len());
      let items = items[lo..hi]
        .iter()
        .map(|item| item.borrow().deep_copy().new_ref())
        .collect();
      Ok(Value::List(items))
    }
    other => Err(Error::type_(
      format!("value of type `{}` cannot be sliced", other.type_name()),
      span,
    )),
  }
}

fn bound(v: Option<&Value>, default: i64, span: Span) -> Result<i64> {
  match v {
    Some(v) => v.as_index().ok_or_else(|| {
      Error::type_(
        format!("slice bound must be an integer, not `{}`", v.type_name()),
        span,
      )
    }),
    None => Ok(default),
  }
}

fn resolve(raw: i64, len: usize, span: Span) -> Result<usize> {
  let adjusted = if raw < 0 { raw + len as i64 } else { raw };
  if adjusted < 0 || adjusted >= len as i64 {
    return Err(Error::index(format!("index {raw} out of range"), span));
  }
  Ok(adjusted as usize)
}

fn clamp(start: i64, end: i64, len: usize) -> (usize, usize) {
  let n = len as i64;
  let adjust = |v: i64| {
    let v = if v < 0 { v + n } else { v };
    v.clamp(0, n) as usize
  };
  let (lo, hi) = (adjust(start), adjust(end));
  (lo, hi.max(lo))
}
