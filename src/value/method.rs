//! The `.method(args)` trailer surface: `len`, `append`, `insert`,
//! `remove`. Anything else, or a wrong argument count, is a
//! SyntaxError.

use crate::error::{Error, Result, Span};

use super::{Value, ValueRef};

pub fn call(target: &ValueRef, name: &str, args: &[ValueRef], span: Span) -> Result<ValueRef> {
  match name {
    "len" => len(target, args, span),
    "append" => append(target, args, span),
    "insert" => insert(target, args, span),
    "remove" => remove(target, args, span),
    _ => Err(unknown(target, name, span)),
  }
}

fn len(target: &ValueRef, args: &[ValueRef], span: Span) -> Result<ValueRef> {
  arity("len", args, 0, span)?;
  let n = match &*target.borrow() {
    Value::Str(s) => s.len(),
    Value::List(items) => items.len(),
    _ => return Err(unknown(target, "len", span)),
  };
  Ok(Value::Int(n as i64).new_ref())
}

fn append(target: &ValueRef, args: &[ValueRef], span: Span) -> Result<ValueRef> {
  arity("append", args, 1, span)?;
  if !matches!(&*target.borrow(), Value::List(_)) {
    return Err(unknown(target, "append", span));
  }
  // Copy first: the argument may alias the list itself.
  let item = args[0].borrow().deep_copy().new_ref();
  if let Value::List(items) = &mut *target.borrow_mut() {
    items.push(item);
  }
  Ok(Value::None.new_ref())
}

fn insert(target: &ValueRef, args: &[ValueRef], span: Span) -> Result<ValueRef> {
  arity("insert", args, 2, span)?;
  let Some(raw) = args[0].borrow().as_index() else {
    return Err(Error::type_(
      format!(
        "insert index must be an integer, not `{}`",
        args[0].borrow().type_name()
      ),
      span,
    ));
  };
  if !matches!(&*target.borrow(), Value::List(_)) {
    return Err(unknown(target, "insert", span));
  }
  let item = args[1].borrow().deep_copy().new_ref();
  if let Value::List(items) = &mut *target.borrow_mut() {
    let n = items.len() as i64;
    // Clamped, so inserting past either end degenerates to a push at
    // that end.
    let at = if raw < 0 { raw + n } else { raw }.clamp(0, n) as usize;
    items.insert(at, item);
  }
  Ok(Value::None.new_ref())
}

fn remove(target: &ValueRef, args: &[ValueRef], span: Span) -> Result<ValueRef> {
  arity("remove", args, 1, span)?;
  let Some(raw) = args[0].borrow().as_index() else {
    return Err(Error::type_(
      format!(
        "remove index must be an integer, not `{}`",
        args[0].borrow().type_name()
      ),
      span,
    ));
  };
  if !matches!(&*target.borrow(), Value::List(_)) {
    return Err(unknown(target, "remove", span));
  }
  let mut removed = None;
  if let Value::List(items) = &mut *target.borrow_mut() {
    let n = items.len() as i64;
    let at = if raw < 0 { raw + n } else { raw };
    // Out of range removes nothing.
    if (0..n).contains(&at) {
      removed = Some(items.remove(at as usize));
    }
  }
  Ok(removed.unwrap_or_else(|| Value::None.new_ref()))
}

fn arity(name: &str, args: &[ValueRef], expected: usize, span: Span) -> Result<()> {
  if args.len() == expected {
    Ok(())
  } else {
    Err(Error::syntax(
      format!(
        "{name}() takes {expected} argument{} but {} were given",
        if expected == 1 { "" } else { "s" },
        args.len()
      ),
      span,
    ))
  }
}

fn unknown(target: &ValueRef, name: &str, span: Span) -> Error {
  Error::syntax(
    format!(
      "unknown method `{name}` for type `{}`",
      target.borrow().type_name()
    ),
    span,
  )
}
