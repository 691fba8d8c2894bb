use std::rc::Rc;

use super::*;
use crate::error::ErrorKind;
use crate::syntax::ast::BinaryOp;

fn span() -> Span {
  Span::default()
}

fn int(v: i64) -> Value {
  Value::Int(v)
}

fn ch(v: u8) -> Value {
  Value::Char(v)
}

fn float(v: f64) -> Value {
  Value::Float(v)
}

fn s(v: &str) -> Value {
  Value::Str(v.as_bytes().to_vec())
}

fn list(items: &[Value]) -> Value {
  Value::List(items.iter().map(|v| v.clone().new_ref()).collect())
}

fn bin(op: BinaryOp, a: &Value, b: &Value) -> Value {
  ops::binary(op, a, b, span()).unwrap()
}

fn bin_err(op: BinaryOp, a: &Value, b: &Value) -> ErrorKind {
  ops::binary(op, a, b, span()).unwrap_err().kind
}

#[test]
fn float_formatting() {
  assert_eq!(fmt_float(0.5), "0.5");
  assert_eq!(fmt_float(1.0), "1");
  assert_eq!(fmt_float(-0.25), "-0.25");
  assert_eq!(fmt_float(0.0), "0");
  assert_eq!(fmt_float(1234.5), "1234.5");
  assert_eq!(fmt_float(1e-5), "1e-05");
  assert_eq!(fmt_float(2.5e20), "2.5e+20");
  assert_eq!(fmt_float(f64::NAN), "nan");
  assert_eq!(fmt_float(f64::INFINITY), "inf");
  // 15 significant digits, not more.
  assert_eq!(fmt_float(1.0 / 3.0), "0.333333333333333");
}

/// `type(a + b)` is float if either is float, else int if either is
/// int, else char.
#[test]
fn arithmetic_coercion_law() {
  let numerics = [ch(3), int(3), float(3.0)];
  for a in &numerics {
    for b in &numerics {
      let sum = bin(BinaryOp::Add, a, b);
      let expect = if matches!(a, Value::Float(_)) || matches!(b, Value::Float(_)) {
        "float"
      } else if matches!(a, Value::Int(_)) || matches!(b, Value::Int(_)) {
        "int"
      } else {
        "char"
      };
      assert_eq!(sum.type_name(), expect);
    }
  }
}

#[test]
fn integer_division_truncates() {
  assert!(ops::eq(&bin(BinaryOp::Div, &int(1), &int(2)), &int(0)));
  assert!(ops::eq(&bin(BinaryOp::Div, &int(7), &int(2)), &int(3)));
}

#[test]
fn division_by_zero() {
  assert_eq!(bin_err(BinaryOp::Div, &int(1), &int(0)), ErrorKind::DivisionByZero);
  assert_eq!(bin_err(BinaryOp::Rem, &int(1), &int(0)), ErrorKind::DivisionByZero);
  assert_eq!(
    bin_err(BinaryOp::Div, &float(1.0), &float(0.0)),
    ErrorKind::DivisionByZero
  );
}

#[test]
fn modulo_rejects_floats() {
  assert_eq!(bin_err(BinaryOp::Rem, &float(1.0), &int(2)), ErrorKind::ModNotAllowed);
  assert_eq!(bin_err(BinaryOp::Rem, &int(1), &float(2.0)), ErrorKind::ModNotAllowed);
}

#[test]
fn string_concatenation_coerces() {
  assert!(ops::eq(&bin(BinaryOp::Add, &s("n = "), &int(4)), &s("n = 4")));
  assert!(ops::eq(&bin(BinaryOp::Add, &int(4), &s("!")), &s("4!")));
  assert!(ops::eq(&bin(BinaryOp::Add, &s("a"), &ch(b'b')), &s("ab")));
}

#[test]
fn list_concatenation() {
  let sum = bin(BinaryOp::Add, &list(&[int(1), int(2)]), &list(&[int(3)]));
  assert!(ops::eq(&sum, &list(&[int(1), int(2), int(3)])));
}

#[test]
fn repetition_with_clamping() {
  assert!(ops::eq(&bin(BinaryOp::Mul, &s("ab"), &int(3)), &s("ababab")));
  assert!(ops::eq(&bin(BinaryOp::Mul, &int(2), &s("ab")), &s("abab")));
  assert!(ops::eq(&bin(BinaryOp::Mul, &s("ab"), &int(-1)), &s("")));
  let reps = bin(BinaryOp::Mul, &list(&[int(1)]), &int(2));
  assert!(ops::eq(&reps, &list(&[int(1), int(1)])));
  assert!(ops::eq(&bin(BinaryOp::Mul, &list(&[int(1)]), &int(-5)), &list(&[])));
}

#[test]
fn repetition_count_must_be_integral() {
  assert_eq!(bin_err(BinaryOp::Mul, &s("ab"), &float(2.0)), ErrorKind::Type);
}

#[test]
fn equality_on_mismatched_types_is_just_false() {
  assert!(ops::eq(&bin(BinaryOp::Eq, &int(1), &s("1")), &int(0)));
  assert!(ops::eq(&bin(BinaryOp::Neq, &int(1), &s("1")), &int(1)));
  assert!(ops::eq(&bin(BinaryOp::Eq, &list(&[]), &s("")), &int(0)));
  assert!(ops::eq(&bin(BinaryOp::Eq, &Value::None, &Value::None), &int(1)));
}

#[test]
fn numeric_equality_coerces() {
  assert!(ops::eq(&int(65), &ch(b'A')));
  assert!(ops::eq(&float(1.0), &int(1)));
}

#[test]
fn deep_equality_on_lists() {
  let a = list(&[int(1), list(&[int(2)])]);
  let b = list(&[int(1), list(&[int(2)])]);
  let c = list(&[int(1), list(&[int(3)])]);
  assert!(ops::eq(&a, &b));
  assert!(!ops::eq(&a, &c));
}

#[test]
fn comparisons_require_numbers() {
  assert!(ops::eq(&bin(BinaryOp::Less, &int(1), &float(1.5)), &int(1)));
  assert!(ops::eq(&bin(BinaryOp::MoreEq, &ch(b'b'), &ch(b'a')), &int(1)));
  assert_eq!(bin_err(BinaryOp::Less, &s("a"), &s("b")), ErrorKind::Type);
}

#[test]
fn membership() {
  assert!(ops::eq(&bin(BinaryOp::In, &ch(b'b'), &s("abc")), &int(1)));
  assert!(ops::eq(&bin(BinaryOp::In, &int(98), &s("abc")), &int(1)));
  assert!(ops::eq(&bin(BinaryOp::In, &ch(b'z'), &s("abc")), &int(0)));
  assert!(ops::eq(&bin(BinaryOp::In, &int(2), &list(&[int(1), int(2)])), &int(1)));
  assert_eq!(bin_err(BinaryOp::In, &int(1), &int(2)), ErrorKind::Type);
}

#[test]
fn boolean_operators_return_ints() {
  assert!(ops::eq(&bin(BinaryOp::And, &int(1), &s("x")), &int(1)));
  assert!(ops::eq(&bin(BinaryOp::And, &int(1), &s("")), &int(0)));
  assert!(ops::eq(&bin(BinaryOp::Or, &int(0), &Value::None), &int(0)));
  assert!(ops::eq(&bin(BinaryOp::Or, &int(0), &float(0.5)), &int(1)));
}

#[test]
fn slice_clamps_like_the_reference() {
  let text = "abcdef";
  let n = text.len() as i64;
  for i in -8..8 {
    for j in -8..8 {
      let got = index::slice(&s(text), Some(&int(i)), Some(&int(j)), span()).unwrap();
      let clamp = |v: i64| {
        let v = if v < 0 { v + n } else { v };
        v.clamp(0, n) as usize
      };
      let (lo, hi) = (clamp(i), clamp(j));
      let expect = if lo < hi { &text[lo..hi] } else { "" };
      assert!(ops::eq(&got, &s(expect)), "{text}[{i}:{j}]");
    }
  }
}

#[test]
fn slice_defaults() {
  assert!(ops::eq(&index::slice(&s("abcdef"), None, None, span()).unwrap(), &s("abcdef")));
  let l = list(&[int(1), int(2), int(3)]);
  let tail = index::slice(&l, Some(&int(1)), None, span()).unwrap();
  assert!(ops::eq(&tail, &list(&[int(2), int(3)])));
}

#[test]
fn slicing_a_list_deep_copies() {
  let inner = list(&[int(1)]);
  let l = list(&[inner]).new_ref();
  let sliced = {
    let l = l.borrow();
    index::slice(&l, None, None, span()).unwrap().new_ref()
  };
  // Mutating the copy leaves the original alone.
  if let Value::List(items) = &*sliced.borrow() {
    if let Value::List(inner) = &mut *items[0].borrow_mut() {
      inner.push(int(99).new_ref());
    }
  }
  if let Value::List(items) = &*l.borrow() {
    if let Value::List(inner) = &*items[0].borrow() {
      assert_eq!(inner.len(), 1);
    }
  };
}

#[test]
fn single_index_out_of_range() {
  let l = list(&[int(1)]).new_ref();
  let e = index::get(&l, &int(5), span()).unwrap_err();
  assert_eq!(e.kind, ErrorKind::Index);
  let e = index::get(&l, &int(-2), span()).unwrap_err();
  assert_eq!(e.kind, ErrorKind::Index);
}

#[test]
fn negative_single_index() {
  let l = list(&[int(1), int(2)]).new_ref();
  let last = index::get(&l, &int(-1), span()).unwrap();
  assert!(ops::eq(&last.borrow(), &int(2)));
}

#[test]
fn list_index_yields_the_slot() {
  let l = list(&[int(1)]).new_ref();
  let slot = index::get(&l, &int(0), span()).unwrap();
  *slot.borrow_mut() = int(9);
  if let Value::List(items) = &*l.borrow() {
    assert!(ops::eq(&items[0].borrow(), &int(9)));
  };
}

#[test]
fn string_index_yields_a_fresh_char() {
  let v = s("abc").new_ref();
  let c = index::get(&v, &int(1), span()).unwrap();
  assert!(ops::eq(&c.borrow(), &ch(b'b')));
  *c.borrow_mut() = ch(b'z');
  // The string is untouched.
  assert!(ops::eq(&v.borrow(), &s("abc")));
}

#[test]
fn assignment_coerces_to_the_slot_type() {
  let slot = ch(0).new_ref();
  assign(&slot, &int(321).new_ref(), span()).unwrap();
  assert!(ops::eq(&slot.borrow(), &ch(65)));

  let slot = int(0).new_ref();
  assign(&slot, &s("17").new_ref(), span()).unwrap();
  assert!(ops::eq(&slot.borrow(), &int(17)));

  let slot = s("").new_ref();
  assign(&slot, &float(2.5).new_ref(), span()).unwrap();
  assert!(ops::eq(&slot.borrow(), &s("2.5")));

  let slot = float(0.0).new_ref();
  assign(&slot, &int(3).new_ref(), span()).unwrap();
  assert!(ops::eq(&slot.borrow(), &float(3.0)));
}

#[test]
fn assignment_conversion_failures() {
  let slot = int(0).new_ref();
  let e = assign(&slot, &s("abc").new_ref(), span()).unwrap_err();
  assert_eq!(e.kind, ErrorKind::Value);

  let slot = list(&[]).new_ref();
  let e = assign(&slot, &int(1).new_ref(), span()).unwrap_err();
  assert_eq!(e.kind, ErrorKind::Type);
}

#[test]
fn self_assignment_is_safe() {
  let slot = int(5).new_ref();
  assign(&slot, &slot, span()).unwrap();
  assert!(ops::eq(&slot.borrow(), &int(5)));
}

#[test]
fn list_assignment_deep_copies() {
  let source = list(&[list(&[int(1)])]).new_ref();
  let slot = list(&[]).new_ref();
  assign(&slot, &source, span()).unwrap();
  // Append into the source; the copy must not change.
  if let Value::List(items) = &mut *source.borrow_mut() {
    items.push(int(2).new_ref());
  }
  if let Value::List(items) = &*slot.borrow() {
    assert_eq!(items.len(), 1);
  };
}

#[test]
fn methods() {
  let l = list(&[int(1), int(3)]).new_ref();
  let n = method::call(&l, "len", &[], span()).unwrap();
  assert!(ops::eq(&n.borrow(), &int(2)));

  method::call(&l, "insert", &[int(1).new_ref(), int(2).new_ref()], span()).unwrap();
  assert!(ops::eq(&l.borrow(), &list(&[int(1), int(2), int(3)])));

  method::call(&l, "append", &[int(4).new_ref()], span()).unwrap();
  assert!(ops::eq(&l.borrow(), &list(&[int(1), int(2), int(3), int(4)])));

  let removed = method::call(&l, "remove", &[int(0).new_ref()], span()).unwrap();
  assert!(ops::eq(&removed.borrow(), &int(1)));

  // Out-of-range remove yields none.
  let nothing = method::call(&l, "remove", &[int(99).new_ref()], span()).unwrap();
  assert!(matches!(&*nothing.borrow(), Value::None));
}

#[test]
fn append_deep_copies_even_itself() {
  let l = list(&[int(1)]).new_ref();
  method::call(&l, "append", &[l.clone()], span()).unwrap();
  assert!(ops::eq(&l.borrow(), &list(&[int(1), list(&[int(1)])])));
}

#[test]
fn unknown_method_or_bad_arity() {
  let l = list(&[]).new_ref();
  let e = method::call(&l, "shuffle", &[], span()).unwrap_err();
  assert_eq!(e.kind, ErrorKind::Syntax);

  let e = method::call(&l, "len", &[int(1).new_ref()], span()).unwrap_err();
  assert_eq!(e.kind, ErrorKind::Syntax);

  let v = int(1).new_ref();
  let e = method::call(&v, "len", &[], span()).unwrap_err();
  assert_eq!(e.kind, ErrorKind::Syntax);
}

#[test]
fn deep_copy_detaches_shared_slots() {
  let l = list(&[int(1)]).new_ref();
  let copy = l.borrow().deep_copy().new_ref();
  if let Value::List(items) = &*l.borrow() {
    assert_eq!(Rc::strong_count(&items[0]), 1);
  }
  if let Value::List(items) = &mut *copy.borrow_mut() {
    *items[0].borrow_mut() = int(9);
  }
  if let Value::List(items) = &*l.borrow() {
    assert!(ops::eq(&items[0].borrow(), &int(1)));
  };
}

#[test]
fn display_forms() {
  assert_eq!(int(42).to_string(), "42");
  assert_eq!(ch(b'x').to_string(), "x");
  assert_eq!(float(0.5).to_string(), "0.5");
  assert_eq!(s("hi").to_string(), "hi");
  assert_eq!(Value::None.to_string(), "none");
  assert_eq!(
    list(&[int(1), s("a"), list(&[int(2)])]).to_string(),
    "[1,a,[2]]"
  );
}

#[test]
fn truthiness() {
  assert!(!int(0).truthy());
  assert!(int(-1).truthy());
  assert!(!ch(0).truthy());
  assert!(!float(f64::NAN).truthy());
  assert!(!s("").truthy());
  assert!(s("0").truthy());
  assert!(!list(&[]).truthy());
  assert!(!Value::None.truthy());
}
