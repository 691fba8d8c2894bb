use indoc::indoc;

use super::*;
use crate::error::ErrorKind;
use crate::syntax;

fn check_src(src: &str) -> Result<()> {
  let module = syntax::parse(src, "test")?;
  check(&module)
}

fn check_error(src: &str) -> Error {
  match check_src(src) {
    Ok(()) => panic!("expected a check error in {src:?}"),
    Err(e) => e,
  }
}

#[test]
fn declarations_resolve() {
  check_src(indoc! {r#"
    int a = 1
    int b = a + 1
    print a, b
  "#})
  .unwrap();
}

#[test]
fn use_before_declaration() {
  let e = check_error("print a\n");
  assert_eq!(e.kind, ErrorKind::Name);
  assert!(e.message.contains("not declared"));
}

#[test]
fn initializer_cannot_reference_its_own_name() {
  let e = check_error("int x = x\n");
  assert_eq!(e.kind, ErrorKind::Name);
}

#[test]
fn duplicate_declaration_in_scope() {
  let e = check_error("int x\nfloat x\n");
  assert_eq!(e.kind, ErrorKind::Name);
  assert!(e.message.contains("already declared"));
}

#[test]
fn shadowing_across_scopes_is_fine() {
  check_src(indoc! {r#"
    int x = 1
    def f()
        int x = 2
        return x
    f()
  "#})
  .unwrap();
}

#[test]
fn builtins_cannot_be_redefined() {
  for src in ["int type\n", "def ord()\n    pass\nord()\n", "list chr\n"] {
    let e = check_error(src);
    assert_eq!(e.kind, ErrorKind::Name, "{src:?}");
    assert!(e.message.contains("built-in"), "{src:?}");
  }
}

#[test]
fn function_used_as_variable() {
  let e = check_error("def f()\n    pass\nprint f\n");
  assert_eq!(e.kind, ErrorKind::Type);
  assert!(e.message.contains("not a variable"));
}

#[test]
fn variable_called_as_function() {
  let e = check_error("int f\nf()\n");
  assert_eq!(e.kind, ErrorKind::Type);
  assert!(e.message.contains("not a function"));
}

#[test]
fn undeclared_function_call() {
  let e = check_error("f()\n");
  assert_eq!(e.kind, ErrorKind::Name);
}

#[test]
fn arity_mismatch_is_a_syntax_error() {
  let e = check_error(indoc! {r#"
    def f(a, b)
        return a
    f(1)
  "#});
  assert_eq!(e.kind, ErrorKind::Syntax);
  assert!(e.message.contains("takes 2 arguments"));
}

#[test]
fn builtin_arity_is_checked() {
  let e = check_error("print chr(1, 2)\n");
  assert_eq!(e.kind, ErrorKind::Syntax);
  assert!(e.message.contains("takes 1 argument"));
}

#[test]
fn function_bodies_are_checked_at_call_sites() {
  // The body error only surfaces once the function is called.
  check_src(indoc! {r#"
    def broken()
        return nope
    pass
  "#})
  .unwrap();

  let e = check_error(indoc! {r#"
    def broken()
        return nope
    broken()
  "#});
  assert_eq!(e.kind, ErrorKind::Name);
}

#[test]
fn recursion_terminates_via_the_checked_latch() {
  check_src(indoc! {r#"
    def f(n)
        if n > 0
            return f(n - 1)
        return 0
    f(3)
  "#})
  .unwrap();
}

#[test]
fn mutual_recursion_terminates() {
  check_src(indoc! {r#"
    def even(n)
        if n == 0
            return 1
        return odd(n - 1)
    def odd(n)
        if n == 0
            return 0
        return even(n - 1)
    print even(4)
  "#})
  .unwrap();
}

#[test]
fn two_level_lookup_skips_enclosing_functions() {
  // `g` is global and visible from the inner function; `x` lives in
  // the enclosing function's scope and is not.
  check_src(indoc! {r#"
    int g = 1
    def outer()
        def inner()
            return g
        return inner()
    outer()
  "#})
  .unwrap();

  let e = check_error(indoc! {r#"
    def outer()
        int x = 10
        def inner()
            return x
        return inner()
    outer()
  "#});
  assert_eq!(e.kind, ErrorKind::Name);
}

#[test]
fn for_target_springs_into_existence() {
  check_src("for i in [1, 2]\n    pass\nprint i\n").unwrap();
}

#[test]
fn for_target_cannot_be_a_function() {
  let e = check_error("def f()\n    pass\nfor f in [1]\n    pass\n");
  assert_eq!(e.kind, ErrorKind::Type);
}

#[test]
fn input_targets_must_be_variables() {
  let e = check_error("input x\n");
  assert_eq!(e.kind, ErrorKind::Name);

  let e = check_error("def f()\n    pass\ninput f\n");
  assert_eq!(e.kind, ErrorKind::Type);
}

#[test]
fn function_params_are_variables_in_the_body() {
  check_src(indoc! {r#"
    def add(a, b)
        return a + b
    print add(1, 2)
  "#})
  .unwrap();
}

#[test]
fn duplicate_params_are_rejected() {
  let e = check_error("def f(a, a)\n    pass\nf(1, 2)\n");
  assert_eq!(e.kind, ErrorKind::Name);
}

/// Literal initializers are converted at check time, so the error
/// surfaces before anything runs.
#[test]
fn literal_initializers_are_validated_early() {
  let e = check_error("int x = \"abc\"\n");
  assert_eq!(e.kind, ErrorKind::Value);

  let e = check_error("list l = 5\n");
  assert_eq!(e.kind, ErrorKind::Type);

  // A convertible literal is fine.
  check_src("int x = \"42\"\nchar c = 65\n").unwrap();
}
