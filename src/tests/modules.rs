use indoc::indoc;

use crate::module::StaticLoader;
use crate::{Adder, ErrorKind};

fn adder_with(modules: &[(&'static str, &'static str)]) -> Adder {
  let mut adder = Adder::with_io(Vec::<u8>::new());
  adder.set_module_loader(StaticLoader::new(modules));
  adder
}

fn stdout(adder: &Adder) -> String {
  let out = adder.io::<Vec<u8>>().unwrap();
  String::from_utf8(out.clone()).unwrap()
}

#[test]
fn imported_functions_are_callable() {
  let adder = adder_with(&[(
    "util",
    indoc! {r#"
      def double(x)
          return x * 2
    "#},
  )]);
  adder.eval("import util\nprint double(21)\n").unwrap();
  assert_eq!(stdout(&adder), "42\n");
}

#[test]
fn imported_modules_execute_their_top_level() {
  let adder = adder_with(&[(
    "banner",
    indoc! {r#"
      print "loaded"
      int shared = 7
    "#},
  )]);
  adder.eval("import banner\nprint shared\n").unwrap();
  assert_eq!(stdout(&adder), "loaded\n7\n");
}

#[test]
fn imports_nest() {
  let adder = adder_with(&[
    ("outer", "import inner\ndef twice(x)\n    return inner_one() + inner_one()\n"),
    ("inner", "def inner_one()\n    return 1\n"),
  ]);
  adder.eval("import outer\nprint twice(5)\n").unwrap();
  assert_eq!(stdout(&adder), "2\n");
}

#[test]
fn double_import_fails() {
  let adder = adder_with(&[("util", "pass\n")]);
  let e = adder.eval("import util\nimport util\n").unwrap_err();
  assert_eq!(e.kind, ErrorKind::Syntax);
  assert!(e.message.contains("already imported"));
}

#[test]
fn import_cycles_are_double_imports() {
  let adder = adder_with(&[("a", "import b\n"), ("b", "import a\n")]);
  let e = adder.eval("import a\n").unwrap_err();
  assert_eq!(e.kind, ErrorKind::Syntax);
  assert!(e.message.contains("already imported"));
}

#[test]
fn missing_module_is_a_system_error() {
  let adder = adder_with(&[]);
  let e = adder.eval("import nowhere\n").unwrap_err();
  assert_eq!(e.kind, ErrorKind::System);
}

#[test]
fn errors_in_imported_modules_name_the_module() {
  let adder = adder_with(&[("bad", "int x\nprint x / 0\n")]);
  let e = adder.eval("import bad\n").unwrap_err();
  assert_eq!(e.kind, ErrorKind::DivisionByZero);
  assert_eq!(e.module.as_deref(), Some("bad"));
  // The engine still has the module's source for reporting.
  let src = adder.module_source("bad").unwrap();
  assert!(e.report(src).contains("x / 0"));
}
