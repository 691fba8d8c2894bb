/// Runs a program with captured stdout and asserts the exact output.
macro_rules! check {
  ($name:ident, $src:literal, $expected:literal) => {
    #[test]
    fn $name() {
      let src = indoc::indoc!($src);
      let adder = crate::Adder::with_io(Vec::<u8>::new());
      match adder.eval(src) {
        Ok(_) => {
          let out = adder.io::<Vec<u8>>().unwrap();
          let out = std::str::from_utf8(&out).unwrap();
          assert_eq!(out, $expected, "stdout mismatch for:\n{src}");
        }
        Err(e) => panic!("eval failed:\n{}", e.report(src)),
      }
    }
  };
}

/// Like `check!`, but also asserts the program's exit status.
macro_rules! check_status {
  ($name:ident, $src:literal, $status:expr) => {
    #[test]
    fn $name() {
      let src = indoc::indoc!($src);
      let adder = crate::Adder::with_io(Vec::<u8>::new());
      match adder.eval(src) {
        Ok(status) => assert_eq!(status, $status, "status mismatch for:\n{src}"),
        Err(e) => panic!("eval failed:\n{}", e.report(src)),
      }
    }
  };
}

/// Feeds `$input` to stdin and asserts stdout.
macro_rules! check_with_input {
  ($name:ident, $src:literal, $input:literal, $expected:literal) => {
    #[test]
    fn $name() {
      let src = indoc::indoc!($src);
      let mut adder = crate::Adder::with_io(Vec::<u8>::new());
      adder.set_input(std::io::Cursor::new($input.as_bytes().to_vec()));
      match adder.eval(src) {
        Ok(_) => {
          let out = adder.io::<Vec<u8>>().unwrap();
          let out = std::str::from_utf8(&out).unwrap();
          assert_eq!(out, $expected, "stdout mismatch for:\n{src}");
        }
        Err(e) => panic!("eval failed:\n{}", e.report(src)),
      }
    }
  };
}

/// Asserts that the program fails with the given error kind, and that
/// the message mentions `$needle`.
macro_rules! check_error {
  ($name:ident, $src:literal, $kind:expr, $needle:literal) => {
    #[test]
    fn $name() {
      let src = indoc::indoc!($src);
      let adder = crate::Adder::with_io(Vec::<u8>::new());
      match adder.eval(src) {
        Ok(status) => panic!("expected an error, got status {status} for:\n{src}"),
        Err(e) => {
          assert_eq!(e.kind, $kind, "wrong error kind: {e}");
          assert!(
            e.message.contains($needle),
            "`{}` does not mention `{}`",
            e.message,
            $needle
          );
        }
      }
    }
  };
}
