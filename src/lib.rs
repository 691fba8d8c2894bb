//! Adder is a small, strongly-typed imperative language with
//! Python-style significant indentation, evaluated by walking the
//! syntax tree.
//!
//! The pipeline: source text goes through the indentation-aware
//! [`syntax::lexer`], the recursive-descent [`syntax::parser`], a
//! [`check`] pass that binds and validates every identifier, and
//! finally the [`eval`] tree walker. Any failure along the way is
//! fatal; its [`ErrorKind`] number is the process exit code.
//!
//! ```
//! let adder = adder::Adder::with_io(Vec::<u8>::new());
//! adder.eval("print 1 + 2").unwrap();
//! let out = adder.io::<Vec<u8>>().unwrap();
//! assert_eq!(&out[..], b"3\n");
//! ```

mod builtins;
mod check;
pub mod error;
pub mod eval;
pub mod module;
pub mod syntax;
pub mod value;

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::eval::Stdout;
pub use crate::module::{FsLoader, ModuleLoader, NoLoader, StaticLoader};
pub use crate::value::Value;

use std::cell::{Ref, RefCell};
use std::io::{BufRead, Cursor};

use crate::eval::{Interp, Io};
use crate::module::Registry;
use crate::syntax::lexer::DEFAULT_TAB_WIDTH;

/// The interpreter engine: configuration plus the I/O the program under
/// evaluation talks to.
pub struct Adder {
  tab_width: u32,
  loader: Box<dyn ModuleLoader>,
  io: RefCell<Io>,
  registry: RefCell<Registry>,
}

impl Adder {
  /// An engine wired to the process stdin/stdout, with no import
  /// support until a loader is set.
  pub fn new() -> Self {
    Self {
      tab_width: DEFAULT_TAB_WIDTH,
      loader: Box::new(NoLoader),
      io: RefCell::new(Io {
        stdout: Box::new(std::io::stdout()),
        stdin: Box::new(std::io::stdin().lock()),
      }),
      registry: RefCell::new(Registry::new()),
    }
  }

  /// An engine writing into `stdout` — typically a `Vec<u8>` in tests,
  /// read back with [`Adder::io`]. Stdin starts out empty.
  pub fn with_io(stdout: impl Stdout + 'static) -> Self {
    let mut adder = Self::new();
    adder.io = RefCell::new(Io {
      stdout: Box::new(stdout),
      stdin: Box::new(Cursor::new(Vec::new())),
    });
    adder
  }

  pub fn set_tab_width(&mut self, tab_width: u32) {
    self.tab_width = tab_width.max(1);
  }

  pub fn set_module_loader(&mut self, loader: impl ModuleLoader + 'static) {
    self.loader = Box::new(loader);
  }

  pub fn set_input(&mut self, input: impl BufRead + 'static) {
    self.io.get_mut().stdin = Box::new(input);
  }

  /// Parses and checks without executing.
  pub fn check(&self, src: &str) -> Result<()> {
    let mut registry = self.registry.borrow_mut();
    *registry = Registry::new();
    let module =
      syntax::parser::parse_with(src, "code", self.tab_width, &*self.loader, &mut registry)?;
    check::check(&module)
  }

  /// Runs a program, returning its exit status.
  pub fn eval(&self, src: &str) -> Result<i64> {
    self.eval_module("code", src)
  }

  pub fn eval_module(&self, name: &str, src: &str) -> Result<i64> {
    let mut registry = self.registry.borrow_mut();
    *registry = Registry::new();
    let module =
      syntax::parser::parse_with(src, name, self.tab_width, &*self.loader, &mut registry)?;
    drop(registry);

    check::check(&module)?;

    let mut io = self.io.borrow_mut();
    let mut interp = Interp::new(&mut io);
    interp.run(&module)
  }

  /// Debug rendering of the parsed tree (`-d4` / `-d8`).
  pub fn dump_ast(&self, name: &str, src: &str) -> Result<String> {
    let mut registry = self.registry.borrow_mut();
    *registry = Registry::new();
    let module =
      syntax::parser::parse_with(src, name, self.tab_width, &*self.loader, &mut registry)?;
    Ok(format!("{module:#?}"))
  }

  /// Source text of a module imported during the last run, so error
  /// reports can echo the right line.
  pub fn module_source(&self, name: &str) -> Option<&'static str> {
    self.registry.borrow().source(name)
  }

  /// Borrows the captured stdout back out of the engine.
  pub fn io<T: 'static>(&self) -> Option<Ref<'_, T>> {
    Ref::filter_map(self.io.borrow(), |io| Stdout::as_any(&*io.stdout).downcast_ref()).ok()
  }
}

impl Default for Adder {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests;
