//! Module loading.
//!
//! A module is a single source file. Sources stay loaded for the whole
//! run (the tree and the scope bindings keep pointing into them), so the
//! filesystem loader hands out `&'static str` by leaking the buffer.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// File extension for Adder modules.
pub const EXTENSION: &str = "adr";

/// Resolves an `import name` to source text.
pub trait ModuleLoader {
  fn load(&self, name: &str) -> Result<&'static str>;
}

/// Loads `<root>/<name>.adr` from disk.
pub struct FsLoader {
  root: PathBuf,
}

impl FsLoader {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

impl ModuleLoader for FsLoader {
  fn load(&self, name: &str) -> Result<&'static str> {
    let path = self.root.join(format!("{name}.{EXTENSION}"));
    log::debug!("loading module `{name}` from {}", path.display());
    read_source(&path)
  }
}

/// A loader with no modules. Evaluating an `import` through it is a
/// SystemError; used by default when evaluating from a plain string.
pub struct NoLoader;

impl ModuleLoader for NoLoader {
  fn load(&self, name: &str) -> Result<&'static str> {
    Err(Error::system(
      format!("no module loader configured, cannot import `{name}`"),
      0..0,
    ))
  }
}

/// In-memory loader for tests.
pub struct StaticLoader {
  modules: IndexMap<&'static str, &'static str>,
}

impl StaticLoader {
  pub fn new(modules: &[(&'static str, &'static str)]) -> Self {
    Self {
      modules: modules.iter().copied().collect(),
    }
  }
}

impl ModuleLoader for StaticLoader {
  fn load(&self, name: &str) -> Result<&'static str> {
    self.modules.get(name).copied().ok_or_else(|| {
      Error::system(format!("cannot open module `{name}.{EXTENSION}`"), 0..0)
    })
  }
}

/// Modules already loaded in this run, keyed by name.
///
/// A module may be imported at most once per run; imported sources are
/// kept so diagnostics in imported modules can echo the offending line.
/// The top-level module is registered without a source (its caller
/// already holds one).
#[derive(Default)]
pub struct Registry {
  loaded: IndexMap<String, Option<&'static str>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.loaded.contains_key(name)
  }

  pub fn insert(&mut self, name: &str, src: Option<&'static str>) {
    self.loaded.insert(name.to_string(), src);
  }

  pub fn source(&self, name: &str) -> Option<&'static str> {
    self.loaded.get(name).copied().flatten()
  }
}

/// Reads a whole source file, leaking it into a process-lifetime string.
pub fn read_source(path: &Path) -> Result<&'static str> {
  let text = fs::read_to_string(path).map_err(|e| {
    Error::system(format!("cannot open `{}`: {e}", path.display()), 0..0)
  })?;
  Ok(Box::leak(text.into_boxed_str()))
}

/// Module name for a path: the file stem, as the import statement would
/// spell it.
pub fn module_name(path: &Path) -> String {
  path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
