//! Built-in function registry.
//!
//! Consulted by name only, case-sensitive and exact: the parser tags
//! call nodes whose callee matches an entry, the checker validates
//! arity against it, and declaring anything with a registry name is a
//! NameError.

pub struct Builtin {
  pub name: &'static str,
  pub arity: usize,
}

pub const REGISTRY: &[Builtin] = &[
  Builtin {
    name: "chr",
    arity: 1,
  },
  Builtin {
    name: "ord",
    arity: 1,
  },
  Builtin {
    name: "type",
    arity: 1,
  },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
  REGISTRY.iter().find(|b| b.name == name)
}
