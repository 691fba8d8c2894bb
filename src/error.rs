//! Diagnostics: source spans and interpreter errors.
//!
//! Every token, syntax node and error records the byte range it came
//! from, which is all the reporter needs to recover the line number and
//! echo the offending line. Failures in the pipeline are fatal and
//! eager: the library propagates a single [`Error`] up to the caller,
//! and the binary turns its [`ErrorKind`] number into the process exit
//! code.

use std::error::Error as StdError;
use std::fmt::{self, Display, Write};
use std::ops::{Deref, Range};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A range of bytes in some module's source, `Copy` unlike
/// [`std::ops::Range`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Span {
  pub start: usize,
  pub end: usize,
}

impl Span {
  /// A span starting at `self.start` and ending at `other.end`.
  pub fn join(&self, other: Span) -> Span {
    Span {
      start: self.start,
      end: other.end,
    }
  }

  pub fn range(&self) -> Range<usize> {
    self.start..self.end
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }

  /// 1-based line number of the span start within `src`.
  pub fn line(&self, src: &str) -> usize {
    let start = self.start.min(src.len());
    src[..start].bytes().filter(|b| *b == b'\n').count() + 1
  }
}

impl From<Range<usize>> for Span {
  fn from(value: Range<usize>) -> Self {
    Self {
      start: value.start,
      end: value.end,
    }
  }
}

// The token debug dump prints spans.
impl Display for Span {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}", self.start, self.end)
  }
}

/// A value plus the span it was parsed from. Statements and
/// identifiers wrap themselves in this; `Deref` keeps the payload
/// transparent, and `Debug`/`Display` ignore the span entirely.
#[derive(Clone)]
pub struct Spanned<T> {
  pub span: Span,
  value: T,
}

impl<T> Spanned<T> {
  pub fn new(span: impl Into<Span>, value: T) -> Spanned<T> {
    Spanned {
      span: span.into(),
      value,
    }
  }
}

impl<T> Deref for Spanned<T> {
  type Target = T;

  fn deref(&self) -> &Self::Target {
    &self.value
  }
}

impl<T: fmt::Debug> fmt::Debug for Spanned<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.value.fmt(f)
  }
}

impl<T: Display> Display for Spanned<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.value.fmt(f)
  }
}

/// Stable error numbers, doubling as process exit codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
  Name = 1,
  Type = 2,
  Syntax = 3,
  Value = 4,
  System = 5,
  Index = 6,
  OutOfMemory = 7,
  ModNotAllowed = 8,
  DivisionByZero = 9,
  Design = 10,
}

impl ErrorKind {
  pub fn code(self) -> i32 {
    self as i32
  }

  pub fn name(self) -> &'static str {
    match self {
      ErrorKind::Name => "NameError",
      ErrorKind::Type => "TypeError",
      ErrorKind::Syntax => "SyntaxError",
      ErrorKind::Value => "ValueError",
      ErrorKind::System => "SystemError",
      ErrorKind::Index => "IndexError",
      ErrorKind::OutOfMemory => "OutOfMemoryError",
      ErrorKind::ModNotAllowed => "ModNotAllowedError",
      ErrorKind::DivisionByZero => "DivisionByZeroError",
      ErrorKind::Design => "DesignError",
    }
  }
}

#[derive(Clone, Debug)]
pub struct Error {
  pub kind: ErrorKind,
  pub message: String,
  pub span: Span,
  /// Name of the module the span refers to, once known.
  pub module: Option<String>,
}

impl Error {
  pub fn new(kind: ErrorKind, message: impl ToString, span: impl Into<Span>) -> Self {
    Self {
      kind,
      message: message.to_string(),
      span: span.into(),
      module: None,
    }
  }

  pub fn name(message: impl ToString, span: impl Into<Span>) -> Self {
    Self::new(ErrorKind::Name, message, span)
  }

  pub fn type_(message: impl ToString, span: impl Into<Span>) -> Self {
    Self::new(ErrorKind::Type, message, span)
  }

  pub fn syntax(message: impl ToString, span: impl Into<Span>) -> Self {
    Self::new(ErrorKind::Syntax, message, span)
  }

  pub fn value(message: impl ToString, span: impl Into<Span>) -> Self {
    Self::new(ErrorKind::Value, message, span)
  }

  pub fn system(message: impl ToString, span: impl Into<Span>) -> Self {
    Self::new(ErrorKind::System, message, span)
  }

  pub fn index(message: impl ToString, span: impl Into<Span>) -> Self {
    Self::new(ErrorKind::Index, message, span)
  }

  pub fn in_module(mut self, name: &str) -> Self {
    if self.module.is_none() {
      self.module = Some(name.to_string());
    }
    self
  }

  /// Renders the error with the offending source line, leading
  /// whitespace stripped:
  ///
  /// ```text
  /// fib.adr:3: DivisionByZeroError: division by zero
  /// | print x / 0
  /// ```
  pub fn report(&self, src: &str) -> String {
    let module = self.module.as_deref().unwrap_or("<code>");

    let mut out = String::new();
    let f = &mut out;

    if self.span.is_empty() && self.span.start == 0 {
      let _ = write!(f, "{module}: {}: {}", self.kind.name(), self.message);
      return out;
    }

    let line = self.span.line(src);
    let _ = writeln!(
      f,
      "{module}:{line}: {}: {}",
      self.kind.name(),
      self.message
    );

    let start = self.span.start.min(src.len());
    let bol = src[..start].rfind('\n').map(|v| v + 1).unwrap_or(0);
    let eol = src[start..]
      .find('\n')
      .map(|v| v + start)
      .unwrap_or(src.len());
    let _ = write!(f, "| {}", src[bol..eol].trim());

    out
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.kind.name(), self.message)
  }
}

impl StdError for Error {}
