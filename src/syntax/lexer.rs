#![allow(non_camel_case_types)]

//! Indentation-aware lexer.
//!
//! A raw [`logos`] scanner recognises lexemes; this wrapper measures the
//! leading whitespace of every line and turns it into synthetic
//! `Newline` / `Indent` / `Dedent` tokens driven by an indent stack, so
//! the parser sees a block-structured stream:
//!
//! ```text
//! while x          ->  while x
//!     x = x - 1    ->  Newline Indent x = x - 1
//! print x          ->  Newline Dedent print x  ... Newline Eof
//! ```
//!
//! Blank lines and comment-only lines vanish entirely. A tab advances
//! the column to the next multiple of the configured tab width.

use std::borrow::Borrow;
use std::collections::VecDeque;
use std::fmt;
use std::mem::discriminant;

use logos::Logos;

use crate::error::{Error, Result, Span};

/// Default tab width in columns.
pub const DEFAULT_TAB_WIDTH: u32 = 4;

/// Hard cap on block nesting.
const MAX_INDENT_DEPTH: usize = 132;

#[derive(Clone, Debug)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
}

impl Token {
  pub fn is(&self, kind: impl Borrow<TokenKind>) -> bool {
    discriminant(&self.kind) == discriminant(kind.borrow())
  }
}

pub struct Lexer<'src> {
  src: &'src str,
  inner: logos::Lexer<'src, TokenKind>,
  previous: Token,
  current: Token,
  peeked: Option<Token>,
  pending: VecDeque<Token>,
  /// Column widths of enclosing blocks; `[0]` is always present.
  indent: Vec<u64>,
  /// Measured indentation of the line the next real token starts.
  ws: Option<u64>,
  tab_width: u32,
  /// False until the first real token has been produced, so the stream
  /// does not open with a `Newline`.
  started: bool,
  done: bool,
}

impl<'src> Lexer<'src> {
  pub fn new(src: &'src str, tab_width: u32) -> Result<Self> {
    let end = src.len();
    let eof = Token {
      kind: TokenKind::Tok_Eof,
      span: (end..end).into(),
    };

    // The raw scanner only reports indentation after a newline, so the
    // first line's leading whitespace is measured here.
    let first = &src[..src
      .find(|c: char| c != ' ' && c != '\t')
      .unwrap_or(src.len())];

    let mut lex = Self {
      src,
      inner: TokenKind::lexer(src),
      previous: eof.clone(),
      current: eof,
      peeked: None,
      pending: VecDeque::new(),
      indent: vec![0],
      ws: Some(measure_columns(first, tab_width)),
      tab_width,
      started: false,
      done: false,
    };
    lex.bump()?;

    Ok(lex)
  }

  #[inline]
  pub fn previous(&self) -> &Token {
    &self.previous
  }

  #[inline]
  pub fn current(&self) -> &Token {
    &self.current
  }

  #[inline]
  pub fn lexeme(&self, token: &Token) -> &'src str {
    &self.src[token.span.range()]
  }

  /// One token of lookahead past `current`.
  pub fn peek(&mut self) -> Result<&Token> {
    if self.peeked.is_none() {
      self.peeked = Some(self.next_token()?);
    }
    Ok(self.peeked.as_ref().unwrap())
  }

  /// Move forward by one token, returning the previous one.
  pub fn bump(&mut self) -> Result<&Token> {
    let next = match self.peeked.take() {
      Some(token) => token,
      None => self.next_token()?,
    };
    self.previous = std::mem::replace(&mut self.current, next);
    Ok(&self.previous)
  }

  fn next_token(&mut self) -> Result<Token> {
    if let Some(token) = self.pending.pop_front() {
      return Ok(token);
    }

    let lexer = &mut self.inner;
    while let Some(kind) = lexer.next() {
      let lexeme = lexer.slice();
      let span: Span = lexer.span().into();

      match kind {
        // Measure indentation; comment and blank lines just re-measure.
        Ok(TokenKind::_Tok_Indentation) => {
          self.ws = Some(measure_indent(lexeme, self.tab_width));
        }
        // Filter any other whitespace and comments
        Ok(TokenKind::_Tok_Whitespace | TokenKind::_Tok_Comment) => {}
        Ok(TokenKind::_Tok_BadNumber) => {
          return Err(Error::syntax(
            format!("malformed number `{lexeme}`"),
            span,
          ));
        }
        Ok(kind) => {
          if let Some(col) = self.ws.take() {
            self.open_line(col, span)?;
          }
          self.started = true;
          self.pending.push_back(Token { kind, span });
          return Ok(self.pending.pop_front().unwrap());
        }
        Err(_) => {
          return Err(Error::syntax(format!("invalid token `{lexeme}`"), span));
        }
      }
    }

    self.finish()
  }

  /// Emits the `Newline` terminating the previous line and whatever
  /// `Indent`/`Dedent` tokens the new column calls for.
  fn open_line(&mut self, col: u64, span: Span) -> Result<()> {
    let at = Span::from(span.start..span.start);
    if self.started {
      self.pending.push_back(Token {
        kind: TokenKind::Tok_Newline,
        span: at,
      });
    }

    let top = *self.indent.last().unwrap();
    if col > top {
      if self.indent.len() >= MAX_INDENT_DEPTH {
        return Err(Error::syntax("blocks nested too deeply", span));
      }
      self.indent.push(col);
      self.pending.push_back(Token {
        kind: TokenKind::Tok_Indent,
        span: at,
      });
    } else {
      while col < *self.indent.last().unwrap() {
        self.indent.pop();
        self.pending.push_back(Token {
          kind: TokenKind::Tok_Dedent,
          span: at,
        });
      }
      if col != *self.indent.last().unwrap() {
        return Err(Error::syntax("inconsistent indentation", span));
      }
    }

    Ok(())
  }

  /// End of input: a final `Newline`, one `Dedent` per open block, then
  /// `Eof` forever.
  fn finish(&mut self) -> Result<Token> {
    let end = self.src.len();
    let at = Span::from(end..end);

    if !self.done {
      self.done = true;
      if self.started {
        self.pending.push_back(Token {
          kind: TokenKind::Tok_Newline,
          span: at,
        });
      }
      while self.indent.len() > 1 {
        self.indent.pop();
        self.pending.push_back(Token {
          kind: TokenKind::Tok_Dedent,
          span: at,
        });
      }
      self.pending.push_back(Token {
        kind: TokenKind::Tok_Eof,
        span: at,
      });
    }

    Ok(self.pending.pop_front().unwrap_or(Token {
      kind: TokenKind::Tok_Eof,
      span: at,
    }))
  }
}

/// Column width of the indentation after the last newline in `lexeme`.
fn measure_indent(lexeme: &str, tab_width: u32) -> u64 {
  let pos = lexeme.rfind('\n').map(|v| v + 1).unwrap_or(0);
  measure_columns(&lexeme[pos..], tab_width)
}

/// A space is one column; a tab rounds up to the next tab stop.
fn measure_columns(ws: &str, tab_width: u32) -> u64 {
  let tab = tab_width.max(1) as u64;
  let mut col = 0u64;
  for b in ws.bytes() {
    match b {
      b'\t' => col = (col / tab + 1) * tab,
      _ => col += 1,
    }
  }
  col
}

#[derive(Clone, Copy, Debug, Logos, PartialEq)]
pub enum TokenKind {
  // Keywords
  #[token("and")]
  Kw_And,
  #[token("break")]
  Kw_Break,
  #[token("char")]
  Kw_Char,
  #[token("continue")]
  Kw_Continue,
  #[token("def")]
  Kw_Def,
  #[token("do")]
  Kw_Do,
  #[token("else")]
  Kw_Else,
  #[token("float")]
  Kw_Float,
  #[token("for")]
  Kw_For,
  #[token("if")]
  Kw_If,
  #[token("import")]
  Kw_Import,
  #[token("in")]
  Kw_In,
  #[token("input")]
  Kw_Input,
  #[token("int")]
  Kw_Int,
  #[token("list")]
  Kw_List,
  #[token("or")]
  Kw_Or,
  #[token("pass")]
  Kw_Pass,
  #[token("print")]
  Kw_Print,
  #[token("return")]
  Kw_Return,
  #[token("str")]
  Kw_Str,
  #[token("while")]
  Kw_While,

  // Brackets
  #[token("(")]
  Brk_ParenL,
  #[token(")")]
  Brk_ParenR,
  #[token("[")]
  Brk_SquareL,
  #[token("]")]
  Brk_SquareR,

  // Misc characters
  #[token(".")]
  Op_Dot,
  #[token(",")]
  Tok_Comma,
  #[token(":")]
  Tok_Colon,

  // Equals operators
  #[token("=")]
  Op_Equal,
  #[token("==")]
  Op_EqualEqual,
  #[token("!=")]
  #[token("<>")]
  Op_BangEqual,
  #[token("+=")]
  Op_PlusEqual,
  #[token("-=")]
  Op_MinusEqual,
  #[token("*=")]
  Op_StarEqual,
  #[token("/=")]
  Op_SlashEqual,
  #[token("%=")]
  Op_PercentEqual,

  // Operators
  #[token("+")]
  Op_Plus,
  #[token("-")]
  Op_Minus,
  #[token("*")]
  Op_Star,
  #[token("/")]
  Op_Slash,
  #[token("%")]
  Op_Percent,
  #[token("!")]
  Op_Bang,
  #[token(">")]
  Op_More,
  #[token(">=")]
  Op_MoreEqual,
  #[token("<")]
  Op_Less,
  #[token("<=")]
  Op_LessEqual,

  // Literals
  /// `0`, `42`
  #[regex("[0-9]+", priority = 10)]
  Lit_Int,
  /// `1.0`, `5e10`, `2E-3`
  #[regex(r"[0-9]+(\.[0-9]+)?([Ee][+-]?[0-9]+)?")]
  Lit_Float,
  /// `'a'`, `'\n'`
  #[regex(r"'[^'\\\n]'")]
  #[regex(r"'\\[^\n]'")]
  Lit_Char,
  /// An unterminated string ends silently at end of input.
  #[regex(r#""([^"\\]|\\.)*""#)]
  #[regex(r#""([^"\\]|\\.)*"#)]
  Lit_String,
  /// `a`, `b_c`, `__x0`
  #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
  Lit_Ident,

  #[doc(hidden)]
  #[regex(r"(\r?\n[ \t]*)+")]
  _Tok_Indentation,
  #[doc(hidden)]
  #[regex(r"[ \t\r]+")]
  _Tok_Whitespace,
  #[doc(hidden)]
  #[regex(r"#[^\n]*")]
  _Tok_Comment,
  /// A number with an exponent marker but no exponent digits.
  #[doc(hidden)]
  #[regex(r"[0-9]+(\.[0-9]+)?[Ee][+-]?")]
  _Tok_BadNumber,

  // Synthetic tokens, produced by the indentation layer only.
  Tok_Newline,
  Tok_Indent,
  Tok_Dedent,
  Tok_Eof,
}

impl TokenKind {
  pub fn name(&self) -> &'static str {
    match self {
      TokenKind::Kw_And => "and",
      TokenKind::Kw_Break => "break",
      TokenKind::Kw_Char => "char",
      TokenKind::Kw_Continue => "continue",
      TokenKind::Kw_Def => "def",
      TokenKind::Kw_Do => "do",
      TokenKind::Kw_Else => "else",
      TokenKind::Kw_Float => "float",
      TokenKind::Kw_For => "for",
      TokenKind::Kw_If => "if",
      TokenKind::Kw_Import => "import",
      TokenKind::Kw_In => "in",
      TokenKind::Kw_Input => "input",
      TokenKind::Kw_Int => "int",
      TokenKind::Kw_List => "list",
      TokenKind::Kw_Or => "or",
      TokenKind::Kw_Pass => "pass",
      TokenKind::Kw_Print => "print",
      TokenKind::Kw_Return => "return",
      TokenKind::Kw_Str => "str",
      TokenKind::Kw_While => "while",
      TokenKind::Brk_ParenL => "(",
      TokenKind::Brk_ParenR => ")",
      TokenKind::Brk_SquareL => "[",
      TokenKind::Brk_SquareR => "]",
      TokenKind::Op_Dot => ".",
      TokenKind::Tok_Comma => ",",
      TokenKind::Tok_Colon => ":",
      TokenKind::Op_Equal => "=",
      TokenKind::Op_EqualEqual => "==",
      TokenKind::Op_BangEqual => "!=",
      TokenKind::Op_PlusEqual => "+=",
      TokenKind::Op_MinusEqual => "-=",
      TokenKind::Op_StarEqual => "*=",
      TokenKind::Op_SlashEqual => "/=",
      TokenKind::Op_PercentEqual => "%=",
      TokenKind::Op_Plus => "+",
      TokenKind::Op_Minus => "-",
      TokenKind::Op_Star => "*",
      TokenKind::Op_Slash => "/",
      TokenKind::Op_Percent => "%",
      TokenKind::Op_Bang => "!",
      TokenKind::Op_More => ">",
      TokenKind::Op_MoreEqual => ">=",
      TokenKind::Op_Less => "<",
      TokenKind::Op_LessEqual => "<=",
      TokenKind::Lit_Int => "int literal",
      TokenKind::Lit_Float => "float literal",
      TokenKind::Lit_Char => "char literal",
      TokenKind::Lit_String => "string literal",
      TokenKind::Lit_Ident => "identifier",
      TokenKind::_Tok_Indentation => "<indentation>",
      TokenKind::_Tok_Whitespace => "<whitespace>",
      TokenKind::_Tok_Comment => "<comment>",
      TokenKind::_Tok_BadNumber => "<malformed number>",
      TokenKind::Tok_Newline => "NEWLINE",
      TokenKind::Tok_Indent => "INDENT",
      TokenKind::Tok_Dedent => "DEDENT",
      TokenKind::Tok_Eof => "ENDMARKER",
    }
  }
}

/// Drains a lexer as an iterator. Used by the `-d1` token dump.
pub struct Tokens<'src> {
  lexer: Lexer<'src>,
  failed: bool,
}

impl<'src> Tokens<'src> {
  pub fn new(lexer: Lexer<'src>) -> Self {
    Self {
      lexer,
      failed: false,
    }
  }
}

impl<'src> Iterator for Tokens<'src> {
  type Item = Result<(Token, &'src str)>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.lexer.current().is(TokenKind::Tok_Eof) {
      return None;
    }
    let token = self.lexer.current().clone();
    let lexeme = self.lexer.lexeme(&token);
    match self.lexer.bump() {
      Ok(_) => Some(Ok((token, lexeme))),
      Err(e) => {
        self.failed = true;
        Some(Err(e))
      }
    }
  }
}

pub struct DebugToken<'src>(pub Token, pub &'src str);

impl<'src> fmt::Debug for DebugToken<'src> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = self.0.kind;
    let span = self.0.span;
    let lexeme = self.1;
    if let TokenKind::Lit_Ident = kind {
      write!(f, "({kind:?} `{lexeme}` @{span})")
    } else {
      write!(f, "({kind:?} @{span})")
    }
  }
}
