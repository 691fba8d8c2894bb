use std::path::{Path, PathBuf};
use std::process::exit;

use clap::Parser;
use log::debug;

use adder::module::{self, FsLoader};
use adder::syntax::lexer::{DebugToken, Lexer, Tokens};
use adder::{Adder, Error};

/// Debug bits; everything else in the mask is ignored.
const DEBUG_TOKENS: u32 = 1;
const DEBUG_TREE: u32 = 4;
const DEBUG_TREE_AND_RUN: u32 = 8;

#[derive(Parser, Debug)]
#[command(name = "adder", author, version, about = "The Adder interpreter")]
struct Cli {
  /// The module file to run.
  file: PathBuf,

  /// Tab width in spaces.
  #[arg(short = 't', value_name = "WIDTH", default_value_t = 4)]
  tab_width: u32,

  /// Debug bitmask: 1 = trace tokens, 4 = print the tree and stop,
  /// 8 = print the tree and execute.
  #[arg(short = 'd', value_name = "MASK", default_value_t = 0)]
  debug: u32,
}

fn main() {
  let cli = Cli::parse();

  let level = if cli.debug != 0 {
    log::Level::Debug
  } else {
    log::Level::Warn
  };
  simple_logger::init_with_level(level).unwrap();

  let src = match module::read_source(&cli.file) {
    Ok(src) => src,
    Err(e) => fail(&e, ""),
  };
  let name = module::module_name(&cli.file);
  let root = cli.file.parent().unwrap_or(Path::new(".")).to_path_buf();

  let mut adder = Adder::new();
  adder.set_tab_width(cli.tab_width.max(1));
  adder.set_module_loader(FsLoader::new(root));

  if cli.debug & DEBUG_TOKENS != 0 {
    if let Err(e) = trace_tokens(src, cli.tab_width) {
      report(&adder, &name, src, e);
    }
  }

  if cli.debug & (DEBUG_TREE | DEBUG_TREE_AND_RUN) != 0 {
    match adder.dump_ast(&name, src) {
      Ok(tree) => println!("{tree}"),
      Err(e) => report(&adder, &name, src, e),
    }
    if cli.debug & DEBUG_TREE == DEBUG_TREE {
      exit(0);
    }
  }

  match adder.eval_module(&name, src) {
    Ok(status) => exit(status as i32),
    Err(e) => report(&adder, &name, src, e),
  }
}

fn trace_tokens(src: &str, tab_width: u32) -> Result<(), Error> {
  for token in Tokens::new(Lexer::new(src, tab_width.max(1))?) {
    let (token, lexeme) = token?;
    debug!("{:?}", DebugToken(token, lexeme));
  }
  Ok(())
}

/// Prints the diagnostic against the source of the module it happened
/// in, then exits with the error number.
fn report(adder: &Adder, main_name: &str, main_src: &'static str, e: Error) -> ! {
  let src = match e.module.as_deref() {
    Some(m) if m != main_name => adder.module_source(m).unwrap_or(main_src),
    _ => main_src,
  };
  fail(&e, src)
}

fn fail(e: &Error, src: &str) -> ! {
  eprintln!("{}", e.report(src));
  exit(e.kind.code())
}
