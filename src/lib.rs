//! Compile a compact usage-string grammar and interpret command lines against it.
//!
//! ```
//! let grammar = optdsl::compile("prog", "-a,all +v,verbose n,count=# cmd! cmd.sub!").unwrap();
//! let (parsed, args) = grammar.interpret(["-avv", "--count=3", "cmd", "file"]).unwrap();
//!
//! assert!(parsed.has("all"));
//! assert_eq!(parsed.get("count"), Some(optdsl::Binding::Value(Some(optdsl::Value::Int(3)))));
//! assert_eq!(parsed.path(), vec!["cmd"]);
//! assert_eq!(args, vec!["file"]);
//! ```
use std::fmt;

mod analyze;
mod ast;
mod grammar;
mod lexer;
mod parse;
mod rt;
mod ty;

pub use crate::{
    grammar::{Arg, CmdId, Command, Grammar, Opt, OptId},
    lexer::Pos,
    rt::{Binding, ParsedCommand, ParsedOption},
    ty::{ArgType, FsKind, Value},
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which stage produced an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The usage string contains a word of no known shape.
    Lexer,
    /// A declaration is malformed.
    Parser,
    /// Declarations don't link: duplicates or missing parent commands.
    Analyzer,
    /// The command line doesn't match the grammar.
    User,
    /// A broken invariant inside the compiler.
    Internal,
}

impl ErrorKind {
    /// Errors that make the grammar unusable until the usage string is fixed.
    pub fn is_compile(self) -> bool {
        matches!(self, ErrorKind::Lexer | ErrorKind::Parser | ErrorKind::Analyzer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    pos: Option<Pos>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, pos: Option<Pos>, msg: String) -> Error {
        Error { kind, msg, pos }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Position in the usage string, for compile errors.
    pub fn pos(&self) -> Option<Pos> {
        self.pos
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{pos}: {}", self.msg),
            None => fmt::Display::fmt(&self.msg, f),
        }
    }
}

/// Standard options injected into the program before linking.
///
/// An option is skipped when one of its names is already declared on the
/// program. Acting on them is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `-h, --help`
    pub help: bool,
    /// `--version`
    pub version: bool,
    /// `-q, --quiet`
    pub quiet: bool,
    /// `-v, --verbose`, repeatable
    pub verbose: bool,
    /// `--debug`
    pub debug: bool,
}

impl Config {
    /// `--help` and `--version`.
    pub fn standard() -> Config {
        Config { help: true, version: true, ..Config::default() }
    }

    pub(crate) fn std_options(&self) -> Vec<(&'static str, &'static str)> {
        let mut res = Vec::new();
        if self.help {
            res.push(("-h,help", "Print this page"));
        }
        if self.version {
            res.push(("--version", "Print version"));
        }
        if self.quiet {
            res.push(("-q,quiet", "Quiet operation"));
        }
        if self.verbose {
            res.push(("+v,verbose", "Increase verbosity"));
        }
        if self.debug {
            res.push(("--debug", "Write debug information"));
        }
        res
    }
}

/// Compiles `source` into a [`Grammar`] for the program `name`.
pub fn compile(name: &str, source: &str) -> Result<Grammar> {
    compile_with(&Config::default(), name, source)
}

pub fn compile_with(config: &Config, name: &str, source: &str) -> Result<Grammar> {
    let tokens = lexer::lex(name, source)?;
    let mut program = parse::program(&tokens)?;
    parse::add_std_options(&mut program, config)?;
    analyze::link(program)
}

/// Interprets `argv` (without the program name) against `grammar`.
pub fn interpret<'g, I>(grammar: &'g Grammar, argv: I) -> Result<(ParsedCommand<'g>, Vec<String>)>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    rt::Interpreter::new(grammar, argv.into_iter().map(Into::into).collect()).run()
}
