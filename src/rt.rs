//! Interprets a command line against a compiled [`Grammar`].
use std::{collections::BTreeMap, collections::HashSet, fmt};

use crate::{
    grammar::{Command, Grammar, Opt, OptId},
    ty::{ArgType, Value},
    Error, ErrorKind, Result,
};

macro_rules! format_err {
    ($($tt:tt)*) => {
        Error::new(ErrorKind::User, None, format!($($tt)*))
    };
}

macro_rules! bail {
    ($($tt:tt)*) => {
        return Err(format_err!($($tt)*))
    };
}

/// A command selected on the command line and the options given to it.
#[derive(Clone, PartialEq)]
pub struct ParsedCommand<'g> {
    command: &'g Command,
    options: Vec<ParsedOption<'g>>,
    subcommand: Option<Box<ParsedCommand<'g>>>,
}

/// One occurrence of an option on the command line.
#[derive(Clone, PartialEq)]
pub struct ParsedOption<'g> {
    option: &'g Opt,
    flag: String,
    value: Option<Value>,
}

/// Value of an option identifier after interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A flag given once.
    Set,
    /// A repeatable flag and how often it was given.
    Count(usize),
    /// A single option argument, `None` when an optional argument was omitted.
    Value(Option<Value>),
    /// All arguments of a repeatable option, in command-line order.
    List(Vec<Option<Value>>),
}

impl<'g> ParsedCommand<'g> {
    fn new(command: &'g Command) -> Self {
        ParsedCommand { command, options: Vec::new(), subcommand: None }
    }

    pub fn command(&self) -> &'g Command {
        self.command
    }

    /// Options in command-line order, repeats included.
    pub fn options(&self) -> &[ParsedOption<'g>] {
        &self.options
    }

    pub fn subcommand(&self) -> Option<&ParsedCommand<'g>> {
        self.subcommand.as_deref()
    }

    /// Names of the selected sub-commands, outermost first.
    pub fn path(&self) -> Vec<&'g str> {
        let mut res = Vec::new();
        let mut cur = self.subcommand();
        while let Some(cmd) = cur {
            res.push(cmd.command.name());
            cur = cmd.subcommand();
        }
        res
    }

    /// The innermost selected command.
    pub fn leaf(&self) -> &ParsedCommand<'g> {
        let mut cur = self;
        while let Some(sub) = cur.subcommand() {
            cur = sub;
        }
        cur
    }

    /// Whether the option with identifier `ident` was given to this command.
    pub fn has(&self, ident: &str) -> bool {
        self.options.iter().any(|it| it.option.ident() == ident)
    }

    /// Binding of the option with identifier `ident`, `None` when not given.
    pub fn get(&self, ident: &str) -> Option<Binding> {
        let mut hits = self.options.iter().filter(|it| it.option.ident() == ident).peekable();
        let opt = hits.peek()?.option;
        let res = match (opt.is_repeatable(), opt.takes_argument()) {
            (false, false) => Binding::Set,
            (true, false) => Binding::Count(hits.count()),
            (false, true) => Binding::Value(hits.next().and_then(|it| it.value.clone())),
            (true, true) => Binding::List(hits.map(|it| it.value.clone()).collect()),
        };
        Some(res)
    }

    /// Identifier to binding for every option given to this command.
    pub fn bindings(&self) -> BTreeMap<&'g str, Binding> {
        let mut res = BTreeMap::new();
        for it in &self.options {
            let ident = it.option.ident();
            if !res.contains_key(ident) {
                if let Some(binding) = self.get(ident) {
                    res.insert(ident, binding);
                }
            }
        }
        res
    }
}

impl<'g> ParsedOption<'g> {
    pub fn option(&self) -> &'g Opt {
        self.option
    }

    /// The flag as spelled on the command line, `--all` or `-a`.
    pub fn flag(&self) -> &str {
        &self.flag
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }
}

impl fmt::Debug for ParsedCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ParsedCommand");
        s.field("command", &self.command.ident());
        s.field("options", &self.options);
        if let Some(sub) = &self.subcommand {
            s.field("subcommand", sub);
        }
        s.finish()
    }
}

impl fmt::Debug for ParsedOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedOption")
            .field("ident", &self.option.ident())
            .field("flag", &self.flag)
            .field("value", &self.value)
            .finish()
    }
}

pub(crate) struct Interpreter<'g> {
    grammar: &'g Grammar,
    rargs: Vec<String>,
}

impl<'g> Interpreter<'g> {
    pub(crate) fn new(grammar: &'g Grammar, mut args: Vec<String>) -> Self {
        args.reverse();
        Interpreter { grammar, rargs: args }
    }

    pub(crate) fn run(mut self) -> Result<(ParsedCommand<'g>, Vec<String>)> {
        let mut chain = vec![ParsedCommand::new(self.grammar.program())];
        // Duplicates are tracked per command level.
        let mut seen = HashSet::new();

        while let Some(arg) = self.rargs.last() {
            let Some(cur) = chain.last_mut() else { break };
            if arg == "--" {
                self.rargs.pop();
                break;
            }
            if arg.starts_with('-') && arg.len() > 1 {
                let arg = self.next().unwrap_or_default();
                self.option(cur, &mut seen, arg)?;
                continue;
            }
            let sub = cur.command.find_command(arg).map(|id| self.grammar.command(id));
            match sub.filter(|it| it.name() == arg) {
                Some(sub) => {
                    tracing::trace!(command = sub.ident(), "entering sub-command");
                    self.rargs.pop();
                    chain.push(ParsedCommand::new(sub));
                    seen.clear();
                }
                None => break,
            }
        }

        let mut res = chain.pop().ok_or_else(|| {
            Error::new(ErrorKind::Internal, None, "empty command chain".to_string())
        })?;
        while let Some(mut parent) = chain.pop() {
            parent.subcommand = Some(Box::new(res));
            res = parent;
        }

        let mut args = self.rargs;
        args.reverse();
        tracing::debug!(
            path = ?res.path(),
            options = res.options.len(),
            args = args.len(),
            "interpreted command line"
        );
        Ok((res, args))
    }

    fn next(&mut self) -> Option<String> {
        self.rargs.pop()
    }

    fn next_value(&mut self, flag: &str) -> Result<String> {
        self.next().ok_or_else(|| format_err!("Missing argument for option `{flag}`"))
    }

    fn option(
        &mut self,
        cmd: &mut ParsedCommand<'g>,
        seen: &mut HashSet<OptId>,
        arg: String,
    ) -> Result<()> {
        if let Some(long) = arg.strip_prefix("--") {
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (long, None),
            };
            let flag = format!("--{name}");
            let opt = self.lookup(cmd.command, &flag, name)?;
            return self.bind(cmd, seen, opt, flag, value);
        }

        // Short options cluster: `-abc` is `-a -b -c` until one takes an argument.
        let mut rest = &arg[1..];
        while let Some(c) = rest.chars().next() {
            let (name, tail) = rest.split_at(c.len_utf8());
            let flag = format!("-{name}");
            let opt = self.lookup(cmd.command, &flag, name)?;
            if opt.takes_argument() {
                let value = if tail.is_empty() { None } else { Some(tail) };
                return self.bind(cmd, seen, opt, flag, value);
            }
            self.bind(cmd, seen, opt, flag, None)?;
            rest = tail;
        }
        Ok(())
    }

    fn lookup(&self, cmd: &'g Command, flag: &str, name: &str) -> Result<&'g Opt> {
        // Identifiers share the lookup map but aren't valid spellings here.
        let opt = cmd.find_option(name).map(|id| self.grammar.option(id));
        match opt.filter(|it| it.names.iter().any(|n| n == name)) {
            Some(opt) => Ok(opt),
            None if cmd.is_program() => bail!("Unknown option `{flag}`"),
            None => bail!("Unknown option `{flag}` for command `{}`", cmd.path().join(".")),
        }
    }

    fn bind(
        &mut self,
        cmd: &mut ParsedCommand<'g>,
        seen: &mut HashSet<OptId>,
        opt: &'g Opt,
        flag: String,
        inline: Option<&str>,
    ) -> Result<()> {
        if !seen.insert(opt.id()) && !opt.is_repeatable() {
            bail!("Duplicate option `{flag}`")
        }
        let literal = match (opt.arg(), inline) {
            (None, Some(_)) => bail!("Option `{flag}` doesn't take an argument"),
            (None, None) => None,
            (Some(_), Some(value)) => Some(value.to_string()),
            (Some(arg), None) if arg.optional => None,
            (Some(_), None) => Some(self.next_value(&flag)?),
        };
        let value = match (opt.arg(), literal) {
            (Some(arg), Some(literal)) => convert(&arg.ty, &flag, &literal)?,
            _ => None,
        };
        tracing::trace!(option = opt.ident(), flag = %flag, value = ?value, "bound option");
        cmd.options.push(ParsedOption { option: opt, flag, value });
        Ok(())
    }
}

fn convert(ty: &ArgType, flag: &str, literal: &str) -> Result<Option<Value>> {
    if literal.is_empty() && *ty != ArgType::String {
        return Ok(None);
    }
    match ty.check(flag, literal) {
        Ok(()) => Ok(Some(ty.convert(literal))),
        Err(msg) => bail!("{msg}"),
    }
}
