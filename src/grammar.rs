//! The compiled grammar: commands and options stored in an arena.
use std::collections::BTreeMap;

use crate::{lexer::Pos, rt::ParsedCommand, ty::ArgType, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CmdId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptId(pub(crate) usize);

/// A linked grammar, immutable once compiled.
///
/// Command `CmdId(0)` is the program.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub(crate) name: String,
    pub(crate) cmds: Vec<Command>,
    pub(crate) opts: Vec<Opt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub(crate) id: CmdId,
    pub(crate) path: Vec<String>,
    pub(crate) ident: String,
    pub(crate) parent: Option<CmdId>,
    pub(crate) opts: Vec<OptId>,
    pub(crate) subcommands: Vec<CmdId>,
    /// Every option name and identifier.
    pub(crate) opt_map: BTreeMap<String, OptId>,
    /// Every sub-command name and identifier.
    pub(crate) cmd_map: BTreeMap<String, CmdId>,
    pub(crate) args: Vec<String>,
    pub(crate) brief: Option<String>,
    pub(crate) descr: Vec<String>,
    pub(crate) usage: String,
    pub(crate) pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Opt {
    pub(crate) id: OptId,
    pub(crate) owner: CmdId,
    pub(crate) names: Vec<String>,
    pub(crate) name: String,
    pub(crate) ident: String,
    pub(crate) repeatable: bool,
    pub(crate) arg: Option<Arg>,
    pub(crate) brief: Option<String>,
    pub(crate) descr: Vec<String>,
    pub(crate) pos: Pos,
}

/// The argument an option takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub label: String,
    pub ty: ArgType,
    pub optional: bool,
}

impl Grammar {
    /// Program name, as given to [`crate::compile`].
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Command {
        &self.cmds[0]
    }

    /// # Panics
    ///
    /// If `id` comes from a different grammar and is out of range.
    pub fn command(&self, id: CmdId) -> &Command {
        &self.cmds[id.0]
    }

    /// # Panics
    ///
    /// If `id` comes from a different grammar and is out of range.
    pub fn option(&self, id: OptId) -> &Opt {
        &self.opts[id.0]
    }

    /// All commands, program first, in declaration order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> + '_ {
        self.cmds.iter()
    }

    pub fn options_of<'a>(&'a self, cmd: &'a Command) -> impl Iterator<Item = &'a Opt> + 'a {
        cmd.opts.iter().map(move |&id| self.option(id))
    }

    pub fn subcommands_of<'a>(
        &'a self,
        cmd: &'a Command,
    ) -> impl Iterator<Item = &'a Command> + 'a {
        cmd.subcommands.iter().map(move |&id| self.command(id))
    }

    pub fn parent_of(&self, cmd: &Command) -> Option<&Command> {
        cmd.parent.map(|id| self.command(id))
    }

    /// Looks up a command by its dotted path, `""` being the program.
    pub fn find_command(&self, path: &str) -> Option<&Command> {
        if path.is_empty() {
            return Some(self.program());
        }
        let mut cmd = self.program();
        for name in path.split('.') {
            cmd = self.command(cmd.find_command(name)?);
        }
        Some(cmd)
    }

    /// One-line usage of the program.
    pub fn usage(&self) -> &str {
        &self.program().usage
    }

    pub fn interpret<I>(&self, argv: I) -> Result<(ParsedCommand<'_>, Vec<String>)>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        crate::interpret(self, argv)
    }
}

impl Command {
    pub fn id(&self) -> CmdId {
        self.id
    }

    /// Last path component, empty for the program.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Name with `-` replaced by `_` and a `!` suffix, so it never collides
    /// with an option identifier.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn is_program(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<CmdId> {
        self.parent
    }

    pub fn options(&self) -> &[OptId] {
        &self.opts
    }

    pub fn subcommands(&self) -> &[CmdId] {
        &self.subcommands
    }

    pub fn find_option(&self, name: &str) -> Option<OptId> {
        self.opt_map.get(name).copied()
    }

    pub fn find_command(&self, name: &str) -> Option<CmdId> {
        self.cmd_map.get(name).copied()
    }

    /// Literal argument words (`--` for the program, `++` for commands).
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn brief(&self) -> Option<&str> {
        self.brief.as_deref()
    }

    pub fn descr(&self) -> &[String] {
        &self.descr
    }

    /// One-line usage: options by their shortest name, then a sub-command
    /// placeholder, then the literal arguments.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }
}

impl Opt {
    pub fn id(&self) -> OptId {
        self.id
    }

    pub fn owner(&self) -> CmdId {
        self.owner
    }

    /// All names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn short_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str).filter(|it| is_short(it))
    }

    pub fn long_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str).filter(|it| !is_short(it))
    }

    /// First long name, else first short name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn takes_argument(&self) -> bool {
        self.arg.is_some()
    }

    pub fn argument_optional(&self) -> bool {
        self.arg.as_ref().is_some_and(|it| it.optional)
    }

    pub fn arg(&self) -> Option<&Arg> {
        self.arg.as_ref()
    }

    pub fn brief(&self) -> Option<&str> {
        self.brief.as_deref()
    }

    pub fn descr(&self) -> &[String] {
        &self.descr
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// `-n LABEL`, `-n[LABEL]`, `--name=LABEL` or `--name[=LABEL]`, using the
    /// shortest name.
    pub fn render(&self) -> String {
        let name = self.names.iter().min_by_key(|it| it.chars().count()).unwrap_or(&self.name);
        let flag = if is_short(name) { format!("-{name}") } else { format!("--{name}") };
        match &self.arg {
            None => flag,
            Some(arg) => match (is_short(name), arg.optional) {
                (true, false) => format!("{flag} {}", arg.label),
                (true, true) => format!("{flag}[{}]", arg.label),
                (false, false) => format!("{flag}={}", arg.label),
                (false, true) => format!("{flag}[={}]", arg.label),
            },
        }
    }
}

pub(crate) fn is_short(name: &str) -> bool {
    name.chars().count() == 1
}
