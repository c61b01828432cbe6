//! Builds unlinked declarations from the token list.
use std::sync::OnceLock;

use regex::Regex;

use crate::{
    ast,
    lexer::{Pos, Token, TokenKind},
    ty::{ArgType, FsKind},
    Config, Error, ErrorKind, Result,
};

macro_rules! format_err {
    ($pos:expr, $($tt:tt)*) => {
        Error::new(ErrorKind::Parser, Some($pos), format!($($tt)*))
    };
}

macro_rules! bail {
    ($pos:expr, $($tt:tt)*) => {
        return Err(format_err!($pos, $($tt)*))
    };
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap())
}

fn ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap())
}

fn enum_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.+-]+$").unwrap())
}

#[derive(Clone, Copy)]
enum Last {
    Cmd(usize),
    Opt(usize, usize),
}

pub(crate) fn program(tokens: &[Token]) -> Result<ast::Program> {
    let p = &mut Parser::new(tokens);
    let Some(head) = p.next().filter(|it| it.kind == TokenKind::Program) else {
        return Err(Error::new(ErrorKind::Internal, None, "missing program token".to_string()));
    };

    let mut cmds = vec![ast::Cmd::new(Vec::new(), head.pos)];
    let mut cur = 0;
    let mut last = Last::Cmd(0);
    while let Some(tok) = p.next() {
        match tok.kind {
            TokenKind::Option => {
                cmds[cur].opts.push(option(tok)?);
                last = Last::Opt(cur, cmds[cur].opts.len() - 1);
            }
            TokenKind::Command => {
                cmds.push(ast::Cmd::new(command_path(tok)?, tok.pos));
                cur = cmds.len() - 1;
                last = Last::Cmd(cur);
            }
            TokenKind::Tail | TokenKind::CmdArgs => {
                let owner = if tok.kind == TokenKind::Tail { 0 } else { cur };
                while let Some(arg) = p.eat(TokenKind::Arg) {
                    cmds[owner].args.push(arg.text.clone());
                }
            }
            TokenKind::Brief => {
                let doc = doc_mut(&mut cmds, last);
                if doc.brief.is_none() {
                    doc.brief = Some(tok.text.clone());
                } else {
                    doc.descr.push(tok.text.clone());
                }
            }
            TokenKind::Text => doc_mut(&mut cmds, last).descr.push(tok.text.clone()),
            TokenKind::Blank => {
                let doc = doc_mut(&mut cmds, last);
                if doc.descr.last().is_some_and(|it| !it.is_empty()) {
                    doc.descr.push(String::new());
                }
            }
            TokenKind::Program | TokenKind::Arg => {
                return Err(Error::new(
                    ErrorKind::Internal,
                    Some(tok.pos),
                    format!("unexpected token `{}`", tok.text),
                ));
            }
        }
    }

    for cmd in &mut cmds {
        trim_doc(&mut cmd.doc);
        cmd.opts.iter_mut().for_each(|opt| trim_doc(&mut opt.doc));
    }
    let res = ast::Program { name: head.text.clone(), cmds };
    tracing::debug!(
        program = %res.name,
        commands = res.cmds.len() - 1,
        options = res.cmds.iter().map(|it| it.opts.len()).sum::<usize>(),
        "parsed declarations"
    );
    Ok(res)
}

/// Adds the options requested by `config` to the program unless already declared.
pub(crate) fn add_std_options(program: &mut ast::Program, config: &Config) -> Result<()> {
    let Some(cmd) = program.cmds.first_mut() else {
        let msg = "program has no root command".to_string();
        return Err(Error::new(ErrorKind::Internal, None, msg));
    };
    for (src, brief) in config.std_options() {
        let pos = Pos { line: 0, col: 0 };
        let tok = Token { kind: TokenKind::Option, text: src.to_string(), pos };
        let mut opt = option(&tok)?;
        if opt.names.iter().any(|name| cmd.has_name(name)) {
            continue;
        }
        opt.doc.brief = Some(brief.to_string());
        cmd.opts.push(opt);
    }
    Ok(())
}

fn doc_mut(cmds: &mut [ast::Cmd], last: Last) -> &mut ast::Doc {
    match last {
        Last::Cmd(cmd) => &mut cmds[cmd].doc,
        Last::Opt(cmd, opt) => &mut cmds[cmd].opts[opt].doc,
    }
}

fn trim_doc(doc: &mut ast::Doc) {
    while doc.descr.last().is_some_and(|it| it.is_empty()) {
        doc.descr.pop();
    }
}

/// `[+|++|-|--]names[=ARG][?]`
fn option(tok: &Token) -> Result<ast::Opt> {
    let text = tok.text.as_str();
    let (repeatable, rest) = match text.strip_prefix("++").or_else(|| text.strip_prefix('+')) {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix("--").or_else(|| text.strip_prefix('-')).unwrap_or(text)),
    };
    let (names, arg) = match rest.split_once('=') {
        Some((names, arg)) => (names, Some(arg)),
        None => (rest, None),
    };
    if names.ends_with('?') {
        bail!(tok.pos, "`?` requires an argument: `{text}`")
    }

    let names = names
        .split(',')
        .map(|name| {
            if !name_re().is_match(name) {
                bail!(tok.pos, "illegal option name `{name}` in `{text}`")
            }
            Ok(name.to_string())
        })
        .collect::<Result<Vec<_>>>()?;
    let arg = arg.map(|arg| arg_spec(tok, arg)).transpose()?;

    Ok(ast::Opt { names, repeatable, arg, pos: tok.pos, doc: ast::Doc::default() })
}

/// `[LABEL:]TYPE`, `LABEL` or nothing, optionally followed by `?`.
fn arg_spec(tok: &Token, src: &str) -> Result<ast::ArgSpec> {
    let text = tok.text.as_str();
    let (src, optional) = match src.strip_suffix('?') {
        Some(src) => (src, true),
        None => (src, false),
    };

    let (label, ty) = if src.is_empty() {
        (None, ArgType::String)
    } else if let Some((label, ty)) = src.split_once(':') {
        if !ident_re().is_match(label) {
            bail!(tok.pos, "illegal argument label `{label}` in `{text}`")
        }
        match type_expr(tok, ty)? {
            Some(ty) => (Some(label.to_string()), ty),
            None => bail!(tok.pos, "unknown argument type `{ty}` in `{text}`"),
        }
    } else {
        match type_expr(tok, src)? {
            Some(ty) => (None, ty),
            None if ident_re().is_match(src) => (Some(src.to_string()), ArgType::String),
            None => bail!(tok.pos, "illegal argument `{src}` in `{text}`"),
        }
    };
    Ok(ast::ArgSpec { label, ty, optional })
}

fn type_expr(tok: &Token, src: &str) -> Result<Option<ArgType>> {
    let res = match src {
        "#" => ArgType::Integer,
        "$" => ArgType::Float,
        _ => {
            if let Some(kind) = FsKind::from_keyword(src) {
                ArgType::Fs(kind)
            } else if src.contains(',') {
                ArgType::Enum(enum_values(tok, src)?)
            } else {
                return Ok(None);
            }
        }
    };
    Ok(Some(res))
}

fn enum_values(tok: &Token, src: &str) -> Result<Vec<String>> {
    let mut res: Vec<String> = Vec::new();
    for value in src.split(',') {
        if !enum_value_re().is_match(value) {
            bail!(tok.pos, "illegal enum value `{value}` in `{}`", tok.text)
        }
        if res.iter().any(|it| it == value) {
            bail!(tok.pos, "duplicate enum value `{value}` in `{}`", tok.text)
        }
        res.push(value.to_string());
    }
    Ok(res)
}

/// `a.b.c!`
fn command_path(tok: &Token) -> Result<Vec<String>> {
    let text = tok.text.as_str();
    let path = text.strip_suffix('!').unwrap_or(text);
    path.split('.')
        .map(|name| {
            if !ident_re().is_match(name) {
                bail!(tok.pos, "illegal command name `{name}` in `{text}`")
            }
            Ok(name.to_string())
        })
        .collect()
}

struct Parser<'t> {
    rtokens: Vec<&'t Token>,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        let mut rtokens = tokens.iter().collect::<Vec<_>>();
        rtokens.reverse();
        Self { rtokens }
    }

    fn next(&mut self) -> Option<&'t Token> {
        self.rtokens.pop()
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        match self.rtokens.last() {
            Some(tok) if tok.kind == kind => self.next(),
            _ => None,
        }
    }
}
