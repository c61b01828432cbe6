//! Links declarations into a [`Grammar`]: parents, lookup maps, usage lines.
use std::collections::{btree_map::Entry, BTreeMap};

use crate::{
    ast,
    grammar::{is_short, Arg, CmdId, Command, Grammar, Opt, OptId},
    Error, ErrorKind, Result,
};

macro_rules! bail {
    ($pos:expr, $($tt:tt)*) => {
        return Err(Error::new(ErrorKind::Analyzer, Some($pos), format!($($tt)*)))
    };
}

pub(crate) fn link(program: ast::Program) -> Result<Grammar> {
    let ast::Program { name, cmds: decls } = program;
    if decls.first().map_or(true, |it| !it.is_program()) {
        let msg = "program is not the first command".to_string();
        return Err(Error::new(ErrorKind::Internal, None, msg));
    }

    let mut paths = BTreeMap::new();
    let mut cmds = Vec::with_capacity(decls.len());
    for (idx, decl) in decls.iter().enumerate() {
        let id = CmdId(idx);
        paths.entry(decl.path.clone()).or_insert(id);
        let ident = match decl.path.last() {
            Some(name) => format!("{}!", name.replace('-', "_")),
            None => String::new(),
        };
        cmds.push(Command {
            id,
            path: decl.path.clone(),
            ident,
            parent: None,
            opts: Vec::new(),
            subcommands: Vec::new(),
            opt_map: BTreeMap::new(),
            cmd_map: BTreeMap::new(),
            args: decl.args.clone(),
            brief: decl.doc.brief.clone(),
            descr: decl.doc.descr.clone(),
            usage: String::new(),
            pos: decl.pos,
        });
    }

    // Commands may be declared in any order, so parents are resolved once
    // every path is known.
    for (idx, decl) in decls.iter().enumerate().skip(1) {
        let id = CmdId(idx);
        let parent_path = &decl.path[..decl.path.len() - 1];
        let Some(&parent) = paths.get(parent_path) else {
            bail!(
                decl.pos,
                "no such command `{}`, parent of `{}`",
                parent_path.join("."),
                decl.path.join(".")
            )
        };
        cmds[idx].parent = Some(parent);

        let name = cmds[idx].name().to_string();
        let ident = cmds[idx].ident.clone();
        let siblings = &mut cmds[parent.0].cmd_map;
        if siblings.insert(name.clone(), id).is_some() {
            bail!(decl.pos, "duplicate command `{}`", decl.path.join("."))
        }
        if siblings.insert(ident.clone(), id).is_some() {
            bail!(decl.pos, "duplicate command identifier `{ident}` for `{}`", decl.path.join("."))
        }
        cmds[parent.0].subcommands.push(id);
    }

    let mut opts: Vec<Opt> = Vec::new();
    for (idx, decl) in decls.into_iter().enumerate() {
        let owner = CmdId(idx);
        for opt in decl.opts {
            let id = OptId(opts.len());
            let name = opt
                .names
                .iter()
                .find(|it| !is_short(it))
                .or_else(|| opt.names.first())
                .cloned()
                .unwrap_or_default();
            let ident = name.replace('-', "_");

            let map = &mut cmds[idx].opt_map;
            for key in &opt.names {
                if let Some(prev) = map.insert(key.clone(), id) {
                    let clash = prev != id
                        && opts[prev.0].ident == *key
                        && !opts[prev.0].names.contains(key);
                    if clash {
                        bail!(opt.pos, "duplicate option identifier `{key}`")
                    }
                    bail!(opt.pos, "duplicate option name `{key}`")
                }
            }
            match map.entry(ident.clone()) {
                Entry::Occupied(it) if *it.get() != id => {
                    bail!(opt.pos, "duplicate option identifier `{ident}`")
                }
                Entry::Occupied(_) => (),
                Entry::Vacant(it) => {
                    it.insert(id);
                }
            }
            cmds[idx].opts.push(id);

            let arg = opt.arg.map(|arg| Arg {
                label: arg.label.unwrap_or_else(|| arg.ty.default_label()),
                ty: arg.ty,
                optional: arg.optional,
            });
            opts.push(Opt {
                id,
                owner,
                names: opt.names,
                name,
                ident,
                repeatable: opt.repeatable,
                arg,
                brief: opt.doc.brief,
                descr: opt.doc.descr,
                pos: opt.pos,
            });
        }
    }

    let mut grammar = Grammar { name, cmds, opts };
    let usages = grammar.cmds.iter().map(|cmd| usage(&grammar, cmd)).collect::<Vec<_>>();
    for (cmd, usage) in grammar.cmds.iter_mut().zip(usages) {
        cmd.usage = usage;
    }

    tracing::debug!(
        program = %grammar.name,
        commands = grammar.cmds.len(),
        options = grammar.opts.len(),
        "linked grammar"
    );
    Ok(grammar)
}

fn usage(grammar: &Grammar, cmd: &Command) -> String {
    let mut words = vec![grammar.name.clone()];
    words.extend(cmd.path.iter().cloned());
    words.extend(grammar.options_of(cmd).map(Opt::render));
    if !cmd.subcommands.is_empty() {
        let names = grammar.subcommands_of(cmd).map(Command::name).collect::<Vec<_>>();
        words.push(format!("[{}]", names.join("|")));
    }
    words.extend(cmd.args.iter().cloned());
    words.join(" ")
}
