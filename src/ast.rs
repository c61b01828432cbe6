use crate::{lexer::Pos, ty::ArgType};

/// Unlinked declarations. `cmds[0]` is the program.
#[derive(Debug)]
pub(crate) struct Program {
    pub(crate) name: String,
    pub(crate) cmds: Vec<Cmd>,
}

#[derive(Debug)]
pub(crate) struct Cmd {
    /// Dotted path, empty for the program.
    pub(crate) path: Vec<String>,
    pub(crate) pos: Pos,
    pub(crate) opts: Vec<Opt>,
    pub(crate) args: Vec<String>,
    pub(crate) doc: Doc,
}

#[derive(Debug)]
pub(crate) struct Opt {
    pub(crate) names: Vec<String>,
    pub(crate) repeatable: bool,
    pub(crate) arg: Option<ArgSpec>,
    pub(crate) pos: Pos,
    pub(crate) doc: Doc,
}

#[derive(Debug)]
pub(crate) struct ArgSpec {
    pub(crate) label: Option<String>,
    pub(crate) ty: ArgType,
    pub(crate) optional: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Doc {
    pub(crate) brief: Option<String>,
    pub(crate) descr: Vec<String>,
}

impl Cmd {
    pub(crate) fn new(path: Vec<String>, pos: Pos) -> Cmd {
        Cmd { path, pos, opts: Vec::new(), args: Vec::new(), doc: Doc::default() }
    }

    pub(crate) fn is_program(&self) -> bool {
        self.path.is_empty()
    }

    pub(crate) fn has_name(&self, name: &str) -> bool {
        self.opts.iter().any(|opt| opt.names.iter().any(|it| it == name))
    }
}
