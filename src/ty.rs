//! Argument types: validation and conversion of option values.
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use regex::Regex;

const DEVICES: [&str; 4] = ["/dev/stdin", "/dev/stdout", "/dev/stderr", "/dev/null"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    String,
    Integer,
    Float,
    /// Exact membership in an ordered set of values.
    Enum(Vec<String>),
    Fs(FsKind),
}

/// Filesystem argument kinds, spelled as in the usage string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsKind {
    File,
    Dir,
    Path,
    Node,
    EFile,
    EDir,
    EPath,
    NFile,
    NDir,
    NPath,
    IFile,
    OFile,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
}

#[derive(Clone, Copy)]
enum Object {
    File,
    Dir,
    Path,
    Node,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// If it exists it must be of the right kind.
    Default,
    Exist,
    New,
}

impl FsKind {
    const ALL: [FsKind; 12] = [
        FsKind::File,
        FsKind::Dir,
        FsKind::Path,
        FsKind::Node,
        FsKind::EFile,
        FsKind::EDir,
        FsKind::EPath,
        FsKind::NFile,
        FsKind::NDir,
        FsKind::NPath,
        FsKind::IFile,
        FsKind::OFile,
    ];

    pub fn from_keyword(kw: &str) -> Option<FsKind> {
        FsKind::ALL.into_iter().find(|it| it.keyword() == kw)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            FsKind::File => "FILE",
            FsKind::Dir => "DIR",
            FsKind::Path => "PATH",
            FsKind::Node => "NODE",
            FsKind::EFile => "EFILE",
            FsKind::EDir => "EDIR",
            FsKind::EPath => "EPATH",
            FsKind::NFile => "NFILE",
            FsKind::NDir => "NDIR",
            FsKind::NPath => "NPATH",
            FsKind::IFile => "IFILE",
            FsKind::OFile => "OFILE",
        }
    }

    fn label(self) -> &'static str {
        match self {
            FsKind::IFile | FsKind::OFile => "FILE",
            _ => self.split().0.label(),
        }
    }

    fn split(self) -> (Object, Mode) {
        match self {
            FsKind::File | FsKind::IFile | FsKind::OFile => (Object::File, Mode::Default),
            FsKind::Dir => (Object::Dir, Mode::Default),
            FsKind::Path => (Object::Path, Mode::Default),
            FsKind::Node => (Object::Node, Mode::Default),
            FsKind::EFile => (Object::File, Mode::Exist),
            FsKind::EDir => (Object::Dir, Mode::Exist),
            FsKind::EPath => (Object::Path, Mode::Exist),
            FsKind::NFile => (Object::File, Mode::New),
            FsKind::NDir => (Object::Dir, Mode::New),
            FsKind::NPath => (Object::Path, Mode::New),
        }
    }

    fn check(self, name: &str, literal: &str) -> Result<(), String> {
        let err = |what: &str| Err(format!("`{name}`: {what}: `{literal}`"));
        let path = Path::new(literal);
        let (object, mode) = self.split();
        if DEVICES.contains(&literal) {
            return match object {
                Object::Dir => err("not a directory"),
                Object::File | Object::Path | Object::Node => Ok(()),
            };
        }
        match self {
            FsKind::IFile => {
                if literal == "-" {
                    return Ok(());
                }
                match fs::metadata(path) {
                    Ok(meta) if !meta.is_file() => err("not a file"),
                    Ok(_) => match fs::File::open(path) {
                        Ok(_) => Ok(()),
                        Err(_) => err("can't read file"),
                    },
                    Err(e) if e.kind() == io::ErrorKind::NotFound => err("no such file"),
                    Err(e) => err(&format!("can't access ({e})")),
                }
            }
            FsKind::OFile => {
                if literal == "-" {
                    return Ok(());
                }
                match fs::metadata(path) {
                    Ok(meta) if !meta.is_file() => err("not a file"),
                    Ok(_) => match fs::OpenOptions::new().append(true).open(path) {
                        Ok(_) => Ok(()),
                        Err(_) => err("can't write file"),
                    },
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        match fs::metadata(parent(path)) {
                            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => Ok(()),
                            Ok(meta) if meta.is_dir() => err("can't create file"),
                            _ => err("no such directory"),
                        }
                    }
                    Err(e) => err(&format!("can't access ({e})")),
                }
            }
            _ => match fs::metadata(path) {
                Ok(_) if mode == Mode::New => err(&format!("{} exists", object.noun())),
                Ok(meta) if object.accepts(&meta) => Ok(()),
                Ok(_) => err(&format!("not a {}", object.noun())),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    if mode == Mode::Exist {
                        return err(&format!("no such {}", object.noun()));
                    }
                    match fs::metadata(parent(path)) {
                        Ok(meta) if meta.is_dir() => Ok(()),
                        _ => err("no such directory"),
                    }
                }
                Err(e) => err(&format!("can't access ({e})")),
            },
        }
    }
}

impl Object {
    fn accepts(self, meta: &fs::Metadata) -> bool {
        match self {
            Object::File => meta.is_file(),
            Object::Dir => meta.is_dir(),
            Object::Path => meta.is_file() || meta.is_dir(),
            Object::Node => true,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Object::File => "file",
            Object::Dir => "directory",
            Object::Path => "file or directory",
            Object::Node => "path",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Object::File => "FILE",
            Object::Dir => "DIR",
            Object::Path => "PATH",
            Object::Node => "NODE",
        }
    }
}

fn parent(path: &Path) -> PathBuf {
    match path.parent() {
        Some(it) if !it.as_os_str().is_empty() => it.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => path.to_path_buf(),
    }
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+$").unwrap())
}

fn float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?([eE][-+]?\d+)?$").unwrap())
}

impl ArgType {
    /// Label used in usage strings when the declaration doesn't name one.
    pub fn default_label(&self) -> String {
        match self {
            ArgType::String => "VAL".to_string(),
            ArgType::Integer => "INT".to_string(),
            ArgType::Float => "NUM".to_string(),
            ArgType::Enum(values) => values.join("|"),
            ArgType::Fs(kind) => kind.label().to_string(),
        }
    }

    /// Validates `literal` given for the option spelled `name`.
    ///
    /// The error describes the problem in terms of both.
    pub fn check(&self, name: &str, literal: &str) -> Result<(), String> {
        match self {
            ArgType::String => Ok(()),
            ArgType::Integer => {
                if !integer_re().is_match(literal) {
                    return Err(format!("`{name}` expects an integer, got `{literal}`"));
                }
                match literal.parse::<i64>() {
                    Ok(_) => Ok(()),
                    Err(_) => Err(format!("`{name}` integer out of range: `{literal}`")),
                }
            }
            ArgType::Float => {
                if float_re().is_match(literal) {
                    Ok(())
                } else {
                    Err(format!("`{name}` expects a decimal number, got `{literal}`"))
                }
            }
            ArgType::Enum(values) => {
                if values.iter().any(|it| it == literal) {
                    Ok(())
                } else {
                    Err(format!("`{name}` expects one of {}, got `{literal}`", values.join(", ")))
                }
            }
            ArgType::Fs(kind) => kind.check(name, literal),
        }
    }

    /// Converts a literal that passed [`ArgType::check`].
    ///
    /// Numeric literals that don't parse are kept as strings.
    pub fn convert(&self, literal: &str) -> Value {
        let str = || Value::Str(literal.to_string());
        match self {
            ArgType::Integer => literal.parse().map(Value::Int).unwrap_or_else(|_| str()),
            ArgType::Float => literal.parse().map(Value::Float).unwrap_or_else(|_| str()),
            ArgType::String | ArgType::Enum(_) | ArgType::Fs(_) => str(),
        }
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(it) => Some(it),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(it) => Some(*it),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(it) => Some(*it),
            Value::Int(it) => Some(*it as f64),
            Value::Str(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(it) => fmt::Display::fmt(it, f),
            Value::Int(it) => fmt::Display::fmt(it, f),
            Value::Float(it) => fmt::Display::fmt(it, f),
        }
    }
}
