//! Splits a usage string into declaration, text and marker tokens.
use std::{fmt, sync::OnceLock};

use regex::Regex;

use crate::{Error, ErrorKind, Result};

macro_rules! bail {
    ($pos:expr, $($tt:tt)*) => {
        return Err(Error::new(ErrorKind::Lexer, Some($pos), format!($($tt)*)))
    };
}

/// 1-based line and column in the usage string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Program,
    Option,
    Command,
    /// Bare `--`: the words that follow are the program's trailing arguments.
    Tail,
    /// Bare `++`: the words that follow are arguments of the current command.
    CmdArgs,
    Arg,
    Brief,
    Text,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
    pub(crate) pos: Pos,
}

fn option_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\+\+?|--?)?[A-Za-z0-9]").unwrap())
}

fn command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*!$").unwrap())
}

pub(crate) fn lex(program: &str, src: &str) -> Result<Vec<Token>> {
    let compact = src.trim().lines().count() <= 1;
    let mut res = vec![Token {
        kind: TokenKind::Program,
        text: program.to_string(),
        pos: Pos { line: 0, col: 0 },
    }];

    let lines = src.lines().enumerate().skip_while(|(_, line)| line.trim().is_empty());
    for (idx, line) in lines {
        let line_no = idx + 1;
        let words = words(line);
        let Some(&(col, first)) = words.first() else {
            let pos = Pos { line: line_no, col: 1 };
            res.push(Token { kind: TokenKind::Blank, text: String::new(), pos });
            continue;
        };
        let pos = Pos { line: line_no, col };
        if first.starts_with("##") {
            continue;
        }
        if first.starts_with('#') {
            let text = brief(&line_text(line, col)[1..]);
            res.push(Token { kind: TokenKind::Brief, text, pos });
        } else if compact || is_decl(first) {
            declaration_line(&mut res, line, line_no, &words, compact)?;
        } else {
            res.push(Token { kind: TokenKind::Text, text: line.trim().to_string(), pos });
        }
    }
    tracing::debug!(program, tokens = res.len(), compact, "lexed usage string");
    Ok(res)
}

fn is_decl(word: &str) -> bool {
    has_prefix(word) || command_re().is_match(word)
}

fn has_prefix(word: &str) -> bool {
    word.starts_with(['-', '+'])
}

fn declaration_line(
    res: &mut Vec<Token>,
    line: &str,
    line_no: usize,
    words: &[(usize, &str)],
    compact: bool,
) -> Result<()> {
    let mut args = false;
    for &(col, word) in words {
        let pos = Pos { line: line_no, col };
        let kind = if word.starts_with('#') {
            let text = brief(&line_text(line, col)[1..]);
            res.push(Token { kind: TokenKind::Brief, text, pos });
            break;
        } else if word == "--" {
            args = true;
            TokenKind::Tail
        } else if word == "++" {
            args = true;
            TokenKind::CmdArgs
        } else if args {
            TokenKind::Arg
        } else if command_re().is_match(word) {
            TokenKind::Command
        } else if option_re().is_match(word) && (compact || has_prefix(word)) {
            TokenKind::Option
        } else if option_re().is_match(word) {
            // Only a single-line usage string may leave options unprefixed.
            bail!(pos, "unexpected `{word}`, expected `-{word}` or `+{word}`")
        } else {
            bail!(pos, "unexpected `{word}`, expected an option or a command")
        };
        res.push(Token { kind, text: word.to_string(), pos });
    }
    Ok(())
}

fn brief(text: &str) -> String {
    text.trim().to_string()
}

/// The rest of `line` starting at 1-based character column `col`.
fn line_text(line: &str, col: usize) -> &str {
    match line.char_indices().nth(col - 1) {
        Some((offset, _)) => &line[offset..],
        None => "",
    }
}

/// Whitespace separated words with their 1-based character columns.
fn words(line: &str) -> Vec<(usize, &str)> {
    let mut res = Vec::new();
    let mut start = None;
    let mut col = 0;
    for (i, (offset, c)) in line.char_indices().enumerate() {
        match (c.is_whitespace(), start) {
            (false, None) => {
                start = Some(offset);
                col = i + 1;
            }
            (true, Some(s)) => {
                res.push((col, &line[s..offset]));
                start = None;
            }
            _ => (),
        }
    }
    if let Some(s) = start {
        res.push((col, &line[s..]));
    }
    res
}
