use std::collections::HashSet;

use expect_test::expect;
use optdsl::{ArgType, Config, ErrorKind, FsKind, Grammar};

const GIT: &str = "
    Distributed version control

    -C=PATH:EDIR # Run as if started in PATH
    +c=CONFIG
    --version

    clone! ++ REPOSITORY DIRECTORY
    # Clone a repository into a new directory
      Clones a repository into a newly created directory.
    -b,branch=NAME
    --depth=#
    -q,quiet

    remote! # Manage set of tracked repositories
    -v,verbose

    remote.add! ++ NAME URL
    -t,track=BRANCH
    -f

    remote.remove! ++ NAME
";

fn git() -> Grammar {
    optdsl::compile("git", GIT).unwrap()
}

#[test]
fn introspection() {
    let grammar = git();
    let program = grammar.program();
    assert_eq!(program.descr(), ["Distributed version control"]);

    let names = grammar.subcommands_of(program).map(|it| it.name()).collect::<Vec<_>>();
    assert_eq!(names, vec!["clone", "remote"]);

    let clone = grammar.find_command("clone").unwrap();
    assert_eq!(clone.ident(), "clone!");
    assert_eq!(clone.brief(), Some("Clone a repository into a new directory"));
    assert_eq!(clone.descr(), ["Clones a repository into a newly created directory."]);
    assert_eq!(clone.args(), ["REPOSITORY", "DIRECTORY"]);

    let depth = grammar.option(clone.find_option("depth").unwrap());
    assert_eq!(depth.arg().map(|it| &it.ty), Some(&ArgType::Integer));
    assert_eq!(depth.arg().map(|it| it.label.as_str()), Some("INT"));

    let c = grammar.option(program.find_option("C").unwrap());
    assert_eq!(c.arg().map(|it| &it.ty), Some(&ArgType::Fs(FsKind::EDir)));
    assert_eq!(c.brief(), Some("Run as if started in PATH"));

    let add = grammar.find_command("remote.add").unwrap();
    assert_eq!(grammar.parent_of(add).map(|it| it.name()), Some("remote"));

    expect![[r#"
        git -C PATH -c CONFIG --version [clone|remote]
        git clone -b NAME --depth=INT -q REPOSITORY DIRECTORY
        git remote -v [add|remove]
        git remote add -t BRANCH -f NAME URL
        git remote remove NAME
    "#]]
    .assert_eq(&grammar.commands().map(|it| format!("{}\n", it.usage())).collect::<String>());
}

#[test]
fn malformed_label() {
    let err = optdsl::compile("git", "+c=NAME=VALUE").unwrap_err();
    assert_eq!(err.to_string(), "1:1: illegal argument `NAME=VALUE` in `+c=NAME=VALUE`");
}

#[test]
fn deterministic() {
    assert_eq!(git(), git());
    assert_eq!(format!("{:?}", git()), format!("{:?}", git()));
}

#[test]
fn names_are_unique_per_command() {
    let grammar = git();
    for cmd in grammar.commands() {
        let mut seen = HashSet::new();
        for opt in grammar.options_of(cmd) {
            assert!(!opt.names().is_empty());
            assert_eq!(opt.short_names().count() + opt.long_names().count(), opt.names().len());
            for name in opt.names() {
                assert!(seen.insert(name.clone()), "{name}");
            }
        }
    }
}

#[test]
fn compile_errors() {
    let cases = [
        ("-a !b", ErrorKind::Lexer, "1:4: unexpected `!b`, expected an option or a command"),
        ("-a=N:bogus", ErrorKind::Parser, "1:1: unknown argument type `bogus` in `-a=N:bogus`"),
        ("-a\n-b\n-a", ErrorKind::Analyzer, "3:1: duplicate option name `a`"),
        (
            "cmd!\ncmd.sub.deep!",
            ErrorKind::Analyzer,
            "2:1: no such command `cmd.sub`, parent of `cmd.sub.deep`",
        ),
        (
            "\n-a Include all files\n",
            ErrorKind::Lexer,
            "2:4: unexpected `Include`, expected `-Include` or `+Include`",
        ),
    ];
    for (src, kind, msg) in cases {
        let err = optdsl::compile("prog", src).unwrap_err();
        assert_eq!(err.kind(), kind, "{src}");
        assert!(err.kind().is_compile());
        assert!(err.pos().is_some());
        assert_eq!(err.to_string(), msg);
    }
}

#[test]
fn standard_options() {
    let config = Config { quiet: true, ..Config::standard() };
    let grammar = optdsl::compile_with(&config, "prog", "-q,query= cmd!").unwrap();
    assert_eq!(grammar.usage(), "prog -q VAL -h --version [cmd]");

    let (parsed, _) = grammar.interpret(["--help"]).unwrap();
    assert!(parsed.has("help"));
    let cmd = grammar.find_command("cmd").unwrap();
    assert!(cmd.find_option("help").is_none());
}

#[test]
#[should_panic]
fn foreign_command_id() {
    let git = git();
    let add = git.find_command("remote.add").unwrap().id();
    let small = optdsl::compile("prog", "a").unwrap();
    small.command(add);
}

#[test]
fn unprefixed_first_line_is_description() {
    let grammar = optdsl::compile("prog", "a b\ncmd!").unwrap();
    assert_eq!(grammar.program().descr(), ["a b"]);
    assert!(grammar.program().options().is_empty());
    assert_eq!(grammar.usage(), "prog [cmd]");

    let grammar = optdsl::compile("prog", "a b cmd!").unwrap();
    assert_eq!(grammar.usage(), "prog -a -b [cmd]");
}
