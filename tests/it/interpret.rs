use expect_test::expect;
use optdsl::{Binding, ErrorKind, Value};

use crate::check;

#[test]
fn smoke() {
    check(
        "-a,all +v,verbose n,number=# --mode=fast,slow -- FILE",
        "-a -v --verbose -n 92 --mode=slow . rest",
        expect![[r#"
            prog
              -a
              -v
              --verbose
              -n = Int(92)
              --mode = Str("slow")
            args: [".", "rest"]
        "#]],
    );
    check("-a,all", "--werbose", expect!["Unknown option `--werbose`"]);
    check("n=#", "-n", expect!["Missing argument for option `-n`"]);
    check("n=#", "-nXYZ", expect!["`-n` expects an integer, got `XYZ`"]);
    check("n,number=#", "-n 1 --number 2", expect!["Duplicate option `--number`"]);
    check("x=$", "-x 2.", expect!["`-x` expects a decimal number, got `2.`"]);
    check(
        "--mode=fast,slow",
        "--mode=medium",
        expect!["`--mode` expects one of fast, slow, got `medium`"],
    );
}

#[test]
fn duplicate_option() {
    check("a", "-a -a", expect!["Duplicate option `-a`"]);
}

#[test]
fn repeated_arguments() {
    check(
        "+a=",
        "-a 1 -a 2",
        expect![[r#"
            prog
              -a = Str("1")
              -a = Str("2")
            args: []
        "#]],
    );

    let grammar = optdsl::compile("prog", "+a=").unwrap();
    let (parsed, _) = grammar.interpret(["-a", "1", "-a", "2"]).unwrap();
    assert_eq!(
        parsed.get("a"),
        Some(Binding::List(vec![
            Some(Value::Str("1".to_string())),
            Some(Value::Str("2".to_string())),
        ]))
    );
}

#[test]
fn clustered_short_options() {
    check(
        "-a -b -c",
        "-abc",
        expect![[r#"
            prog
              -a
              -b
              -c
            args: []
        "#]],
    );
    check(
        "-a -b= -c",
        "-abc",
        expect![[r#"
            prog
              -a
              -b = Str("c")
            args: []
        "#]],
    );
    check("-a -b -c", "-abd", expect!["Unknown option `-d`"]);
}

#[test]
fn optional_argument() {
    check(
        "d=?",
        "-d x",
        expect![[r#"
            prog
              -d
            args: ["x"]
        "#]],
    );
    check("d,dir=?", "-dx --dir=y", expect!["Duplicate option `--dir`"]);
    check(
        "+d,dir=?",
        "-dx --dir=y --dir",
        expect![[r#"
            prog
              -d = Str("x")
              --dir = Str("y")
              --dir
            args: []
        "#]],
    );
}

#[test]
fn subcommands() {
    check(
        "cmd1! cmd1.cmd2!",
        "cmd1 cmd2",
        expect![[r#"
            prog
            cmd1
            cmd2
            args: []
        "#]],
    );
    check(
        "a cmd1! b=# cmd1.cmd2! c cmd3!",
        "-a cmd1 -b 3 cmd2 -c file -c",
        expect![[r#"
            prog
              -a
            cmd1
              -b = Int(3)
            cmd2
              -c
            args: ["file", "-c"]
        "#]],
    );
    check("a cmd1! b", "cmd1 -a", expect!["Unknown option `-a` for command `cmd1`"]);
    check(
        "cmd1! cmd3!",
        "cmd1 cmd3",
        expect![[r#"
            prog
            cmd1
            args: ["cmd3"]
        "#]],
    );
}

#[test]
fn explicit_terminator() {
    check(
        "a",
        "-a -- -b x",
        expect![[r#"
            prog
              -a
            args: ["-b", "x"]
        "#]],
    );
    check(
        "cmd!",
        "cmd -- cmd",
        expect![[r#"
            prog
            cmd
            args: ["cmd"]
        "#]],
    );
}

#[test]
fn error_kinds() {
    let grammar = optdsl::compile("prog", "a").unwrap();
    let err = grammar.interpret(["-b"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::User);
    assert!(!err.kind().is_compile());
    assert_eq!(err.pos(), None);
}

#[test]
fn filesystem_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    std::fs::write(&input, "data").unwrap();
    let input = input.to_str().unwrap();
    let output = dir.path().join("output.txt");
    let output = output.to_str().unwrap();

    let grammar = optdsl::compile("prog", "i,input=IFILE o,output=OFILE d=EDIR").unwrap();
    let (parsed, _) = grammar.interpret(["-i", input, "-o", output]).unwrap();
    assert_eq!(parsed.get("input"), Some(Binding::Value(Some(Value::Str(input.to_string())))));
    assert_eq!(parsed.get("output"), Some(Binding::Value(Some(Value::Str(output.to_string())))));

    let err = grammar.interpret(["-d", input]).unwrap_err();
    assert_eq!(err.to_string(), format!("`-d`: not a directory: `{input}`"));
    let err = grammar.interpret(["--input", output]).unwrap_err();
    assert_eq!(err.to_string(), format!("`--input`: no such file: `{output}`"));
}

#[test]
fn usage_round_trip() {
    let grammar = optdsl::compile("prog", "a b=# c,count=$ --level=LEVEL -- FILE").unwrap();
    assert_eq!(grammar.usage(), "prog -a -b INT -c NUM --level=LEVEL FILE");

    let argv = grammar
        .usage()
        .replace("INT", "5")
        .replace("NUM", "1.5")
        .replace("LEVEL", "high")
        .replace("FILE", "input");
    let argv = argv.split_whitespace().skip(1).collect::<Vec<_>>();
    let (parsed, args) = grammar.interpret(argv).unwrap();
    assert_eq!(parsed.get("a"), Some(Binding::Set));
    assert_eq!(parsed.get("b"), Some(Binding::Value(Some(Value::Int(5)))));
    assert_eq!(parsed.get("count"), Some(Binding::Value(Some(Value::Float(1.5)))));
    assert_eq!(parsed.get("level"), Some(Binding::Value(Some(Value::Str("high".to_string())))));
    assert_eq!(args, vec!["input"]);
}

#[test]
fn grammar_is_reusable() {
    let grammar = optdsl::compile("prog", "+v n=#").unwrap();
    let runs = std::thread::scope(|s| {
        let handles = (1..=4)
            .map(|n| {
                let grammar = &grammar;
                s.spawn(move || {
                    let n = n.to_string();
                    let (parsed, _) = grammar.interpret(["-v", "-n", n.as_str()]).unwrap();
                    parsed.get("n")
                })
            })
            .collect::<Vec<_>>();
        handles.into_iter().map(|it| it.join().unwrap()).collect::<Vec<_>>()
    });
    assert_eq!(runs[3], Some(Binding::Value(Some(Value::Int(4)))));
}

#[test]
fn bindings_view() {
    let grammar = optdsl::compile("prog", "a,all +v +I,include= --dry-run").unwrap();
    let (parsed, _) = grammar.interpret(["-vav", "-Isrc", "--dry-run", "-I", "lib"]).unwrap();
    expect![[r#"
        {
            "all": Set,
            "dry_run": Set,
            "include": List(
                [
                    Some(
                        Str(
                            "src",
                        ),
                    ),
                    Some(
                        Str(
                            "lib",
                        ),
                    ),
                ],
            ),
            "v": Count(
                2,
            ),
        }
    "#]]
    .assert_debug_eq(&parsed.bindings());
}
