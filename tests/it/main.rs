mod compile;
mod interpret;

use std::fmt::Write;

use expect_test::Expect;
use optdsl::ParsedCommand;

/// Interprets `args` against `grammar` and renders one line per command and
/// option, followed by the leftover arguments.
fn check(grammar: &str, args: &str, expect: Expect) {
    let grammar = optdsl::compile("prog", grammar).unwrap();
    let args = args.split_ascii_whitespace().collect::<Vec<_>>();
    match grammar.interpret(args) {
        Ok((parsed, rest)) => expect.assert_eq(&render(&parsed, &rest)),
        Err(err) => expect.assert_eq(&err.to_string()),
    }
}

fn render(parsed: &ParsedCommand<'_>, args: &[String]) -> String {
    let mut buf = String::new();
    let mut cur = Some(parsed);
    while let Some(cmd) = cur {
        let name = if cmd.command().is_program() { "prog" } else { cmd.command().name() };
        let _ = writeln!(buf, "{name}");
        for opt in cmd.options() {
            match opt.value() {
                Some(value) => {
                    let _ = writeln!(buf, "  {} = {value:?}", opt.flag());
                }
                None => {
                    let _ = writeln!(buf, "  {}", opt.flag());
                }
            }
        }
        cur = cmd.subcommand();
    }
    let _ = writeln!(buf, "args: {args:?}");
    buf
}
