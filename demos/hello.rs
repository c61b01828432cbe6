const USAGE: &str = "
    Greets people

    -e,emoji # Add an emoji
    +l,loud
    -n,times=#

    polite! # Be polite about it
    -t,title=TITLE:mr,ms,dr

    -- NAME...
";

fn main() {
    let grammar = match optdsl::compile_with(&optdsl::Config::standard(), "hello", USAGE) {
        Ok(it) => it,
        Err(err) => {
            eprintln!("invalid usage string: {err}");
            std::process::exit(2)
        }
    };

    let (flags, names) = match grammar.interpret(std::env::args().skip(1)) {
        Ok(it) => it,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("usage: {}", grammar.usage());
            std::process::exit(1)
        }
    };
    if flags.has("help") {
        println!("usage: {}", grammar.usage());
        return;
    }

    let bang = if flags.has("emoji") { "❣️" } else { "!" };
    let times = match flags.get("times") {
        Some(optdsl::Binding::Value(Some(optdsl::Value::Int(n)))) => n.max(1),
        _ => 1,
    };
    let title = match flags.subcommand().and_then(|it| it.get("title")) {
        Some(optdsl::Binding::Value(Some(title))) => format!("{title}. "),
        _ => String::new(),
    };
    for name in &names {
        let mut line = format!("Hello {title}{name}{bang}");
        if let Some(optdsl::Binding::Count(n)) = flags.get("loud") {
            line = line.to_uppercase() + &"!".repeat(n);
        }
        for _ in 0..times {
            println!("{line}");
        }
    }
}
