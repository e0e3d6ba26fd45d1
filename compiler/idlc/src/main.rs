//! IDL compiler command-line driver.

use idlc::commands::{canonical_names, check_selector, explain_error, method_ordinal};
use idlc::{init_tracing, CommandError};

fn usage(program: &str) {
    eprintln!("Usage: {program} <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  ordinal <library> <protocol> <method> [--selector <s>]");
    eprintln!("                               Print a method's ordinal");
    eprintln!("  selector <value>             Check a @selector value");
    eprintln!("  canonical <identifier>...    Print canonical names");
    eprintln!("  explain <code>               Explain an error code (e.g. E1001)");
    eprintln!("  help                         Show this message");
    eprintln!();
    eprintln!("Logging: IDLC_LOG=<filter> (default warn), IDLC_LOG_TREE=1 for tree output");
}

fn run_ordinal(args: &[String]) -> Result<String, CommandError> {
    let mut positional = Vec::new();
    let mut selector = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--selector" {
            let value = iter
                .next()
                .ok_or(CommandError::MissingArgument("selector value"))?;
            selector = Some(value.as_str());
        } else if let Some(value) = arg.strip_prefix("--selector=") {
            selector = Some(value);
        } else {
            positional.push(arg.as_str());
        }
    }
    match positional.as_slice() {
        [library, protocol, method] => method_ordinal(library, protocol, method, selector),
        [] => Err(CommandError::MissingArgument("library")),
        [_] => Err(CommandError::MissingArgument("protocol")),
        [_, _] => Err(CommandError::MissingArgument("method")),
        [_, _, _, extra, ..] => Err(CommandError::UnexpectedArgument((*extra).to_owned())),
    }
}

fn single<'a>(args: &'a [String], what: &'static str) -> Result<&'a str, CommandError> {
    match args {
        [value] => Ok(value.as_str()),
        [] => Err(CommandError::MissingArgument(what)),
        [_, extra, ..] => Err(CommandError::UnexpectedArgument(extra.clone())),
    }
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map_or("idlc", String::as_str);

    let Some(command) = args.get(1) else {
        usage(program);
        std::process::exit(2);
    };
    let rest = &args[2..];

    let result = match command.as_str() {
        "ordinal" => run_ordinal(rest),
        "selector" => single(rest, "selector").and_then(check_selector),
        "canonical" => canonical_names(rest),
        "explain" => single(rest, "error code").and_then(explain_error),
        "help" | "--help" | "-h" => {
            usage(program);
            return;
        }
        _ => {
            eprintln!("Unknown command: {command}");
            usage(program);
            std::process::exit(2);
        }
    };

    match result {
        Ok(output) => {
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
        }
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
}
