use std::io::BufRead;

use clap::Parser;
use miette::LabeledSpan;
use tinycas::{lexer, parser, Bindings, Evaluator, Number, Unbound};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Input {
    /// The expression to evaluate. Reads one expression per line from stdin if omitted.
    expression: Option<String>,

    /// Bind a name to a value, e.g. `--let x=4` or `--let r=1/3`
    #[clap(long = "let", value_name = "NAME=VALUE", value_parser = parse_binding)]
    bindings: Vec<(String, Number)>,

    /// Fail on names without a binding and on function calls instead of treating them as zero.
    #[clap(long, default_value = "false")]
    strict: bool,

    /// Print the parsed tree before its value.
    #[clap(long, default_value = "false")]
    tree: bool,

    /// Debug the lexer, printing out each token. Does not parse or evaluate.
    #[clap(long, default_value = "false")]
    debug_lexer: bool,

    /// Debug the parser, printing out the tree. Does not evaluate.
    #[clap(long, default_value = "false")]
    debug_parser: bool,
}

fn parse_binding(s: &str) -> Result<(String, Number), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{s}'"));
    }

    Ok((name.to_string(), value.parse()?))
}

fn main() {
    let input = Input::parse();

    match &input.expression {
        Some(source) => {
            if !run(&input, source) {
                std::process::exit(1);
            }
        }
        None => {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        eprintln!("{:?}", miette::miette!("failed to read input: {e}"));
                        std::process::exit(1);
                    }
                };

                if !line.trim().is_empty() {
                    run(&input, &line);
                }
            }
        }
    }
}

/// Handles one expression, reporting any error. Returns whether it succeeded.
fn run(input: &Input, source: &str) -> bool {
    if input.debug_lexer {
        return run_debug_lexer(source);
    }

    if input.debug_parser {
        return run_debug_parser(source);
    }

    let tree = match parser::parse(source) {
        Ok(tree) => tree,
        Err(e) => return report(e, source),
    };

    if input.tree {
        println!("{tree}");
        println!("{tree:?}");
    }

    let bindings: Bindings = input.bindings.iter().cloned().collect();
    let unbound = if input.strict {
        Unbound::Error
    } else {
        Unbound::Zero
    };

    match Evaluator::new(&bindings).with_unbound(unbound).evaluate(&tree) {
        Ok(value) => {
            println!("{value}");
            true
        }
        Err(e) => report(e, source),
    }
}

fn report(error: tinycas::Error, source: &str) -> bool {
    let report = miette::Report::new(error).with_source_code(source.to_string());
    eprintln!("{:?}", report);
    false
}

fn run_debug_lexer(source: &str) -> bool {
    for token in lexer::Lexer::new(source) {
        match token {
            Ok(t) => {
                let diag = miette::miette!(
                    labels = vec![LabeledSpan::at(t.span.start..t.span.end, format!("{:?}", t.kind))],
                    severity = miette::Severity::Advice,
                    "found a token",
                )
                .with_source_code(source.to_string());
                eprintln!("{:?}", diag);
            }
            Err(e) => return report(e, source),
        }
    }

    true
}

fn run_debug_parser(source: &str) -> bool {
    let tree = match parser::parse(source) {
        Ok(tree) => tree,
        Err(e) => return report(e, source),
    };

    dbg!(tree);
    true
}
