//! Rowlang CLI: type and evaluate one expression.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use rowlang::diagnostics::print_error;
use rowlang::error::Result;
use rowlang::session::Session;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: rowlang <file.row> | rowlang -");
        eprintln!("       rowlang --help");
        return ExitCode::from(1);
    }

    if args[1] == "--help" || args[1] == "-h" {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args[1] == "--version" || args[1] == "-V" {
        println!("rowlang {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let (source, filename) = if args[1] == "-" {
        let mut source = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading stdin: {}", e);
            return ExitCode::from(1);
        }
        (source, "<stdin>".to_string())
    } else {
        let filename = &args[1];
        match fs::read_to_string(filename) {
            Ok(source) => (source, filename.clone()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", filename, e);
                return ExitCode::from(1);
            }
        }
    };

    match run(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_error(&filename, &source, &error);
            ExitCode::from(1)
        }
    }
}

fn run(source: &str) -> Result<()> {
    let mut session = Session::new();
    let printed = session.parse(source)?;
    println!("// Parse: {}", printed);
    let ty = session.type_of(source)?;
    println!("// Type: {}", ty);
    let value = session.evaluate(source)?;
    println!("{}", value);
    Ok(())
}

fn print_help() {
    println!(
        r#"rowlang - a structurally typed expression language

USAGE:
    rowlang <file.row>   Type and evaluate an expression file
    rowlang -            Read from stdin

OPTIONS:
    -h, --help           Print help information
    -V, --version        Print version information

DESCRIPTION:
    A rowlang program is a single expression. The CLI prints its inferred
    type, then its value as JSON. The language features:

    - Row polymorphism for records and variants
    - Equirecursive types for self-referential values
    - Lazy records where `this` names the record itself
    - A closed table of operators: + - * # & map

EXAMPLES:
    rowlang example.row           Run example.row
    echo "1 + 2" | rowlang -      Run an expression from stdin
"#
    );
}
