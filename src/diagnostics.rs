//! Diagnostic printing for pipeline errors.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::error::{EvalError, LangError, ParseError, TypeError};

/// Print an error as a colored report against its source text.
pub fn print_error(filename: &str, source: &str, error: &LangError) {
    let (message, span, help) = describe(source, error);

    let mut report = Report::build(ReportKind::Error, (filename, span.clone()))
        .with_message(&message)
        .with_label(
            Label::new((filename, span))
                .with_message(&message)
                .with_color(Color::Red),
        );

    if let Some(help_text) = help {
        report.add_help(help_text);
    }

    report
        .finish()
        .eprint((filename, Source::from(source)))
        .unwrap();
}

fn describe(
    source: &str,
    error: &LangError,
) -> (String, std::ops::Range<usize>, Option<String>) {
    let whole = 0..source.len();
    match error {
        LangError::Parse(e) => match e {
            ParseError::NoParse => ("No valid parse".to_string(), whole, None),
            ParseError::Ambiguous { count } => (
                format!("Ambiguous parse: {count} complete derivations"),
                whole,
                None,
            ),
            ParseError::Trailing { remainder } => (
                "Unconsumed input".to_string(),
                // The remainder is a trimmed suffix of the source.
                source.len().saturating_sub(remainder.len())..source.len(),
                None,
            ),
        },

        LangError::Type(e) => match e {
            TypeError::UnboundVariable { name } => {
                (format!("Undefined variable '{name}'"), whole, None)
            }
            TypeError::UnknownOperator { name } => {
                (format!("Unknown operator '{name}'"), whole, None)
            }
            TypeError::Mismatch { left, right } => (
                format!("Cannot unify types: {left} == {right}"),
                whole,
                None,
            ),
            TypeError::UnfoldDivergence { left, right } => (
                format!("Divergence: unfold limit reached comparing {left} == {right}"),
                whole,
                Some("These recursive types never reach a comparable shape".to_string()),
            ),
            TypeError::SolveDivergence => (
                "Divergence: equation solving did not reach a fixpoint".to_string(),
                whole,
                None,
            ),
        },

        LangError::Eval(e) => match e {
            EvalError::UnboundVariable { name } => {
                (format!("Undefined variable '{name}'"), whole, None)
            }
            EvalError::UnknownOperator { name } => {
                (format!("Unknown operator '{name}'"), whole, None)
            }
            EvalError::NotAFunction => ("Value is not a function".to_string(), whole, None),
            EvalError::MissingField { label } => {
                (format!("Record has no field '{label}'"), whole, None)
            }
            EvalError::UnhandledTag { label } => (
                format!("No handler for tag '{label}'"),
                whole,
                Some("Add a handler for this tag to the variant literal".to_string()),
            ),
            EvalError::PatternMismatch => {
                ("Value does not match pattern".to_string(), whole, None)
            }
            EvalError::ImportFailed { name } => (
                format!("Import of '{name}' failed"),
                whole,
                Some("The session's import resolver knows no module by this name".to_string()),
            ),
        },
    }
}
