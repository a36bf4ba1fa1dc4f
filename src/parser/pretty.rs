//! Expression and pattern printing.
//!
//! Printing inverts the grammar's desugarings where a surface form exists:
//! an application of an infix operator to a positional pair prints back in
//! infix form, numbers drop a trailing `.0`, and forms that the grammar only
//! accepts parenthesized (lambdas, ascriptions) always print parenthesized.
//! Re-parsing printed output yields the original tree.

use std::fmt;

use crate::builtins;
use crate::types::print_type;

use super::ast::{Exp, Pattern};

pub fn print_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Render an expression. `prec > 0` parenthesizes the forms that do not
/// self-delimit in argument position (plain applications and `let`).
pub fn print_exp(e: &Exp, prec: u8) -> String {
    match e {
        Exp::Num(n) => print_number(*n),
        Exp::Char(c) => format!("'{c}'"),
        Exp::Var(name) | Exp::Op(name) => name.clone(),

        Exp::Lam(pattern, body) => {
            format!("({} => {})", print_pattern(pattern), print_exp(body, 0))
        }

        Exp::App(f, arg) => {
            if let Some((op, lhs, rhs)) = as_infix(f, arg) {
                return format!("({} {op} {})", print_exp(lhs, 1), print_exp(rhs, 1));
            }
            let fs = match f.as_ref() {
                Exp::Let(..) => format!("({})", print_exp(f, 0)),
                _ => print_exp(f, 0),
            };
            let s = format!("{fs} {}", print_exp(arg, 1));
            if prec > 0 {
                format!("({s})")
            } else {
                s
            }
        }

        Exp::List(items) => {
            let body = items
                .iter()
                .map(|e| print_exp(e, 0))
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{body}]")
        }

        Exp::Rec(fields) => print_exp_row(fields, '{', '}'),
        Exp::Variant(fields) => print_exp_row(fields, '<', '>'),

        Exp::Tup(items) => {
            let body = (0..items.len())
                .filter_map(|i| items.get(&i.to_string()))
                .map(|e| print_exp(e, 0))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({body})")
        }

        Exp::Tag(label) => format!("#{label}"),
        Exp::Import(name) => format!("import {name}"),

        Exp::Ascribe(t, e) => format!("({} : {})", print_type(t, 0), print_exp(e, 0)),

        Exp::Let(pattern, bound, body) => {
            let bs = match bound.as_ref() {
                Exp::Let(..) => format!("({})", print_exp(bound, 0)),
                _ => print_exp(bound, 0),
            };
            let s = format!("let {} = {bs};\n{}", print_pattern(pattern), print_exp(body, 0));
            if prec > 0 {
                format!("({s})")
            } else {
                s
            }
        }
    }
}

/// An application of an infix operator to a positional pair.
fn as_infix<'a>(f: &'a Exp, arg: &'a Exp) -> Option<(&'a str, &'a Exp, &'a Exp)> {
    let Exp::Op(op) = f else {
        return None;
    };
    if !builtins::INFIX_OPS.contains(&op.as_str()) {
        return None;
    }
    let Exp::Tup(pair) = arg else {
        return None;
    };
    if pair.len() != 2 {
        return None;
    }
    Some((op, pair.get("0")?, pair.get("1")?))
}

fn print_exp_row(fields: &crate::util::Row<Exp>, open: char, close: char) -> String {
    let body = fields
        .iter()
        .map(|(l, e)| format!("{l}: {}", print_exp(e, 0)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{open}{body}{close}")
}

pub fn print_pattern(p: &Pattern) -> String {
    match p {
        Pattern::Wild => "_".to_string(),
        Pattern::Var(name) => name.clone(),
        Pattern::Rec(fields) => {
            let body = fields
                .iter()
                .map(|(l, p)| format!("{l}: {}", print_pattern(p)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{body}}}")
        }
    }
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_exp(self, 0))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_pattern(self))
    }
}
