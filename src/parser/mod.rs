//! Grammar for expressions, patterns, and types.
//!
//! The grammar is built from the backtracking combinators in
//! [`combinators`]. Ordered alternation (`biased_choice`) resolves every
//! intended overlap, so a well-formed input has exactly one complete
//! derivation; [`parse`] classifies anything else as a parse failure,
//! trailing input, or a genuine ambiguity.
//!
//! Desugarings performed here:
//! - `e.label` / `e.index` become an application of a record-pattern lambda;
//! - `e1 op e2` becomes `op (e1, e2)` for the infix operator symbols;
//! - `e1; e2` becomes `let _ = e1; e2`;
//! - `"abc"` becomes a list of character literals;
//! - `(e1, e2, ...)` becomes a positional tuple with labels `0`, `1`, ...
//!   (a parenthesized singleton just groups).

pub mod ast;
pub mod combinators;
pub mod pretty;
#[cfg(test)]
mod proptests;

use crate::builtins;
use crate::error::ParseError;
use crate::types::{TVarId, Type};
use crate::util::{row_of, Row};

pub use ast::{Exp, Pattern};
use combinators::{
    biased_choice, fail, lazy, lexeme, many, optional, pure, sep_by, token, Parser,
};

const KEYWORDS: &[&str] = &["let", "import", "mu", "forall"];

/// Parse a complete expression.
pub fn parse(input: &str) -> Result<Exp, ParseError> {
    classify(exp().parse(input))
}

/// Parse a complete type (the surface syntax of ascriptions and operator
/// schemes).
pub fn parse_type(input: &str) -> Result<Type, ParseError> {
    classify(ty().parse(input))
}

fn classify<A: Clone>(results: Vec<(A, &str)>) -> Result<A, ParseError> {
    if results.is_empty() {
        return Err(ParseError::NoParse);
    }
    let complete: Vec<&A> = results
        .iter()
        .filter(|(_, rest)| rest.trim_start().is_empty())
        .map(|(a, _)| a)
        .collect();
    match complete.len() {
        1 => Ok(complete[0].clone()),
        0 => {
            let remainder = results
                .iter()
                .map(|(_, rest)| rest.trim_start())
                .min_by_key(|r| r.len())
                .unwrap_or("");
            Err(ParseError::Trailing {
                remainder: remainder.to_string(),
            })
        }
        count => Err(ParseError::Ambiguous { count }),
    }
}

// ---------------------------------------------------------------------------
// Expressions

fn exp<'s>() -> Parser<'s, Exp> {
    biased_choice(vec![
        let_exp(),
        seq_exp(),
        ascribe_exp(lazy(|| exp())),
        lambda_exp(lazy(|| exp())),
        infix_exp(),
    ])
}

/// The expression level allowed left of `;`: everything except `let` and
/// sequencing themselves (those recurse only on the right).
fn exp_no_let<'s>() -> Parser<'s, Exp> {
    biased_choice(vec![
        ascribe_exp(lazy(|| exp_no_let())),
        lambda_exp(lazy(|| exp_no_let())),
        infix_exp(),
    ])
}

fn let_exp<'s>() -> Parser<'s, Exp> {
    keyword("let").bind(|_| {
        pattern().bind(|p| {
            token("=").bind(move |_| {
                let p = p.clone();
                exp_no_let().bind(move |bound| {
                    let p = p.clone();
                    token(";").bind(move |_| {
                        let p = p.clone();
                        let bound = bound.clone();
                        lazy(|| exp()).map(move |body| Exp::let_in(p.clone(), bound.clone(), body))
                    })
                })
            })
        })
    })
}

fn seq_exp<'s>() -> Parser<'s, Exp> {
    exp_no_let().bind(|e1| {
        token(";").bind(move |_| {
            let e1 = e1.clone();
            lazy(|| exp()).map(move |e2| Exp::let_in(Pattern::Wild, e1.clone(), e2))
        })
    })
}

fn ascribe_exp<'s>(body: Parser<'s, Exp>) -> Parser<'s, Exp> {
    ty().bind(move |t| {
        let body = body.clone();
        token(":").bind(move |_| {
            let t = t.clone();
            body.map(move |e| Exp::Ascribe(t.clone(), Box::new(e)))
        })
    })
}

fn lambda_exp<'s>(body: Parser<'s, Exp>) -> Parser<'s, Exp> {
    pattern().bind(move |p| {
        let body = body.clone();
        token("=>").bind(move |_| {
            let p = p.clone();
            body.map(move |e| Exp::lam(p.clone(), e))
        })
    })
}

/// Left-associative chain of applications joined by infix operator symbols,
/// each desugared to `op (lhs, rhs)`.
fn infix_exp<'s>() -> Parser<'s, Exp> {
    app_exp().bind(|first| {
        many(infix_tail()).map(move |pairs| {
            pairs.into_iter().fold(first.clone(), |lhs, (op, rhs)| {
                Exp::app(Exp::Op(op), Exp::Tup(row_of([("0", lhs), ("1", rhs)])))
            })
        })
    })
}

fn infix_tail<'s>() -> Parser<'s, (String, Exp)> {
    infix_op().and(app_exp())
}

fn infix_op<'s>() -> Parser<'s, String> {
    biased_choice(
        builtins::INFIX_OPS
            .iter()
            .map(|&sym| token(sym).map(move |_| sym.to_string()))
            .collect(),
    )
}

/// Juxtaposition: one or more atoms, folded into applications function-first.
fn app_exp<'s>() -> Parser<'s, Exp> {
    atomic_exp().bind(|first| {
        many(atomic_exp()).map(move |args| args.into_iter().fold(first.clone(), Exp::app))
    })
}

fn atomic_exp<'s>() -> Parser<'s, Exp> {
    base_exp().bind(|e| {
        projections().map(move |labels| {
            labels.into_iter().fold(e.clone(), |acc, l| project(acc, &l))
        })
    })
}

fn projections<'s>() -> Parser<'s, Vec<String>> {
    many(token(".").bind(|_| label()))
}

fn project(e: Exp, label: &str) -> Exp {
    let pat = Pattern::Rec(row_of([(label, Pattern::Var(label.to_string()))]));
    Exp::app(Exp::lam(pat, Exp::var(label)), e)
}

fn base_exp<'s>() -> Parser<'s, Exp> {
    biased_choice(vec![
        paren_exp(),
        list_exp(),
        rec_exp(),
        variant_exp(),
        tag_exp(),
        import_exp(),
        named_op_exp(),
        prefix_op_exp(),
        number_exp(),
        char_exp(),
        string_exp(),
        var_exp(),
    ])
}

fn paren_exp<'s>() -> Parser<'s, Exp> {
    token("(").bind(|_| {
        sep_by(lazy(|| exp()), token(",")).bind(|items| {
            token(")").map(move |_| {
                let mut items = items.clone();
                if items.len() == 1 {
                    items.remove(0)
                } else {
                    Exp::Tup(positional(items))
                }
            })
        })
    })
}

fn positional<A>(items: Vec<A>) -> Row<A> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, x)| (i.to_string(), x))
        .collect()
}

fn list_exp<'s>() -> Parser<'s, Exp> {
    token("[").bind(|_| {
        sep_by(lazy(|| exp()), token(","))
            .bind(|items| token("]").map(move |_| Exp::List(items.clone())))
    })
}

fn rec_exp<'s>() -> Parser<'s, Exp> {
    token("{").bind(|_| {
        exp_row().bind(|fields| token("}").map(move |_| Exp::Rec(fields.clone())))
    })
}

fn variant_exp<'s>() -> Parser<'s, Exp> {
    token("<").bind(|_| {
        exp_row().bind(|fields| token(">").map(move |_| Exp::Variant(fields.clone())))
    })
}

fn exp_row<'s>() -> Parser<'s, Row<Exp>> {
    sep_by(exp_field(), token(",")).map(|fields| fields.into_iter().collect())
}

fn exp_field<'s>() -> Parser<'s, (String, Exp)> {
    label().bind(|l| {
        token(":").bind(move |_| {
            let l = l.clone();
            lazy(|| exp()).map(move |e| (l.clone(), e))
        })
    })
}

/// A field label: an identifier, or digits for positional fields.
fn label<'s>() -> Parser<'s, String> {
    biased_choice(vec![lexeme(ident_len), lexeme(digits_len)]).map(|s| s.to_string())
}

fn tag_exp<'s>() -> Parser<'s, Exp> {
    lexeme(tag_len).map(|s| Exp::Tag(s[1..].to_string()))
}

fn import_exp<'s>() -> Parser<'s, Exp> {
    keyword("import").bind(|_| lexeme(ident_len).map(|name| Exp::Import(name.to_string())))
}

fn named_op_exp<'s>() -> Parser<'s, Exp> {
    biased_choice(
        builtins::NAMED_OPS
            .iter()
            .map(|&name| keyword(name).map(move |_| Exp::Op(name.to_string())))
            .collect(),
    )
}

fn prefix_op_exp<'s>() -> Parser<'s, Exp> {
    biased_choice(
        builtins::PREFIX_OPS
            .iter()
            .map(|&sym| token(sym).map(move |_| Exp::Op(sym.to_string())))
            .collect(),
    )
}

fn number_exp<'s>() -> Parser<'s, Exp> {
    lexeme(number_len).bind(|s| match s.parse::<f64>() {
        Ok(n) => pure(Exp::Num(n)),
        Err(_) => fail(),
    })
}

fn char_exp<'s>() -> Parser<'s, Exp> {
    lexeme(char_len).bind(|s| match s.chars().nth(1) {
        Some(c) => pure(Exp::Char(c)),
        None => fail(),
    })
}

fn string_exp<'s>() -> Parser<'s, Exp> {
    lexeme(string_len).map(|s| Exp::List(s[1..s.len() - 1].chars().map(Exp::Char).collect()))
}

fn var_exp<'s>() -> Parser<'s, Exp> {
    lexeme(ident_len).bind(|name| {
        if KEYWORDS.contains(&name) {
            fail()
        } else {
            pure(Exp::Var(name.to_string()))
        }
    })
}

// ---------------------------------------------------------------------------
// Patterns

fn pattern<'s>() -> Parser<'s, Pattern> {
    biased_choice(vec![
        token("_").map(|_| Pattern::Wild),
        var_pattern(),
        rec_pattern(),
        tuple_pattern(),
    ])
}

fn var_pattern<'s>() -> Parser<'s, Pattern> {
    lexeme(ident_len).bind(|name| {
        if KEYWORDS.contains(&name) {
            fail()
        } else {
            pure(Pattern::Var(name.to_string()))
        }
    })
}

fn rec_pattern<'s>() -> Parser<'s, Pattern> {
    token("{").bind(|_| {
        sep_by(pattern_field(), token(",")).bind(|fields| {
            token("}").map(move |_| Pattern::Rec(fields.iter().cloned().collect()))
        })
    })
}

fn pattern_field<'s>() -> Parser<'s, (String, Pattern)> {
    label().bind(|l| {
        token(":").bind(move |_| {
            let l = l.clone();
            lazy(|| pattern()).map(move |p| (l.clone(), p))
        })
    })
}

fn tuple_pattern<'s>() -> Parser<'s, Pattern> {
    token("(").bind(|_| {
        sep_by(lazy(|| pattern()), token(",")).bind(|items| {
            token(")").map(move |_| {
                let mut items = items.clone();
                if items.len() == 1 {
                    items.remove(0)
                } else {
                    Pattern::Rec(positional(items))
                }
            })
        })
    })
}

// ---------------------------------------------------------------------------
// Types

fn ty<'s>() -> Parser<'s, Type> {
    biased_choice(vec![fun_type(), atomic_type()])
}

fn fun_type<'s>() -> Parser<'s, Type> {
    atomic_type().bind(|arg| {
        token("->").bind(move |_| {
            let arg = arg.clone();
            lazy(|| ty()).map(move |result| Type::fun(arg.clone(), result))
        })
    })
}

fn atomic_type<'s>() -> Parser<'s, Type> {
    biased_choice(vec![
        keyword("N").map(|_| Type::Num),
        keyword("C").map(|_| Type::Char),
        list_type(),
        paren_type(),
        rec_type(),
        variant_type(),
        mu_type(),
        forall_type(),
        var_type(),
    ])
}

fn list_type<'s>() -> Parser<'s, Type> {
    token("[").bind(|_| {
        lazy(|| ty()).bind(|t| token("]").map(move |_| Type::list(t.clone())))
    })
}

fn paren_type<'s>() -> Parser<'s, Type> {
    token("(").bind(|_| {
        sep_by(lazy(|| ty()), token(",")).bind(|items| {
            token(")").map(move |_| {
                let mut items = items.clone();
                match items.len() {
                    0 => Type::Unit,
                    1 => items.remove(0),
                    _ => Type::rec_closed(positional(items)),
                }
            })
        })
    })
}

fn rec_type<'s>() -> Parser<'s, Type> {
    token("{").bind(|_| {
        type_row().bind(|(fields, tail)| {
            token("}").map(move |_| match (fields.is_empty(), tail.clone()) {
                (true, None) => Type::Unit,
                (_, tail) => Type::Rec(fields.clone(), Box::new(tail.unwrap_or(Type::Unit))),
            })
        })
    })
}

fn variant_type<'s>() -> Parser<'s, Type> {
    token("<").bind(|_| {
        type_row().bind(|(fields, tail)| {
            token(">").map(move |_| match (fields.is_empty(), tail.clone()) {
                (true, None) => Type::Empty,
                (_, tail) => Type::Variant(fields.clone(), Box::new(tail.unwrap_or(Type::Empty))),
            })
        })
    })
}

fn type_row<'s>() -> Parser<'s, (Row<Type>, Option<Type>)> {
    sep_by(type_field(), token(",")).bind(|fields| {
        optional(token("|").bind(|_| lazy(|| ty())))
            .map(move |tail| (fields.iter().cloned().collect(), tail))
    })
}

fn type_field<'s>() -> Parser<'s, (String, Type)> {
    label().bind(|l| {
        token(":").bind(move |_| {
            let l = l.clone();
            lazy(|| ty()).map(move |t| (l.clone(), t))
        })
    })
}

fn mu_type<'s>() -> Parser<'s, Type> {
    keyword("mu").bind(|_| binder_body(Type::Mu))
}

fn forall_type<'s>() -> Parser<'s, Type> {
    keyword("forall").bind(|_| binder_body(Type::Forall))
}

fn binder_body<'s>(make: fn(TVarId, Box<Type>) -> Type) -> Parser<'s, Type> {
    lexeme(type_var_len).bind(move |v| {
        let id = letter_id(v);
        token(".").bind(move |_| lazy(|| ty()).map(move |body| make(id, Box::new(body))))
    })
}

fn var_type<'s>() -> Parser<'s, Type> {
    lexeme(type_var_len).map(|s| Type::Var(letter_id(s)))
}

/// Map a surface letter `a`–`z` to its reserved variable id.
fn letter_id(s: &str) -> TVarId {
    s.bytes().next().map_or(0, |b| (b - b'a') as TVarId)
}

// ---------------------------------------------------------------------------
// Lexical matchers

/// Skip leading whitespace, then match `word` up to a word boundary.
fn keyword<'s>(word: &'static str) -> Parser<'s, &'s str> {
    Parser::new(move |input| {
        let trimmed = input.trim_start();
        match trimmed.strip_prefix(word) {
            Some(rest) if !rest.starts_with(|c: char| c.is_ascii_alphanumeric()) => {
                vec![(&trimmed[..word.len()], rest)]
            }
            _ => Vec::new(),
        }
    })
}

fn ident_len(s: &str) -> Option<usize> {
    let len = s.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
    (len > 0).then_some(len)
}

fn digits_len(s: &str) -> Option<usize> {
    let len = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    (len > 0).then_some(len)
}

fn tag_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('#')?;
    let len = rest.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
    (len > 0).then_some(1 + len)
}

/// A single lowercase letter not followed by another word character.
fn type_var_len(s: &str) -> Option<usize> {
    let mut bytes = s.bytes();
    if !bytes.next()?.is_ascii_lowercase() {
        return None;
    }
    match bytes.next() {
        Some(b) if b.is_ascii_alphanumeric() => None,
        _ => Some(1),
    }
}

/// Signed decimal: `-?(0|[1-9][0-9]*)(.[0-9]+)?([eE][+-]?[0-9]+)?`.
fn number_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    let int_start = i;
    if bytes.get(i) == Some(&b'0') {
        i += 1;
    } else {
        while bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
            i += 1;
        }
    }
    if i == int_start {
        return None;
    }
    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while bytes.get(j).is_some_and(|b| b.is_ascii_digit()) {
            j += 1;
        }
        if j > frac_start {
            i = j;
        }
    }
    if matches!(bytes.get(i), Some(&b'e') | Some(&b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(&b'+') | Some(&b'-')) {
            j += 1;
        }
        let exp_start = j;
        while bytes.get(j).is_some_and(|b| b.is_ascii_digit()) {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some(i)
}

fn char_len(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    if chars.next()? != '\'' {
        return None;
    }
    let c = chars.next()?;
    if c == '\'' {
        return None;
    }
    if chars.next()? != '\'' {
        return None;
    }
    Some(2 + c.len_utf8())
}

fn string_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('"')?;
    Some(rest.find('"')? + 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::row_of;

    fn num(n: f64) -> Exp {
        Exp::Num(n)
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse("42"), Ok(num(42.0)));
        assert_eq!(parse("-3.5"), Ok(num(-3.5)));
        assert_eq!(parse("2e3"), Ok(num(2000.0)));
    }

    #[test]
    fn test_parse_char_and_string() {
        assert_eq!(parse("'a'"), Ok(Exp::Char('a')));
        assert_eq!(
            parse("\"hi\""),
            Ok(Exp::List(vec![Exp::Char('h'), Exp::Char('i')]))
        );
    }

    #[test]
    fn test_parse_infix_desugars() {
        let expected = Exp::app(
            Exp::Op("+".to_string()),
            Exp::Tup(row_of([("0", num(1.0)), ("1", num(2.0))])),
        );
        assert_eq!(parse("1 + 2"), Ok(expected));
    }

    #[test]
    fn test_parse_infix_left_assoc() {
        let inner = Exp::app(
            Exp::Op("-".to_string()),
            Exp::Tup(row_of([("0", num(5.0)), ("1", num(2.0))])),
        );
        let expected = Exp::app(
            Exp::Op("-".to_string()),
            Exp::Tup(row_of([("0", inner), ("1", num(1.0))])),
        );
        assert_eq!(parse("5 - 2 - 1"), Ok(expected));
    }

    #[test]
    fn test_parse_lambda() {
        assert_eq!(
            parse("x => x"),
            Ok(Exp::lam(Pattern::Var("x".to_string()), Exp::var("x")))
        );
    }

    #[test]
    fn test_parse_application_is_function_first() {
        assert_eq!(
            parse("f x y"),
            Ok(Exp::app(
                Exp::app(Exp::var("f"), Exp::var("x")),
                Exp::var("y")
            ))
        );
    }

    #[test]
    fn test_parse_let() {
        assert_eq!(
            parse("let x = 1; x"),
            Ok(Exp::let_in(
                Pattern::Var("x".to_string()),
                num(1.0),
                Exp::var("x")
            ))
        );
    }

    #[test]
    fn test_parse_sequence_is_wildcard_let() {
        assert_eq!(
            parse("1; 2"),
            Ok(Exp::let_in(Pattern::Wild, num(1.0), num(2.0)))
        );
    }

    #[test]
    fn test_parse_let_allowed_in_lambda_body() {
        let body = Exp::let_in(Pattern::Var("y".to_string()), num(1.0), Exp::var("y"));
        assert_eq!(
            parse("x => let y = 1; y"),
            Ok(Exp::lam(Pattern::Var("x".to_string()), body))
        );
    }

    #[test]
    fn test_parse_projection_desugars() {
        let pat = Pattern::Rec(row_of([("x", Pattern::Var("x".to_string()))]));
        let expected = Exp::app(Exp::lam(pat, Exp::var("x")), Exp::var("r"));
        assert_eq!(parse("r.x"), Ok(expected));
    }

    #[test]
    fn test_parse_record_and_variant() {
        assert_eq!(
            parse("{a: 1, b: 2}"),
            Ok(Exp::Rec(row_of([("a", num(1.0)), ("b", num(2.0))])))
        );
        assert_eq!(
            parse("<ok: x => x>"),
            Ok(Exp::Variant(row_of([(
                "ok",
                Exp::lam(Pattern::Var("x".to_string()), Exp::var("x"))
            )])))
        );
    }

    #[test]
    fn test_parse_tuple_and_group() {
        assert_eq!(
            parse("(1, 2)"),
            Ok(Exp::Tup(row_of([("0", num(1.0)), ("1", num(2.0))])))
        );
        assert_eq!(parse("(1)"), Ok(num(1.0)));
        assert_eq!(parse("()"), Ok(Exp::Tup(Row::new())));
    }

    #[test]
    fn test_parse_tag_and_import() {
        assert_eq!(parse("#some 1"), Ok(Exp::app(Exp::Tag("some".to_string()), num(1.0))));
        assert_eq!(parse("import prelude"), Ok(Exp::Import("prelude".to_string())));
    }

    #[test]
    fn test_parse_ascription() {
        assert_eq!(
            parse("N : 1"),
            Ok(Exp::Ascribe(Type::Num, Box::new(num(1.0))))
        );
    }

    #[test]
    fn test_keyword_boundary() {
        assert_eq!(parse("letter"), Ok(Exp::var("letter")));
    }

    #[test]
    fn test_trailing_input_is_reported() {
        assert_eq!(
            parse("1 +"),
            Err(ParseError::Trailing {
                remainder: "+".to_string()
            })
        );
    }

    #[test]
    fn test_empty_input_is_no_parse() {
        assert_eq!(parse(""), Err(ParseError::NoParse));
        assert_eq!(parse("   "), Err(ParseError::NoParse));
    }

    #[test]
    fn test_parse_type_fun_right_assoc() {
        assert_eq!(
            parse_type("N -> N -> C"),
            Ok(Type::fun(Type::Num, Type::fun(Type::Num, Type::Char)))
        );
    }

    #[test]
    fn test_parse_type_tuple_scheme() {
        assert_eq!(
            parse_type("(N, N) -> N"),
            Ok(Type::fun(
                Type::rec_closed(row_of([("0", Type::Num), ("1", Type::Num)])),
                Type::Num
            ))
        );
    }

    #[test]
    fn test_parse_type_rows() {
        assert_eq!(
            parse_type("{x: N|a}"),
            Ok(Type::Rec(
                row_of([("x", Type::Num)]),
                Box::new(Type::Var(0))
            ))
        );
        assert_eq!(parse_type("{}"), Ok(Type::Unit));
        assert_eq!(parse_type("<>"), Ok(Type::Empty));
    }

    #[test]
    fn test_parse_type_binders() {
        assert_eq!(
            parse_type("forall a. [a] -> N"),
            Ok(Type::forall(0, Type::fun(Type::list(Type::Var(0)), Type::Num)))
        );
        assert_eq!(
            parse_type("(mu b. {head: N, tail: b})"),
            Ok(Type::mu(
                1,
                Type::rec_closed(row_of([("head", Type::Num), ("tail", Type::Var(1))]))
            ))
        );
    }
}
