//! Canonical type printing.
//!
//! The printed form is the surface syntax the type parser accepts, and it is
//! also used verbatim as the key of deferred equations, so two types print
//! identically iff the solver should treat them as the same entry.

use std::fmt;

use super::ty::{TVarId, Type};

/// Render a variable id: `a`–`z` for the letter-bound ids, `t{n}` above them.
pub fn print_var(id: TVarId) -> String {
    if id < 26 {
        char::from(b'a' + id as u8).to_string()
    } else {
        format!("t{id}")
    }
}

/// Render a type at the given precedence level. `prec > 0` parenthesizes
/// function arrows; `mu`/`forall` are always parenthesized.
pub fn print_type(t: &Type, prec: u8) -> String {
    match t {
        Type::Num => "N".to_string(),
        Type::Char => "C".to_string(),
        Type::Unit => "{}".to_string(),
        Type::Empty => "<>".to_string(),

        Type::Fun(arg, result) => {
            let s = format!("{} -> {}", print_type(arg, 1), print_type(result, 0));
            if prec > 0 {
                format!("({s})")
            } else {
                s
            }
        }

        Type::List(elem) => format!("[{}]", print_type(elem, 0)),

        Type::Rec(fields, tail) => print_row(fields, tail, &Type::Unit, '{', '}'),
        Type::Variant(fields, tail) => print_row(fields, tail, &Type::Empty, '<', '>'),

        Type::Var(id) => print_var(*id),

        Type::Mu(var, body) => format!("(mu {}. {})", print_var(*var), print_type(body, 0)),
        Type::Forall(var, body) => {
            format!("(forall {}. {})", print_var(*var), print_type(body, 0))
        }
    }
}

fn print_row(
    fields: &crate::util::Row<Type>,
    tail: &Type,
    closed: &Type,
    open: char,
    close: char,
) -> String {
    let body = fields
        .iter()
        .map(|(l, t)| format!("{l}: {}", print_type(t, 0)))
        .collect::<Vec<_>>()
        .join(", ");
    if tail == closed {
        format!("{open}{body}{close}")
    } else {
        format!("{open}{body}|{}{close}", print_type(tail, 0))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_type(self, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::row_of;

    #[test]
    fn test_print_base_types() {
        assert_eq!(Type::Num.to_string(), "N");
        assert_eq!(Type::Char.to_string(), "C");
        assert_eq!(Type::Unit.to_string(), "{}");
        assert_eq!(Type::Empty.to_string(), "<>");
    }

    #[test]
    fn test_print_fun_right_assoc() {
        let t = Type::fun(Type::Num, Type::fun(Type::Char, Type::Num));
        assert_eq!(t.to_string(), "N -> C -> N");
        let u = Type::fun(Type::fun(Type::Num, Type::Char), Type::Num);
        assert_eq!(u.to_string(), "(N -> C) -> N");
    }

    #[test]
    fn test_print_vars() {
        assert_eq!(Type::Var(0).to_string(), "a");
        assert_eq!(Type::Var(25).to_string(), "z");
        assert_eq!(Type::Var(26).to_string(), "t26");
    }

    #[test]
    fn test_print_rows() {
        let closed = Type::rec_closed(row_of([("x", Type::Num)]));
        assert_eq!(closed.to_string(), "{x: N}");
        let open = Type::Rec(row_of([("x", Type::Num)]), Box::new(Type::Var(1)));
        assert_eq!(open.to_string(), "{x: N|b}");
        let variant = Type::Variant(row_of([("ok", Type::Num)]), Box::new(Type::Var(2)));
        assert_eq!(variant.to_string(), "<ok: N|c>");
    }

    #[test]
    fn test_print_binders_parenthesized() {
        let t = Type::mu(0, Type::fun(Type::Var(0), Type::Num));
        assert_eq!(t.to_string(), "(mu a. a -> N)");
        let u = Type::forall(1, Type::list(Type::Var(1)));
        assert_eq!(u.to_string(), "(forall b. [b])");
    }
}
