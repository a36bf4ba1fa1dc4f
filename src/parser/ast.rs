//! Expression and pattern trees.

use crate::types::Type;
use crate::util::Row;

#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
    /// Bind a single name.
    Var(String),
    /// Match anything, bind nothing.
    Wild,
    /// Match a record with at least the given fields.
    Rec(Row<Pattern>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Exp {
    Num(f64),
    Char(char),
    /// Variable reference.
    Var(String),
    /// Primitive-operator reference, resolved against the operator table.
    Op(String),
    /// Lambda `pattern => body`.
    Lam(Pattern, Box<Exp>),
    /// Application, function first.
    App(Box<Exp>, Box<Exp>),
    List(Vec<Exp>),
    /// Record literal; fields may refer to the whole record as `this`.
    Rec(Row<Exp>),
    /// Positional tuple `(e1, ..., ek)` with labels `0`..`k-1`. A closed
    /// record value, but unlike `Rec` it does not rebind `this`.
    Tup(Row<Exp>),
    /// Variant literal: a row of handlers, evaluating to a dispatcher.
    Variant(Row<Exp>),
    /// Tag constructor `#label`.
    Tag(String),
    /// Import by module name, resolved by the host.
    Import(String),
    /// Ascription `T : e`.
    Ascribe(Type, Box<Exp>),
    /// `let pattern = e1; e2` (sequencing uses the wildcard pattern).
    Let(Pattern, Box<Exp>, Box<Exp>),
}

impl Exp {
    pub fn app(f: Exp, arg: Exp) -> Self {
        Exp::App(Box::new(f), Box::new(arg))
    }

    pub fn lam(pattern: Pattern, body: Exp) -> Self {
        Exp::Lam(pattern, Box::new(body))
    }

    pub fn let_in(pattern: Pattern, bound: Exp, body: Exp) -> Self {
        Exp::Let(pattern, Box::new(bound), Box::new(body))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Exp::Var(name.into())
    }
}
