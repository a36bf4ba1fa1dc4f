//! Core type representation.
//!
//! Records and variants are row types: a field row plus a `tail` that is
//! either the closed sentinel (`Unit` for records, `Empty` for variants), an
//! open variable, or a further row to be flattened away. `Mu` and `Forall`
//! are the equirecursive and rank-1 universal binders.

use std::collections::HashSet;

use crate::util::{row_map, Row};

/// Unique identifier for type variables. Ids 0–25 are reserved for the
/// surface letters `a`–`z`; fresh session variables start above them.
pub type TVarId = u32;

/// First id handed out by the session's fresh-variable counter.
pub const FIRST_FRESH: TVarId = 26;

#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    /// Number type `N`.
    Num,
    /// Character type `C`.
    Char,
    /// Closed-record sentinel `{}`.
    Unit,
    /// Closed-variant sentinel `<>`.
    Empty,
    /// Function type `T -> T`.
    Fun(Box<Type>, Box<Type>),
    /// List type `[T]`.
    List(Box<Type>),
    /// Record row `{l: T, ...|tail}`.
    Rec(Row<Type>, Box<Type>),
    /// Variant row `<l: T, ...|tail>`.
    Variant(Row<Type>, Box<Type>),
    /// Type variable.
    Var(TVarId),
    /// Equirecursive binder `mu x. T`.
    Mu(TVarId, Box<Type>),
    /// Universal binder `forall x. T`.
    Forall(TVarId, Box<Type>),
}

impl Type {
    pub fn fun(arg: Type, result: Type) -> Self {
        Type::Fun(Box::new(arg), Box::new(result))
    }

    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    /// A closed record: the tail is the unit sentinel.
    pub fn rec_closed(fields: Row<Type>) -> Self {
        Type::Rec(fields, Box::new(Type::Unit))
    }

    /// A closed variant: the tail is the empty sentinel.
    pub fn variant_closed(fields: Row<Type>) -> Self {
        Type::Variant(fields, Box::new(Type::Empty))
    }

    pub fn mu(var: TVarId, body: Type) -> Self {
        Type::Mu(var, Box::new(body))
    }

    pub fn forall(var: TVarId, body: Type) -> Self {
        Type::Forall(var, Box::new(body))
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }

    /// Collect the free type variables, respecting `mu`/`forall` binders.
    pub fn free_vars(&self) -> HashSet<TVarId> {
        let mut vars = HashSet::new();
        self.collect_free_vars(&mut vars);
        vars
    }

    fn collect_free_vars(&self, vars: &mut HashSet<TVarId>) {
        match self {
            Type::Num | Type::Char | Type::Unit | Type::Empty => {}

            Type::Var(id) => {
                vars.insert(*id);
            }

            Type::Fun(arg, result) => {
                arg.collect_free_vars(vars);
                result.collect_free_vars(vars);
            }

            Type::List(elem) => elem.collect_free_vars(vars),

            Type::Rec(fields, tail) | Type::Variant(fields, tail) => {
                for t in fields.values() {
                    t.collect_free_vars(vars);
                }
                tail.collect_free_vars(vars);
            }

            Type::Mu(var, body) | Type::Forall(var, body) => {
                // The binder shadows its own name, unless an outer occurrence
                // was already free before we entered the body.
                if vars.contains(var) {
                    body.collect_free_vars(vars);
                } else {
                    body.collect_free_vars(vars);
                    vars.remove(var);
                }
            }
        }
    }

    /// Merge nested row tails into a single row. When an inner tail carries a
    /// field with the same label as the outer row, the inner field wins; the
    /// unifier depends on this precedence and a test pins it down.
    pub fn flatten(&self) -> Type {
        match self {
            Type::Rec(fields, tail) => match tail.as_ref() {
                Type::Rec(inner, inner_tail) => {
                    let mut merged = fields.clone();
                    for (label, t) in inner {
                        merged.insert(label.clone(), t.clone());
                    }
                    let merged = row_map(&merged, |t| t.flatten());
                    Type::Rec(merged, Box::new(inner_tail.flatten())).flatten()
                }
                _ => self.clone(),
            },

            Type::Variant(fields, tail) => match tail.as_ref() {
                Type::Variant(inner, inner_tail) => {
                    let mut merged = fields.clone();
                    for (label, t) in inner {
                        merged.insert(label.clone(), t.clone());
                    }
                    let merged = row_map(&merged, |t| t.flatten());
                    Type::Variant(merged, Box::new(inner_tail.flatten())).flatten()
                }
                _ => self.clone(),
            },

            Type::List(elem) => Type::List(Box::new(elem.flatten())),
            Type::Fun(arg, result) => Type::fun(arg.flatten(), result.flatten()),
            Type::Mu(var, body) => Type::Mu(*var, Box::new(body.flatten())),
            Type::Forall(var, body) => Type::Forall(*var, Box::new(body.flatten())),

            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::row_of;

    #[test]
    fn test_free_vars_simple() {
        let t = Type::fun(Type::Var(0), Type::Var(1));
        let free = t.free_vars();
        assert!(free.contains(&0));
        assert!(free.contains(&1));
        assert_eq!(free.len(), 2);
    }

    #[test]
    fn test_free_vars_under_binder() {
        // mu a. a -> b : only b is free
        let t = Type::mu(0, Type::fun(Type::Var(0), Type::Var(1)));
        let free = t.free_vars();
        assert!(!free.contains(&0));
        assert!(free.contains(&1));
    }

    #[test]
    fn test_free_vars_forall() {
        let t = Type::forall(0, Type::fun(Type::Var(0), Type::Var(0)));
        assert!(t.free_vars().is_empty());
    }

    #[test]
    fn test_flatten_merges_tails() {
        // {a: N | {b: C | x}} flattens to {a: N, b: C | x}
        let inner = Type::Rec(row_of([("b", Type::Char)]), Box::new(Type::Var(5)));
        let outer = Type::Rec(row_of([("a", Type::Num)]), Box::new(inner));
        let flat = outer.flatten();
        assert_eq!(
            flat,
            Type::Rec(
                row_of([("a", Type::Num), ("b", Type::Char)]),
                Box::new(Type::Var(5))
            )
        );
    }

    #[test]
    fn test_flatten_inner_fields_shadow_outer() {
        // {a: N | {a: C}} keeps the *inner* a, not the outer one.
        let inner = Type::rec_closed(row_of([("a", Type::Char)]));
        let outer = Type::Rec(row_of([("a", Type::Num)]), Box::new(inner));
        let flat = outer.flatten();
        assert_eq!(flat, Type::rec_closed(row_of([("a", Type::Char)])));
    }

    #[test]
    fn test_flatten_variant_rows() {
        let inner = Type::Variant(row_of([("ok", Type::Num)]), Box::new(Type::Var(3)));
        let outer = Type::Variant(row_of([("err", Type::Char)]), Box::new(inner));
        let flat = outer.flatten();
        assert_eq!(
            flat,
            Type::Variant(
                row_of([("err", Type::Char), ("ok", Type::Num)]),
                Box::new(Type::Var(3))
            )
        );
    }

    #[test]
    fn test_flatten_leaves_plain_rows() {
        let t = Type::Rec(row_of([("x", Type::Num)]), Box::new(Type::Var(2)));
        assert_eq!(t.flatten(), t);
    }
}
