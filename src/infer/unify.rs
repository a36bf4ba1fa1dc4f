//! Structural unification with deferred equations.
//!
//! `eqtype` resolves two types structurally where it can. A type variable on
//! either side is never solved in place; it is deferred as a pending
//! equation for the solver. `mu` binders are unrolled one level and `forall`
//! binders instantiated with fresh variables, under a shared per-comparison
//! budget, before the bodies are compared.

use crate::error::TypeError;
use crate::types::{print_type, print_var, Subst, Type};
use crate::util::{row_difference, row_intersect_with, Row};

use super::state::CheckState;

const MAX_UNFOLD: u32 = 100;

impl CheckState {
    pub fn eqtype(&mut self, t0: &Type, t1: &Type) -> Result<(), TypeError> {
        let key = format!("{} = {}", print_type(t0, 0), print_type(t1, 0));
        if !self.visited.insert(key) {
            return Ok(());
        }

        let mut t0 = t0.flatten();
        let mut t1 = t1.flatten();

        // A still-unbound variable defers instead of resolving.
        if let Type::Var(a) = t0 {
            self.defer(a, t1);
            return Ok(());
        }
        if let Type::Var(a) = t1 {
            self.defer(a, t0);
            return Ok(());
        }

        let mut budget = MAX_UNFOLD;
        while matches!(t0, Type::Mu(..) | Type::Forall(..)) && budget > 0 {
            budget -= 1;
            t0 = self.unfold(t0);
        }
        while matches!(t1, Type::Mu(..) | Type::Forall(..)) && budget > 0 {
            budget -= 1;
            t1 = self.unfold(t1);
        }
        if budget == 0 {
            return Err(TypeError::UnfoldDivergence {
                left: t0.to_string(),
                right: t1.to_string(),
            });
        }

        match (t0, t1) {
            (Type::Num, Type::Num)
            | (Type::Char, Type::Char)
            | (Type::Unit, Type::Unit)
            | (Type::Empty, Type::Empty) => Ok(()),

            (Type::List(e0), Type::List(e1)) => self.eqtype(&e0, &e1),

            (Type::Fun(a0, r0), Type::Fun(a1, r1)) => {
                self.eqtype(&a0, &a1)?;
                self.eqtype(&r0, &r1)
            }

            (Type::Rec(f0, tail0), Type::Rec(f1, tail1)) => {
                self.eqrowtype(&f0, &tail0, &f1, &tail1, Type::Rec)
            }

            (Type::Variant(f0, tail0), Type::Variant(f1, tail1)) => {
                self.eqrowtype(&f0, &tail0, &f1, &tail1, Type::Variant)
            }

            (t0, t1) => Err(TypeError::Mismatch {
                left: t0.to_string(),
                right: t1.to_string(),
            }),
        }
    }

    /// Row unification by label: common labels unify pairwise; labels
    /// exclusive to one side unify against the other side's tail, through a
    /// freshly shared tail variable when both sides have exclusive labels.
    fn eqrowtype(
        &mut self,
        f0: &Row<Type>,
        tail0: &Type,
        f1: &Row<Type>,
        tail1: &Type,
        make: fn(Row<Type>, Box<Type>) -> Type,
    ) -> Result<(), TypeError> {
        let common = row_intersect_with(|a, b| (a.clone(), b.clone()), f0, f1);
        for (left, right) in common.values() {
            self.eqtype(left, right)?;
        }

        let diff0 = row_difference(f0, f1);
        let diff1 = row_difference(f1, f0);
        match (diff0.is_empty(), diff1.is_empty()) {
            (true, true) => self.eqtype(tail0, tail1),
            (false, true) => self.eqtype(tail1, &make(diff0, Box::new(tail0.clone()))),
            (true, false) => self.eqtype(tail0, &make(diff1, Box::new(tail1.clone()))),
            (false, false) => {
                let shared = self.fresh_var();
                self.eqtype(tail1, &make(diff0, Box::new(shared.clone())))?;
                self.eqtype(tail0, &make(diff1, Box::new(shared)))
            }
        }
    }

    fn defer(&mut self, var: crate::types::TVarId, t: Type) {
        let key = format!("{} = {}", print_var(var), print_type(&t, 0));
        self.equations.insert(key, var, t);
    }

    /// Unroll a `mu` one level, or instantiate a `forall` with a fresh
    /// variable. Any other type is returned unchanged.
    fn unfold(&mut self, t: Type) -> Type {
        match t {
            Type::Mu(var, body) => {
                let whole = Type::Mu(var, body.clone());
                Subst::singleton(var, whole).apply(&body)
            }
            Type::Forall(var, body) => {
                let fresh = self.fresh_var();
                Subst::singleton(var, fresh).apply(&body)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::row_of;

    #[test]
    fn test_base_types_unify() {
        let mut state = CheckState::new();
        assert!(state.eqtype(&Type::Num, &Type::Num).is_ok());
        assert!(state.equations.is_empty());
    }

    #[test]
    fn test_mismatch_names_both_sides() {
        let mut state = CheckState::new();
        let err = state.eqtype(&Type::Num, &Type::Char).unwrap_err();
        assert_eq!(
            err,
            TypeError::Mismatch {
                left: "N".to_string(),
                right: "C".to_string()
            }
        );
    }

    #[test]
    fn test_variable_defers_an_equation() {
        let mut state = CheckState::new();
        state.eqtype(&Type::Var(30), &Type::Num).expect("defers");
        assert_eq!(state.equations.keys(), ["t30 = N"]);
    }

    #[test]
    fn test_identical_equation_recorded_once() {
        let mut state = CheckState::new();
        state.eqtype(&Type::Var(30), &Type::Num).expect("defers");
        state.visited.clear();
        state.eqtype(&Type::Var(30), &Type::Num).expect("defers");
        assert_eq!(state.equations.len(), 1);
    }

    #[test]
    fn test_function_unifies_componentwise() {
        let mut state = CheckState::new();
        let f0 = Type::fun(Type::Var(30), Type::Num);
        let f1 = Type::fun(Type::Char, Type::Var(31));
        state.eqtype(&f0, &f1).expect("unifies");
        assert_eq!(state.equations.len(), 2);
    }

    #[test]
    fn test_rows_unify_common_labels() {
        let mut state = CheckState::new();
        let r0 = Type::rec_closed(row_of([("x", Type::Num)]));
        let r1 = Type::rec_closed(row_of([("x", Type::Num)]));
        assert!(state.eqtype(&r0, &r1).is_ok());
    }

    #[test]
    fn test_exclusive_labels_extend_the_other_tail() {
        // {x: N | a} == {x: N, y: C | b} pushes y onto a.
        let mut state = CheckState::new();
        let r0 = Type::Rec(row_of([("x", Type::Num)]), Box::new(Type::Var(30)));
        let r1 = Type::Rec(
            row_of([("x", Type::Num), ("y", Type::Char)]),
            Box::new(Type::Var(31)),
        );
        state.eqtype(&r0, &r1).expect("unifies");
        assert_eq!(state.equations.keys(), ["t30 = {y: C|t31}"]);
    }

    #[test]
    fn test_both_sides_exclusive_introduce_shared_tail() {
        let mut state = CheckState::new();
        let r0 = Type::Rec(row_of([("x", Type::Num)]), Box::new(Type::Var(30)));
        let r1 = Type::Rec(row_of([("y", Type::Char)]), Box::new(Type::Var(31)));
        state.eqtype(&r0, &r1).expect("unifies");
        // Fresh shared tail is the first variable this session allocates.
        let shared = print_var(crate::types::FIRST_FRESH);
        assert_eq!(
            state.equations.keys(),
            [
                format!("t31 = {{x: N|{shared}}}"),
                format!("t30 = {{y: C|{shared}}}")
            ]
        );
    }

    #[test]
    fn test_mu_unrolls_against_concrete_row() {
        // (mu a. {head: N, tail: a}) == {head: N, tail: (mu a. ...)}
        let mu = Type::mu(
            0,
            Type::rec_closed(row_of([("head", Type::Num), ("tail", Type::Var(0))])),
        );
        let unrolled = Type::rec_closed(row_of([("head", Type::Num), ("tail", mu.clone())]));
        let mut state = CheckState::new();
        assert!(state.eqtype(&mu, &unrolled).is_ok());
    }

    #[test]
    fn test_forall_instantiates_fresh() {
        let scheme = Type::forall(0, Type::fun(Type::Var(0), Type::Var(0)));
        let concrete = Type::fun(Type::Num, Type::Num);
        let mut state = CheckState::new();
        state.eqtype(&scheme, &concrete).expect("unifies");
        // The instantiated variable defers against N on both sides.
        assert_eq!(state.equations.len(), 1);
    }

    #[test]
    fn test_nested_rows_flatten_before_comparing() {
        let nested = Type::Rec(
            row_of([("a", Type::Num)]),
            Box::new(Type::rec_closed(row_of([("b", Type::Char)]))),
        );
        let flat = Type::rec_closed(row_of([("a", Type::Num), ("b", Type::Char)]));
        let mut state = CheckState::new();
        assert!(state.eqtype(&nested, &flat).is_ok());
    }
}
