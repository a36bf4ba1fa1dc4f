//! Substitution of type variables.
//!
//! Application is one-shot (the inserted type is not itself re-substituted)
//! and capture-avoiding: recursing under a `mu`/`forall` binder removes the
//! binder's own name from scope so it is never replaced inside its own body.

use std::collections::{HashMap, HashSet};

use crate::util::row_map;

use super::ty::{TVarId, Type};

/// A mapping from type-variable ids to types.
#[derive(Clone, Debug, Default)]
pub struct Subst {
    map: HashMap<TVarId, Type>,
}

impl Subst {
    pub fn empty() -> Self {
        Subst {
            map: HashMap::new(),
        }
    }

    pub fn singleton(var: TVarId, ty: Type) -> Self {
        let mut map = HashMap::new();
        map.insert(var, ty);
        Subst { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn insert(&mut self, var: TVarId, ty: Type) {
        self.map.insert(var, ty);
    }

    pub fn get(&self, var: TVarId) -> Option<&Type> {
        self.map.get(&var)
    }

    /// Apply this substitution to a type.
    pub fn apply(&self, t: &Type) -> Type {
        let mut shadowed = HashSet::new();
        self.apply_in(t, &mut shadowed)
    }

    fn apply_in(&self, t: &Type, shadowed: &mut HashSet<TVarId>) -> Type {
        match t {
            Type::Num | Type::Char | Type::Unit | Type::Empty => t.clone(),

            Type::Var(id) => {
                if shadowed.contains(id) {
                    t.clone()
                } else {
                    self.map.get(id).cloned().unwrap_or_else(|| t.clone())
                }
            }

            Type::Fun(arg, result) => Type::fun(
                self.apply_in(arg, shadowed),
                self.apply_in(result, shadowed),
            ),

            Type::List(elem) => Type::List(Box::new(self.apply_in(elem, shadowed))),

            Type::Rec(fields, tail) => Type::Rec(
                row_map(fields, |t| self.apply_in(t, shadowed)),
                Box::new(self.apply_in(tail, shadowed)),
            ),

            Type::Variant(fields, tail) => Type::Variant(
                row_map(fields, |t| self.apply_in(t, shadowed)),
                Box::new(self.apply_in(tail, shadowed)),
            ),

            Type::Mu(var, body) => {
                let added = shadowed.insert(*var);
                let body = self.apply_in(body, shadowed);
                if added {
                    shadowed.remove(var);
                }
                Type::Mu(*var, Box::new(body))
            }

            Type::Forall(var, body) => {
                let added = shadowed.insert(*var);
                let body = self.apply_in(body, shadowed);
                if added {
                    shadowed.remove(var);
                }
                Type::Forall(*var, Box::new(body))
            }
        }
    }
}
