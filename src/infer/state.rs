//! Session-scoped checker state.
//!
//! All mutable state of a type query lives in one [`CheckState`] owned by
//! the session: the fresh-variable counter, the pending equation set, the
//! unification memo, the most recently computed top-level type, and the
//! parsed operator schemes. Everything except the schemes is reset at the
//! start of each query.

use std::collections::{HashMap, HashSet};

use crate::builtins;
use crate::parser::parse_type;
use crate::types::{TVarId, Type, FIRST_FRESH};

/// Insertion-ordered, deduplicating set of pending equations `a = T`,
/// keyed by their canonical printed form.
#[derive(Clone, Debug, Default)]
pub struct EquationSet {
    keys: Vec<String>,
    map: HashMap<String, (TVarId, Type)>,
}

impl EquationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// The printed equation keys, in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Record an equation unless an identical one is already pending.
    pub fn insert(&mut self, key: String, var: TVarId, t: Type) {
        if !self.map.contains_key(&key) {
            self.keys.push(key.clone());
            self.map.insert(key, (var, t));
        }
    }

    /// Pending equations, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(TVarId, Type)> {
        self.keys.iter().filter_map(|k| self.map.get(k))
    }

    /// Remove and return the whole pending set.
    pub fn take(&mut self) -> EquationSet {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.map.clear();
    }
}

/// Mutable state of one checking session.
pub struct CheckState {
    pub(super) fresh: TVarId,
    pub(super) equations: EquationSet,
    /// Canonical keys of equalities already attempted in the current
    /// closure of comparisons; guards against looping on equirecursive
    /// types.
    pub(super) visited: HashSet<String>,
    pub(super) last_type: Option<Type>,
    pub(super) optypes: HashMap<String, Type>,
}

impl CheckState {
    /// A fresh session with the operator schemes parsed and registered.
    pub fn new() -> Self {
        let mut optypes = HashMap::new();
        for op in builtins::OPS {
            // A scheme that does not parse simply leaves its operator
            // untyped, matching the permissive startup of the table.
            if let Ok(t) = parse_type(op.scheme) {
                optypes.insert(op.name.to_string(), t);
            }
        }
        CheckState {
            fresh: FIRST_FRESH,
            equations: EquationSet::new(),
            visited: HashSet::new(),
            last_type: None,
            optypes,
        }
    }

    /// Clear everything that belongs to a single top-level query.
    pub fn reset(&mut self) {
        self.fresh = FIRST_FRESH;
        self.equations.clear();
        self.visited.clear();
        self.last_type = None;
    }

    pub fn fresh_var(&mut self) -> Type {
        let id = self.fresh;
        self.fresh += 1;
        Type::Var(id)
    }

    pub fn last_type(&self) -> Option<&Type> {
        self.last_type.as_ref()
    }

    pub fn set_last_type(&mut self, t: Type) {
        self.last_type = Some(t);
    }

    /// Pending equation keys, for the session's diagnostic log.
    pub fn equation_keys(&self) -> &[String] {
        self.equations.keys()
    }
}

impl Default for CheckState {
    fn default() -> Self {
        Self::new()
    }
}
