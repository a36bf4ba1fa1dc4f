//! Fixpoint equation solving.
//!
//! One pass snapshots and clears the pending set, binds the first usable
//! equation (introducing a `mu` when the variable occurs in its own
//! solution), and re-unifies every later equation under that binding. A
//! failed pass restores the snapshot, so a failed query never leaks a
//! half-solved pending set into the next one. `solve_full` repeats passes
//! until the set empties or stops changing.

use crate::error::TypeError;
use crate::types::{Subst, Type};

use super::state::{CheckState, EquationSet};

const MAX_PASSES: u32 = 10_000;

impl CheckState {
    /// Run one solving pass. Atomic: on failure the pending set is rolled
    /// back to its state before the pass.
    pub fn solve_equations(&mut self) -> Result<(), TypeError> {
        self.visited.clear();
        let pending = self.equations.take();
        match self.run_pass(&pending) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.equations = pending;
                Err(err)
            }
        }
    }

    fn run_pass(&mut self, pending: &EquationSet) -> Result<(), TypeError> {
        let mut binding = Subst::empty();
        for (a, t) in pending.iter() {
            // A trivial self-equation carries no information.
            if matches!(t, Type::Var(b) if b == a) {
                continue;
            }
            if binding.is_empty() {
                if t.free_vars().contains(a) {
                    // The variable occurs in its own solution: introduce an
                    // equirecursive binder instead of failing.
                    let placeholder = self.fresh_var();
                    let Type::Var(b) = placeholder else {
                        continue;
                    };
                    let body = Subst::singleton(*a, Type::Var(b)).apply(t);
                    binding.insert(*a, Type::mu(b, body));
                } else {
                    binding.insert(*a, t.clone());
                }
                continue;
            }
            // Later equations are resolved under the pass's binding before
            // being re-unified; variables still unknown defer again.
            let lhs = binding.apply(&Type::Var(*a));
            let rhs = binding.apply(t);
            self.eqtype(&lhs, &rhs)?;
        }
        if let Some(last) = self.last_type.take() {
            self.last_type = Some(binding.apply(&last).flatten());
        }
        Ok(())
    }

    /// Solve to fixpoint: repeat passes until the pending set is empty or a
    /// pass leaves it unchanged. Exceeding the pass bound is a divergence.
    pub fn solve_full(&mut self) -> Result<(), TypeError> {
        for _ in 0..MAX_PASSES {
            let before = self.equations.keys().to_vec();
            self.solve_equations()?;
            if self.equations.is_empty() || self.equations.keys() == before {
                return Ok(());
            }
        }
        Err(TypeError::SolveDivergence)
    }
}
