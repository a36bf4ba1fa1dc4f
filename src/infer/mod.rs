//! Type inference.
//!
//! Inference runs in three phases over one [`CheckState`]:
//! constraint generation ([`CheckState::type_exp`]) walks the expression and
//! defers an equation whenever a type variable meets another type;
//! unification (`eqtype`) resolves structure eagerly and records what it
//! cannot; the solver (`solve_full`) then binds variables pass by pass until
//! the pending set settles, introducing `mu` binders where a variable occurs
//! in its own solution.

mod infer;
mod solve;
mod state;
mod unify;

pub use infer::Context;
pub use state::{CheckState, EquationSet};
