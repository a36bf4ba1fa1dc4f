//! Rowlang: a small structurally typed functional expression language.
//!
//! The pipeline is strings in, strings out:
//!
//! - **Parsing** with backtracking combinators; a program is one expression,
//!   and sugar (infix operators, projection, sequencing, tuples, string
//!   literals) desugars in the grammar
//! - **Row-polymorphic inference** over records and variants, with
//!   equirecursive `mu` types introduced automatically when a variable
//!   occurs in its own solution, and rank-1 `forall` schemes
//! - **Deferred equation solving**: unification records equations against
//!   type variables and a fixpoint solver binds them pass by pass
//! - **Lazy self-referential records**: `this` names the record under
//!   construction, so cyclic values are genuine cycles
//!
//! [`session::Session`] ties the stages together for embedders.

pub mod builtins;
pub mod diagnostics;
pub mod error;
pub mod eval;
pub mod infer;
pub mod parser;
pub mod session;
pub mod types;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;
