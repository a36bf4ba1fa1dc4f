//! Types of the language: row-polymorphic records and variants, functions,
//! lists, and the `mu`/`forall` binders, with substitution and printing.

mod pretty;
mod subst;
mod ty;

pub use pretty::{print_type, print_var};
pub use subst::Subst;
pub use ty::{TVarId, Type, FIRST_FRESH};
