//! The closed operator table.
//!
//! Every primitive the language exposes is one [`OpDef`]: its surface
//! symbol, its type scheme (parsed at session startup), its arity, and its
//! native implementation. The parser consults the symbol lists; the checker
//! consults the schemes; the evaluator calls the natives once an operator
//! has collected `arity` arguments.

use crate::error::EvalError;
use crate::eval::{Interp, ValueId};

/// Binary symbols usable between two applications, as `e1 op e2`.
pub const INFIX_OPS: &[&str] = &["+", "-", "*"];

/// Word operators; these win over variable references of the same spelling.
pub const NAMED_OPS: &[&str] = &["map"];

/// Symbolic operators in atom position.
pub const PREFIX_OPS: &[&str] = &["#", "&"];

pub type NativeFn = for<'a> fn(&mut Interp<'a>, &[ValueId]) -> Result<ValueId, EvalError>;

pub struct OpDef {
    pub name: &'static str,
    pub arity: usize,
    pub scheme: &'static str,
    pub native: NativeFn,
}

pub const OPS: &[OpDef] = &[
    OpDef { name: "+", arity: 1, scheme: "(N, N) -> N", native: add },
    OpDef { name: "-", arity: 1, scheme: "(N, N) -> N", native: sub },
    OpDef { name: "*", arity: 1, scheme: "(N, N) -> N", native: mul },
    OpDef { name: "#", arity: 1, scheme: "forall a. [a] -> N", native: length },
    OpDef { name: "&", arity: 1, scheme: "N -> [N]", native: range },
    OpDef {
        name: "map",
        arity: 2,
        scheme: "forall a. forall b. (a -> b) -> [a] -> [b]",
        native: map,
    },
];

pub fn lookup(name: &str) -> Option<&'static OpDef> {
    OPS.iter().find(|op| op.name == name)
}

// The infix operators take their two operands as one positional record,
// which is how the parser desugars `e1 op e2`.
fn arith(
    interp: &mut Interp<'_>,
    args: &[ValueId],
    f: impl Fn(f64, f64) -> f64,
) -> Result<ValueId, EvalError> {
    let &[pair] = args else {
        return Err(EvalError::PatternMismatch);
    };
    let lhs = interp.record_field(pair, "0")?;
    let rhs = interp.record_field(pair, "1")?;
    let a = interp.num(lhs)?;
    let b = interp.num(rhs)?;
    Ok(interp.alloc_num(f(a, b)))
}

fn add(interp: &mut Interp<'_>, args: &[ValueId]) -> Result<ValueId, EvalError> {
    arith(interp, args, |a, b| a + b)
}

fn sub(interp: &mut Interp<'_>, args: &[ValueId]) -> Result<ValueId, EvalError> {
    arith(interp, args, |a, b| a - b)
}

fn mul(interp: &mut Interp<'_>, args: &[ValueId]) -> Result<ValueId, EvalError> {
    arith(interp, args, |a, b| a * b)
}

fn length(interp: &mut Interp<'_>, args: &[ValueId]) -> Result<ValueId, EvalError> {
    let &[list] = args else {
        return Err(EvalError::PatternMismatch);
    };
    let n = interp.list_items(list)?.len();
    Ok(interp.alloc_num(n as f64))
}

/// `& n` enumerates `[0, 1, ..., n - 1]`; non-positive counts give `[]`.
fn range(interp: &mut Interp<'_>, args: &[ValueId]) -> Result<ValueId, EvalError> {
    let &[count] = args else {
        return Err(EvalError::PatternMismatch);
    };
    let n = interp.num(count)?.max(0.0) as i64;
    let items = (0..n).map(|i| interp.alloc_num(i as f64)).collect();
    Ok(interp.alloc_list(items))
}

fn map(interp: &mut Interp<'_>, args: &[ValueId]) -> Result<ValueId, EvalError> {
    let &[f, list] = args else {
        return Err(EvalError::PatternMismatch);
    };
    let items = interp.list_items(list)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(interp.apply(f, item)?);
    }
    Ok(interp.alloc_list(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_type;

    #[test]
    fn test_lookup_finds_every_surface_symbol() {
        for name in INFIX_OPS.iter().chain(NAMED_OPS).chain(PREFIX_OPS) {
            assert!(lookup(name).is_some(), "no definition for {name}");
        }
    }

    #[test]
    fn test_lookup_rejects_unknown_names() {
        assert!(lookup("fold").is_none());
    }

    #[test]
    fn test_every_scheme_parses() {
        for op in OPS {
            assert!(
                parse_type(op.scheme).is_ok(),
                "scheme for {} does not parse: {}",
                op.name,
                op.scheme
            );
        }
    }
}
