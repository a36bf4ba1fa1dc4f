//! Property-based tests for printer/parser round-trip.

use proptest::prelude::*;

use super::ast::{Exp, Pattern};
use super::{parse, parse_type};
use crate::types::Type;
use crate::util::row_of;

fn ident_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,6}")
        .unwrap()
        .prop_filter("not a keyword or operator name", |s| {
            !matches!(s.as_str(), "let" | "import" | "mu" | "forall" | "map")
        })
}

// Numbers whose printed form parses back to the identical f64.
fn number_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1000i32..1000).prop_map(|n| n as f64),
        (-1000i32..1000).prop_map(|n| n as f64 / 10.0),
    ]
}

fn char_strategy() -> impl Strategy<Value = char> {
    prop::char::range('a', 'z')
}

fn infix_op_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
    ]
}

fn pattern_strategy() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        Just(Pattern::Wild),
        ident_strategy().prop_map(Pattern::Var),
        prop::collection::btree_map(
            ident_strategy(),
            ident_strategy().prop_map(Pattern::Var),
            1..3
        )
        .prop_map(Pattern::Rec),
    ]
}

// Recursive expression strategy. Bare operator references and ascriptions
// are left to unit tests: the former only has a surface form inside an
// infix application, the latter needs a type on the left.
fn exp_strategy() -> impl Strategy<Value = Exp> {
    let leaf = prop_oneof![
        number_strategy().prop_map(Exp::Num),
        char_strategy().prop_map(Exp::Char),
        ident_strategy().prop_map(Exp::Var),
        ident_strategy().prop_map(Exp::Tag),
        ident_strategy().prop_map(Exp::Import),
    ];

    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Exp::List),
            prop::collection::btree_map(ident_strategy(), inner.clone(), 1..3)
                .prop_map(Exp::Rec),
            prop::collection::btree_map(ident_strategy(), inner.clone(), 1..3)
                .prop_map(Exp::Variant),
            (pattern_strategy(), inner.clone()).prop_map(|(p, body)| Exp::lam(p, body)),
            (inner.clone(), inner.clone()).prop_map(|(f, x)| Exp::app(f, x)),
            (infix_op_strategy(), inner.clone(), inner.clone()).prop_map(|(op, lhs, rhs)| {
                Exp::app(Exp::Op(op), Exp::Tup(row_of([("0", lhs), ("1", rhs)])))
            }),
            (pattern_strategy(), inner.clone(), inner.clone())
                .prop_map(|(p, bound, body)| Exp::let_in(p, bound, body)),
        ]
    })
}

// Only the letter-bound variable ids have a surface form.
fn type_var_strategy() -> impl Strategy<Value = u32> {
    0u32..26
}

fn type_strategy() -> impl Strategy<Value = Type> {
    let leaf = prop_oneof![
        Just(Type::Num),
        Just(Type::Char),
        Just(Type::Unit),
        Just(Type::Empty),
        type_var_strategy().prop_map(Type::Var),
    ];

    leaf.prop_recursive(3, 16, 3, |inner| {
        let rec_tail = prop_oneof![
            Just(Type::Unit),
            type_var_strategy().prop_map(Type::Var)
        ];
        let variant_tail = prop_oneof![
            Just(Type::Empty),
            type_var_strategy().prop_map(Type::Var)
        ];
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(arg, result)| Type::fun(arg, result)),
            inner.clone().prop_map(Type::list),
            (
                prop::collection::btree_map(ident_strategy(), inner.clone(), 1..3),
                rec_tail
            )
                .prop_map(|(fields, tail)| Type::Rec(fields, Box::new(tail))),
            (
                prop::collection::btree_map(ident_strategy(), inner.clone(), 1..3),
                variant_tail
            )
                .prop_map(|(fields, tail)| Type::Variant(fields, Box::new(tail))),
            (type_var_strategy(), inner.clone()).prop_map(|(v, body)| Type::mu(v, body)),
            (type_var_strategy(), inner.clone()).prop_map(|(v, body)| Type::forall(v, body)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_exp_round_trip(e in exp_strategy()) {
        let printed = e.to_string();
        match parse(&printed) {
            Ok(reparsed) => prop_assert_eq!(
                &reparsed, &e,
                "round-trip changed the tree; printed: {}", printed
            ),
            Err(err) => prop_assert!(false, "reparse failed: {}\nprinted: {}", err, printed),
        }
    }

    #[test]
    fn prop_type_round_trip(t in type_strategy()) {
        let printed = t.to_string();
        match parse_type(&printed) {
            Ok(reparsed) => prop_assert_eq!(
                &reparsed, &t,
                "round-trip changed the type; printed: {}", printed
            ),
            Err(err) => prop_assert!(false, "reparse failed: {}\nprinted: {}", err, printed),
        }
    }
}
