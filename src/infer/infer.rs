//! Constraint generation.
//!
//! A single traversal assigns every node a type, firing `eqtype` wherever
//! two types must agree. `forall` schemes are instantiated freshly at every
//! lookup; `let` is monomorphic, binding the inferred type directly.

use std::collections::HashMap;

use crate::error::TypeError;
use crate::parser::ast::{Exp, Pattern};
use crate::types::{Subst, Type};
use crate::util::Row;

use super::state::CheckState;

/// Typing context: variable name to type.
pub type Context = HashMap<String, Type>;

impl CheckState {
    pub fn type_exp(&mut self, ctx: &Context, e: &Exp) -> Result<Type, TypeError> {
        match e {
            Exp::Num(_) => Ok(Type::Num),
            Exp::Char(_) => Ok(Type::Char),

            Exp::Var(name) => {
                let t = ctx.get(name).cloned().ok_or_else(|| TypeError::UnboundVariable {
                    name: name.clone(),
                })?;
                Ok(self.instantiate(t))
            }

            Exp::Op(name) => {
                let t = self
                    .optypes
                    .get(name)
                    .cloned()
                    .ok_or_else(|| TypeError::UnknownOperator { name: name.clone() })?;
                Ok(self.instantiate(t))
            }

            Exp::Lam(pattern, body) => {
                let (ctx0, t_arg) = self.type_pattern(ctx, pattern);
                let t_body = self.type_exp(&ctx0, body)?;
                Ok(Type::fun(t_arg, t_body))
            }

            Exp::App(f, arg) => {
                let t_f = self.type_exp(ctx, f)?;
                let t_arg = self.type_exp(ctx, arg)?;
                let t_result = self.fresh_var();
                self.eqtype(&t_f, &Type::fun(t_arg, t_result.clone()))?;
                Ok(t_result)
            }

            Exp::List(items) => {
                let elem = self.fresh_var();
                for item in items {
                    let t = self.type_exp(ctx, item)?;
                    self.eqtype(&t, &elem)?;
                }
                Ok(Type::List(Box::new(elem)))
            }

            Exp::Rec(fields) => {
                // Fields see the record's own eventual type as `this`.
                let own = self.fresh_var();
                let mut ctx0 = ctx.clone();
                ctx0.insert("this".to_string(), own.clone());
                let mut row = Row::new();
                for (label, field) in fields {
                    row.insert(label.clone(), self.type_exp(&ctx0, field)?);
                }
                let t = Type::Rec(row, Box::new(Type::Unit));
                self.eqtype(&own, &t)?;
                Ok(t)
            }

            // A tuple is a closed record over its components; the ambient
            // `this`, if any, stays visible inside them.
            Exp::Tup(fields) => {
                let mut row = Row::new();
                for (label, field) in fields {
                    row.insert(label.clone(), self.type_exp(ctx, field)?);
                }
                Ok(Type::rec_closed(row))
            }

            Exp::Variant(handlers) => {
                let out = self.fresh_var();
                let mut ins = Row::new();
                for (label, handler) in handlers {
                    let t_handler = self.type_exp(ctx, handler)?;
                    let t_in = self.fresh_var();
                    self.eqtype(&t_handler, &Type::fun(t_in.clone(), out.clone()))?;
                    ins.insert(label.clone(), t_in);
                }
                let tail = self.fresh_var();
                Ok(Type::fun(Type::Variant(ins, Box::new(tail)), out))
            }

            Exp::Tag(label) => {
                let t = self.fresh_var();
                let tail = self.fresh_var();
                let mut row = Row::new();
                row.insert(label.clone(), t.clone());
                Ok(Type::fun(t, Type::Variant(row, Box::new(tail))))
            }

            Exp::Import(_) => Ok(self.fresh_var()),

            Exp::Ascribe(declared, inner) => {
                let opened = self.instantiate(declared.clone());
                let t_inner = self.type_exp(ctx, inner)?;
                self.eqtype(&opened, &t_inner)?;
                // The caller gets the literal declared type, sealed.
                Ok(declared.clone())
            }

            Exp::Let(pattern, bound, body) => {
                let t_bound = self.type_exp(ctx, bound)?;
                let ctx0 = self.bind_pattern_type(ctx, pattern, t_bound)?;
                self.type_exp(&ctx0, body)
            }
        }
    }

    /// Strip leading `forall`s, replacing each bound name with a fresh
    /// variable. The substitution is rebuilt per lookup.
    fn instantiate(&mut self, mut t: Type) -> Type {
        while let Type::Forall(var, body) = t {
            let fresh = self.fresh_var();
            t = Subst::singleton(var, fresh).apply(&body);
        }
        t
    }

    /// Assign fresh types to a pattern's bindings; a row pattern becomes an
    /// open record type over them.
    fn type_pattern(&mut self, ctx: &Context, p: &Pattern) -> (Context, Type) {
        match p {
            Pattern::Var(name) => {
                let t = self.fresh_var();
                let mut ctx0 = ctx.clone();
                ctx0.insert(name.clone(), t.clone());
                (ctx0, t)
            }
            Pattern::Wild => (ctx.clone(), self.fresh_var()),
            Pattern::Rec(fields) => {
                let mut ctx0 = ctx.clone();
                let mut row = Row::new();
                for (label, sub) in fields {
                    let (ctx1, t) = self.type_pattern(&ctx0, sub);
                    ctx0 = ctx1;
                    row.insert(label.clone(), t);
                }
                let tail = self.fresh_var();
                (ctx0, Type::Rec(row, Box::new(tail)))
            }
        }
    }

    /// Bind a `let` pattern monomorphically to an already-inferred type.
    fn bind_pattern_type(
        &mut self,
        ctx: &Context,
        p: &Pattern,
        t: Type,
    ) -> Result<Context, TypeError> {
        match p {
            Pattern::Var(name) => {
                let mut ctx0 = ctx.clone();
                ctx0.insert(name.clone(), t);
                Ok(ctx0)
            }
            Pattern::Wild => Ok(ctx.clone()),
            Pattern::Rec(_) => {
                let (ctx0, t_pattern) = self.type_pattern(ctx, p);
                self.eqtype(&t_pattern, &t)?;
                Ok(ctx0)
            }
        }
    }
}
