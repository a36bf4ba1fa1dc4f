//! Environment-passing evaluator.
//!
//! Values live in an arena indexed by [`ValueId`]; record fields live in a
//! second arena of memoized thunks. A record is allocated before its fields
//! are, so each field's environment can bind `this` to the record's own id,
//! which is what makes self-referential records genuine cycles rather than
//! copies. Imports arrive as JSON through an [`ImportResolver`] and results
//! leave as JSON, with cycles and functions rendered as placeholder strings.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::builtins::{self, OpDef};
use crate::error::EvalError;
use crate::parser::ast::{Exp, Pattern};
use crate::util::Row;

/// Host hook supplying values for `import name` expressions.
pub trait ImportResolver {
    fn resolve(&self, name: &str) -> Option<Json>;
}

/// Resolver that knows no modules; every `import` fails.
pub struct NoImports;

impl ImportResolver for NoImports {
    fn resolve(&self, _name: &str) -> Option<Json> {
        None
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ValueId(usize);

#[derive(Clone, Copy, PartialEq, Eq)]
struct FieldId(usize);

pub type Env = HashMap<String, ValueId>;

#[derive(Clone)]
enum Value {
    Num(f64),
    Char(char),
    List(Vec<ValueId>),
    Rec(Row<FieldId>),
    Closure { pattern: Pattern, body: Exp, env: Env },
    Dispatch(Row<ValueId>),
    TagCtor(String),
    Tagged(String, ValueId),
    Builtin { op: &'static OpDef, args: Vec<ValueId> },
}

enum Field {
    Thunk { exp: Exp, env: Env },
    Forced(ValueId),
}

pub struct Interp<'a> {
    values: Vec<Value>,
    fields: Vec<Field>,
    resolver: &'a dyn ImportResolver,
}

impl<'a> Interp<'a> {
    pub fn new(resolver: &'a dyn ImportResolver) -> Self {
        Interp {
            values: Vec::new(),
            fields: Vec::new(),
            resolver,
        }
    }

    pub fn eval(&mut self, e: &Exp) -> Result<ValueId, EvalError> {
        self.eval_in(e, &Env::new())
    }

    fn eval_in(&mut self, e: &Exp, env: &Env) -> Result<ValueId, EvalError> {
        match e {
            Exp::Num(n) => Ok(self.alloc_num(*n)),
            Exp::Char(c) => Ok(self.alloc(Value::Char(*c))),

            Exp::Var(name) => env.get(name).copied().ok_or_else(|| EvalError::UnboundVariable {
                name: name.clone(),
            }),

            Exp::Op(name) => {
                let op = builtins::lookup(name).ok_or_else(|| EvalError::UnknownOperator {
                    name: name.clone(),
                })?;
                Ok(self.alloc(Value::Builtin { op, args: Vec::new() }))
            }

            Exp::Lam(pattern, body) => Ok(self.alloc(Value::Closure {
                pattern: pattern.clone(),
                body: (**body).clone(),
                env: env.clone(),
            })),

            Exp::App(f, arg) => {
                let f_v = self.eval_in(f, env)?;
                let arg_v = self.eval_in(arg, env)?;
                self.apply(f_v, arg_v)
            }

            Exp::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.eval_in(item, env)?);
                }
                Ok(self.alloc_list(out))
            }

            Exp::Rec(fields) => {
                // The record's id exists before its fields do, so their
                // thunks can close over it as `this`.
                let rec_id = self.alloc(Value::Rec(Row::new()));
                let mut env0 = env.clone();
                env0.insert("this".to_string(), rec_id);
                let mut row = Row::new();
                for (label, field_exp) in fields {
                    let field = FieldId(self.fields.len());
                    self.fields.push(Field::Thunk {
                        exp: field_exp.clone(),
                        env: env0.clone(),
                    });
                    row.insert(label.clone(), field);
                }
                self.values[rec_id.0] = Value::Rec(row);
                Ok(rec_id)
            }

            // Tuple components are strict and evaluate in the ambient
            // environment; `this` keeps whatever it meant outside.
            Exp::Tup(fields) => {
                let mut row = Row::new();
                for (label, field_exp) in fields {
                    let v = self.eval_in(field_exp, env)?;
                    let id = FieldId(self.fields.len());
                    self.fields.push(Field::Forced(v));
                    row.insert(label.clone(), id);
                }
                Ok(self.alloc(Value::Rec(row)))
            }

            Exp::Variant(handlers) => {
                let mut row = Row::new();
                for (label, handler) in handlers {
                    row.insert(label.clone(), self.eval_in(handler, env)?);
                }
                Ok(self.alloc(Value::Dispatch(row)))
            }

            Exp::Tag(label) => Ok(self.alloc(Value::TagCtor(label.clone()))),

            Exp::Import(name) => {
                let json = self
                    .resolver
                    .resolve(name)
                    .ok_or_else(|| EvalError::ImportFailed { name: name.clone() })?;
                Ok(self.import_value(&json))
            }

            Exp::Ascribe(_, inner) => self.eval_in(inner, env),

            Exp::Let(pattern, bound, body) => {
                let v = self.eval_in(bound, env)?;
                let env0 = self.bind_pattern(pattern, v, env)?;
                self.eval_in(body, &env0)
            }
        }
    }

    pub fn apply(&mut self, f: ValueId, arg: ValueId) -> Result<ValueId, EvalError> {
        match self.values[f.0].clone() {
            Value::Closure { pattern, body, env } => {
                let env0 = self.bind_pattern(&pattern, arg, &env)?;
                self.eval_in(&body, &env0)
            }

            Value::Dispatch(handlers) => match self.values[arg.0].clone() {
                Value::Tagged(label, payload) => {
                    let handler = handlers.get(&label).copied().ok_or_else(|| {
                        EvalError::UnhandledTag { label: label.clone() }
                    })?;
                    self.apply(handler, payload)
                }
                _ => Err(EvalError::PatternMismatch),
            },

            Value::TagCtor(label) => Ok(self.alloc(Value::Tagged(label, arg))),

            Value::Builtin { op, mut args } => {
                args.push(arg);
                if args.len() == op.arity {
                    (op.native)(self, &args)
                } else {
                    Ok(self.alloc(Value::Builtin { op, args }))
                }
            }

            _ => Err(EvalError::NotAFunction),
        }
    }

    fn bind_pattern(&mut self, p: &Pattern, v: ValueId, env: &Env) -> Result<Env, EvalError> {
        match p {
            Pattern::Var(name) => {
                let mut env0 = env.clone();
                env0.insert(name.clone(), v);
                Ok(env0)
            }
            Pattern::Wild => Ok(env.clone()),
            Pattern::Rec(fields) => {
                let mut env0 = env.clone();
                for (label, sub) in fields {
                    let field_v = self.record_field(v, label)?;
                    env0 = self.bind_pattern(sub, field_v, &env0)?;
                }
                Ok(env0)
            }
        }
    }

    /// Force a record field, memoizing the result in its cell.
    fn force(&mut self, field: FieldId) -> Result<ValueId, EvalError> {
        match &self.fields[field.0] {
            Field::Forced(v) => Ok(*v),
            Field::Thunk { exp, env } => {
                let (exp, env) = (exp.clone(), env.clone());
                let v = self.eval_in(&exp, &env)?;
                self.fields[field.0] = Field::Forced(v);
                Ok(v)
            }
        }
    }

    pub fn record_field(&mut self, v: ValueId, label: &str) -> Result<ValueId, EvalError> {
        let field = match &self.values[v.0] {
            Value::Rec(fields) => fields.get(label).copied().ok_or_else(|| {
                EvalError::MissingField {
                    label: label.to_string(),
                }
            })?,
            _ => return Err(EvalError::PatternMismatch),
        };
        self.force(field)
    }

    pub fn num(&self, v: ValueId) -> Result<f64, EvalError> {
        match &self.values[v.0] {
            Value::Num(n) => Ok(*n),
            _ => Err(EvalError::PatternMismatch),
        }
    }

    pub fn list_items(&self, v: ValueId) -> Result<Vec<ValueId>, EvalError> {
        match &self.values[v.0] {
            Value::List(items) => Ok(items.clone()),
            _ => Err(EvalError::PatternMismatch),
        }
    }

    pub fn alloc_num(&mut self, n: f64) -> ValueId {
        self.alloc(Value::Num(n))
    }

    pub fn alloc_list(&mut self, items: Vec<ValueId>) -> ValueId {
        self.alloc(Value::List(items))
    }

    fn alloc(&mut self, v: Value) -> ValueId {
        let id = ValueId(self.values.len());
        self.values.push(v);
        id
    }

    /// Bridge a host JSON value into the arena. Booleans become `0`/`1` and
    /// strings become character lists; the language has neither natively.
    fn import_value(&mut self, json: &Json) -> ValueId {
        match json {
            Json::Null => self.alloc(Value::Rec(Row::new())),
            Json::Bool(b) => self.alloc_num(if *b { 1.0 } else { 0.0 }),
            Json::Number(n) => {
                let n = n.as_f64().unwrap_or(0.0);
                self.alloc_num(n)
            }
            Json::String(s) => {
                let items = s.chars().map(|c| self.alloc(Value::Char(c))).collect();
                self.alloc_list(items)
            }
            Json::Array(items) => {
                let items = items.iter().map(|item| self.import_value(item)).collect();
                self.alloc_list(items)
            }
            Json::Object(fields) => {
                let mut row = Row::new();
                for (label, field) in fields {
                    let v = self.import_value(field);
                    let id = FieldId(self.fields.len());
                    self.fields.push(Field::Forced(v));
                    row.insert(label.clone(), id);
                }
                self.alloc(Value::Rec(row))
            }
        }
    }

    /// Render a value as JSON. Records already being rendered further up
    /// the stack come out as `"<cycle>"`; anything applicable comes out as
    /// `"<function>"`; a non-empty list of characters comes out as a string.
    pub fn to_json(&mut self, v: ValueId) -> Result<Json, EvalError> {
        let mut seen = Vec::new();
        self.render(v, &mut seen)
    }

    fn render(&mut self, v: ValueId, seen: &mut Vec<ValueId>) -> Result<Json, EvalError> {
        if seen.contains(&v) {
            return Ok(Json::String("<cycle>".to_string()));
        }
        match self.values[v.0].clone() {
            Value::Num(n) => Ok(render_number(n)),
            Value::Char(c) => Ok(Json::String(c.to_string())),

            Value::List(items) => {
                let mut text = String::new();
                let mut all_chars = !items.is_empty();
                for &item in &items {
                    if let Value::Char(c) = self.values[item.0] {
                        text.push(c);
                    } else {
                        all_chars = false;
                        break;
                    }
                }
                if all_chars {
                    return Ok(Json::String(text));
                }
                seen.push(v);
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.render(item, seen)?);
                }
                seen.pop();
                Ok(Json::Array(out))
            }

            Value::Rec(fields) => {
                seen.push(v);
                let mut obj = serde_json::Map::new();
                for (label, field) in &fields {
                    let field_v = self.force(*field)?;
                    obj.insert(label.clone(), self.render(field_v, seen)?);
                }
                seen.pop();
                Ok(Json::Object(obj))
            }

            Value::Tagged(label, payload) => {
                seen.push(v);
                let rendered = self.render(payload, seen)?;
                seen.pop();
                Ok(Json::Array(vec![Json::String(label), rendered]))
            }

            Value::Closure { .. }
            | Value::Dispatch(_)
            | Value::TagCtor(_)
            | Value::Builtin { .. } => Ok(Json::String("<function>".to_string())),
        }
    }
}

fn render_number(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Json::from(n as i64)
    } else {
        Json::from(n)
    }
}
