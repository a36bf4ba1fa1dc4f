//! The embedding surface: one [`Session`] owns the checker state and the
//! import resolver, and exposes the language as strings in, strings out.

use crate::error::Result;
use crate::eval::Interp;
use crate::infer::{CheckState, Context};
use crate::parser;
use crate::types::{print_type, Type};

pub use crate::eval::{ImportResolver, NoImports};

pub struct Session {
    state: CheckState,
    resolver: Box<dyn ImportResolver>,
}

impl Session {
    pub fn new() -> Self {
        Session::with_resolver(Box::new(NoImports))
    }

    pub fn with_resolver(resolver: Box<dyn ImportResolver>) -> Self {
        Session {
            state: CheckState::new(),
            resolver,
        }
    }

    pub fn set_resolver(&mut self, resolver: Box<dyn ImportResolver>) {
        self.resolver = resolver;
    }

    /// Parse and print back, normalizing whitespace and sugar.
    pub fn parse(&self, source: &str) -> Result<String> {
        let e = parser::parse(source)?;
        Ok(e.to_string())
    }

    /// Infer and fully solve the type of a complete expression.
    pub fn type_of(&mut self, source: &str) -> Result<String> {
        self.state.reset();
        let e = parser::parse(source)?;
        let t = self.state.type_exp(&Context::new(), &e)?;
        self.state.set_last_type(t);
        self.state.solve_full()?;
        let t = self.state.last_type().cloned().unwrap_or(Type::Unit);
        Ok(print_type(&t, 0))
    }

    /// Evaluate a complete expression and render the result as JSON text.
    pub fn evaluate(&mut self, source: &str) -> Result<String> {
        let e = parser::parse(source)?;
        let mut interp = Interp::new(self.resolver.as_ref());
        let v = interp.eval(&e)?;
        let json = interp.to_json(v)?;
        Ok(json.to_string())
    }

    /// Drop all per-query checker state, keeping the resolver.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Equations still pending after the last query, in printed form.
    pub fn equation_log(&self) -> &[String] {
        self.state.equation_keys()
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LangError, ParseError};
    use serde_json::{json, Value as Json};

    #[test]
    fn test_parse_normalizes() {
        let session = Session::new();
        assert_eq!(session.parse("1+2").as_deref(), Ok("(1 + 2)"));
    }

    #[test]
    fn test_type_of_and_evaluate_agree_on_numbers() {
        let mut session = Session::new();
        assert_eq!(session.type_of("1 + 2").as_deref(), Ok("N"));
        assert_eq!(session.evaluate("1 + 2").as_deref(), Ok("3"));
    }

    #[test]
    fn test_queries_are_independent() {
        // Each query resets the fresh counter, so two runs of the same
        // source print the same type.
        let mut session = Session::new();
        let first = session.type_of("x => x").expect("types");
        session.type_of("{a: 1, b: this}").expect("types");
        let again = session.type_of("x => x").expect("types");
        assert_eq!(first, again);
    }

    #[test]
    fn test_successful_query_leaves_no_pending_equations() {
        let mut session = Session::new();
        session.type_of("map (x => x + 1) [1, 2]").expect("types");
        assert!(session.equation_log().is_empty());
    }

    #[test]
    fn test_record_evaluation_renders_object() {
        let mut session = Session::new();
        assert_eq!(
            session.evaluate("{a: 1, b: this.a + 1}").as_deref(),
            Ok(r#"{"a":1,"b":2}"#)
        );
    }

    #[test]
    fn test_trailing_input_surfaces_as_parse_error() {
        let mut session = Session::new();
        assert_eq!(
            session.type_of("1 +"),
            Err(LangError::Parse(ParseError::Trailing {
                remainder: "+".to_string()
            }))
        );
    }

    struct Prelude;

    impl ImportResolver for Prelude {
        fn resolve(&self, name: &str) -> Option<Json> {
            (name == "greeting").then(|| json!("hi"))
        }
    }

    #[test]
    fn test_resolver_hook_feeds_imports() {
        let mut session = Session::with_resolver(Box::new(Prelude));
        assert_eq!(session.evaluate("import greeting").as_deref(), Ok(r#""hi""#));
        assert_eq!(session.evaluate("# import greeting").as_deref(), Ok("2"));
    }
}
