//! WebAssembly bindings for the rowlang session.

use wasm_bindgen::prelude::*;

use crate::error::LangError;
use crate::session::Session;

/// Result of a query, with either an output string or an error message.
#[wasm_bindgen]
pub struct QueryResult {
    success: bool,
    output: String,
    error: String,
}

#[wasm_bindgen]
impl QueryResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn output(&self) -> String {
        self.output.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> String {
        self.error.clone()
    }
}

impl QueryResult {
    fn ok(output: String) -> Self {
        QueryResult {
            success: true,
            output,
            error: String::new(),
        }
    }

    fn err(error: LangError) -> Self {
        QueryResult {
            success: false,
            output: String::new(),
            error: error.to_string(),
        }
    }
}

/// A rowlang session held from JS.
#[wasm_bindgen]
pub struct WasmSession {
    inner: Session,
}

/// Initialize the WASM module (call once at startup).
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[wasm_bindgen]
impl WasmSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmSession {
        WasmSession {
            inner: Session::new(),
        }
    }

    /// Parse the source and print it back in normal form.
    pub fn parse(&self, source: &str) -> QueryResult {
        match self.inner.parse(source) {
            Ok(printed) => QueryResult::ok(printed),
            Err(e) => QueryResult::err(e),
        }
    }

    /// Infer the type of the source expression.
    pub fn type_of(&mut self, source: &str) -> QueryResult {
        match self.inner.type_of(source) {
            Ok(ty) => QueryResult::ok(ty),
            Err(e) => QueryResult::err(e),
        }
    }

    /// Evaluate the source expression to JSON text.
    pub fn evaluate(&mut self, source: &str) -> QueryResult {
        match self.inner.evaluate(source) {
            Ok(value) => QueryResult::ok(value),
            Err(e) => QueryResult::err(e),
        }
    }

    /// Drop all per-query state.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl Default for WasmSession {
    fn default() -> Self {
        WasmSession::new()
    }
}
