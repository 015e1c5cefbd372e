//! Minimal JS expression AST the import transform operates on.
//!
//! The transform only cares about call shapes: dynamic-import call sites,
//! lazy-loading helper calls, and the literals it emits around them. Anything
//! richer stays opaque to this layer.

use std::fmt;

// =============================================================================
// Span
// =============================================================================

/// Source location of an expression (1-based line, 0-based column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// =============================================================================
// Expr
// =============================================================================

/// A JS expression, reduced to the shapes the transform needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String literal.
    Str(String),
    /// Identifier or dotted member path, e.g. `require.resolveWeak`.
    Ident(String),
    /// Dynamic `import(<specifier>)` call site.
    Import(ImportCall),
    /// Ordinary call expression.
    Call(Call),
    /// Object literal.
    Object(ObjectLit),
    /// Array literal.
    Array(Vec<Expr>),
    /// Zero-argument arrow function returning its body.
    Thunk(Box<Expr>),
}

/// A dynamic-import call site.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCall {
    /// The import specifier (always a string literal at transformable sites).
    pub specifier: String,
    /// Leading comment attached to the first argument, if any. May carry a
    /// `webpackChunkName` annotation.
    pub comment: Option<String>,
    pub span: Span,
}

impl ImportCall {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            comment: None,
            span: Span::default(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// An ordinary call expression with an identifier callee.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

impl Call {
    pub fn new(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            callee: callee.into(),
            args,
            span: Span::default(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// An object literal with insertion-ordered properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectLit {
    pub props: Vec<(String, Expr)>,
}

impl ObjectLit {
    pub fn new(props: Vec<(String, Expr)>) -> Self {
        Self { props }
    }

    pub fn has(&self, key: &str) -> bool {
        self.props.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.props.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Append a property (caller checks for duplicates where it matters).
    pub fn push(&mut self, key: impl Into<String>, value: Expr) {
        self.props.push((key.into(), value));
    }
}
