//! Import transform.
//!
//! Rewrites dynamic-import call expressions into runtime loader invocations
//! carrying a resolved chunk name, and augments lazy-loading helper calls
//! (`dynamic(...)` / `loadable(...)`) with the generated metadata the server
//! renderer and client preloader consume.
//!
//! ```text
//! import('./Big')            ->  __chunkline_import__('./Big', 'pages-Big-js')
//! dynamic(() => import(..))  ->  dynamic(() => __chunkline_import__(..), {
//!                                    loadableGenerated: { webpack, modules },
//!                                })
//! ```

pub mod ast;
mod chunk_name;
mod loadable;

pub use chunk_name::{TransformOptions, resolve_chunk_name};

use thiserror::Error;

use ast::{Call, Expr, ImportCall, Span};

/// Callee the transform emits for rewritten dynamic-import sites. The runtime
/// binds it to [`crate::runtime::Session::import`].
pub const RUNTIME_IMPORT_FN: &str = "__chunkline_import__";

/// Callee emitted inside `loadableGenerated.webpack` thunks: resolves a
/// module id without executing its chunk, so the server renderer can learn
/// which chunks a component needs without running client code.
pub const RESOLVE_WEAK_FN: &str = "require.resolveWeak";

/// Metadata property appended to lazy-loading helper options.
pub const LOADABLE_GENERATED: &str = "loadableGenerated";

/// Lazy-loading helper callees the transform recognizes.
const LOADER_HELPERS: [&str; 2] = ["dynamic", "loadable"];

// =============================================================================
// TransformError
// =============================================================================

/// Compile-time failure: a malformed call site. Fails the build with a
/// source location; never recoverable at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("{span}: dynamic loader call takes at most two arguments, got {got}")]
    TooManyArgs { span: Span, got: usize },
}

// =============================================================================
// Entry point
// =============================================================================

/// Transform one expression tree in place.
///
/// Returns whether anything changed. Re-running the transform over already
/// transformed output is a no-op: rewritten import sites are ordinary calls,
/// and helper calls bearing `loadableGenerated` are skipped.
pub fn transform_expr(expr: &mut Expr, opts: &TransformOptions) -> Result<bool, TransformError> {
    match expr {
        Expr::Import(import) => {
            let rewritten = rewrite_import(import, opts);
            *expr = rewritten;
            Ok(true)
        }
        Expr::Call(call) if is_loader_helper(&call.callee) => {
            loadable::transform_helper_call(call, opts)
        }
        Expr::Call(call) => transform_each(call.args.iter_mut(), opts),
        Expr::Object(obj) => transform_each(obj.props.iter_mut().map(|(_, v)| v), opts),
        Expr::Array(items) => transform_each(items.iter_mut(), opts),
        Expr::Thunk(body) => transform_expr(body, opts),
        Expr::Str(_) | Expr::Ident(_) => Ok(false),
    }
}

fn transform_each<'a>(
    exprs: impl Iterator<Item = &'a mut Expr>,
    opts: &TransformOptions,
) -> Result<bool, TransformError> {
    let mut changed = false;
    for expr in exprs {
        changed |= transform_expr(expr, opts)?;
    }
    Ok(changed)
}

fn is_loader_helper(callee: &str) -> bool {
    LOADER_HELPERS.contains(&callee)
}

/// Replace a dynamic-import call site with a runtime loader invocation.
fn rewrite_import(import: &ImportCall, opts: &TransformOptions) -> Expr {
    let chunk_name = resolve_chunk_name(import, opts);
    Expr::Call(
        Call::new(
            RUNTIME_IMPORT_FN,
            vec![
                Expr::Str(import.specifier.clone()),
                Expr::Str(chunk_name),
            ],
        )
        .with_span(import.span),
    )
}

// =============================================================================
// Tests
// =============================================================================
