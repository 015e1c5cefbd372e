//! Lazy-loading helper calls (`dynamic(...)` / `loadable(...)`).
//!
//! The helper's first argument is a loader that may contain one or more
//! dynamic-import sites. When it does, the call gains a `loadableGenerated`
//! options property carrying (a) a thunk of weakly-resolved module ids for
//! the server renderer and (b) the raw specifier list for client preloading.
//! Helpers whose loader contains no dynamic import are left untouched - not
//! every `dynamic(...)` call loads code.

use super::ast::{Call, Expr, ObjectLit};
use super::chunk_name::TransformOptions;
use super::{LOADABLE_GENERATED, RESOLVE_WEAK_FN, TransformError, transform_expr};

/// Transform one helper call in place. Returns whether anything changed.
pub(super) fn transform_helper_call(
    call: &mut Call,
    opts: &TransformOptions,
) -> Result<bool, TransformError> {
    if call.args.len() > 2 {
        return Err(TransformError::TooManyArgs {
            span: call.span,
            got: call.args.len(),
        });
    }

    // The metadata needs somewhere to land. An options argument of an
    // unexpected shape leaves the whole call untouched - rewriting the
    // imports without recording them would lose the metadata for good.
    match call.args.get(1) {
        None | Some(Expr::Object(_)) => {}
        Some(_) => return Ok(false),
    }

    // Already processed on an earlier compiler pass: skip wholesale.
    if let Some(Expr::Object(options)) = call.args.get(1)
        && options.has(LOADABLE_GENERATED)
    {
        return Ok(false);
    }

    let Some(loader) = call.args.first_mut() else {
        return Ok(false);
    };

    let mut specifiers = Vec::new();
    collect_specifiers(loader, &mut specifiers);
    if specifiers.is_empty() {
        return Ok(false);
    }

    // Rewrite the nested import sites, then record what they were.
    transform_expr(loader, opts)?;
    let generated = loadable_generated(&specifiers);

    if let Some(Expr::Object(options)) = call.args.get_mut(1) {
        options.push(LOADABLE_GENERATED, generated);
    } else {
        call.args.push(Expr::Object(ObjectLit::new(vec![(
            LOADABLE_GENERATED.to_string(),
            generated,
        )])));
    }
    Ok(true)
}

/// Collect the specifier of every dynamic-import site in the tree, in source
/// order.
fn collect_specifiers(expr: &Expr, out: &mut Vec<String>) {
    match expr {
        Expr::Import(import) => out.push(import.specifier.clone()),
        Expr::Call(call) => {
            for arg in &call.args {
                collect_specifiers(arg, out);
            }
        }
        Expr::Object(obj) => {
            for (_, value) in &obj.props {
                collect_specifiers(value, out);
            }
        }
        Expr::Array(items) => {
            for item in items {
                collect_specifiers(item, out);
            }
        }
        Expr::Thunk(body) => collect_specifiers(body, out),
        Expr::Str(_) | Expr::Ident(_) => {}
    }
}

/// Build the `loadableGenerated` metadata object.
fn loadable_generated(specifiers: &[String]) -> Expr {
    let weak = specifiers
        .iter()
        .map(|s| Expr::Call(Call::new(RESOLVE_WEAK_FN, vec![Expr::Str(s.clone())])))
        .collect();
    let modules = specifiers.iter().map(|s| Expr::Str(s.clone())).collect();

    Expr::Object(ObjectLit::new(vec![
        (
            "webpack".to_string(),
            Expr::Thunk(Box::new(Expr::Array(weak))),
        ),
        ("modules".to_string(), Expr::Array(modules)),
    ]))
}

// =============================================================================
// Tests
// =============================================================================
