//! Module registry: factories and evaluated records.
//!
//! Executable chunks register a factory per module while they attach. The
//! first `require` of a module runs its factory exactly once and memoizes the
//! exports; every later `require` hands back the same shared record, so
//! module-level side effects never re-run.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, OnceLock};

use crate::chunk::ModuleId;
use crate::error::RuntimeError;

/// Evaluated module exports.
pub type Exports = serde_json::Value;

/// Produces a module's exports on first evaluation.
pub type ModuleFactory = Box<dyn Fn() -> Result<Exports, String> + Send + Sync>;

/// One module's evaluation record. The cell settles exactly once, even when
/// racing callers require the module from different tasks.
type EvalCell = Arc<OnceLock<Result<Arc<Exports>, String>>>;

/// Factories and evaluated records, keyed by module id.
#[derive(Default)]
pub struct ModuleRegistry {
    factories: DashMap<ModuleId, ModuleFactory>,
    records: DashMap<ModuleId, EvalCell>,
}

impl ModuleRegistry {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Register a module factory. The first registration for an id wins;
    /// re-attaching a chunk must not displace an already-known module.
    pub fn register(&self, module: ModuleId, factory: ModuleFactory) {
        if let Entry::Vacant(slot) = self.factories.entry(module) {
            slot.insert(factory);
        }
    }

    /// Whether a factory is known for this module (loaded or not yet
    /// evaluated).
    pub fn is_registered(&self, module: &ModuleId) -> bool {
        self.factories.contains_key(module)
    }

    /// Synchronous registry lookup; evaluates the factory on first call.
    ///
    /// A missing factory means the owning chunk has not finished loading -
    /// generated code always loads before requiring, so this is an ordering
    /// defect surfaced as [`RuntimeError::ModuleNotFound`]. It is not
    /// memoized: the same require succeeds once the chunk has loaded.
    ///
    /// Evaluation outcomes are memoized, failures included; the session's
    /// only reset is a full reload. A factory may require other modules
    /// while it runs, but must not register new ones.
    pub fn require(&self, module: &ModuleId) -> Result<Arc<Exports>, RuntimeError> {
        if !self.factories.contains_key(module) {
            return Err(RuntimeError::ModuleNotFound(module.clone()));
        }

        // Clone the cell out so no record lock is held while the factory
        // runs; racing callers converge on the cell's single settlement.
        let cell: EvalCell = self.records.entry(module.clone()).or_default().clone();
        let outcome = cell.get_or_init(|| match self.factories.get(module) {
            Some(factory) => (*factory)().map(Arc::new),
            None => Err(format!("factory for {module} vanished")),
        });

        match outcome {
            Ok(exports) => Ok(exports.clone()),
            Err(reason) => Err(RuntimeError::Eval {
                module: module.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn require_before_registration_is_an_ordering_defect() {
        let registry = ModuleRegistry::new();
        let module = ModuleId::ecmascript("src/a.js");

        let err = registry.require(&module).unwrap_err();
        assert!(matches!(err, RuntimeError::ModuleNotFound(m) if m == module));
    }

    #[test]
    fn factory_runs_exactly_once() {
        let registry = ModuleRegistry::new();
        let module = ModuleId::ecmascript("src/a.js");
        let evaluations = Arc::new(AtomicUsize::new(0));

        let count = evaluations.clone();
        registry.register(
            module.clone(),
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(json!({"default": "a"}))
            }),
        );

        let first = registry.require(&module).unwrap();
        let second = registry.require(&module).unwrap();

        assert_eq!(evaluations.load(Ordering::SeqCst), 1);
        // Same record, not an equal copy.
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn first_registration_wins() {
        let registry = ModuleRegistry::new();
        let module = ModuleId::ecmascript("src/a.js");

        registry.register(module.clone(), Box::new(|| Ok(json!(1))));
        registry.register(module.clone(), Box::new(|| Ok(json!(2))));

        assert_eq!(*registry.require(&module).unwrap(), json!(1));
    }

    #[test]
    fn failing_factory_surfaces_eval_error() {
        let registry = ModuleRegistry::new();
        let module = ModuleId::ecmascript("src/broken.js");

        registry.register(module.clone(), Box::new(|| Err("boom".to_string())));

        let err = registry.require(&module).unwrap_err();
        assert!(matches!(err, RuntimeError::Eval { reason, .. } if reason == "boom"));
    }
}
