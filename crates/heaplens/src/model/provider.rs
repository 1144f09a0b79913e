//! Injection seam for the process state a snapshot reads

use std::sync::Arc;

use crate::model::module::ModuleDef;
use crate::model::object::ObjRef;

/// The object universe a snapshot walks.
///
/// The snapshot path only reads through this trait, so callers can
/// substitute a fixed universe for the global registry when testing.
pub trait ObjectModel: Send + Sync {
    /// Run a collection pass; returns the number of dead entries dropped.
    fn collect(&self) -> usize;

    /// Every currently live tracked object.
    fn live_objects(&self) -> Vec<ObjRef>;

    /// Every currently loaded module.
    fn modules(&self) -> Vec<Arc<ModuleDef>>;
}
