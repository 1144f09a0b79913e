//! Process-wide registry of tracked objects

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::model::module::ModuleDef;
use crate::model::object::{HeapObject, ObjRef};
use crate::model::provider::ObjectModel;

static GLOBAL: Lazy<ObjectRegistry> = Lazy::new(ObjectRegistry::new);

/// The process-global registry used by the plain snapshot entry point.
pub fn global_registry() -> &'static ObjectRegistry {
    &GLOBAL
}

/// Weakly-held table of every tracked allocation, plus the loaded modules.
///
/// Allocation sites opt objects in through [`ObjectRegistry::alloc`];
/// anything allocated elsewhere is invisible to snapshots. The registry
/// holds only weak handles, so tracking never extends an object's lifetime;
/// a collection pass prunes entries whose objects have been dropped.
pub struct ObjectRegistry {
    objects: RwLock<HashMap<u64, Weak<dyn HeapObject>>>,
    modules: RwLock<BTreeMap<String, Arc<ModuleDef>>>,
}

impl ObjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            modules: RwLock::new(BTreeMap::new()),
        }
    }

    /// Track `obj` and return its strong handle.
    pub fn alloc<T: HeapObject>(&self, obj: T) -> Arc<T> {
        let strong = Arc::new(obj);
        let as_dyn: Arc<dyn HeapObject> = strong.clone();
        self.objects
            .write()
            .insert(as_dyn.object_id().as_u64(), Arc::downgrade(&as_dyn));
        strong
    }

    /// Register `module` as loaded, tracking it like any other object.
    ///
    /// The registry keeps loaded modules alive; everything else must be
    /// held strongly by the caller to stay enumerable.
    pub fn load_module(&self, module: ModuleDef) -> Arc<ModuleDef> {
        let module = self.alloc(module);
        self.modules
            .write()
            .insert(module.name().to_string(), module.clone());
        module
    }

    /// Number of tracked entries, live or dead.
    pub fn tracked(&self) -> usize {
        self.objects.read().len()
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectModel for ObjectRegistry {
    fn collect(&self) -> usize {
        let mut objects = self.objects.write();
        let before = objects.len();
        objects.retain(|_, weak| weak.strong_count() > 0);
        before - objects.len()
    }

    fn live_objects(&self) -> Vec<ObjRef> {
        self.objects
            .read()
            .values()
            .filter_map(|weak| weak.upgrade().map(ObjRef::new))
            .collect()
    }

    fn modules(&self) -> Vec<Arc<ModuleDef>> {
        self.modules.read().values().cloned().collect()
    }
}
