//! Object identity and the tracked-object trait

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::module::ClassDef;
use crate::model::value::Value;

/// Global object ID counter (0 is reserved for unreadable identities)
static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique object ID
fn generate_object_id() -> u64 {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Stable identity of a tracked object for the lifetime of the process
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Allocate the next process-wide identity
    pub fn next() -> Self {
        Self(generate_object_id())
    }

    /// Wrap a raw identity value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the identity as a u64
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A heap object visible to snapshots.
///
/// Everything a snapshot knows about an object flows through this trait, so
/// implementations are treated as untrusted: the snapshot path guards every
/// call against panics.
pub trait HeapObject: Any + Send + Sync {
    /// Identity of this object
    fn object_id(&self) -> ObjectId;

    /// Declared type name
    fn type_name(&self) -> &str;

    /// Approximate shallow memory footprint in bytes
    fn size_bytes(&self) -> usize;

    /// Instance attributes in declaration order; empty when the object
    /// carries none
    fn attrs(&self) -> Vec<(String, Value)> {
        Vec::new()
    }

    /// Direct outgoing references held by this object. Containers report
    /// their elements; instances report their object-valued attributes.
    fn referents(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Class this object is an instance of, when known
    fn class(&self) -> Option<Arc<ClassDef>> {
        None
    }

    /// Upcast used for kind dispatch
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a tracked object. Equality is object identity.
#[derive(Clone)]
pub struct ObjRef(Arc<dyn HeapObject>);

impl ObjRef {
    /// Wrap a shared object handle
    pub fn new(obj: Arc<dyn HeapObject>) -> Self {
        Self(obj)
    }

    /// Identity of the wrapped object
    pub fn id(&self) -> ObjectId {
        self.0.object_id()
    }
}

impl Deref for ObjRef {
    type Target = dyn HeapObject;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for ObjRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for ObjRef {}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjRef").field(&self.id()).finish()
    }
}

/// General-purpose instance with a mutable attribute map.
#[derive(Debug)]
pub struct DynObject {
    id: ObjectId,
    class: Option<Arc<ClassDef>>,
    attrs: RwLock<BTreeMap<String, Value>>,
}

impl DynObject {
    /// Create an instance of `class`; pass `None` for a plain object.
    pub fn new(class: Option<Arc<ClassDef>>) -> Self {
        Self {
            id: ObjectId::next(),
            class,
            attrs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Set or replace an attribute.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.attrs.write().insert(name.into(), value);
    }
}

impl HeapObject for DynObject {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &str {
        self.class.as_ref().map(|c| c.name()).unwrap_or("object")
    }

    fn size_bytes(&self) -> usize {
        let attrs = self.attrs.read();
        let payload: usize = attrs
            .iter()
            .map(|(name, value)| name.capacity() + value.shallow_size())
            .sum();
        std::mem::size_of::<Self>() + payload
    }

    fn attrs(&self) -> Vec<(String, Value)> {
        self.attrs
            .read()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn referents(&self) -> Vec<Value> {
        self.attrs
            .read()
            .values()
            .filter(|value| matches!(value, Value::Ref(_)))
            .cloned()
            .collect()
    }

    fn class(&self) -> Option<Arc<ClassDef>> {
        self.class.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Ordered container of values.
#[derive(Debug)]
pub struct ListObject {
    id: ObjectId,
    items: RwLock<Vec<Value>>,
}

impl ListObject {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            id: ObjectId::next(),
            items: RwLock::new(Vec::new()),
        }
    }

    /// Append a value.
    pub fn push(&self, value: Value) {
        self.items.write().push(value);
    }

    /// Remove and return the oldest value, when any.
    pub fn pop_front(&self) -> Option<Value> {
        let mut items = self.items.write();
        if items.is_empty() {
            None
        } else {
            Some(items.remove(0))
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// True when the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl Default for ListObject {
    fn default() -> Self {
        Self::new()
    }
}

impl HeapObject for ListObject {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &str {
        "list"
    }

    fn size_bytes(&self) -> usize {
        let items = self.items.read();
        std::mem::size_of::<Self>() + items.iter().map(Value::shallow_size).sum::<usize>()
    }

    fn referents(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
