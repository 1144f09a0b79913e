//! Panic-guarded reflective access to tracked objects
//!
//! [`HeapObject`] implementations are arbitrary code: a broken or hostile
//! one must degrade to a sentinel value, never abort the walk. Every
//! per-object call the snapshot path makes goes through these guards.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::model::module::ClassDef;
use crate::model::object::{HeapObject, ObjectId};
use crate::model::value::Value;

/// Sentinel emitted when a type name cannot be read.
pub const UNREADABLE_TYPE: &str = "<unreadable type>";

/// Run a reflective computation, discarding its result if it panics.
pub fn guard<R>(f: impl FnOnce() -> R) -> Option<R> {
    catch_unwind(AssertUnwindSafe(f)).ok()
}

/// Identity, or the reserved id 0 when the implementation panics.
pub fn safe_object_id(obj: &dyn HeapObject) -> ObjectId {
    guard(|| obj.object_id()).unwrap_or(ObjectId::new(0))
}

/// Declared type name, or [`UNREADABLE_TYPE`] when the implementation
/// panics.
pub fn safe_type_name(obj: &dyn HeapObject) -> String {
    guard(|| obj.type_name().to_string()).unwrap_or_else(|| UNREADABLE_TYPE.to_string())
}

/// Size estimate, or 0 when the implementation panics.
pub fn safe_size(obj: &dyn HeapObject) -> usize {
    guard(|| obj.size_bytes()).unwrap_or(0)
}

/// Instance attributes, or none when the implementation panics.
pub fn safe_attrs(obj: &dyn HeapObject) -> Vec<(String, Value)> {
    guard(|| obj.attrs()).unwrap_or_default()
}

/// Direct references, or none when the implementation panics.
pub fn safe_referents(obj: &dyn HeapObject) -> Vec<Value> {
    guard(|| obj.referents()).unwrap_or_default()
}

/// Class of the object, or `None` when the implementation panics.
pub fn safe_class(obj: &dyn HeapObject) -> Option<Arc<ClassDef>> {
    guard(|| obj.class()).flatten()
}

/// Upcast for kind dispatch, or `None` when the implementation panics.
pub fn safe_any(obj: &dyn HeapObject) -> Option<&dyn Any> {
    guard(|| obj.as_any())
}
