//! Object model: values, tracked objects, callables, modules, and the
//! process-wide registry a snapshot enumerates.

pub mod code;
pub mod module;
pub mod object;
pub mod provider;
pub mod registry;
pub mod value;

pub use code::{CodeUnit, FunctionDef, MethodDef};
pub use module::{ClassDef, ModuleDef};
pub use object::{DynObject, HeapObject, ListObject, ObjRef, ObjectId};
pub use provider::ObjectModel;
pub use registry::{global_registry, ObjectRegistry};
pub use value::Value;
