//! Per-object metadata extraction

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde_json::Value as JsonValue;

use crate::model::code::{CodeUnit, FunctionDef, MethodDef};
use crate::model::module::{ClassDef, ModuleDef};
use crate::model::object::ObjRef;
use crate::model::provider::ObjectModel;
use crate::snapshot::normalize::normalize;
use crate::snapshot::record::{ObjectRecord, SourceInfo};
use crate::snapshot::reflect;

/// Module files keyed by module name, for class location lookups.
pub type ModuleIndex = FxHashMap<String, String>;

/// Indexes the model's loaded modules by name. Built once per snapshot
/// and shared across every record.
pub fn module_index(model: &dyn ObjectModel) -> ModuleIndex {
    model
        .modules()
        .into_iter()
        .map(|module| (module.name().to_string(), module.file().to_string()))
        .collect()
}

/// Builds the metadata record for one live object.
///
/// Every probe of the object goes through the reflection guards, so a
/// hostile object degrades to a bare `{size: 0}` record instead of
/// aborting the walk.
pub fn object_record(obj: &ObjRef, modules: &ModuleIndex) -> ObjectRecord {
    let size = reflect::safe_size(&**obj) as u64;
    let attr = instance_attrs(obj).or_else(|| code_attrs(obj));
    let refs = referent_list(obj);
    let src = reflect::guard(|| source_location(obj, modules))
        .flatten()
        .filter(|info| !info.is_empty());
    ObjectRecord {
        size,
        attr,
        refs,
        src,
    }
}

/// Normalized attribute map, or `None` when the object exposes no attributes.
fn instance_attrs(obj: &ObjRef) -> Option<BTreeMap<String, JsonValue>> {
    let attrs = reflect::safe_attrs(&**obj);
    if attrs.is_empty() {
        return None;
    }
    Some(
        attrs
            .into_iter()
            .map(|(name, value)| (name, normalize(&value)))
            .collect(),
    )
}

/// Code units carry no attribute map of their own; their location fields
/// are surfaced under the conventional `co_*` keys instead.
fn code_attrs(obj: &ObjRef) -> Option<BTreeMap<String, JsonValue>> {
    let code = reflect::safe_any(&**obj)?.downcast_ref::<CodeUnit>()?;
    let mut map = BTreeMap::new();
    map.insert("co_name".to_string(), JsonValue::from(code.name()));
    map.insert("co_filename".to_string(), JsonValue::from(code.file()));
    map.insert("co_firstlineno".to_string(), JsonValue::from(code.line()));
    Some(map)
}

fn referent_list(obj: &ObjRef) -> Option<Vec<JsonValue>> {
    let referents = reflect::safe_referents(&**obj);
    if referents.is_empty() {
        return None;
    }
    Some(referents.iter().map(normalize).collect())
}

/// Resolves where the code behind an object lives.
///
/// Functions and methods point at their code unit. Classes and modules
/// point at their defining file. Plain instances borrow their class's
/// constructor location, falling back to the class name plus the file of
/// the module that declared it. Code units resolve to nothing; their
/// location already rides along as attributes.
fn source_location(obj: &ObjRef, modules: &ModuleIndex) -> Option<SourceInfo> {
    let any = obj.as_any();
    if let Some(function) = any.downcast_ref::<FunctionDef>() {
        return Some(code_src(function.code()));
    }
    if let Some(method) = any.downcast_ref::<MethodDef>() {
        return Some(code_src(method.code()));
    }
    if let Some(class) = any.downcast_ref::<ClassDef>() {
        return Some(SourceInfo {
            co_name: Some(class.name().to_string()),
            co_filename: modules.get(class.module()).cloned(),
            co_lineno: None,
        });
    }
    if let Some(module) = any.downcast_ref::<ModuleDef>() {
        return Some(SourceInfo {
            co_name: Some(module.name().to_string()),
            co_filename: Some(module.file().to_string()),
            co_lineno: None,
        });
    }
    if any.is::<CodeUnit>() {
        return None;
    }
    let class = obj.class()?;
    match class.constructor() {
        Some(code) => Some(code_src(&code)),
        None => Some(SourceInfo {
            co_name: Some(class.name().to_string()),
            co_filename: modules.get(class.module()).cloned(),
            co_lineno: None,
        }),
    }
}

fn code_src(code: &CodeUnit) -> SourceInfo {
    SourceInfo {
        co_name: Some(code.name().to_string()),
        co_filename: Some(code.file().to_string()),
        co_lineno: Some(code.line()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::object::{DynObject, HeapObject, ObjectId};
    use crate::model::registry::ObjectRegistry;
    use crate::model::value::Value;
    use serde_json::json;
    use std::any::Any;
    use std::sync::Arc;

    fn obj_ref(obj: Arc<dyn HeapObject>) -> ObjRef {
        ObjRef::new(obj)
    }

    #[test]
    fn test_function_record_points_at_its_code() {
        let registry = ObjectRegistry::new();
        let function = registry.alloc(FunctionDef::new(
            "restock",
            CodeUnit::new("restock", "src/jobs.rs", 41),
        ));
        let record = object_record(&obj_ref(function), &module_index(&registry));

        let src = record.src.unwrap();
        assert_eq!(src.co_name.as_deref(), Some("restock"));
        assert_eq!(src.co_filename.as_deref(), Some("src/jobs.rs"));
        assert_eq!(src.co_lineno, Some(41));
        assert!(record.attr.is_none());
        assert_eq!(record.refs.map(|refs| refs.len()), Some(1));
    }

    #[test]
    fn test_code_unit_record_surfaces_location_as_attrs() {
        let registry = ObjectRegistry::new();
        let code = registry.alloc(CodeUnit::new("restock", "src/jobs.rs", 41));
        let record = object_record(&obj_ref(code), &module_index(&registry));

        let attr = record.attr.unwrap();
        assert_eq!(attr.get("co_name"), Some(&json!("restock")));
        assert_eq!(attr.get("co_filename"), Some(&json!("src/jobs.rs")));
        assert_eq!(attr.get("co_firstlineno"), Some(&json!(41)));
        assert!(record.src.is_none());
        assert!(record.refs.is_none());
    }

    #[test]
    fn test_instance_record_borrows_constructor_location() {
        let registry = ObjectRegistry::new();
        let mut class = ClassDef::new("Item", "inventory");
        class.set_constructor(Arc::new(CodeUnit::new("Item::new", "src/inventory.rs", 9)));
        let class = registry.alloc(class);

        let item = registry.alloc(DynObject::new(Some(class)));
        item.set("sku", Value::Int(7));
        let record = object_record(&obj_ref(item), &module_index(&registry));

        assert_eq!(record.attr.unwrap().get("sku"), Some(&json!(7)));
        let src = record.src.unwrap();
        assert_eq!(src.co_name.as_deref(), Some("Item::new"));
        assert_eq!(src.co_filename.as_deref(), Some("src/inventory.rs"));
        assert_eq!(src.co_lineno, Some(9));
    }

    #[test]
    fn test_instance_without_constructor_falls_back_to_module_file() {
        let registry = ObjectRegistry::new();
        registry.load_module(ModuleDef::new("inventory", "src/inventory.rs"));
        let class = registry.alloc(ClassDef::new("Item", "inventory"));

        let item = registry.alloc(DynObject::new(Some(class)));
        item.set("sku", Value::Int(1));
        let record = object_record(&obj_ref(item), &module_index(&registry));

        let src = record.src.unwrap();
        assert_eq!(src.co_name.as_deref(), Some("Item"));
        assert_eq!(src.co_filename.as_deref(), Some("src/inventory.rs"));
        assert_eq!(src.co_lineno, None);
    }

    #[test]
    fn test_module_index_maps_names_to_files() {
        let registry = ObjectRegistry::new();
        registry.load_module(ModuleDef::new("inventory", "src/inventory.rs"));
        registry.load_module(ModuleDef::new("jobs", "src/jobs.rs"));

        let index = module_index(&registry);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("jobs").map(String::as_str), Some("src/jobs.rs"));
        assert!(index.get("billing").is_none());
    }

    #[test]
    fn test_class_record_lists_bindings_and_module_file() {
        let registry = ObjectRegistry::new();
        registry.load_module(ModuleDef::new("inventory", "src/inventory.rs"));
        let mut class = ClassDef::new("Item", "inventory");
        class.bind("VERSION", Value::Int(2));
        let class = registry.alloc(class);
        let record = object_record(&obj_ref(class), &module_index(&registry));

        assert_eq!(record.attr.unwrap().get("VERSION"), Some(&json!(2)));
        let src = record.src.unwrap();
        assert_eq!(src.co_name.as_deref(), Some("Item"));
        assert_eq!(src.co_filename.as_deref(), Some("src/inventory.rs"));
    }

    #[test]
    fn test_attr_values_pass_through_normalizer() {
        let registry = ObjectRegistry::new();
        let item = registry.alloc(DynObject::new(None));
        item.set("notes", Value::Str("x".repeat(1500)));
        let record = object_record(&obj_ref(item), &module_index(&registry));

        let attr = record.attr.unwrap();
        let notes = attr.get("notes").and_then(|v| v.as_str()).unwrap();
        assert_eq!(notes.len(), 1000);
    }

    struct Hostile;

    impl HeapObject for Hostile {
        fn object_id(&self) -> ObjectId {
            panic!("id probe rejected")
        }

        fn type_name(&self) -> &str {
            panic!("type probe rejected")
        }

        fn size_bytes(&self) -> usize {
            panic!("size probe rejected")
        }

        fn attrs(&self) -> Vec<(String, Value)> {
            panic!("attr probe rejected")
        }

        fn referents(&self) -> Vec<Value> {
            panic!("referent probe rejected")
        }

        fn as_any(&self) -> &dyn Any {
            panic!("any probe rejected")
        }
    }

    #[test]
    fn test_hostile_object_degrades_to_bare_record() {
        let registry = ObjectRegistry::new();
        let record = object_record(&obj_ref(Arc::new(Hostile)), &module_index(&registry));

        assert_eq!(record.size, 0);
        assert!(record.attr.is_none());
        assert!(record.refs.is_none());
        assert!(record.src.is_none());
    }
}
