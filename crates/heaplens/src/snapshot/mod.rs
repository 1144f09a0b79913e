//! Point-in-time heap snapshots

pub mod enumerate;
pub mod extract;
pub mod normalize;
pub mod record;
pub mod reflect;
pub mod writer;

pub use record::{HeapSnapshot, ObjectRecord, SourceInfo};

use std::any::Any;
use std::fs;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

use crate::model::provider::ObjectModel;
use crate::model::registry::global_registry;
use crate::{DumpError, DumpResult};

/// Walks every live object and groups the extracted records by type
/// name, then by object identity.
pub fn build_snapshot(model: &dyn ObjectModel) -> HeapSnapshot {
    let objects = enumerate::live_objects(model);
    let modules = extract::module_index(model);
    let mut snapshot = HeapSnapshot::new();
    for obj in objects {
        let type_name = reflect::safe_type_name(&*obj);
        let id = reflect::safe_object_id(&*obj).as_u64().to_string();
        let record = extract::object_record(&obj, &modules);
        snapshot.entry(type_name).or_default().insert(id, record);
    }
    snapshot
}

/// Dumps metadata for every live object in the global registry to
/// `destination_path` and returns a one-line summary.
pub fn collect_heap_metadata(destination_path: impl AsRef<Path>) -> DumpResult<String> {
    collect_heap_metadata_with(global_registry(), destination_path)
}

/// Dumps metadata for every live object in `model` to `destination_path`.
///
/// The walk runs under a panic guard. A failure anywhere inside it is
/// reported as [`DumpError::WalkPanic`] carrying the panic text and a
/// captured backtrace instead of unwinding through the caller.
pub fn collect_heap_metadata_with(
    model: &dyn ObjectModel,
    destination_path: impl AsRef<Path>,
) -> DumpResult<String> {
    let start = Instant::now();
    let snapshot =
        catch_unwind(AssertUnwindSafe(|| build_snapshot(model))).map_err(|payload| {
            DumpError::WalkPanic {
                cause: panic_message(payload.as_ref()),
                trace: std::backtrace::Backtrace::force_capture().to_string(),
            }
        })?;
    let path = writer::write_dump(destination_path, &snapshot)?;
    let bytes = fs::metadata(&path)
        .map_err(|source| DumpError::Io {
            path: path.clone(),
            source,
        })?
        .len();
    Ok(format!(
        "Heap dump \"{}\" saved in {:.2} seconds. JSON size: {:.2}MB",
        path.display(),
        start.elapsed().as_secs_f64(),
        bytes as f64 / (1024.0 * 1024.0),
    ))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::module::{ClassDef, ModuleDef};
    use crate::model::object::{DynObject, ListObject, ObjRef};
    use crate::model::registry::ObjectRegistry;
    use crate::model::value::Value;
    use std::sync::Arc;

    #[test]
    fn test_snapshot_groups_records_by_type() {
        let registry = ObjectRegistry::new();
        let class = registry.alloc(ClassDef::new("Item", "inventory"));
        let _first = registry.alloc(DynObject::new(Some(class.clone())));
        let _second = registry.alloc(DynObject::new(Some(class.clone())));
        let list = registry.alloc(ListObject::new());
        list.push(Value::Int(1));

        let snapshot = build_snapshot(&registry);
        assert_eq!(snapshot.get("Item").map(|records| records.len()), Some(2));
        assert_eq!(snapshot.get("class").map(|records| records.len()), Some(1));
        assert_eq!(snapshot.get("list").map(|records| records.len()), Some(1));
    }

    #[test]
    fn test_dump_summary_reports_path_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ObjectRegistry::new();
        let _item = registry.alloc(DynObject::new(None));

        let message = collect_heap_metadata_with(&registry, dir.path().join("dump")).unwrap();
        assert!(message.starts_with("Heap dump \""));
        assert!(message.contains("dump.json"));
        assert!(message.contains("saved in"));
        assert!(message.ends_with("MB"));
    }

    struct ExplodingModel;

    impl ObjectModel for ExplodingModel {
        fn collect(&self) -> usize {
            0
        }

        fn live_objects(&self) -> Vec<ObjRef> {
            panic!("listing refused")
        }

        fn modules(&self) -> Vec<Arc<ModuleDef>> {
            Vec::new()
        }
    }

    #[test]
    fn test_walk_panic_is_reported_not_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_heap_metadata_with(&ExplodingModel, dir.path().join("dump")).unwrap_err();
        match err {
            DumpError::WalkPanic { cause, .. } => assert_eq!(cause, "listing refused"),
            other => panic!("expected WalkPanic, got {:?}", other),
        }
    }

    #[test]
    fn test_panic_message_renders_common_payloads() {
        let payload = catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload = catch_unwind(|| panic!("{}", "formatted")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted");

        let payload = catch_unwind(|| std::panic::panic_any(42)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
