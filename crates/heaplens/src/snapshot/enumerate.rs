//! Live object enumeration

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::model::code::{CodeUnit, FunctionDef, MethodDef};
use crate::model::module::ClassDef;
use crate::model::object::ObjRef;
use crate::model::provider::ObjectModel;
use crate::model::value::Value;
use crate::snapshot::reflect;

/// Enumerates every live object the model can see.
///
/// Runs a collection pass first so freed objects drop out, then extends
/// the primary listing with the code units reachable only through module
/// and class bindings. Each readable identity appears once; objects
/// whose identity cannot be read all stay in the listing.
pub fn live_objects(model: &dyn ObjectModel) -> Vec<ObjRef> {
    model.collect();
    let mut seen = FxHashSet::default();
    let mut objects = Vec::new();
    for obj in model.live_objects() {
        push_unique(&mut objects, &mut seen, obj);
    }
    for code in code_objects(model) {
        push_unique(&mut objects, &mut seen, code);
    }
    objects
}

fn push_unique(objects: &mut Vec<ObjRef>, seen: &mut FxHashSet<u64>, obj: ObjRef) {
    let id = reflect::safe_object_id(&*obj).as_u64();
    // Id 0 stands in for every unreadable identity, so it never dedups.
    if id == 0 || seen.insert(id) {
        objects.push(obj);
    }
}

/// Sweeps module bindings for functions and classes and yields the code
/// units behind them. Code units are not tracked allocations, so this
/// scan is the only way they enter the listing.
fn code_objects(model: &dyn ObjectModel) -> Vec<ObjRef> {
    let mut found = Vec::new();
    for module in model.modules() {
        for value in module.bindings().values() {
            if let Value::Ref(obj) = value {
                collect_bound_code(obj, &mut found);
            }
        }
    }
    found
}

fn collect_bound_code(obj: &ObjRef, found: &mut Vec<ObjRef>) {
    let any = match reflect::safe_any(&**obj) {
        Some(any) => any,
        None => return,
    };
    if let Some(function) = any.downcast_ref::<FunctionDef>() {
        found.push(ObjRef::new(function.code_handle()));
        return;
    }
    if let Some(class) = any.downcast_ref::<ClassDef>() {
        if let Some(code) = class.constructor() {
            found.push(ObjRef::new(code));
        }
        for value in class.bindings().values() {
            if let Value::Ref(member) = value {
                if let Some(code) = member_code(member) {
                    found.push(ObjRef::new(code));
                }
            }
        }
    }
}

fn member_code(member: &ObjRef) -> Option<Arc<CodeUnit>> {
    let any = reflect::safe_any(&**member)?;
    if let Some(function) = any.downcast_ref::<FunctionDef>() {
        return Some(function.code_handle());
    }
    if let Some(method) = any.downcast_ref::<MethodDef>() {
        return Some(method.code_handle());
    }
    None
}
