//! Class and loaded-module definitions

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::code::CodeUnit;
use crate::model::object::{HeapObject, ObjectId};
use crate::model::value::Value;

/// A class: named bindings plus an optional constructor code unit.
#[derive(Debug, Clone)]
pub struct ClassDef {
    id: ObjectId,
    name: String,
    module: String,
    bindings: BTreeMap<String, Value>,
    constructor: Option<Arc<CodeUnit>>,
}

impl ClassDef {
    /// Create an empty class defined in `module`.
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            module: module.into(),
            bindings: BTreeMap::new(),
            constructor: None,
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the defining module
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Bind a name on the class.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// All bindings on the class
    pub fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.bindings
    }

    /// Set the constructor's code unit.
    pub fn set_constructor(&mut self, code: Arc<CodeUnit>) {
        self.constructor = Some(code);
    }

    /// The constructor's code unit, when set
    pub fn constructor(&self) -> Option<Arc<CodeUnit>> {
        self.constructor.clone()
    }
}

impl HeapObject for ClassDef {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &str {
        "class"
    }

    fn size_bytes(&self) -> usize {
        let bindings: usize = self
            .bindings
            .iter()
            .map(|(name, value)| name.capacity() + value.shallow_size())
            .sum();
        std::mem::size_of::<Self>() + self.name.capacity() + self.module.capacity() + bindings
    }

    fn attrs(&self) -> Vec<(String, Value)> {
        self.bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn referents(&self) -> Vec<Value> {
        self.bindings
            .values()
            .filter(|value| matches!(value, Value::Ref(_)))
            .cloned()
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A loaded module: a named namespace with a defining file.
#[derive(Debug, Clone)]
pub struct ModuleDef {
    id: ObjectId,
    name: String,
    file: String,
    bindings: BTreeMap<String, Value>,
}

impl ModuleDef {
    /// Create an empty module defined in `file`.
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            file: file.into(),
            bindings: BTreeMap::new(),
        }
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defining file
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Bind a name on the module.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// All bindings on the module
    pub fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.bindings
    }
}

impl HeapObject for ModuleDef {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &str {
        "module"
    }

    fn size_bytes(&self) -> usize {
        let bindings: usize = self
            .bindings
            .iter()
            .map(|(name, value)| name.capacity() + value.shallow_size())
            .sum();
        std::mem::size_of::<Self>() + self.name.capacity() + self.file.capacity() + bindings
    }

    fn attrs(&self) -> Vec<(String, Value)> {
        self.bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    fn referents(&self) -> Vec<Value> {
        self.bindings
            .values()
            .filter(|value| matches!(value, Value::Ref(_)))
            .cloned()
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::code::FunctionDef;
    use crate::model::object::ObjRef;

    #[test]
    fn test_class_bindings_and_constructor() {
        let mut class = ClassDef::new("Widget", "app");
        assert!(class.constructor().is_none());

        class.set_constructor(Arc::new(CodeUnit::new("Widget::new", "src/app.rs", 5)));
        class.bind("kind", Value::Str("square".to_string()));

        let ctor = class.constructor().unwrap();
        assert_eq!(ctor.name(), "Widget::new");
        assert_eq!(class.bindings().len(), 1);
        assert_eq!(class.name(), "Widget");
        assert_eq!(class.module(), "app");
    }

    #[test]
    fn test_class_attrs_mirror_bindings() {
        let mut class = ClassDef::new("Widget", "app");
        class.bind("kind", Value::Str("square".to_string()));
        class.bind("limit", Value::Int(8));

        let attrs = class.attrs();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].0, "kind");
        assert_eq!(attrs[1].0, "limit");
    }

    #[test]
    fn test_module_referents_are_object_bindings() {
        let func = Arc::new(FunctionDef::new(
            "run",
            CodeUnit::new("run", "src/app.rs", 1),
        ));
        let mut module = ModuleDef::new("app", "src/app.rs");
        module.bind("run", Value::Ref(ObjRef::new(func)));
        module.bind("version", Value::Int(3));

        assert_eq!(module.referents().len(), 1);
        assert_eq!(module.attrs().len(), 2);
        assert_eq!(module.type_name(), "module");
        assert_eq!(module.file(), "src/app.rs");
    }
}
