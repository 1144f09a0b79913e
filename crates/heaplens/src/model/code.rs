//! Callable and code-definition objects

use std::any::Any;
use std::panic::Location;
use std::sync::Arc;

use crate::model::object::{HeapObject, ObjRef, ObjectId};
use crate::model::value::Value;

/// Defining name, file, and starting line of a callable, independent of any
/// particular bound invocation.
#[derive(Debug, Clone)]
pub struct CodeUnit {
    id: ObjectId,
    name: String,
    file: String,
    line: u32,
}

impl CodeUnit {
    /// Describe a code unit at an explicit source location.
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            file: file.into(),
            line,
        }
    }

    /// Describe a code unit at the caller's own source location.
    #[track_caller]
    pub fn here(name: impl Into<String>) -> Self {
        let location = Location::caller();
        Self::new(name, location.file(), location.line())
    }

    /// Defining name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defining file
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Starting line
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl HeapObject for CodeUnit {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &str {
        "code"
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.name.capacity() + self.file.capacity()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A free function: a bound name over a code unit.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    id: ObjectId,
    name: String,
    code: Arc<CodeUnit>,
}

impl FunctionDef {
    /// Create a function over `code`.
    pub fn new(name: impl Into<String>, code: CodeUnit) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            code: Arc::new(code),
        }
    }

    /// Bound name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying code unit
    pub fn code(&self) -> &CodeUnit {
        &self.code
    }

    /// Shared handle to the underlying code unit
    pub fn code_handle(&self) -> Arc<CodeUnit> {
        self.code.clone()
    }
}

impl HeapObject for FunctionDef {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &str {
        "function"
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.name.capacity()
    }

    fn referents(&self) -> Vec<Value> {
        vec![Value::Ref(ObjRef::new(self.code.clone()))]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A method bound to a class context.
#[derive(Debug, Clone)]
pub struct MethodDef {
    id: ObjectId,
    name: String,
    code: Arc<CodeUnit>,
}

impl MethodDef {
    /// Create a method over `code`.
    pub fn new(name: impl Into<String>, code: CodeUnit) -> Self {
        Self {
            id: ObjectId::next(),
            name: name.into(),
            code: Arc::new(code),
        }
    }

    /// Bound name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying code unit
    pub fn code(&self) -> &CodeUnit {
        &self.code
    }

    /// Shared handle to the underlying code unit
    pub fn code_handle(&self) -> Arc<CodeUnit> {
        self.code.clone()
    }
}

impl HeapObject for MethodDef {
    fn object_id(&self) -> ObjectId {
        self.id
    }

    fn type_name(&self) -> &str {
        "method"
    }

    fn size_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.name.capacity()
    }

    fn referents(&self) -> Vec<Value> {
        vec![Value::Ref(ObjRef::new(self.code.clone()))]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_unit_here_captures_location() {
        let code = CodeUnit::here("sample");
        assert_eq!(code.name(), "sample");
        assert_eq!(code.file(), file!());
        assert!(code.line() > 0);
    }

    #[test]
    fn test_function_refers_to_its_code() {
        let func = FunctionDef::new("run", CodeUnit::new("run", "src/app.rs", 10));
        let referents = func.referents();
        assert_eq!(referents.len(), 1);
        match &referents[0] {
            Value::Ref(obj) => assert_eq!(obj.type_name(), "code"),
            other => panic!("unexpected referent: {:?}", other),
        }
    }

    #[test]
    fn test_method_code_handle_shares_identity() {
        let method = MethodDef::new("render", CodeUnit::new("render", "src/app.rs", 20));
        assert_eq!(method.code().object_id(), method.code_handle().object_id());
        assert_eq!(method.name(), "render");
        assert_eq!(method.type_name(), "method");
    }
}
