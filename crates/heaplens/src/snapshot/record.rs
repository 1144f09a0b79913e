//! Serialized snapshot shapes

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value as JsonValue;

/// Source location of the code defining an object's type or function.
///
/// Only keys that resolved are serialized; an empty location is dropped
/// from its record entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceInfo {
    /// Defining name, when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_name: Option<String>,
    /// Defining file path, when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_filename: Option<String>,
    /// Starting line number, when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_lineno: Option<u32>,
}

impl SourceInfo {
    /// True when no key resolved.
    pub fn is_empty(&self) -> bool {
        self.co_name.is_none() && self.co_filename.is_none() && self.co_lineno.is_none()
    }
}

/// Metadata captured for one live object.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectRecord {
    /// Approximate footprint in bytes; 0 when unmeasurable
    pub size: u64,
    /// Normalized instance attributes; absent when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attr: Option<BTreeMap<String, JsonValue>>,
    /// Normalized direct references, in order; absent when empty
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub refs: Option<Vec<JsonValue>>,
    /// Source location of the defining code; absent when unresolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<SourceInfo>,
}

/// One full snapshot: type name, then object identity, then record.
pub type HeapSnapshot = BTreeMap<String, BTreeMap<String, ObjectRecord>>;
