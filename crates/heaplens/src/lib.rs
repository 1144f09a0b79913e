//! Heap object tracking and point-in-time diagnostic snapshots
//!
//! This crate provides:
//! - An object model for tracked heap values (instances, containers,
//!   callables, classes, modules)
//! - A process-wide, weakly-held object registry populated at allocation
//!   sites
//! - Panic-proof metadata extraction over arbitrary object implementations
//! - A JSON heap dump writer behind a single-call entry point

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod model;
pub mod snapshot;

pub use model::code::{CodeUnit, FunctionDef, MethodDef};
pub use model::module::{ClassDef, ModuleDef};
pub use model::object::{DynObject, HeapObject, ListObject, ObjRef, ObjectId};
pub use model::provider::ObjectModel;
pub use model::registry::{global_registry, ObjectRegistry};
pub use model::value::Value;
pub use snapshot::{
    collect_heap_metadata, collect_heap_metadata_with, HeapSnapshot, ObjectRecord, SourceInfo,
};

use std::path::PathBuf;

/// Heap dump failures
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// Directory creation, file write, or size probe failed
    #[error("failed to save heap dump {path:?}: {source}")]
    Io {
        /// Destination the dump was being written to
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Snapshot serialization failed
    #[error("failed to serialize heap dump: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The walk panicked outside the guarded reflective calls
    #[error("heap walk panicked: {cause}\n{trace}")]
    WalkPanic {
        /// Panic payload rendered as text
        cause: String,
        /// Stack captured where the panic was recovered, rendered as text
        trace: String,
    },
}

/// Heap dump result
pub type DumpResult<T> = Result<T, DumpError>;
