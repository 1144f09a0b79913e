//! Dump file output

use std::fs;
use std::path::{Path, PathBuf};

use crate::snapshot::record::HeapSnapshot;
use crate::{DumpError, DumpResult};

/// Serializes a snapshot as one compact JSON document and writes it to
/// `destination`, replacing any previous dump at that path.
///
/// Missing parent directories are created. A `.json` extension is
/// appended unless the destination already ends with one. Returns the
/// path actually written.
pub fn write_dump(destination: impl AsRef<Path>, snapshot: &HeapSnapshot) -> DumpResult<PathBuf> {
    let path = resolve_path(destination.as_ref());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| DumpError::Io {
                path: path.clone(),
                source,
            })?;
        }
    }
    let payload = serde_json::to_string(snapshot)?;
    fs::write(&path, payload).map_err(|source| DumpError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn resolve_path(destination: &Path) -> PathBuf {
    if destination.to_string_lossy().ends_with(".json") {
        destination.to_path_buf()
    } else {
        let mut raw = destination.as_os_str().to_os_string();
        raw.push(".json");
        PathBuf::from(raw)
    }
}
