//! Input file discovery.

use crate::error::EtlError;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively lists every `*.json` file under `root`, as absolute paths in
/// lexical path order.
pub fn discover_json_files(root: &Path) -> Result<Vec<PathBuf>, EtlError> {
    let discovery_error = |source: io::Error| EtlError::Discovery {
        path: root.to_path_buf(),
        source,
    };

    let root_abs = root.canonicalize().map_err(discovery_error)?;
    if !root_abs.is_dir() {
        return Err(discovery_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a directory",
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(&root_abs).follow_links(true) {
        let entry = entry.map_err(|err| discovery_error(err.into()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "json")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
