//! Locating project descriptors on disk.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::core::errors::{Result, WorkspaceError};

/// Canonical descriptor file name.
pub const POM_XML: &str = "pom.xml";

/// Find the descriptor in `dir`.
///
/// `pom.xml` wins when present. Otherwise each alternate name is tried and
/// exactly one may exist.
pub fn find_descriptor(dir: &Path, alternates: &[String]) -> Result<Option<PathBuf>> {
    let canonical = dir.join(POM_XML);
    if canonical.is_file() {
        return Ok(Some(canonical));
    }

    let mut found: Vec<PathBuf> = Vec::new();
    for name in alternates {
        let candidate = dir.join(name);
        if candidate.is_file() && !found.contains(&candidate) {
            found.push(candidate);
        }
    }

    match found.len() {
        0 => {
            trace!(dir = %dir.display(), "no descriptor");
            Ok(None)
        }
        1 => Ok(found.pop()),
        _ => Err(WorkspaceError::AmbiguousDescriptor {
            dir: dir.to_path_buf(),
            candidates: found,
        }),
    }
}

/// Locate the descriptor governing `start`.
///
/// `start` may be a descriptor file, a project directory, or any path below
/// a project (e.g. `target/classes`, which need not exist yet).
pub fn locate_descriptor(start: &Path, alternates: &[String]) -> Result<PathBuf> {
    if start.is_file() {
        return Ok(start.to_path_buf());
    }

    for dir in start.ancestors() {
        if let Some(pom) = find_descriptor(dir, alternates)? {
            return Ok(pom);
        }
    }

    Err(WorkspaceError::DescriptorNotFound {
        dir: start.to_path_buf(),
    })
}

/// Resolve a `<module>` entry of the aggregator in `dir`.
///
/// The entry may name a directory or a descriptor file. A missing module
/// yields `None`.
pub fn resolve_module(dir: &Path, module: &str, alternates: &[String]) -> Result<Option<PathBuf>> {
    let candidate = dir.join(module);
    if candidate.is_file() {
        Ok(Some(candidate))
    } else if candidate.is_dir() {
        find_descriptor(&candidate, alternates)
    } else {
        Ok(None)
    }
}
