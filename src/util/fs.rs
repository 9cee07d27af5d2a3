//! Filesystem utilities.

use std::path::{Component, Path, PathBuf};

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the lexically cleaned path if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| clean_path(path))
}

/// Lexically remove `.` and `..` components without touching the filesystem.
///
/// `..` at the root of an absolute path is dropped; leading `..` of a
/// relative path is kept.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `value` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, value: impl AsRef<Path>) -> PathBuf {
    let value = value.as_ref();
    if value.is_absolute() {
        clean_path(value)
    } else {
        clean_path(&base.join(value))
    }
}

/// Make `path` absolute relative to `cwd`.
pub fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
