#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use crate::tcf::error::{TcfError, TcfResult};

pub fn normalize_rel_path(input_root: &Path, file_path: &Path) -> TcfResult<String> {
    let rel = file_path
        .strip_prefix(input_root)
        .map_err(|_| TcfError::Outside(file_path.to_string_lossy().into_owned()))?;

    let mut out = String::new();
    for (i, comp) in rel.components().enumerate() {
        if i != 0 {
            out.push('/');
        }
        out.push_str(&comp.as_os_str().to_string_lossy());
    }
    out = out.replace('\\', "/");

    if out.is_empty() {
        return Err(TcfError::Format("empty relative path".into()));
    }

    Ok(out)
}

pub fn should_exclude(norm_path: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|e| !e.is_empty() && norm_path.contains(e))
}

pub fn matches_filter(norm_path: &str, filter: &[String]) -> bool {
    filter.is_empty() || filter.iter().any(|s| norm_path.contains(s.as_str()))
}

/// Whether an index path may be written below the output directory.
///
/// Rejects anything containing `..` (even inside a name), absolute paths,
/// drive or UNC prefixes, backslashes and empty segments.
pub fn is_safe_entry_path(path: &str) -> bool {
    if path.is_empty() || path.contains("..") || path.contains('\\') || path.contains('\0') {
        return false;
    }
    if path.starts_with('/') {
        return false;
    }
    let b = path.as_bytes();
    if b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':' {
        return false;
    }
    path.split('/').all(|seg| !seg.is_empty() && seg != ".")
}

/// Destination for a safe entry path under `root`.
pub fn entry_destination(root: &Path, path: &str) -> PathBuf {
    let mut out = root.to_path_buf();
    for seg in path.split('/') {
        out.push(seg);
    }
    out
}

/// Recursive mkdir. Succeeds when the directory already exists.
pub fn ensure_directories(path: &Path) -> TcfResult<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Creates every directory leading up to `file`, but not `file` itself.
pub fn ensure_parent_directories(file: &Path) -> TcfResult<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directories(parent),
        _ => Ok(()),
    }
}
