#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::tcf::error::{TcfError, TcfResult};
use crate::tcf::path::{normalize_rel_path, should_exclude};

/// A regular file found under the pack root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Relative to the root, `/`-separated.
    pub rel_path: String,
    pub abs_path: PathBuf,
    pub size: u32,
}

/// Enumerates regular files below `root`, sorted by relative path bytes.
///
/// Symlinks and special files are skipped. An unreadable directory fails the
/// whole walk rather than silently dropping its subtree.
pub fn walk(root: &Path, excludes: &[String]) -> TcfResult<Vec<WalkedFile>> {
    let mut files = Vec::new();

    for ent in WalkDir::new(root).follow_links(false).into_iter() {
        let ent = ent.map_err(walk_error)?;

        if !ent.file_type().is_file() {
            continue;
        }

        let rel = normalize_rel_path(root, ent.path())?;
        if should_exclude(&rel, excludes) {
            debug!(path = %rel, "excluded");
            continue;
        }

        let len = ent.metadata().map_err(walk_error)?.len();
        let size = u32::try_from(len)
            .map_err(|_| TcfError::TooLarge(format!("{rel} is {len} bytes")))?;

        files.push(WalkedFile {
            rel_path: rel,
            abs_path: ent.path().to_path_buf(),
            size,
        });
    }

    files.sort_by(|a, b| a.rel_path.as_bytes().cmp(b.rel_path.as_bytes()));
    Ok(files)
}

fn walk_error(e: walkdir::Error) -> TcfError {
    let msg = e.to_string();
    let io = e
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(msg));
    TcfError::Io(io)
}
