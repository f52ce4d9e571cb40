use std::path::PathBuf;

use derive_more::Display;

use crate::ext::{logical_directory, logical_segments};

/// Where a discovered file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Origin {
    #[display("embedded")]
    Embedded,
    #[display("disk")]
    Disk,
}

/// A single discovered file with its normalized metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Logical `/`-separated path. Virtual path for embedded files, path
    /// relative to the walked root for disk files.
    pub path: String,
    /// Full host path for disk files.
    pub host_path: Option<PathBuf>,
    pub content: String,
    pub file_name: String,
    /// Parent segments joined with `/`, or `.` at the top level.
    pub directory: String,
    pub origin: Origin,
}

impl FileRecord {
    /// Builds a record from a logical path, deriving `file_name` and `directory`.
    ///
    /// Returns `None` when the path has no segments at all.
    pub fn from_logical_path(
        path: &str,
        content: String,
        origin: Origin,
        host_path: Option<PathBuf>,
    ) -> Option<Self> {
        let segments = logical_segments(path).collect::<Vec<_>>();
        let (file_name, parents) = segments.split_last()?;

        Some(Self {
            path: segments.join("/"),
            host_path,
            content,
            file_name: file_name.to_string(),
            directory: logical_directory(parents.iter().copied()),
            origin,
        })
    }
}

/// File name without its last extension.
///
/// Falls back to the full file name when nothing would be left, so a file
/// called `.slang` is still addressable.
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(index) => &file_name[..index],
    }
}
