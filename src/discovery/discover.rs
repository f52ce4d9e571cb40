use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{Dir, DirEntry};
use snafu::{OptionExt, ResultExt, Snafu};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::discovery::{ExtensionFilter, FileRecord, Origin};
use crate::ext::{BestEffortPathExt, LogicalPathExt, logical_segments};

/// Discovers every qualifying file in the embedded tree, then on disk.
///
/// `on_file` is invoked synchronously, once per file. Embedded files are all
/// delivered before any disk file. Within a source the walk is depth-first and
/// entries of a directory are visited in file name order. The first error
/// aborts the whole run.
///
/// A logical path present in both sources is delivered twice, embedded copy
/// first.
pub fn discover(
    root: Option<&Path>,
    embedded: &Dir<'_>,
    embedded_sub_path: &str,
    filter: &ExtensionFilter,
    mut on_file: impl FnMut(FileRecord),
) -> Result<(), DiscoveryError> {
    let start = resolve_embedded_dir(embedded, embedded_sub_path)?;

    let embedded_count = walk_embedded(start, filter, &mut on_file)?;
    info!(
        "Discovered {} embedded file(s) under '{}'",
        embedded_count, embedded_sub_path
    );

    if let Some(root) = root.filter(|root| !root.as_os_str().is_empty()) {
        let disk_count = walk_disk(root, filter, &mut on_file)?;
        info!(
            "Discovered {} file(s) on disk under {}",
            disk_count,
            root.best_effort_path_display()
        );
    }

    Ok(())
}

fn resolve_embedded_dir<'a>(
    embedded: &'a Dir<'a>,
    sub_path: &str,
) -> Result<&'a Dir<'a>, DiscoveryError> {
    let normalized = logical_segments(sub_path).collect::<Vec<_>>().join("/");
    if normalized.is_empty() {
        return Ok(embedded);
    }

    embedded
        .get_dir(&normalized)
        .context(EmbeddedSubPathMissingSnafu {
            sub_path: sub_path.to_string(),
        })
}

fn walk_embedded(
    dir: &Dir<'_>,
    filter: &ExtensionFilter,
    on_file: &mut impl FnMut(FileRecord),
) -> Result<usize, DiscoveryError> {
    let mut entries = dir.entries().iter().collect::<Vec<_>>();
    entries.sort_by(|a, b| a.path().file_name().cmp(&b.path().file_name()));

    let mut count = 0;
    for entry in entries {
        match entry {
            DirEntry::Dir(child) => count += walk_embedded(child, filter, on_file)?,
            DirEntry::File(file) => {
                let is_match = file
                    .path()
                    .file_name()
                    .is_some_and(|name| filter.matches(&name.to_string_lossy()));
                if !is_match {
                    continue;
                }

                let path = file.path().to_logical_string();
                let content = file.contents_utf8().context(EmbeddedNotTextSnafu {
                    path: path.clone(),
                })?;

                let record = FileRecord::from_logical_path(
                    &path,
                    content.to_string(),
                    Origin::Embedded,
                    None,
                )
                .context(UnaddressablePathSnafu { path })?;

                debug!("Found embedded file '{}'", record.path);
                on_file(record);
                count += 1;
            }
        }
    }

    Ok(count)
}

fn walk_disk(
    root: &Path,
    filter: &ExtensionFilter,
    on_file: &mut impl FnMut(FileRecord),
) -> Result<usize, DiscoveryError> {
    let mut count = 0;

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.context(WalkSnafu {
            root: root.to_path_buf(),
        })?;

        // Links are read through, so a dangling one surfaces as a read error.
        if entry.file_type().is_dir() || !filter.matches(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let host_path = entry.path();
        let relative = match host_path.strip_prefix(root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => Path::new(entry.file_name()),
        };

        let content = fs::read_to_string(host_path).context(ReadSnafu {
            path: host_path.to_path_buf(),
        })?;

        let path = relative.to_logical_string();
        let record = FileRecord::from_logical_path(
            &path,
            content,
            Origin::Disk,
            Some(host_path.to_path_buf()),
        )
        .context(UnaddressablePathSnafu { path })?;

        debug!("Found file '{}' on disk", record.path);
        on_file(record);
        count += 1;
    }

    Ok(count)
}

#[derive(Debug, Snafu)]
pub enum DiscoveryError {
    #[snafu(display("Embedded tree has no directory at '{}'", sub_path))]
    EmbeddedSubPathMissingError { sub_path: String },
    #[snafu(display("Embedded file '{}' is not valid UTF-8", path))]
    EmbeddedNotTextError { path: String },
    #[snafu(display("File '{}' has no usable path segments", path))]
    UnaddressablePathError { path: String },
    #[snafu(display("Failed to walk directory {}", root.best_effort_path_display()))]
    WalkError {
        root: PathBuf,
        source: walkdir::Error,
    },
    #[snafu(display("Failed to read file {}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
}
