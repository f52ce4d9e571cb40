use std::path::{Component, Path, PathBuf};

/// Sentinel used for the top-level directory of a discovery source.
pub const ROOT_DIRECTORY: &str = ".";

/// Splits a logical path on either separator, dropping empty and `.` segments.
///
/// Both `/` and `\` are treated as separators so that paths recorded on one
/// platform split the same way on another.
pub fn logical_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ROOT_DIRECTORY)
}

/// Joins the segments of a logical path with `/`, or returns the root sentinel.
pub fn logical_directory<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let joined = segments.into_iter().collect::<Vec<_>>().join("/");
    if joined.is_empty() {
        ROOT_DIRECTORY.to_string()
    } else {
        joined
    }
}

/// Renders a path for log and error messages.
pub trait BestEffortPathExt {
    /// Canonical form when the path exists, otherwise an absolute, lexically
    /// normalized form.
    fn best_effort_path_display(&self) -> String;
}

impl BestEffortPathExt for Path {
    fn best_effort_path_display(&self) -> String {
        if let Ok(canonical) = self.canonicalize() {
            return canonical.display().to_string();
        }

        let absolute = match std::env::current_dir() {
            Ok(current_dir) if self.is_relative() => current_dir.join(self),
            _ => self.to_path_buf(),
        };
        lexically_normalize(&absolute).display().to_string()
    }
}

// `..` never climbs above the root.
fn lexically_normalize(path: &Path) -> PathBuf {
    path.components()
        .fold(Vec::new(), |mut kept: Vec<Component<'_>>, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if matches!(kept.last(), Some(Component::Normal(_))) {
                        kept.pop();
                    }
                }
                other => kept.push(other),
            }
            kept
        })
        .into_iter()
        .collect()
}

pub trait LogicalPathExt {
    /// Renders the normal components of a path joined by `/`.
    fn to_logical_string(&self) -> String;
}

impl LogicalPathExt for Path {
    fn to_logical_string(&self) -> String {
        self.components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().to_string()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}
