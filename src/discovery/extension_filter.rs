pub const DEFAULT_EXTENSION: &str = "slang";

/// Decides which file names qualify for discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    suffix: String,
}

impl ExtensionFilter {
    pub fn new(extension: impl AsRef<str>) -> Self {
        let extension = extension.as_ref().trim_start_matches('.');
        Self {
            suffix: format!(".{extension}"),
        }
    }

    pub fn extension(&self) -> &str {
        &self.suffix[1..]
    }

    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.suffix)
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}
