use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::{RouterConfig, get_config_file_path};
use crate::discovery::ExtensionFilter;
use crate::runner::DEFAULT_EXECUTOR;

pub const DEFAULT_EMBEDDED_PATH: &str = "contracts";

/// Settings for one run, merged from flags, config file and defaults.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: Option<PathBuf>,
    pub extension: ExtensionFilter,
    pub executor: String,
    pub embedded_path: String,
    pub list: bool,
    pub print: bool,
    pub route: Vec<String>,
}

impl RuntimeConfig {
    /// Config file to read for `cli`.
    pub fn config_path(cli: &Cli) -> PathBuf {
        cli.config
            .clone()
            .unwrap_or_else(|| get_config_file_path(cli.root.as_deref()))
    }

    /// Flags win over the config file, which wins over built-in defaults.
    pub fn resolve(cli: Cli, file: RouterConfig) -> Self {
        Self {
            root: cli.root,
            extension: cli
                .extension
                .or(file.extension)
                .map(ExtensionFilter::new)
                .unwrap_or_default(),
            executor: cli
                .executor
                .or(file.executor)
                .unwrap_or_else(|| DEFAULT_EXECUTOR.to_string()),
            embedded_path: cli
                .embedded_path
                .or(file.embedded_path)
                .unwrap_or_else(|| DEFAULT_EMBEDDED_PATH.to_string()),
            list: cli.list,
            print: cli.print,
            route: cli.route,
        }
    }
}
