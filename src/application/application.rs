use clap::{Command, error::ErrorKind};
use include_dir::{Dir, include_dir};
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::cli::Cli;
use crate::config::{ConfigError, RouterConfig};
use crate::discovery::{DiscoveryError, discover};
use crate::ext::BestEffortPathExt;
use crate::hierarchy::{Leaf, RouteTree};
use crate::router::Router;
use crate::runner::{ContractRunner, RunError};

/// Contracts bundled into the binary. Entries are addressed as `contracts/...`.
pub static EMBEDDED_ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/assets");

const BIN_NAME: &str = "fouter";

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let file_config = RouterConfig::read(&RuntimeConfig::config_path(&cli))
            .await
            .context(ConfigSnafu)?;
        let config = RuntimeConfig::resolve(cli, file_config);
        debug!("Resolved runtime config: {:?}", config);

        let tree = Self::build_tree(&config)?;

        if config.list {
            print!("{tree}");
            return Ok(());
        }

        let Some(leaf) = Self::select(&tree, &config)? else {
            return Ok(());
        };

        debug!(
            "Selected contract '{}' from {}",
            leaf.record().path,
            leaf.record()
                .host_path
                .as_ref()
                .map(|path| path.best_effort_path_display())
                .unwrap_or_else(|| leaf.record().origin.to_string())
        );

        if config.print {
            println!("{}", leaf.record().content);
            return Ok(());
        }

        ContractRunner::new(&config.executor)
            .run(leaf.record())
            .await
            .context(RunSnafu)?;

        Ok(())
    }

    /// Discovers every contract and hangs it in a fresh route tree.
    pub fn build_tree(config: &RuntimeConfig) -> Result<RouteTree, ApplicationError> {
        let mut tree = RouteTree::new();

        discover(
            config.root.as_deref(),
            &EMBEDDED_ASSETS,
            &config.embedded_path,
            &config.extension,
            |record| {
                tree.attach_record(record);
            },
        )
        .context(DiscoverySnafu)?;

        if tree.is_empty() {
            warn!(
                "No '.{}' contracts were found",
                config.extension.extension()
            );
        }
        info!(
            "Built route tree with {} contract(s) in {} node(s)",
            tree.leaves().len(),
            tree.len()
        );

        Ok(tree)
    }

    /// Parses the route arguments against the tree.
    ///
    /// Returns `None` when clap printed help instead of selecting a contract.
    pub fn select<'t>(
        tree: &'t RouteTree,
        config: &RuntimeConfig,
    ) -> Result<Option<&'t Leaf>, ApplicationError> {
        let command = Router::attach_routes(tree, Self::root_command());
        let args = std::iter::once(BIN_NAME.to_string()).chain(config.route.iter().cloned());

        let matches = match command.try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp
                | ErrorKind::DisplayVersion
                | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    err.print().context(OutputSnafu)?;
                    return Ok(None);
                }
                _ => return Err(err).context(RouteSnafu),
            },
        };

        Router::resolve(tree, &matches)
            .map(Some)
            .context(UnresolvedRouteSnafu {
                route: config.route.join(" "),
            })
    }

    fn root_command() -> Command {
        Command::new(BIN_NAME)
            .about("A CLI tool for running slang files")
            .subcommand_required(true)
            .arg_required_else_help(true)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Critical failure encountered while discovering contracts"))]
    DiscoveryError { source: DiscoveryError },
    #[snafu(display("Invalid route"))]
    RouteError { source: clap::Error },
    #[snafu(display("Route '{}' does not lead to a contract", route))]
    UnresolvedRouteError { route: String },
    #[snafu(display("Failed to write help output"))]
    OutputError { source: std::io::Error },
    #[snafu(display("Critical failure encountered while running the contract"))]
    RunError { source: RunError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::Origin;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn config(args: &[&str]) -> RuntimeConfig {
        let cli = Cli::try_parse_from(std::iter::once("fouter").chain(args.iter().copied()))
            .expect("arguments should parse");
        RuntimeConfig::resolve(cli, RouterConfig::default())
    }

    fn disk_root() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let contracts = temp_dir.path().join("contracts");
        fs::create_dir_all(contracts.join("nested")).expect("Failed to create directory");
        fs::write(contracts.join("test.slang"), "disk test").expect("Failed to write file");
        fs::write(contracts.join("nested/deep.slang"), "deep").expect("Failed to write file");
        temp_dir
    }

    #[test]
    fn embedded_contracts_are_routable() {
        let config = config(&["contracts", "hello"]);
        let tree = Application::build_tree(&config).expect("tree should build");

        let leaf = Application::select(&tree, &config)
            .expect("route should resolve")
            .expect("leaf expected");
        assert_eq!(leaf.record().path, "contracts/hello.slang");
        assert_eq!(leaf.record().origin, Origin::Embedded);
        assert!(leaf.record().content.contains("Then print 'hello'"));
    }

    #[test]
    fn disk_contracts_join_embedded_branches() {
        let root = disk_root();
        let root_arg = root.path().to_string_lossy().to_string();
        let config = config(&["--root", &root_arg, "contracts", "nested", "deep"]);
        let tree = Application::build_tree(&config).expect("tree should build");

        let contracts = tree
            .child_branch(tree.root(), "contracts")
            .expect("single contracts branch");
        assert_eq!(tree.children(tree.root()), &[contracts]);

        let leaf = Application::select(&tree, &config)
            .expect("route should resolve")
            .expect("leaf expected");
        assert_eq!(leaf.record().origin, Origin::Disk);
        assert_eq!(leaf.record().content, "deep");
    }

    #[test]
    fn embedded_contract_wins_route_collision() {
        let root = disk_root();
        let root_arg = root.path().to_string_lossy().to_string();
        let config = config(&["--root", &root_arg, "contracts", "test"]);
        let tree = Application::build_tree(&config).expect("tree should build");

        let leaf = Application::select(&tree, &config)
            .expect("route should resolve")
            .expect("leaf expected");
        assert_eq!(leaf.record().origin, Origin::Embedded);
    }

    #[test]
    fn unknown_route_is_an_error() {
        let config = config(&["contracts", "missing"]);
        let tree = Application::build_tree(&config).expect("tree should build");

        let result = Application::select(&tree, &config);
        assert!(matches!(result, Err(ApplicationError::RouteError { .. })));
    }

    #[test]
    fn missing_embedded_path_aborts_startup() {
        let config = config(&["--embedded-path", "nowhere"]);
        let result = Application::build_tree(&config);
        assert!(matches!(
            result,
            Err(ApplicationError::DiscoveryError {
                source: DiscoveryError::EmbeddedSubPathMissingError { .. }
            })
        ));
    }

    #[compio::test]
    async fn list_mode_succeeds() {
        let root = disk_root();
        let root_arg = root.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["fouter", "--root", &root_arg, "--list"])
            .expect("arguments should parse");

        let result = Application::run(cli).await;
        assert!(result.is_ok(), "unexpected error: {result:?}");
    }

    #[compio::test]
    async fn print_mode_succeeds() {
        let cli = Cli::try_parse_from(["fouter", "--print", "contracts", "hello"])
            .expect("arguments should parse");

        let result = Application::run(cli).await;
        assert!(result.is_ok(), "unexpected error: {result:?}");
    }

    #[compio::test]
    async fn print_flag_after_route_is_honoured() {
        let cli = Cli::try_parse_from(["fouter", "contracts", "hello", "--print"])
            .expect("arguments should parse");

        let result = Application::run(cli).await;
        assert!(result.is_ok(), "unexpected error: {result:?}");
    }

    #[cfg(unix)]
    #[compio::test]
    async fn contract_is_forwarded_to_configured_executor() {
        let root = disk_root();
        fs::write(root.path().join("fouter.yaml"), "router:\n  executor: grep -q deep\n")
            .expect("Failed to write config");
        let root_arg = root.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["fouter", "--root", &root_arg, "contracts", "nested", "deep"])
            .expect("arguments should parse");

        let result = Application::run(cli).await;
        assert!(result.is_ok(), "unexpected error: {result:?}");
    }

    #[cfg(unix)]
    #[compio::test]
    async fn failing_executor_surfaces_run_error() {
        let cli = Cli::try_parse_from(["fouter", "--executor", "exit 4", "contracts", "hello"])
            .expect("arguments should parse");

        let result = Application::run(cli).await;
        assert!(matches!(result, Err(ApplicationError::RunError { .. })));
    }
}
