use std::collections::HashSet;

use clap::{ArgMatches, Command};
use tracing::{debug, warn};

use crate::hierarchy::{HierarchyNode, Leaf, NodeId, RouteTree};

/// Presents a [`RouteTree`] as a nested `clap` command tree.
///
/// Branches become subcommand groups, leaves become runnable subcommands
/// named after their display name. When several children of one branch share
/// a name, the first one to arrive is routable and the rest are skipped.
pub struct Router;

impl Router {
    /// Adds one subcommand per routable child of the tree root to `base`.
    pub fn attach_routes(tree: &RouteTree, base: Command) -> Command {
        Self::with_children(tree, tree.root(), base.disable_help_subcommand(true))
    }

    /// Walks the nested subcommand matches back to the selected leaf.
    ///
    /// Returns `None` when the matches stop at a branch.
    pub fn resolve<'t>(tree: &'t RouteTree, matches: &ArgMatches) -> Option<&'t Leaf> {
        let mut current = tree.root();
        let mut matches = matches;

        while let Some((name, sub_matches)) = matches.subcommand() {
            current = Self::find_child(tree, current, name)?;
            matches = sub_matches;
        }

        tree.node(current).as_leaf()
    }

    fn with_children(tree: &RouteTree, id: NodeId, mut command: Command) -> Command {
        let mut seen = HashSet::new();

        for &child in tree.children(id) {
            let node = tree.node(child);
            if !seen.insert(node.name()) {
                warn!(
                    "Skipping route '{}' under '{}': name already taken",
                    node.name(),
                    tree.node(id).name()
                );
                continue;
            }

            let subcommand = match node {
                HierarchyNode::Branch { name, .. } => Self::with_children(
                    tree,
                    child,
                    Command::new(name.clone())
                        .about(format!("Folder: {name}"))
                        .subcommand_required(true)
                        .arg_required_else_help(true)
                        .disable_help_subcommand(true),
                ),
                HierarchyNode::Leaf(leaf) => {
                    debug!("Registering route '{}'", leaf.record().path);
                    Command::new(leaf.display_name().to_string())
                        .about(format!("Run {}", leaf.record().file_name))
                }
            };
            command = command.subcommand(subcommand);
        }

        command
    }

    fn find_child(tree: &RouteTree, id: NodeId, name: &str) -> Option<NodeId> {
        tree.children(id)
            .iter()
            .copied()
            .find(|&child| tree.node(child).name() == name)
    }
}
