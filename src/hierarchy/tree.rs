use std::fmt;

use derive_more::Display;
use hashlink::LinkedHashMap;
use tracing::debug;

use crate::discovery::{FileRecord, strip_extension};
use crate::ext::logical_segments;

/// Index of a node inside a [`RouteTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("#{_0}")]
pub struct NodeId(usize);

/// A discovered file hung under its directory branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    display_name: String,
    record: FileRecord,
}

impl Leaf {
    fn new(file_name: &str, record: FileRecord) -> Self {
        Self {
            display_name: strip_extension(file_name).to_string(),
            record,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn record(&self) -> &FileRecord {
        &self.record
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyNode {
    Branch {
        name: String,
        /// Branches and leaves in arrival order.
        children: Vec<NodeId>,
        /// Child branches by name, unique per parent.
        branches: LinkedHashMap<String, NodeId>,
    },
    Leaf(Leaf),
}

impl HierarchyNode {
    fn branch(name: impl Into<String>) -> Self {
        HierarchyNode::Branch {
            name: name.into(),
            children: Vec::new(),
            branches: LinkedHashMap::new(),
        }
    }

    /// Branch name or leaf display name.
    pub fn name(&self) -> &str {
        match self {
            HierarchyNode::Branch { name, .. } => name,
            HierarchyNode::Leaf(leaf) => leaf.display_name(),
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            HierarchyNode::Leaf(leaf) => Some(leaf),
            HierarchyNode::Branch { .. } => None,
        }
    }
}

/// Route hierarchy mirroring the directory layout of discovered files.
///
/// Nodes live in an arena owned by the tree and are never removed. The root
/// is a branch with an empty name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTree {
    nodes: Vec<HierarchyNode>,
}

impl RouteTree {
    const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![HierarchyNode::branch("")],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(Self::ROOT).is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            HierarchyNode::Branch { children, .. } => children,
            HierarchyNode::Leaf(_) => &[],
        }
    }

    pub fn child_branch(&self, id: NodeId, name: &str) -> Option<NodeId> {
        match self.node(id) {
            HierarchyNode::Branch { branches, .. } => branches.get(name).copied(),
            HierarchyNode::Leaf(_) => None,
        }
    }

    pub fn attach_record(&mut self, record: FileRecord) -> NodeId {
        let directory = record.directory.clone();
        let file_name = record.file_name.clone();
        self.attach(&directory, &file_name, record)
    }

    /// Hangs `record` under the branch path described by `directory`.
    ///
    /// Existing branches are reused, missing ones are appended to their
    /// parent in arrival order. Separator-only or sentinel directories attach
    /// directly under the root.
    pub fn attach(&mut self, directory: &str, file_name: &str, record: FileRecord) -> NodeId {
        let parent = logical_segments(directory)
            .fold(Self::ROOT, |current, segment| self.branch_or_insert(current, segment));

        let leaf = self.push(HierarchyNode::Leaf(Leaf::new(file_name, record)));
        self.link(parent, leaf, None);
        debug!("Attached leaf {} under branch {}", leaf, parent);
        leaf
    }

    /// Every leaf in depth-first order.
    pub fn leaves(&self) -> Vec<(NodeId, &Leaf)> {
        let mut leaves = Vec::new();
        let mut stack = vec![Self::ROOT];

        while let Some(id) = stack.pop() {
            match self.node(id) {
                HierarchyNode::Leaf(leaf) => leaves.push((id, leaf)),
                HierarchyNode::Branch { children, .. } => stack.extend(children.iter().rev()),
            }
        }

        leaves
    }

    fn branch_or_insert(&mut self, parent: NodeId, name: &str) -> NodeId {
        if let Some(existing) = self.child_branch(parent, name) {
            return existing;
        }

        let branch = self.push(HierarchyNode::branch(name));
        self.link(parent, branch, Some(name));
        debug!("Created branch '{}' as {} under {}", name, branch, parent);
        branch
    }

    fn push(&mut self, node: HierarchyNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn link(&mut self, parent: NodeId, child: NodeId, branch_name: Option<&str>) {
        // Only branches are ever descended into, so the parent is a branch.
        if let HierarchyNode::Branch {
            children, branches, ..
        } = &mut self.nodes[parent.0]
        {
            children.push(child);
            if let Some(name) = branch_name {
                branches.insert(name.to_string(), child);
            }
        }
    }

    fn fmt_children(&self, f: &mut fmt::Formatter<'_>, id: NodeId, depth: usize) -> fmt::Result {
        for &child in self.children(id) {
            let indent = "  ".repeat(depth);
            match self.node(child) {
                HierarchyNode::Branch { name, .. } => {
                    writeln!(f, "{indent}{name}/")?;
                    self.fmt_children(f, child, depth + 1)?;
                }
                HierarchyNode::Leaf(leaf) => writeln!(
                    f,
                    "{indent}{} ({}: {})",
                    leaf.display_name(),
                    leaf.record().origin,
                    leaf.record().path
                )?,
            }
        }
        Ok(())
    }
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<FileRecord> for RouteTree {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(records: I) -> Self {
        records.into_iter().fold(Self::new(), |mut tree, record| {
            tree.attach_record(record);
            tree
        })
    }
}

impl fmt::Display for RouteTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_children(f, Self::ROOT, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::Origin;
    use rstest::*;

    fn record(path: &str, origin: Origin) -> FileRecord {
        FileRecord::from_logical_path(path, format!("content of {path}"), origin, None)
            .expect("path should have segments")
    }

    fn names(tree: &RouteTree, id: NodeId) -> Vec<&str> {
        tree.children(id)
            .iter()
            .map(|&child| tree.node(child).name())
            .collect()
    }

    #[test]
    fn sibling_directories_share_parent_branch() {
        let mut tree = RouteTree::new();
        tree.attach("a/b", "x.slang", record("a/b/x.slang", Origin::Embedded));
        tree.attach("a/c", "y.slang", record("a/c/y.slang", Origin::Embedded));

        assert_eq!(names(&tree, tree.root()), vec!["a"]);
        let a = tree.child_branch(tree.root(), "a").expect("branch a");
        assert_eq!(names(&tree, a), vec!["b", "c"]);
    }

    #[test]
    fn repeated_directory_reuses_branches() {
        let mut tree = RouteTree::new();
        tree.attach("a/b", "x.slang", record("a/b/x.slang", Origin::Embedded));
        let before = tree.len();
        tree.attach("a/b", "y.slang", record("a/b/y.slang", Origin::Disk));

        // only the new leaf was added
        assert_eq!(tree.len(), before + 1);
        let a = tree.child_branch(tree.root(), "a").expect("branch a");
        let b = tree.child_branch(a, "b").expect("branch b");
        assert_eq!(names(&tree, b), vec!["x", "y"]);
    }

    #[rstest]
    #[case(".")]
    #[case("")]
    #[case("/")]
    #[case("\\\\")]
    fn sentinel_and_separator_only_directories_attach_at_root(#[case] directory: &str) {
        let mut tree = RouteTree::new();
        let leaf = tree.attach(directory, "root.slang", record("root.slang", Origin::Disk));

        assert_eq!(tree.children(tree.root()), &[leaf]);
        assert_eq!(tree.node(leaf).name(), "root");
    }

    #[test]
    fn backslash_directories_match_forward_slash_branches() {
        let mut tree = RouteTree::new();
        tree.attach("a/b", "x.slang", record("a/b/x.slang", Origin::Embedded));
        tree.attach("a\\b", "y.slang", record("a/b/y.slang", Origin::Disk));

        let a = tree.child_branch(tree.root(), "a").expect("branch a");
        assert_eq!(names(&tree, a), vec!["b"]);
    }

    #[test]
    fn duplicate_files_are_both_kept() {
        let tree = RouteTree::from_iter([
            record("contracts/test.slang", Origin::Embedded),
            record("contracts/test.slang", Origin::Disk),
        ]);

        let contracts = tree
            .child_branch(tree.root(), "contracts")
            .expect("branch contracts");
        let origins = tree
            .children(contracts)
            .iter()
            .filter_map(|&id| tree.node(id).as_leaf())
            .map(|leaf| leaf.record().origin)
            .collect::<Vec<_>>();
        assert_eq!(origins, vec![Origin::Embedded, Origin::Disk]);
    }

    #[test]
    fn leaf_and_branch_may_share_a_name() {
        let tree = RouteTree::from_iter([
            record("a.slang", Origin::Embedded),
            record("a/b.slang", Origin::Embedded),
        ]);

        let children = tree.children(tree.root());
        assert_eq!(children.len(), 2);
        assert!(tree.node(children[0]).as_leaf().is_some());
        assert!(matches!(
            tree.node(children[1]),
            HierarchyNode::Branch { .. }
        ));
        assert_eq!(tree.child_branch(tree.root(), "a"), Some(children[1]));
    }

    #[test]
    fn leaf_display_name_comes_from_given_file_name() {
        let mut tree = RouteTree::new();
        let leaf = tree.attach(".", "a.b.slang", record("a.b.slang", Origin::Disk));
        assert_eq!(tree.node(leaf).name(), "a.b");
    }

    #[test]
    fn contracts_scenario_builds_one_branch_with_two_leaves() {
        let tree = RouteTree::from_iter([
            record("contracts/hello.slang", Origin::Embedded),
            record("contracts/test.slang", Origin::Disk),
        ]);

        assert_eq!(names(&tree, tree.root()), vec!["contracts"]);
        let contracts = tree
            .child_branch(tree.root(), "contracts")
            .expect("branch contracts");
        assert_eq!(names(&tree, contracts), vec!["hello", "test"]);
    }

    #[test]
    fn leaves_are_listed_depth_first() {
        let tree = RouteTree::from_iter([
            record("a/b/one.slang", Origin::Embedded),
            record("top.slang", Origin::Embedded),
            record("a/two.slang", Origin::Disk),
        ]);

        let paths = tree
            .leaves()
            .into_iter()
            .map(|(_, leaf)| leaf.record().path.as_str())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["a/b/one.slang", "a/two.slang", "top.slang"]);
    }

    #[test]
    fn same_records_build_identical_trees() {
        let records = vec![
            record("a/b/one.slang", Origin::Embedded),
            record("a/c/two.slang", Origin::Disk),
            record("three.slang", Origin::Disk),
        ];

        assert_eq!(
            RouteTree::from_iter(records.clone()),
            RouteTree::from_iter(records)
        );
    }

    #[test]
    fn display_renders_indented_outline() {
        let tree = RouteTree::from_iter([
            record("contracts/hello.slang", Origin::Embedded),
            record("contracts/test.slang", Origin::Disk),
        ]);

        assert_eq!(
            tree.to_string(),
            "contracts/\n  hello (embedded: contracts/hello.slang)\n  test (disk: contracts/test.slang)\n"
        );
    }

    #[test]
    fn new_tree_is_empty() {
        let tree = RouteTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
        assert!(tree.leaves().is_empty());
        assert_eq!(tree.to_string(), "");
    }
}
