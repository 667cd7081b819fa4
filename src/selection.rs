//! Selection trees - which relationships, and which of their
//! sub-relationships, to populate
//!
//! A selection is built once per top-level `populate` call, either from a
//! list of dotted paths (`"assemblies.parts"`) merged into one tree, or
//! passed in pre-built. It is consumed read-only during resolution: each root
//! name is resolved with one batched strategy call, and the root's subtree is
//! threaded into the recursive call on the fetched records.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Shared empty tree handed out for terminal roots
static EMPTY: Lazy<SelectionTree> = Lazy::new(SelectionTree::new);

/// Parsed, recursive representation of a population request
///
/// Root iteration order is insertion order, so resolution order is
/// deterministic for a given request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionTree {
    children: IndexMap<String, SelectionTree>,
}

impl SelectionTree {
    /// Create an empty selection (populate nothing)
    pub fn new() -> Self {
        Self {
            children: IndexMap::new(),
        }
    }

    /// Build a selection from dotted relationship paths
    ///
    /// Paths sharing a prefix are merged: `["assemblies.parts", "assemblies"]`
    /// yields one `assemblies` root with a `parts` child. An empty list
    /// yields the empty tree.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        for path in paths {
            tree.add_path(path.as_ref());
        }
        tree
    }

    /// Build a selection from a single dotted path
    pub fn from_path(path: &str) -> Self {
        Self::from_paths([path])
    }

    /// Merge one dotted path into this tree
    pub fn add_path(&mut self, path: &str) {
        let mut node = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            node = node.insert(segment);
        }
    }

    /// Insert a root name, returning its (possibly existing) subtree
    pub fn insert(&mut self, name: &str) -> &mut SelectionTree {
        self.children.entry(name.to_string()).or_default()
    }

    /// Merge another tree into this one, unioning roots recursively
    pub fn merge(&mut self, other: SelectionTree) {
        for (name, subtree) in other.children {
            self.children.entry(name).or_default().merge(subtree);
        }
    }

    /// Root relationship names, in insertion order
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Subtree for a root name; the empty tree when the root is terminal
    pub fn children(&self, name: &str) -> &SelectionTree {
        self.children.get(name).unwrap_or(&EMPTY)
    }

    /// Whether a root name is selected
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Whether this selection requests anything at all
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of root names
    pub fn len(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_empty_tree() {
        let tree = SelectionTree::from_paths(Vec::<&str>::new());
        assert!(tree.is_empty());
        assert_eq!(tree.roots().count(), 0);
    }

    #[test]
    fn test_flat_paths_deduplicate() {
        let tree = SelectionTree::from_paths(["manufacturer", "assemblies", "manufacturer"]);
        assert_eq!(tree.len(), 2);
        let roots: Vec<&str> = tree.roots().collect();
        assert_eq!(roots, vec!["manufacturer", "assemblies"]);
    }

    #[test]
    fn test_dotted_paths_build_nested_tree() {
        let tree = SelectionTree::from_paths(["assemblies.parts.supplier", "assemblies.inspections"]);
        assert_eq!(tree.len(), 1);

        let assemblies = tree.children("assemblies");
        let roots: Vec<&str> = assemblies.roots().collect();
        assert_eq!(roots, vec!["parts", "inspections"]);
        assert!(assemblies.children("parts").contains("supplier"));
        assert!(assemblies.children("inspections").is_empty());
    }

    #[test]
    fn test_prefix_paths_merge_into_one_root() {
        let tree = SelectionTree::from_paths(["assemblies", "assemblies.parts"]);
        assert_eq!(tree.len(), 1);
        assert!(tree.children("assemblies").contains("parts"));
    }

    #[test]
    fn test_terminal_root_has_empty_children() {
        let tree = SelectionTree::from_path("manufacturer");
        assert!(tree.children("manufacturer").is_empty());
        // unknown names also report the empty tree
        assert!(tree.children("nonexistent").is_empty());
    }

    #[test]
    fn test_root_order_is_insertion_order() {
        let tree = SelectionTree::from_paths(["zeta", "alpha", "mid.inner"]);
        let roots: Vec<&str> = tree.roots().collect();
        assert_eq!(roots, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_merge_unions_recursively() {
        let mut tree = SelectionTree::from_path("assemblies.parts");
        tree.merge(SelectionTree::from_paths(["assemblies.inspections", "manufacturer"]));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children("assemblies").len(), 2);
    }

    #[test]
    fn test_programmatic_building() {
        let mut tree = SelectionTree::new();
        tree.insert("assemblies").insert("parts");
        assert!(tree.children("assemblies").contains("parts"));
    }
}
