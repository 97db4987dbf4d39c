//! The path-addressed tree.
//!
//! # Invariants
//!
//! - A write never descends through a leaf.
//! - Grafting a tree onto an existing tree merges into it; any other write
//!   replaces the target slot outright.
//! - Removing a node prunes every ancestor the removal leaves empty.
//! - Every stored key is a single non-empty segment without `/`.

use std::collections::BTreeMap;

use dictkit_types::{Mapping, Value};
use serde::Serialize;
use tracing::trace;

use crate::error::{PathError, PathResult};
use crate::path::TreePath;

/// A slot in a [`PathTree`]: a leaf value or a nested tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node<V> {
    Leaf(V),
    Tree(PathTree<V>),
}

impl<V> Node<V> {
    pub fn as_leaf(&self) -> Option<&V> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Tree(_) => None,
        }
    }

    pub fn as_tree(&self) -> Option<&PathTree<V>> {
        match self {
            Node::Tree(tree) => Some(tree),
            Node::Leaf(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Number of leaves at or beneath this node.
    pub fn count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Tree(tree) => tree.count(),
        }
    }
}

/// A nested mapping addressed by [`TreePath`]s.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PathTree<V> {
    children: BTreeMap<String, Node<V>>,
}

impl<V> Default for PathTree<V> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
        }
    }
}

impl<V> PathTree<V> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level slots.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the tree has no slots.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of leaves in the tree, at any depth.
    pub fn count(&self) -> usize {
        self.children.values().map(Node::count).sum()
    }

    /// Top-level slots in key order.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Node<V>> {
        self.children.iter()
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Set a leaf at `path`, creating intermediate trees as needed.
    ///
    /// Replaces whatever occupied the slot and returns it. Fails if the path
    /// is empty or an intermediate segment is a leaf.
    pub fn insert(&mut self, path: impl Into<TreePath>, value: V) -> PathResult<Option<Node<V>>> {
        let path = path.into();
        let (last, parents) = path.split_last().ok_or(PathError::EmptyPath)?;
        let parent = self.descend_mut(&path, parents)?;
        Ok(parent.children.insert(last.clone(), Node::Leaf(value)))
    }

    /// Graft `tree` at `path`.
    ///
    /// If the slot already holds a tree, `tree` is merged into it (incoming
    /// slots win, nested trees merge recursively). Otherwise the slot is
    /// replaced by `tree`.
    pub fn graft(&mut self, path: impl Into<TreePath>, tree: PathTree<V>) -> PathResult<()> {
        let path = path.into();
        let (last, parents) = path.split_last().ok_or(PathError::EmptyPath)?;
        let parent = self.descend_mut(&path, parents)?;
        trace!(%path, leaves = tree.count(), "grafting tree");
        match parent.children.get_mut(last) {
            Some(Node::Tree(existing)) => existing.merge(tree),
            _ => {
                parent.children.insert(last.clone(), Node::Tree(tree));
            }
        }
        Ok(())
    }

    /// Write an arbitrary node: leaves are inserted, trees grafted.
    pub fn set(&mut self, path: impl Into<TreePath>, node: Node<V>) -> PathResult<()> {
        match node {
            Node::Leaf(value) => self.insert(path, value).map(|_| ()),
            Node::Tree(tree) => self.graft(path, tree),
        }
    }

    /// Merge `other` into this tree; `other` wins on conflicting slots.
    pub fn merge(&mut self, other: PathTree<V>) {
        for (key, node) in other.children {
            match (self.children.get_mut(&key), node) {
                (Some(Node::Tree(existing)), Node::Tree(incoming)) => existing.merge(incoming),
                (_, node) => {
                    self.children.insert(key, node);
                }
            }
        }
    }

    /// Walk to the tree at `parents`, creating empty trees on the way.
    fn descend_mut(&mut self, path: &TreePath, parents: &[String]) -> PathResult<&mut PathTree<V>> {
        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            let node = current
                .children
                .entry(segment.clone())
                .or_insert_with(|| Node::Tree(PathTree::new()));
            match node {
                Node::Tree(tree) => current = tree,
                Node::Leaf(_) => {
                    return Err(PathError::LeafInPath {
                        path: path.to_string(),
                        segment: parents[..=depth].join("/"),
                    })
                }
            }
        }
        Ok(current)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// The node at `path`, if any. The empty path has no node.
    pub fn get(&self, path: impl Into<TreePath>) -> Option<&Node<V>> {
        let path = path.into();
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for segment in parents {
            current = current.children.get(segment)?.as_tree()?;
        }
        current.children.get(last)
    }

    /// Mutable access to the node at `path`.
    pub fn get_mut(&mut self, path: impl Into<TreePath>) -> Option<&mut Node<V>> {
        let path = path.into();
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for segment in parents {
            current = match current.children.get_mut(segment)? {
                Node::Tree(tree) => tree,
                Node::Leaf(_) => return None,
            };
        }
        current.children.get_mut(last)
    }

    /// The leaf value at `path`, if the slot holds a leaf.
    pub fn get_leaf(&self, path: impl Into<TreePath>) -> Option<&V> {
        self.get(path)?.as_leaf()
    }

    /// The sub-tree at `path`, if the slot holds a tree.
    pub fn get_tree(&self, path: impl Into<TreePath>) -> Option<&PathTree<V>> {
        self.get(path)?.as_tree()
    }

    /// Returns `true` if `path` names a slot.
    pub fn contains(&self, path: impl Into<TreePath>) -> bool {
        self.get(path).is_some()
    }

    /// Remove and return the node at `path`, pruning ancestors left empty.
    pub fn remove(&mut self, path: impl Into<TreePath>) -> Option<Node<V>> {
        let path = path.into();
        self.remove_segments(path.segments())
    }

    fn remove_segments(&mut self, segments: &[String]) -> Option<Node<V>> {
        let (first, rest) = segments.split_first()?;
        if rest.is_empty() {
            return self.children.remove(first);
        }
        let removed = match self.children.get_mut(first)? {
            Node::Tree(subtree) => subtree.remove_segments(rest)?,
            Node::Leaf(_) => return None,
        };
        if matches!(self.children.get(first), Some(Node::Tree(subtree)) if subtree.is_empty()) {
            self.children.remove(first);
        }
        Some(removed)
    }

    /// Every leaf with its full path, depth-first in key order.
    pub fn leaves(&self) -> Vec<(TreePath, &V)> {
        let mut out = Vec::new();
        self.collect_leaves(&TreePath::root(), &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: &TreePath, out: &mut Vec<(TreePath, &'a V)>) {
        for (key, node) in &self.children {
            let path = prefix.join(key.as_str());
            match node {
                Node::Leaf(value) => out.push((path, value)),
                Node::Tree(tree) => tree.collect_leaves(&path, out),
            }
        }
    }
}

impl<'a, V> IntoIterator for &'a PathTree<V> {
    type Item = (&'a String, &'a Node<V>);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Node<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

impl<V: Clone + Into<Value>> PathTree<V> {
    /// Render the tree as a nested [`Value::Map`].
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.children
                .iter()
                .map(|(key, node)| {
                    let value = match node {
                        Node::Leaf(leaf) => leaf.clone().into(),
                        Node::Tree(tree) => tree.to_value(),
                    };
                    (key.clone(), value)
                })
                .collect(),
        )
    }
}

impl PathTree<Value> {
    /// Build a tree from a mapping; nested mappings become sub-trees.
    ///
    /// Keys are parsed as paths, so a key `"a/b"` lands at the same slot
    /// the path `a/b` reads. Keys are written in ascending order under the
    /// usual write rules: a key with no segments is [`PathError::EmptyPath`]
    /// and a key below an earlier leaf is [`PathError::LeafInPath`].
    pub fn from_mapping(mapping: Mapping) -> PathResult<Self> {
        let mut tree = Self::new();
        for (key, value) in mapping {
            let path = TreePath::parse(&key);
            match value {
                Value::Map(inner) => tree.graft(path, Self::from_mapping(inner)?)?,
                other => {
                    tree.insert(path, other)?;
                }
            }
        }
        Ok(tree)
    }
}

impl TryFrom<Mapping> for PathTree<Value> {
    type Error = PathError;

    fn try_from(mapping: Mapping) -> PathResult<Self> {
        Self::from_mapping(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn nested(value: &str) -> Value {
        let mut test = Mapping::new();
        test.insert("test".into(), Value::from(value));
        let mut to = Mapping::new();
        to.insert("to".into(), Value::Map(test));
        let mut path = Mapping::new();
        path.insert("path".into(), Value::Map(to));
        Value::Map(path)
    }

    #[test]
    fn insert_creates_intermediate_trees() {
        let mut tree: PathTree<Value> = PathTree::new();
        tree.insert("path/to/test", Value::from("test")).unwrap();
        assert_eq!(tree.to_value(), nested("test"));
        assert_eq!(tree.get_leaf("path/to/test"), Some(&Value::from("test")));
        assert!(tree.get_tree("path/to").is_some());
    }

    #[test]
    fn cannot_descend_through_a_leaf() {
        let mut tree: PathTree<Value> = PathTree::new();
        tree.insert("path/to/test", Value::from("test")).unwrap();
        let err = tree.insert("path/to/test/2", Value::from("test2")).unwrap_err();
        assert_eq!(
            err,
            PathError::LeafInPath {
                path: "path/to/test/2".into(),
                segment: "path/to/test".into(),
            }
        );
        assert_eq!(tree.count(), 1);
    }

    #[test]
    fn remove_prunes_emptied_ancestors() {
        let mut tree: PathTree<Value> = PathTree::new();
        tree.insert("path/to/test", Value::from("test")).unwrap();
        let removed = tree.remove("path/to/test");
        assert_eq!(removed, Some(Node::Leaf(Value::from("test"))));
        assert!(tree.is_empty());
        assert_eq!(tree.to_value(), Value::Map(Mapping::new()));
    }

    #[test]
    fn remove_keeps_non_empty_ancestors() {
        let mut tree: PathTree<i64> = PathTree::new();
        tree.insert("a/b/c", 1).unwrap();
        tree.insert("a/d", 2).unwrap();
        tree.remove("a/b/c");
        assert!(!tree.contains("a/b"));
        assert_eq!(tree.get_leaf("a/d"), Some(&2));
    }

    #[test]
    fn missing_paths_read_as_absent() {
        let mut tree: PathTree<i64> = PathTree::new();
        tree.insert("a/b", 1).unwrap();
        assert!(tree.get("a/x/y").is_none());
        assert!(tree.get("a/b/c").is_none());
        assert!(tree.get("").is_none());
        assert!(tree.remove("nope/nothing").is_none());
        assert!(tree.remove("a/b/c").is_none());
        assert!(!tree.contains("a/x"));
        // Reads never create intermediates.
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get_tree("a").unwrap().len(), 1);
    }

    #[test]
    fn sequence_paths_address_the_same_slots() {
        let mut tree: PathTree<Value> = PathTree::new();
        tree.insert(["path", "to", "test"], Value::from("test")).unwrap();
        assert_eq!(tree.to_value(), nested("test"));
        assert_eq!(tree.get_leaf("path/to/test"), Some(&Value::from("test")));
    }

    #[test]
    fn grafted_tree_is_extended_in_place() {
        let mut tree: PathTree<Value> = PathTree::new();
        tree.insert(["path", "to", "test"], Value::from("test")).unwrap();
        tree.graft(["path", "to", "test"], PathTree::new()).unwrap();
        tree.insert(["path", "to", "test", "test2"], Value::from("test")).unwrap();
        assert_eq!(
            tree.get_leaf(["path", "to", "test", "test2"]),
            Some(&Value::from("test"))
        );
        tree.insert(["path", "to", "test", "test3"], Value::from("test")).unwrap();
        assert_eq!(tree.count(), 2);
    }

    #[test]
    fn grafting_onto_a_tree_merges() {
        let mut tree: PathTree<i64> = PathTree::new();
        tree.insert("cfg/a", 1).unwrap();
        tree.insert("cfg/nested/x", 1).unwrap();

        let mut incoming = PathTree::new();
        incoming.insert("b", 2).unwrap();
        incoming.insert("a", 3).unwrap();
        incoming.insert("nested/y", 4).unwrap();
        tree.graft("cfg", incoming).unwrap();

        assert_eq!(tree.get_leaf("cfg/a"), Some(&3));
        assert_eq!(tree.get_leaf("cfg/b"), Some(&2));
        assert_eq!(tree.get_leaf("cfg/nested/x"), Some(&1));
        assert_eq!(tree.get_leaf("cfg/nested/y"), Some(&4));
    }

    #[test]
    fn set_dispatches_on_node_kind() {
        let mut tree: PathTree<i64> = PathTree::new();
        tree.set("a", Node::Leaf(1)).unwrap();
        tree.set("a", Node::Tree(PathTree::new())).unwrap();
        assert!(tree.get_tree("a").is_some());
        tree.set("a", Node::Leaf(2)).unwrap();
        assert_eq!(tree.get_leaf("a"), Some(&2));
    }

    #[test]
    fn insert_returns_the_displaced_node() {
        let mut tree: PathTree<i64> = PathTree::new();
        assert_eq!(tree.insert("a", 1).unwrap(), None);
        assert_eq!(tree.insert("a", 2).unwrap(), Some(Node::Leaf(1)));
    }

    #[test]
    fn empty_path_writes_are_rejected() {
        let mut tree: PathTree<i64> = PathTree::new();
        assert_eq!(tree.insert("", 1), Err(PathError::EmptyPath));
        assert_eq!(tree.graft("/", PathTree::new()), Err(PathError::EmptyPath));
    }

    #[test]
    fn get_mut_edits_leaves() {
        let mut tree: PathTree<i64> = PathTree::new();
        tree.insert("a/b", 1).unwrap();
        if let Some(Node::Leaf(value)) = tree.get_mut("a/b") {
            *value = 10;
        }
        assert_eq!(tree.get_leaf("a/b"), Some(&10));
        assert!(tree.get_mut("a/b/c").is_none());
    }

    #[test]
    fn leaves_are_listed_depth_first() {
        let mut tree: PathTree<i64> = PathTree::new();
        tree.insert("b", 2).unwrap();
        tree.insert("a/y", 1).unwrap();
        tree.insert("a/x", 0).unwrap();
        let listed: Vec<(String, i64)> = tree
            .leaves()
            .into_iter()
            .map(|(path, value)| (path.to_string(), *value))
            .collect();
        assert_eq!(
            listed,
            vec![("a/x".into(), 0), ("a/y".into(), 1), ("b".into(), 2)]
        );
        let top: Vec<&String> = (&tree).into_iter().map(|(k, _)| k).collect();
        assert_eq!(top, vec!["a", "b"]);
    }

    #[test]
    fn from_mapping_nests_maps() {
        let Value::Map(mapping) = nested("v") else {
            unreachable!()
        };
        let tree = PathTree::try_from(mapping).unwrap();
        assert_eq!(tree.get_leaf("path/to/test"), Some(&Value::from("v")));
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.to_value(), nested("v"));
    }

    #[test]
    fn slashed_keys_are_reachable_by_their_listed_path() {
        let mut mapping = Mapping::new();
        mapping.insert("a/b".into(), Value::from(1i64));
        let tree = PathTree::from_mapping(mapping).unwrap();

        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 1);
        let listed = leaves[0].0.to_string();
        assert_eq!(listed, "a/b");
        assert_eq!(tree.get_leaf(listed.as_str()), Some(&Value::from(1i64)));
        assert!(tree.get_tree("a").is_some());
    }

    #[test]
    fn slashed_keys_merge_with_nested_maps() {
        let mut inner = Mapping::new();
        inner.insert("x".into(), Value::from(1i64));
        let mut mapping = Mapping::new();
        mapping.insert("a".into(), Value::Map(inner));
        mapping.insert("a/y".into(), Value::from(2i64));
        let tree = PathTree::from_mapping(mapping).unwrap();
        assert_eq!(tree.get_leaf("a/x"), Some(&Value::from(1i64)));
        assert_eq!(tree.get_leaf("a/y"), Some(&Value::from(2i64)));
    }

    #[test]
    fn from_mapping_rejects_unaddressable_keys() {
        let mut mapping = Mapping::new();
        mapping.insert("/".into(), Value::Null);
        assert_eq!(PathTree::from_mapping(mapping), Err(PathError::EmptyPath));

        let mut mapping = Mapping::new();
        mapping.insert("a".into(), Value::from(1i64));
        mapping.insert("a/b".into(), Value::from(2i64));
        assert!(matches!(
            PathTree::from_mapping(mapping),
            Err(PathError::LeafInPath { .. })
        ));
    }

    #[test]
    fn string_and_sequence_paths_address_the_same_slot() {
        let mut tree: PathTree<i64> = PathTree::new();
        tree.insert(["a/b"], 1).unwrap();
        assert_eq!(tree.get_leaf("a/b"), Some(&1));
        assert_eq!(tree.get_leaf(["a", "b"]), Some(&1));

        tree.insert(vec!["c", "", "d"], 2).unwrap();
        assert_eq!(tree.get_leaf("c/d"), Some(&2));
        assert_eq!(tree.remove(["a/b"]), Some(Node::Leaf(1)));
        assert_eq!(tree.count(), 1);
    }

    #[test]
    fn serializes_as_nested_objects() {
        let mut tree: PathTree<i64> = PathTree::new();
        tree.insert("a/b", 1).unwrap();
        tree.insert("c", 2).unwrap();
        assert_eq!(serde_json::to_string(&tree).unwrap(), r#"{"a":{"b":1},"c":2}"#);
    }

    fn tree_path() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-c]", 1..4)
    }

    proptest! {
        #[test]
        fn count_matches_listed_leaves(paths in prop::collection::vec(tree_path(), 0..16)) {
            let mut tree: PathTree<usize> = PathTree::new();
            for (i, path) in paths.into_iter().enumerate() {
                let _ = tree.insert(path, i);
            }
            prop_assert_eq!(tree.count(), tree.leaves().len());
        }

        #[test]
        fn removing_every_leaf_empties_the_tree(paths in prop::collection::vec(tree_path(), 0..16)) {
            let mut tree: PathTree<usize> = PathTree::new();
            for (i, path) in paths.into_iter().enumerate() {
                let _ = tree.insert(path, i);
            }
            let listed: Vec<TreePath> = tree.leaves().into_iter().map(|(p, _)| p).collect();
            for path in listed {
                prop_assert!(tree.remove(&path).is_some());
            }
            prop_assert!(tree.is_empty());
        }
    }
}
