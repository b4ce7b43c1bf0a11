//! Provides the rooted tree representation used at the boundary of the
//! re-rooting engine.
//!
//! * [RootedTree] - Tree structure using the arena pattern,
//!   allowing polytomies (any number of children per vertex).
//! * [RootedNode] - A single node of the tree.
//! * [NodeId] as type used to index nodes in the tree.

use crate::model::annotation::Annotation;
use crate::model::tree_sink::{RootedSink, RootedSource};
use std::collections::BTreeMap;

/// Index of a node in a [RootedTree] (arena).
pub type NodeId = usize;

// =#========================================================================#=
// ROOTED NODE
// =#========================================================================#=
/// A node of a [RootedTree].
///
/// Leaves carry a label, every node except the root may carry a branch
/// length to its parent, and every node may carry an [Annotation].
#[derive(Debug, Clone, PartialEq)]
pub struct RootedNode {
    index: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    branch_length: Option<f64>,
    label: Option<String>,
    annotation: Option<Annotation>,
}

impl RootedNode {
    fn new(index: NodeId, parent: Option<NodeId>) -> Self {
        RootedNode {
            index,
            parent,
            children: Vec::new(),
            branch_length: None,
            label: None,
            annotation: None,
        }
    }

    /// Returns the index of this node in the arena.
    pub fn index(&self) -> NodeId {
        self.index
    }

    /// Returns the index of the parent, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the ordered children of this node.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the length of the branch to the parent, if set.
    pub fn branch_length(&self) -> Option<f64> {
        self.branch_length
    }

    /// Returns the label, if set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the annotation, if set.
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// Sets the length of the branch to the parent.
    pub fn set_branch_length(&mut self, branch_length: Option<f64>) {
        self.branch_length = branch_length;
    }

    /// Sets the label.
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Sets the annotation.
    pub fn set_annotation(&mut self, annotation: Option<Annotation>) {
        self.annotation = annotation;
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns `true` if this node has both a parent and children.
    pub fn is_internal(&self) -> bool {
        !self.is_leaf() && !self.is_root()
    }
}

// =$========================================================================$=
// ROOTED TREE
// =$========================================================================$=
/// A rooted phylogenetic tree represented using the arena pattern
/// on [RootedNode].
///
/// Nodes are stored in a contiguous vector and referenced by [NodeId].
/// Unlike a strictly binary model, every node may have any number of
/// children, so the root may be a polytomy.
///
/// # Structure
/// - The root is always index `0`, created by [`RootedTree::new()`].
/// - Children keep their insertion order.
/// - Branch lengths and labels are optional.
///
/// # Example
/// ```
/// use reroot::model::RootedTree;
///
/// let mut tree = RootedTree::new();
/// let root = tree.root_index();
/// let ab = tree.add_child(root, Some(0.5));
/// tree.add_leaf(ab, "A", Some(1.0));
/// tree.add_leaf(ab, "B", Some(1.0));
/// tree.add_leaf(root, "C", Some(1.5));
///
/// assert_eq!(tree.num_leaves(), 3);
/// assert_eq!(tree.total_branch_length(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RootedTree {
    nodes: Vec<RootedNode>,
    root_index: NodeId,
}

impl Default for RootedTree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl RootedTree {
    /// Creates a new tree consisting of a single root node.
    pub fn new() -> Self {
        RootedTree {
            nodes: vec![RootedNode::new(0, None)],
            root_index: 0,
        }
    }

    /// Adds an unlabelled child to `parent` and returns its index.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds.
    pub fn add_child(&mut self, parent: NodeId, branch_length: Option<f64>) -> NodeId {
        assert!(parent < self.nodes.len(), "Parent index {parent} out of bounds");
        let index = self.nodes.len();
        let mut node = RootedNode::new(index, Some(parent));
        node.branch_length = branch_length;
        self.nodes.push(node);
        self.nodes[parent].children.push(index);
        index
    }

    /// Adds a labelled leaf to `parent` and returns its index.
    ///
    /// # Panics
    /// Panics if `parent` is out of bounds.
    pub fn add_leaf<S: Into<String>>(
        &mut self,
        parent: NodeId,
        label: S,
        branch_length: Option<f64>,
    ) -> NodeId {
        let index = self.add_child(parent, branch_length);
        self.nodes[index].label = Some(label.into());
        index
    }

    /// Returns a reference to the root node.
    pub fn root(&self) -> &RootedNode {
        &self.nodes[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> NodeId {
        self.root_index
    }

    /// Returns a reference to the node at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node(&self, index: NodeId) -> &RootedNode {
        &self.nodes[index]
    }

    /// Returns a mutable reference to the node at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node_mut(&mut self, index: NodeId) -> &mut RootedNode {
        &mut self.nodes[index]
    }

    /// Returns the number of nodes in this tree.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of leaves in this tree.
    ///
    /// A tree consisting only of its root counts as a single leaf.
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Returns the labels of all leaves in pre-order.
    ///
    /// Unlabelled leaves contribute an empty string.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.pre_order_iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.label().unwrap_or_default().to_string())
            .collect()
    }

    /// Returns the sum of all branch lengths in the tree
    /// (missing lengths count as zero).
    pub fn total_branch_length(&self) -> f64 {
        self.nodes.iter().filter_map(|n| n.branch_length).sum()
    }

    /// Returns the sorted leaf label sets below each child of the root.
    ///
    /// Handy to compare rootings independent of child order and lengths.
    pub fn root_children_leaf_sets(&self) -> Vec<Vec<String>> {
        let mut sets: Vec<Vec<String>> = self
            .root()
            .children()
            .iter()
            .map(|&child| {
                let mut labels = self.leaf_labels_below(child);
                labels.sort();
                labels
            })
            .collect();
        sets.sort();
        sets
    }

    /// Returns the labels of all leaves in the subtree rooted at `index`.
    pub fn leaf_labels_below(&self, index: NodeId) -> Vec<String> {
        let mut labels = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];
            if node.is_leaf() {
                labels.push(node.label().unwrap_or_default().to_string());
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        labels
    }

    /// Computes the patristic distance of every pair of leaves.
    ///
    /// Keys are label pairs with the smaller label first;
    /// missing branch lengths count as zero.
    pub fn patristic_distances(&self) -> BTreeMap<(String, String), f64> {
        // Undirected adjacency over the arena
        let mut adjacency: Vec<Vec<(NodeId, f64)>> = vec![Vec::new(); self.nodes.len()];
        for node in &self.nodes {
            if let Some(parent) = node.parent {
                let length = node.branch_length.unwrap_or(0.0);
                adjacency[parent].push((node.index, length));
                adjacency[node.index].push((parent, length));
            }
        }

        let leaves: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_leaf())
            .map(|n| n.index)
            .collect();

        let mut distances = BTreeMap::new();
        for &source in &leaves {
            let source_label = self.nodes[source].label().unwrap_or_default();
            let mut stack = vec![(source, usize::MAX, 0.0)];
            while let Some((current, previous, distance)) = stack.pop() {
                if current != source && self.nodes[current].is_leaf() {
                    let target_label = self.nodes[current].label().unwrap_or_default();
                    let key = if source_label <= target_label {
                        (source_label.to_string(), target_label.to_string())
                    } else {
                        (target_label.to_string(), source_label.to_string())
                    };
                    distances.insert(key, distance);
                }
                for &(next, length) in &adjacency[current] {
                    if next != previous {
                        stack.push((next, current, distance + length));
                    }
                }
            }
        }

        distances
    }
}

impl std::ops::Index<NodeId> for RootedTree {
    type Output = RootedNode;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

impl std::ops::IndexMut<NodeId> for RootedTree {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

// ============================================================================
// Visitor protocol
// ============================================================================
impl RootedSource for RootedTree {
    fn emit_rooted<S: RootedSink>(&self, sink: &mut S) {
        let sink_root = sink.create_root();
        let mut stack = vec![(self.root_index, sink_root)];
        while let Some((index, sink_node)) = stack.pop() {
            let node = &self.nodes[index];
            if let Some(label) = node.label() {
                sink.set_label(sink_node, label);
            }
            if let Some(annotation) = node.annotation() {
                sink.set_annotation(sink_node, annotation);
            }
            if let (Some(length), false) = (node.branch_length, node.is_root()) {
                sink.set_branch_length(sink_node, length);
            }
            // Children get created in order before any of them is expanded
            for &child in &node.children {
                let sink_child = sink.create_child(sink_node);
                stack.push((child, sink_child));
            }
        }
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl RootedTree {
    /// Returns an iterator over the tree in post-order (children before parents).
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter {
            tree: self,
            stack: vec![(self.root_index, false)],
        }
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter {
            tree: self,
            stack: vec![self.root_index],
        }
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
pub struct PostOrderIter<'a> {
    tree: &'a RootedTree,
    stack: Vec<(NodeId, bool)>, // (index, children_visited)
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a RootedNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let node = &self.tree[index];

            if children_visited || node.is_leaf() {
                return Some(node);
            }

            self.stack.push((index, true));
            // Push children in reverse, so first child is processed first
            for &child in node.children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
pub struct PreOrderIter<'a> {
    tree: &'a RootedTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a RootedNode;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree[index];
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
