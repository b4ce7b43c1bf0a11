//! Provides [RootedTreeBuilder], a sink that assembles a [RootedTree].

use crate::model::annotation::Annotation;
use crate::model::rooted_tree::{NodeId, RootedTree};
use crate::model::tree_sink::{RootedSink, TreeSink, UnrootedSink};

/// Builder that constructs [RootedTree] instances from either visitor protocol.
///
/// Fed through the [RootedSink] protocol, the resulting tree mirrors the
/// producer's rooting. Fed through the [UnrootedSink] protocol, the base
/// branch is split evenly by a new bifurcating root.
///
/// # Builder lifecycle
/// ```text
/// Empty ──→ create_root() / create_base_branch() ──→ Building ──→ finish_tree() ──→ Empty
/// ```
///
/// # Example
/// ```
/// use reroot::model::{RootedSink, RootedTreeBuilder, TreeSink};
///
/// let mut builder = RootedTreeBuilder::new();
/// let root = builder.create_root();
/// let leaf = builder.create_child(root);
/// builder.set_label(leaf, "A");
/// builder.set_branch_length(leaf, 0.5);
///
/// let tree = builder.finish_tree().unwrap();
/// assert_eq!(tree.leaf_labels(), vec!["A".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct RootedTreeBuilder {
    current_tree: Option<RootedTree>,
}

impl RootedTreeBuilder {
    /// Creates a new builder in the empty state.
    pub fn new() -> Self {
        Self { current_tree: None }
    }

    /// Finalizes the building process and returns the resulting tree,
    /// or `None` if nothing was built.
    pub fn finish_tree(&mut self) -> Option<RootedTree> {
        self.current_tree.take()
    }

    fn tree_mut(&mut self) -> &mut RootedTree {
        self.current_tree
            .as_mut()
            .expect("create_root or create_base_branch not called")
    }
}

impl TreeSink for RootedTreeBuilder {
    type NodeRef = NodeId;

    fn create_child(&mut self, parent: NodeId) -> NodeId {
        self.tree_mut().add_child(parent, None)
    }

    fn set_label(&mut self, node: NodeId, label: &str) {
        self.tree_mut()[node].set_label(Some(label.to_string()));
    }

    fn set_branch_length(&mut self, node: NodeId, length: f64) {
        self.tree_mut()[node].set_branch_length(Some(length));
    }

    fn set_annotation(&mut self, node: NodeId, annotation: &Annotation) {
        self.tree_mut()[node].set_annotation(Some(annotation.clone()));
    }
}

impl RootedSink for RootedTreeBuilder {
    fn create_root(&mut self) -> NodeId {
        let tree = RootedTree::new();
        let root = tree.root_index();
        self.current_tree = Some(tree);
        root
    }
}

impl UnrootedSink for RootedTreeBuilder {
    fn create_base_branch(
        &mut self,
        length: f64,
        annotation: Option<&Annotation>,
    ) -> (NodeId, NodeId) {
        let root = self.create_root();
        let tree = self.tree_mut();
        let half = length / 2.0;
        let left = tree.add_child(root, Some(half));
        let right = tree.add_child(root, Some(half));
        if let Some(annotation) = annotation {
            tree[left].set_annotation(Some(annotation.clone()));
            tree[right].set_annotation(Some(annotation.clone()));
        }
        (left, right)
    }
}
