//! Construction of the unrooted graph from a rooted tree.
//!
//! A single builder handles all three [ConstructionPolicy] variants:
//! it walks the rooted tree with an explicit stack and, for every branching
//! point, first determines its *effective children* (splicing out unary
//! nodes and, under [ConstructionPolicy::Reduce], absorbing near-zero
//! branches), then attaches them either directly or, under
//! [ConstructionPolicy::Expand], as a ladder of binary nodes.

use crate::error::{RerootError, Result};
use crate::graph::connection::ConnectionIndex;
use crate::graph::node::NodeIndex;
use crate::graph::unrooted_graph::UnrootedGraph;
use crate::model::{Annotation, NodeId, RootedTree};
use tracing::debug;

/// Default branch length at or below which [ConstructionPolicy::Reduce]
/// absorbs a subtree into its parent.
pub const DEFAULT_REDUCE_THRESHOLD: f64 = 1e-7;

/// How branching points of the rooted tree become graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructionPolicy {
    /// One graph node per branching point, with degree child count + 1
    #[default]
    Mimic,
    /// Polytomies are resolved into right-leaning ladders of binary nodes
    /// joined by zero-length connections; every internal node has degree 3
    Expand,
    /// Subtrees hanging on (near-)zero branches are absorbed into their
    /// parent, turning chains of bifurcations into one polytomy
    Reduce,
}

/// Where the rooted input had its root, so the original rooting can be
/// rendered again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputRooting {
    /// Bifurcating root: it split `connection`, `end0_length` away from
    /// [End::Zero]
    Split {
        /// Connection that contained the root
        connection: ConnectionIndex,
        /// Distance of the root from end 0
        end0_length: f64,
    },
    /// Multifurcating root: it became this internal node
    Node(NodeIndex),
}

/// A child to attach: rooted node, length of its branch, annotation of it.
type Pending<'t> = (NodeId, f64, Option<&'t Annotation>);

/// Builds [UnrootedGraph]s from [RootedTree]s under a fixed policy.
pub(crate) struct GraphBuilder<'t> {
    tree: &'t RootedTree,
    policy: ConstructionPolicy,
    reduce_threshold: f64,
    /// Rooted branching points still to expand, with their graph node
    stack: Vec<(NodeId, NodeIndex)>,
}

impl<'t> GraphBuilder<'t> {
    pub(crate) fn new(tree: &'t RootedTree, policy: ConstructionPolicy, reduce_threshold: f64) -> Self {
        GraphBuilder {
            tree,
            policy,
            reduce_threshold,
            stack: Vec::new(),
        }
    }

    /// Builds the graph of the whole tree.
    ///
    /// # Errors
    /// [RerootError::TooFewLeaves] if the tree has fewer than three leaves.
    pub(crate) fn build(mut self) -> Result<(UnrootedGraph, InputRooting)> {
        let num_leaves = self.tree.num_leaves();
        if num_leaves < 3 {
            return Err(RerootError::TooFewLeaves { found: num_leaves });
        }

        let mut graph = UnrootedGraph::with_capacity(num_leaves);
        let mut root_children = self.effective_children(self.tree.root_index());

        // A root above a single branching point is no real root
        while root_children.len() == 1 {
            root_children = self.effective_children(root_children[0].0);
        }

        let input_rooting = if root_children.len() == 2 {
            let (left, left_length, left_annotation) = root_children[0];
            let (right, right_length, right_annotation) = root_children[1];
            let left_node = self.create_node(&mut graph, left);
            let right_node = self.create_node(&mut graph, right);
            let annotation = left_annotation.or(right_annotation).cloned();
            let base = graph.connect(left_node, right_node, left_length + right_length, annotation);
            graph.set_base(base);
            InputRooting::Split {
                connection: base,
                end0_length: left_length,
            }
        } else {
            let root_node = graph.add_internal_node();
            let capacity = root_children.len().min(3);
            self.attach_children(&mut graph, root_node, &root_children, capacity);
            let base = graph.node(root_node).connections()[0];
            graph.set_base(base);
            InputRooting::Node(root_node)
        };

        self.expand_pending(&mut graph);

        debug!(
            policy = ?self.policy,
            leaves = num_leaves,
            nodes = graph.num_nodes(),
            connections = graph.num_connections(),
            "built unrooted graph"
        );
        Ok((graph, input_rooting))
    }

    /// Grafts the whole tree onto `graph` as a new branch of `parent`.
    ///
    /// The root of the tree is treated like a child of `parent`, hanging on
    /// its own branch length (zero if missing). That branch is never
    /// absorbed, so the tree always becomes a single new branch of `parent`.
    pub(crate) fn graft_onto(mut self, graph: &mut UnrootedGraph, parent: NodeIndex) {
        let root = self.tree.root();
        let attachment = self.splice_unary((
            root.index(),
            root.branch_length().unwrap_or(0.0),
            root.annotation(),
        ));
        self.attach_child(graph, parent, attachment);
        self.expand_pending(graph);
    }

    fn expand_pending(&mut self, graph: &mut UnrootedGraph) {
        while let Some((tree_node, graph_node)) = self.stack.pop() {
            let children = self.effective_children(tree_node);
            // One slot is taken by the connection towards the parent
            self.attach_children(graph, graph_node, &children, 2);
        }
    }

    /// Attaches `children` to `parent`, where `capacity` is the number of
    /// further connections `parent` may take under
    /// [ConstructionPolicy::Expand]; surplus children go down a ladder.
    fn attach_children(
        &mut self,
        graph: &mut UnrootedGraph,
        parent: NodeIndex,
        children: &[Pending<'t>],
        capacity: usize,
    ) {
        let mut current = parent;
        let mut remaining = children;

        if self.policy == ConstructionPolicy::Expand {
            let mut free = capacity.max(2);
            while remaining.len() > free {
                let (direct, rest) = remaining.split_at(free - 1);
                for &child in direct {
                    self.attach_child(graph, current, child);
                }
                let rung = graph.add_internal_node();
                graph.connect(current, rung, 0.0, None);
                current = rung;
                remaining = rest;
                free = 2;
            }
        }

        for &child in remaining {
            self.attach_child(graph, current, child);
        }
    }

    fn attach_child(&mut self, graph: &mut UnrootedGraph, parent: NodeIndex, child: Pending<'t>) {
        let (tree_node, length, annotation) = child;
        let graph_node = self.create_node(graph, tree_node);
        graph.connect(parent, graph_node, length, annotation.cloned());
    }

    /// Creates the graph node for `tree_node` and schedules its expansion.
    fn create_node(&mut self, graph: &mut UnrootedGraph, tree_node: NodeId) -> NodeIndex {
        let tree = self.tree;
        let node = &tree[tree_node];
        if node.is_leaf() {
            graph.add_leaf_node(node.label().unwrap_or_default().to_string())
        } else {
            let graph_node = graph.add_internal_node();
            self.stack.push((tree_node, graph_node));
            graph_node
        }
    }

    /// Returns the children of `tree_node` as they will appear in the graph.
    fn effective_children(&self, tree_node: NodeId) -> Vec<Pending<'t>> {
        let tree = self.tree;
        let candidates = tree[tree_node]
            .children()
            .iter()
            .map(|&child| {
                let node = &tree[child];
                (child, node.branch_length().unwrap_or(0.0), node.annotation())
            })
            .collect();
        self.resolve(candidates)
    }

    /// Resolves candidate children in order:
    /// - unary nodes are skipped, adding their branch length to the child;
    /// - under [ConstructionPolicy::Reduce], branching points hanging on a
    ///   branch at or below the threshold are replaced by their own
    ///   (recursively resolved) children.
    fn resolve(&self, candidates: Vec<Pending<'t>>) -> Vec<Pending<'t>> {
        let tree = self.tree;
        let mut resolved = Vec::with_capacity(candidates.len());
        let mut stack: Vec<Pending<'t>> = candidates.into_iter().rev().collect();

        while let Some(candidate) = stack.pop() {
            let (tree_node, length, annotation) = self.splice_unary(candidate);
            let node = &tree[tree_node];
            let absorb = self.policy == ConstructionPolicy::Reduce
                && !node.is_leaf()
                && length <= self.reduce_threshold;
            if absorb {
                for &child in node.children().iter().rev() {
                    let child_node = &tree[child];
                    stack.push((
                        child,
                        child_node.branch_length().unwrap_or(0.0),
                        child_node.annotation(),
                    ));
                }
            } else {
                resolved.push((tree_node, length, annotation));
            }
        }

        resolved
    }

    /// Skips unary nodes below `candidate`, adding their branch lengths.
    fn splice_unary(&self, candidate: Pending<'t>) -> Pending<'t> {
        let tree = self.tree;
        let (mut tree_node, mut length, mut annotation) = candidate;
        while tree[tree_node].children().len() == 1 {
            tree_node = tree[tree_node].children()[0];
            let node = &tree[tree_node];
            length += node.branch_length().unwrap_or(0.0);
            annotation = annotation.or(node.annotation());
        }
        (tree_node, length, annotation)
    }
}
