//! Vertex of the unrooted graph.

use crate::graph::ConnectionIndex;

/// Index of a node in an [UnrootedGraph](crate::graph::UnrootedGraph) (arena).
pub type NodeIndex = usize;

/// Whether a [GraphNode] is a leaf (with its label) or a branching point.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Leaf carrying its taxon label
    Leaf(String),
    /// Internal branching point
    Internal,
}

/// A vertex of the unrooted graph.
///
/// Holds its incident connections in a fixed cyclic order. When the graph is
/// built from a rooted tree, the connection towards the former parent comes
/// first, followed by the connections to the former children in order.
///
/// # Invariants
/// - Leaves have exactly one incident connection.
/// - Internal nodes have at least three incident connections
///   (exactly three when built with
///   [ConstructionPolicy::Expand](crate::graph::ConstructionPolicy::Expand)).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    kind: NodeKind,
    connections: Vec<ConnectionIndex>,
}

impl GraphNode {
    pub(crate) fn new_leaf(label: String) -> Self {
        GraphNode {
            kind: NodeKind::Leaf(label),
            connections: Vec::with_capacity(1),
        }
    }

    pub(crate) fn new_internal() -> Self {
        GraphNode {
            kind: NodeKind::Internal,
            connections: Vec::with_capacity(3),
        }
    }

    /// Returns the kind of this node.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns `true` if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Returns the label if this is a leaf, else `None`.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf(label) => Some(label),
            NodeKind::Internal => None,
        }
    }

    /// Returns the incident connections in cyclic order.
    pub fn connections(&self) -> &[ConnectionIndex] {
        &self.connections
    }

    /// Returns the number of incident connections.
    pub fn degree(&self) -> usize {
        self.connections.len()
    }

    /// Iterates over all incident connections except `incoming`, in cyclic
    /// order starting right after `incoming`.
    ///
    /// # Panics
    /// Panics if `incoming` is not incident to this node.
    pub fn connections_after(
        &self,
        incoming: ConnectionIndex,
    ) -> impl Iterator<Item = ConnectionIndex> + '_ {
        let position = self
            .connections
            .iter()
            .position(|&c| c == incoming)
            .unwrap_or_else(|| panic!("Connection {incoming} is not incident to node"));
        let (before, after) = self.connections.split_at(position);
        after[1..].iter().chain(before.iter()).copied()
    }

    pub(crate) fn push_connection(&mut self, connection: ConnectionIndex) {
        self.connections.push(connection);
    }

    /// Replaces `old` by `new` at the same position of the cyclic order.
    pub(crate) fn replace_connection(&mut self, old: ConnectionIndex, new: ConnectionIndex) {
        for c in self.connections.iter_mut() {
            if *c == old {
                *c = new;
                return;
            }
        }
        panic!("Connection {old} is not incident to node");
    }
}
