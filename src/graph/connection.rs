//! Undirected edge of the unrooted graph, with its path-length caches.

use crate::graph::NodeIndex;
use crate::model::Annotation;
use std::cell::Cell;

/// Index of a connection in an [UnrootedGraph](crate::graph::UnrootedGraph) (arena).
pub type ConnectionIndex = usize;

/// One of the two ends of a [Connection].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum End {
    /// First endpoint (the former parent side when built from a rooted tree)
    Zero,
    /// Second endpoint
    One,
}

impl End {
    /// Both ends in order.
    pub const BOTH: [End; 2] = [End::Zero, End::One];

    /// Returns the position of this end (`0` or `1`).
    pub fn index(self) -> usize {
        match self {
            End::Zero => 0,
            End::One => 1,
        }
    }

    /// Returns the other end.
    pub fn opposite(self) -> End {
        match self {
            End::Zero => End::One,
            End::One => End::Zero,
        }
    }
}

// =#========================================================================#=
// CONNECTION
// =#========================================================================#=
/// An undirected edge between two [GraphNode](crate::graph::GraphNode)s.
///
/// Besides length and annotation, a connection caches for each end the
/// length of the longest path from the connection, through that end, to
/// any leaf without re-crossing the connection. A cache cell is `None`
/// until computed; afterwards it never changes unless the whole graph's
/// caches get cleared.
#[derive(Debug, Clone)]
pub struct Connection {
    ends: [NodeIndex; 2],
    length: f64,
    annotation: Option<Annotation>,
    max_path_via_end: [Cell<Option<f64>>; 2],
}

impl Connection {
    pub(crate) fn new(
        end0: NodeIndex,
        end1: NodeIndex,
        length: f64,
        annotation: Option<Annotation>,
    ) -> Self {
        Connection {
            ends: [end0, end1],
            length,
            annotation,
            max_path_via_end: [Cell::new(None), Cell::new(None)],
        }
    }

    /// Returns the node at the given end.
    pub fn node_at(&self, end: End) -> NodeIndex {
        self.ends[end.index()]
    }

    /// Returns both endpoint nodes.
    pub fn ends(&self) -> [NodeIndex; 2] {
        self.ends
    }

    /// Returns which end `node` sits at, or `None` if not incident.
    pub fn end_of(&self, node: NodeIndex) -> Option<End> {
        if self.ends[0] == node {
            Some(End::Zero)
        } else if self.ends[1] == node {
            Some(End::One)
        } else {
            None
        }
    }

    /// Returns the end opposite to `node`.
    ///
    /// # Panics
    /// Panics if `node` is not an endpoint of this connection,
    /// as reaching a connection from a node it does not touch
    /// means the graph is corrupt.
    pub fn far_end_from(&self, node: NodeIndex) -> End {
        match self.end_of(node) {
            Some(end) => end.opposite(),
            None => panic!(
                "Traversal reached connection {:?} from non-incident node {node}",
                self.ends
            ),
        }
    }

    /// Returns the node opposite to `node`.
    ///
    /// # Panics
    /// Panics if `node` is not an endpoint of this connection.
    pub fn other_node(&self, node: NodeIndex) -> NodeIndex {
        self.node_at(self.far_end_from(node))
    }

    /// Returns the length of this connection.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns the annotation, if any.
    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    pub(crate) fn set_annotation(&mut self, annotation: Option<Annotation>) {
        self.annotation = annotation;
    }

    pub(crate) fn set_length(&mut self, length: f64) {
        self.length = length;
    }

    pub(crate) fn set_node_at(&mut self, end: End, node: NodeIndex) {
        self.ends[end.index()] = node;
    }

    // ------------------------------------------------------------------------
    // Path-length cache
    // ------------------------------------------------------------------------
    /// Returns the cached longest path via `end`, or `None` if not computed yet.
    pub fn cached_max_path(&self, end: End) -> Option<f64> {
        self.max_path_via_end[end.index()].get()
    }

    /// Returns the cached longest path via `end`.
    ///
    /// # Panics
    /// Panics if the cell has not been written yet.
    pub(crate) fn max_path(&self, end: End) -> f64 {
        match self.cached_max_path(end) {
            Some(value) => value,
            None => panic!(
                "Path-length cache of connection {:?} read before write",
                self.ends
            ),
        }
    }

    pub(crate) fn store_max_path(&self, end: End, value: f64) {
        let cell = &self.max_path_via_end[end.index()];
        debug_assert!(cell.get().is_none(), "Path-length cache written twice");
        cell.set(Some(value));
    }

    pub(crate) fn clear_cache(&self) {
        for cell in &self.max_path_via_end {
            cell.set(None);
        }
    }

    /// Returns whether both cache cells are filled.
    pub fn is_cached(&self) -> bool {
        self.max_path_via_end.iter().all(|c| c.get().is_some())
    }
}
