//! Handles on single connections of a [TreeManipulator].

use crate::graph::{ConnectionIndex, End};
use crate::manipulator::TreeManipulator;
use crate::model::{Annotation, RootedTree};

/// The leaf labels on both sides of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSplit {
    /// Leaves reachable through end 0
    pub end0: Vec<String>,
    /// Leaves reachable through end 1
    pub end1: Vec<String>,
}

impl LabelSplit {
    /// Returns the side holding fewer leaves (end 0 on ties).
    pub fn smaller_side(&self) -> &[String] {
        if self.end1.len() < self.end0.len() {
            &self.end1
        } else {
            &self.end0
        }
    }
}

// =#========================================================================#=
// BRANCH
// =#========================================================================#=
/// Read-only handle on one connection, obtained via
/// [TreeManipulator::branch] or [TreeManipulator::branches].
#[derive(Debug, Clone, Copy)]
pub struct Branch<'a> {
    manipulator: &'a TreeManipulator,
    index: ConnectionIndex,
}

impl<'a> Branch<'a> {
    pub(crate) fn new(manipulator: &'a TreeManipulator, index: ConnectionIndex) -> Self {
        Branch { manipulator, index }
    }

    pub fn index(&self) -> ConnectionIndex {
        self.index
    }

    pub fn length(&self) -> f64 {
        self.manipulator.graph().connection(self.index).length()
    }

    pub fn annotation(&self) -> Option<&'a Annotation> {
        self.manipulator.graph().connection(self.index).annotation()
    }

    /// Returns the leaf labels on both sides of this connection, each side
    /// sorted.
    pub fn label_split(&self) -> LabelSplit {
        let graph = self.manipulator.graph();
        let connection = graph.connection(self.index);
        let side = |end: End| {
            let mut labels = graph.leaves_beyond(connection.node_at(end), self.index);
            labels.sort();
            labels
        };
        LabelSplit {
            end0: side(End::Zero),
            end1: side(End::One),
        }
    }

    /// Roots the tree in the middle of this connection.
    pub fn rooted(&self) -> RootedTree {
        self.manipulator.rooted_evenly(self.index)
    }

    /// Grafts `subtree` onto the middle of this connection.
    ///
    /// Returns a new manipulator; the one this handle belongs to keeps its
    /// graph and caches. The subtree hangs on its root's branch length
    /// (zero if missing) and is built with the manipulator's policy.
    /// A single-node subtree is attached as one leaf.
    pub fn attach(&self, subtree: &RootedTree) -> TreeManipulator {
        self.manipulator.graft(self.index, subtree)
    }
}

// =#========================================================================#=
// BRANCH MUT
// =#========================================================================#=
/// Mutable handle on one connection, obtained via
/// [TreeManipulator::branch_mut].
#[derive(Debug)]
pub struct BranchMut<'a> {
    manipulator: &'a mut TreeManipulator,
    index: ConnectionIndex,
}

impl<'a> BranchMut<'a> {
    pub(crate) fn new(manipulator: &'a mut TreeManipulator, index: ConnectionIndex) -> Self {
        BranchMut { manipulator, index }
    }

    pub fn index(&self) -> ConnectionIndex {
        self.index
    }

    /// Replaces the annotation of this connection. Annotations do not
    /// affect path lengths, so the caches stay valid.
    pub fn set_annotation(&mut self, annotation: Option<Annotation>) {
        self.manipulator
            .graph_mut()
            .connection_mut(self.index)
            .set_annotation(annotation);
    }

    /// Returns a read-only view of this connection.
    pub fn as_branch(&self) -> Branch<'_> {
        Branch::new(self.manipulator, self.index)
    }
}
