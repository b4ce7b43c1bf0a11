//! Push-style visitor protocols to stream trees between representations.
//!
//! The traits decouple producers of trees from concrete tree types,
//! in the same spirit as a tree builder driven by a parser:
//! a producer calls sink methods while walking its own structure,
//! and the sink assembles whatever representation it wants.
//!
//! # Rooted protocol
//! [RootedSink] starts from a single root created by
//! [`create_root`](RootedSink::create_root); every node can then create
//! children via [`create_child`](TreeSink::create_child).
//!
//! # Unrooted protocol
//! [UnrootedSink] starts from a *base branch* with two sides, created by
//! [`create_base_branch`](UnrootedSink::create_base_branch); each side then
//! creates children recursively. Branch lengths set on the two sides
//! are the lengths of their edges away from the base branch.
//!
//! ```text
//!     side 0 ─────── base branch ─────── side 1
//!    /      \                           /      \
//! child   child                      child   child
//! ```
//!
//! # Sources
//! [RootedSource] and [UnrootedSource] are the producer side: anything that
//! can replay itself into a sink.
//! [RootedTree](crate::model::RootedTree) is a [RootedSource], the
//! [TreeManipulator](crate::manipulator::TreeManipulator) an
//! [UnrootedSource], and
//! [RootedTreeBuilder](crate::model::RootedTreeBuilder) implements both sinks.

use crate::model::annotation::Annotation;

// =#========================================================================#=
// TREE SINK (traits)
// =#========================================================================#=
/// Node operations shared by the rooted and the unrooted protocol.
pub trait TreeSink {
    /// Handle of a node created by this sink.
    type NodeRef: Copy;

    /// Creates a new child below `parent` and returns its handle.
    fn create_child(&mut self, parent: Self::NodeRef) -> Self::NodeRef;

    /// Sets the label of `node` (called for leaves).
    fn set_label(&mut self, node: Self::NodeRef, label: &str);

    /// Sets the length of the branch from `node` towards its parent
    /// (or towards the base branch).
    fn set_branch_length(&mut self, node: Self::NodeRef, length: f64);

    /// Sets the annotation of `node`, respectively of its parent branch.
    fn set_annotation(&mut self, node: Self::NodeRef, annotation: &Annotation);
}

/// Rooted visitor protocol: a single root, every node creates children.
pub trait RootedSink: TreeSink {
    /// Creates the root. Called exactly once, before any other method.
    fn create_root(&mut self) -> Self::NodeRef;
}

/// Unrooted visitor protocol: a base branch exposes two sides.
pub trait UnrootedSink: TreeSink {
    /// Creates the base branch and returns the handles of its two sides.
    /// Called exactly once, before any other method.
    ///
    /// # Arguments
    /// * `length` - Length of the base branch
    /// * `annotation` - Annotation of the base branch, if any
    fn create_base_branch(
        &mut self,
        length: f64,
        annotation: Option<&Annotation>,
    ) -> (Self::NodeRef, Self::NodeRef);
}

/// Producer side of the rooted protocol.
pub trait RootedSource {
    /// Replays this tree into `sink`.
    fn emit_rooted<S: RootedSink>(&self, sink: &mut S);
}

/// Producer side of the unrooted protocol.
pub trait UnrootedSource {
    /// Replays this tree into `sink`.
    fn emit_unrooted<S: UnrootedSink>(&self, sink: &mut S);
}
