//! Data model at the boundary of the re-rooting engine.
//!
//! # Tree representation
//! Rooted trees are represented by [RootedTree], which uses the arena pattern
//! to store [RootedNode]s referenced by [NodeId]. Nodes may have any number of
//! children, so a root with three or more children (an "unrooted" tree in
//! the usual Newick convention) is representable as well.
//!
//! # Annotations
//! Every node (respectively its parent branch) may carry an [Annotation],
//! a small key-value store of [AnnotationValue]s.
//!
//! # Visitor protocols
//! The [tree_sink] module defines push-style [RootedSink] and [UnrootedSink]
//! traits. [RootedTreeBuilder] implements both, so any producer speaking
//! either protocol can materialize a [RootedTree].

pub mod annotation;
pub mod rooted_tree;
pub mod rooted_tree_builder;
pub mod tree_sink;

pub use annotation::{Annotation, AnnotationValue};
pub use rooted_tree::{NodeId, RootedNode, RootedTree};
pub use rooted_tree_builder::RootedTreeBuilder;
pub use tree_sink::{RootedSink, RootedSource, TreeSink, UnrootedSink, UnrootedSource};
