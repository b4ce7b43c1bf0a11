//! Unrooted graph representation of phylogenetic trees.
//!
//! # Representation
//! An [UnrootedGraph] stores [GraphNode]s and [Connection]s in two arenas,
//! referencing each other via [NodeIndex] and [ConnectionIndex] only.
//! There is no parent/child distinction: every connection is undirected,
//! and any connection can be chosen as root position when rendering.
//!
//! # Path-length caches
//! Each [Connection] caches, for each of its two [End]s, the longest path to
//! a leaf through that end. The caches are filled lazily on the first query
//! (e.g. by midpoint rooting) and shared by all later queries on the same
//! graph, making a full pass over all connections linear in the tree size.
//!
//! # Construction
//! Graphs are built from a [RootedTree](crate::model::RootedTree) under one
//! of three [ConstructionPolicy] variants, see the [builder] module.

pub mod builder;
pub mod connection;
pub mod node;
pub(crate) mod render;
pub mod unrooted_graph;

pub use builder::{ConstructionPolicy, DEFAULT_REDUCE_THRESHOLD, InputRooting};
pub use connection::{Connection, ConnectionIndex, End};
pub use node::{GraphNode, NodeIndex, NodeKind};
pub use unrooted_graph::UnrootedGraph;
