//! The re-rooting engine: [TreeManipulator] and its companions.
//!
//! A [TreeManipulator] is built once from a rooted tree (or any tree source),
//! holds the tree as an [UnrootedGraph] and renders rooted trees from it on
//! request: the original rooting, a rooting at any connection, the midpoint
//! rooting, outgroup rootings, or all rootings one after the other.
//!
//! # Example
//! ```
//! use reroot::manipulator::TreeManipulator;
//! use reroot::newick;
//!
//! let tree = newick::parse_str("((A:1,B:1):2,(C:1,D:5):1);").unwrap();
//! let manipulator = TreeManipulator::new(&tree).unwrap();
//!
//! let midpoint = manipulator.midpoint_rooted();
//! assert_eq!(midpoint.num_leaves(), 4);
//! assert!((midpoint.total_branch_length() - tree.total_branch_length()).abs() < 1e-9);
//!
//! let rooted = manipulator.outgroup_rooted(&["A", "B"]).unwrap();
//! assert_eq!(rooted.root_children_leaf_sets()[0], vec!["A", "B"]);
//! ```

pub mod branch;
pub mod config;
pub mod enumerator;
mod outgroup;

pub use branch::{Branch, BranchMut, LabelSplit};
pub use config::ManipulatorConfig;
pub use enumerator::RootEnumerator;

use crate::error::{RerootError, Result};
use crate::graph::builder::GraphBuilder;
use crate::graph::render;
use crate::graph::{
    ConnectionIndex, ConstructionPolicy, End, InputRooting, UnrootedGraph,
};
use crate::model::{
    RootedSink, RootedSource, RootedTree, RootedTreeBuilder, UnrootedSink, UnrootedSource,
};
use std::collections::HashSet;
use tracing::{debug, warn};

// =#========================================================================#=
// TREE MANIPULATOR
// =#========================================================================#=
/// Owns the unrooted graph of one tree and derives rootings from it.
///
/// Path-length caches inside the graph are filled lazily by the first query
/// that needs them (e.g. [midpoint_rooted](Self::midpoint_rooted)) and reused
/// afterwards. Grafting via [Branch::attach] never changes `self`; it returns
/// a new manipulator with its own graph.
#[derive(Debug, Clone)]
pub struct TreeManipulator {
    graph: UnrootedGraph,
    input_rooting: InputRooting,
    input_was_unrooted: bool,
    config: ManipulatorConfig,
}

// ============================================================================
// Construction
// ============================================================================
impl TreeManipulator {
    /// Builds a manipulator with the default [ManipulatorConfig].
    ///
    /// # Errors
    /// [RerootError::TooFewLeaves] if `tree` has fewer than three leaves.
    pub fn new(tree: &RootedTree) -> Result<Self> {
        Self::with_config(tree, ManipulatorConfig::default())
    }

    /// Builds a manipulator with the given configuration.
    ///
    /// A root with three or more children marks the input as unrooted.
    ///
    /// # Errors
    /// [RerootError::TooFewLeaves] if `tree` has fewer than three leaves.
    pub fn with_config(tree: &RootedTree, config: ManipulatorConfig) -> Result<Self> {
        let (graph, input_rooting) =
            GraphBuilder::new(tree, config.policy(), config.reduce_threshold()).build()?;
        let input_was_unrooted = matches!(input_rooting, InputRooting::Node(_));
        Ok(TreeManipulator {
            graph,
            input_rooting,
            input_was_unrooted,
            config,
        })
    }

    /// Builds a manipulator from anything speaking the rooted protocol.
    ///
    /// # Errors
    /// [RerootError::TooFewLeaves] if the source has fewer than three leaves
    /// (or emits nothing).
    pub fn from_rooted_source<R>(source: &R, config: ManipulatorConfig) -> Result<Self>
    where
        R: RootedSource + ?Sized,
    {
        let mut builder = RootedTreeBuilder::new();
        source.emit_rooted(&mut builder);
        let tree = builder
            .finish_tree()
            .ok_or(RerootError::TooFewLeaves { found: 0 })?;
        Self::with_config(&tree, config)
    }

    /// Builds a manipulator from anything speaking the unrooted protocol.
    /// The input always counts as unrooted.
    ///
    /// # Errors
    /// [RerootError::TooFewLeaves] if the source has fewer than three leaves
    /// (or emits nothing).
    pub fn from_unrooted_source<U>(source: &U, config: ManipulatorConfig) -> Result<Self>
    where
        U: UnrootedSource + ?Sized,
    {
        let mut builder = RootedTreeBuilder::new();
        source.emit_unrooted(&mut builder);
        let tree = builder
            .finish_tree()
            .ok_or(RerootError::TooFewLeaves { found: 0 })?;
        let mut manipulator = Self::with_config(&tree, config)?;
        manipulator.input_was_unrooted = true;
        Ok(manipulator)
    }
}

// ============================================================================
// Getters
// ============================================================================
impl TreeManipulator {
    /// Returns the underlying graph.
    pub fn graph(&self) -> &UnrootedGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut UnrootedGraph {
        &mut self.graph
    }

    pub fn config(&self) -> &ManipulatorConfig {
        &self.config
    }

    pub fn policy(&self) -> ConstructionPolicy {
        self.config.policy()
    }

    /// Returns where the input tree had its root.
    pub fn input_rooting_position(&self) -> InputRooting {
        self.input_rooting
    }

    /// Whether the input was unrooted: built from an unrooted source, or
    /// its root had three or more children.
    pub fn input_was_unrooted(&self) -> bool {
        self.input_was_unrooted
    }

    pub fn num_leaves(&self) -> usize {
        self.graph.num_leaves()
    }

    pub fn num_connections(&self) -> usize {
        self.graph.num_connections()
    }

    pub fn leaf_labels(&self) -> Vec<String> {
        self.graph.leaf_labels()
    }

    /// Returns the sum of all branch lengths, which every rooting preserves.
    pub fn total_length(&self) -> f64 {
        self.graph.total_length()
    }

    /// Returns a handle on the given connection.
    ///
    /// # Errors
    /// [RerootError::UnknownConnection] if there is no such connection.
    pub fn branch(&self, connection: ConnectionIndex) -> Result<Branch<'_>> {
        self.check_connection(connection)?;
        Ok(Branch::new(self, connection))
    }

    /// Returns a mutable handle on the given connection.
    ///
    /// # Errors
    /// [RerootError::UnknownConnection] if there is no such connection.
    pub fn branch_mut(&mut self, connection: ConnectionIndex) -> Result<BranchMut<'_>> {
        self.check_connection(connection)?;
        Ok(BranchMut::new(self, connection))
    }

    /// Returns handles on all connections, in index order.
    pub fn branches(&self) -> impl Iterator<Item = Branch<'_>> + '_ {
        (0..self.graph.num_connections()).map(move |connection| Branch::new(self, connection))
    }

    fn check_connection(&self, connection: ConnectionIndex) -> Result<()> {
        let num_connections = self.graph.num_connections();
        if connection < num_connections {
            Ok(())
        } else {
            Err(RerootError::UnknownConnection {
                index: connection,
                num_connections,
            })
        }
    }
}

// =#========================================================================#=
// ROOTINGS
// =#========================================================================#=
impl TreeManipulator {
    /// Re-creates the rooting of the input tree.
    pub fn input_rooting(&self) -> RootedTree {
        Self::collect(|builder| self.render_input_rooting(builder))
    }

    fn render_input_rooting<S: RootedSink>(&self, sink: &mut S) {
        match self.input_rooting {
            InputRooting::Split {
                connection,
                end0_length,
            } => render::render_split(&self.graph, connection, End::Zero, end0_length, sink),
            InputRooting::Node(node) => render::render_at_node(&self.graph, node, sink),
        }
    }

    /// Roots the tree in the middle of `connection`.
    ///
    /// # Errors
    /// [RerootError::UnknownConnection] if there is no such connection.
    pub fn rooted_at(&self, connection: ConnectionIndex) -> Result<RootedTree> {
        self.check_connection(connection)?;
        Ok(self.rooted_evenly(connection))
    }

    /// Roots the tree on `connection`, `end0_length` away from its end 0
    /// (clamped to the connection).
    ///
    /// # Errors
    /// [RerootError::UnknownConnection] if there is no such connection.
    pub fn rooted_at_split(
        &self,
        connection: ConnectionIndex,
        end0_length: f64,
    ) -> Result<RootedTree> {
        let mut builder = RootedTreeBuilder::new();
        self.render_rooted_into(connection, end0_length, &mut builder)?;
        Ok(Self::finish(builder))
    }

    /// Renders the rooting on `connection`, `end0_length` away from its
    /// end 0, into any rooted sink.
    ///
    /// # Errors
    /// [RerootError::UnknownConnection] if there is no such connection.
    pub fn render_rooted_into<S: RootedSink>(
        &self,
        connection: ConnectionIndex,
        end0_length: f64,
        sink: &mut S,
    ) -> Result<()> {
        self.check_connection(connection)?;
        render::render_split(&self.graph, connection, End::Zero, end0_length, sink);
        Ok(())
    }

    /// Renders the graph into any unrooted sink, starting at the base
    /// connection.
    pub fn render_unrooted_into<S: UnrootedSink>(&self, sink: &mut S) {
        render::render_unrooted(&self.graph, sink);
    }

    pub(crate) fn rooted_evenly(&self, connection: ConnectionIndex) -> RootedTree {
        let half = self.graph.connection(connection).length() / 2.0;
        Self::collect(|builder| {
            render::render_split(&self.graph, connection, End::Zero, half, builder)
        })
    }

    pub(crate) fn rooted_from_side(&self, connection: ConnectionIndex, first: End) -> RootedTree {
        let half = self.graph.connection(connection).length() / 2.0;
        Self::collect(|builder| render::render_split(&self.graph, connection, first, half, builder))
    }

    fn collect<F>(render: F) -> RootedTree
    where
        F: FnOnce(&mut RootedTreeBuilder),
    {
        let mut builder = RootedTreeBuilder::new();
        render(&mut builder);
        Self::finish(builder)
    }

    fn finish(mut builder: RootedTreeBuilder) -> RootedTree {
        builder
            .finish_tree()
            .expect("rendering always creates a root")
    }
}

// =#========================================================================#=
// MIDPOINT
// =#========================================================================#=
impl TreeManipulator {
    /// Returns `|longest path via end 0 - longest path via end 1|` of
    /// `connection`, filling path-length caches as needed.
    ///
    /// # Errors
    /// [RerootError::UnknownConnection] if there is no such connection.
    pub fn path_diff(&self, connection: ConnectionIndex) -> Result<f64> {
        self.check_connection(connection)?;
        Ok(self.graph.path_diff(connection))
    }

    /// Returns the connection with the smallest path difference.
    ///
    /// Among ties, a connection long enough to balance its difference
    /// (`path_diff <= length`) wins over one that is not, then the lowest
    /// index.
    pub fn midpoint_connection(&self) -> ConnectionIndex {
        let mut best = 0;
        let mut best_diff = f64::INFINITY;
        let mut best_fits = false;
        for connection in 0..self.graph.num_connections() {
            let diff = self.graph.path_diff(connection);
            let fits = diff <= self.graph.connection(connection).length().abs();
            if diff < best_diff || (diff == best_diff && fits && !best_fits) {
                best = connection;
                best_diff = diff;
                best_fits = fits;
            }
        }
        best
    }

    /// Roots the tree at its midpoint: on the midpoint connection, placed
    /// so that the longest root-to-leaf paths on both sides are as equal as
    /// the connection allows.
    ///
    /// The midpoint connection minimises the path difference, which is not
    /// always the connection holding the middle of the longest leaf-to-leaf
    /// path. In `((A:1,D:1):5,(C:0.1,(B:9.5,E:0.1):0.5):5);` the short
    /// connection above `(B,E)` has the smallest difference (1.5), so the
    /// root sides reach depths 11 and 10 instead of 10.5 each.
    pub fn midpoint_rooted(&self) -> RootedTree {
        let connection = self.midpoint_connection();
        let conn = self.graph.connection(connection);
        let length = conn.length();
        let bound = length.abs();
        let diff = (self.graph.max_path_via(connection, End::Zero)
            - self.graph.max_path_via(connection, End::One))
        .clamp(-bound, bound);
        let end0_length = (length - diff) / 2.0;

        debug!(connection, length, end0_length, "midpoint rooting");
        Self::collect(|builder| {
            render::render_split(&self.graph, connection, End::Zero, end0_length, builder)
        })
    }
}

// =#========================================================================#=
// ENUMERATION
// =#========================================================================#=
impl TreeManipulator {
    /// Returns every connection index, base connection first.
    pub fn all_connections(&self) -> Vec<ConnectionIndex> {
        self.graph.all_connections()
    }

    /// Roots the tree in the middle of every connection, in the order of
    /// [all_connections](Self::all_connections).
    pub fn all_rootings(&self) -> Vec<RootedTree> {
        self.root_enumerator().collect()
    }

    /// Returns a lazy enumerator over all rootings.
    pub fn root_enumerator(&self) -> RootEnumerator<'_> {
        RootEnumerator::new(self)
    }
}

// =#========================================================================#=
// GRAFTING
// =#========================================================================#=
impl TreeManipulator {
    /// Grafts `subtree` onto the middle of `connection`, returning a new
    /// manipulator. Shorthand for [`branch(connection)?.attach(subtree)`](Branch::attach).
    ///
    /// # Errors
    /// [RerootError::UnknownConnection] if there is no such connection.
    pub fn attach_subtree(
        &self,
        connection: ConnectionIndex,
        subtree: &RootedTree,
    ) -> Result<TreeManipulator> {
        Ok(self.branch(connection)?.attach(subtree))
    }

    pub(crate) fn graft(&self, connection: ConnectionIndex, subtree: &RootedTree) -> TreeManipulator {
        let mut graph = self.graph.clone();
        graph.clear_caches();

        let length = graph.connection(connection).length();
        let half = length / 2.0;
        let (middle, second_half) = graph.split_connection(connection, half);
        GraphBuilder::new(subtree, self.config.policy(), self.config.reduce_threshold())
            .graft_onto(&mut graph, middle);

        // The input root may now sit on the second half of the split
        let input_rooting = match self.input_rooting {
            InputRooting::Split {
                connection: rooted,
                end0_length,
            } if rooted == connection && end0_length > half => InputRooting::Split {
                connection: second_half,
                end0_length: end0_length - half,
            },
            other => other,
        };

        let existing: HashSet<String> = self.graph.leaf_labels().into_iter().collect();
        for label in subtree.leaf_labels() {
            if existing.contains(&label) {
                warn!(label = %label, "graft introduced a duplicate leaf label");
            }
        }
        debug!(
            connection,
            added_leaves = subtree.num_leaves(),
            connections = graph.num_connections(),
            "grafted subtree"
        );

        TreeManipulator {
            graph,
            input_rooting,
            input_was_unrooted: self.input_was_unrooted,
            config: self.config,
        }
    }
}

impl UnrootedSource for TreeManipulator {
    fn emit_unrooted<S: UnrootedSink>(&self, sink: &mut S) {
        self.render_unrooted_into(sink);
    }
}
