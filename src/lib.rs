//! Reroot is a library to re-root phylogenetic trees.
//!
//! A rooted tree is converted once into an unrooted graph, from which any
//! rooting can be derived cheaply. Core functionality provided:
//! - Re-rooting on any branch, at the midpoint, or by outgroup
//!   (the most recent common ancestor of a set of leaves).
//! - Enumerating all rootings, eagerly or lazily.
//! - Grafting a subtree onto any branch, leaving the original untouched.
//! - Construction policies for polytomies: keep them
//!   ([Mimic](graph::ConstructionPolicy::Mimic)), resolve them into binary
//!   ladders ([Expand](graph::ConstructionPolicy::Expand)), or collapse
//!   near-zero branches into them ([Reduce](graph::ConstructionPolicy::Reduce)).
//! - Newick parsing and writing of the [RootedTree] model.
//!
//! Midpoint rooting uses path-length caches on the graph's connections that
//! are filled lazily, so a pass over all branches is linear in tree size.
//!
//! # Usage patterns
//! 1. Quick functions for Newick strings: [parse_newick_str] and
//!    [midpoint_root_newick].
//! 2. A [TreeManipulator], optionally configured via a
//!    [ManipulatorConfig](manipulator::ManipulatorConfig), for full control.
//!
//! ## Example
//! ```
//! use reroot::{TreeManipulator, newick, parse_newick_str};
//!
//! let tree = parse_newick_str("((A:1,B:2):0.5,(C:1,D:7):0.5);")?;
//! let manipulator = TreeManipulator::new(&tree)?;
//!
//! let rooted = manipulator.outgroup_rooted(&["D"])?;
//! println!("{}", newick::to_newick(&rooted));
//!
//! for rooting in manipulator.root_enumerator() {
//!     assert_eq!(rooting.num_leaves(), 4);
//! }
//! # Ok::<(), reroot::RerootError>(())
//! ```
//!
//! ## Example Configuration
//! ```
//! use reroot::graph::ConstructionPolicy;
//! use reroot::manipulator::{ManipulatorConfig, TreeManipulator};
//!
//! let tree = reroot::parse_newick_str("(A:1,B:1,C:1,D:1,E:1);")?;
//! let config = ManipulatorConfig::new(ConstructionPolicy::Expand);
//! let manipulator = TreeManipulator::with_config(&tree, config)?;
//!
//! // Five leaves, three binary internal nodes
//! assert_eq!(manipulator.num_connections(), 7);
//! # Ok::<(), reroot::RerootError>(())
//! ```
//!
//! # Logging
//! The crate emits [tracing] events (graph construction, midpoint and
//! outgroup decisions, grafts, cache fills) but installs no subscriber.

pub mod error;
pub mod graph;
pub mod manipulator;
pub mod model;
pub mod newick;
pub mod parser;

pub use error::{RerootError, Result};
pub use manipulator::TreeManipulator;
pub use model::RootedTree;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parse a Newick string using default settings, returning a [RootedTree].
///
/// See [`newick::parse_str`] for full documentation of this convenience function.
///
/// # Errors
/// [RerootError::Parsing] if the string is not valid Newick.
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> Result<RootedTree> {
    Ok(newick::parse_str(newick)?)
}

/// Parses a Newick string, roots the tree at its midpoint, and writes it
/// back as Newick string.
///
/// # Errors
/// - [RerootError::Parsing] if the string is not valid Newick
/// - [RerootError::TooFewLeaves] if the tree has fewer than three leaves
///
/// # Example
/// ```
/// let rooted = reroot::midpoint_root_newick("(A:1,B:1,C:4);")?;
/// assert_eq!(rooted, "((A:1,B:1):1.5,C:2.5);");
/// # Ok::<(), reroot::RerootError>(())
/// ```
pub fn midpoint_root_newick<S: AsRef<str>>(newick: S) -> Result<String> {
    let tree = parse_newick_str(newick)?;
    let manipulator = TreeManipulator::new(&tree)?;
    Ok(newick::to_newick(&manipulator.midpoint_rooted()))
}
