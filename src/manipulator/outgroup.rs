//! Outgroup rooting: root the tree so that a set of leaves forms one side.
//!
//! A single pass counts, for both sides of every connection, how many
//! outgroup leaves lie beyond it. A connection qualifies as root position if
//! one side holds every matched outgroup leaf and the node on that side is
//! either a leaf or the point where at least two outgroup-carrying branches
//! meet, i.e. the most recent common ancestor of the outgroup when rooted
//! from the other side. Counting per side makes the search independent of
//! where the base connection happens to lie relative to the outgroup.

use crate::error::{RerootError, Result};
use crate::graph::{ConnectionIndex, End, GraphNode};
use crate::manipulator::TreeManipulator;
use crate::model::RootedTree;
use std::collections::HashSet;
use tracing::{debug, warn};

impl TreeManipulator {
    /// Returns the connections on which rooting separates the outgroup
    /// from the remaining leaves, in index order.
    ///
    /// Labels not found in the tree are ignored. A non-clade outgroup can
    /// yield several connections.
    ///
    /// # Errors
    /// - [RerootError::NoOutgroupMatch] if no label matches a leaf
    /// - [RerootError::OutgroupCoversAllLeaves] if every leaf matches
    pub fn outgroup_connections<S: AsRef<str>>(
        &self,
        outgroup: &[S],
    ) -> Result<Vec<ConnectionIndex>> {
        Ok(self
            .outgroup_sides(outgroup)?
            .into_iter()
            .map(|(connection, _)| connection)
            .collect())
    }

    /// Roots the tree at the first qualifying connection, with the outgroup
    /// as the first child of the root and the connection split evenly.
    ///
    /// # Errors
    /// As [outgroup_connections](Self::outgroup_connections).
    pub fn outgroup_rooted<S: AsRef<str>>(&self, outgroup: &[S]) -> Result<RootedTree> {
        let (connection, side) = self.outgroup_sides(outgroup)?[0];
        Ok(self.rooted_from_side(connection, side))
    }

    /// Roots the tree at every qualifying connection.
    ///
    /// # Errors
    /// As [outgroup_connections](Self::outgroup_connections).
    pub fn all_outgroup_rootings<S: AsRef<str>>(&self, outgroup: &[S]) -> Result<Vec<RootedTree>> {
        Ok(self
            .outgroup_sides(outgroup)?
            .into_iter()
            .map(|(connection, side)| self.rooted_from_side(connection, side))
            .collect())
    }

    /// Qualifying connections together with the end facing the outgroup.
    fn outgroup_sides<S: AsRef<str>>(&self, outgroup: &[S]) -> Result<Vec<(ConnectionIndex, End)>> {
        let graph = self.graph();
        let wanted: HashSet<&str> = outgroup.iter().map(AsRef::as_ref).collect();
        let is_member = |node: &GraphNode| node.label().is_some_and(|label| wanted.contains(label));

        let tallies = graph.side_tallies(|node| usize::from(is_member(node)));
        let base_tally = tallies[graph.base()];
        let matched = base_tally[0] + base_tally[1];
        let num_leaves = graph.num_leaves();
        if matched == 0 {
            return Err(RerootError::NoOutgroupMatch);
        }
        if matched == num_leaves {
            return Err(RerootError::OutgroupCoversAllLeaves { num_leaves });
        }

        let mut sides = Vec::new();
        for connection in 0..graph.num_connections() {
            for end in End::BOTH {
                if tallies[connection][end.index()] != matched {
                    continue;
                }
                let node_index = graph.connection(connection).node_at(end);
                let node = graph.node(node_index);
                let branching = node
                    .connections_after(connection)
                    .filter(|&next| {
                        let far_end = graph.connection(next).far_end_from(node_index);
                        tallies[next][far_end.index()] > 0
                    })
                    .count();
                if node.is_leaf() || branching >= 2 {
                    sides.push((connection, end));
                }
            }
        }

        if sides.is_empty() {
            panic!("no connection separates the {matched} matched outgroup leaves");
        }
        if sides.len() > 1 {
            warn!(
                candidates = sides.len(),
                "outgroup is not a clade, several rootings qualify"
            );
        }
        debug!(matched, connections = ?sides, "resolved outgroup");
        Ok(sides)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::RerootError;
    use crate::manipulator::TreeManipulator;
    use crate::newick;

    fn manipulator(newick: &str) -> TreeManipulator {
        TreeManipulator::new(&newick::parse_str(newick).unwrap()).unwrap()
    }

    #[test]
    fn test_single_leaf_outgroup_uses_its_pendant_connection() {
        let m = manipulator("((A:1,B:1):1,(C:1,D:1):1);");
        let connections = m.outgroup_connections(&["C"]).unwrap();
        assert_eq!(connections.len(), 1);
        let connection = m.graph().connection(connections[0]);
        let ends = connection.ends();
        assert!(ends.iter().any(|&n| m.graph().node(n).label() == Some("C")));
    }

    #[test]
    fn test_unknown_labels_are_ignored() {
        let m = manipulator("((A:1,B:1):1,(C:1,D:1):1);");
        let rooted = m.outgroup_rooted(&["A", "B", "Z"]).unwrap();
        assert_eq!(
            rooted.root_children_leaf_sets(),
            vec![vec!["A", "B"], vec!["C", "D"]]
        );
    }

    #[test]
    fn test_outgroup_errors() {
        let m = manipulator("((A:1,B:1):1,(C:1,D:1):1);");
        assert!(matches!(
            m.outgroup_rooted(&["X"]),
            Err(RerootError::NoOutgroupMatch)
        ));
        assert!(matches!(
            m.outgroup_rooted(&["A", "B", "C", "D"]),
            Err(RerootError::OutgroupCoversAllLeaves { num_leaves: 4 })
        ));
    }
}
