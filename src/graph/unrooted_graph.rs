//! Arena-based unrooted graph with iterative traversals and the lazily
//! filled path-length caches.

use crate::graph::connection::{Connection, ConnectionIndex, End};
use crate::graph::node::{GraphNode, NodeIndex};
use crate::model::Annotation;
use tracing::trace;

/// *During construction only*, index for unset base connection.
const NO_BASE_SET_INDEX: ConnectionIndex = usize::MAX;

// =$========================================================================$=
// UNROOTED GRAPH
// =$========================================================================$=
/// An unrooted tree stored as an undirected graph using the arena pattern.
///
/// [GraphNode]s and [Connection]s live in two vectors and reference each
/// other only via [NodeIndex] and [ConnectionIndex], so there are no
/// reference cycles and ownership stays with the graph.
///
/// One connection is the *base*: it is where traversals start, but it is not
/// privileged otherwise; any connection can serve as root position.
///
/// The graph is `!Sync` since the path-length caches use [Cell](std::cell::Cell).
#[derive(Debug, Clone)]
pub struct UnrootedGraph {
    nodes: Vec<GraphNode>,
    connections: Vec<Connection>,
    base: ConnectionIndex,
}

// ============================================================================
// Construction (crate)
// ============================================================================
impl UnrootedGraph {
    pub(crate) fn with_capacity(num_leaves: usize) -> Self {
        UnrootedGraph {
            nodes: Vec::with_capacity(2 * num_leaves),
            connections: Vec::with_capacity(2 * num_leaves),
            base: NO_BASE_SET_INDEX,
        }
    }

    pub(crate) fn add_leaf_node(&mut self, label: String) -> NodeIndex {
        self.nodes.push(GraphNode::new_leaf(label));
        self.nodes.len() - 1
    }

    pub(crate) fn add_internal_node(&mut self) -> NodeIndex {
        self.nodes.push(GraphNode::new_internal());
        self.nodes.len() - 1
    }

    /// Connects two nodes; `end0` becomes [End::Zero] of the new connection.
    pub(crate) fn connect(
        &mut self,
        end0: NodeIndex,
        end1: NodeIndex,
        length: f64,
        annotation: Option<Annotation>,
    ) -> ConnectionIndex {
        let index = self.connections.len();
        self.connections
            .push(Connection::new(end0, end1, length, annotation));
        self.nodes[end0].push_connection(index);
        self.nodes[end1].push_connection(index);
        if self.base == NO_BASE_SET_INDEX {
            self.base = index;
        }
        index
    }

    pub(crate) fn set_base(&mut self, base: ConnectionIndex) {
        self.base = base;
    }

    pub(crate) fn connection_mut(&mut self, index: ConnectionIndex) -> &mut Connection {
        &mut self.connections[index]
    }

    /// Splits `index` by a new internal node placed `end0_length` away from
    /// its [End::Zero], returning the new node and the new connection.
    ///
    /// The existing connection keeps its index and now runs from its old
    /// end 0 to the new node; a new connection (same annotation) runs from the
    /// new node to the old end 1, taking over the old position in that node's
    /// cyclic order.
    pub(crate) fn split_connection(
        &mut self,
        index: ConnectionIndex,
        end0_length: f64,
    ) -> (NodeIndex, ConnectionIndex) {
        let (old_end1, length, annotation) = {
            let connection = &self.connections[index];
            (
                connection.node_at(End::One),
                connection.length(),
                connection.annotation().cloned(),
            )
        };

        let middle = self.add_internal_node();
        self.connections[index].set_node_at(End::One, middle);
        self.connections[index].set_length(end0_length);
        self.nodes[middle].push_connection(index);

        let new_index = self.connections.len();
        self.connections.push(Connection::new(
            middle,
            old_end1,
            length - end0_length,
            annotation,
        ));
        self.nodes[middle].push_connection(new_index);
        self.nodes[old_end1].replace_connection(index, new_index);

        (middle, new_index)
    }
}

// ============================================================================
// Getters / Accessors (pub)
// ============================================================================
impl UnrootedGraph {
    /// Returns the node at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn node(&self, index: NodeIndex) -> &GraphNode {
        &self.nodes[index]
    }

    /// Returns the connection at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn connection(&self, index: ConnectionIndex) -> &Connection {
        &self.connections[index]
    }

    /// Returns the base connection where traversals start.
    pub fn base(&self) -> ConnectionIndex {
        self.base
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of connections.
    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    /// Returns the number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Returns all leaf labels in arena order.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter_map(|n| n.label())
            .map(str::to_string)
            .collect()
    }

    /// Returns the sum of all connection lengths.
    pub fn total_length(&self) -> f64 {
        self.connections.iter().map(|c| c.length()).sum()
    }
}

// =$========================================================================$=
// TRAVERSALS
// =$========================================================================$=
impl UnrootedGraph {
    /// Returns every connection, found by walking the graph once from the base
    /// connection and following every neighbour except the caller.
    ///
    /// The base comes first; the rest follow in depth-first order.
    pub fn all_connections(&self) -> Vec<ConnectionIndex> {
        let mut result = Vec::with_capacity(self.connections.len());
        result.push(self.base);
        for (node, incoming) in self.oriented_nodes().into_iter() {
            result.extend(self.nodes[node].connections_after(incoming));
        }
        result
    }

    /// Returns every node paired with its connection towards the base,
    /// in pre-order from the base (parents before children).
    ///
    /// The two endpoints of the base come first, both paired with the base.
    pub fn oriented_nodes(&self) -> Vec<(NodeIndex, ConnectionIndex)> {
        let base = &self.connections[self.base];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![
            (base.node_at(End::One), self.base),
            (base.node_at(End::Zero), self.base),
        ];
        while let Some((node, incoming)) = stack.pop() {
            order.push((node, incoming));
            let outgoing: Vec<ConnectionIndex> = self.nodes[node].connections_after(incoming).collect();
            for &connection in outgoing.iter().rev() {
                stack.push((self.connections[connection].other_node(node), connection));
            }
        }
        order
    }

    /// Sums a per-node weight over both sides of every connection.
    ///
    /// Returns for each connection `[weight via end 0, weight via end 1]`,
    /// i.e. the total weight of the nodes reachable through that end without
    /// crossing the connection.
    pub fn side_tallies<F>(&self, weight: F) -> Vec<[usize; 2]>
    where
        F: Fn(&GraphNode) -> usize,
    {
        let order = self.oriented_nodes();

        // Weight of the part hanging below each node (seen from the base)
        let mut below = vec![0usize; self.nodes.len()];
        for &(node, incoming) in order.iter().rev() {
            below[node] += weight(&self.nodes[node]);
            if incoming != self.base {
                let parent = self.connections[incoming].other_node(node);
                below[parent] += below[node];
            }
        }

        let base = &self.connections[self.base];
        let total = below[base.node_at(End::Zero)] + below[base.node_at(End::One)];

        let mut tallies = vec![[0usize; 2]; self.connections.len()];
        for &(node, incoming) in &order {
            let connection = &self.connections[incoming];
            if incoming == self.base {
                // Each base end sees only its own half
                let end = connection.far_end_from(node).opposite();
                tallies[incoming][end.index()] = below[node];
            } else {
                let child_end = connection.far_end_from(node).opposite();
                tallies[incoming][child_end.index()] = below[node];
                tallies[incoming][child_end.opposite().index()] = total - below[node];
            }
        }
        tallies
    }

    /// Collects the labels of all leaves reachable from `start` without
    /// crossing `incoming`.
    pub fn leaves_beyond(&self, start: NodeIndex, incoming: ConnectionIndex) -> Vec<String> {
        let mut labels = Vec::new();
        let mut stack = vec![(start, incoming)];
        while let Some((node, incoming)) = stack.pop() {
            let graph_node = &self.nodes[node];
            if let Some(label) = graph_node.label() {
                labels.push(label.to_string());
                continue;
            }
            let outgoing: Vec<ConnectionIndex> = graph_node.connections_after(incoming).collect();
            for &connection in outgoing.iter().rev() {
                stack.push((self.connections[connection].other_node(node), connection));
            }
        }
        labels
    }
}

// =$========================================================================$=
// PATH-LENGTH CACHES
// =$========================================================================$=
impl UnrootedGraph {
    /// Returns the length of the longest path from `connection`, through `end`,
    /// to any leaf, without re-crossing `connection`.
    ///
    /// Missing cache cells are filled on the way using an explicit stack.
    /// Each cell gets computed at most once, so querying every connection
    /// costs O(n) in total.
    pub fn max_path_via(&self, connection: ConnectionIndex, end: End) -> f64 {
        if let Some(value) = self.connections[connection].cached_max_path(end) {
            return value;
        }

        let mut stack = vec![(connection, end)];
        while let Some(&(current, current_end)) = stack.last() {
            let conn = &self.connections[current];
            if conn.cached_max_path(current_end).is_some() {
                stack.pop();
                continue;
            }

            let node_index = conn.node_at(current_end);
            let node = &self.nodes[node_index];
            if node.is_leaf() {
                conn.store_max_path(current_end, 0.0);
                stack.pop();
                continue;
            }

            // Push every uncomputed dependency, or compute if none is missing
            let mut missing = false;
            for next in node.connections_after(current) {
                let next_conn = &self.connections[next];
                let far_end = next_conn.far_end_from(node_index);
                if next_conn.cached_max_path(far_end).is_none() {
                    stack.push((next, far_end));
                    missing = true;
                }
            }
            if missing {
                continue;
            }

            let longest = node
                .connections_after(current)
                .map(|next| {
                    let next_conn = &self.connections[next];
                    next_conn.length() + next_conn.max_path(next_conn.far_end_from(node_index))
                })
                .fold(f64::NEG_INFINITY, f64::max);
            trace!(connection = current, end = ?current_end, longest, "filled path-length cache");
            conn.store_max_path(current_end, longest);
            stack.pop();
        }

        self.connections[connection].max_path(end)
    }

    /// Returns `|max_path_via(End::Zero) - max_path_via(End::One)|`.
    pub fn path_diff(&self, connection: ConnectionIndex) -> f64 {
        let via_end0 = self.max_path_via(connection, End::Zero);
        let via_end1 = self.max_path_via(connection, End::One);
        (via_end0 - via_end1).abs()
    }

    /// Empties every path-length cache cell.
    pub fn clear_caches(&self) {
        for connection in &self.connections {
            connection.clear_cache();
        }
    }

    /// Returns the number of filled cache cells (two per connection at most).
    pub fn num_cached_cells(&self) -> usize {
        self.connections
            .iter()
            .flat_map(|c| End::BOTH.map(|end| c.cached_max_path(end)))
            .filter(Option::is_some)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::builder::GraphBuilder;
    use crate::graph::{ConstructionPolicy, DEFAULT_REDUCE_THRESHOLD, End, UnrootedGraph};
    use crate::newick;

    fn graph(newick: &str) -> UnrootedGraph {
        let tree = newick::parse_str(newick).unwrap();
        let (graph, _) = GraphBuilder::new(&tree, ConstructionPolicy::Mimic, DEFAULT_REDUCE_THRESHOLD)
            .build()
            .unwrap();
        graph
    }

    #[test]
    fn test_caches_start_empty_and_fill_once() {
        let graph = graph("((A:1,B:2):1,(C:3,D:4):2);");
        assert_eq!(graph.num_cached_cells(), 0);

        // Base connection joins the two cherries: 1 + 2 = 3
        let base = graph.base();
        assert_eq!(graph.connection(base).length(), 3.0);
        let via0 = graph.max_path_via(base, End::Zero);
        let via1 = graph.max_path_via(base, End::One);
        assert_eq!(via0, 2.0);
        assert_eq!(via1, 4.0);

        // Both sides plus every cell they depend on
        let filled = graph.num_cached_cells();
        assert!(filled >= 2);
        for connection in 0..graph.num_connections() {
            graph.path_diff(connection);
        }
        assert_eq!(graph.num_cached_cells(), 2 * graph.num_connections());

        graph.clear_caches();
        assert_eq!(graph.num_cached_cells(), 0);
    }

    #[test]
    fn test_all_connections_base_first() {
        let graph = graph("((A:1,B:1):1,(C:1,D:1):1,E:1);");
        let connections = graph.all_connections();
        assert_eq!(connections[0], graph.base());
        assert_eq!(connections.len(), graph.num_connections());

        let mut sorted = connections.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), connections.len());
    }

    #[test]
    fn test_split_connection() {
        let mut graph = graph("((A:1,B:1):1,(C:1,D:1):1);");
        let base = graph.base();
        let [end0, end1] = graph.connection(base).ends();

        let (middle, second) = graph.split_connection(base, 0.5);
        assert_eq!(graph.connection(base).ends(), [end0, middle]);
        assert_eq!(graph.connection(base).length(), 0.5);
        assert_eq!(graph.connection(second).ends(), [middle, end1]);
        assert_eq!(graph.connection(second).length(), 1.5);
        assert_eq!(graph.node(middle).connections(), &[base, second]);
        assert!(graph.node(end1).connections().contains(&second));
        assert!(!graph.node(end1).connections().contains(&base));
    }

    #[test]
    fn test_side_tallies_count_leaves() {
        let graph = graph("((A:1,B:1):1,(C:1,D:1):1,E:1);");
        let tallies = graph.side_tallies(|node| usize::from(node.is_leaf()));
        for (connection, tally) in tallies.iter().enumerate() {
            assert_eq!(tally[0] + tally[1], 5, "connection {connection}");
            for end in End::BOTH {
                let node = graph.connection(connection).node_at(end);
                let beyond = graph.leaves_beyond(node, connection).len();
                assert_eq!(tally[end.index()], beyond);
            }
        }
    }

    #[test]
    #[should_panic(expected = "read before write")]
    fn test_cache_read_before_write_panics() {
        let graph = graph("((A:1,B:1):1,(C:1,D:1):1);");
        graph.connection(graph.base()).max_path(End::Zero);
    }
}
