//! Rendering of the unrooted graph into rooted or unrooted sinks.
//!
//! All walks are iterative and read-only: they visit the graph away from a
//! chosen connection (or node), turn each traversed connection into the
//! branch length of a newly created sink node, and stop at leaves.

use crate::graph::connection::{ConnectionIndex, End};
use crate::graph::node::NodeIndex;
use crate::graph::unrooted_graph::UnrootedGraph;
use crate::model::{RootedSink, TreeSink, UnrootedSink};

/// Clamps a split position into `[0, length]`
/// (respectively `[length, 0]` for negative lengths).
pub(crate) fn clamp_split(split: f64, length: f64) -> f64 {
    if length >= 0.0 {
        split.clamp(0.0, length)
    } else {
        split.clamp(length, 0.0)
    }
}

/// Renders a rooting that splits `connection` into a rooted sink.
///
/// The root gets two children: the side at `first` comes first, hanging on
/// a branch of `first_length` (clamped to the connection), the opposite side
/// gets the remainder. The connection's annotation goes to both children.
pub(crate) fn render_split<S: RootedSink>(
    graph: &UnrootedGraph,
    connection: ConnectionIndex,
    first: End,
    first_length: f64,
    sink: &mut S,
) {
    let conn = graph.connection(connection);
    let first_length = clamp_split(first_length, conn.length());
    let root = sink.create_root();

    let mut pending = Vec::with_capacity(2);
    for (end, length) in [
        (first, first_length),
        (first.opposite(), conn.length() - first_length),
    ] {
        let child = sink.create_child(root);
        sink.set_branch_length(child, length);
        if let Some(annotation) = conn.annotation() {
            sink.set_annotation(child, annotation);
        }
        pending.push((conn.node_at(end), connection, child));
    }

    expand(graph, sink, pending);
}

/// Renders a rooting at `node` into a rooted sink: every incident
/// connection of `node` becomes a child of the root.
pub(crate) fn render_at_node<S: RootedSink>(graph: &UnrootedGraph, node: NodeIndex, sink: &mut S) {
    let root = sink.create_root();
    let graph_node = graph.node(node);
    if let Some(label) = graph_node.label() {
        sink.set_label(root, label);
    }

    let mut pending = Vec::with_capacity(graph_node.degree());
    for &connection in graph_node.connections() {
        let child = create_branch(graph, sink, root, connection);
        pending.push((graph.connection(connection).other_node(node), connection, child));
    }

    expand(graph, sink, pending);
}

/// Renders the graph into an unrooted sink, using the base connection
/// as the sink's base branch.
pub(crate) fn render_unrooted<S: UnrootedSink>(graph: &UnrootedGraph, sink: &mut S) {
    let base = graph.base();
    let conn = graph.connection(base);
    let (side0, side1) = sink.create_base_branch(conn.length(), conn.annotation());
    let pending = vec![
        (conn.node_at(End::Zero), base, side0),
        (conn.node_at(End::One), base, side1),
    ];
    expand(graph, sink, pending);
}

/// Creates the sink child for `connection` below `parent`.
fn create_branch<S: TreeSink>(
    graph: &UnrootedGraph,
    sink: &mut S,
    parent: S::NodeRef,
    connection: ConnectionIndex,
) -> S::NodeRef {
    let conn = graph.connection(connection);
    let child = sink.create_child(parent);
    sink.set_branch_length(child, conn.length());
    if let Some(annotation) = conn.annotation() {
        sink.set_annotation(child, annotation);
    }
    child
}

/// Walks away from each `(node, incoming connection, sink node)` entry,
/// creating sink children in cyclic connection order.
fn expand<S: TreeSink>(
    graph: &UnrootedGraph,
    sink: &mut S,
    pending: Vec<(NodeIndex, ConnectionIndex, S::NodeRef)>,
) {
    // Reversed, so the first entry is expanded first
    let mut stack: Vec<_> = pending.into_iter().rev().collect();
    while let Some((node, incoming, sink_node)) = stack.pop() {
        let graph_node = graph.node(node);
        if let Some(label) = graph_node.label() {
            sink.set_label(sink_node, label);
            continue;
        }

        let mut children = Vec::with_capacity(graph_node.degree() - 1);
        for connection in graph_node.connections_after(incoming) {
            let child = create_branch(graph, sink, sink_node, connection);
            children.push((graph.connection(connection).other_node(node), connection, child));
        }
        stack.extend(children.into_iter().rev());
    }
}
