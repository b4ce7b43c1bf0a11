//! Lazy enumeration of all rootings of a tree.

use crate::graph::ConnectionIndex;
use crate::manipulator::TreeManipulator;
use crate::model::RootedTree;
use tracing::trace;

/// Iterator over all rootings of a [TreeManipulator], one per connection
/// (in the order of [TreeManipulator::all_connections]), each connection
/// split evenly.
///
/// A rooted tree is only rendered when requested, and the enumerator can be
/// [reset](Self::reset) to start over.
///
/// # Example
/// ```
/// use reroot::manipulator::TreeManipulator;
/// use reroot::newick;
///
/// let tree = newick::parse_str("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
/// let manipulator = TreeManipulator::new(&tree).unwrap();
///
/// let mut rootings = manipulator.root_enumerator();
/// assert_eq!(rootings.len(), 5);
/// let first = rootings.next().unwrap();
/// assert_eq!(first.num_leaves(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct RootEnumerator<'a> {
    manipulator: &'a TreeManipulator,
    connections: Vec<ConnectionIndex>,
    position: usize,
}

impl<'a> RootEnumerator<'a> {
    pub(crate) fn new(manipulator: &'a TreeManipulator) -> Self {
        RootEnumerator {
            manipulator,
            connections: manipulator.all_connections(),
            position: 0,
        }
    }

    /// Whether another rooting is available.
    pub fn has_next(&self) -> bool {
        self.position < self.connections.len()
    }

    /// Starts the enumeration over from the first rooting.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Returns the connection the next rooting will split, if any.
    pub fn peek_connection(&self) -> Option<ConnectionIndex> {
        self.connections.get(self.position).copied()
    }
}

impl Iterator for RootEnumerator<'_> {
    type Item = RootedTree;

    fn next(&mut self) -> Option<Self::Item> {
        let connection = self.peek_connection()?;
        self.position += 1;
        trace!(connection, position = self.position, "enumerating rooting");
        Some(self.manipulator.rooted_evenly(connection))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.connections.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RootEnumerator<'_> {}
