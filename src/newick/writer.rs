//! Newick format writing for [RootedTree]s.

use crate::model::{Annotation, NodeId, RootedTree};
use crate::newick::defs::BUFFER_CHARS;
use crate::parser::utils::escape_label;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Writes given list of trees to a file in Newick format, one tree per line.
///
/// # Errors
/// Returns an I/O error if writing fails.
///
/// # Example
/// ```no_run
/// use reroot::newick::{parse_str, write_newick_file};
/// use std::fs::File;
///
/// let tree = parse_str("((A:1,B:1):1,C:2);")?;
/// write_newick_file(File::create("trees.nwk")?, &[tree])?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_newick_file(file: File, trees: &[RootedTree]) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    for tree in trees {
        writer.write_all(to_newick(tree).as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Returns the Newick representation of this tree with closing semicolon.
///
/// Leaf labels are escaped via [escape_label]; internal nodes are written
/// without labels. Annotations are written as `[&key=value,...]` in front
/// of the branch length. The root's own branch length is omitted.
///
/// # Example
/// ```
/// use reroot::model::RootedTree;
/// use reroot::newick::to_newick;
///
/// let mut tree = RootedTree::new();
/// let root = tree.root_index();
/// tree.add_leaf(root, "A", Some(1.0));
/// tree.add_leaf(root, "Spotted Kiwi", Some(2.5));
///
/// assert_eq!(to_newick(&tree), "(A:1,Spotted_Kiwi:2.5);");
/// ```
pub fn to_newick(tree: &RootedTree) -> String {
    // Recursive helper for building the Newick string
    fn build_newick(tree: &RootedTree, newick: &mut String, index: NodeId) {
        let node = &tree[index];

        if node.is_leaf() {
            newick.push_str(&escape_label(node.label().unwrap_or_default()));
        } else {
            newick.push('(');
            for (i, &child) in node.children().iter().enumerate() {
                if i > 0 {
                    newick.push(',');
                }
                build_newick(tree, newick, child);
            }
            newick.push(')');
        }

        if let Some(annotation) = node.annotation() {
            push_annotation(newick, annotation);
        }
        if let (Some(branch_length), false) = (node.branch_length(), node.is_root()) {
            newick.push(':');
            newick.push_str(&branch_length.to_string());
        }
    }

    let mut newick = String::with_capacity(estimate_newick_len(tree));
    build_newick(tree, &mut newick, tree.root_index());
    newick.push(';');
    newick
}

fn push_annotation(newick: &mut String, annotation: &Annotation) {
    if annotation.is_empty() {
        return;
    }
    newick.push_str("[&");
    for (i, (key, value)) in annotation.iter().enumerate() {
        if i > 0 {
            newick.push(',');
        }
        newick.push_str(key);
        newick.push('=');
        newick.push_str(&value.to_string());
    }
    newick.push(']');
}

/// Estimates the length of a Newick string for a given tree, to
/// pre-allocate the output.
pub(crate) fn estimate_newick_len(tree: &RootedTree) -> usize {
    // Per node: parenthesis or comma ~= 2 chars
    const STRUCTURE_CHARS: usize = 2;
    // Branch lengths: ~20 chars each (e.g., ":0.009529961339106089")
    const BRANCH_LENGTH_CHARS: usize = 20;

    let label_capacity: usize = tree.leaf_labels().iter().map(|l| l.len() + 2).sum();
    tree.num_nodes() * (STRUCTURE_CHARS + BRANCH_LENGTH_CHARS) + label_capacity + BUFFER_CHARS
}
