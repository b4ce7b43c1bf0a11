//! Newick format parser and writer for rooted trees.
//!
//! # Quick API
//! For simple use cases with default settings:
//! * [`parse_str`] - parses a single string into a [RootedTree]
//! * [`parse_file`] - parses all trees of a file
//! * [`to_newick`] - writes a [RootedTree] as Newick string
//!
//! # Full API
//! For more control, configure a [NewickParser]:
//! * [`NewickParser::parse_str`] - parse a single tree
//! * [`NewickParser::parse_all`] - parse all trees until EOF
//! * [`NewickParser::parse_into`] - parse into any
//!   [RootedSink](crate::model::RootedSink)
//!
//! # Format
//! The Newick format has the following simple grammar:
//! * `tree ::= vertex ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [label] [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Labels are unquoted (underscores read as spaces) or single-quoted
//!   (`''` for a quote)
//! * Comments are square brackets and can occur anywhere whitespace can
//!
//! In the extended Newick format, there can be comment-like annotations
//! before or after the branch length:
//! * `A[&pop_size=0.543,color=blue]:2.1`
//! * `(A,B)[&support=97]:6.7`
//!
//! These are skipped as comments unless the parser is configured
//! [with annotations](NewickParser::with_annotations).

mod defs;
pub mod parser;
pub mod writer;

pub use parser::NewickParser;
pub use writer::{to_newick, write_newick_file};

use crate::model::RootedTree;
use crate::parser::ParsingError;
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses a single Newick string to obtain a [RootedTree].
///
/// # Errors
/// [ParsingError] if the string is not exactly one valid Newick tree.
///
/// # Example
/// ```
/// use reroot::newick::parse_str;
///
/// let tree = parse_str("(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));")?;
/// assert_eq!(tree.leaf_labels()[0], "Fratercula cirrhata");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<RootedTree, ParsingError> {
    NewickParser::new().parse_str(newick.as_ref())
}

/// Parses a file holding a semicolon-separated list of Newick strings.
///
/// # Errors
/// [ParsingError] if reading fails or the Newick format is invalid.
///
/// # Example
/// ```no_run
/// use reroot::newick::parse_file;
///
/// let trees = parse_file("anseriformes.nwk")?;
/// println!("Parsed {} trees", trees.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<RootedTree>, ParsingError> {
    let contents = std::fs::read_to_string(path)?;
    NewickParser::new().parse_all(&contents)
}
