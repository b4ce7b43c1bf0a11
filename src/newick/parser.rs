//! Structs and logic to parse Newick strings.
//!
//! This module provides the [NewickParser] struct, which parses single
//! or multiple Newick trees into [RootedTree]s or into any [RootedSink].

use crate::model::{Annotation, AnnotationValue, RootedSink, RootedTree, RootedTreeBuilder};
use crate::newick::defs::NEWICK_LABEL_DELIMITERS;
use crate::parser::byte_parser::ByteParser;
use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================#=
/// Parser (configuration) for Newick trees with arbitrary polytomies.
///
/// Generic over [RootedSink] (construction) via
/// [parse_into](Self::parse_into); the convenience methods build
/// [RootedTree]s.
///
/// # Configuration
/// * [`with_annotations()`](Self::with_annotations)
///     - Configures the parser to parse annotations
///       (e.g. `[&rate=0.5,pop_size=1.2]`) instead of treating them as comments.
///
/// # Parsing
/// * [`parse_str`](Self::parse_str) - Parse a string holding exactly one tree
/// * [`parse_all`](Self::parse_all) - Parse all trees of a string eagerly
/// * [`parse_tree`](Self::parse_tree) - Parse the next tree of a [ByteParser]
///
/// # Example
/// ```
/// use reroot::newick::NewickParser;
///
/// let parser = NewickParser::new().with_annotations();
/// let tree = parser
///     .parse_str("((A:1.0,B:1.0)[&support=97]:0.5,C:1.5,D:0.7);")
///     .unwrap();
/// assert_eq!(tree.num_leaves(), 4);
/// assert_eq!(tree.root().children().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NewickParser {
    parse_annotations: bool,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NewickParser {
    /// Creates a new [NewickParser] that skips annotations as comments.
    pub fn new() -> Self {
        Self {
            parse_annotations: false,
        }
    }

    /// Configures the parser to parse annotations.
    pub fn with_annotations(mut self) -> Self {
        self.parse_annotations = true;
        self
    }
}

// ============================================================================
// API Parsing (pub)
// ============================================================================
impl NewickParser {
    /// Parses a string holding exactly one Newick tree
    /// (plus whitespace and comments).
    ///
    /// # Errors
    /// If the string is not a single valid Newick tree.
    pub fn parse_str(&self, newick: &str) -> Result<RootedTree, ParsingError> {
        let mut parser = ByteParser::for_str(newick);
        let tree = self.parse_tree(&mut parser)?;
        parser.skip_comment_and_whitespace()?;
        if !parser.is_eof() {
            return Err(ParsingError::invalid_newick_string(
                &parser,
                "Unexpected content after end of tree".to_string(),
            ));
        }
        Ok(tree)
    }

    /// Parses all Newick trees of the string until EOF.
    ///
    /// # Errors
    /// If any tree fails to parse.
    pub fn parse_all(&self, newick: &str) -> Result<Vec<RootedTree>, ParsingError> {
        let mut parser = ByteParser::for_str(newick);
        let mut trees = Vec::new();
        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.is_eof() {
                break;
            }
            trees.push(self.parse_tree(&mut parser)?);
        }
        Ok(trees)
    }

    /// Parses the next Newick tree from the given [ByteParser].
    ///
    /// # Errors
    /// If the Newick format is invalid.
    pub fn parse_tree(&self, parser: &mut ByteParser<'_>) -> Result<RootedTree, ParsingError> {
        let mut builder = RootedTreeBuilder::new();
        self.parse_into(parser, &mut builder)?;
        builder
            .finish_tree()
            .ok_or_else(|| ParsingError::unexpected_eof(parser))
    }

    /// Parses the next Newick tree from the given [ByteParser] into `sink`.
    ///
    /// Internal node labels are read but ignored. The root's own branch
    /// length and annotation are passed on as well.
    ///
    /// # Errors
    /// If the Newick format is invalid.
    pub fn parse_into<S: RootedSink>(
        &self,
        parser: &mut ByteParser<'_>,
        sink: &mut S,
    ) -> Result<(), ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }

        let root = sink.create_root();
        self.parse_vertex(parser, sink, root)?;

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", next_char),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Parsing
// ============================================================================
impl NewickParser {
    /// Skips whitespace and comments, keeping annotations if configured.
    fn skip<'a>(&self, parser: &mut ByteParser<'a>) -> Result<(), ParsingError> {
        if self.parse_annotations {
            parser.skip_plain_comment_and_whitespace()
        } else {
            parser.skip_comment_and_whitespace()
        }
    }

    /// Parses a vertex (internal vertex or leaf) into the already created
    /// sink node `node`:
    /// - `(children)[label][annotation][:branch_length][annotation]`
    /// - `label[annotation][:branch_length][annotation]`
    fn parse_vertex<S: RootedSink>(
        &self,
        parser: &mut ByteParser<'_>,
        sink: &mut S,
        node: S::NodeRef,
    ) -> Result<(), ParsingError> {
        self.skip(parser)?;
        if parser.peek_is(b'(') {
            self.parse_children(parser, sink, node)?;
            self.skip(parser)?;
            // Internal labels (e.g. support values) are not kept
            parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        } else {
            let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
            sink.set_label(node, &label);
        }

        let mut annotation = self.parse_annotation(parser)?;
        if let Some(branch_length) = self.parse_branch_length(parser)? {
            sink.set_branch_length(node, branch_length);
        }
        if annotation.is_none() {
            annotation = self.parse_annotation(parser)?;
        }
        if let Some(annotation) = annotation {
            sink.set_annotation(node, &annotation);
        }
        Ok(())
    }

    /// Parses the children list `(child,child,...)` of `parent`:
    /// - Expects parser at opening `(`
    /// - Accepts any number of children, including one
    fn parse_children<S: RootedSink>(
        &self,
        parser: &mut ByteParser<'_>,
        sink: &mut S,
        parent: S::NodeRef,
    ) -> Result<(), ParsingError> {
        parser.consume_if(b'(');
        loop {
            let child = sink.create_child(parent);
            self.parse_vertex(parser, sink, child)?;

            self.skip(parser)?;
            if parser.consume_if(b',') {
                continue;
            }
            if parser.consume_if(b')') {
                return Ok(());
            }
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            let next_char = parser.peek().map(char::from);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ',' or ')' after child but found {:?}", next_char),
            ));
        }
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports scientific notation (e.g., `1.5e-10`)
    ///
    /// # Returns
    /// - `Ok(Some(branch_length))` if found a branch length and was able to parse it
    /// - `Ok(None)` if no branch length found
    /// - [ParsingError] if it couldn't parse branch length value
    fn parse_branch_length(&self, parser: &mut ByteParser<'_>) -> Result<Option<f64>, ParsingError> {
        self.skip(parser)?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        self.skip(parser)?;

        let mut branch_length_str = String::new();
        while let Some(b) = parser.peek() {
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
                branch_length_str.push(char::from(b));
                parser.next_byte();
            } else {
                break;
            }
        }

        let value: f64 = branch_length_str.parse().map_err(|_| {
            ParsingError::invalid_newick_string(
                parser,
                format!("Invalid branch length: {:?}", branch_length_str),
            )
        })?;
        Ok(Some(value))
    }

    /// Parses an annotation block `[&key=value,...]` if configured and
    /// present. Values in braces (e.g. `{0.1,0.4}`) are kept as strings.
    ///
    /// # Returns
    /// * `Ok(Some(annotation))` - Parsed key-value pairs
    /// * `Ok(None)` - Not configured, or no annotation block at current position
    /// * `Err(ParsingError)` - If annotation block is malformed
    fn parse_annotation(&self, parser: &mut ByteParser<'_>) -> Result<Option<Annotation>, ParsingError> {
        if !self.parse_annotations {
            return Ok(None);
        }
        self.skip(parser)?;
        if !parser.consume_if_sequence(b"[&") {
            return Ok(None);
        }

        let mut annotation = Annotation::new();
        loop {
            let key = parser.parse_unquoted_label(b"=,]").trim().to_string();
            if key.is_empty() {
                return Err(ParsingError::invalid_annotation(
                    parser,
                    "Empty annotation key".to_string(),
                ));
            }
            if !parser.consume_if(b'=') {
                return Err(ParsingError::invalid_annotation(
                    parser,
                    format!("Expected '=' after annotation key '{key}'"),
                ));
            }

            let raw = if parser.peek_is(b'{') {
                let value = parser.parse_unquoted_label(b"}]");
                if !parser.consume_if(b'}') {
                    return Err(ParsingError::invalid_annotation(
                        parser,
                        format!("Unclosed '{{' in value of '{key}'"),
                    ));
                }
                format!("{value}}}")
            } else {
                parser.parse_unquoted_label(b",]").trim().to_string()
            };
            if raw.is_empty() {
                return Err(ParsingError::invalid_annotation(
                    parser,
                    format!("Empty annotation value for key '{key}'"),
                ));
            }
            annotation.insert(key, AnnotationValue::parse(&raw));

            if !parser.consume_if(b',') {
                break;
            }
        }

        if !parser.consume_if(b']') {
            return Err(ParsingError::invalid_annotation(
                parser,
                "Expected ']' at end of annotation block".to_string(),
            ));
        }
        Ok(Some(annotation))
    }
}
