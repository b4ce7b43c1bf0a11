//! Low-level byte-by-byte parser for Newick text.
//!
//! This module provides [ByteParser] with support for peeking, consuming,
//! comment skipping and quote-aware label parsing.

use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser over an in-memory input.
///
/// # Features
/// - Whitespace and `[...]` comment skipping, optionally keeping `[&...]`
///   annotation blocks
/// - Quote-aware label parsing (single quotes, `''` escaping)
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use reroot::parser::ByteParser;
/// use reroot::parser::byte_parser::ConsumeMode;
///
/// let mut parser = ByteParser::for_str("tree t1 = ((A:0.5,B:0.5):0.3,C:0.8);");
/// parser.consume_until(b'=', ConsumeMode::Inclusive);
/// parser.skip_whitespace();
/// assert_eq!(parser.peek(), Some(b'('));
/// ```
#[derive(Debug, Clone)]
pub struct ByteParser<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> ByteParser<'a> {
    /// Creates a new [ByteParser] over the bytes of a string.
    pub fn for_str(input: &'a str) -> Self {
        Self::for_bytes(input.as_bytes())
    }

    /// Creates a new [ByteParser] over a byte slice.
    pub fn for_bytes(input: &'a [u8]) -> Self {
        Self { input, position: 0 }
    }

    /// Peeks at the current byte without consuming it.
    ///
    /// # Returns
    /// * `Some(u8)` - The current byte if available
    /// * `None` - If at end of data (EOF)
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.position += 1;
        Some(byte)
    }

    /// Skips (consumes) all consecutive whitespace characters.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a `[...]` comment if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    ///
    /// # Errors
    /// Returns an error if a comment starts with `[` but is never closed.
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if self.consume_if(b'[') {
            if !self.consume_until(b']', ConsumeMode::Inclusive) {
                return Err(ParsingError::unclosed_comment(self));
            }
            return Ok(true);
        }

        Ok(false)
    }

    /// Skips (consumes) all consecutive whitespace and comments.
    ///
    /// # Errors
    /// Returns an error if an unclosed comment is encountered.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();
        while self.skip_comment()? {
            self.skip_whitespace();
        }
        Ok(())
    }

    /// Like [skip_comment_and_whitespace](Self::skip_comment_and_whitespace),
    /// but stops in front of an annotation block `[&...]`.
    ///
    /// # Errors
    /// Returns an error if an unclosed comment is encountered.
    pub fn skip_plain_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();
        while !self.peek_is_sequence(b"[&") && self.skip_comment()? {
            self.skip_whitespace();
        }
        Ok(())
    }

    /// Checks if the current byte matches `ch`.
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek() == Some(ch)
    }

    /// Checks if the following bytes match `sequence`, without consuming.
    pub fn peek_is_sequence(&self, sequence: &[u8]) -> bool {
        self.input[self.position..].starts_with(sequence)
    }

    /// Consumes the current byte if it matches `ch`.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the next bytes if they match `sequence`.
    ///
    /// # Returns
    /// `true` if the sequence was matched and consumed, `false` otherwise
    pub fn consume_if_sequence(&mut self, sequence: &[u8]) -> bool {
        if !self.peek_is_sequence(sequence) {
            return false;
        }
        self.position += sequence.len();
        true
    }

    /// Consumes bytes until the target byte is found.
    ///
    /// # Arguments
    /// * `target` - The byte to search for
    /// * `mode` - Whether to consume the target byte (`Inclusive`) or stop before it (`Exclusive`)
    ///
    /// # Returns
    /// `true` if the target was found, `false` if EOF was reached first
    pub fn consume_until(&mut self, target: u8, mode: ConsumeMode) -> bool {
        while let Some(b) = self.peek() {
            if b == target {
                if mode == ConsumeMode::Inclusive {
                    self.position += 1;
                }
                return true;
            }
            self.position += 1;
        }
        false
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns a string from up to `k` bytes from the current position for
    /// error context. Invalid UTF-8 is replaced lossily.
    pub fn get_context_as_string(&self, k: usize) -> String {
        let end = (self.position + k).min(self.input.len());
        String::from_utf8_lossy(&self.input[self.position..end]).into_owned()
    }

    /// Parses a label (quoted or unquoted) with the given delimiter set.
    ///
    /// Quoted labels are returned verbatim (without quotes); in unquoted
    /// labels underscores become spaces.
    ///
    /// # Errors
    /// Returns an error if a quoted label is not closed.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        if self.peek_is(b'\'') {
            self.parse_quoted_label()
        } else {
            Ok(self.parse_unquoted_label(delimiters).replace('_', " "))
        }
    }

    /// Parses a quoted label enclosed in single quotes with escape support.
    ///
    /// Assumes the opening quote has not been consumed yet. Single quotes within
    /// the label are escaped by doubling them (e.g., `'Wilson''s'` becomes `Wilson's`).
    ///
    /// # Errors
    /// Returns an error if the quoted label is not properly closed.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        let start = self.position;
        self.position += 1; // opening '

        let mut bytes = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') => {
                    if self.consume_if(b'\'') {
                        bytes.push(b'\'');
                    } else {
                        break;
                    }
                }
                Some(b) => bytes.push(b),
                None => {
                    self.position = start;
                    return Err(ParsingError::unclosed_quote(self));
                }
            }
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Parses an unquoted label until any of the given delimiters
    /// (or EOF) is encountered.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> String {
        let start = self.position;
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            self.position += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.position]).into_owned()
    }
}

/// Specifies whether to consume or leave the target when using
/// [ByteParser::consume_until].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ConsumeMode {
    /// Consume the target byte along with everything before it.
    Inclusive,
    /// Stop before the target byte without consuming it.
    Exclusive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parsing_error::ParsingErrorType;

    #[test]
    fn test_skip_comment_and_whitespace() {
        let mut parser = ByteParser::for_str("  [a comment] \n [another]  (A");
        parser.skip_comment_and_whitespace().unwrap();
        assert_eq!(parser.peek(), Some(b'('));
    }

    #[test]
    fn test_skip_plain_comment_keeps_annotation() {
        let mut parser = ByteParser::for_str(" [plain] [&rate=1]");
        parser.skip_plain_comment_and_whitespace().unwrap();
        assert!(parser.peek_is_sequence(b"[&"));
    }

    #[test]
    fn test_unclosed_comment() {
        let mut parser = ByteParser::for_str("[never closed");
        let err = parser.skip_comment_and_whitespace().unwrap_err();
        assert_eq!(err.kind(), &ParsingErrorType::UnclosedComment);
    }

    #[test]
    fn test_labels() {
        let mut parser = ByteParser::for_str("'Wilson''s Storm-petrel',Little_Penguin:");
        assert_eq!(parser.parse_label(b",").unwrap(), "Wilson's Storm-petrel");
        assert!(parser.consume_if(b','));
        assert_eq!(parser.parse_label(b":").unwrap(), "Little Penguin");
        assert_eq!(parser.peek(), Some(b':'));
    }

    #[test]
    fn test_unclosed_quote() {
        let mut parser = ByteParser::for_str("'Kea");
        let err = parser.parse_label(b",").unwrap_err();
        assert_eq!(err.kind(), &ParsingErrorType::UnclosedQuote);
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn test_consume_until() {
        let mut parser = ByteParser::for_str("abc=def");
        assert!(parser.consume_until(b'=', ConsumeMode::Exclusive));
        assert_eq!(parser.peek(), Some(b'='));
        assert!(!parser.consume_until(b'#', ConsumeMode::Inclusive));
        assert!(parser.is_eof());
    }
}
