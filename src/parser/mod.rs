//! Low-level parsing infrastructure for Newick text: a byte parser,
//! the parsing error and label escaping.

pub mod byte_parser;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParsingError, ParsingErrorType};
