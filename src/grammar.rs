/// Tree-sitter grammar setup for parsing declaration text.
use tree_sitter::{Language, Parser};

use crate::error::Error;

/// Build a parser for Python expressions, the syntax of a `Submod(...)` call.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the grammar's ABI does not match the
/// linked tree-sitter runtime.
pub fn python_parser() -> Result<Parser, Error> {
    let language: Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|err| return Error::ParseFailed {
            reason: err.to_string(),
        })?;
    return Ok(parser);
}
