mod error;
mod grammar;

pub use error::ParseError;

use crate::types::NumExpr;

/// Parse a calculation expression into a [`NumExpr`] tree.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid arithmetic expression.
pub(crate) fn parse_calculation(input: &str) -> Result<NumExpr, ParseError> {
    use winnow::Parser;
    grammar::calculation
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}
