use thiserror::Error;

/// Lexer or parser failure on a formula body
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("cell reference '{0}' is missing a row number")]
    IncompleteReference(String),

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of formula")]
    UnexpectedEnd,
}

/// Failure to build a formula from text.
///
/// A body can fail to parse ([`ParseError`]), or parse cleanly but name a
/// cell outside the sheet bounds; the two are distinct categories.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("cell reference '{0}' is out of range")]
    InvalidReference(String),
}
