use serde::{Deserialize, Serialize};
use std::fmt;

/// Evaluation failures that appear as cell values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellError {
    /// #REF! - Invalid cell reference
    InvalidReference,
    /// #VALUE! - Cell is not a number
    InvalidValue,
    /// #DIV/0! - Division by zero
    DivisionByZero,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::InvalidReference => write!(f, "#REF!"),
            CellError::InvalidValue => write!(f, "#VALUE!"),
            CellError::DivisionByZero => write!(f, "#DIV/0!"),
        }
    }
}

impl std::error::Error for CellError {}

/// The computed value of a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Error(CellError),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    /// Check if the value is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the value as display text.
    ///
    /// Numbers print with non-significant trailing zeros and dots trimmed;
    /// integer-valued doubles print without a decimal point.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Error(e) => e.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}
