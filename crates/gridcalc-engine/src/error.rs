use gridcalc_core::Position;
use gridcalc_formula::FormulaError;
use thiserror::Error;

/// Structural errors raised by sheet operations.
///
/// These are thrown out of edits and must leave the sheet untouched;
/// evaluation failures are not errors at this level, they become
/// [`gridcalc_core::CellValue::Error`] values instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    #[error("invalid position ({}, {})", .0.row, .0.col)]
    InvalidPosition(Position),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error("circular dependency through {0}")]
    CircularDependency(Position),
}
