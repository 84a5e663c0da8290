use std::cell::RefCell;

use gridcalc_core::{CellValue, Position};
use gridcalc_formula::{Formula, FormulaError};

use crate::sheet::Sheet;

/// Marks a formula cell
pub const FORMULA_PREFIX: char = '=';
/// Forces text interpretation; stripped from the value but kept in the text
pub const ESCAPE_PREFIX: char = '\'';

/// The interpreted content of a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Empty,
    Text(String),
    Number(f64),
    Formula(Formula),
}

impl Default for CellContent {
    fn default() -> Self {
        CellContent::Empty
    }
}

/// A unit of grid storage: one content variant plus a memoized value.
///
/// The memo is interior-mutable so reads stay `&self`; the owning sheet is
/// single-threaded and is the only caller of [`Cell::invalidate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    content: CellContent,
    cached: RefCell<Option<CellValue>>,
}

impl Cell {
    pub fn new(content: CellContent) -> Self {
        Cell {
            content,
            cached: RefCell::new(None),
        }
    }

    /// Interpret raw input text.
    ///
    /// Empty input is an empty cell. `=`-prefixed input of length > 1 is a
    /// formula; a parse failure constructs nothing, so a failed edit has
    /// nothing to roll back. An apostrophe prefix forces text. Anything that
    /// parses fully as a double is a number; the rest is text (including a
    /// bare `=`).
    pub fn from_input(input: &str) -> Result<Cell, FormulaError> {
        let content = if input.is_empty() {
            CellContent::Empty
        } else if input.starts_with(FORMULA_PREFIX) && input.len() > 1 {
            CellContent::Formula(Formula::parse(&input[1..])?)
        } else if input.starts_with(ESCAPE_PREFIX) {
            CellContent::Text(input.to_string())
        } else if let Ok(number) = input.parse::<f64>() {
            CellContent::Number(number)
        } else {
            CellContent::Text(input.to_string())
        };

        Ok(Cell::new(content))
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    /// The cell's text as the user would re-edit it: raw text (escape
    /// included), the trimmed number form, or `=` plus the canonical
    /// expression.
    pub fn text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(s) => s.clone(),
            CellContent::Number(n) => CellValue::Number(*n).as_text(),
            CellContent::Formula(formula) => format!("{}{}", FORMULA_PREFIX, formula.expression()),
        }
    }

    /// The computed value, memoized until the sheet invalidates it.
    pub fn value(&self, sheet: &Sheet) -> CellValue {
        if let Some(value) = &*self.cached.borrow() {
            return value.clone();
        }

        let value = self.compute(sheet);
        *self.cached.borrow_mut() = Some(value.clone());
        value
    }

    fn compute(&self, sheet: &Sheet) -> CellValue {
        match &self.content {
            CellContent::Empty => CellValue::Empty,
            CellContent::Text(s) => match s.strip_prefix(ESCAPE_PREFIX) {
                Some(stripped) => CellValue::Text(stripped.to_string()),
                None => CellValue::Text(s.clone()),
            },
            CellContent::Number(n) => CellValue::Number(*n),
            CellContent::Formula(formula) => {
                match formula.evaluate(&|pos| sheet.cell_value(pos)) {
                    Ok(number) => CellValue::Number(number),
                    Err(error) => CellValue::Error(error),
                }
            }
        }
    }

    /// Positions this cell references; empty for non-formula content.
    pub fn referenced_cells(&self) -> &[Position] {
        match &self.content {
            CellContent::Formula(formula) => formula.referenced_cells(),
            _ => &[],
        }
    }

    pub(crate) fn invalidate(&self) {
        self.cached.borrow_mut().take();
    }
}
