use crate::ast::Expr;
use crate::error::FormulaError;
use crate::lexer::Lexer;
use crate::parser::Parser;
use gridcalc_core::{CellError, CellValue, Position};
use std::fmt;

/// A parsed formula body: the expression tree plus the list of positions it
/// references, kept sorted and deduplicated at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: Expr,
    references: Vec<Position>,
}

impl Formula {
    /// Parse a formula body (without the leading `=`).
    pub fn parse(input: &str) -> Result<Formula, FormulaError> {
        let tokens = Lexer::new(input).tokenize()?;
        let expr = Parser::new(tokens).parse()?;

        let mut references = Vec::new();
        expr.collect_refs(&mut references);
        references.sort();
        references.dedup();

        Ok(Formula { expr, references })
    }

    /// Evaluate against a cell resolver.
    pub fn evaluate<F>(&self, resolve: &F) -> Result<f64, CellError>
    where
        F: Fn(Position) -> CellValue,
    {
        self.expr.evaluate(resolve)
    }

    /// The canonical expression text (no leading `=`).
    pub fn expression(&self) -> String {
        self.expr.to_string()
    }

    /// Referenced positions, sorted and deduplicated.
    pub fn referenced_cells(&self) -> &[Position] {
        &self.references
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
