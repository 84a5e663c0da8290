use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};

use gridcalc_core::{CellValue, Position, Size};
use gridcalc_formula::DependencyGraph;
use tracing::{debug, trace};

use crate::cell::Cell;
use crate::error::SheetError;

/// A sheet of cells with formula evaluation, dependency tracking and cached
/// values.
///
/// Storage is sparse; cells exist only where something was assigned or
/// referenced. Edits are transactional: a failed `set_cell` or `clear_cell`
/// leaves the sheet exactly as it was. A single sheet must be used from one
/// thread.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: HashMap<Position, Cell>,
    /// Positions currently holding a cell; drives the printable size
    occupied: BTreeSet<Position>,
    graph: DependencyGraph,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_position(pos: Position) -> Result<(), SheetError> {
        if pos.is_valid() {
            Ok(())
        } else {
            Err(SheetError::InvalidPosition(pos))
        }
    }

    /// Assign raw input text to a cell.
    ///
    /// The edit is vetted before anything changes: the text must classify
    /// (formulas must parse and stay in bounds), and the referenced cells
    /// must not close a cycle through this position. On success the cell is
    /// installed, referenced-but-absent positions materialize as empty
    /// cells, and every cell that transitively depended on this position
    /// loses its cached value.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        Self::check_position(pos)?;

        if let Some(existing) = self.cells.get(&pos) {
            if existing.text() == text {
                return Ok(());
            }
        }

        let trial = Cell::from_input(text)?;
        let refs: Vec<Position> = trial.referenced_cells().to_vec();
        let downstream = self.graph.transitive_dependents(pos);

        if refs.contains(&pos) || refs.iter().any(|r| downstream.contains(r)) {
            return Err(SheetError::CircularDependency(pos));
        }

        debug!(cell = %pos, refs = refs.len(), "set cell");

        self.graph.set_dependencies(pos, refs.iter().copied().collect());

        // Materialize referenced cells so downstream reads resolve against a
        // real empty cell. An empty cell has no references and cannot
        // introduce a cycle.
        for &r in &refs {
            if !self.cells.contains_key(&r) {
                self.cells.insert(r, Cell::default());
                self.occupied.insert(r);
            }
        }

        self.cells.insert(pos, trial);
        self.occupied.insert(pos);

        trace!(cell = %pos, invalidated = downstream.len(), "clearing dependent caches");
        for q in &downstream {
            if let Some(cell) = self.cells.get(q) {
                cell.invalidate();
            }
        }

        Ok(())
    }

    /// Look up a cell. Invalid positions are an error; valid positions with
    /// no cell are `None`.
    pub fn get_cell(&self, pos: Position) -> Result<Option<&Cell>, SheetError> {
        Self::check_position(pos)?;
        Ok(self.cells.get(&pos))
    }

    /// Remove a cell. Clearing an absent cell is a no-op. Cells that
    /// referenced this position keep their edges and now see it as absent
    /// (value 0.0 in formulas).
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), SheetError> {
        Self::check_position(pos)?;

        if self.cells.remove(&pos).is_none() {
            return Ok(());
        }

        debug!(cell = %pos, "clear cell");

        let downstream = self.graph.transitive_dependents(pos);
        trace!(cell = %pos, invalidated = downstream.len(), "clearing dependent caches");
        for q in &downstream {
            if let Some(cell) = self.cells.get(q) {
                cell.invalidate();
            }
        }

        self.graph.remove_cell(pos);
        self.occupied.remove(&pos);

        Ok(())
    }

    /// The computed value at a position; absent cells read as empty. This is
    /// the resolver formula evaluation runs against.
    pub fn cell_value(&self, pos: Position) -> CellValue {
        self.cells
            .get(&pos)
            .map(|cell| cell.value(self))
            .unwrap_or(CellValue::Empty)
    }

    /// `(max row + 1, max col + 1)` over occupied positions; `(0, 0)` when
    /// the sheet is empty.
    pub fn printable_size(&self) -> Size {
        let mut size = Size::default();
        for pos in &self.occupied {
            size.rows = size.rows.max(pos.row + 1);
            size.cols = size.cols.max(pos.col + 1);
        }
        size
    }

    /// Print computed values, tab-separated within rows, one row per line.
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |cell| cell.value(self).to_string())
    }

    /// Print cell texts in the same layout.
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |cell| cell.text())
    }

    fn print_with<W: Write>(
        &self,
        out: &mut W,
        render: impl Fn(&Cell) -> String,
    ) -> io::Result<()> {
        let size = self.printable_size();

        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                if let Some(cell) = self.cells.get(&Position::new(row, col)) {
                    out.write_all(render(cell).as_bytes())?;
                }
            }
            out.write_all(b"\n")?;
        }

        Ok(())
    }
}
