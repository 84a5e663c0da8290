use std::collections::{HashMap, HashSet, VecDeque};

use gridcalc_core::Position;

/// Tracks reference edges between cells.
///
/// `p -> q` means "the cell at `p` references the cell at `q`". Both
/// directions are indexed; for every `q` in `dependencies[p]`, `p` is in
/// `dependents[q]`. The graph itself is a passive index; the sheet keeps it
/// acyclic by vetting every edit against the reverse closure.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Maps a cell to the cells it references (formula inputs)
    dependencies: HashMap<Position, HashSet<Position>>,

    /// Maps a cell to the cells that reference it (reverse lookup)
    dependents: HashMap<Position, HashSet<Position>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the out-edge set of a cell, maintaining the
    /// reverse index.
    pub fn set_dependencies(&mut self, cell: Position, deps: HashSet<Position>) {
        // Remove old reverse edges
        if let Some(old_deps) = self.dependencies.get(&cell) {
            for dep in old_deps {
                if let Some(dependents) = self.dependents.get_mut(dep) {
                    dependents.remove(&cell);
                }
            }
        }

        // Add new reverse edges
        for dep in &deps {
            self.dependents.entry(*dep).or_default().insert(cell);
        }

        if deps.is_empty() {
            self.dependencies.remove(&cell);
        } else {
            self.dependencies.insert(cell, deps);
        }
    }

    /// Drop the out-edges of a deleted cell. Incoming edges are untouched;
    /// they are owned by the referencing cells.
    pub fn remove_cell(&mut self, cell: Position) {
        self.set_dependencies(cell, HashSet::new());
    }

    /// Cells that directly reference the given cell
    pub fn direct_dependents(&self, cell: Position) -> Option<&HashSet<Position>> {
        self.dependents.get(&cell)
    }

    /// Cells the given cell directly references
    pub fn direct_dependencies(&self, cell: Position) -> Option<&HashSet<Position>> {
        self.dependencies.get(&cell)
    }

    /// Every cell whose value depends, directly or transitively, on the
    /// given cell. The cell itself is not included.
    pub fn transitive_dependents(&self, cell: Position) -> HashSet<Position> {
        let mut reached = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(cell);

        while let Some(current) = queue.pop_front() {
            if let Some(dependents) = self.dependents.get(&current) {
                for &dependent in dependents {
                    if reached.insert(dependent) {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        reached
    }
}
