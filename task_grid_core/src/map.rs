use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::Cell;

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Cell {cell} is out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        cell: Cell,
        width: usize,
        height: usize,
    },
}

/// A generic 2D grid structure.
///
/// Stores elements of type `T` in a flat vector using row-major order and
/// addresses them by [`Cell`]. Cells with negative or too-large coordinates are
/// simply outside the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a new grid with the specified dimensions, filled with default values.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self
    where
        T: Default + Clone,
    {
        let size = width.checked_mul(height).expect("Grid size overflow");
        Grid {
            width,
            height,
            cells: vec![T::default(); size],
        }
    }

    /// Returns the width of the grid.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the grid.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Converts a cell to a flat vector index.
    ///
    /// Returns `None` if the cell is out of bounds.
    #[inline]
    pub fn cell_to_index(&self, cell: Cell) -> Option<usize> {
        let x = usize::try_from(cell.column).ok()?;
        let y = usize::try_from(cell.row).ok()?;
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Converts a flat vector index back to a cell.
    #[inline]
    fn index_to_cell(width: usize, index: usize) -> Cell {
        // Dimensions are validated against i32 by the environment builder.
        Cell::new((index % width) as i32, (index / width) as i32)
    }

    /// Checks if the given cell is within the grid boundaries.
    #[inline]
    pub fn is_valid(&self, cell: Cell) -> bool {
        self.cell_to_index(cell).is_some()
    }

    /// Gets an immutable reference to the value at `cell`.
    ///
    /// Returns `None` if the cell is out of bounds.
    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.cells.get(self.cell_to_index(cell)?)
    }

    /// Sets the value at `cell`.
    ///
    /// Returns `Err(GridError::OutOfBounds)` if the cell is outside the grid.
    pub fn set(&mut self, cell: Cell, value: T) -> Result<(), GridError> {
        let index = self.cell_to_index(cell).ok_or(GridError::OutOfBounds {
            cell,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = value;
        Ok(())
    }

    /// Returns an iterator that yields `(Cell, &T)` in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Cell, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, value)| (Self::index_to_cell(width, index), value))
    }
}

impl<T> Index<Cell> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, cell: Cell) -> &Self::Output {
        match self.cell_to_index(cell) {
            Some(idx) => &self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                cell, self.width, self.height
            ),
        }
    }
}

impl<T> IndexMut<Cell> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, cell: Cell) -> &mut Self::Output {
        let width = self.width;
        let height = self.height;
        match self.cell_to_index(cell) {
            Some(idx) => &mut self.cells[idx],
            None => panic!(
                "Grid index {} out of bounds for grid size ({}, {})",
                cell, width, height
            ),
        }
    }
}
