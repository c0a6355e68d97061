//! Error types for building a task grid environment

use thiserror::Error;

use crate::{Cell, TaskLabel, map::GridError};

/// Reasons an environment layout can be rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("Grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("Grid dimensions {width}x{height} exceed the addressable range")]
    TooLarge { width: usize, height: usize },

    #[error(transparent)]
    OutOfBounds(#[from] GridError),

    #[error("Cell {cell} cannot be both a barrier and a task")]
    ConstructionConflict { cell: Cell },

    #[error("Cell {cell} already holds task {existing}")]
    DuplicateGoal { cell: Cell, existing: TaskLabel },

    #[error("Could only place {placed} of {requested} {kind} on the grid")]
    LayoutExhausted {
        kind: &'static str,
        placed: usize,
        requested: usize,
    },

    #[error("Invalid map: {0}")]
    InvalidMap(String),
}

pub type Result<T> = std::result::Result<T, EnvironmentError>;
