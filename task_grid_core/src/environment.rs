use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    Cell, TaskLabel,
    error::{EnvironmentError, Result},
    map::{Grid, GridError},
};

/// Random placements tried per requested barrier or task before giving up.
const MAX_ATTEMPTS_PER_PLACEMENT: usize = 64;

/// Represents the static type of a cell in the environment grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Floor,
    Barrier,
}

/// The world an agent moves through: fixed barriers plus the tasks still
/// waiting to be collected.
///
/// Tasks are kept in insertion order. Removing one preserves the order of the
/// rest, which is what makes nearest-task tie-breaks reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    terrain: Grid<CellType>,
    goals: IndexMap<Cell, TaskLabel>,
}

impl Environment {
    /// Builds an environment from explicit barrier and task placements.
    ///
    /// Tasks are inserted in iteration order. A task on a barrier is rejected
    /// with [`EnvironmentError::ConstructionConflict`].
    pub fn new(
        width: usize,
        height: usize,
        barriers: impl IntoIterator<Item = Cell>,
        goals: impl IntoIterator<Item = (Cell, TaskLabel)>,
    ) -> Result<Self> {
        let mut environment = Self::empty(width, height)?;
        for cell in barriers {
            environment.terrain.set(cell, CellType::Barrier)?;
        }
        for (cell, label) in goals {
            environment.insert_goal(cell, label)?;
        }
        Ok(environment)
    }

    /// Creates an environment with no barriers and no tasks.
    pub fn empty(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EnvironmentError::EmptyGrid { width, height });
        }
        let addressable = i32::try_from(width).is_ok()
            && i32::try_from(height).is_ok()
            && width.checked_mul(height).is_some();
        if !addressable {
            return Err(EnvironmentError::TooLarge { width, height });
        }
        Ok(Environment {
            terrain: Grid::new(width, height),
            goals: IndexMap::new(),
        })
    }

    fn insert_goal(&mut self, cell: Cell, label: TaskLabel) -> Result<()> {
        match self.terrain.get(cell) {
            None => {
                return Err(GridError::OutOfBounds {
                    cell,
                    width: self.width(),
                    height: self.height(),
                }
                .into());
            }
            Some(CellType::Barrier) => {
                return Err(EnvironmentError::ConstructionConflict { cell });
            }
            Some(CellType::Floor) => {}
        }
        if let Some(&existing) = self.goals.get(&cell) {
            return Err(EnvironmentError::DuplicateGoal { cell, existing });
        }
        self.goals.insert(cell, label);
        Ok(())
    }

    /// Generates a random layout.
    ///
    /// Barriers are placed first, then tasks labelled `1..=tasks` in placement
    /// order. Nothing is placed on `reserved` (the agent's start). Counts that
    /// cannot fit the free cells are rejected up front. Collisions are
    /// resampled; if the attempt budget runs out the layout is rejected.
    pub fn generate<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        tasks: usize,
        barriers: usize,
        reserved: Cell,
        rng: &mut R,
    ) -> Result<Self> {
        let mut environment = Self::empty(width, height)?;
        // Both fit in i32, checked by `empty`.
        let (columns, rows) = (width as i32, height as i32);

        let free = width * height - usize::from(environment.is_within_bounds(reserved));
        let requested = barriers.saturating_add(tasks);
        if requested > free {
            warn!(free, requested, "layout does not fit the grid");
            return Err(EnvironmentError::LayoutExhausted {
                kind: "barriers and tasks",
                placed: free,
                requested,
            });
        }

        let mut placed = 0;
        let mut attempts = 0;
        while placed < barriers {
            if attempts >= barriers.saturating_mul(MAX_ATTEMPTS_PER_PLACEMENT) {
                warn!(placed, requested = barriers, "barrier placement exhausted");
                return Err(EnvironmentError::LayoutExhausted {
                    kind: "barriers",
                    placed,
                    requested: barriers,
                });
            }
            attempts += 1;
            let cell = random_cell(rng, columns, rows);
            if cell == reserved || environment.is_barrier(cell) {
                continue;
            }
            environment.terrain[cell] = CellType::Barrier;
            placed += 1;
        }

        attempts = 0;
        while environment.goals.len() < tasks {
            if attempts >= tasks.saturating_mul(MAX_ATTEMPTS_PER_PLACEMENT) {
                warn!(
                    placed = environment.goals.len(),
                    requested = tasks,
                    "task placement exhausted"
                );
                return Err(EnvironmentError::LayoutExhausted {
                    kind: "tasks",
                    placed: environment.goals.len(),
                    requested: tasks,
                });
            }
            attempts += 1;
            let cell = random_cell(rng, columns, rows);
            if cell == reserved || environment.is_barrier(cell) || environment.has_goal(cell) {
                continue;
            }
            let label = environment.goals.len() as TaskLabel + 1;
            environment.goals.insert(cell, label);
        }

        debug!(width, height, tasks, barriers, "generated layout");
        Ok(environment)
    }

    /// Loads an environment from a whitespace separated text map.
    ///
    /// Tokens: `ST` start (floor), `FL` floor, `WL` barrier, `T<n>` task with
    /// label `n`. Tasks are inserted in row-major order. Returns the
    /// environment and the start cell.
    pub fn from_map_str(map_string: &str) -> Result<(Self, Cell)> {
        let lines: Vec<&str> = map_string
            .trim()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect();
        if lines.is_empty() {
            return Err(EnvironmentError::InvalidMap("map is empty".to_string()));
        }

        let height = lines.len();
        let mut width = 0;
        let mut parsed_rows: Vec<Vec<&str>> = Vec::with_capacity(height);

        for (y, line) in lines.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if y == 0 {
                width = tokens.len();
            } else if tokens.len() != width {
                return Err(EnvironmentError::InvalidMap(format!(
                    "inconsistent width at row {}: expected {}, found {}",
                    y,
                    width,
                    tokens.len()
                )));
            }
            parsed_rows.push(tokens);
        }

        let mut environment = Self::empty(width, height)?;
        let mut start: Option<Cell> = None;

        for (y, row_tokens) in parsed_rows.iter().enumerate() {
            for (x, token) in row_tokens.iter().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                match *token {
                    "ST" => {
                        if start.is_some() {
                            return Err(EnvironmentError::InvalidMap(
                                "multiple start positions ('ST') found".to_string(),
                            ));
                        }
                        start = Some(cell);
                    }
                    "FL" => {}
                    "WL" => environment.terrain[cell] = CellType::Barrier,
                    other => {
                        let label = other
                            .strip_prefix('T')
                            .and_then(|digits| digits.parse::<TaskLabel>().ok())
                            .ok_or_else(|| {
                                EnvironmentError::InvalidMap(format!(
                                    "unknown map code '{}' at {}",
                                    other, cell
                                ))
                            })?;
                        environment.insert_goal(cell, label)?;
                    }
                }
            }
        }

        let start = start.ok_or_else(|| {
            EnvironmentError::InvalidMap("no start position ('ST') found".to_string())
        })?;
        Ok((environment, start))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.terrain.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.terrain.height()
    }

    pub fn is_within_bounds(&self, cell: Cell) -> bool {
        self.terrain.is_valid(cell)
    }

    /// Out-of-bounds cells are not barriers; check bounds separately.
    pub fn is_barrier(&self, cell: Cell) -> bool {
        matches!(self.terrain.get(cell), Some(CellType::Barrier))
    }

    /// In bounds and not a barrier.
    pub fn is_passable(&self, cell: Cell) -> bool {
        matches!(self.terrain.get(cell), Some(CellType::Floor))
    }

    /// The remaining task closest to `from` by manhattan distance.
    ///
    /// Ties go to the task that was inserted first.
    pub fn nearest_goal(&self, from: Cell) -> Option<Cell> {
        // `min_by_key` keeps the first of several equal minima.
        self.goals
            .keys()
            .copied()
            .min_by_key(|goal| from.manhattan_distance(*goal))
    }

    /// Removes the task at `cell`, returning its label.
    pub fn remove_goal(&mut self, cell: Cell) -> Option<TaskLabel> {
        self.goals.shift_remove(&cell)
    }

    pub fn goal_label(&self, cell: Cell) -> Option<TaskLabel> {
        self.goals.get(&cell).copied()
    }

    pub fn has_goal(&self, cell: Cell) -> bool {
        self.goals.contains_key(&cell)
    }

    /// Remaining tasks in insertion order.
    pub fn goals(&self) -> impl Iterator<Item = (Cell, TaskLabel)> + '_ {
        self.goals.iter().map(|(cell, label)| (*cell, *label))
    }

    pub fn remaining_goals(&self) -> usize {
        self.goals.len()
    }

    /// All barrier cells in row-major order.
    pub fn barriers(&self) -> impl Iterator<Item = Cell> + '_ {
        self.terrain
            .enumerate()
            .filter_map(|(cell, kind)| (*kind == CellType::Barrier).then_some(cell))
    }

    pub fn terrain(&self) -> &Grid<CellType> {
        &self.terrain
    }
}

fn random_cell<R: Rng + ?Sized>(rng: &mut R, columns: i32, rows: i32) -> Cell {
    Cell::new(rng.random_range(0..columns), rng.random_range(0..rows))
}
