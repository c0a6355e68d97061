//! Uniform-cost and A* search over an [`Environment`].
//!
//! Both searches share the same skeleton: a min-heap frontier whose ties are
//! broken by insertion order, a came-from map for path reconstruction, and
//! 4-connected expansion in [`Direction::ALL`] order. Given the same
//! environment and start cell they always return the same route.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap, hash_map::Entry},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    Algorithm, Cell, Direction, TaskLabel, environment::Environment, tracker::CompletionTracker,
};

/// Why a search produced no route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("no tasks remain")]
    NoGoalsRemaining,
    #[error("no remaining task is reachable from {start}")]
    NoPathFound { start: Cell },
}

/// When a task counts as collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalClaim {
    /// The search that finds a task collects it immediately.
    #[default]
    AtDiscovery,
    /// Tasks are collected only when the agent steps onto them.
    OnArrival,
}

/// A successful search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// The task cell the search reached.
    pub goal: Cell,
    pub label: TaskLabel,
    /// Cells after the start up to and including `goal`. Empty when the
    /// search started on the task.
    pub steps: Vec<Cell>,
    /// Number of cells popped from the frontier.
    pub expanded: usize,
}

impl Route {
    pub fn cost(&self) -> usize {
        self.steps.len()
    }
}

/// Frontier entry ordered by `(priority, sequence)`, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    priority: u32,
    sequence: u64,
    cost: u32,
    cell: Cell,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Stable min-priority queue: equal priorities pop in insertion order.
#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_sequence: u64,
}

impl Frontier {
    fn push(&mut self, cell: Cell, cost: u32, priority: u32) {
        self.heap.push(FrontierEntry {
            priority,
            sequence: self.next_sequence,
            cost,
            cell,
        });
        self.next_sequence += 1;
    }

    fn pop(&mut self) -> Option<(Cell, u32)> {
        self.heap.pop().map(|entry| (entry.cell, entry.cost))
    }
}

/// In-bounds, non-barrier neighbours in expansion order.
fn neighbors(environment: &Environment, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
    Direction::ALL
        .into_iter()
        .map(move |direction| cell.step(direction))
        .filter(move |next| environment.is_passable(*next))
}

/// Walks the came-from chain back to the root. The root itself is excluded.
fn reconstruct_path(came_from: &HashMap<Cell, Option<Cell>>, reached: Cell) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = reached;
    while let Some(Some(previous)) = came_from.get(&current) {
        path.push(current);
        current = *previous;
    }
    path.reverse();
    path
}

/// Uniform-cost search to whichever task is reached first.
///
/// No target is chosen up front: the first popped cell that still holds a
/// task ends the search.
pub fn uniform_cost(environment: &Environment, start: Cell) -> Result<Route, SearchError> {
    if environment.remaining_goals() == 0 {
        return Err(SearchError::NoGoalsRemaining);
    }

    let mut frontier = Frontier::default();
    let mut came_from: HashMap<Cell, Option<Cell>> = HashMap::new();
    let mut expanded = 0;

    frontier.push(start, 0, 0);
    came_from.insert(start, None);

    while let Some((current, cost)) = frontier.pop() {
        expanded += 1;

        if let Some(label) = environment.goal_label(current) {
            return Ok(Route {
                goal: current,
                label,
                steps: reconstruct_path(&came_from, current),
                expanded,
            });
        }

        for next in neighbors(environment, current) {
            if let Entry::Vacant(slot) = came_from.entry(next) {
                slot.insert(Some(current));
                frontier.push(next, cost + 1, cost + 1);
            }
        }
    }

    Err(SearchError::NoPathFound { start })
}

/// A* search to the task nearest `start` by manhattan distance.
///
/// Only that task ends the search, even if another task is passed on the way.
pub fn a_star(environment: &Environment, start: Cell) -> Result<Route, SearchError> {
    let target = environment
        .nearest_goal(start)
        .ok_or(SearchError::NoGoalsRemaining)?;
    let label = environment
        .goal_label(target)
        .ok_or(SearchError::NoGoalsRemaining)?;

    let mut frontier = Frontier::default();
    let mut came_from: HashMap<Cell, Option<Cell>> = HashMap::new();
    let mut cost_so_far: HashMap<Cell, u32> = HashMap::new();
    let mut expanded = 0;

    frontier.push(start, 0, start.manhattan_distance(target));
    came_from.insert(start, None);
    cost_so_far.insert(start, 0);

    while let Some((current, cost)) = frontier.pop() {
        // Skip entries superseded by a cheaper push of the same cell.
        if cost_so_far.get(&current).is_some_and(|&best| cost > best) {
            continue;
        }
        expanded += 1;

        if current == target {
            return Ok(Route {
                goal: current,
                label,
                steps: reconstruct_path(&came_from, current),
                expanded,
            });
        }

        for next in neighbors(environment, current) {
            let new_cost = cost + 1;
            if cost_so_far.get(&next).is_none_or(|&known| new_cost < known) {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, Some(current));
                frontier.push(next, new_cost, new_cost + next.manhattan_distance(target));
            }
        }
    }

    Err(SearchError::NoPathFound { start })
}

/// Runs `algorithm` without touching the environment.
pub fn find_route(
    algorithm: Algorithm,
    environment: &Environment,
    start: Cell,
) -> Result<Route, SearchError> {
    let result = match algorithm {
        Algorithm::Ucs => uniform_cost(environment, start),
        Algorithm::AStar => a_star(environment, start),
    };
    match &result {
        Ok(route) => debug!(
            %algorithm,
            %start,
            goal = %route.goal,
            cost = route.cost(),
            expanded = route.expanded,
            "route found"
        ),
        Err(error) => debug!(%algorithm, %start, %error, "search failed"),
    }
    result
}

/// Runs `algorithm` and claims the task it reaches.
///
/// The task is removed and logged as soon as the search finds it, before the
/// agent has taken a single step along the route. Arrival checks made later
/// on the same cell are then no-ops.
pub fn run(
    algorithm: Algorithm,
    start: Cell,
    environment: &mut Environment,
    tracker: &mut CompletionTracker,
) -> Result<Route, SearchError> {
    let route = find_route(algorithm, environment, start)?;
    tracker.check(route.goal, environment);
    Ok(route)
}
