use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    Algorithm, Cell, Direction, TaskLabel,
    environment::Environment,
    search::{self, GoalClaim, Route, SearchError},
    tracker::CompletionTracker,
};

/// Where the agent is in its plan-and-follow cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentPhase {
    /// No path in hand; the next cycle plans one.
    Idle,
    FollowingPath,
    /// No tasks remain.
    Done,
}

/// What a single [`Agent::advance`] cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved {
        to: Cell,
        completed: Option<TaskLabel>,
    },
    /// A plan was made but required no movement (the agent stood on the task).
    Stationary,
    /// Tasks remain but none could be reached.
    Blocked,
    Done,
}

/// A planning agent that walks to tasks one search at a time.
///
/// The agent only calls the search engine when it has used up its current
/// path. Switching algorithm throws the path away so the next cycle replans.
#[derive(Debug, Clone)]
pub struct Agent {
    position: Cell,
    algorithm: Algorithm,
    goal_claim: GoalClaim,
    current_plan: VecDeque<Cell>, // Queue of cells to visit
    steps_taken: usize,
    tracker: CompletionTracker,
}

impl Agent {
    pub fn new(position: Cell, algorithm: Algorithm) -> Self {
        Self {
            position,
            algorithm,
            goal_claim: GoalClaim::default(),
            current_plan: VecDeque::new(),
            steps_taken: 0,
            tracker: CompletionTracker::new(),
        }
    }

    pub fn with_goal_claim(mut self, goal_claim: GoalClaim) -> Self {
        self.goal_claim = goal_claim;
        self
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn goal_claim(&self) -> GoalClaim {
        self.goal_claim
    }

    /// Cells moved so far; every step costs one.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn tasks_completed(&self) -> usize {
        self.tracker.tasks_completed()
    }

    pub fn completed_tasks(&self) -> &[TaskLabel] {
        self.tracker.completed_tasks()
    }

    /// Remaining cells of the path being followed.
    pub fn current_plan(&self) -> impl Iterator<Item = Cell> + '_ {
        self.current_plan.iter().copied()
    }

    pub fn phase(&self, environment: &Environment) -> AgentPhase {
        if environment.remaining_goals() == 0 {
            AgentPhase::Done
        } else if self.current_plan.is_empty() {
            AgentPhase::Idle
        } else {
            AgentPhase::FollowingPath
        }
    }

    /// Selects the search strategy and drops any path planned with the old one.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        if !self.current_plan.is_empty() {
            debug!(
                from = %self.algorithm,
                to = %algorithm,
                discarded = self.current_plan.len(),
                "discarding in-flight path"
            );
        }
        self.algorithm = algorithm;
        self.current_plan.clear();
    }

    /// Puts the agent back at `position` with no path and an empty log.
    pub fn reset(&mut self, position: Cell) {
        self.position = position;
        self.current_plan.clear();
        self.steps_taken = 0;
        self.tracker.clear();
    }

    /// Moves one cell in `direction` if the destination is in bounds and not
    /// a barrier. Returns whether the agent moved.
    ///
    /// No task bookkeeping happens here. A successful move invalidates the
    /// current path, which was planned from the old position.
    pub fn move_in(&mut self, direction: Direction, environment: &Environment) -> bool {
        let target = self.position.step(direction);
        if !environment.is_passable(target) {
            trace!(from = %self.position, ?direction, "move rejected");
            return false;
        }
        self.position = target;
        self.current_plan.clear();
        true
    }

    /// Collects the task under the agent, if any.
    pub fn check_task_completion(&mut self, environment: &mut Environment) -> Option<TaskLabel> {
        self.tracker.check(self.position, environment)
    }

    /// Plans a fresh path from the current position and stores it.
    ///
    /// Under [`GoalClaim::AtDiscovery`] the reached task is collected right
    /// away. On failure the stored path is left empty.
    pub fn request_path(&mut self, environment: &mut Environment) -> Result<Route, SearchError> {
        let result = match self.goal_claim {
            GoalClaim::AtDiscovery => {
                search::run(self.algorithm, self.position, environment, &mut self.tracker)
            }
            GoalClaim::OnArrival => search::find_route(self.algorithm, environment, self.position),
        };
        match &result {
            Ok(route) => self.current_plan = route.steps.iter().copied().collect(),
            Err(_) => self.current_plan.clear(),
        }
        result
    }

    /// Runs one cycle: plan if needed, then take at most one step.
    pub fn advance(&mut self, environment: &mut Environment) -> StepOutcome {
        if environment.remaining_goals() == 0 {
            return StepOutcome::Done;
        }

        if self.current_plan.is_empty() {
            match self.request_path(environment) {
                Ok(route) if route.steps.is_empty() => {
                    self.check_task_completion(environment);
                    return StepOutcome::Stationary;
                }
                Ok(_) => {}
                Err(SearchError::NoGoalsRemaining) => return StepOutcome::Done,
                Err(error @ SearchError::NoPathFound { .. }) => {
                    warn!(
                        algorithm = %self.algorithm,
                        remaining = environment.remaining_goals(),
                        %error,
                        "agent is blocked"
                    );
                    return StepOutcome::Blocked;
                }
            }
        }

        let Some(next) = self.current_plan.pop_front() else {
            return StepOutcome::Stationary;
        };
        self.position = next;
        self.steps_taken += 1;
        let completed = self.check_task_completion(environment);
        trace!(to = %next, steps = self.steps_taken, ?completed, "agent stepped");

        StepOutcome::Moved {
            to: next,
            completed,
        }
    }
}
