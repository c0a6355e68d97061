use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Cell, TaskLabel, environment::Environment};

/// Records which tasks an agent has collected, in collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTracker {
    tasks_completed: usize,
    completed_tasks: Vec<TaskLabel>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the task at `cell`, if one is still there.
    ///
    /// Calling this again on a vacated cell does nothing, so both the search
    /// claim and the arrival check can run it for the same cell.
    pub fn check(&mut self, cell: Cell, environment: &mut Environment) -> Option<TaskLabel> {
        let label = environment.remove_goal(cell)?;
        self.tasks_completed += 1;
        self.completed_tasks.push(label);
        info!(
            task = label,
            %cell,
            remaining = environment.remaining_goals(),
            "task completed"
        );
        Some(label)
    }

    pub fn tasks_completed(&self) -> usize {
        self.tasks_completed
    }

    /// Labels in the order they were collected.
    pub fn completed_tasks(&self) -> &[TaskLabel] {
        &self.completed_tasks
    }

    pub fn clear(&mut self) {
        self.tasks_completed = 0;
        self.completed_tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_collects_task_and_logs_label() {
        let mut env = Environment::new(3, 3, [], [(Cell::new(1, 1), 4)]).unwrap();
        let mut tracker = CompletionTracker::new();

        assert_eq!(tracker.check(Cell::new(0, 0), &mut env), None);
        assert_eq!(tracker.tasks_completed(), 0);

        assert_eq!(tracker.check(Cell::new(1, 1), &mut env), Some(4));
        assert_eq!(tracker.tasks_completed(), 1);
        assert_eq!(tracker.completed_tasks(), &[4]);
        assert_eq!(env.remaining_goals(), 0);
    }

    #[test]
    fn second_check_on_vacated_cell_is_a_no_op() {
        let mut env =
            Environment::new(3, 3, [], [(Cell::new(2, 0), 1), (Cell::new(0, 2), 2)]).unwrap();
        let mut tracker = CompletionTracker::new();

        tracker.check(Cell::new(2, 0), &mut env);
        let env_after_first = env.clone();
        let tracker_after_first = tracker.clone();

        assert_eq!(tracker.check(Cell::new(2, 0), &mut env), None);
        assert_eq!(env, env_after_first);
        assert_eq!(tracker, tracker_after_first);
    }

    #[test]
    fn clear_resets_counter_and_log() {
        let mut env = Environment::new(2, 1, [], [(Cell::new(1, 0), 9)]).unwrap();
        let mut tracker = CompletionTracker::new();
        tracker.check(Cell::new(1, 0), &mut env);
        tracker.clear();
        assert_eq!(tracker, CompletionTracker::new());
    }
}
