use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Algorithm, Cell, Direction, TaskLabel,
    agent::{Agent, StepOutcome},
    environment::Environment,
    search::GoalClaim,
};

/// Discrete events a front-end feeds into a [`Simulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Begin stepping the agent on each tick.
    Start,
    /// Switch to the given algorithm and restart the episode.
    Select(Algorithm),
    /// Switch to the other algorithm and restart the episode.
    Toggle,
    /// Restore the initial layout and start cell, keeping the algorithm.
    Reset,
    /// Manual single-cell move.
    Move(Direction),
}

/// Latest figures recorded for one algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmResults {
    pub tasks_completed: usize,
    pub path_cost: usize,
}

/// Per-algorithm results, kept across restarts so both can be compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub ucs: AlgorithmResults,
    pub a_star: AlgorithmResults,
}

impl Scoreboard {
    pub fn get(&self, algorithm: Algorithm) -> AlgorithmResults {
        match algorithm {
            Algorithm::Ucs => self.ucs,
            Algorithm::AStar => self.a_star,
        }
    }

    fn record(&mut self, algorithm: Algorithm, results: AlgorithmResults) {
        match algorithm {
            Algorithm::Ucs => self.ucs = results,
            Algorithm::AStar => self.a_star = results,
        }
    }
}

/// How an episode driven by [`Simulation::run_to_completion`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    Completed,
    Blocked,
    TickLimit,
}

/// Snapshot of an episode for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub algorithm: Algorithm,
    pub goal_claim: GoalClaim,
    pub outcome: EpisodeOutcome,
    pub start: Cell,
    pub final_position: Cell,
    pub ticks: usize,
    pub steps_taken: usize,
    pub tasks_completed: usize,
    pub completed_tasks: Vec<TaskLabel>,
    pub remaining_tasks: usize,
}

/// One agent in one environment, plus the initial layout to restart from.
#[derive(Debug, Clone)]
pub struct Simulation {
    environment: Environment,
    initial: Environment,
    agent: Agent,
    start: Cell,
    running: bool,
    scoreboard: Scoreboard,
}

impl Simulation {
    pub fn new(
        environment: Environment,
        start: Cell,
        algorithm: Algorithm,
        goal_claim: GoalClaim,
    ) -> Self {
        Self {
            initial: environment.clone(),
            environment,
            agent: Agent::new(start, algorithm).with_goal_claim(goal_claim),
            start,
            running: false,
            scoreboard: Scoreboard::default(),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn handle(&mut self, command: Command) {
        debug!(?command, "handling command");
        match command {
            Command::Start => {
                if !self.running {
                    info!(algorithm = %self.agent.algorithm(), "episode started");
                }
                self.running = true;
            }
            Command::Select(algorithm) => self.switch_to(algorithm),
            Command::Toggle => self.switch_to(self.agent.algorithm().toggled()),
            Command::Reset => {
                self.restart();
                self.running = false;
            }
            Command::Move(direction) => {
                self.agent.move_in(direction, &self.environment);
            }
        }
    }

    fn switch_to(&mut self, algorithm: Algorithm) {
        self.agent.set_algorithm(algorithm);
        self.restart();
        self.running = false;
    }

    fn restart(&mut self) {
        self.environment = self.initial.clone();
        self.agent.reset(self.start);
    }

    /// Advances the agent by one cycle while the episode is running.
    ///
    /// Returns `None` when the episode is not running. The episode stops by
    /// itself once no tasks remain or the agent is blocked.
    pub fn tick(&mut self) -> Option<StepOutcome> {
        if !self.running {
            return None;
        }

        let outcome = self.agent.advance(&mut self.environment);
        self.scoreboard.record(
            self.agent.algorithm(),
            AlgorithmResults {
                tasks_completed: self.agent.tasks_completed(),
                path_cost: self.agent.steps_taken(),
            },
        );

        let finished = matches!(outcome, StepOutcome::Done | StepOutcome::Blocked)
            || self.environment.remaining_goals() == 0;
        if finished {
            self.running = false;
            info!(
                algorithm = %self.agent.algorithm(),
                tasks_completed = self.agent.tasks_completed(),
                path_cost = self.agent.steps_taken(),
                remaining = self.environment.remaining_goals(),
                "episode finished"
            );
        }
        Some(outcome)
    }

    /// Starts the episode if needed and ticks until it stops or `max_ticks`
    /// cycles have run.
    pub fn run_to_completion(&mut self, max_ticks: usize) -> EpisodeSummary {
        self.handle(Command::Start);

        let mut ticks = 0;
        let mut blocked = false;
        while ticks < max_ticks {
            let Some(outcome) = self.tick() else {
                break;
            };
            ticks += 1;
            if outcome == StepOutcome::Blocked {
                blocked = true;
            }
        }

        let outcome = if self.environment.remaining_goals() == 0 {
            EpisodeOutcome::Completed
        } else if blocked {
            EpisodeOutcome::Blocked
        } else {
            EpisodeOutcome::TickLimit
        };
        self.running = false;

        EpisodeSummary {
            algorithm: self.agent.algorithm(),
            goal_claim: self.agent.goal_claim(),
            outcome,
            start: self.start,
            final_position: self.agent.position(),
            ticks,
            steps_taken: self.agent.steps_taken(),
            tasks_completed: self.agent.tasks_completed(),
            completed_tasks: self.agent.completed_tasks().to_vec(),
            remaining_tasks: self.environment.remaining_goals(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation(algorithm: Algorithm) -> Simulation {
        let environment = Environment::new(
            4,
            4,
            [Cell::new(1, 1)],
            [(Cell::new(3, 0), 1), (Cell::new(0, 3), 2)],
        )
        .unwrap();
        Simulation::new(environment, Cell::new(0, 0), algorithm, GoalClaim::OnArrival)
    }

    #[test]
    fn ticks_do_nothing_until_started() {
        let mut sim = simulation(Algorithm::AStar);
        assert_eq!(sim.tick(), None);
        assert_eq!(sim.agent().position(), Cell::new(0, 0));

        sim.handle(Command::Start);
        assert!(sim.is_running());
        assert!(matches!(sim.tick(), Some(StepOutcome::Moved { .. })));
    }

    #[test]
    fn episode_stops_when_all_tasks_are_collected() {
        let mut sim = simulation(Algorithm::Ucs);
        let summary = sim.run_to_completion(100);

        assert_eq!(summary.outcome, EpisodeOutcome::Completed);
        assert_eq!(summary.tasks_completed, 2);
        assert_eq!(summary.remaining_tasks, 0);
        assert!(!sim.is_running());
        assert_eq!(
            sim.scoreboard().ucs,
            AlgorithmResults {
                tasks_completed: 2,
                path_cost: summary.steps_taken
            }
        );
        assert_eq!(sim.scoreboard().a_star, AlgorithmResults::default());
        assert_eq!(sim.scoreboard().get(Algorithm::Ucs), sim.scoreboard().ucs);
    }

    #[test]
    fn toggle_restores_layout_and_switches_algorithm() {
        let mut sim = simulation(Algorithm::AStar);
        sim.run_to_completion(100);
        let a_star = sim.scoreboard().a_star;

        sim.handle(Command::Toggle);
        assert_eq!(sim.agent().algorithm(), Algorithm::Ucs);
        assert!(!sim.is_running());
        assert_eq!(sim.environment().remaining_goals(), 2);
        assert_eq!(sim.agent().position(), sim.start());
        assert_eq!(sim.agent().steps_taken(), 0);
        assert_eq!(sim.scoreboard().a_star, a_star);
    }

    #[test]
    fn reset_keeps_algorithm() {
        let mut sim = simulation(Algorithm::Ucs);
        sim.handle(Command::Start);
        sim.tick();
        sim.handle(Command::Reset);
        assert_eq!(sim.agent().algorithm(), Algorithm::Ucs);
        assert_eq!(sim.agent().position(), Cell::new(0, 0));
        assert!(!sim.is_running());

        sim.handle(Command::Select(Algorithm::AStar));
        assert_eq!(sim.agent().algorithm(), Algorithm::AStar);
    }

    #[test]
    fn manual_moves_pass_through_to_the_agent() {
        let mut sim = simulation(Algorithm::AStar);
        sim.handle(Command::Move(Direction::Right));
        sim.handle(Command::Move(Direction::Down));
        assert_eq!(sim.agent().position(), Cell::new(1, 0));
    }

    #[test]
    fn tick_limit_is_reported() {
        let mut sim = simulation(Algorithm::AStar);
        let summary = sim.run_to_completion(2);
        assert_eq!(summary.outcome, EpisodeOutcome::TickLimit);
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.steps_taken, 2);
    }
}
