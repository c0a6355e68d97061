use task_grid_core::{
    Algorithm, Cell, TaskLabel,
    agent::Agent,
    environment::Environment,
    search::{self, SearchError},
    tracker::CompletionTracker,
};

const BOTH: [Algorithm; 2] = [Algorithm::Ucs, Algorithm::AStar];

fn layout(
    width: usize,
    height: usize,
    barriers: &[(i32, i32)],
    goals: &[(i32, i32, TaskLabel)],
) -> Environment {
    Environment::new(
        width,
        height,
        barriers.iter().map(|&(x, y)| Cell::new(x, y)),
        goals.iter().map(|&(x, y, label)| (Cell::new(x, y), label)),
    )
    .expect("valid layout")
}

#[test]
fn open_five_by_five_reaches_far_corner_in_eight_steps() {
    for algorithm in BOTH {
        let mut environment = layout(5, 5, &[], &[(4, 4, 1)]);
        let mut tracker = CompletionTracker::new();

        let route = search::run(algorithm, Cell::new(0, 0), &mut environment, &mut tracker)
            .expect("corner is reachable");

        assert_eq!(route.steps.len(), 8, "{algorithm} path length");
        assert_eq!(route.steps.last(), Some(&Cell::new(4, 4)));
        assert!(!environment.has_goal(Cell::new(4, 4)));
        assert_eq!(tracker.completed_tasks(), &[1]);
        assert_eq!(tracker.tasks_completed(), 1);
    }
}

#[test]
fn enclosed_task_yields_no_path_and_stays_in_place() {
    let walls = [(1, 2), (3, 2), (2, 1), (2, 3)];
    for algorithm in BOTH {
        let mut environment = layout(5, 5, &walls, &[(2, 2, 1)]);
        let mut tracker = CompletionTracker::new();

        let result = search::run(algorithm, Cell::new(0, 0), &mut environment, &mut tracker);
        assert_eq!(
            result,
            Err(SearchError::NoPathFound {
                start: Cell::new(0, 0)
            })
        );
        assert!(environment.has_goal(Cell::new(2, 2)));
        assert_eq!(tracker.tasks_completed(), 0);

        let mut agent = Agent::new(Cell::new(0, 0), algorithm);
        assert!(agent.request_path(&mut environment).is_err());
        assert_eq!(agent.current_plan().count(), 0);
        assert!(environment.has_goal(Cell::new(2, 2)));
    }
}

#[test]
fn a_star_picks_first_inserted_of_equidistant_tasks() {
    let environment = layout(5, 5, &[], &[(0, 2, 7), (2, 0, 3)]);
    let route = search::a_star(&environment, Cell::new(0, 0)).unwrap();
    assert_eq!(route.goal, Cell::new(0, 2));
    assert_eq!(route.label, 7);

    let environment = layout(5, 5, &[], &[(2, 0, 3), (0, 2, 7)]);
    let route = search::a_star(&environment, Cell::new(0, 0)).unwrap();
    assert_eq!(route.goal, Cell::new(2, 0));
    assert_eq!(route.label, 3);
}

#[test]
fn ucs_reaches_the_cheaper_of_equidistant_tasks() {
    // Both tasks are two cells away by manhattan distance, but the wall at
    // (1, 0) makes (2, 0) cost four moves.
    let environment = layout(5, 5, &[(1, 0)], &[(2, 0, 1), (0, 2, 2)]);

    let route = search::uniform_cost(&environment, Cell::new(0, 0)).unwrap();
    assert_eq!(route.goal, Cell::new(0, 2));
    assert_eq!(route.cost(), 2);

    // A* still commits to the first inserted task and reaches it optimally.
    let route = search::a_star(&environment, Cell::new(0, 0)).unwrap();
    assert_eq!(route.goal, Cell::new(2, 0));
    assert_eq!(route.cost(), 4);
}

#[test]
fn start_on_task_claims_it_without_moving() {
    for algorithm in BOTH {
        let mut environment = layout(3, 3, &[], &[(1, 1, 4), (2, 2, 5)]);
        let mut tracker = CompletionTracker::new();
        let route =
            search::run(algorithm, Cell::new(1, 1), &mut environment, &mut tracker).unwrap();
        assert!(route.steps.is_empty());
        assert_eq!(route.label, 4);
        assert_eq!(tracker.completed_tasks(), &[4]);
        assert_eq!(environment.remaining_goals(), 1);
    }
}

#[test]
fn empty_task_set_returns_immediately() {
    for algorithm in BOTH {
        let mut environment = layout(3, 3, &[], &[]);
        let mut tracker = CompletionTracker::new();
        assert_eq!(
            search::run(algorithm, Cell::new(0, 0), &mut environment, &mut tracker),
            Err(SearchError::NoGoalsRemaining)
        );
    }
}

#[test]
fn tracker_double_check_is_idempotent() {
    let mut environment = layout(4, 4, &[], &[(3, 3, 1), (0, 3, 2)]);
    let mut tracker = CompletionTracker::new();

    search::run(Algorithm::Ucs, Cell::new(0, 0), &mut environment, &mut tracker).unwrap();
    let goals_before: Vec<_> = environment.goals().collect();
    let log_before = tracker.completed_tasks().to_vec();

    // The arrival check on the claimed cell must change nothing.
    assert_eq!(tracker.check(Cell::new(0, 3), &mut environment), None);
    assert_eq!(tracker.check(Cell::new(0, 3), &mut environment), None);
    assert_eq!(environment.goals().collect::<Vec<_>>(), goals_before);
    assert_eq!(tracker.completed_tasks(), log_before.as_slice());
    assert_eq!(tracker.tasks_completed(), 1);
}
