mod config;

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::TaskGridConfig;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use task_grid_core::{
    Algorithm, Cell,
    environment::Environment,
    search::GoalClaim,
    simulation::{Command, EpisodeSummary, Simulation},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "task_grid.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ./task_grid.toml when present)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Map file to load instead of generating a layout
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,

    /// Search algorithm to run
    #[arg(short, long, value_enum)]
    algorithm: Option<AlgorithmArg>,

    /// Seed for layout generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run both algorithms on the same layout
    #[arg(long)]
    compare: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Upper bound on agent cycles per episode
    #[arg(long)]
    max_ticks: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlgorithmArg {
    Ucs,
    #[value(alias = "a-star")]
    Astar,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Ucs => Algorithm::Ucs,
            AlgorithmArg::Astar => Algorithm::AStar,
        }
    }
}

/// The world every episode in a run starts from.
struct Layout {
    environment: Environment,
    start: Cell,
    seed: Option<u64>,
}

#[derive(Serialize)]
struct Report<'a> {
    width: usize,
    height: usize,
    seed: Option<u64>,
    tasks: usize,
    barriers: usize,
    episodes: &'a [EpisodeSummary],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("task_grid=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;

    // Command line flags win over the file
    if let Some(map) = args.map {
        config.grid.map = Some(map);
    }
    if let Some(seed) = args.seed {
        config.grid.seed = Some(seed);
    }
    if let Some(algorithm) = args.algorithm {
        config.agent.algorithm = algorithm.into();
    }
    if let Some(max_ticks) = args.max_ticks {
        config.run.max_ticks = max_ticks;
    }

    let layout = build_layout(&config)?;
    info!(
        width = layout.environment.width(),
        height = layout.environment.height(),
        tasks = layout.environment.remaining_goals(),
        start = %layout.start,
        "layout ready"
    );

    let algorithms = if args.compare {
        vec![Algorithm::Ucs, Algorithm::AStar]
    } else {
        vec![config.agent.algorithm]
    };

    let episodes = run_episodes(
        &layout,
        &algorithms,
        config.agent.goal_claim,
        config.run.max_ticks,
    );

    let report = Report {
        width: layout.environment.width(),
        height: layout.environment.height(),
        seed: layout.seed,
        tasks: layout.environment.remaining_goals(),
        barriers: layout.environment.barriers().count(),
        episodes: &episodes,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<TaskGridConfig> {
    match path {
        Some(path) => TaskGridConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            debug!(path = DEFAULT_CONFIG, "using default config file");
            Ok(TaskGridConfig::load(Path::new(DEFAULT_CONFIG))?)
        }
        None => Ok(TaskGridConfig::default()),
    }
}

fn build_layout(config: &TaskGridConfig) -> Result<Layout> {
    if let Some(map_file) = &config.grid.map {
        if !map_file.exists() {
            return Err(anyhow::anyhow!(
                "Map file does not exist: {}",
                map_file.display()
            ));
        }
        let file_string = std::fs::read_to_string(map_file)
            .with_context(|| format!("reading map {}", map_file.display()))?;
        let (environment, start) = Environment::from_map_str(&file_string)
            .with_context(|| format!("parsing map {}", map_file.display()))?;
        return Ok(Layout {
            environment,
            start,
            seed: None,
        });
    }

    let grid = &config.grid;
    let start = config.agent.start;
    let seed = grid.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let environment = Environment::generate(
        grid.width,
        grid.height,
        grid.tasks,
        grid.barriers,
        start,
        &mut rng,
    )?;
    if !environment.is_within_bounds(start) {
        anyhow::bail!(
            "start {start} lies outside the {}x{} grid",
            grid.width,
            grid.height
        );
    }
    Ok(Layout {
        environment,
        start,
        seed: Some(seed),
    })
}

/// Runs one episode per algorithm, each from the initial layout.
fn run_episodes(
    layout: &Layout,
    algorithms: &[Algorithm],
    goal_claim: GoalClaim,
    max_ticks: usize,
) -> Vec<EpisodeSummary> {
    let Some(&first) = algorithms.first() else {
        return Vec::new();
    };
    let mut simulation =
        Simulation::new(layout.environment.clone(), layout.start, first, goal_claim);
    algorithms
        .iter()
        .map(|&algorithm| {
            // Selecting restores the initial layout so every episode starts equal
            simulation.handle(Command::Select(algorithm));
            simulation.run_to_completion(max_ticks)
        })
        .collect()
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Layout {}x{}, {} tasks, {} barriers",
            self.width, self.height, self.tasks, self.barriers
        )?;
        if let Some(seed) = self.seed {
            write!(f, " (seed {seed})")?;
        }

        for episode in self.episodes {
            let labels = episode
                .completed_tasks
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(
                f,
                "\n{:>3}: {}/{} tasks [{}], path cost {}, {} ticks, ended {:?} at {}",
                episode.algorithm.to_string(),
                episode.tasks_completed,
                self.tasks,
                labels,
                episode.steps_taken,
                episode.ticks,
                episode.outcome,
                episode.final_position,
            )?;
        }
        Ok(())
    }
}
