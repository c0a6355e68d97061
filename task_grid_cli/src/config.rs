//! Configuration loading for the task grid runner

use std::path::{Path, PathBuf};

use serde::Deserialize;
use task_grid_core::{Algorithm, Cell, search::GoalClaim};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TaskGridConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Layout of the world
#[derive(Clone, Debug, Deserialize)]
pub struct GridConfig {
    /// Columns (default: 20)
    #[serde(default = "default_width")]
    pub width: usize,

    /// Rows (default: 15)
    #[serde(default = "default_height")]
    pub height: usize,

    /// Tasks to place when generating a layout (default: 5)
    #[serde(default = "default_tasks")]
    pub tasks: usize,

    /// Barriers to place when generating a layout (default: 15)
    #[serde(default = "default_barriers")]
    pub barriers: usize,

    /// Seed for layout generation; random when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Text map to load instead of generating a layout
    #[serde(default)]
    pub map: Option<PathBuf>,
}

/// Agent settings
#[derive(Clone, Debug, Deserialize)]
pub struct AgentConfig {
    /// Start cell (default: top-left corner)
    #[serde(default = "default_start")]
    pub start: Cell,

    /// Search strategy (default: a_star)
    #[serde(default)]
    pub algorithm: Algorithm,

    /// When tasks count as collected (default: at_discovery)
    #[serde(default)]
    pub goal_claim: GoalClaim,
}

/// Episode limits
#[derive(Clone, Debug, Deserialize)]
pub struct RunConfig {
    /// Upper bound on agent cycles per episode (default: 10000)
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            tasks: default_tasks(),
            barriers: default_barriers(),
            seed: None,
            map: None,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            algorithm: Algorithm::default(),
            goal_claim: GoalClaim::default(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
        }
    }
}

// Default value functions
fn default_width() -> usize {
    20
}
fn default_height() -> usize {
    15
}
fn default_tasks() -> usize {
    5
}
fn default_barriers() -> usize {
    15
}
fn default_start() -> Cell {
    Cell::new(0, 0)
}
fn default_max_ticks() -> usize {
    10_000
}

impl TaskGridConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
