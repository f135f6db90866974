//! Scenario files.
//!
//! A scenario is a TOML file with an ASCII map:
//!
//! ```toml
//! connectivity = "eight"   # or "four"
//! sensor_radius = 1
//! max_steps = 500
//! map = """
//! S...#....
//! ..?.#....
//! ..?...#.G
//! """
//! ```
//!
//! Map glyphs: `.` free, `#` known obstacle, `?` hidden obstacle,
//! `S` start, `G` goal.

use crate::error::{AppError, Result};
use crate::world::{Cell, Connectivity, GridWorld};
use dlite_core::{DEFAULT_EPSILON, PlannerOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Maximum scenario file size (1 MB).
const MAX_SCENARIO_FILE_SIZE: u64 = 1024 * 1024;

fn default_sensor_radius() -> u32 {
    1
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

/// A parsed scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// ASCII map, one row per line.
    pub map: String,
    #[serde(default)]
    pub connectivity: Connectivity,
    /// Hidden obstacles within this Chebyshev distance become known.
    #[serde(default = "default_sensor_radius")]
    pub sensor_radius: u32,
    /// Abort after this many moves.
    #[serde(default)]
    pub max_steps: Option<usize>,
    /// Consistency tolerance for the planner.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl ScenarioConfig {
    /// Parse a scenario from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() > MAX_SCENARIO_FILE_SIZE {
            return Err(AppError::Config(format!(
                "Scenario file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_SCENARIO_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path)?;
        tracing::info!("Loaded scenario from {:?}", path);
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.sensor_radius == 0 {
            return Err(AppError::Config(
                "sensor_radius must be at least 1".to_string(),
            ));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(AppError::Config(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// Planner options for this scenario. The grid declares its own cost
    /// and heuristic.
    #[must_use]
    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions::new().with_epsilon(self.epsilon)
    }

    /// Build the world and locate start and goal.
    pub fn build(&self) -> Result<Scenario> {
        let rows: Vec<&str> = self
            .map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(AppError::Config("map is empty".to_string()));
        }

        let mut known = BTreeSet::new();
        let mut hidden = BTreeSet::new();
        let mut start = None;
        let mut goal = None;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(AppError::Config(format!(
                    "map row {} has {} cells, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell = Cell::new(x as u32, y as u32);
                match glyph {
                    '.' => {}
                    '#' => {
                        known.insert(cell);
                    }
                    '?' => {
                        hidden.insert(cell);
                    }
                    'S' if start.is_none() => start = Some(cell),
                    'G' if goal.is_none() => goal = Some(cell),
                    'S' | 'G' => {
                        return Err(AppError::Config(format!(
                            "map has more than one '{}'",
                            glyph
                        )));
                    }
                    other => {
                        return Err(AppError::Config(format!(
                            "unknown map glyph '{}' at {}",
                            other, cell
                        )));
                    }
                }
            }
        }

        let start = start.ok_or_else(|| AppError::Config("map has no 'S'".to_string()))?;
        let goal = goal.ok_or_else(|| AppError::Config("map has no 'G'".to_string()))?;
        let world = GridWorld::new(
            width as u32,
            height as u32,
            self.connectivity,
            self.sensor_radius,
            known,
            hidden,
            start,
        );

        Ok(Scenario {
            start: world.vertex(start),
            goal: world.vertex(goal),
            goal_cell: goal,
            world,
        })
    }
}

/// A world ready to plan over.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub world: GridWorld,
    pub start: dlite_core::VertexId,
    pub goal: dlite_core::VertexId,
    pub goal_cell: Cell,
}

// =============================================================================
// TESTS
// =============================================================================
