//! Grid world mover.
//!
//! A rectangular occupancy grid where the agent only knows part of the map.
//! Obstacles are either known up front or hidden; hidden obstacles become
//! known once they fall within the sensor radius of the agent. Every newly
//! known obstacle turns the edges into and out of its cell infinitely
//! expensive, and those edges are reported to the planner as changed.
//!
//! Cell `(x, y)` is vertex `y * width + x`.

use dlite_core::{Changes, Edge, Mover, PlanningGraph, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::f64::consts::SQRT_2;

/// A grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance.
    #[must_use]
    pub fn chebyshev(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which neighbours a cell is connected to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Orthogonal moves only, Manhattan heuristic.
    Four,
    /// Orthogonal and diagonal moves, octile heuristic.
    #[default]
    Eight,
}

/// A grid world with partially known obstacles.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: u32,
    height: u32,
    connectivity: Connectivity,
    sensor_radius: u32,
    /// Obstacles that exist in the world.
    obstacles: BTreeSet<Cell>,
    /// Obstacles the agent knows about.
    known: BTreeSet<Cell>,
    agent: Cell,
    pending: BTreeSet<Edge>,
}

impl GridWorld {
    /// Create a world and sense from the agent's starting cell.
    ///
    /// Obstacles sensed here are part of the initial map, not changes.
    #[must_use]
    pub fn new(
        width: u32,
        height: u32,
        connectivity: Connectivity,
        sensor_radius: u32,
        known: BTreeSet<Cell>,
        hidden: BTreeSet<Cell>,
        agent: Cell,
    ) -> Self {
        let obstacles = known.union(&hidden).copied().collect();
        let mut world = Self {
            width,
            height,
            connectivity,
            sensor_radius,
            obstacles,
            known,
            agent,
            pending: BTreeSet::new(),
        };
        world.sense();
        world.pending.clear();
        world
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The cell the agent stands on.
    #[must_use]
    pub fn agent(&self) -> Cell {
        self.agent
    }

    /// Check if the agent knows `cell` is blocked.
    #[must_use]
    pub fn is_known_blocked(&self, cell: Cell) -> bool {
        self.known.contains(&cell)
    }

    /// Check if `cell` is blocked, known or not.
    #[must_use]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.obstacles.contains(&cell)
    }

    /// Vertex of an in-bounds cell.
    #[must_use]
    pub fn vertex(&self, cell: Cell) -> VertexId {
        VertexId(u64::from(cell.y) * u64::from(self.width) + u64::from(cell.x))
    }

    /// Cell of a vertex, if in bounds.
    #[must_use]
    pub fn cell(&self, vertex: VertexId) -> Option<Cell> {
        let width = u64::from(self.width);
        if width == 0 || vertex.value() >= width * u64::from(self.height) {
            return None;
        }
        Some(Cell::new(
            (vertex.value() % width) as u32,
            (vertex.value() / width) as u32,
        ))
    }

    /// Check if a cell lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    fn neighbours(&self, cell: Cell) -> Vec<Cell> {
        const ORTHOGONAL: [(i64, i64); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
        const DIAGONAL: [(i64, i64); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];

        let offsets: Vec<(i64, i64)> = match self.connectivity {
            Connectivity::Four => ORTHOGONAL.to_vec(),
            Connectivity::Eight => ORTHOGONAL.iter().chain(DIAGONAL.iter()).copied().collect(),
        };
        offsets
            .into_iter()
            .filter_map(|(dx, dy)| {
                let x = i64::from(cell.x) + dx;
                let y = i64::from(cell.y) + dy;
                let x = u32::try_from(x).ok()?;
                let y = u32::try_from(y).ok()?;
                let neighbour = Cell::new(x, y);
                self.in_bounds(neighbour).then_some(neighbour)
            })
            .collect()
    }

    /// Mark every hidden obstacle within the sensor radius as known.
    fn sense(&mut self) {
        let revealed: Vec<Cell> = self
            .obstacles
            .difference(&self.known)
            .copied()
            .filter(|cell| cell.chebyshev(self.agent) <= self.sensor_radius)
            .collect();

        for cell in revealed {
            tracing::debug!(%cell, agent = %self.agent, "obstacle sensed");
            self.known.insert(cell);
            let vertex = self.vertex(cell);
            for neighbour in self.neighbours(cell) {
                let other = self.vertex(neighbour);
                self.pending.insert(Edge::new(other, vertex));
                self.pending.insert(Edge::new(vertex, other));
            }
        }
    }

    /// Render the known map. `path` cells are drawn as `*`.
    #[must_use]
    pub fn render(&self, path: &[Cell], goal: Cell) -> String {
        let on_path: BTreeSet<Cell> = path.iter().copied().collect();
        let mut out = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                let glyph = if cell == self.agent {
                    'S'
                } else if cell == goal {
                    'G'
                } else if self.known.contains(&cell) {
                    '#'
                } else if self.obstacles.contains(&cell) {
                    '?'
                } else if on_path.contains(&cell) {
                    '*'
                } else {
                    '.'
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

impl PlanningGraph for GridWorld {
    fn vertices(&self) -> Vec<VertexId> {
        (0..u64::from(self.width) * u64::from(self.height))
            .map(VertexId)
            .collect()
    }

    fn successors(&self, vertex: VertexId) -> Vec<VertexId> {
        self.cell(vertex)
            .map(|cell| {
                self.neighbours(cell)
                    .into_iter()
                    .map(|n| self.vertex(n))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn predecessors(&self, vertex: VertexId) -> Vec<VertexId> {
        self.successors(vertex)
    }

    fn edge_cost(&self, from: VertexId, to: VertexId) -> f64 {
        let (Some(a), Some(b)) = (self.cell(from), self.cell(to)) else {
            return f64::INFINITY;
        };
        if self.known.contains(&a) || self.known.contains(&b) {
            return f64::INFINITY;
        }
        match (a.x.abs_diff(b.x), a.y.abs_diff(b.y)) {
            (0, 1) | (1, 0) => 1.0,
            (1, 1) => SQRT_2,
            _ => f64::INFINITY,
        }
    }

    fn heuristic(&self, from: VertexId, to: VertexId) -> f64 {
        let (Some(a), Some(b)) = (self.cell(from), self.cell(to)) else {
            return 0.0;
        };
        let dx = f64::from(a.x.abs_diff(b.x));
        let dy = f64::from(a.y.abs_diff(b.y));
        match self.connectivity {
            Connectivity::Four => dx + dy,
            Connectivity::Eight => dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy),
        }
    }
}

impl Mover for GridWorld {
    fn move_to(&mut self, vertex: VertexId) {
        if let Some(cell) = self.cell(vertex) {
            self.agent = cell;
            self.sense();
        }
    }

    fn changed_edges(&mut self) -> Changes {
        Changes::edges(std::mem::take(&mut self.pending).into_iter().collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================
