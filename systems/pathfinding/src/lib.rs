#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shortest path search over the traversability grid.
//!
//! The planner runs A* with the Manhattan heuristic over 4-connected unit-cost
//! cells. Frontier entries carry a monotonically increasing sequence number so
//! that entries with equal estimates are expanded in insertion order, which
//! keeps the chosen route reproducible between runs.

use std::{cmp::Reverse, collections::BinaryHeap};

use courier_chase_core::{CellCoord, Direction, GridView, Path};

const UNREACHED: u32 = u32::MAX;
const NO_PREDECESSOR: usize = usize::MAX;

/// Reusable A* workspace.
///
/// Scratch buffers are sized to the grid on every call and reused between
/// calls, so repeated replanning does not allocate once the buffers are warm.
/// No results are cached; each search is independent of the previous one.
#[derive(Debug, Default)]
pub struct PathPlanner {
    costs: Vec<u32>,
    came_from: Vec<usize>,
    frontier: BinaryHeap<Reverse<FrontierEntry>>,
    sequence: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    estimate: u32,
    sequence: u64,
    cost: u32,
    index: usize,
}

impl PathPlanner {
    /// Creates a planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a shortest 4-connected path from `start` to `goal`.
    ///
    /// The returned path excludes `start` and includes `goal`. It is empty when
    /// the two cells coincide, when either lies outside the grid, when the goal
    /// is blocked, or when no route exists.
    pub fn find_path(&mut self, start: CellCoord, goal: CellCoord, grid: GridView<'_>) -> Path {
        if start == goal || !grid.is_traversable(goal) {
            return Path::empty();
        }
        let (Some(start_index), Some(goal_index)) = (grid.index_of(start), grid.index_of(goal))
        else {
            return Path::empty();
        };

        let (columns, rows) = grid.dimensions();
        let Ok(area) = usize::try_from(u64::from(columns) * u64::from(rows)) else {
            return Path::empty();
        };
        self.reset(area);
        self.costs[start_index] = 0;
        self.push(start_index, 0, start.manhattan_distance(goal));

        while let Some(Reverse(entry)) = self.frontier.pop() {
            if entry.cost > self.costs[entry.index] {
                continue;
            }
            if entry.index == goal_index {
                return self.reconstruct(start_index, goal_index, grid);
            }
            let Some(cell) = grid.cell_at(entry.index) else {
                continue;
            };

            let tentative = entry.cost + 1;
            for direction in Direction::ALL {
                let Some(neighbor) = direction.step(cell) else {
                    continue;
                };
                if !grid.is_traversable(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = grid.index_of(neighbor) else {
                    continue;
                };
                if tentative < self.costs[neighbor_index] {
                    self.costs[neighbor_index] = tentative;
                    self.came_from[neighbor_index] = entry.index;
                    self.push(
                        neighbor_index,
                        tentative,
                        tentative + neighbor.manhattan_distance(goal),
                    );
                }
            }
        }

        Path::empty()
    }

    fn reset(&mut self, cell_count: usize) {
        self.costs.clear();
        self.costs.resize(cell_count, UNREACHED);
        self.came_from.clear();
        self.came_from.resize(cell_count, NO_PREDECESSOR);
        self.frontier.clear();
        self.sequence = 0;
    }

    fn push(&mut self, index: usize, cost: u32, estimate: u32) {
        self.frontier.push(Reverse(FrontierEntry {
            estimate,
            sequence: self.sequence,
            cost,
            index,
        }));
        self.sequence += 1;
    }

    fn reconstruct(&self, start_index: usize, goal_index: usize, grid: GridView<'_>) -> Path {
        let mut cells = Vec::new();
        let mut current = goal_index;
        while current != start_index {
            match grid.cell_at(current) {
                Some(cell) => cells.push(cell),
                None => return Path::empty(),
            }
            current = self.came_from[current];
            if current == NO_PREDECESSOR {
                return Path::empty();
            }
        }
        cells.reverse();
        Path::new(cells)
    }
}

/// Finds a shortest path with a freshly allocated planner.
///
/// Callers that search repeatedly should keep a [`PathPlanner`] instead.
#[must_use]
pub fn find_path(start: CellCoord, goal: CellCoord, grid: GridView<'_>) -> Path {
    PathPlanner::new().find_path(start, goal, grid)
}
