#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Courier Chase engine.
//!
//! This crate defines the message surface that connects the session, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views such as [`GridView`] and [`AgentView`], and respond exclusively with
//! new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod mask;

pub use mask::{MaskError, TraversabilityMask, BLOCKED_SYMBOL, OPEN_SYMBOL};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Atomically replaces the traversability grid with the provided mask.
    LoadGrid {
        /// Replacement mask; its dimensions must match the world grid.
        mask: TraversabilityMask,
    },
    /// Advances the simulation clock by one tick of the provided duration.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Creates the agent, or resets it in place, standing still on a cell.
    PlaceAgent {
        /// Identifier of the agent to place.
        agent: AgentId,
        /// Traversable cell the agent should occupy.
        cell: CellCoord,
        /// Number of ticks the agent waits between moves.
        speed: TicksPerCell,
    },
    /// Removes an agent from the world.
    RemoveAgent {
        /// Identifier of the agent to remove.
        agent: AgentId,
    },
    /// Replaces the agent's remaining path wholesale.
    SetAgentPath {
        /// Identifier of the agent receiving the path.
        agent: AgentId,
        /// Path starting next to the agent's current cell.
        path: Path,
    },
    /// Updates the number of ticks an agent waits between moves.
    SetAgentSpeed {
        /// Identifier of the agent to reconfigure.
        agent: AgentId,
        /// New movement cadence.
        speed: TicksPerCell,
    },
    /// Enables (resume) or disables (pause) an agent's motion.
    SetMotion {
        /// Identifier of the agent to toggle.
        agent: AgentId,
        /// Whether the agent may consume its path.
        enabled: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the traversability grid was replaced.
    GridReplaced {
        /// Number of traversable cells in the new grid.
        open_cells: usize,
    },
    /// Reports that a replacement mask was rejected and the grid is unchanged.
    GridRejected {
        /// Specific reason the mask was refused.
        reason: MaskError,
    },
    /// Confirms that an agent now stands on a cell with an empty path.
    AgentPlaced {
        /// Identifier of the placed agent.
        agent: AgentId,
        /// Cell the agent occupies.
        cell: CellCoord,
    },
    /// Reports that an agent placement request was rejected.
    AgentPlacementRejected {
        /// Identifier of the agent that was not placed.
        agent: AgentId,
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an agent left the world.
    AgentRemoved {
        /// Identifier of the removed agent.
        agent: AgentId,
    },
    /// Confirms that an agent accepted a new path.
    PathAssigned {
        /// Identifier of the agent that accepted the path.
        agent: AgentId,
        /// Number of cells queued in the path.
        length: usize,
    },
    /// Reports that a path was refused and the agent kept its previous path.
    PathRejected {
        /// Identifier of the agent that refused the path.
        agent: AgentId,
        /// Specific reason the path failed validation.
        reason: PathError,
    },
    /// Confirms that an agent moved between two 4-adjacent cells.
    AgentAdvanced {
        /// Identifier of the agent that moved.
        agent: AgentId,
        /// Cell the agent occupied before moving.
        from: CellCoord,
        /// Cell the agent occupies after moving.
        to: CellCoord,
        /// Direction of the move, which also defines the agent's heading.
        facing: Direction,
    },
    /// Announces that an agent consumed the final cell of its path.
    PathCompleted {
        /// Identifier of the agent that finished its path.
        agent: AgentId,
        /// Cell where the path ended.
        cell: CellCoord,
    },
    /// Announces that an agent halted because its next cell is no longer traversable.
    AgentBlocked {
        /// Identifier of the halted agent.
        agent: AgentId,
        /// Cell the agent failed to enter.
        cell: CellCoord,
    },
    /// Announces any transition of an agent's motion state.
    MotionStateChanged {
        /// Identifier of the agent whose state changed.
        agent: AgentId,
        /// State before the transition.
        from: MotionState,
        /// State after the transition.
        to: MotionState,
    },
}

/// Outcome of a single motion update for one agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionEvent {
    /// The agent has no path left to follow.
    Idle,
    /// The agent holds a path but its motion is disabled.
    Paused,
    /// The agent counted a tick but has not yet reached its cadence.
    Waiting {
        /// Ticks accumulated toward the next move.
        ticks: u32,
    },
    /// The agent stepped onto the next cell of its path.
    Moved {
        /// Cell the agent left.
        from: CellCoord,
        /// Cell the agent entered.
        to: CellCoord,
        /// Direction of the step.
        facing: Direction,
        /// Cells still queued after the move.
        remaining: usize,
    },
    /// The agent found its next cell blocked and stopped.
    Blocked {
        /// Cell the agent failed to enter.
        cell: CellCoord,
    },
    /// The agent remains stopped in front of a blocked cell.
    Halted {
        /// Cell the agent failed to enter.
        cell: CellCoord,
    },
}

/// Motion lifecycle of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionState {
    /// No path queued.
    Idle,
    /// Consuming its path on every cadence boundary.
    Moving,
    /// Holding a path while motion is disabled.
    Paused,
    /// Stopped in front of a blocked cell until a fresh path arrives.
    Blocked,
}

/// Reasons an agent placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is blocked.
    NotTraversable,
}

/// Reasons a path may be refused by an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathError {
    /// The cell at `index` is not 4-adjacent to its predecessor (or to the agent for index 0).
    Disconnected {
        /// Zero-based position of the offending cell within the path.
        index: usize,
    },
    /// The path leaves the grid.
    OutOfBounds {
        /// First cell found outside the grid.
        cell: CellCoord,
    },
}

/// Conditions that prevent a requested setup from being satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum ConfigurationError {
    /// The grid holds no traversable cell to place anything on.
    #[error("no traversable cell exists on the grid")]
    NoTraversableCell,
    /// No seeker/hider pair satisfied the minimum separation.
    #[error("no seeker/hider pair at least {min_separation} cells apart after {attempts} attempts")]
    SeparationUnsatisfiable {
        /// Required Manhattan distance between the two agents.
        min_separation: u32,
        /// Number of pairs drawn before giving up.
        attempts: u32,
    },
    /// No set of waypoints produced a fully routable courier plan.
    #[error("no routable courier plan found after {attempts} attempts")]
    NoRoutablePlan {
        /// Number of waypoint sets drawn before giving up.
        attempts: u32,
    },
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Offsets the cell by signed deltas, returning `None` when a coordinate
    /// would leave the unsigned range. Upper grid bounds are not checked.
    #[must_use]
    pub fn offset(self, column_delta: i32, row_delta: i32) -> Option<CellCoord> {
        Some(Self::new(
            self.column.checked_add_signed(column_delta)?,
            self.row.checked_add_signed(row_delta)?,
        ))
    }
}

/// Cardinal movement directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in neighbour expansion order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction of a single 4-adjacent step, `None` for any other pair.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());
        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Self::East)
            } else {
                Some(Self::West)
            }
        } else if to.row() > from.row() {
            Some(Self::South)
        } else {
            Some(Self::North)
        }
    }

    /// Column and row delta of a step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Neighbouring cell in this direction, `None` when it would underflow.
    #[must_use]
    pub fn step(self, cell: CellCoord) -> Option<CellCoord> {
        let (column_delta, row_delta) = self.delta();
        cell.offset(column_delta, row_delta)
    }

    /// Heading in radians, `atan2(dy, dx)` with rows growing downward.
    ///
    /// East is `0`, South `π/2`, West `π` and North `-π/2`.
    #[must_use]
    pub fn heading_radians(self) -> f32 {
        let (column_delta, row_delta) = self.delta();
        (row_delta as f32).atan2(column_delta as f32)
    }
}

/// Ordered cells from an exclusive start to an inclusive goal.
///
/// An empty path signals either "no route" or "already at the goal".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Wraps the provided cells without validation.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Self { cells }
    }

    /// Creates the empty path.
    #[must_use]
    pub const fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    /// Reports whether the path holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of moves required to follow the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Cells of the path in travel order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Final cell of the path, if any.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    /// Consumes the path, yielding its cells.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellCoord> {
        self.cells
    }
}

impl FromIterator<CellCoord> for Path {
    fn from_iter<I: IntoIterator<Item = CellCoord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Slider stop used when no preset label applies.
pub const CUSTOM_SPEED_LABEL: &str = "Custom";

const SLIDER_MAX: u32 = 15;
const SPEED_PRESETS: [(u32, &str); 7] = [
    (1, "Very Slow"),
    (3, "Slow"),
    (5, "Medium Slow"),
    (8, "Medium"),
    (10, "Fast"),
    (12, "Very Fast"),
    (15, "Extreme"),
];

/// Number of ticks an agent waits between consecutive cell moves.
///
/// Smaller values move faster. Zero is clamped to one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicksPerCell(u32);

impl TicksPerCell {
    /// Cadence used by the courier when nothing else is configured.
    pub const DEFAULT: Self = Self(8);

    /// Creates a cadence, clamping zero to a single tick.
    #[must_use]
    pub const fn new(ticks: u32) -> Self {
        if ticks == 0 {
            Self(1)
        } else {
            Self(ticks)
        }
    }

    /// Maps a speed slider position in `1..=15` to a cadence of `16 - value`.
    ///
    /// Out-of-range positions are clamped to the slider ends.
    #[must_use]
    pub fn from_slider(value: u32) -> Self {
        let value = value.clamp(1, SLIDER_MAX);
        Self::new(SLIDER_MAX + 1 - value)
    }

    /// Slider position matching this cadence, saturating for very slow cadences.
    #[must_use]
    pub fn slider_value(self) -> u32 {
        (SLIDER_MAX + 1).saturating_sub(self.0).max(1)
    }

    /// Human readable preset name of the slider position.
    #[must_use]
    pub fn preset_label(self) -> &'static str {
        let slider = self.slider_value();
        SPEED_PRESETS
            .iter()
            .find(|(value, _)| *value == slider && self.0 <= SLIDER_MAX)
            .map_or(CUSTOM_SPEED_LABEL, |(_, label)| *label)
    }

    /// Retrieves the number of ticks per move.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Default for TicksPerCell {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Read-only view into a dense traversability grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [bool],
    columns: u32,
    rows: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided row-major flags.
    #[must_use]
    pub fn new(cells: &'a [bool], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the cell lies inside the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is inside the grid and open. The bounds check
    /// happens before any indexing.
    #[must_use]
    pub fn is_traversable(&self, cell: CellCoord) -> bool {
        self.index_of(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Row-major index of an in-bounds cell.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at a row-major index.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cells.len() {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Iterator over every traversable cell in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + 'a {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, open)| **open)
            .filter_map(move |(index, _)| {
                let width = usize::try_from(columns).ok()?;
                Some(CellCoord::new(
                    u32::try_from(index % width).ok()?,
                    u32::try_from(index / width).ok()?,
                ))
            })
    }

    /// Number of traversable cells.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|open| **open).count()
    }
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Grid cell currently occupied by the agent.
    pub cell: CellCoord,
    /// Direction of the agent's last move, east before the first move.
    pub facing: Direction,
    /// Cells still queued in the agent's path.
    pub path: Vec<CellCoord>,
    /// Number of ticks the agent waits between moves.
    pub speed: TicksPerCell,
    /// Ticks accumulated toward the next move.
    pub ticks_accumulated: u32,
    /// Motion lifecycle state.
    pub state: MotionState,
}

impl AgentSnapshot {
    /// Heading of the agent in radians, derived from its last move.
    #[must_use]
    pub fn heading_radians(&self) -> f32 {
        self.facing.heading_radians()
    }
}

/// Read-only snapshot describing all agents in the world.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the agent with the provided identifier.
    #[must_use]
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.snapshots
            .binary_search_by_key(&agent, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn offset_rejects_underflow() {
        let cell = CellCoord::new(1, 0);
        assert_eq!(cell.offset(-1, 2), Some(CellCoord::new(0, 2)));
        assert_eq!(cell.offset(0, -1), None);
        assert_eq!(cell.offset(-2, 0), None);
    }

    #[test]
    fn direction_between_neighbors() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(
            Direction::between(origin, CellCoord::new(3, 2)),
            Some(Direction::North)
        );
        assert_eq!(
            Direction::between(origin, CellCoord::new(4, 3)),
            Some(Direction::East)
        );
        assert_eq!(
            Direction::between(origin, CellCoord::new(3, 4)),
            Some(Direction::South)
        );
        assert_eq!(
            Direction::between(origin, CellCoord::new(2, 3)),
            Some(Direction::West)
        );
        assert_eq!(Direction::between(origin, origin), None);
        assert_eq!(Direction::between(origin, CellCoord::new(4, 4)), None);
    }

    #[test]
    fn heading_matches_atan2_of_step_delta() {
        assert!(Direction::East.heading_radians().abs() < f32::EPSILON);
        assert!((Direction::South.heading_radians() - FRAC_PI_2).abs() < 1e-6);
        assert!((Direction::West.heading_radians() - PI).abs() < 1e-6);
        assert!((Direction::North.heading_radians() + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn ticks_per_cell_clamps_zero() {
        assert_eq!(TicksPerCell::new(0).get(), 1);
        assert_eq!(TicksPerCell::new(7).get(), 7);
    }

    #[test]
    fn slider_maps_to_inverse_cadence() {
        assert_eq!(TicksPerCell::from_slider(8), TicksPerCell::new(8));
        assert_eq!(TicksPerCell::from_slider(15).get(), 1);
        assert_eq!(TicksPerCell::from_slider(1).get(), 15);
        assert_eq!(TicksPerCell::from_slider(40).get(), 1);
        assert_eq!(TicksPerCell::from_slider(0).get(), 15);
    }

    #[test]
    fn preset_labels_follow_slider_stops() {
        assert_eq!(TicksPerCell::from_slider(1).preset_label(), "Very Slow");
        assert_eq!(TicksPerCell::from_slider(8).preset_label(), "Medium");
        assert_eq!(TicksPerCell::from_slider(15).preset_label(), "Extreme");
        assert_eq!(TicksPerCell::from_slider(2).preset_label(), CUSTOM_SPEED_LABEL);
        assert_eq!(TicksPerCell::new(40).preset_label(), CUSTOM_SPEED_LABEL);
    }

    #[test]
    fn grid_view_checks_bounds_before_indexing() {
        let cells = [true, false, true, true];
        let view = GridView::new(&cells, 2, 2);
        assert!(view.is_traversable(CellCoord::new(0, 0)));
        assert!(!view.is_traversable(CellCoord::new(1, 0)));
        assert!(!view.is_traversable(CellCoord::new(2, 0)));
        assert!(!view.is_traversable(CellCoord::new(0, 2)));
        assert_eq!(view.index_of(CellCoord::new(1, 1)), Some(3));
        assert_eq!(view.cell_at(2), Some(CellCoord::new(0, 1)));
        assert_eq!(view.cell_at(4), None);
    }

    #[test]
    fn open_cells_enumerate_in_row_major_order() {
        let cells = [false, true, true, false, false, true];
        let view = GridView::new(&cells, 3, 2);
        let open: Vec<_> = view.open_cells().collect();
        assert_eq!(
            open,
            vec![
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(2, 1)
            ]
        );
        assert_eq!(view.open_count(), 3);
    }

    #[test]
    fn agent_view_looks_up_by_id() {
        let snapshot = |id: u32, column: u32| AgentSnapshot {
            id: AgentId::new(id),
            cell: CellCoord::new(column, 0),
            facing: Direction::East,
            path: Vec::new(),
            speed: TicksPerCell::DEFAULT,
            ticks_accumulated: 0,
            state: MotionState::Idle,
        };
        let view = AgentView::from_snapshots(vec![snapshot(2, 5), snapshot(0, 1)]);
        assert_eq!(
            view.get(AgentId::new(2)).map(|agent| agent.cell),
            Some(CellCoord::new(5, 0))
        );
        assert!(view.get(AgentId::new(1)).is_none());
        let ids: Vec<_> = view.iter().map(|agent| agent.id.get()).collect();
        assert_eq!(ids, vec![0, 2]);
    }
}
