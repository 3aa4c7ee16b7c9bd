//! Read-only frames handed to renderers.

use std::time::Duration;

use courier_chase_core::{
    AgentId, AgentSnapshot, CellCoord, Direction, MotionState, TicksPerCell, TraversabilityMask,
};
use courier_chase_system_pursuit::PursuitOutcome;
use serde::{Deserialize, Serialize};

use crate::SessionMode;

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Active session mode.
    pub mode: SessionMode,
    /// Ticks processed since the session was created.
    pub tick: u64,
    /// Current traversability grid.
    pub grid: TraversabilityMask,
    /// Every agent in ascending identifier order.
    pub agents: Vec<AgentFrame>,
    /// Courier waypoints, empty without a plan.
    pub waypoints: Vec<CellCoord>,
    /// Total planned courier path length.
    pub path_length: usize,
    /// Courier cadence.
    pub courier_speed: TicksPerCell,
    /// Preset name of the courier cadence.
    pub speed_label: String,
    /// Simulated time of the current or last pursuit round.
    pub pursuit_elapsed: Duration,
    /// Result of the last pursuit round.
    pub outcome: Option<PursuitOutcome>,
}

/// Drawable state of a single agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentFrame {
    /// Agent identifier.
    pub agent: AgentId,
    /// Occupied cell.
    pub cell: CellCoord,
    /// Direction of the last move.
    pub facing: Direction,
    /// Heading of the last move in radians.
    pub heading_radians: f32,
    /// Remaining path cells.
    pub path: Vec<CellCoord>,
    /// Motion lifecycle state.
    pub state: MotionState,
}

impl From<AgentSnapshot> for AgentFrame {
    fn from(snapshot: AgentSnapshot) -> Self {
        Self {
            agent: snapshot.id,
            cell: snapshot.cell,
            facing: snapshot.facing,
            heading_radians: snapshot.heading_radians(),
            path: snapshot.path,
            state: snapshot.state,
        }
    }
}
