//! Cell-stepped agent motion.

use std::collections::VecDeque;

use courier_chase_core::{
    AgentId, AgentSnapshot, CellCoord, Direction, GridView, MotionEvent, MotionState, Path,
    PathError, TicksPerCell,
};

#[derive(Clone, Debug)]
pub(crate) struct Agent {
    id: AgentId,
    cell: CellCoord,
    facing: Direction,
    path: VecDeque<CellCoord>,
    speed: TicksPerCell,
    counter: u32,
    enabled: bool,
    paused: bool,
    blocked_at: Option<CellCoord>,
}

impl Agent {
    pub(crate) fn new(id: AgentId, cell: CellCoord, speed: TicksPerCell) -> Self {
        Self {
            id,
            cell,
            facing: Direction::East,
            path: VecDeque::new(),
            speed,
            counter: 0,
            enabled: false,
            paused: false,
            blocked_at: None,
        }
    }

    pub(crate) fn id(&self) -> AgentId {
        self.id
    }

    pub(crate) fn state(&self) -> MotionState {
        if self.blocked_at.is_some() {
            MotionState::Blocked
        } else if self.path.is_empty() {
            MotionState::Idle
        } else if self.enabled {
            MotionState::Moving
        } else if self.paused {
            MotionState::Paused
        } else {
            MotionState::Idle
        }
    }

    /// Replaces the remaining path after checking that it is a connected walk
    /// starting next to the agent. Traversability is checked when moving.
    pub(crate) fn assign_path(
        &mut self,
        path: Path,
        columns: u32,
        rows: u32,
    ) -> Result<usize, PathError> {
        let mut previous = self.cell;
        for (index, cell) in path.cells().iter().copied().enumerate() {
            if cell.column() >= columns || cell.row() >= rows {
                return Err(PathError::OutOfBounds { cell });
            }
            if Direction::between(previous, cell).is_none() {
                return Err(PathError::Disconnected { index });
            }
            previous = cell;
        }

        if matches!(self.state(), MotionState::Idle | MotionState::Blocked) {
            self.counter = 0;
        }
        self.blocked_at = None;
        self.path = path.into_vec().into();
        if self.path.is_empty() {
            self.paused = false;
        }
        Ok(self.path.len())
    }

    /// Only an agent that was moving becomes Paused when motion is disabled.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.paused = if enabled {
            false
        } else {
            self.paused || self.state() == MotionState::Moving
        };
        self.enabled = enabled;
    }

    pub(crate) fn set_speed(&mut self, speed: TicksPerCell) {
        self.speed = speed;
    }

    /// Counts one tick and moves a single cell once the cadence is reached.
    pub(crate) fn advance(&mut self, grid: GridView<'_>) -> MotionEvent {
        if let Some(cell) = self.blocked_at {
            return MotionEvent::Halted { cell };
        }
        let Some(next) = self.path.front().copied() else {
            return MotionEvent::Idle;
        };
        if !self.enabled {
            return if self.paused {
                MotionEvent::Paused
            } else {
                MotionEvent::Idle
            };
        }

        self.counter = self.counter.saturating_add(1);
        if self.counter < self.speed.get() {
            return MotionEvent::Waiting {
                ticks: self.counter,
            };
        }
        self.counter = 0;

        let facing = match Direction::between(self.cell, next) {
            Some(facing) if grid.is_traversable(next) => facing,
            _ => {
                self.blocked_at = Some(next);
                return MotionEvent::Blocked { cell: next };
            }
        };

        let _ = self.path.pop_front();
        let from = self.cell;
        self.cell = next;
        self.facing = facing;
        MotionEvent::Moved {
            from,
            to: next,
            facing,
            remaining: self.path.len(),
        }
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            cell: self.cell,
            facing: self.facing,
            path: self.path.iter().copied().collect(),
            speed: self.speed,
            ticks_accumulated: self.counter,
            state: self.state(),
        }
    }
}
