#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Courier Chase.

use courier_chase_core::{
    AgentId, CellCoord, Command, Event, MotionEvent, MotionState, PlacementError, TicksPerCell,
};

mod agent;
mod grid;

use agent::Agent;
pub use grid::GridMap;

/// Represents the authoritative Courier Chase world state.
#[derive(Debug)]
pub struct World {
    grid: GridMap,
    agents: Vec<Agent>,
    tick_index: u64,
}

impl World {
    /// Creates a world with a fully blocked grid of the provided dimensions.
    ///
    /// The dimensions stay fixed for the lifetime of the world; map loads only
    /// replace the traversability flags.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            grid: GridMap::blocked(columns, rows),
            agents: Vec::new(),
            tick_index: 0,
        }
    }

    fn agent_index(&self, agent: AgentId) -> Result<usize, usize> {
        self.agents.binary_search_by_key(&agent, Agent::id)
    }

    fn agent_mut(&mut self, agent: AgentId) -> Option<&mut Agent> {
        let index = self.agent_index(agent).ok()?;
        self.agents.get_mut(index)
    }

    fn place_agent(
        &mut self,
        agent: AgentId,
        cell: CellCoord,
        speed: TicksPerCell,
    ) -> Result<(), PlacementError> {
        if !self.grid.view().contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if !self.grid.is_traversable(cell) {
            return Err(PlacementError::NotTraversable);
        }

        let placed = Agent::new(agent, cell, speed);
        match self.agent_index(agent) {
            Ok(index) => self.agents[index] = placed,
            Err(index) => self.agents.insert(index, placed),
        }
        Ok(())
    }

    fn advance_agents(&mut self, out_events: &mut Vec<Event>) {
        let grid = self.grid.view();
        for agent in &mut self.agents {
            let before = agent.state();
            let id = agent.id();
            match agent.advance(grid) {
                MotionEvent::Moved {
                    from,
                    to,
                    facing,
                    remaining,
                } => {
                    out_events.push(Event::AgentAdvanced {
                        agent: id,
                        from,
                        to,
                        facing,
                    });
                    if remaining == 0 {
                        out_events.push(Event::PathCompleted {
                            agent: id,
                            cell: to,
                        });
                    }
                }
                MotionEvent::Blocked { cell } => {
                    out_events.push(Event::AgentBlocked { agent: id, cell });
                }
                MotionEvent::Idle
                | MotionEvent::Paused
                | MotionEvent::Waiting { .. }
                | MotionEvent::Halted { .. } => {}
            }
            push_state_change(id, before, agent.state(), out_events);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadGrid { mask } => match world.grid.set_from_mask(mask) {
            Ok(open_cells) => out_events.push(Event::GridReplaced { open_cells }),
            Err(reason) => out_events.push(Event::GridRejected { reason }),
        },
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_agents(out_events);
        }
        Command::PlaceAgent { agent, cell, speed } => {
            match world.place_agent(agent, cell, speed) {
                Ok(()) => out_events.push(Event::AgentPlaced { agent, cell }),
                Err(reason) => out_events.push(Event::AgentPlacementRejected {
                    agent,
                    cell,
                    reason,
                }),
            }
        }
        Command::RemoveAgent { agent } => {
            if let Ok(index) = world.agent_index(agent) {
                let _ = world.agents.remove(index);
                out_events.push(Event::AgentRemoved { agent });
            }
        }
        Command::SetAgentPath { agent, path } => {
            let (columns, rows) = world.grid.dimensions();
            if let Some(target) = world.agent_mut(agent) {
                let before = target.state();
                match target.assign_path(path, columns, rows) {
                    Ok(length) => {
                        out_events.push(Event::PathAssigned { agent, length });
                        push_state_change(agent, before, target.state(), out_events);
                    }
                    Err(reason) => out_events.push(Event::PathRejected { agent, reason }),
                }
            }
        }
        Command::SetAgentSpeed { agent, speed } => {
            if let Some(target) = world.agent_mut(agent) {
                target.set_speed(speed);
            }
        }
        Command::SetMotion { agent, enabled } => {
            if let Some(target) = world.agent_mut(agent) {
                let before = target.state();
                target.set_enabled(enabled);
                push_state_change(agent, before, target.state(), out_events);
            }
        }
    }
}

fn push_state_change(
    agent: AgentId,
    from: MotionState,
    to: MotionState,
    out_events: &mut Vec<Event>,
) {
    if from != to {
        out_events.push(Event::MotionStateChanged { agent, from, to });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use courier_chase_core::{AgentId, AgentSnapshot, AgentView, CellCoord, GridView};
    use rand::Rng;

    use super::{GridMap, World};

    /// Provides read-only access to the traversability grid.
    #[must_use]
    pub fn grid_map(world: &World) -> &GridMap {
        &world.grid
    }

    /// Borrows the traversability grid as a view for systems.
    #[must_use]
    pub fn grid(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Captures a read-only view of every agent in the world.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.iter().map(|agent| agent.snapshot()).collect())
    }

    /// Captures the snapshot of a single agent, if present.
    #[must_use]
    pub fn agent(world: &World, agent: AgentId) -> Option<AgentSnapshot> {
        let index = world.agent_index(agent).ok()?;
        world.agents.get(index).map(|agent| agent.snapshot())
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Draws a traversable cell uniformly at random, `None` on a blocked grid.
    pub fn random_traversable_cell<R: Rng>(world: &World, rng: &mut R) -> Option<CellCoord> {
        world.grid.random_traversable_cell(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_chase_core::{Direction, Path, TraversabilityMask};
    use std::time::Duration;

    const DT: Duration = Duration::from_millis(16);

    fn open_world(columns: u32, rows: u32) -> World {
        let mut world = World::new(columns, rows);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadGrid {
                mask: TraversabilityMask::open(columns, rows),
            },
            &mut events,
        );
        world
    }

    #[test]
    fn load_grid_reports_open_cells() {
        let mut world = World::new(4, 4);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::LoadGrid {
                mask: TraversabilityMask::from_fn(4, 4, |cell| cell.row() < 2),
            },
            &mut events,
        );

        assert_eq!(events, vec![Event::GridReplaced { open_cells: 8 }]);
        assert!(query::grid(&world).is_traversable(CellCoord::new(3, 1)));
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let mut world = open_world(4, 4);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::LoadGrid {
                mask: TraversabilityMask::blocked(5, 4),
            },
            &mut events,
        );

        assert!(matches!(events.as_slice(), [Event::GridRejected { .. }]));
        assert_eq!(query::grid(&world).open_count(), 16);
    }

    #[test]
    fn placement_on_blocked_cell_is_rejected() {
        let mut world = World::new(3, 3);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceAgent {
                agent: AgentId::new(1),
                cell: CellCoord::new(1, 1),
                speed: TicksPerCell::new(1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceAgent {
                agent: AgentId::new(1),
                cell: CellCoord::new(3, 1),
                speed: TicksPerCell::new(1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::AgentPlacementRejected {
                    agent: AgentId::new(1),
                    cell: CellCoord::new(1, 1),
                    reason: PlacementError::NotTraversable,
                },
                Event::AgentPlacementRejected {
                    agent: AgentId::new(1),
                    cell: CellCoord::new(3, 1),
                    reason: PlacementError::OutOfBounds,
                },
            ]
        );
        assert!(query::agent_view(&world).into_vec().is_empty());
    }

    #[test]
    fn agent_walks_path_and_reports_completion() {
        let mut world = open_world(3, 1);
        let agent = AgentId::new(4);
        let mut events = Vec::new();
        for command in [
            Command::PlaceAgent {
                agent,
                cell: CellCoord::new(0, 0),
                speed: TicksPerCell::new(2),
            },
            Command::SetAgentPath {
                agent,
                path: Path::new(vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]),
            },
            Command::SetMotion {
                agent,
                enabled: true,
            },
        ] {
            apply(&mut world, command, &mut events);
        }
        assert_eq!(
            events,
            vec![
                Event::AgentPlaced {
                    agent,
                    cell: CellCoord::new(0, 0)
                },
                Event::PathAssigned { agent, length: 2 },
                Event::MotionStateChanged {
                    agent,
                    from: MotionState::Idle,
                    to: MotionState::Moving,
                },
            ]
        );

        let mut tick_events = Vec::new();
        for _ in 0..4 {
            apply(&mut world, Command::Tick { dt: DT }, &mut tick_events);
        }

        let moves: Vec<_> = tick_events
            .iter()
            .filter(|event| matches!(event, Event::AgentAdvanced { .. }))
            .collect();
        assert_eq!(moves.len(), 2);
        assert!(tick_events.contains(&Event::PathCompleted {
            agent,
            cell: CellCoord::new(2, 0)
        }));
        assert!(tick_events.contains(&Event::MotionStateChanged {
            agent,
            from: MotionState::Moving,
            to: MotionState::Idle,
        }));

        let snapshot = query::agent(&world, agent).expect("agent present");
        assert_eq!(snapshot.cell, CellCoord::new(2, 0));
        assert_eq!(snapshot.facing, Direction::East);
        assert_eq!(snapshot.state, MotionState::Idle);
        assert_eq!(query::tick_index(&world), 4);
    }

    #[test]
    fn grid_change_blocks_agent_mid_path() {
        let mut world = open_world(3, 1);
        let agent = AgentId::new(0);
        let mut events = Vec::new();
        for command in [
            Command::PlaceAgent {
                agent,
                cell: CellCoord::new(0, 0),
                speed: TicksPerCell::new(1),
            },
            Command::SetAgentPath {
                agent,
                path: Path::new(vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]),
            },
            Command::SetMotion {
                agent,
                enabled: true,
            },
            Command::LoadGrid {
                mask: TraversabilityMask::from_fn(3, 1, |cell| cell.column() != 1),
            },
        ] {
            apply(&mut world, command, &mut events);
        }

        let mut tick_events = Vec::new();
        apply(&mut world, Command::Tick { dt: DT }, &mut tick_events);
        apply(&mut world, Command::Tick { dt: DT }, &mut tick_events);

        assert_eq!(
            tick_events,
            vec![
                Event::TimeAdvanced { dt: DT },
                Event::AgentBlocked {
                    agent,
                    cell: CellCoord::new(1, 0)
                },
                Event::MotionStateChanged {
                    agent,
                    from: MotionState::Moving,
                    to: MotionState::Blocked,
                },
                Event::TimeAdvanced { dt: DT },
            ]
        );
        assert_eq!(
            query::agent(&world, agent).map(|snapshot| snapshot.cell),
            Some(CellCoord::new(0, 0))
        );
    }

    #[test]
    fn agents_advance_in_id_order() {
        let mut world = open_world(4, 2);
        let mut events = Vec::new();
        for (id, row) in [(7, 1), (2, 0)] {
            let agent = AgentId::new(id);
            for command in [
                Command::PlaceAgent {
                    agent,
                    cell: CellCoord::new(0, row),
                    speed: TicksPerCell::new(1),
                },
                Command::SetAgentPath {
                    agent,
                    path: Path::new(vec![CellCoord::new(1, row)]),
                },
                Command::SetMotion {
                    agent,
                    enabled: true,
                },
            ] {
                apply(&mut world, command, &mut events);
            }
        }

        let mut tick_events = Vec::new();
        apply(&mut world, Command::Tick { dt: DT }, &mut tick_events);

        let order: Vec<_> = tick_events
            .iter()
            .filter_map(|event| match event {
                Event::AgentAdvanced { agent, .. } => Some(agent.get()),
                _ => None,
            })
            .collect();
        assert_eq!(order, vec![2, 7]);
    }

    #[test]
    fn removed_agents_disappear_from_queries() {
        let mut world = open_world(2, 2);
        let agent = AgentId::new(3);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceAgent {
                agent,
                cell: CellCoord::new(1, 1),
                speed: TicksPerCell::DEFAULT,
            },
            &mut events,
        );
        apply(&mut world, Command::RemoveAgent { agent }, &mut events);

        assert_eq!(events.last(), Some(&Event::AgentRemoved { agent }));
        assert!(query::agent(&world, agent).is_none());
    }
}
