#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation session owning the world, the systems and their timers.
//!
//! The session is the single entry point for adapters. Control operations
//! translate into world commands, and every tick pumps the resulting events
//! through the active system until no follow-up commands remain, so observers
//! never see a half-applied leg swap or capture.

use std::time::Duration;

use courier_chase_core::{
    AgentId, AgentView, CellCoord, Command, ConfigurationError, Event, GridView, MaskError,
    TicksPerCell, TraversabilityMask,
};
use courier_chase_system_courier::{Courier, CourierPlan, CourierProgress, CourierStatus, PlanError};
use courier_chase_system_pathfinding::PathPlanner;
use courier_chase_system_pursuit::{Placement, Pursuit, PursuitOutcome};
use courier_chase_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

mod config;
mod snapshot;

pub use config::{PursuitSettings, SessionConfig};
pub use snapshot::{AgentFrame, SessionSnapshot};

/// Agent driven by the courier system.
pub const COURIER: AgentId = AgentId::new(0);
/// Agent chasing in pursuit mode.
pub const SEEKER: AgentId = AgentId::new(1);
/// Agent fleeing in pursuit mode.
pub const HIDER: AgentId = AgentId::new(2);

const WAYPOINT_COUNT: usize = 3;

/// Failures reported by session control operations.
///
/// The simulation state is left untouched whenever an operation fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The grid cannot satisfy the requested setup.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// A delivery plan was refused.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// A map load was refused.
    #[error("map rejected: {0}")]
    Mask(#[from] MaskError),
    /// The operation needs a plan or placement that does not exist yet.
    #[error("nothing has been set up to run")]
    NoPlan,
    /// The courier is held in front of a blocked cell and needs a detour first.
    #[error("courier is blocked, reroute before starting")]
    CourierBlocked,
    /// The operation is not available in the current mode.
    #[error("operation requires {expected:?} mode, session is in {actual:?} mode")]
    ModeMismatch {
        /// Mode the operation requires.
        expected: SessionMode,
        /// Mode the session is in.
        actual: SessionMode,
    },
}

/// Scenario the session is currently running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    /// A courier walks start, pickup and destination waypoints.
    Courier,
    /// A seeker chases a hider.
    Pursuit,
}

/// Notifications surfaced to the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// An agent halted in front of a cell that became blocked.
    Blocked {
        /// Agent that halted.
        agent: AgentId,
        /// Cell that could not be entered.
        cell: CellCoord,
    },
    /// An agent finished its route and stands still.
    Idle {
        /// Agent that finished.
        agent: AgentId,
    },
    /// The seeker caught the hider.
    Caught {
        /// Simulated time the round lasted.
        elapsed: Duration,
    },
    /// The pursuit round was stopped without a winner.
    Stopped,
}

/// Owns the authoritative world together with every system that drives it.
#[derive(Debug)]
pub struct SimulationSession {
    config: SessionConfig,
    world: World,
    planner: PathPlanner,
    courier: Courier,
    pursuit: Pursuit,
    rng: ChaCha8Rng,
    mode: SessionMode,
}

impl SimulationSession {
    /// Creates a session with a fully blocked grid.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        info!(
            columns = config.columns,
            rows = config.rows,
            seed = config.seed,
            "creating simulation session"
        );
        Self {
            world: World::new(config.columns, config.rows),
            planner: PathPlanner::new(),
            courier: Courier::new(COURIER, config.courier_speed()),
            pursuit: Pursuit::new(config.pursuit.to_config(SEEKER, HIDER)),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            mode: SessionMode::Courier,
            config,
        }
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Active scenario.
    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Read-only view of the traversability grid.
    #[must_use]
    pub fn grid(&self) -> GridView<'_> {
        query::grid(&self.world)
    }

    /// Read-only view of every agent.
    #[must_use]
    pub fn agents(&self) -> AgentView {
        query::agent_view(&self.world)
    }

    /// Lifecycle of the courier.
    #[must_use]
    pub fn courier_status(&self) -> CourierStatus {
        self.courier.status()
    }

    /// Installed delivery plan, if any.
    #[must_use]
    pub fn courier_plan(&self) -> Option<&CourierPlan> {
        self.courier.plan()
    }

    /// Placement of the current or last pursuit round.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.pursuit.placement()
    }

    /// Result of the last finished pursuit round.
    #[must_use]
    pub fn last_outcome(&self) -> Option<PursuitOutcome> {
        self.pursuit.outcome()
    }

    /// Replaces the traversability grid, returning the number of open cells.
    ///
    /// Agents keep their paths; any path crossing a newly blocked cell halts
    /// its agent on the next tick.
    pub fn load_mask(&mut self, mask: TraversabilityMask) -> Result<usize, SessionError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::LoadGrid { mask }, &mut events);
        for event in events {
            match event {
                Event::GridReplaced { open_cells } => {
                    info!(open_cells, "map loaded");
                    return Ok(open_cells);
                }
                Event::GridRejected { reason } => {
                    warn!(%reason, "map rejected");
                    return Err(reason.into());
                }
                _ => {}
            }
        }
        Ok(query::grid(&self.world).open_count())
    }

    /// Draws fresh start, pickup and destination waypoints and installs the
    /// delivery plan, switching to courier mode.
    ///
    /// Returns the total planned path length.
    pub fn randomize(&mut self) -> Result<usize, SessionError> {
        let plan = self.draw_plan()?;
        let length = plan.total_length();
        info!(
            waypoints = ?plan.waypoints(),
            length,
            "delivery plan installed"
        );

        let mut commands = Vec::new();
        self.pursuit.clear(&mut commands);
        self.courier.begin(plan, &mut commands);
        self.mode = SessionMode::Courier;
        let _ = self.pump(commands);
        Ok(length)
    }

    /// Sets the courier in motion. A delivered courier starts over; a blocked
    /// one is refused until [`SimulationSession::reroute`] finds a detour.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_mode(SessionMode::Courier)?;
        if self.courier.plan().is_none() {
            return Err(SessionError::NoPlan);
        }
        if self.courier.status() == CourierStatus::Blocked {
            return Err(SessionError::CourierBlocked);
        }
        let mut commands = Vec::new();
        self.courier.resume(&mut commands);
        let _ = self.pump(commands);
        debug!(status = ?self.courier.status(), "courier started");
        Ok(())
    }

    /// Suspends the courier in place.
    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.expect_mode(SessionMode::Courier)?;
        let mut commands = Vec::new();
        self.courier.pause(&mut commands);
        let _ = self.pump(commands);
        Ok(())
    }

    /// Restarts the current scenario from its initial positions.
    pub fn replay(&mut self) -> Result<(), SessionError> {
        let mut commands = Vec::new();
        match self.mode {
            SessionMode::Courier => {
                if self.courier.plan().is_none() {
                    return Err(SessionError::NoPlan);
                }
                self.courier.replay(&mut commands);
            }
            SessionMode::Pursuit => {
                if !self
                    .pursuit
                    .replay(query::grid(&self.world), &mut commands)
                {
                    return Err(SessionError::NoPlan);
                }
            }
        }
        info!(mode = ?self.mode, "replaying");
        let _ = self.pump(commands);
        Ok(())
    }

    /// Changes the courier cadence.
    pub fn set_speed(&mut self, speed: TicksPerCell) {
        debug!(ticks = speed.get(), label = speed.preset_label(), "courier speed");
        let mut commands = Vec::new();
        self.courier.set_speed(speed, &mut commands);
        let _ = self.pump(commands);
    }

    /// Plans a detour for a blocked courier to its current leg's waypoint.
    ///
    /// Returns `true` when the courier got a fresh path.
    pub fn reroute(&mut self) -> Result<bool, SessionError> {
        self.expect_mode(SessionMode::Courier)?;
        let Some(position) = query::agent(&self.world, COURIER).map(|agent| agent.cell) else {
            return Err(SessionError::NoPlan);
        };
        let mut commands = Vec::new();
        let rerouted = self.courier.reroute(
            &mut self.planner,
            query::grid(&self.world),
            position,
            &mut commands,
        );
        if rerouted {
            info!(?position, "courier rerouted");
            let _ = self.pump(commands);
        }
        Ok(rerouted)
    }

    /// Removes the courier, places seeker and hider and starts the chase.
    pub fn start_pursuit_mode(&mut self) -> Result<Placement, SessionError> {
        let placement = self
            .pursuit
            .draw_placement(query::grid(&self.world), &mut self.rng)?;
        info!(
            seeker = ?placement.seeker,
            hider = ?placement.hider,
            "pursuit started"
        );

        let mut commands = Vec::new();
        self.courier.clear(&mut commands);
        self.pursuit
            .start(placement, query::grid(&self.world), &mut commands);
        self.mode = SessionMode::Pursuit;
        let _ = self.pump(commands);
        Ok(placement)
    }

    /// Ends the running pursuit round, freezing both agents.
    pub fn stop_pursuit_mode(&mut self) -> Result<Vec<Signal>, SessionError> {
        self.expect_mode(SessionMode::Pursuit)?;
        let mut commands = Vec::new();
        let mut signals = Vec::new();
        if let Some(outcome) = self.pursuit.stop(&mut commands) {
            signals.push(outcome_signal(outcome));
            info!("pursuit stopped");
        }
        signals.extend(self.pump(commands));
        Ok(signals)
    }

    /// Advances the simulation by one tick.
    pub fn tick(&mut self, dt: Duration) -> Vec<Signal> {
        self.pump(vec![Command::Tick { dt }])
    }

    /// Captures a render frame of the whole session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let grid = query::grid(&self.world);
        let (columns, rows) = grid.dimensions();
        let plan = self.courier.plan();
        let speed = self.courier.speed();
        SessionSnapshot {
            mode: self.mode,
            tick: query::tick_index(&self.world),
            grid: TraversabilityMask::from_fn(columns, rows, |cell| grid.is_traversable(cell)),
            agents: query::agent_view(&self.world)
                .into_vec()
                .into_iter()
                .map(AgentFrame::from)
                .collect(),
            waypoints: plan.map(|plan| plan.waypoints().to_vec()).unwrap_or_default(),
            path_length: plan.map_or(0, CourierPlan::total_length),
            courier_speed: speed,
            speed_label: speed.preset_label().to_owned(),
            pursuit_elapsed: self.pursuit.elapsed(),
            outcome: self.pursuit.outcome(),
        }
    }

    fn expect_mode(&self, expected: SessionMode) -> Result<(), SessionError> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(SessionError::ModeMismatch {
                expected,
                actual: self.mode,
            })
        }
    }

    fn draw_plan(&mut self) -> Result<CourierPlan, SessionError> {
        let attempts = self.config.plan_attempts;
        for _ in 0..attempts {
            let mut waypoints = Vec::with_capacity(WAYPOINT_COUNT);
            for _ in 0..WAYPOINT_COUNT {
                let cell = query::random_traversable_cell(&self.world, &mut self.rng)
                    .ok_or(ConfigurationError::NoTraversableCell)?;
                waypoints.push(cell);
            }
            if has_repeats(&waypoints) {
                continue;
            }

            match CourierPlan::build(&mut self.planner, query::grid(&self.world), waypoints) {
                Ok(plan) => return Ok(plan),
                Err(PlanError::UnreachableLeg { leg, from, to }) => {
                    debug!(leg, ?from, ?to, "discarding unroutable waypoints");
                }
                Err(error) => return Err(error.into()),
            }
        }
        Err(ConfigurationError::NoRoutablePlan { attempts }.into())
    }

    fn pump(&mut self, commands: Vec<Command>) -> Vec<Signal> {
        let mut signals = Vec::new();
        let mut pending = commands;
        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            log_rejections(&events);

            match self.mode {
                SessionMode::Courier => {
                    if let Some(progress) = self.courier.handle(&events, &mut pending) {
                        self.report_progress(progress, &mut signals);
                    }
                }
                SessionMode::Pursuit => {
                    for event in &events {
                        if let Event::AgentBlocked { agent, cell } = event {
                            warn!(agent = agent.get(), ?cell, "pursuit agent blocked");
                            signals.push(Signal::Blocked {
                                agent: *agent,
                                cell: *cell,
                            });
                        }
                    }
                    let agents = query::agent_view(&self.world);
                    if let Some(outcome) = self.pursuit.handle(
                        &events,
                        query::grid(&self.world),
                        &agents,
                        &mut pending,
                    ) {
                        if let PursuitOutcome::Caught { elapsed, ticks } = outcome {
                            info!(?elapsed, ticks, "hider caught");
                        }
                        signals.push(outcome_signal(outcome));
                    }
                }
            }
        }
        signals
    }

    fn report_progress(&self, progress: CourierProgress, signals: &mut Vec<Signal>) {
        match progress {
            CourierProgress::LegCompleted { leg } => {
                debug!(leg, "courier leg completed");
            }
            CourierProgress::Delivered => {
                info!("courier delivered");
                signals.push(Signal::Idle { agent: COURIER });
            }
            CourierProgress::Blocked { cell } => {
                warn!(?cell, leg = self.courier.active_leg(), "courier blocked");
                signals.push(Signal::Blocked {
                    agent: COURIER,
                    cell,
                });
            }
        }
    }
}

fn outcome_signal(outcome: PursuitOutcome) -> Signal {
    match outcome {
        PursuitOutcome::Caught { elapsed, .. } => Signal::Caught { elapsed },
        PursuitOutcome::Stopped => Signal::Stopped,
    }
}

fn has_repeats(cells: &[CellCoord]) -> bool {
    cells
        .iter()
        .enumerate()
        .any(|(index, cell)| cells[..index].contains(cell))
}

fn log_rejections(events: &[Event]) {
    for event in events {
        match event {
            Event::AgentPlacementRejected {
                agent,
                cell,
                reason,
            } => warn!(agent = agent.get(), ?cell, ?reason, "placement rejected"),
            Event::PathRejected { agent, reason } => {
                warn!(agent = agent.get(), ?reason, "path rejected");
            }
            _ => {}
        }
    }
}
