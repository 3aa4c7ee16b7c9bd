#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuit-evasion system driving a seeker and a hider.
//!
//! The seeker greedily chases the hider's current cell while the hider runs a
//! small local escape search. Both paths are recomputed on a replanning
//! cadence that is independent of the tick rate. Capture is checked after
//! every tick, before any replanning.

use std::time::Duration;

use courier_chase_core::{
    AgentId, AgentView, CellCoord, Command, ConfigurationError, Event, GridView, Path,
    TicksPerCell,
};
use courier_chase_system_pathfinding::PathPlanner;
use rand::Rng;
use serde::{Deserialize, Serialize};

mod escape;

pub use escape::{escape_route, EscapeRoute};

const DEFAULT_SEEKER_SPEED: TicksPerCell = TicksPerCell::new(5);
const DEFAULT_HIDER_SPEED: TicksPerCell = TicksPerCell::new(4);
const DEFAULT_REPLAN_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_ESCAPE_MAGNITUDE: u32 = 3;
const DEFAULT_MIN_SEPARATION: u32 = 15;
const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 1_000;

/// Configuration parameters required to construct the pursuit system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    seeker: AgentId,
    hider: AgentId,
    seeker_speed: TicksPerCell,
    hider_speed: TicksPerCell,
    replan_interval: Duration,
    escape_magnitude: u32,
    min_separation: u32,
    placement_attempts: u32,
}

impl Config {
    /// Creates a configuration for the provided agents using default tuning.
    #[must_use]
    pub const fn new(seeker: AgentId, hider: AgentId) -> Self {
        Self {
            seeker,
            hider,
            seeker_speed: DEFAULT_SEEKER_SPEED,
            hider_speed: DEFAULT_HIDER_SPEED,
            replan_interval: DEFAULT_REPLAN_INTERVAL,
            escape_magnitude: DEFAULT_ESCAPE_MAGNITUDE,
            min_separation: DEFAULT_MIN_SEPARATION,
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
        }
    }

    /// Overrides the movement cadence of both agents.
    #[must_use]
    pub const fn with_speeds(mut self, seeker: TicksPerCell, hider: TicksPerCell) -> Self {
        self.seeker_speed = seeker;
        self.hider_speed = hider;
        self
    }

    /// Overrides the wall-clock interval between replans.
    #[must_use]
    pub const fn with_replan_interval(mut self, interval: Duration) -> Self {
        self.replan_interval = interval;
        self
    }

    /// Overrides the offset length probed by the escape search.
    #[must_use]
    pub const fn with_escape_magnitude(mut self, magnitude: u32) -> Self {
        self.escape_magnitude = magnitude;
        self
    }

    /// Overrides the minimum Manhattan distance between initial positions.
    #[must_use]
    pub const fn with_min_separation(mut self, separation: u32) -> Self {
        self.min_separation = separation;
        self
    }

    /// Overrides the number of placement pairs drawn before giving up.
    #[must_use]
    pub const fn with_placement_attempts(mut self, attempts: u32) -> Self {
        self.placement_attempts = attempts;
        self
    }

    /// Agent acting as the seeker.
    #[must_use]
    pub const fn seeker(&self) -> AgentId {
        self.seeker
    }

    /// Agent acting as the hider.
    #[must_use]
    pub const fn hider(&self) -> AgentId {
        self.hider
    }

    /// Interval between replans.
    #[must_use]
    pub const fn replan_interval(&self) -> Duration {
        self.replan_interval
    }
}

/// Initial cells of the seeker and the hider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Starting cell of the seeker.
    pub seeker: CellCoord,
    /// Starting cell of the hider.
    pub hider: CellCoord,
}

/// How a pursuit round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuitOutcome {
    /// The seeker reached the hider's cell.
    Caught {
        /// Simulated time between the start and the capture tick.
        elapsed: Duration,
        /// Number of ticks between the start and the capture tick.
        ticks: u64,
    },
    /// The round was stopped without a winner.
    Stopped,
}

const NANOS_PER_SECOND: u128 = 1_000_000_000;

#[derive(Clone, Copy, Debug)]
struct ReplanTimer {
    interval: Duration,
    accumulator: Duration,
}

impl ReplanTimer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Accumulates time, reporting whether at least one interval elapsed.
    fn advance(&mut self, dt: Duration) -> bool {
        if self.interval.is_zero() {
            return true;
        }
        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < self.interval {
            return false;
        }
        let remainder = self.accumulator.as_nanos() % self.interval.as_nanos();
        self.accumulator = Duration::new(
            u64::try_from(remainder / NANOS_PER_SECOND).unwrap_or(u64::MAX),
            u32::try_from(remainder % NANOS_PER_SECOND).unwrap_or(0),
        );
        true
    }
}

/// Pure system that places, replans and referees a pursuit round.
#[derive(Debug)]
pub struct Pursuit {
    config: Config,
    planner: PathPlanner,
    placement: Option<Placement>,
    timer: Option<ReplanTimer>,
    elapsed: Duration,
    ticks: u64,
    outcome: Option<PursuitOutcome>,
}

impl Pursuit {
    /// Creates a new pursuit system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            planner: PathPlanner::new(),
            placement: None,
            timer: None,
            elapsed: Duration::ZERO,
            ticks: 0,
            outcome: None,
        }
    }

    /// Configuration the system was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Placement of the current or last round.
    #[must_use]
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    /// Reports whether a round is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Simulated time since the round started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Outcome of the last finished round.
    #[must_use]
    pub fn outcome(&self) -> Option<PursuitOutcome> {
        self.outcome
    }

    /// Draws seeker and hider cells that are far enough apart.
    ///
    /// Pairs are drawn uniformly from the traversable cells and resampled
    /// until their Manhattan distance reaches the minimum separation.
    pub fn draw_placement<R: Rng>(
        &self,
        grid: GridView<'_>,
        rng: &mut R,
    ) -> Result<Placement, ConfigurationError> {
        let open: Vec<CellCoord> = grid.open_cells().collect();
        if open.is_empty() {
            return Err(ConfigurationError::NoTraversableCell);
        }

        for _ in 0..self.config.placement_attempts {
            let seeker = open[rng.gen_range(0..open.len())];
            let hider = open[rng.gen_range(0..open.len())];
            if seeker.manhattan_distance(hider) >= self.config.min_separation {
                return Ok(Placement { seeker, hider });
            }
        }

        Err(ConfigurationError::SeparationUnsatisfiable {
            min_separation: self.config.min_separation,
            attempts: self.config.placement_attempts,
        })
    }

    /// Starts a round from the placement, replacing any running round.
    ///
    /// Both agents are placed, receive their first paths immediately and have
    /// their motion enabled.
    pub fn start(&mut self, placement: Placement, grid: GridView<'_>, out: &mut Vec<Command>) {
        self.placement = Some(placement);
        self.timer = Some(ReplanTimer::new(self.config.replan_interval));
        self.elapsed = Duration::ZERO;
        self.ticks = 0;
        self.outcome = None;

        out.push(Command::PlaceAgent {
            agent: self.config.seeker,
            cell: placement.seeker,
            speed: self.config.seeker_speed,
        });
        out.push(Command::PlaceAgent {
            agent: self.config.hider,
            cell: placement.hider,
            speed: self.config.hider_speed,
        });
        self.replan(placement.seeker, placement.hider, grid, out);
        self.set_motion(true, out);
    }

    /// Consumes world events and the post-tick agent view.
    ///
    /// Returns the outcome on the tick the seeker lands on the hider's cell.
    /// Otherwise both paths are recomputed whenever the replanning interval
    /// elapses.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: GridView<'_>,
        agents: &AgentView,
        out: &mut Vec<Command>,
    ) -> Option<PursuitOutcome> {
        if self.timer.is_none() {
            return None;
        }

        let mut dt = Duration::ZERO;
        let mut ticks = 0_u64;
        for event in events {
            if let Event::TimeAdvanced { dt: step } = event {
                dt = dt.saturating_add(*step);
                ticks += 1;
            }
        }
        if ticks == 0 {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        self.ticks += ticks;

        let seeker = agents.get(self.config.seeker)?.cell;
        let hider = agents.get(self.config.hider)?.cell;
        if seeker == hider {
            let outcome = PursuitOutcome::Caught {
                elapsed: self.elapsed,
                ticks: self.ticks,
            };
            self.finish(outcome, out);
            return Some(outcome);
        }

        let fired = self
            .timer
            .as_mut()
            .map_or(false, |timer| timer.advance(dt));
        if fired {
            self.replan(seeker, hider, grid, out);
        }
        None
    }

    /// Ends the running round, freezing both agents in place.
    pub fn stop(&mut self, out: &mut Vec<Command>) -> Option<PursuitOutcome> {
        if self.timer.is_none() {
            return None;
        }
        self.finish(PursuitOutcome::Stopped, out);
        Some(PursuitOutcome::Stopped)
    }

    /// Restarts from the last placement. Returns `false` when none exists.
    pub fn replay(&mut self, grid: GridView<'_>, out: &mut Vec<Command>) -> bool {
        match self.placement {
            Some(placement) => {
                self.start(placement, grid, out);
                true
            }
            None => false,
        }
    }

    /// Cancels any round and removes both agents from the world.
    pub fn clear(&mut self, out: &mut Vec<Command>) {
        self.timer = None;
        if self.placement.take().is_some() {
            out.push(Command::RemoveAgent {
                agent: self.config.seeker,
            });
            out.push(Command::RemoveAgent {
                agent: self.config.hider,
            });
        }
        self.outcome = None;
    }

    fn finish(&mut self, outcome: PursuitOutcome, out: &mut Vec<Command>) {
        self.timer = None;
        self.outcome = Some(outcome);
        self.set_motion(false, out);
    }

    fn replan(
        &mut self,
        seeker: CellCoord,
        hider: CellCoord,
        grid: GridView<'_>,
        out: &mut Vec<Command>,
    ) {
        let chase = self.planner.find_path(seeker, hider, grid);
        let flee = escape_route(
            &mut self.planner,
            grid,
            hider,
            seeker,
            self.config.escape_magnitude,
        )
        .map_or_else(Path::empty, |route| route.path);

        out.push(Command::SetAgentPath {
            agent: self.config.seeker,
            path: chase,
        });
        out.push(Command::SetAgentPath {
            agent: self.config.hider,
            path: flee,
        });
    }

    fn set_motion(&self, enabled: bool, out: &mut Vec<Command>) {
        for agent in [self.config.seeker, self.config.hider] {
            out.push(Command::SetMotion { agent, enabled });
        }
    }
}
