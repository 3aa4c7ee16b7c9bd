#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Courier system that walks a single agent through ordered waypoints.
//!
//! Every leg is planned up front when the plan is built. While the courier is
//! en route the system watches world events for the courier's path
//! completions and swaps in the next leg within the same tick, so the agent
//! never reports being idle between legs.

use courier_chase_core::{AgentId, CellCoord, Command, Event, GridView, Path, TicksPerCell};
use courier_chase_system_pathfinding::PathPlanner;
use thiserror::Error;

/// Reasons a courier plan cannot be built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PlanError {
    /// A plan needs at least an origin and one destination.
    #[error("a delivery plan needs at least two waypoints, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// The first waypoint cannot be occupied.
    #[error("origin {cell:?} is not traversable")]
    BlockedOrigin {
        /// Offending origin cell.
        cell: CellCoord,
    },
    /// No route connects two consecutive waypoints.
    #[error("leg {leg} from {from:?} to {to:?} has no route")]
    UnreachableLeg {
        /// Zero-based index of the failing leg.
        leg: usize,
        /// Waypoint the leg starts from.
        from: CellCoord,
        /// Waypoint the leg ends at.
        to: CellCoord,
    },
}

/// Ordered waypoints together with the path of every leg between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourierPlan {
    waypoints: Vec<CellCoord>,
    legs: Vec<Path>,
}

impl CourierPlan {
    /// Plans every leg between consecutive waypoints.
    ///
    /// The whole plan is rejected when any leg is empty, including legs whose
    /// endpoints coincide.
    pub fn build(
        planner: &mut PathPlanner,
        grid: GridView<'_>,
        waypoints: Vec<CellCoord>,
    ) -> Result<Self, PlanError> {
        let Some(origin) = waypoints.first().copied() else {
            return Err(PlanError::TooFewWaypoints { count: 0 });
        };
        if waypoints.len() < 2 {
            return Err(PlanError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }
        if !grid.is_traversable(origin) {
            return Err(PlanError::BlockedOrigin { cell: origin });
        }

        let mut legs = Vec::with_capacity(waypoints.len() - 1);
        for (leg, pair) in waypoints.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let path = planner.find_path(from, to, grid);
            if path.is_empty() {
                return Err(PlanError::UnreachableLeg { leg, from, to });
            }
            legs.push(path);
        }

        Ok(Self { waypoints, legs })
    }

    /// Waypoints in visiting order.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Planned legs in travel order.
    #[must_use]
    pub fn legs(&self) -> &[Path] {
        &self.legs
    }

    /// Sum of every leg's length.
    #[must_use]
    pub fn total_length(&self) -> usize {
        self.legs.iter().map(Path::len).sum()
    }

    /// Cell the courier starts from.
    #[must_use]
    pub fn origin(&self) -> CellCoord {
        self.waypoints[0]
    }
}

/// Lifecycle of the courier as seen by the system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CourierStatus {
    /// No plan has been installed.
    Unplanned,
    /// Placed at the origin with the first leg assigned, waiting for a start.
    Ready,
    /// Walking the active leg.
    EnRoute,
    /// Motion suspended mid-route.
    Paused,
    /// The next cell of the active leg became blocked.
    Blocked,
    /// The final waypoint was reached.
    Delivered,
}

/// Progress notifications reported while handling world events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CourierProgress {
    /// A leg finished and the next one was assigned.
    LegCompleted {
        /// Zero-based index of the finished leg.
        leg: usize,
    },
    /// The final leg finished.
    Delivered,
    /// The courier halted in front of a blocked cell.
    Blocked {
        /// Cell that could not be entered.
        cell: CellCoord,
    },
}

/// Pure system sequencing one agent through a [`CourierPlan`].
#[derive(Debug)]
pub struct Courier {
    agent: AgentId,
    speed: TicksPerCell,
    plan: Option<CourierPlan>,
    active_leg: usize,
    status: CourierStatus,
}

impl Courier {
    /// Creates a courier system driving the provided agent.
    #[must_use]
    pub fn new(agent: AgentId, speed: TicksPerCell) -> Self {
        Self {
            agent,
            speed,
            plan: None,
            active_leg: 0,
            status: CourierStatus::Unplanned,
        }
    }

    /// Agent driven by this courier.
    #[must_use]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    /// Current movement cadence.
    #[must_use]
    pub fn speed(&self) -> TicksPerCell {
        self.speed
    }

    /// Installed plan, if any.
    #[must_use]
    pub fn plan(&self) -> Option<&CourierPlan> {
        self.plan.as_ref()
    }

    /// Zero-based index of the leg being walked.
    #[must_use]
    pub fn active_leg(&self) -> usize {
        self.active_leg
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> CourierStatus {
        self.status
    }

    /// Installs a plan and places the courier at its origin with motion off.
    pub fn begin(&mut self, plan: CourierPlan, out: &mut Vec<Command>) {
        self.plan = Some(plan);
        self.restart(out);
        self.status = CourierStatus::Ready;
    }

    /// Enables motion. A delivered courier starts over from the first leg.
    pub fn resume(&mut self, out: &mut Vec<Command>) {
        match self.status {
            CourierStatus::Ready | CourierStatus::Paused => {
                self.enable(out);
            }
            CourierStatus::Delivered => {
                self.restart(out);
                self.enable(out);
            }
            CourierStatus::Unplanned | CourierStatus::EnRoute | CourierStatus::Blocked => {}
        }
    }

    /// Suspends motion while en route.
    pub fn pause(&mut self, out: &mut Vec<Command>) {
        if self.status == CourierStatus::EnRoute {
            out.push(Command::SetMotion {
                agent: self.agent,
                enabled: false,
            });
            self.status = CourierStatus::Paused;
        }
    }

    /// Returns the courier to the origin and walks the plan again.
    pub fn replay(&mut self, out: &mut Vec<Command>) {
        if self.plan.is_none() {
            return;
        }
        self.restart(out);
        self.enable(out);
    }

    /// Drops the plan and removes the agent from the world.
    pub fn clear(&mut self, out: &mut Vec<Command>) {
        if self.plan.take().is_some() {
            out.push(Command::RemoveAgent { agent: self.agent });
        }
        self.active_leg = 0;
        self.status = CourierStatus::Unplanned;
    }

    /// Changes the movement cadence, applying it immediately when placed.
    pub fn set_speed(&mut self, speed: TicksPerCell, out: &mut Vec<Command>) {
        self.speed = speed;
        if self.plan.is_some() {
            out.push(Command::SetAgentSpeed {
                agent: self.agent,
                speed,
            });
        }
    }

    /// Plans a fresh route from `position` to the active leg's waypoint.
    ///
    /// Only a blocked courier is rerouted. Returns `true` when a route was
    /// found and assigned.
    pub fn reroute(
        &mut self,
        planner: &mut PathPlanner,
        grid: GridView<'_>,
        position: CellCoord,
        out: &mut Vec<Command>,
    ) -> bool {
        if self.status != CourierStatus::Blocked {
            return false;
        }
        let Some(target) = self
            .plan
            .as_ref()
            .and_then(|plan| plan.waypoints.get(self.active_leg + 1).copied())
        else {
            return false;
        };

        let path = planner.find_path(position, target, grid);
        if path.is_empty() {
            return false;
        }
        out.push(Command::SetAgentPath {
            agent: self.agent,
            path,
        });
        self.status = CourierStatus::EnRoute;
        true
    }

    /// Consumes world events and emits the follow-up commands for leg changes.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) -> Option<CourierProgress> {
        let mut progress = None;
        for event in events {
            match event {
                Event::PathCompleted { agent, .. } if *agent == self.agent => {
                    if let Some(update) = self.complete_leg(out) {
                        progress = Some(update);
                    }
                }
                Event::AgentBlocked { agent, cell } if *agent == self.agent => {
                    if self.plan.is_some() {
                        self.status = CourierStatus::Blocked;
                        progress = Some(CourierProgress::Blocked { cell: *cell });
                    }
                }
                _ => {}
            }
        }
        progress
    }

    fn complete_leg(&mut self, out: &mut Vec<Command>) -> Option<CourierProgress> {
        if self.status != CourierStatus::EnRoute {
            return None;
        }
        let plan = self.plan.as_ref()?;
        let finished = self.active_leg;
        match plan.legs.get(finished + 1) {
            Some(next) => {
                out.push(Command::SetAgentPath {
                    agent: self.agent,
                    path: next.clone(),
                });
                self.active_leg = finished + 1;
                Some(CourierProgress::LegCompleted { leg: finished })
            }
            None => {
                self.status = CourierStatus::Delivered;
                Some(CourierProgress::Delivered)
            }
        }
    }

    fn restart(&mut self, out: &mut Vec<Command>) {
        let Some(plan) = self.plan.as_ref() else {
            return;
        };
        out.push(Command::PlaceAgent {
            agent: self.agent,
            cell: plan.origin(),
            speed: self.speed,
        });
        if let Some(first) = plan.legs.first() {
            out.push(Command::SetAgentPath {
                agent: self.agent,
                path: first.clone(),
            });
        }
        self.active_leg = 0;
        self.status = CourierStatus::Ready;
    }

    fn enable(&mut self, out: &mut Vec<Command>) {
        out.push(Command::SetMotion {
            agent: self.agent,
            enabled: true,
        });
        self.status = CourierStatus::EnRoute;
    }
}
