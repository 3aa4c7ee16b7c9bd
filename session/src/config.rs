//! Session tuning loaded from configuration files.

use std::time::Duration;

use courier_chase_core::{AgentId, TicksPerCell};
use courier_chase_system_pursuit::Config as PursuitConfig;
use serde::{Deserialize, Serialize};

/// Grid dimensions, seed and agent tuning for a [`crate::SimulationSession`].
///
/// Every field has a default so partial configuration files are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Seed of the session random number generator.
    pub seed: u64,
    /// Ticks per cell of the courier.
    pub courier_speed: u32,
    /// Waypoint draws attempted before randomizing gives up.
    pub plan_attempts: u32,
    /// Pursuit mode tuning.
    pub pursuit: PursuitSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            columns: 40,
            rows: 30,
            seed: 0x5eed,
            courier_speed: TicksPerCell::DEFAULT.get(),
            plan_attempts: 100,
            pursuit: PursuitSettings::default(),
        }
    }
}

impl SessionConfig {
    /// Courier cadence with zero clamped to a single tick.
    #[must_use]
    pub fn courier_speed(&self) -> TicksPerCell {
        TicksPerCell::new(self.courier_speed)
    }
}

/// Seeker and hider tuning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitSettings {
    /// Ticks per cell of the seeker.
    pub seeker_speed: u32,
    /// Ticks per cell of the hider.
    pub hider_speed: u32,
    /// Milliseconds of simulated time between replans.
    pub replan_interval_ms: u64,
    /// Length of the offsets probed by the hider's escape search.
    pub escape_magnitude: u32,
    /// Minimum Manhattan distance between the initial positions.
    pub min_separation: u32,
    /// Placement pairs drawn before giving up.
    pub placement_attempts: u32,
}

impl Default for PursuitSettings {
    fn default() -> Self {
        Self {
            seeker_speed: 5,
            hider_speed: 4,
            replan_interval_ms: 500,
            escape_magnitude: 3,
            min_separation: 15,
            placement_attempts: 1_000,
        }
    }
}

impl PursuitSettings {
    /// Builds the pursuit system configuration for the provided agents.
    #[must_use]
    pub fn to_config(&self, seeker: AgentId, hider: AgentId) -> PursuitConfig {
        PursuitConfig::new(seeker, hider)
            .with_speeds(
                TicksPerCell::new(self.seeker_speed),
                TicksPerCell::new(self.hider_speed),
            )
            .with_replan_interval(Duration::from_millis(self.replan_interval_ms))
            .with_escape_magnitude(self.escape_magnitude)
            .with_min_separation(self.min_separation)
            .with_placement_attempts(self.placement_attempts)
    }
}
