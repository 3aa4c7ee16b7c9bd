use std::time::Duration;

use courier_chase_core::{
    CellCoord, ConfigurationError, MaskError, MotionState, TicksPerCell, TraversabilityMask,
};
use courier_chase_session::{
    PursuitSettings, SessionConfig, SessionError, SessionMode, Signal, SimulationSession, COURIER,
    HIDER, SEEKER,
};

const DT: Duration = Duration::from_millis(16);

fn session_with(mask: TraversabilityMask, seed: u64) -> SimulationSession {
    let (columns, rows) = mask.dimensions();
    let mut session = SimulationSession::new(SessionConfig {
        columns,
        rows,
        seed,
        ..SessionConfig::default()
    });
    let _ = session.load_mask(mask).expect("dimensions match");
    session
}

fn run_until<F>(session: &mut SimulationSession, limit: usize, mut stop: F) -> Vec<Signal>
where
    F: FnMut(&Signal) -> bool,
{
    let mut seen = Vec::new();
    for _ in 0..limit {
        let signals = session.tick(DT);
        let done = signals.iter().any(&mut stop);
        seen.extend(signals);
        if done {
            break;
        }
    }
    seen
}

#[test]
fn courier_delivers_after_planned_number_of_ticks() {
    let mut session = session_with(TraversabilityMask::open(16, 12), 7);
    session.set_speed(TicksPerCell::new(2));
    let length = session.randomize().expect("open grid is routable");
    session.start().expect("plan installed");

    let mut signals = Vec::new();
    let mut ticks = 0;
    while signals.is_empty() && ticks < 10_000 {
        signals = session.tick(DT);
        ticks += 1;
    }

    assert_eq!(signals, vec![Signal::Idle { agent: COURIER }]);
    assert_eq!(ticks, length * 2);
    let destination = session
        .courier_plan()
        .and_then(|plan| plan.waypoints().last().copied())
        .expect("plan installed");
    let courier = session.agents().get(COURIER).cloned().expect("courier placed");
    assert_eq!(courier.cell, destination);
    assert_eq!(courier.state, MotionState::Idle);

    for _ in 0..20 {
        assert!(session.tick(DT).is_empty());
    }
}

#[test]
fn pause_and_start_continue_where_the_courier_stopped() {
    let mut session = session_with(TraversabilityMask::open(16, 12), 11);
    session.set_speed(TicksPerCell::new(1));
    let _ = session.randomize().expect("open grid is routable");
    session.start().expect("plan installed");
    let _ = session.tick(DT);

    session.pause().expect("courier mode");
    let paused = session.agents().get(COURIER).cloned().expect("courier placed");
    for _ in 0..5 {
        let _ = session.tick(DT);
    }
    let still = session.agents().get(COURIER).cloned().expect("courier placed");
    assert_eq!(still.cell, paused.cell);
    assert_eq!(still.path, paused.path);
    assert_eq!(still.state, MotionState::Paused);

    session.start().expect("plan installed");
    let _ = session.tick(DT);
    let moved = session.agents().get(COURIER).cloned().expect("courier placed");
    assert_eq!(Some(moved.cell), paused.path.first().copied());
}

#[test]
fn randomize_on_blocked_grid_leaves_session_untouched() {
    let mut session = session_with(TraversabilityMask::blocked(10, 10), 1);
    let before = session.snapshot();

    assert_eq!(
        session.randomize(),
        Err(SessionError::Configuration(
            ConfigurationError::NoTraversableCell
        ))
    );
    assert_eq!(session.snapshot(), before);
    assert_eq!(session.start(), Err(SessionError::NoPlan));
}

#[test]
fn disconnected_islands_exhaust_plan_attempts() {
    let mask =
        TraversabilityMask::from_fn(9, 9, |cell| cell.column() % 2 == 0 && cell.row() % 2 == 0);
    let mut session = session_with(mask, 3);

    assert!(matches!(
        session.randomize(),
        Err(SessionError::Configuration(
            ConfigurationError::NoRoutablePlan { attempts: 100 }
        ))
    ));
}

#[test]
fn mismatched_map_is_rejected() {
    let mut session = session_with(TraversabilityMask::open(10, 10), 1);

    assert_eq!(
        session.load_mask(TraversabilityMask::open(8, 10)),
        Err(SessionError::Mask(MaskError::DimensionMismatch {
            expected_columns: 10,
            expected_rows: 10,
            actual_columns: 8,
            actual_rows: 10,
        }))
    );
    assert_eq!(session.grid().open_count(), 100);
}

#[test]
fn short_map_payload_never_reaches_the_grid() {
    let session = session_with(TraversabilityMask::open(3, 3), 1);

    let decoded = serde_json::from_str::<TraversabilityMask>(
        r#"{"columns":3,"rows":3,"cells":[true,true]}"#,
    );

    let error = decoded.expect_err("two cells cannot fill a 3x3 map");
    assert!(error.to_string().contains("carries 2 cells"), "{error}");
    assert_eq!(session.grid().open_count(), 9);
    assert_eq!(
        courier_chase_system_pathfinding::find_path(
            CellCoord::new(2, 2),
            CellCoord::new(1, 0),
            session.grid()
        )
        .len(),
        3
    );
}

#[test]
fn blocked_courier_signals_and_recovers_after_reroute() {
    let mut session = session_with(TraversabilityMask::open(20, 20), 5);
    session.set_speed(TicksPerCell::new(1));
    let _ = session.randomize().expect("open grid is routable");
    session.start().expect("plan installed");

    let courier = session.agents().get(COURIER).cloned().expect("courier placed");
    let next = courier.path[0];
    let next_is_waypoint = session
        .courier_plan()
        .map_or(false, |plan| plan.waypoints().contains(&next));
    let walled = TraversabilityMask::from_fn(20, 20, |cell| cell != next);
    let _ = session.load_mask(walled).expect("dimensions match");

    assert_eq!(
        session.tick(DT),
        vec![Signal::Blocked {
            agent: COURIER,
            cell: next,
        }]
    );
    assert!(session.tick(DT).is_empty());
    assert_eq!(
        session.agents().get(COURIER).map(|agent| agent.state),
        Some(MotionState::Blocked)
    );
    assert_eq!(session.start(), Err(SessionError::CourierBlocked));

    if next_is_waypoint {
        assert_eq!(session.reroute(), Ok(false));
        return;
    }

    assert_eq!(session.reroute(), Ok(true));
    let mut delivered = false;
    for _ in 0..2_000 {
        let signals = session.tick(DT);
        if signals
            .iter()
            .any(|signal| matches!(signal, Signal::Blocked { .. }))
        {
            assert_eq!(session.reroute(), Ok(true));
        }
        if signals.contains(&Signal::Idle { agent: COURIER }) {
            delivered = true;
            break;
        }
    }
    assert!(delivered);
}

#[test]
fn pursuit_needs_enough_room() {
    let mut session = session_with(TraversabilityMask::open(6, 6), 2);

    assert_eq!(
        session.start_pursuit_mode(),
        Err(SessionError::Configuration(
            ConfigurationError::SeparationUnsatisfiable {
                min_separation: 15,
                attempts: 1_000,
            }
        ))
    );
    assert_eq!(session.mode(), SessionMode::Courier);
    assert!(session.agents().into_vec().is_empty());
}

#[test]
fn pursuit_replaces_courier_and_stop_freezes_agents() {
    let mut session = session_with(TraversabilityMask::open(40, 30), 8);
    let _ = session.randomize().expect("open grid is routable");

    let placement = session
        .start_pursuit_mode()
        .expect("large grid satisfies separation");
    assert!(placement.seeker.manhattan_distance(placement.hider) >= 15);
    let agents = session.agents();
    assert!(agents.get(COURIER).is_none());
    assert_eq!(agents.get(SEEKER).map(|agent| agent.cell), Some(placement.seeker));
    assert_eq!(agents.get(HIDER).map(|agent| agent.cell), Some(placement.hider));

    for _ in 0..30 {
        let _ = session.tick(DT);
    }
    let signals = session.stop_pursuit_mode().expect("pursuit mode");
    assert_eq!(signals, vec![Signal::Stopped]);

    let frozen: Vec<CellCoord> = session.agents().iter().map(|agent| agent.cell).collect();
    for _ in 0..100 {
        assert!(session.tick(DT).is_empty());
    }
    let later: Vec<CellCoord> = session.agents().iter().map(|agent| agent.cell).collect();
    assert_eq!(frozen, later);
    assert_eq!(session.stop_pursuit_mode(), Ok(Vec::new()));
}

#[test]
fn pursuit_replay_resets_positions() {
    let mut session = session_with(TraversabilityMask::open(40, 30), 21);
    let placement = session
        .start_pursuit_mode()
        .expect("large grid satisfies separation");
    for _ in 0..25 {
        let _ = session.tick(DT);
    }

    session.replay().expect("placement saved");

    let agents = session.agents();
    assert_eq!(agents.get(SEEKER).map(|agent| agent.cell), Some(placement.seeker));
    assert_eq!(agents.get(HIDER).map(|agent| agent.cell), Some(placement.hider));
    assert_eq!(session.snapshot().pursuit_elapsed, Duration::ZERO);
    assert_eq!(session.snapshot().outcome, None);
}

#[test]
fn capture_ends_round_with_elapsed_time() {
    let mut session = SimulationSession::new(SessionConfig {
        columns: 40,
        rows: 1,
        seed: 4,
        pursuit: PursuitSettings {
            seeker_speed: 1,
            hider_speed: 10_000,
            ..PursuitSettings::default()
        },
        ..SessionConfig::default()
    });
    let _ = session
        .load_mask(TraversabilityMask::open(40, 1))
        .expect("dimensions match");
    let placement = session
        .start_pursuit_mode()
        .expect("corridor is long enough");

    let signals = run_until(&mut session, 1_000, |signal| {
        matches!(signal, Signal::Caught { .. })
    });

    let distance = placement.seeker.manhattan_distance(placement.hider);
    assert_eq!(
        signals,
        vec![Signal::Caught {
            elapsed: DT * distance,
        }]
    );
    assert_eq!(session.snapshot().tick, u64::from(distance));
    let agents = session.agents();
    assert_eq!(
        agents.get(SEEKER).map(|agent| agent.cell),
        Some(placement.hider)
    );
}

#[test]
fn mode_guards_are_enforced() {
    let mut session = session_with(TraversabilityMask::open(10, 10), 1);

    assert_eq!(
        session.stop_pursuit_mode(),
        Err(SessionError::ModeMismatch {
            expected: SessionMode::Pursuit,
            actual: SessionMode::Courier,
        })
    );
    assert_eq!(session.replay(), Err(SessionError::NoPlan));
}
