//! Local escape search for the hider.

use courier_chase_core::{CellCoord, GridView, Path};
use courier_chase_system_pathfinding::PathPlanner;

/// Winning escape candidate together with the route to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapeRoute {
    /// Candidate cell the hider flees to.
    pub target: CellCoord,
    /// Route from the hider to the target.
    pub path: Path,
    /// Manhattan distance between the target and the seeker.
    pub distance: u32,
}

/// Picks the axis-aligned offset of length `magnitude` that lands farthest
/// from the seeker.
///
/// Candidates are scanned north, east, south, west. Out-of-bounds and
/// unreachable candidates are skipped and a candidate only wins when it is
/// strictly farther than every earlier one, so ties go to the first found.
/// Returns `None` when no candidate lies at a positive distance.
pub fn escape_route(
    planner: &mut PathPlanner,
    grid: GridView<'_>,
    hider: CellCoord,
    seeker: CellCoord,
    magnitude: u32,
) -> Option<EscapeRoute> {
    let step = i32::try_from(magnitude).ok()?;
    let offsets = [(0, -step), (step, 0), (0, step), (-step, 0)];

    let mut best: Option<EscapeRoute> = None;
    for (column_delta, row_delta) in offsets {
        let Some(target) = hider.offset(column_delta, row_delta) else {
            continue;
        };
        if !grid.contains(target) {
            continue;
        }
        let path = planner.find_path(hider, target, grid);
        if path.is_empty() {
            continue;
        }

        let distance = target.manhattan_distance(seeker);
        let best_distance = best.as_ref().map_or(0, |route| route.distance);
        if distance > best_distance {
            best = Some(EscapeRoute {
                target,
                path,
                distance,
            });
        }
    }
    best
}
