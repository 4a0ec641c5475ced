#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Greedy dispatcher matching robots to fires and water sources.
//!
//! Matching walks robots in roster order and hands each one the nearest
//! remaining target by travel time. It never revisits an earlier choice, so
//! the overall assignment is not globally optimal.

use fire_brigade_core::{
    ActionSequence, Assignment, CellCoord, CellFire, Command, FireId, FireSnapshot, FireState,
    GridView, RobotId, RobotSnapshot, TerminalAction, TravelDuration,
};
use fire_brigade_system_pathfinder::Pathfinder;
use log::{info, warn};
use thiserror::Error;

/// Reasons a robot could not be given a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum DispatchFailure {
    /// None of the candidate fires can be reached.
    #[error("no candidate fire is reachable")]
    NoReachableFire,
    /// The map holds no water cell at all.
    #[error("the map has no water source")]
    NoWaterSource,
    /// None of the water sources can be reached.
    #[error("no water source is reachable")]
    NoReachableWater,
    /// The requested destination cannot be reached.
    #[error("destination is unreachable")]
    UnreachableDestination,
}

/// Itinerary handed to one robot during a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dispatch {
    /// Robot that received the itinerary.
    pub robot: RobotId,
    /// Task closing the itinerary.
    pub assignment: Assignment,
    /// Travel time along the issued path.
    pub eta: u64,
}

/// Outcome of one dispatching pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Robots that received an itinerary.
    pub dispatched: Vec<Dispatch>,
    /// Fires left without a robot at the end of the pass.
    pub deferred_fires: Vec<FireId>,
    /// Robots that were considered but received no task.
    pub unassigned: Vec<(RobotId, DispatchFailure)>,
}

/// Pure system that plans itineraries and emits dispatch commands.
#[derive(Debug, Default)]
pub struct Dispatcher {
    pathfinder: Pathfinder,
    fire_layer: Vec<Option<CellFire>>,
    candidates: Vec<FireSnapshot>,
}

impl Dispatcher {
    /// Sends free robots, in roster order, to the nearest still unclaimed fire.
    pub fn assign_free_robots_to_fires(
        &mut self,
        grid: &GridView<'_>,
        free_robots: &[RobotSnapshot],
        active_fires: &[FireSnapshot],
        out: &mut Vec<Command>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        self.fire_layer.clear();
        self.fire_layer.extend_from_slice(grid.fire_layer());
        self.candidates.clear();
        self.candidates.extend(
            active_fires
                .iter()
                .filter(|fire| fire.state == FireState::Active)
                .copied(),
        );

        for robot in free_robots {
            if self.candidates.is_empty() {
                break;
            }
            if robot.kind.is_command() {
                continue;
            }

            let view = grid.with_fire_layer(&self.fire_layer);
            let nearest = nearest(
                self.candidates.iter().map(|fire| fire.cell),
                |cell| self.pathfinder.travel_duration(&view, robot, cell),
            );
            let Some((position, estimate)) = nearest else {
                warn!("robot {} cannot reach any active fire", robot.id.get());
                report
                    .unassigned
                    .push((robot.id, DispatchFailure::NoReachableFire));
                continue;
            };

            let fire = self.candidates.remove(position);
            if let Some(slot) = grid
                .index(fire.cell)
                .and_then(|index| self.fire_layer.get_mut(index))
            {
                *slot = Some(CellFire {
                    id: fire.id,
                    state: FireState::Targeted,
                });
            }

            // The claimed fire is no longer a hazard, so the route may end on it.
            let view = grid.with_fire_layer(&self.fire_layer);
            let (path, eta) = self
                .pathfinder
                .route(&view, robot, fire.cell)
                .map_or((Vec::new(), estimate), |route| {
                    (route.path, route.duration)
                });
            let assignment = Assignment::Extinguish { fire: fire.id };
            info!(
                "robot {} sent to fire {} at ({}, {}), eta {eta}",
                robot.id.get(),
                fire.id.get(),
                fire.cell.column(),
                fire.cell.row()
            );
            out.push(Command::DispatchRobot {
                robot: robot.id,
                assignment,
                actions: ActionSequence::from_path(&path, Some(TerminalAction::Extinguish)),
            });
            report.dispatched.push(Dispatch {
                robot: robot.id,
                assignment,
                eta,
            });
        }

        report
            .deferred_fires
            .extend(self.candidates.iter().map(|fire| fire.id));
        report
    }

    /// Sends each robot waiting for water to its nearest reachable source.
    pub fn send_empty_robots_to_refill(
        &mut self,
        grid: &GridView<'_>,
        empty_robots: &[RobotSnapshot],
        out: &mut Vec<Command>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let sources = grid.water_sources();

        for robot in empty_robots {
            if sources.is_empty() {
                warn!("robot {} needs water but the map has none", robot.id.get());
                report
                    .unassigned
                    .push((robot.id, DispatchFailure::NoWaterSource));
                continue;
            }

            let nearest = nearest(sources.iter().copied(), |cell| {
                self.pathfinder.travel_duration(grid, robot, cell)
            });
            let Some((position, eta)) = nearest else {
                warn!("robot {} cannot reach any water source", robot.id.get());
                report
                    .unassigned
                    .push((robot.id, DispatchFailure::NoReachableWater));
                continue;
            };

            let source = sources[position];
            let path = self.pathfinder.path(grid, robot, source);
            let assignment = Assignment::Refill { source };
            info!(
                "robot {} sent to refill at ({}, {}), eta {eta}",
                robot.id.get(),
                source.column(),
                source.row()
            );
            out.push(Command::DispatchRobot {
                robot: robot.id,
                assignment,
                actions: ActionSequence::from_path(&path, Some(TerminalAction::Refill)),
            });
            report.dispatched.push(Dispatch {
                robot: robot.id,
                assignment,
                eta,
            });
        }

        report
    }

    /// Moves a robot towards a cell without any task at the end.
    pub fn send_robot_to(
        &mut self,
        grid: &GridView<'_>,
        robot: &RobotSnapshot,
        destination: CellCoord,
        out: &mut Vec<Command>,
    ) -> Result<u64, DispatchFailure> {
        let route = self
            .pathfinder
            .route(grid, robot, destination)
            .ok_or(DispatchFailure::UnreachableDestination)?;

        out.push(Command::DispatchRobot {
            robot: robot.id,
            assignment: Assignment::Relocate { destination },
            actions: ActionSequence::from_path(&route.path, None),
        });
        Ok(route.duration)
    }
}

/// Position and duration of the first strictly shortest finite travel time.
fn nearest<I, F>(cells: I, mut duration_to: F) -> Option<(usize, u64)>
where
    I: Iterator<Item = CellCoord>,
    F: FnMut(CellCoord) -> TravelDuration,
{
    let mut best: Option<(usize, u64)> = None;
    for (position, cell) in cells.enumerate() {
        let Some(duration) = duration_to(cell).finite() else {
            continue;
        };
        if best.map_or(true, |(_, shortest)| duration < shortest) {
            best = Some((position, duration));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_prefers_first_strict_minimum() {
        let cells = [
            CellCoord::new(0, 0),
            CellCoord::new(1, 0),
            CellCoord::new(2, 0),
            CellCoord::new(3, 0),
        ];
        let durations = [
            TravelDuration::Unreachable,
            TravelDuration::Finite(20),
            TravelDuration::Finite(10),
            TravelDuration::Finite(10),
        ];

        let best = nearest(cells.iter().copied(), |cell| {
            durations[cell.column() as usize]
        });
        assert_eq!(best, Some((2, 10)));
    }

    #[test]
    fn nearest_ignores_unreachable_candidates() {
        let cells = [CellCoord::new(0, 0), CellCoord::new(1, 0)];
        let best = nearest(cells.iter().copied(), |_| TravelDuration::Unreachable);
        assert_eq!(best, None);
    }
}
