#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Terrain-weighted shortest path search for robots on the grid.
//!
//! The search is Dijkstra over the four-connected grid. Edge weights depend on
//! the robot's speed on the two cells an edge joins, so every robot kind sees
//! a different graph over the same map. Ground robots never stop on a hazard
//! (water or an unassigned fire): the search ends one step short instead.

use std::{cmp::Reverse, collections::BinaryHeap};

use fire_brigade_core::{
    CellCoord, Direction, GridView, Mobility, RobotSnapshot, TravelDuration,
    TIME_UNITS_PER_KILOMETRE,
};
use log::debug;

/// Simulated time needed to cross from `from` into the adjacent cell `to`.
///
/// Returns `None` when either cell is impassable for the robot or lies
/// outside the grid.
#[must_use]
pub fn edge_cost(
    grid: &GridView<'_>,
    mobility: &Mobility,
    from: CellCoord,
    to: CellCoord,
) -> Option<u64> {
    let from_speed = mobility.speed_on(grid.terrain(from)?);
    let to_speed = mobility.speed_on(grid.terrain(to)?);
    if from_speed == 0 || to_speed == 0 {
        return None;
    }

    let mean_speed = (u64::from(from_speed) + u64::from(to_speed)) / 2;
    Some(u64::from(grid.cell_size_meters()) * TIME_UNITS_PER_KILOMETRE / mean_speed)
}

/// Result of a successful search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Cell where the robot stops; the destination or one of its neighbours.
    pub terminus: CellCoord,
    /// Travel time to the terminus in simulated time units.
    pub duration: u64,
    /// Moves leading from the robot's cell to the terminus.
    pub path: Vec<Direction>,
}

/// Dijkstra search that reuses its scratch buffers between queries.
#[derive(Debug, Default)]
pub struct Pathfinder {
    distances: Vec<u64>,
    predecessors: Vec<Option<(usize, Direction)>>,
    frontier: BinaryHeap<Reverse<(u64, u64, usize)>>,
}

impl Pathfinder {
    /// Travel time from the robot's cell to the resolved terminus.
    pub fn travel_duration(
        &mut self,
        grid: &GridView<'_>,
        robot: &RobotSnapshot,
        destination: CellCoord,
    ) -> TravelDuration {
        self.route(grid, robot, destination)
            .map_or(TravelDuration::Unreachable, |route| {
                TravelDuration::Finite(route.duration)
            })
    }

    /// Moves leading the robot to the resolved terminus; empty when
    /// unreachable or already there.
    pub fn path(
        &mut self,
        grid: &GridView<'_>,
        robot: &RobotSnapshot,
        destination: CellCoord,
    ) -> Vec<Direction> {
        self.route(grid, robot, destination)
            .map(|route| route.path)
            .unwrap_or_default()
    }

    /// Full search result, or `None` when no route exists.
    pub fn route(
        &mut self,
        grid: &GridView<'_>,
        robot: &RobotSnapshot,
        destination: CellCoord,
    ) -> Option<Route> {
        let start = grid.index(robot.cell)?;
        let goal = grid.index(destination)?;
        if start == goal {
            return Some(Route {
                terminus: robot.cell,
                duration: 0,
                path: Vec::new(),
            });
        }

        let mobility = robot.mobility();
        let terminus = self.search(grid, &mobility, start, goal)?;
        let route = self.build_route(grid, start, terminus)?;
        debug!(
            "robot {} reaches ({}, {}) for ({}, {}) in {} units over {} moves",
            robot.id.get(),
            route.terminus.column(),
            route.terminus.row(),
            destination.column(),
            destination.row(),
            route.duration,
            route.path.len()
        );
        Some(route)
    }

    fn reset(&mut self, cell_count: usize) {
        self.distances.clear();
        self.distances.resize(cell_count, u64::MAX);
        self.predecessors.clear();
        self.predecessors.resize(cell_count, None);
        self.frontier.clear();
    }

    /// Runs the search and returns the index of the cell the robot stops on.
    fn search(
        &mut self,
        grid: &GridView<'_>,
        mobility: &Mobility,
        start: usize,
        goal: usize,
    ) -> Option<usize> {
        self.reset(grid.cell_count());
        let mut sequence: u64 = 0;
        self.distances[start] = 0;
        self.frontier.push(Reverse((0, sequence, start)));

        while let Some(Reverse((distance, _, index))) = self.frontier.pop() {
            if distance > self.distances[index] {
                continue;
            }

            let cell = grid.cell_at(index)?;
            if index == goal {
                if !mobility.traverses_hazards() && grid.is_hazard(cell) {
                    return self.predecessors[goal].map(|(previous, _)| previous);
                }
                return Some(goal);
            }

            for (direction, neighbor) in grid.neighbors(cell) {
                let Some(neighbor_index) = grid.index(neighbor) else {
                    continue;
                };
                let Some(cost) = edge_cost(grid, mobility, cell, neighbor) else {
                    if neighbor_index == goal {
                        return Some(index);
                    }
                    continue;
                };

                let candidate = distance.saturating_add(cost);
                if candidate < self.distances[neighbor_index] {
                    self.distances[neighbor_index] = candidate;
                    self.predecessors[neighbor_index] = Some((index, direction));
                    sequence += 1;
                    self.frontier
                        .push(Reverse((candidate, sequence, neighbor_index)));
                }
            }
        }

        None
    }

    fn build_route(&self, grid: &GridView<'_>, start: usize, terminus: usize) -> Option<Route> {
        let mut path = Vec::new();
        let mut current = terminus;
        while current != start {
            let (previous, direction) = self.predecessors[current]?;
            path.push(direction);
            current = previous;
        }
        path.reverse();

        Some(Route {
            terminus: grid.cell_at(terminus)?,
            duration: self.distances[terminus],
            path,
        })
    }
}
