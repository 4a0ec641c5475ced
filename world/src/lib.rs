#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Fire Brigade.

mod entities;
mod grid;

use std::collections::VecDeque;

use fire_brigade_core::{
    Action, ActionSequence, Assignment, CellCoord, Command, DispatchError, Event, FireId,
    FireState, PlacementError, RobotId, RobotKind, RobotState, StepError, Terrain, TerminalAction,
};
use log::{debug, info, warn};

use entities::{Fire, Robot};
use grid::Grid;

const DEFAULT_GRID_COLUMNS: u32 = 10;
const DEFAULT_GRID_ROWS: u32 = 10;
const DEFAULT_CELL_SIZE_METERS: u32 = 10_000;

/// Represents the authoritative Fire Brigade world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    robots: Vec<Robot>,
    fires: Vec<Fire>,
    active_fires: VecDeque<FireId>,
    free_roster: VecDeque<RobotId>,
    empty_robots: VecDeque<RobotId>,
}

impl World {
    /// Creates a new world covered by open terrain, without robots or fires.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::new(
                DEFAULT_GRID_COLUMNS,
                DEFAULT_GRID_ROWS,
                DEFAULT_CELL_SIZE_METERS,
            ),
            robots: Vec::new(),
            fires: Vec::new(),
            active_fires: VecDeque::new(),
            free_roster: VecDeque::new(),
            empty_robots: VecDeque::new(),
        }
    }

    fn robot(&self, robot: RobotId) -> Option<&Robot> {
        usize::try_from(robot.get())
            .ok()
            .and_then(|index| self.robots.get(index))
    }

    fn robot_mut(&mut self, robot: RobotId) -> Option<&mut Robot> {
        usize::try_from(robot.get())
            .ok()
            .and_then(|index| self.robots.get_mut(index))
    }

    fn fire_mut(&mut self, fire: FireId) -> Option<&mut Fire> {
        usize::try_from(fire.get())
            .ok()
            .and_then(|index| self.fires.get_mut(index))
    }

    fn fire(&self, fire: FireId) -> Option<&Fire> {
        usize::try_from(fire.get())
            .ok()
            .and_then(|index| self.fires.get(index))
    }

    fn configure_grid(&mut self, columns: u32, rows: u32, cell_size_meters: u32) {
        self.grid = Grid::new(columns, rows, cell_size_meters);
        self.robots.clear();
        self.fires.clear();
        self.active_fires.clear();
        self.free_roster.clear();
        self.empty_robots.clear();
    }

    fn ignite_fire(&mut self, cell: CellCoord, cost: u32) -> Result<FireId, PlacementError> {
        if !self.grid.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if cost == 0 {
            return Err(PlacementError::ZeroCost);
        }
        if self.grid.fire(cell).is_some() {
            return Err(PlacementError::AlreadyBurning);
        }

        let id = FireId::new(next_id(self.fires.len()));
        self.fires.push(Fire::new(id, cell, cost));
        self.grid.attach_fire(cell, id);
        self.active_fires.push_back(id);
        Ok(id)
    }

    fn deploy_robot(
        &mut self,
        kind: RobotKind,
        cell: CellCoord,
        speed: Option<u32>,
    ) -> Result<RobotId, PlacementError> {
        if !self.grid.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.grid.occupant(cell).is_some() {
            return Err(PlacementError::Occupied);
        }

        let id = RobotId::new(next_id(self.robots.len()));
        let speed = speed.unwrap_or_else(|| kind.base_speed());
        self.robots.push(Robot::new(id, kind, cell, speed));
        if !kind.is_command() {
            self.grid.occupy(cell, id);
            self.free_roster.push_back(id);
        }
        Ok(id)
    }

    fn dispatch_robot(
        &mut self,
        robot_id: RobotId,
        assignment: Assignment,
        actions: &ActionSequence,
    ) -> Result<(), DispatchError> {
        let robot = self.robot(robot_id).ok_or(DispatchError::MissingRobot)?;
        if robot.kind.is_command() {
            return Err(DispatchError::CommandOnly);
        }
        if robot.state != RobotState::Free {
            return Err(DispatchError::RobotBusy);
        }

        let expected_terminal = match assignment {
            Assignment::Extinguish { fire } => {
                let available = self
                    .fire(fire)
                    .map_or(false, |fire| fire.state == FireState::Active);
                if !available {
                    return Err(DispatchError::FireUnavailable);
                }
                Some(TerminalAction::Extinguish)
            }
            Assignment::Refill { source } => {
                if self.grid.terrain(source) != Some(Terrain::Water) {
                    return Err(DispatchError::NotWater);
                }
                Some(TerminalAction::Refill)
            }
            Assignment::Relocate { destination } => {
                if !self.grid.contains(destination) {
                    return Err(DispatchError::OutOfBounds);
                }
                None
            }
        };

        if !is_well_formed(actions, expected_terminal) {
            return Err(DispatchError::MismatchedActions);
        }

        self.free_roster.retain(|id| *id != robot_id);
        self.empty_robots.retain(|id| *id != robot_id);

        if let Assignment::Extinguish { fire } = assignment {
            if let Some(target) = self.fire_mut(fire) {
                let _ = target.target();
                let cell = target.cell;
                self.grid.set_fire_state(cell, FireState::Targeted);
            }
            self.active_fires.retain(|id| *id != fire);
        }

        if let Some(robot) = self.robot_mut(robot_id) {
            robot.assign(assignment, actions);
        }
        Ok(())
    }

    fn step_robot(&mut self, robot_id: RobotId, out_events: &mut Vec<Event>) {
        let Some(action) = self.robot(robot_id).map(Robot::next_action) else {
            out_events.push(Event::StepRejected {
                robot: robot_id,
                reason: StepError::MissingRobot,
            });
            return;
        };

        let Some(action) = action else {
            out_events.push(Event::StepRejected {
                robot: robot_id,
                reason: StepError::NoItinerary,
            });
            return;
        };

        let outcome = match action.direction() {
            Some(_) => self.advance_robot(robot_id, action, out_events),
            None if action == Action::Extinguish => self.pour_water(robot_id, out_events),
            None => self.take_in_water(robot_id, out_events),
        };

        if let Err(reason) = outcome {
            out_events.push(Event::StepRejected {
                robot: robot_id,
                reason,
            });
            if reason != StepError::Blocked {
                warn!("robot {} abandons its task: {reason}", robot_id.get());
                self.abandon_task(robot_id, out_events);
            }
        }
    }

    fn advance_robot(
        &mut self,
        robot_id: RobotId,
        action: Action,
        out_events: &mut Vec<Event>,
    ) -> Result<(), StepError> {
        let robot = self.robot(robot_id).ok_or(StepError::MissingRobot)?;
        let from = robot.cell;
        let direction = action.direction().ok_or(StepError::NoItinerary)?;
        let view = self.grid.view();
        let to = view.neighbor(from, direction).ok_or(StepError::OffGrid)?;

        let mobility = robot.mobility();
        let passable = [from, to].into_iter().all(|cell| {
            view.terrain(cell)
                .map_or(false, |terrain| mobility.speed_on(terrain) > 0)
        });
        if !passable {
            return Err(StepError::Impassable);
        }
        if self.grid.occupant(to).is_some() {
            return Err(StepError::Blocked);
        }

        self.grid.vacate(from);
        self.grid.occupy(to, robot_id);
        let finished = {
            let robot = self.robot_mut(robot_id).ok_or(StepError::MissingRobot)?;
            robot.cell = to;
            robot.complete_action();
            !robot.has_itinerary()
        };
        debug!(
            "robot {} moved from ({}, {}) to ({}, {})",
            robot_id.get(),
            from.column(),
            from.row(),
            to.column(),
            to.row()
        );
        out_events.push(Event::RobotMoved {
            robot: robot_id,
            from,
            to,
        });

        if finished {
            self.finish_task(robot_id, out_events);
        }
        Ok(())
    }

    fn pour_water(
        &mut self,
        robot_id: RobotId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), StepError> {
        let robot = self.robot(robot_id).ok_or(StepError::MissingRobot)?;
        let fire_id = robot.target_fire.ok_or(StepError::TargetLost)?;
        let robot_cell = robot.cell;
        let fire = self.fire(fire_id).ok_or(StepError::TargetLost)?;
        if fire.state == FireState::Extinguished {
            return Err(StepError::TargetLost);
        }
        let fire_cell = fire.cell;
        if robot_cell != fire_cell && !robot_cell.is_adjacent(fire_cell) {
            return Err(StepError::OutOfReach);
        }

        let (amount, reservoir_dry) = {
            let robot = self.robot_mut(robot_id).ok_or(StepError::MissingRobot)?;
            robot.state = RobotState::Extinguishing;
            let amount = robot.pour();
            (amount, robot.needs_refill())
        };

        let fire = self.fire_mut(fire_id).ok_or(StepError::TargetLost)?;
        let extinguished = fire.state == FireState::Targeted && fire.reduce_cost(amount);
        let remaining = fire.remaining();
        out_events.push(Event::WaterPoured {
            robot: robot_id,
            fire: fire_id,
            amount,
            remaining,
        });

        if extinguished {
            self.grid.detach_fire(fire_cell);
            info!(
                "fire {} at ({}, {}) extinguished by robot {}",
                fire_id.get(),
                fire_cell.column(),
                fire_cell.row(),
                robot_id.get()
            );
            out_events.push(Event::FireExtinguished {
                fire: fire_id,
                cell: fire_cell,
            });
            if let Some(robot) = self.robot_mut(robot_id) {
                robot.complete_action();
            }
            self.finish_task(robot_id, out_events);
        } else if reservoir_dry {
            self.release_fire(fire_id, out_events);
            if let Some(robot) = self.robot_mut(robot_id) {
                robot.complete_action();
            }
            self.finish_task(robot_id, out_events);
        }
        Ok(())
    }

    fn take_in_water(
        &mut self,
        robot_id: RobotId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), StepError> {
        let robot = self.robot(robot_id).ok_or(StepError::MissingRobot)?;
        let source = robot.target_water.ok_or(StepError::TargetLost)?;
        if robot.kind.fill_rate() == 0 {
            return Err(StepError::CannotRefill);
        }
        if self.grid.terrain(source) != Some(Terrain::Water) {
            return Err(StepError::TargetLost);
        }
        if robot.cell != source && !robot.cell.is_adjacent(source) {
            return Err(StepError::OutOfReach);
        }

        let robot = self.robot_mut(robot_id).ok_or(StepError::MissingRobot)?;
        robot.state = RobotState::Filling;
        let volume = robot.fill();
        let full = robot.is_full();
        if full {
            robot.complete_action();
        }
        out_events.push(Event::ReservoirFilled {
            robot: robot_id,
            volume,
        });

        if full {
            self.finish_task(robot_id, out_events);
        }
        Ok(())
    }

    fn release_fire(&mut self, fire_id: FireId, out_events: &mut Vec<Event>) {
        let Some(fire) = self.fire_mut(fire_id) else {
            return;
        };
        if !fire.release() {
            return;
        }
        let cell = fire.cell;
        self.grid.set_fire_state(cell, FireState::Active);
        self.active_fires.push_back(fire_id);
        info!("fire {} returns to the active set", fire_id.get());
        out_events.push(Event::FireReleased { fire: fire_id });
    }

    fn abandon_task(&mut self, robot_id: RobotId, out_events: &mut Vec<Event>) {
        if let Some(fire) = self.robot(robot_id).and_then(|robot| robot.target_fire) {
            self.release_fire(fire, out_events);
        }
        self.finish_task(robot_id, out_events);
    }

    /// Frees the robot and files it in the free roster or the empty queue.
    fn finish_task(&mut self, robot_id: RobotId, out_events: &mut Vec<Event>) {
        let Some(robot) = self.robot_mut(robot_id) else {
            return;
        };
        robot.clear_task();
        let needs_refill = robot.needs_refill();

        out_events.push(Event::RobotFreed { robot: robot_id });
        if needs_refill {
            self.empty_robots.push_back(robot_id);
            info!("robot {} needs a refill", robot_id.get());
            out_events.push(Event::ReservoirEmptied { robot: robot_id });
        } else {
            self.free_roster.push_back(robot_id);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid {
            columns,
            rows,
            cell_size_meters,
        } => {
            world.configure_grid(columns, rows, cell_size_meters);
            let (columns, rows) = world.grid.dimensions();
            out_events.push(Event::GridConfigured { columns, rows });
        }
        Command::SetTerrain { cell, terrain } => {
            if world.grid.set_terrain(cell, terrain) {
                out_events.push(Event::TerrainChanged { cell, terrain });
            } else {
                out_events.push(Event::PlacementRejected {
                    cell,
                    reason: PlacementError::OutOfBounds,
                });
            }
        }
        Command::IgniteFire { cell, cost } => match world.ignite_fire(cell, cost) {
            Ok(fire) => {
                info!(
                    "fire {} ignited at ({}, {}) with cost {cost}",
                    fire.get(),
                    cell.column(),
                    cell.row()
                );
                out_events.push(Event::FireIgnited { fire, cell, cost });
            }
            Err(reason) => out_events.push(Event::PlacementRejected { cell, reason }),
        },
        Command::DeployRobot { kind, cell, speed } => {
            match world.deploy_robot(kind, cell, speed) {
                Ok(robot) => out_events.push(Event::RobotDeployed { robot, kind, cell }),
                Err(reason) => out_events.push(Event::PlacementRejected { cell, reason }),
            }
        }
        Command::OverrideTerrainSpeed {
            robot,
            terrain,
            speed,
        } => match world.robot_mut(robot) {
            Some(entry) => {
                let speed = entry.override_speed(terrain, speed);
                out_events.push(Event::TerrainSpeedOverridden {
                    robot,
                    terrain,
                    speed,
                });
            }
            None => out_events.push(Event::SpeedOverrideRejected { robot }),
        },
        Command::DispatchRobot {
            robot,
            assignment,
            actions,
        } => match world.dispatch_robot(robot, assignment, &actions) {
            Ok(()) => {
                if let Assignment::Extinguish { fire } = assignment {
                    out_events.push(Event::FireTargeted { fire, robot });
                }
                debug!(
                    "robot {} received {} actions for {assignment:?}",
                    robot.get(),
                    actions.len()
                );
                out_events.push(Event::ItineraryIssued {
                    robot,
                    assignment,
                    actions,
                });
                let idle = world.robot(robot).map_or(false, |entry| !entry.has_itinerary());
                if idle {
                    world.finish_task(robot, out_events);
                }
            }
            Err(reason) => {
                warn!("dispatch of robot {} rejected: {reason}", robot.get());
                out_events.push(Event::DispatchRejected { robot, reason });
            }
        },
        Command::StepRobot { robot } => world.step_robot(robot, out_events),
    }
}

/// Checks that every action but the last is a move and the last matches `terminal`.
fn is_well_formed(actions: &ActionSequence, terminal: Option<TerminalAction>) -> bool {
    let terminal = terminal.map(Action::from);
    actions.terminal() == terminal
        && actions.move_count() + usize::from(terminal.is_some()) == actions.len()
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use fire_brigade_core::{
        Action, CellCoord, FireId, FireSnapshot, FireState, FireView, GridView, RobotId,
        RobotSnapshot, RobotView,
    };

    /// Exposes a read-only view of the grid layers and water registry.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Captures a read-only view of every robot in the fleet.
    #[must_use]
    pub fn robot_view(world: &World) -> RobotView {
        RobotView::from_snapshots(world.robots.iter().map(|robot| robot.snapshot()).collect())
    }

    /// Captures a read-only view of every fire ever ignited.
    #[must_use]
    pub fn fire_view(world: &World) -> FireView {
        FireView::from_snapshots(world.fires.iter().map(|fire| fire.snapshot()).collect())
    }

    /// Snapshot of a single robot.
    #[must_use]
    pub fn robot(world: &World, robot: RobotId) -> Option<RobotSnapshot> {
        world.robot(robot).map(|robot| robot.snapshot())
    }

    /// Snapshot of a single fire.
    #[must_use]
    pub fn fire(world: &World, fire: FireId) -> Option<FireSnapshot> {
        world.fire(fire).map(|fire| fire.snapshot())
    }

    /// Free robots in roster order.
    #[must_use]
    pub fn free_robots(world: &World) -> Vec<RobotSnapshot> {
        world
            .free_roster
            .iter()
            .filter_map(|id| robot(world, *id))
            .collect()
    }

    /// Robots waiting for a refill, in the order they ran dry.
    #[must_use]
    pub fn empty_robots(world: &World) -> Vec<RobotSnapshot> {
        world
            .empty_robots
            .iter()
            .filter_map(|id| robot(world, *id))
            .collect()
    }

    /// Fires awaiting a robot, in ignition or release order.
    #[must_use]
    pub fn active_fires(world: &World) -> Vec<FireSnapshot> {
        world
            .active_fires
            .iter()
            .filter_map(|id| fire(world, *id))
            .collect()
    }

    /// Reports whether any fire still burns.
    #[must_use]
    pub fn has_burning_fires(world: &World) -> bool {
        world
            .fires
            .iter()
            .any(|fire| fire.state != FireState::Extinguished)
    }

    /// Actions still queued for the robot.
    #[must_use]
    pub fn itinerary(world: &World, robot: RobotId) -> Vec<Action> {
        world
            .robot(robot)
            .map(|robot| robot.itinerary())
            .unwrap_or_default()
    }

    /// Robots with at least one queued action, in identifier order.
    #[must_use]
    pub fn robots_with_itinerary(world: &World) -> Vec<RobotId> {
        world
            .robots
            .iter()
            .filter(|robot| robot.has_itinerary())
            .map(|robot| robot.id)
            .collect()
    }

    /// Robot standing on the cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord) -> Option<RobotId> {
        world.grid.occupant(cell)
    }
}
