//! Tick-driven executor feeding dispatcher commands and robot steps to the world.

use std::fmt;

use fire_brigade_core::{Command, Event, StepError};
use fire_brigade_system_dispatcher::Dispatcher;
use fire_brigade_world::{self as world, query, World};
use log::{debug, info};

/// How a simulation run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Every fire went out.
    AllExtinguished,
    /// A full tick passed without any robot acting.
    Stalled,
    /// The tick budget ran out with fires still burning.
    TickLimit,
}

/// Tallies collected over a simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) outcome: Outcome,
    pub(crate) ticks: u32,
    pub(crate) fires_ignited: usize,
    pub(crate) fires_extinguished: usize,
    pub(crate) dispatches: usize,
    pub(crate) rejections: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Outcome::AllExtinguished => "all fires extinguished",
            Outcome::Stalled => "stalled",
            Outcome::TickLimit => "tick limit reached",
        };
        write!(
            formatter,
            "{outcome} after {} ticks: {}/{} fires extinguished, ",
            self.ticks, self.fires_extinguished, self.fires_ignited
        )?;
        write!(
            formatter,
            "{} dispatches, {} rejected commands",
            self.dispatches, self.rejections
        )
    }
}

/// Owns the world and the dispatcher and advances both one tick at a time.
#[derive(Debug, Default)]
pub(crate) struct Simulation {
    world: World,
    dispatcher: Dispatcher,
    fires_ignited: usize,
    fires_extinguished: usize,
    dispatches: usize,
    rejections: usize,
}

impl Simulation {
    /// Applies a batch of commands and tallies the resulting events.
    pub(crate) fn submit(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.record(&events);
        events
    }

    /// Runs one dispatching pass and one step for every robot with work queued.
    ///
    /// Returns `false` when nothing happened at all.
    pub(crate) fn tick(&mut self) -> bool {
        let mut commands = Vec::new();
        {
            let grid = query::grid_view(&self.world);
            let free = query::free_robots(&self.world);
            let fires = query::active_fires(&self.world);
            let report = self
                .dispatcher
                .assign_free_robots_to_fires(&grid, &free, &fires, &mut commands);
            if !report.deferred_fires.is_empty() {
                debug!("{} fires wait for a robot", report.deferred_fires.len());
            }

            let empty = query::empty_robots(&self.world);
            let _ = self
                .dispatcher
                .send_empty_robots_to_refill(&grid, &empty, &mut commands);
        }

        let mut events = self.submit(commands);
        let mut steps = Vec::new();
        for robot in query::robots_with_itinerary(&self.world) {
            world::apply(&mut self.world, Command::StepRobot { robot }, &mut steps);
        }
        self.record(&steps);
        events.append(&mut steps);

        events.iter().any(|event| {
            matches!(
                event,
                Event::ItineraryIssued { .. }
                    | Event::RobotMoved { .. }
                    | Event::WaterPoured { .. }
                    | Event::ReservoirFilled { .. }
            )
        })
    }

    /// Ticks until every fire is out, the fleet stalls or the budget runs out.
    pub(crate) fn run(&mut self, max_ticks: u32) -> Summary {
        let mut ticks = 0;
        let mut stalled = false;
        while ticks < max_ticks && query::has_burning_fires(&self.world) {
            ticks += 1;
            if !self.tick() {
                stalled = true;
                break;
            }
        }

        let outcome = if !query::has_burning_fires(&self.world) {
            Outcome::AllExtinguished
        } else if stalled {
            Outcome::Stalled
        } else {
            Outcome::TickLimit
        };
        info!("simulation finished after {ticks} ticks: {outcome:?}");

        Summary {
            outcome,
            ticks,
            fires_ignited: self.fires_ignited,
            fires_extinguished: self.fires_extinguished,
            dispatches: self.dispatches,
            rejections: self.rejections,
        }
    }

    /// Read-only access to the simulated world.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::FireIgnited { .. } => self.fires_ignited += 1,
                Event::FireExtinguished { .. } => self.fires_extinguished += 1,
                Event::ItineraryIssued { .. } => self.dispatches += 1,
                Event::StepRejected {
                    reason: StepError::Blocked,
                    ..
                } => {}
                Event::PlacementRejected { .. }
                | Event::SpeedOverrideRejected { .. }
                | Event::DispatchRejected { .. }
                | Event::StepRejected { .. } => self.rejections += 1,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fire_brigade_core::{CellCoord, RobotKind, RobotState, Terrain};

    use crate::{config::ScenarioConfig, scenario};

    fn setup(columns: u32, rows: u32, commands: Vec<Command>) -> Simulation {
        let mut simulation = Simulation::default();
        let mut batch = vec![Command::ConfigureGrid {
            columns,
            rows,
            cell_size_meters: 100,
        }];
        batch.extend(commands);
        let _ = simulation.submit(batch);
        simulation
    }

    #[test]
    fn single_robot_puts_out_a_small_fire() {
        let mut simulation = setup(
            5,
            1,
            vec![
                Command::DeployRobot {
                    kind: RobotKind::Tracked,
                    cell: CellCoord::new(0, 0),
                    speed: None,
                },
                Command::IgniteFire {
                    cell: CellCoord::new(4, 0),
                    cost: 1000,
                },
            ],
        );

        let summary = simulation.run(50);
        assert_eq!(summary.outcome, Outcome::AllExtinguished);
        assert_eq!(summary.fires_extinguished, 1);
        assert_eq!(summary.dispatches, 1);
        assert_eq!(summary.rejections, 0);
    }

    #[test]
    fn robot_refills_before_finishing_a_large_fire() {
        let mut simulation = setup(
            5,
            2,
            vec![
                Command::SetTerrain {
                    cell: CellCoord::new(0, 1),
                    terrain: Terrain::Water,
                },
                Command::DeployRobot {
                    kind: RobotKind::Tracked,
                    cell: CellCoord::new(1, 0),
                    speed: None,
                },
                Command::IgniteFire {
                    cell: CellCoord::new(4, 0),
                    cost: 3000,
                },
            ],
        );

        let mut refilled = false;
        for _ in 0..200 {
            if !query::has_burning_fires(simulation.world()) {
                break;
            }
            assert!(simulation.tick(), "simulation stalled");
            refilled |= query::robot_view(simulation.world())
                .iter()
                .any(|robot| robot.state == RobotState::Filling);
        }

        assert!(refilled);
        assert!(!query::has_burning_fires(simulation.world()));
        assert_eq!(simulation.fires_extinguished, 1);
        assert_eq!(simulation.dispatches, 3);
    }

    #[test]
    fn robots_cross_the_command_robot_cell() {
        let mut simulation = setup(
            3,
            2,
            vec![
                Command::DeployRobot {
                    kind: RobotKind::Tracked,
                    cell: CellCoord::new(0, 0),
                    speed: None,
                },
                Command::DeployRobot {
                    kind: RobotKind::Command,
                    cell: CellCoord::new(1, 0),
                    speed: None,
                },
                Command::IgniteFire {
                    cell: CellCoord::new(2, 0),
                    cost: 500,
                },
            ],
        );

        let summary = simulation.run(50);
        assert_eq!(summary.outcome, Outcome::AllExtinguished);
        assert_eq!(summary.fires_extinguished, 1);
        assert_eq!(summary.rejections, 0);
    }

    #[test]
    fn unreachable_fire_stalls_the_run() {
        let mut simulation = setup(
            3,
            1,
            vec![
                Command::SetTerrain {
                    cell: CellCoord::new(1, 0),
                    terrain: Terrain::Rock,
                },
                Command::DeployRobot {
                    kind: RobotKind::Wheeled,
                    cell: CellCoord::new(0, 0),
                    speed: None,
                },
                Command::IgniteFire {
                    cell: CellCoord::new(2, 0),
                    cost: 100,
                },
            ],
        );

        let summary = simulation.run(50);
        assert_eq!(summary.outcome, Outcome::Stalled);
        assert_eq!(summary.ticks, 1);
        assert_eq!(summary.fires_extinguished, 0);
    }

    #[test]
    fn generated_runs_replay_identically() {
        let config = ScenarioConfig {
            columns: 10,
            rows: 8,
            cell_size_meters: 500,
            fires: 4,
            seed: 99,
            max_ticks: 300,
        };

        let run = || {
            let mut simulation = Simulation::default();
            let _ = simulation.submit(scenario::generate(&config));
            simulation.run(config.max_ticks)
        };

        let first = run();
        assert_eq!(first, run());
        assert_eq!(first.fires_ignited, 4);
        assert!(first.ticks <= config.max_ticks);
    }
}
