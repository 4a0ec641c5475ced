//! Seeded generation of maps, fleets and fires.

use fire_brigade_core::{CellCoord, Command, RobotKind, Terrain};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{ScenarioConfig, FLEET_SIZE};

const FLEET: [RobotKind; FLEET_SIZE as usize] = [
    RobotKind::Tracked,
    RobotKind::Wheeled,
    RobotKind::Legged,
    RobotKind::Flying,
    RobotKind::Command,
];

const MIN_FIRE_COST: u32 = 500;
const MAX_FIRE_COST: u32 = 8_000;

/// Builds the command batch that sets up a scenario on a fresh world.
///
/// The same configuration always yields the same batch.
pub(crate) fn generate(config: &ScenarioConfig) -> Vec<Command> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut commands = vec![Command::ConfigureGrid {
        columns: config.columns,
        rows: config.rows,
        cell_size_meters: config.cell_size_meters,
    }];

    let mut land = Vec::new();
    for row in 0..config.rows {
        for column in 0..config.columns {
            let cell = CellCoord::new(column, row);
            let terrain = roll_terrain(&mut rng);
            if terrain != Terrain::Open {
                commands.push(Command::SetTerrain { cell, terrain });
            }
            if terrain != Terrain::Water {
                land.push(cell);
            }
        }
    }

    land.shuffle(&mut rng);
    let mut cells = land.into_iter();

    for kind in FLEET {
        let Some(cell) = cells.next() else {
            break;
        };
        commands.push(Command::DeployRobot {
            kind,
            cell,
            speed: None,
        });
    }

    for cell in cells.take(config.fires as usize) {
        commands.push(Command::IgniteFire {
            cell,
            cost: rng.gen_range(MIN_FIRE_COST..=MAX_FIRE_COST),
        });
    }

    commands
}

fn roll_terrain(rng: &mut ChaCha8Rng) -> Terrain {
    match rng.gen_range(0..100) {
        0..=7 => Terrain::Water,
        8..=22 => Terrain::Forest,
        23..=30 => Terrain::Rock,
        31..=40 => Terrain::Habitat,
        _ => Terrain::Open,
    }
}
