//! Command-line arguments and the validated scenario configuration.

use anyhow::{bail, Result};
use clap::Parser;

/// Number of robots deployed by every generated scenario, one per kind.
pub(crate) const FLEET_SIZE: u64 = 5;

const DEFAULT_COLUMNS: u32 = 20;
const DEFAULT_ROWS: u32 = 15;
const DEFAULT_CELL_SIZE_METERS: u32 = 10_000;
const DEFAULT_FIRES: u32 = 6;
const DEFAULT_SEED: u64 = 0x5eed_f12e;
const DEFAULT_MAX_TICKS: u32 = 2_000;

/// Simulates a fire brigade of robots dispatched against wildfires.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// Number of cell columns in the generated map.
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    pub(crate) columns: u32,

    /// Number of cell rows in the generated map.
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub(crate) rows: u32,

    /// Side length of a cell in metres.
    #[arg(long, default_value_t = DEFAULT_CELL_SIZE_METERS)]
    pub(crate) cell_size: u32,

    /// Number of fires ignited at startup.
    #[arg(long, default_value_t = DEFAULT_FIRES)]
    pub(crate) fires: u32,

    /// Seed driving map, fleet and fire generation.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,

    /// Upper bound on simulated ticks before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    pub(crate) max_ticks: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Validated parameters of a generated scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScenarioConfig {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) cell_size_meters: u32,
    pub(crate) fires: u32,
    pub(crate) seed: u64,
    pub(crate) max_ticks: u32,
}

impl ScenarioConfig {
    /// Checks the raw arguments and builds a configuration from them.
    pub(crate) fn from_args(args: &Args) -> Result<Self> {
        if args.columns == 0 || args.rows == 0 {
            bail!(
                "map must have at least one cell, got {}x{}",
                args.columns,
                args.rows
            );
        }
        if args.cell_size == 0 {
            bail!("cell size must be positive");
        }
        if args.max_ticks == 0 {
            bail!("max ticks must be positive");
        }

        let cells = u64::from(args.columns) * u64::from(args.rows);
        let required = u64::from(args.fires) + FLEET_SIZE;
        if cells < required {
            bail!(
                "a {}x{} map cannot hold {} fires and {FLEET_SIZE} robots",
                args.columns,
                args.rows,
                args.fires
            );
        }

        Ok(Self {
            columns: args.columns,
            rows: args.rows,
            cell_size_meters: args.cell_size,
            fires: args.fires,
            seed: args.seed,
            max_ticks: args.max_ticks,
        })
    }
}
