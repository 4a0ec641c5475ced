#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates a scenario and runs the fire brigade on it.

mod config;
mod logging;
mod scenario;
mod simulation;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use fire_brigade_world::query;
use log::info;

use config::{Args, ScenarioConfig};
use simulation::Simulation;

/// Entry point for the Fire Brigade command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = ScenarioConfig::from_args(&args).context("invalid scenario arguments")?;
    info!(
        "generating a {}x{} map with {} fires from seed {:#x}",
        config.columns, config.rows, config.fires, config.seed
    );

    let mut simulation = Simulation::default();
    let _ = simulation.submit(scenario::generate(&config));
    let deployed = query::robot_view(simulation.world()).iter().count();
    ensure!(deployed > 0, "the generated map has no room for robots");

    let summary = simulation.run(config.max_ticks);
    println!("{summary}");

    for robot in query::robot_view(simulation.world()).iter() {
        println!(
            "robot {:>2} {:<8} at ({:>3}, {:>3}) {:<13} water {:>3}%",
            robot.id.get(),
            format!("{:?}", robot.kind),
            robot.cell.column(),
            robot.cell.row(),
            format!("{:?}", robot.state),
            robot.water_percent()
        );
    }
    for fire in query::fire_view(simulation.world()).iter() {
        println!(
            "fire  {:>2} at ({:>3}, {:>3}) {:<12} {:>3}% left",
            fire.id.get(),
            fire.cell.column(),
            fire.cell.row(),
            format!("{:?}", fire.state),
            fire.percent_remaining()
        );
    }

    Ok(())
}
