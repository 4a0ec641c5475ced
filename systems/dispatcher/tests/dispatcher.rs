use std::collections::HashSet;

use fire_brigade_core::{
    Action, Assignment, CellCoord, Command, Event, FireId, FireState, RobotId, RobotKind,
    RobotState, Terrain,
};
use fire_brigade_system_dispatcher::{Dispatch, DispatchFailure, DispatchReport, Dispatcher};
use fire_brigade_world::{self as world, query, World};

fn world_with(columns: u32, rows: u32, setup: Vec<Command>) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            columns,
            rows,
            cell_size_meters: 100,
        },
        &mut events,
    );
    for command in setup {
        world::apply(&mut world, command, &mut events);
    }
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::PlacementRejected { .. })),
        "setup rejected: {events:?}"
    );
    world
}

fn deploy(kind: RobotKind, column: u32, row: u32) -> Command {
    Command::DeployRobot {
        kind,
        cell: CellCoord::new(column, row),
        speed: None,
    }
}

fn ignite(column: u32, row: u32, cost: u32) -> Command {
    Command::IgniteFire {
        cell: CellCoord::new(column, row),
        cost,
    }
}

fn water(column: u32, row: u32) -> Command {
    Command::SetTerrain {
        cell: CellCoord::new(column, row),
        terrain: Terrain::Water,
    }
}

fn assign_fires(world: &World, dispatcher: &mut Dispatcher) -> (Vec<Command>, DispatchReport) {
    let grid = query::grid_view(world);
    let free = query::free_robots(world);
    let fires = query::active_fires(world);
    let mut commands = Vec::new();
    let report = dispatcher.assign_free_robots_to_fires(&grid, &free, &fires, &mut commands);
    (commands, report)
}

fn apply_all(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, Event::DispatchRejected { .. })),
        "dispatch rejected: {events:?}"
    );
    events
}

fn step_until_idle(world: &mut World, robot: RobotId) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..64 {
        if query::itinerary(world, robot).is_empty() {
            break;
        }
        world::apply(world, Command::StepRobot { robot }, &mut events);
    }
    events
}

#[test]
fn nearer_fire_is_assigned_and_farther_one_stays_active() {
    let mut world = world_with(
        6,
        1,
        vec![deploy(RobotKind::Tracked, 2, 0), ignite(5, 0, 100), ignite(0, 0, 100)],
    );
    let mut dispatcher = Dispatcher::default();

    let (commands, report) = assign_fires(&world, &mut dispatcher);

    let near = FireId::new(1);
    let far = FireId::new(0);
    assert_eq!(
        report.dispatched,
        vec![Dispatch {
            robot: RobotId::new(0),
            assignment: Assignment::Extinguish { fire: near },
            eta: 3332,
        }]
    );
    assert_eq!(report.deferred_fires, vec![far]);
    assert!(report.unassigned.is_empty());

    match commands.as_slice() {
        [Command::DispatchRobot { actions, .. }] => assert_eq!(
            actions.as_slice(),
            &[Action::MoveWest, Action::MoveWest, Action::Extinguish]
        ),
        other => panic!("unexpected commands: {other:?}"),
    }

    let _ = apply_all(&mut world, commands);
    assert_eq!(
        query::fire(&world, near).map(|fire| fire.state),
        Some(FireState::Targeted)
    );
    assert_eq!(
        query::fire(&world, far).map(|fire| fire.state),
        Some(FireState::Active)
    );
}

#[test]
fn a_pass_never_assigns_a_fire_twice() {
    let mut world = world_with(
        5,
        5,
        vec![
            deploy(RobotKind::Tracked, 0, 0),
            deploy(RobotKind::Legged, 4, 4),
            deploy(RobotKind::Flying, 2, 2),
            ignite(1, 1, 500),
            ignite(3, 3, 500),
        ],
    );
    let mut dispatcher = Dispatcher::default();

    let (commands, report) = assign_fires(&world, &mut dispatcher);

    assert_eq!(report.dispatched.len(), 2);
    let targeted: HashSet<Assignment> = report
        .dispatched
        .iter()
        .map(|dispatch| dispatch.assignment)
        .collect();
    assert_eq!(targeted.len(), 2);
    assert!(report.deferred_fires.is_empty());

    let events = apply_all(&mut world, commands);
    let issued = events
        .iter()
        .filter(|event| matches!(event, Event::ItineraryIssued { .. }))
        .count();
    assert_eq!(issued, 2);

    for robot in query::robot_view(&world).iter() {
        if robot.state == RobotState::Free {
            assert_eq!(robot.target_fire, None);
        }
    }
    assert!(query::active_fires(&world).is_empty());

    let (commands, report) = assign_fires(&world, &mut dispatcher);
    assert!(commands.is_empty());
    assert!(report.dispatched.is_empty());
}

#[test]
fn robot_without_reachable_fire_stays_free() {
    let world = world_with(
        3,
        3,
        vec![
            Command::SetTerrain {
                cell: CellCoord::new(1, 0),
                terrain: Terrain::Forest,
            },
            Command::SetTerrain {
                cell: CellCoord::new(0, 1),
                terrain: Terrain::Rock,
            },
            deploy(RobotKind::Wheeled, 0, 0),
            ignite(2, 2, 100),
        ],
    );
    let mut dispatcher = Dispatcher::default();

    let (commands, report) = assign_fires(&world, &mut dispatcher);

    assert!(commands.is_empty());
    assert_eq!(
        report.unassigned,
        vec![(RobotId::new(0), DispatchFailure::NoReachableFire)]
    );
    assert_eq!(report.deferred_fires, vec![FireId::new(0)]);
}

#[test]
fn dry_robot_is_sent_to_nearest_water_and_refills() {
    let mut world = world_with(
        6,
        3,
        vec![
            water(5, 0),
            water(0, 2),
            deploy(RobotKind::Tracked, 1, 1),
            ignite(2, 1, 5000),
        ],
    );
    let mut dispatcher = Dispatcher::default();
    let robot = RobotId::new(0);

    let (commands, _) = assign_fires(&world, &mut dispatcher);
    let _ = apply_all(&mut world, commands);
    let events = step_until_idle(&mut world, robot);
    assert!(events.contains(&Event::ReservoirEmptied { robot }));
    assert!(events.contains(&Event::FireReleased {
        fire: FireId::new(0)
    }));

    let grid = query::grid_view(&world);
    let empty = query::empty_robots(&world);
    let mut commands = Vec::new();
    let report = dispatcher.send_empty_robots_to_refill(&grid, &empty, &mut commands);
    assert_eq!(
        report
            .dispatched
            .iter()
            .map(|dispatch| (dispatch.robot, dispatch.assignment))
            .collect::<Vec<_>>(),
        vec![(
            robot,
            Assignment::Refill {
                source: CellCoord::new(0, 2)
            }
        )]
    );

    let _ = apply_all(&mut world, commands);
    let events = step_until_idle(&mut world, robot);
    assert!(events.contains(&Event::RobotFreed { robot }));
    let snapshot = query::robot(&world, robot).expect("robot");
    assert_eq!(snapshot.volume, RobotKind::Tracked.capacity());
    assert!(snapshot.cell.is_adjacent(CellCoord::new(0, 2)));
    assert_eq!(query::free_robots(&world).len(), 1);
}

#[test]
fn refill_failures_keep_robots_queued() {
    let world = world_with(3, 3, vec![deploy(RobotKind::Tracked, 0, 0)]);
    let grid = query::grid_view(&world);
    let mut robot = query::robot(&world, RobotId::new(0)).expect("robot");
    robot.volume = 0;
    let mut dispatcher = Dispatcher::default();
    let mut commands = Vec::new();

    let report = dispatcher.send_empty_robots_to_refill(&grid, &[robot.clone()], &mut commands);
    assert!(commands.is_empty());
    assert_eq!(
        report.unassigned,
        vec![(robot.id, DispatchFailure::NoWaterSource)]
    );

    let walled = world_with(
        4,
        1,
        vec![
            deploy(RobotKind::Wheeled, 0, 0),
            Command::SetTerrain {
                cell: CellCoord::new(1, 0),
                terrain: Terrain::Rock,
            },
            water(3, 0),
        ],
    );
    let grid = query::grid_view(&walled);
    let mut robot = query::robot(&walled, RobotId::new(0)).expect("robot");
    robot.volume = 0;

    let report = dispatcher.send_empty_robots_to_refill(&grid, &[robot.clone()], &mut commands);
    assert!(commands.is_empty());
    assert_eq!(
        report.unassigned,
        vec![(robot.id, DispatchFailure::NoReachableWater)]
    );
}

#[test]
fn relocation_walks_robot_to_destination() {
    let mut world = world_with(4, 4, vec![deploy(RobotKind::Legged, 0, 0)]);
    let robot = RobotId::new(0);
    let grid = query::grid_view(&world);
    let snapshot = query::robot(&world, robot).expect("robot");
    let mut dispatcher = Dispatcher::default();
    let mut commands = Vec::new();

    let duration = dispatcher
        .send_robot_to(&grid, &snapshot, CellCoord::new(3, 2), &mut commands)
        .expect("reachable");
    assert_eq!(duration, 5 * (100 * 1000 / 30));

    let _ = apply_all(&mut world, commands);
    let events = step_until_idle(&mut world, robot);
    assert!(events.contains(&Event::RobotFreed { robot }));
    assert_eq!(query::occupant(&world, CellCoord::new(3, 2)), Some(robot));
    assert_eq!(
        query::robot(&world, robot).map(|robot| robot.state),
        Some(RobotState::Free)
    );
}
