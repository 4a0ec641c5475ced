#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Fire Brigade engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume immutable views such as
//! [`GridView`] and [`RobotSnapshot`] and respond exclusively with new command
//! batches.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multiplier converting a cell size in metres and a speed in km/h into
/// simulated time units.
pub const TIME_UNITS_PER_KILOMETRE: u64 = 1000;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the grid with open terrain, discarding every robot and fire.
    ConfigureGrid {
        /// Number of cell columns laid out in the grid.
        columns: u32,
        /// Number of cell rows laid out in the grid.
        rows: u32,
        /// Side length of a single square cell measured in metres.
        cell_size_meters: u32,
    },
    /// Administrative edit replacing the terrain of a single cell.
    SetTerrain {
        /// Cell whose terrain changes.
        cell: CellCoord,
        /// Terrain applied to the cell.
        terrain: Terrain,
    },
    /// Starts a new fire on the provided cell.
    IgniteFire {
        /// Cell the fire attaches to.
        cell: CellCoord,
        /// Litres of water required to extinguish the fire.
        cost: u32,
    },
    /// Creates a robot with a full reservoir on the provided cell.
    DeployRobot {
        /// Variant of robot to construct.
        kind: RobotKind,
        /// Starting cell of the robot.
        cell: CellCoord,
        /// Configured speed in km/h, defaulting to the kind's base speed.
        speed: Option<u32>,
    },
    /// Replaces one entry of a robot's terrain speed table.
    OverrideTerrainSpeed {
        /// Robot whose table changes.
        robot: RobotId,
        /// Terrain entry being replaced.
        terrain: Terrain,
        /// New speed in km/h, or `None` to restore the kind's rule.
        speed: Option<u32>,
    },
    /// Hands an itinerary to a robot on behalf of the dispatcher.
    DispatchRobot {
        /// Robot receiving the itinerary.
        robot: RobotId,
        /// Task the itinerary accomplishes.
        assignment: Assignment,
        /// Ordered actions the robot must execute.
        actions: ActionSequence,
    },
    /// Executes the next queued action of a robot's itinerary.
    StepRobot {
        /// Robot advancing its itinerary.
        robot: RobotId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the grid was rebuilt.
    GridConfigured {
        /// Number of cell columns.
        columns: u32,
        /// Number of cell rows.
        rows: u32,
    },
    /// Confirms an administrative terrain edit.
    TerrainChanged {
        /// Cell whose terrain changed.
        cell: CellCoord,
        /// Terrain now covering the cell.
        terrain: Terrain,
    },
    /// Confirms that a fire started.
    FireIgnited {
        /// Identifier allocated to the fire.
        fire: FireId,
        /// Cell the fire is attached to.
        cell: CellCoord,
        /// Initial extinguish cost.
        cost: u32,
    },
    /// Confirms that a robot joined the fleet.
    RobotDeployed {
        /// Identifier allocated to the robot.
        robot: RobotId,
        /// Variant of the robot.
        kind: RobotKind,
        /// Starting cell of the robot.
        cell: CellCoord,
    },
    /// Confirms that a robot's terrain speed table changed.
    TerrainSpeedOverridden {
        /// Robot whose table changed.
        robot: RobotId,
        /// Terrain entry that changed.
        terrain: Terrain,
        /// Speed now applied on the terrain.
        speed: u32,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Cell named by the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a speed override named an unknown robot.
    SpeedOverrideRejected {
        /// Robot named by the request.
        robot: RobotId,
    },
    /// Announces that a fire was claimed by a robot.
    FireTargeted {
        /// Fire that changed state.
        fire: FireId,
        /// Robot assigned to the fire.
        robot: RobotId,
    },
    /// Hands an accepted itinerary to the trajectory executor.
    ItineraryIssued {
        /// Robot that owns the itinerary.
        robot: RobotId,
        /// Task the itinerary accomplishes.
        assignment: Assignment,
        /// Actions queued for the robot.
        actions: ActionSequence,
    },
    /// Reports that a dispatch request was rejected.
    DispatchRejected {
        /// Robot named by the request.
        robot: RobotId,
        /// Specific reason the dispatch failed.
        reason: DispatchError,
    },
    /// Confirms that a robot moved between two adjacent cells.
    RobotMoved {
        /// Robot that moved.
        robot: RobotId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Confirms that a robot poured water on its target fire.
    WaterPoured {
        /// Robot that poured.
        robot: RobotId,
        /// Fire that received the water.
        fire: FireId,
        /// Litres delivered.
        amount: u32,
        /// Extinguish cost left after the pour.
        remaining: u32,
    },
    /// Announces that a fire reached zero cost.
    FireExtinguished {
        /// Fire that went out.
        fire: FireId,
        /// Cell the fire detached from.
        cell: CellCoord,
    },
    /// Announces that a fire lost its robot and awaits a new assignment.
    FireReleased {
        /// Fire returned to the active set.
        fire: FireId,
    },
    /// Announces that a robot's reservoir ran dry.
    ReservoirEmptied {
        /// Robot that needs a refill.
        robot: RobotId,
    },
    /// Confirms that a robot took in water.
    ReservoirFilled {
        /// Robot that filled.
        robot: RobotId,
        /// Volume held after filling.
        volume: u32,
    },
    /// Announces that a robot finished or abandoned its task.
    RobotFreed {
        /// Robot that became free.
        robot: RobotId,
    },
    /// Reports that a step request could not be executed.
    StepRejected {
        /// Robot named by the request.
        robot: RobotId,
        /// Specific reason the step failed.
        reason: StepError,
    },
}

/// Task accomplished by an itinerary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assignment {
    /// Travel next to a fire and pour water on it.
    Extinguish {
        /// Fire targeted by the robot.
        fire: FireId,
    },
    /// Travel next to a water source and fill the reservoir.
    Refill {
        /// Water cell used as the source.
        source: CellCoord,
    },
    /// Travel towards a cell without a terminal task.
    Relocate {
        /// Requested destination.
        destination: CellCoord,
    },
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The requested cell already carries a fire.
    #[error("cell already carries a fire")]
    AlreadyBurning,
    /// The requested cell is occupied by another robot.
    #[error("cell is occupied by another robot")]
    Occupied,
    /// Fires must require a positive amount of water.
    #[error("fire cost must be positive")]
    ZeroCost,
}

/// Reasons a dispatch request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum DispatchError {
    /// The referenced robot does not exist.
    #[error("robot does not exist")]
    MissingRobot,
    /// The robot already executes another itinerary.
    #[error("robot is busy with another task")]
    RobotBusy,
    /// The command-only variant never leaves its post.
    #[error("command robots cannot be dispatched")]
    CommandOnly,
    /// The referenced fire does not exist or is no longer active.
    #[error("fire is not available for assignment")]
    FireUnavailable,
    /// The referenced refill source is not a water cell.
    #[error("refill source is not water")]
    NotWater,
    /// The destination lies outside the grid.
    #[error("destination lies outside the grid")]
    OutOfBounds,
    /// The action sequence does not end with the task's terminal action.
    #[error("action sequence does not match the assignment")]
    MismatchedActions,
}

/// Reasons a step request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum StepError {
    /// The referenced robot does not exist.
    #[error("robot does not exist")]
    MissingRobot,
    /// The robot has no queued action.
    #[error("robot has no queued action")]
    NoItinerary,
    /// The move leads off the grid.
    #[error("move leads off the grid")]
    OffGrid,
    /// The robot cannot travel across the destination terrain.
    #[error("terrain is impassable for the robot")]
    Impassable,
    /// Another robot occupies the destination cell.
    #[error("destination cell is occupied")]
    Blocked,
    /// The robot stands too far from its work target.
    #[error("target is out of reach")]
    OutOfReach,
    /// The robot's task target disappeared.
    #[error("task target no longer exists")]
    TargetLost,
    /// The robot cannot take in water.
    #[error("robot cannot refill")]
    CannotRefill,
}

/// Cardinal movement directions, iterated North, South, East, West.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in neighbour iteration order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];
}

/// Unique identifier assigned to a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RobotId(u32);

impl RobotId {
    /// Creates a new robot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FireId(u32);

impl FireId {
    /// Creates a new fire identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Surface type covering a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    /// Unobstructed ground.
    Open,
    /// Woodland.
    Forest,
    /// Lake or river; doubles as a refill source.
    Water,
    /// Rocky ground.
    Rock,
    /// Built-up area.
    Habitat,
}

impl Terrain {
    /// Number of terrain variants.
    pub const COUNT: usize = 5;

    /// Every terrain variant in table order.
    pub const ALL: [Terrain; Terrain::COUNT] = [
        Terrain::Open,
        Terrain::Forest,
        Terrain::Water,
        Terrain::Rock,
        Terrain::Habitat,
    ];

    const fn table_index(self) -> usize {
        match self {
            Self::Open => 0,
            Self::Forest => 1,
            Self::Water => 2,
            Self::Rock => 3,
            Self::Habitat => 4,
        }
    }
}

/// How a robot kind derives its speed on one terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedRule {
    /// The robot's configured speed.
    Current,
    /// Half the robot's configured speed.
    Half,
    /// The kind's base speed regardless of configuration.
    Max,
    /// A fixed speed in km/h.
    Fixed(u32),
    /// The terrain cannot be entered or left.
    Impassable,
}

/// Robot variants and their fixed capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotKind {
    /// Caterpillar-tracked robot slowed down by forests.
    Tracked,
    /// Fast wheeled robot restricted to open ground and habitat.
    Wheeled,
    /// Legged robot drawing from an unlimited water supply.
    Legged,
    /// Drone flying over water and fires.
    Flying,
    /// Command-only variant used by the dispatcher; never moves.
    Command,
}

impl RobotKind {
    /// Speed in km/h a freshly deployed robot of this kind uses.
    #[must_use]
    pub const fn base_speed(self) -> u32 {
        match self {
            Self::Tracked => 60,
            Self::Wheeled => 80,
            Self::Legged => 30,
            Self::Flying => 100,
            Self::Command => 0,
        }
    }

    /// Reservoir capacity in litres.
    #[must_use]
    pub const fn capacity(self) -> u32 {
        match self {
            Self::Tracked => 2000,
            Self::Wheeled => 5000,
            Self::Legged => 1000,
            Self::Flying => 10_000,
            Self::Command => 0,
        }
    }

    /// Litres poured on a fire per extinguish action.
    #[must_use]
    pub const fn pour_rate(self) -> u32 {
        match self {
            Self::Tracked => 900,
            Self::Wheeled => 1200,
            Self::Legged => 600,
            Self::Flying => 10_000,
            Self::Command => 0,
        }
    }

    /// Litres taken in per refill action.
    #[must_use]
    pub const fn fill_rate(self) -> u32 {
        match self {
            Self::Tracked => 1000,
            Self::Wheeled => 500,
            Self::Legged => 0,
            Self::Flying => 400,
            Self::Command => 0,
        }
    }

    /// Reports whether the kind may enter water cells and cells on fire.
    #[must_use]
    pub const fn traverses_hazards(self) -> bool {
        matches!(self, Self::Flying)
    }

    /// Reports whether pouring never drains the reservoir.
    #[must_use]
    pub const fn has_unlimited_reservoir(self) -> bool {
        matches!(self, Self::Legged)
    }

    /// Reports whether the kind is the dispatcher's command-only variant.
    #[must_use]
    pub const fn is_command(self) -> bool {
        matches!(self, Self::Command)
    }

    /// Rule deriving the kind's speed on the provided terrain.
    #[must_use]
    pub const fn speed_rule(self, terrain: Terrain) -> SpeedRule {
        match (self, terrain) {
            (Self::Command, _) => SpeedRule::Impassable,
            (Self::Flying, _) => SpeedRule::Current,
            (_, Terrain::Water) => SpeedRule::Impassable,
            (Self::Tracked, Terrain::Forest) => SpeedRule::Half,
            (Self::Tracked, _) => SpeedRule::Current,
            (Self::Wheeled, Terrain::Open) => SpeedRule::Max,
            (Self::Wheeled, Terrain::Habitat) => SpeedRule::Current,
            (Self::Wheeled, _) => SpeedRule::Impassable,
            (Self::Legged, Terrain::Rock) => SpeedRule::Fixed(10),
            (Self::Legged, _) => SpeedRule::Current,
        }
    }
}

/// Per-robot replacements for entries of the kind's speed table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SpeedOverrides {
    speeds: [Option<u32>; Terrain::COUNT],
}

impl SpeedOverrides {
    /// Speed override registered for the terrain, if any.
    #[must_use]
    pub const fn get(&self, terrain: Terrain) -> Option<u32> {
        self.speeds[terrain.table_index()]
    }

    /// Registers or clears the override for the terrain.
    pub fn set(&mut self, terrain: Terrain, speed: Option<u32>) {
        self.speeds[terrain.table_index()] = speed;
    }
}

/// Everything needed to evaluate a robot's speed on any terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mobility {
    kind: RobotKind,
    speed: u32,
    overrides: SpeedOverrides,
}

impl Mobility {
    /// Creates a mobility profile for a robot of `kind` configured at `speed`.
    #[must_use]
    pub const fn new(kind: RobotKind, speed: u32, overrides: SpeedOverrides) -> Self {
        Self {
            kind,
            speed,
            overrides,
        }
    }

    /// Speed in km/h on the terrain; zero means the terrain is impassable.
    #[must_use]
    pub fn speed_on(&self, terrain: Terrain) -> u32 {
        if self.kind.is_command() {
            return 0;
        }

        if let Some(speed) = self.overrides.get(terrain) {
            return speed;
        }

        match self.kind.speed_rule(terrain) {
            SpeedRule::Current => self.speed,
            SpeedRule::Half => self.speed / 2,
            SpeedRule::Max => self.kind.base_speed(),
            SpeedRule::Fixed(speed) => speed,
            SpeedRule::Impassable => 0,
        }
    }

    /// Reports whether the robot may stop on water or burning cells.
    #[must_use]
    pub const fn traverses_hazards(&self) -> bool {
        self.kind.traverses_hazards()
    }
}

/// Lifecycle state of a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RobotState {
    /// No task assigned.
    Free,
    /// Travelling along an itinerary.
    Moving,
    /// Arrived, waiting for the terminal action to start.
    AwaitingStep,
    /// Taking in water.
    Filling,
    /// Pouring water on a fire.
    Extinguishing,
}

/// Lifecycle state of a fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireState {
    /// Burning and awaiting a robot.
    Active,
    /// Burning with a robot assigned.
    Targeted,
    /// Out for good.
    Extinguished,
}

/// Fire reference stored in the grid's fire layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellFire {
    /// Fire burning on the cell.
    pub id: FireId,
    /// Lifecycle state of the fire.
    pub state: FireState,
}

/// Atomic action tags understood by the trajectory executor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step one cell north.
    MoveNorth,
    /// Step one cell south.
    MoveSouth,
    /// Step one cell east.
    MoveEast,
    /// Step one cell west.
    MoveWest,
    /// Pour water on the target fire.
    Extinguish,
    /// Fill the reservoir from the target water source.
    Refill,
}

impl Action {
    /// Move action travelling in the provided direction.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        match direction {
            Direction::North => Self::MoveNorth,
            Direction::South => Self::MoveSouth,
            Direction::East => Self::MoveEast,
            Direction::West => Self::MoveWest,
        }
    }

    /// Direction travelled by a move action; `None` for terminal actions.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::MoveNorth => Some(Direction::North),
            Self::MoveSouth => Some(Direction::South),
            Self::MoveEast => Some(Direction::East),
            Self::MoveWest => Some(Direction::West),
            Self::Extinguish | Self::Refill => None,
        }
    }

    /// Reports whether the action ends an itinerary.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.direction().is_none()
    }
}

/// Work performed once a robot reaches the end of its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalAction {
    /// Pour water on the target fire.
    Extinguish,
    /// Fill the reservoir.
    Refill,
}

impl From<TerminalAction> for Action {
    fn from(action: TerminalAction) -> Self {
        match action {
            TerminalAction::Extinguish => Action::Extinguish,
            TerminalAction::Refill => Action::Refill,
        }
    }
}

/// Ordered moves followed by at most one terminal action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionSequence {
    actions: Vec<Action>,
}

impl ActionSequence {
    /// Converts a directional path into moves and appends the terminal action.
    #[must_use]
    pub fn from_path(path: &[Direction], terminal: Option<TerminalAction>) -> Self {
        let mut actions: Vec<Action> = path.iter().copied().map(Action::step).collect();
        if let Some(terminal) = terminal {
            actions.push(terminal.into());
        }
        Self { actions }
    }

    /// Actions in execution order.
    #[must_use]
    pub fn as_slice(&self) -> &[Action] {
        &self.actions
    }

    /// Iterator over the actions in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Number of actions including the terminal one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Reports whether the sequence holds no action at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Terminal action closing the sequence, if any.
    #[must_use]
    pub fn terminal(&self) -> Option<Action> {
        self.actions.last().copied().filter(|action| action.is_terminal())
    }

    /// Number of move actions preceding the terminal action.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| !action.is_terminal())
            .count()
    }
}

/// Simulated travel time between two cells, or the lack of any route.
///
/// `Finite` values order before `Unreachable`, so the minimum over a set of
/// candidates is the nearest reachable one whenever one exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TravelDuration {
    /// Travel time in simulated time units.
    Finite(u64),
    /// No route exists under the robot's traversal rules.
    Unreachable,
}

impl TravelDuration {
    /// Travel time if the destination can be reached.
    #[must_use]
    pub const fn finite(self) -> Option<u64> {
        match self {
            Self::Finite(value) => Some(value),
            Self::Unreachable => None,
        }
    }

    /// Reports whether a route exists.
    #[must_use]
    pub const fn is_reachable(self) -> bool {
        matches!(self, Self::Finite(_))
    }
}

impl PartialOrd for TravelDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TravelDuration {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Finite(lhs), Self::Finite(rhs)) => lhs.cmp(rhs),
            (Self::Finite(_), Self::Unreachable) => Ordering::Less,
            (Self::Unreachable, Self::Finite(_)) => Ordering::Greater,
            (Self::Unreachable, Self::Unreachable) => Ordering::Equal,
        }
    }
}

/// Read-only view over the grid's terrain, fire layer and water registry.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    columns: u32,
    rows: u32,
    cell_size_meters: u32,
    terrain: &'a [Terrain],
    fires: &'a [Option<CellFire>],
    water_sources: &'a [CellCoord],
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by row-major cell layers.
    #[must_use]
    pub fn new(
        columns: u32,
        rows: u32,
        cell_size_meters: u32,
        terrain: &'a [Terrain],
        fires: &'a [Option<CellFire>],
        water_sources: &'a [CellCoord],
    ) -> Self {
        Self {
            columns,
            rows,
            cell_size_meters,
            terrain,
            fires,
            water_sources,
        }
    }

    /// Same grid with its fire layer replaced by `fires`.
    #[must_use]
    pub fn with_fire_layer<'b>(&self, fires: &'b [Option<CellFire>]) -> GridView<'b>
    where
        'a: 'b,
    {
        GridView {
            columns: self.columns,
            rows: self.rows,
            cell_size_meters: self.cell_size_meters,
            terrain: self.terrain,
            fires,
            water_sources: self.water_sources,
        }
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.terrain.len()
    }

    /// Side length of a cell in metres.
    #[must_use]
    pub const fn cell_size_meters(&self) -> u32 {
        self.cell_size_meters
    }

    /// Cells registered as water sources, in registration order.
    #[must_use]
    pub fn water_sources(&self) -> &'a [CellCoord] {
        self.water_sources
    }

    /// Fire layer in row-major order.
    #[must_use]
    pub fn fire_layer(&self) -> &'a [Option<CellFire>] {
        self.fires
    }

    /// Reports whether the cell lies within the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Row-major index of the cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at the row-major index, if it lies within the grid.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        if index >= self.terrain.len() || self.columns == 0 {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Terrain covering the cell.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<Terrain> {
        self.index(cell)
            .and_then(|index| self.terrain.get(index).copied())
    }

    /// Fire attached to the cell, if any.
    #[must_use]
    pub fn fire(&self, cell: CellCoord) -> Option<CellFire> {
        self.index(cell)
            .and_then(|index| self.fires.get(index).copied().flatten())
    }

    /// Reports whether an unassigned fire burns on the cell.
    #[must_use]
    pub fn has_active_fire(&self, cell: CellCoord) -> bool {
        self.fire(cell)
            .map_or(false, |fire| fire.state == FireState::Active)
    }

    /// Reports whether ground robots must stop short of the cell.
    #[must_use]
    pub fn is_hazard(&self, cell: CellCoord) -> bool {
        self.terrain(cell) == Some(Terrain::Water) || self.has_active_fire(cell)
    }

    /// Neighbouring cell in the provided direction, if it lies within the grid.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        if !self.contains(cell) {
            return None;
        }

        let (column, row) = (cell.column(), cell.row());
        match direction {
            Direction::North if row > 0 => Some(CellCoord::new(column, row - 1)),
            Direction::South if row + 1 < self.rows => Some(CellCoord::new(column, row + 1)),
            Direction::East if column + 1 < self.columns => {
                Some(CellCoord::new(column + 1, row))
            }
            Direction::West if column > 0 => Some(CellCoord::new(column - 1, row)),
            _ => None,
        }
    }

    /// Reports whether a neighbouring cell exists in the provided direction.
    #[must_use]
    pub fn neighbor_exists(&self, cell: CellCoord, direction: Direction) -> bool {
        self.neighbor(cell, direction).is_some()
    }

    /// Existing neighbours of the cell in direction iteration order.
    pub fn neighbors(
        &self,
        cell: CellCoord,
    ) -> impl Iterator<Item = (Direction, CellCoord)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| Some((direction, self.neighbor(cell, direction)?)))
    }
}

/// Immutable representation of a single robot's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RobotSnapshot {
    /// Unique identifier assigned to the robot.
    pub id: RobotId,
    /// Variant of the robot.
    pub kind: RobotKind,
    /// Grid cell currently occupied by the robot.
    pub cell: CellCoord,
    /// Configured speed in km/h.
    pub speed: u32,
    /// Per-terrain speed replacements.
    pub overrides: SpeedOverrides,
    /// Litres currently held in the reservoir.
    pub volume: u32,
    /// Lifecycle state of the robot.
    pub state: RobotState,
    /// Fire the robot is assigned to, if any.
    pub target_fire: Option<FireId>,
    /// Water cell the robot is heading to, if any.
    pub target_water: Option<CellCoord>,
}

impl RobotSnapshot {
    /// Mobility profile used for travel time computations.
    #[must_use]
    pub const fn mobility(&self) -> Mobility {
        Mobility::new(self.kind, self.speed, self.overrides)
    }

    /// Reservoir fill level as a whole percentage of capacity.
    #[must_use]
    pub fn water_percent(&self) -> u32 {
        let capacity = self.kind.capacity();
        if capacity == 0 {
            return 0;
        }
        let percent = u64::from(self.volume) * 100 / u64::from(capacity);
        u32::try_from(percent).unwrap_or(100)
    }

    /// Reports whether the robot must refill before pouring again.
    #[must_use]
    pub const fn needs_refill(&self) -> bool {
        self.volume == 0 && !self.kind.has_unlimited_reservoir()
    }
}

/// Read-only snapshot describing every robot in the fleet.
#[derive(Clone, Debug, Default)]
pub struct RobotView {
    snapshots: Vec<RobotSnapshot>,
}

impl RobotView {
    /// Creates a new robot view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RobotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured robot snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &RobotSnapshot> {
        self.snapshots.iter()
    }
}

/// Immutable representation of a single fire's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FireSnapshot {
    /// Unique identifier assigned to the fire.
    pub id: FireId,
    /// Cell the fire burns on.
    pub cell: CellCoord,
    /// Litres still required to extinguish the fire.
    pub remaining_cost: u32,
    /// Litres required when the fire started.
    pub initial_cost: u32,
    /// Lifecycle state of the fire.
    pub state: FireState,
}

impl FireSnapshot {
    /// Remaining cost as a whole percentage of the initial cost.
    #[must_use]
    pub fn percent_remaining(&self) -> u32 {
        if self.initial_cost == 0 {
            return 0;
        }
        let percent = u64::from(self.remaining_cost) * 100 / u64::from(self.initial_cost);
        u32::try_from(percent).unwrap_or(100)
    }
}

/// Read-only snapshot describing every fire ever ignited.
#[derive(Clone, Debug, Default)]
pub struct FireView {
    snapshots: Vec<FireSnapshot>,
}

impl FireView {
    /// Creates a new fire view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<FireSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured fire snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &FireSnapshot> {
        self.snapshots.iter()
    }
}
