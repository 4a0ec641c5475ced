//! Robot and fire entities owned by the world.

use std::collections::VecDeque;

use fire_brigade_core::{
    Action, ActionSequence, Assignment, CellCoord, FireId, FireSnapshot, FireState, Mobility,
    RobotId, RobotKind, RobotSnapshot, RobotState, SpeedOverrides, Terrain,
};

#[derive(Clone, Debug)]
pub(crate) struct Robot {
    pub(crate) id: RobotId,
    pub(crate) kind: RobotKind,
    pub(crate) cell: CellCoord,
    speed: u32,
    overrides: SpeedOverrides,
    volume: u32,
    pub(crate) state: RobotState,
    pub(crate) target_fire: Option<FireId>,
    pub(crate) target_water: Option<CellCoord>,
    itinerary: VecDeque<Action>,
}

impl Robot {
    /// Creates a robot with a full reservoir and no task.
    pub(crate) fn new(id: RobotId, kind: RobotKind, cell: CellCoord, speed: u32) -> Self {
        Self {
            id,
            kind,
            cell,
            speed,
            overrides: SpeedOverrides::default(),
            volume: kind.capacity(),
            state: RobotState::Free,
            target_fire: None,
            target_water: None,
            itinerary: VecDeque::new(),
        }
    }

    pub(crate) const fn mobility(&self) -> Mobility {
        Mobility::new(self.kind, self.speed, self.overrides)
    }

    /// Replaces one speed table entry, returning the speed now in effect.
    pub(crate) fn override_speed(&mut self, terrain: Terrain, speed: Option<u32>) -> u32 {
        self.overrides.set(terrain, speed);
        self.mobility().speed_on(terrain)
    }

    /// Drains the reservoir by one pour and returns the litres delivered.
    pub(crate) fn pour(&mut self) -> u32 {
        let rate = self.kind.pour_rate();
        if self.kind.has_unlimited_reservoir() {
            return rate;
        }

        let amount = rate.min(self.volume);
        self.volume -= amount;
        amount
    }

    /// Takes in one fill of water, clamped at capacity.
    pub(crate) fn fill(&mut self) -> u32 {
        let capacity = self.kind.capacity();
        self.volume = self.volume.saturating_add(self.kind.fill_rate()).min(capacity);
        assert!(self.volume <= capacity, "reservoir overflow");
        self.volume
    }

    pub(crate) const fn needs_refill(&self) -> bool {
        self.volume == 0 && !self.kind.has_unlimited_reservoir()
    }

    pub(crate) const fn is_full(&self) -> bool {
        self.volume >= self.kind.capacity()
    }

    pub(crate) fn assign(&mut self, assignment: Assignment, actions: &ActionSequence) {
        match assignment {
            Assignment::Extinguish { fire } => self.target_fire = Some(fire),
            Assignment::Refill { source } => self.target_water = Some(source),
            Assignment::Relocate { .. } => {}
        }
        self.itinerary = actions.iter().copied().collect();
        self.refresh_state();
    }

    pub(crate) fn next_action(&self) -> Option<Action> {
        self.itinerary.front().copied()
    }

    /// Pops the head of the itinerary once it has been carried out.
    pub(crate) fn complete_action(&mut self) {
        let _ = self.itinerary.pop_front();
        self.refresh_state();
    }

    pub(crate) fn has_itinerary(&self) -> bool {
        !self.itinerary.is_empty()
    }

    /// Drops the task and every queued action.
    pub(crate) fn clear_task(&mut self) {
        self.itinerary.clear();
        self.target_fire = None;
        self.target_water = None;
        self.state = RobotState::Free;
    }

    fn refresh_state(&mut self) {
        self.state = match self.itinerary.front() {
            Some(action) if action.is_terminal() => RobotState::AwaitingStep,
            Some(_) => RobotState::Moving,
            None => RobotState::Free,
        };
    }

    pub(crate) fn itinerary(&self) -> Vec<Action> {
        self.itinerary.iter().copied().collect()
    }

    pub(crate) fn snapshot(&self) -> RobotSnapshot {
        debug_assert!(
            self.state != RobotState::Free || self.target_fire.is_none(),
            "free robot still holds a fire"
        );
        RobotSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            speed: self.speed,
            overrides: self.overrides,
            volume: self.volume,
            state: self.state,
            target_fire: self.target_fire,
            target_water: self.target_water,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Fire {
    pub(crate) id: FireId,
    pub(crate) cell: CellCoord,
    remaining: u32,
    initial: u32,
    pub(crate) state: FireState,
}

impl Fire {
    pub(crate) fn new(id: FireId, cell: CellCoord, cost: u32) -> Self {
        assert!(cost > 0, "fires must require water");
        Self {
            id,
            cell,
            remaining: cost,
            initial: cost,
            state: FireState::Active,
        }
    }

    /// Lowers the remaining cost; returns `true` when this call put the fire out.
    pub(crate) fn reduce_cost(&mut self, amount: u32) -> bool {
        if self.state == FireState::Extinguished {
            return false;
        }

        if amount < self.remaining {
            self.remaining -= amount;
            false
        } else {
            self.remaining = 0;
            self.state = FireState::Extinguished;
            true
        }
    }

    pub(crate) const fn remaining(&self) -> u32 {
        self.remaining
    }

    pub(crate) fn target(&mut self) -> bool {
        if self.state != FireState::Active {
            return false;
        }
        self.state = FireState::Targeted;
        true
    }

    pub(crate) fn release(&mut self) -> bool {
        if self.state != FireState::Targeted {
            return false;
        }
        self.state = FireState::Active;
        true
    }

    pub(crate) fn snapshot(&self) -> FireSnapshot {
        FireSnapshot {
            id: self.id,
            cell: self.cell,
            remaining_cost: self.remaining,
            initial_cost: self.initial,
            state: self.state,
        }
    }
}
