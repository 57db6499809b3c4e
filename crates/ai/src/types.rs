//! Core types of the multi-step planner.
//!
//! A turn plan is a [`PseudoActions`] sequence: an ordered list of
//! [`PseudoAction`]s committed on one atomic step and consumed one head at a
//! time on the following steps of the same turn.

use std::collections::{BTreeSet, VecDeque};

use maze_core::{CellKind, Impact, Position, RobotId};

/// What a robot tries to achieve first this turn.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Objective {
    Move,
    Defense,
    Attack,
}

/// Objectives of the direct command search.
///
/// `Work` covers building walls (builders) and planting mines (sappers).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DirectObjective {
    Move,
    Attack,
    Defense,
    Work,
    Random,
}

/// Name of the planner stage that produced a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SequenceName {
    OptimalAttack,
    ScheduledAttack,
    FollowPath,
    FreeExit,
    KeepPosition,
    SafeMove,
    BonusCollection,
    Rebalance,
    RiskyMove,
    Flee,
}

/// Quality grade of a sequence.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Relevance {
    /// Leaves the robot exposed.
    #[default]
    Unsafe = 0,
    Marginal = 1,
    Full = 2,
}

/// One planned atomic step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PseudoAction {
    /// Walk to `position`, clearing what stands in the way.
    Goto {
        position: Position,
        kind: CellKind,
        impact: Option<Impact>,
    },
    /// Throw the stored grenade command.
    Grenade { command: String },
    /// Kill with the stored command.
    Kill { command: String },
    Wall,
    Door,
    /// Plant the strongest mine available.
    MineMax,
    /// Last action of the turn spent in place.
    NoMove,
    Terraform,
}

impl PseudoAction {
    pub fn goto(position: Position, kind: CellKind, impact: Option<Impact>) -> Self {
        Self::Goto {
            position,
            kind,
            impact,
        }
    }

    pub fn is_goto(&self) -> bool {
        matches!(self, Self::Goto { .. })
    }

    pub fn destination(&self) -> Option<Position> {
        match self {
            Self::Goto { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// A multi-step plan and the metadata used to rank it.
#[derive(Clone, Debug, PartialEq)]
pub struct PseudoActions {
    pub name: SequenceName,
    pub actions: VecDeque<PseudoAction>,
    /// Objective that was being searched when the sequence was built.
    pub search_context: Option<Objective>,
    /// Atomic steps the sequence consumes.
    pub gamble_count: u32,
    /// Cell the robot stands on once the sequence is played.
    pub end: Position,
    /// Cells walked through, start excluded.
    pub cells: Vec<Position>,
    /// Cells cleared by the grenades of the sequence.
    pub cleared: BTreeSet<Position>,
    /// Dangers on the board when the sequence was planned.
    pub known_dangers: BTreeSet<Position>,
    pub killed: Vec<RobotId>,
    pub secure_stop: bool,
    pub secure_issue: bool,
    pub bonuses: u32,
    pub defense_kills: u32,
    pub attack_kills: u32,
    pub loop_factor: u32,
    pub relevance: Relevance,
    pub score: f64,
}

impl PseudoActions {
    pub fn new(name: SequenceName, start: Position) -> Self {
        Self {
            name,
            actions: VecDeque::new(),
            search_context: None,
            gamble_count: 0,
            end: start,
            cells: Vec::new(),
            cleared: BTreeSet::new(),
            known_dangers: BTreeSet::new(),
            killed: Vec::new(),
            secure_stop: false,
            secure_issue: false,
            bonuses: 0,
            defense_kills: 0,
            attack_kills: 0,
            loop_factor: 0,
            relevance: Relevance::Unsafe,
            score: 0.0,
        }
    }

    #[must_use]
    pub fn with_context(mut self, objective: Objective) -> Self {
        self.search_context = Some(objective);
        self
    }

    /// Appends an action; a goto moves the projected end point.
    pub fn push(&mut self, action: PseudoAction) {
        if let PseudoAction::Goto { position, .. } = &action {
            self.end = *position;
            self.cells.push(*position);
        }
        self.gamble_count += 1;
        self.actions.push_back(action);
    }

    pub fn head(&self) -> Option<&PseudoAction> {
        self.actions.front()
    }

    pub fn pop(&mut self) -> Option<PseudoAction> {
        self.actions.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Destinations of the remaining gotos, in order.
    pub fn remaining_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.actions.iter().filter_map(PseudoAction::destination)
    }

    pub fn ends_with_nomove(&self) -> bool {
        matches!(self.actions.back(), Some(PseudoAction::NoMove))
    }

    pub fn is_fully_relevant(&self) -> bool {
        self.relevance == Relevance::Full
    }
}
