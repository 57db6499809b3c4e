use std::collections::BTreeSet;

use crate::grid::RobotId;

/// Turn bookkeeping shared by the validator and the decision engine.
///
/// Holds the commands rejected during the current turn so the engine never
/// proposes the same string twice. The registry resets when a new `turn_id`
/// is seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnLedger {
    turn_id: u64,
    invalid: BTreeSet<(RobotId, String)>,
}

impl TurnLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn_id(&self) -> u64 {
        self.turn_id
    }

    fn roll_to(&mut self, turn_id: u64) {
        if turn_id != self.turn_id {
            self.turn_id = turn_id;
            self.invalid.clear();
        }
    }

    /// Records `command` as rejected for `robot` during `turn_id`.
    pub fn record_invalid(&mut self, turn_id: u64, robot: RobotId, command: &str) {
        self.roll_to(turn_id);
        self.invalid.insert((robot, command.to_owned()));
    }

    pub fn is_invalid(&self, turn_id: u64, robot: RobotId, command: &str) -> bool {
        turn_id == self.turn_id && self.invalid.contains(&(robot, command.to_owned()))
    }

    /// Commands rejected for `robot` during the ledger's turn.
    pub fn invalid_for(&self, robot: RobotId) -> impl Iterator<Item = &str> {
        self.invalid
            .iter()
            .filter(move |(uid, _)| *uid == robot)
            .map(|(_, command)| command.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_resets_on_new_turn() {
        let mut ledger = TurnLedger::new();
        ledger.record_invalid(3, RobotId(1), "ke");
        assert!(ledger.is_invalid(3, RobotId(1), "ke"));
        assert!(!ledger.is_invalid(3, RobotId(2), "ke"));
        assert!(!ledger.is_invalid(4, RobotId(1), "ke"));

        ledger.record_invalid(4, RobotId(1), "pn");
        assert!(!ledger.is_invalid(3, RobotId(1), "ke"));
        assert_eq!(ledger.invalid_for(RobotId(1)).collect::<Vec<_>>(), vec!["pn"]);
    }
}
