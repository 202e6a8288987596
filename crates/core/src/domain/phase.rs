use std::fmt;

use serde::{Deserialize, Serialize};

/// One stage of the five-stage counselling script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Phase1,
    Phase2,
    Phase3,
    Phase4,
    Phase5,
}

impl Phase {
    pub const ALL: [Phase; 5] =
        [Phase::Phase1, Phase::Phase2, Phase::Phase3, Phase::Phase4, Phase::Phase5];

    pub fn first() -> Self {
        Self::Phase1
    }

    pub fn terminal() -> Self {
        Self::Phase5
    }

    pub fn is_terminal(self) -> bool {
        self == Self::terminal()
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Phase1 => 1,
            Self::Phase2 => 2,
            Self::Phase3 => 3,
            Self::Phase4 => 4,
            Self::Phase5 => 5,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|phase| phase.ordinal() == ordinal)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    /// Phases from `self` up to, but excluding, the terminal phase.
    pub fn remaining_transitions(self) -> impl Iterator<Item = Phase> {
        Self::ALL.into_iter().filter(move |phase| *phase >= self && !phase.is_terminal())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PHASE{}", self.ordinal())
    }
}

#[cfg(test)]
mod tests {
    use super::Phase;

    #[test]
    fn phases_are_ordered_and_chain_forward() {
        assert!(Phase::Phase1 < Phase::Phase4);
        assert_eq!(Phase::Phase2.next(), Some(Phase::Phase3));
        assert_eq!(Phase::Phase5.next(), None);
        assert!(Phase::Phase5.is_terminal());
        assert_eq!(Phase::from_ordinal(4), Some(Phase::Phase4));
        assert_eq!(Phase::from_ordinal(0), None);
        assert_eq!(Phase::from_ordinal(6), None);
    }

    #[test]
    fn remaining_transitions_stop_before_terminal_phase() {
        let remaining: Vec<_> = Phase::Phase3.remaining_transitions().collect();
        assert_eq!(remaining, vec![Phase::Phase3, Phase::Phase4]);
        assert_eq!(Phase::Phase5.remaining_transitions().count(), 0);
    }

    #[test]
    fn phase_serializes_in_upper_case() {
        let json = serde_json::to_string(&Phase::Phase2).expect("serialize");
        assert_eq!(json, "\"PHASE2\"");
        assert_eq!(Phase::Phase2.to_string(), "PHASE2");
    }
}
