//! Boolean formulas over belief vectors.
//!
//! A [`ConstraintSet`] is a set of sets of atomic [`BeliefConstraint`]s. Whether it
//! reads as DNF (outer OR, inner AND) or CNF (outer AND, inner OR) is decided by
//! the caller, see [`evaluator::ConstraintEvaluator`].

pub mod evaluator;
pub mod provider;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comparer::FloatComparer;
use crate::domain::belief::BeliefId;

pub use evaluator::{ConstraintEvaluator, ToleranceEvaluator};
pub use provider::{ConstraintProvider, DesireBlock, GoalRule, PhaseTransitionConstraints};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryCheck {
    #[serde(rename = "GEQ")]
    GreaterOrEqual,
    #[serde(rename = "LEQ")]
    LessOrEqual,
    #[serde(rename = "EQ")]
    Equal,
    #[serde(rename = "GT")]
    GreaterThan,
    #[serde(rename = "LT")]
    LessThan,
    #[serde(rename = "NEQ")]
    NotEqual,
}

impl BoundaryCheck {
    pub fn holds(self, comparer: &FloatComparer, value: f32, goal: f32) -> bool {
        match self {
            Self::GreaterOrEqual => comparer.greater_or_equal(value, goal),
            Self::LessOrEqual => comparer.less_or_equal(value, goal),
            Self::Equal => comparer.equal(value, goal),
            Self::GreaterThan => comparer.greater_than(value, goal),
            Self::LessThan => comparer.less_than(value, goal),
            Self::NotEqual => !comparer.equal(value, goal),
        }
    }

    /// The check that holds exactly when `self` does not.
    pub fn negated(self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::LessOrEqual => Self::GreaterThan,
            Self::GreaterOrEqual => Self::LessThan,
            Self::LessThan => Self::GreaterOrEqual,
            Self::GreaterThan => Self::LessOrEqual,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::NotEqual => "!=",
        }
    }
}

/// Atomic proposition `belief <check> goal`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeliefConstraint {
    pub belief: BeliefId,
    pub check: BoundaryCheck,
    pub goal: f32,
}

impl BeliefConstraint {
    pub fn new(belief: impl Into<String>, check: BoundaryCheck, goal: f32) -> Self {
        Self { belief: BeliefId::new(belief), check, goal }
    }

    pub fn negated(&self) -> Self {
        Self { belief: self.belief.clone(), check: self.check.negated(), goal: self.goal }
    }
}

impl fmt::Display for BeliefConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.belief, self.check.symbol(), self.goal)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintSet {
    clauses: Vec<Vec<BeliefConstraint>>,
}

impl ConstraintSet {
    pub fn new(clauses: Vec<Vec<BeliefConstraint>>) -> Self {
        let mut set = Self::default();
        for clause in clauses {
            set.push_clause(clause);
        }
        set
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// `{{constraint}}`.
    pub fn single(constraint: BeliefConstraint) -> Self {
        Self::new(vec![vec![constraint]])
    }

    pub fn clauses(&self) -> &[Vec<BeliefConstraint>] {
        &self.clauses
    }

    /// True for `{}` and `{{}}`, the two spellings of "no real constraint".
    pub fn is_vacuous(&self) -> bool {
        match self.clauses.as_slice() {
            [] => true,
            [only] => only.is_empty(),
            _ => false,
        }
    }

    /// Adds a clause unless an identical one is already present.
    pub fn push_clause(&mut self, clause: Vec<BeliefConstraint>) {
        if !self.clauses.contains(&clause) {
            self.clauses.push(clause);
        }
    }

    pub fn extend(&mut self, other: &ConstraintSet) {
        for clause in &other.clauses {
            self.push_clause(clause.clone());
        }
    }

    pub fn beliefs(&self) -> impl Iterator<Item = &BeliefId> {
        self.clauses.iter().flatten().map(|constraint| &constraint.belief)
    }
}

#[cfg(test)]
mod tests {
    use super::{BeliefConstraint, BoundaryCheck, ConstraintSet};
    use crate::comparer::FloatComparer;

    #[test]
    fn negation_swaps_every_check() {
        use BoundaryCheck::*;

        for (check, expected) in [
            (Equal, NotEqual),
            (NotEqual, Equal),
            (LessOrEqual, GreaterThan),
            (GreaterOrEqual, LessThan),
            (LessThan, GreaterOrEqual),
            (GreaterThan, LessOrEqual),
        ] {
            assert_eq!(check.negated(), expected);
        }
    }

    #[test]
    fn negated_check_is_the_complement_outside_the_band() {
        let comparer = FloatComparer::default();
        let checks = [
            BoundaryCheck::Equal,
            BoundaryCheck::NotEqual,
            BoundaryCheck::LessOrEqual,
            BoundaryCheck::GreaterOrEqual,
            BoundaryCheck::LessThan,
            BoundaryCheck::GreaterThan,
        ];

        for check in checks {
            for value in [0.0_f32, 0.3, 0.5, 0.7, 1.0] {
                assert_ne!(
                    check.holds(&comparer, value, 0.5),
                    check.negated().holds(&comparer, value, 0.5),
                    "{check:?} at {value}"
                );
            }
        }
    }

    #[test]
    fn vacuous_sets_are_recognised() {
        assert!(ConstraintSet::empty().is_vacuous());
        assert!(ConstraintSet::new(vec![vec![]]).is_vacuous());
        assert!(ConstraintSet::new(vec![vec![], vec![]]).is_vacuous());
        assert!(!ConstraintSet::single(BeliefConstraint::new("B1", BoundaryCheck::LessThan, 1.0))
            .is_vacuous());
    }

    #[test]
    fn extend_skips_duplicate_clauses() {
        let clause = vec![BeliefConstraint::new("B9", BoundaryCheck::GreaterOrEqual, 0.7)];
        let mut set = ConstraintSet::new(vec![clause.clone()]);
        set.extend(&ConstraintSet::new(vec![
            clause,
            vec![BeliefConstraint::new("B12", BoundaryCheck::NotEqual, 0.0)],
        ]));

        assert_eq!(set.clauses().len(), 2);
        assert_eq!(set.beliefs().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["B9", "B12"]);
    }

    #[test]
    fn constraint_renders_readably() {
        let constraint = BeliefConstraint::new("B3", BoundaryCheck::GreaterThan, 0.3);
        assert_eq!(constraint.to_string(), "B3 > 0.3");
        assert_eq!(constraint.negated().to_string(), "B3 <= 0.3");
    }
}
