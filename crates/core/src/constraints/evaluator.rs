use crate::comparer::FloatComparer;
use crate::constraints::{BeliefConstraint, ConstraintProvider, ConstraintSet};
use crate::domain::belief::{BeliefCatalog, BeliefVector};
use crate::domain::desire::DesireId;
use crate::domain::phase::Phase;

/// Evaluation of belief constraints and the formulas built from them.
///
/// Lookups that cannot be answered (unknown belief, index past the end of the
/// vector, unknown desire) evaluate to `false`; evaluation never fails.
pub trait ConstraintEvaluator {
    fn is_constraint_satisfied(&self, constraint: &BeliefConstraint, beliefs: &BeliefVector)
        -> bool;

    fn check_desire_active(&self, desire: &DesireId, beliefs: &BeliefVector) -> bool;

    /// Union of the "impossible to reach" sets of `from` and every later non-terminal phase.
    fn impossible_to_reach_final_phase(&self, from: Phase) -> ConstraintSet;

    /// First active desire in declaration order.
    fn active_desire(&self, beliefs: &BeliefVector) -> Option<DesireId>;

    /// Phase signalled by the active desire, or the first phase when none is active.
    fn phase_of(&self, beliefs: &BeliefVector) -> Phase;

    fn is_dnf_satisfied(&self, set: &ConstraintSet, beliefs: &BeliefVector) -> bool {
        if set.clauses().is_empty() {
            return true;
        }
        set.clauses()
            .iter()
            .any(|clause| clause.iter().all(|atom| self.is_constraint_satisfied(atom, beliefs)))
    }

    fn is_cnf_satisfied(&self, set: &ConstraintSet, beliefs: &BeliefVector) -> bool {
        set.clauses()
            .iter()
            .filter(|clause| !clause.is_empty())
            .all(|clause| clause.iter().any(|atom| self.is_constraint_satisfied(atom, beliefs)))
    }

    fn is_constraint_set_empty(&self, set: &ConstraintSet) -> bool {
        set.is_vacuous()
    }
}

/// Evaluator backed by the static tables and a [`FloatComparer`].
#[derive(Clone, Copy, Debug)]
pub struct ToleranceEvaluator<'a> {
    provider: &'a ConstraintProvider,
    catalog: &'a BeliefCatalog,
    comparer: FloatComparer,
}

impl<'a> ToleranceEvaluator<'a> {
    pub fn new(
        provider: &'a ConstraintProvider,
        catalog: &'a BeliefCatalog,
        comparer: FloatComparer,
    ) -> Self {
        Self { provider, catalog, comparer }
    }

    pub fn provider(&self) -> &'a ConstraintProvider {
        self.provider
    }

    pub fn catalog(&self) -> &'a BeliefCatalog {
        self.catalog
    }

    pub fn comparer(&self) -> FloatComparer {
        self.comparer
    }
}

impl ConstraintEvaluator for ToleranceEvaluator<'_> {
    fn is_constraint_satisfied(
        &self,
        constraint: &BeliefConstraint,
        beliefs: &BeliefVector,
    ) -> bool {
        let Some(value) =
            self.catalog.index_of(&constraint.belief).and_then(|index| beliefs.get(index))
        else {
            return false;
        };
        constraint.check.holds(&self.comparer, value, constraint.goal)
    }

    fn check_desire_active(&self, desire: &DesireId, beliefs: &BeliefVector) -> bool {
        self.provider
            .desire(desire)
            .is_some_and(|spec| self.is_dnf_satisfied(&spec.activation, beliefs))
    }

    fn impossible_to_reach_final_phase(&self, from: Phase) -> ConstraintSet {
        let mut union = ConstraintSet::empty();
        for phase in from.remaining_transitions() {
            if let Some(transition) = self.provider.transition(phase) {
                union.extend(&transition.impossible_to_reach);
            }
        }
        union
    }

    fn active_desire(&self, beliefs: &BeliefVector) -> Option<DesireId> {
        self.provider
            .desires()
            .iter()
            .find(|spec| self.is_dnf_satisfied(&spec.activation, beliefs))
            .map(|spec| spec.id.clone())
    }

    fn phase_of(&self, beliefs: &BeliefVector) -> Phase {
        self.provider
            .desires()
            .iter()
            .find(|spec| self.is_dnf_satisfied(&spec.activation, beliefs))
            .map_or(Phase::first(), |spec| spec.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstraintEvaluator, ToleranceEvaluator};
    use crate::comparer::FloatComparer;
    use crate::constraints::{
        BeliefConstraint, BoundaryCheck, ConstraintProvider, ConstraintSet,
        PhaseTransitionConstraints,
    };
    use crate::domain::belief::{BeliefCatalog, BeliefDescriptor, BeliefId, BeliefVector};
    use crate::domain::desire::{DesireId, DesireSpec};
    use crate::domain::phase::Phase;

    fn catalog() -> BeliefCatalog {
        BeliefCatalog::new(
            ["B1", "B2", "B3", "B4"]
                .into_iter()
                .map(|id| BeliefDescriptor { id: BeliefId::new(id), full_name: id.to_string() })
                .collect(),
        )
    }

    fn provider() -> ConstraintProvider {
        let zeros = || BeliefVector::new(vec![0.0; 4]);
        ConstraintProvider::new(vec![
            DesireSpec {
                id: DesireId::new("D1"),
                full_name: "talk".to_string(),
                phase: Phase::Phase2,
                activation: ConstraintSet::single(BeliefConstraint::new(
                    "B1",
                    BoundaryCheck::GreaterThan,
                    0.3,
                )),
            },
            DesireSpec {
                id: DesireId::new("D2"),
                full_name: "leave".to_string(),
                phase: Phase::Phase5,
                activation: ConstraintSet::new(vec![
                    vec![BeliefConstraint::new("B2", BoundaryCheck::Equal, 1.0)],
                    vec![BeliefConstraint::new("B1", BoundaryCheck::GreaterThan, 0.9)],
                ]),
            },
        ])
        .with_transition(PhaseTransitionConstraints::new(Phase::Phase1, zeros()).with_impossible_to_reach(
            ConstraintSet::single(BeliefConstraint::new("B3", BoundaryCheck::GreaterOrEqual, 0.7)),
        ))
        .with_transition(PhaseTransitionConstraints::new(Phase::Phase2, zeros()).with_impossible_to_reach(
            ConstraintSet::new(vec![vec![
                BeliefConstraint::new("B4", BoundaryCheck::NotEqual, 0.0),
                BeliefConstraint::new("B2", BoundaryCheck::GreaterOrEqual, 0.7),
            ]]),
        ))
        .with_transition(PhaseTransitionConstraints::new(Phase::Phase3, zeros()))
        .with_transition(PhaseTransitionConstraints::new(Phase::Phase4, zeros()))
    }

    fn atom(belief: &str, check: BoundaryCheck, goal: f32) -> BeliefConstraint {
        BeliefConstraint::new(belief, check, goal)
    }

    #[test]
    fn unknown_belief_or_short_vector_fails_closed() {
        let (provider, catalog) = (provider(), catalog());
        let evaluator = ToleranceEvaluator::new(&provider, &catalog, FloatComparer::default());
        let beliefs = BeliefVector::new(vec![0.5, 0.5]);

        assert!(!evaluator.is_constraint_satisfied(&atom("B99", BoundaryCheck::LessThan, 1.0), &beliefs));
        assert!(!evaluator.is_constraint_satisfied(&atom("B3", BoundaryCheck::LessThan, 1.0), &beliefs));
        assert!(!evaluator.is_constraint_satisfied(&atom("B4", BoundaryCheck::NotEqual, 0.0), &beliefs));
        assert!(evaluator.is_constraint_satisfied(&atom("B2", BoundaryCheck::LessThan, 1.0), &beliefs));
    }

    #[test]
    fn vacuous_sets_hold_in_both_readings() {
        let (provider, catalog) = (provider(), catalog());
        let evaluator = ToleranceEvaluator::new(&provider, &catalog, FloatComparer::default());
        let beliefs = BeliefVector::new(vec![0.0; 4]);

        for set in [ConstraintSet::empty(), ConstraintSet::new(vec![vec![]])] {
            assert!(evaluator.is_dnf_satisfied(&set, &beliefs));
            assert!(evaluator.is_cnf_satisfied(&set, &beliefs));
            assert!(evaluator.is_constraint_set_empty(&set));
        }
    }

    #[test]
    fn dnf_needs_one_fully_satisfied_conjunction() {
        let (provider, catalog) = (provider(), catalog());
        let evaluator = ToleranceEvaluator::new(&provider, &catalog, FloatComparer::default());
        let beliefs = BeliefVector::new(vec![0.2, 0.8, 0.5, 0.0]);
        let yes = atom("B1", BoundaryCheck::LessThan, 0.3);
        let no = atom("B2", BoundaryCheck::LessThan, 0.3);

        let mixed = ConstraintSet::new(vec![vec![yes.clone(), no.clone()], vec![no.clone(), yes.clone()]]);
        assert!(!evaluator.is_dnf_satisfied(&mixed, &beliefs));

        let one_true = ConstraintSet::new(vec![vec![yes.clone(), no.clone()], vec![yes.clone()]]);
        assert!(evaluator.is_dnf_satisfied(&one_true, &beliefs));

        let third = atom("B3", BoundaryCheck::Equal, 0.5);
        let three_way = ConstraintSet::new(vec![
            vec![no.clone(), third.clone()],
            vec![yes.clone(), no.clone(), third.clone()],
            vec![yes, third],
        ]);
        assert!(evaluator.is_dnf_satisfied(&three_way, &beliefs));
        assert!(!evaluator.is_dnf_satisfied(&ConstraintSet::single(no), &beliefs));
    }

    #[test]
    fn cnf_needs_every_non_empty_disjunction() {
        let (provider, catalog) = (provider(), catalog());
        let evaluator = ToleranceEvaluator::new(&provider, &catalog, FloatComparer::default());
        let beliefs = BeliefVector::new(vec![0.2, 0.8, 0.5, 0.0]);
        let yes = atom("B1", BoundaryCheck::LessThan, 0.3);
        let no = atom("B2", BoundaryCheck::LessThan, 0.3);

        let mixed = ConstraintSet::new(vec![vec![yes.clone(), no.clone()], vec![no.clone(), yes.clone()]]);
        assert!(evaluator.is_cnf_satisfied(&mixed, &beliefs));

        let one_false = ConstraintSet::new(vec![vec![yes.clone(), no.clone()], vec![no.clone()]]);
        assert!(!evaluator.is_cnf_satisfied(&one_false, &beliefs));

        let with_empty = ConstraintSet::new(vec![vec![], vec![yes.clone()], vec![no.clone(), yes]]);
        assert!(evaluator.is_cnf_satisfied(&with_empty, &beliefs));

        let three_way = ConstraintSet::new(vec![
            vec![no.clone()],
            vec![atom("B3", BoundaryCheck::Equal, 0.5)],
            vec![atom("B4", BoundaryCheck::Equal, 0.0)],
        ]);
        assert!(!evaluator.is_cnf_satisfied(&three_way, &beliefs));
    }

    #[test]
    fn desire_activation_and_phase_follow_declaration_order() {
        let (provider, catalog) = (provider(), catalog());
        let evaluator = ToleranceEvaluator::new(&provider, &catalog, FloatComparer::default());

        let idle = BeliefVector::new(vec![0.1, 0.0, 0.0, 0.0]);
        assert_eq!(evaluator.active_desire(&idle), None);
        assert_eq!(evaluator.phase_of(&idle), Phase::Phase1);

        let both = BeliefVector::new(vec![0.95, 1.0, 0.0, 0.0]);
        assert!(evaluator.check_desire_active(&DesireId::new("D1"), &both));
        assert!(evaluator.check_desire_active(&DesireId::new("D2"), &both));
        assert_eq!(evaluator.active_desire(&both), Some(DesireId::new("D1")));
        assert_eq!(evaluator.phase_of(&both), Phase::Phase2);

        assert!(!evaluator.check_desire_active(&DesireId::new("D7"), &both));
    }

    #[test]
    fn impossible_to_reach_unions_the_remaining_phases() {
        let (provider, catalog) = (provider(), catalog());
        let evaluator = ToleranceEvaluator::new(&provider, &catalog, FloatComparer::default());

        assert_eq!(evaluator.impossible_to_reach_final_phase(Phase::Phase1).clauses().len(), 2);
        assert_eq!(evaluator.impossible_to_reach_final_phase(Phase::Phase2).clauses().len(), 1);
        assert!(evaluator.impossible_to_reach_final_phase(Phase::Phase3).is_vacuous());
        assert!(evaluator.impossible_to_reach_final_phase(Phase::Phase5).is_vacuous());
    }
}
