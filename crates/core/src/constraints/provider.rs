use std::collections::BTreeMap;

use crate::constraints::{BeliefConstraint, ConstraintSet};
use crate::domain::belief::{BeliefCatalog, BeliefVector};
use crate::domain::desire::{DesireId, DesireSpec};
use crate::domain::phase::Phase;
use crate::errors::DomainError;

/// Move toward `goal`, but only from states where every constraint in `when` holds.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalRule {
    pub when: Vec<BeliefConstraint>,
    pub goal: BeliefConstraint,
}

/// While `desire` is active, goal rules of the transition require `requires` to hold.
#[derive(Clone, Debug, PartialEq)]
pub struct DesireBlock {
    pub desire: DesireId,
    pub requires: BeliefConstraint,
}

/// Everything the planner needs to leave `current_phase`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseTransitionConstraints {
    pub current_phase: Phase,
    pub next_phase: Option<Phase>,
    pub goal_rules: Vec<GoalRule>,
    pub blocking_desires: Vec<DesireBlock>,
    /// DNF: once satisfied, the final phase can no longer be reached.
    pub impossible_to_reach: ConstraintSet,
    /// DNF: states that are not worth expanding further.
    pub dead_ends: ConstraintSet,
    /// DNF: a child that lands in `next_phase` must satisfy this.
    pub optimal_goal: ConstraintSet,
    /// Reference belief state for an agent sitting in `current_phase`.
    pub goal_beliefs: BeliefVector,
}

impl PhaseTransitionConstraints {
    pub fn new(current_phase: Phase, goal_beliefs: BeliefVector) -> Self {
        Self {
            current_phase,
            next_phase: current_phase.next(),
            goal_rules: Vec::new(),
            blocking_desires: Vec::new(),
            impossible_to_reach: ConstraintSet::empty(),
            dead_ends: ConstraintSet::empty(),
            optimal_goal: ConstraintSet::empty(),
            goal_beliefs,
        }
    }

    pub fn with_rule(mut self, when: Vec<BeliefConstraint>, goal: BeliefConstraint) -> Self {
        self.goal_rules.push(GoalRule { when, goal });
        self
    }

    pub fn with_block(mut self, desire: DesireId, requires: BeliefConstraint) -> Self {
        self.blocking_desires.push(DesireBlock { desire, requires });
        self
    }

    pub fn with_impossible_to_reach(mut self, set: ConstraintSet) -> Self {
        self.impossible_to_reach = set;
        self
    }

    pub fn with_dead_ends(mut self, set: ConstraintSet) -> Self {
        self.dead_ends = set;
        self
    }

    pub fn with_optimal_goal(mut self, set: ConstraintSet) -> Self {
        self.optimal_goal = set;
        self
    }

    fn constraints(&self) -> impl Iterator<Item = &BeliefConstraint> {
        self.goal_rules
            .iter()
            .flat_map(|rule| rule.when.iter().chain(std::iter::once(&rule.goal)))
            .chain(self.blocking_desires.iter().map(|block| &block.requires))
            .chain(self.impossible_to_reach.clauses().iter().flatten())
            .chain(self.dead_ends.clauses().iter().flatten())
            .chain(self.optimal_goal.clauses().iter().flatten())
    }
}

/// Read-only desire and phase tables, built once and shared by reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstraintProvider {
    desires: Vec<DesireSpec>,
    transitions: BTreeMap<Phase, PhaseTransitionConstraints>,
    terminal_beliefs: Option<BeliefVector>,
}

impl ConstraintProvider {
    pub fn new(desires: Vec<DesireSpec>) -> Self {
        Self { desires, transitions: BTreeMap::new(), terminal_beliefs: None }
    }

    pub fn with_transition(mut self, transition: PhaseTransitionConstraints) -> Self {
        self.transitions.insert(transition.current_phase, transition);
        self
    }

    pub fn with_terminal_beliefs(mut self, beliefs: BeliefVector) -> Self {
        self.terminal_beliefs = Some(beliefs);
        self
    }

    /// Desires in declaration order; the first active one wins.
    pub fn desires(&self) -> &[DesireSpec] {
        &self.desires
    }

    pub fn desire(&self, id: &DesireId) -> Option<&DesireSpec> {
        self.desires.iter().find(|desire| &desire.id == id)
    }

    pub fn desires_in_phase(&self, phase: Phase) -> impl Iterator<Item = &DesireSpec> {
        self.desires.iter().filter(move |desire| desire.phase == phase)
    }

    pub fn transition(&self, phase: Phase) -> Option<&PhaseTransitionConstraints> {
        self.transitions.get(&phase)
    }

    /// Reference belief state for `phase`, used to jump an agent straight into it.
    pub fn phase_state(&self, phase: Phase) -> Option<&BeliefVector> {
        if phase.is_terminal() {
            self.terminal_beliefs.as_ref()
        } else {
            self.transition(phase).map(|transition| &transition.goal_beliefs)
        }
    }

    /// Checks the tables against the belief catalog.
    pub fn validate(&self, catalog: &BeliefCatalog) -> Result<(), DomainError> {
        for phase in Phase::first().remaining_transitions() {
            if self.transition(phase).is_none() {
                return Err(DomainError::MissingPhaseConstraints(phase));
            }
        }

        for desire in &self.desires {
            for belief in desire.activation.beliefs() {
                if catalog.index_of(belief).is_none() {
                    return Err(DomainError::UnknownBelief(belief.clone()));
                }
            }
        }

        for (phase, transition) in &self.transitions {
            if transition.current_phase != *phase {
                return Err(DomainError::InvariantViolation(format!(
                    "transition registered under {phase} describes {}",
                    transition.current_phase
                )));
            }
            catalog.ensure_len(&format!("{phase} goal beliefs"), &transition.goal_beliefs)?;
            for constraint in transition.constraints() {
                if catalog.index_of(&constraint.belief).is_none() {
                    return Err(DomainError::UnknownBelief(constraint.belief.clone()));
                }
            }
            for block in &transition.blocking_desires {
                if self.desire(&block.desire).is_none() {
                    return Err(DomainError::UnknownDesire(block.desire.clone()));
                }
            }
        }

        if let Some(terminal) = &self.terminal_beliefs {
            catalog.ensure_len("terminal phase beliefs", terminal)?;
        }

        Ok(())
    }
}
